//! A board whose size is chosen at runtime. Each variant wraps a board of one fixed size,
//! so every operation dispatches once and then runs fully monomorphized.

use board_game_traits::Color;

use crate::evaluation::Evaluator;
use crate::position::{Board, GameStatus, Move, MoveError, ReverseMove};
use crate::search::{SearchEngine, SearchResult};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DynamicBoard {
    Size3(Board<3>),
    Size4(Board<4>),
    Size5(Board<5>),
    Size6(Board<6>),
    Size7(Board<7>),
    Size8(Board<8>),
}

/// Runs `$body` with `$board` bound to the inner board, and `S` as its size
macro_rules! dispatch {
    ($self:expr, $board:ident => $body:expr) => {
        match $self {
            DynamicBoard::Size3($board) => {
                #[allow(dead_code)]
                const S: usize = 3;
                $body
            }
            DynamicBoard::Size4($board) => {
                #[allow(dead_code)]
                const S: usize = 4;
                $body
            }
            DynamicBoard::Size5($board) => {
                #[allow(dead_code)]
                const S: usize = 5;
                $body
            }
            DynamicBoard::Size6($board) => {
                #[allow(dead_code)]
                const S: usize = 6;
                $body
            }
            DynamicBoard::Size7($board) => {
                #[allow(dead_code)]
                const S: usize = 7;
                $body
            }
            DynamicBoard::Size8($board) => {
                #[allow(dead_code)]
                const S: usize = 8;
                $body
            }
        }
    };
}

impl DynamicBoard {
    /// The starting position for a size between 3 and 8
    pub fn new(size: usize) -> Result<Self, pgn_traits::Error> {
        match size {
            3 => Ok(DynamicBoard::Size3(Board::default())),
            4 => Ok(DynamicBoard::Size4(Board::default())),
            5 => Ok(DynamicBoard::Size5(Board::default())),
            6 => Ok(DynamicBoard::Size6(Board::default())),
            7 => Ok(DynamicBoard::Size7(Board::default())),
            8 => Ok(DynamicBoard::Size8(Board::default())),
            _ => Err(unsupported_size(size)),
        }
    }

    pub fn from_tps(size: usize, tps: &str) -> Result<Self, pgn_traits::Error> {
        match size {
            3 => Ok(DynamicBoard::Size3(Board::from_tps(tps)?)),
            4 => Ok(DynamicBoard::Size4(Board::from_tps(tps)?)),
            5 => Ok(DynamicBoard::Size5(Board::from_tps(tps)?)),
            6 => Ok(DynamicBoard::Size6(Board::from_tps(tps)?)),
            7 => Ok(DynamicBoard::Size7(Board::from_tps(tps)?)),
            8 => Ok(DynamicBoard::Size8(Board::from_tps(tps)?)),
            _ => Err(unsupported_size(size)),
        }
    }

    pub fn size(&self) -> usize {
        dispatch!(self, _board => S)
    }

    pub fn side_to_move(&self) -> Color {
        dispatch!(self, board => board.side_to_move())
    }

    pub fn status(&self) -> GameStatus {
        dispatch!(self, board => board.status())
    }

    pub fn validate(&self, mv: &Move) -> Result<(), MoveError> {
        dispatch!(self, board => board.validate(mv))
    }

    pub fn execute(&mut self, mv: Move) -> ReverseMove {
        dispatch!(self, board => board.execute(mv))
    }

    pub fn undo(&mut self, reverse_move: ReverseMove) {
        dispatch!(self, board => board.undo(reverse_move))
    }

    pub fn generate_moves(&self, moves: &mut Vec<Move>) {
        dispatch!(self, board => board.generate_moves(moves))
    }

    pub fn zobrist_hash(&self) -> u64 {
        dispatch!(self, board => board.zobrist_hash())
    }

    pub fn to_tps(&self) -> String {
        dispatch!(self, board => board.to_tps())
    }

    pub fn move_to_string(&self, mv: &Move) -> String {
        dispatch!(self, _board => mv.to_string::<S>())
    }

    pub fn move_from_string(&self, input: &str) -> Result<Move, pgn_traits::Error> {
        dispatch!(self, _board => Move::from_string::<S>(input))
    }

    pub fn perft(&mut self, depth: u16) -> u64 {
        dispatch!(self, board => board.perft(depth))
    }

    pub fn search<E: Evaluator>(
        &mut self,
        engine: &mut SearchEngine<E>,
        max_depth: u16,
    ) -> SearchResult {
        dispatch!(self, board => engine.search(board, max_depth))
    }
}

fn unsupported_size(size: usize) -> pgn_traits::Error {
    pgn_traits::Error::new_parse_error(format!("Unsupported board size {}, expected 3 to 8", size))
}
