//! Tak board representation, move validation and execution, along with all required data types.

use std::fmt;
use std::ops::{Index, IndexMut};

use board_game_traits::{Color, GameResult};

use bitboard::BitBoard;
use utils::Role::{Cap, Flat, Wall};
use zobrist::ZOBRIST_KEYS;

pub(crate) mod bitboard;
pub mod dynamic;
pub mod move_gen;
pub mod move_table;
pub mod mv;
mod tps;
pub mod utils;
pub(crate) mod zobrist;

pub use dynamic::DynamicBoard;
pub use move_gen::MoveIter;
pub use move_table::{MoveTable, Reach};
pub use mv::{Move, ReverseMove, Slides};
pub use utils::{Direction, Piece, Role, Square, Stack};

pub const MAX_BOARD_SIZE: usize = 8;

pub const fn starting_stones<const S: usize>() -> u8 {
    match S {
        3 => 10,
        4 => 15,
        5 => 21,
        6 => 30,
        7 => 40,
        8 => 50,
        _ => 0,
    }
}

pub const fn starting_capstones<const S: usize>() -> u8 {
    match S {
        3 => 0,
        4 => 0,
        5 => 1,
        6 => 1,
        7 => 2,
        8 => 2,
        _ => 0,
    }
}

/// Pieces a player has not yet placed. Walls are taken from the flats.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Reserves {
    pub flats: u8,
    pub caps: u8,
}

impl Reserves {
    pub fn is_exhausted(self) -> bool {
        self.flats == 0 && self.caps == 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Winner {
    White,
    Black,
    Tie,
    Neither,
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Winner::White,
            Color::Black => Winner::Black,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum VictoryCondition {
    Road,
    Flat,
    /// Only reported by external drivers, never by the board itself
    Resignation,
    /// Only reported by external drivers, never by the board itself
    Draw,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct GameStatus {
    pub over: bool,
    pub winner: Winner,
    pub condition: Option<VictoryCondition>,
}

impl GameStatus {
    pub const fn in_progress() -> Self {
        GameStatus {
            over: false,
            winner: Winner::Neither,
            condition: None,
        }
    }

    fn finished(winner: Winner, condition: VictoryCondition) -> Self {
        GameStatus {
            over: true,
            winner,
            condition: Some(condition),
        }
    }

    pub fn game_result(self) -> Option<GameResult> {
        match self.winner {
            Winner::White => Some(GameResult::WhiteWin),
            Winner::Black => Some(GameResult::BlackWin),
            Winner::Tie => Some(GameResult::Draw),
            Winner::Neither => None,
        }
    }
}

/// Why a move cannot be played in a position
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MoveError {
    WrongOwner,
    OutOfBounds,
    BlockedByWallOrCap,
    ExceedsStackHeight,
    ExceedsCarryLimit,
    TargetOccupied,
    EmptySource,
    NoPiecesLeft,
    OpeningRestriction,
    EmptySlide,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            MoveError::WrongOwner => "stack is controlled by the opponent",
            MoveError::OutOfBounds => "move leaves the board",
            MoveError::BlockedByWallOrCap => "slide is blocked by a wall or capstone",
            MoveError::ExceedsStackHeight => "slide carries more pieces than the stack holds",
            MoveError::ExceedsCarryLimit => "slide carries more pieces than the carry limit",
            MoveError::TargetOccupied => "placement on an occupied square",
            MoveError::EmptySource => "slide from an empty square",
            MoveError::NoPiecesLeft => "no pieces of that kind left to place",
            MoveError::OpeningRestriction => "only flat placements are allowed in the first round",
            MoveError::EmptySlide => "slide moves no pieces",
        };
        write!(f, "Illegal move: {}", message)
    }
}

impl std::error::Error for MoveError {}

/// Complete game state of a Tak game on an `S`x`S` board
#[derive(Clone, PartialEq, Eq)]
pub struct Board<const S: usize> {
    stacks: [[Stack; S]; S],
    white_reserves: Reserves,
    black_reserves: Reserves,
    to_move: Color,
    round: u16,
    hash: u64,
}

impl<const S: usize> Default for Board<S> {
    fn default() -> Self {
        let reserves = Reserves {
            flats: starting_stones::<S>(),
            caps: starting_capstones::<S>(),
        };
        let mut board = Board {
            stacks: [[Stack::new(); S]; S],
            white_reserves: reserves,
            black_reserves: reserves,
            to_move: Color::White,
            round: 1,
            hash: 0,
        };
        board.hash = board.zobrist_hash_from_scratch();
        board
    }
}

impl<const S: usize> Index<Square> for Board<S> {
    type Output = Stack;

    fn index(&self, square: Square) -> &Self::Output {
        &self.stacks[square.rank::<S>() as usize][square.file::<S>() as usize]
    }
}

impl<const S: usize> IndexMut<Square> for Board<S> {
    fn index_mut(&mut self, square: Square) -> &mut Self::Output {
        &mut self.stacks[square.rank::<S>() as usize][square.file::<S>() as usize]
    }
}

impl<const S: usize> fmt::Debug for Board<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let width = self.squares().map(|square| self[square].len()).max().unwrap_or(0) as usize + 1;
        for rank in (0..S as u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..S as u8 {
                let stack = self[Square::from_rank_file::<S>(rank, file)];
                write!(f, "[{:>width$}]", stack.to_string(), width = width)?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "Stones left: {}/{}.",
            self.white_reserves.flats, self.black_reserves.flats
        )?;
        writeln!(
            f,
            "Capstones left: {}/{}.",
            self.white_reserves.caps, self.black_reserves.caps
        )?;
        writeln!(f, "{} to move, round {}.", self.to_move, self.round)?;
        writeln!(f, "Hash: {:x}", self.hash)?;
        Ok(())
    }
}

impl<const S: usize> Board<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn side_to_move(&self) -> Color {
        self.to_move
    }

    /// The current round, starting at 1. A round ends after black's move.
    pub fn round(&self) -> u16 {
        self.round
    }

    pub fn reserves(&self, color: Color) -> Reserves {
        match color {
            Color::White => self.white_reserves,
            Color::Black => self.black_reserves,
        }
    }

    fn reserves_mut(&mut self, color: Color) -> &mut Reserves {
        match color {
            Color::White => &mut self.white_reserves,
            Color::Black => &mut self.black_reserves,
        }
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    pub(crate) fn zobrist_hash_from_scratch(&self) -> u64 {
        let mut hash = ZOBRIST_KEYS.to_move(self.to_move);
        if self.round == 1 {
            hash ^= ZOBRIST_KEYS.first_round();
        }
        for square in self.squares() {
            hash ^= ZOBRIST_KEYS.stack(square, &self[square]);
        }
        hash
    }

    pub fn squares(&self) -> impl Iterator<Item = Square> {
        (0..(S * S) as u8).map(Square)
    }

    /// The color of a piece placed this turn. In the first round, each player places the opponent's flat.
    pub fn color_to_place(&self) -> Color {
        if self.round == 1 {
            !self.to_move
        } else {
            self.to_move
        }
    }

    pub fn is_full(&self) -> bool {
        self.squares().all(|square| !self[square].is_empty())
    }

    /// Number of squares topped by one of `color`'s flats. Walls and capstones do not count.
    pub fn top_flat_count(&self, color: Color) -> u8 {
        self.squares()
            .filter(|square| {
                self[*square].top_stone() == Some(Piece::from_role_color(Flat, color))
            })
            .count() as u8
    }

    pub(crate) fn road_pieces(&self, color: Color) -> BitBoard {
        self.squares()
            .filter(|square| {
                self[*square]
                    .top_stone()
                    .is_some_and(|piece| piece.color() == color && piece.is_road_piece())
            })
            .fold(BitBoard::empty(), |board, square| board.set(square.0))
    }

    pub fn has_road(&self, color: Color) -> bool {
        let road_pieces = self.road_pieces(color);
        let full = BitBoard::full::<S>();
        let last = S as u8 - 1;
        let north_south = full.rank::<S>(0).flood_fill::<S>(road_pieces) & full.rank::<S>(last);
        let west_east = full.file::<S>(0).flood_fill::<S>(road_pieces) & full.file::<S>(last);
        !north_south.is_empty() || !west_east.is_empty()
    }

    pub fn status(&self) -> GameStatus {
        match (self.has_road(Color::White), self.has_road(Color::Black)) {
            // The player who just moved wins double roads
            (true, true) => {
                return GameStatus::finished((!self.to_move).into(), VictoryCondition::Road)
            }
            (true, false) => return GameStatus::finished(Winner::White, VictoryCondition::Road),
            (false, true) => return GameStatus::finished(Winner::Black, VictoryCondition::Road),
            (false, false) => (),
        }

        if self.white_reserves.is_exhausted()
            || self.black_reserves.is_exhausted()
            || self.is_full()
        {
            let white_flats = self.top_flat_count(Color::White);
            let black_flats = self.top_flat_count(Color::Black);
            let winner = match white_flats.cmp(&black_flats) {
                std::cmp::Ordering::Greater => Winner::White,
                std::cmp::Ordering::Less => Winner::Black,
                std::cmp::Ordering::Equal => Winner::Tie,
            };
            return GameStatus::finished(winner, VictoryCondition::Flat);
        }
        GameStatus::in_progress()
    }

    pub fn game_result(&self) -> Option<GameResult> {
        self.status().game_result()
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        self.validate(mv).is_ok()
    }

    pub fn validate(&self, mv: &Move) -> Result<(), MoveError> {
        match *mv {
            Move::Place(role, square) => {
                if !square.is_on_board::<S>() {
                    return Err(MoveError::OutOfBounds);
                }
                if !self[square].is_empty() {
                    return Err(MoveError::TargetOccupied);
                }
                if self.round == 1 && role != Flat {
                    return Err(MoveError::OpeningRestriction);
                }
                let reserves = self.reserves(self.color_to_place());
                let available = match role {
                    Flat | Wall => reserves.flats,
                    Cap => reserves.caps,
                };
                if available == 0 {
                    return Err(MoveError::NoPiecesLeft);
                }
                Ok(())
            }
            Move::Slide(origin, direction, slides) => {
                if self.round == 1 {
                    return Err(MoveError::OpeningRestriction);
                }
                if !origin.is_on_board::<S>() {
                    return Err(MoveError::OutOfBounds);
                }
                let stack = &self[origin];
                match stack.owner() {
                    None => return Err(MoveError::EmptySource),
                    Some(owner) if owner != self.to_move => return Err(MoveError::WrongOwner),
                    Some(_) => (),
                }
                if slides.range() == 0 {
                    return Err(MoveError::EmptySlide);
                }
                let pieces_taken = slides.pieces_taken();
                if pieces_taken > stack.len() {
                    return Err(MoveError::ExceedsStackHeight);
                }
                if pieces_taken as usize > S {
                    return Err(MoveError::ExceedsCarryLimit);
                }
                for i in 1..=slides.range() {
                    let square = origin
                        .jump_direction::<S>(direction, i)
                        .ok_or(MoveError::OutOfBounds)?;
                    match self[square].top_role() {
                        Some(Wall)
                            if i == slides.range()
                                && stack.top_role() == Some(Cap)
                                && slides.last_drop() == 1 => {}
                        Some(role) if role.is_blocking() => {
                            return Err(MoveError::BlockedByWallOrCap)
                        }
                        _ => (),
                    }
                }
                Ok(())
            }
        }
    }

    /// Plays a move, which must be legal, and returns what is needed to take it back
    pub fn execute(&mut self, mv: Move) -> ReverseMove {
        debug_assert!(
            self.is_legal(&mv),
            "Tried to play illegal move {:?} on\n{:?}",
            mv,
            self
        );
        let hash = self.hash;
        let mut replaced_top = None;

        match mv {
            Move::Place(role, square) => {
                let color = self.color_to_place();
                let reserves = self.reserves_mut(color);
                match role {
                    Flat | Wall => reserves.flats -= 1,
                    Cap => reserves.caps -= 1,
                }
                self[square].place(Piece::from_role_color(role, color));
                self.hash ^= ZOBRIST_KEYS.stack(square, &self[square]);
            }
            Move::Slide(origin, direction, slides) => {
                let range = slides.range();
                self.hash_slide_squares(origin, direction, range);

                let moving_role = self[origin].top_role().unwrap_or(Flat);
                let last_square = origin
                    .jump_direction::<S>(direction, range)
                    .unwrap_or(origin);
                replaced_top = self[last_square].top_role();

                // The top pieces travel the furthest
                for i in (1..=range).rev() {
                    let pieces = slides.drop_at(i - 1);
                    let owners = self[origin].take(pieces);
                    if let Some(square) = origin.jump_direction::<S>(direction, i) {
                        self[square].drop_pieces(pieces, owners, Flat);
                    }
                }
                self[last_square].set_top(Some(moving_role));

                self.hash_slide_squares(origin, direction, range);
            }
        }

        self.hash ^= ZOBRIST_KEYS.to_move(self.to_move);
        if self.to_move == Color::Black {
            if self.round == 1 {
                self.hash ^= ZOBRIST_KEYS.first_round();
            }
            self.round += 1;
        }
        self.to_move = !self.to_move;
        self.hash ^= ZOBRIST_KEYS.to_move(self.to_move);

        debug_assert_eq!(self.hash, self.zobrist_hash_from_scratch());

        ReverseMove {
            mv,
            replaced_top,
            hash,
        }
    }

    /// Takes back the move that produced `reverse_move`
    pub fn undo(&mut self, reverse_move: ReverseMove) {
        self.to_move = !self.to_move;
        if self.to_move == Color::Black {
            self.round -= 1;
        }

        match reverse_move.mv {
            Move::Place(role, square) => {
                let color = self[square].owner().unwrap_or(self.to_move);
                let reserves = self.reserves_mut(color);
                match role {
                    Flat | Wall => reserves.flats += 1,
                    Cap => reserves.caps += 1,
                }
                self[square] = Stack::new();
            }
            Move::Slide(origin, direction, slides) => {
                let range = slides.range();
                let last_square = origin
                    .jump_direction::<S>(direction, range)
                    .unwrap_or(origin);
                let moving_role = self[last_square].top_role();

                // The bottom carried pieces go back first
                for i in 1..=range {
                    let pieces = slides.drop_at(i - 1);
                    let Some(square) = origin.jump_direction::<S>(direction, i) else {
                        continue;
                    };
                    let owners = self[square].take(pieces);
                    if i == range && !self[square].is_empty() {
                        self[square].set_top(reverse_move.replaced_top);
                    }
                    self[origin].drop_pieces(pieces, owners, Flat);
                }
                self[origin].set_top(moving_role);
            }
        }

        self.hash = reverse_move.hash;
        debug_assert_eq!(self.hash, self.zobrist_hash_from_scratch());
    }

    /// Toggles the hash of every square a slide touches
    fn hash_slide_squares(&mut self, origin: Square, direction: Direction, range: u8) {
        for i in 0..=range {
            if let Some(square) = origin.jump_direction::<S>(direction, i) {
                self.hash ^= ZOBRIST_KEYS.stack(square, &self[square]);
            }
        }
    }
}
