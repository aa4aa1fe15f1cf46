use arrayvec::ArrayVec;

use crate::position::move_table::{Reach, MOVE_TABLE};
use crate::position::mv::{Move, Slides};
use crate::position::utils::Direction::{East, North, South, West};
use crate::position::utils::Role::{Cap, Flat, Wall};
use crate::position::utils::{Direction, Square};
use crate::position::Board;

impl<const S: usize> Board<S> {
    /// Lazily generates every legal move, square by square.
    /// Placements come before slides on the same square.
    pub fn legal_moves(&self) -> MoveIter<'_, S> {
        MoveIter::new(self)
    }

    pub fn generate_moves(&self, moves: &mut Vec<Move>) {
        moves.extend(self.legal_moves())
    }

    /// How far the stack on `origin` can slide towards `direction`
    pub fn reach(&self, origin: Square, direction: Direction) -> Reach {
        let mut free = 0;
        let mut square = origin;
        while let Some(next) = square.go_direction::<S>(direction) {
            match self[next].top_role() {
                Some(Wall) => {
                    return Reach {
                        free,
                        flatten: self[origin].top_role() == Some(Cap),
                    }
                }
                Some(Cap) => return Reach { free, flatten: false },
                Some(Flat) | None => {
                    free += 1;
                    square = next;
                }
            }
        }
        Reach {
            free,
            flatten: false,
        }
    }

    /// Number of move sequences of length `depth`. Decided games are not cut short.
    pub fn perft(&mut self, depth: u16) -> u64 {
        if depth == 0 {
            1
        } else if depth == 1 {
            self.legal_moves().count() as u64
        } else {
            let moves: Vec<Move> = self.legal_moves().collect();
            moves
                .into_iter()
                .map(|mv| {
                    let reverse_move = self.execute(mv);
                    let num_moves = self.perft(depth - 1);
                    self.undo(reverse_move);
                    num_moves
                })
                .sum()
        }
    }
}

/// A lazy sequence of legal moves. It borrows the board, which cannot change while moves are generated.
pub struct MoveIter<'a, const S: usize> {
    board: &'a Board<S>,
    next_square: u8,
    origin: Square,
    placements: ArrayVec<Move, 3>,
    directions: ArrayVec<Direction, 4>,
    direction: Direction,
    slides: std::slice::Iter<'static, Slides>,
}

impl<'a, const S: usize> MoveIter<'a, S> {
    fn new(board: &'a Board<S>) -> Self {
        let no_slides: &'static [Slides] = &[];
        MoveIter {
            board,
            next_square: 0,
            origin: Square(0),
            placements: ArrayVec::new(),
            directions: ArrayVec::new(),
            direction: North,
            slides: no_slides.iter(),
        }
    }

    /// Queues up the moves starting on `square`
    fn expand(&mut self, square: Square) {
        let stack = &self.board[square];
        if stack.is_empty() {
            let reserves = self.board.reserves(self.board.color_to_place());
            let opening = self.board.round() == 1;
            // Popped from the back, so that flats come first
            if reserves.caps > 0 && !opening {
                self.placements.push(Move::Place(Cap, square));
            }
            if reserves.flats > 0 {
                if !opening {
                    self.placements.push(Move::Place(Wall, square));
                }
                self.placements.push(Move::Place(Flat, square));
            }
        } else if stack.owner() == Some(self.board.side_to_move()) && self.board.round() > 1 {
            self.origin = square;
            self.directions.extend([South, East, West, North]);
        }
    }
}

impl<const S: usize> Iterator for MoveIter<'_, S> {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        loop {
            if let Some(slides) = self.slides.next() {
                return Some(Move::Slide(self.origin, self.direction, *slides));
            }
            if let Some(mv) = self.placements.pop() {
                return Some(mv);
            }
            if let Some(direction) = self.directions.pop() {
                let carry = self.board[self.origin].len().min(S as u8);
                let reach = self.board.reach(self.origin, direction);
                self.direction = direction;
                self.slides = MOVE_TABLE.slides(carry, reach).iter();
                continue;
            }
            if self.next_square as usize >= S * S {
                return None;
            }
            let square = Square(self.next_square);
            self.next_square += 1;
            self.expand(square);
        }
    }
}

impl<const S: usize> std::iter::FusedIterator for MoveIter<'_, S> {}
