use board_game_traits::Color;

use crate::evaluation::{Evaluator, Score};
use crate::position::utils::Role::{Cap, Flat};
use crate::position::{Board, Square};

/// The difference in top flats. Mostly useful for testing, since it is fast and easy to reason about.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatCountEval;

impl Evaluator for FlatCountEval {
    const MIN: Score = -(1 << 30);
    const LOSS: Score = -(1 << 29);
    const WIN: Score = 1 << 29;
    const MAX: Score = 1 << 30;

    fn eval<const S: usize>(&self, board: &Board<S>, color: Color) -> Score {
        board.top_flat_count(color) as Score - board.top_flat_count(!color) as Score
    }
}

/// Material and connectivity evaluation
#[derive(Clone, Copy, Debug)]
pub struct PositionalEval {
    pub top_flat: Score,
    pub buried_flat: Score,
    pub cap: Score,
    pub captive: Score,
}

impl Default for PositionalEval {
    fn default() -> Self {
        PositionalEval {
            top_flat: 400,
            buried_flat: 100,
            cap: 50,
            captive: 25,
        }
    }
}

impl PositionalEval {
    fn eval_player<const S: usize>(&self, board: &Board<S>, color: Color) -> Score {
        let mut top_flats = 0;
        let mut adjacent_flats = 0;
        let mut buried_flats = 0;
        let mut caps = 0;
        let mut captives = 0;

        let is_own_flat = |square: Square| {
            let stack = board[square];
            stack.top_role() == Some(Flat) && stack.owner() == Some(color)
        };

        for square in board.squares() {
            let stack = board[square];
            if stack.owner() != Some(color) {
                continue;
            }
            match stack.top_role() {
                Some(Flat) => {
                    top_flats += 1;
                    adjacent_flats += square
                        .neighbours::<S>()
                        .filter(|neighbour| is_own_flat(*neighbour))
                        .count() as Score;
                    for owner in (1..stack.len()).filter_map(|i| stack.get(i)) {
                        if owner == color {
                            buried_flats += 1;
                        } else {
                            captives += 1;
                        }
                    }
                }
                Some(Cap) => caps += 1,
                _ => (),
            }
        }

        (top_flats + adjacent_flats) * self.top_flat
            + buried_flats * self.buried_flat
            + caps * self.cap
            + captives * self.captive
    }
}

impl Evaluator for PositionalEval {
    const MIN: Score = -(1 << 30);
    const LOSS: Score = -(1 << 29);
    const WIN: Score = 1 << 29;
    const MAX: Score = 1 << 30;

    fn eval<const S: usize>(&self, board: &Board<S>, color: Color) -> Score {
        self.eval_player(board, color) - self.eval_player(board, !color)
    }
}
