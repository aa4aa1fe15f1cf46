//! Static evaluation of positions. The search only needs the `Evaluator` trait,
//! and any implementation can be plugged into it.

use board_game_traits::Color;

use crate::position::Board;

pub mod value_eval;

pub use value_eval::{FlatCountEval, PositionalEval};

pub type Score = i32;

/// A heuristic scoring function for the search.
///
/// Scores are from `color`'s point of view. Heuristic scores must lie strictly between
/// `LOSS` and `WIN`, and there must be room for proven wins and losses adjusted by the
/// remaining search depth between `WIN` and `MAX`. `LOSS` must be `-WIN`, and `MIN` must be `-MAX`.
pub trait Evaluator {
    const MIN: Score;
    const LOSS: Score;
    const WIN: Score;
    const MAX: Score;

    fn eval<const S: usize>(&self, board: &Board<S>, color: Color) -> Score;
}
