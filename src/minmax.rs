//! A very simple implementation of alpha-beta search, without transposition table or move ordering.
//! This is not used by the engine, it is here to check the main search against.

use crate::evaluation::{Evaluator, Score};
use crate::position::{Board, Move};
use crate::search::terminal_score;

/// Value of the position for the side to move, searching exactly `depth` plies deep
pub fn alpha_beta<E: Evaluator, const S: usize>(
    board: &mut Board<S>,
    evaluator: &E,
    depth: u16,
    mut alpha: Score,
    beta: Score,
) -> Score {
    let status = board.status();
    if status.over {
        return terminal_score::<E>(status, board.side_to_move(), depth);
    }
    if depth == 0 {
        return evaluator.eval(board, board.side_to_move());
    }
    let moves: Vec<Move> = board.legal_moves().collect();
    let mut best_score = E::MIN;
    for mv in moves {
        let reverse_move = board.execute(mv);
        let score = -alpha_beta(board, evaluator, depth - 1, -beta, -alpha);
        board.undo(reverse_move);
        best_score = best_score.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best_score
}

/// Exact value of the position, and the first move that achieves it
pub fn minmax<E: Evaluator, const S: usize>(
    board: &mut Board<S>,
    evaluator: &E,
    depth: u16,
) -> (Score, Option<Move>) {
    let status = board.status();
    if status.over || depth == 0 {
        return (alpha_beta(board, evaluator, depth, E::MIN, E::MAX), None);
    }
    let moves: Vec<Move> = board.legal_moves().collect();
    let mut best = (E::MIN, None);
    for mv in moves {
        let reverse_move = board.execute(mv);
        let score = -alpha_beta(board, evaluator, depth - 1, E::MIN, E::MAX);
        board.undo(reverse_move);
        if best.1.is_none() || score > best.0 {
            best = (score, Some(mv));
        }
    }
    best
}
