#[cfg(test)]
mod board_tests;
#[cfg(test)]
mod move_gen_tests;

#[cfg(test)]
use crate::position::{Board, Move};
#[cfg(test)]
use rand::seq::SliceRandom;
#[cfg(test)]
use rand::Rng;

#[cfg(test)]
fn do_moves_and_check_validity<const S: usize>(board: &mut Board<S>, move_strings: &[&str]) {
    for move_string in move_strings.iter() {
        let mv = Move::from_string::<S>(move_string).unwrap();
        let moves: Vec<Move> = board.legal_moves().collect();
        assert!(
            moves.contains(&mv),
            "Move {} was not among legal moves: {:?}\n{:?}",
            mv.to_string::<S>(),
            moves,
            board
        );
        assert_eq!(board.validate(&mv), Ok(()));
        board.execute(mv);
    }
}

/// Plays up to `plies` random moves, stopping early if the game ends
#[cfg(test)]
fn random_position<const S: usize, R: Rng>(rng: &mut R, plies: usize) -> Board<S> {
    let mut board = <Board<S>>::default();
    let mut moves = vec![];
    for _ in 0..plies {
        if board.status().over {
            break;
        }
        moves.clear();
        board.generate_moves(&mut moves);
        let mv = *moves.choose(rng).unwrap();
        board.execute(mv);
    }
    board
}
