use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::position::move_table::{MAX_RANGE, MOVE_TABLE};
use crate::position::utils::Role::{Cap, Flat, Wall};
use crate::position::{Board, Direction, Move, Reach};
use crate::tests::{do_moves_and_check_validity, random_position};

fn perft_check_answers<const S: usize>(board: &mut Board<S>, answers: &[u64]) {
    for (depth, &answer) in answers.iter().enumerate() {
        assert_eq!(
            board.perft(depth as u16),
            answer,
            "Wrong perft result at depth {} on\n{:?}",
            depth,
            board
        );
    }
}

#[test]
fn start_board_move_gen_test() {
    start_board_move_gen_prop::<3>();
    start_board_move_gen_prop::<4>();
    start_board_move_gen_prop::<5>();
    start_board_move_gen_prop::<6>();
    start_board_move_gen_prop::<7>();
    start_board_move_gen_prop::<8>();
}

fn start_board_move_gen_prop<const S: usize>() {
    let mut board = <Board<S>>::default();
    let moves: Vec<Move> = board.legal_moves().collect();
    assert_eq!(moves.len(), S * S);
    assert!(moves
        .iter()
        .all(|mv| matches!(mv, Move::Place(Flat, _))));
    for mv in moves {
        let reverse_move = board.execute(mv);
        assert_eq!(board.legal_moves().count(), S * S - 1);
        board.undo(reverse_move);
    }
}

#[test]
fn start_position_perft_5s_test() {
    let mut board = <Board<5>>::default();
    perft_check_answers(&mut board, &[1, 25, 600, 43_320]);
}

#[test]
fn start_position_perft_6s_test() {
    let mut board = <Board<6>>::default();
    perft_check_answers(&mut board, &[1, 36, 1_260, 132_720]);
}

#[test]
fn perft_5s_test() {
    let mut board = <Board<5>>::default();
    do_moves_and_check_validity(&mut board, &["d3", "c3", "c4", "1d3<", "1c4-", "Sc4"]);
    perft_check_answers(&mut board, &[1, 87, 6_155]);
}

#[test]
fn perft_5s_tall_stacks_test() {
    let mut board = <Board<5>>::default();
    do_moves_and_check_validity(
        &mut board,
        &[
            "c2", "c3", "d3", "b3", "c4", "1c2+", "1d3<", "1b3>", "1c4-", "Cc2", "a1", "1c2+", "a2",
        ],
    );
    perft_check_answers(&mut board, &[1, 104, 7_743]);
}

#[test]
fn perft_5s_suicide_test() {
    let move_strings = [
        "c4", "c2", "d2", "c3", "b2", "d3", "1d2+", "b3", "d2", "b4", "1c2+", "1b3>", "2d3<",
        "1c4-", "d4", "5c3<23", "c2", "c4", "1d4<", "d3", "1d2+", "1c3+", "Cc3", "2c4>", "1c3<",
        "d2", "c3", "1d2+", "1c3+", "1b4>", "2b3>11", "3c4-12", "d2", "c4", "b4", "c5", "1b3>",
        "1c4<", "3c3-", "e5", "e2",
    ];
    let mut board = <Board<5>>::default();
    do_moves_and_check_validity(&mut board, &move_strings);
    perft_check_answers(&mut board, &[1, 85, 11_206]);
}

#[test]
fn perft_6s_endgame_test() {
    let mut board = <Board<6>>::from_tps(
        "2,2,21S,2,2,2/2,x,222221,2,2,x/1,1,2221C,x,111112C,2S/x,1,2S,x2,121211212/1,1,1212S,1S,2,1S/x2,2,1,21,1 1 42",
    )
    .unwrap();
    perft_check_answers(&mut board, &[1, 140, 21_413]);
}

#[test]
fn capstone_moves_test() {
    let mut board = <Board<5>>::default();
    do_moves_and_check_validity(&mut board, &["a1", "e5", "Cc3", "Sd3"]);
    let moves: HashSet<String> = board
        .legal_moves()
        .map(|mv| mv.to_string::<5>())
        .collect();
    for expected in ["c3+", "c3-", "c3<", "c3>"] {
        assert!(moves.contains(expected), "Missing {} in {:?}", expected, moves);
    }
    // No capstones left to place
    assert!(!moves.iter().any(|mv| mv.starts_with('C')));
}

#[test]
fn lazy_generation_test() {
    let board = <Board<5>>::from_tps("x5/x5/x,1,2,x2/x5/x5 1 3").unwrap();
    let mut iter = board.legal_moves();
    // The first empty square yields its placements, flats first
    assert_eq!(iter.next(), Some(Move::from_string::<5>("a1").unwrap()));
    assert_eq!(iter.next(), Some(Move::from_string::<5>("Sa1").unwrap()));
    assert_eq!(iter.next(), Some(Move::from_string::<5>("Ca1").unwrap()));
    let rest: Vec<Move> = iter.collect();
    let mut moves = vec![];
    board.generate_moves(&mut moves);
    assert_eq!(rest.len() + 3, moves.len());
    assert_eq!(&moves[3..], &rest[..]);
    // 23 empty squares, three placements each, and four slides
    assert_eq!(moves.len(), 23 * 3 + 4);
}

#[test]
fn reach_test() {
    let board = <Board<5>>::from_tps("x5/x,2S,x3/x,1C,x,2,x/x5/x,2C,x3 1 4").unwrap();
    let b3 = crate::position::Square::parse_square::<5>("b3").unwrap();
    assert_eq!(board.reach(b3, Direction::North), Reach { free: 0, flatten: true });
    assert_eq!(board.reach(b3, Direction::East), Reach { free: 3, flatten: false });
    assert_eq!(board.reach(b3, Direction::West), Reach { free: 1, flatten: false });
    assert_eq!(board.reach(b3, Direction::South), Reach { free: 1, flatten: false });
}

#[test]
fn moves_are_unique_and_legal_test() {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        moves_are_unique_and_legal_prop::<3>(&random_position(&mut rng, 30));
        moves_are_unique_and_legal_prop::<4>(&random_position(&mut rng, 40));
        moves_are_unique_and_legal_prop::<5>(&random_position(&mut rng, 60));
        moves_are_unique_and_legal_prop::<6>(&random_position(&mut rng, 60));
        moves_are_unique_and_legal_prop::<7>(&random_position(&mut rng, 80));
        moves_are_unique_and_legal_prop::<8>(&random_position(&mut rng, 80));
    }
}

/// Checks the generator against the validator, by validating every conceivable move
fn moves_are_unique_and_legal_prop<const S: usize>(board: &Board<S>) {
    let generated: Vec<Move> = board.legal_moves().collect();
    let unique: HashSet<Move> = generated.iter().copied().collect();
    assert_eq!(
        unique.len(),
        generated.len(),
        "Duplicate moves generated on\n{:?}",
        board
    );

    let mut candidates = vec![];
    let every_slide = MOVE_TABLE.slides(
        8,
        Reach {
            free: MAX_RANGE as u8,
            flatten: false,
        },
    );
    for square in board.squares() {
        for role in [Flat, Wall, Cap] {
            candidates.push(Move::Place(role, square));
        }
        for direction in Direction::ALL {
            for slides in every_slide {
                candidates.push(Move::Slide(square, direction, *slides));
            }
        }
    }
    let valid: HashSet<Move> = candidates
        .into_iter()
        .filter(|mv| board.validate(mv).is_ok())
        .collect();

    if board.status().over {
        return;
    }
    assert_eq!(
        unique,
        valid,
        "Generated moves differ from valid moves on\n{:?}",
        board
    );
}

#[test]
fn execute_undo_random_games_test() {
    execute_undo_random_games_prop::<3>();
    execute_undo_random_games_prop::<4>();
    execute_undo_random_games_prop::<5>();
    execute_undo_random_games_prop::<6>();
    execute_undo_random_games_prop::<7>();
    execute_undo_random_games_prop::<8>();
}

fn execute_undo_random_games_prop<const S: usize>() {
    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let mut board = <Board<S>>::default();
        let mut moves = vec![];
        for _ in 0..200 {
            if board.status().over {
                break;
            }
            moves.clear();
            board.generate_moves(&mut moves);
            for mv in moves.iter() {
                let before = board.clone();
                let reverse_move = board.execute(*mv);
                assert_eq!(board.zobrist_hash(), board.zobrist_hash_from_scratch());
                assert_ne!(board.zobrist_hash(), before.zobrist_hash());
                board.undo(reverse_move);
                assert_eq!(
                    board,
                    before,
                    "Undoing {} did not restore the board",
                    mv.to_string::<S>()
                );
            }
            let mv = *moves.choose(&mut rng).unwrap();
            board.execute(mv);
        }
    }
}

#[test]
fn random_games_end_test() {
    let mut rng = rand::thread_rng();
    let mut finished = 0;
    for _ in 0..200 {
        let board: Board<4> = random_position(&mut rng, 1_000);
        let status = board.status();
        if status.over {
            finished += 1;
            assert!(status.condition.is_some());
        }
    }
    assert_eq!(finished, 200);
}
