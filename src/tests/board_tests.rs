use board_game_traits::{Color, GameResult};

use crate::position::utils::Role::{Cap, Flat, Wall};
use crate::position::{
    Board, Direction, GameStatus, Move, MoveError, Reserves, Slides, Square, VictoryCondition,
    Winner,
};
use crate::tests::do_moves_and_check_validity;

#[test]
fn default_board_test() {
    let board = <Board<5>>::default();
    for square in board.squares() {
        assert!(board[square].is_empty());
    }
    assert_eq!(board.side_to_move(), Color::White);
    assert_eq!(board.round(), 1);
    assert_eq!(board.reserves(Color::White), Reserves { flats: 21, caps: 1 });
    assert_eq!(board.reserves(Color::Black), Reserves { flats: 21, caps: 1 });
    assert_eq!(board.status(), GameStatus::in_progress());
    assert_eq!(board.game_result(), None);
}

#[test]
fn starting_reserves_test() {
    assert_eq!(<Board<3>>::default().reserves(Color::White), Reserves { flats: 10, caps: 0 });
    assert_eq!(<Board<4>>::default().reserves(Color::White), Reserves { flats: 15, caps: 0 });
    assert_eq!(<Board<6>>::default().reserves(Color::White), Reserves { flats: 30, caps: 1 });
    assert_eq!(<Board<7>>::default().reserves(Color::Black), Reserves { flats: 40, caps: 2 });
    assert_eq!(<Board<8>>::default().reserves(Color::Black), Reserves { flats: 50, caps: 2 });
}

#[test]
fn first_round_places_opponents_flat_test() {
    let mut board = <Board<5>>::default();
    do_moves_and_check_validity(&mut board, &["a1"]);
    let a1 = Square::parse_square::<5>("a1").unwrap();
    assert_eq!(board[a1].owner(), Some(Color::Black));
    assert_eq!(board.reserves(Color::Black).flats, 20);
    assert_eq!(board.reserves(Color::White).flats, 21);
    assert_eq!(board.round(), 1);

    do_moves_and_check_validity(&mut board, &["e5"]);
    let e5 = Square::parse_square::<5>("e5").unwrap();
    assert_eq!(board[e5].owner(), Some(Color::White));
    assert_eq!(board.reserves(Color::White).flats, 20);
    assert_eq!(board.round(), 2);
    assert_eq!(board.side_to_move(), Color::White);
    assert_eq!(board.color_to_place(), Color::White);
}

#[test]
fn first_round_restrictions_test() {
    let mut board = <Board<5>>::default();
    let c3 = Square::parse_square::<5>("c3").unwrap();
    assert_eq!(
        board.validate(&Move::Place(Wall, c3)),
        Err(MoveError::OpeningRestriction)
    );
    assert_eq!(
        board.validate(&Move::Place(Cap, c3)),
        Err(MoveError::OpeningRestriction)
    );
    do_moves_and_check_validity(&mut board, &["c3"]);
    // Black cannot move the stone it did not place, nor the one white placed for it
    let slide = Move::Slide(c3, Direction::North, Slides::from_drops(&[1]).unwrap());
    assert_eq!(board.validate(&slide), Err(MoveError::OpeningRestriction));
    assert_eq!(
        board.validate(&Move::Place(Flat, c3)),
        Err(MoveError::TargetOccupied)
    );
}

#[test]
fn white_road_test() {
    let mut board = <Board<3>>::default();
    do_moves_and_check_validity(&mut board, &["c1", "a1", "a2", "c2"]);
    assert_eq!(board.status(), GameStatus::in_progress());
    do_moves_and_check_validity(&mut board, &["a3"]);
    assert!(board.has_road(Color::White));
    assert!(!board.has_road(Color::Black));
    let status = board.status();
    assert!(status.over);
    assert_eq!(status.winner, Winner::White);
    assert_eq!(status.condition, Some(VictoryCondition::Road));
    assert_eq!(board.game_result(), Some(GameResult::WhiteWin));
}

#[test]
fn black_road_test() {
    let mut board = <Board<5>>::default();
    do_moves_and_check_validity(
        &mut board,
        &["a1", "e5", "d4", "b1", "d3", "c1", "a4", "d1", "a3"],
    );
    assert!(!board.status().over);
    do_moves_and_check_validity(&mut board, &["e1"]);
    assert_eq!(board.game_result(), Some(GameResult::BlackWin));
}

#[test]
fn walls_are_not_road_pieces_test() {
    let mut board = <Board<3>>::default();
    do_moves_and_check_validity(&mut board, &["c1", "a1", "Sa2", "c2", "a3"]);
    assert!(!board.has_road(Color::White));
    assert!(!board.status().over);
}

#[test]
fn capstones_are_road_pieces_test() {
    let board = <Board<5>>::from_tps("x5/x5/1,1,1C,1,1/x5/2,2,x3 2 6").unwrap();
    assert!(board.has_road(Color::White));
    assert_eq!(board.status().winner, Winner::White);
}

#[test]
fn winding_road_test() {
    let board = <Board<5>>::from_tps("x5/1,1,x3/x,1,1,1,x/x3,1,1/2,2,2,2,x 2 9").unwrap();
    assert!(board.has_road(Color::White));
    assert!(!board.has_road(Color::Black));
}

#[test]
fn double_road_goes_to_mover_test() {
    // Black just moved
    let board = <Board<3>>::from_tps("1,1,1/x,x,x/2,2,2 1 4").unwrap();
    let status = board.status();
    assert_eq!(status.winner, Winner::Black);
    assert_eq!(status.condition, Some(VictoryCondition::Road));

    // White just moved
    let board = <Board<3>>::from_tps("1,1,1/x,x,x/2,2,2 2 4").unwrap();
    assert_eq!(board.status().winner, Winner::White);
}

#[test]
fn flat_win_on_full_board_test() {
    let board = <Board<3>>::from_tps("1,1,2/2,1,2/1,2,1 2 5").unwrap();
    assert!(board.is_full());
    let status = board.status();
    assert!(status.over);
    assert_eq!(status.winner, Winner::White);
    assert_eq!(status.condition, Some(VictoryCondition::Flat));
}

#[test]
fn tie_on_full_board_test() {
    let board = <Board<3>>::from_tps("1,2,1/2,1,2/2,1,2S 1 5").unwrap();
    assert_eq!(board.top_flat_count(Color::White), 4);
    assert_eq!(board.top_flat_count(Color::Black), 4);
    let status = board.status();
    assert!(status.over);
    assert_eq!(status.winner, Winner::Tie);
    assert_eq!(board.game_result(), Some(GameResult::Draw));
}

#[test]
fn flat_win_on_exhausted_reserves_test() {
    let board = <Board<3>>::from_tps("1111111111,x,x/x,x,x/2,x,2 2 10").unwrap();
    assert!(board.reserves(Color::White).is_exhausted());
    let status = board.status();
    assert!(status.over);
    assert_eq!(status.winner, Winner::Black);
    assert_eq!(status.condition, Some(VictoryCondition::Flat));
}

#[test]
fn capstone_flattens_wall_test() {
    let mut board = <Board<5>>::from_tps("x5/x5/x,1C,2S,x2/x5/x5 1 3").unwrap();
    let original = board.clone();
    let mv = Move::from_string::<5>("b3>").unwrap();
    assert_eq!(board.validate(&mv), Ok(()));
    assert!(board.legal_moves().any(|legal| legal == mv));

    let reverse_move = board.execute(mv);
    let c3 = Square::parse_square::<5>("c3").unwrap();
    assert_eq!(board[c3].len(), 2);
    assert_eq!(board[c3].top_role(), Some(Cap));
    assert_eq!(board[c3].owner(), Some(Color::White));
    assert_eq!(board[c3].get(1), Some(Color::Black));
    assert_eq!(board[c3].to_string(), "21C");

    board.undo(reverse_move);
    assert_eq!(board, original);
    assert_eq!(board[c3].top_role(), Some(Wall));
}

#[test]
fn only_lone_capstone_flattens_test() {
    let board = <Board<5>>::from_tps("x5/x5/x,21C,2S,x2/x5/x5 1 3").unwrap();
    let blocked = Move::from_string::<5>("2b3>").unwrap();
    assert_eq!(board.validate(&blocked), Err(MoveError::BlockedByWallOrCap));

    let board = <Board<5>>::from_tps("x5/x5/x,1,2S,x2/x5/x5 1 3").unwrap();
    let blocked = Move::from_string::<5>("b3>").unwrap();
    assert_eq!(board.validate(&blocked), Err(MoveError::BlockedByWallOrCap));

    let board = <Board<5>>::from_tps("x5/x5/x,1C,2C,x2/x5/x5 1 3").unwrap();
    let blocked = Move::from_string::<5>("b3>").unwrap();
    assert_eq!(board.validate(&blocked), Err(MoveError::BlockedByWallOrCap));
}

#[test]
fn capstone_flattens_after_dropping_test() {
    let mut board = <Board<5>>::from_tps("x5/x5/121C,x,2S,x2/x5/x5 1 5").unwrap();
    let mv = Move::from_string::<5>("2a3>11").unwrap();
    assert_eq!(board.validate(&mv), Ok(()));
    let original = board.clone();
    let reverse_move = board.execute(mv);
    assert_eq!(board.to_tps(), "[TPS \"x5/x5/1,2,21C,x2/x5/x5 2 5\"]");
    board.undo(reverse_move);
    assert_eq!(board, original);
}

#[test]
fn move_errors_test() {
    let board = <Board<5>>::from_tps("x5/x5/x,2,1,x2/x5/x4,1 1 3").unwrap();
    let b3 = Square::parse_square::<5>("b3").unwrap();
    let c3 = Square::parse_square::<5>("c3").unwrap();
    let e1 = Square::parse_square::<5>("e1").unwrap();
    let one = Slides::from_drops(&[1]).unwrap();

    assert_eq!(
        board.validate(&Move::Slide(b3, Direction::North, one)),
        Err(MoveError::WrongOwner)
    );
    assert_eq!(
        board.validate(&Move::Slide(Square(0), Direction::North, one)),
        Err(MoveError::EmptySource)
    );
    assert_eq!(
        board.validate(&Move::Slide(e1, Direction::East, one)),
        Err(MoveError::OutOfBounds)
    );
    assert_eq!(
        board.validate(&Move::Slide(e1, Direction::South, one)),
        Err(MoveError::OutOfBounds)
    );
    assert_eq!(
        board.validate(&Move::Place(Flat, Square(25))),
        Err(MoveError::OutOfBounds)
    );
    assert_eq!(
        board.validate(&Move::Slide(c3, Direction::West, Slides::from_drops(&[2]).unwrap())),
        Err(MoveError::ExceedsStackHeight)
    );
    assert_eq!(
        board.validate(&Move::Slide(c3, Direction::West, Slides::default())),
        Err(MoveError::EmptySlide)
    );
    assert_eq!(
        board.validate(&Move::Place(Wall, b3)),
        Err(MoveError::TargetOccupied)
    );
    assert_eq!(board.validate(&Move::Slide(c3, Direction::West, one)), Ok(()));
    assert_eq!(board.validate(&Move::Place(Cap, Square(0))), Ok(()));
}

#[test]
fn carry_limit_test() {
    let board = <Board<3>>::from_tps("x,x,x/x,x,x/11111,x,2 1 6").unwrap();
    let a1 = Square::parse_square::<3>("a1").unwrap();
    let too_many = Move::Slide(a1, Direction::North, Slides::from_drops(&[2, 2]).unwrap());
    assert_eq!(board.validate(&too_many), Err(MoveError::ExceedsCarryLimit));
    let just_enough = Move::Slide(a1, Direction::North, Slides::from_drops(&[2, 1]).unwrap());
    assert_eq!(board.validate(&just_enough), Ok(()));
}

#[test]
fn no_pieces_left_test() {
    let board = <Board<4>>::from_tps("x4/x4/x4/1,2,x2 1 2").unwrap();
    assert_eq!(
        board.validate(&Move::Place(Cap, Square(5))),
        Err(MoveError::NoPiecesLeft)
    );

    let board = <Board<5>>::from_tps("x5/x5/x5/x5/1C,2,x3 1 2").unwrap();
    assert_eq!(
        board.validate(&Move::Place(Cap, Square(5))),
        Err(MoveError::NoPiecesLeft)
    );
    assert_eq!(board.validate(&Move::Place(Wall, Square(5))), Ok(()));
}

#[test]
fn move_error_display_test() {
    assert_eq!(
        MoveError::OpeningRestriction.to_string(),
        "Illegal move: only flat placements are allowed in the first round"
    );
}

#[test]
fn execute_undo_restores_reserves_test() {
    let mut board = <Board<5>>::default();
    do_moves_and_check_validity(&mut board, &["a1", "e5", "Cc3"]);
    assert_eq!(board.reserves(Color::White), Reserves { flats: 20, caps: 0 });

    let mut board = <Board<5>>::default();
    let mv = Move::from_string::<5>("a1").unwrap();
    let reverse_move = board.execute(mv);
    assert_eq!(reverse_move.mv(), mv);
    board.undo(reverse_move);
    assert_eq!(board, <Board<5>>::default());
    assert_eq!(board.reserves(Color::Black).flats, 21);
}

#[test]
fn transposition_hash_test() {
    let mut board1 = <Board<5>>::default();
    do_moves_and_check_validity(&mut board1, &["a1", "e5", "c3", "c4", "d3", "b4"]);
    let mut board2 = <Board<5>>::default();
    do_moves_and_check_validity(&mut board2, &["a1", "e5", "d3", "b4", "c3", "c4"]);
    assert_eq!(board1, board2);
    assert_eq!(board1.zobrist_hash(), board2.zobrist_hash());

    let mut board3 = <Board<5>>::default();
    do_moves_and_check_validity(&mut board3, &["a1", "e5", "c4", "c3", "d3", "b4"]);
    assert_ne!(board1.zobrist_hash(), board3.zobrist_hash());
}

#[test]
fn side_to_move_changes_hash_test() {
    let white = <Board<5>>::from_tps("x5/x5/x,2,1,x2/x5/x5 1 3").unwrap();
    let black = <Board<5>>::from_tps("x5/x5/x,2,1,x2/x5/x5 2 3").unwrap();
    assert_ne!(white.zobrist_hash(), black.zobrist_hash());
    assert_eq!(white.zobrist_hash(), white.zobrist_hash_from_scratch());
}

#[test]
fn stack_taller_than_64_pieces_test() {
    let tps = format!(
        "x8/x8/x8/x3,{},x4/x3,12,x4/x8/x8/x8 2 40",
        "12".repeat(35)
    );
    let board = <Board<8>>::from_tps(&tps).unwrap();
    let d5 = Square::parse_square::<8>("d5").unwrap();
    assert_eq!(board[d5].len(), 70);
    assert_eq!(board[d5].top_role(), Some(Flat));
    assert_eq!(board[d5].owner(), Some(Color::Black));
    assert_eq!(board.zobrist_hash(), board.zobrist_hash_from_scratch());
    assert_eq!(<Board<8>>::from_tps(&board.to_tps()).unwrap(), board);

    for (move_string, d5_height) in [("8d5>", 62), ("8d5>1133", 62), ("8d5-", 62), ("2d4+", 72)] {
        let mut after = board.clone();
        let mv = Move::from_string::<8>(move_string).unwrap();
        assert_eq!(after.validate(&mv), Ok(()), "{} should be legal", move_string);
        let reverse_move = after.execute(mv);

        assert_eq!(after[d5].len(), d5_height, "after {}", move_string);
        assert_eq!(after.zobrist_hash(), after.zobrist_hash_from_scratch());
        assert_ne!(after.zobrist_hash(), board.zobrist_hash());
        assert_eq!(<Board<8>>::from_tps(&after.to_tps()).unwrap(), after);

        after.undo(reverse_move);
        assert_eq!(after, board, "undoing {} did not restore the board", move_string);
        assert_eq!(after.zobrist_hash(), board.zobrist_hash());
    }
}
