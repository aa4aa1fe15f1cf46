use std::fmt::Write;

use board_game_traits::Color;

use crate::position::utils::Role::{Cap, Flat, Wall};
use crate::position::utils::{Piece, Square, Stack};
use crate::position::utils::color_bit;
use crate::position::{starting_capstones, starting_stones, Board};

impl<const S: usize> Board<S> {
    /// Parses a position in Tak Positional System notation. The `[TPS "..."]` tag around it is optional.
    pub fn from_tps(tps: &str) -> Result<Self, pgn_traits::Error> {
        let inner = tps.trim();
        let inner = inner
            .strip_prefix("[TPS")
            .and_then(|rest| rest.strip_suffix(']'))
            .map(|rest| rest.trim().trim_matches('"'))
            .unwrap_or(inner);

        let tps_words: Vec<&str> = inner.split_whitespace().collect();
        if tps_words.len() < 3 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse TPS string \"{}\", missing move counter.",
                tps
            )));
        }
        if tps_words.len() > 3 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse TPS string \"{}\", unexpected \"{}\"",
                tps, tps_words[3]
            )));
        }

        let tps_rows: Vec<&str> = tps_words[0].split('/').collect();
        if tps_rows.len() != S {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse TPS string \"{}\", had {} rows instead of {}.",
                tps,
                tps_rows.len(),
                S
            )));
        }

        let mut board = Board::default();
        // The first row is the northernmost
        for (i, row) in tps_rows.into_iter().enumerate() {
            let stacks = parse_row::<S>(row).map_err(|e| {
                pgn_traits::Error::new_caused_by(
                    pgn_traits::ErrorKind::ParseError,
                    format!("Couldn't parse TPS string \"{}\"", tps),
                    e,
                )
            })?;
            let rank = (S - 1 - i) as u8;
            for (file, stack) in stacks.into_iter().enumerate() {
                board[Square::from_rank_file::<S>(rank, file as u8)] = stack;
            }
        }

        for color in [Color::White, Color::Black] {
            let mut reserves = board.reserves(color);
            for square in board.squares() {
                let stack = board[square];
                let pieces = stack.count(color);
                let caps = (stack.top_stone() == Some(Piece::from_role_color(Cap, color))) as u8;
                reserves.caps = reserves.caps.checked_sub(caps).ok_or_else(|| {
                    pgn_traits::Error::new_parse_error(format!(
                        "Too many {} capstones in TPS \"{}\"",
                        color, tps
                    ))
                })?;
                reserves.flats = reserves.flats.checked_sub(pieces - caps).ok_or_else(|| {
                    pgn_traits::Error::new_parse_error(format!(
                        "Too many {} stones in TPS \"{}\"",
                        color, tps
                    ))
                })?;
            }
            match color {
                Color::White => board.white_reserves = reserves,
                Color::Black => board.black_reserves = reserves,
            }
        }

        match tps_words[1] {
            "1" => board.to_move = Color::White,
            "2" => board.to_move = Color::Black,
            s => {
                return Err(pgn_traits::Error::new_parse_error(format!(
                    "Error parsing TPS \"{}\": Got bad side to move \"{}\"",
                    tps, s
                )))
            }
        }

        match tps_words[2].parse::<u16>() {
            Ok(n) if n > 0 => board.round = n,
            Ok(_) => {
                return Err(pgn_traits::Error::new_parse_error(format!(
                    "Error parsing TPS \"{}\": Move number must be positive",
                    tps
                )))
            }
            Err(e) => {
                return Err(pgn_traits::Error::new_caused_by(
                    pgn_traits::ErrorKind::ParseError,
                    format!(
                        "Error parsing TPS \"{}\": Got bad move number \"{}\"",
                        tps, tps_words[2]
                    ),
                    e,
                ))
            }
        }

        board.hash = board.zobrist_hash_from_scratch();
        Ok(board)
    }

    /// The position in Tak Positional System notation, wrapped in a `[TPS "..."]` tag
    pub fn to_tps(&self) -> String {
        let mut tps = String::from("[TPS \"");
        for rank in (0..S as u8).rev() {
            let mut empty = 0;
            let mut cells = vec![];
            for file in 0..S as u8 {
                let stack = self[Square::from_rank_file::<S>(rank, file)];
                if stack.is_empty() {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    cells.push(empty_run(empty));
                    empty = 0;
                }
                cells.push(stack.to_string());
            }
            if empty > 0 {
                cells.push(empty_run(empty));
            }
            tps.push_str(&cells.join(","));
            if rank > 0 {
                tps.push('/');
            }
        }
        let side = match self.to_move {
            Color::White => 1,
            Color::Black => 2,
        };
        write!(tps, " {} {}\"]", side, self.round).unwrap();
        tps
    }
}

fn empty_run(n: u8) -> String {
    if n == 1 {
        "x".to_string()
    } else {
        format!("x{}", n)
    }
}

fn parse_row<const S: usize>(row_str: &str) -> Result<[Stack; S], pgn_traits::Error> {
    let mut column_id = 0;
    let mut row = [Stack::default(); S];
    let mut row_str_iter = row_str.chars().peekable();
    while column_id < S {
        match row_str_iter.peek() {
            None => {
                return Err(pgn_traits::Error::new_parse_error(format!(
                    "Couldn't parse row \"{}\": not enough pieces",
                    row_str
                )))
            }
            Some('x') => {
                row_str_iter.next();
                if let Some(n) = row_str_iter.peek().and_then(|ch| ch.to_digit(10)) {
                    row_str_iter.next();
                    column_id += n as usize;
                } else {
                    column_id += 1;
                }
                if let Some(',') | None = row_str_iter.peek() {
                    row_str_iter.next();
                } else {
                    return Err(pgn_traits::Error::new_parse_error(format!(
                        "Expected ',' on row \"{}\", found {:?}",
                        row_str,
                        row_str_iter.next()
                    )));
                }
            }
            Some('1') | Some('2') => {
                let mut owners = vec![];
                let mut role = Flat;
                loop {
                    match row_str_iter.next() {
                        Some('1') if role == Flat => owners.push(Color::White),
                        Some('2') if role == Flat => owners.push(Color::Black),
                        Some('S') if role == Flat => role = Wall,
                        Some('C') if role == Flat => role = Cap,
                        Some(',') | None => break,
                        Some(ch) => {
                            return Err(pgn_traits::Error::new_parse_error(format!(
                                "Expected '1', '2', 'S' or 'C' on row \"{}\", found {}",
                                row_str, ch
                            )))
                        }
                    }
                }
                let max_pieces = 2 * (starting_stones::<S>() as usize + starting_capstones::<S>() as usize);
                if owners.len() > max_pieces {
                    return Err(pgn_traits::Error::new_parse_error(format!(
                        "Stack of {} pieces on row \"{}\" is taller than all pieces in a {}s game",
                        owners.len(),
                        row_str,
                        S
                    )));
                }
                let stack = &mut row[column_id];
                let last = owners.len() - 1;
                for (i, color) in owners.into_iter().enumerate() {
                    let piece_role = if i == last { role } else { Flat };
                    if stack.is_empty() {
                        stack.place(Piece::from_role_color(piece_role, color));
                    } else {
                        stack.drop_pieces(1, color_bit(color), piece_role);
                    }
                }
                column_id += 1;
            }
            Some(x) => {
                return Err(pgn_traits::Error::new_parse_error(format!(
                    "Unexpected '{}' in row \"{}\".",
                    x, row_str
                )))
            }
        }
    }
    if column_id > S || row_str_iter.next().is_some() {
        return Err(pgn_traits::Error::new_parse_error(format!(
            "Couldn't parse row \"{}\": too many pieces",
            row_str
        )));
    }
    Ok(row)
}
