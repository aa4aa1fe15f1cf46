use std::fmt::Write;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::move_table::{MAX_CARRY, MAX_RANGE};
use crate::position::utils::Role::{Cap, Flat, Wall};
use crate::position::utils::{Direction, Role, Square};

/// How many pieces a slide drops on each square it passes, nearest square first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Slides {
    range: u8,
    drops: [u8; MAX_RANGE],
}

impl Slides {
    /// Returns `None` if `drops` is empty, longer than the maximum range, or contains a zero
    pub fn from_drops(drops: &[u8]) -> Option<Self> {
        if drops.is_empty() || drops.len() > MAX_RANGE || drops.contains(&0) {
            return None;
        }
        let mut slides = Slides {
            range: drops.len() as u8,
            drops: [0; MAX_RANGE],
        };
        slides.drops[..drops.len()].copy_from_slice(drops);
        Some(slides)
    }

    /// Number of squares the stack travels
    pub fn range(self) -> u8 {
        self.range
    }

    pub fn drops(&self) -> &[u8] {
        &self.drops[..self.range as usize]
    }

    /// Pieces dropped on the square `i + 1` steps away from the origin
    pub fn drop_at(self, i: u8) -> u8 {
        self.drops[i as usize]
    }

    pub fn last_drop(self) -> u8 {
        self.drops().last().copied().unwrap_or_default()
    }

    pub fn pieces_taken(self) -> u8 {
        self.drops().iter().sum()
    }

    /// Compact form used in the transposition table. Bit `j` is set if carried piece `j + 1`,
    /// counted from the bottom of the carried pieces, is the last one dropped on its square.
    pub(crate) fn to_mask(self) -> u8 {
        debug_assert!(self.pieces_taken() as usize <= MAX_CARRY);
        let mut mask = 0u8;
        let mut dropped = 0;
        for &drop in self.drops() {
            dropped += drop;
            mask |= 1 << (dropped - 1);
        }
        mask
    }

    pub(crate) fn from_mask(mask: u8) -> Option<Self> {
        let mut drops = [0; MAX_RANGE];
        let mut range = 0;
        let mut previous = 0;
        for bit in 0..8u8 {
            if mask & (1 << bit) != 0 {
                if range == MAX_RANGE {
                    return None;
                }
                drops[range] = bit + 1 - previous;
                previous = bit + 1;
                range += 1;
            }
        }
        Slides::from_drops(&drops[..range])
    }
}

/// A move for a position. Legality is checked by the board, not here.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Move {
    Place(Role, Square),
    Slide(Square, Direction, Slides),
}

const SLIDE_FLAG: u32 = 1 << 16;
const ORIGIN_SHIFT: u32 = 10;
const DIRECTION_SHIFT: u32 = 8;

impl Move {
    /// Packs the move into the low 17 bits of a word
    pub(crate) fn pack(self) -> u32 {
        match self {
            Move::Place(role, square) => (square.0 as u32) << ORIGIN_SHIFT | role as u32,
            Move::Slide(square, direction, slides) => {
                SLIDE_FLAG
                    | (square.0 as u32) << ORIGIN_SHIFT
                    | (direction as u32) << DIRECTION_SHIFT
                    | slides.to_mask() as u32
            }
        }
    }

    pub(crate) fn unpack(data: u32) -> Option<Self> {
        let square = Square((data >> ORIGIN_SHIFT) as u8 & 0x3F);
        if data & SLIDE_FLAG == 0 {
            Some(Move::Place(Role::from_disc(data as u8 & 0b11)?, square))
        } else {
            let direction = Direction::from_disc((data >> DIRECTION_SHIFT) as u8 & 0b11)?;
            let slides = Slides::from_mask(data as u8)?;
            Some(Move::Slide(square, direction, slides))
        }
    }

    pub fn to_string<const S: usize>(&self) -> String {
        let mut string = String::new();
        match self {
            Move::Place(role, square) => match role {
                Cap => write!(string, "C{}", square.to_string::<S>()).unwrap(),
                Flat => write!(string, "{}", square.to_string::<S>()).unwrap(),
                Wall => write!(string, "S{}", square.to_string::<S>()).unwrap(),
            },
            Move::Slide(square, direction, slides) => {
                let pieces_taken = slides.pieces_taken();
                if pieces_taken > 1 {
                    write!(string, "{}", pieces_taken).unwrap();
                }
                write!(string, "{}{}", square.to_string::<S>(), direction.to_char()).unwrap();
                // Omit the drops if all pieces are dropped on the first square
                if slides.range() > 1 {
                    for drop in slides.drops() {
                        write!(string, "{}", drop).unwrap();
                    }
                }
            }
        }
        string
    }

    pub fn from_string<const S: usize>(input: &str) -> Result<Self, pgn_traits::Error> {
        let input = input.trim();
        if input.len() < 2 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Input move \"{}\" too short",
                input
            )));
        }
        if !input.is_ascii() {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Input move \"{}\" contained non-ascii characters",
                input
            )));
        }
        let bytes = input.as_bytes();
        match bytes[0] {
            b'F' | b'S' | b'C' => {
                let role = match bytes[0] {
                    b'S' => Wall,
                    b'C' => Cap,
                    _ => Flat,
                };
                Ok(Move::Place(role, Square::parse_square::<S>(&input[1..])?))
            }
            b'a'..=b'h' if input.len() == 2 => {
                Ok(Move::Place(Flat, Square::parse_square::<S>(input)?))
            }
            b'a'..=b'h' | b'1'..=b'8' => {
                let (pieces_taken, rest) = if bytes[0].is_ascii_digit() {
                    ((bytes[0] - b'0'), &input[1..])
                } else {
                    (1, input)
                };
                if rest.len() < 3 {
                    return Err(pgn_traits::Error::new_parse_error(format!(
                        "Couldn't parse move \"{}\"",
                        input
                    )));
                }
                if pieces_taken as usize > S {
                    return Err(pgn_traits::Error::new_parse_error(format!(
                        "{} too large for {}s",
                        input, S
                    )));
                }
                let square = Square::parse_square::<S>(&rest[0..2])?;
                let direction = rest[2..]
                    .chars()
                    .next()
                    .and_then(Direction::parse)
                    .ok_or_else(|| {
                        pgn_traits::Error::new_parse_error(format!(
                            "Bad direction in move \"{}\"",
                            input
                        ))
                    })?;
                let mut drops: Vec<u8> = rest[3..]
                    .chars()
                    .map(|ch| ch.to_digit(10).map(|i| i as u8))
                    .collect::<Option<Vec<u8>>>()
                    .ok_or_else(|| {
                        pgn_traits::Error::new_parse_error(format!(
                            "Couldn't parse move \"{}\": found non-integer when expecting number of pieces to drop",
                            input
                        ))
                    })?;
                if drops.is_empty() {
                    drops.push(pieces_taken);
                }
                if drops.len() >= S
                    || drops.iter().map(|&drop| drop as usize).sum::<usize>() != pieces_taken as usize
                {
                    return Err(pgn_traits::Error::new_parse_error(format!(
                        "Pieces dropped don't add up in move \"{}\"",
                        input
                    )));
                }
                let slides = Slides::from_drops(&drops).ok_or_else(|| {
                    pgn_traits::Error::new_parse_error(format!(
                        "Illegal drop sequence in move \"{}\"",
                        input
                    ))
                })?;
                Ok(Move::Slide(square, direction, slides))
            }
            _ => Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse move \"{}\"",
                input
            ))),
        }
    }
}

/// Everything needed to take back a move
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReverseMove {
    pub(crate) mv: Move,
    /// The top of the slide's last square before the move, which may have been a wall
    pub(crate) replaced_top: Option<Role>,
    pub(crate) hash: u64,
}

impl ReverseMove {
    pub fn mv(&self) -> Move {
        self.mv
    }
}
