use std::fmt;

use board_game_traits::Color;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::utils::Direction::*;
use crate::position::utils::Piece::{BlackCap, BlackFlat, BlackWall, WhiteCap, WhiteFlat, WhiteWall};
use crate::position::utils::Role::{Cap, Flat, Wall};

/// One of the 3 piece roles in Tak. The same as piece, but without different variants for each color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    Flat = 0,
    Wall = 1,
    Cap = 2,
}

impl Role {
    pub fn disc(self) -> usize {
        self as u16 as usize
    }

    pub fn from_disc(disc: u8) -> Option<Self> {
        match disc {
            0 => Some(Flat),
            1 => Some(Wall),
            2 => Some(Cap),
            _ => None,
        }
    }

    /// Walls and capstones stop slides and roads
    pub fn is_blocking(self) -> bool {
        self != Flat
    }
}

/// One of the 6 game pieces in Tak. Each piece has one variant for each color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Piece {
    WhiteFlat = 0,
    BlackFlat = 1,
    WhiteWall = 2,
    BlackWall = 3,
    WhiteCap = 4,
    BlackCap = 5,
}

impl Piece {
    pub fn from_role_color(role: Role, color: Color) -> Self {
        match (role, color) {
            (Flat, Color::White) => WhiteFlat,
            (Wall, Color::White) => WhiteWall,
            (Cap, Color::White) => WhiteCap,
            (Flat, Color::Black) => BlackFlat,
            (Wall, Color::Black) => BlackWall,
            (Cap, Color::Black) => BlackCap,
        }
    }

    pub fn disc(self) -> usize {
        self as u16 as usize
    }

    pub fn role(self) -> Role {
        match self {
            WhiteFlat | BlackFlat => Flat,
            WhiteWall | BlackWall => Wall,
            WhiteCap | BlackCap => Cap,
        }
    }

    pub fn color(self) -> Color {
        match self {
            WhiteFlat | WhiteWall | WhiteCap => Color::White,
            BlackFlat | BlackWall | BlackCap => Color::Black,
        }
    }

    pub fn is_road_piece(self) -> bool {
        self.role() != Wall
    }
}

/// The owner bit used inside a stack's owner vector. White is 0, black is 1.
pub(crate) fn color_bit(color: Color) -> u128 {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

pub(crate) fn color_from_bit(bit: u128) -> Color {
    if bit & 1 == 0 {
        Color::White
    } else {
        Color::Black
    }
}

/// A location on the board. `Square(0)` is a1, and ranks increase northwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square(pub u8);

impl Square {
    pub fn from_rank_file<const S: usize>(rank: u8, file: u8) -> Self {
        debug_assert!(rank < S as u8 && file < S as u8);
        Square(rank * S as u8 + file)
    }

    pub fn rank<const S: usize>(self) -> u8 {
        self.0 / S as u8
    }

    pub fn file<const S: usize>(self) -> u8 {
        self.0 % S as u8
    }

    pub fn is_on_board<const S: usize>(self) -> bool {
        (self.0 as usize) < S * S
    }

    pub fn go_direction<const S: usize>(self, direction: Direction) -> Option<Self> {
        let (rank, file) = (self.rank::<S>(), self.file::<S>());
        match direction {
            North if rank + 1 < S as u8 => Some(Square(self.0 + S as u8)),
            South if rank > 0 => Some(Square(self.0 - S as u8)),
            East if file + 1 < S as u8 => Some(Square(self.0 + 1)),
            West if file > 0 => Some(Square(self.0 - 1)),
            _ => None,
        }
    }

    /// The square `len` steps away in `direction`, if it is on the board
    pub fn jump_direction<const S: usize>(self, direction: Direction, len: u8) -> Option<Self> {
        let mut square = self;
        for _ in 0..len {
            square = square.go_direction::<S>(direction)?;
        }
        Some(square)
    }

    pub fn neighbours<const S: usize>(self) -> impl Iterator<Item = Square> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.go_direction::<S>(direction))
    }

    pub fn parse_square<const S: usize>(input: &str) -> Result<Square, pgn_traits::Error> {
        let mut chars = input.chars();
        let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse square \"{}\"",
                input
            )));
        };
        let file = (file_char as u32).wrapping_sub('a' as u32);
        let rank = (rank_char as u32).wrapping_sub('1' as u32);
        if file >= S as u32 || rank >= S as u32 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse square \"{}\" on {}s",
                input, S
            )));
        }
        Ok(Square::from_rank_file::<S>(rank as u8, file as u8))
    }

    pub fn to_string<const S: usize>(self) -> String {
        let mut string = String::new();
        string.push((self.file::<S>() + b'a') as char);
        string.push((self.rank::<S>() + b'1') as char);
        string
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    North = 0,
    West = 1,
    East = 2,
    South = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [North, West, East, South];

    pub(crate) fn from_disc(disc: u8) -> Option<Self> {
        Self::ALL.get(disc as usize).copied()
    }

    pub(crate) fn parse(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(North),
            '<' => Some(West),
            '>' => Some(East),
            '-' => Some(South),
            _ => None,
        }
    }

    pub(crate) fn to_char(self) -> char {
        match self {
            North => '+',
            West => '<',
            East => '>',
            South => '-',
        }
    }
}

/// The pieces on one square. Bit 0 of `owners` is the owner of the top piece,
/// and higher bits go down the stack.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Stack {
    height: u8,
    owners: u128,
    top: Option<Role>,
}

impl Stack {
    pub const fn new() -> Self {
        Stack {
            height: 0,
            owners: 0,
            top: None,
        }
    }

    pub fn len(&self) -> u8 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn owners(&self) -> u128 {
        self.owners
    }

    pub fn top_role(&self) -> Option<Role> {
        self.top
    }

    pub fn top_stone(&self) -> Option<Piece> {
        let role = self.top?;
        Some(Piece::from_role_color(role, color_from_bit(self.owners)))
    }

    /// The color controlling the stack
    pub fn owner(&self) -> Option<Color> {
        self.top.map(|_| color_from_bit(self.owners))
    }

    /// The owner of the piece `i` steps below the top
    pub fn get(&self, i: u8) -> Option<Color> {
        if i < self.height {
            Some(color_from_bit(self.owners >> i))
        } else {
            None
        }
    }

    /// Number of pieces in the stack belonging to `color`
    pub fn count(&self, color: Color) -> u8 {
        let mask = Self::mask(self.height);
        match color {
            Color::White => (!self.owners & mask).count_ones() as u8,
            Color::Black => (self.owners & mask).count_ones() as u8,
        }
    }

    /// Owners of the pieces from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        (0..self.height).rev().map(move |i| color_from_bit(self.owners >> i))
    }

    pub(crate) fn place(&mut self, piece: Piece) {
        debug_assert!(self.is_empty());
        self.height = 1;
        self.owners = color_bit(piece.color());
        self.top = Some(piece.role());
    }

    /// Removes the top `n` pieces and returns their owner bits. The remaining top, if any, is a flat.
    pub(crate) fn take(&mut self, n: u8) -> u128 {
        debug_assert!(n > 0 && n <= self.height);
        let taken = self.owners & Self::mask(n);
        self.owners >>= n;
        self.height -= n;
        self.top = if self.height == 0 { None } else { Some(Flat) };
        taken
    }

    /// Puts `n` pieces on top of the stack, with `role` as the new top
    pub(crate) fn drop_pieces(&mut self, n: u8, owners: u128, role: Role) {
        debug_assert!(n > 0);
        self.owners = (self.owners << n) | (owners & Self::mask(n));
        self.height += n;
        self.top = Some(role);
    }

    pub(crate) fn set_top(&mut self, role: Option<Role>) {
        debug_assert_eq!(role.is_none(), self.is_empty());
        self.top = role;
    }

    fn mask(n: u8) -> u128 {
        if n >= 128 {
            u128::MAX
        } else {
            (1 << n) - 1
        }
    }
}

impl fmt::Display for Stack {
    /// Writes the stack in position notation: owners bottom to top, then the top role
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "x");
        }
        for color in self.iter() {
            match color {
                Color::White => write!(f, "1")?,
                Color::Black => write!(f, "2")?,
            }
        }
        match self.top {
            Some(Wall) => write!(f, "S"),
            Some(Cap) => write!(f, "C"),
            _ => Ok(()),
        }
    }
}
