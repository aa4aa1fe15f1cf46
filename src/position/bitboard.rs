use std::{fmt, ops};

/// One bit per square, indexed by `Square`. Used for road detection.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Default)]
pub(crate) struct BitBoard {
    pub board: u64,
}

impl ops::BitAnd for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn bitand(self, rhs: BitBoard) -> BitBoard {
        BitBoard::from_u64(self.board & rhs.board)
    }
}

impl ops::Not for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn not(self) -> BitBoard {
        BitBoard::from_u64(!self.board)
    }
}

impl BitBoard {
    #[inline]
    pub const fn empty() -> Self {
        BitBoard { board: 0 }
    }

    /// Every square of an `S`x`S` board
    #[inline]
    pub fn full<const S: usize>() -> Self {
        Self::lower_n_bits((S * S) as u8)
    }

    #[inline]
    pub fn lower_n_bits(n: u8) -> Self {
        if n >= 64 {
            BitBoard { board: u64::MAX }
        } else {
            BitBoard {
                board: (1 << n as u64) - 1,
            }
        }
    }

    #[inline]
    pub const fn from_u64(n: u64) -> Self {
        BitBoard { board: n }
    }

    // Sets the square to true
    #[inline]
    pub fn set(self, i: u8) -> Self {
        debug_assert!(i < 64);
        BitBoard::from_u64(self.board | 1 << i)
    }

    #[inline]
    pub fn rank<const S: usize>(self, i: u8) -> Self {
        debug_assert!(i < S as u8);
        let mask = (1 << S) - 1;
        BitBoard::from_u64(self.board & (mask << (i as u64 * S as u64)))
    }

    #[inline]
    pub fn file<const S: usize>(self, i: u8) -> Self {
        debug_assert!(i < S as u8);
        #[allow(clippy::unusual_byte_groupings)]
        let mask = match S {
            1 => 0b1,
            2 => 0b0101,
            3 => 0b1_001_001,
            4 => 0b1_0001_0001_0001,
            5 => 0b1_00001_00001_00001_00001,
            6 => 0b1_000001_000001_000001_000001_000001,
            7 => 0b1_0000001_0000001_0000001_0000001_0000001_0000001,
            8 => 0b1_00000001_00000001_00000001_00000001_00000001_00000001_00000001,
            _ => 0,
        };
        BitBoard::from_u64(self.board & (mask << i as u64))
    }

    /// The set itself plus every orthogonal neighbour of its squares
    pub fn grow<const S: usize>(self) -> Self {
        let not_first_file = !Self::full::<S>().file::<S>(0);
        let not_last_file = !Self::full::<S>().file::<S>(S as u8 - 1);
        let north = self.board << S;
        let south = self.board >> S;
        let east = (self.board & not_last_file.board) << 1;
        let west = (self.board & not_first_file.board) >> 1;
        BitBoard::from_u64(self.board | north | south | east | west) & Self::full::<S>()
    }

    /// Every square of `within` that is connected to `self` through `within`
    pub fn flood_fill<const S: usize>(self, within: BitBoard) -> Self {
        let mut area = self & within;
        loop {
            let next = area.grow::<S>() & within;
            if next == area {
                return area;
            }
            area = next;
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.board == 0
    }
}

impl fmt::Debug for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for n in (0..8).rev() {
            writeln!(f, "{:08b}", ((self.board >> (n * 8)) as u8).reverse_bits())?;
        }
        Ok(())
    }
}
