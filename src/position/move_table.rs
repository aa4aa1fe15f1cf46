//! Precomputed drop sequences for every stack height, so that generating slides is a
//! range lookup instead of a search.
//!
//! For a carried height `h`, the table holds every way to drop `1..=h` pieces over
//! `1..=MAX_RANGE` squares. Rows are sorted by the number of squares, then by the drop
//! on the last square, the second-to-last square and so on. Two consequences:
//!
//! * The slides reaching at most `k` squares are the first `C(h, 1) + ... + C(h, k)` rows.
//! * The slides reaching exactly `k + 1` squares with a single piece dropped on the last
//!   square come right after them. There are `C(h - 1, k)` of those, and they are exactly
//!   the slides where a lone capstone flattens a wall `k + 1` squares away.

use std::ops::Range;

use lazy_static::lazy_static;
use num_integer::binomial;

use crate::position::mv::Slides;

/// The most pieces that can be carried, on the largest board
pub const MAX_CARRY: usize = 8;
/// The furthest a stack can travel, on the largest board
pub const MAX_RANGE: usize = 7;

lazy_static! {
    pub(crate) static ref MOVE_TABLE: MoveTable = MoveTable::new();
}

/// How far a stack can slide in one direction
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Reach {
    /// Number of squares before the board edge, or the first wall or capstone
    pub free: u8,
    /// The stack is topped by a capstone, and the square just past the free ones holds a wall
    pub flatten: bool,
}

#[derive(Clone, Debug)]
pub struct MoveTable {
    slides: Vec<Slides>,
    /// Index of the first row for each carried height
    starts: [usize; MAX_CARRY + 1],
    /// `C(h, 1) + ... + C(h, k)`, indexed by `[h][k]`
    binomial_sums: [[usize; MAX_RANGE + 1]; MAX_CARRY + 1],
    /// `C(h - 1, k)`, indexed by `[h][k]`
    flatten_counts: [[usize; MAX_RANGE + 1]; MAX_CARRY + 1],
}

impl Default for MoveTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTable {
    pub fn new() -> Self {
        let mut binomial_sums = [[0; MAX_RANGE + 1]; MAX_CARRY + 1];
        let mut flatten_counts = [[0; MAX_RANGE + 1]; MAX_CARRY + 1];
        for height in 1..=MAX_CARRY {
            for tiles in 1..=MAX_RANGE {
                binomial_sums[height][tiles] =
                    binomial_sums[height][tiles - 1] + binomial(height, tiles);
            }
            for tiles in 0..=MAX_RANGE {
                flatten_counts[height][tiles] = binomial(height - 1, tiles);
            }
        }

        let mut slides = Vec::new();
        let mut starts = [0; MAX_CARRY + 1];
        for height in 1..=MAX_CARRY {
            starts[height] = slides.len();
            let mut rows = compositions(height as u8);
            rows.sort_by_key(|row| {
                let mut key = [0; MAX_RANGE];
                for (i, drop) in row.drops().iter().rev().enumerate() {
                    key[i] = *drop;
                }
                (row.range(), key)
            });
            debug_assert_eq!(
                rows.len(),
                binomial_sums[height][height.min(MAX_RANGE)],
                "Wrong number of slides for height {}",
                height
            );
            slides.extend(rows);
        }

        MoveTable {
            slides,
            starts,
            binomial_sums,
            flatten_counts,
        }
    }

    /// Indices of the legal slides for a stack carrying at most `height` pieces
    pub fn range(&self, height: u8, reach: Reach) -> Range<usize> {
        let height = (height as usize).min(MAX_CARRY);
        if height == 0 {
            return 0..0;
        }
        let tiles = (reach.free as usize).min(height).min(MAX_RANGE);
        let mut len = self.binomial_sums[height][tiles];
        if reach.flatten && tiles < MAX_RANGE {
            len += self.flatten_counts[height][tiles];
        }
        let start = self.starts[height];
        start..start + len
    }

    pub fn slides(&self, height: u8, reach: Reach) -> &[Slides] {
        &self.slides[self.range(height, reach)]
    }

    pub fn get(&self, index: usize) -> Option<Slides> {
        self.slides.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Every drop sequence for `1..=height` carried pieces over at most `MAX_RANGE` squares, unsorted
fn compositions(height: u8) -> Vec<Slides> {
    let mut rows = vec![];
    for pieces in 1..=height {
        // Each subset of the `pieces - 1` gaps between carried pieces is a place to split
        for splits in 0u32..(1 << (pieces - 1)) {
            if splits.count_ones() as usize + 1 > MAX_RANGE {
                continue;
            }
            let mut drops = Vec::with_capacity(MAX_RANGE);
            let mut current = 1;
            for gap in 0..pieces - 1 {
                if splits & (1 << gap) != 0 {
                    drops.push(current);
                    current = 1;
                } else {
                    current += 1;
                }
            }
            drops.push(current);
            if let Some(slides) = Slides::from_drops(&drops) {
                rows.push(slides);
            }
        }
    }
    rows
}
