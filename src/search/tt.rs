//! A fixed-size, always-replace transposition table.
//!
//! Each slot holds two words: `hash ^ data` and `data`. A lookup only accepts a slot whose
//! two words xor to the probed hash, so no key is stored separately. Different positions
//! can still be confused when their slots happen to satisfy that check, which is rare
//! enough to be ignored.
//!
//! The words are written with separate relaxed atomic stores. The table is `Sync`, but if
//! several searches share it, a reader can see the check word of one write together with
//! the data word of another. The check nearly always turns such a torn read into a miss,
//! though this is not guaranteed.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::evaluation::Score;
use crate::position::Move;

const KIND_SHIFT: u32 = 62;
const DEPTH_SHIFT: u32 = 56;
const DEPTH_MASK: u64 = 0x3F;
const SCORE_SHIFT: u32 = 24;
const MOVE_MASK: u64 = 0x00FF_FFFF;
const HAS_MOVE: u64 = 1 << 17;

/// How the stored score relates to the true value of the position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Invalid = 0,
    /// The search failed low, and the true value is at most the score
    UpperBound = 1,
    /// The search failed high, and the true value is at least the score
    LowerBound = 2,
    Exact = 3,
}

/// A search result packed into one word.
///
/// | bits  | field                           |
/// |-------|---------------------------------|
/// | 62-63 | kind                            |
/// | 56-61 | depth                           |
/// | 24-55 | score                           |
/// | 17    | set if a best move is stored    |
/// | 0-16  | best move, see `Move::pack`     |
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TtEntry {
    data: u64,
}

impl TtEntry {
    pub fn new(kind: EntryKind, depth: u16, score: Score, best_move: Option<Move>) -> Self {
        debug_assert!(depth as u64 <= DEPTH_MASK, "Depth {} too large", depth);
        let move_data = best_move.map_or(0, |mv| mv.pack() as u64 | HAS_MOVE);
        TtEntry {
            data: (kind as u64) << KIND_SHIFT
                | (depth as u64 & DEPTH_MASK) << DEPTH_SHIFT
                | (score as u32 as u64) << SCORE_SHIFT
                | move_data,
        }
    }

    pub fn from_data(data: u64) -> Self {
        TtEntry { data }
    }

    pub fn data(self) -> u64 {
        self.data
    }

    pub fn kind(self) -> EntryKind {
        match self.data >> KIND_SHIFT {
            1 => EntryKind::UpperBound,
            2 => EntryKind::LowerBound,
            3 => EntryKind::Exact,
            _ => EntryKind::Invalid,
        }
    }

    pub fn depth(self) -> u16 {
        ((self.data >> DEPTH_SHIFT) & DEPTH_MASK) as u16
    }

    pub fn score(self) -> Score {
        (self.data >> SCORE_SHIFT) as u32 as Score
    }

    pub fn best_move(self) -> Option<Move> {
        let move_data = self.data & MOVE_MASK;
        if move_data & HAS_MOVE == 0 {
            None
        } else {
            Move::unpack((move_data & !HAS_MOVE) as u32)
        }
    }
}

impl std::fmt::Debug for TtEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtEntry")
            .field("kind", &self.kind())
            .field("depth", &self.depth())
            .field("score", &self.score())
            .field("best_move", &self.best_move())
            .finish()
    }
}

#[derive(Default)]
struct Slot {
    check: AtomicU64,
    data: AtomicU64,
}

pub struct TranspositionTable {
    slots: Box<[Slot]>,
}

impl TranspositionTable {
    /// Allocates a table with `size` slots, 16 bytes each
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        TranspositionTable {
            slots: (0..size).map(|_| Slot::default()).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, hash: u64) -> &Slot {
        &self.slots[(hash % self.slots.len() as u64) as usize]
    }

    pub fn get(&self, hash: u64) -> Option<TtEntry> {
        let slot = self.slot(hash);
        let check = slot.check.load(Ordering::Relaxed);
        let data = slot.data.load(Ordering::Relaxed);
        let entry = TtEntry::from_data(data);
        if check ^ data != hash || entry.kind() == EntryKind::Invalid {
            None
        } else {
            Some(entry)
        }
    }

    /// Stores an entry, overwriting whatever was in its slot
    pub fn put(&self, hash: u64, entry: TtEntry) {
        let slot = self.slot(hash);
        slot.check.store(hash ^ entry.data(), Ordering::Relaxed);
        slot.data.store(entry.data(), Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.check.store(0, Ordering::Relaxed);
            slot.data.store(0, Ordering::Relaxed);
        }
    }

    /// Number of valid entries. Scans the whole table.
    pub fn used_entries(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| TtEntry::from_data(slot.data.load(Ordering::Relaxed)).kind() != EntryKind::Invalid)
            .count()
    }
}
