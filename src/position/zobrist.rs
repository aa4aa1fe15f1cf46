use board_game_traits::Color;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};

use crate::position::utils::{Square, Stack};
use crate::position::MAX_BOARD_SIZE;

const SQUARES: usize = MAX_BOARD_SIZE * MAX_BOARD_SIZE;
/// Enough for every piece of the largest board in one stack
const MAX_STACK_HEIGHT: usize = 128;
/// Pieces below the top are hashed 8 at a time
const STACK_CHUNKS: usize = MAX_STACK_HEIGHT / 8;

const TOP_STONES_OFFSET: usize = 0;
const STACK_OFFSET: usize = TOP_STONES_OFFSET + SQUARES * 6;
const HEIGHT_OFFSET: usize = STACK_OFFSET + SQUARES * STACK_CHUNKS * 256;
const TO_MOVE_OFFSET: usize = HEIGHT_OFFSET + SQUARES * MAX_STACK_HEIGHT;
const FIRST_ROUND_OFFSET: usize = TO_MOVE_OFFSET + 2;
const NUM_KEYS: usize = FIRST_ROUND_OFFSET + 1;

lazy_static! {
    pub(crate) static ref ZOBRIST_KEYS: ZobristKeys = ZobristKeys::new();
}

/// Random keys for every board size. A square's index is the same on all sizes,
/// so positions of different sizes share keys.
pub(crate) struct ZobristKeys {
    keys: Vec<u64>,
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = rand::rngs::StdRng::from_seed([0; 32]);
        let keys = (0..NUM_KEYS).map(|_| rng.gen()).collect();
        ZobristKeys { keys }
    }

    pub fn stack(&self, square: Square, stack: &Stack) -> u64 {
        let Some(top_stone) = stack.top_stone() else {
            return 0;
        };
        let square = square.0 as usize;
        let height = stack.len() as usize;
        let mut hash = self.keys[TOP_STONES_OFFSET + square * 6 + top_stone.disc()]
            ^ self.keys[HEIGHT_OFFSET + square * MAX_STACK_HEIGHT + height];

        let below = stack.owners() >> 1;
        for chunk in 0..(height + 6) / 8 {
            let byte = (below >> (chunk * 8)) as u8 as usize;
            hash ^= self.keys[STACK_OFFSET + (square * STACK_CHUNKS + chunk) * 256 + byte];
        }
        hash
    }

    pub fn to_move(&self, color: Color) -> u64 {
        match color {
            Color::White => self.keys[TO_MOVE_OFFSET],
            Color::Black => self.keys[TO_MOVE_OFFSET + 1],
        }
    }

    pub fn first_round(&self) -> u64 {
        self.keys[FIRST_ROUND_OFFSET]
    }
}
