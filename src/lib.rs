//! A Tak engine: board representation, move generation and MTD(f) alpha-beta search.

pub mod evaluation;
pub mod minmax;
pub mod position;
pub mod search;
mod tests;
