//! Domain types for the bet-generation engine.

pub mod quadrant;
pub mod ticket;

pub use quadrant::{quadrant_histogram, quadrant_index, quadrant_label, quadrant_numbers, QuadrantCount};
pub use ticket::{
    NumberFrequency, Parity, RecencySample, Selection, StrategyDetails, StrategyMetadata, Ticket,
};

/// Lowest drawable number.
pub const MIN_NUMBER: u8 = 1;
/// Highest drawable number.
pub const MAX_NUMBER: u8 = 60;
/// Numbers per ticket, inclusive bounds.
pub const MIN_K: usize = 6;
pub const MAX_K: usize = 15;
/// Six decades partition `[1, 60]`.
pub const QUADRANT_COUNT: usize = 6;
pub const QUADRANT_SIZE: usize = 10;

/// A drawn or selected number in `[1, 60]`.
pub type Dezena = u8;
