//! Domain layer - Pure computational logic
//!
//! This module contains pure functions and algorithms without I/O dependencies.

pub mod bitmap;
pub mod combination;
pub mod dump_format;
pub mod extract;
pub mod grid;
pub mod powerset;
pub mod query;
pub mod scale;
pub mod set;
