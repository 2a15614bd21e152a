//! Application layer - Use case implementations
//!
//! This module coordinates the domain layer into the generation and dump use cases.

pub mod codec;
pub mod generator;
