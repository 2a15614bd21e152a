//! Infrastructure layer - I/O and external dependencies
//!
//! This module handles dump and element file operations.

pub mod dump_io;
pub mod element_io;
