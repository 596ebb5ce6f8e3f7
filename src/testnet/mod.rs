//! Test helpers shared by the unit tests
//!
//! Quick block mining at low difficulty and an in-memory peer writer.

pub mod test_utils;

pub use test_utils::*;
