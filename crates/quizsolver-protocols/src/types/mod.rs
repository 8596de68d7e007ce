//! Core types shared across the quiz solver.

mod quiz;

pub use quiz::*;
