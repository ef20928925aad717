//! # Domain Layer
//!
//! - `evaluation`: per-submission typestate and verdict classification

pub mod evaluation;

pub use evaluation::*;
