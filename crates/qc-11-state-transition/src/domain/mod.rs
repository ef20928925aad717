//! Domain layer: pure gas accounting and transition results.

pub mod entities;
pub mod intrinsic;
pub mod refund;
pub mod revert;
