//! # Domain Layer - Mempool Subsystem
//!
//! ## Components
//!
//! - `entities`: PooledTransaction, PoolConfig
//! - `pool`: LegacyPool, the standard pool with preconf support
//! - `blob_pool`: BlobPool, which declines the preconf fast path
//! - `capability`: TxPool tagged variant and PoolSet routing
//! - `errors`: AdmissionError enumeration

pub mod blob_pool;
pub mod capability;
pub mod entities;
pub mod errors;
pub mod pool;

pub use blob_pool::*;
pub use capability::*;
pub use entities::*;
pub use errors::*;
pub use pool::*;
