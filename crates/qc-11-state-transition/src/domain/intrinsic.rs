//! Intrinsic gas: the cost charged before any code runs.

use shared_types::entities::SignedTransaction;

/// Transaction gas cost constants.
pub mod costs {
    /// Base transaction gas.
    pub const TX_BASE: u64 = 21_000;
    /// Contract creation base gas.
    pub const TX_CREATE: u64 = 53_000;
    /// Gas per non-zero byte of calldata.
    pub const TX_DATA_NON_ZERO: u64 = 16;
    /// Gas per zero byte of calldata.
    pub const TX_DATA_ZERO: u64 = 4;
    /// Gas per 32-byte word of init code (EIP-3860).
    pub const INIT_CODE_WORD: u64 = 2;
}

/// Intrinsic gas of a transaction. Saturates instead of overflowing.
#[must_use]
pub fn intrinsic_gas(tx: &SignedTransaction) -> u64 {
    let creation = tx.is_contract_creation();
    let base = if creation {
        costs::TX_CREATE
    } else {
        costs::TX_BASE
    };

    let data_gas = tx.data.iter().fold(0u64, |acc, byte| {
        let cost = if *byte == 0 {
            costs::TX_DATA_ZERO
        } else {
            costs::TX_DATA_NON_ZERO
        };
        acc.saturating_add(cost)
    });

    let init_code_gas = if creation {
        let words = (tx.data.len() as u64).div_ceil(32);
        words.saturating_mul(costs::INIT_CODE_WORD)
    } else {
        0
    };

    base.saturating_add(data_gas).saturating_add(init_code_gas)
}
