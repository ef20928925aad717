//! # In-Memory Snapshot
//!
//! Account map frozen at one block context.

use crate::errors::StateError;
use crate::ports::outbound::StateSnapshot;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::entities::{AccountState, Address, BlockContext, U256};
use std::collections::HashMap;

/// In-memory snapshot.
#[derive(Debug, Default)]
pub struct InMemorySnapshot {
    block: BlockContext,
    accounts: RwLock<HashMap<Address, AccountState>>,
}

impl InMemorySnapshot {
    /// Create an empty snapshot at `block`.
    #[must_use]
    pub fn new(block: BlockContext) -> Self {
        Self {
            block,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Builder: add an account.
    #[must_use]
    pub fn with_account(self, address: Address, state: AccountState) -> Self {
        self.accounts.write().insert(address, state);
        self
    }

    /// Set account state.
    ///
    /// Only meant for building a snapshot before it is shared.
    pub fn set_account(&self, address: Address, state: AccountState) {
        self.accounts.write().insert(address, state);
    }

    /// Set balance for an address.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.accounts.write().entry(address).or_default().balance = balance;
    }

    /// A copy of this snapshot at a different block, sharing no state.
    #[must_use]
    pub fn fork_at(&self, block: BlockContext) -> Self {
        Self {
            block,
            accounts: RwLock::new(self.accounts.read().clone()),
        }
    }
}

#[async_trait]
impl StateSnapshot for InMemorySnapshot {
    async fn account(&self, address: &Address) -> Result<AccountState, StateError> {
        Ok(self
            .accounts
            .read()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    fn block(&self) -> &BlockContext {
        &self.block
    }
}
