//! # Token Contract Executor
//!
//! Stand-in for the EVM running an ERC-20 style contract. Contract storage
//! is kept per block number, so two snapshots of the same chain can see
//! different balances.
//!
//! Reverts carry the contract's `Error(string)` messages:
//! `"underflow balance sender"` and `"allowance insufficient"`.

use async_trait::async_trait;
use parking_lot::RwLock;
use qc_11_state_transition::domain::entities::ExecutionOutput;
use qc_11_state_transition::domain::revert::encode_revert_reason;
use qc_11_state_transition::errors::{ExecutionError, StateError};
use qc_11_state_transition::ports::outbound::{EvmExecutor, StateSnapshot};
use shared_types::{Address, SignedTransaction, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// `transfer(address,uint256)`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
/// `transferFrom(address,address,uint256)`.
pub const TRANSFER_FROM_SELECTOR: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];

/// Gas a successful transfer consumes.
pub const TRANSFER_GAS: u64 = 29_000;
/// Gas consumed before a revert.
pub const REVERT_GAS: u64 = 2_500;
/// Refund for clearing the sender's balance slot.
pub const CLEAR_SLOT_REFUND: u64 = 4_800;

/// Revert message: balance below the amount.
pub const UNDERFLOW_BALANCE_SENDER: &str = "underflow balance sender";
/// Revert message: allowance below the amount.
pub const ALLOWANCE_INSUFFICIENT: &str = "allowance insufficient";

/// Contract storage at one block.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl Ledger {
    /// Builder: set a token balance.
    #[must_use]
    pub fn with_balance(mut self, owner: Address, amount: U256) -> Self {
        self.balances.insert(owner, amount);
        self
    }

    /// Builder: let `spender` move `amount` of `owner`'s tokens.
    #[must_use]
    pub fn with_allowance(mut self, owner: Address, spender: Address, amount: U256) -> Self {
        self.allowances.insert((owner, spender), amount);
        self
    }

    fn balance(&self, owner: &Address) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }
}

/// Decoded call.
enum Call {
    Transfer { amount: U256 },
    TransferFrom { owner: Address, amount: U256 },
}

/// Executor for one token contract.
#[derive(Debug)]
pub struct TokenExecutor {
    contract: Address,
    ledgers: RwLock<HashMap<u64, Ledger>>,
    calls: AtomicU64,
}

impl TokenExecutor {
    /// Token deployed at `contract`.
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            ledgers: RwLock::new(HashMap::new()),
            calls: AtomicU64::new(0),
        }
    }

    /// Install contract storage as of `block`.
    pub fn set_ledger(&self, block: u64, ledger: Ledger) {
        self.ledgers.write().insert(block, ledger);
    }

    /// Number of executions dispatched.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn decode(data: &[u8]) -> Option<Call> {
        let (selector, args) = data.split_at_checked(4)?;
        let word = |index: usize| args.get(index * 32..(index + 1) * 32);
        match selector {
            s if s == TRANSFER_SELECTOR => Some(Call::Transfer {
                amount: U256::from_big_endian(word(1)?),
            }),
            s if s == TRANSFER_FROM_SELECTOR => {
                let owner = word(0)?.get(12..)?.try_into().ok()?;
                Some(Call::TransferFrom {
                    owner,
                    amount: U256::from_big_endian(word(2)?),
                })
            }
            _ => None,
        }
    }

    fn run(ledger: &Ledger, spender: Address, call: Call) -> Result<bool, &'static str> {
        let (owner, amount) = match call {
            Call::Transfer { amount } => (spender, amount),
            Call::TransferFrom { owner, amount } => {
                if ledger.allowance(&owner, &spender) < amount {
                    return Err(ALLOWANCE_INSUFFICIENT);
                }
                (owner, amount)
            }
        };
        let balance = ledger.balance(&owner);
        if balance < amount {
            return Err(UNDERFLOW_BALANCE_SENDER);
        }
        Ok(balance == amount)
    }
}

#[async_trait]
impl EvmExecutor for TokenExecutor {
    async fn execute(
        &self,
        snapshot: &dyn StateSnapshot,
        tx: &SignedTransaction,
        gas_available: u64,
    ) -> Result<ExecutionOutput, StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if tx.to != Some(self.contract) {
            return Ok(ExecutionOutput::success(gas_available, 0));
        }

        let block = snapshot.block().number;
        let ledger = self
            .ledgers
            .read()
            .get(&block)
            .cloned()
            .ok_or_else(|| StateError::Internal(format!("no token storage at block {block}")))?;

        let Some(call) = Self::decode(&tx.data) else {
            let remaining = gas_available.saturating_sub(REVERT_GAS);
            return Ok(ExecutionOutput::failure(remaining, ExecutionError::Revert(vec![])));
        };

        let output = match Self::run(&ledger, tx.from, call) {
            Ok(_) if gas_available < TRANSFER_GAS => {
                ExecutionOutput::failure(0, ExecutionError::OutOfGas)
            }
            Ok(clears_slot) => {
                let refund = if clears_slot { CLEAR_SLOT_REFUND } else { 0 };
                ExecutionOutput::success(gas_available - TRANSFER_GAS, refund)
            }
            Err(message) => ExecutionOutput::failure(
                gas_available.saturating_sub(REVERT_GAS),
                ExecutionError::Revert(encode_revert_reason(message)),
            ),
        };
        Ok(output)
    }
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

fn amount_word(amount: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    amount.to_big_endian(&mut word);
    word
}

/// Calldata for `transfer(to, amount)`.
pub fn encode_transfer(to: &Address, amount: U256) -> Vec<u8> {
    let mut data = TRANSFER_SELECTOR.to_vec();
    data.extend_from_slice(&address_word(to));
    data.extend_from_slice(&amount_word(amount));
    data
}

/// Calldata for `transferFrom(from, to, amount)`.
pub fn encode_transfer_from(from: &Address, to: &Address, amount: U256) -> Vec<u8> {
    let mut data = TRANSFER_FROM_SELECTOR.to_vec();
    data.extend_from_slice(&address_word(from));
    data.extend_from_slice(&address_word(to));
    data.extend_from_slice(&amount_word(amount));
    data
}
