//! Fork-gated payload checks.

use crate::chain::ForkOracle;
use crate::entities::Hash;
use crate::errors::PayloadError;

/// Checks the withdrawals root of an execution payload against the fork rules.
///
/// After the token-ratio fork the root is mandatory; before it, forbidden.
pub fn check_withdrawals_root(
    oracle: &dyn ForkOracle,
    timestamp: u64,
    withdrawals_root: Option<&Hash>,
) -> Result<(), PayloadError> {
    match (oracle.is_post_fork_active(timestamp), withdrawals_root) {
        (true, None) => Err(PayloadError::MissingWithdrawalsRoot { timestamp }),
        (false, Some(_)) => Err(PayloadError::UnexpectedWithdrawalsRoot { timestamp }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainSpec, TokenRatio};

    #[test]
    fn test_withdrawals_root_rules() {
        let spec = ChainSpec::with_fork(5000, 100, TokenRatio::ONE);
        let root = [0x11; 32];

        assert!(check_withdrawals_root(&spec, 99, None).is_ok());
        assert!(check_withdrawals_root(&spec, 100, Some(&root)).is_ok());
        assert_eq!(
            check_withdrawals_root(&spec, 100, None),
            Err(PayloadError::MissingWithdrawalsRoot { timestamp: 100 })
        );
        assert_eq!(
            check_withdrawals_root(&spec, 99, Some(&root)),
            Err(PayloadError::UnexpectedWithdrawalsRoot { timestamp: 99 })
        );
    }
}
