//! # Gas Refund Calculator
//!
//! The refund is capped at a fifth of the gas used (EIP-3529).
//!
//! After the token-ratio fork, the gas used for the cap is computed from the
//! initial gas scaled down by the token ratio:
//!
//! ```text
//! pre-fork:   gas_used = initial_gas - gas_remaining
//! post-fork:  gas_used = initial_gas / token_ratio - gas_remaining
//! refund    = min(refund_counter, gas_used / 5)
//! ```

use crate::errors::InvariantViolation;
use shared_types::chain::RefundRules;

/// Refund cap divisor (EIP-3529).
pub const REFUND_QUOTIENT: u64 = 5;

/// Transition-local gas counters of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasCounters {
    initial_gas: u64,
    gas_remaining: u64,
    refund_counter: u64,
}

impl GasCounters {
    /// Creates counters, rejecting more gas remaining than was available.
    pub fn new(
        initial_gas: u64,
        gas_remaining: u64,
        refund_counter: u64,
    ) -> Result<Self, InvariantViolation> {
        if gas_remaining > initial_gas {
            return Err(InvariantViolation::GasRemainingExceedsInitial {
                initial: initial_gas,
                remaining: gas_remaining,
            });
        }
        Ok(Self {
            initial_gas,
            gas_remaining,
            refund_counter,
        })
    }

    /// Gas available at the start of the transition.
    #[must_use]
    pub fn initial_gas(&self) -> u64 {
        self.initial_gas
    }

    /// Gas left after execution.
    #[must_use]
    pub fn gas_remaining(&self) -> u64 {
        self.gas_remaining
    }

    /// Refund accumulated by execution.
    #[must_use]
    pub fn refund_counter(&self) -> u64 {
        self.refund_counter
    }

    /// `initial_gas - gas_remaining`.
    #[must_use]
    pub fn gas_used(&self) -> u64 {
        self.initial_gas - self.gas_remaining
    }
}

/// Computes the gas refund for finalized counters under the given rules.
#[must_use]
pub fn calc_refund(counters: &GasCounters, rules: RefundRules) -> u64 {
    calc_refund_raw(
        counters.refund_counter,
        counters.initial_gas,
        counters.gas_remaining,
        rules.token_ratio.get(),
        rules.post_fork_active,
    )
}

/// Raw-integer refund calculation.
///
/// `token_ratio` is only read when `post_fork_active` is set.
///
/// # Panics
///
/// Panics if `post_fork_active` is set and `token_ratio` is zero.
#[must_use]
pub fn calc_refund_raw(
    refund_counter: u64,
    initial_gas: u64,
    gas_remaining: u64,
    token_ratio: u64,
    post_fork_active: bool,
) -> u64 {
    let gas_used = if post_fork_active {
        assert!(token_ratio != 0, "token ratio must be non-zero");
        (initial_gas / token_ratio).saturating_sub(gas_remaining)
    } else {
        initial_gas.saturating_sub(gas_remaining)
    };
    refund_counter.min(gas_used / REFUND_QUOTIENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::chain::TokenRatio;

    const INITIAL_GAS: u64 = 10_000_000_000;
    const GAS_REMAINING: u64 = 500_000;
    const REFUND_COUNTER: u64 = 1_000_000;

    #[test]
    fn test_pre_fork_refund_limited_by_counter() {
        let counters = GasCounters::new(INITIAL_GAS, GAS_REMAINING, REFUND_COUNTER).unwrap();
        // cap is 1_999_900_000, far above the counter
        assert_eq!(calc_refund(&counters, RefundRules::pre_fork()), 1_000_000);
    }

    #[test]
    fn test_post_fork_refund_limited_by_scaled_gas() {
        let counters = GasCounters::new(INITIAL_GAS, GAS_REMAINING, REFUND_COUNTER).unwrap();
        let rules = RefundRules::post_fork(TokenRatio::new(4000).unwrap());
        // gas_used = 10_000_000_000 / 4000 - 500_000 = 2_000_000
        assert_eq!(calc_refund(&counters, rules), 400_000);
    }

    #[test]
    fn test_ratio_ignored_before_fork() {
        assert_eq!(
            calc_refund_raw(REFUND_COUNTER, INITIAL_GAS, GAS_REMAINING, 0, false),
            1_000_000
        );
    }

    #[test]
    #[should_panic(expected = "token ratio must be non-zero")]
    fn test_zero_ratio_after_fork_panics() {
        let _ = calc_refund_raw(REFUND_COUNTER, INITIAL_GAS, GAS_REMAINING, 0, true);
    }

    #[test]
    fn test_scaled_gas_below_remaining_gives_no_refund() {
        // 1_000_000 / 4000 = 250 < 500_000 remaining
        assert_eq!(calc_refund_raw(1_000, 1_000_000, 500_000, 4000, true), 0);
    }

    #[test]
    fn test_ratio_one_matches_pre_fork() {
        let counters = GasCounters::new(84_000, 21_000, 50_000).unwrap();
        assert_eq!(
            calc_refund(&counters, RefundRules::post_fork(TokenRatio::ONE)),
            calc_refund(&counters, RefundRules::pre_fork())
        );
    }

    #[test]
    fn test_counters_reject_excess_remaining() {
        assert_eq!(
            GasCounters::new(100, 101, 0),
            Err(InvariantViolation::GasRemainingExceedsInitial {
                initial: 100,
                remaining: 101
            })
        );
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert_eq!(calc_refund_raw(u64::MAX, u64::MAX, 0, 1, false), u64::MAX / 5);
        assert_eq!(calc_refund_raw(u64::MAX, u64::MAX, 0, u64::MAX, true), 0);
        assert_eq!(calc_refund_raw(0, u64::MAX, u64::MAX, 7, true), 0);
    }

    #[test]
    fn test_refund_formula_random_inputs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..1_000 {
            let initial = rng.gen_range(0..=u64::MAX / 2);
            let remaining = rng.gen_range(0..=initial);
            let counter = rng.gen_range(0..=initial);
            let ratio = rng.gen_range(1..=10_000u64);

            let pre = calc_refund_raw(counter, initial, remaining, ratio, false);
            assert_eq!(pre, counter.min((initial - remaining) / 5));

            let post = calc_refund_raw(counter, initial, remaining, ratio, true);
            let scaled = (initial / ratio).saturating_sub(remaining);
            assert_eq!(post, counter.min(scaled / 5));
            assert!(post <= pre);
        }
    }
}
