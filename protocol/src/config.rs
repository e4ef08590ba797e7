//! # Protocol Configuration & Constants
//!
//! Every magic number in Bastion lives here. The vault's time-based rules
//! (timelock expiry, heir grace period, yield accrual) are all expressed in
//! blocks, so the block-rate assumptions below are load-bearing: change
//! `BLOCKS_PER_YEAR` and every yield figure and grace window moves with it.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Major version: bump on changes to the vault's authorization rules.
pub const PROTOCOL_VERSION_MAJOR: u16 = 0;

/// Minor version: bump on backward-compatible additions.
pub const PROTOCOL_VERSION_MINOR: u16 = 1;

/// Patch version: bump on fixes that do not alter state transitions.
pub const PROTOCOL_VERSION_PATCH: u16 = 0;

/// The full version string.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Timing Constants
// ---------------------------------------------------------------------------

/// Target block time of the host chain. Ten minutes, Bitcoin-anchored.
pub const BLOCK_TIME: Duration = Duration::from_secs(600);

/// Blocks produced per day at the target block time (24h / 10min).
pub const BLOCKS_PER_DAY: u64 = 144;

/// Approximate annual block production: 144 blocks/day * 365 days.
///
/// This is the denominator of every yield computation. Leap years and block
/// time variance are deliberately ignored; the yield is an approximation
/// anchored to block height, not to wall-clock time.
pub const BLOCKS_PER_YEAR: u64 = BLOCKS_PER_DAY * 365;

/// How long past timelock expiry the designated heir must wait before the
/// emergency path opens. One year of blocks.
pub const EMERGENCY_GRACE_BLOCKS: u64 = BLOCKS_PER_YEAR;

// ---------------------------------------------------------------------------
// Yield Parameters
// ---------------------------------------------------------------------------

/// The annual yield rate is a whole percentage. 100 means 100% APR, which is
/// the ceiling `adjust_yield_rate` will accept.
pub const MAX_YIELD_RATE_PERCENT: u32 = 100;

/// Yield rate a freshly deployed vault starts with.
pub const DEFAULT_YIELD_RATE_PERCENT: u32 = 5;

/// Divisor that turns a whole-percent rate into a fraction.
pub const PERCENT_DENOMINATOR: u64 = 100;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Converts a block count into the approximate wall-clock span it covers.
/// Used for log output only; no rule in the vault depends on wall time.
pub fn blocks_to_duration(blocks: u64) -> Duration {
    BLOCK_TIME.saturating_mul(u32::try_from(blocks).unwrap_or(u32::MAX))
}

/// Returns `true` if `rate` is an acceptable annual yield percentage.
pub fn is_valid_yield_rate(rate: u32) -> bool {
    rate <= MAX_YIELD_RATE_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_per_year_matches_ten_minute_blocks() {
        assert_eq!(BLOCKS_PER_YEAR, 52_560);
        assert_eq!(BLOCK_TIME.as_secs() * BLOCKS_PER_DAY, 24 * 60 * 60);
    }

    #[test]
    fn test_grace_period_is_one_year() {
        assert_eq!(EMERGENCY_GRACE_BLOCKS, BLOCKS_PER_YEAR);
    }

    #[test]
    fn test_default_rate_is_valid() {
        assert!(is_valid_yield_rate(DEFAULT_YIELD_RATE_PERCENT));
        assert!(is_valid_yield_rate(0));
        assert!(is_valid_yield_rate(MAX_YIELD_RATE_PERCENT));
        assert!(!is_valid_yield_rate(MAX_YIELD_RATE_PERCENT + 1));
    }

    #[test]
    fn test_blocks_to_duration() {
        assert_eq!(blocks_to_duration(BLOCKS_PER_DAY).as_secs(), 86_400);
        assert_eq!(blocks_to_duration(0), Duration::ZERO);
    }
}
