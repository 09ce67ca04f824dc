//! Compile-time configuration of a staking pool.

const DAY: u64 = 24 * 60 * 60;

/// Shortest lock a stake may choose.
pub const MIN_LOCK: u64 = 30 * DAY;
/// Longest lock a stake may choose.
pub const MAX_LOCK: u64 = 365 * DAY;

/// Lock applied to restaked rewards when the claim carries no duration.
pub const DEFAULT_RESTAKE_LOCK: u64 = MAX_LOCK;

/// Minimum gap between two successful claims by the same user.
pub const DEFAULT_COOL_OFF: u64 = 7 * DAY;

/// Weight of one unit staked for zero lock. A full `MAX_LOCK` doubles it.
pub const WEIGHT_MULTIPLIER: i128 = 1_000_000;

/// Early-unstake penalty at the start of the lock, out of `PENALTY_DENOMINATOR`.
pub const MAX_EARLY_UNSTAKE_PENALTY: u32 = 900;
/// Early-unstake penalty just before the lock ends.
pub const MIN_EARLY_UNSTAKE_PENALTY: u32 = 100;
pub const PENALTY_DENOMINATOR: u32 = 1_000;

/// Denominator of the fraction passed to `claim_yield`.
pub const BPS_DENOMINATOR: u32 = 10_000;
