use crate::constants::{
    MAX_EARLY_UNSTAKE_PENALTY, MAX_LOCK, MIN_EARLY_UNSTAKE_PENALTY, PENALTY_DENOMINATOR,
    WEIGHT_MULTIPLIER,
};

/// Fixed-point scaling factor.
///
/// `rewards_per_weight` is stored multiplied by this constant so that a
/// single second of emission spread over a large global weight still moves
/// the accumulator.
pub const PRECISION: i128 = 1_000_000_000_000;

// ── Accumulator ─────────────────────────────────────────────────────────────

/// Advance the pool's `rewards_per_weight` accumulator by `elapsed` seconds.
///
/// ```text
/// pool_reward = elapsed × pika_per_second × pool_weight / total_weight
/// Δrpw        = pool_reward × PRECISION / global_stake_weight
/// ```
///
/// Every multiplication happens before any division. Dividing by
/// `total_weight` and then by `global_stake_weight` floors the same as
/// dividing by their product, without forming the product.
///
/// The accumulator is unchanged when nothing is staked, when the controller
/// has no weight registered, or when no time has passed.
///
/// Returns `None` if `pika_per_second × elapsed × pool_weight × PRECISION`
/// or the new accumulator does not fit in an `i128`.
#[allow(clippy::arithmetic_side_effects)]
pub fn compute_rewards_per_weight(
    stored: i128,
    elapsed: u64,
    pika_per_second: i128,
    pool_weight: u64,
    total_weight: u64,
    global_stake_weight: i128,
) -> Option<i128> {
    if global_stake_weight <= 0 || total_weight == 0 || elapsed == 0 || pika_per_second <= 0 {
        return Some(stored);
    }

    let delta = pika_per_second
        .checked_mul(elapsed as i128)?
        .checked_mul(pool_weight as i128)?
        .checked_mul(PRECISION)?
        / total_weight as i128
        / global_stake_weight;

    stored.checked_add(delta)
}

/// Yield a position of `weight` earned since its `reward_debt` snapshot.
/// `None` on overflow.
#[allow(clippy::arithmetic_side_effects)]
pub fn earned(weight: i128, current_rpw: i128, reward_debt: i128) -> Option<i128> {
    Some(weight.checked_mul(current_rpw.checked_sub(reward_debt)?)? / PRECISION)
}

// ── Stake weight ────────────────────────────────────────────────────────────

/// Accrual weight of `amount` locked for `lock_duration` seconds.
///
/// Ranges linearly from `amount × WEIGHT_MULTIPLIER` at zero lock to twice
/// that at `MAX_LOCK`.
#[allow(clippy::arithmetic_side_effects)]
pub fn stake_weight(amount: i128, lock_duration: u64) -> i128 {
    let bonus = WEIGHT_MULTIPLIER.saturating_mul(lock_duration as i128) / MAX_LOCK as i128;
    amount.saturating_mul(WEIGHT_MULTIPLIER.saturating_add(bonus))
}

// ── Early-unstake penalty ───────────────────────────────────────────────────

/// Penalty, out of `PENALTY_DENOMINATOR`, for withdrawing at `now` a stake
/// locked over `[start, end)`.
///
/// Decays linearly from `MAX_EARLY_UNSTAKE_PENALTY` at `start` toward
/// `MIN_EARLY_UNSTAKE_PENALTY` at `end`. Clamped to the ceiling at or before
/// `start` and to the floor at or after `end`. A degenerate window
/// (`end <= start`) yields the ceiling.
#[allow(clippy::arithmetic_side_effects)]
pub fn early_unstake_percentage(now: u64, start: u64, end: u64) -> u32 {
    if end <= start || now <= start {
        return MAX_EARLY_UNSTAKE_PENALTY;
    }
    if now >= end {
        return MIN_EARLY_UNSTAKE_PENALTY;
    }

    let span = (end - start) as u128;
    let elapsed = (now - start) as u128;
    let range = (MAX_EARLY_UNSTAKE_PENALTY - MIN_EARLY_UNSTAKE_PENALTY) as u128;

    // elapsed < span, so the decay is strictly below `range`.
    MAX_EARLY_UNSTAKE_PENALTY - (range * elapsed / span) as u32
}

/// Portion of `principal` forfeited at `percentage` out of `PENALTY_DENOMINATOR`.
#[allow(clippy::arithmetic_side_effects)]
pub fn penalty_amount(principal: i128, percentage: u32) -> i128 {
    principal.saturating_mul(percentage as i128) / PENALTY_DENOMINATOR as i128
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure math, no Soroban environment.
