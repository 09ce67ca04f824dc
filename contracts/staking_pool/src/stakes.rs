use common::{TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{contracttype, Address, Env, Vec};

// ── Types ───────────────────────────────────────────────────────────────────

/// One deposit. Records are appended per user and never reordered, so the
/// index returned by `stake` stays a valid handle for `unstake`.
///
/// Once `unstaked` is set the record is inert: it no longer contributes
/// weight and a second unstake is rejected.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeRecord {
    /// Deposited amount in the stake token's smallest unit.
    pub principal: i128,
    /// Accrual weight derived from `principal` and the lock duration.
    pub weight: i128,
    pub start_time: u64,
    pub lock_end: u64,
    /// Accumulator value when the record was opened, and again when it was
    /// retired. Accrual itself is tracked per user in `UserInfo`.
    pub reward_debt: i128,
    pub unstaked: bool,
}

/// Per-user aggregates kept alongside the record sequence.
///
/// Yield is settled against these aggregates alone: every change to
/// `total_weight` first moves `total_weight × (rpw - reward_debt)` into
/// `unclaimed`, so no path needs to walk the records.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserInfo {
    /// Principal across all active records.
    pub total_principal: i128,
    /// Weight across all active records.
    pub total_weight: i128,
    /// Settled yield not yet claimed.
    pub unclaimed: i128,
    /// Accumulator value at the last settlement.
    pub reward_debt: i128,
    /// Timestamp of the last successful claim.
    pub last_claim: Option<u64>,
}

impl UserInfo {
    fn empty() -> Self {
        Self {
            total_principal: 0,
            total_weight: 0,
            unclaimed: 0,
            reward_debt: 0,
            last_claim: None,
        }
    }
}

// ── Storage keys ────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum StakeKey {
    Count(Address),
    Record(Address, u32),
    User(Address),
}

fn bump(env: &Env, key: &StakeKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Record sequence ─────────────────────────────────────────────────────────

/// Number of records ever appended for `user`, unstaked ones included.
pub fn stakes_len(env: &Env, user: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&StakeKey::Count(user.clone()))
        .unwrap_or(0)
}

pub fn get_record(env: &Env, user: &Address, index: u32) -> Option<StakeRecord> {
    env.storage()
        .persistent()
        .get(&StakeKey::Record(user.clone(), index))
}

/// Overwrite the record at an existing `index`.
pub fn store_record(env: &Env, user: &Address, index: u32, record: &StakeRecord) {
    let key = StakeKey::Record(user.clone(), index);
    env.storage().persistent().set(&key, record);
    bump(env, &key);
}

/// Append `record` and return its index.
pub fn push_record(env: &Env, user: &Address, record: &StakeRecord) -> u32 {
    let index = stakes_len(env, user);
    store_record(env, user, index, record);

    let count_key = StakeKey::Count(user.clone());
    env.storage()
        .persistent()
        .set(&count_key, &index.saturating_add(1));
    bump(env, &count_key);

    index
}

/// Records in `[start, end)`; `end` past the sequence is clamped.
pub fn records_in_range(env: &Env, user: &Address, start: u32, end: u32) -> Vec<StakeRecord> {
    let end = end.min(stakes_len(env, user));
    let mut page = Vec::new(env);
    for index in start..end {
        if let Some(record) = get_record(env, user, index) {
            page.push_back(record);
        }
    }
    page
}

// ── User aggregates ─────────────────────────────────────────────────────────

pub fn load_user(env: &Env, user: &Address) -> UserInfo {
    env.storage()
        .persistent()
        .get(&StakeKey::User(user.clone()))
        .unwrap_or_else(UserInfo::empty)
}

pub fn store_user(env: &Env, user: &Address, info: &UserInfo) {
    let key = StakeKey::User(user.clone());
    env.storage().persistent().set(&key, info);
    bump(env, &key);
}
