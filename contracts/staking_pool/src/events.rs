#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the pool is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub controller: Address,
    pub weight: u64,
    pub timestamp: u64,
}

/// Fired when a stake record is appended, by deposit or by restake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub pool: Address,
    pub index: u32,
    pub amount: i128,
    pub weight: i128,
    pub lock_end: u64,
    pub global_stake_weight: i128,
    pub timestamp: u64,
}

/// Fired when a record is unstaked.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub staker: Address,
    pub pool: Address,
    pub index: u32,
    pub principal: i128,
    pub penalty: i128,
    pub returned: i128,
    pub timestamp: u64,
}

/// Fired on every successful claim, signed or ledger-computed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub user: Address,
    pub pool: Address,
    pub amount: i128,
    pub restake: bool,
    pub nonce: Option<u64>,
    pub timestamp: u64,
}

/// Fired when the accumulator is flushed through `sync` or a controller
/// checkpoint.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncedEvent {
    pub pool: Address,
    pub rewards_per_weight: i128,
    pub global_stake_weight: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PausedEvent {
    pub paused: bool,
    pub timestamp: u64,
}

/// Fired when the controller changes this pool's weight.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WeightSetEvent {
    pub old_weight: u64,
    pub new_weight: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerifierSetEvent {
    pub verifier: BytesN<65>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DefaultLockSetEvent {
    pub lock_duration: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoolOffSetEvent {
    pub period: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerTransferProposedEvent {
    pub current_owner: Address,
    pub proposed_owner: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerTransferAcceptedEvent {
    pub old_owner: Address,
    pub new_owner: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerTransferCancelledEvent {
    pub owner: Address,
    pub cancelled_proposed: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    owner: Address,
    stake_token: Address,
    reward_token: Address,
    controller: Address,
    weight: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            stake_token,
            reward_token,
            controller,
            weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    index: u32,
    amount: i128,
    weight: i128,
    lock_end: u64,
    global_stake_weight: i128,
) {
    env.events().publish(
        (symbol_short!("STAKE"), staker.clone()),
        StakedEvent {
            staker,
            pool: env.current_contract_address(),
            index,
            amount,
            weight,
            lock_end,
            global_stake_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    staker: Address,
    index: u32,
    principal: i128,
    penalty: i128,
    returned: i128,
) {
    env.events().publish(
        (symbol_short!("UNSTAKE"), staker.clone()),
        UnstakedEvent {
            staker,
            pool: env.current_contract_address(),
            index,
            principal,
            penalty,
            returned,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_claimed(
    env: &Env,
    user: Address,
    amount: i128,
    restake: bool,
    nonce: Option<u64>,
) {
    env.events().publish(
        (symbol_short!("CLAIM"), user.clone()),
        RewardClaimedEvent {
            user,
            pool: env.current_contract_address(),
            amount,
            restake,
            nonce,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_synced(env: &Env, rewards_per_weight: i128, global_stake_weight: i128) {
    env.events().publish(
        (symbol_short!("SYNC"),),
        SyncedEvent {
            pool: env.current_contract_address(),
            rewards_per_weight,
            global_stake_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_paused(env: &Env, paused: bool) {
    env.events().publish(
        (symbol_short!("PAUSED"),),
        PausedEvent {
            paused,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_weight_set(env: &Env, old_weight: u64, new_weight: u64) {
    env.events().publish(
        (symbol_short!("WEIGHT"),),
        WeightSetEvent {
            old_weight,
            new_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_verifier_set(env: &Env, verifier: BytesN<65>) {
    env.events().publish(
        (symbol_short!("VERIFIER"),),
        VerifierSetEvent {
            verifier,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_default_lock_set(env: &Env, lock_duration: u64) {
    env.events().publish(
        (symbol_short!("LOCK_SET"),),
        DefaultLockSetEvent {
            lock_duration,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_cool_off_set(env: &Env, period: u64) {
    env.events().publish(
        (symbol_short!("COOL_SET"),),
        CoolOffSetEvent {
            period,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_owner_transfer_proposed(env: &Env, current_owner: Address, proposed_owner: Address) {
    env.events().publish(
        (symbol_short!("OWN_PROP"), current_owner.clone()),
        OwnerTransferProposedEvent {
            current_owner,
            proposed_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_owner_transfer_accepted(env: &Env, old_owner: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWN_ACPT"), new_owner.clone()),
        OwnerTransferAcceptedEvent {
            old_owner,
            new_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_owner_transfer_cancelled(env: &Env, owner: Address, cancelled_proposed: Address) {
    env.events().publish(
        (symbol_short!("OWN_CNCL"), owner.clone()),
        OwnerTransferCancelledEvent {
            owner,
            cancelled_proposed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
