#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the controller is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub reward_token: Address,
    pub pika_per_second: i128,
    pub timestamp: u64,
}

/// Fired when a pool joins the registry.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolRegisteredEvent {
    pub pool: Address,
    pub token: Address,
    pub weight: u64,
    pub new_total_weight: u64,
    pub timestamp: u64,
}

/// Fired when the owner changes a pool's weight.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolWeightChangedEvent {
    pub pool: Address,
    pub old_weight: u64,
    pub new_weight: u64,
    pub new_total_weight: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmissionRateUpdatedEvent {
    pub old_rate: i128,
    pub new_rate: i128,
    pub timestamp: u64,
}

/// Fired whenever reserve tokens leave the controller.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardTransferredEvent {
    pub pool: Address,
    pub to: Address,
    pub amount: i128,
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

pub fn publish_initialized(env: &Env, owner: Address, reward_token: Address, pika_per_second: i128) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            reward_token,
            pika_per_second,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_registered(
    env: &Env,
    pool: Address,
    token: Address,
    weight: u64,
    new_total_weight: u64,
) {
    env.events().publish(
        (symbol_short!("POOL_REG"), pool.clone()),
        PoolRegisteredEvent {
            pool,
            token,
            weight,
            new_total_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_weight_changed(
    env: &Env,
    pool: Address,
    old_weight: u64,
    new_weight: u64,
    new_total_weight: u64,
) {
    env.events().publish(
        (symbol_short!("POOL_WGT"), pool.clone()),
        PoolWeightChangedEvent {
            pool,
            old_weight,
            new_weight,
            new_total_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emission_rate_updated(env: &Env, old_rate: i128, new_rate: i128) {
    env.events().publish(
        (symbol_short!("RATE_UPD"),),
        EmissionRateUpdatedEvent {
            old_rate,
            new_rate,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_transferred(env: &Env, pool: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RWD_XFER"), pool.clone(), to.clone()),
        RewardTransferredEvent {
            pool,
            to,
            amount,
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
