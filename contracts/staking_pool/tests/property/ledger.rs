#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for pool and controller bookkeeping.
//!
//! Invariants tested:
//! - The controller's total weight always equals the sum of pool weights
//! - A pool's global stake weight always equals the sum of active record
//!   weights
//! - `pending_rewards` is unchanged by a `sync` at the same timestamp
//! - Equal stakes made together accrue equal yield

use pool_controller::{PoolControllerContract, PoolControllerContractClient};
use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, BytesN, Env};
use staking_pool::constants::{MAX_LOCK, MIN_LOCK};
use staking_pool::{StakingPoolContract, StakingPoolContractClient};

const T0: u64 = 1_700_000_000;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn setup(
    rate: i128,
) -> (
    Env,
    PoolControllerContractClient<'static>,
    Address, // owner
    Address, // reward token
) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(T0);

    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let owner = Address::generate(&env);

    let controller_id = env.register(PoolControllerContract, ());
    let controller = PoolControllerContractClient::new(&env, &controller_id);
    controller.initialize(&owner, &reward_token, &rate);
    StellarAssetClient::new(&env, &reward_token).mint(&controller_id, &(i64::MAX as i128));

    (env, controller, owner, reward_token)
}

fn add_pool(
    env: &Env,
    controller: &PoolControllerContractClient,
    owner: &Address,
    reward_token: &Address,
    weight: u64,
) -> StakingPoolContractClient<'static> {
    let pool_id = env.register(StakingPoolContract, ());
    let pool = StakingPoolContractClient::new(env, &pool_id);
    pool.initialize(
        owner,
        reward_token,
        reward_token,
        &controller.address,
        &weight,
        &BytesN::from_array(env, &[4u8; 65]),
    );
    controller.register_pool(owner, &pool_id);
    pool
}

fn stake(
    env: &Env,
    pool: &StakingPoolContractClient,
    token: &Address,
    user: &Address,
    amount: i128,
    lock: u64,
) {
    StellarAssetClient::new(env, token).mint(user, &amount);
    TokenClient::new(env, token).approve(
        user,
        &pool.address,
        &amount,
        &(env.ledger().sequence() + 10_000),
    );
    pool.stake(user, &amount, &lock);
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_total_weight_tracks_pool_weights(
        initial in proptest::collection::vec(0u64..1_000, 1..4),
        changes in proptest::collection::vec((0usize..4, 0u64..1_000), 0..6),
    ) {
        let (env, controller, owner, reward_token) = setup(1_000);
        let pools: std::vec::Vec<_> = initial
            .iter()
            .map(|weight| add_pool(&env, &controller, &owner, &reward_token, *weight))
            .collect();

        for (slot, weight) in changes {
            let pool = &pools[slot % pools.len()];
            controller.change_pool_weight(&owner, &pool.address, &weight);
        }

        let sum: u64 = pools.iter().map(|pool| pool.get_weight()).sum();
        prop_assert_eq!(controller.get_total_weight(), sum);
    }

    #[test]
    fn prop_global_weight_tracks_active_records(
        deposits in proptest::collection::vec((1i128..1_000_000, MIN_LOCK..=MAX_LOCK), 1..6),
        exits in proptest::collection::vec(any::<bool>(), 6),
    ) {
        let (env, controller, owner, reward_token) = setup(1_000);
        let pool = add_pool(&env, &controller, &owner, &reward_token, 100);
        let user = Address::generate(&env);

        for (amount, lock) in deposits.iter() {
            stake(&env, &pool, &reward_token, &user, *amount, *lock);
        }
        env.ledger().set_timestamp(T0 + 1_000);
        for (index, exit) in exits.iter().take(deposits.len()).enumerate() {
            if *exit {
                pool.unstake(&user, &(index as u32));
            }
        }

        let active: i128 = pool
            .get_paginated_stakes(&user, &0, &u32::MAX)
            .iter()
            .filter(|record| !record.unstaked)
            .map(|record| record.weight)
            .sum();
        prop_assert_eq!(pool.get_global_stake_weight(), active);
        prop_assert_eq!(pool.get_user_info(&user).total_weight, active);
    }

    #[test]
    fn prop_sync_does_not_change_pending(
        amount in 1i128..1_000_000_000,
        lock in MIN_LOCK..=MAX_LOCK,
        elapsed in 1u64..10_000_000,
    ) {
        let (env, controller, owner, reward_token) = setup(25_367_833_587);
        let pool = add_pool(&env, &controller, &owner, &reward_token, 200);
        let user = Address::generate(&env);
        stake(&env, &pool, &reward_token, &user, amount, lock);

        env.ledger().set_timestamp(T0 + elapsed);
        let before = pool.pending_rewards(&user);
        pool.sync();
        prop_assert_eq!(pool.pending_rewards(&user), before);
    }

    #[test]
    fn prop_equal_stakes_accrue_equally(
        amount in 1i128..1_000_000_000,
        lock in MIN_LOCK..=MAX_LOCK,
        elapsed in 1u64..10_000_000,
    ) {
        let (env, controller, owner, reward_token) = setup(25_367_833_587);
        let pool = add_pool(&env, &controller, &owner, &reward_token, 200);
        let alice = Address::generate(&env);
        let bob = Address::generate(&env);
        stake(&env, &pool, &reward_token, &alice, amount, lock);
        stake(&env, &pool, &reward_token, &bob, amount, lock);

        env.ledger().set_timestamp(T0 + elapsed);
        let diff = pool.pending_rewards(&alice) - pool.pending_rewards(&bob);
        prop_assert!(diff.abs() <= 1);
    }
}
