#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pool_controller::{PoolControllerContract, PoolControllerContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, BytesN, Env,
};
use staking_pool::{StakingPoolContract, StakingPoolContractClient};

const T0: u64 = 1_700_000_000;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { amount: u32, lock: u64 },
    Unstake { index: u8 },
    ClaimYield { bps: u16, restake: bool },
    Advance { seconds: u32 },
    Sync,
    ChangeWeight { weight: u16 },
    ChangeRate { rate: u32 },
    Pause { paused: bool },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(T0);

    let owner = Address::generate(&env);
    let pika = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let controller_id = env.register(PoolControllerContract, ());
    let controller = PoolControllerContractClient::new(&env, &controller_id);
    controller.initialize(&owner, &pika, &25_367_833_587i128);
    StellarAssetClient::new(&env, &pika).mint(&controller_id, &(i64::MAX as i128));

    let pool_id = env.register(StakingPoolContract, ());
    let pool = StakingPoolContractClient::new(&env, &pool_id);
    pool.initialize(
        &owner,
        &pika,
        &pika,
        &controller_id,
        &200u64,
        &BytesN::from_array(&env, &[4u8; 65]),
    );
    controller.register_pool(&owner, &pool_id);
    pool.set_cool_off_period(&owner, &0u64);

    let users: Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    let mut now = T0;

    // Errors are expected; the target hunts for host panics (overflow,
    // missing keys) and checks the weight bookkeeping after every step.
    for (i, action) in actions.into_iter().enumerate() {
        let user = &users[i % users.len()];
        match action {
            FuzzAction::Stake { amount, lock } => {
                let amount = amount as i128;
                StellarAssetClient::new(&env, &pika).mint(user, &amount.max(1));
                TokenClient::new(&env, &pika).approve(
                    user,
                    &pool_id,
                    &amount,
                    &(env.ledger().sequence() + 10_000),
                );
                let _ = pool.try_stake(user, &amount, &lock);
            }
            FuzzAction::Unstake { index } => {
                let _ = pool.try_unstake(user, &(index as u32));
            }
            FuzzAction::ClaimYield { bps, restake } => {
                let _ = pool.try_claim_yield(user, &(bps as u32), &restake, &None);
            }
            FuzzAction::Advance { seconds } => {
                now = now.saturating_add(seconds as u64);
                env.ledger().set_timestamp(now);
            }
            FuzzAction::Sync => {
                let _ = pool.try_sync();
            }
            FuzzAction::ChangeWeight { weight } => {
                let _ = controller.try_change_pool_weight(&owner, &pool_id, &(weight as u64));
            }
            FuzzAction::ChangeRate { rate } => {
                let _ = controller.try_update_pika_per_second(&owner, &(rate as i128));
            }
            FuzzAction::Pause { paused } => {
                let _ = pool.try_pause(&owner, &paused);
            }
        }

        assert_eq!(controller.get_total_weight(), pool.get_weight());

        let active: i128 = users
            .iter()
            .map(|u| pool.get_user_info(u).total_weight)
            .sum();
        assert_eq!(pool.get_global_stake_weight(), active);
    }
});
