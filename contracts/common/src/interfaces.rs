//! # Cross-contract interfaces
//!
//! The pool controller and the staking pools reference each other only
//! through these traits. `#[contractclient]` turns each trait into a client
//! type, so a pool holds the controller's [`Address`] and talks to it through
//! [`PoolControllerClient`], never through shared storage.
//!
//! The host rejects re-entrant calls into a contract that is already on the
//! call stack. The controller therefore never asks a pool to call back for
//! emission data during a weight or rate change; it pushes an
//! [`EmissionParams`] snapshot along with the call instead.

use soroban_sdk::{contractclient, contracttype, Address, Env};

/// Snapshot of the controller-wide emission settings a pool needs to advance
/// its accumulator.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmissionParams {
    /// Reward tokens emitted per second across every registered pool.
    pub pika_per_second: i128,
    /// Sum of the weights of every registered pool.
    pub total_weight: u64,
}

/// Surface a staking pool exposes to the controller and to sibling pools.
#[contractclient(name = "StakingPoolClient")]
pub trait StakingPoolInterface {
    /// The pool's declared share of the controller's total weight.
    fn get_weight(env: Env) -> u64;

    /// Token users deposit into the pool.
    fn get_stake_token(env: Env) -> Address;

    /// Flush the accumulator under `emission`. Controller only.
    fn checkpoint(env: Env, controller: Address, emission: EmissionParams);

    /// Flush the accumulator under `emission`, then apply `new_weight`.
    /// Controller only.
    fn set_weight(env: Env, controller: Address, new_weight: u64, emission: EmissionParams);

    /// Record a stake for `staker` whose funds `pool` has already routed to
    /// this pool. Registered pools only. Returns the new stake index.
    fn stake_as_pool(
        env: Env,
        pool: Address,
        staker: Address,
        amount: i128,
        lock_duration: u64,
    ) -> u32;
}

/// Surface the pool controller exposes to staking pools.
#[contractclient(name = "PoolControllerClient")]
pub trait PoolControllerInterface {
    /// Current emission rate and total weight.
    fn emission(env: Env) -> EmissionParams;

    /// Whether `pool` is a registered pool.
    fn is_pool(env: Env, pool: Address) -> bool;

    /// The pool bound to `token`, if any.
    fn get_pool_for_token(env: Env, token: Address) -> Option<Address>;

    /// Pay `amount` reward tokens from the reserve to `to`. Registered pools
    /// only.
    fn transfer_reward_pika(env: Env, pool: Address, to: Address, amount: i128);
}
