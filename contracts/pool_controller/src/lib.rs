#![no_std]

pub mod events;

use common::{ownable, EmissionParams, StakingPoolClient, TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, Env, Symbol, Vec,
};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const PIKA_PER_SECOND: Symbol = symbol_short!("PIKA_SEC");
const TOTAL_WEIGHT: Symbol = symbol_short!("TOT_WGT");
const POOLS: Symbol = symbol_short!("POOLS");

/// Per-pool and per-token persistent keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum RegistryKey {
    IsPool(Address),
    TokenPool(Address),
}

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ControllerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    OwnableUnauthorizedAccount = 3,
    AlreadyRegistered = 4,
    UnAuthorized = 5,
    ZeroAmount = 6,
    PoolNotRegistered = 7,
    InvalidInput = 8,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct PoolControllerContract;

#[contractimpl]
impl PoolControllerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the controller.
    ///
    /// * `reward_token`    – token held in reserve and paid out as rewards.
    /// * `pika_per_second` – reward tokens emitted per second across all pools.
    pub fn initialize(
        env: Env,
        owner: Address,
        reward_token: Address,
        pika_per_second: i128,
    ) -> Result<(), ControllerError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ControllerError::AlreadyInitialized);
        }
        if pika_per_second <= 0 {
            return Err(ControllerError::ZeroAmount);
        }

        ownable::set_owner(&env, &owner);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&PIKA_PER_SECOND, &pika_per_second);
        env.storage().instance().set(&TOTAL_WEIGHT, &0u64);
        env.storage().instance().set(&POOLS, &Vec::<Address>::new(&env));
        Self::extend_instance_ttl(&env);

        events::publish_initialized(&env, owner, reward_token, pika_per_second);

        Ok(())
    }

    // ── Registry ────────────────────────────────────────────────────────────

    /// Register `pool` under its own stake token.
    ///
    /// The pool must have been initialised with this controller.
    ///
    /// The token binding is only written when no other pool already claims
    /// that token; use `add_pool` to bind explicitly.
    pub fn register_pool(env: Env, owner: Address, pool: Address) -> Result<(), ControllerError> {
        Self::require_owner(&env, &owner)?;

        let token = StakingPoolClient::new(&env, &pool).get_stake_token();
        let bind = !env
            .storage()
            .persistent()
            .has(&RegistryKey::TokenPool(token.clone()));

        Self::register(&env, &pool, &token, bind)
    }

    /// Register `pool` and bind it as the pool for `token`.
    ///
    /// Cross-pool restakes look up the pool bound to the reward token, so
    /// this is how a reward-only pool learns where to compound.
    pub fn add_pool(
        env: Env,
        owner: Address,
        pool: Address,
        token: Address,
    ) -> Result<(), ControllerError> {
        Self::require_owner(&env, &owner)?;
        Self::register(&env, &pool, &token, true)
    }

    /// Change the weight of a registered pool.
    ///
    /// Every pool is checkpointed under the old emission parameters first,
    /// so yield already accrued is never re-priced by the new total weight.
    pub fn change_pool_weight(
        env: Env,
        owner: Address,
        pool: Address,
        new_weight: u64,
    ) -> Result<(), ControllerError> {
        Self::require_owner(&env, &owner)?;
        if !Self::is_pool(env.clone(), pool.clone()) {
            return Err(ControllerError::PoolNotRegistered);
        }

        let emission = Self::emission(env.clone());
        let controller = env.current_contract_address();
        let target = StakingPoolClient::new(&env, &pool);
        let old_weight = target.get_weight();

        let new_total = emission
            .total_weight
            .checked_sub(old_weight)
            .and_then(|rest| rest.checked_add(new_weight))
            .ok_or(ControllerError::InvalidInput)?;

        // The target flushes inside `set_weight`; the rest are flushed here.
        for other in Self::pools(&env).iter() {
            if other != pool {
                StakingPoolClient::new(&env, &other).checkpoint(&controller, &emission);
            }
        }
        target.set_weight(&controller, &new_weight, &emission);

        env.storage().instance().set(&TOTAL_WEIGHT, &new_total);
        Self::extend_instance_ttl(&env);

        events::publish_pool_weight_changed(&env, pool, old_weight, new_weight, new_total);

        Ok(())
    }

    /// Change the global emission rate.
    ///
    /// All pools are checkpointed at the old rate; the new rate applies from
    /// the current timestamp onward.
    pub fn update_pika_per_second(
        env: Env,
        owner: Address,
        rate: i128,
    ) -> Result<(), ControllerError> {
        Self::require_owner(&env, &owner)?;
        if rate <= 0 {
            return Err(ControllerError::ZeroAmount);
        }

        let emission = Self::emission(env.clone());
        let controller = env.current_contract_address();
        for pool in Self::pools(&env).iter() {
            StakingPoolClient::new(&env, &pool).checkpoint(&controller, &emission);
        }

        env.storage().instance().set(&PIKA_PER_SECOND, &rate);
        Self::extend_instance_ttl(&env);

        events::publish_emission_rate_updated(&env, emission.pika_per_second, rate);

        Ok(())
    }

    // ── Reserve ─────────────────────────────────────────────────────────────

    /// Pay `amount` reward tokens from the reserve to `to`.
    ///
    /// Only a registered pool may draw on the reserve. A shortfall surfaces
    /// as the token contract's own balance error.
    pub fn transfer_reward_pika(
        env: Env,
        pool: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ControllerError> {
        Self::require_initialized(&env)?;
        pool.require_auth();

        if !Self::is_pool(env.clone(), pool.clone()) {
            return Err(ControllerError::UnAuthorized);
        }
        if amount <= 0 {
            return Err(ControllerError::ZeroAmount);
        }

        let reward_token = Self::get_reward_token(env.clone())?;
        token::Client::new(&env, &reward_token).transfer(
            &env.current_contract_address(),
            &to,
            &amount,
        );

        log!(&env, "reserve payout", pool, amount);
        events::publish_reward_transferred(&env, pool, to, amount);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Current emission rate and total weight in one read.
    pub fn emission(env: Env) -> EmissionParams {
        EmissionParams {
            pika_per_second: env.storage().instance().get(&PIKA_PER_SECOND).unwrap_or(0),
            total_weight: env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0),
        }
    }

    pub fn get_total_weight(env: Env) -> u64 {
        env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0)
    }

    pub fn get_pika_per_second(env: Env) -> i128 {
        env.storage().instance().get(&PIKA_PER_SECOND).unwrap_or(0)
    }

    /// Every registered pool, in registration order.
    pub fn get_pools(env: Env) -> Vec<Address> {
        Self::pools(&env)
    }

    pub fn is_pool(env: Env, pool: Address) -> bool {
        env.storage()
            .persistent()
            .get(&RegistryKey::IsPool(pool))
            .unwrap_or(false)
    }

    pub fn get_pool_for_token(env: Env, token: Address) -> Option<Address> {
        env.storage().persistent().get(&RegistryKey::TokenPool(token))
    }

    /// Reward-token balance the controller holds for payouts.
    pub fn get_reserve(env: Env) -> Result<i128, ControllerError> {
        let reward_token = Self::get_reward_token(env.clone())?;
        Ok(token::Client::new(&env, &reward_token).balance(&env.current_contract_address()))
    }

    pub fn get_reward_token(env: Env) -> Result<Address, ControllerError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ControllerError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_owner(env: Env) -> Result<Address, ControllerError> {
        ownable::get_owner(&env).ok_or(ControllerError::NotInitialized)
    }

    // ── Ownership transfer (two-step) ───────────────────────────────────────

    /// Propose a new owner. The candidate must call `accept_owner`.
    pub fn propose_owner(
        env: Env,
        current_owner: Address,
        new_owner: Address,
    ) -> Result<(), ControllerError> {
        Self::require_owner(&env, &current_owner)?;
        ownable::propose_owner(&env, &new_owner);
        events::publish_owner_transfer_proposed(&env, current_owner, new_owner);
        Ok(())
    }

    pub fn accept_owner(env: Env, new_owner: Address) -> Result<(), ControllerError> {
        Self::require_initialized(&env)?;
        new_owner.require_auth();

        let old_owner = ownable::accept_owner(&env, &new_owner)
            .ok_or(ControllerError::OwnableUnauthorizedAccount)?;

        events::publish_owner_transfer_accepted(&env, old_owner, new_owner);
        Ok(())
    }

    pub fn cancel_owner_transfer(env: Env, current_owner: Address) -> Result<(), ControllerError> {
        Self::require_owner(&env, &current_owner)?;
        let pending =
            ownable::cancel_pending_owner(&env).ok_or(ControllerError::InvalidInput)?;
        events::publish_owner_transfer_cancelled(&env, current_owner, pending);
        Ok(())
    }

    pub fn get_pending_owner(env: Env) -> Option<Address> {
        ownable::get_pending_owner(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ControllerError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ControllerError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: authenticate `caller` and revert unless it is the owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), ControllerError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        if !ownable::is_owner(env, caller) {
            return Err(ControllerError::OwnableUnauthorizedAccount);
        }
        Ok(())
    }

    fn pools(env: &Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&POOLS)
            .unwrap_or_else(|| Vec::new(env))
    }

    /// Shared body of `register_pool` and `add_pool`.
    fn register(
        env: &Env,
        pool: &Address,
        token: &Address,
        bind_token: bool,
    ) -> Result<(), ControllerError> {
        let pool_key = RegistryKey::IsPool(pool.clone());
        if env.storage().persistent().has(&pool_key) {
            return Err(ControllerError::AlreadyRegistered);
        }

        let newcomer = StakingPoolClient::new(env, pool);
        let weight = newcomer.get_weight();
        let emission = Self::emission(env.clone());
        let new_total = emission
            .total_weight
            .checked_add(weight)
            .ok_or(ControllerError::InvalidInput)?;

        // Existing pools close out the period priced at the old total weight.
        let controller = env.current_contract_address();
        for other in Self::pools(env).iter() {
            StakingPoolClient::new(env, &other).checkpoint(&controller, &emission);
        }
        // The newcomer has earned nothing before registration.
        newcomer.checkpoint(
            &controller,
            &EmissionParams {
                pika_per_second: emission.pika_per_second,
                total_weight: 0,
            },
        );

        env.storage().persistent().set(&pool_key, &true);
        env.storage()
            .persistent()
            .extend_ttl(&pool_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        if bind_token {
            let token_key = RegistryKey::TokenPool(token.clone());
            env.storage().persistent().set(&token_key, pool);
            env.storage()
                .persistent()
                .extend_ttl(&token_key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }

        let mut pools = Self::pools(env);
        pools.push_back(pool.clone());
        env.storage().instance().set(&POOLS, &pools);
        env.storage().instance().set(&TOTAL_WEIGHT, &new_total);
        Self::extend_instance_ttl(env);

        events::publish_pool_registered(env, pool.clone(), token.clone(), weight, new_total);

        Ok(())
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
