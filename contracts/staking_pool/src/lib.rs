#![no_std]

pub mod claims;
pub mod constants;
pub mod events;
pub mod rewards;
pub mod stakes;

use common::{
    ownable, EmissionParams, PoolControllerClient, StakingPoolClient, TTL_EXTEND_TO,
    TTL_THRESHOLD,
};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, BytesN, Env, Symbol,
    Vec,
};

use claims::{ClaimRequest, ClaimSignature};
use constants::{
    BPS_DENOMINATOR, DEFAULT_COOL_OFF, DEFAULT_RESTAKE_LOCK, MAX_LOCK, MIN_LOCK,
    PENALTY_DENOMINATOR,
};
use stakes::{StakeRecord, UserInfo};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const CONTROLLER: Symbol = symbol_short!("CTRL");
const VERIFIER: Symbol = symbol_short!("VERIFIER");
const REWARDS_PER_WEIGHT: Symbol = symbol_short!("RPW");
const GLOBAL_WEIGHT: Symbol = symbol_short!("GLB_WGT");
const LAST_SYNC: Symbol = symbol_short!("LAST_SYN");
const POOL_WEIGHT: Symbol = symbol_short!("WEIGHT");
const PAUSED: Symbol = symbol_short!("PAUSED");
const DEFAULT_LOCK: Symbol = symbol_short!("DEF_LOCK");
const COOL_OFF: Symbol = symbol_short!("COOL_OFF");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    OwnableUnauthorizedAccount = 3,
    OnlyFactory = 4,
    UnAuthorized = 5,
    ZeroAmount = 6,
    ZeroAddress = 7,
    InvalidLockDuration = 8,
    InvalidOperation = 9,
    InvalidPercentage = 10,
    AlreadyUnstaked = 11,
    StakeNotFound = 12,
    CoolOffPeriodIsNotOver = 13,
    NonceAlreadyUsed = 14,
    WrongHash = 15,
    ContractIsPaused = 16,
    PoolNotFound = 17,
    ArithmeticOverflow = 18,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Static wiring of a pool, returned by `get_config`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    pub stake_token: Address,
    pub reward_token: Address,
    pub controller: Address,
    pub default_lock: u64,
    pub cool_off: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingPoolContract;

#[contractimpl]
impl StakingPoolContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool.
    ///
    /// * `stake_token`  – token users deposit.
    /// * `reward_token` – token the controller pays rewards in.
    /// * `controller`   – the pool controller that owns weights and emission.
    /// * `weight`       – declared weight, read by the controller on registration.
    /// * `verifier`     – secp256k1 public key that signs off-chain claims.
    pub fn initialize(
        env: Env,
        owner: Address,
        stake_token: Address,
        reward_token: Address,
        controller: Address,
        weight: u64,
        verifier: BytesN<65>,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if claims::is_null_identity(&verifier) {
            return Err(ContractError::ZeroAddress);
        }

        let now = env.ledger().timestamp();

        ownable::set_owner(&env, &owner);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&CONTROLLER, &controller);
        env.storage().instance().set(&VERIFIER, &verifier);
        env.storage().instance().set(&POOL_WEIGHT, &weight);
        env.storage().instance().set(&LAST_SYNC, &now);
        env.storage().instance().set(&PAUSED, &false);
        env.storage()
            .instance()
            .set(&DEFAULT_LOCK, &DEFAULT_RESTAKE_LOCK);
        env.storage().instance().set(&COOL_OFF, &DEFAULT_COOL_OFF);
        // REWARDS_PER_WEIGHT and GLOBAL_WEIGHT start at zero;
        // unwrap_or(0) handles the absent keys.
        Self::extend_instance_ttl(&env);

        events::publish_initialized(&env, owner, stake_token, reward_token, controller, weight);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` for `lock_duration` seconds and return the new
    /// record's index.
    ///
    /// The pool pulls the tokens with `transfer_from`, so `staker` must have
    /// approved the pool for at least `amount` beforehand.
    pub fn stake(
        env: Env,
        staker: Address,
        amount: i128,
        lock_duration: u64,
    ) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;
        Self::require_not_paused(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }
        Self::validate_lock(lock_duration)?;

        let rpw = Self::ensure_synced(&env)?;

        let mut info = stakes::load_user(&env, &staker);
        let index = Self::append_stake(&env, &staker, &mut info, amount, lock_duration, rpw)?;
        stakes::store_user(&env, &staker, &info);

        let pool = env.current_contract_address();
        token::Client::new(&env, &Self::stake_token(&env)?).transfer_from(
            &pool,
            &staker,
            &pool,
            &amount,
        );

        Ok(index)
    }

    /// Record a stake whose funds another registered pool has already routed
    /// here. This is how a reward-only pool compounds into the pool that
    /// stakes the reward token.
    pub fn stake_as_pool(
        env: Env,
        pool: Address,
        staker: Address,
        amount: i128,
        lock_duration: u64,
    ) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;
        Self::require_not_paused(&env)?;
        pool.require_auth();

        if !Self::controller_client(&env)?.is_pool(&pool) {
            return Err(ContractError::UnAuthorized);
        }
        if amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }
        Self::validate_lock(lock_duration)?;

        let rpw = Self::ensure_synced(&env)?;

        let mut info = stakes::load_user(&env, &staker);
        let index = Self::append_stake(&env, &staker, &mut info, amount, lock_duration, rpw)?;
        stakes::store_user(&env, &staker, &info);

        Ok(index)
    }

    // ── Unstaking ───────────────────────────────────────────────────────────

    /// Withdraw the record at `index` and return the amount paid back.
    ///
    /// The user's accrued yield is settled into their unclaimed balance.
    /// Before `lock_end` a share of the principal given by
    /// `calc_early_unstake_percentage` is forfeited and stays in the pool.
    pub fn unstake(env: Env, staker: Address, index: u32) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        Self::require_not_paused(&env)?;
        staker.require_auth();

        let mut record =
            stakes::get_record(&env, &staker, index).ok_or(ContractError::StakeNotFound)?;
        if record.unstaked {
            return Err(ContractError::AlreadyUnstaked);
        }

        let rpw = Self::ensure_synced(&env)?;
        let now = env.ledger().timestamp();

        let mut info = stakes::load_user(&env, &staker);
        Self::settle_user(&mut info, rpw)?;

        let penalty = if now < record.lock_end {
            let percentage =
                rewards::early_unstake_percentage(now, record.start_time, record.lock_end);
            log!(&env, "early unstake penalty", percentage, PENALTY_DENOMINATOR);
            rewards::penalty_amount(record.principal, percentage)
        } else {
            0
        };
        let returned = record.principal.saturating_sub(penalty);

        // Settle and retire the record before any tokens move.
        record.reward_debt = rpw;
        record.unstaked = true;
        stakes::store_record(&env, &staker, index, &record);

        info.total_principal = info.total_principal.saturating_sub(record.principal);
        info.total_weight = info.total_weight.saturating_sub(record.weight);
        stakes::store_user(&env, &staker, &info);

        let global = Self::global_stake_weight(&env).saturating_sub(record.weight);
        env.storage().instance().set(&GLOBAL_WEIGHT, &global);

        if returned > 0 {
            token::Client::new(&env, &Self::stake_token(&env)?).transfer(
                &env.current_contract_address(),
                &staker,
                &returned,
            );
        }

        events::publish_unstaked(&env, staker, index, record.principal, penalty, returned);

        Ok(returned)
    }

    /// Early-withdrawal penalty out of 1000 for a lock over `[start, end)`
    /// observed at `now`.
    pub fn calc_early_unstake_percentage(_env: Env, now: u64, start: u64, end: u64) -> u32 {
        rewards::early_unstake_percentage(now, start, end)
    }

    // ── Accumulator ─────────────────────────────────────────────────────────

    /// Bring `rewards_per_weight` up to the current timestamp.
    pub fn sync(env: Env) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        Self::require_not_paused(&env)?;

        let rpw = Self::ensure_synced(&env)?;
        events::publish_synced(&env, rpw, Self::global_stake_weight(&env));

        Ok(())
    }

    /// Flush the accumulator under emission settings pushed by the
    /// controller, ahead of a weight or rate change. Runs while paused.
    pub fn checkpoint(
        env: Env,
        controller: Address,
        emission: EmissionParams,
    ) -> Result<(), ContractError> {
        Self::require_controller(&env, &controller)?;

        let rpw = Self::flush(&env, &emission)?;
        events::publish_synced(&env, rpw, Self::global_stake_weight(&env));

        Ok(())
    }

    /// Apply a new pool weight. Only the controller may call this, and it
    /// passes the emission settings in force up to now so the accumulator is
    /// flushed under the old weight first.
    pub fn set_weight(
        env: Env,
        controller: Address,
        new_weight: u64,
        emission: EmissionParams,
    ) -> Result<(), ContractError> {
        Self::require_controller(&env, &controller)?;

        let rpw = Self::flush(&env, &emission)?;
        events::publish_synced(&env, rpw, Self::global_stake_weight(&env));

        let old_weight = Self::get_weight(env.clone());
        env.storage().instance().set(&POOL_WEIGHT, &new_weight);
        Self::extend_instance_ttl(&env);

        events::publish_weight_set(&env, old_weight, new_weight);

        Ok(())
    }

    /// Yield `user` could claim right now, simulating a sync without writing.
    pub fn pending_rewards(env: Env, user: Address) -> Result<i128, ContractError> {
        let emission = Self::current_emission(&env);
        let rpw = Self::projected_rewards_per_weight(&env, &emission)?;

        let mut info = stakes::load_user(&env, &user);
        Self::settle_user(&mut info, rpw)?;
        Ok(info.unclaimed)
    }

    // ── Claims ──────────────────────────────────────────────────────────────

    /// Settle an off-chain-computed reward signed by the verifier. A restake
    /// is locked for the pool's default duration.
    ///
    /// An `amount` of zero settles the ledger-computed pending yield and is
    /// only accepted together with `restake`.
    pub fn claim_rewards(
        env: Env,
        user: Address,
        amount: i128,
        restake: bool,
        signature: ClaimSignature,
        nonce: u64,
    ) -> Result<i128, ContractError> {
        let request = ClaimRequest {
            amount,
            restake,
            lock_duration: None,
            nonce,
        };
        Self::process_signed_claim(&env, &user, &request, &signature)
    }

    /// Same as `claim_rewards`, with the restake lock chosen by the claim and
    /// covered by the signature.
    pub fn claim_rewards_with_lock(
        env: Env,
        user: Address,
        amount: i128,
        restake: bool,
        lock_duration: u64,
        signature: ClaimSignature,
        nonce: u64,
    ) -> Result<i128, ContractError> {
        let request = ClaimRequest {
            amount,
            restake,
            lock_duration: Some(lock_duration),
            nonce,
        };
        Self::process_signed_claim(&env, &user, &request, &signature)
    }

    /// Claim `bps` / 10 000 of the ledger-computed pending yield without an
    /// off-chain signature. The rest stays claimable.
    pub fn claim_yield(
        env: Env,
        user: Address,
        bps: u32,
        restake: bool,
        lock_duration: Option<u64>,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        Self::require_not_paused(&env)?;
        user.require_auth();

        if bps == 0 || bps > BPS_DENOMINATOR {
            return Err(ContractError::InvalidPercentage);
        }

        let mut info = stakes::load_user(&env, &user);
        Self::require_cool_off_over(&env, &info)?;
        let lock = Self::resolve_lock(&env, lock_duration)?;

        let rpw = Self::ensure_synced(&env)?;
        Self::settle_user(&mut info, rpw)?;

        let amount = info.unclaimed.saturating_mul(bps as i128) / BPS_DENOMINATOR as i128;
        if amount <= 0 {
            return Err(ContractError::InvalidOperation);
        }
        info.unclaimed = info.unclaimed.saturating_sub(amount);

        Self::pay_out(&env, &user, info, amount, restake, lock, rpw)?;
        events::publish_reward_claimed(&env, user, amount, restake, None);

        Ok(amount)
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    /// Block or unblock `stake`, `unstake`, claims and `sync`.
    pub fn pause(env: Env, owner: Address, paused: bool) -> Result<(), ContractError> {
        Self::require_owner(&env, &owner)?;

        env.storage().instance().set(&PAUSED, &paused);
        Self::extend_instance_ttl(&env);

        events::publish_paused(&env, paused);

        Ok(())
    }

    /// Replace the key whose signatures authorise claims.
    pub fn set_verifier(env: Env, owner: Address, verifier: BytesN<65>) -> Result<(), ContractError> {
        Self::require_owner(&env, &owner)?;
        if claims::is_null_identity(&verifier) {
            return Err(ContractError::ZeroAddress);
        }

        env.storage().instance().set(&VERIFIER, &verifier);
        Self::extend_instance_ttl(&env);

        events::publish_verifier_set(&env, verifier);

        Ok(())
    }

    /// Lock applied to restakes whose claim carries no duration.
    pub fn set_default_lock_duration(
        env: Env,
        owner: Address,
        lock_duration: u64,
    ) -> Result<(), ContractError> {
        Self::require_owner(&env, &owner)?;
        Self::validate_lock(lock_duration)?;

        env.storage().instance().set(&DEFAULT_LOCK, &lock_duration);
        Self::extend_instance_ttl(&env);

        events::publish_default_lock_set(&env, lock_duration);

        Ok(())
    }

    /// Minimum seconds between two claims by the same user; zero disables it.
    pub fn set_cool_off_period(env: Env, owner: Address, period: u64) -> Result<(), ContractError> {
        Self::require_owner(&env, &owner)?;

        env.storage().instance().set(&COOL_OFF, &period);
        Self::extend_instance_ttl(&env);

        events::publish_cool_off_set(&env, period);

        Ok(())
    }

    /// Have the controller pay `amount` from its reserve to `to`. The
    /// controller rejects the payout unless this pool is registered.
    pub fn transfer_reward_pika(
        env: Env,
        owner: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_owner(&env, &owner)?;
        if amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }

        Self::controller_client(&env)?.transfer_reward_pika(
            &env.current_contract_address(),
            &to,
            &amount,
        );

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_stake(env: Env, user: Address, index: u32) -> Result<StakeRecord, ContractError> {
        stakes::get_record(&env, &user, index).ok_or(ContractError::StakeNotFound)
    }

    /// Number of records for `user`, unstaked ones included.
    pub fn get_stakes_length(env: Env, user: Address) -> u32 {
        stakes::stakes_len(&env, &user)
    }

    /// Records `start..end` for `user`; an `end` past the sequence is clamped.
    pub fn get_paginated_stakes(env: Env, user: Address, start: u32, end: u32) -> Vec<StakeRecord> {
        stakes::records_in_range(&env, &user, start, end)
    }

    /// Principal `user` has in active records.
    pub fn balance_of(env: Env, user: Address) -> i128 {
        stakes::load_user(&env, &user).total_principal
    }

    pub fn get_user_info(env: Env, user: Address) -> UserInfo {
        stakes::load_user(&env, &user)
    }

    pub fn get_weight(env: Env) -> u64 {
        env.storage().instance().get(&POOL_WEIGHT).unwrap_or(0)
    }

    pub fn get_stake_token(env: Env) -> Result<Address, ContractError> {
        Self::stake_token(&env)
    }

    pub fn get_rewards_per_weight(env: Env) -> i128 {
        env.storage().instance().get(&REWARDS_PER_WEIGHT).unwrap_or(0)
    }

    pub fn get_global_stake_weight(env: Env) -> i128 {
        Self::global_stake_weight(&env)
    }

    pub fn get_last_sync_time(env: Env) -> u64 {
        env.storage().instance().get(&LAST_SYNC).unwrap_or(0)
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage().instance().get(&PAUSED).unwrap_or(false)
    }

    pub fn is_nonce_used(env: Env, user: Address, nonce: u64) -> bool {
        claims::is_nonce_used(&env, &user, nonce)
    }

    pub fn get_verifier(env: Env) -> Result<BytesN<65>, ContractError> {
        env.storage()
            .instance()
            .get(&VERIFIER)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_config(env: Env) -> Result<PoolConfig, ContractError> {
        Ok(PoolConfig {
            stake_token: Self::stake_token(&env)?,
            reward_token: Self::reward_token(&env)?,
            controller: Self::controller(&env)?,
            default_lock: env
                .storage()
                .instance()
                .get(&DEFAULT_LOCK)
                .unwrap_or(DEFAULT_RESTAKE_LOCK),
            cool_off: env.storage().instance().get(&COOL_OFF).unwrap_or(DEFAULT_COOL_OFF),
        })
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_owner(env: Env) -> Result<Address, ContractError> {
        ownable::get_owner(&env).ok_or(ContractError::NotInitialized)
    }

    // ── Ownership transfer (two-step) ───────────────────────────────────────

    /// Propose a new owner. The candidate must call `accept_owner`.
    pub fn propose_owner(
        env: Env,
        current_owner: Address,
        new_owner: Address,
    ) -> Result<(), ContractError> {
        Self::require_owner(&env, &current_owner)?;
        ownable::propose_owner(&env, &new_owner);
        events::publish_owner_transfer_proposed(&env, current_owner, new_owner);
        Ok(())
    }

    pub fn accept_owner(env: Env, new_owner: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        new_owner.require_auth();

        let old_owner = ownable::accept_owner(&env, &new_owner)
            .ok_or(ContractError::OwnableUnauthorizedAccount)?;

        events::publish_owner_transfer_accepted(&env, old_owner, new_owner);
        Ok(())
    }

    pub fn cancel_owner_transfer(env: Env, current_owner: Address) -> Result<(), ContractError> {
        Self::require_owner(&env, &current_owner)?;
        let pending =
            ownable::cancel_pending_owner(&env).ok_or(ContractError::InvalidOperation)?;
        events::publish_owner_transfer_cancelled(&env, current_owner, pending);
        Ok(())
    }

    pub fn get_pending_owner(env: Env) -> Option<Address> {
        ownable::get_pending_owner(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_not_paused(env: &Env) -> Result<(), ContractError> {
        if Self::is_paused(env.clone()) {
            return Err(ContractError::ContractIsPaused);
        }
        Ok(())
    }

    /// Guard: authenticate `caller` and revert unless it is the owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), ContractError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        if !ownable::is_owner(env, caller) {
            return Err(ContractError::OwnableUnauthorizedAccount);
        }
        Ok(())
    }

    /// Guard: authenticate `caller` and revert unless it is this pool's
    /// controller.
    fn require_controller(env: &Env, caller: &Address) -> Result<(), ContractError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        if *caller != Self::controller(env)? {
            return Err(ContractError::OnlyFactory);
        }
        Ok(())
    }

    fn require_cool_off_over(env: &Env, info: &UserInfo) -> Result<(), ContractError> {
        let cool_off: u64 = env.storage().instance().get(&COOL_OFF).unwrap_or(DEFAULT_COOL_OFF);
        if let Some(last_claim) = info.last_claim {
            if env.ledger().timestamp() < last_claim.saturating_add(cool_off) {
                return Err(ContractError::CoolOffPeriodIsNotOver);
            }
        }
        Ok(())
    }

    fn validate_lock(lock_duration: u64) -> Result<(), ContractError> {
        if !(MIN_LOCK..=MAX_LOCK).contains(&lock_duration) {
            return Err(ContractError::InvalidLockDuration);
        }
        Ok(())
    }

    /// The explicit lock if given (validated), else the pool default.
    fn resolve_lock(env: &Env, lock_duration: Option<u64>) -> Result<u64, ContractError> {
        match lock_duration {
            Some(lock) => {
                Self::validate_lock(lock)?;
                Ok(lock)
            }
            None => Ok(env
                .storage()
                .instance()
                .get(&DEFAULT_LOCK)
                .unwrap_or(DEFAULT_RESTAKE_LOCK)),
        }
    }

    fn stake_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn reward_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn controller(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&CONTROLLER)
            .ok_or(ContractError::NotInitialized)
    }

    fn controller_client(env: &Env) -> Result<PoolControllerClient<'_>, ContractError> {
        Ok(PoolControllerClient::new(env, &Self::controller(env)?))
    }

    fn global_stake_weight(env: &Env) -> i128 {
        env.storage().instance().get(&GLOBAL_WEIGHT).unwrap_or(0)
    }

    /// Emission settings that apply to this pool. A pool the controller has
    /// not registered earns nothing.
    fn current_emission(env: &Env) -> EmissionParams {
        let none = EmissionParams {
            pika_per_second: 0,
            total_weight: 0,
        };
        let Ok(controller) = Self::controller_client(env) else {
            return none;
        };
        if controller.is_pool(&env.current_contract_address()) {
            controller.emission()
        } else {
            none
        }
    }

    /// Accumulator value at the current timestamp under `emission`.
    fn projected_rewards_per_weight(
        env: &Env,
        emission: &EmissionParams,
    ) -> Result<i128, ContractError> {
        let stored = Self::get_rewards_per_weight(env.clone());
        let last_sync = Self::get_last_sync_time(env.clone());
        let elapsed = env.ledger().timestamp().saturating_sub(last_sync);

        rewards::compute_rewards_per_weight(
            stored,
            elapsed,
            emission.pika_per_second,
            Self::get_weight(env.clone()),
            emission.total_weight,
            Self::global_stake_weight(env),
        )
        .ok_or(ContractError::ArithmeticOverflow)
    }

    /// Advance and persist the accumulator under `emission`. The only place
    /// `rewards_per_weight` is written.
    fn flush(env: &Env, emission: &EmissionParams) -> Result<i128, ContractError> {
        let rpw = Self::projected_rewards_per_weight(env, emission)?;
        let now = env.ledger().timestamp();

        env.storage().instance().set(&REWARDS_PER_WEIGHT, &rpw);
        if now > Self::get_last_sync_time(env.clone()) {
            env.storage().instance().set(&LAST_SYNC, &now);
        }
        Self::extend_instance_ttl(env);

        log!(env, "accumulator flushed", rpw, emission.total_weight);
        Ok(rpw)
    }

    /// Sync step run first by every mutating user entry point.
    fn ensure_synced(env: &Env) -> Result<i128, ContractError> {
        let emission = Self::current_emission(env);
        Self::flush(env, &emission)
    }

    /// Move the user's yield up to `rpw` into `info.unclaimed`. Must run
    /// before `info.total_weight` changes.
    fn settle_user(info: &mut UserInfo, rpw: i128) -> Result<(), ContractError> {
        let accrued = rewards::earned(info.total_weight, rpw, info.reward_debt)
            .ok_or(ContractError::ArithmeticOverflow)?;
        info.unclaimed = info
            .unclaimed
            .checked_add(accrued)
            .ok_or(ContractError::ArithmeticOverflow)?;
        info.reward_debt = rpw;
        Ok(())
    }

    /// Append a fresh record for `staker` and fold it into the aggregates.
    /// The caller stores `info`.
    fn append_stake(
        env: &Env,
        staker: &Address,
        info: &mut UserInfo,
        amount: i128,
        lock_duration: u64,
        rpw: i128,
    ) -> Result<u32, ContractError> {
        Self::settle_user(info, rpw)?;

        let now = env.ledger().timestamp();
        let weight = rewards::stake_weight(amount, lock_duration);
        let record = StakeRecord {
            principal: amount,
            weight,
            start_time: now,
            lock_end: now.saturating_add(lock_duration),
            reward_debt: rpw,
            unstaked: false,
        };
        let index = stakes::push_record(env, staker, &record);

        info.total_principal = info.total_principal.saturating_add(amount);
        info.total_weight = info.total_weight.saturating_add(weight);

        let global = Self::global_stake_weight(env).saturating_add(weight);
        env.storage().instance().set(&GLOBAL_WEIGHT, &global);
        Self::extend_instance_ttl(env);

        events::publish_staked(
            env,
            staker.clone(),
            index,
            amount,
            weight,
            record.lock_end,
            global,
        );

        Ok(index)
    }

    /// Shared authorisation and settlement path of both signed claim shapes.
    fn process_signed_claim(
        env: &Env,
        user: &Address,
        request: &ClaimRequest,
        signature: &ClaimSignature,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(env)?;
        Self::require_not_paused(env)?;
        user.require_auth();

        if claims::is_nonce_used(env, user, request.nonce) {
            return Err(ContractError::NonceAlreadyUsed);
        }

        let pool = env.current_contract_address();
        let digest = claims::claim_digest(env, &pool, user, request);
        let signer = claims::recover_signer(env, &digest, signature);
        if signer != Self::get_verifier(env.clone())? {
            return Err(ContractError::WrongHash);
        }

        let mut info = stakes::load_user(env, user);
        Self::require_cool_off_over(env, &info)?;

        if request.amount < 0 || (request.amount == 0 && !request.restake) {
            return Err(ContractError::InvalidOperation);
        }
        let lock = Self::resolve_lock(env, request.lock_duration)?;

        let rpw = Self::ensure_synced(env)?;
        Self::settle_user(&mut info, rpw)?;

        let amount = if request.amount == 0 {
            info.unclaimed
        } else {
            request.amount
        };
        if amount <= 0 {
            return Err(ContractError::InvalidOperation);
        }
        info.unclaimed = info.unclaimed.saturating_sub(amount).max(0);
        claims::consume_nonce(env, user, request.nonce);

        Self::pay_out(env, user, info, amount, request.restake, lock, rpw)?;
        events::publish_reward_claimed(env, user.clone(), amount, request.restake, Some(request.nonce));

        Ok(amount)
    }

    /// Deliver a settled claim: restake it or pay it from the controller's
    /// reserve. Local state, `info` included, is written before any
    /// cross-contract call.
    fn pay_out(
        env: &Env,
        user: &Address,
        mut info: UserInfo,
        amount: i128,
        restake: bool,
        lock_duration: u64,
        rpw: i128,
    ) -> Result<(), ContractError> {
        info.last_claim = Some(env.ledger().timestamp());

        let pool = env.current_contract_address();
        let controller = Self::controller_client(env)?;
        let reward_token = Self::reward_token(env)?;

        if !restake {
            stakes::store_user(env, user, &info);
            controller.transfer_reward_pika(&pool, user, &amount);
            return Ok(());
        }

        if Self::stake_token(env)? == reward_token {
            Self::append_stake(env, user, &mut info, amount, lock_duration, rpw)?;
            stakes::store_user(env, user, &info);
            controller.transfer_reward_pika(&pool, &pool, &amount);
            return Ok(());
        }

        // Reward-only pool: compound into the pool that stakes the reward token.
        stakes::store_user(env, user, &info);
        let target = controller
            .get_pool_for_token(&reward_token)
            .filter(|target| *target != pool)
            .ok_or(ContractError::PoolNotFound)?;
        controller.transfer_reward_pika(&pool, &target, &amount);
        StakingPoolClient::new(env, &target).stake_as_pool(&pool, user, &amount, &lock_duration);

        Ok(())
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_claims;
