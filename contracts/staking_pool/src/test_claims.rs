//! Signature-authorised claims: replay protection, signer checks, cool-off
//! and the restake paths.

extern crate std;

use soroban_sdk::{testutils::Address as _, Address};

use crate::claims::ClaimRequest;
use crate::constants::{DEFAULT_COOL_OFF, MAX_LOCK};
use crate::test::{sign_with, Fixture, DAY, RATE, RESERVE, T0};
use crate::ContractError;

fn request(amount: i128, restake: bool, nonce: u64) -> ClaimRequest {
    ClaimRequest {
        amount,
        restake,
        lock_duration: None,
        nonce,
    }
}

fn request_with_lock(amount: i128, restake: bool, lock: u64, nonce: u64) -> ClaimRequest {
    ClaimRequest {
        amount,
        restake,
        lock_duration: Some(lock),
        nonce,
    }
}

// ── Payout ────────────────────────────────────────────────────────────────────

#[test]
fn test_signed_claim_pays_out() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let req = request(500, false, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    let claimed = f.pool.claim_rewards(&user, &500, &false, &sig, &1);

    assert_eq!(claimed, 500);
    assert_eq!(f.balance(&f.pika, &user), 500);
    assert_eq!(f.pool.get_stakes_length(&user), 0);
    assert_eq!(f.controller.get_reserve(), RESERVE - 500);
    assert!(f.pool.is_nonce_used(&user, &1));
    assert_eq!(f.pool.get_user_info(&user).last_claim, Some(T0));
}

#[test]
fn test_signed_claim_restakes() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let req = request(500, true, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    f.pool.claim_rewards(&user, &500, &true, &sig, &1);

    assert_eq!(f.balance(&f.pika, &user), 0);
    assert_eq!(f.pool.get_stakes_length(&user), 1);

    let record = f.pool.get_stake(&user, &0);
    assert_eq!(record.principal, 500);
    assert_eq!(record.lock_end, T0 + MAX_LOCK);
    assert_eq!(f.balance(&f.pika, &f.pool.address), 500);
    assert_eq!(f.pool.balance_of(&user), 500);
}

#[test]
fn test_signed_claim_with_lock() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let req = request_with_lock(500, true, 60 * DAY, 7);
    let sig = f.sign(&f.pool.address, &user, &req);
    f.pool
        .claim_rewards_with_lock(&user, &500, &true, &(60 * DAY), &sig, &7);

    assert_eq!(f.pool.get_stake(&user, &0).lock_end, T0 + 60 * DAY);
}

#[test]
fn test_signed_claim_with_invalid_lock_fails() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let req = request_with_lock(500, true, DAY, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    let result = f
        .pool
        .try_claim_rewards_with_lock(&user, &500, &true, &DAY, &sig, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidLockDuration),
        _ => unreachable!("Expected InvalidLockDuration error"),
    }
    assert!(!f.pool.is_nonce_used(&user, &1));
}

#[test]
fn test_zero_amount_restake_claims_pending_yield() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);
    f.stake(&user, 1_000, MAX_LOCK);

    f.set_time(T0 + 100);
    let req = request(0, true, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    let claimed = f.pool.claim_rewards(&user, &0, &true, &sig, &1);

    assert_eq!(claimed, 100 * RATE);
    assert_eq!(f.pool.get_user_info(&user).unclaimed, 0);
    assert_eq!(f.pool.get_stake(&user, &1).principal, 100 * RATE);
    assert_eq!(f.pool.pending_rewards(&user), 0);
}

#[test]
fn test_zero_amount_without_restake_fails() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);
    f.stake(&user, 1_000, MAX_LOCK);
    f.set_time(T0 + 100);

    let req = request(0, false, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    let result = f.pool.try_claim_rewards(&user, &0, &false, &sig, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidOperation),
        _ => unreachable!("Expected InvalidOperation error"),
    }
}

#[test]
fn test_zero_amount_restake_with_nothing_pending_fails() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let req = request(0, true, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    let result = f.pool.try_claim_rewards(&user, &0, &true, &sig, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidOperation),
        _ => unreachable!("Expected InvalidOperation error"),
    }
}

#[test]
fn test_signed_amount_is_debited_from_unclaimed() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);
    f.stake(&user, 1_000, MAX_LOCK);
    f.set_time(T0 + 100);

    let req = request(30_000, false, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    f.pool.claim_rewards(&user, &30_000, &false, &sig, &1);

    assert_eq!(f.pool.get_user_info(&user).unclaimed, 70_000);

    // A signed amount above the ledger balance floors unclaimed at zero.
    f.set_time(T0 + 100 + DEFAULT_COOL_OFF);
    let req = request(10_000_000_000, false, 2);
    let sig = f.sign(&f.pool.address, &user, &req);
    f.pool.claim_rewards(&user, &10_000_000_000, &false, &sig, &2);

    assert_eq!(f.pool.get_user_info(&user).unclaimed, 0);
    assert_eq!(f.balance(&f.pika, &user), 30_000 + 10_000_000_000);
}

#[test]
fn test_lp_pool_claim_restakes_into_main_pool() {
    let f = Fixture::new();
    let (lp_pool, lp_token) = f.add_lp_pool();
    let user = Address::generate(&f.env);
    f.stake_in(&lp_pool, &lp_token, &user, 1_000, MAX_LOCK);

    f.set_time(T0 + 100);
    let req = request(0, true, 1);
    let sig = f.sign(&lp_pool.address, &user, &req);
    let claimed = lp_pool.claim_rewards(&user, &0, &true, &sig, &1);

    assert_eq!(claimed, 80_000);
    assert_eq!(lp_pool.get_stakes_length(&user), 1);
    assert_eq!(f.pool.get_stake(&user, &0).principal, 80_000);
    assert_eq!(f.balance(&f.pika, &f.pool.address), 80_000);
    assert_eq!(f.balance(&f.pika, &user), 0);
}

// ── Authorisation ─────────────────────────────────────────────────────────────

#[test]
fn test_replayed_nonce_fails() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let req = request(500, false, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    f.pool.claim_rewards(&user, &500, &false, &sig, &1);

    f.set_time(T0 + DEFAULT_COOL_OFF);
    let result = f.pool.try_claim_rewards(&user, &500, &false, &sig, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::NonceAlreadyUsed),
        _ => unreachable!("Expected NonceAlreadyUsed error"),
    }
    assert_eq!(f.balance(&f.pika, &user), 500);
}

#[test]
fn test_nonces_are_per_user() {
    let f = Fixture::new();
    let alice = Address::generate(&f.env);
    let bob = Address::generate(&f.env);

    for user in [&alice, &bob] {
        let req = request(500, false, 1);
        let sig = f.sign(&f.pool.address, user, &req);
        f.pool.claim_rewards(user, &500, &false, &sig, &1);
    }

    assert_eq!(f.balance(&f.pika, &alice), 500);
    assert_eq!(f.balance(&f.pika, &bob), 500);
}

#[test]
fn test_foreign_signer_fails() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let req = request(500, false, 1);
    let sig = sign_with(&f.env, &f.pool.address, &user, &req, &[0x22; 32]);
    let result = f.pool.try_claim_rewards(&user, &500, &false, &sig, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::WrongHash),
        _ => unreachable!("Expected WrongHash error"),
    }
    assert!(!f.pool.is_nonce_used(&user, &1));
}

#[test]
fn test_tampered_terms_fail() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);
    let sig = f.sign(&f.pool.address, &user, &request(500, false, 1));

    let inflated = f.pool.try_claim_rewards(&user, &600, &false, &sig, &1);
    assert_eq!(inflated, Err(Ok(ContractError::WrongHash)));

    let flipped = f.pool.try_claim_rewards(&user, &500, &true, &sig, &1);
    assert_eq!(flipped, Err(Ok(ContractError::WrongHash)));

    // A signature without a lock does not authorise the variant with one.
    let with_lock = f
        .pool
        .try_claim_rewards_with_lock(&user, &500, &false, &MAX_LOCK, &sig, &1);
    assert_eq!(with_lock, Err(Ok(ContractError::WrongHash)));

    let other_user = Address::generate(&f.env);
    let stolen = f.pool.try_claim_rewards(&other_user, &500, &false, &sig, &1);
    assert_eq!(stolen, Err(Ok(ContractError::WrongHash)));
}

#[test]
fn test_signature_is_bound_to_pool() {
    let f = Fixture::new();
    let (lp_pool, _lp_token) = f.add_lp_pool();
    let user = Address::generate(&f.env);

    let req = request(500, false, 1);
    let sig = f.sign(&f.pool.address, &user, &req);
    let result = lp_pool.try_claim_rewards(&user, &500, &false, &sig, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::WrongHash),
        _ => unreachable!("Expected WrongHash error"),
    }
}

#[test]
fn test_rotated_verifier_invalidates_old_signatures() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);
    let req = request(500, false, 1);
    let old_sig = f.sign(&f.pool.address, &user, &req);

    f.pool
        .set_verifier(&f.owner, &crate::test::verifier_key(&f.env, &[0x33; 32]));

    let result = f.pool.try_claim_rewards(&user, &500, &false, &old_sig, &1);
    assert_eq!(result, Err(Ok(ContractError::WrongHash)));

    let new_sig = sign_with(&f.env, &f.pool.address, &user, &req, &[0x33; 32]);
    assert_eq!(f.pool.claim_rewards(&user, &500, &false, &new_sig, &1), 500);
}

// ── Cool-off and pause ────────────────────────────────────────────────────────

#[test]
fn test_claim_within_cool_off_fails() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);

    let sig = f.sign(&f.pool.address, &user, &request(500, false, 1));
    f.pool.claim_rewards(&user, &500, &false, &sig, &1);

    f.set_time(T0 + DAY);
    let sig = f.sign(&f.pool.address, &user, &request(500, false, 2));
    let result = f.pool.try_claim_rewards(&user, &500, &false, &sig, &2);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::CoolOffPeriodIsNotOver),
        _ => unreachable!("Expected CoolOffPeriodIsNotOver error"),
    }

    f.set_time(T0 + DEFAULT_COOL_OFF);
    assert_eq!(f.pool.claim_rewards(&user, &500, &false, &sig, &2), 500);
}

#[test]
fn test_claim_while_paused_fails() {
    let f = Fixture::new();
    let user = Address::generate(&f.env);
    let sig = f.sign(&f.pool.address, &user, &request(500, false, 1));

    f.pool.pause(&f.owner, &true);
    let result = f.pool.try_claim_rewards(&user, &500, &false, &sig, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::ContractIsPaused),
        _ => unreachable!("Expected ContractIsPaused error"),
    }

    f.pool.pause(&f.owner, &false);
    assert_eq!(f.pool.claim_rewards(&user, &500, &false, &sig, &1), 500);
}
