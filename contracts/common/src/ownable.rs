//! # Single-owner access control
//!
//! Each contract in the suite has exactly one owner, stored in instance
//! storage. Ownership moves in two steps: the current owner proposes a
//! successor, and the successor accepts. Until acceptance the current owner
//! keeps full control and may cancel the proposal.
//!
//! These helpers never call `require_auth`; the contract entry point
//! authenticates the caller first and then asks [`is_owner`].

use soroban_sdk::{contracttype, Address, Env};

// ── Storage keys ─────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum OwnableKey {
    Owner,
    PendingOwner,
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Store `owner` as the contract owner, replacing any previous owner.
pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OwnableKey::Owner, owner);
}

/// The current owner, or `None` before initialisation.
pub fn get_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OwnableKey::Owner)
}

/// Whether `caller` is the current owner.
pub fn is_owner(env: &Env, caller: &Address) -> bool {
    get_owner(env).map_or(false, |owner| owner == *caller)
}

/// Record `candidate` as the proposed next owner.
pub fn propose_owner(env: &Env, candidate: &Address) {
    env.storage()
        .instance()
        .set(&OwnableKey::PendingOwner, candidate);
}

/// The proposed next owner, if a transfer is pending.
pub fn get_pending_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OwnableKey::PendingOwner)
}

/// Drop the pending proposal and return the candidate that was cancelled.
pub fn cancel_pending_owner(env: &Env) -> Option<Address> {
    let pending = get_pending_owner(env);
    if pending.is_some() {
        env.storage().instance().remove(&OwnableKey::PendingOwner);
    }
    pending
}

/// Complete a pending transfer if `candidate` is the proposed owner.
///
/// Returns the previous owner on success, `None` when there is no pending
/// proposal or `candidate` does not match it.
pub fn accept_owner(env: &Env, candidate: &Address) -> Option<Address> {
    let pending = get_pending_owner(env)?;
    if pending != *candidate {
        return None;
    }
    let previous = get_owner(env)?;
    set_owner(env, candidate);
    env.storage().instance().remove(&OwnableKey::PendingOwner);
    Some(previous)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
