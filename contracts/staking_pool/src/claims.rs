//! # Signature-authorised reward claims
//!
//! Reward amounts can be computed off-chain and settled here. The verifier
//! signs a Keccak-256 digest of the claim terms with its secp256k1 key; the
//! pool recovers the signer from the digest and the signature and compares it
//! with the configured verifier key.
//!
//! ## Message layout
//!
//! ```text
//! pool (address XDR) || user (address XDR) || amount (i128 BE)
//!     || restake (1 byte) || [lock_duration (u64 BE)] || nonce (u64 BE)
//! ```
//!
//! `lock_duration` is present only for claims that carry an explicit lock.
//! The leading pool address binds a signature to a single pool.
//!
//! A `(user, nonce)` pair is consumed by the first successful claim.

use common::{TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{
    contracttype, crypto::Hash, xdr::ToXdr, Address, Bytes, BytesN, Env,
};

// ── Types ───────────────────────────────────────────────────────────────────

/// Terms of one claim. `lock_duration` is `Some` for the variant that
/// chooses the lock of a restaked amount and `None` for the variant that
/// falls back to the pool's default lock.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimRequest {
    /// Amount to settle; zero means the ledger-computed pending yield.
    pub amount: i128,
    pub restake: bool,
    pub lock_duration: Option<u64>,
    pub nonce: u64,
}

/// Recoverable secp256k1 signature over the claim digest.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimSignature {
    /// Compact `r || s` encoding, low-s normalised.
    pub signature: BytesN<64>,
    /// Recovery id, `0` or `1`.
    pub recovery_id: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum ClaimKey {
    Nonce(Address, u64),
}

// ── Encoding ────────────────────────────────────────────────────────────────

/// Canonical bytes a verifier signs for `request` on behalf of `user`.
pub fn claim_message(env: &Env, pool: &Address, user: &Address, request: &ClaimRequest) -> Bytes {
    let mut msg = Bytes::new(env);
    msg.append(&pool.clone().to_xdr(env));
    msg.append(&user.clone().to_xdr(env));
    msg.append(&Bytes::from_slice(env, &request.amount.to_be_bytes()));
    msg.push_back(u8::from(request.restake));
    if let Some(lock_duration) = request.lock_duration {
        msg.append(&Bytes::from_slice(env, &lock_duration.to_be_bytes()));
    }
    msg.append(&Bytes::from_slice(env, &request.nonce.to_be_bytes()));
    msg
}

/// Keccak-256 digest of [`claim_message`].
pub fn claim_digest(env: &Env, pool: &Address, user: &Address, request: &ClaimRequest) -> Hash<32> {
    env.crypto()
        .keccak256(&claim_message(env, pool, user, request))
}

// ── Verification ────────────────────────────────────────────────────────────

/// Public key (65-byte uncompressed SEC-1) that produced `signature` over
/// `digest`.
///
/// A malformed signature aborts the invocation in the host.
pub fn recover_signer(env: &Env, digest: &Hash<32>, signature: &ClaimSignature) -> BytesN<65> {
    env.crypto()
        .secp256k1_recover(digest, &signature.signature, signature.recovery_id)
}

/// Whether `key` is the all-zero placeholder rather than a real identity.
pub fn is_null_identity(key: &BytesN<65>) -> bool {
    key.to_array().iter().all(|b| *b == 0)
}

// ── Replay protection ───────────────────────────────────────────────────────

pub fn is_nonce_used(env: &Env, user: &Address, nonce: u64) -> bool {
    env.storage()
        .persistent()
        .get(&ClaimKey::Nonce(user.clone(), nonce))
        .unwrap_or(false)
}

pub fn consume_nonce(env: &Env, user: &Address, nonce: u64) {
    let key = ClaimKey::Nonce(user.clone(), nonce);
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
