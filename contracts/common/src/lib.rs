//! Shared building blocks for the staking contract suite.
//!
//! This crate provides:
//! - [`interfaces`]: the cross-contract surfaces the pool controller and the
//!   staking pools call on each other, exposed as generated clients.
//! - [`ownable`]: single-owner access control with a two-step transfer.
//! - Storage TTL constants shared by every contract.

#![no_std]

pub mod interfaces;
pub mod ownable;

pub use interfaces::*;

// ── TTL constants ────────────────────────────────────────────────────────────

/// Remaining-ledger threshold below which an entry's TTL is bumped.
pub const TTL_THRESHOLD: u32 = 5_184_000;
/// Ledger count an entry's TTL is extended to when bumped.
pub const TTL_EXTEND_TO: u32 = 10_368_000;
