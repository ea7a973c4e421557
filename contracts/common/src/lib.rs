//! Shared utilities and error types for the confidential aggregation contracts.
//!
//! This crate provides:
//! - [`CommonError`]: standardised error codes for the guard helpers.
//! - [`pausable`]: the global kill switch.
//! - [`roles`]: owner / provider role storage.
//! - [`cooldown`]: per-caller, per-operation-class throttling.
//! - [`persistent`]: TTL-extending persistent reads and writes.
//!
//! Contract-specific errors extend the ranges documented on [`CommonError`]
//! and convert from it, so helpers can be used with `?` directly.

#![no_std]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod cooldown;
pub mod pausable;
pub mod persistent;
pub mod roles;

pub use cooldown::*;
pub use pausable::*;
pub use roles::*;

/// Persistent entries are bumped to this many ledgers once they drop below
/// [`TTL_THRESHOLD`]. 10,368,000 ledgers ~= 600 days (@ ~5s/ledger).
pub const TTL_EXTEND_TO: u32 = 10_368_000;
/// 5,184,000 ledgers ~= 300 days (@ ~5s/ledger).
pub const TTL_THRESHOLD: u32 = 5_184_000;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Standardised error codes shared by the guard helpers.
///
/// # Code ranges
/// | Range   | Purpose                       |
/// |---------|-------------------------------|
/// | 1 – 9   | Lifecycle / initialisation    |
/// | 10 – 19 | Authentication & authorisation|
/// | 30 – 39 | Validation / input            |
/// | 40 – 49 | Contract state                |
/// | 60 – 69 | Decryption protocol           |
/// | 100+    | Reserved for contract-specific |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotOwner = 10,
    NotProvider = 11,
    InvalidArgument = 30,
    /// The contract is currently paused and cannot process requests.
    Paused = 40,
    /// The caller acted in the same operation class too recently.
    CooldownActive = 41,
}
