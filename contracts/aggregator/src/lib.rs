//! # Confidential Aggregator
//!
//! Authorized providers submit encrypted per-user contributions into
//! sequential batches. Each batch keeps a single encrypted running total,
//! and only that total is ever revealed, through an external decryption
//! oracle.
//!
//! ## Flow
//! ```text
//! open_batch ─▶ submit_contribution* ─▶ close_batch ─▶ request_decryption
//!                                                          │
//!               on_decryption_callback(request_id, cleartext, proof) ◀─ oracle relayer
//! ```
//!
//! ## Guards
//! Mutating provider operations check, in order: caller auth,
//! initialization, pause flag, provider role, cooldown, then the
//! operation's own preconditions. Owner configuration (`add_provider`,
//! `remove_provider`, `set_cooldown`) is not pause-gated.
//!
//! ## Collaborators
//! The crypto engine and decryption oracle are contract addresses fixed at
//! initialization and reached through [`interfaces::CryptoEngineClient`] and
//! [`interfaces::DecryptionOracleClient`].
#![no_std]

pub mod access;
pub mod accumulator;
pub mod batch;
pub mod decryption;
pub mod errors;
pub mod events;
pub mod interfaces;


use common::{cooldown, pausable, roles, CooldownClass};
use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, Bytes, BytesN, Env, Symbol};

pub use decryption::{DecryptionContext, DecryptionResult};
pub use errors::AggregatorError;
use interfaces::{CryptoEngineClient, DecryptionOracleClient};

// ── Storage keys ──────────────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const ENGINE: Symbol = symbol_short!("ENGINE");
const ORACLE: Symbol = symbol_short!("ORACLE");

/// Interval applied when `initialize` is not given one.
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 60;

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct ConfidentialAggregator;

#[contractimpl]
impl ConfidentialAggregator {
    pub fn initialize(
        env: Env,
        owner: Address,
        crypto_engine: Address,
        oracle: Address,
        cooldown_seconds: Option<u64>,
    ) -> Result<(), AggregatorError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(AggregatorError::AlreadyInitialized);
        }
        owner.require_auth();

        cooldown::set_cooldown_seconds(&env, cooldown_seconds.unwrap_or(DEFAULT_COOLDOWN_SECONDS))?;
        roles::set_owner(&env, &owner);
        roles::add_provider(&env, &owner);
        pausable::unpause(&env);
        batch::init(&env);
        env.storage().instance().set(&ENGINE, &crypto_engine);
        env.storage().instance().set(&ORACLE, &oracle);
        env.storage().instance().set(&INITIALIZED, &true);

        log!(&env, "aggregator initialised", owner);
        Ok(())
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    pub fn get_owner(env: Env) -> Result<Address, AggregatorError> {
        roles::get_owner(&env).ok_or(AggregatorError::NotInitialized)
    }

    pub fn get_crypto_engine(env: Env) -> Result<Address, AggregatorError> {
        env.storage()
            .instance()
            .get(&ENGINE)
            .ok_or(AggregatorError::NotInitialized)
    }

    pub fn get_oracle(env: Env) -> Result<Address, AggregatorError> {
        env.storage()
            .instance()
            .get(&ORACLE)
            .ok_or(AggregatorError::NotInitialized)
    }

    pub fn is_provider(env: Env, principal: Address) -> bool {
        roles::is_provider(&env, &principal)
    }

    pub fn is_paused(env: Env) -> bool {
        pausable::is_paused(&env)
    }

    pub fn get_cooldown(env: Env) -> u64 {
        cooldown::cooldown_seconds(&env)
    }

    pub fn last_submission_at(env: Env, principal: Address) -> Option<u64> {
        cooldown::last_action(&env, CooldownClass::Submission, &principal)
    }

    pub fn last_decryption_request_at(env: Env, principal: Address) -> Option<u64> {
        cooldown::last_action(&env, CooldownClass::DecryptionRequest, &principal)
    }

    pub fn current_batch_id(env: Env) -> u64 {
        batch::current_batch_id(&env)
    }

    pub fn is_batch_open(env: Env) -> bool {
        batch::is_open(&env)
    }

    pub fn get_aggregate(env: Env, batch_id: u64) -> Option<BytesN<32>> {
        accumulator::aggregate(&env, batch_id)
    }

    /// The user's most recent handle in `batch_id`.
    pub fn get_contribution(env: Env, batch_id: u64, user: Address) -> Option<BytesN<32>> {
        accumulator::contribution(&env, batch_id, &user)
    }

    /// Submissions accepted into `batch_id`, repeats included.
    pub fn get_submission_count(env: Env, batch_id: u64) -> u64 {
        accumulator::submission_count(&env, batch_id)
    }

    pub fn get_decryption_context(env: Env, request_id: u64) -> Option<DecryptionContext> {
        decryption::context(&env, request_id)
    }

    pub fn get_decryption_result(env: Env, request_id: u64) -> Option<DecryptionResult> {
        decryption::result(&env, request_id)
    }

    // ── Owner configuration ───────────────────────────────────────────────────

    pub fn add_provider(env: Env, caller: Address, provider: Address) -> Result<(), AggregatorError> {
        Self::require_owner(&env, &caller)?;
        access::add_provider(&env, &provider)
    }

    pub fn remove_provider(
        env: Env,
        caller: Address,
        provider: Address,
    ) -> Result<(), AggregatorError> {
        Self::require_owner(&env, &caller)?;
        access::remove_provider(&env, &provider)
    }

    pub fn set_cooldown(env: Env, caller: Address, seconds: u64) -> Result<(), AggregatorError> {
        Self::require_owner(&env, &caller)?;
        let previous = cooldown::set_cooldown_seconds(&env, seconds)?;
        events::publish_cooldown_updated(&env, previous, seconds);
        Ok(())
    }

    /// Fails with `Paused` if already paused.
    pub fn pause(env: Env, caller: Address) -> Result<(), AggregatorError> {
        Self::require_owner(&env, &caller)?;
        pausable::pause(&env)?;
        events::publish_paused(&env, caller);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), AggregatorError> {
        Self::require_owner(&env, &caller)?;
        pausable::unpause(&env);
        events::publish_unpaused(&env, caller);
        Ok(())
    }

    // ── Batch lifecycle ───────────────────────────────────────────────────────

    pub fn open_batch(env: Env, caller: Address) -> Result<u64, AggregatorError> {
        Self::require_active_provider(&env, &caller)?;
        let engine = Self::engine(&env)?;
        batch::open(&env, &engine)
    }

    pub fn close_batch(env: Env, caller: Address) -> Result<u64, AggregatorError> {
        Self::require_active_provider(&env, &caller)?;
        batch::close(&env)
    }

    // ── Accumulation ──────────────────────────────────────────────────────────

    /// Adds `handle` to the open batch on behalf of `user`.
    pub fn submit_contribution(
        env: Env,
        caller: Address,
        user: Address,
        handle: BytesN<32>,
    ) -> Result<(), AggregatorError> {
        Self::require_active_provider(&env, &caller)?;
        cooldown::require_cooldown_elapsed(&env, CooldownClass::Submission, &caller)?;

        let engine = Self::engine(&env)?;
        accumulator::submit(&env, &engine, &caller, &user, &handle)?;
        cooldown::touch(&env, CooldownClass::Submission, &caller);
        Ok(())
    }

    // ── Decryption ────────────────────────────────────────────────────────────

    /// Snapshots the aggregate of `batch_id` and registers it with the oracle.
    /// Returns the oracle's request id.
    pub fn request_decryption(
        env: Env,
        caller: Address,
        batch_id: u64,
    ) -> Result<u64, AggregatorError> {
        Self::require_active_provider(&env, &caller)?;
        cooldown::require_cooldown_elapsed(&env, CooldownClass::DecryptionRequest, &caller)?;

        let engine = Self::engine(&env)?;
        let oracle = Self::oracle(&env)?;
        let request_id = decryption::request(&env, &engine, &oracle, batch_id)?;
        cooldown::touch(&env, CooldownClass::DecryptionRequest, &caller);

        log!(&env, "decryption requested", request_id, batch_id);
        Ok(request_id)
    }

    /// Oracle delivery for `request_id`. Open to anyone; authenticity comes
    /// from `proof`, which the oracle must accept.
    pub fn on_decryption_callback(
        env: Env,
        request_id: u64,
        cleartext: Bytes,
        proof: Bytes,
    ) -> Result<i128, AggregatorError> {
        Self::require_initialized(&env)?;
        pausable::require_not_paused(&env)?;

        let engine = Self::engine(&env)?;
        let oracle = Self::oracle(&env)?;
        decryption::complete(&env, &engine, &oracle, request_id, &cleartext, &proof)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), AggregatorError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(AggregatorError::NotInitialized);
        }
        Ok(())
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), AggregatorError> {
        caller.require_auth();
        Self::require_initialized(env)?;
        roles::require_owner(env, caller)?;
        Ok(())
    }

    fn require_active_provider(env: &Env, caller: &Address) -> Result<(), AggregatorError> {
        caller.require_auth();
        Self::require_initialized(env)?;
        pausable::require_not_paused(env)?;
        roles::require_provider(env, caller)?;
        Ok(())
    }

    fn engine(env: &Env) -> Result<CryptoEngineClient<'_>, AggregatorError> {
        let address = Self::get_crypto_engine(env.clone())?;
        Ok(CryptoEngineClient::new(env, &address))
    }

    fn oracle(env: &Env) -> Result<DecryptionOracleClient<'_>, AggregatorError> {
        let address = Self::get_oracle(env.clone())?;
        Ok(DecryptionOracleClient::new(env, &address))
    }
}
