//! Events emitted by the aggregator contract.
//!
//! Every event is published under `("AGGR", <name>)`. Payloads never carry
//! cleartext contributions; only the completion event carries a cleartext
//! value, and that value is the batch total.

use soroban_sdk::{Address, Bytes, Env};

// ── Internal helper ───────────────────────────────────────────────────────────

fn emit<T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(env: &Env, topic: &str, data: T) {
    #[allow(deprecated)]
    env.events().publish(
        (soroban_sdk::symbol_short!("AGGR"), soroban_sdk::Symbol::new(env, topic)),
        data,
    );
}

// ── Event structs ─────────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderAddedEvent {
    pub provider: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderRemovedEvent {
    pub provider: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CooldownUpdatedEvent {
    pub old_seconds: u64,
    pub new_seconds: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PausedEvent {
    pub by: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnpausedEvent {
    pub by: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchOpenedEvent {
    pub batch_id: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchClosedEvent {
    pub batch_id: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionSubmittedEvent {
    pub user: Address,
    pub provider: Address,
    pub batch_id: u64,
    /// `export_opaque` of the submitted handle.
    pub handle_export: Bytes,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionRequestedEvent {
    pub request_id: u64,
    pub batch_id: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionCompletedEvent {
    pub request_id: u64,
    pub batch_id: u64,
    pub total: i128,
    pub timestamp: u64,
}

// ── Publishers ────────────────────────────────────────────────────────────────

pub fn publish_provider_added(env: &Env, provider: Address) {
    emit(
        env,
        "ProviderAdded",
        ProviderAddedEvent {
            provider,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_provider_removed(env: &Env, provider: Address) {
    emit(
        env,
        "ProviderRemoved",
        ProviderRemovedEvent {
            provider,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_cooldown_updated(env: &Env, old_seconds: u64, new_seconds: u64) {
    emit(
        env,
        "CooldownUpdated",
        CooldownUpdatedEvent {
            old_seconds,
            new_seconds,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_paused(env: &Env, by: Address) {
    emit(
        env,
        "Paused",
        PausedEvent {
            by,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unpaused(env: &Env, by: Address) {
    emit(
        env,
        "Unpaused",
        UnpausedEvent {
            by,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_batch_opened(env: &Env, batch_id: u64) {
    emit(
        env,
        "BatchOpened",
        BatchOpenedEvent {
            batch_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_batch_closed(env: &Env, batch_id: u64) {
    emit(
        env,
        "BatchClosed",
        BatchClosedEvent {
            batch_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_contribution_submitted(
    env: &Env,
    user: Address,
    provider: Address,
    batch_id: u64,
    handle_export: Bytes,
) {
    emit(
        env,
        "ContribSubmitted",
        ContributionSubmittedEvent {
            user,
            provider,
            batch_id,
            handle_export,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_decryption_requested(env: &Env, request_id: u64, batch_id: u64) {
    emit(
        env,
        "DecryptRequested",
        DecryptionRequestedEvent {
            request_id,
            batch_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_decryption_completed(env: &Env, request_id: u64, batch_id: u64, total: i128) {
    emit(
        env,
        "DecryptCompleted",
        DecryptionCompletedEvent {
            request_id,
            batch_id,
            total,
            timestamp: env.ledger().timestamp(),
        },
    );
}
