//! Encrypted per-batch running totals.
//!
//! Each submission overwrites the user's per-batch contribution *and* is
//! folded into the batch aggregate. A user who submits twice in one batch is
//! therefore counted twice in the aggregate while only their last handle is
//! retrievable.
//!
//! Every accepted submission also bumps a per-batch counter, so a request's
//! snapshot is invalidated even when `add` leaves the aggregate bytes as they
//! were.

use soroban_sdk::{symbol_short, Address, BytesN, Env, Symbol};

use common::persistent::{read, write};

use crate::{batch, errors::AggregatorError, events, interfaces::CryptoEngineClient};

const AGGREGATE: Symbol = symbol_short!("AGG");
const CONTRIB: Symbol = symbol_short!("CONTRIB");
const SUBMITS: Symbol = symbol_short!("SUBMITS");

fn aggregate_key(batch_id: u64) -> (Symbol, u64) {
    (AGGREGATE, batch_id)
}

fn contribution_key(batch_id: u64, user: &Address) -> (Symbol, u64, Address) {
    (CONTRIB, batch_id, user.clone())
}

fn submissions_key(batch_id: u64) -> (Symbol, u64) {
    (SUBMITS, batch_id)
}

pub fn aggregate(env: &Env, batch_id: u64) -> Option<BytesN<32>> {
    read(env, &aggregate_key(batch_id))
}

pub(crate) fn set_aggregate(env: &Env, batch_id: u64, handle: &BytesN<32>) {
    write(env, &aggregate_key(batch_id), handle);
}

pub fn contribution(env: &Env, batch_id: u64, user: &Address) -> Option<BytesN<32>> {
    read(env, &contribution_key(batch_id, user))
}

/// Number of submissions accepted into `batch_id` so far.
pub fn submission_count(env: &Env, batch_id: u64) -> u64 {
    read(env, &submissions_key(batch_id)).unwrap_or(0)
}

/// Records `handle` for `user` in the open batch and adds it to the batch
/// aggregate. Returns the batch id.
pub fn submit(
    env: &Env,
    engine: &CryptoEngineClient,
    provider: &Address,
    user: &Address,
    handle: &BytesN<32>,
) -> Result<u64, AggregatorError> {
    let batch_id = batch::open_batch_id(env).ok_or(AggregatorError::BatchClosed)?;
    if !engine.is_initialized(handle) {
        return Err(AggregatorError::NotInitialized);
    }
    let running = aggregate(env, batch_id).ok_or(AggregatorError::NotInitialized)?;

    let submissions = submission_count(env, batch_id)
        .checked_add(1)
        .ok_or(AggregatorError::InvalidArgument)?;

    let updated = engine.add(&running, handle);
    write(env, &contribution_key(batch_id, user), handle);
    set_aggregate(env, batch_id, &updated);
    write(env, &submissions_key(batch_id), &submissions);

    events::publish_contribution_submitted(
        env,
        user.clone(),
        provider.clone(),
        batch_id,
        engine.export_opaque(handle),
    );
    Ok(batch_id)
}
