//! Batch lifecycle.
//!
//! ```text
//! Closed ──open_batch──▶ Open ──close_batch──▶ Closed ──▶ …
//! ```
//! Ids are issued sequentially from 1; 0 means no batch has been opened.
//! Closing only blocks further submissions; accumulated data is kept.

use soroban_sdk::{symbol_short, Env, Symbol};

use crate::{accumulator, errors::AggregatorError, events, interfaces::CryptoEngineClient};

const BATCH_ID: Symbol = symbol_short!("BATCH_ID");
const BATCH_OPEN: Symbol = symbol_short!("BATCH_OPN");

/// Most recently opened batch, or 0.
pub fn current_batch_id(env: &Env) -> u64 {
    env.storage().instance().get(&BATCH_ID).unwrap_or(0)
}

pub fn is_open(env: &Env) -> bool {
    env.storage().instance().get(&BATCH_OPEN).unwrap_or(false)
}

/// Id of the open batch, if any.
pub fn open_batch_id(env: &Env) -> Option<u64> {
    if is_open(env) {
        Some(current_batch_id(env))
    } else {
        None
    }
}

pub(crate) fn init(env: &Env) {
    env.storage().instance().set(&BATCH_ID, &0u64);
    env.storage().instance().set(&BATCH_OPEN, &false);
}

/// Opens the next batch with an encrypted-zero aggregate.
pub fn open(env: &Env, engine: &CryptoEngineClient) -> Result<u64, AggregatorError> {
    if is_open(env) {
        return Err(AggregatorError::InvalidArgument);
    }
    let batch_id = current_batch_id(env)
        .checked_add(1)
        .ok_or(AggregatorError::InvalidArgument)?;

    let zero = engine.encrypted_zero();
    accumulator::set_aggregate(env, batch_id, &zero);
    env.storage().instance().set(&BATCH_ID, &batch_id);
    env.storage().instance().set(&BATCH_OPEN, &true);

    events::publish_batch_opened(env, batch_id);
    Ok(batch_id)
}

/// Closes the open batch and returns its id.
pub fn close(env: &Env) -> Result<u64, AggregatorError> {
    let batch_id = open_batch_id(env).ok_or(AggregatorError::InvalidArgument)?;
    env.storage().instance().set(&BATCH_OPEN, &false);
    events::publish_batch_closed(env, batch_id);
    Ok(batch_id)
}
