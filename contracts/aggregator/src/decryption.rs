//! Request/callback protocol with the decryption oracle.
//!
//! A request snapshots the batch aggregate together with the batch's
//! submission count; the callback is honoured only while that snapshot still
//! holds, only once, and only with a proof the oracle accepts.

use soroban_sdk::{contracttype, symbol_short, vec, xdr::ToXdr, Bytes, BytesN, Env, Symbol};

use common::persistent::{read, write};

use crate::{
    accumulator, batch,
    errors::AggregatorError,
    events,
    interfaces::{CryptoEngineClient, DecryptionOracleClient},
};

const CONTEXT: Symbol = symbol_short!("DEC_CTX");
const RESULT: Symbol = symbol_short!("DEC_RES");

/// Correlates an oracle request with the batch it reveals.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionContext {
    pub batch_id: u64,
    pub integrity_snapshot_hash: BytesN<32>,
    pub processed: bool,
}

/// The revealed total of a completed request.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionResult {
    pub request_id: u64,
    pub batch_id: u64,
    pub total: i128,
    pub completed_at: u64,
}

fn context_key(request_id: u64) -> (Symbol, u64) {
    (CONTEXT, request_id)
}

fn result_key(request_id: u64) -> (Symbol, u64) {
    (RESULT, request_id)
}

pub fn context(env: &Env, request_id: u64) -> Option<DecryptionContext> {
    read(env, &context_key(request_id))
}

pub fn result(env: &Env, request_id: u64) -> Option<DecryptionResult> {
    read(env, &result_key(request_id))
}

fn save_context(env: &Env, request_id: u64, ctx: &DecryptionContext) {
    write(env, &context_key(request_id), ctx);
}

/// `sha256(export_opaque(aggregate) ‖ submission_count_be ‖ xdr(service address))`
pub fn snapshot_hash(
    env: &Env,
    engine: &CryptoEngineClient,
    batch_id: u64,
    aggregate: &BytesN<32>,
) -> BytesN<32> {
    let mut buf = engine.export_opaque(aggregate);
    buf.extend_from_array(&accumulator::submission_count(env, batch_id).to_be_bytes());
    buf.append(&env.current_contract_address().to_xdr(env));
    env.crypto().sha256(&buf).into()
}

/// Cleartext totals travel as a 16-byte big-endian `i128`.
pub fn decode_total(cleartext: &Bytes) -> Result<i128, AggregatorError> {
    if cleartext.len() != 16 {
        return Err(AggregatorError::InvalidArgument);
    }
    let mut raw = [0u8; 16];
    cleartext.copy_into_slice(&mut raw);
    Ok(i128::from_be_bytes(raw))
}

/// Snapshots the aggregate of `batch_id` and asks the oracle to reveal it.
pub fn request(
    env: &Env,
    engine: &CryptoEngineClient,
    oracle: &DecryptionOracleClient,
    batch_id: u64,
) -> Result<u64, AggregatorError> {
    if batch_id == 0 || batch_id > batch::current_batch_id(env) {
        return Err(AggregatorError::InvalidArgument);
    }
    let aggregate = accumulator::aggregate(env, batch_id).ok_or(AggregatorError::NotInitialized)?;
    if !engine.is_initialized(&aggregate) {
        return Err(AggregatorError::NotInitialized);
    }

    let integrity_snapshot_hash = snapshot_hash(env, engine, batch_id, &aggregate);
    let service = env.current_contract_address();
    let handles = vec![env, engine.export_opaque(&aggregate)];
    let request_id = oracle.request_decryption(&service, &handles, &service);

    if context(env, request_id).is_some() {
        return Err(AggregatorError::ReplayAttempt);
    }
    save_context(
        env,
        request_id,
        &DecryptionContext {
            batch_id,
            integrity_snapshot_hash,
            processed: false,
        },
    );

    events::publish_decryption_requested(env, request_id, batch_id);
    Ok(request_id)
}

/// Validates an oracle delivery and finalizes the request.
pub fn complete(
    env: &Env,
    engine: &CryptoEngineClient,
    oracle: &DecryptionOracleClient,
    request_id: u64,
    cleartext: &Bytes,
    proof: &Bytes,
) -> Result<i128, AggregatorError> {
    let mut ctx = context(env, request_id).ok_or(AggregatorError::InvalidArgument)?;
    if ctx.processed {
        return Err(AggregatorError::ReplayAttempt);
    }

    let aggregate =
        accumulator::aggregate(env, ctx.batch_id).ok_or(AggregatorError::StateMismatch)?;
    if snapshot_hash(env, engine, ctx.batch_id, &aggregate) != ctx.integrity_snapshot_hash {
        return Err(AggregatorError::StateMismatch);
    }

    if !oracle.verify(&request_id, cleartext, proof) {
        return Err(AggregatorError::InvalidProof);
    }
    let total = decode_total(cleartext)?;

    ctx.processed = true;
    save_context(env, request_id, &ctx);

    write(
        env,
        &result_key(request_id),
        &DecryptionResult {
            request_id,
            batch_id: ctx.batch_id,
            total,
            completed_at: env.ledger().timestamp(),
        },
    );

    events::publish_decryption_completed(env, request_id, ctx.batch_id, total);
    Ok(total)
}
