//! # Decryption Gateway
//!
//! Reference decryption oracle. Requesters register exported ciphertexts;
//! an authorised relayer decrypts off-chain and files an attestation binding
//! the cleartext to the request; the relayer then delivers
//! `(request_id, cleartext, proof)` to the requester's callback, which checks
//! the proof through [`DecryptionGatewayContract::verify`].
//!
//! Delivery is a separate invocation by the relayer rather than a call made
//! from inside this contract: the callback calls back into `verify`, and
//! Soroban rejects contract re-entry.
//!
//! ## Proof format
//! ```text
//! proof = sha256(request_id_be ‖ handle_0 ‖ … ‖ handle_k ‖ cleartext)
//! ```
#![no_std]


use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, Address, Bytes,
    BytesN, Env, Symbol, Vec,
};

use common::persistent;

// ── Storage keys ────────────────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const REQ_CTR: Symbol = symbol_short!("REQ_CTR");
const REQUEST: Symbol = symbol_short!("REQUEST");
const ATTEST: Symbol = symbol_short!("ATTEST");
const RELAYER: Symbol = symbol_short!("RELAYER");

// ── Types ──────────────────────────────────────────────────────────────────────

/// A registered decryption request.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionRequest {
    pub id: u64,
    pub requester: Address,
    /// Contract the relayer delivers the result to.
    pub callback: Address,
    /// Exported ciphertext handles, in the order the requester supplied them.
    pub handles: Vec<Bytes>,
    pub requested_at: u64,
}

/// A relayer's signed-off result for a request.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attestation {
    pub request_id: u64,
    pub digest: BytesN<32>,
    pub relayer: Address,
    pub attested_at: u64,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GatewayError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    RequestNotFound = 5,
    AlreadyAttested = 6,
}

fn request_key(id: u64) -> (Symbol, u64) {
    (REQUEST, id)
}

fn attestation_key(id: u64) -> (Symbol, u64) {
    (ATTEST, id)
}

fn relayer_key(relayer: &Address) -> (Symbol, Address) {
    (RELAYER, relayer.clone())
}

fn digest(env: &Env, request: &DecryptionRequest, cleartext: &Bytes) -> BytesN<32> {
    let mut buf = Bytes::new(env);
    buf.extend_from_array(&request.id.to_be_bytes());
    for handle in request.handles.iter() {
        buf.append(&handle);
    }
    buf.append(cleartext);
    env.crypto().sha256(&buf).into()
}

// ── Contract ───────────────────────────────────────────────────────────────────

#[contract]
pub struct DecryptionGatewayContract;

#[contractimpl]
impl DecryptionGatewayContract {
    pub fn initialize(env: Env, admin: Address) -> Result<(), GatewayError> {
        if env.storage().instance().has(&ADMIN) {
            return Err(GatewayError::AlreadyInitialized);
        }
        admin.require_auth();
        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&REQ_CTR, &0u64);
        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, GatewayError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(GatewayError::NotInitialized)
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), GatewayError> {
        caller.require_auth();
        let admin = Self::get_admin(env.clone())?;
        if *caller != admin {
            return Err(GatewayError::Unauthorized);
        }
        Ok(())
    }

    // ── Relayers ──────────────────────────────────────────────────────────────

    pub fn add_relayer(env: Env, caller: Address, relayer: Address) -> Result<(), GatewayError> {
        Self::require_admin(&env, &caller)?;
        persistent::write(&env, &relayer_key(&relayer), &true);
        Ok(())
    }

    pub fn remove_relayer(env: Env, caller: Address, relayer: Address) -> Result<(), GatewayError> {
        Self::require_admin(&env, &caller)?;
        env.storage().persistent().remove(&relayer_key(&relayer));
        Ok(())
    }

    pub fn is_relayer(env: Env, relayer: Address) -> bool {
        persistent::read(&env, &relayer_key(&relayer)).unwrap_or(false)
    }

    // ── Requests ──────────────────────────────────────────────────────────────

    /// Registers a decryption request and returns its correlation id.
    pub fn request_decryption(
        env: Env,
        requester: Address,
        handles: Vec<Bytes>,
        callback: Address,
    ) -> Result<u64, GatewayError> {
        requester.require_auth();
        if handles.is_empty() {
            return Err(GatewayError::InvalidInput);
        }

        let id: u64 = env
            .storage()
            .instance()
            .get(&REQ_CTR)
            .ok_or(GatewayError::NotInitialized)?;
        let id = id.saturating_add(1);
        env.storage().instance().set(&REQ_CTR, &id);

        let request = DecryptionRequest {
            id,
            requester,
            callback,
            handles,
            requested_at: env.ledger().timestamp(),
        };
        persistent::write(&env, &request_key(id), &request);

        log!(&env, "decryption requested", id);
        Ok(id)
    }

    pub fn get_request(env: Env, request_id: u64) -> Result<DecryptionRequest, GatewayError> {
        persistent::read(&env, &request_key(request_id)).ok_or(GatewayError::RequestNotFound)
    }

    // ── Attestation & verification ────────────────────────────────────────────

    /// Binds `cleartext` to `request_id` and returns the proof the relayer
    /// delivers alongside it. One attestation per request.
    pub fn attest(
        env: Env,
        relayer: Address,
        request_id: u64,
        cleartext: Bytes,
    ) -> Result<Bytes, GatewayError> {
        relayer.require_auth();
        if !Self::is_relayer(env.clone(), relayer.clone()) {
            return Err(GatewayError::Unauthorized);
        }
        let request = Self::get_request(env.clone(), request_id)?;
        let key = attestation_key(request_id);
        if env.storage().persistent().has(&key) {
            return Err(GatewayError::AlreadyAttested);
        }

        let attestation = Attestation {
            request_id,
            digest: digest(&env, &request, &cleartext),
            relayer,
            attested_at: env.ledger().timestamp(),
        };
        persistent::write(&env, &key, &attestation);

        Ok(attestation.digest.into())
    }

    pub fn get_attestation(env: Env, request_id: u64) -> Option<Attestation> {
        persistent::read(&env, &attestation_key(request_id))
    }

    /// `true` iff `proof` is the attested digest for `request_id` and
    /// `cleartext` is the value it was computed over.
    pub fn verify(env: Env, request_id: u64, cleartext: Bytes, proof: Bytes) -> bool {
        let Some(attestation) = Self::get_attestation(env.clone(), request_id) else {
            return false;
        };
        let Ok(request) = Self::get_request(env.clone(), request_id) else {
            return false;
        };
        let attested: Bytes = attestation.digest.clone().into();
        proof == attested && digest(&env, &request, &cleartext) == attestation.digest
    }
}
