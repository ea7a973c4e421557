//! # Reference Crypto Engine
//!
//! Additively homomorphic encryption over opaque 32-byte handles, exposing
//! the capability set the aggregator consumes:
//!
//! | Entry point      | Semantics                                  |
//! |------------------|--------------------------------------------|
//! | `encrypted_zero` | fresh encryption of 0                      |
//! | `is_initialized` | handle was issued under this engine's key  |
//! | `add`            | `E(a) ⊕ E(b) = E(a + b)`                   |
//! | `export_opaque`  | stable bytes for hashing / correlation     |
//!
//! `encrypt` serves data providers; `decrypt` is reserved for the configured
//! decryptor (the oracle's key holder).
#![no_std]

pub mod handle;
pub mod paillier;


use soroban_sdk::{
    contract, contracterror, contractimpl, log, symbol_short, Address, Bytes, BytesN, Env, Symbol,
};

use crate::paillier::{Paillier, PaillierPrivateKey, PaillierPublicKey};

// ── Storage keys ────────────────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const DECRYPTOR: Symbol = symbol_short!("DECRYPTR");
const PUB_KEY: Symbol = symbol_short!("PUB_KEY");
const PRIV_KEY: Symbol = symbol_short!("PRIV_KEY");
const FPRINT: Symbol = symbol_short!("FPRINT");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum EngineError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidPlaintext = 4,
    InvalidKey = 5,
}

// ── Contract ───────────────────────────────────────────────────────────────────

#[contract]
pub struct FheEngineContract;

#[contractimpl]
impl FheEngineContract {
    pub fn initialize(
        env: Env,
        admin: Address,
        decryptor: Address,
        pub_key: PaillierPublicKey,
        priv_key: PaillierPrivateKey,
    ) -> Result<(), EngineError> {
        if env.storage().instance().has(&ADMIN) {
            return Err(EngineError::AlreadyInitialized);
        }
        admin.require_auth();
        if !pub_key.is_well_formed() || !priv_key.matches(&pub_key) {
            return Err(EngineError::InvalidKey);
        }

        let fp = handle::fingerprint(&env, &pub_key);
        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&DECRYPTOR, &decryptor);
        env.storage().instance().set(&PUB_KEY, &pub_key);
        env.storage().instance().set(&PRIV_KEY, &priv_key);
        env.storage().instance().set(&FPRINT, &fp);
        log!(&env, "engine initialised", pub_key.n);
        Ok(())
    }

    pub fn get_public_key(env: Env) -> Result<PaillierPublicKey, EngineError> {
        env.storage()
            .instance()
            .get(&PUB_KEY)
            .ok_or(EngineError::NotInitialized)
    }

    pub fn get_decryptor(env: Env) -> Result<Address, EngineError> {
        env.storage()
            .instance()
            .get(&DECRYPTOR)
            .ok_or(EngineError::NotInitialized)
    }

    // ── Capability set ────────────────────────────────────────────────────────

    pub fn encrypted_zero(env: Env) -> Result<BytesN<32>, EngineError> {
        Self::encrypt(env, 0)
    }

    pub fn encrypt(env: Env, m: i128) -> Result<BytesN<32>, EngineError> {
        let (pub_key, fp) = Self::key_material(&env)?;
        let c = Paillier::encrypt(&env, &pub_key, m).ok_or(EngineError::InvalidPlaintext)?;
        Ok(handle::encode(&env, &fp, c))
    }

    pub fn is_initialized(env: Env, handle: BytesN<32>) -> bool {
        match Self::key_material(&env) {
            Ok((pub_key, fp)) => handle::decode(&handle, &fp, &pub_key).is_some(),
            Err(_) => false,
        }
    }

    pub fn add(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> Result<BytesN<32>, EngineError> {
        let (pub_key, fp) = Self::key_material(&env)?;
        let c1 = handle::decode(&lhs, &fp, &pub_key).ok_or(EngineError::NotInitialized)?;
        let c2 = handle::decode(&rhs, &fp, &pub_key).ok_or(EngineError::NotInitialized)?;
        Ok(handle::encode(&env, &fp, Paillier::add(&pub_key, c1, c2)))
    }

    pub fn export_opaque(_env: Env, handle: BytesN<32>) -> Bytes {
        handle.into()
    }

    // ── Key holder ───────────────────────────────────────────────────────────

    pub fn decrypt(env: Env, caller: Address, handle: BytesN<32>) -> Result<i128, EngineError> {
        caller.require_auth();
        let decryptor = Self::get_decryptor(env.clone())?;
        if caller != decryptor {
            return Err(EngineError::Unauthorized);
        }

        let (pub_key, fp) = Self::key_material(&env)?;
        let priv_key: PaillierPrivateKey = env
            .storage()
            .instance()
            .get(&PRIV_KEY)
            .ok_or(EngineError::NotInitialized)?;
        let c = handle::decode(&handle, &fp, &pub_key).ok_or(EngineError::NotInitialized)?;
        Ok(Paillier::decrypt(&pub_key, &priv_key, c))
    }

    fn key_material(env: &Env) -> Result<(PaillierPublicKey, BytesN<32>), EngineError> {
        let pub_key: PaillierPublicKey = env
            .storage()
            .instance()
            .get(&PUB_KEY)
            .ok_or(EngineError::NotInitialized)?;
        let fp: BytesN<32> = env
            .storage()
            .instance()
            .get(&FPRINT)
            .ok_or(EngineError::NotInitialized)?;
        Ok((pub_key, fp))
    }
}
