//! Cross-contract interfaces for the two external collaborators.
//!
//! Any contract exposing these entry points can be configured at
//! initialization; the aggregator never assumes a ciphertext representation.

use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env, Vec};

#[contractclient(name = "CryptoEngineClient")]
pub trait CryptoEngine {
    /// A fresh encryption of zero.
    fn encrypted_zero(env: Env) -> BytesN<32>;

    /// Distinguishes an issued ciphertext (including an encrypted zero) from
    /// an empty or foreign handle.
    fn is_initialized(env: Env, handle: BytesN<32>) -> bool;

    /// Homomorphic addition; commutative and associative.
    fn add(env: Env, lhs: BytesN<32>, rhs: BytesN<32>) -> BytesN<32>;

    /// Stable serialization used for hashing and correlation only.
    fn export_opaque(env: Env, handle: BytesN<32>) -> Bytes;
}

#[contractclient(name = "DecryptionOracleClient")]
pub trait DecryptionOracle {
    /// Registers the exported handles for decryption and returns the
    /// correlation id the callback will carry.
    fn request_decryption(
        env: Env,
        requester: Address,
        handles: Vec<Bytes>,
        callback: Address,
    ) -> u64;

    fn verify(env: Env, request_id: u64, cleartext: Bytes, proof: Bytes) -> bool;
}
