//! Opaque ciphertext handles.
//!
//! ```text
//! byte  0       tag (0x01)
//! bytes 1..16   key fingerprint
//! bytes 16..32  ciphertext, big-endian i128
//! ```
//!
//! The all-zero handle is the uninitialized default and never decodes. A
//! ciphertext only decodes when it is a unit mod `n`.

use soroban_sdk::{Bytes, BytesN, Env};

use crate::paillier::{Paillier, PaillierPublicKey};

pub const HANDLE_TAG: u8 = 0x01;

/// Key fingerprint embedded in every handle the engine issues.
pub fn fingerprint(env: &Env, pub_key: &PaillierPublicKey) -> BytesN<32> {
    let mut buf = Bytes::new(env);
    buf.extend_from_array(&pub_key.n.to_be_bytes());
    buf.extend_from_array(&pub_key.g.to_be_bytes());
    env.crypto().sha256(&buf).into()
}

pub fn encode(env: &Env, fingerprint: &BytesN<32>, ciphertext: i128) -> BytesN<32> {
    let fp = fingerprint.to_array();
    let mut raw = [0u8; 32];
    raw[0] = HANDLE_TAG;
    raw[1..16].copy_from_slice(&fp[..15]);
    raw[16..].copy_from_slice(&ciphertext.to_be_bytes());
    BytesN::from_array(env, &raw)
}

/// Recovers the ciphertext, or `None` if the handle was not issued under
/// `pub_key`.
pub fn decode(
    handle: &BytesN<32>,
    fingerprint: &BytesN<32>,
    pub_key: &PaillierPublicKey,
) -> Option<i128> {
    let raw = handle.to_array();
    let fp = fingerprint.to_array();
    if raw[0] != HANDLE_TAG || raw[1..16] != fp[..15] {
        return None;
    }

    let mut ct = [0u8; 16];
    ct.copy_from_slice(&raw[16..]);
    let ciphertext = i128::from_be_bytes(ct);
    if ciphertext <= 0 || ciphertext >= pub_key.nn || Paillier::gcd(ciphertext, pub_key.n) != 1 {
        return None;
    }
    Some(ciphertext)
}
