//! Persistent storage access that keeps live entries from expiring.
//!
//! Entries are bumped to [`TTL_EXTEND_TO`] on every write and on every read
//! that finds them.

use soroban_sdk::{Env, IntoVal, TryFromVal, Val};

use crate::{TTL_EXTEND_TO, TTL_THRESHOLD};

pub fn read<K, V>(env: &Env, key: &K) -> Option<V>
where
    K: IntoVal<Env, Val>,
    V: TryFromVal<Env, Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    value
}

pub fn write<K, V>(env: &Env, key: &K, value: &V)
where
    K: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
