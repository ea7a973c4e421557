//! Per-caller, per-operation-class throttling.
//!
//! Every principal carries one timestamp per [`CooldownClass`]. An action of a
//! class is rejected while `now < last + cooldown_seconds`; a successful
//! action resets the timestamp to `now`. A principal that never acted in a
//! class is not throttled for it.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::{persistent, CommonError};

const COOLDOWN: Symbol = symbol_short!("COOLDOWN");
const LAST_ACT: Symbol = symbol_short!("LAST_ACT");

/// Independently throttled operation classes.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CooldownClass {
    Submission,
    DecryptionRequest,
}

fn last_action_key(class: CooldownClass, caller: &Address) -> (Symbol, CooldownClass, Address) {
    (LAST_ACT, class, caller.clone())
}

/// Stores a new interval and returns the previous one.
///
/// A zero interval is rejected and leaves the stored value untouched.
pub fn set_cooldown_seconds(env: &Env, seconds: u64) -> Result<u64, CommonError> {
    if seconds == 0 {
        return Err(CommonError::InvalidArgument);
    }
    let previous = cooldown_seconds(env);
    env.storage().instance().set(&COOLDOWN, &seconds);
    Ok(previous)
}

/// The configured interval, 0 before configuration.
pub fn cooldown_seconds(env: &Env) -> u64 {
    env.storage().instance().get(&COOLDOWN).unwrap_or(0)
}

/// Ledger timestamp of `caller`'s last successful action in `class`.
pub fn last_action(env: &Env, class: CooldownClass, caller: &Address) -> Option<u64> {
    persistent::read(env, &last_action_key(class, caller))
}

/// Fails with `CooldownActive` while `caller` is still inside the interval.
pub fn require_cooldown_elapsed(
    env: &Env,
    class: CooldownClass,
    caller: &Address,
) -> Result<(), CommonError> {
    if let Some(last) = last_action(env, class, caller) {
        let ready_at = last.saturating_add(cooldown_seconds(env));
        if env.ledger().timestamp() < ready_at {
            return Err(CommonError::CooldownActive);
        }
    }
    Ok(())
}

/// Resets `caller`'s timer for `class` to the current ledger timestamp.
pub fn touch(env: &Env, class: CooldownClass, caller: &Address) {
    persistent::write(
        env,
        &last_action_key(class, caller),
        &env.ledger().timestamp(),
    );
}
