use soroban_sdk::{symbol_short, Env, Symbol};

use crate::CommonError;

const PAUSED: Symbol = symbol_short!("PAUSED");

/// Returns `true` when the contract is paused.
pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

/// Guard: returns `CommonError::Paused` when the contract is paused.
///
/// Place this at the top of every state-mutating function that must honour
/// the pause. View-only functions should **not** call this.
pub fn require_not_paused(env: &Env) -> Result<(), CommonError> {
    if is_paused(env) {
        return Err(CommonError::Paused);
    }
    Ok(())
}

/// Engages the kill switch. Pausing an already paused contract is rejected.
///
/// Callers are responsible for enforcing owner authorization before invoking
/// this function. The module itself does **not** perform auth checks.
pub fn pause(env: &Env) -> Result<(), CommonError> {
    require_not_paused(env)?;
    env.storage().instance().set(&PAUSED, &true);
    Ok(())
}

/// Releases the kill switch. Redundant unpausing is allowed.
pub fn unpause(env: &Env) {
    env.storage().instance().set(&PAUSED, &false);
}
