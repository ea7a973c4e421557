use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::{persistent, CommonError};

const OWNER: Symbol = symbol_short!("OWNER");
const PROVIDER: Symbol = symbol_short!("PROVIDER");

fn provider_key(address: &Address) -> (Symbol, Address) {
    (PROVIDER, address.clone())
}

/// Records the owner. Written once by the contract constructor; there is no
/// transfer path.
pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
}

/// Returns the owner, or `None` before initialization.
pub fn get_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OWNER)
}

/// Fails with `NotOwner` unless `caller` is the stored owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<(), CommonError> {
    let owner = get_owner(env).ok_or(CommonError::NotInitialized)?;
    if *caller != owner {
        return Err(CommonError::NotOwner);
    }
    Ok(())
}

/// Adds `address` to the provider set. Re-adding an existing provider simply
/// rewrites the entry.
pub fn add_provider(env: &Env, address: &Address) {
    persistent::write(env, &provider_key(address), &true);
}

/// Removes `address` from the provider set.
pub fn remove_provider(env: &Env, address: &Address) -> Result<(), CommonError> {
    if !is_provider(env, address) {
        return Err(CommonError::InvalidArgument);
    }
    env.storage().persistent().remove(&provider_key(address));
    Ok(())
}

/// Returns whether `address` currently holds the provider role.
pub fn is_provider(env: &Env, address: &Address) -> bool {
    persistent::read(env, &provider_key(address)).unwrap_or(false)
}

/// Fails with `NotProvider` unless `caller` holds the provider role.
pub fn require_provider(env: &Env, caller: &Address) -> Result<(), CommonError> {
    if !is_provider(env, caller) {
        return Err(CommonError::NotProvider);
    }
    Ok(())
}
