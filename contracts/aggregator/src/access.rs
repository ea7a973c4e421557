//! Owner-managed provider registry.
//!
//! The owner is fixed at initialization and always holds the provider role.
//! Soroban has no null address; the aggregator's own address stands in as
//! the invalid principal.

use common::roles;
use soroban_sdk::{Address, Env};

use crate::{errors::AggregatorError, events};

pub fn add_provider(env: &Env, provider: &Address) -> Result<(), AggregatorError> {
    if *provider == env.current_contract_address() {
        return Err(AggregatorError::InvalidArgument);
    }
    roles::add_provider(env, provider);
    events::publish_provider_added(env, provider.clone());
    Ok(())
}

pub fn remove_provider(env: &Env, provider: &Address) -> Result<(), AggregatorError> {
    let owner = roles::get_owner(env).ok_or(AggregatorError::NotInitialized)?;
    if *provider == owner {
        return Err(AggregatorError::InvalidArgument);
    }
    roles::remove_provider(env, provider)?;
    events::publish_provider_removed(env, provider.clone());
    Ok(())
}
