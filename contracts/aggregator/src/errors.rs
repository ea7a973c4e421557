use common::CommonError;
use soroban_sdk::contracterror;

/// Error codes surfaced by the aggregator. Codes below 60 coincide with
/// [`CommonError`] so a guard failure keeps its number through `?`.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AggregatorError {
    /// Contract not initialized, or a ciphertext handle that the engine does
    /// not recognise.
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotOwner = 10,
    NotProvider = 11,
    InvalidArgument = 30,
    Paused = 40,
    CooldownActive = 41,
    /// Submission while no batch is open.
    BatchClosed = 42,
    /// Callback for a request that already completed.
    ReplayAttempt = 60,
    /// The aggregate changed between request and callback.
    StateMismatch = 61,
    InvalidProof = 62,
}

impl From<CommonError> for AggregatorError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::NotInitialized => AggregatorError::NotInitialized,
            CommonError::AlreadyInitialized => AggregatorError::AlreadyInitialized,
            CommonError::NotOwner => AggregatorError::NotOwner,
            CommonError::NotProvider => AggregatorError::NotProvider,
            CommonError::InvalidArgument => AggregatorError::InvalidArgument,
            CommonError::Paused => AggregatorError::Paused,
            CommonError::CooldownActive => AggregatorError::CooldownActive,
        }
    }
}
