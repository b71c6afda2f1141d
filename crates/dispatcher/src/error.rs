//! Dispatcher error types

use contracts::{ActionId, DestinationId};
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Destination not registered
    #[error("unknown destination '{0}'")]
    UnknownDestination(DestinationId),

    /// Interactive action not pending (expired or never issued)
    #[error("unknown action {0:?}")]
    UnknownAction(ActionId),

    /// Error from the contracts layer (channel, installer, ...)
    #[error(transparent)]
    Contract(#[from] contracts::CourierError),
}
