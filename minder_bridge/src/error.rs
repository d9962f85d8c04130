//! Error types for the bridge.

use std::time::Duration;

use crate::correlation::CorrelationId;

/// Errors that can occur while talking to the backend or dispatching its notifications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The host never exposed a method table carrying the readiness probe.
    #[error("Unable to connect to backend: method table is not available")]
    NotConnected,

    #[error("Missing {name} from backend hooks")]
    UnknownMethod { name: String },

    /// Strict dispatch only; the tolerant path ignores unknown ids.
    #[error("Missing callback with identifier {id}")]
    UnknownCorrelationId { id: CorrelationId },

    #[error("Deferred was already fulfilled")]
    AlreadyFulfilled,

    /// Every handle able to fulfill the deferred was dropped.
    #[error("Deferred was abandoned before it was fulfilled")]
    Abandoned,

    #[error("Call to {method} timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("Backend call {method} failed: {reason}")]
    Remote { method: String, reason: String },

    #[error("Unable to encode arguments for {method}: {reason}")]
    Encode { method: String, reason: String },

    #[error("Unexpected response from {method}: {reason}")]
    Decode { method: String, reason: String },

    #[error("Malformed notification: {reason}")]
    MalformedNotification { reason: String },

    /// An actor of the bridge did not answer, e.g. the dispatcher after its conduit closed.
    #[error("Actor {actor} unreachable: {reason}")]
    Unreachable { actor: String, reason: String },

    /// Background requests need a tokio runtime to run on.
    #[error("No async runtime available to run {method}")]
    NoRuntime { method: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub(crate) fn remote(method: &str, err: anyhow::Error) -> Self {
        BridgeError::Remote {
            method: method.to_string(),
            reason: format!("{err:#}"),
        }
    }
}
