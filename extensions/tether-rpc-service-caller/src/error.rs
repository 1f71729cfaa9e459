use std::time::Duration;
use tether::command::ProtocolError;
use tether::serialize::SerializeError;
use thiserror::Error;

/// Represents errors that can occur during an RPC call from the perspective of the caller.
///
/// Every variant is the terminal outcome of exactly one call.
#[derive(Debug, Clone, Error)]
pub enum RpcCallerError {
    /// No in-flight slot became available in time. The request was not sent.
    #[error("no in-flight slot became available within {waited:?}")]
    BackpressureTimeout { waited: Duration },

    /// The request was sent but no response arrived within the timeout window.
    #[error("request {request_id} timed out after {elapsed:?}")]
    Timeout { request_id: i32, elapsed: Duration },

    /// Writing the request or keeping the connection alive failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with an error code.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("serialization error: {0}")]
    Serialize(#[from] SerializeError),

    /// The response could not be interpreted.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The request id is still held by an earlier in-flight request, which can
    /// only happen after the id counter wraps around.
    #[error("request id {0} is already in flight")]
    DuplicateRequestId(i32),
}

impl RpcCallerError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// An error reported by the server in a response header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Nothing is registered on the server under the requested interface name.
    #[error("no provider: {0}")]
    NoProvider(String),

    /// Dispatch failed on the server; carries the server's error message.
    #[error("remote call failed: {0}")]
    Failed(String),
}

impl RemoteError {
    pub fn message(&self) -> &str {
        match self {
            RemoteError::NoProvider(message) | RemoteError::Failed(message) => message,
        }
    }
}
