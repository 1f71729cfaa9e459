use tether::command::ProtocolError;
use tether::serialize::SerializeError;
use thiserror::Error;

/// Error type returned by method handlers. Its message is sent to the caller.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RpcServiceEndpointError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("serialization error: {0}")]
    Serialize(#[from] SerializeError),

    /// A typed method uses an argument or result type the serializer registry
    /// cannot handle.
    #[error("`{interface}.{method}` uses unsupported type `{type_name}`")]
    UnsupportedSignature {
        interface: String,
        method: String,
        type_name: &'static str,
    },

    #[error("`{interface}.{method}` is defined more than once")]
    DuplicateMethod { interface: String, method: String },

    /// A typed method was added to a provider of a different interface.
    #[error("method `{method}` belongs to `{expected}`, not `{found}`")]
    InterfaceMismatch {
        method: String,
        expected: &'static str,
        found: String,
    },
}
