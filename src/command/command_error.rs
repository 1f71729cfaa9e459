use thiserror::Error;

/// A command could not be decoded from the bytes of a frame.
///
/// Protocol errors are fatal to the connection the frame arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("truncated command: needed {needed} bytes but only {available} are available")]
    Truncated { needed: usize, available: usize },

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(i32),

    #[error("unknown command type {0}")]
    UnknownCommandType(i32),

    #[error("invalid error message length {0}")]
    InvalidErrorLength(i32),

    #[error("error message is not valid UTF-8")]
    InvalidUtf8,
}
