use crate::command::{CommandType, ResponseCode};
use crate::constants::{COMMAND_HEADER_SIZE, PROTOCOL_VERSION, RESPONSE_HEADER_FIXED_SIZE};

/// Fixed-size metadata at the front of every request command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Correlates a request with its response. Assigned by the client and
    /// unique among the client's in-flight requests.
    pub request_id: i32,

    /// Protocol version the sender speaks.
    pub version: i32,

    /// The kind of command, used by the receiver for routing.
    pub command_type: CommandType,
}

impl Header {
    pub fn new(command_type: CommandType, version: i32, request_id: i32) -> Self {
        Self {
            request_id,
            version,
            command_type,
        }
    }

    /// Header for an RPC request speaking the current protocol version.
    pub fn rpc_request(request_id: i32) -> Self {
        Self::new(CommandType::RpcRequest, PROTOCOL_VERSION, request_id)
    }

    /// Encoded length in bytes. Constant for every request header.
    #[inline]
    pub const fn length() -> usize {
        COMMAND_HEADER_SIZE
    }
}

/// Header of a response command.
///
/// Extends [`Header`] with a result code and an error message. The request id
/// and version are always copied from the request being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub request_id: i32,
    pub version: i32,
    pub command_type: CommandType,

    /// Raw response code. See [`ResponseCode`] for the known values.
    pub code: i32,

    /// Human readable error, empty on success.
    pub error: String,
}

impl ResponseHeader {
    /// A successful response to `request`.
    pub fn success(request: &Header) -> Self {
        Self::with_code(request, ResponseCode::Success, String::new())
    }

    pub fn with_code(request: &Header, code: ResponseCode, error: impl Into<String>) -> Self {
        Self {
            request_id: request.request_id,
            version: request.version,
            command_type: request.command_type,
            code: code.value(),
            error: error.into(),
        }
    }

    /// The known response code, or `None` if the peer sent a value this
    /// version does not define.
    pub fn response_code(&self) -> Option<ResponseCode> {
        ResponseCode::try_from(self.code).ok()
    }

    /// Encoded length in bytes, including the error message.
    pub fn length(&self) -> usize {
        RESPONSE_HEADER_FIXED_SIZE + self.error.len()
    }
}
