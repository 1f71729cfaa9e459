// Command header layout. All integers are 4-byte big-endian.

/// Protocol version written by this implementation and the only one accepted
/// when decoding.
pub const PROTOCOL_VERSION: i32 = 1;

/// Byte offset of the request id (`i32`).
/// This is the request/response correlation id.
pub const COMMAND_REQUEST_ID_OFFSET: usize = 0;

/// Byte offset of the protocol version (`i32`).
pub const COMMAND_VERSION_OFFSET: usize = 4;

/// Byte offset of the command type (`i32`).
/// Values correspond to enum `CommandType` variants.
pub const COMMAND_TYPE_OFFSET: usize = 8;

/// Size of the request header: request id, version and type.
pub const COMMAND_HEADER_SIZE: usize = 12;

/// Byte offset of the response code (`i32`), response headers only.
pub const RESPONSE_CODE_OFFSET: usize = 12;

/// Byte offset of the error message length (`i32`), response headers only.
pub const RESPONSE_ERROR_LENGTH_OFFSET: usize = 16;

/// Size of the fixed part of a response header, before the error bytes.
pub const RESPONSE_HEADER_FIXED_SIZE: usize = 20;
