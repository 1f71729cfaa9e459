use crate::{
    command::{Command, CommandType, Header, ProtocolError, ResponseCommand, ResponseHeader},
    constants::{
        COMMAND_HEADER_SIZE, COMMAND_REQUEST_ID_OFFSET, COMMAND_TYPE_OFFSET,
        COMMAND_VERSION_OFFSET, PROTOCOL_VERSION, RESPONSE_CODE_OFFSET,
        RESPONSE_ERROR_LENGTH_OFFSET, RESPONSE_HEADER_FIXED_SIZE,
    },
};

/// Provides encoding and decoding functionality for commands.
///
/// The `CommandCodec` serializes a request [`Command`] or a [`ResponseCommand`]
/// into the bytes of a single frame, and parses those bytes back. It only deals
/// with the shape of one command once the frame boundaries are known; splitting
/// a byte stream into frames is the transport's job.
///
/// Request layout:
///
/// ```text
/// [request_id:i32][version:i32][type:i32][payload...]
/// ```
///
/// Response layout:
///
/// ```text
/// [request_id:i32][version:i32][type:i32][code:i32][error_len:i32][error...][payload...]
/// ```
///
/// All integers are big-endian.
pub struct CommandCodec;

impl CommandCodec {
    /// Encodes a request `Command` into a byte vector.
    pub fn encode_request(command: &Command) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Header::length() + command.payload.len());

        Self::put_header(
            &mut buf,
            command.header.request_id,
            command.header.version,
            command.header.command_type,
        );
        buf.extend_from_slice(&command.payload);

        buf
    }

    /// Decodes the bytes of one frame into a request `Command`.
    ///
    /// # Returns
    ///
    /// - `Ok(Command)` with the payload copied out of `buf`.
    /// - `Err(ProtocolError)` if the header is truncated, carries a version other
    ///   than [`PROTOCOL_VERSION`], or names an unknown command type.
    pub fn decode_request(buf: &[u8]) -> Result<Command, ProtocolError> {
        let header = Self::decode_header(buf)?;

        Ok(Command {
            header,
            payload: buf[COMMAND_HEADER_SIZE..].to_vec(),
        })
    }

    /// Encodes a `ResponseCommand` into a byte vector.
    pub fn encode_response(command: &ResponseCommand) -> Vec<u8> {
        let header = &command.header;
        let mut buf = Vec::with_capacity(header.length() + command.payload.len());

        Self::put_header(&mut buf, header.request_id, header.version, header.command_type);
        buf.extend(&header.code.to_be_bytes());
        buf.extend(&(header.error.len() as i32).to_be_bytes());
        buf.extend_from_slice(header.error.as_bytes());
        buf.extend_from_slice(&command.payload);

        buf
    }

    /// Decodes the bytes of one frame into a `ResponseCommand`.
    ///
    /// Fails with a `ProtocolError` under the same conditions as
    /// [`CommandCodec::decode_request`], and additionally if the error length is
    /// negative or runs past the end of the buffer, or if the error message is
    /// not valid UTF-8.
    pub fn decode_response(buf: &[u8]) -> Result<ResponseCommand, ProtocolError> {
        let Header {
            request_id,
            version,
            command_type,
        } = Self::decode_header(buf)?;

        let code = read_i32(buf, RESPONSE_CODE_OFFSET)?;
        let error_len = read_i32(buf, RESPONSE_ERROR_LENGTH_OFFSET)?;
        if error_len < 0 {
            return Err(ProtocolError::InvalidErrorLength(error_len));
        }

        let error_end = RESPONSE_HEADER_FIXED_SIZE + error_len as usize;
        let error_bytes =
            buf.get(RESPONSE_HEADER_FIXED_SIZE..error_end)
                .ok_or(ProtocolError::Truncated {
                    needed: error_end,
                    available: buf.len(),
                })?;
        let error = std::str::from_utf8(error_bytes)
            .map_err(|_| ProtocolError::InvalidUtf8)?
            .to_owned();

        Ok(ResponseCommand {
            header: ResponseHeader {
                request_id,
                version,
                command_type,
                code,
                error,
            },
            payload: buf[error_end..].to_vec(),
        })
    }

    /// Reads only the request id of an encoded command (request or response).
    ///
    /// Useful for logging a frame that otherwise fails to decode.
    pub fn peek_request_id(buf: &[u8]) -> Result<i32, ProtocolError> {
        read_i32(buf, COMMAND_REQUEST_ID_OFFSET)
    }

    fn put_header(buf: &mut Vec<u8>, request_id: i32, version: i32, command_type: CommandType) {
        buf.extend(&request_id.to_be_bytes());
        buf.extend(&version.to_be_bytes());
        buf.extend(&i32::from(command_type).to_be_bytes());
    }

    fn decode_header(buf: &[u8]) -> Result<Header, ProtocolError> {
        if buf.len() < COMMAND_HEADER_SIZE {
            return Err(ProtocolError::Truncated {
                needed: COMMAND_HEADER_SIZE,
                available: buf.len(),
            });
        }

        let request_id = read_i32(buf, COMMAND_REQUEST_ID_OFFSET)?;

        let version = read_i32(buf, COMMAND_VERSION_OFFSET)?;
        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(version));
        }

        let raw_type = read_i32(buf, COMMAND_TYPE_OFFSET)?;
        let command_type = CommandType::try_from(raw_type)
            .map_err(|_| ProtocolError::UnknownCommandType(raw_type))?;

        Ok(Header {
            request_id,
            version,
            command_type,
        })
    }
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, ProtocolError> {
    buf.get(offset..offset + 4)
        .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok())
        .map(i32::from_be_bytes)
        .ok_or(ProtocolError::Truncated {
            needed: offset + 4,
            available: buf.len(),
        })
}
