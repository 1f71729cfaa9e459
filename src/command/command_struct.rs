use crate::command::{Header, ResponseHeader};

/// A request header paired with its opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub header: Header,

    /// Tag-prefixed payload, interpreted according to `header.command_type`.
    pub payload: Vec<u8>,
}

impl Command {
    pub fn new(header: Header, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    #[inline]
    pub fn request_id(&self) -> i32 {
        self.header.request_id
    }
}

/// A response header paired with its payload. The payload is empty unless the
/// response code is `Success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCommand {
    pub header: ResponseHeader,
    pub payload: Vec<u8>,
}

impl ResponseCommand {
    pub fn new(header: ResponseHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    #[inline]
    pub fn request_id(&self) -> i32 {
        self.header.request_id
    }
}
