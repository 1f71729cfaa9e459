use tether::serialize::{ByteCursor, SerializeError, TypedSerializer, put_len_prefixed};

/// Payload of an RPC request command: which method of which service to call,
/// and the already-serialized argument.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    interface_name: String,
    method_name: String,
    serialized_arguments: Vec<u8>,
}

impl RpcRequest {
    pub fn new(
        interface_name: impl Into<String>,
        method_name: impl Into<String>,
        serialized_arguments: Vec<u8>,
    ) -> Self {
        Self {
            interface_name: interface_name.into(),
            method_name: method_name.into(),
            serialized_arguments,
        }
    }

    /// Fully qualified name of the service interface.
    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Tag-prefixed argument bytes.
    pub fn serialized_arguments(&self) -> &[u8] {
        &self.serialized_arguments
    }

    pub fn into_serialized_arguments(self) -> Vec<u8> {
        self.serialized_arguments
    }
}

/// Encodes an [`RpcRequest`] as three length-prefixed fields:
///
/// ```text
/// [len:i32][interface utf-8][len:i32][method utf-8][len:i32][arguments]
/// ```
pub struct RpcRequestSerializer;

impl TypedSerializer for RpcRequestSerializer {
    const TAG: u8 = 101;
    type Value = RpcRequest;

    fn encode(value: &RpcRequest, buf: &mut Vec<u8>) -> Result<(), SerializeError> {
        buf.reserve(
            12 + value.interface_name.len()
                + value.method_name.len()
                + value.serialized_arguments.len(),
        );
        put_len_prefixed(buf, value.interface_name.as_bytes());
        put_len_prefixed(buf, value.method_name.as_bytes());
        put_len_prefixed(buf, &value.serialized_arguments);
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<RpcRequest, SerializeError> {
        let mut cursor = ByteCursor::new(bytes);

        let interface_name = read_utf8(&mut cursor, "interface name")?;
        let method_name = read_utf8(&mut cursor, "method name")?;
        let serialized_arguments = cursor
            .read_len_prefixed()
            .ok_or_else(|| malformed("missing or truncated arguments"))?
            .to_vec();

        if !cursor.is_empty() {
            return Err(malformed("trailing bytes after arguments"));
        }

        Ok(RpcRequest {
            interface_name,
            method_name,
            serialized_arguments,
        })
    }
}

fn read_utf8(cursor: &mut ByteCursor<'_>, field: &str) -> Result<String, SerializeError> {
    let bytes = cursor
        .read_len_prefixed()
        .ok_or_else(|| malformed(format!("missing or truncated {field}")))?;

    String::from_utf8(bytes.to_vec()).map_err(|_| malformed(format!("{field} is not valid UTF-8")))
}

fn malformed(reason: impl Into<String>) -> SerializeError {
    SerializeError::malformed("RpcRequest", reason)
}
