use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Discriminates the kind of command carried by a header.
///
/// Only RPC requests are defined; the receiving side routes on this value and
/// rejects anything it does not recognize.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum CommandType {
    RpcRequest = 0,
}
