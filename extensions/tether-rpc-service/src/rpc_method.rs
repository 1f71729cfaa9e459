use std::any::Any;

/// Describes one method of a remote service interface.
///
/// A method is identified on the wire by the pair
/// (`INTERFACE_NAME`, `METHOD_NAME`). Its argument and result are carried as
/// tag-prefixed values, so both types need a serializer in the
/// [`SerializerRegistry`] used by the client and the server.
///
/// Implementations are usually generated with [`rpc_method!`] or
/// [`rpc_service!`]; the client side gets `call` for free through
/// `RpcCall`, and the server side registers a handler per method.
///
/// [`SerializerRegistry`]: tether::serialize::SerializerRegistry
/// [`rpc_method!`]: crate::rpc_method
/// [`rpc_service!`]: crate::rpc_service
pub trait RpcMethod {
    /// Fully qualified name of the service interface the method belongs to.
    const INTERFACE_NAME: &'static str;

    const METHOD_NAME: &'static str;

    /// The argument type sent by the caller (e.g., `String`).
    type Input: Any + Send + Sync;

    /// The result type returned to the caller (e.g., `String`).
    type Output: Any + Send;
}
