mod rpc_request;
pub use rpc_request::*;
mod rpc_method;
pub use rpc_method::*;
pub mod constants;
pub use constants::*;
mod macros;
pub mod name_service;

pub use tether::command::ResponseCode;

use tether::serialize::{SerializeError, SerializerRegistry, SerializerRegistryBuilder};

/// A registry builder preloaded with the built-in scalar serializers and the
/// [`RpcRequest`] payload serializer.
///
/// Applications add their own argument/result serializers before calling
/// `build()`.
pub fn rpc_serializer_registry_builder() -> SerializerRegistryBuilder {
    SerializerRegistry::builder()
        .with_builtins()
        .register_typed::<RpcRequestSerializer>()
}

/// The registry every Tether client and server needs at minimum.
pub fn default_serializer_registry() -> Result<SerializerRegistry, SerializeError> {
    rpc_serializer_registry_builder().build()
}
