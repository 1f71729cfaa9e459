mod greeting;
pub use greeting::*;

mod hello_service;
pub use hello_service::*;

use tether::serialize::{SerializeError, SerializerRegistry};
use tether_rpc_service::rpc_serializer_registry_builder;

/// The registry both sides of the example service share.
pub fn example_serializer_registry() -> Result<SerializerRegistry, SerializeError> {
    rpc_serializer_registry_builder()
        .register_typed::<GreetingSerializer>()
        .build()
}
