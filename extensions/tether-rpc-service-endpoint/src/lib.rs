mod endpoint;
pub use endpoint::*;

pub mod error;
pub use error::{HandlerError, RpcServiceEndpointError};

mod service_provider;
pub use service_provider::*;
