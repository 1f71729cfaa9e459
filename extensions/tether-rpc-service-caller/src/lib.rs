mod caller_interface;
pub use caller_interface::*;

mod channel_transport;
pub use channel_transport::*;

mod config;
pub use config::*;

pub mod error;
pub use error::{RemoteError, RpcCallerError};

mod in_flight;
pub use in_flight::*;

pub mod stub;

mod transport;
pub use transport::*;
