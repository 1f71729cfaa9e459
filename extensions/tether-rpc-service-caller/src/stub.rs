//! Client stubs: typed per-method calls and a generic per-interface stub.

mod pending_call;
pub use pending_call::*;

mod rpc_call;
pub use rpc_call::*;

mod service_stub;
pub use service_stub::*;
