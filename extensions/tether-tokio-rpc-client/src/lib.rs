mod client_config;
pub use client_config::ClientConfig;

mod rpc_client;
pub use rpc_client::RpcClient;
