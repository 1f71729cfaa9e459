mod file_name_service;
pub use file_name_service::*;

mod hello_provider;
pub use hello_provider::hello_provider;

mod observability;
pub use observability::init_tracing;

use std::path::PathBuf;

/// Environment variable overriding where the file name service keeps its data.
pub const NAME_SERVICE_FILE_ENV: &str = "TETHER_NAME_SERVICE_FILE";

const DEFAULT_NAME_SERVICE_FILE: &str = "simple_rpc_name_service.data";

/// Path of the name-service file shared by the demo server and client.
pub fn name_service_file_path() -> PathBuf {
    std::env::var_os(NAME_SERVICE_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_NAME_SERVICE_FILE))
}
