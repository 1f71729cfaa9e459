use std::time::Duration;

/// Maximum number of requests a single client connection keeps in flight.
pub const DEFAULT_MAX_IN_FLIGHT_REQUESTS: usize = 10;

/// How long `send` waits for an in-flight slot before failing with a
/// backpressure timeout.
pub const DEFAULT_PERMIT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Age after which an unanswered request is failed by the sweep.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Period of the background sweep that reaps timed-out requests.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Largest frame either side accepts, in bytes (excluding the 4-byte length
/// prefix).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// Error string sent with a `NoProvider` response.
pub const NO_PROVIDER_MESSAGE: &str = "No provider!";

/// URI scheme under which RPC servers publish their address.
pub const RPC_URI_SCHEME: &str = "rpc";
