use tether_rpc_service::constants::DEFAULT_MAX_FRAME_LENGTH;
use tether_rpc_service_caller::InFlightConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub in_flight: InFlightConfig,

    /// Largest response frame accepted, excluding the length prefix.
    pub max_frame_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            in_flight: InFlightConfig::default(),
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl ClientConfig {
    pub fn with_in_flight(mut self, in_flight: InFlightConfig) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }
}
