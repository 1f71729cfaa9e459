use tether_rpc_service::constants::DEFAULT_MAX_FRAME_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Largest frame accepted or sent, excluding the length prefix. A client
    /// sending a larger frame is disconnected; a larger result is answered
    /// with an `UnknownError` response instead.
    pub max_frame_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl ServerConfig {
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }
}
