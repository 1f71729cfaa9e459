use std::time::Duration;
use tether_rpc_service::constants::{
    DEFAULT_MAX_IN_FLIGHT_REQUESTS, DEFAULT_PERMIT_ACQUIRE_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SWEEP_INTERVAL,
};

/// Limits applied by [`InFlightRequests`](crate::InFlightRequests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlightConfig {
    /// Number of requests that may be outstanding at once.
    pub max_in_flight: usize,

    /// How long registration waits for a free slot.
    pub acquire_timeout: Duration,

    /// Age, measured from registration, after which a request is failed.
    pub request_timeout: Duration,

    /// Period of the background sweep.
    pub sweep_interval: Duration,
}

impl Default for InFlightConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT_REQUESTS,
            acquire_timeout: DEFAULT_PERMIT_ACQUIRE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl InFlightConfig {
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}
