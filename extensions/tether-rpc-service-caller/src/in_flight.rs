use crate::{InFlightConfig, ResponseHandle, RpcCallerError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Weak};
use tether::command::ResponseCommand;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, oneshot};
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub(crate) type ResponseSender = oneshot::Sender<Result<ResponseCommand, RpcCallerError>>;

/// One outstanding request.
///
/// Holds the in-flight slot it was admitted with. The slot goes back to the
/// pool when the entry is dropped, so every exit path (response, failure,
/// sweep) releases it exactly once.
struct PendingResponse {
    sender: ResponseSender,
    created_at: Instant,
    _permit: OwnedSemaphorePermit,
}

struct Shared {
    pending: DashMap<i32, PendingResponse>,
    permits: Arc<Semaphore>,
    config: InFlightConfig,
}

/// Tracks the requests of one client connection that are waiting for a
/// response.
///
/// At most `max_in_flight` requests are admitted at a time. A background task
/// fails requests older than `request_timeout` every `sweep_interval`; it
/// stops when the tracker is closed or dropped.
pub struct InFlightRequests {
    shared: Arc<Shared>,
    sweeper: AbortHandle,
}

impl InFlightRequests {
    /// Creates the tracker and starts its sweep task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new(config: InFlightConfig) -> Self {
        let shared = Arc::new(Shared {
            pending: DashMap::new(),
            permits: Arc::new(Semaphore::new(config.max_in_flight)),
            config,
        });

        let sweeper = spawn_sweeper(Arc::downgrade(&shared), config.sweep_interval);

        Self { shared, sweeper }
    }

    pub fn config(&self) -> &InFlightConfig {
        &self.shared.config
    }

    /// Admits `request_id` and returns the handle its response will arrive on.
    ///
    /// Waits up to `acquire_timeout` for a free slot and fails with
    /// `BackpressureTimeout` if none frees up. Fails with `DuplicateRequestId`
    /// if the id is still pending; the slot is returned in that case.
    pub async fn register(&self, request_id: i32) -> Result<ResponseHandle, RpcCallerError> {
        let shared = &self.shared;
        let waited = shared.config.acquire_timeout;

        let permit =
            match tokio::time::timeout(waited, shared.permits.clone().acquire_owned()).await {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => return Err(RpcCallerError::transport("in-flight tracker closed")),
                Err(_) => {
                    tracing::warn!(
                        request_id,
                        waited_ms = waited.as_millis() as u64,
                        "No in-flight slot available"
                    );
                    return Err(RpcCallerError::BackpressureTimeout { waited });
                }
            };

        let (sender, receiver) = oneshot::channel();

        match shared.pending.entry(request_id) {
            Entry::Occupied(_) => {
                tracing::error!(request_id, "Request id is already in flight");
                return Err(RpcCallerError::DuplicateRequestId(request_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingResponse {
                    sender,
                    created_at: Instant::now(),
                    _permit: permit,
                });
            }
        }

        // `close` may have drained the map between the acquire and the insert.
        if shared.permits.is_closed() {
            shared.pending.remove(&request_id);
            return Err(RpcCallerError::transport("in-flight tracker closed"));
        }

        tracing::trace!(request_id, "Registered in-flight request");

        Ok(ResponseHandle::new(request_id, receiver))
    }

    /// Completes `request_id` with `response`.
    ///
    /// Returns `false` if the id is not pending (already timed out, already
    /// answered, or never sent); the response is dropped in that case.
    pub fn resolve(&self, response: ResponseCommand) -> bool {
        let request_id = response.request_id();

        match self.shared.pending.remove(&request_id) {
            Some((_, entry)) => {
                let _ = entry.sender.send(Ok(response));
                true
            }
            None => {
                tracing::debug!(request_id, "Dropping response for unknown request");
                false
            }
        }
    }

    /// Completes `request_id` with `error`. Returns `false` if it is not pending.
    pub fn fail(&self, request_id: i32, error: RpcCallerError) -> bool {
        match self.shared.pending.remove(&request_id) {
            Some((_, entry)) => {
                let _ = entry.sender.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Fails every pending request with a clone of `error`.
    ///
    /// Used when the connection goes away. Returns how many were failed.
    pub fn fail_all(&self, error: RpcCallerError) -> usize {
        let ids: Vec<i32> = self.shared.pending.iter().map(|e| *e.key()).collect();

        let failed = ids
            .into_iter()
            .filter(|id| self.fail(*id, error.clone()))
            .count();

        if failed > 0 {
            tracing::warn!(failed, %error, "Failed all pending requests");
        }

        failed
    }

    /// Fails every request older than `request_timeout` with `Timeout`.
    ///
    /// Runs on every sweep tick; exposed so callers can force a sweep.
    pub fn remove_expired(&self) -> usize {
        self.shared.remove_expired()
    }

    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// In-flight slots currently free.
    pub fn available_permits(&self) -> usize {
        self.shared.permits.available_permits()
    }

    /// Stops the sweep task, rejects further registrations, and fails whatever
    /// is still pending.
    pub fn close(&self) {
        self.sweeper.abort();
        self.shared.permits.close();
        self.fail_all(RpcCallerError::transport("in-flight tracker closed"));
    }

    pub fn is_closed(&self) -> bool {
        self.shared.permits.is_closed()
    }
}

impl Drop for InFlightRequests {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

impl Shared {
    fn remove_expired(&self) -> usize {
        let timeout = self.config.request_timeout;

        // Collected first: removing while iterating would deadlock on the shard.
        let expired: Vec<i32> = self
            .pending
            .iter()
            .filter(|entry| entry.created_at.elapsed() > timeout)
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for request_id in expired {
            if let Some((_, entry)) = self
                .pending
                .remove_if(&request_id, |_, entry| entry.created_at.elapsed() > timeout)
            {
                let elapsed = entry.created_at.elapsed();
                tracing::warn!(
                    request_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request timed out"
                );
                let _ = entry.sender.send(Err(RpcCallerError::Timeout {
                    request_id,
                    elapsed,
                }));
                removed += 1;
            }
        }

        removed
    }
}

fn spawn_sweeper(shared: Weak<Shared>, period: std::time::Duration) -> AbortHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let Some(shared) = shared.upgrade() else {
                break;
            };

            let removed = shared.remove_expired();
            if removed > 0 {
                tracing::debug!(removed, "Swept timed-out requests");
            }
        }
    });

    task.abort_handle()
}
