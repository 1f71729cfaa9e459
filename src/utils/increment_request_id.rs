use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-wide counter which is initialized at 0.
static GLOBAL_REQUEST_ID_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(0));

/// Returns the next request id.
///
/// Ids come from a single monotonically increasing counter shared by every
/// caller in the process, truncated to the 32-bit wire field. After 2^32
/// requests the truncated value wraps around; a wrapped id only collides if the
/// request that first used it is still in flight, which the in-flight tracker
/// detects and rejects instead of mixing up the two responses.
#[inline]
pub fn next_request_id() -> i32 {
    GLOBAL_REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed) as u32 as i32
}
