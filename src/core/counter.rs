//! Process-wide request counter shared by the HTTP handlers.
//!
//! A single `Mutex<u64>` guards the value. Increments and reads are mutually
//! exclusive, and the lock is only held for the duration of the update or
//! the read, never across response I/O.

use std::sync::Mutex;

/// Monotonic hit counter. Starts at 0, never reset, never persisted.
///
/// Shared between handlers via `Arc<AppState>`:
/// ```ignore
/// state.counter.increment();
/// let n = state.counter.read();
/// ```
#[derive(Debug, Default)]
pub struct RequestCounter {
    count: Mutex<u64>,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hit.
    pub fn increment(&self) {
        // Poisoning can't leave the integer half-written, so recover it
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
    }

    /// Current number of completed increments.
    pub fn read(&self) -> u64 {
        *self.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}
