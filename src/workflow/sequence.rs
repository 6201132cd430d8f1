use std::sync::atomic::{AtomicI64, Ordering};

/// Strictly increasing sequence numbers for planboard documents and analysis
/// runs. Seeded from the wall clock so ordering survives a restart.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicI64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self { next: AtomicI64::new(chrono::Utc::now().timestamp_millis()) }
    }

    pub fn next(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}
