use std::sync::atomic::{AtomicU64, Ordering};

/// Mints correlation ids of the form `<prefix><n>`.
///
/// A single counter is shared by every prefix, so two calls never return the
/// same string even when the prefixes differ.
#[derive(Debug, Default)]
pub struct UniqueIdProvider {
    counter: AtomicU64,
}

impl UniqueIdProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self, prefix: &str) -> String {
        let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}{next}")
    }
}
