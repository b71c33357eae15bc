//! Non-fatal diagnostics collected during an export
//!
//! A warning records an entity that could only be partially captured.
//! Warnings never abort an export; the caller receives them all at the end.

use std::sync::{Arc, Mutex, MutexGuard};

/// Ordered, append-only accumulator of warning messages
///
/// Cloning yields another handle to the same buffer, so one collector can be
/// injected into every generation stage. Appends are synchronized, which keeps
/// the collector correct even if stages run concurrently.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Arc<Mutex<Vec<String>>>,
}

impl WarningCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning
    ///
    /// Messages are kept in insertion order and never deduplicated.
    pub fn add(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.lock().push(message);
    }

    /// Snapshot of all warnings recorded so far
    pub fn warnings(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of warnings recorded so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no warning has been recorded
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every recorded warning, leaving the collector empty
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave a half-written Vec
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
