//! Resolution statistics tracking.
//!
//! This module provides thread-safe counters for provider failures and
//! successful resolutions during a run. Nothing here is persisted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, ProviderError};

/// Thread-safe resolution statistics tracker.
///
/// Tracks provider failures by category using atomic counters, allowing
/// concurrent access from multiple tasks. All categories are initialized to
/// zero on creation.
///
/// This struct can be shared across tasks using `Arc`.
pub struct ResolutionStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    resolved: AtomicUsize,
    exhausted: AtomicUsize,
    fallbacks: AtomicUsize,
}

impl ResolutionStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        ResolutionStats {
            errors,
            resolved: AtomicUsize::new(0),
            exhausted: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
        }
    }

    /// Records a failed provider attempt.
    pub fn record_failure(&self, error: &ProviderError) {
        let error_type = error.error_type();
        if let Some(counter) = self.errors.get(&error_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in ResolutionStats initialization.",
                error_type
            );
        }
    }

    /// Records a successful resolution. `used_fallback` is true when the
    /// primary provider failed.
    pub fn record_success(&self, used_fallback: bool) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
        if used_fallback {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a resolution in which every provider failed.
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the count for an error type.
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total failed provider attempts across all categories.
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Number of successful resolutions.
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }

    /// Number of successful resolutions that needed a fallback provider.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::SeqCst)
    }

    /// Number of resolutions where every provider failed.
    pub fn exhausted(&self) -> usize {
        self.exhausted.load(Ordering::SeqCst)
    }

    /// Logs a breakdown of the non-zero failure categories.
    pub fn log_summary(&self) {
        log::info!(
            "Resolved {} address(es), {} via fallback, {} exhausted all providers",
            self.resolved(),
            self.fallbacks(),
            self.exhausted()
        );
        for error_type in ErrorType::iter() {
            let count = self.get_error_count(error_type);
            if count > 0 {
                log::info!("   {}: {}", error_type, count);
            }
        }
    }
}

impl Default for ResolutionStats {
    fn default() -> Self {
        Self::new()
    }
}
