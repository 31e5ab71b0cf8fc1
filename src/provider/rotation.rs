//! Round-robin primary selection and randomized fallback ordering.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Provider, ProviderRegistry};

/// Rotation cursor over a [`ProviderRegistry`].
///
/// Each resolver owns one selector, so every execution context starts at the
/// first provider and advances independently. The cursor moves by one (modulo
/// the registry length) on every call to [`next`](Self::next), whatever the
/// outcome of the attempt.
///
/// Not synchronized; callers sharing a selector must serialize access.
#[derive(Debug)]
pub struct RotationSelector {
    registry: Arc<ProviderRegistry>,
    cursor: usize,
    rng: StdRng,
}

impl RotationSelector {
    /// Creates a selector at cursor 0 with an OS-seeded fallback shuffle.
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self::with_rng(registry, StdRng::from_os_rng())
    }

    /// Creates a selector whose fallback order is reproducible from `seed`.
    pub fn seeded(registry: Arc<ProviderRegistry>, seed: u64) -> Self {
        Self::with_rng(registry, StdRng::seed_from_u64(seed))
    }

    /// Creates a selector drawing fallback order from `rng`.
    pub fn with_rng(registry: Arc<ProviderRegistry>, rng: StdRng) -> Self {
        RotationSelector {
            registry,
            cursor: 0,
            rng,
        }
    }

    /// Returns the provider at the cursor and advances the cursor.
    ///
    /// Returns `None` only for an empty registry.
    pub fn next(&mut self) -> Option<Arc<dyn Provider>> {
        let len = self.registry.len();
        if len == 0 {
            return None;
        }
        let provider = self.registry.get(self.cursor % len).cloned();
        self.cursor = (self.cursor + 1) % len;
        provider
    }

    /// Advances the cursor without returning a provider.
    pub fn skip(&mut self) {
        let len = self.registry.len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    /// The registry this selector rotates over.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Every provider except `name`, in random order.
    pub fn shuffled_except(&mut self, name: &str) -> Vec<Arc<dyn Provider>> {
        let mut remaining: Vec<Arc<dyn Provider>> = self
            .registry
            .iter()
            .filter(|p| p.name() != name)
            .cloned()
            .collect();
        remaining.shuffle(&mut self.rng);
        remaining
    }
}
