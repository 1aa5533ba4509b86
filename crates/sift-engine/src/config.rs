//! Engine configuration

use sift_analysis::{DEFAULT_CHUNK_SIZE, DEFAULT_MIN_STRING_LENGTH};

/// Default bound on nested member re-scans.
pub const DEFAULT_MAX_RESCAN_DEPTH: usize = 16;

/// Tunable knobs for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Chunk size for per-chunk entropy, in bytes
    pub chunk_size: usize,
    /// Minimum printable-run length for string extraction
    pub min_string_length: usize,
    /// Maximum nesting depth for member re-scans
    pub max_rescan_depth: usize,
    /// Event channel capacity per pipeline run
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_string_length: DEFAULT_MIN_STRING_LENGTH,
            max_rescan_depth: DEFAULT_MAX_RESCAN_DEPTH,
            event_capacity: 64,
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entropy chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the minimum extracted-string length.
    #[must_use]
    pub fn with_min_string_length(mut self, min_string_length: usize) -> Self {
        self.min_string_length = min_string_length;
        self
    }

    /// Set the member re-scan depth bound.
    #[must_use]
    pub fn with_max_rescan_depth(mut self, max_rescan_depth: usize) -> Self {
        self.max_rescan_depth = max_rescan_depth;
        self
    }

    /// Set the per-run event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }
}
