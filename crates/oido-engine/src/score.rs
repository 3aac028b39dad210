//! Score persistence collaborator.
//!
//! The engine reports raw measured values and, via
//! [`ScoreBand`](oido_core::ScoreBand), their 0-100 normalization. Storing
//! them is someone else's job: a key-value collaborator keyed by test id.
//! [`MemoryScoreStore`] exists for tests and the CLI; real deployments
//! supply their own backend.

use std::collections::HashMap;

/// Key-value persistence for final test scores.
pub trait ScoreStore {
    /// Record the raw measured value for a test.
    fn put(&mut self, test_id: &str, raw_value: f64);

    /// The most recently recorded value for a test, if any.
    fn get(&self, test_id: &str) -> Option<f64>;
}

/// In-memory score store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    values: HashMap<String, f64>,
}

impl MemoryScoreStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn put(&mut self, test_id: &str, raw_value: f64) {
        self.values.insert(test_id.to_string(), raw_value);
    }

    fn get(&self, test_id: &str) -> Option<f64> {
        self.values.get(test_id).copied()
    }
}
