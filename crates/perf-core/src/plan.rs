//! Work partitioning for synchronous dispatch.
//!
//! Splits the total message load across workers: every worker gets `load / workers`
//! messages and the last one also takes the remainder.

use crate::error::ConfigError;

/// Per-worker message counts for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    chunks: Vec<u64>,
}

impl DispatchPlan {
    /// Partition `load` messages over `workers` senders.
    ///
    /// Requires `1 <= workers <= load`.
    pub fn new(load: u64, workers: usize) -> Result<Self, ConfigError> {
        let workers_u64 = u64::try_from(workers).unwrap_or(u64::MAX);
        if workers == 0 || workers_u64 > load {
            return Err(ConfigError::invalid(
                "routines",
                "must be greater than 0 and less than or equal to message-load",
            ));
        }

        let base = load / workers_u64;
        let remainder = load % workers_u64;
        let mut chunks = vec![base; workers];
        if let Some(last) = chunks.last_mut() {
            *last += remainder;
        }

        Ok(Self { chunks })
    }

    pub fn chunks(&self) -> &[u64] {
        &self.chunks
    }

    pub fn workers(&self) -> usize {
        self.chunks.len()
    }

    pub fn total(&self) -> u64 {
        self.chunks.iter().sum()
    }

    /// Describe the plan for logging.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, n)| format!("worker-{}={}", i + 1, n))
            .collect();
        parts.join(", ")
    }
}
