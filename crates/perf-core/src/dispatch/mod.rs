//! Dispatch orchestration: moves generated messages through the producer client.
//!
//! Both modes fail fast. The first delivery error ends the dispatch and is returned to
//! the caller; nothing is retried.

mod async_mode;
mod sync_mode;

pub use async_mode::run_async;
pub use sync_mode::run_sync;

use crate::client::ProducerClient;
use crate::config::{DispatchMode, RunConfig};
use crate::error::PerfError;
use crate::generator::MessageGenerator;
use std::sync::Arc;

/// Message counts of a completed dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Messages produced by the generator(s)
    pub generated: u64,
    /// Messages handed to the producer client
    pub sent: u64,
}

impl DispatchOutcome {
    fn merge(&mut self, other: DispatchOutcome) {
        self.generated += other.generated;
        self.sent += other.sent;
    }
}

/// Run the dispatch mode selected by `config` to completion.
pub async fn dispatch(
    config: &RunConfig,
    generator: Arc<dyn MessageGenerator>,
    client: Arc<dyn ProducerClient>,
) -> Result<DispatchOutcome, PerfError> {
    match config.mode {
        DispatchMode::Async => run_async(config, generator.as_ref(), client.as_ref()).await,
        DispatchMode::Sync => run_sync(config, generator, client).await,
    }
}
