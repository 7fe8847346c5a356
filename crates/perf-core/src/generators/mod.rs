//! Generator implementations.
//!
//! - `random` - fixed-size payloads from the OS random source
//! - `file` - payloads cycled from a decoded message file

pub mod file;
pub mod random;

pub use file::FileMessageGenerator;
pub use random::RandomMessageGenerator;

use crate::config::{PayloadSource, RunConfig};
use crate::error::PerfError;
use crate::generator::MessageGenerator;
use std::sync::Arc;

/// Build the generator selected by the run configuration.
///
/// For file payloads this loads and decodes the whole record pool up front.
pub fn build_generator(config: &RunConfig) -> Result<Arc<dyn MessageGenerator>, PerfError> {
    match &config.payload {
        PayloadSource::Random { size } => Ok(Arc::new(RandomMessageGenerator::new(*size))),
        PayloadSource::File { path, scheme } => {
            Ok(Arc::new(FileMessageGenerator::load(path, *scheme)?))
        }
    }
}
