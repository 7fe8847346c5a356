//! Messages drawn cyclically from a pre-decoded message file.

use crate::decoder::DecoderScheme;
use crate::error::{ConfigError, GeneratorError, PerfError};
use crate::generator::{MessageGenerator, MessageStream};
use crate::message::GenerationJob;
use bytes::Bytes;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Generator backed by a record pool loaded once from a file, one payload per line.
///
/// Message `i` carries `records[i % records.len()]`. The pool is read-only after
/// loading and shared between all streams created from this generator.
#[derive(Debug, Clone)]
pub struct FileMessageGenerator {
    path: PathBuf,
    records: Arc<[Bytes]>,
}

impl FileMessageGenerator {
    /// Read and decode every non-empty line of `path`.
    ///
    /// Fails before anything is generated if the file cannot be read, a line does not
    /// decode, or no non-empty line exists.
    pub fn load(path: impl AsRef<Path>, scheme: DecoderScheme) -> Result<Self, PerfError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| ConfigError::OpenMessageFile {
            path: path.clone(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file), scheme)
    }

    fn from_reader<R: BufRead>(
        path: PathBuf,
        reader: R,
        scheme: DecoderScheme,
    ) -> Result<Self, PerfError> {
        let mut records = Vec::with_capacity(64);
        for (index, line) in reader.split(b'\n').enumerate() {
            let mut line = line.map_err(|source| ConfigError::ReadMessageFile {
                path: path.clone(),
                source,
            })?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            let payload = scheme
                .decode(&line)
                .map_err(|source| GeneratorError::Decode {
                    line: index + 1,
                    source,
                })?;
            records.push(Bytes::from(payload));
        }

        if records.is_empty() {
            return Err(ConfigError::EmptyRecordPool(path).into());
        }

        Ok(Self {
            path,
            records: records.into(),
        })
    }

    pub fn records(&self) -> &[Bytes] {
        &self.records
    }
}

impl MessageGenerator for FileMessageGenerator {
    fn generate(&self, job: GenerationJob) -> MessageStream {
        let records = Arc::clone(&self.records);
        let path = self.path.display().to_string();
        MessageStream::spawn(job.count, move |tx| async move {
            info!(
                "FileMessageGenerator is generating {} messages from {} records of {}",
                job.count,
                records.len(),
                path
            );
            let mut emitted = 0u64;
            for (_, payload) in (0..job.count).zip(records.iter().cycle()) {
                if tx.send(job.message(payload.clone())).await.is_err() {
                    break;
                }
                emitted += 1;
            }
            Ok::<_, GeneratorError>(emitted)
        })
    }
}
