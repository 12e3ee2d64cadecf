//! Category record sources: the backend listing endpoint and saved snapshots.
//!
//! Both paths funnel through [`parse_records`], so callers always receive
//! normalized [`CategoryRecord`]s.

mod client;
mod normalize;
mod snapshot;

use std::fmt;
use std::path::PathBuf;

use crate::catalog::CategoryRecord;

pub use client::{CategoryClient, SourceError, SourceOptions, MAX_RESPONSE_SIZE};
pub use normalize::{normalize_record, parse_envelope, parse_records, EnvelopeError};
pub use snapshot::load_snapshot;

/// Where the browser reloads its snapshot from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Api(CategoryClient),
    File(PathBuf),
}

impl RecordSource {
    pub async fn load(&self) -> Result<Vec<CategoryRecord>, SourceError> {
        match self {
            RecordSource::Api(client) => client.fetch_records().await,
            RecordSource::File(path) => load_snapshot(path).await,
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Api(client) => f.write_str(client.endpoint()),
            RecordSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
