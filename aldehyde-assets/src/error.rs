use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems found while decoding a stored line.
///
/// None of these escape `AssetStore::load`: malformed lines are skipped and
/// unparseable dates degrade to "no date". They are surfaced in the load report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed record: expected 7 fields (8 with id), found {found}")]
    MalformedRecord { found: usize },

    #[error("malformed record: invalid asset id {0:?}")]
    InvalidId(String),

    #[error("unparseable {field} {text:?}: {source}")]
    UnparseableDate {
        field: &'static str,
        text: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file could not be read at load time, so the store refuses to replace it.
    #[error("{} could not be read when loaded; refusing to overwrite it", path.display())]
    ReadOnly { path: PathBuf },

    #[error("nothing selected")]
    SelectionRequired,
}

impl StoreError {
    /// True when reading or writing the durable file failed. After a failed
    /// write the in-memory change is kept and `save` can be retried.
    pub fn is_storage(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable { .. })
    }
}
