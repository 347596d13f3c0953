//! Error taxonomy shared by every dataset and connection.
//!
//! Construction-time failures (`open`, building a copy) are returned
//! directly. Failures met while iterating are latched onto the connection
//! and only surface through [`Connection::err`](crate::dataset::Connection::err).

use std::{io, sync::Arc};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Lower-level sources sit behind `Arc` so a latched error can be cloned.
#[derive(Debug, Clone, Error)]
pub enum DatasetError {
    /// The dataset (or the dataset owning a connection) was released.
    #[error("dataset has been released")]
    Released,

    #[error("connection has been closed")]
    ConnectionClosed,

    /// A data row's cell count differs from the declared field list.
    #[error("wrong number of fields in row {row}: expected {expected}, found {found}")]
    WrongFieldCount {
        row: u64,
        expected: usize,
        found: usize,
    },

    /// Lower-level read or parse failure from the row source.
    #[error("failed to read row {row}: {source}")]
    RowSource {
        row: u64,
        #[source]
        source: Arc<csv::Error>,
    },

    /// Failure to open, create, write or remove a backing resource.
    #[error("{context}: {source}")]
    ResourceAcquisition {
        context: String,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("row {row} field '{field}' is not valid {encoding}")]
    InvalidEncoding {
        row: u64,
        field: String,
        encoding: &'static str,
    },

    #[error("record is missing field '{field}'")]
    MissingField { field: String },
}

impl DatasetError {
    pub(crate) fn resource(context: impl Into<String>, source: io::Error) -> Self {
        DatasetError::ResourceAcquisition {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn row_source(row: u64, source: csv::Error) -> Self {
        DatasetError::RowSource {
            row,
            source: Arc::new(source),
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self, DatasetError::Released)
    }
}
