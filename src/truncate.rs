//! Bounded view over another dataset.
//!
//! [`TruncateDataset`] owns an inner dataset and caps every connection at
//! `limit` records. No data is copied; once a connection has yielded
//! `limit` records the inner connection is not advanced again.

use crate::{
    dataset::{Connection, Dataset},
    error::{DatasetError, Result},
    record::Record,
};

#[derive(Debug)]
pub struct TruncateDataset<D> {
    inner: D,
    limit: u64,
}

impl<D: Dataset> TruncateDataset<D> {
    pub fn new(inner: D, limit: u64) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Dataset> Dataset for TruncateDataset<D> {
    fn fields(&self) -> Vec<String> {
        self.inner.fields()
    }

    /// An unknown inner count stays unknown: it may stand for a failed scan.
    fn num_records(&self) -> Option<u64> {
        self.inner.num_records().map(|n| n.min(self.limit))
    }

    fn open(&self) -> Result<Box<dyn Connection>> {
        let inner = self.inner.open()?;
        Ok(Box::new(TruncateConnection {
            inner,
            limit: self.limit,
            yielded: 0,
        }))
    }

    fn release(&self) -> Result<()> {
        self.inner.release()
    }
}

pub struct TruncateConnection {
    inner: Box<dyn Connection>,
    limit: u64,
    yielded: u64,
}

impl Connection for TruncateConnection {
    fn next(&mut self) -> bool {
        if self.yielded >= self.limit {
            return false;
        }
        if self.inner.next() {
            self.yielded += 1;
            true
        } else {
            false
        }
    }

    fn read(&self) -> &Record {
        self.inner.read()
    }

    fn err(&self) -> Option<&DatasetError> {
        self.inner.err()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
