//! The two capability sets every backing implementation and decorator
//! provides.
//!
//! A [`Dataset`] is a reusable, field-named source of rows. Each call to
//! [`Dataset::open`] hands out an independent [`Connection`] driven with
//! the advance-then-read protocol:
//!
//! ```no_run
//! # use csv_dataset::{Connection, CsvDataset, Dataset};
//! # fn demo() -> csv_dataset::Result<()> {
//! let ds = CsvDataset::new("bank.csv", true, b';', vec!["age".into(), "job".into()]);
//! let mut conn = ds.open()?;
//! while conn.next() {
//!     let record = conn.read();
//!     println!("{record}");
//! }
//! if let Some(err) = conn.err() {
//!     eprintln!("stopped early: {err}");
//! }
//! conn.close()?;
//! ds.release()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::{
    error::{DatasetError, Result},
    record::Record,
};

pub trait Dataset: Send + Sync {
    /// Declared field names in order. Empty once released.
    fn fields(&self) -> Vec<String>;

    /// Number of records, scanning the source if it is not cheaply known.
    ///
    /// `None` when the count is unknown: the scan hit an error, or the
    /// dataset was released.
    fn num_records(&self) -> Option<u64>;

    fn open(&self) -> Result<Box<dyn Connection>>;

    /// Releases every resource held by the dataset. A second call fails
    /// with [`DatasetError::Released`].
    fn release(&self) -> Result<()>;
}

pub trait Connection: Send {
    /// Advances to the next record. `false` means stop; check
    /// [`Connection::err`] to tell exhaustion from failure.
    fn next(&mut self) -> bool;

    /// The current record. Only meaningful after `next` returned `true`,
    /// and invalidated by the following `next`.
    fn read(&self) -> &Record;

    /// The latched error, if any. Once set it never changes.
    fn err(&self) -> Option<&DatasetError>;

    fn close(&mut self) -> Result<()>;
}

impl<D: Dataset + ?Sized> Dataset for Box<D> {
    fn fields(&self) -> Vec<String> {
        (**self).fields()
    }

    fn num_records(&self) -> Option<u64> {
        (**self).num_records()
    }

    fn open(&self) -> Result<Box<dyn Connection>> {
        (**self).open()
    }

    fn release(&self) -> Result<()> {
        (**self).release()
    }
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    fn fields(&self) -> Vec<String> {
        (**self).fields()
    }

    fn num_records(&self) -> Option<u64> {
        (**self).num_records()
    }

    fn open(&self) -> Result<Box<dyn Connection>> {
        (**self).open()
    }

    fn release(&self) -> Result<()> {
        (**self).release()
    }
}

/// Counts records with a full open/drain/close cycle.
///
/// Errors are swallowed into `None`; callers that need the cause must
/// drive a connection themselves.
pub fn count_records<D: Dataset + ?Sized>(dataset: &D) -> Option<u64> {
    let mut conn = dataset.open().ok()?;
    let mut count = 0u64;
    while conn.next() {
        count += 1;
    }
    let failed = conn.err().is_some();
    let _ = conn.close();
    if failed { None } else { Some(count) }
}

/// Reads up to `limit` records, cloning each so it outlives the next
/// advance. Returns the latched error if the connection stopped on one.
pub fn collect_records(conn: &mut dyn Connection, limit: Option<usize>) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    while limit.is_none_or(|max| records.len() < max) && conn.next() {
        records.push(conn.read().clone());
    }
    match conn.err() {
        Some(err) => Err(err.clone()),
        None => Ok(records),
    }
}
