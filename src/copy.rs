//! Point-in-time snapshot of another dataset.
//!
//! [`CopyDataset::new`] drains a source dataset into a private
//! [`SnapshotStore`] and from then on serves every request from that store,
//! so later changes to the source are never observed. Releasing the copy
//! removes the store.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::{info, warn};

use crate::{
    csv_source::CsvDataset,
    dataset::{Connection, Dataset},
    error::{DatasetError, Result},
    store::{SnapshotStore, SnapshotWriter},
};

#[derive(Debug)]
pub struct CopyDataset {
    inner: CsvDataset,
    store: Mutex<Option<SnapshotStore>>,
}

impl CopyDataset {
    /// Materializes `source` as it is now. On failure nothing is left on
    /// disk and the error is returned as-is.
    pub fn new<D: Dataset + ?Sized>(source: &D) -> Result<Self> {
        Self::build(source, SnapshotWriter::create()?)
    }

    /// Like [`CopyDataset::new`], placing the store under `parent`.
    pub fn new_in<D: Dataset + ?Sized>(source: &D, parent: impl AsRef<Path>) -> Result<Self> {
        Self::build(source, SnapshotWriter::create_in(parent)?)
    }

    fn build<D: Dataset + ?Sized>(source: &D, mut writer: SnapshotWriter) -> Result<Self> {
        let fields = source.fields();
        let mut conn = source.open()?;
        let drained = drain(conn.as_mut(), &fields, &mut writer);
        if let Err(err) = conn.close() {
            warn!("Closing source connection after snapshot failed: {err}");
        }
        drained?;
        let store = writer.finish()?;
        info!(
            "Snapshot of {} record(s) across {} field(s) written to {:?}",
            store.rows(),
            fields.len(),
            store.path()
        );
        Ok(Self {
            inner: store.dataset(fields),
            store: Mutex::new(Some(store)),
        })
    }

    /// Location of the private store, or `None` once released.
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|store| store.path().to_path_buf())
    }
}

fn drain(conn: &mut dyn Connection, fields: &[String], writer: &mut SnapshotWriter) -> Result<()> {
    while conn.next() {
        let cells = conn.read().project(fields)?;
        writer.append(&cells)?;
    }
    match conn.err() {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

impl Dataset for CopyDataset {
    fn fields(&self) -> Vec<String> {
        self.inner.fields()
    }

    fn num_records(&self) -> Option<u64> {
        self.inner.num_records()
    }

    fn open(&self) -> Result<Box<dyn Connection>> {
        self.inner.open()
    }

    fn release(&self) -> Result<()> {
        let store = self
            .store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or(DatasetError::Released)?;
        // Outstanding connections on the copy fail on their next advance.
        let _ = self.inner.release();
        let path = store.path().to_path_buf();
        store.remove()?;
        info!("Released snapshot {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory dataset whose rows can change after a copy is taken.
    struct VecDataset {
        fields: Vec<String>,
        rows: Mutex<Vec<Record>>,
        fail_after: Option<usize>,
        released: AtomicBool,
    }

    struct VecConnection {
        rows: Vec<Record>,
        pos: usize,
        fail_after: Option<usize>,
        current: Record,
        err: Option<DatasetError>,
    }

    impl Dataset for VecDataset {
        fn fields(&self) -> Vec<String> {
            self.fields.clone()
        }

        fn num_records(&self) -> Option<u64> {
            Some(self.rows.lock().unwrap().len() as u64)
        }

        fn open(&self) -> Result<Box<dyn Connection>> {
            Ok(Box::new(VecConnection {
                rows: self.rows.lock().unwrap().clone(),
                pos: 0,
                fail_after: self.fail_after,
                current: Record::new(),
                err: None,
            }))
        }

        fn release(&self) -> Result<()> {
            if self.released.swap(true, Ordering::SeqCst) {
                return Err(DatasetError::Released);
            }
            Ok(())
        }
    }

    impl Connection for VecConnection {
        fn next(&mut self) -> bool {
            if self.err.is_some() {
                return false;
            }
            if self.fail_after == Some(self.pos) {
                self.err = Some(DatasetError::ConnectionClosed);
                return false;
            }
            match self.rows.get(self.pos) {
                Some(record) => {
                    self.current = record.clone();
                    self.pos += 1;
                    true
                }
                None => false,
            }
        }

        fn read(&self) -> &Record {
            &self.current
        }

        fn err(&self) -> Option<&DatasetError> {
            self.err.as_ref()
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn vec_dataset(fail_after: Option<usize>) -> VecDataset {
        let rows = (0..3)
            .map(|i| {
                [("id", i.to_string()), ("name", format!("n{i}"))]
                    .into_iter()
                    .collect::<Record>()
            })
            .collect();
        VecDataset {
            fields: vec!["id".into(), "name".into()],
            rows: Mutex::new(rows),
            fail_after,
            released: AtomicBool::new(false),
        }
    }

    #[test]
    fn copy_is_isolated_from_source_changes() {
        let source = vec_dataset(None);
        let copy = CopyDataset::new(&source).unwrap();
        source.rows.lock().unwrap().clear();

        assert_eq!(source.num_records(), Some(0));
        assert_eq!(copy.num_records(), Some(3));
        assert_eq!(copy.fields(), vec!["id", "name"]);
        copy.release().unwrap();
    }

    #[test]
    fn failed_drain_leaves_no_store_behind() {
        let parent = tempfile::tempdir().unwrap();
        let source = vec_dataset(Some(2));
        let err = CopyDataset::new_in(&source, parent.path()).unwrap_err();
        assert!(matches!(err, DatasetError::ConnectionClosed));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn store_lives_under_requested_parent() {
        let parent = tempfile::tempdir().unwrap();
        let copy = CopyDataset::new_in(&vec_dataset(None), parent.path()).unwrap();
        assert!(copy.store_path().unwrap().starts_with(parent.path()));
        copy.release().unwrap();
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn release_removes_store_once() {
        let copy = CopyDataset::new(&vec_dataset(None)).unwrap();
        let path = copy.store_path().unwrap();
        assert!(path.exists());
        copy.release().unwrap();
        assert!(!path.exists());
        assert!(copy.store_path().is_none());
        assert!(matches!(copy.release(), Err(DatasetError::Released)));
        assert!(copy.fields().is_empty());
        assert_eq!(copy.num_records(), None);
        assert!(matches!(copy.open(), Err(DatasetError::Released)));
    }
}
