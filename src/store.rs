//! Private on-disk store backing a [`CopyDataset`](crate::copy::CopyDataset).
//!
//! A store is a fresh temporary directory holding one comma-delimited file
//! with no header row. [`SnapshotWriter`] appends rows; [`SnapshotWriter::finish`]
//! flushes and yields a [`SnapshotStore`] that can be read back as a
//! [`CsvDataset`] and removed as a unit. Dropping either value before it is
//! finished or removed deletes the directory.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::TempDir;

use crate::{
    csv_source::CsvDataset,
    error::{DatasetError, Result},
    io_utils,
};

const STORE_PREFIX: &str = "csv-dataset-copy";
const STORE_FILE: &str = "copy.csv";
const STORE_DELIMITER: u8 = b',';

pub struct SnapshotWriter {
    dir: TempDir,
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
    rows: u64,
}

impl SnapshotWriter {
    /// Creates a store under the system temporary directory.
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    pub fn create_in(parent: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STORE_PREFIX)
            .tempdir_in(parent)
            .map_err(|err| DatasetError::resource("Creating snapshot directory", err))?;
        let path = dir.path().join(STORE_FILE);
        let writer = io_utils::create_csv_writer(&path, STORE_DELIMITER)?;
        debug!("Created snapshot store {:?}", path);
        Ok(Self {
            dir,
            path,
            writer,
            rows: 0,
        })
    }

    pub fn append<I, T>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(cells).map_err(|err| {
            DatasetError::resource(
                format!("Writing row {} to snapshot {:?}", self.rows + 1, self.path),
                err.into(),
            )
        })?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn finish(mut self) -> Result<SnapshotStore> {
        self.writer.flush().map_err(|err| {
            DatasetError::resource(format!("Flushing snapshot {:?}", self.path), err)
        })?;
        drop(self.writer);
        Ok(SnapshotStore {
            dir: self.dir,
            path: self.path,
            rows: self.rows,
        })
    }
}

#[derive(Debug)]
pub struct SnapshotStore {
    dir: TempDir,
    path: PathBuf,
    rows: u64,
}

impl SnapshotStore {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn dataset(&self, fields: Vec<String>) -> CsvDataset {
        CsvDataset::new(&self.path, false, STORE_DELIMITER, fields)
    }

    pub fn remove(self) -> Result<()> {
        let dir = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|err| DatasetError::resource(format!("Removing snapshot {dir:?}"), err))?;
        debug!("Removed snapshot store {:?}", dir);
        Ok(())
    }
}
