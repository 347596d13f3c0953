#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_dataset::{Connection, CsvDataset, Dataset, Record, collect_records};
use tempfile::{TempDir, tempdir};

pub const BANK_FIELDS: &[&str] = &["age", "job", "marital", "balance", "y"];

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a `;`-delimited bank file with a header and `rows` data rows.
    pub fn write_bank(&self, name: &str, rows: usize) -> PathBuf {
        let mut contents = String::from("age;job;marital;balance;y\n");
        for i in 0..rows {
            let job = ["admin", "technician", "services"][i % 3];
            contents.push_str(&format!("{};{job};married;{}.{};no\n", 20 + i, i * 100, i % 10));
        }
        self.write(name, &contents)
    }
}

pub fn field_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn bank_dataset(path: &Path) -> CsvDataset {
    CsvDataset::new(path, true, b';', field_names(BANK_FIELDS))
}

/// Opens a connection and drains it, panicking on a latched error.
pub fn drain<D: Dataset + ?Sized>(dataset: &D) -> Vec<Record> {
    let mut conn = dataset.open().expect("open connection");
    let records = collect_records(conn.as_mut(), None).expect("drain connection");
    conn.close().expect("close connection");
    records
}

pub fn count_advances(conn: &mut dyn Connection) -> usize {
    let mut n = 0;
    while conn.next() {
        n += 1;
    }
    n
}
