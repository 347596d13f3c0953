//! Delimited-file dataset.
//!
//! [`CsvDataset`] reads a file against a fixed, caller-supplied field list.
//! Every [`Dataset::open`] acquires its own file handle, so connections
//! never share a read position and may be driven from different threads.
//! Rows whose cell count differs from the declared list, undecodable cells
//! and reader failures are latched onto the connection that met them.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    dataset::{Connection, Dataset, count_records},
    error::{DatasetError, Result},
    io_utils,
    literal::Literal,
    record::Record,
};

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    /// First row is a header; it is skipped at open and never validated.
    pub has_header: bool,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug)]
struct Source {
    path: PathBuf,
    options: CsvOptions,
    fields: Vec<String>,
    released: AtomicBool,
}

#[derive(Debug)]
pub struct CsvDataset {
    source: Arc<Source>,
}

impl CsvDataset {
    pub fn new(
        path: impl Into<PathBuf>,
        has_header: bool,
        delimiter: u8,
        fields: Vec<String>,
    ) -> Self {
        let options = CsvOptions {
            has_header,
            delimiter,
            ..CsvOptions::default()
        };
        Self::with_options(path, options, fields)
    }

    pub fn with_options(
        path: impl Into<PathBuf>,
        options: CsvOptions,
        fields: Vec<String>,
    ) -> Self {
        Self {
            source: Arc::new(Source {
                path: path.into(),
                options,
                fields,
                released: AtomicBool::new(false),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.source.path
    }

    pub fn options(&self) -> &CsvOptions {
        &self.source.options
    }

    fn is_released(&self) -> bool {
        self.source.released.load(Ordering::Acquire)
    }
}

impl Dataset for CsvDataset {
    fn fields(&self) -> Vec<String> {
        if self.is_released() {
            return Vec::new();
        }
        self.source.fields.clone()
    }

    fn num_records(&self) -> Option<u64> {
        count_records(self)
    }

    fn open(&self) -> Result<Box<dyn Connection>> {
        if self.is_released() {
            return Err(DatasetError::Released);
        }
        let source = &self.source;
        let mut reader =
            io_utils::open_csv_reader_from_path(&source.path, source.options.delimiter)?;
        if source.options.has_header {
            let mut header = csv::ByteRecord::new();
            // An empty file has no header to skip and yields no rows.
            reader
                .read_byte_record(&mut header)
                .map_err(|err| DatasetError::row_source(0, err))?;
            debug!("Skipped header row of {:?}", source.path);
        }
        debug!(
            "Opened {:?} with delimiter '{}'",
            source.path,
            io_utils::printable_delimiter(source.options.delimiter)
        );
        Ok(Box::new(CsvConnection {
            source: Arc::clone(source),
            reader: Some(reader),
            raw: csv::ByteRecord::new(),
            current: Record::new(),
            row: 0,
            err: None,
        }))
    }

    fn release(&self) -> Result<()> {
        if self.source.released.swap(true, Ordering::AcqRel) {
            return Err(DatasetError::Released);
        }
        debug!("Released dataset {:?}", self.source.path);
        Ok(())
    }
}

pub struct CsvConnection {
    source: Arc<Source>,
    reader: Option<csv::Reader<BufReader<File>>>,
    raw: csv::ByteRecord,
    current: Record,
    /// 1-based index of the last data row read.
    row: u64,
    err: Option<DatasetError>,
}

impl CsvConnection {
    fn fail(&mut self, err: DatasetError) -> bool {
        debug!("Connection on {:?} stopped: {err}", self.source.path);
        self.reader = None;
        self.err = Some(err);
        false
    }

    fn fill_current(&mut self) -> Result<()> {
        let fields = &self.source.fields;
        if self.raw.len() != fields.len() {
            return Err(DatasetError::WrongFieldCount {
                row: self.row,
                expected: fields.len(),
                found: self.raw.len(),
            });
        }
        let encoding = self.source.options.encoding;
        self.current.clear();
        for (field, bytes) in fields.iter().zip(self.raw.iter()) {
            let text = io_utils::decode_bytes(bytes, encoding).ok_or_else(|| {
                DatasetError::InvalidEncoding {
                    row: self.row,
                    field: field.clone(),
                    encoding: encoding.name(),
                }
            })?;
            self.current.insert(field.as_str(), Literal::new(text));
        }
        Ok(())
    }
}

impl Connection for CsvConnection {
    fn next(&mut self) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self.source.released.load(Ordering::Acquire) {
            return self.fail(DatasetError::Released);
        }
        let Some(reader) = self.reader.as_mut() else {
            self.err = Some(DatasetError::ConnectionClosed);
            return false;
        };
        match reader.read_byte_record(&mut self.raw) {
            Ok(false) => false,
            Ok(true) => {
                self.row += 1;
                match self.fill_current() {
                    Ok(()) => true,
                    Err(err) => self.fail(err),
                }
            }
            Err(err) => {
                let row = self.row + 1;
                self.fail(DatasetError::row_source(row, err))
            }
        }
    }

    fn read(&self) -> &Record {
        &self.current
    }

    fn err(&self) -> Option<&DatasetError> {
        self.err.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            debug!(
                "Closed connection on {:?} after {} row(s)",
                self.source.path, self.row
            );
        }
        Ok(())
    }
}
