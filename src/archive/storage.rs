//! Flat comma-delimited tables backing the archive.
//!
//! Each table is a UTF-8 text file: one header row, then one record per line.
//! There is no quoting; commas inside free-text fields are replaced with a
//! space on write, so the transform is lossy.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A record that can be stored as one table row
pub trait TableRow: Sized {
    /// Header line written at the top of the table
    const HEADER: &'static str;
    /// Rows with fewer fields are skipped on load
    const MIN_FIELDS: usize;

    fn to_row(&self) -> String;

    /// Decode a row already split on commas; `fields.len() >= MIN_FIELDS`
    fn from_fields(fields: &[&str]) -> Result<Self, RowError>;
}

#[derive(Error, Debug)]
pub enum RowError {
    #[error("invalid record id {0:?}")]
    InvalidId(String),
}

#[derive(Error, Debug)]
enum LoadError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {source}")]
    Row { line: usize, source: RowError },
}

/// Replace the column separator so a value cannot split its row
pub fn escape_field(value: &str) -> String {
    value.replace(',', " ")
}

/// One table file on disk
#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
}

impl TableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with only a header row if it does not exist yet
    pub fn ensure_exists<T: TableRow>(&self) -> io::Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        tracing::info!("Creating empty table {}", self.path.display());
        let mut writer = BufWriter::new(File::create(&self.path)?);
        writeln!(writer, "{}", T::HEADER)?;
        writer.flush()
    }

    /// Read every well-formed row.
    ///
    /// Blank lines and rows with too few fields are skipped. A read failure or an
    /// unparseable record id stops the load; rows decoded before it are kept.
    pub fn load<T: TableRow>(&self) -> Vec<T> {
        let mut rows = Vec::new();
        if let Err(e) = self.read_into(&mut rows) {
            tracing::warn!(
                "Error loading {}: {} ({} rows kept)",
                self.path.display(),
                e,
                rows.len()
            );
        }
        rows
    }

    fn read_into<T: TableRow>(&self, rows: &mut Vec<T>) -> Result<(), LoadError> {
        let reader = BufReader::new(File::open(&self.path)?);

        // First line is the header
        for (index, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < T::MIN_FIELDS {
                tracing::debug!(
                    "Skipping malformed row at {}:{}",
                    self.path.display(),
                    index + 1
                );
                continue;
            }
            let row = T::from_fields(&fields).map_err(|source| LoadError::Row {
                line: index + 1,
                source,
            })?;
            rows.push(row);
        }

        Ok(())
    }

    /// Truncate and rewrite the whole table. Failures are logged, not returned.
    pub fn save<'a, T, I>(&self, rows: I)
    where
        T: TableRow + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        if let Err(e) = self.write_rows(rows) {
            tracing::error!("Error saving {}: {}", self.path.display(), e);
        }
    }

    fn write_rows<'a, T, I>(&self, rows: I) -> io::Result<()>
    where
        T: TableRow + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        writeln!(writer, "{}", T::HEADER)?;
        for row in rows {
            writeln!(writer, "{}", row.to_row())?;
        }
        writer.flush()
    }
}
