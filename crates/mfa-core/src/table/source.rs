//! Lazy record stream over a job table.

use std::io::Read;

use super::transport::Locator;
use super::Row;
use crate::error::ArchiveError;

/// Entry point for reading a job table. Restartable only by reopening.
pub struct TableSource;

impl TableSource {
    /// Retrieve the table behind `locator` and return a lazy record stream.
    /// Blocks on network I/O for remote locators.
    pub fn open(locator: &str) -> Result<RowStream, ArchiveError> {
        let loc = Locator::parse(locator);
        let reader = loc.open()?;
        tracing::info!(source = %loc, "opened job table");
        Ok(RowStream::from_reader(loc.to_string(), reader))
    }
}

/// Yields one `Row` per record; `None` is normal end of input.
/// A read error is fatal: the stream yields it once and then ends.
pub struct RowStream {
    locator: String,
    reader: csv::Reader<Box<dyn Read + Send>>,
    record: csv::ByteRecord,
    next_index: u64,
    failed: bool,
}

impl RowStream {
    pub fn from_reader(locator: impl Into<String>, reader: Box<dyn Read + Send>) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self {
            locator: locator.into(),
            reader,
            record: csv::ByteRecord::new(),
            next_index: 0,
            failed: false,
        }
    }

    /// Number of records read so far (header included).
    pub fn rows_read(&self) -> u64 {
        self.next_index
    }
}

impl Iterator for RowStream {
    type Item = Result<Row, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let cells = self
                    .record
                    .iter()
                    .map(|c| String::from_utf8_lossy(c).into_owned())
                    .collect();
                let row = Row::new(self.next_index, cells);
                self.next_index += 1;
                Some(Ok(row))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(ArchiveError::transport(&self.locator, e)))
            }
        }
    }
}
