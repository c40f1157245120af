use crate::models::Record;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Column order of every persisted row
pub const CSV_HEADERS: [&str; 7] = [
    "user_id",
    "name",
    "age",
    "bio",
    "birth_date",
    "photo_count",
    "photo_urls",
];

/// Separator between photo URLs inside one cell
pub const PHOTO_URL_SEPARATOR: &str = " | ";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing records: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-only destination for admitted records
pub trait RecordSink {
    /// Persist one record; the row is durable when this returns
    fn append(&mut self, record: &Record) -> Result<(), SinkError>;
}

/// In-memory sink, handy for dry runs and tests
impl RecordSink for Vec<Record> {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        self.push(record.clone());
        Ok(())
    }
}

/// CSV writer with a fixed header row
pub struct CsvSink<W: Write> {
    writer: W,
}

impl CsvSink<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and write the header row
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap an arbitrary writer and emit the header row
    pub fn new(mut writer: W) -> Result<Self, SinkError> {
        writeln!(writer, "{}", CSV_HEADERS.join(","))?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        let age = record.age.map(|a| a.to_string()).unwrap_or_default();
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{}",
            escape_csv(&record.user_id),
            escape_csv(&record.name),
            age,
            escape_csv(&record.bio),
            escape_csv(&record.birth_date),
            record.photo_count,
            escape_csv(&record.photo_urls.join(PHOTO_URL_SEPARATOR)),
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
