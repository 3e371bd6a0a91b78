//! Delimited input and output tables

use crate::error::{CliError, CliResult};
use clap::ValueEnum;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use mesh_enrich_core::SourceRow;
use std::fs::File;
use std::path::Path;

/// Field separator of the input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputDelimiter {
    #[default]
    Tab,
    Comma,
}

impl InputDelimiter {
    pub fn byte(self) -> u8 {
        match self {
            InputDelimiter::Tab => b'\t',
            InputDelimiter::Comma => b',',
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Tsv,
    Csv,
}

impl OutputFormat {
    /// `.tsv` / `.tab` → TSV, anything else → CSV.
    pub fn infer(path: &Path) -> Self {
        let is_tsv = path.extension().is_some_and(|ext| {
            ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab")
        });
        if is_tsv {
            OutputFormat::Tsv
        } else {
            OutputFormat::Csv
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            OutputFormat::Tsv => b'\t',
            OutputFormat::Csv => b',',
        }
    }
}

fn reader(path: &Path, delimiter: InputDelimiter) -> CliResult<csv::Reader<File>> {
    let file = File::open(path)
        .map_err(|e| CliError::Input(format!("input file {}: {e}", path.display())))?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

/// Number of data rows (header excluded).
pub fn count_rows(path: &Path, delimiter: InputDelimiter) -> CliResult<u64> {
    let mut rdr = reader(path, delimiter)?;
    let mut record = StringRecord::new();
    let mut n = 0u64;
    loop {
        match rdr.read_record(&mut record) {
            Ok(true) => n += 1,
            Ok(false) => return Ok(n),
            Err(e) => {
                return Err(CliError::Input(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

/// An opened input table with its header.
pub struct InputTable {
    headers: Vec<String>,
    reader: csv::Reader<File>,
}

impl InputTable {
    /// Open `path` and read the header row. A missing or blank header is
    /// fatal.
    pub fn open(path: &Path, delimiter: InputDelimiter) -> CliResult<Self> {
        let mut reader = reader(path, delimiter)?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| CliError::Input(format!("failed to read header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CliError::Input(format!(
                "could not read header from input file {}",
                path.display()
            )));
        }
        Ok(Self { headers, reader })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Data rows numbered from 1.
    ///
    /// Short rows are padded with empty cells up to the header width.
    pub fn into_rows(self) -> impl Iterator<Item = Result<SourceRow, csv::Error>> {
        let width = self.headers.len();
        self.reader
            .into_records()
            .enumerate()
            .map(move |(i, record)| {
                record.map(|rec| {
                    let mut values: Vec<String> = rec.iter().map(str::to_string).collect();
                    if values.len() < width {
                        values.resize(width, String::new());
                    }
                    SourceRow {
                        number: i + 1,
                        values,
                    }
                })
            })
    }
}

/// Output table writer.
pub struct OutputTable {
    writer: csv::Writer<File>,
    path: String,
}

impl OutputTable {
    /// Create (truncate) `path` and write the header.
    pub fn create<T: AsRef<[u8]>>(
        path: &Path,
        format: OutputFormat,
        header: &[T],
    ) -> CliResult<Self> {
        let display = path.display().to_string();
        let file = File::create(path)
            .map_err(|e| CliError::Output(format!("cannot write output file {display}: {e}")))?;
        let mut table = Self {
            writer: WriterBuilder::new()
                .delimiter(format.delimiter())
                .flexible(true)
                .from_writer(file),
            path: display,
        };
        table.write(header)?;
        Ok(table)
    }

    pub fn write<I, T>(&mut self, record: I) -> CliResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(record)
            .map_err(|e| CliError::Output(format!("failed to write {}: {e}", self.path)))
    }

    pub fn finish(mut self) -> CliResult<()> {
        self.writer
            .flush()
            .map_err(|e| CliError::Output(format!("failed to write {}: {e}", self.path)))
    }
}
