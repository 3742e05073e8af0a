//! Turns an uploaded CSV file or a list of manual entries into rows.
//!
//! Extraction only checks the shape of the input: a CSV header must expose an
//! email and a name column, otherwise the whole batch is refused. Whether each
//! individual row is usable is decided later by [`RowInput::into_record`], so
//! that a bad row becomes a skipped row instead of a failed batch.

use common::model::certificate::{CertificateRecord, ManualEntry};
use common::model::csv::CsvColumns;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use std::io::Read;
use thiserror::Error;

/// Rank is read from this column whatever its header says.
const RANK_COLUMN: usize = 2;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("CSV header must contain an 'email' and a 'name' column (found: {found})")]
    HeaderMismatch { found: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Where the rows of a batch come from.
#[derive(Debug, Clone)]
pub enum RowSource {
    Csv(Vec<u8>),
    Manual(Vec<ManualEntry>),
}

/// A row as read, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowInput {
    pub email: String,
    pub name: String,
    pub rank: Option<String>,
}

impl RowInput {
    fn new(email: &str, name: &str, rank: Option<&str>) -> Self {
        Self {
            email: email.trim().to_string(),
            name: name.trim().to_string(),
            rank: rank
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }

    /// Email and name are both required; the error is the skip reason.
    pub fn into_record(self) -> Result<CertificateRecord, String> {
        match (self.email.is_empty(), self.name.is_empty()) {
            (true, true) => Err("missing email and name".to_string()),
            (true, false) => Err("missing email".to_string()),
            (false, true) => Err("missing name".to_string()),
            (false, false) => Ok(CertificateRecord {
                email: self.email,
                name: self.name,
                rank: self.rank,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRows {
    pub rows: Vec<RowInput>,
    /// Some row carries a third CSV column or a manual rank.
    pub has_rank: bool,
    /// Only set for CSV input.
    pub columns: Option<CsvColumns>,
}

pub fn extract(source: RowSource) -> Result<ExtractedRows, ExtractError> {
    match source {
        RowSource::Csv(bytes) => {
            let reader = CsvRows::new(bytes.as_slice())?;
            let columns = reader.columns().clone();
            let mut has_rank = false;
            let mut rows = Vec::new();
            for row in reader {
                let (row, width) = row?;
                has_rank |= columns.rank.is_some() && width > RANK_COLUMN;
                rows.push(row);
            }
            Ok(ExtractedRows {
                rows,
                has_rank,
                columns: Some(columns),
            })
        }
        RowSource::Manual(entries) => {
            let rows: Vec<RowInput> = entries
                .iter()
                .map(|e| RowInput::new(&e.email, &e.name, e.rank.as_deref()))
                .collect();
            let has_rank = rows.iter().any(|r| r.rank.is_some());
            Ok(ExtractedRows {
                rows,
                has_rank,
                columns: None,
            })
        }
    }
}

/// First header cell containing `needle`, ignoring case.
fn find_column(headers: &StringRecord, needle: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.to_lowercase().contains(needle))
}

pub fn resolve_columns(headers: &StringRecord) -> Result<CsvColumns, ExtractError> {
    let found = || headers.iter().collect::<Vec<_>>().join(", ");
    let email = find_column(headers, "email").ok_or_else(|| ExtractError::HeaderMismatch {
        found: found(),
    })?;
    let name = find_column(headers, "name").ok_or_else(|| ExtractError::HeaderMismatch {
        found: found(),
    })?;
    let rank = (RANK_COLUMN != email && RANK_COLUMN != name).then_some(RANK_COLUMN);

    Ok(CsvColumns {
        email,
        name,
        rank,
        headers: headers.iter().map(str::to_string).collect(),
    })
}

/// Streams rows out of a CSV reader. Consumes the reader; it cannot be rewound.
///
/// Each item also reports how many fields the record had, which is what rank
/// detection looks at.
pub struct CsvRows<R> {
    records: StringRecordsIntoIter<R>,
    columns: CsvColumns,
}

impl<R: Read> CsvRows<R> {
    pub fn new(reader: R) -> Result<Self, ExtractError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let columns = resolve_columns(reader.headers()?)?;
        Ok(Self {
            records: reader.into_records(),
            columns,
        })
    }

    pub fn columns(&self) -> &CsvColumns {
        &self.columns
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<(RowInput, usize), ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let row = RowInput::new(
            cell(self.columns.email),
            cell(self.columns.name),
            self.columns.rank.map(cell),
        );
        Some(Ok((row, record.len())))
    }
}
