use serde::{Deserialize, Serialize};

/// The column layout resolved from the header row of an uploaded CSV file.
///
/// The backend row extractor (`services::batches::rows`) scans the header once,
/// picking the first cell whose text contains `email` and the first containing
/// `name` (case-insensitive). The third column is read positionally as the rank,
/// whatever its header says, unless it already holds the email or the name.
///
/// The orchestrator writes the picked email and name headers to the batch log,
/// so the operator sees which cells were used.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CsvColumns {
    /// Zero-based index of the email column.
    pub email: usize,
    /// Zero-based index of the name column.
    pub name: usize,
    /// Zero-based index of the rank column, when the layout allows one.
    pub rank: Option<usize>,
    /// The header cells as read from the file, trimmed.
    pub headers: Vec<String>,
}
