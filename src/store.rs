//! Append-only xlsx log of contact submissions.
//!
//! Every write reloads the whole workbook, appends one row and saves the
//! result through a temp file that is renamed over the log. Access is
//! serialized by a single async mutex, downloads included.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{Reader, Xlsx, XlsxError as ReadError, open_workbook};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tokio::sync::Mutex;

use crate::submission::Submission;

pub const SHEET_NAME: &str = "Submissions";
pub const HEADER: [&str; 5] = ["Timestamp", "Name", "Email", "Company", "Message"];

/// Excel refuses cells longer than this many characters.
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Xlsx(XlsxError),
    Corrupt(String),
    Task(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "I/O error: {err}"),
            StoreError::Xlsx(err) => write!(f, "Workbook error: {err}"),
            StoreError::Corrupt(msg) => write!(f, "Unreadable workbook: {msg}"),
            StoreError::Task(msg) => write!(f, "Blocking task failed: {msg}"),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<XlsxError> for StoreError {
    fn from(err: XlsxError) -> Self {
        StoreError::Xlsx(err)
    }
}

pub struct SubmissionLog {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl SubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one submission. Returns the number of submission rows in the
    /// log afterwards, header excluded.
    ///
    /// The lock guard moves into the blocking task, so a cancelled caller
    /// still holds off the next writer until the file is saved.
    pub async fn record(&self, submission: &Submission) -> Result<usize, StoreError> {
        let guard = self.lock.clone().lock_owned().await;
        let path = self.path.clone();
        let row = submission.to_row();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            append_row(&path, &row)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Current bytes of the log, or `None` if nothing has been recorded yet.
    pub async fn snapshot(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let _guard = self.lock.lock().await;

        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn row_count(&self) -> Result<usize, StoreError> {
        let guard = self.lock.clone().lock_owned().await;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            if !path.exists() {
                return Ok(0);
            }
            let rows = load_rows(&path).map_err(StoreError::Corrupt)?;
            Ok(rows.len().saturating_sub(1))
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn append_row(path: &Path, row: &[String]) -> Result<usize, StoreError> {
    let mut rows = if path.exists() {
        match load_rows(path) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Recreating submission log {}: {e}", path.display());
                Vec::new()
            }
        }
    } else {
        tracing::info!("Creating submission log {}", path.display());
        Vec::new()
    };

    if rows.is_empty() {
        rows.push(HEADER.iter().map(|h| h.to_string()).collect());
    }
    rows.push(row.to_vec());

    write_rows(path, &rows)?;
    Ok(rows.len() - 1)
}

/// Read every row of the `Submissions` sheet as strings. Any failure means
/// the file is unusable and should be replaced.
fn load_rows(path: &Path) -> Result<Vec<Vec<String>>, String> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: ReadError| e.to_string())?;
    let range = workbook
        .worksheet_range(SHEET_NAME)
        .map_err(|e| e.to_string())?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let value = fit_cell(value, r, c);
            if r == 0 {
                worksheet.write_string_with_format(r as u32, c as u16, value, &bold)?;
            } else {
                worksheet.write_string(r as u32, c as u16, value)?;
            }
        }
    }

    let tmp = path.with_extension("xlsx.tmp");
    workbook.save(&tmp)?;

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

/// Cut a value down to what a single Excel cell can hold.
fn fit_cell(value: &str, row: usize, col: usize) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            tracing::warn!(
                "Truncating cell at row {row}, column {col} to {MAX_CELL_CHARS} characters"
            );
            &value[..end]
        }
        None => value,
    }
}
