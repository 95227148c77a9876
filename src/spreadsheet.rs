//! Spreadsheet appender
//!
//! Appends fixed 6-column rows to a named sheet of an OpenDocument
//! spreadsheet. The whole document is loaded, extended by one row and
//! rewritten. There is no locking: two hosts appending at the same moment can
//! lose a row.

use std::path::Path;

use spreadsheet_ods::{read_ods, write_ods, Sheet, Value, WorkBook};
use tracing::{debug, info, instrument};

use crate::config::SpreadsheetConfig;
use crate::error::{BridgeError, Result};

/// Number of columns in every appended row
pub const ROW_WIDTH: usize = 6;

/// One spreadsheet entry, written in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    pub episode: String,
    pub date: String,
    pub url: String,
    pub more: bool,
    pub cover: String,
}

impl Row {
    /// Cell texts in column order. The flag is stored as "1"/"0" so the
    /// sheet stays plain text.
    pub fn cells(&self) -> [&str; ROW_WIDTH] {
        [
            self.title.as_str(),
            self.episode.as_str(),
            self.date.as_str(),
            self.url.as_str(),
            if self.more { "1" } else { "0" },
            self.cover.as_str(),
        ]
    }
}

/// Destination for finished rows
pub trait RowSink {
    fn append(&self, row: &Row) -> Result<()>;
}

/// Appends rows to the configured `.ods` file
#[derive(Debug, Clone)]
pub struct OdsAppender {
    config: SpreadsheetConfig,
}

impl OdsAppender {
    pub fn new(config: SpreadsheetConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn error(&self, action: &'static str, message: impl ToString) -> BridgeError {
        BridgeError::Spreadsheet {
            path: self.config.path.display().to_string(),
            action,
            message: message.to_string(),
        }
    }

    fn load(&self) -> Result<WorkBook> {
        if self.config.path.exists() {
            read_ods(&self.config.path).map_err(|e| self.error("load", e))
        } else {
            debug!(path = %self.config.path.display(), "Spreadsheet missing, starting empty");
            Ok(WorkBook::new_empty())
        }
    }

    /// Index of the configured sheet, appending it when absent
    fn sheet_index(&self, book: &mut WorkBook) -> usize {
        let existing = (0..book.num_sheets())
            .find(|&i| book.sheet(i).name().as_str() == self.config.sheet_name);
        match existing {
            Some(idx) => idx,
            None => {
                book.push_sheet(Sheet::new(self.config.sheet_name.as_str()));
                book.num_sheets() - 1
            }
        }
    }

    /// All text rows of the configured sheet. Empty when the file or sheet
    /// does not exist.
    pub fn rows(&self) -> Result<Vec<Vec<String>>> {
        if !self.config.path.exists() {
            return Ok(Vec::new());
        }
        let book = read_ods(&self.config.path).map_err(|e| self.error("load", e))?;
        let Some(sheet) = (0..book.num_sheets())
            .map(|i| book.sheet(i))
            .find(|s| s.name().as_str() == self.config.sheet_name)
        else {
            return Ok(Vec::new());
        };

        let (rows, cols) = sheet.used_grid_size();
        Ok((0..rows)
            .map(|r| (0..cols).map(|c| cell_text(sheet.value(r, c))).collect())
            .collect())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Empty => String::new(),
        Value::Text(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

impl RowSink for OdsAppender {
    #[instrument(skip(self, row), fields(path = %self.config.path.display()))]
    fn append(&self, row: &Row) -> Result<()> {
        let mut book = self.load()?;
        let idx = self.sheet_index(&mut book);

        let sheet = book.sheet_mut(idx);
        let (next_row, _) = sheet.used_grid_size();
        for (col, cell) in row.cells().into_iter().enumerate() {
            sheet.set_value(next_row, col as u32, cell);
        }

        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        write_ods(&mut book, &self.config.path).map_err(|e| self.error("save", e))?;

        info!(
            event_type = "row_appended",
            row_index = next_row,
            sheet = %self.config.sheet_name,
            "Appended spreadsheet row"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn appender(dir: &TempDir) -> OdsAppender {
        OdsAppender::new(SpreadsheetConfig {
            path: dir.path().join("nested").join("list.ods"),
            sheet_name: "Sheet1".to_string(),
        })
    }

    fn row(n: usize, more: bool) -> Row {
        Row {
            title: format!("Title {}", n),
            episode: format!("S1E{}", n),
            date: "01.02.2025".to_string(),
            url: format!("https://example.com/{}", n),
            more,
            cover: if n % 2 == 0 { String::new() } else { "icon.png".to_string() },
        }
    }

    #[test]
    fn test_cells_order_and_flag_literal() {
        let cells = row(1, true).cells();
        assert_eq!(
            cells,
            ["Title 1", "S1E1", "01.02.2025", "https://example.com/1", "1", "icon.png"]
        );
        assert_eq!(row(2, false).cells()[4], "0");
    }

    #[test]
    fn test_appending_n_rows_keeps_order() {
        let dir = TempDir::new().unwrap();
        let sink = appender(&dir);
        assert!(sink.rows().unwrap().is_empty());

        let rows: Vec<Row> = (1..=4).map(|n| row(n, n % 2 == 1)).collect();
        for r in &rows {
            sink.append(r).unwrap();
        }

        let stored = sink.rows().unwrap();
        assert_eq!(stored.len(), rows.len());
        for (stored, expected) in stored.iter().zip(&rows) {
            let expected: Vec<String> = expected.cells().iter().map(|c| c.to_string()).collect();
            assert_eq!(&stored[..ROW_WIDTH], expected.as_slice());
        }
    }

    #[test]
    fn test_flag_column_is_text() {
        let dir = TempDir::new().unwrap();
        let sink = appender(&dir);
        sink.append(&row(1, true)).unwrap();
        sink.append(&row(2, false)).unwrap();

        let book = read_ods(sink.path()).unwrap();
        let sheet = book.sheet(0);
        assert!(matches!(sheet.value(0, 4), Value::Text(s) if s == "1"));
        assert!(matches!(sheet.value(1, 4), Value::Text(s) if s == "0"));
    }

    #[test]
    fn test_other_sheets_are_preserved() {
        let dir = TempDir::new().unwrap();
        let sink = appender(&dir);
        std::fs::create_dir_all(sink.path().parent().unwrap()).unwrap();

        let mut book = WorkBook::new_empty();
        let mut notes = Sheet::new("Notes");
        notes.set_value(0, 0, "keep me");
        book.push_sheet(notes);
        write_ods(&mut book, sink.path()).unwrap();

        sink.append(&row(1, false)).unwrap();

        let book = read_ods(sink.path()).unwrap();
        assert_eq!(book.num_sheets(), 2);
        assert!(matches!(book.sheet(0).value(0, 0), Value::Text(s) if s == "keep me"));
        assert_eq!(sink.rows().unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_file_is_spreadsheet_error() {
        let dir = TempDir::new().unwrap();
        let sink = appender(&dir);
        std::fs::create_dir_all(sink.path().parent().unwrap()).unwrap();
        std::fs::write(sink.path(), b"not a zip archive").unwrap();

        let err = sink.append(&row(1, false)).unwrap_err();
        assert!(matches!(err, BridgeError::Spreadsheet { action: "load", .. }));
    }
}
