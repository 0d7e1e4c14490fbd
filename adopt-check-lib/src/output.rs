//! Incremental CSV output of check results.
//!
//! The header is written when the sink is created and every row is flushed
//! as soon as it is written, so an interrupted run still leaves a valid
//! file holding every result consumed so far.

use crate::error::AdoptCheckError;
use crate::types::CheckResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output columns, in order.
pub const OUTPUT_HEADER: [&str; 4] = ["username", "user_id", "in_adopt_me", "error"];

/// Writes one CSV row per consumed `CheckResult`.
pub struct ResultSink<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl ResultSink<File> {
    /// Create (or truncate) the output file at `path` and write the header.
    ///
    /// # Errors
    ///
    /// Returns `AdoptCheckError::FileError` if the file cannot be created or
    /// the header cannot be written.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, AdoptCheckError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            AdoptCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to create output file: {}", e),
            )
        })?;

        Self::from_writer(file).map_err(|e| {
            AdoptCheckError::file_error(path.to_string_lossy(), e.to_string())
        })
    }
}

impl<W: Write> ResultSink<W> {
    /// Wrap any writer and emit the header row.
    pub fn from_writer(inner: W) -> Result<Self, AdoptCheckError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(OUTPUT_HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Append and flush the row for `result`.
    pub fn write_result(&mut self, result: &CheckResult) -> Result<(), AdoptCheckError> {
        self.writer.write_record(format_row(result))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of result rows written (header excluded).
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and release the underlying writer.
    pub fn finish(mut self) -> Result<W, AdoptCheckError> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| AdoptCheckError::internal(format!("Failed to finish output: {}", e)))
    }
}

/// Render `result` as the four output fields.
pub fn format_row(result: &CheckResult) -> [String; 4] {
    [
        result.username.clone(),
        result.user_id.map(|id| id.to_string()).unwrap_or_default(),
        if result.is_member { "Yes" } else { "No" }.to_string(),
        result.error.clone().unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::USER_NOT_FOUND;

    fn output_lines(sink: ResultSink<Vec<u8>>) -> Vec<String> {
        let bytes = sink.finish().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_header_written_on_create() {
        let sink = ResultSink::from_writer(Vec::new()).unwrap();
        assert_eq!(output_lines(sink), vec!["username,user_id,in_adopt_me,error"]);
    }

    #[test]
    fn test_row_formats() {
        let mut sink = ResultSink::from_writer(Vec::new()).unwrap();
        sink.write_result(&CheckResult {
            username: "alice".to_string(),
            user_id: Some(111),
            is_member: true,
            error: None,
        })
        .unwrap();
        sink.write_result(&CheckResult {
            error: Some(USER_NOT_FOUND.to_string()),
            ..CheckResult::pending("ghost")
        })
        .unwrap();
        assert_eq!(sink.rows_written(), 2);

        let lines = output_lines(sink);
        assert_eq!(lines[1], "alice,111,Yes,");
        assert_eq!(lines[2], "ghost,,No,User not found");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut sink = ResultSink::from_writer(Vec::new()).unwrap();
        sink.write_result(&CheckResult {
            error: Some("Network error: a, b".to_string()),
            ..CheckResult::pending("x")
        })
        .unwrap();
        let lines = output_lines(sink);
        assert_eq!(lines[1], "x,,No,\"Network error: a, b\"");
    }

    #[test]
    fn test_rows_visible_before_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let mut sink = ResultSink::create(&path).unwrap();
        sink.write_result(&CheckResult {
            username: "bob".to_string(),
            user_id: Some(222),
            is_member: false,
            error: None,
        })
        .unwrap();

        // Not finished yet: contents must already be on disk
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["username,user_id,in_adopt_me,error", "bob,222,No,"]);
        drop(sink);
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let err = ResultSink::create("/no/such/dir/results.csv").err().unwrap();
        assert!(matches!(err, AdoptCheckError::FileError { .. }));
    }
}
