//! Loading usernames from an input file.
//!
//! Two formats are accepted: a delimited table with a header row (comma or
//! tab separated) and a plain list with one username per line. A file whose
//! content contains any comma or tab is treated as a table.

use crate::error::AdoptCheckError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Header names tried, in order, to locate the username column.
pub const USERNAME_COLUMNS: [&str; 5] = ["username", "Username", "name", "Name", "user"];

/// Detected layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Header row plus delimited records
    Tabular { delimiter: u8 },
    /// One username per line
    PlainLines,
}

/// Decide how to read `content`.
///
/// The delimiter comes from the header line: tab when the header has tabs
/// but no commas, comma otherwise.
pub fn detect_format(content: &str) -> InputFormat {
    if !content.contains(',') && !content.contains('\t') {
        return InputFormat::PlainLines;
    }

    let header = content.lines().next().unwrap_or("");
    let delimiter = if header.contains(',') {
        b','
    } else if header.contains('\t') || !content.contains(',') {
        b'\t'
    } else {
        b','
    };

    InputFormat::Tabular { delimiter }
}

/// Read usernames from the file at `path`.
///
/// # Errors
///
/// Returns `AdoptCheckError::FileError` if the file is missing or unreadable
/// (including invalid UTF-8) and `AdoptCheckError::InputError` if a table
/// cannot be parsed.
pub fn load_usernames<P: AsRef<Path>>(path: P) -> Result<Vec<String>, AdoptCheckError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            AdoptCheckError::file_error(path_str.clone(), "Input file not found")
        }
        _ => AdoptCheckError::file_error(path_str.clone(), format!("Failed to read file: {}", e)),
    })?;

    let usernames = parse_usernames(&content)
        .map_err(|e| AdoptCheckError::input(path_str.clone(), e.to_string()))?;

    tracing::info!(path = %path_str, count = usernames.len(), "loaded usernames");
    Ok(usernames)
}

/// Extract usernames from in-memory file content.
pub fn parse_usernames(content: &str) -> Result<Vec<String>, csv::Error> {
    let content = content.trim_start_matches('\u{feff}');

    match detect_format(content) {
        InputFormat::PlainLines => Ok(parse_plain_lines(content)),
        InputFormat::Tabular { delimiter } => parse_table(content, delimiter),
    }
}

fn parse_plain_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn parse_table(content: &str, delimiter: u8) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let candidates: Vec<usize> = USERNAME_COLUMNS
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == *name))
        .collect();

    let mut usernames = Vec::new();
    for record in reader.records() {
        let record = record?;

        // First non-empty candidate column, else the row's first value
        let value = candidates
            .iter()
            .filter_map(|&idx| record.get(idx))
            .find(|v| !v.is_empty())
            .or_else(|| record.get(0));

        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            usernames.push(value.to_string());
        }
    }

    Ok(usernames)
}
