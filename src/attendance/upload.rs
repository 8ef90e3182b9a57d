//! Attendance CSV upload preview
//!
//! Uploaded text is turned into a table before submission. The first
//! non-empty line names the columns; each following line becomes a row whose
//! values are matched to the columns by position. A row is `Valid` when every
//! required column holds a non-blank value.
//!
//! Two modes are supported. `Naive` splits on every comma and knows nothing
//! about quoting. `Quoted` understands double-quoted fields and reports
//! malformed lines individually.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CsvError;

use super::grammar::parse_record;

/// Columns a row must fill to be accepted
pub const REQUIRED_COLUMNS: [&str; 3] = ["Employee ID", "Sign In", "Sign Out"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvMode {
    #[default]
    Naive,
    Quoted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    pub mode: CsvMode,
    pub required_columns: Vec<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            mode: CsvMode::Naive,
            required_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl UploadOptions {
    pub fn with_mode(mut self, mode: CsvMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Valid,
    Invalid,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Valid => f.pad("Valid"),
            RowStatus::Invalid => f.pad("Invalid"),
        }
    }
}

/// A data line matched against the header
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    /// 1-based line number in the uploaded text
    pub line: usize,
    /// (column, value) pairs in header order
    pub fields: Vec<(String, String)>,
    pub status: RowStatus,
}

impl PreviewRow {
    /// Value of a column; with repeated column names the last one counts
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_valid(&self) -> bool {
        self.status == RowStatus::Valid
    }
}

/// One previewed data line
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewLine {
    Row(PreviewRow),
    Malformed(CsvError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewSummary {
    pub valid: usize,
    pub invalid: usize,
    pub malformed: usize,
}

impl PreviewSummary {
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.malformed
    }
}

/// Parsed upload ready to be shown before submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendancePreview {
    pub headers: Vec<String>,
    pub lines: Vec<PreviewLine>,
    /// Required columns absent from the header
    pub missing_columns: Vec<String>,
}

impl AttendancePreview {
    pub fn rows(&self) -> impl Iterator<Item = &PreviewRow> {
        self.lines.iter().filter_map(|l| match l {
            PreviewLine::Row(row) => Some(row),
            PreviewLine::Malformed(_) => None,
        })
    }

    pub fn valid_rows(&self) -> impl Iterator<Item = &PreviewRow> {
        self.rows().filter(|r| r.is_valid())
    }

    pub fn errors(&self) -> impl Iterator<Item = &CsvError> {
        self.lines.iter().filter_map(|l| match l {
            PreviewLine::Malformed(err) => Some(err),
            PreviewLine::Row(_) => None,
        })
    }

    pub fn summary(&self) -> PreviewSummary {
        let mut summary = PreviewSummary::default();
        for line in &self.lines {
            match line {
                PreviewLine::Row(row) if row.is_valid() => summary.valid += 1,
                PreviewLine::Row(_) => summary.invalid += 1,
                PreviewLine::Malformed(_) => summary.malformed += 1,
            }
        }
        summary
    }

    /// Whether the upload can be submitted as is
    pub fn is_submittable(&self) -> bool {
        let summary = self.summary();
        summary.valid > 0 && summary.invalid == 0 && summary.malformed == 0
    }
}

/// Non-blank lines with their 1-based number and byte offset
fn content_lines(text: &str) -> Vec<(usize, usize, &str)> {
    let (text, base) = match text.strip_prefix('\u{feff}') {
        Some(rest) => (rest, '\u{feff}'.len_utf8()),
        None => (text, 0),
    };

    let mut lines = Vec::new();
    let mut offset = base;
    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if !line.trim().is_empty() {
            lines.push((idx + 1, offset, line));
        }
        offset += raw.len() + 1;
    }
    lines
}

fn split_line(
    mode: CsvMode,
    line: &str,
    line_no: usize,
    offset: usize,
) -> Result<Vec<String>, CsvError> {
    match mode {
        CsvMode::Naive => Ok(line.split(',').map(|v| v.to_string()).collect()),
        CsvMode::Quoted => parse_record(line, line_no, offset),
    }
}

/// Parse uploaded attendance text into a preview
///
/// Only a malformed header line (in quoted mode) fails the whole upload;
/// malformed data lines are reported in place.
pub fn parse_upload(text: &str, options: &UploadOptions) -> Result<AttendancePreview, CsvError> {
    let lines = content_lines(text);
    let Some(((header_no, header_offset, header_line), data)) = lines.split_first() else {
        return Ok(AttendancePreview::default());
    };

    let headers: Vec<String> = split_line(options.mode, header_line, *header_no, *header_offset)?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing_columns: Vec<String> = options
        .required_columns
        .iter()
        .filter(|c| !headers.contains(c))
        .cloned()
        .collect();

    let mut preview = AttendancePreview {
        headers,
        lines: Vec::with_capacity(data.len()),
        missing_columns,
    };

    for (line_no, offset, line) in data {
        let entry = match split_line(options.mode, line, *line_no, *offset) {
            Ok(values) => PreviewLine::Row(build_row(
                &preview.headers,
                values,
                *line_no,
                &options.required_columns,
            )),
            Err(err) => PreviewLine::Malformed(err),
        };
        preview.lines.push(entry);
    }

    let summary = preview.summary();
    tracing::info!(
        valid = summary.valid,
        invalid = summary.invalid,
        malformed = summary.malformed,
        "attendance upload parsed"
    );
    if !preview.missing_columns.is_empty() {
        tracing::warn!(missing = ?preview.missing_columns, "upload header lacks required columns");
    }

    Ok(preview)
}

fn build_row(headers: &[String], values: Vec<String>, line: usize, required: &[String]) -> PreviewRow {
    let mut values = values.into_iter();
    let fields: Vec<(String, String)> = headers
        .iter()
        .map(|h| {
            let value = values.next().unwrap_or_default();
            (h.clone(), value.trim().to_string())
        })
        .collect();

    let mut row = PreviewRow {
        line,
        fields,
        status: RowStatus::Invalid,
    };
    let complete = required
        .iter()
        .all(|column| row.get(column).is_some_and(|v| !v.is_empty()));
    if complete {
        row.status = RowStatus::Valid;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_upload() {
        let preview = parse_upload("", &UploadOptions::default()).unwrap();
        assert!(preview.headers.is_empty());
        assert!(preview.lines.is_empty());
        assert!(!preview.is_submittable());
    }

    #[test]
    fn test_header_only() {
        let preview =
            parse_upload("Employee ID,Sign In,Sign Out\n", &UploadOptions::default()).unwrap();
        assert_eq!(preview.headers, vec!["Employee ID", "Sign In", "Sign Out"]);
        assert_eq!(preview.summary().total(), 0);
    }

    #[test]
    fn test_blank_lines_skipped_and_numbered() {
        let text = "Employee ID,Sign In,Sign Out\r\n\r\nE1,09:00,18:00\r\n   \nE2,09:10,\n";
        let preview = parse_upload(text, &UploadOptions::default()).unwrap();
        let lines: Vec<_> = preview.rows().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 5]);
        assert_eq!(preview.rows().next().unwrap().get("Sign Out"), Some("18:00"));
    }

    #[test]
    fn test_short_row_is_invalid() {
        let preview =
            parse_upload("Employee ID,Sign In,Sign Out\nE1,09:00", &UploadOptions::default())
                .unwrap();
        let row = preview.rows().next().unwrap();
        assert_eq!(row.get("Sign Out"), Some(""));
        assert_eq!(row.status, RowStatus::Invalid);
    }

    #[test]
    fn test_extra_values_ignored() {
        let preview = parse_upload(
            "Employee ID,Sign In,Sign Out\nE1,09:00,18:00,late",
            &UploadOptions::default(),
        )
        .unwrap();
        let row = preview.rows().next().unwrap();
        assert_eq!(row.fields.len(), 3);
        assert!(row.is_valid());
    }

    #[test]
    fn test_whitespace_only_value_is_invalid() {
        let preview = parse_upload(
            "Employee ID,Sign In,Sign Out\nE1,  ,18:00",
            &UploadOptions::default(),
        )
        .unwrap();
        assert_eq!(preview.summary().invalid, 1);
    }

    #[test]
    fn test_headers_trimmed_and_bom_removed() {
        let preview = parse_upload(
            "\u{feff}Employee ID , Sign In,Sign Out\nE1,09:00,18:00",
            &UploadOptions::default(),
        )
        .unwrap();
        assert_eq!(preview.headers[0], "Employee ID");
        assert!(preview.missing_columns.is_empty());
        assert_eq!(preview.summary().valid, 1);
    }

    #[test]
    fn test_missing_required_column() {
        let preview =
            parse_upload("Employee ID,Sign In\nE1,09:00", &UploadOptions::default()).unwrap();
        assert_eq!(preview.missing_columns, vec!["Sign Out"]);
        assert_eq!(preview.summary().invalid, 1);
    }

    #[test]
    fn test_custom_required_columns() {
        let options = UploadOptions::default().with_required_columns(["Code", "Date"]);
        let preview = parse_upload("Code,Date,Note\nE1,2024-03-01,", &options).unwrap();
        assert!(preview.rows().next().unwrap().is_valid());
    }

    #[test]
    fn test_naive_mode_splits_inside_quotes() {
        let preview = parse_upload(
            "Employee ID,Sign In,Sign Out\n\"E,1\",09:00,18:00",
            &UploadOptions::default(),
        )
        .unwrap();
        let row = preview.rows().next().unwrap();
        assert_eq!(row.get("Employee ID"), Some("\"E"));
        assert_eq!(row.get("Sign In"), Some("1\""));
    }

    #[test]
    fn test_quoted_mode_malformed_line_reported_in_place() {
        let options = UploadOptions::default().with_mode(CsvMode::Quoted);
        let text = "Employee ID,Sign In,Sign Out\n\"E1,09:00,18:00\nE2,09:00,18:00";
        let preview = parse_upload(text, &options).unwrap();

        assert_eq!(preview.summary().malformed, 1);
        assert_eq!(preview.summary().valid, 1);
        let err = preview.errors().next().unwrap();
        assert_eq!(err.line(), 2);
        assert!(err.span().start >= 29);
        assert!(!preview.is_submittable());
    }

    #[test]
    fn test_quoted_mode_bad_header_fails() {
        let options = UploadOptions::default().with_mode(CsvMode::Quoted);
        let result = parse_upload("\"Employee ID,Sign In\nE1,09:00", &options);
        assert!(result.is_err());
    }
}
