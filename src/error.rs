//! Error types for attendance upload parsing

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use chumsky::error::{Rich, RichPattern};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsvError {
    #[error("line {line}: {message}")]
    Syntax {
        line: usize,
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl CsvError {
    /// Build from a parser error on one line
    ///
    /// `offset` is where the line starts in the uploaded text, so the span
    /// points into the whole file.
    pub(crate) fn from_rich(err: &Rich<'_, char>, line: usize, offset: usize) -> Self {
        let range = err.span().into_range();

        let message = match err.found() {
            Some(c) => format!("unexpected {}", describe_char(*c)),
            None => "unexpected end of line".to_string(),
        };

        let mut expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(describe_char(**tok)),
                RichPattern::EndOfInput => Some("end of line".to_string()),
                _ => None,
            })
            .collect();
        expected.sort();
        expected.dedup();

        CsvError::Syntax {
            line,
            span: offset + range.start..offset + range.end,
            message,
            expected,
        }
    }

    /// 1-based line number in the uploaded file
    pub fn line(&self) -> usize {
        match self {
            CsvError::Syntax { line, .. } => *line,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            CsvError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        self.write_report(source, filename, true)
    }

    /// Like [`CsvError::format`], without terminal colors
    pub fn format_plain(&self, source: &str, filename: &str) -> String {
        self.write_report(source, filename, false)
    }

    fn write_report(&self, source: &str, filename: &str, color: bool) -> String {
        // spans are byte offsets
        let config = Config::default()
            .with_index_type(IndexType::Byte)
            .with_color(color);

        let mut buf = Vec::new();
        match self {
            CsvError::Syntax {
                span,
                message,
                expected,
                ..
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_config(config)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);

                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn describe_char(c: char) -> String {
    match c {
        '"' => "quote".to_string(),
        ',' => "','".to_string(),
        c => format!("'{}'", c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = CsvError::Syntax {
            line: 3,
            span: 10..11,
            message: "unexpected quote".to_string(),
            expected: vec!["','".to_string()],
        };
        assert_eq!(err.to_string(), "line 3: unexpected quote");
        assert_eq!(err.line(), 3);
        assert_eq!(err.span(), &(10..11));
    }

    #[test]
    fn test_format_includes_message() {
        let source = "Employee ID,Sign In,Sign Out\nE1,\"09:00,18:00\n";
        let err = CsvError::Syntax {
            line: 2,
            span: 32..44,
            message: "unexpected end of line".to_string(),
            expected: vec!["quote".to_string()],
        };
        let report = err.format(source, "upload.csv");
        assert!(report.contains("unexpected end of line"));
        assert!(report.contains("upload.csv"));
    }

    #[test]
    fn test_report_shows_line_after_multibyte_text() {
        let options = crate::attendance::UploadOptions::default()
            .with_mode(crate::attendance::CsvMode::Quoted);
        let source = "\u{feff}Employee ID,Sign In,Sign Out,Remarks\n\
                      E1,09:00,18:00,₹₹₹₹₹₹ \"bad\n";
        let preview = crate::attendance::parse_upload(source, &options).unwrap();
        let err = preview.errors().next().expect("Should report the bad line");

        assert_eq!(&source[err.span().clone()], "\"");
        let report = err.format_plain(source, "upload.csv");
        assert!(report.contains("E1,09:00,18:00,₹₹₹₹₹₹ \"bad"), "{}", report);
        assert!(report.contains("upload.csv:2:"), "{}", report);
    }
}
