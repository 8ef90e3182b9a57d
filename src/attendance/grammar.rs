//! Quoted CSV record grammar using chumsky

use chumsky::prelude::*;

use crate::error::CsvError;

/// One CSV record: comma-separated fields, optionally double-quoted
///
/// Inside quotes a comma is literal and `""` stands for one quote. A record
/// never spans lines.
fn record<'a>() -> impl Parser<'a, &'a str, Vec<String>, extra::Err<Rich<'a, char>>> {
    let escaped_quote = just("\"\"").to('"');

    let quoted = escaped_quote
        .or(none_of("\""))
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'));

    let bare = none_of(",\"").repeated().collect::<String>();

    quoted
        .or(bare)
        .separated_by(just(','))
        .collect::<Vec<String>>()
        .then_ignore(end())
}

/// Parse a single line, reporting errors against the whole file
pub(crate) fn parse_record(line: &str, line_no: usize, offset: usize) -> Result<Vec<String>, CsvError> {
    record()
        .parse(line)
        .into_result()
        .map_err(|errs| match errs.first() {
            Some(err) => CsvError::from_rich(err, line_no, offset),
            None => CsvError::Syntax {
                line: line_no,
                span: offset..offset + line.len(),
                message: "malformed record".to_string(),
                expected: Vec::new(),
            },
        })
}
