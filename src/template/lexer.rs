//! Lexer splitting template bodies into text and placeholders using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `{{Name}}`; the name cannot contain braces
    #[regex(r"\{\{[^{}]*\}\}")]
    Placeholder,

    /// A `{` that does not open a placeholder
    #[token("{")]
    Brace,

    #[regex(r"[^{]+")]
    Text,
}

/// A lexed piece of a template body, borrowing from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Placeholder { name: &'a str, raw: &'a str },
}

impl<'a> Segment<'a> {
    /// Source text this segment was lexed from
    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Text(s) => s,
            Segment::Placeholder { raw, .. } => raw,
        }
    }
}

/// Spanned tokens over a template body
///
/// logos does not backtrack out of a `{{` that fails to close, so a failed
/// match is re-read as one literal `{` and lexing resumes on the next byte.
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    inner: logos::Lexer<'a, Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            inner: Token::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        let tok = self.inner.next()?;
        let span = self.inner.span();
        let start = self.offset + span.start;
        match tok {
            Ok(tok) => Some((tok, start..self.offset + span.end)),
            Err(()) => {
                // failures only start at a `{`
                let input: &'a str = self.input;
                self.offset = start + 1;
                self.inner = Token::lexer(&input[self.offset..]);
                Some((Token::Brace, start..start + 1))
            }
        }
    }
}

/// Tokenize a body into spanned tokens
pub fn lex(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

/// Tokenize a body into segments
pub fn segments(input: &str) -> impl Iterator<Item = Segment<'_>> + '_ {
    lex(input).map(move |(tok, span)| {
        let raw = &input[span];
        match tok {
            Token::Placeholder => Segment::Placeholder {
                name: &raw[2..raw.len() - 2],
                raw,
            },
            Token::Brace | Token::Text => Segment::Text(raw),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let tokens: Vec<_> = lex("<p>Hello</p>").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Text]);
    }

    #[test]
    fn test_placeholder_between_text() {
        let tokens: Vec<_> = lex("Dear {{EmpName}},").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Text, Token::Placeholder, Token::Text]);
    }

    #[test]
    fn test_placeholder_names() {
        let names: Vec<_> = segments("{{A}} and {{Basic Pay}} and {{}}")
            .filter_map(|s| match s {
                Segment::Placeholder { name, .. } => Some(name),
                Segment::Text(_) => None,
            })
            .collect();
        assert_eq!(names, vec!["A", "Basic Pay", ""]);
    }

    #[test]
    fn test_stray_braces_are_text() {
        let segs: Vec<_> = segments("a { b {{{{X}} c }}").collect();
        assert_eq!(
            segs,
            vec![
                Segment::Text("a "),
                Segment::Text("{"),
                Segment::Text(" b "),
                Segment::Text("{"),
                Segment::Text("{"),
                Segment::Placeholder {
                    name: "X",
                    raw: "{{X}}"
                },
                Segment::Text(" c }}"),
            ]
        );
    }

    #[test]
    fn test_brace_run_before_placeholder() {
        let spans: Vec<_> = lex("{{{N}}}").collect();
        assert_eq!(
            spans,
            vec![
                (Token::Brace, 0..1),
                (Token::Placeholder, 1..6),
                (Token::Text, 6..7),
            ]
        );

        let segs: Vec<_> = segments("a{{{N}}").collect();
        assert_eq!(
            segs,
            vec![
                Segment::Text("a"),
                Segment::Text("{"),
                Segment::Placeholder {
                    name: "N",
                    raw: "{{N}}"
                },
            ]
        );
    }

    #[test]
    fn test_unclosed_placeholder() {
        let raw: String = segments("{{Name").map(|s| s.raw()).collect();
        assert_eq!(raw, "{{Name");
        assert!(segments("{{Name").all(|s| matches!(s, Segment::Text(_))));
    }

    #[test]
    fn test_segments_cover_input() {
        let input = "<td>{{Basic}}</td>\n<td>₹ {{HRA}}</td> {x}";
        let rebuilt: String = segments(input).map(|s| s.raw()).collect();
        assert_eq!(rebuilt, input);
    }
}
