//! Stanza assembly: groups field tokens into one stanza per paragraph.
//!
//! A control file is a sequence of stanzas separated by blank lines. This
//! module folds the token stream from [`crate::lexer::Lexer`] into
//! [`Stanza`] values, handling continuation-line folding and recovering
//! from malformed lines and duplicate fields at stanza granularity rather
//! than aborting the whole file.

use cellar_util::symbol::Symbol;

use crate::lexer::Lexer;
use crate::token::Token;
use crate::unicode::is_linear_whitespace;

/// One RFC-822 style paragraph: an ordered list of field name/value pairs.
///
/// Values have already had continuation lines folded in (joined with `\n`)
/// and leading/trailing whitespace trimmed per the single-line vs.
/// multi-line rules; callers don't need to know how the value was spread
/// across the source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stanza {
    /// Field name/value pairs, in the order they appeared in the source.
    pub fields: Vec<(Symbol, String)>,

    /// The 1-based source line the stanza's first field started on.
    pub line: u32,
}

impl Stanza {
    /// Looks up a field's value by name.
    ///
    /// Uses the first occurrence if the field was accidentally repeated;
    /// [`StanzaParser`] already reported a duplicate-field error for that
    /// case while keeping the first value.
    pub fn get(&self, name: Symbol) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// True if the stanza has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Accumulates the value of a field across its first line and any
/// continuation lines that follow.
struct PendingField {
    name: Symbol,
    first_line: String,
    continuations: Vec<String>,
}

impl PendingField {
    fn finish(self) -> (Symbol, String) {
        let trimmed_start = self.first_line.trim_start_matches(is_linear_whitespace);
        let value = if self.continuations.is_empty() {
            trimmed_start.trim_end().to_string()
        } else {
            let mut value = String::from(trimmed_start);
            for line in &self.continuations {
                value.push('\n');
                value.push_str(line);
            }
            value
        };
        (self.name, value)
    }
}

/// Parses a token stream into a sequence of stanzas.
///
/// Errors (duplicate fields, orphaned continuation lines, malformed lines)
/// are reported through the lexer's [`cellar_util::diagnostic::Handler`]
/// and do not stop parsing: the current stanza is still returned with
/// whatever fields parsed cleanly.
pub struct StanzaParser<'a> {
    lexer: Lexer<'a>,
    index: usize,
}

impl<'a> StanzaParser<'a> {
    /// Creates a new stanza parser over the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self { lexer, index: 0 }
    }

    /// Parses all stanzas in the file.
    pub fn parse_all(mut self) -> Vec<Stanza> {
        let mut stanzas = Vec::new();
        while let Some(stanza) = self.next_stanza() {
            stanzas.push(stanza);
        }
        stanzas
    }

    /// Parses the next stanza, or returns `None` at end of file.
    ///
    /// Leading blank lines (between stanzas, or at the start of the file)
    /// are skipped without producing an empty stanza.
    pub fn next_stanza(&mut self) -> Option<Stanza> {
        let mut token = self.lexer.next_token();
        while matches!(token, Token::BlankLine) {
            token = self.lexer.next_token();
        }
        if matches!(token, Token::Eof) {
            return None;
        }

        let stanza_line = self.lexer.line();
        let mut fields: Vec<(Symbol, String)> = Vec::new();
        let mut pending: Option<PendingField> = None;

        loop {
            match token {
                Token::FieldName(name) => {
                    if let Some(field) = pending.take() {
                        self.push_field(&mut fields, field);
                    }
                    let value = match self.lexer.next_token() {
                        Token::FieldValue(v) => v,
                        other => {
                            debug_assert!(
                                false,
                                "FieldName must be followed by FieldValue, got {other:?}"
                            );
                            Symbol::intern("")
                        },
                    };
                    pending = Some(PendingField {
                        name,
                        first_line: value.as_str().to_string(),
                        continuations: Vec::new(),
                    });
                },
                Token::Continuation(text) => {
                    match &mut pending {
                        Some(field) => field.continuations.push(text.as_str().to_string()),
                        None => self.lexer.report_error(format!(
                            "continuation line outside of any field in stanza {}",
                            self.index
                        )),
                    }
                },
                Token::Invalid(_) => {
                    // Already reported by the lexer; keep parsing the stanza.
                },
                Token::FieldValue(_) => {
                    unreachable!("the lexer only emits FieldValue right after FieldName")
                },
                Token::BlankLine | Token::Eof => break,
            }

            token = self.lexer.next_token();
        }

        if let Some(field) = pending.take() {
            self.push_field(&mut fields, field);
        }

        self.index += 1;
        Some(Stanza {
            fields,
            line: stanza_line,
        })
    }

    fn push_field(&mut self, fields: &mut Vec<(Symbol, String)>, field: PendingField) {
        let (name, value) = field.finish();
        if fields.iter().any(|(n, _)| *n == name) {
            self.lexer.report_error(format!(
                "duplicate field {:?} in stanza {}",
                name.as_str(),
                self.index
            ));
            return;
        }
        fields.push((name, value));
    }
}
