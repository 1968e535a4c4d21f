//! Core lexer implementation.
//!
//! This module contains the main Lexer struct and its line dispatch.

use cellar_util::diagnostic::{DiagnosticBuilder, Handler};
use cellar_util::span::Span;

use crate::cursor::Cursor;
use crate::token::Token;
use crate::unicode::{is_field_name_start, is_linear_whitespace};

/// Lexer for Debian-822 style control files.
///
/// The lexer works a line at a time rather than a character at a time in
/// the usual sense: each call to [`Lexer::next_token`] either starts a new
/// line (field name, continuation, blank line, or invalid line) or, right
/// after a field name, returns the rest of that line as the field's first
/// value fragment.
pub struct Lexer<'a> {
    /// Character cursor for source traversal.
    pub cursor: Cursor<'a>,

    /// Error handler for reporting lexical errors.
    pub handler: &'a mut Handler,

    /// Starting position of the current token (byte offset).
    pub token_start: usize,

    /// Line number where the current token starts (1-based).
    token_start_line: u32,

    /// Column number where the current token starts (1-based).
    token_start_column: u32,

    /// Whether the BOM (Byte Order Mark) has been checked.
    pub bom_checked: bool,

    /// Set after a `FieldName` token, so the next call reads a value
    /// instead of dispatching on the line's leading character.
    expect_value: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
            bom_checked: false,
            expect_value: false,
        }
    }

    /// Returns the next token from the source.
    ///
    /// This is the main entry point for tokenization. Lines are always
    /// consumed whole: a `FieldName` is immediately followed by a
    /// `FieldValue` covering the remainder of that line, so callers never
    /// see a field name without its (possibly empty) value.
    pub fn next_token(&mut self) -> Token {
        self.skip_bom();

        if self.expect_value {
            self.expect_value = false;
            return self.lex_field_value();
        }

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Token::Eof;
        }

        match self.cursor.current_char() {
            '\n' => {
                self.cursor.advance();
                Token::BlankLine
            },
            c if is_linear_whitespace(c) => self.lex_continuation(),
            c if is_field_name_start(c) => {
                let token = self.lex_field_name();
                if matches!(token, Token::FieldName(_)) {
                    self.expect_value = true;
                }
                token
            },
            _ => self.lex_invalid_line(self.token_start),
        }
    }

    /// Skips a UTF-8 byte order mark at the very start of the source, once.
    fn skip_bom(&mut self) {
        if self.bom_checked {
            return;
        }
        self.bom_checked = true;
        if self.cursor.position() == 0 && self.cursor.current_char() == '\u{FEFF}' {
            self.cursor.advance();
        }
    }

    /// Reports a lexical error at the current token position.
    pub fn report_error(&mut self, message: String) {
        let span = Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        );
        DiagnosticBuilder::error(message)
            .span(span)
            .emit(self.handler);
    }

    /// Returns the current line number (1-based).
    pub fn line(&self) -> u32 {
        self.cursor.line()
    }

    /// Returns the current column number (1-based).
    pub fn column(&self) -> u32 {
        self.cursor.column()
    }

    /// Returns the current byte position in the source.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the starting position of the current token.
    pub fn token_start(&mut self) -> usize {
        self.token_start
    }

    /// Consumes a non-blank, non-field, non-continuation line and reports
    /// it as invalid, recovering at the next line boundary.
    ///
    /// `start` is the byte offset where the line began, which may be
    /// earlier than the cursor's current position if a prefix was already
    /// scanned (e.g. a field-name-shaped run of characters with no colon).
    pub(crate) fn lex_invalid_line(&mut self, start: usize) -> Token {
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start).to_string();
        if !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        self.report_error(format!("malformed control-file line: {text:?}"));
        Token::Invalid(text)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token == Token::Eof {
            None
        } else {
            Some(token)
        }
    }
}
