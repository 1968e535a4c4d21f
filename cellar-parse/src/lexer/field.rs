//! Field name and field value lexing.

use cellar_util::symbol::Symbol;

use crate::token::Token;
use crate::unicode::is_field_name_continue;

use super::core::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a field name at the start of a line, consuming up to and
    /// including the colon that terminates it.
    ///
    /// A line that looks like it starts with a field name but never finds
    /// a colon before the end of the line is reported as an invalid line
    /// instead: policy has no provision for a field name spanning a line
    /// break.
    pub(crate) fn lex_field_name(&mut self) -> Token {
        let start = self.cursor.position();
        while is_field_name_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let name = self.cursor.slice_from(start);

        if self.cursor.current_char() != ':' {
            return self.lex_invalid_line(start);
        }
        let symbol = Symbol::intern_known(name);
        self.cursor.advance();
        Token::FieldName(symbol)
    }

    /// Lexes the remainder of a line as a field value, exactly as written.
    ///
    /// Leading and trailing whitespace handling is left to stanza assembly,
    /// which alone knows whether a continuation line follows and therefore
    /// whether trailing whitespace should be trimmed.
    pub(crate) fn lex_field_value(&mut self) -> Token {
        let start = self.cursor.position();
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
        let value = self.cursor.slice_from(start);
        let symbol = Symbol::intern(value);
        if !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        Token::FieldValue(symbol)
    }
}
