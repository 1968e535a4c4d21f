//! Continuation-line lexing.

use cellar_util::symbol::Symbol;

use crate::token::Token;

use super::core::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a continuation line: one that starts with linear whitespace
    /// and extends the value of the previous field.
    ///
    /// Exactly one leading whitespace character is stripped, matching the
    /// original decoder this is ported from; any further indentation is
    /// part of the value. Trailing whitespace on continuation lines is
    /// never trimmed, a quirk inherited unchanged from that decoder. A line
    /// that is a lone `.` after the leading character is stripped encodes a
    /// blank line inside a multi-paragraph value (used by `Description`),
    /// and is represented as an empty symbol.
    pub(crate) fn lex_continuation(&mut self) -> Token {
        self.cursor.advance();

        let start = self.cursor.position();
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let text = if text == "." { "" } else { text };
        let symbol = Symbol::intern(text);

        if !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        Token::Continuation(symbol)
    }
}
