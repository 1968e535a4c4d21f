//! Edge case tests for the control-file lexer and stanza parser.

use cellar_util::diagnostic::Handler;
use cellar_util::symbol::Symbol;

use crate::lexer::Lexer;
use crate::stanza::StanzaParser;
use crate::token::Token;

fn tokens(source: &str) -> Vec<Token> {
    let mut handler = Handler::new();
    let lexer = Lexer::new(source, &mut handler);
    lexer.collect()
}

#[test]
fn empty_source_yields_no_tokens() {
    assert_eq!(tokens(""), vec![]);
}

#[test]
fn single_field_line() {
    let toks = tokens("Package: curl\n");
    assert_eq!(
        toks,
        vec![
            Token::FieldName(Symbol::intern_known("Package")),
            Token::FieldValue(Symbol::intern(" curl")),
        ]
    );
}

#[test]
fn source_without_trailing_newline_still_lexes() {
    let toks = tokens("Package: curl");
    assert_eq!(
        toks,
        vec![
            Token::FieldName(Symbol::intern_known("Package")),
            Token::FieldValue(Symbol::intern(" curl")),
        ]
    );
}

#[test]
fn blank_line_separates_stanzas() {
    let toks = tokens("Package: a\n\nPackage: b\n");
    assert!(matches!(toks[2], Token::BlankLine));
}

#[test]
fn continuation_line_is_tokenized_separately() {
    let toks = tokens("Description: short\n long version\n");
    assert_eq!(
        toks,
        vec![
            Token::FieldName(Symbol::intern_known("Description")),
            Token::FieldValue(Symbol::intern(" short")),
            Token::Continuation(Symbol::intern("long version")),
        ]
    );
}

#[test]
fn literal_dot_continuation_is_an_empty_symbol() {
    let toks = tokens("Description: first\n .\n more\n");
    assert_eq!(
        toks,
        vec![
            Token::FieldName(Symbol::intern_known("Description")),
            Token::FieldValue(Symbol::intern(" first")),
            Token::Continuation(Symbol::intern("")),
            Token::Continuation(Symbol::intern("more")),
        ]
    );
}

#[test]
fn line_without_colon_is_invalid() {
    let mut handler = Handler::new();
    let lexer = Lexer::new("not a field line\n", &mut handler);
    let toks: Vec<_> = lexer.collect();
    assert_eq!(toks, vec![Token::Invalid("not a field line".to_string())]);
    assert!(handler.has_errors());
}

#[test]
fn byte_order_mark_is_skipped_once_at_start() {
    let source = "\u{FEFF}Package: curl\n";
    let toks = tokens(source);
    assert_eq!(toks[0], Token::FieldName(Symbol::intern_known("Package")));
}

#[test]
fn unicode_in_field_value_is_preserved() {
    let toks = tokens("Maintainer: J\u{f6}rg Sch\u{e4}fer <joerg@example.com>\n");
    assert_eq!(
        toks[1],
        Token::FieldValue(Symbol::intern(" J\u{f6}rg Sch\u{e4}fer <joerg@example.com>"))
    );
}

#[test]
fn duplicate_field_is_a_recoverable_error() {
    let mut handler = Handler::new();
    let lexer = Lexer::new("Package: a\nPackage: b\n", &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    assert_eq!(stanzas.len(), 1);
    assert_eq!(stanzas[0].fields.len(), 1);
    assert_eq!(stanzas[0].get(Symbol::intern_known("Package")), Some("a"));
    assert!(handler.has_errors());
}

#[test]
fn second_stanza_parses_after_first_has_a_duplicate_field() {
    let mut handler = Handler::new();
    let source = "Package: a\nPackage: a-dup\n\nPackage: b\nVersion: 1.0\n";
    let lexer = Lexer::new(source, &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    assert_eq!(stanzas.len(), 2);
    assert_eq!(stanzas[1].get(Symbol::intern_known("Package")), Some("b"));
    assert_eq!(stanzas[1].get(Symbol::intern_known("Version")), Some("1.0"));
    assert!(handler.has_errors());
}

#[test]
fn folded_continuation_joins_with_newlines() {
    let mut handler = Handler::new();
    let source = "Description: one-line summary\n A longer explanation\n spanning lines.\n";
    let lexer = Lexer::new(source, &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    let value = stanzas[0].get(Symbol::intern_known("Description")).unwrap();
    assert_eq!(
        value,
        "one-line summary\nA longer explanation\nspanning lines."
    );
}

#[test]
fn single_line_value_trims_trailing_whitespace() {
    let mut handler = Handler::new();
    let lexer = Lexer::new("Package: curl   \n", &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    assert_eq!(stanzas[0].get(Symbol::intern_known("Package")), Some("curl"));
}

#[test]
fn orphan_continuation_line_is_reported_but_does_not_abort_the_stanza() {
    let mut handler = Handler::new();
    let source = " stray continuation\nPackage: curl\n";
    let lexer = Lexer::new(source, &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    assert_eq!(stanzas.len(), 1);
    assert_eq!(stanzas[0].get(Symbol::intern_known("Package")), Some("curl"));
    assert!(handler.has_errors());
}

#[test]
fn invalid_line_does_not_abort_the_stanza() {
    let mut handler = Handler::new();
    let source = "Package: curl\nthis has no colon\nVersion: 1.0\n";
    let lexer = Lexer::new(source, &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    assert_eq!(stanzas.len(), 1);
    assert_eq!(stanzas[0].fields.len(), 2);
    assert!(handler.has_errors());
}

#[test]
fn multiple_blank_lines_between_stanzas_are_collapsed() {
    let mut handler = Handler::new();
    let lexer = Lexer::new("Package: a\n\n\n\nPackage: b\n", &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    assert_eq!(stanzas.len(), 2);
}

#[test]
fn leading_blank_lines_before_the_first_stanza_are_skipped() {
    let mut handler = Handler::new();
    let lexer = Lexer::new("\n\nPackage: a\n", &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    assert_eq!(stanzas.len(), 1);
}
