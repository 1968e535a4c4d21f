//! cellar-parse - Debian-822 control-file parsing
//!
//! Control files (`debian/control`, `.dsc`, `Packages`, `dpkg` status files)
//! are sequences of *stanzas* separated by blank lines, each stanza a
//! sequence of `Field: value` lines where a value may fold onto following
//! lines that start with whitespace. This crate turns that text into
//! [`Stanza`] values and, via [`convert`], into records in a
//! `cellar_store`-backed package database.
//!
//! The pipeline has three stages:
//!
//! - [`lexer::Lexer`] scans UTF-8 source into a stream of [`Token`]s
//!   (`FieldName`, `FieldValue`, `Continuation`, `BlankLine`, `Eof`),
//!   tracking byte/line/column position for diagnostics.
//! - [`stanza::StanzaParser`] groups that token stream into [`Stanza`]s,
//!   folding continuation lines into a single value per field and
//!   recovering from duplicate fields and malformed lines at stanza
//!   granularity: one bad stanza doesn't abort the rest of the file, and
//!   every error encountered is collected rather than just the first.
//! - [`convert::stanza_to_package`] writes a parsed stanza into a store as
//!   a `PACKAGE_TAG` record, interning the name/version/depends fields
//!   through a [`cellar_store::tab::Tab`] so identical strings across
//!   packages are stored once.
//!
//! Non-goals: this is not a general RFC 5322 parser (no encoded-words, no
//! structured address parsing), and error recovery never goes finer than
//! "skip to the next stanza".

pub mod convert;
pub mod cursor;
pub mod lexer;
pub mod stanza;
pub mod token;
pub mod unicode;

pub use lexer::Lexer;
pub use stanza::{Stanza, StanzaParser};
pub use token::Token;

#[cfg(test)]
mod edge_cases;
