//! Character classification for control-file field names.
//!
//! Debian-822 field names (`Package`, `Pre-Depends`, `X-Foreign-Header`) are
//! restricted to a narrow ASCII alphabet: letters and hyphens, with a
//! trailing colon. There is no Unicode identifier grammar to speak of, so
//! this module is a small fraction of the character-classification surface
//! a general-purpose lexer needs.

/// Checks if a character can start a field name.
///
/// Field names must start with an ASCII letter. Policy doesn't document
/// fields starting with a digit or hyphen, and none of the well-known
/// fields do either.
///
/// # Example
///
/// ```
/// use cellar_parse::unicode::is_field_name_start;
///
/// assert!(is_field_name_start('P'));
/// assert!(is_field_name_start('x'));
/// assert!(!is_field_name_start('-'));
/// assert!(!is_field_name_start('1'));
/// ```
pub fn is_field_name_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Checks if a character can continue a field name.
///
/// Continuation characters are ASCII letters, digits, and hyphens, which
/// covers every field name in Debian policy (`Pre-Depends`, `Multi-Arch`,
/// `Build-Depends-Indep`, `X-Cargo-Register-Path`) without admitting
/// whitespace or the colon that terminates the name.
///
/// # Example
///
/// ```
/// use cellar_parse::unicode::is_field_name_continue;
///
/// assert!(is_field_name_continue('r'));
/// assert!(is_field_name_continue('-'));
/// assert!(is_field_name_continue('2'));
/// assert!(!is_field_name_continue(':'));
/// assert!(!is_field_name_continue(' '));
/// ```
pub fn is_field_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Checks if a character is linear whitespace: space or tab.
///
/// Linear whitespace is what marks a continuation line in RFC 822 style
/// control files. A line beginning with linear whitespace extends the
/// value of the previous field; a bare newline never does.
///
/// # Example
///
/// ```
/// use cellar_parse::unicode::is_linear_whitespace;
///
/// assert!(is_linear_whitespace(' '));
/// assert!(is_linear_whitespace('\t'));
/// assert!(!is_linear_whitespace('\n'));
/// assert!(!is_linear_whitespace('a'));
/// ```
pub fn is_linear_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}
