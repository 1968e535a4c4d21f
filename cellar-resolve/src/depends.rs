//! Parses a Debian-style `Depends` field into alternative groups.
//!
//! A `Depends` value is a comma-separated list of groups; within a group,
//! `|` separates alternatives of which satisfying any one satisfies the
//! whole group. Version constraints in parentheses (`(>= 2.34)`) and
//! architecture qualifiers in brackets (`[amd64]`) are stripped -- this is
//! not a version-constraint solver, just enough to recover bare package
//! names for graph edges.

/// Splits a `Depends` field into comma-separated groups, each further split
/// into `|`-separated alternatives. Empty input yields no groups.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    text.split(',')
        .filter_map(|group| {
            let alternatives: Vec<String> = group
                .split('|')
                .map(alternative_name)
                .filter(|name| !name.is_empty())
                .collect();
            if alternatives.is_empty() {
                None
            } else {
                Some(alternatives)
            }
        })
        .collect()
}

fn alternative_name(alt: &str) -> String {
    let alt = alt.trim();
    let end = alt.find(['(', '[']).unwrap_or(alt.len());
    alt[..end].trim().to_string()
}
