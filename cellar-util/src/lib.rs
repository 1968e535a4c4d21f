//! cellar-util - shared infrastructure for the cellar crates
//!
//! Small, dependency-light pieces used across the workspace that don't
//! belong to any one crate's domain:
//!
//! - [`symbol`]: string interning for control-file field names and package
//!   names, so they can be compared and hashed as cheap integers instead of
//!   repeatedly allocating and comparing `String`s.
//! - [`span`]: byte-range/line-column source locations plus a [`span::SourceMap`]
//!   for turning a span back into a human-readable `file:line:column`,
//!   shared by the control-file parser and its diagnostics.
//! - [`diagnostic`]: structured parse/resolve diagnostics (severity, code,
//!   message, span, optional suggestion) and the builder used to assemble
//!   them.
//! - [`error`]: error types for the above.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod symbol;
