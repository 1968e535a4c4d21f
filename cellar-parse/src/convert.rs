//! Converts a parsed [`Stanza`] into a store record.
//!
//! Each package becomes one counted-tag record under `PACKAGE_TAG`. The
//! name, version, and dependency list are interned through a [`Tab`] before
//! the record is assembled, so that identical strings across packages
//! (a version number like `1.0-1`, a common `Depends` line) share a single
//! blob in the store instead of being duplicated per package.

use cellar_store::tab::Tab;
use cellar_store::{Store, Unstored, Value};
use cellar_util::symbol::{FIELD_DEPENDS, FIELD_PACKAGE, FIELD_VERSION};

use crate::stanza::Stanza;

/// Tag for a parsed package record. Falls in the store's counted-tag range
/// (64..80), so field 0 is the store's auto-incrementing sequence number
/// rather than anything `stanza_to_package` writes.
pub const PACKAGE_TAG: u8 = 64;

/// Field index of the package name within a `PACKAGE_TAG` record.
pub const FIELD_IDX_NAME: usize = 1;
/// Field index of the version within a `PACKAGE_TAG` record.
pub const FIELD_IDX_VERSION: usize = 2;
/// Field index of the raw `Depends` text within a `PACKAGE_TAG` record.
pub const FIELD_IDX_DEPENDS: usize = 3;

/// Errors converting a stanza into a store record.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The stanza has no `Package` field, which every package stanza needs.
    #[error("stanza at line {line} has no Package field")]
    MissingName { line: u32 },

    /// The store rejected the write (out of space, corrupt reference, ...).
    #[error(transparent)]
    Store(#[from] cellar_store::StoreError),
}

/// Converts one stanza into a stored package record.
///
/// `Version` and `Depends` are optional; a stanza without them gets an
/// empty string interned in their place, so every package record has the
/// same shape regardless of which optional fields were present in the
/// source file.
pub fn stanza_to_package<'s>(
    store: &'s Store,
    tab: &mut Tab<'s>,
    stanza: &Stanza,
) -> Result<Value<'s>, ConvertError> {
    let name = stanza
        .get(FIELD_PACKAGE)
        .ok_or(ConvertError::MissingName { line: stanza.line })?;
    let version = stanza.get(FIELD_VERSION).unwrap_or("");
    let depends = stanza.get(FIELD_DEPENDS).unwrap_or("");

    let name_value = tab.intern(&Unstored::string(name))?;
    let version_value = tab.intern(&Unstored::string(version))?;
    let depends_value = tab.intern(&Unstored::string(depends))?;

    // Field 0 is the store's per-tag sequence counter: it overwrites
    // whatever is passed here unconditionally, so `name_value` is a
    // throwaway placeholder rather than the actual field 0 content.
    let record = store.new_record(
        PACKAGE_TAG,
        &[name_value, name_value, version_value, depends_value],
    )?;
    Ok(record)
}

/// The auto-assigned sequence number of a package record.
pub fn package_sequence(package: Value<'_>) -> i32 {
    package.field_int(0)
}

/// The interned package name.
pub fn package_name<'s>(package: Value<'s>) -> Value<'s> {
    package.field(FIELD_IDX_NAME)
}

/// The interned version string (empty blob if the stanza had none).
pub fn package_version<'s>(package: Value<'s>) -> Value<'s> {
    package.field(FIELD_IDX_VERSION)
}

/// The interned raw `Depends` text (empty blob if the stanza had none).
///
/// This is unparsed: splitting it into alternatives is
/// [`cellar_resolve`](../cellar_resolve/index.html)'s job, not the
/// control-file parser's.
pub fn package_depends<'s>(package: Value<'s>) -> Value<'s> {
    package.field(FIELD_IDX_DEPENDS)
}
