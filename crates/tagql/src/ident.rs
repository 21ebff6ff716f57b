//! SQL identifier quoting.
//!
//! Identifiers are always emitted double-quoted, with embedded `"` escaped as
//! `""`, so table and column names never need to be valid bare identifiers.

use crate::error::ConstructionError;

/// Check that a name can be quoted: non-empty and free of NUL.
pub fn validate_ident(name: &str) -> Result<(), ConstructionError> {
    if name.is_empty() {
        return Err(ConstructionError::InvalidIdentifier(
            "empty identifier".to_string(),
        ));
    }
    if name.contains('\0') {
        return Err(ConstructionError::InvalidIdentifier(format!(
            "identifier {name:?} contains a NUL character"
        )));
    }
    Ok(())
}

/// Append `"name"` to `out`.
pub fn push_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

/// Quote a single identifier.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    push_quoted(&mut out, name);
    out
}

/// Quote a table-qualified column: `"table"."column"`.
pub fn quote_qualified(table: &str, column: &str) -> String {
    let mut out = String::with_capacity(table.len() + column.len() + 5);
    push_quoted(&mut out, table);
    out.push('.');
    push_quoted(&mut out, column);
    out
}
