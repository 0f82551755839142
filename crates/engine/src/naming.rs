//! Identifier construction for soup tables and columns
//!
//! Every table, column and index name that ends up in SQL text is produced
//! here. Soup names are validated before first use and all identifiers are
//! emitted double-quoted, so reserved words (`order`, `group`) are safe as
//! soup names. Values never go through this module; they are always bound
//! as parameters.

use smartstore_core::{Error, Result};

/// Shared index catalog table
pub const CATALOG_TABLE: &str = "soup_index_map";

/// SQL index on the catalog's soupName column
pub const CATALOG_INDEX: &str = "soup_index_map$soup";

/// Surrogate id column
pub const ID_COL: &str = "id";
/// Full-document JSON column
pub const SOUP_COL: &str = "soup";
/// Creation timestamp column (epoch millis)
pub const CREATED_COL: &str = "created";
/// Last-modified timestamp column (epoch millis)
pub const LAST_MODIFIED_COL: &str = "lastModified";

/// Columns every soup table has before its index columns
pub const FIXED_COLUMNS: [&str; 4] = [ID_COL, SOUP_COL, CREATED_COL, LAST_MODIFIED_COL];

/// Longest accepted soup name
pub const MAX_SOUP_NAME_LENGTH: usize = 64;

/// Check that `name` can be used as a soup (and table) name
///
/// Accepted: 1..=64 ASCII letters, digits and `_`, not starting with a
/// digit, not starting with `sqlite_`, and not the catalog table.
pub fn validate_soup_name(name: &str) -> Result<()> {
    let invalid = |why: &str| Err(Error::invalid_input(format!("soup name '{}' {}", name, why)));

    if name.is_empty() {
        return invalid("is empty");
    }
    if name.len() > MAX_SOUP_NAME_LENGTH {
        return invalid("is longer than 64 characters");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return invalid("may only contain ASCII letters, digits and '_'");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return invalid("must not start with a digit");
    }
    if name.to_ascii_lowercase().starts_with("sqlite_") || name.eq_ignore_ascii_case(CATALOG_TABLE) {
        return invalid("is reserved");
    }
    Ok(())
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quoted table name of a soup
pub fn table_name(soup: &str) -> String {
    quote_identifier(soup)
}

/// Unquoted name of the `ordinal`-th index column of a soup
pub fn column_name(soup: &str, ordinal: usize) -> String {
    format!("{}_{}", soup, ordinal)
}

/// Quoted name of the SQL index backing an index column
///
/// Indexes share SQLite's namespace with tables; the `$` keeps these names
/// out of the soup name space.
pub fn index_name(column: &str) -> String {
    quote_identifier(&format!("{}$idx", column))
}
