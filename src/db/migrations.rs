//! Schema versioning and `schema_meta` bookkeeping.
//!
//! The version row is written by [`crate::db::schema::init_schema`] on first
//! open; forward-only migrations dispatch here as the schema grows past
//! [`CURRENT_SCHEMA_VERSION`]. `schema_meta` also tracks which embedding
//! model produced the stored vectors.

use rusqlite::{Connection, OptionalExtension};

/// The schema version this binary reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const VERSION_KEY: &str = "schema_version";
const EMBED_MODEL_KEY: &str = "embed_model";

/// Read the schema version recorded in the store.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let value: Option<String> = meta_value(conn, VERSION_KEY)?;
    Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
}

/// Bring the store up to [`CURRENT_SCHEMA_VERSION`].
///
/// A store written by a newer binary is left untouched with a warning; reads
/// against it work as long as the newer schema stayed backward compatible.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let version = get_schema_version(conn)?;
    if version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            schema_version = version,
            supported = CURRENT_SCHEMA_VERSION,
            "belief store was written by a newer binary"
        );
        return Ok(());
    }
    // Future versions dispatch their upgrade steps here, bumping the stored
    // version after each one.
    tracing::debug!(schema_version = version, "schema is current");
    Ok(())
}

/// The embedding model whose vectors populate the embedding tables, if any
/// has been recorded yet.
pub fn stored_embed_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    meta_value(conn, EMBED_MODEL_KEY)
}

/// Record the active embedding model. Returns the previously recorded model
/// when it differs from `model`, which signals that existing vectors were
/// produced by something else.
pub fn record_embed_model(
    conn: &Connection,
    model: &str,
) -> rusqlite::Result<Option<String>> {
    let previous = stored_embed_model(conn)?;
    if previous.as_deref() == Some(model) {
        return Ok(None);
    }
    conn.execute(
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES (?1, ?2)",
        [EMBED_MODEL_KEY, model],
    )?;
    Ok(previous)
}

fn meta_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
}
