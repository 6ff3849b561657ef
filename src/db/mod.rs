pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open (or create) the belief store at the given path, with schema
/// initialized and migrations applied. The parent directory is created on
/// first use.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open belief store at {}", path.display()))?;

    // WAL keeps readers (recall, stats) unblocked by the single writer;
    // the busy timeout covers the occasional overlap with a maintenance sweep.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(Duration::from_secs(5))?;

    prepare(&conn)?;
    tracing::debug!(path = %path.display(), "belief store ready");
    Ok(conn)
}

/// Open an in-memory belief store, used by tests.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory belief store")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> Result<()> {
    schema::init_schema(conn).context("failed to initialize schema")?;
    migrations::run_migrations(conn).context("failed to run migrations")?;
    Ok(())
}

/// Record which embedding model is populating the vector tables, warning when
/// it changed since the last run. Vectors from different models are not
/// comparable, so a change means stored similarities are unreliable until the
/// store is re-embedded.
pub fn ensure_embed_model(conn: &Connection, model: &str) -> Result<()> {
    if let Some(previous) = migrations::record_embed_model(conn, model)? {
        tracing::warn!(
            previous,
            current = model,
            "embedding model changed; stored vectors may not be comparable"
        );
    }
    Ok(())
}
