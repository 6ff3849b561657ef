//! SQL DDL for all tenet tables.
//!
//! Defines the `beliefs`, `beliefs_fts` (FTS5), `episodes`, `belief_changes`,
//! `belief_episodes`, `belief_links`, `belief_embeddings`,
//! `episode_embeddings`, and `schema_meta` tables. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for tenet's core tables.
const SCHEMA_SQL: &str = r#"
-- Durable, confidence-weighted claims
CREATE TABLE IF NOT EXISTS beliefs (
    id TEXT PRIMARY KEY,
    statement TEXT NOT NULL,
    confidence REAL NOT NULL DEFAULT 1.0 CHECK(confidence >= 0.0 AND confidence <= 1.0),
    status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','forgotten','pruned','invalidated')),
    belief_type TEXT NOT NULL DEFAULT 'factual' CHECK(belief_type IN ('factual','preference','procedural','architectural','insight','meta')),
    importance INTEGER NOT NULL DEFAULT 5 CHECK(importance >= 1 AND importance <= 10),
    stability REAL NOT NULL DEFAULT 1.0 CHECK(stability >= 1.0 AND stability <= 5.0),
    subject TEXT NOT NULL DEFAULT 'owner',
    access_count INTEGER NOT NULL DEFAULT 0,
    last_accessed TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    supersedes TEXT,
    superseded_by TEXT
);

CREATE INDEX IF NOT EXISTS idx_beliefs_status ON beliefs(status);
CREATE INDEX IF NOT EXISTS idx_beliefs_type ON beliefs(belief_type);
CREATE INDEX IF NOT EXISTS idx_beliefs_subject ON beliefs(subject);
CREATE INDEX IF NOT EXISTS idx_beliefs_updated ON beliefs(updated_at);

-- Full-text search over belief statements (BM25)
CREATE VIRTUAL TABLE IF NOT EXISTS beliefs_fts USING fts5(
    statement,
    id UNINDEXED,
    content='beliefs',
    content_rowid='rowid'
);

-- Immutable observations
CREATE TABLE IF NOT EXISTS episodes (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    context TEXT,
    action TEXT NOT NULL,
    outcome TEXT,
    tags TEXT NOT NULL DEFAULT '[]'
);

-- Append-only audit trail of belief mutations
CREATE TABLE IF NOT EXISTS belief_changes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    belief_id TEXT NOT NULL,
    change_type TEXT NOT NULL CHECK(change_type IN ('created','reinforced','weakened','contradicted','pruned','forgotten')),
    detail TEXT,
    episode_id TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_changes_belief ON belief_changes(belief_id);

-- Which episodes support which beliefs
CREATE TABLE IF NOT EXISTS belief_episodes (
    belief_id TEXT NOT NULL REFERENCES beliefs(id),
    episode_id TEXT NOT NULL REFERENCES episodes(id),
    PRIMARY KEY (belief_id, episode_id)
);

-- Undirected associations, stored with belief_a < belief_b
CREATE TABLE IF NOT EXISTS belief_links (
    belief_a TEXT NOT NULL REFERENCES beliefs(id),
    belief_b TEXT NOT NULL REFERENCES beliefs(id),
    created_at TEXT NOT NULL,
    PRIMARY KEY (belief_a, belief_b),
    CHECK (belief_a < belief_b)
);

CREATE INDEX IF NOT EXISTS idx_links_b ON belief_links(belief_b);

-- One embedding vector per belief / episode, raw little-endian f32 bytes
CREATE TABLE IF NOT EXISTS belief_embeddings (
    belief_id TEXT PRIMARY KEY REFERENCES beliefs(id),
    embedding BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS episode_embeddings (
    episode_id TEXT PRIMARY KEY REFERENCES episodes(id),
    embedding BLOB NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
