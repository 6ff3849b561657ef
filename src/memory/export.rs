//! Versioned JSON export and idempotent import of the whole store.
//!
//! The export is a single self-contained document: every table, embeddings
//! included (as `f32` arrays, not blobs, so the payload is portable and
//! diffable). Import inserts by primary key with OR IGNORE, so importing the
//! same payload twice, or importing into a store that already holds some of
//! the rows, changes nothing.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;
use crate::memory::types::{Belief, BeliefChange, Episode};
use crate::memory::{bytes_to_embedding, embedding_to_bytes};

/// Newest payload layout this build can read and write.
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct BeliefEpisodeLink {
    pub belief_id: String,
    pub episode_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BeliefLinkRecord {
    pub belief_a: String,
    pub belief_b: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub vector: Vec<f32>,
}

/// Complete store snapshot.
#[derive(Debug, Serialize)]
pub struct ExportData {
    pub version: u32,
    pub exported_at: String,
    pub beliefs: Vec<Belief>,
    pub episodes: Vec<Episode>,
    pub changes: Vec<BeliefChange>,
    pub belief_episodes: Vec<BeliefEpisodeLink>,
    pub belief_links: Vec<BeliefLinkRecord>,
    pub belief_embeddings: Vec<EmbeddingRecord>,
    pub episode_embeddings: Vec<EmbeddingRecord>,
}

/// Rows actually inserted by an import. Rows already present count as zero.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub beliefs: usize,
    pub episodes: usize,
    pub changes: usize,
    pub belief_episodes: usize,
    pub belief_links: usize,
    pub embeddings: usize,
}

// All array fields optional here so a missing one is a reportable caller
// error rather than a serde message.
#[derive(Debug, Deserialize)]
struct RawExport {
    version: Option<u32>,
    beliefs: Option<Vec<Belief>>,
    episodes: Option<Vec<Episode>>,
    #[serde(default)]
    changes: Option<Vec<BeliefChange>>,
    #[serde(default)]
    belief_episodes: Option<Vec<BeliefEpisodeLink>>,
    #[serde(default)]
    belief_links: Option<Vec<BeliefLinkRecord>>,
    #[serde(default)]
    belief_embeddings: Option<Vec<EmbeddingRecord>>,
    #[serde(default)]
    episode_embeddings: Option<Vec<EmbeddingRecord>>,
}

/// Snapshot the entire store.
pub fn export_data(conn: &Connection) -> Result<ExportData> {
    let mut stmt = conn.prepare(
        "SELECT id, statement, confidence, status, belief_type, importance, stability, \
         subject, access_count, last_accessed, created_at, updated_at, supersedes, \
         superseded_by FROM beliefs ORDER BY id",
    )?;
    let beliefs: Vec<Belief> = stmt
        .query_map([], |row| {
            let status: String = row.get(3)?;
            let belief_type: String = row.get(4)?;
            Ok(Belief {
                id: row.get(0)?,
                statement: row.get(1)?,
                confidence: row.get(2)?,
                status: status.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
                belief_type: belief_type
                    .parse()
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
                importance: row.get(5)?,
                stability: row.get(6)?,
                subject: row.get(7)?,
                access_count: row.get(8)?,
                last_accessed: row.get(9)?,
                created_at: row.get(10)?,
                updated_at: row.get(11)?,
                supersedes: row.get(12)?,
                superseded_by: row.get(13)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, timestamp, context, action, outcome, tags FROM episodes ORDER BY id",
    )?;
    let episodes: Vec<Episode> = stmt
        .query_map([], |row| {
            let tags_json: String = row.get(5)?;
            Ok(Episode {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                context: row.get(2)?,
                action: row.get(3)?,
                outcome: row.get(4)?,
                tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, belief_id, change_type, detail, episode_id, created_at \
         FROM belief_changes ORDER BY id",
    )?;
    let changes: Vec<BeliefChange> = stmt
        .query_map([], |row| {
            let change_type: String = row.get(2)?;
            Ok(BeliefChange {
                id: row.get(0)?,
                belief_id: row.get(1)?,
                change_type: change_type
                    .parse()
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
                detail: row.get(3)?,
                episode_id: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT belief_id, episode_id FROM belief_episodes ORDER BY belief_id, episode_id",
    )?;
    let belief_episodes: Vec<BeliefEpisodeLink> = stmt
        .query_map([], |row| {
            Ok(BeliefEpisodeLink {
                belief_id: row.get(0)?,
                episode_id: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT belief_a, belief_b, created_at FROM belief_links ORDER BY belief_a, belief_b",
    )?;
    let belief_links: Vec<BeliefLinkRecord> = stmt
        .query_map([], |row| {
            Ok(BeliefLinkRecord {
                belief_a: row.get(0)?,
                belief_b: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let belief_embeddings = export_embeddings(conn, "belief_embeddings", "belief_id")?;
    let episode_embeddings = export_embeddings(conn, "episode_embeddings", "episode_id")?;

    Ok(ExportData {
        version: EXPORT_VERSION,
        exported_at: chrono::Utc::now().to_rfc3339(),
        beliefs,
        episodes,
        changes,
        belief_episodes,
        belief_links,
        belief_embeddings,
        episode_embeddings,
    })
}

fn export_embeddings(conn: &Connection, table: &str, key: &str) -> Result<Vec<EmbeddingRecord>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {key}, embedding FROM {table} ORDER BY {key}"))?;
    let rows: Vec<(String, Vec<u8>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for (id, blob) in rows {
        match bytes_to_embedding(&blob, &id) {
            Ok(vector) => records.push(EmbeddingRecord { id, vector }),
            Err(err) => tracing::warn!(%err, "omitting undecodable embedding from export"),
        }
    }
    Ok(records)
}

/// Import a payload produced by [`export_data`].
///
/// Every insert is OR IGNORE on the primary key, so the operation is
/// idempotent and safe against stores that already contain some of the rows.
/// The whole import commits atomically.
pub fn import_data(conn: &mut Connection, json: &str) -> Result<ImportReport> {
    let raw: RawExport = serde_json::from_str(json)
        .map_err(|err| MemoryError::MalformedImport(err.to_string()))?;

    let version = raw
        .version
        .ok_or_else(|| MemoryError::MalformedImport("missing version field".into()))?;
    if version > EXPORT_VERSION {
        return Err(MemoryError::MalformedImport(format!(
            "payload version {version} is newer than supported version {EXPORT_VERSION}"
        ))
        .into());
    }
    let beliefs = raw
        .beliefs
        .ok_or_else(|| MemoryError::MalformedImport("missing beliefs array".into()))?;
    let episodes = raw
        .episodes
        .ok_or_else(|| MemoryError::MalformedImport("missing episodes array".into()))?;

    let tx = conn.transaction()?;
    let mut report = ImportReport::default();

    for belief in &beliefs {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO beliefs (id, statement, confidence, status, belief_type, \
             importance, stability, subject, access_count, last_accessed, created_at, \
             updated_at, supersedes, superseded_by) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                belief.id,
                belief.statement,
                belief.confidence,
                belief.status.as_str(),
                belief.belief_type.as_str(),
                belief.importance,
                belief.stability,
                belief.subject,
                belief.access_count,
                belief.last_accessed,
                belief.created_at,
                belief.updated_at,
                belief.supersedes,
                belief.superseded_by,
            ],
        )?;
        if inserted > 0 {
            let rowid = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO beliefs_fts (rowid, statement, id) VALUES (?1, ?2, ?3)",
                params![rowid, belief.statement, belief.id],
            )?;
            report.beliefs += 1;
        }
    }

    for episode in &episodes {
        let tags_json = serde_json::to_string(&episode.tags)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO episodes (id, timestamp, context, action, outcome, tags) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                episode.id,
                episode.timestamp,
                episode.context,
                episode.action,
                episode.outcome,
                tags_json,
            ],
        )?;
        report.episodes += inserted;
    }

    for change in raw.changes.unwrap_or_default() {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO belief_changes (id, belief_id, change_type, detail, \
             episode_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                change.id,
                change.belief_id,
                change.change_type.as_str(),
                change.detail,
                change.episode_id,
                change.created_at,
            ],
        )?;
        report.changes += inserted;
    }

    for link in raw.belief_episodes.unwrap_or_default() {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO belief_episodes (belief_id, episode_id) VALUES (?1, ?2)",
            params![link.belief_id, link.episode_id],
        )?;
        report.belief_episodes += inserted;
    }

    for link in raw.belief_links.unwrap_or_default() {
        let (a, b) = if link.belief_a < link.belief_b {
            (&link.belief_a, &link.belief_b)
        } else {
            (&link.belief_b, &link.belief_a)
        };
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO belief_links (belief_a, belief_b, created_at) \
             VALUES (?1, ?2, ?3)",
            params![a, b, link.created_at],
        )?;
        report.belief_links += inserted;
    }

    for record in raw.belief_embeddings.unwrap_or_default() {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO belief_embeddings (belief_id, embedding) VALUES (?1, ?2)",
            params![record.id, embedding_to_bytes(&record.vector)],
        )?;
        report.embeddings += inserted;
    }
    for record in raw.episode_embeddings.unwrap_or_default() {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO episode_embeddings (episode_id, embedding) VALUES (?1, ?2)",
            params![record.id, embedding_to_bytes(&record.vector)],
        )?;
        report.embeddings += inserted;
    }

    tx.commit()?;
    tracing::info!(
        beliefs = report.beliefs,
        episodes = report.episodes,
        "import complete"
    );
    Ok(report)
}
