//! Typed CRUD over beliefs, episodes, links, embeddings, and the change log.
//!
//! Pure data access — no ranking logic. Every evidence-bearing mutation of a
//! belief (confidence, status, supersession) bumps `updated_at`; the retrieval
//! "touch" deliberately does not, since bumping it would reset the decay clock
//! and make stability redundant.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::error::MemoryError;
use crate::memory::types::{Belief, BeliefStatus, BeliefType, ChangeType, Episode};
use crate::memory::{bytes_to_embedding, embedding_to_bytes};

/// Maximum stability a belief can reach through retrieval access.
pub const MAX_STABILITY: f64 = 5.0;
/// Stability gained per retrieval access.
pub const STABILITY_STEP: f64 = 0.1;

/// Parameters for creating a belief.
#[derive(Debug, Clone)]
pub struct NewBelief<'a> {
    pub statement: &'a str,
    pub belief_type: BeliefType,
    pub importance: u8,
    pub subject: &'a str,
    pub confidence: f64,
    pub stability: f64,
}

impl<'a> NewBelief<'a> {
    /// A factual belief with default importance, stability, and full confidence.
    pub fn factual(statement: &'a str, subject: &'a str) -> Self {
        Self {
            statement,
            belief_type: BeliefType::Factual,
            importance: 5,
            subject,
            confidence: 1.0,
            stability: 1.0,
        }
    }
}

/// A belief paired with its decoded embedding vector.
#[derive(Debug, Clone)]
pub struct EmbeddedBelief {
    pub belief: Belief,
    pub embedding: Vec<f32>,
}

/// Result of a forget operation.
#[derive(Debug, Serialize)]
pub struct ForgetResult {
    /// Full ID of the forgotten belief.
    pub id: String,
    pub statement: String,
}

const BELIEF_COLUMNS: &str = "id, statement, confidence, status, belief_type, importance, \
     stability, subject, access_count, last_accessed, created_at, updated_at, \
     supersedes, superseded_by";

fn belief_from_row(row: &Row<'_>) -> rusqlite::Result<Belief> {
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
}

// ── Beliefs ──────────────────────────────────────────────────────────────────

/// Insert a new belief and sync the FTS index. Returns the full record.
pub fn insert_belief(conn: &Connection, new: &NewBelief<'_>) -> Result<Belief> {
    if !(0.0..=1.0).contains(&new.confidence) {
        bail!("confidence out of range: {}", new.confidence);
    }
    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let importance = new.importance.clamp(1, 10);
    let stability = new.stability.clamp(1.0, MAX_STABILITY);

    conn.execute(
        "INSERT INTO beliefs (id, statement, confidence, status, belief_type, importance, \
         stability, subject, access_count, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 'active', ?4, ?5, ?6, ?7, 0, ?8, ?8)",
        params![
            id,
            new.statement,
            new.confidence,
            new.belief_type.as_str(),
            importance,
            stability,
            new.subject,
            now,
        ],
    )?;
    let rowid = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO beliefs_fts (rowid, statement, id) VALUES (?1, ?2, ?3)",
        params![rowid, new.statement, id],
    )?;

    get_belief(conn, &id)?
        .ok_or_else(|| anyhow::anyhow!("belief vanished immediately after insert: {id}"))
}

/// Fetch a belief by full ID.
pub fn get_belief(conn: &Connection, id: &str) -> Result<Option<Belief>> {
    let belief = conn
        .query_row(
            &format!("SELECT {BELIEF_COLUMNS} FROM beliefs WHERE id = ?1"),
            params![id],
            belief_from_row,
        )
        .optional()?;
    Ok(belief)
}

/// Resolve an id prefix against active beliefs.
///
/// Exactly one match returns its full id; multiple matches are ambiguous and
/// the caller must supply more characters; zero matches is not-found.
pub fn resolve_prefix(conn: &Connection, prefix: &str) -> Result<String> {
    if prefix.is_empty() {
        return Err(MemoryError::NotFound(prefix.to_string()).into());
    }
    let pattern = format!("{}%", prefix.replace('%', "").replace('_', ""));
    let mut stmt = conn.prepare(
        "SELECT id FROM beliefs WHERE status = 'active' AND id LIKE ?1 LIMIT 3",
    )?;
    let mut ids: Vec<String> = stmt
        .query_map(params![pattern], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match ids.len() {
        0 => Err(MemoryError::NotFound(prefix.to_string()).into()),
        1 => Ok(ids.remove(0)),
        n => Err(MemoryError::AmbiguousPrefix {
            prefix: prefix.to_string(),
            matches: n,
        }
        .into()),
    }
}

/// Set a belief's status and bump `updated_at`.
pub fn set_status(conn: &Connection, id: &str, status: BeliefStatus) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE beliefs SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(())
}

/// Set a belief's stored confidence and bump `updated_at`.
pub fn set_confidence(conn: &Connection, id: &str, confidence: f64) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE beliefs SET confidence = ?1, updated_at = ?2 WHERE id = ?3",
        params![confidence.clamp(0.0, 1.0), now, id],
    )?;
    Ok(())
}

/// Increase a belief's stored confidence by `boost`, capped at 1.0. Returns
/// the new stored value.
pub fn reinforce(conn: &Connection, id: &str, boost: f64) -> Result<f64> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE beliefs SET confidence = MIN(confidence + ?1, 1.0), updated_at = ?2 WHERE id = ?3",
        params![boost, now, id],
    )?;
    let confidence: f64 = conn.query_row(
        "SELECT confidence FROM beliefs WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(confidence)
}

/// Record that `new_id` supersedes `old_id`, setting both directions.
///
/// This is evidentiary lineage, not a status change — the old belief may stay
/// active. Self-supersession and one-hop cycles are rejected defensively.
pub fn set_supersession(conn: &Connection, old_id: &str, new_id: &str) -> Result<()> {
    if old_id == new_id {
        bail!("belief cannot supersede itself: {old_id}");
    }
    let reverse: Option<String> = conn
        .query_row(
            "SELECT supersedes FROM beliefs WHERE id = ?1",
            params![old_id],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    if reverse.as_deref() == Some(new_id) {
        bail!("supersession cycle between {old_id} and {new_id}");
    }

    let now = chrono::Utc::now().to_rfc3339();
    let updated = conn.execute(
        "UPDATE beliefs SET superseded_by = ?1, updated_at = ?2 WHERE id = ?3",
        params![new_id, now, old_id],
    )?;
    if updated == 0 {
        return Err(MemoryError::NotFound(old_id.to_string()).into());
    }
    conn.execute(
        "UPDATE beliefs SET supersedes = ?1, updated_at = ?2 WHERE id = ?3",
        params![old_id, now, new_id],
    )?;
    Ok(())
}

/// Batch "touch": bump stability (capped), access count, and last-accessed
/// for every returned belief. Does not bump `updated_at`.
pub fn touch_beliefs(conn: &Connection, ids: &[&str]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let now = chrono::Utc::now().to_rfc3339();
    let placeholders: Vec<String> = (2..=ids.len() + 1).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "UPDATE beliefs SET stability = MIN(stability + {STABILITY_STEP}, {MAX_STABILITY}), \
         access_count = access_count + 1, last_accessed = ?1 \
         WHERE id IN ({})",
        placeholders.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut bind: Vec<&dyn rusqlite::types::ToSql> = vec![&now];
    for id in ids {
        bind.push(id);
    }
    stmt.execute(bind.as_slice())?;
    Ok(())
}

/// Forget a belief by id prefix: resolve, flip status, log the change.
pub fn forget_belief(
    conn: &mut Connection,
    prefix: &str,
    reason: Option<&str>,
) -> Result<ForgetResult> {
    let id = resolve_prefix(conn, prefix)?;
    let tx = conn.transaction()?;

    let statement: String = tx.query_row(
        "SELECT statement FROM beliefs WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    let now = chrono::Utc::now().to_rfc3339();
    tx.execute(
        "UPDATE beliefs SET status = 'forgotten', updated_at = ?1 WHERE id = ?2",
        params![now, id],
    )?;
    record_change(&tx, &id, ChangeType::Forgotten, reason.unwrap_or("forgotten by caller"), None)?;
    tx.commit()?;

    Ok(ForgetResult { id, statement })
}

// ── Episodes ─────────────────────────────────────────────────────────────────

/// Insert an immutable episode. Returns the full record.
pub fn insert_episode(
    conn: &Connection,
    context: Option<&str>,
    action: &str,
    outcome: Option<&str>,
    tags: &[String],
) -> Result<Episode> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let tags_json = serde_json::to_string(tags)?;

    conn.execute(
        "INSERT INTO episodes (id, timestamp, context, action, outcome, tags) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, now, context, action, outcome, tags_json],
    )?;

    Ok(Episode {
        id,
        timestamp: now,
        context: context.map(str::to_string),
        action: action.to_string(),
        outcome: outcome.map(str::to_string),
        tags: tags.to_vec(),
    })
}

/// Fetch an episode by ID.
pub fn get_episode(conn: &Connection, id: &str) -> Result<Option<Episode>> {
    let episode = conn
        .query_row(
            "SELECT id, timestamp, context, action, outcome, tags FROM episodes WHERE id = ?1",
            params![id],
            |row| {
                let tags_json: String = row.get(5)?;
                Ok(Episode {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    context: row.get(2)?,
                    action: row.get(3)?,
                    outcome: row.get(4)?,
                    tags: serde_json::from_str(&tags_json).unwrap_or_default(),
                })
            },
        )
        .optional()?;
    Ok(episode)
}

// ── Change log ───────────────────────────────────────────────────────────────

/// Append an audit entry to the change log.
pub fn record_change(
    conn: &Connection,
    belief_id: &str,
    change_type: ChangeType,
    detail: &str,
    episode_id: Option<&str>,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO belief_changes (belief_id, change_type, detail, episode_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![belief_id, change_type.as_str(), detail, episode_id, now],
    )?;
    Ok(())
}

// ── Supporting episodes ──────────────────────────────────────────────────────

/// Record that an episode supports a belief. Insert-or-ignore on the pair.
pub fn link_belief_episode(conn: &Connection, belief_id: &str, episode_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO belief_episodes (belief_id, episode_id) VALUES (?1, ?2)",
        params![belief_id, episode_id],
    )?;
    Ok(())
}

/// How many distinct episodes support a belief.
pub fn count_supporting_episodes(conn: &Connection, belief_id: &str) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM belief_episodes WHERE belief_id = ?1",
        params![belief_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// IDs of episodes supporting a belief.
pub fn supporting_episode_ids(conn: &Connection, belief_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT episode_id FROM belief_episodes WHERE belief_id = ?1")?;
    let ids = stmt
        .query_map(params![belief_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

// ── Belief links ─────────────────────────────────────────────────────────────

/// Create an undirected association between two beliefs.
///
/// The pair is stored in canonical order (lexicographically smaller id first)
/// so each unordered pair has at most one edge. Self-links are rejected.
/// Returns `true` if a new edge was inserted.
pub fn link_beliefs(conn: &Connection, a: &str, b: &str) -> Result<bool> {
    if a == b {
        bail!("belief cannot link to itself: {a}");
    }
    let (first, second) = if a < b { (a, b) } else { (b, a) };
    let now = chrono::Utc::now().to_rfc3339();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO belief_links (belief_a, belief_b, created_at) VALUES (?1, ?2, ?3)",
        params![first, second, now],
    )?;
    Ok(inserted > 0)
}

/// IDs of all beliefs linked to the given one.
pub fn linked_belief_ids(conn: &Connection, id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT CASE WHEN belief_a = ?1 THEN belief_b ELSE belief_a END \
         FROM belief_links WHERE belief_a = ?1 OR belief_b = ?1",
    )?;
    let ids = stmt
        .query_map(params![id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

// ── Embeddings ───────────────────────────────────────────────────────────────

/// Store (or replace) a belief's embedding vector.
pub fn put_belief_embedding(conn: &Connection, belief_id: &str, embedding: &[f32]) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO belief_embeddings (belief_id, embedding) VALUES (?1, ?2)",
        params![belief_id, embedding_to_bytes(embedding)],
    )?;
    Ok(())
}

/// Store (or replace) an episode's embedding vector.
pub fn put_episode_embedding(
    conn: &Connection,
    episode_id: &str,
    embedding: &[f32],
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO episode_embeddings (episode_id, embedding) VALUES (?1, ?2)",
        params![episode_id, embedding_to_bytes(embedding)],
    )?;
    Ok(())
}

/// Load active beliefs that have embeddings, most recently updated first,
/// decoding each vector. Malformed rows are skipped and counted, never fatal.
pub fn load_active_embeddings(
    conn: &Connection,
    limit: Option<usize>,
) -> Result<(Vec<EmbeddedBelief>, usize)> {
    // Belief columns are unqualified but unambiguous across the join.
    let sql = format!(
        "SELECT {BELIEF_COLUMNS}, e.embedding \
         FROM beliefs b JOIN belief_embeddings e ON b.id = e.belief_id \
         WHERE b.status = 'active' ORDER BY b.updated_at DESC"
    );
    let sql = match limit {
        Some(n) => format!("{sql} LIMIT {n}"),
        None => sql,
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<(Belief, Vec<u8>)> = stmt
        .query_map([], |row| {
            let belief = belief_from_row(row)?;
            let blob: Vec<u8> = row.get(14)?;
            Ok((belief, blob))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut decoded = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for (belief, blob) in rows {
        match bytes_to_embedding(&blob, &belief.id) {
            Ok(embedding) => decoded.push(EmbeddedBelief { belief, embedding }),
            Err(err) => {
                tracing::warn!(%err, "skipping undecodable embedding");
                skipped += 1;
            }
        }
    }
    Ok((decoded, skipped))
}
