//! Store-wide counters for the `stats` command.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

/// Snapshot of the store. Average confidence is the stored value, not the
/// decayed one, so it reflects evidence rather than elapsed time.
#[derive(Debug, Serialize)]
pub struct MemoryStats {
    pub active_beliefs: u64,
    pub forgotten_beliefs: u64,
    pub pruned_beliefs: u64,
    pub invalidated_beliefs: u64,
    pub episodes: u64,
    pub average_confidence: Option<f64>,
    pub oldest_active: Option<String>,
    pub newest_active: Option<String>,
}

pub fn collect_stats(conn: &Connection) -> Result<MemoryStats> {
    let count_status = |status: &str| -> Result<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM beliefs WHERE status = ?1",
            [status],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    };

    let episodes: i64 = conn.query_row("SELECT COUNT(*) FROM episodes", [], |row| row.get(0))?;
    let episodes = episodes as u64;
    let (average_confidence, oldest_active, newest_active) = conn.query_row(
        "SELECT AVG(confidence), MIN(created_at), MAX(created_at) \
         FROM beliefs WHERE status = 'active'",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    Ok(MemoryStats {
        active_beliefs: count_status("active")?,
        forgotten_beliefs: count_status("forgotten")?,
        pruned_beliefs: count_status("pruned")?,
        invalidated_beliefs: count_status("invalidated")?,
        episodes,
        average_confidence,
        oldest_active,
        newest_active,
    })
}
