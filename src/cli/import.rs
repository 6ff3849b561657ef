use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::config::TenetConfig;

/// Import a JSON export from a file, or stdin when no path is given.
pub fn import(config: &TenetConfig, path: Option<&Path>) -> Result<()> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let mut conn = crate::db::open_database(&config.resolved_db_path())?;
    let report = crate::memory::export::import_data(&mut conn, &json)?;

    println!("Imported:");
    println!("  Beliefs:          {}", report.beliefs);
    println!("  Episodes:         {}", report.episodes);
    println!("  Changes:          {}", report.changes);
    println!("  Episode links:    {}", report.belief_episodes);
    println!("  Belief links:     {}", report.belief_links);
    println!("  Embeddings:       {}", report.embeddings);
    Ok(())
}
