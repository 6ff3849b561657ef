use anyhow::Result;

use crate::config::TenetConfig;

/// Display store statistics in the terminal.
pub fn stats(config: &TenetConfig) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let stats = crate::memory::stats::collect_stats(&conn)?;

    println!("Belief Store Statistics");
    println!("{}", "=".repeat(40));
    println!("  Active:              {}", stats.active_beliefs);
    println!("  Forgotten:           {}", stats.forgotten_beliefs);
    println!("  Pruned:              {}", stats.pruned_beliefs);
    println!("  Invalidated:         {}", stats.invalidated_beliefs);
    println!("  Episodes:            {}", stats.episodes);

    if let Some(avg) = stats.average_confidence {
        println!("  Avg confidence:      {avg:.3}");
    }
    if let Some(ref oldest) = stats.oldest_active {
        println!("  Oldest active:       {oldest}");
    }
    if let Some(ref newest) = stats.newest_active {
        println!("  Newest active:       {newest}");
    }
    Ok(())
}
