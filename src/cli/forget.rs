use anyhow::Result;

use crate::config::TenetConfig;

/// Mark a belief as forgotten by id prefix.
pub fn forget(config: &TenetConfig, prefix: &str, reason: Option<&str>) -> Result<()> {
    let mut conn = crate::db::open_database(&config.resolved_db_path())?;
    let result = crate::memory::store::forget_belief(&mut conn, prefix, reason)?;
    println!("Forgot belief {}: {}", result.id, result.statement);
    Ok(())
}
