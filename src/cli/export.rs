use anyhow::Result;

use crate::config::TenetConfig;

/// Export the whole store as JSON to stdout.
pub fn export(config: &TenetConfig) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let data = crate::memory::export::export_data(&conn)?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
