use anyhow::Result;

use crate::config::TenetConfig;

/// Search beliefs and print the ranked results.
pub fn recall(config: &TenetConfig, query: &str, json: bool) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    crate::db::ensure_embed_model(&conn, &config.llm.embed_model)?;
    let llm = crate::llm::create_client(&config.llm)?;

    let response = crate::memory::search::recall(
        &conn,
        llm.as_ref(),
        query,
        &config.retrieval,
        &config.storage.default_subject,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.results.is_empty() {
        println!("No relevant beliefs.");
        return Ok(());
    }
    for result in &response.results {
        println!(
            "[{:.2}] ({}) {}  (id {} confidence {:.2})",
            result.score,
            result.belief_type,
            result.statement,
            super::short_id(&result.id),
            result.confidence,
        );
    }
    if response.skipped_malformed > 0 {
        eprintln!(
            "warning: skipped {} malformed embeddings",
            response.skipped_malformed
        );
    }
    Ok(())
}
