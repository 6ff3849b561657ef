use anyhow::Result;

use crate::config::TenetConfig;

/// Record an observation and run it through the formation pipeline.
pub fn remember(config: &TenetConfig, observation: &str) -> Result<()> {
    let mut conn = crate::db::open_database(&config.resolved_db_path())?;
    crate::db::ensure_embed_model(&conn, &config.llm.embed_model)?;
    let llm = crate::llm::create_client(&config.llm)?;

    let outcome = crate::memory::formation::remember(
        &mut conn,
        llm.as_ref(),
        observation,
        &config.formation,
        &config.storage.default_subject,
    )?;

    println!("Episode recorded: {}", outcome.episode_id);
    match (&outcome.belief_id, outcome.is_reinforcement) {
        (Some(id), true) => println!("Reinforced existing belief {id}"),
        (Some(id), false) => println!("New belief {id}"),
        (None, _) => {}
    }
    if let Some(old) = &outcome.contradicted_belief_id {
        if outcome.weakened {
            println!("Weakened contradicted belief {old} (kept active, strong evidence)");
        } else {
            println!("Invalidated contradicted belief {old}");
        }
    }
    Ok(())
}
