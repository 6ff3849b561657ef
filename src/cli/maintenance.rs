use anyhow::Result;

use crate::config::TenetConfig;

/// Report near-duplicates and stale beliefs, optionally merging duplicates.
pub fn reflect(config: &TenetConfig, merge: bool) -> Result<()> {
    let mut conn = crate::db::open_database(&config.resolved_db_path())?;

    let report = crate::memory::maintenance::reflect(&conn, &config.maintenance)?;
    println!("Examined {} embedded beliefs", report.examined);

    if report.duplicate_clusters.is_empty() {
        println!("No duplicate clusters.");
    } else {
        println!("Duplicate clusters:");
        for cluster in &report.duplicate_clusters {
            println!("  {}", cluster.join(", "));
        }
    }

    if !report.stale.is_empty() {
        println!("Stale beliefs (effective confidence below threshold):");
        for stale in &report.stale {
            println!(
                "  [{:.3}] {}  {}",
                stale.effective_confidence,
                super::short_id(&stale.id),
                stale.statement
            );
        }
    }
    if report.skipped_malformed > 0 {
        eprintln!("warning: skipped {} malformed embeddings", report.skipped_malformed);
    }

    if merge {
        let merged = crate::memory::maintenance::merge_duplicates(&mut conn, &config.maintenance)?;
        println!(
            "Merged {} clusters, absorbed {} beliefs",
            merged.clusters_merged,
            merged.absorbed.len()
        );
    }
    Ok(())
}

/// Distill thematic clusters into meta-beliefs.
pub fn synthesize(config: &TenetConfig) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    crate::db::ensure_embed_model(&conn, &config.llm.embed_model)?;
    let llm = crate::llm::create_client(&config.llm)?;

    let report = crate::memory::maintenance::synthesize(&conn, llm.as_ref(), &config.maintenance)?;
    println!(
        "Considered {} clusters, created {} meta-beliefs",
        report.clusters_considered,
        report.created.len()
    );
    for id in &report.created {
        if let Some(belief) = crate::memory::store::get_belief(&conn, id)? {
            println!("  {}  {}", super::short_id(id), belief.statement);
        }
    }
    Ok(())
}

/// Scan for contradictory belief pairs and report them.
pub fn scan(config: &TenetConfig) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let llm = crate::llm::create_client(&config.llm)?;

    let report =
        crate::memory::maintenance::scan_contradictions(&conn, llm.as_ref(), &config.maintenance)?;
    println!("Checked {} candidate pairs", report.pairs_checked);

    if report.contradictions.is_empty() {
        println!("No contradictions found.");
        return Ok(());
    }
    for found in &report.contradictions {
        println!(
            "  {} <> {}  (cosine {:.2})",
            super::short_id(&found.belief_a),
            super::short_id(&found.belief_b),
            found.similarity
        );
        println!("    A: {}", found.statement_a);
        println!("    B: {}", found.statement_b);
        println!("    {}", found.reason);
    }
    Ok(())
}
