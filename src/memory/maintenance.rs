//! Housekeeping sweeps: reflection, duplicate merging, meta-belief synthesis,
//! and the pairwise contradiction scan.
//!
//! All sweeps operate on a window of the most recently updated active
//! embedded beliefs, with candidates sorted by id so repeated runs over an
//! unchanged store produce identical clusters. Per-cluster and per-pair
//! failures are warned and skipped; a sweep never aborts halfway.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::config::MaintenanceConfig;
use crate::llm::{ChatMessage, ChatOptions, LlmClient};
use crate::memory::decay;
use crate::memory::store::{self, EmbeddedBelief, NewBelief};
use crate::memory::types::{BeliefStatus, BeliefType, ChangeType};

/// Confidence added to a merge winner per sweep. Absorbing a duplicate is a
/// weaker signal than a fresh restatement, hence smaller than the formation
/// reinforcement boost.
const MERGE_REINFORCE_BOOST: f64 = 0.05;

/// A belief whose effective confidence has decayed below the stale threshold.
#[derive(Debug, Serialize)]
pub struct StaleBelief {
    pub id: String,
    pub statement: String,
    pub effective_confidence: f64,
}

/// What a reflection pass found. Read-only; merging is a separate step.
#[derive(Debug, Serialize)]
pub struct ReflectReport {
    /// How many embedded active beliefs were examined.
    pub examined: usize,
    /// Clusters of near-duplicate belief ids, each of size >= 2.
    pub duplicate_clusters: Vec<Vec<String>>,
    pub stale: Vec<StaleBelief>,
    pub skipped_malformed: usize,
}

/// Outcome of a duplicate-merge sweep.
#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub clusters_merged: usize,
    /// Ids of beliefs invalidated into a winner.
    pub absorbed: Vec<String>,
    pub winners: Vec<String>,
}

/// Outcome of a synthesis sweep.
#[derive(Debug, Serialize)]
pub struct SynthesisReport {
    pub clusters_considered: usize,
    /// Ids of the meta-beliefs created this sweep.
    pub created: Vec<String>,
}

/// A pair of beliefs the LLM judged contradictory.
#[derive(Debug, Serialize)]
pub struct Contradiction {
    pub belief_a: String,
    pub belief_b: String,
    pub statement_a: String,
    pub statement_b: String,
    pub similarity: f64,
    pub reason: String,
}

/// Outcome of a contradiction scan. Findings are reported, not acted on; the
/// caller decides what to forget.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub pairs_checked: usize,
    pub contradictions: Vec<Contradiction>,
    pub skipped_malformed: usize,
}

/// Examine recent beliefs for near-duplicates and decayed-out entries.
pub fn reflect(conn: &Connection, config: &MaintenanceConfig) -> Result<ReflectReport> {
    let candidates = window_candidates(conn, config.reflect_window)?;
    let clusters = cluster_by_similarity(&candidates.embedded, config.duplicate_threshold);
    let duplicate_clusters: Vec<Vec<String>> = clusters
        .into_iter()
        .filter(|cluster| cluster.len() >= 2)
        .map(|cluster| {
            cluster
                .into_iter()
                .map(|i| candidates.embedded[i].belief.id.clone())
                .collect()
        })
        .collect();

    let stale = find_stale(conn, config)?;
    tracing::debug!(
        examined = candidates.embedded.len(),
        duplicates = duplicate_clusters.len(),
        stale = stale.len(),
        "reflection complete"
    );
    Ok(ReflectReport {
        examined: candidates.embedded.len(),
        duplicate_clusters,
        stale,
        skipped_malformed: candidates.skipped,
    })
}

/// Merge each duplicate cluster into its highest-effective-confidence member.
///
/// Losers keep their episode history (links are transferred to the winner),
/// are invalidated, and point at the winner through supersession.
pub fn merge_duplicates(conn: &mut Connection, config: &MaintenanceConfig) -> Result<MergeReport> {
    let candidates = window_candidates(conn, config.reflect_window)?;
    let clusters = cluster_by_similarity(&candidates.embedded, config.duplicate_threshold);

    let mut report = MergeReport {
        clusters_merged: 0,
        absorbed: Vec::new(),
        winners: Vec::new(),
    };

    for cluster in clusters.into_iter().filter(|c| c.len() >= 2) {
        let members: Vec<&EmbeddedBelief> =
            cluster.iter().map(|&i| &candidates.embedded[i]).collect();
        // Winner: highest effective confidence, id order breaking ties.
        let winner = members
            .iter()
            .max_by(|a, b| {
                effective_of(a)
                    .partial_cmp(&effective_of(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.belief.id.cmp(&a.belief.id))
            })
            .map(|m| m.belief.id.clone())
            .ok_or_else(|| anyhow::anyhow!("empty duplicate cluster"))?;

        let tx = conn.transaction()?;
        let mut absorbed_here = 0usize;
        for member in &members {
            let loser = &member.belief.id;
            if *loser == winner {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO belief_episodes (belief_id, episode_id) \
                 SELECT ?1, episode_id FROM belief_episodes WHERE belief_id = ?2",
                params![winner, loser],
            )?;
            store::set_supersession(&tx, loser, &winner)?;
            store::set_status(&tx, loser, BeliefStatus::Invalidated)?;
            store::record_change(
                &tx,
                loser,
                ChangeType::Contradicted,
                &format!("merged into duplicate {winner}"),
                None,
            )?;
            report.absorbed.push(loser.clone());
            absorbed_here += 1;
        }
        store::reinforce(&tx, &winner, MERGE_REINFORCE_BOOST)?;
        store::record_change(
            &tx,
            &winner,
            ChangeType::Reinforced,
            &format!("absorbed {absorbed_here} duplicate beliefs"),
            None,
        )?;
        tx.commit()?;

        tracing::info!(%winner, absorbed = absorbed_here, "merged duplicate cluster");
        report.winners.push(winner);
        report.clusters_merged += 1;
    }
    Ok(report)
}

/// Distill thematic clusters into meta-beliefs.
///
/// Each qualifying cluster gets one LLM call producing a general principle,
/// stored as a high-stability `meta` belief linked to every source belief.
/// A failing cluster is skipped, never aborts the sweep.
pub fn synthesize(
    conn: &Connection,
    llm: &dyn LlmClient,
    config: &MaintenanceConfig,
) -> Result<SynthesisReport> {
    let candidates = window_candidates(conn, config.reflect_window)?;
    // Meta-beliefs are synthesis output, not input; clustering them again
    // would compound abstractions.
    let sources: Vec<EmbeddedBelief> = candidates
        .embedded
        .into_iter()
        .filter(|c| c.belief.belief_type != BeliefType::Meta)
        .collect();

    let clusters: Vec<Vec<usize>> = cluster_by_similarity(&sources, config.synthesis_threshold)
        .into_iter()
        .filter(|c| c.len() >= config.synthesis_min_cluster_size)
        .take(config.synthesis_max_clusters)
        .collect();

    let mut report = SynthesisReport {
        clusters_considered: clusters.len(),
        created: Vec::new(),
    };

    for cluster in &clusters {
        let members: Vec<&EmbeddedBelief> = cluster.iter().map(|&i| &sources[i]).collect();
        match synthesize_cluster(conn, llm, config, &members) {
            Ok(meta_id) => report.created.push(meta_id),
            Err(err) => {
                tracing::warn!(%err, size = members.len(), "skipping cluster that failed synthesis");
            }
        }
    }
    Ok(report)
}

fn synthesize_cluster(
    conn: &Connection,
    llm: &dyn LlmClient,
    config: &MaintenanceConfig,
    members: &[&EmbeddedBelief],
) -> Result<String> {
    let mut listing = String::new();
    for member in members {
        listing.push_str("- ");
        listing.push_str(&member.belief.statement);
        listing.push('\n');
    }
    let messages = [
        ChatMessage::system(
            "Distill the following related observations into one general \
             principle. Respond with a single declarative sentence and \
             nothing else.",
        ),
        ChatMessage::user(listing),
    ];
    let principle = llm.chat(&messages, &ChatOptions::default())?;
    let principle = principle.trim();
    if principle.is_empty() {
        anyhow::bail!("synthesis produced an empty principle");
    }

    let importance = members.iter().map(|m| m.belief.importance).max().unwrap_or(5);
    let subject = members[0].belief.subject.clone();
    let meta = store::insert_belief(
        conn,
        &NewBelief {
            statement: principle,
            belief_type: BeliefType::Meta,
            importance,
            subject: &subject,
            confidence: 1.0,
            stability: config.synthesis_stability,
        },
    )?;

    match llm.embed(principle) {
        Ok(embedding) => store::put_belief_embedding(conn, &meta.id, &embedding)?,
        Err(err) => {
            tracing::warn!(%err, meta_id = %meta.id, "meta-belief left unembedded");
        }
    }
    for member in members {
        store::link_beliefs(conn, &meta.id, &member.belief.id)?;
    }
    store::record_change(
        conn,
        &meta.id,
        ChangeType::Created,
        &format!("synthesized from {} related beliefs", members.len()),
        None,
    )?;
    tracing::info!(meta_id = %meta.id, sources = members.len(), "synthesized meta-belief");
    Ok(meta.id)
}

/// Find belief pairs that are topically close but not duplicates and ask the
/// LLM, in one batched call, which of them actually conflict.
pub fn scan_contradictions(
    conn: &Connection,
    llm: &dyn LlmClient,
    config: &MaintenanceConfig,
) -> Result<ScanReport> {
    let candidates = window_candidates(conn, config.scan_window)?;
    let embedded = &candidates.embedded;

    let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
    for i in 0..embedded.len() {
        for j in (i + 1)..embedded.len() {
            let similarity =
                crate::memory::cosine_similarity(&embedded[i].embedding, &embedded[j].embedding);
            if similarity >= config.scan_band_low && similarity <= config.scan_band_high {
                pairs.push((i, j, similarity));
            }
        }
    }
    pairs.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(config.scan_max_pairs);

    let mut report = ScanReport {
        pairs_checked: pairs.len(),
        contradictions: Vec::new(),
        skipped_malformed: candidates.skipped,
    };
    if pairs.is_empty() {
        return Ok(report);
    }

    let mut listing = String::new();
    for (n, (i, j, _)) in pairs.iter().enumerate() {
        listing.push_str(&format!(
            "{}. A: {} | B: {}\n",
            n + 1,
            embedded[*i].belief.statement,
            embedded[*j].belief.statement
        ));
    }
    let messages = [
        ChatMessage::system(
            "For each numbered pair of statements, decide whether they \
             contradict each other. Respond with one line per pair, in the \
             form `N. CONTRADICTION: <one-sentence reason>` or \
             `N. COMPATIBLE`, and nothing else.",
        ),
        ChatMessage::user(listing),
    ];
    let reply = llm.chat(&messages, &ChatOptions { temperature: Some(0.0) })?;

    for line in reply.lines() {
        let Some((index, reason)) = parse_verdict_line(line) else {
            continue;
        };
        if index == 0 || index > pairs.len() {
            continue;
        }
        if let Some(reason) = reason {
            let (i, j, similarity) = pairs[index - 1];
            report.contradictions.push(Contradiction {
                belief_a: embedded[i].belief.id.clone(),
                belief_b: embedded[j].belief.id.clone(),
                statement_a: embedded[i].belief.statement.clone(),
                statement_b: embedded[j].belief.statement.clone(),
                similarity,
                reason,
            });
        }
    }
    tracing::info!(
        pairs = report.pairs_checked,
        contradictions = report.contradictions.len(),
        "contradiction scan complete"
    );
    Ok(report)
}

/// Parse one verdict line. Returns the 1-based pair number and, for a
/// contradiction, its reason; `None` for anything not well-formed.
fn parse_verdict_line(line: &str) -> Option<(usize, Option<String>)> {
    let line = line.trim();
    let (number, rest) = line.split_once('.')?;
    let index: usize = number.trim().parse().ok()?;
    let rest = rest.trim();
    if let Some(reason) = rest.strip_prefix("CONTRADICTION") {
        let reason = reason.trim_start_matches(':').trim();
        if reason.is_empty() {
            return None;
        }
        return Some((index, Some(reason.to_string())));
    }
    if rest.eq_ignore_ascii_case("COMPATIBLE") {
        return Some((index, None));
    }
    None
}

struct WindowCandidates {
    embedded: Vec<EmbeddedBelief>,
    skipped: usize,
}

/// Load the window of recently updated embedded beliefs, sorted by id so
/// clustering is deterministic across runs.
fn window_candidates(conn: &Connection, window: usize) -> Result<WindowCandidates> {
    let (mut embedded, skipped) = store::load_active_embeddings(conn, Some(window))?;
    embedded.sort_by(|a, b| a.belief.id.cmp(&b.belief.id));
    Ok(WindowCandidates { embedded, skipped })
}

fn effective_of(member: &EmbeddedBelief) -> f64 {
    decay::effective_confidence_at(
        member.belief.confidence,
        &member.belief.updated_at,
        member.belief.stability,
    )
}

/// Greedy single-linkage clustering over candidate indices.
///
/// A candidate joins a cluster if it is within `threshold` of ANY member, and
/// clusters grow to a fixpoint, so chains a~b~c land in one cluster even when
/// a and c are not directly similar.
fn cluster_by_similarity(candidates: &[EmbeddedBelief], threshold: f64) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; candidates.len()];
    let mut clusters = Vec::new();

    for seed in 0..candidates.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut cluster = vec![seed];
        loop {
            let mut grew = false;
            for i in 0..candidates.len() {
                if assigned[i] {
                    continue;
                }
                let close = cluster.iter().any(|&member| {
                    crate::memory::cosine_similarity(
                        &candidates[member].embedding,
                        &candidates[i].embedding,
                    ) >= threshold
                });
                if close {
                    assigned[i] = true;
                    cluster.push(i);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        clusters.push(cluster);
    }
    clusters
}

/// Active beliefs in the reflection window whose effective confidence has
/// decayed below the stale threshold. Unembedded beliefs are included.
fn find_stale(conn: &Connection, config: &MaintenanceConfig) -> Result<Vec<StaleBelief>> {
    let mut stmt = conn.prepare(
        "SELECT id, statement, confidence, stability, updated_at FROM beliefs \
         WHERE status = 'active' ORDER BY updated_at DESC LIMIT ?1",
    )?;
    let rows: Vec<(String, String, f64, f64, String)> = stmt
        .query_map(params![config.reflect_window as i64], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stale = Vec::new();
    for (id, statement, confidence, stability, updated_at) in rows {
        let effective = decay::effective_confidence_at(confidence, &updated_at, stability);
        if effective < config.stale_threshold {
            stale.push(StaleBelief {
                id,
                statement,
                effective_confidence: effective,
            });
        }
    }
    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use anyhow::bail;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedLlm {
        chat_replies: Mutex<VecDeque<Result<String, String>>>,
        fail_embed: bool,
    }

    impl ScriptedLlm {
        fn new(replies: &[Result<&str, &str>]) -> Self {
            Self {
                chat_replies: Mutex::new(
                    replies
                        .iter()
                        .map(|r| match r {
                            Ok(s) => Ok(s.to_string()),
                            Err(e) => Err(e.to_string()),
                        })
                        .collect(),
                ),
                fail_embed: false,
            }
        }
    }

    impl LlmClient for ScriptedLlm {
        fn chat(&self, _messages: &[ChatMessage], _options: &ChatOptions) -> Result<String> {
            match self.chat_replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => bail!(message),
                None => bail!("no scripted reply left"),
            }
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            if self.fail_embed {
                bail!("embedding unavailable");
            }
            Ok(vec![0.0, 0.0, 0.0, 1.0])
        }
    }

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn config() -> MaintenanceConfig {
        MaintenanceConfig::default()
    }

    /// Unit vector in the xy-plane at `degrees` from the x axis. Cosine
    /// similarity between two of these is the cosine of their angle gap.
    fn vec_at(degrees: f32) -> Vec<f32> {
        let radians = degrees.to_radians();
        vec![radians.cos(), radians.sin(), 0.0, 0.0]
    }

    fn seed(conn: &Connection, statement: &str, embedding: &[f32]) -> String {
        let belief = store::insert_belief(conn, &NewBelief::factual(statement, "owner")).unwrap();
        store::put_belief_embedding(conn, &belief.id, embedding).unwrap();
        belief.id
    }

    fn backdate(conn: &Connection, id: &str, days: i64) {
        let past = (chrono::Utc::now() - chrono::Duration::days(days)).to_rfc3339();
        conn.execute(
            "UPDATE beliefs SET updated_at = ?1 WHERE id = ?2",
            params![past, id],
        )
        .unwrap();
    }

    #[test]
    fn single_linkage_chains_transitively() {
        let conn = test_db();
        // a~b and b~c are within the 0.85 threshold (18 degrees apart,
        // cos ≈ 0.95); a~c is 36 degrees (cos ≈ 0.81), below it.
        seed(&conn, "a", &vec_at(0.0));
        seed(&conn, "b", &vec_at(18.0));
        seed(&conn, "c", &vec_at(36.0));
        seed(&conn, "far away", &vec_at(90.0));

        let report = reflect(&conn, &config()).unwrap();
        assert_eq!(report.examined, 4);
        assert_eq!(report.duplicate_clusters.len(), 1);
        assert_eq!(report.duplicate_clusters[0].len(), 3);
    }

    #[test]
    fn reflect_reports_stale_beliefs() {
        let conn = test_db();
        let fresh = seed(&conn, "fresh", &vec_at(0.0));
        let old = seed(&conn, "long forgotten", &vec_at(90.0));
        // 150 days at stability 1.0 is five half-lives: 1.0 -> ~0.03
        backdate(&conn, &old, 150);

        let report = reflect(&conn, &config()).unwrap();
        assert_eq!(report.stale.len(), 1);
        assert_eq!(report.stale[0].id, old);
        assert!(report.stale[0].effective_confidence < 0.1);
        assert!(report.stale.iter().all(|s| s.id != fresh));
    }

    #[test]
    fn reflect_counts_malformed_embeddings() {
        let conn = test_db();
        let bad = store::insert_belief(&conn, &NewBelief::factual("bad", "owner")).unwrap();
        conn.execute(
            "INSERT INTO belief_embeddings (belief_id, embedding) VALUES (?1, ?2)",
            params![bad.id, vec![9u8, 9, 9]],
        )
        .unwrap();

        let report = reflect(&conn, &config()).unwrap();
        assert_eq!(report.skipped_malformed, 1);
        assert_eq!(report.examined, 0);
    }

    #[test]
    fn merge_keeps_highest_effective_confidence() {
        let mut conn = test_db();
        let winner = seed(&conn, "deploys run from main", &vec_at(0.0));
        let loser_a = seed(&conn, "deployments run off main", &vec_at(5.0));
        let loser_b = seed(&conn, "we deploy from the main branch", &vec_at(10.0));
        // Stored confidence is equal; decay decides the winner
        backdate(&conn, &loser_a, 60);
        backdate(&conn, &loser_b, 90);

        // Give a loser an episode so transfer is observable
        let episode = store::insert_episode(&conn, None, "deployed from main", None, &[]).unwrap();
        store::link_belief_episode(&conn, &loser_a, &episode.id).unwrap();

        let report = merge_duplicates(&mut conn, &config()).unwrap();
        assert_eq!(report.clusters_merged, 1);
        assert_eq!(report.winners, vec![winner.clone()]);
        assert_eq!(report.absorbed.len(), 2);

        let winner_belief = store::get_belief(&conn, &winner).unwrap().unwrap();
        assert_eq!(winner_belief.status, BeliefStatus::Active);
        for loser in [&loser_a, &loser_b] {
            let belief = store::get_belief(&conn, loser).unwrap().unwrap();
            assert_eq!(belief.status, BeliefStatus::Invalidated);
            assert_eq!(belief.superseded_by.as_deref(), Some(winner.as_str()));
        }
        // Episode history survives on the winner
        assert_eq!(
            store::supporting_episode_ids(&conn, &winner).unwrap(),
            vec![episode.id]
        );

        let reinforced_detail: String = conn
            .query_row(
                "SELECT detail FROM belief_changes \
                 WHERE belief_id = ?1 AND change_type = 'reinforced'",
                params![winner],
                |r| r.get(0),
            )
            .unwrap();
        assert!(reinforced_detail.contains("2 duplicate"));
    }

    #[test]
    fn merge_with_no_duplicates_is_a_no_op() {
        let mut conn = test_db();
        seed(&conn, "alpha", &vec_at(0.0));
        seed(&conn, "omega", &vec_at(90.0));

        let report = merge_duplicates(&mut conn, &config()).unwrap();
        assert_eq!(report.clusters_merged, 0);
        assert!(report.absorbed.is_empty());
    }

    #[test]
    fn synthesize_creates_linked_meta_belief() {
        let conn = test_db();
        // Three beliefs within the looser 0.6 synthesis threshold
        let a = seed(&conn, "prefers short functions", &vec_at(0.0));
        let b = seed(&conn, "dislikes deep nesting", &vec_at(30.0));
        let c = seed(&conn, "asks for early returns", &vec_at(52.0));

        let llm = ScriptedLlm::new(&[Ok("values simple, flat control flow")]);
        let report = synthesize(&conn, &llm, &config()).unwrap();

        assert_eq!(report.clusters_considered, 1);
        assert_eq!(report.created.len(), 1);
        let meta = store::get_belief(&conn, &report.created[0]).unwrap().unwrap();
        assert_eq!(meta.belief_type, BeliefType::Meta);
        assert_eq!(meta.statement, "values simple, flat control flow");
        assert!((meta.stability - 3.0).abs() < 1e-9);

        let mut linked = store::linked_belief_ids(&conn, &meta.id).unwrap();
        linked.sort();
        let mut expected = vec![a, b, c];
        expected.sort();
        assert_eq!(linked, expected);
    }

    #[test]
    fn synthesize_skips_failing_cluster_without_aborting() {
        let conn = test_db();
        for degrees in [0.0, 30.0, 52.0] {
            seed(&conn, &format!("belief at {degrees}"), &vec_at(degrees));
        }
        let llm = ScriptedLlm::new(&[Err("model overloaded")]);

        let report = synthesize(&conn, &llm, &config()).unwrap();
        assert_eq!(report.clusters_considered, 1);
        assert!(report.created.is_empty());
    }

    #[test]
    fn synthesize_ignores_small_clusters_and_meta_sources() {
        let conn = test_db();
        seed(&conn, "pair one", &vec_at(0.0));
        seed(&conn, "pair two", &vec_at(30.0));
        // A meta belief in range must not count toward cluster size
        let meta = store::insert_belief(
            &conn,
            &NewBelief {
                statement: "an earlier principle",
                belief_type: BeliefType::Meta,
                importance: 5,
                subject: "owner",
                confidence: 1.0,
                stability: 3.0,
            },
        )
        .unwrap();
        store::put_belief_embedding(&conn, &meta.id, &vec_at(15.0)).unwrap();

        let llm = ScriptedLlm::new(&[]);
        let report = synthesize(&conn, &llm, &config()).unwrap();
        assert_eq!(report.clusters_considered, 0);
        assert!(report.created.is_empty());
    }

    #[test]
    fn scan_reports_confirmed_contradictions_only() {
        let conn = test_db();
        // 60 degrees apart: cosine 0.5, inside the [0.4, 0.85] band
        let a = seed(&conn, "standup is at nine", &vec_at(0.0));
        let b = seed(&conn, "standup is at ten", &vec_at(60.0));

        let llm = ScriptedLlm::new(&[Ok("1. CONTRADICTION: the times disagree")]);
        let report = scan_contradictions(&conn, &llm, &config()).unwrap();

        assert_eq!(report.pairs_checked, 1);
        assert_eq!(report.contradictions.len(), 1);
        let found = &report.contradictions[0];
        assert_eq!(found.reason, "the times disagree");
        let mut ids = vec![found.belief_a.clone(), found.belief_b.clone()];
        ids.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);

        // Findings are advisory: nothing was mutated
        let active: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM beliefs WHERE status = 'active'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(active, 2);
    }

    #[test]
    fn scan_with_no_candidate_pairs_makes_no_llm_call() {
        let conn = test_db();
        // 18 degrees: cosine 0.95, above the band ceiling
        seed(&conn, "a", &vec_at(0.0));
        seed(&conn, "b", &vec_at(18.0));

        let llm = ScriptedLlm::new(&[]);
        let report = scan_contradictions(&conn, &llm, &config()).unwrap();
        assert_eq!(report.pairs_checked, 0);
        assert!(report.contradictions.is_empty());
    }

    #[test]
    fn parse_verdict_line_cases() {
        assert_eq!(
            parse_verdict_line("1. CONTRADICTION: times differ"),
            Some((1, Some("times differ".to_string())))
        );
        assert_eq!(parse_verdict_line("2. COMPATIBLE"), Some((2, None)));
        assert_eq!(parse_verdict_line("  3. compatible  "), Some((3, None)));
        assert_eq!(parse_verdict_line("CONTRADICTION: no number"), None);
        assert_eq!(parse_verdict_line("4. CONTRADICTION:"), None);
        assert_eq!(parse_verdict_line("garbage"), None);
        assert_eq!(parse_verdict_line("5. MAYBE"), None);
    }
}
