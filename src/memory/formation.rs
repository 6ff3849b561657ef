//! Belief formation: extract → match → reinforce/create → contradiction-resolve.
//!
//! [`remember`] is the single entry point. Every observation becomes an
//! episode; the LLM extracts a structured fact from it; similarity against
//! existing active beliefs decides whether the fact reinforces an existing
//! belief, triggers a contradiction check, or becomes a fresh belief.
//!
//! Embedding failures degrade gracefully everywhere (the operation proceeds
//! without the vector); chat failures during extraction or the contradiction
//! check propagate, since the pipeline cannot classify without them.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::FormationConfig;
use crate::llm::{ChatMessage, ChatOptions, LlmClient};
use crate::memory::store::{self, EmbeddedBelief, NewBelief};
use crate::memory::types::{BeliefStatus, BeliefType, ChangeType};

/// Outcome of a `remember` call.
#[derive(Debug, Serialize)]
pub struct RememberOutcome {
    /// Episode recorded for the raw observation. Always present.
    pub episode_id: String,
    /// The belief created or reinforced, if any.
    pub belief_id: Option<String>,
    /// `true` when the fact restated an existing belief and no new belief
    /// was created.
    pub is_reinforcement: bool,
    /// Belief the new fact contradicted, if the check confirmed one.
    pub contradicted_belief_id: Option<String>,
    /// `true` when the contradicted belief was strongly evidenced and stayed
    /// active (weakened) instead of being invalidated.
    pub weakened: bool,
}

/// What the LLM extracted from an observation.
///
/// Responses are sometimes structured JSON, sometimes plain text; the two
/// shapes are modeled explicitly rather than duck-typed.
#[derive(Debug)]
enum Extraction {
    Structured {
        fact: String,
        fact_type: BeliefType,
        importance: u8,
        subject: Option<String>,
    },
    Freeform(String),
}

#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    fact: String,
    #[serde(default, alias = "factType")]
    fact_type: Option<String>,
    #[serde(default)]
    importance: Option<u8>,
    #[serde(default)]
    subject: Option<String>,
    // An `insight` field may be present; it is generic noise and is never
    // persisted as a belief, so it is not even captured here.
}

/// Turn a free-text observation into an episode plus zero or more belief
/// mutations.
pub fn remember(
    conn: &mut Connection,
    llm: &dyn LlmClient,
    observation: &str,
    config: &FormationConfig,
    default_subject: &str,
) -> Result<RememberOutcome> {
    // 1. The episode always persists, embedded best-effort.
    let episode = store::insert_episode(conn, None, observation, None, &[])?;
    match llm.embed(observation) {
        Ok(embedding) => store::put_episode_embedding(conn, &episode.id, &embedding)?,
        Err(err) => {
            tracing::warn!(%err, episode_id = %episode.id, "episode embedding failed, continuing without vector");
        }
    }

    // 2. Extraction is essential — a chat failure propagates.
    let extraction = extract_fact(llm, observation).context("fact extraction failed")?;
    let (fact, fact_type, importance, subject) = match extraction {
        Extraction::Structured {
            fact,
            fact_type,
            importance,
            subject,
        } => (fact, fact_type, importance, subject),
        Extraction::Freeform(text) => (text, BeliefType::Factual, 5, None),
    };
    let subject = subject.unwrap_or_else(|| default_subject.to_string());

    // 3. Embed the fact; failure means no similarity signal, so the fact
    // takes the low-similarity path and becomes a fresh belief.
    let fact_embedding = match llm.embed(&fact) {
        Ok(embedding) => Some(embedding),
        Err(err) => {
            tracing::warn!(%err, "fact embedding failed, creating belief without similarity check");
            None
        }
    };

    let candidates = match &fact_embedding {
        Some(embedding) => rank_candidates(conn, embedding)?,
        None => Vec::new(),
    };
    let best_similarity = candidates.first().map(|(_, sim)| *sim).unwrap_or(0.0);

    // 4a. Near-identical statement: reinforce, no new belief.
    if best_similarity >= config.reinforce_threshold {
        let (matched, _) = &candidates[0];
        let new_confidence = store::reinforce(conn, &matched.belief.id, config.reinforce_boost)?;
        store::record_change(
            conn,
            &matched.belief.id,
            ChangeType::Reinforced,
            &format!("restated by new observation, confidence now {new_confidence:.2}"),
            Some(&episode.id),
        )?;
        store::link_belief_episode(conn, &matched.belief.id, &episode.id)?;
        tracing::debug!(belief_id = %matched.belief.id, similarity = best_similarity, "reinforced existing belief");
        return Ok(RememberOutcome {
            episode_id: episode.id,
            belief_id: Some(matched.belief.id.clone()),
            is_reinforcement: true,
            contradicted_belief_id: None,
            weakened: false,
        });
    }

    // 4b. Topically close: one LLM call decides whether the fact contradicts
    // one of the in-band candidates.
    let mut contradicted: Option<&EmbeddedBelief> = None;
    if best_similarity >= config.contradiction_threshold {
        let in_band: Vec<&EmbeddedBelief> = candidates
            .iter()
            .take_while(|(_, sim)| *sim >= config.contradiction_threshold)
            .take(config.contradiction_candidates)
            .map(|(candidate, _)| candidate)
            .collect();
        if let Some(index) = check_contradiction(llm, &fact, &in_band)? {
            contradicted = Some(in_band[index]);
        }
    }

    // 4c. Create the new belief, then resolve the contradiction if confirmed.
    let new_belief = store::insert_belief(
        conn,
        &NewBelief {
            statement: &fact,
            belief_type: fact_type,
            importance,
            subject: &subject,
            confidence: 1.0,
            stability: 1.0,
        },
    )?;
    if let Some(embedding) = &fact_embedding {
        store::put_belief_embedding(conn, &new_belief.id, embedding)?;
    }
    store::link_belief_episode(conn, &new_belief.id, &episode.id)?;
    store::record_change(
        conn,
        &new_belief.id,
        ChangeType::Created,
        &format!("formed from observation: {}", truncate(observation, 120)),
        Some(&episode.id),
    )?;

    let mut contradicted_belief_id = None;
    let mut weakened = false;
    if let Some(old) = contradicted {
        let old_id = &old.belief.id;
        let supporting = store::count_supporting_episodes(conn, old_id)?;

        // Supersession is evidentiary lineage and is recorded either way,
        // even when the old belief stays active.
        store::set_supersession(conn, old_id, &new_belief.id)?;

        if supporting < config.min_supporting_episodes {
            store::set_status(conn, old_id, BeliefStatus::Invalidated)?;
            store::record_change(
                conn,
                old_id,
                ChangeType::Contradicted,
                &format!("invalidated by {} ({supporting} supporting episodes)", new_belief.id),
                Some(&episode.id),
            )?;
        } else {
            // Strictly decreasing for any positive stored confidence; a
            // stored zero is the floor of the range and stays there.
            let reduced = old.belief.confidence * config.weaken_factor;
            store::set_confidence(conn, old_id, reduced)?;
            store::record_change(
                conn,
                old_id,
                ChangeType::Weakened,
                &format!(
                    "contradicted by {} but kept active ({supporting} supporting episodes), confidence reduced to {reduced:.2}",
                    new_belief.id
                ),
                Some(&episode.id),
            )?;
            weakened = true;
        }
        contradicted_belief_id = Some(old_id.clone());
        tracing::info!(old = %old_id, new = %new_belief.id, weakened, "resolved contradiction");
    }

    Ok(RememberOutcome {
        episode_id: episode.id,
        belief_id: Some(new_belief.id),
        is_reinforcement: false,
        contradicted_belief_id,
        weakened,
    })
}

/// Active embedded beliefs ranked by cosine similarity to the fact, best first.
fn rank_candidates(
    conn: &Connection,
    fact_embedding: &[f32],
) -> Result<Vec<(EmbeddedBelief, f64)>> {
    let (embedded, _skipped) = store::load_active_embeddings(conn, None)?;
    let mut ranked: Vec<(EmbeddedBelief, f64)> = embedded
        .into_iter()
        .map(|candidate| {
            let similarity =
                crate::memory::cosine_similarity(fact_embedding, &candidate.embedding);
            (candidate, similarity)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(ranked)
}

/// Ask the LLM to extract a structured fact from the observation.
fn extract_fact(llm: &dyn LlmClient, observation: &str) -> Result<Extraction> {
    let messages = [
        ChatMessage::system(
            "Extract the single most durable fact from the user's observation. \
             Respond with JSON: {\"fact\": string, \"fact_type\": one of \
             factual|preference|procedural|architectural|insight, \
             \"importance\": integer 1-10, \"subject\": who or what the fact \
             concerns (omit if it concerns the user themselves), \
             \"insight\": optional broader takeaway}. Respond with JSON only.",
        ),
        ChatMessage::user(observation.to_string()),
    ];
    let reply = llm.chat(&messages, &ChatOptions::default())?;
    Ok(parse_extraction(&reply))
}

/// Parse an extraction reply, falling back to freeform on anything that is
/// not well-formed structured output.
fn parse_extraction(reply: &str) -> Extraction {
    let body = strip_code_fences(reply);
    match serde_json::from_str::<ExtractionPayload>(body) {
        Ok(payload) if !payload.fact.trim().is_empty() => Extraction::Structured {
            fact: payload.fact,
            fact_type: payload
                .fact_type
                .and_then(|t| t.parse().ok())
                .unwrap_or(BeliefType::Factual),
            importance: payload.importance.unwrap_or(5).clamp(1, 10),
            subject: payload.subject.filter(|s| !s.trim().is_empty()),
        },
        _ => Extraction::Freeform(reply.trim().to_string()),
    }
}

/// One call: does the new fact contradict any of the numbered candidates?
///
/// The LLM answers with a 1-based index or `NONE`; anything unparseable or
/// out of range is treated as no contradiction.
fn check_contradiction(
    llm: &dyn LlmClient,
    fact: &str,
    candidates: &[&EmbeddedBelief],
) -> Result<Option<usize>> {
    if candidates.is_empty() {
        return Ok(None);
    }
    let mut listing = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        listing.push_str(&format!("{}. {}\n", i + 1, candidate.belief.statement));
    }
    let messages = [
        ChatMessage::system(
            "You compare a new fact against existing beliefs. If the new fact \
             directly contradicts one of the numbered beliefs, respond with \
             that belief's number and nothing else. Otherwise respond NONE.",
        ),
        ChatMessage::user(format!("New fact: {fact}\n\nExisting beliefs:\n{listing}")),
    ];
    let reply = llm.chat(&messages, &ChatOptions { temperature: Some(0.0) })?;
    Ok(parse_contradiction_index(&reply, candidates.len()))
}

/// Extract a 1-based candidate index from the verdict, returning a 0-based
/// index. Out-of-range values and non-numeric replies mean no contradiction.
fn parse_contradiction_index(reply: &str, candidate_count: usize) -> Option<usize> {
    let digits: String = reply
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let index: usize = digits.parse().ok()?;
    if index >= 1 && index <= candidate_count {
        Some(index - 1)
    } else {
        None
    }
}

/// Strip markdown code fences some models wrap JSON responses in.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn truncate(content: &str, max_chars: usize) -> String {
    if content.len() <= max_chars {
        content.to_string()
    } else {
        let end = content
            .char_indices()
            .take_while(|(i, _)| *i < max_chars)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(max_chars);
        format!("{}...", &content[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use anyhow::bail;
    use rusqlite::params;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted LLM: pops chat replies in order, embeds by keyword lookup.
    struct ScriptedLlm {
        chat_replies: Mutex<VecDeque<String>>,
        embeddings: Vec<(String, Vec<f32>)>,
        fail_embed: bool,
        fail_chat: bool,
    }

    impl ScriptedLlm {
        fn new(chat_replies: &[&str]) -> Self {
            Self {
                chat_replies: Mutex::new(
                    chat_replies.iter().map(|s| s.to_string()).collect(),
                ),
                embeddings: Vec::new(),
                fail_embed: false,
                fail_chat: false,
            }
        }

        fn with_embedding(mut self, keyword: &str, embedding: Vec<f32>) -> Self {
            self.embeddings.push((keyword.to_string(), embedding));
            self
        }
    }

    impl LlmClient for ScriptedLlm {
        fn chat(&self, _messages: &[ChatMessage], _options: &ChatOptions) -> Result<String> {
            if self.fail_chat {
                bail!("chat unavailable");
            }
            self.chat_replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if self.fail_embed {
                bail!("embedding unavailable");
            }
            for (keyword, embedding) in &self.embeddings {
                if text.contains(keyword.as_str()) {
                    return Ok(embedding.clone());
                }
            }
            Ok(vec![1.0, 0.0, 0.0, 0.0])
        }
    }

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn config() -> FormationConfig {
        FormationConfig::default()
    }

    fn extraction_json(fact: &str) -> String {
        format!("{{\"fact\": \"{fact}\", \"fact_type\": \"factual\", \"importance\": 6}}")
    }

    /// Insert an active belief with an embedding and `n` supporting episodes.
    fn seed_belief(conn: &Connection, statement: &str, embedding: &[f32], episodes: usize) -> String {
        let belief = store::insert_belief(conn, &NewBelief::factual(statement, "owner")).unwrap();
        store::put_belief_embedding(conn, &belief.id, embedding).unwrap();
        for i in 0..episodes {
            let episode = store::insert_episode(
                conn,
                None,
                &format!("supporting observation {i} for {statement}"),
                None,
                &[],
            )
            .unwrap();
            store::link_belief_episode(conn, &belief.id, &episode.id).unwrap();
        }
        belief.id
    }

    #[test]
    fn near_identical_fact_reinforces_without_new_belief() {
        let mut conn = test_db();
        let existing = seed_belief(&conn, "coffee is preferred black", &[1.0, 0.0, 0.0, 0.0], 1);
        let llm = ScriptedLlm::new(&[&extraction_json("coffee is preferred black")]);

        let outcome = remember(&mut conn, &llm, "had black coffee again", &config(), "owner").unwrap();

        assert!(outcome.is_reinforcement);
        assert_eq!(outcome.belief_id.as_deref(), Some(existing.as_str()));

        let belief_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM beliefs", [], |r| r.get(0))
            .unwrap();
        assert_eq!(belief_count, 1);

        let reinforced = store::get_belief(&conn, &existing).unwrap().unwrap();
        assert!(reinforced.confidence > 1.0 - 1e-9); // was 1.0, capped

        let change_type: String = conn
            .query_row(
                "SELECT change_type FROM belief_changes WHERE belief_id = ?1 ORDER BY id DESC LIMIT 1",
                params![existing],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(change_type, "reinforced");

        // Episode linked to the existing belief
        assert_eq!(store::count_supporting_episodes(&conn, &existing).unwrap(), 2);
    }

    #[test]
    fn contradiction_against_weakly_evidenced_belief_invalidates_it() {
        let mut conn = test_db();
        // ~0.78 cosine against the new fact's embedding — inside the
        // contradiction band, below reinforcement
        let old_embedding = vec![0.78, 0.6247, 0.0, 0.0];
        let old = seed_belief(&conn, "the deploy runs on Fridays", &old_embedding, 1);

        let llm = ScriptedLlm::new(&[&extraction_json("the deploy runs on Mondays"), "1"])
            .with_embedding("Mondays", vec![1.0, 0.0, 0.0, 0.0]);

        let outcome = remember(
            &mut conn,
            &llm,
            "deploy moved to Mondays",
            &config(),
            "owner",
        )
        .unwrap();

        assert!(!outcome.is_reinforcement);
        assert!(!outcome.weakened);
        assert_eq!(outcome.contradicted_belief_id.as_deref(), Some(old.as_str()));
        let new_id = outcome.belief_id.unwrap();

        let old_belief = store::get_belief(&conn, &old).unwrap().unwrap();
        assert_eq!(old_belief.status, BeliefStatus::Invalidated);
        assert_eq!(old_belief.superseded_by.as_deref(), Some(new_id.as_str()));

        let new_belief = store::get_belief(&conn, &new_id).unwrap().unwrap();
        assert_eq!(new_belief.supersedes.as_deref(), Some(old.as_str()));
        assert_eq!(new_belief.status, BeliefStatus::Active);

        let change_type: String = conn
            .query_row(
                "SELECT change_type FROM belief_changes WHERE belief_id = ?1 ORDER BY id DESC LIMIT 1",
                params![old],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(change_type, "contradicted");
    }

    #[test]
    fn contradiction_against_strongly_evidenced_belief_weakens_it() {
        let mut conn = test_db();
        let old_embedding = vec![0.78, 0.6247, 0.0, 0.0];
        let old = seed_belief(&conn, "standups happen at nine", &old_embedding, 3);

        let llm = ScriptedLlm::new(&[&extraction_json("standups happen at ten"), "1"])
            .with_embedding("ten", vec![1.0, 0.0, 0.0, 0.0]);

        let outcome =
            remember(&mut conn, &llm, "standup moved to ten", &config(), "owner").unwrap();

        assert!(outcome.weakened);
        let new_id = outcome.belief_id.unwrap();

        let old_belief = store::get_belief(&conn, &old).unwrap().unwrap();
        // Strongly evidenced: stays active, confidence strictly reduced,
        // supersession recorded anyway
        assert_eq!(old_belief.status, BeliefStatus::Active);
        assert!((old_belief.confidence - 0.7).abs() < 1e-9);
        assert_eq!(old_belief.superseded_by.as_deref(), Some(new_id.as_str()));

        let change_type: String = conn
            .query_row(
                "SELECT change_type FROM belief_changes WHERE belief_id = ?1 ORDER BY id DESC LIMIT 1",
                params![old],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(change_type, "weakened");
    }

    #[test]
    fn weakening_a_zero_confidence_belief_stays_in_range() {
        let mut conn = test_db();
        let old_embedding = vec![0.78, 0.6247, 0.0, 0.0];
        let old = seed_belief(&conn, "the cache is disabled", &old_embedding, 3);
        store::set_confidence(&conn, &old, 0.0).unwrap();

        let llm = ScriptedLlm::new(&[&extraction_json("the cache is enabled"), "1"])
            .with_embedding("enabled", vec![1.0, 0.0, 0.0, 0.0]);

        let outcome =
            remember(&mut conn, &llm, "cache turned back on", &config(), "owner").unwrap();

        assert!(outcome.weakened);
        let old_belief = store::get_belief(&conn, &old).unwrap().unwrap();
        assert_eq!(old_belief.status, BeliefStatus::Active);
        assert!(old_belief.confidence >= 0.0);
        assert!((old_belief.confidence - 0.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_verdict_means_no_contradiction() {
        let mut conn = test_db();
        let old_embedding = vec![0.78, 0.6247, 0.0, 0.0];
        let old = seed_belief(&conn, "lunch is at noon", &old_embedding, 1);

        let llm = ScriptedLlm::new(&[&extraction_json("dinner is at seven"), "9"])
            .with_embedding("dinner", vec![1.0, 0.0, 0.0, 0.0]);

        let outcome =
            remember(&mut conn, &llm, "dinner at seven", &config(), "owner").unwrap();

        assert!(outcome.contradicted_belief_id.is_none());
        let old_belief = store::get_belief(&conn, &old).unwrap().unwrap();
        assert_eq!(old_belief.status, BeliefStatus::Active);
        assert!(old_belief.superseded_by.is_none());
        // New belief was still created
        assert!(outcome.belief_id.is_some());
    }

    #[test]
    fn low_similarity_creates_belief_without_contradiction_check() {
        let mut conn = test_db();
        seed_belief(&conn, "unrelated topic", &[0.0, 0.0, 1.0, 0.0], 1);

        // Only one scripted reply: a second (contradiction) call would fail
        let llm = ScriptedLlm::new(&[&extraction_json("a brand new fact")]);

        let outcome =
            remember(&mut conn, &llm, "something new", &config(), "owner").unwrap();
        assert!(!outcome.is_reinforcement);
        assert!(outcome.contradicted_belief_id.is_none());

        let new_belief = store::get_belief(&conn, outcome.belief_id.as_deref().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(new_belief.statement, "a brand new fact");
        assert_eq!(new_belief.importance, 6);
    }

    #[test]
    fn freeform_reply_falls_back_to_factual_belief() {
        let mut conn = test_db();
        let llm = ScriptedLlm::new(&["the user enjoys gardening on weekends"]);

        let outcome =
            remember(&mut conn, &llm, "talked about gardening", &config(), "owner").unwrap();

        let belief = store::get_belief(&conn, outcome.belief_id.as_deref().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(belief.statement, "the user enjoys gardening on weekends");
        assert_eq!(belief.belief_type, BeliefType::Factual);
        assert_eq!(belief.importance, 5);
    }

    #[test]
    fn insight_field_is_not_persisted() {
        let mut conn = test_db();
        let reply = r#"{"fact": "prefers dark mode", "fact_type": "preference", "importance": 4, "insight": "user cares about ergonomics"}"#;
        let llm = ScriptedLlm::new(&[reply]);

        remember(&mut conn, &llm, "switched to dark mode", &config(), "owner").unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM beliefs", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let statement: String = conn
            .query_row("SELECT statement FROM beliefs", [], |r| r.get(0))
            .unwrap();
        assert_eq!(statement, "prefers dark mode");
    }

    #[test]
    fn embedding_failure_still_creates_episode_and_belief() {
        let mut conn = test_db();
        let mut llm = ScriptedLlm::new(&[&extraction_json("resilient fact")]);
        llm.fail_embed = true;

        let outcome = remember(&mut conn, &llm, "observed it", &config(), "owner").unwrap();

        assert!(store::get_episode(&conn, &outcome.episode_id).unwrap().is_some());
        let belief_id = outcome.belief_id.unwrap();
        assert!(store::get_belief(&conn, &belief_id).unwrap().is_some());

        // No vectors were stored
        let vec_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM belief_embeddings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(vec_count, 0);
    }

    #[test]
    fn chat_failure_propagates_but_episode_persists() {
        let mut conn = test_db();
        let mut llm = ScriptedLlm::new(&[]);
        llm.fail_chat = true;

        let result = remember(&mut conn, &llm, "doomed observation", &config(), "owner");
        assert!(result.is_err());

        let episode_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM episodes", [], |r| r.get(0))
            .unwrap();
        assert_eq!(episode_count, 1);
    }

    #[test]
    fn parse_extraction_variants() {
        match parse_extraction("```json\n{\"fact\": \"x\", \"importance\": 3}\n```") {
            Extraction::Structured { fact, importance, .. } => {
                assert_eq!(fact, "x");
                assert_eq!(importance, 3);
            }
            other => panic!("expected structured, got {other:?}"),
        }
        match parse_extraction("just a sentence") {
            Extraction::Freeform(text) => assert_eq!(text, "just a sentence"),
            other => panic!("expected freeform, got {other:?}"),
        }
    }

    #[test]
    fn parse_contradiction_index_bounds() {
        assert_eq!(parse_contradiction_index("2", 3), Some(1));
        assert_eq!(parse_contradiction_index("Belief 3 is contradicted", 3), Some(2));
        assert_eq!(parse_contradiction_index("NONE", 3), None);
        assert_eq!(parse_contradiction_index("0", 3), None);
        assert_eq!(parse_contradiction_index("4", 3), None);
        assert_eq!(parse_contradiction_index("", 3), None);
    }
}
