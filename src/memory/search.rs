//! Retrieval engine: lexical keyword search, semantic multi-factor ranking,
//! one-hop link expansion, and the composed recall entry point.
//!
//! The semantic path scores every active embedded belief with a weighted sum
//! of cosine similarity, importance, recency, stability, and subject match,
//! behind a hard cosine floor. Everything returned is "touched" in one batch,
//! which is the engine's only positive feedback on decay rate.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashSet;

use crate::config::RetrievalConfig;
use crate::llm::LlmClient;
use crate::memory::decay;
use crate::memory::store;
use crate::memory::types::{Belief, BeliefType};

// Semantic ranking weights.
const W_SIMILARITY: f64 = 0.50;
const W_IMPORTANCE: f64 = 0.20;
const W_RECENCY: f64 = 0.10;
const W_STABILITY: f64 = 0.05;
const W_SUBJECT: f64 = 0.15;
/// Recency falls off as exp(-RATE × days) — roughly a 30-day half-life.
const RECENCY_RATE: f64 = 0.023;

/// Words with operator meaning in FTS boolean syntax, stripped from queries.
const RESERVED_WORDS: &[&str] = &["and", "or", "not", "near"];

/// Fixed English stop-word list applied to lexical queries.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "to", "of",
    "in", "on", "at", "for", "with", "about", "my", "me", "i", "you", "it",
    "this", "that", "what", "which", "who", "how", "do", "does", "did",
];

/// A single retrieval result. `confidence` is always the effective (decayed)
/// value, never the raw stored one.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub statement: String,
    #[serde(rename = "type")]
    pub belief_type: String,
    pub subject: String,
    pub confidence: f64,
    pub score: f64,
    pub created_at: String,
}

/// Which path produced the recall results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallMode {
    Semantic,
    Lexical,
    None,
}

/// Response from [`recall`].
#[derive(Debug, Serialize)]
pub struct RecallResponse {
    pub results: Vec<SearchResult>,
    pub mode: RecallMode,
    /// Embedding rows that failed to decode during the semantic scan.
    pub skipped_malformed: usize,
}

fn result_from_belief(belief: &Belief, score: f64) -> SearchResult {
    SearchResult {
        id: belief.id.clone(),
        statement: belief.statement.clone(),
        belief_type: belief.belief_type.as_str().to_string(),
        subject: belief.subject.clone(),
        confidence: decay::effective_confidence_at(
            belief.confidence,
            &belief.updated_at,
            belief.stability,
        ),
        score,
        created_at: belief.created_at.clone(),
    }
}

// ── Lexical search ────────────────────────────────────────────────────────────

/// Keyword search over active belief statements via the FTS index.
///
/// Tokens are OR-combined so any match qualifies; ranking is the index's
/// native relevance order.
pub fn lexical_search(
    conn: &Connection,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    let match_expr = build_match_expression(query);
    if match_expr.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT beliefs.id, beliefs_fts.rank \
         FROM beliefs_fts JOIN beliefs ON beliefs_fts.id = beliefs.id \
         WHERE beliefs_fts MATCH ?1 AND beliefs.status = 'active' \
         ORDER BY beliefs_fts.rank LIMIT ?2",
    )?;
    let ranked: Vec<(String, f64)> = stmt
        .query_map(params![match_expr, limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut results = Vec::with_capacity(ranked.len());
    for (id, rank) in ranked {
        if let Some(belief) = store::get_belief(conn, &id)? {
            // FTS rank is negative (more negative = better); negate for a
            // higher-is-better score
            results.push(result_from_belief(&belief, -rank));
        }
    }
    Ok(results)
}

/// Build an OR-combined FTS MATCH expression from a free-text query.
///
/// Strips boolean-operator reserved words and common stop words, removes
/// embedded quotes, and wraps each surviving token in double quotes.
fn build_match_expression(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .replace('"', "")
                .to_lowercase()
        })
        .filter(|w| {
            !w.is_empty() && !RESERVED_WORDS.contains(&w.as_str()) && !STOP_WORDS.contains(&w.as_str())
        })
        .map(|w| format!("\"{w}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}

// ── Semantic search ───────────────────────────────────────────────────────────

/// Multi-factor semantic search against every active embedded belief.
///
/// Candidates below the raw cosine floor are discarded regardless of the
/// composite score. The top results are expanded one hop through belief
/// links, and everything returned is touched in a single batch.
pub fn semantic_search(
    conn: &Connection,
    query_embedding: &[f32],
    query_text: &str,
    config: &RetrievalConfig,
    default_subject: &str,
) -> Result<RecallResponse> {
    let (candidates, skipped_malformed) = store::load_active_embeddings(conn, None)?;
    let query_lower = query_text.to_lowercase();

    let mut scored: Vec<(Belief, f64)> = Vec::new();
    for candidate in candidates {
        let similarity = crate::memory::cosine_similarity(query_embedding, &candidate.embedding);
        if similarity < config.similarity_floor {
            continue;
        }
        let score = composite_score(&candidate.belief, similarity, &query_lower, default_subject, config);
        scored.push((candidate.belief, score));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(config.max_results);

    let mut results: Vec<SearchResult> = scored
        .iter()
        .map(|(belief, score)| result_from_belief(belief, *score))
        .collect();

    expand_links(conn, &mut results, config)?;

    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    store::touch_beliefs(conn, &ids)?;

    let mode = if results.is_empty() {
        RecallMode::None
    } else {
        RecallMode::Semantic
    };
    Ok(RecallResponse {
        results,
        mode,
        skipped_malformed,
    })
}

/// Weighted sum of ranking factors, with the insight penalty applied last.
fn composite_score(
    belief: &Belief,
    similarity: f64,
    query_lower: &str,
    default_subject: &str,
    config: &RetrievalConfig,
) -> f64 {
    let importance = f64::from(belief.importance) / 10.0;

    let reference = belief
        .last_accessed
        .as_deref()
        .unwrap_or(&belief.updated_at);
    let days = decay::days_since(reference).unwrap_or(0.0);
    let recency = (-RECENCY_RATE * days).exp();

    let stability_bonus = (belief.stability / store::MAX_STABILITY).min(1.0);

    let subject_lower = belief.subject.to_lowercase();
    let subject_match = if belief.subject != default_subject
        && !subject_lower.is_empty()
        && query_lower.contains(&subject_lower)
    {
        1.0
    } else {
        0.0
    };

    let mut score = W_SIMILARITY * similarity
        + W_IMPORTANCE * importance
        + W_RECENCY * recency
        + W_STABILITY * stability_bonus
        + W_SUBJECT * subject_match;

    if belief.belief_type == BeliefType::Insight {
        score *= config.insight_penalty;
    }
    score
}

/// One-hop graph expansion: neighbors of the top results, scored at a
/// fraction of their linking result's score, appended up to the limit.
fn expand_links(
    conn: &Connection,
    results: &mut Vec<SearchResult>,
    config: &RetrievalConfig,
) -> Result<()> {
    let mut seen: HashSet<String> = results.iter().map(|r| r.id.clone()).collect();
    let top: Vec<(String, f64)> = results
        .iter()
        .take(config.expand_top)
        .map(|r| (r.id.clone(), r.score))
        .collect();

    for (anchor_id, anchor_score) in top {
        if results.len() >= config.max_results {
            break;
        }
        for neighbor_id in store::linked_belief_ids(conn, &anchor_id)? {
            if results.len() >= config.max_results {
                break;
            }
            if !seen.insert(neighbor_id.clone()) {
                continue;
            }
            let Some(neighbor) = store::get_belief(conn, &neighbor_id)? else {
                continue;
            };
            if neighbor.status != crate::memory::types::BeliefStatus::Active {
                continue;
            }
            results.push(result_from_belief(
                &neighbor,
                anchor_score * config.link_expansion_factor,
            ));
        }
    }
    Ok(())
}

// ── Composed recall ───────────────────────────────────────────────────────────

/// Retrieve the most relevant active beliefs for a query.
///
/// Prefers the semantic path; falls back to lexical search when the query
/// cannot be embedded or semantic search yields nothing. An empty lexical
/// result means there are no relevant beliefs.
pub fn recall(
    conn: &Connection,
    llm: &dyn LlmClient,
    query: &str,
    config: &RetrievalConfig,
    default_subject: &str,
) -> Result<RecallResponse> {
    match llm.embed(query) {
        Ok(embedding) => {
            let response = semantic_search(conn, &embedding, query, config, default_subject)?;
            if !response.results.is_empty() {
                return Ok(response);
            }
            let results = lexical_search(conn, query, config.max_results)?;
            let mode = if results.is_empty() {
                RecallMode::None
            } else {
                RecallMode::Lexical
            };
            Ok(RecallResponse {
                results,
                mode,
                skipped_malformed: response.skipped_malformed,
            })
        }
        Err(err) => {
            tracing::warn!(%err, "query embedding failed, falling back to lexical search");
            let results = lexical_search(conn, query, config.max_results)?;
            let mode = if results.is_empty() {
                RecallMode::None
            } else {
                RecallMode::Lexical
            };
            Ok(RecallResponse {
                results,
                mode,
                skipped_malformed: 0,
            })
        }
    }
}
