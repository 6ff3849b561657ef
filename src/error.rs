//! Typed errors for caller mistakes.
//!
//! Collaborator failures (LLM, embedding, database I/O) flow as plain
//! [`anyhow::Error`]s; this enum covers the cases a caller can act on —
//! bad identifiers, bad import payloads, undecodable stored vectors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    /// No active belief matches the given id or id prefix.
    #[error("belief not found: {0}")]
    NotFound(String),

    /// More than one active belief matches the given id prefix — the caller
    /// must supply more characters.
    #[error("ambiguous belief id prefix '{prefix}': {matches} active beliefs match")]
    AmbiguousPrefix { prefix: String, matches: usize },

    /// An import payload is missing a required array or declares an
    /// unsupported version.
    #[error("malformed import payload: {0}")]
    MalformedImport(String),

    /// A stored embedding blob failed to decode as an f32 vector.
    #[error("malformed embedding for {0}")]
    MalformedEmbedding(String),
}
