//! Self-curating belief memory for AI agents.
//!
//! Tenet turns raw observations ("episodes") into durable, confidence-weighted
//! statements ("beliefs"), retrieves the most relevant beliefs for a query, and
//! keeps the belief set internally consistent as new, possibly contradictory,
//! evidence arrives.
//!
//! | Concept | Meaning |
//! |---------|---------|
//! | **Episode** | Immutable record of one observation |
//! | **Belief** | Persisted claim with decaying confidence and a lifecycle status |
//! | **Effective confidence** | Stored confidence decayed at read time (30-day base half-life) |
//! | **Stability** | Per-belief decay-rate modifier, grows with retrieval access |
//! | **Supersession** | Evidentiary link from an older belief to the one that replaced or weakened it |
//!
//! # Architecture
//!
//! - **Storage**: SQLite with FTS5 for keyword search; embedding vectors are
//!   stored as raw f32 blobs and scored in-process
//! - **Retrieval**: multi-factor semantic ranking (cosine, importance, recency,
//!   stability, subject match) with one-hop link expansion and lexical fallback
//! - **Formation**: observation → episode → extracted fact → reinforce /
//!   contradiction-resolve / create
//! - **Maintenance**: duplicate clustering and merge, meta-belief synthesis,
//!   pairwise contradiction scanning
//!
//! # Modules
//!
//! - [`cli`] — Thin command handlers for the `tenet` binary
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and migrations
//! - [`error`] — Typed error taxonomy for caller mistakes
//! - [`llm`] — Chat + embedding collaborator trait and HTTP implementation
//! - [`memory`] — Core engine: store, decay, search, formation, maintenance

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod memory;
