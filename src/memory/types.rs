//! Core belief-memory type definitions.
//!
//! Defines [`BeliefStatus`] (the lifecycle states), [`BeliefType`] (the claim
//! categories), [`ChangeType`] (audit-trail entries), and the record structs
//! matching the `beliefs`, `episodes`, and `belief_changes` tables.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a belief. Transitions are one-directional out of
/// `Active`; no code path reactivates a non-active belief.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeliefStatus {
    Active,
    Forgotten,
    Pruned,
    Invalidated,
}

impl BeliefStatus {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Forgotten => "forgotten",
            Self::Pruned => "pruned",
            Self::Invalidated => "invalidated",
        }
    }
}

impl std::fmt::Display for BeliefStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BeliefStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "forgotten" => Ok(Self::Forgotten),
            "pruned" => Ok(Self::Pruned),
            "invalidated" => Ok(Self::Invalidated),
            _ => Err(format!("unknown belief status: {s}")),
        }
    }
}

/// Category of claim a belief makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeliefType {
    /// Plain statements of fact.
    Factual,
    /// Likes, dislikes, habits of the subject.
    Preference,
    /// How-to knowledge and workflows.
    Procedural,
    /// System and design decisions.
    Architectural,
    /// Generic observations — deprioritized in ranking as noise.
    Insight,
    /// Synthesized general principles over thematic clusters.
    Meta,
}

impl BeliefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Preference => "preference",
            Self::Procedural => "procedural",
            Self::Architectural => "architectural",
            Self::Insight => "insight",
            Self::Meta => "meta",
        }
    }
}

impl std::fmt::Display for BeliefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BeliefType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "factual" => Ok(Self::Factual),
            "preference" => Ok(Self::Preference),
            "procedural" => Ok(Self::Procedural),
            "architectural" => Ok(Self::Architectural),
            "insight" => Ok(Self::Insight),
            "meta" => Ok(Self::Meta),
            _ => Err(format!("unknown belief type: {s}")),
        }
    }
}

/// Kind of mutation recorded in the append-only change log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Created,
    Reinforced,
    Weakened,
    Contradicted,
    Pruned,
    Forgotten,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Reinforced => "reinforced",
            Self::Weakened => "weakened",
            Self::Contradicted => "contradicted",
            Self::Pruned => "pruned",
            Self::Forgotten => "forgotten",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "reinforced" => Ok(Self::Reinforced),
            "weakened" => Ok(Self::Weakened),
            "contradicted" => Ok(Self::Contradicted),
            "pruned" => Ok(Self::Pruned),
            "forgotten" => Ok(Self::Forgotten),
            _ => Err(format!("unknown change type: {s}")),
        }
    }
}

/// A belief record, matching the `beliefs` table schema.
///
/// Optional fields carry serde defaults matching their creation defaults, so
/// older or hand-trimmed import payloads deserialize the way a fresh insert
/// would fill them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Belief {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// The claim this belief makes.
    pub statement: String,
    /// Stored, pre-decay confidence in `[0.0, 1.0]`. Read paths report the
    /// effective (decayed) value instead.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub status: BeliefStatus,
    #[serde(rename = "type")]
    pub belief_type: BeliefType,
    /// Importance in `[1, 10]`, default 5.
    #[serde(default = "default_importance")]
    pub importance: u8,
    /// Decay-rate modifier in `[1.0, 5.0]`; grows by 0.1 per retrieval access.
    #[serde(default = "default_stability")]
    pub stability: f64,
    /// Who or what the belief concerns; defaults to "owner".
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Number of times this belief has been returned in search results.
    #[serde(default)]
    pub access_count: u32,
    /// ISO 8601 timestamp of the last retrieval, or `None` if never accessed.
    #[serde(default)]
    pub last_accessed: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 timestamp of the last evidence-bearing mutation.
    pub updated_at: String,
    /// ID of the belief this one replaced or weakened, if any.
    #[serde(default)]
    pub supersedes: Option<String>,
    /// ID of the belief that replaced or weakened this one, if any. May be set
    /// while this belief is still active (evidentiary lineage, not status).
    #[serde(default)]
    pub superseded_by: Option<String>,
}

fn default_confidence() -> f64 {
    1.0
}

fn default_importance() -> u8 {
    5
}

fn default_stability() -> f64 {
    1.0
}

fn default_subject() -> String {
    "owner".to_string()
}

/// An immutable observation, matching the `episodes` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// UUID v7 primary key.
    pub id: String,
    /// ISO 8601 timestamp of the observation.
    pub timestamp: String,
    /// Optional free-text setting.
    #[serde(default)]
    pub context: Option<String>,
    /// Required summary of what happened.
    pub action: String,
    /// Optional result of the action.
    #[serde(default)]
    pub outcome: Option<String>,
    /// Ordered tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An append-only audit entry, matching the `belief_changes` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefChange {
    pub id: i64,
    pub belief_id: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub episode_id: Option<String>,
    pub created_at: String,
}
