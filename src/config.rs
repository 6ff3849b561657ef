use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TenetConfig {
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub formation: FormationConfig,
    pub retrieval: RetrievalConfig,
    pub maintenance: MaintenanceConfig,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// Subject a belief concerns when the extraction names none.
    pub default_subject: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub chat_model: String,
    pub embed_model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
}

/// Knobs for the `remember` pipeline.
///
/// The similarity bands are deliberately tunable: near-identical statements
/// reinforce, topically-close ones go through a contradiction check, anything
/// below that creates a fresh belief.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FormationConfig {
    /// Cosine similarity at or above which a new fact reinforces the match.
    pub reinforce_threshold: f64,
    /// Cosine similarity at or above which the match is contradiction-checked.
    pub contradiction_threshold: f64,
    /// Confidence added on reinforcement, capped at 1.0.
    pub reinforce_boost: f64,
    /// Multiplier applied to a strongly-evidenced belief's confidence when it
    /// is contradicted but kept active.
    pub weaken_factor: f64,
    /// Supporting-episode count at which a contradicted belief is weakened
    /// instead of invalidated.
    pub min_supporting_episodes: u32,
    /// How many in-band candidates the contradiction check lists.
    pub contradiction_candidates: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub max_results: usize,
    /// Hard relevance floor on raw cosine similarity.
    pub similarity_floor: f64,
    /// Score multiplier for neighbors pulled in via belief links.
    pub link_expansion_factor: f64,
    /// How many top results get their link neighbors expanded.
    pub expand_top: usize,
    /// Score multiplier for beliefs of type `insight`.
    pub insight_penalty: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// How many recently-updated beliefs reflection scans.
    pub reflect_window: usize,
    /// Pairwise cosine similarity at which beliefs cluster as duplicates.
    pub duplicate_threshold: f64,
    /// Effective confidence below which a belief is reported stale.
    pub stale_threshold: f64,
    /// Looser similarity used to find thematic clusters for synthesis.
    pub synthesis_threshold: f64,
    pub synthesis_max_clusters: usize,
    pub synthesis_min_cluster_size: usize,
    /// Stability assigned to synthesized meta-beliefs.
    pub synthesis_stability: f64,
    /// How many recently-updated beliefs the contradiction scan covers.
    pub scan_window: usize,
    /// Lower/upper cosine band for comparable-but-not-duplicate pairs.
    pub scan_band_low: f64,
    pub scan_band_high: f64,
    /// Cap on pairs sent to the LLM in one scan.
    pub scan_max_pairs: usize,
}

impl Default for TenetConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            llm: LlmConfig::default(),
            formation: FormationConfig::default(),
            retrieval: RetrievalConfig::default(),
            maintenance: MaintenanceConfig::default(),
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_tenet_dir()
            .join("beliefs.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            default_subject: "owner".into(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key_env: "TENET_API_KEY".into(),
            chat_model: "gpt-4o-mini".into(),
            embed_model: "text-embedding-3-small".into(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            reinforce_threshold: 0.93,
            contradiction_threshold: 0.70,
            reinforce_boost: 0.1,
            weaken_factor: 0.7,
            min_supporting_episodes: 3,
            contradiction_candidates: 5,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            similarity_floor: 0.2,
            link_expansion_factor: 0.8,
            expand_top: 3,
            insight_penalty: 0.5,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            reflect_window: 100,
            duplicate_threshold: 0.85,
            stale_threshold: 0.1,
            synthesis_threshold: 0.6,
            synthesis_max_clusters: 5,
            synthesis_min_cluster_size: 3,
            synthesis_stability: 3.0,
            scan_window: 200,
            scan_band_low: 0.4,
            scan_band_high: 0.85,
            scan_max_pairs: 20,
        }
    }
}

/// Returns `~/.tenet/`
pub fn default_tenet_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".tenet")
}

/// Returns the default config file path: `~/.tenet/config.toml`
pub fn default_config_path() -> PathBuf {
    default_tenet_dir().join("config.toml")
}

impl TenetConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TenetConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (TENET_DB, TENET_SUBJECT, TENET_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TENET_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TENET_SUBJECT") {
            self.storage.default_subject = val;
        }
        if let Ok(val) = std::env::var("TENET_LOG_LEVEL") {
            self.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
