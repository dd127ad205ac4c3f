//! Linter configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use draftlint_rules::{BuiltinOptions, RuleSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LinterError;

use jsonschema::Validator;
use std::sync::OnceLock;

/// Configuration file name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".draftlint.json";

/// Default debounce delay in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Configuration for the linter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterConfig {
    /// Whether to reuse results from previous runs.
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Cache directory, relative to the workspace root.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Rule id to enabled flag. Rules not listed are enabled.
    #[serde(default)]
    pub rules: BTreeMap<String, bool>,

    /// Minimum number of sentences per section.
    #[serde(default = "default_min_section_sentences")]
    pub min_section_sentences: usize,

    /// Model-backed review settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<ReviewerConfig>,

    /// Delay before an automatic run starts.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_cache() -> bool {
    true
}

fn default_cache_dir() -> String {
    ".draftlint-cache".to_string()
}

fn default_min_section_sentences() -> usize {
    BuiltinOptions::default().min_section_sentences
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Settings that shape reviewer output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerConfig {
    /// Provider name, used as the diagnostic `source`.
    pub provider: String,

    /// Model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Review mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ReviewerConfig {
    /// Signature of these settings. Cached review results produced under a
    /// different signature are discarded.
    pub fn signature(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

impl LinterConfig {
    /// Creates a configuration with every default.
    pub fn new() -> Self {
        Self {
            cache: true,
            cache_dir: default_cache_dir(),
            rules: BTreeMap::new(),
            min_section_sentences: default_min_section_sentences(),
            reviewer: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            base_dir: None,
        }
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LinterError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| LinterError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Loads `.draftlint.json` from `workspace`, or the defaults if there is
    /// none.
    pub fn discover(workspace: impl AsRef<Path>) -> Result<Self, LinterError> {
        let workspace = workspace.as_ref();
        let path = workspace.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        debug!("No config in {}, using defaults", workspace.display());
        Ok(Self {
            base_dir: Some(workspace.to_path_buf()),
            ..Self::new()
        })
    }

    /// Parses configuration from JSON string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, LinterError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| LinterError::config(format!("Invalid JSON: {}", e)))?;

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(LinterError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| LinterError::config(format!("Invalid config: {}", e)))
    }

    /// Returns whether a rule is enabled.
    pub fn is_rule_enabled(&self, id: &str) -> bool {
        self.rules.get(id).copied().unwrap_or(true)
    }

    /// Built-in rules, filtered by the `rules` map.
    pub fn rule_set(&self) -> RuleSet {
        let mut rules = RuleSet::builtin(&BuiltinOptions {
            min_section_sentences: self.min_section_sentences,
        });
        rules.retain(|id| self.is_rule_enabled(id));
        rules
    }

    /// Absolute cache directory for a workspace.
    pub fn cache_path(&self, workspace: impl AsRef<Path>) -> PathBuf {
        workspace.as_ref().join(&self.cache_dir)
    }

    /// Signature of the settings that shape deterministic findings: the
    /// ids of the rules that run and the rule options. Cache, scheduling
    /// and reviewer settings are not part of it.
    pub fn logic_signature(&self, rule_ids: &[&str]) -> String {
        let shape = serde_json::json!({
            "rules": rule_ids,
            "minSectionSentences": self.min_section_sentences,
        });
        blake3::hash(shape.to_string().as_bytes()).to_hex().to_string()
    }
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self::new()
    }
}
