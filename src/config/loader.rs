//! Config structs and loading logic.
//!
//! Priority (highest to lowest):
//! 1. Environment variables (`HF_API_KEY`)
//! 2. `evalcfg.toml` in the project root
//! 3. Built-in defaults
//!
//! API keys only ever come from the environment. A missing key resolves to
//! the empty string; callers that need one use [`Config::require_api_key`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{
    CONFIG_FILENAME, DEFAULT_JUDGE_MODEL, DEFAULT_PROCESSED_DATASET_DIR, DEFAULT_TEST_ALIAS,
    DEFAULT_TEST_MODEL, ENV_HF_API_KEY,
};
use crate::env::Env;
use crate::models::{ModelDescriptor, ModelOutputDirs};

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{var} is not set; export it before calling the inference API")]
    MissingApiKey { var: &'static str },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub test: TestModelsConfig,
    pub judge: JudgeModelConfig,
    pub directories: DirectoryLayout,
}

/// Models under test.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestModelsConfig {
    #[serde(skip_deserializing)]
    pub api_key: String,
    pub models: Vec<ModelDescriptor>,
}

impl Default for TestModelsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            models: default_test_models(),
        }
    }
}

impl std::fmt::Debug for TestModelsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestModelsConfig")
            .field("api_key", &redact(&self.api_key))
            .field("models", &self.models)
            .finish()
    }
}

impl TestModelsConfig {
    /// Look up a model under test by alias. First match wins.
    pub fn find(&self, alias: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.alias == alias)
    }

    /// Aliases that appear more than once, each reported once, in order of
    /// their second occurrence.
    pub fn duplicate_aliases(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut dups = Vec::new();
        for m in &self.models {
            let alias = m.alias.as_str();
            if !seen.insert(alias) && reported.insert(alias) {
                dups.push(alias);
            }
        }
        dups
    }
}

/// Judge model used by the evaluation pipeline.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeModelConfig {
    #[serde(skip_deserializing)]
    pub api_key: String,
    pub model_name: String,
}

impl Default for JudgeModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_name: DEFAULT_JUDGE_MODEL.to_string(),
        }
    }
}

impl std::fmt::Debug for JudgeModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeModelConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model_name", &self.model_name)
            .finish()
    }
}

/// Where processed datasets live and where each model's outputs go.
///
/// Serializes flat: `processed_dataset_dir` sits next to one table per
/// model alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryLayout {
    #[serde(default = "default_processed_dataset_dir")]
    pub processed_dataset_dir: String,
    #[serde(flatten)]
    pub models: IndexMap<String, ModelOutputDirs>,
}

impl Default for DirectoryLayout {
    fn default() -> Self {
        let mut models = IndexMap::new();
        models.insert(
            DEFAULT_TEST_ALIAS.to_string(),
            ModelOutputDirs::conventional(DEFAULT_TEST_ALIAS),
        );
        Self {
            processed_dataset_dir: default_processed_dataset_dir(),
            models,
        }
    }
}

impl DirectoryLayout {
    /// Output directories for a model alias.
    pub fn model(&self, alias: &str) -> Option<&ModelOutputDirs> {
        self.models.get(alias)
    }

    /// Aliases with an output entry, in declaration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Give every model without an explicit entry the conventional layout.
    fn fill_conventional(&mut self, models: &[ModelDescriptor]) {
        for m in models {
            if !self.models.contains_key(&m.alias) {
                debug!(alias = %m.alias, "using conventional output directories");
                self.models
                    .insert(m.alias.clone(), ModelOutputDirs::conventional(&m.alias));
            }
        }
    }
}

/// JSON export shape, keyed the way pipeline notebooks expect.
#[derive(Serialize)]
struct Export<'a> {
    llm_test_config: &'a TestModelsConfig,
    llm_judge_config: &'a JudgeModelConfig,
    directory_data: &'a DirectoryLayout,
}

impl Config {
    /// Build the configuration from built-in defaults and the environment.
    ///
    /// Never fails: an unset `HF_API_KEY` becomes the empty string.
    pub fn from_env(env: &Env) -> Self {
        let mut config = Config::default();
        config.apply_env_vars(env);
        config.warn_duplicate_aliases();
        config
    }

    /// Load configuration with proper layering.
    ///
    /// Reads `evalcfg.toml` from `project_root` when present, then applies
    /// environment variables.
    pub fn load(project_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 2: project config
        if let Some(root) = project_root {
            let path = root.join(CONFIG_FILENAME);
            if path.exists() {
                debug!(path = %path.display(), "applying project config");
                let file = Self::load_file(&path)?;
                config.merge(file);
            }
        }
        config.directories.fill_conventional(&config.test.models);

        // Layer 1: environment variables
        config.apply_env_vars(env);
        config.warn_duplicate_aliases();

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        if other.test.models != default_test_models() {
            self.test.models = other.test.models;
        }
        if other.judge.model_name != DEFAULT_JUDGE_MODEL {
            self.judge.model_name = other.judge.model_name;
        }
        if other.directories.processed_dataset_dir != DEFAULT_PROCESSED_DATASET_DIR {
            self.directories.processed_dataset_dir = other.directories.processed_dataset_dir;
        }
        for (alias, dirs) in other.directories.models {
            self.directories.models.insert(alias, dirs);
        }
    }

    /// Apply environment variable overrides.
    ///
    /// The test and judge models share the same router key.
    fn apply_env_vars(&mut self, env: &Env) {
        if !env.is_set(ENV_HF_API_KEY) {
            debug!("{ENV_HF_API_KEY} is not set; using an empty API key");
        }
        let api_key = env.var_or_empty(ENV_HF_API_KEY);
        self.judge.api_key = api_key.clone();
        self.test.api_key = api_key;
    }

    fn warn_duplicate_aliases(&self) {
        for alias in self.test.duplicate_aliases() {
            warn!(alias, "duplicate model alias; its output directories are shared");
        }
    }

    /// Whether a non-empty API key was resolved.
    pub fn has_api_key(&self) -> bool {
        !self.test.api_key.is_empty()
    }

    /// The resolved API key, or an error when it is empty.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.has_api_key() {
            Ok(&self.test.api_key)
        } else {
            Err(ConfigError::MissingApiKey {
                var: ENV_HF_API_KEY,
            })
        }
    }

    /// Render as pretty JSON with `llm_test_config`, `llm_judge_config`
    /// and `directory_data` at the top level. Includes the API key.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        let export = Export {
            llm_test_config: &self.test,
            llm_judge_config: &self.judge,
            directory_data: &self.directories,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

fn default_test_models() -> Vec<ModelDescriptor> {
    vec![ModelDescriptor::new(DEFAULT_TEST_ALIAS, DEFAULT_TEST_MODEL)]
}

fn default_processed_dataset_dir() -> String {
    DEFAULT_PROCESSED_DATASET_DIR.to_string()
}

fn redact(key: &str) -> &str {
    if key.is_empty() { "" } else { "[REDACTED]" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Variant;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.test.api_key, "");
        assert_eq!(
            config.test.models,
            vec![ModelDescriptor::new(
                "deepseek",
                "deepseek-ai/DeepSeek-V3.1:novita"
            )]
        );
        assert_eq!(config.judge.model_name, "meta-llama/Meta-Llama-3.1-8B-Instruct");
        assert_eq!(config.directories.processed_dataset_dir, "../data/processed");
    }

    #[test]
    fn from_env_without_key_uses_empty_string() {
        let config = Config::from_env(&Env::empty());
        assert_eq!(config.test.api_key, "");
        assert_eq!(config.judge.api_key, "");
        assert!(!config.has_api_key());
    }

    #[test]
    fn from_env_with_key_sets_both_records() {
        let env = Env::from_vars([("HF_API_KEY", "hf_secret")]);
        let config = Config::from_env(&env);
        assert_eq!(config.test.api_key, "hf_secret");
        assert_eq!(config.judge.api_key, "hf_secret");
        assert!(config.has_api_key());
    }

    #[test]
    fn from_env_is_idempotent() {
        let env = Env::from_vars([("HF_API_KEY", "hf_secret")]);
        assert_eq!(Config::from_env(&env), Config::from_env(&env));
    }

    #[test]
    fn default_layout_has_deepseek_entry() {
        let layout = DirectoryLayout::default();
        let deepseek = layout.model("deepseek").unwrap();
        assert_eq!(
            deepseek.baseline.response_dir,
            "../data/output/response/deepseek/baseline"
        );
        assert_eq!(
            deepseek.get(Variant::Mitigation).eval_dir,
            "../data/output/evaluation/deepseek/mitigation"
        );
        assert_eq!(layout.aliases().collect::<Vec<_>>(), vec!["deepseek"]);
    }

    #[test]
    fn find_model_by_alias() {
        let config = Config::default();
        assert_eq!(
            config.test.find("deepseek").unwrap().model_name,
            "deepseek-ai/DeepSeek-V3.1:novita"
        );
        assert!(config.test.find("gemma").is_none());
    }

    #[test]
    fn duplicate_aliases_reported_once() {
        let test = TestModelsConfig {
            api_key: String::new(),
            models: vec![
                ModelDescriptor::new("a", "m1"),
                ModelDescriptor::new("b", "m2"),
                ModelDescriptor::new("a", "m3"),
                ModelDescriptor::new("a", "m4"),
            ],
        };
        assert_eq!(test.duplicate_aliases(), vec!["a"]);
        assert!(Config::default().test.duplicate_aliases().is_empty());
    }

    #[test]
    fn require_api_key_missing() {
        let config = Config::from_env(&Env::empty());
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { var: "HF_API_KEY" }));
        assert!(err.to_string().contains("HF_API_KEY"));
    }

    #[test]
    fn require_api_key_present() {
        let config = Config::from_env(&Env::from_vars([("HF_API_KEY", "hf_x")]));
        assert_eq!(config.require_api_key().unwrap(), "hf_x");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = Config::from_env(&Env::from_vars([("HF_API_KEY", "hf_topsecret")]));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hf_topsecret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[test]
models = [
    { alias = "deepseek", model_name = "deepseek-ai/DeepSeek-V3.1:novita" },
    { alias = "gemma", model_name = "google/gemma-2-9b-it:nebius" },
]

[judge]
model_name = "Qwen/Qwen2.5-7B-Instruct"

[directories]
processed_dataset_dir = "data/processed"

[directories.gemma.baseline]
response_dir = "out/gemma/b/r"
eval_dir = "out/gemma/b/e"

[directories.gemma.mitigation]
response_dir = "out/gemma/m/r"
eval_dir = "out/gemma/m/e"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.test.models.len(), 2);
        assert_eq!(config.test.models[1].alias, "gemma");
        assert_eq!(config.judge.model_name, "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(config.directories.processed_dataset_dir, "data/processed");
        assert_eq!(
            config.directories.model("gemma").unwrap().mitigation.eval_dir,
            "out/gemma/m/e"
        );
    }

    #[test]
    fn parse_toml_ignores_api_key() {
        let toml_str = r#"
[test]
api_key = "from-file"

[judge]
api_key = "from-file"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.test.api_key, "");
        assert_eq!(config.judge.api_key, "");
    }

    #[test]
    fn merge_overrides_non_default_values() {
        let mut base = Config::default();
        let mut other = Config::default();
        other.test.models = vec![ModelDescriptor::new("gemma", "google/gemma-2-9b-it:nebius")];
        other.judge.model_name = "judge-x".to_string();
        other.directories.processed_dataset_dir = "elsewhere".to_string();
        other
            .directories
            .models
            .insert("gemma".to_string(), ModelOutputDirs::conventional("gemma"));

        base.merge(other);

        assert_eq!(base.test.models[0].alias, "gemma");
        assert_eq!(base.judge.model_name, "judge-x");
        assert_eq!(base.directories.processed_dataset_dir, "elsewhere");
        assert_eq!(
            base.directories.aliases().collect::<Vec<_>>(),
            vec!["deepseek", "gemma"]
        );
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = Config::default();
        base.judge.model_name = "custom-judge".to_string();
        base.directories.processed_dataset_dir = "custom".to_string();

        base.merge(Config::default());

        assert_eq!(base.judge.model_name, "custom-judge");
        assert_eq!(base.directories.processed_dataset_dir, "custom");
    }

    #[test]
    fn fill_conventional_only_adds_missing() {
        let mut layout = DirectoryLayout::default();
        let custom = ModelOutputDirs {
            baseline: crate::models::OutputDirs {
                response_dir: "r".to_string(),
                eval_dir: "e".to_string(),
            },
            mitigation: crate::models::OutputDirs::conventional("deepseek", Variant::Mitigation),
        };
        layout.models.insert("deepseek".to_string(), custom.clone());
        layout.fill_conventional(&[
            ModelDescriptor::new("deepseek", "d"),
            ModelDescriptor::new("gemma", "g"),
        ]);
        assert_eq!(layout.model("deepseek"), Some(&custom));
        assert_eq!(
            layout.model("gemma"),
            Some(&ModelOutputDirs::conventional("gemma"))
        );
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let result = Config::load_file(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[test]
    fn load_file_not_found() {
        let result = Config::load_file(Path::new("/tmp/evalcfg_not_exist_config.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("read"));
    }

    #[test]
    fn load_without_project_root_matches_from_env() {
        let env = Env::from_vars([("HF_API_KEY", "hf_k")]);
        let loaded = Config::load(None, &env).unwrap();
        assert_eq!(loaded, Config::from_env(&env));
    }

    #[test]
    fn to_json_has_top_level_records() {
        let config = Config::from_env(&Env::from_vars([("HF_API_KEY", "hf_k")]));
        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(json["llm_test_config"]["api_key"], "hf_k");
        assert_eq!(json["llm_test_config"]["models"][0]["alias"], "deepseek");
        assert_eq!(
            json["llm_judge_config"]["model_name"],
            "meta-llama/Meta-Llama-3.1-8B-Instruct"
        );
        assert_eq!(json["directory_data"]["processed_dataset_dir"], "../data/processed");
        assert_eq!(
            json["directory_data"]["deepseek"]["baseline"]["response_dir"],
            "../data/output/response/deepseek/baseline"
        );
    }
}
