//! Crate-wide constants.
//!
//! Centralises the environment variable name, default model identifiers,
//! and default directory layout so a change only touches this file.

/// Optional project config filename, looked up in the project root.
pub const CONFIG_FILENAME: &str = "evalcfg.toml";

// ── Environment variable names ──────────────────────────────────────

/// Hugging Face router key, shared by the test and judge models.
pub const ENV_HF_API_KEY: &str = "HF_API_KEY";

// ── Models ──────────────────────────────────────────────────────────

pub const DEFAULT_TEST_ALIAS: &str = "deepseek";
pub const DEFAULT_TEST_MODEL: &str = "deepseek-ai/DeepSeek-V3.1:novita";
pub const DEFAULT_JUDGE_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";

// ── Directory layout ────────────────────────────────────────────────
//
// Relative to the caller's working directory (the notebooks directory).

pub const DEFAULT_PROCESSED_DATASET_DIR: &str = "../data/processed";
pub const RESPONSE_ROOT: &str = "../data/output/response";
pub const EVALUATION_ROOT: &str = "../data/output/evaluation";
