//! Configuration records and layering.
//!
//! Handles `evalcfg.toml` loading, `HF_API_KEY` resolution, and the
//! built-in defaults for models and output directories.

pub mod loader;

pub use loader::{Config, ConfigError, DirectoryLayout, JudgeModelConfig, TestModelsConfig};
