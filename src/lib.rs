//! evalcfg — typed configuration for LLM response and evaluation pipelines.
//!
//! Exposes the models under test, the judge model, and the directory layout
//! for dataset, response, and evaluation artifacts. Build a [`Config`] once
//! with [`Config::from_env`] or [`Config::load`] and pass it by reference.

pub mod config;
pub mod constants;
pub mod env;
pub mod models;

pub use config::{Config, ConfigError, DirectoryLayout, JudgeModelConfig, TestModelsConfig};
pub use env::Env;
pub use models::{ModelDescriptor, ModelOutputDirs, OutputDirs, Variant};
