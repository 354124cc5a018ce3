//! Model descriptors for models under test.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A model under test: a short alias plus the router model identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Short identifier, also used to namespace output directories.
    pub alias: String,
    /// Router model identifier (e.g. `deepseek-ai/DeepSeek-V3.1:novita`).
    pub model_name: String,
}

impl ModelDescriptor {
    pub fn new(alias: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            model_name: model_name.into(),
        }
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.alias, self.model_name)
    }
}
