//! Per-model output locations for responses and evaluations.
//!
//! Every model alias owns two experiment arms (see [`Variant`]), and each
//! arm writes model responses and judge evaluations to separate
//! directories. Paths are plain relative strings; nothing here touches
//! the filesystem.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{EVALUATION_ROOT, RESPONSE_ROOT};

/// Experiment arm a response or evaluation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Unmodified prompts.
    Baseline,
    /// Prompts with the mitigation applied.
    Mitigation,
}

impl Variant {
    /// Both arms, in declaration order.
    pub const ALL: [Variant; 2] = [Variant::Baseline, Variant::Mitigation];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Baseline => "baseline",
            Variant::Mitigation => "mitigation",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" => Ok(Variant::Baseline),
            "mitigation" => Ok(Variant::Mitigation),
            other => Err(format!(
                "unknown variant: '{other}'. Supported: baseline, mitigation"
            )),
        }
    }
}

/// Response and evaluation directories for one model/variant pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDirs {
    pub response_dir: String,
    pub eval_dir: String,
}

impl OutputDirs {
    /// `../data/output/{response,evaluation}/<alias>/<variant>`.
    pub fn conventional(alias: &str, variant: Variant) -> Self {
        Self {
            response_dir: format!("{RESPONSE_ROOT}/{alias}/{variant}"),
            eval_dir: format!("{EVALUATION_ROOT}/{alias}/{variant}"),
        }
    }
}

/// Output directories for both arms of a single model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutputDirs {
    pub baseline: OutputDirs,
    pub mitigation: OutputDirs,
}

impl ModelOutputDirs {
    /// Conventional layout for `alias`, see [`OutputDirs::conventional`].
    pub fn conventional(alias: &str) -> Self {
        Self {
            baseline: OutputDirs::conventional(alias, Variant::Baseline),
            mitigation: OutputDirs::conventional(alias, Variant::Mitigation),
        }
    }

    pub fn get(&self, variant: Variant) -> &OutputDirs {
        match variant {
            Variant::Baseline => &self.baseline,
            Variant::Mitigation => &self.mitigation,
        }
    }
}
