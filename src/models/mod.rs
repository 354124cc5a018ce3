//! Shared types used by the configuration records.
//!
//! Model descriptors and output-directory types live here so the
//! `config` module only deals with assembling and layering them.

pub mod descriptor;
pub mod output;

pub use descriptor::ModelDescriptor;
pub use output::{ModelOutputDirs, OutputDirs, Variant};
