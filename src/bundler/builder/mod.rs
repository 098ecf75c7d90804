//! Build orchestration.
//!
//! - [`checksum`] - artifact size and SHA-256
//! - [`orchestrator`] - the [`Bundler`] that runs one build

mod checksum;
mod orchestrator;

pub use checksum::{artifact_size, calculate_sha256};
pub use orchestrator::Bundler;
