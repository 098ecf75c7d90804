//! Build pipeline: settings, attachment resolution, layouts and orchestration.
//!
//! ```text
//! ConfigDocument -> SettingsBuilder -> Settings
//!     -> attachments::collect -> AttachmentMap
//!     -> installer | macos::app -> BuiltArtifact
//! ```

pub mod archive;
pub mod attachments;
pub mod builder;
pub mod error;
pub mod platform;
pub mod settings;
pub mod utils;

pub use builder::Bundler;
pub use error::{Error, Result};
pub use platform::{BuiltArtifact, Layout};
pub use settings::{PlatformProfile, Settings, SettingsBuilder, Target};
