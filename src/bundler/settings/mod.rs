//! Normalized build settings.
//!
//! [`SettingsBuilder`] turns a configuration document into [`Settings`]:
//! absolute paths everywhere, defaulted names and a validated target.

mod builder;
mod core;
mod darwin;
mod profile;
mod target;

pub use builder::SettingsBuilder;
pub use core::Settings;
pub use darwin::DarwinSettings;
pub use profile::{InstallRoot, LaunchMode, PlatformProfile};
pub use target::{Arch, Os, SUPPORT_TABLE, Support, Target};
