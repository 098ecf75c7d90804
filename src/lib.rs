//! Self-extracting application packager.
//!
//! The `exwrap` binary collects an application directory, maps its files into
//! a relocatable layout and attaches them to a prebuilt wrapper for the target
//! platform. The `exwrap-wrapper` binary is that wrapper: on first run it
//! installs the attached application, afterwards it launches it.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod config;
pub mod consts;
pub mod descriptor;
pub mod embed;
pub mod error;
pub mod runtime;

// Re-export commonly used types
pub use error::{ExwrapError, Result};
