//! Installer and launcher that run inside the distributed executable.
//!
//! One binary plays both roles. If the payload archive is attached to it, it
//! installs itself; an installed copy carries no attachments and launches the
//! application's entry point instead.

pub mod commands;
pub mod context;
pub mod error;
pub mod install;
pub mod launch;

pub use context::RuntimeContext;
pub use error::{Error, Result};

use crate::consts::EMBEDDED_ARCHIVE;
use crate::embed;
use std::path::PathBuf;

/// What a wrapper run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The payload was installed into this directory
    Installed(PathBuf),
    /// The entry point ran and exited successfully
    Launched,
}

/// Installs or launches depending on what is attached to the running executable.
pub async fn run(ctx: &RuntimeContext) -> Result<Outcome> {
    let attachments = embed::list(ctx.exe()).await?;

    if attachments.iter().any(|name| name == EMBEDDED_ARCHIVE) {
        log::debug!("Payload attached, installing");
        let dir = install::install(ctx).await?;
        Ok(Outcome::Installed(dir))
    } else {
        launch::launch(ctx).await?;
        Ok(Outcome::Launched)
    }
}
