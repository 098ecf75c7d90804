//! Pre- and post-install commands.

use super::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Splits `command` on spaces into program and arguments.
///
/// Relative programs resolve against `dir`. Empty pieces are dropped, so
/// repeated spaces do not produce empty arguments.
pub fn parse(dir: &Path, command: &str) -> Option<(PathBuf, Vec<String>)> {
    let mut parts = command.split(' ').filter(|part| !part.is_empty());
    let program = parts.next()?;
    let args = parts.map(str::to_string).collect();
    Some((dir.join(program), args))
}

/// Runs each command in order with `dir` as working directory.
///
/// # Errors
///
/// [`Error::InstallCommand`] for the first command that cannot be started or
/// exits unsuccessfully; later commands are not run.
pub async fn run_commands(dir: &Path, commands: &[String]) -> Result<()> {
    for command in commands {
        let Some((program, args)) = parse(dir, command) else {
            continue;
        };

        log::info!("Running {command}");
        let output = Command::new(&program)
            .args(&args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| Error::InstallCommand {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.stdout.is_empty() {
            log::debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::InstallCommand {
                command: command.clone(),
                reason: format!("{} {}", output.status, stderr.trim_end())
                    .trim_end()
                    .to_string(),
            });
        }
    }
    Ok(())
}
