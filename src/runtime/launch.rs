//! Runs the installed entry point.

use super::context::RuntimeContext;
use super::error::{Error, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use tokio::sync::oneshot;

/// Launches the entry point with the runtime directory as working directory
/// and waits for it.
///
/// The child's standard output and error are copied to this process once it
/// exits.
///
/// # Errors
///
/// - [`Error::MissingEntrypoint`] when no launch script is present
/// - [`Error::Launch`] when the program cannot be started or exits unsuccessfully
pub async fn launch(ctx: &RuntimeContext) -> Result<()> {
    let command = ctx.launch_command().await?;
    let Some((program, args)) = command.split_first() else {
        return Err(Error::MissingEntrypoint);
    };

    let runtime_dir = ctx.runtime_dir();
    let program = resolve_program(&runtime_dir, program);
    log::debug!("Launching {} in {}", program.display(), runtime_dir.display());

    let mut child = Command::new(&program);
    child.args(args).current_dir(&runtime_dir);

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = tx.send(child.output().await);
    });

    let output = rx
        .await
        .map_err(|e| Error::Launch {
            program: program.clone(),
            code: None,
            reason: format!("launch task ended unexpectedly: {e}"),
        })?
        .map_err(|e| Error::Launch {
            program: program.clone(),
            code: None,
            reason: e.to_string(),
        })?;

    forward(&output);

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::Launch {
            program,
            code: output.status.code(),
            reason: output.status.to_string(),
        })
    }
}

/// Absolute programs are used as given; anything else is taken relative to
/// `runtime_dir`.
fn resolve_program(runtime_dir: &std::path::Path, program: &str) -> PathBuf {
    let path = PathBuf::from(program);
    if path.is_absolute() {
        path
    } else {
        runtime_dir.join(path)
    }
}

fn forward(output: &Output) {
    if let Err(e) = std::io::stdout().write_all(&output.stdout) {
        log::warn!("Cannot forward standard output: {e}");
    }
    if let Err(e) = std::io::stderr().write_all(&output.stderr) {
        log::warn!("Cannot forward standard error: {e}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bundler::settings::{Os, PlatformProfile};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn context(dir: &Path) -> RuntimeContext {
        RuntimeContext::new(
            dir.join("app"),
            Some(dir.to_path_buf()),
            dir,
            PlatformProfile::for_os(Os::Linux),
        )
    }

    fn script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn relative_programs_resolve_against_runtime_dir() {
        let dir = Path::new("/opt/app");
        assert_eq!(resolve_program(dir, "bin/run"), PathBuf::from("/opt/app/bin/run"));
        assert_eq!(resolve_program(dir, "/bin/sh"), PathBuf::from("/bin/sh"));
    }

    #[tokio::test]
    async fn runs_entry_point_with_arguments_in_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        script(dir.path(), "run.sh", "echo \"$1 $2\" > launched.txt");
        std::fs::write(dir.path().join("app.launch"), br#"["run.sh","a","b"]"#).unwrap();

        launch(&context(dir.path())).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("launched.txt")).unwrap(),
            "a b\n"
        );
    }

    #[tokio::test]
    async fn non_zero_exit_reports_child_code() {
        let dir = tempfile::tempdir().unwrap();
        script(dir.path(), "fail.sh", "exit 3");
        std::fs::write(dir.path().join("app.launch"), br#"["fail.sh"]"#).unwrap();

        let err = launch(&context(dir.path())).await.unwrap_err();
        assert!(matches!(err, Error::Launch { code: Some(3), .. }));
    }

    #[tokio::test]
    async fn missing_program_cannot_start() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.launch"), br#"["nope"]"#).unwrap();

        let err = launch(&context(dir.path())).await.unwrap_err();
        assert!(matches!(err, Error::Launch { code: None, .. }));
    }

    #[tokio::test]
    async fn missing_launch_script_is_missing_entrypoint() {
        let dir = tempfile::tempdir().unwrap();
        let err = launch(&context(dir.path())).await.unwrap_err();
        assert!(matches!(err, Error::MissingEntrypoint));
    }

    #[tokio::test]
    async fn app_bundle_runs_from_resources() {
        let dir = tempfile::tempdir().unwrap();
        let contents = dir.path().join("Demo.app").join("Contents");
        let macos = contents.join("MacOS");
        let resources = contents.join("Resources");
        std::fs::create_dir_all(&macos).unwrap();
        std::fs::create_dir_all(&resources).unwrap();
        std::fs::write(macos.join(crate::consts::APP_BUNDLE_MARKER), b"").unwrap();
        std::fs::write(macos.join("Demo.launch"), br#"["run.sh","x"]"#).unwrap();
        script(&resources, "run.sh", "echo \"$1\" > launched.txt");

        let ctx = RuntimeContext::new(
            macos.join("Demo"),
            Some(dir.path().to_path_buf()),
            dir.path(),
            PlatformProfile::for_os(Os::Darwin),
        );
        launch(&ctx).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(resources.join("launched.txt")).unwrap(),
            "x\n"
        );
        assert!(!macos.join("launched.txt").exists());
    }
}
