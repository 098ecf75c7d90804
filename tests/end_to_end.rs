//! Builds with the `exwrap` binary, then installs and launches the result
//! with the real `exwrap-wrapper` as base executable.

#![cfg(unix)]

use assert_cmd::Command;
use exwrap::bundler::Target;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

struct Project {
    tmp: tempfile::TempDir,
}

impl Project {
    fn new(config: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("hello");
        std::fs::create_dir_all(root.join("data")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("run.sh"), "#!/bin/sh\necho \"launched $1\" > launched.txt\n")
            .unwrap();
        std::fs::write(root.join("data").join("words.txt"), "hello").unwrap();
        std::fs::write(root.join(".git").join("HEAD"), "ref").unwrap();
        std::fs::write(root.join("exwrap.json"), config).unwrap();
        std::fs::create_dir_all(tmp.path().join("tmp")).unwrap();
        Self { tmp }
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("hello")
    }

    fn install_dir(&self) -> PathBuf {
        self.tmp.path().join("installed")
    }

    fn pkg_with_wrapper(&self, wrapper: &Path) -> PathBuf {
        let pkg = self.tmp.path().join("pkg");
        std::fs::create_dir_all(&pkg).unwrap();
        let host = Target::host();
        let name = pkg.join(format!("wrapper-{}-{}", host.os, host.arch));
        std::fs::copy(wrapper, &name).unwrap();
        pkg
    }

    fn exwrap(&self, pkg: &Path) -> Command {
        let mut cmd = Command::cargo_bin("exwrap").unwrap();
        cmd.arg("--config")
            .arg(self.root().join("exwrap.json"))
            .arg("--pkg-dir")
            .arg(pkg)
            .env_remove("EXWRAP_PKG_DIR");
        cmd
    }

    fn run(&self, exe: &Path) -> Command {
        let mut cmd = Command::new(exe);
        cmd.env("TMPDIR", self.tmp.path().join("tmp"))
            .env("HOME", self.tmp.path());
        cmd
    }
}

fn config(install_dir: &Path) -> String {
    serde_json::json!({
        "entry_point": ["run.sh", "now"],
        "install_path": install_dir,
        "exclude_dirs": [".git"],
        "executables": ["run.sh"],
        "post_install_cmds": ["run.sh installed"],
    })
    .to_string()
}

#[test]
fn unsupported_target_exits_with_code_3_before_writing() {
    let project = Project::new(r#"{"entry_point":["run.sh"],"os":"windows","arch":"arm64"}"#);
    let pkg = project.tmp.path().join("pkg");

    project
        .exwrap(&pkg)
        .assert()
        .code(3)
        .stderr(predicate::str::contains(
            "Error: Unsupported Os/Arch combination",
        ));
    assert!(!project.root().join("build").exists());
}

#[test]
fn missing_entry_point_exits_with_code_2() {
    let project = Project::new(r#"{"entry_point":[]}"#);
    let pkg = project.tmp.path().join("pkg");

    project
        .exwrap(&pkg)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Entrypoint required."));
}

#[test]
fn missing_root_exits_with_code_2_before_writing() {
    let project = Project::new(r#"{"entry_point":["run.sh"],"root":"no-such-dir"}"#);
    let pkg = project.tmp.path().join("pkg");

    project
        .exwrap(&pkg)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to resolve root directory"));
    assert!(!project.root().join("build").exists());
}

#[test]
fn build_directory_over_the_project_exits_with_code_2() {
    let project = Project::new(r#"{"entry_point":["run.sh"]}"#);
    let pkg = project.tmp.path().join("pkg");

    project
        .exwrap(&pkg)
        .arg("--dir")
        .arg(".")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("contains the project root"));
    assert!(project.root().join("run.sh").is_file());
    assert!(project.root().join("data/words.txt").is_file());
}

#[test]
fn build_install_and_launch() {
    let project = Project::new("{}");
    let install_dir = project.install_dir();
    std::fs::write(project.root().join("exwrap.json"), config(&install_dir)).unwrap();
    let wrapper = assert_cmd::cargo::cargo_bin("exwrap-wrapper");
    let pkg = project.pkg_with_wrapper(&wrapper);

    project.exwrap(&pkg).assert().success();
    let output = project.root().join("build").join("hello");
    assert!(output.is_file());
    let scratch: Vec<_> = std::fs::read_dir(project.root().join("build"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(scratch, vec!["hello"]);

    project.run(&output).assert().success();

    let installed = install_dir.join("hello");
    assert!(installed.is_file());
    assert_eq!(
        std::fs::read(&installed).unwrap(),
        std::fs::read(&wrapper).unwrap()
    );
    assert_eq!(
        std::fs::read_to_string(install_dir.join("hello.launch")).unwrap(),
        r#"["run.sh","now"]"#
    );
    assert_eq!(
        std::fs::read_to_string(install_dir.join("data/words.txt")).unwrap(),
        "hello"
    );
    assert!(!install_dir.join(".git").exists());
    let mode = std::fs::metadata(install_dir.join("run.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111);
    assert_eq!(
        std::fs::read_to_string(install_dir.join("launched.txt")).unwrap(),
        "launched installed\n"
    );

    project.run(&installed).assert().success();
    assert_eq!(
        std::fs::read_to_string(install_dir.join("launched.txt")).unwrap(),
        "launched now\n"
    );
}

#[test]
fn installed_copy_without_launch_script_exits_with_code_8() {
    let project = Project::new("{}");
    let wrapper = assert_cmd::cargo::cargo_bin("exwrap-wrapper");
    let lonely = project.tmp.path().join("lonely");
    std::fs::copy(&wrapper, &lonely).unwrap();

    project
        .run(&lonely)
        .assert()
        .code(8)
        .stderr(predicate::str::contains("Missing entrypoint."));
}
