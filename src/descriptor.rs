//! Control documents exchanged between build, install and launch.
//!
//! The setup descriptor travels from the build tool to the installer, the
//! launch descriptor from the build tool to the installer, and the persisted
//! launch script from the installer (or the bundle builder) to every later
//! launch.

use crate::consts::LAUNCH_SCRIPT_EXTENSION;
use serde::{Deserialize, Serialize};

/// Install instructions embedded into the distributed executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupScript {
    /// Install path; absolute, or relative to the platform install root.
    #[serde(rename = "install_dir")]
    pub install_directory: String,

    /// Name of the installed executable, without platform suffix.
    pub exe_name: String,

    /// Package-relative paths that need the execute bit after extraction.
    #[serde(default)]
    pub executables: Vec<String>,

    /// Commands run in the install directory before the payload is unpacked.
    #[serde(default, rename = "pre_install_cmds")]
    pub pre_install_commands: Vec<String>,

    /// Commands run in the install directory after installation completes.
    #[serde(default, rename = "post_install_cmds")]
    pub post_install_commands: Vec<String>,
}

/// Launch instructions embedded into the distributed executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchScript {
    /// Program followed by its arguments, e.g. `["python", "app.py"]`.
    #[serde(rename = "entrypoint")]
    pub entry_point: Vec<String>,
}

impl LaunchScript {
    /// File name of the persisted launch script for executable `exe_file_name`.
    pub fn file_name(exe_file_name: &str) -> String {
        format!("{exe_file_name}.{LAUNCH_SCRIPT_EXTENSION}")
    }

    /// Serializes the entry point as the persisted launch script: a bare JSON array.
    pub fn to_persisted(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.entry_point)
    }

    /// Parses a persisted launch script.
    pub fn from_persisted(data: &[u8]) -> serde_json::Result<Self> {
        let entry_point: Vec<String> = serde_json::from_slice(data)?;
        Ok(Self { entry_point })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_script_uses_document_keys() {
        let setup = SetupScript {
            install_directory: "MyApp".into(),
            exe_name: "myapp".into(),
            executables: vec!["bin/run.sh".into()],
            pre_install_commands: vec![],
            post_install_commands: vec!["bin/run.sh --init".into()],
        };

        let value = serde_json::to_value(&setup).unwrap();
        assert_eq!(value["install_dir"], "MyApp");
        assert_eq!(value["exe_name"], "myapp");
        assert_eq!(value["executables"][0], "bin/run.sh");
        assert_eq!(value["post_install_cmds"][0], "bin/run.sh --init");
    }

    #[test]
    fn setup_script_tolerates_missing_lists() {
        let setup: SetupScript =
            serde_json::from_str(r#"{"install_dir":"/opt/app","exe_name":"app"}"#).unwrap();
        assert!(setup.executables.is_empty());
        assert!(setup.pre_install_commands.is_empty());
    }

    #[test]
    fn persisted_launch_script_is_a_bare_array() {
        let launch = LaunchScript {
            entry_point: vec!["python".into(), "app.py".into()],
        };
        let data = launch.to_persisted().unwrap();
        assert_eq!(data, br#"["python","app.py"]"#);
        assert_eq!(LaunchScript::from_persisted(&data).unwrap(), launch);
        assert_eq!(LaunchScript::file_name("app.exe"), "app.exe.launch");
    }
}
