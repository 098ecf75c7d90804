//! Darwin (macOS) application bundle settings.

use std::path::PathBuf;

/// Options for the `.app` bundle layout.
#[derive(Clone, Debug, Default)]
pub struct DarwinSettings {
    /// Absolute path of a user-supplied Info.plist template.
    ///
    /// `None` renders the built-in template.
    pub plist_file: Option<PathBuf>,

    /// Produce an `.app` bundle instead of a self-installing executable.
    ///
    /// Only honoured when the target OS supports native bundles.
    pub create_app: bool,
}
