//! Attachment resolution: which source files go into the package, and where.
//!
//! Each candidate file is run through an ordered list of rules; the first rule
//! that applies decides the file's destination and later rules are skipped:
//!
//! 1. excluded directories and excluded files drop the file
//! 2. an exact path override key maps it to the override value
//! 3. an exact extra file key maps it to the extra file value
//! 4. a path override prefix rewrites the prefix to the replacement
//! 5. an extra directory prefix rewrites the prefix to the destination prefix
//! 6. otherwise the path relative to the project root is used
//!
//! An empty value in rules 2 and 3 means "omit". When several prefixes match in
//! rules 4 and 5 the most specific one wins.

use crate::bundler::error::Result;
use crate::bundler::settings::Settings;
use path_absolutize::Absolutize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Package-relative destination => absolute source file.
pub type AttachmentMap = BTreeMap<PathBuf, PathBuf>;

/// Applies the resolution rules of one [`Settings`] value.
pub struct Resolver<'a> {
    settings: &'a Settings,
}

impl<'a> Resolver<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Whether `file` is an excluded file or lives under an excluded directory.
    pub fn is_excluded(&self, file: &Path) -> bool {
        self.settings
            .exclude_directories()
            .iter()
            .any(|dir| file.starts_with(dir))
            || self.settings.exclude_files().iter().any(|f| f == file)
    }

    /// Destination of `file` inside the package, `None` when it is left out.
    pub fn destination(&self, file: &Path) -> Option<PathBuf> {
        if self.is_excluded(file) {
            log::debug!("Excluded: {}", file.display());
            return None;
        }

        if let Some(value) = self.settings.path_overrides().get(file) {
            return self.explicit(value);
        }

        if let Some(value) = self.settings.extra_files().get(file) {
            return self.explicit(value);
        }

        if let Some(dest) = rewrite_prefix(self.settings.path_overrides(), file) {
            return self.normalize(&dest);
        }

        if let Some(dest) = rewrite_prefix(self.settings.extra_directories(), file) {
            return self.normalize(&dest);
        }

        match file.strip_prefix(self.settings.root()) {
            Ok(relative) => self.normalize(relative),
            Err(_) => {
                log::debug!(
                    "Skipping {}: outside of {}",
                    file.display(),
                    self.settings.root().display()
                );
                None
            }
        }
    }

    /// Maps every file in `files`; later files overwrite earlier ones on a
    /// destination collision.
    pub fn resolve<I>(&self, files: I) -> AttachmentMap
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut attachments = AttachmentMap::new();
        for file in files {
            if let Some(dest) = self.destination(&file) {
                insert(&mut attachments, dest, file);
            }
        }
        attachments
    }

    fn explicit(&self, value: &str) -> Option<PathBuf> {
        if value.is_empty() {
            return None;
        }
        self.normalize(Path::new(value))
    }

    /// Package-relative form of a rewritten path: the project root is
    /// stripped when present, then leading separators.
    fn normalize(&self, path: &Path) -> Option<PathBuf> {
        let path = path.strip_prefix(self.settings.root()).unwrap_or(path);

        let mut dest = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => dest.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    log::warn!(
                        "Skipping destination {} escaping the package",
                        path.display()
                    );
                    return None;
                }
            }
        }

        if dest.as_os_str().is_empty() {
            None
        } else {
            Some(dest)
        }
    }
}

/// Replaces the most specific matching key of `table` in `file` with its value.
fn rewrite_prefix(table: &BTreeMap<PathBuf, String>, file: &Path) -> Option<PathBuf> {
    // Descending order visits nested prefixes before their parents.
    table.iter().rev().find_map(|(prefix, replacement)| {
        let remainder = file.strip_prefix(prefix).ok()?;
        let replacement = Path::new(replacement);
        if remainder.as_os_str().is_empty() {
            Some(replacement.to_path_buf())
        } else {
            Some(replacement.join(remainder))
        }
    })
}

fn insert(attachments: &mut AttachmentMap, dest: PathBuf, src: PathBuf) {
    if let Some(previous) = attachments.get(&dest) {
        if *previous != src {
            log::warn!(
                "{} replaces {} at {}",
                src.display(),
                previous.display(),
                dest.display()
            );
        }
    }
    attachments.insert(dest, src);
}

/// Recursively lists the regular files under `dir`.
///
/// Symbolic links are replaced by the file they point at, so exclusions and
/// destinations apply to the target path. Links to directories and dangling
/// links are dropped. Excluded directories are not descended into.
pub fn walk_files(dir: &Path, resolver: &Resolver<'_>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && resolver.is_excluded(entry.path())));

    for entry in walker {
        let entry = entry?;
        let file_type = entry.file_type();

        if file_type.is_file() {
            files.push(entry.into_path());
        } else if file_type.is_symlink() {
            let Some(target) = link_target(entry.path()) else {
                continue;
            };
            match std::fs::metadata(&target) {
                Ok(meta) if meta.is_file() => files.push(target),
                Ok(_) => log::debug!("Skipping link to directory {}", entry.path().display()),
                Err(e) => log::debug!("Skipping dangling link {}: {e}", entry.path().display()),
            }
        }
    }

    Ok(files)
}

/// Path a symbolic link points at; relative targets resolve against the
/// link's directory.
fn link_target(link: &Path) -> Option<PathBuf> {
    let target = match std::fs::read_link(link) {
        Ok(target) => target,
        Err(e) => {
            log::debug!("Skipping unreadable link {}: {e}", link.display());
            return None;
        }
    };
    let parent = link.parent().unwrap_or(Path::new("/"));
    match target.absolutize_from(parent) {
        Ok(path) => Some(path.into_owned()),
        Err(e) => {
            log::debug!("Skipping link {}: {e}", link.display());
            None
        }
    }
}

/// Builds the full attachment map for `settings`.
///
/// The project root is resolved first, then every extra directory, then every
/// extra file. Results merge by destination, later passes winning.
pub fn collect(settings: &Settings) -> Result<AttachmentMap> {
    let resolver = Resolver::new(settings);

    let mut attachments = resolver.resolve(walk_files(settings.root(), &resolver)?);

    for dir in settings.extra_directories().keys() {
        for (dest, src) in resolver.resolve(walk_files(dir, &resolver)?) {
            insert(&mut attachments, dest, src);
        }
    }

    for file in settings.extra_files().keys() {
        if !file.is_file() {
            log::warn!("Extra file {} is not a file, skipping", file.display());
            continue;
        }
        for (dest, src) in resolver.resolve([file.clone()]) {
            insert(&mut attachments, dest, src);
        }
    }

    for (dest, src) in &attachments {
        log::info!("File discovered: {} => {}", src.display(), dest.display());
    }

    Ok(attachments)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bundler::settings::SettingsBuilder;
    use crate::config::ConfigDocument;
    use std::fs;

    fn settings(root: &Path, json: &str) -> Settings {
        let document = ConfigDocument::from_json(Path::new("exwrap.json"), json).unwrap();
        SettingsBuilder::new(document)
            .base_directory(root)
            .build()
            .unwrap()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, path.to_string_lossy().as_bytes()).unwrap();
    }

    #[test]
    fn default_rule_strips_root() {
        let s = settings(Path::new("/proj"), r#"{"entry_point":["app"]}"#);
        let resolver = Resolver::new(&s);
        assert_eq!(
            resolver.destination(Path::new("/proj/src/main.py")),
            Some(PathBuf::from("src/main.py"))
        );
        assert_eq!(resolver.destination(Path::new("/proj")), None);
        assert_eq!(resolver.destination(Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn exclusions_win_over_everything() {
        let s = settings(
            Path::new("/proj"),
            r#"{
                "entry_point": ["app"],
                "exclude_dirs": ["venv"],
                "exclude_files": ["secret.txt"],
                "path_overrides": {"venv/keep.txt": "keep.txt"},
                "extra_files": {"secret.txt": "public.txt"}
            }"#,
        );
        let resolver = Resolver::new(&s);
        assert_eq!(resolver.destination(Path::new("/proj/venv/keep.txt")), None);
        assert_eq!(resolver.destination(Path::new("/proj/venv/lib/x.py")), None);
        assert_eq!(resolver.destination(Path::new("/proj/secret.txt")), None);
        // Component-wise matching: a sibling sharing a name prefix is kept.
        assert_eq!(
            resolver.destination(Path::new("/proj/venv2/x.py")),
            Some(PathBuf::from("venv2/x.py"))
        );
        // Build directory is always excluded.
        assert_eq!(resolver.destination(Path::new("/proj/build/app")), None);
    }

    #[test]
    fn precedence_follows_rule_order() {
        let s = settings(
            Path::new("/proj"),
            r#"{
                "entry_point": ["app"],
                "path_overrides": {
                    "conf/app.ini": "settings/app.ini",
                    "conf": "etc",
                    "data/both.txt": "override.txt"
                },
                "extra_files": {
                    "conf/app.ini": "ignored.ini",
                    "data/both.txt": "ignored.txt",
                    "data/only.txt": "files/only.txt"
                },
                "extra_dirs": {"conf": "never", "data": "share"}
            }"#,
        );
        let resolver = Resolver::new(&s);
        let dest = |p: &str| resolver.destination(Path::new(p));

        // exact override beats exact extra file
        assert_eq!(dest("/proj/conf/app.ini"), Some(PathBuf::from("settings/app.ini")));
        assert_eq!(dest("/proj/data/both.txt"), Some(PathBuf::from("override.txt")));
        // exact extra file beats prefix override and extra dir
        assert_eq!(dest("/proj/data/only.txt"), Some(PathBuf::from("files/only.txt")));
        // prefix override beats extra dir
        assert_eq!(dest("/proj/conf/log.ini"), Some(PathBuf::from("etc/log.ini")));
        // extra dir beats default
        assert_eq!(dest("/proj/data/x.csv"), Some(PathBuf::from("share/x.csv")));
        // default
        assert_eq!(dest("/proj/main.py"), Some(PathBuf::from("main.py")));
    }

    #[test]
    fn empty_values_omit_the_file() {
        let s = settings(
            Path::new("/proj"),
            r#"{
                "entry_point": ["app"],
                "path_overrides": {"a.txt": ""},
                "extra_files": {"b.txt": ""}
            }"#,
        );
        let resolver = Resolver::new(&s);
        assert_eq!(resolver.destination(Path::new("/proj/a.txt")), None);
        assert_eq!(resolver.destination(Path::new("/proj/b.txt")), None);
    }

    #[test]
    fn most_specific_prefix_wins() {
        let s = settings(
            Path::new("/proj"),
            r#"{
                "entry_point": ["app"],
                "path_overrides": {"lib": "vendor", "lib/native": "bin"}
            }"#,
        );
        let resolver = Resolver::new(&s);
        assert_eq!(
            resolver.destination(Path::new("/proj/lib/native/x.so")),
            Some(PathBuf::from("bin/x.so"))
        );
        assert_eq!(
            resolver.destination(Path::new("/proj/lib/y.py")),
            Some(PathBuf::from("vendor/y.py"))
        );
    }

    #[test]
    fn absolute_replacement_under_root_is_made_relative() {
        let s = settings(
            Path::new("/proj"),
            r#"{"entry_point":["app"],"path_overrides":{"old":"/proj/new"}}"#,
        );
        let resolver = Resolver::new(&s);
        assert_eq!(
            resolver.destination(Path::new("/proj/old/a.txt")),
            Some(PathBuf::from("new/a.txt"))
        );
    }

    #[test]
    fn destinations_never_escape_the_package() {
        let s = settings(
            Path::new("/proj"),
            r#"{"entry_point":["app"],"extra_files":{"a.txt":"../a.txt"}}"#,
        );
        assert_eq!(Resolver::new(&s).destination(Path::new("/proj/a.txt")), None);
    }

    #[test]
    fn collect_walks_root_extra_dirs_and_extra_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("app");
        let shared = tmp.path().join("shared");
        touch(&root.join("main.py"));
        touch(&root.join("pkg").join("mod.py"));
        touch(&root.join("venv").join("python"));
        touch(&root.join("build").join("old-output"));
        touch(&shared.join("util.py"));
        touch(&tmp.path().join("LICENSE"));

        let s = settings(
            &root,
            r#"{
                "entry_point": ["python", "main.py"],
                "exclude_dirs": ["venv"],
                "extra_dirs": {"../shared": "lib"},
                "extra_files": {"../LICENSE": "LICENSE.txt"}
            }"#,
        );

        let map = collect(&s).unwrap();
        let dests: Vec<_> = map.keys().cloned().collect();
        assert_eq!(
            dests,
            vec![
                PathBuf::from("LICENSE.txt"),
                PathBuf::from("lib/util.py"),
                PathBuf::from("main.py"),
                PathBuf::from("pkg/mod.py"),
            ]
        );
        assert_eq!(map[Path::new("lib/util.py")], shared.join("util.py"));
    }

    #[test]
    fn later_passes_overwrite_colliding_destinations() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("app");
        touch(&root.join("config.ini"));
        touch(&tmp.path().join("prod.ini"));

        let s = settings(
            &root,
            r#"{"entry_point":["app"],"extra_files":{"../prod.ini":"config.ini"}}"#,
        );

        let map = collect(&s).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[Path::new("config.ini")], tmp.path().join("prod.ini"));
    }

    #[test]
    fn symlinks_resolve_to_their_target_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("app");
        touch(&root.join("real.txt"));
        fs::create_dir_all(root.join("dir")).unwrap();
        std::os::unix::fs::symlink("real.txt", root.join("alias.txt")).unwrap();
        std::os::unix::fs::symlink(root.join("dir"), root.join("link-dir")).unwrap();
        std::os::unix::fs::symlink(root.join("missing"), root.join("dangling")).unwrap();

        let s = settings(&root, r#"{"entry_point":["app"]}"#);
        let resolver = Resolver::new(&s);
        let mut files = walk_files(&root, &resolver).unwrap();
        files.sort();
        assert_eq!(files, vec![root.join("real.txt"), root.join("real.txt")]);

        let map = collect(&s).unwrap();
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec![PathBuf::from("real.txt")]);
    }

    #[test]
    fn links_into_excluded_directories_stay_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("app");
        touch(&root.join("main.py"));
        touch(&root.join("venv/secret.key"));
        std::os::unix::fs::symlink("venv/secret.key", root.join("key-link")).unwrap();
        std::os::unix::fs::symlink(root.join("venv/secret.key"), root.join("abs-link")).unwrap();

        let s = settings(&root, r#"{"entry_point":["app"],"exclude_dirs":["venv"]}"#);
        let map = collect(&s).unwrap();
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec![PathBuf::from("main.py")]);
        assert!(map.values().all(|src| !src.starts_with(root.join("venv"))));
    }
}
