//! Configuration switching logic.
//!
//! This module implements the core mechanism of `cc-manager`: for a
//! (client, config type) pair it
//! - scans the client directory for variant files,
//! - reads which variant the active link currently points at,
//! - repoints the active link at another variant.
//!
//! The filesystem is the only state. Every call re-reads it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fs_utils::replace_symlink;
use crate::paths::home_dir;
use crate::registry::{FileSpec, Registry, WILDCARD};

/// One discovered variant, as reported by [`Engine::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigInfo {
    pub name: String,
    pub full_path: PathBuf,
    pub is_current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Represents the state of an active-link path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Missing,
    RegularFile,
    Directory,
    Symlink { target: PathBuf },
    BrokenSymlink { target: PathBuf },
}

impl LinkStatus {
    pub fn detect(path: &Path) -> Result<Self> {
        // symlink_metadata does not follow the link
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::Missing),
            Err(e) => return Err(Error::fs("Failed to inspect active link", path, e)),
        };

        if meta.file_type().is_symlink() {
            let target = fs::read_link(path).map_err(|source| Error::LinkRead {
                path: path.to_path_buf(),
                source,
            })?;
            if path.exists() {
                Ok(Self::Symlink { target })
            } else {
                Ok(Self::BrokenSymlink { target })
            }
        } else if meta.is_dir() {
            Ok(Self::Directory)
        } else {
            Ok(Self::RegularFile)
        }
    }

    /// Whether `switch` may replace whatever is at this path
    pub fn is_replaceable(&self) -> bool {
        !matches!(self, Self::RegularFile | Self::Directory)
    }
}

/// A (client, type) pair resolved against the registry
struct Resolved<'r> {
    spec: &'r FileSpec,
    dir: PathBuf,
}

/// Lists and switches configuration variants for registered clients
#[derive(Debug, Clone)]
pub struct Engine<'r> {
    registry: &'r Registry,
    home: Option<PathBuf>,
}

impl<'r> Engine<'r> {
    /// Engine for the invoking user, resolving `~` against their home
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_home(registry, home_dir())
    }

    /// Engine with an explicit home directory (`None` leaves `~` unexpanded)
    pub fn with_home(registry: &'r Registry, home: Option<PathBuf>) -> Self {
        Self { registry, home }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    fn resolve(&self, client: &str, config_type: &str) -> Result<Resolved<'r>> {
        let client = self.registry.find_client(client)?;
        let spec = self.registry.find_file_spec(&client.name, config_type)?;
        let dir = client.expand_dir(self.home.as_deref());
        Ok(Resolved { spec, dir })
    }

    /// The expanded configuration directory of `client`
    pub fn client_dir(&self, client: &str) -> Result<PathBuf> {
        let client = self.registry.find_client(client)?;
        Ok(client.expand_dir(self.home.as_deref()))
    }

    /// Path of the active link for a (client, type) pair
    pub fn link_path(&self, client: &str, config_type: &str) -> Result<PathBuf> {
        let resolved = self.resolve(client, config_type)?;
        Ok(resolved.spec.link_path(&resolved.dir))
    }

    /// Inspect the active link without interpreting it
    pub fn link_status(&self, client: &str, config_type: &str) -> Result<LinkStatus> {
        LinkStatus::detect(&self.link_path(client, config_type)?)
    }

    /// List every variant in the client directory, sorted by name.
    ///
    /// A missing directory lists as empty. Failing to determine the current
    /// variant only means no entry is flagged as current.
    pub fn list(&self, client: &str, config_type: &str) -> Result<Vec<ConfigInfo>> {
        let Resolved { spec, dir } = self.resolve(client, config_type)?;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "Client directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::fs("Failed to scan configuration directory", &dir, e)),
        };

        let current = match self.get_current(client, config_type) {
            Ok(name) => Some(name),
            Err(e) => {
                debug!(error = %e, "No current configuration");
                None
            }
        };

        let mut configs = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| Error::fs("Failed to read directory entry", &dir, e))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().and_then(|f| spec.extract_config_name(f)) else {
                continue;
            };

            let full_path = entry.path();
            // Follows links, so variants that are themselves links to files count
            let Ok(meta) = fs::metadata(&full_path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }

            configs.push(ConfigInfo {
                name: name.to_string(),
                is_current: current.as_deref() == Some(name),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
                full_path,
            });
        }

        configs.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = configs.len(), "Found configurations");
        Ok(configs)
    }

    /// Name of the variant the active link points at.
    ///
    /// Uses the raw link target, so a link whose variant was since deleted
    /// still resolves.
    pub fn get_current(&self, client: &str, config_type: &str) -> Result<String> {
        let Resolved { spec, dir } = self.resolve(client, config_type)?;
        let link = spec.link_path(&dir);

        let target = fs::read_link(&link).map_err(|source| Error::LinkRead {
            path: link.clone(),
            source,
        })?;

        target
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(|f| spec.extract_config_name(f))
            .map(str::to_string)
            .ok_or(Error::UnresolvableName {
                path: link,
                target,
            })
    }

    /// Point the active link at `config_name`.
    ///
    /// Nothing is modified unless the variant is a file and the link path is
    /// free or already a symlink. Returns the absolute variant path.
    pub fn switch(&self, client: &str, config_type: &str, config_name: &str) -> Result<PathBuf> {
        validate_config_name(config_name)?;
        let Resolved { spec, dir } = self.resolve(client, config_type)?;

        let source = spec.build_source_path(&dir, config_name);
        let link = spec.link_path(&dir);

        // Same notion of a variant as `list`: something that resolves to a file
        if !fs::metadata(&source).is_ok_and(|meta| meta.is_file()) {
            return Err(Error::SourceNotFound {
                config: config_name.to_string(),
                path: source,
            });
        }

        let source = std::path::absolute(&source)
            .map_err(|e| Error::fs("Failed to resolve absolute path", &source, e))?;

        let status = LinkStatus::detect(&link)?;
        if !status.is_replaceable() {
            return Err(Error::TargetConflict { path: link });
        }

        if let LinkStatus::Symlink { target } = &status {
            if *target == source {
                debug!(link = %link.display(), "Link already points to requested configuration");
                return Ok(source);
            }
            debug!(path = %link.display(), previous = %target.display(), "Replacing existing symlink");
        }

        replace_symlink(&source, &link)?;
        info!(client, config_type, config = config_name, "Switched configuration");
        Ok(source)
    }
}

/// Reject names that would escape the client directory or alter the pattern
fn validate_config_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', WILDCARD]);

    if invalid {
        return Err(Error::InvalidConfigName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_utils::{create_symlink, temp_link_path};
    use crate::test_utils::{setup_claude_dir, test_engine, test_registry, write_variant};
    use tempfile::TempDir;

    /// `settings.work.json`, `settings.personal.json`, and
    /// `settings.json -> settings.work.json`
    fn scenario(temp_dir: &TempDir) -> PathBuf {
        let dir = setup_claude_dir(temp_dir);
        let work = write_variant(&dir, "settings.work.json");
        write_variant(&dir, "settings.personal.json");
        create_symlink(&work, &dir.join("settings.json")).unwrap();
        dir
    }

    #[test]
    fn test_list_marks_current() {
        let temp_dir = TempDir::new().unwrap();
        let dir = scenario(&temp_dir);
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        let configs = engine.list("claude", "config").unwrap();
        let names: Vec<_> = configs.iter().map(|c| (c.name.as_str(), c.is_current)).collect();
        assert_eq!(names, vec![("personal", false), ("work", true)]);
        assert_eq!(configs[1].full_path, dir.join("settings.work.json"));
        assert!(configs[1].modified.is_some());
    }

    #[test]
    fn test_switch_then_get_current() {
        let temp_dir = TempDir::new().unwrap();
        let dir = scenario(&temp_dir);
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        let source = engine.switch("claude", "config", "personal").unwrap();
        assert!(source.is_absolute());
        assert_eq!(engine.get_current("claude", "config").unwrap(), "personal");
        assert_eq!(
            fs::read_link(dir.join("settings.json")).unwrap(),
            dir.join("settings.personal.json")
        );

        let current: Vec<_> = engine
            .list("claude", "config")
            .unwrap()
            .into_iter()
            .filter(|c| c.is_current)
            .collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].name, "personal");
    }

    #[test]
    fn test_switch_missing_leaves_link_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let dir = scenario(&temp_dir);
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);
        let before = fs::read_link(dir.join("settings.json")).unwrap();

        let err = engine.switch("claude", "config", "missing").unwrap_err();
        assert!(matches!(err, Error::SourceNotFound { ref config, .. } if config == "missing"));

        assert_eq!(fs::read_link(dir.join("settings.json")).unwrap(), before);
        assert_eq!(engine.get_current("claude", "config").unwrap(), "work");
    }

    #[test]
    fn test_switch_creates_absent_link() {
        let temp_dir = TempDir::new().unwrap();
        let dir = setup_claude_dir(&temp_dir);
        write_variant(&dir, "CLAUDE.linus.md");
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        assert!(matches!(
            engine.get_current("claude", "agents"),
            Err(Error::LinkRead { .. })
        ));
        engine.switch("claude", "agents", "linus").unwrap();
        assert_eq!(engine.get_current("claude", "agents").unwrap(), "linus");
    }

    #[test]
    fn test_switch_directory_variant_leaves_link_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let dir = scenario(&temp_dir);
        fs::create_dir(dir.join("settings.dir.json")).unwrap();
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);
        let before = fs::read_link(dir.join("settings.json")).unwrap();

        let err = engine.switch("claude", "config", "dir").unwrap_err();
        assert!(matches!(err, Error::SourceNotFound { ref config, .. } if config == "dir"));

        assert_eq!(fs::read_link(dir.join("settings.json")).unwrap(), before);
        assert_eq!(engine.get_current("claude", "config").unwrap(), "work");
        let names: Vec<_> = engine
            .list("claude", "config")
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert!(!names.contains(&"dir".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_switch_is_idempotent() {
        use std::os::unix::fs::MetadataExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = scenario(&temp_dir);
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);
        let link = dir.join("settings.json");

        engine.switch("claude", "config", "work").unwrap();
        let inode = fs::symlink_metadata(&link).unwrap().ino();

        // Already active: the link is not recreated
        engine.switch("claude", "config", "work").unwrap();
        assert_eq!(fs::symlink_metadata(&link).unwrap().ino(), inode);
        assert!(fs::symlink_metadata(temp_link_path(&link)).is_err());
        assert_eq!(engine.get_current("claude", "config").unwrap(), "work");

        // A different variant does replace it
        engine.switch("claude", "config", "personal").unwrap();
        assert_ne!(fs::symlink_metadata(&link).unwrap().ino(), inode);
    }

    #[test]
    fn test_switch_replaces_relative_link() {
        let temp_dir = TempDir::new().unwrap();
        let dir = setup_claude_dir(&temp_dir);
        write_variant(&dir, "settings.work.json");
        write_variant(&dir, "settings.personal.json");
        create_symlink(Path::new("settings.work.json"), &dir.join("settings.json")).unwrap();
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        assert_eq!(engine.get_current("claude", "config").unwrap(), "work");
        engine.switch("claude", "config", "personal").unwrap();
        assert_eq!(engine.get_current("claude", "config").unwrap(), "personal");
    }

    #[test]
    fn test_switch_refuses_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = setup_claude_dir(&temp_dir);
        write_variant(&dir, "settings.work.json");
        fs::write(dir.join("settings.json"), r#"{"mine": true}"#).unwrap();
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        let err = engine.switch("claude", "config", "work").unwrap_err();
        assert!(matches!(err, Error::TargetConflict { .. }));
        assert_eq!(
            fs::read_to_string(dir.join("settings.json")).unwrap(),
            r#"{"mine": true}"#
        );
    }

    #[test]
    fn test_switch_refuses_directory_at_link_path() {
        let temp_dir = TempDir::new().unwrap();
        let dir = setup_claude_dir(&temp_dir);
        write_variant(&dir, "settings.work.json");
        fs::create_dir(dir.join("settings.json")).unwrap();
        write_variant(&dir.join("settings.json"), "keep.json");
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        let err = engine.switch("claude", "config", "work").unwrap_err();
        assert!(matches!(err, Error::TargetConflict { ref path } if *path == dir.join("settings.json")));
        assert!(dir.join("settings.json").is_dir());
        assert!(dir.join("settings.json/keep.json").is_file());
    }

    #[test]
    fn test_switch_rejects_invalid_names() {
        let temp_dir = TempDir::new().unwrap();
        scenario(&temp_dir);
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        for name in ["", ".", "..", "../work", "a/b", "*"] {
            assert!(
                matches!(
                    engine.switch("claude", "config", name),
                    Err(Error::InvalidConfigName { .. })
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let temp_dir = TempDir::new().unwrap();
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        assert!(matches!(
            engine.list("cursor", "config"),
            Err(Error::UnknownClient { .. })
        ));
        assert!(matches!(
            engine.switch("claude", "prompts", "x"),
            Err(Error::UnknownConfigType { .. })
        ));
        assert!(matches!(
            engine.get_current("codex", "agents"),
            Err(Error::UnsupportedCombination { .. })
        ));
    }

    #[test]
    fn test_list_empty_and_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        // Directory does not exist yet
        assert!(engine.list("claude", "config").unwrap().is_empty());

        let dir = setup_claude_dir(&temp_dir);
        write_variant(&dir, "notes.txt");
        assert!(engine.list("claude", "config").unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_non_matching_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = setup_claude_dir(&temp_dir);
        write_variant(&dir, "settings.a.json");
        write_variant(&dir, "settings..json");
        write_variant(&dir, "settings.b.toml");
        write_variant(&dir, "CLAUDE.a.md");
        fs::create_dir(dir.join("settings.dir.json")).unwrap();
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        let configs = engine.list("claude", "config").unwrap();
        let names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
        assert!(!configs[0].is_current);
    }

    #[test]
    fn test_get_current_errors() {
        let temp_dir = TempDir::new().unwrap();
        let dir = setup_claude_dir(&temp_dir);
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);
        let link = dir.join("settings.json");

        assert!(matches!(
            engine.get_current("claude", "config"),
            Err(Error::LinkRead { .. })
        ));

        fs::write(&link, "{}").unwrap();
        assert!(matches!(
            engine.get_current("claude", "config"),
            Err(Error::LinkRead { .. })
        ));

        fs::remove_file(&link).unwrap();
        let other = write_variant(&dir, "backup.json");
        create_symlink(&other, &link).unwrap();
        assert!(matches!(
            engine.get_current("claude", "config"),
            Err(Error::UnresolvableName { .. })
        ));
        // list still succeeds, with nothing current
        assert!(engine.list("claude", "config").unwrap().is_empty());
    }

    #[test]
    fn test_get_current_with_broken_link() {
        let temp_dir = TempDir::new().unwrap();
        let dir = scenario(&temp_dir);
        fs::remove_file(dir.join("settings.work.json")).unwrap();
        let registry = test_registry();
        let engine = test_engine(&registry, &temp_dir);

        assert_eq!(engine.get_current("claude", "config").unwrap(), "work");
        assert!(matches!(
            engine.link_status("claude", "config").unwrap(),
            LinkStatus::BrokenSymlink { .. }
        ));

        let configs = engine.list("claude", "config").unwrap();
        assert_eq!(configs.len(), 1);
        assert!(!configs[0].is_current);
    }

    #[test]
    fn test_link_status_detect() {
        let temp_dir = TempDir::new().unwrap();
        let dir = setup_claude_dir(&temp_dir);
        let link = dir.join("settings.json");

        assert_eq!(LinkStatus::detect(&link).unwrap(), LinkStatus::Missing);

        fs::write(&link, "{}").unwrap();
        assert_eq!(LinkStatus::detect(&link).unwrap(), LinkStatus::RegularFile);
        fs::remove_file(&link).unwrap();

        fs::create_dir(&link).unwrap();
        assert_eq!(LinkStatus::detect(&link).unwrap(), LinkStatus::Directory);
        assert!(!LinkStatus::Directory.is_replaceable());
        fs::remove_dir(&link).unwrap();

        let target = write_variant(&dir, "settings.x.json");
        create_symlink(&target, &link).unwrap();
        assert_eq!(
            LinkStatus::detect(&link).unwrap(),
            LinkStatus::Symlink { target }
        );
    }

    #[test]
    fn test_engine_without_home_leaves_tilde() {
        let registry = test_registry();
        let engine = Engine::with_home(&registry, None);
        assert_eq!(
            engine.client_dir("claude").unwrap(),
            PathBuf::from("~/.claude")
        );
    }
}
