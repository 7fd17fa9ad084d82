//! Test utilities shared across test modules
//!
//! Builds a small registry whose client directories live under a temporary
//! "home", so tests never touch the real `~/.claude`.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::registry::{Client, ConfigType, FileSpec, Registry};
use crate::switch::Engine;

/// `claude` supports both types, `codex` only `config`
pub fn test_registry() -> Registry {
    Registry::new(
        vec![
            Client::new("claude", "~/.claude"),
            Client::new("codex", "~/.codex"),
        ],
        vec![
            ConfigType::new(
                "config",
                vec![
                    FileSpec::new("claude", "settings.*.json", "settings.json"),
                    FileSpec::new("codex", "config.*.toml", "config.toml"),
                ],
            ),
            ConfigType::new(
                "agents",
                vec![FileSpec::new("claude", "CLAUDE.*.md", "CLAUDE.md")],
            ),
        ],
    )
    .unwrap()
}

/// An engine whose home directory is the temp dir
pub fn test_engine<'r>(registry: &'r Registry, temp_dir: &TempDir) -> Engine<'r> {
    Engine::with_home(registry, Some(temp_dir.path().to_path_buf()))
}

/// Create `<temp>/.claude` and return it
pub fn setup_claude_dir(temp_dir: &TempDir) -> PathBuf {
    let dir = temp_dir.path().join(".claude");
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a variant file with placeholder content and return its path
pub fn write_variant(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, format!("{{\"variant\": \"{}\"}}", file_name)).unwrap();
    path
}
