//! The catalog of known clients and configuration types.
//!
//! A [`Registry`] is a read-only value: it is built (and validated) once and
//! then handed by reference to the [`Engine`](crate::switch::Engine). Nothing
//! in here touches the filesystem; client directories are only expanded when
//! a caller supplies the home directory.
//!
//! Each [`FileSpec`] pattern carries exactly one `*` wildcard. The same
//! pattern is used in both directions: substituting a configuration name to
//! build a filename, and stripping the literal prefix/suffix to recover the
//! name from a filename.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::expand_home;

/// The wildcard marker in file patterns
pub const WILDCARD: char = '*';

/// Built-in clients: (name, directory)
const BUILTIN_CLIENTS: &[(&str, &str)] = &[
    ("claude", "~/.claude"),
    ("codex", "~/.codex"),
    ("gemini", "~/.gemini"),
    ("qwen", "~/.qwen"),
];

/// Built-in config types: (name, [(client, pattern, link name)])
const BUILTIN_CONFIG_TYPES: &[(&str, &[(&str, &str, &str)])] = &[
    (
        "config",
        &[
            ("claude", "settings.*.json", "settings.json"),
            ("codex", "config.*.toml", "config.toml"),
            ("gemini", "settings.*.json", "settings.json"),
            ("qwen", "settings.*.json", "settings.json"),
        ],
    ),
    (
        "agents",
        &[
            ("claude", "CLAUDE.*.md", "CLAUDE.md"),
            ("codex", "AGENTS.*.md", "AGENTS.md"),
            ("gemini", "GEMINI.*.md", "GEMINI.md"),
            ("qwen", "QWEN.*.md", "QWEN.md"),
        ],
    ),
];

/// An application whose configuration files are managed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub name: String,
    /// Configuration directory, possibly starting with `~`
    pub dir: String,
}

impl Client {
    pub fn new(name: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// The client directory with `~` expanded against `home`
    pub fn expand_dir(&self, home: Option<&Path>) -> PathBuf {
        expand_home(&self.dir, home)
    }
}

/// How one client names the variants and the active link of one config type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    /// Name of the [`Client`] this spec belongs to
    pub client: String,
    /// Variant filename pattern, e.g. `settings.*.json`
    pub pattern: String,
    /// Canonical active-link filename, e.g. `settings.json`
    pub link_name: String,
}

impl FileSpec {
    pub fn new(
        client: impl Into<String>,
        pattern: impl Into<String>,
        link_name: impl Into<String>,
    ) -> Self {
        Self {
            client: client.into(),
            pattern: pattern.into(),
            link_name: link_name.into(),
        }
    }

    /// Literal text before and after the wildcard, or `None` unless the
    /// pattern has exactly one wildcard.
    fn split_pattern(&self) -> Option<(&str, &str)> {
        let mut parts = self.pattern.split(WILDCARD);
        let prefix = parts.next()?;
        let suffix = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some((prefix, suffix))
    }

    pub fn is_valid(&self) -> bool {
        self.split_pattern().is_some()
    }

    /// Build the variant path for `config_name` inside `client_dir`.
    ///
    /// Only the first wildcard is substituted.
    pub fn build_source_path(&self, client_dir: &Path, config_name: &str) -> PathBuf {
        client_dir.join(self.pattern.replacen(WILDCARD, config_name, 1))
    }

    /// Recover the configuration name from a variant filename.
    ///
    /// Returns `None` when the filename does not carry the pattern's prefix
    /// and suffix, when the captured name would be empty, or when the pattern
    /// itself is malformed. Callers scanning a directory skip `None`.
    pub fn extract_config_name<'a>(&self, filename: &'a str) -> Option<&'a str> {
        let (prefix, suffix) = self.split_pattern()?;
        let name = filename.strip_prefix(prefix)?.strip_suffix(suffix)?;
        (!name.is_empty()).then_some(name)
    }

    /// Path of the active link inside `client_dir`
    pub fn link_path(&self, client_dir: &Path) -> PathBuf {
        client_dir.join(&self.link_name)
    }
}

/// A category of configuration file with a per-client naming convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigType {
    pub name: String,
    pub files: Vec<FileSpec>,
}

impl ConfigType {
    pub fn new(name: impl Into<String>, files: Vec<FileSpec>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    /// The file spec declared for `client`, if this type supports it
    pub fn spec_for(&self, client: &str) -> Option<&FileSpec> {
        self.files.iter().find(|spec| spec.client == client)
    }
}

/// Validated, immutable tables of clients and config types
#[derive(Debug, Clone)]
pub struct Registry {
    clients: Vec<Client>,
    config_types: Vec<ConfigType>,
}

impl Registry {
    /// Build a registry, failing fast on duplicate names or on any pattern
    /// without exactly one wildcard.
    pub fn new(clients: Vec<Client>, config_types: Vec<ConfigType>) -> Result<Self> {
        let mut seen = HashSet::new();
        for client in &clients {
            if !seen.insert(client.name.as_str()) {
                return Err(Error::DuplicateName {
                    kind: "client",
                    name: client.name.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for config_type in &config_types {
            if !seen.insert(config_type.name.as_str()) {
                return Err(Error::DuplicateName {
                    kind: "config type",
                    name: config_type.name.clone(),
                });
            }
            if let Some(spec) = config_type.files.iter().find(|spec| !spec.is_valid()) {
                return Err(Error::InvalidPattern {
                    pattern: spec.pattern.clone(),
                });
            }
        }

        Ok(Self {
            clients,
            config_types,
        })
    }

    /// The registry of supported assistants shipped with the tool
    pub fn builtin() -> Result<Self> {
        let clients = BUILTIN_CLIENTS
            .iter()
            .map(|(name, dir)| Client::new(*name, *dir))
            .collect();

        let config_types = BUILTIN_CONFIG_TYPES
            .iter()
            .map(|(name, specs)| {
                let files = specs
                    .iter()
                    .map(|(client, pattern, link)| FileSpec::new(*client, *pattern, *link))
                    .collect();
                ConfigType::new(*name, files)
            })
            .collect();

        Self::new(clients, config_types)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn config_types(&self) -> &[ConfigType] {
        &self.config_types
    }

    pub fn find_client(&self, name: &str) -> Result<&Client> {
        self.clients
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownClient {
                name: name.to_string(),
            })
    }

    pub fn find_config_type(&self, name: &str) -> Result<&ConfigType> {
        self.config_types
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::UnknownConfigType {
                name: name.to_string(),
            })
    }

    /// Look up the file spec for a (client, type) pair.
    ///
    /// An unknown type yields `UnknownConfigType`; a known type without an
    /// entry for the client yields `UnsupportedCombination`.
    pub fn find_file_spec(&self, client: &str, config_type: &str) -> Result<&FileSpec> {
        self.find_config_type(config_type)?
            .spec_for(client)
            .ok_or_else(|| Error::UnsupportedCombination {
                client: client.to_string(),
                config_type: config_type.to_string(),
            })
    }

    /// Client names in declaration order
    pub fn client_names(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.name.as_str()).collect()
    }

    /// Config type names in declaration order
    pub fn config_type_names(&self) -> Vec<&str> {
        self.config_types.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn default_client(&self) -> Option<&Client> {
        self.clients.first()
    }

    pub fn default_config_type(&self) -> Option<&ConfigType> {
        self.config_types.first()
    }
}
