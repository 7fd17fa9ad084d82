//! Home directory resolution and `~` expansion for client directories.

use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The home-directory shorthand allowed at the start of a client directory
pub const HOME_SHORTHAND: &str = "~";

/// Resolve the invoking user's home directory
pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Expand a leading `~` (either `~` alone or `~/...`) against `home`.
///
/// When `home` is `None` the shorthand is left in place and a warning is
/// logged, so the result is still deterministic. Any other directory is
/// returned unchanged.
pub fn expand_home(dir: &str, home: Option<&Path>) -> PathBuf {
    let rest = if dir == HOME_SHORTHAND {
        Some("")
    } else {
        dir.strip_prefix("~/")
    };

    match (rest, home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) => home.join(rest),
        (Some(_), None) => {
            warn!(dir, "Could not determine home directory, leaving path unexpanded");
            PathBuf::from(dir)
        }
        (None, _) => PathBuf::from(dir),
    }
}
