//! Filesystem utility functions
//!
//! Symlink primitives used by the switch engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Suffix of the temporary link used while swapping the active link
const TEMP_LINK_SUFFIX: &str = "cc-manager-tmp";

/// Create a symbolic link at `link` pointing to `target`
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Hidden sibling path used to stage a new link before renaming it into place
pub fn temp_link_path(link: &Path) -> PathBuf {
    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    link.with_file_name(format!(".{}.{}", name, TEMP_LINK_SUFFIX))
}

/// Point `link` at `target`, replacing any existing link at that path.
///
/// The new link is created under a temporary name in the same directory and
/// renamed over `link`, so readers see either the old target or the new one
/// and never a missing link. The caller must make sure `link` is not a
/// regular file or directory.
pub fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    let temp = temp_link_path(link);

    // Left behind by an interrupted run
    if fs::symlink_metadata(&temp).is_ok() {
        debug!(path = %temp.display(), "Removing stale temporary link");
        fs::remove_file(&temp)
            .map_err(|e| Error::fs("Failed to remove stale temporary link", &temp, e))?;
    }

    create_symlink(target, &temp)
        .map_err(|e| Error::fs("Failed to create symlink", &temp, e))?;

    if let Err(e) = fs::rename(&temp, link) {
        let _ = fs::remove_file(&temp);
        return Err(Error::fs("Failed to move symlink into place", link, e));
    }

    debug!(from = %link.display(), to = %target.display(), "Created symlink");
    Ok(())
}
