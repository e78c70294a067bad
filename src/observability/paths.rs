//! Log directory resolution and log file creation.
//!
//! # Responsibilities
//! - Turn the configured log directory into a clean path
//! - Create the directory tree and open `turbo.log` for appending
//!
//! # Design Decisions
//! - Resolution is purely lexical; symlinks are not followed
//! - A blank configuration falls back to `log`
//! - Relative paths without a service root stay relative

use std::fs::{self, File, OpenOptions};
use std::path::{Component, Path, PathBuf};

use crate::observability::LoggingError;

/// Directory used when no log path is configured.
pub const DEFAULT_LOG_DIR: &str = "log";

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "turbo.log";

/// Lexically normalize a path.
///
/// Collapses `.` and duplicate separators, resolves `..` against the
/// preceding component, and drops `..` above the root. An empty result
/// becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut prefix = PathBuf::new();
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    let mut rooted = false;
    // Leading `..` on a relative path cannot be resolved and is kept.
    let mut leading_parents = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix.push(p.as_os_str()),
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() && !rooted {
                    leading_parents += 1;
                }
            }
            Component::Normal(part) => parts.push(part),
        }
    }

    let mut cleaned = prefix;
    if rooted {
        cleaned.push(Component::RootDir.as_os_str());
    }
    for _ in 0..leading_parents {
        cleaned.push("..");
    }
    for part in parts {
        cleaned.push(part);
    }

    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Resolve the log directory from its configured value and the service root.
///
/// `service_root` is expected to already be absolute when it is not blank.
pub fn resolve_log_directory(configured: &str, service_root: &str) -> PathBuf {
    let configured = if configured.trim().is_empty() {
        DEFAULT_LOG_DIR
    } else {
        configured
    };

    let path = Path::new(configured);
    if path.is_absolute() || service_root.trim().is_empty() {
        return clean_path(path);
    }

    clean_path(&Path::new(service_root).join(path))
}

/// Path of the log file inside `dir`.
pub fn log_file_path(dir: &Path) -> PathBuf {
    clean_path(&dir.join(LOG_FILE_NAME))
}

/// Create `dir` (and its parents) and open the log file inside it for appending.
pub fn open_log_file(dir: &Path) -> Result<(PathBuf, File), LoggingError> {
    create_log_dir(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = log_file_path(dir);
    let file = append_options()
        .open(&path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.clone(),
            source,
        })?;

    Ok((path, file))
}

#[cfg(unix)]
fn create_log_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_log_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

fn append_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }
    options
}
