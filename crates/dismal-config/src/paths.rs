//! Platform-specific paths for the distribution library and configuration.
//!
//! # Directory Structure
//!
//! - **User library**: `~/.config/dismal/distributions/` (Linux), `~/Library/Application Support/dismal/distributions/` (macOS), `%APPDATA%\dismal\distributions\` (Windows)
//! - **User config**: `~/.config/dismal/` (Linux), `~/Library/Application Support/dismal/` (macOS), `%APPDATA%\dismal\` (Windows)
//! - **System library**: `/usr/share/dismal/distributions/` (Linux), `/Library/Application Support/dismal/distributions/` (macOS)
//!
//! # Example
//!
//! ```rust,no_run
//! use dismal_config::paths;
//!
//! if let Some(path) = paths::find_distribution("bell") {
//!     println!("Found distribution at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::file::FILE_EXTENSION;

/// Application name used for directory paths.
const APP_NAME: &str = "dismal";

/// Subdirectory name for the distribution library.
const DISTRIBUTIONS_SUBDIR: &str = "distributions";

/// Returns the user-specific distribution library.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_distributions_dir() -> PathBuf {
    user_config_dir().join(DISTRIBUTIONS_SUBDIR)
}

/// Returns the user-specific configuration directory.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the system-wide distribution library. Usually read-only.
pub fn system_distributions_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/usr/share")
            .join(APP_NAME)
            .join(DISTRIBUTIONS_SUBDIR)
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support")
            .join(APP_NAME)
            .join(DISTRIBUTIONS_SUBDIR)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(DISTRIBUTIONS_SUBDIR)
    }
}

/// File name for a library entry: `name` plus the data file extension.
pub fn distribution_file_name(name: &str) -> String {
    if name.ends_with(FILE_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}.{FILE_EXTENSION}")
    }
}

/// Find a distribution file by path or library name.
///
/// Searches in the following order:
/// 1. `name` as a file path
/// 2. User library
/// 3. System library
pub fn find_distribution(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = distribution_file_name(name);
    [user_distributions_dir(), system_distributions_dir()]
        .into_iter()
        .map(|dir| dir.join(&filename))
        .find(|p| p.is_file())
}

/// Ensure the user library exists, creating it if needed.
pub fn ensure_user_distributions_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_distributions_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// Distribution files in the user library.
pub fn list_user_distributions() -> Vec<PathBuf> {
    list_distributions_in_dir(&user_distributions_dir())
}

/// Distribution files in the user library followed by the system library.
pub fn list_all_distributions() -> Vec<PathBuf> {
    let mut found = list_user_distributions();
    found.extend(list_distributions_in_dir(&system_distributions_dir()));
    found
}

/// Data files in `dir`, sorted by path. Empty if `dir` can't be read.
pub fn list_distributions_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && distribution_name_from_path(path).is_some())
        .collect();
    found.sort();
    found
}

/// The library name of a data file: its file name without the extension.
///
/// # Example
///
/// ```rust
/// use dismal_config::paths::distribution_name_from_path;
/// use std::path::Path;
///
/// let name = distribution_name_from_path(Path::new("/lib/bell.dismal.toml"));
/// assert_eq!(name, Some("bell".to_string()));
/// assert_eq!(distribution_name_from_path(Path::new("bell.toml")), None);
/// ```
pub fn distribution_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(FILE_EXTENSION)?.strip_suffix('.')?;
    (!stem.is_empty()).then(|| stem.to_string())
}
