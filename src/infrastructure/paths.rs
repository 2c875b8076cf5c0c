//! Filesystem locations used by the crate.

use std::path::PathBuf;

/// Directory name created under the platform data directory.
const APP_DIR: &str = "reelsync";

/// Returns the directory holding the favorites file and trace output.
///
/// This is `<platform data dir>/reelsync`, e.g. `~/.local/share/reelsync` on
/// Linux. Falls back to `./reelsync` when the platform has no data directory.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, and all paths when no home directory is
/// known, are returned unchanged.
///
/// # Examples
///
/// ```
/// use reelsync::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/var/lib/favorites.json").to_str(), Some("/var/lib/favorites.json"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(path);
    };

    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(get_data_dir().ends_with(APP_DIR));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/movies/favorites.json"), home.join("movies/favorites.json"));
            assert_eq!(expand_tilde("~"), home);
        }
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }
}
