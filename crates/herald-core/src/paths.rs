use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HERALD_DIR: &str = ".herald";
pub const CONFIG_FILE: &str = ".herald/config.yaml";
pub const TRACKED_FILE: &str = ".herald/tracked_cards.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn herald_dir(root: &Path) -> PathBuf {
    root.join(HERALD_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root. Absolute paths win.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_root() {
        let root = Path::new("/srv/bot");
        assert_eq!(
            resolve(root, Path::new(TRACKED_FILE)),
            PathBuf::from("/srv/bot/.herald/tracked_cards.json")
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        let root = Path::new("/srv/bot");
        assert_eq!(
            resolve(root, Path::new("/var/lib/herald/ids.json")),
            PathBuf::from("/var/lib/herald/ids.json")
        );
    }
}
