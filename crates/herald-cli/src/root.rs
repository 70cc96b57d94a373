use herald_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `HERALD_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.herald/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_herald_dir(&cwd).unwrap_or(cwd)
}

fn find_herald_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| paths::herald_dir(dir).is_dir())
        .map(Path::to_path_buf)
}
