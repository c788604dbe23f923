pub mod list;
pub mod order;
pub mod providers;

use crate::errors::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Printed when no provider recognizes the directory.
pub const NOT_FOUND: &str = "No compatible workspace found";

/// Resolves a command's PATH argument to an absolute directory.
async fn start_dir(path: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(path).await.map_err(|source| {
        monodex_workspaces::Error::Io {
            source,
            path: Some(path.to_path_buf()),
            operation: "resolving the start directory".to_string(),
        }
        .into()
    })
}

/// `path` relative to `base` with forward slashes, `.` for `base` itself.
fn display_relative(path: &Path, base: &Path) -> String {
    let relative = path
        .strip_prefix(base)
        .map_or_else(|_| path.to_string_lossy(), Path::to_string_lossy)
        .replace('\\', "/");
    if relative.is_empty() {
        ".".to_string()
    } else {
        relative
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_relative() {
        let base = Path::new("/repo");
        assert_eq!(display_relative(Path::new("/repo"), base), ".");
        assert_eq!(display_relative(Path::new("/repo/libs/ui"), base), "libs/ui");
        assert_eq!(display_relative(Path::new("/elsewhere"), base), "/elsewhere");
    }

    #[tokio::test]
    async fn test_start_dir_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = start_dir(&temp.path().join("missing")).await.unwrap_err();
        assert!(err.to_string().contains("resolving the start directory"));
    }
}
