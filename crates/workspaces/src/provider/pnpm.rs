//! `pnpm-workspace.yaml`.

use super::ProviderResult;
use crate::error::Result;
use crate::fs::{find_up, read_yaml_file};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Option<Vec<String>>,
}

/// Reads the `packages` list of the nearest `pnpm-workspace.yaml`.
pub(super) async fn detect(hint: &Path) -> Result<Option<ProviderResult>> {
    let Some(root) = find_up("pnpm-workspace.yaml", hint).await else {
        return Ok(None);
    };

    // An empty file deserializes to `None`.
    let config: Option<PnpmWorkspace> = read_yaml_file(&root.join("pnpm-workspace.yaml")).await?;
    Ok(config
        .and_then(|c| c.packages)
        .map(|patterns| ProviderResult::new(root, patterns)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_packages_list() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("packages/web")).unwrap();
        fs::write(
            root.join("pnpm-workspace.yaml"),
            "packages:\n  - 'packages/*'\n  - '!**/test/**'\n",
        )
        .unwrap();

        let result = detect(&root.join("packages/web")).await.unwrap().unwrap();
        assert_eq!(result.root, root);
        assert_eq!(result.patterns, vec!["packages/*", "!**/test/**"]);
    }

    #[tokio::test]
    async fn test_without_packages_declines() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pnpm-workspace.yaml"), "catalog:\n  react: ^18\n").unwrap();

        assert_eq!(detect(temp.path()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_file_declines() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pnpm-workspace.yaml"), "").unwrap();

        assert_eq!(detect(temp.path()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pnpm-workspace.yaml"), "packages: [unclosed").unwrap();

        let err = detect(temp.path()).await.unwrap_err();
        assert!(err.is_parse_failure());
    }
}
