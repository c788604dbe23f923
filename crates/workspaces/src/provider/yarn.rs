//! npm / yarn / bun workspaces declared in `package.json`.

use super::ProviderResult;
use crate::error::Result;
use crate::fs::find_up;
use crate::logger::Logger;
use crate::manifest::{ManifestKind, read_manifest};
use std::path::Path;

/// Finds the closest `package.json` with a usable `workspaces` field.
///
/// A manifest without one does not stop the search: it restarts from the
/// manifest's parent directory, so each rejection moves one level outward.
pub(super) async fn detect(hint: &Path, logger: &dyn Logger) -> Result<Option<ProviderResult>> {
    let mut candidate = find_up("package.json", hint).await;

    while let Some(root) = candidate {
        if let Some(manifest) = read_manifest(&root, ManifestKind::PackageJson).await? {
            if let Some(patterns) = manifest.workspaces.as_ref().and_then(|w| w.patterns()) {
                return Ok(Some(ProviderResult::new(root, patterns.to_vec())));
            }
        }

        logger.info(&format!(
            "No workspaces in {}, looking further up",
            root.join("package.json").display()
        ));
        candidate = match root.parent() {
            Some(parent) if parent != root => find_up("package.json", parent).await,
            _ => None,
        };
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NoopLogger;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_array_workspaces() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("package.json"), r#"{"workspaces": ["packages/*", "apps/*"]}"#)
            .unwrap();

        let result = detect(root, &NoopLogger).await.unwrap().unwrap();
        assert_eq!(result.root, root);
        assert_eq!(result.patterns, vec!["packages/*", "apps/*"]);
    }

    #[tokio::test]
    async fn test_object_workspaces() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(
            root.join("package.json"),
            r#"{"workspaces": {"packages": ["libs/*"], "nohoist": ["**/jest"]}}"#,
        )
        .unwrap();

        let result = detect(root, &NoopLogger).await.unwrap().unwrap();
        assert_eq!(result.patterns, vec!["libs/*"]);
    }

    #[tokio::test]
    async fn test_member_manifest_skipped_moving_outward() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let member = root.join("packages/a");
        fs::create_dir_all(member.join("src")).unwrap();
        fs::write(root.join("package.json"), r#"{"workspaces": ["packages/*"]}"#).unwrap();
        fs::write(member.join("package.json"), r#"{"name": "a"}"#).unwrap();

        let result = detect(&member.join("src"), &NoopLogger)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.root, root);
    }

    #[tokio::test]
    async fn test_closest_declaring_ancestor_wins() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path();
        let inner = outer.join("nested");
        fs::create_dir_all(&inner).unwrap();
        fs::write(outer.join("package.json"), r#"{"workspaces": ["outer/*"]}"#).unwrap();
        fs::write(inner.join("package.json"), r#"{"workspaces": ["inner/*"]}"#).unwrap();

        let result = detect(&inner, &NoopLogger).await.unwrap().unwrap();
        assert_eq!(result.root, inner);
        assert_eq!(result.patterns, vec!["inner/*"]);
    }

    #[tokio::test]
    async fn test_malformed_manifest_fails_provider() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{ \"workspaces\": ").unwrap();

        let err = detect(temp.path(), &NoopLogger).await.unwrap_err();
        assert!(err.is_parse_failure());
    }
}
