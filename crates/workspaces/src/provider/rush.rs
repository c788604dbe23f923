//! `rush.json`.

use super::ProviderResult;
use crate::error::Result;
use crate::fs::{find_up, read_jsonc_file};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RushConfig {
    #[serde(default)]
    projects: Vec<RushProject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RushProject {
    project_folder: String,
}

pub(super) async fn detect(hint: &Path) -> Result<Option<ProviderResult>> {
    let Some(root) = find_up("rush.json", hint).await else {
        return Ok(None);
    };

    let config: RushConfig = read_jsonc_file(&root.join("rush.json")).await?;
    let patterns = config
        .projects
        .into_iter()
        .map(|p| p.project_folder)
        .collect();
    Ok(Some(ProviderResult::new(root, patterns)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_project_folders() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("rush.json"),
            r#"{
                "$schema": "https://developer.microsoft.com/json-schemas/rush/v5/rush.schema.json",
                /* rush.json is JSON with comments */
                "rushVersion": "5.100.0",
                "projects": [
                    { "packageName": "@acme/core", "projectFolder": "libraries/core" },
                    { "packageName": "@acme/web", "projectFolder": "apps/web" }
                ]
            }"#,
        )
        .unwrap();

        let result = detect(temp.path()).await.unwrap().unwrap();
        assert_eq!(result.patterns, vec!["libraries/core", "apps/web"]);
    }

    #[tokio::test]
    async fn test_project_without_folder_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("rush.json"),
            r#"{"projects": [{"packageName": "x"}]}"#,
        )
        .unwrap();

        assert!(detect(temp.path()).await.unwrap_err().is_parse_failure());
    }
}
