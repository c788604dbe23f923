use super::{start_dir, to_json};
use crate::cli::OutputFormat;
use crate::errors::Result;
use monodex_workspaces::{TracingLogger, detect_workspace_providers};
use std::path::Path;
use tracing::instrument;

/// Lists the workspace conventions that recognize `path`.
#[instrument(name = "providers")]
pub async fn execute_providers(path: &Path, output: OutputFormat) -> Result<String> {
    let hint = start_dir(path).await?;
    let found = detect_workspace_providers(&hint, &TracingLogger).await?;
    tracing::info!(count = found.len(), "Providers detected");

    match output {
        OutputFormat::Json => to_json(&found),
        OutputFormat::Text if found.is_empty() => Ok("No workspace providers detected".to_string()),
        OutputFormat::Text => Ok(found
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_providers_text_and_json() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"workspaces": ["packages/*"]}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("pnpm-workspace.yaml"),
            "packages:\n  - 'packages/*'\n",
        )
        .unwrap();

        let out = execute_providers(temp.path(), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(out, "yarn\npnpm");

        let out = execute_providers(temp.path(), OutputFormat::Json)
            .await
            .unwrap();
        let value: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(value, ["yarn", "pnpm"]);
    }

    #[tokio::test]
    async fn test_providers_none() {
        let temp = TempDir::new().unwrap();

        let out = execute_providers(temp.path(), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(out, "No workspace providers detected");
    }
}
