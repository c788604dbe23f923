//! Filesystem primitives shared by every provider.
//!
//! [`find_up`] is the upward finder used for root detection. The `read_*`
//! helpers read and deserialize a single config file and attach the file path
//! to any error they produce.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Returns `true` if `path` exists.
///
/// Permission errors and other I/O failures count as "does not exist".
pub async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Searches `start` and each of its ancestors for `marker`.
///
/// Returns the first directory that contains `marker`, or `None` once the
/// filesystem root has been checked.
///
/// # Examples
///
/// ```no_run
/// # async fn demo() {
/// use monodex_workspaces::find_up;
/// use std::path::Path;
///
/// if let Some(root) = find_up("pnpm-workspace.yaml", Path::new("packages/app")).await {
///     println!("pnpm root at {}", root.display());
/// }
/// # }
/// ```
pub async fn find_up(marker: &str, start: &Path) -> Option<PathBuf> {
    let mut dir = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());

    loop {
        if path_exists(&dir.join(marker)).await {
            tracing::trace!(marker, dir = %dir.display(), "Found marker");
            return Some(dir);
        }

        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => return None,
        }
    }
}

/// Reads a file to a string, tagging errors with the path and operation.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
pub async fn read_to_string(path: &Path, operation: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Io {
            source: e,
            path: Some(path.to_path_buf()),
            operation: operation.to_string(),
        })
}

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid JSON.
pub async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path, "reading json file").await?;

    serde_json::from_str(&content).map_err(|e| Error::Json {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

/// Reads and parses a JSON file that may contain comments and trailing
/// commas, as `lerna.json`, `rush.json` and the Nx files commonly do.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSONC, or does
/// not match `T`.
pub async fn read_jsonc_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path, "reading jsonc file").await?;

    let parsed = jsonc_parser::parse_to_value(&content, &jsonc_parser::ParseOptions::default())
        .map_err(|err| Error::Jsonc {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?
        .ok_or_else(|| Error::Jsonc {
            path: path.to_path_buf(),
            message: "document is empty".to_string(),
        })?;

    serde_json::from_value(jsonc_to_serde_value(parsed)).map_err(|e| Error::Json {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

/// Reads and parses a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid YAML.
pub async fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path, "reading yaml file").await?;

    serde_yaml::from_str(&content).map_err(|e| Error::Yaml {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

/// Reads and parses a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid TOML.
pub async fn read_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path, "reading toml file").await?;

    toml::from_str(&content).map_err(|e| Error::Toml {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

fn jsonc_to_serde_value(value: jsonc_parser::JsonValue) -> Value {
    match value {
        jsonc_parser::JsonValue::Null => Value::Null,
        jsonc_parser::JsonValue::Boolean(b) => Value::Bool(b),
        jsonc_parser::JsonValue::Number(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::Number(i.into())
            } else if let Ok(f) = n.parse::<f64>() {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        jsonc_parser::JsonValue::String(s) => Value::String(s.to_string()),
        jsonc_parser::JsonValue::Array(arr) => {
            Value::Array(arr.into_iter().map(jsonc_to_serde_value).collect())
        }
        jsonc_parser::JsonValue::Object(obj) => {
            let mut map = serde_json::Map::new();
            for (key, value) in obj {
                map.insert(key, jsonc_to_serde_value(value));
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[derive(serde::Deserialize)]
    struct Named {
        name: String,
    }

    #[tokio::test]
    async fn test_find_up_in_start_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("lerna.json"), "{}").unwrap();

        assert_eq!(find_up("lerna.json", root).await, Some(root.to_path_buf()));
    }

    #[tokio::test]
    async fn test_find_up_many_levels_below() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let deep = root.join("a/b/c/d/e/f");
        fs::create_dir_all(&deep).unwrap();
        fs::write(root.join("rush.json"), "{}").unwrap();

        assert_eq!(find_up("rush.json", &deep).await, Some(root.to_path_buf()));
    }

    #[tokio::test]
    async fn test_find_up_prefers_closest_ancestor() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let nested = root.join("packages/a");
        fs::create_dir_all(nested.join("src")).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(nested.join("package.json"), "{}").unwrap();

        assert_eq!(
            find_up("package.json", &nested.join("src")).await,
            Some(nested.clone())
        );
    }

    #[tokio::test]
    async fn test_find_up_missing_marker_terminates() {
        let temp = TempDir::new().unwrap();
        let deep = temp.path().join("x/y");
        fs::create_dir_all(&deep).unwrap();

        let marker = "monodex-marker-that-should-not-exist-anywhere.json";
        assert_eq!(find_up(marker, &deep).await, None);
    }

    #[tokio::test]
    async fn test_find_up_at_filesystem_root() {
        let root = Path::new("/");
        // The filesystem root is its own parent; the search must stop there.
        assert_eq!(find_up("definitely-not-here.marker", root).await, None);
    }

    #[tokio::test]
    async fn test_read_json_file_invalid() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("package.json");
        fs::write(&file, r#"{"name": "#).unwrap();

        let result: Result<Named> = read_json_file(&file).await;
        assert!(matches!(result, Err(Error::Json { path: Some(_), .. })));
    }

    #[tokio::test]
    async fn test_read_json_file_missing_is_io_error() {
        let result: Result<Named> = read_json_file(Path::new("/nonexistent/package.json")).await;
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn test_read_jsonc_file_with_comments() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("rush.json");
        fs::write(
            &file,
            r#"{
                // rush.json files are usually heavily commented
                "name": /* inline */ "rush-root"
            }"#,
        )
        .unwrap();

        let data: Named = read_jsonc_file(&file).await.unwrap();
        assert_eq!(data.name, "rush-root");
    }

    #[tokio::test]
    async fn test_read_jsonc_file_invalid() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("lerna.json");
        fs::write(&file, "{ \"packages\": [ }").unwrap();

        let result: Result<Named> = read_jsonc_file(&file).await;
        assert!(matches!(result, Err(Error::Jsonc { .. })));
    }

    #[tokio::test]
    async fn test_read_toml_file_valid() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("test.toml");
        fs::write(&file, r#"name = "test""#).unwrap();

        let data: Named = read_toml_file(&file).await.unwrap();
        assert_eq!(data.name, "test");
    }

    #[tokio::test]
    async fn test_read_yaml_file_invalid() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("pnpm-workspace.yaml");
        fs::write(&file, "invalid: yaml: structure:").unwrap();

        let result: Result<Named> = read_yaml_file(&file).await;
        assert!(matches!(result, Err(Error::Yaml { .. })));
    }
}
