//! Catalogue options file.
//!
//! Options come from `--config FILE` when given, otherwise from
//! `monodex.toml` in the listed directory when it exists, otherwise from
//! defaults. Command-line flags are layered on top by the caller.

use crate::errors::{CliError, Result};
use monodex_workspaces::CatalogueOptions;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "monodex.toml";

/// Loads catalogue options for a listing rooted at `root`.
///
/// A missing `monodex.toml` falls back to defaults; a missing explicit file
/// is an error.
pub async fn load_options(explicit: Option<&Path>, root: &Path) -> Result<CatalogueOptions> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (root.join(CONFIG_FILE), false),
    };

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No options file, using defaults");
            return Ok(CatalogueOptions::default());
        }
        Err(source) => return Err(CliError::ConfigRead { path, source }),
    };

    parse_options(&content, path)
}

fn parse_options(content: &str, path: PathBuf) -> Result<CatalogueOptions> {
    let options = toml::from_str(content).map_err(|source| CliError::ConfigParse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded options file");
    Ok(options)
}
