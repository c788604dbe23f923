//! `lerna.json`.

use super::ProviderResult;
use crate::error::Result;
use crate::fs::{find_up, read_jsonc_file};
use serde::Deserialize;
use std::path::Path;

/// Lerna's own default when `packages` is omitted.
const DEFAULT_PACKAGES: &str = "packages/*";

#[derive(Debug, Deserialize)]
struct LernaConfig {
    #[serde(default)]
    packages: Option<Vec<String>>,
}

pub(super) async fn detect(hint: &Path) -> Result<Option<ProviderResult>> {
    let Some(root) = find_up("lerna.json", hint).await else {
        return Ok(None);
    };

    let config: LernaConfig = read_jsonc_file(&root.join("lerna.json")).await?;
    let patterns = config
        .packages
        .unwrap_or_else(|| vec![DEFAULT_PACKAGES.to_string()]);
    Ok(Some(ProviderResult::new(root, patterns)))
}
