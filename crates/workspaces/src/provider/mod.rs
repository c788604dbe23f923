//! Provider set: one detection strategy per monorepo convention.
//!
//! Every provider takes a starting directory and either declines (`None`) or
//! reports the workspace root plus member glob patterns. Providers never look
//! at each other's results; [`ProviderType::ALL`] fixes the order in which the
//! workspace resolver tries them.

mod lerna;
mod pnpm;
mod rush;
mod yarn;

use crate::error::{Error, Result};
use crate::fs::find_up;
use crate::logger::Logger;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root and member patterns reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResult {
    /// Workspace root directory.
    pub root: PathBuf,
    /// Member glob patterns, relative to `root` unless absolute.
    pub patterns: Vec<String>,
}

impl ProviderResult {
    /// Creates a provider result.
    #[must_use]
    pub fn new(root: PathBuf, patterns: Vec<String>) -> Self {
        Self { root, patterns }
    }
}

/// The monorepo conventions understood by the generic provider chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// npm / yarn / bun `workspaces` in `package.json`.
    Yarn,
    /// `pnpm-workspace.yaml`.
    Pnpm,
    /// `lerna.json`.
    Lerna,
    /// `rush.json`.
    Rush,
    /// Every `package.json` below the starting directory.
    Recursive,
    /// The nearest `package.json` as a one-package workspace.
    Single,
}

impl ProviderType {
    /// All providers in the order they are tried.
    pub const ALL: [Self; 6] = [
        Self::Yarn,
        Self::Pnpm,
        Self::Lerna,
        Self::Rush,
        Self::Recursive,
        Self::Single,
    ];

    /// Lowercase tag, as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Lerna => "lerna",
            Self::Rush => "rush",
            Self::Recursive => "recursive",
            Self::Single => "single",
        }
    }

    /// Capitalized name for display, e.g. `"Pnpm"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Yarn => "Yarn",
            Self::Pnpm => "Pnpm",
            Self::Lerna => "Lerna",
            Self::Rush => "Rush",
            Self::Recursive => "Recursive",
            Self::Single => "Single",
        }
    }

    /// `true` for the providers that match almost any tree and therefore do
    /// not count as a detected convention.
    #[must_use]
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Recursive | Self::Single)
    }

    /// Runs this provider from `hint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's config file exists but cannot be
    /// read or parsed.
    pub async fn detect(self, hint: &Path, logger: &dyn Logger) -> Result<Option<ProviderResult>> {
        logger.info(&format!("Getting {}", self.label()));

        let result = match self {
            Self::Yarn => yarn::detect(hint, logger).await?,
            Self::Pnpm => pnpm::detect(hint).await?,
            Self::Lerna => lerna::detect(hint).await?,
            Self::Rush => rush::detect(hint).await?,
            Self::Recursive => Some(ProviderResult::new(
                hint.to_path_buf(),
                vec!["*/**".to_string()],
            )),
            Self::Single => find_up("package.json", hint)
                .await
                .map(|root| {
                    let pattern = root.display().to_string();
                    ProviderResult::new(root, vec![pattern])
                }),
        };

        if let Some(found) = &result {
            tracing::debug!(
                provider = %self,
                root = %found.root.display(),
                patterns = ?found.patterns,
                "Provider matched"
            );
        }
        Ok(result)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnsupportedWorkspaceType {
                name: s.to_string(),
            })
    }
}

/// Lists the conventions that recognize `hint`, skipping the fallback
/// providers and any provider that reports no patterns.
///
/// # Errors
///
/// Propagates parse errors from any provider's config file.
pub async fn detect_workspace_providers(
    hint: &Path,
    logger: &dyn Logger,
) -> Result<Vec<ProviderType>> {
    let mut found = Vec::new();
    for provider in ProviderType::ALL {
        if provider.is_fallback() {
            continue;
        }
        if let Some(result) = provider.detect(hint, logger).await? {
            if !result.patterns.is_empty() {
                found.push(provider);
            }
        }
    }
    Ok(found)
}
