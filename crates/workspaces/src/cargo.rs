//! Cargo workspace members.

use crate::error::Result;
use crate::expand::{ExpandOptions, find_manifest_dirs};
use crate::fs::{find_up, read_toml_file};
use crate::logger::Logger;
use crate::manifest::{ManifestKind, Member, ProjectSet, read_manifest};
use futures::future::try_join_all;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct RootManifest {
    workspace: Option<WorkspaceTable>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkspaceTable {
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

/// Resolves the members of the Cargo workspace enclosing `hint`.
///
/// The search moves outward past member crates until it reaches a
/// `Cargo.toml` with a `[workspace]` table. Returns `Ok(None)` if there is
/// none. Member manifests without a `[package]` table are skipped with a
/// warning.
///
/// # Errors
///
/// Returns a parse error if a located `Cargo.toml` is malformed, or
/// [`crate::Error::InvalidGlob`] for a bad `members` entry.
#[tracing::instrument(skip_all, fields(hint = %hint.display()))]
pub async fn cargo_projects(hint: &Path, logger: &dyn Logger) -> Result<Option<ProjectSet>> {
    let Some((root, workspace)) = find_workspace_root(hint).await? else {
        return Ok(None);
    };
    logger.info(&format!("Getting Cargo packages from {}", root.display()));

    let patterns: Vec<String> = workspace
        .members
        .into_iter()
        .chain(workspace.exclude.into_iter().map(|e| format!("!{e}")))
        .collect();
    let dirs = find_manifest_dirs(
        &root,
        &patterns,
        ManifestKind::CargoToml.file_name(),
        &ExpandOptions::with_ignore(vec!["**/target/**".to_string()]),
    )
    .await?;

    let manifests = try_join_all(
        dirs.iter()
            .map(|dir| read_manifest(dir, ManifestKind::CargoToml)),
    )
    .await?;

    let mut projects = Vec::with_capacity(dirs.len());
    for (dir, manifest) in dirs.into_iter().zip(manifests) {
        match manifest.and_then(|m| m.name) {
            Some(name) => projects.push(Member { name, root: dir }),
            None => logger.warn(&format!(
                "Skipping {}: no [package] name",
                dir.join("Cargo.toml").display()
            )),
        }
    }

    tracing::debug!(count = projects.len(), "Resolved Cargo members");
    Ok(Some(ProjectSet { root, projects }))
}

async fn find_workspace_root(hint: &Path) -> Result<Option<(PathBuf, WorkspaceTable)>> {
    let mut candidate = find_up("Cargo.toml", hint).await;

    while let Some(dir) = candidate {
        let manifest: RootManifest = read_toml_file(&dir.join("Cargo.toml")).await?;
        if let Some(workspace) = manifest.workspace {
            return Ok(Some((dir, workspace)));
        }

        candidate = match dir.parent() {
            Some(parent) if parent != dir => find_up("Cargo.toml", parent).await,
            _ => None,
        };
    }

    Ok(None)
}
