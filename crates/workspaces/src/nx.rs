//! Nx projects.
//!
//! Two layouts are understood. A legacy `workspace.json` maps project names
//! to roots directly. Without one, the tree under `nx.json` is scanned for
//! `project.json` files, one per project.

use crate::error::{Error, Result};
use crate::expand::{ExpandOptions, find_manifest_dirs};
use crate::fs::{find_up, read_jsonc_file};
use crate::logger::Logger;
use crate::manifest::{Member, ProjectSet};
use futures::future::try_join_all;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Build output and cache directories that never hold project sources.
const SCAN_IGNORE: [&str; 4] = ["**/dist/**", "**/tmp/**", "**/.nx/**", "**/coverage/**"];

#[derive(Debug, Deserialize)]
struct WorkspaceJson {
    #[serde(default)]
    projects: BTreeMap<String, ProjectRef>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectRef {
    Root(String),
    Config { root: String },
}

impl ProjectRef {
    fn root(&self) -> &str {
        match self {
            Self::Root(root) | Self::Config { root } => root,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectJson {
    name: Option<String>,
}

/// Resolves the Nx projects visible from `hint`.
///
/// Returns `Ok(None)` when neither `workspace.json` nor `nx.json` is found
/// upward.
///
/// # Errors
///
/// Returns a parse error if `workspace.json` or any `project.json` is
/// malformed.
#[tracing::instrument(skip_all, fields(hint = %hint.display()))]
pub async fn nx_projects(hint: &Path, logger: &dyn Logger) -> Result<Option<ProjectSet>> {
    if let Some(root) = find_up("workspace.json", hint).await {
        logger.info(&format!("Parsing {}", root.join("workspace.json").display()));
        let projects = from_workspace_json(&root).await?;
        return Ok(Some(ProjectSet { root, projects }));
    }

    if let Some(root) = find_up("nx.json", hint).await {
        logger.info(&format!("Scanning {} for project.json files", root.display()));
        let projects = from_project_files(&root).await?;
        return Ok(Some(ProjectSet { root, projects }));
    }

    Ok(None)
}

async fn from_workspace_json(root: &Path) -> Result<Vec<Member>> {
    let workspace: WorkspaceJson = read_jsonc_file(&root.join("workspace.json")).await?;

    Ok(workspace
        .projects
        .into_iter()
        .map(|(name, project)| Member {
            root: project_dir(root, project.root()),
            name,
        })
        .collect())
}

/// Joins a `workspace.json` project root onto the workspace root, dropping
/// `.` segments so `./apps/web` and `apps/web` name the same folder.
fn project_dir(root: &Path, rel: &str) -> PathBuf {
    Path::new(rel)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .fold(root.to_path_buf(), |dir, c| dir.join(c))
}

async fn from_project_files(root: &Path) -> Result<Vec<Member>> {
    let ignore = SCAN_IGNORE.iter().map(ToString::to_string).collect();
    let dirs = find_manifest_dirs(
        root,
        &["**".to_string()],
        "project.json",
        &ExpandOptions::with_ignore(ignore),
    )
    .await?;

    try_join_all(dirs.into_iter().map(|dir| async move {
        let project: ProjectJson = read_jsonc_file(&dir.join("project.json")).await?;
        let name = project
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| name_from_path(root, &dir));
        Ok::<_, Error>(Member { name, root: dir })
    }))
    .await
}

// `libs/shared/ui` becomes `libs-shared-ui`; the Nx root itself takes its
// directory name.
fn name_from_path(root: &Path, dir: &Path) -> String {
    let segments: Vec<String> = dir
        .strip_prefix(root)
        .unwrap_or(dir)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if segments.is_empty() {
        root.file_name()
            .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned())
    } else {
        segments.join("-")
    }
}
