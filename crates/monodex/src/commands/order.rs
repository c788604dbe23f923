use super::{NOT_FOUND, display_relative, start_dir, to_json};
use crate::cli::OutputFormat;
use crate::errors::Result;
use monodex_workspaces::{
    PackageManager, ProviderType, TracingLogger, Workspace, WorkspaceOptions,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::instrument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderReport<'a> {
    root: &'a Path,
    provider: ProviderType,
    package_manager: Option<PackageManager>,
    packages: Vec<OrderedPackage<'a>>,
}

#[derive(Debug, Serialize)]
struct OrderedPackage<'a> {
    name: &'a str,
    root: PathBuf,
    dependencies: Vec<&'a str>,
}

/// Prints the packages of the workspace containing `path`, dependencies
/// first. `filter` is resolved relative to `path`.
#[instrument(name = "order")]
pub async fn execute_order(
    path: &Path,
    filter: Option<&str>,
    provider_type: Option<ProviderType>,
    include_root: bool,
    output: OutputFormat,
) -> Result<String> {
    let cwd = start_dir(path).await?;
    let options = WorkspaceOptions {
        cwd: cwd.clone(),
        provider_type,
        include_root,
    };

    let Some(workspace) = Workspace::resolve(&options, &TracingLogger).await? else {
        return Ok(match output {
            OutputFormat::Text => NOT_FOUND.to_string(),
            OutputFormat::Json => "null".to_string(),
        });
    };

    let selected = workspace.packages(filter, &cwd).await?;
    tracing::info!(
        provider = %workspace.provider(),
        selected = selected.len(),
        total = workspace.len(),
        "Workspace resolved"
    );

    let packages = selected
        .into_iter()
        .map(|package| OrderedPackage {
            name: &package.name,
            root: package.root.clone(),
            dependencies: workspace.deps(&package.name),
        })
        .collect::<Vec<_>>();

    match output {
        OutputFormat::Json => to_json(&OrderReport {
            root: workspace.root(),
            provider: workspace.provider(),
            package_manager: workspace.package_manager().await,
            packages,
        }),
        OutputFormat::Text => Ok(format_order(&workspace, &packages)),
    }
}

fn format_order(workspace: &Workspace, packages: &[OrderedPackage<'_>]) -> String {
    let mut lines = vec![format!(
        "{} workspace at {}",
        workspace.provider().label(),
        workspace.root().display()
    )];
    for package in packages {
        let mut line = format!(
            "  {} ({})",
            package.name,
            display_relative(&package.root, workspace.root())
        );
        if !package.dependencies.is_empty() {
            line.push_str(" <- ");
            line.push_str(&package.dependencies.join(", "));
        }
        lines.push(line);
    }
    lines.join("\n")
}
