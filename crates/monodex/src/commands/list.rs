use super::{NOT_FOUND, display_relative, start_dir, to_json};
use crate::cli::{OutputFormat, ProviderArgs};
use crate::config::load_options;
use crate::errors::Result;
use monodex_workspaces::{CatalogueEntry, TracingLogger, resolve_catalogue};
use std::path::Path;
use tracing::instrument;

/// Lists the catalogue for `path`, rendered as text or JSON.
#[instrument(name = "list", skip(args))]
pub async fn execute_list(
    path: &Path,
    config: Option<&Path>,
    args: &ProviderArgs,
    output: OutputFormat,
) -> Result<String> {
    let root = start_dir(path).await?;
    let mut options = load_options(config, &root).await?;
    args.apply(&mut options);

    let entries = resolve_catalogue(&root, &options, &TracingLogger).await?;
    tracing::info!(
        entries = entries.as_ref().map_or(0, Vec::len),
        "Catalogue resolved"
    );

    match (entries, output) {
        (None, OutputFormat::Text) => Ok(NOT_FOUND.to_string()),
        (None, OutputFormat::Json) => to_json(&Vec::<CatalogueEntry>::new()),
        (Some(entries), OutputFormat::Json) => to_json(&entries),
        (Some(entries), OutputFormat::Text) => Ok(format_entries(&entries, &root)),
    }
}

fn format_entries(entries: &[CatalogueEntry], root: &Path) -> String {
    let width = entries
        .iter()
        .map(|e| e.prefix.chars().count() + 1 + e.label.chars().count())
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .map(|entry| {
            let head = format!("{} {}", entry.prefix, entry.label);
            let pad = width.saturating_sub(head.chars().count());
            let mut line = format!(
                "{head}{:pad$}  {}",
                "",
                display_relative(&entry.root, root)
            );
            let note = if entry.detail.is_empty() {
                &entry.description
            } else {
                &entry.detail
            };
            if entry.is_workspace_root || !entry.detail.is_empty() {
                line.push_str("  ");
                line.push_str(note);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
