//! Catalogue Builder: merges the core workspace, Nx projects and Cargo
//! members found from one root into a single list of folder entries.

use crate::cargo::cargo_projects;
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::manifest::{ManifestKind, ProjectSet, read_manifest};
use crate::nx::nx_projects;
use crate::workspace::{Workspace, WorkspaceOptions};
use futures::future::join_all;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which subsystems [`resolve_catalogue`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderToggles {
    /// The yarn/pnpm/lerna/rush/recursive/single chain.
    pub core: bool,
    /// Nx projects.
    pub nx: bool,
    /// Cargo workspace members.
    pub cargo: bool,
}

impl Default for ProviderToggles {
    fn default() -> Self {
        Self {
            core: true,
            nx: true,
            cargo: true,
        }
    }
}

/// Prefix shown for each folder category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixOptions {
    /// Application folders.
    pub apps: String,
    /// Library folders.
    pub libs: String,
    /// Tooling folders.
    pub tools: String,
    /// A subsystem root.
    pub root: String,
    /// Anything no rule matched.
    pub unknown: String,
}

impl Default for PrefixOptions {
    fn default() -> Self {
        Self {
            apps: "🚀".to_string(),
            libs: "📦".to_string(),
            tools: "🛠".to_string(),
            root: "🏠".to_string(),
            unknown: "📁".to_string(),
        }
    }
}

/// Regular expressions selecting the built-in folder categories, matched
/// against the folder path relative to its subsystem root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexOptions {
    /// Selects [`PrefixOptions::apps`].
    pub apps: String,
    /// Selects [`PrefixOptions::libs`].
    pub libs: String,
    /// Selects [`PrefixOptions::tools`].
    pub tools: String,
}

impl Default for RegexOptions {
    fn default() -> Self {
        Self {
            apps: "^(apps?|applications)/".to_string(),
            libs: "^(libs?|packages|crates)/".to_string(),
            tools: "^(tools|scripts)/".to_string(),
        }
    }
}

/// A user rule assigning `prefix` to folders whose relative path matches
/// `regex`. Custom rules are tried before the built-in categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFolder {
    /// Pattern tested against the relative folder path.
    pub regex: String,
    /// Prefix to show on a match.
    pub prefix: String,
}

/// Cosmetic folder prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderOptions {
    /// Prefix per category.
    pub prefix: PrefixOptions,
    /// Category selectors.
    pub regex: RegexOptions,
    /// Rules tried first, in order.
    pub custom: Vec<CustomFolder>,
}

/// Options for [`resolve_catalogue`].
///
/// Deserializes from camelCase keys with every field optional:
///
/// ```
/// use monodex_workspaces::CatalogueOptions;
///
/// let options: CatalogueOptions = serde_json::from_str(
///     r#"{ "fetchDescriptions": true, "providers": { "nx": false } }"#,
/// ).unwrap();
/// assert!(options.fetch_descriptions);
/// assert!(options.providers.core);
/// assert!(!options.providers.nx);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogueOptions {
    /// Emit an entry for the core workspace root.
    pub include_root: bool,
    /// Enabled subsystems.
    pub providers: ProviderToggles,
    /// Read each entry's manifest description into [`CatalogueEntry::detail`].
    pub fetch_descriptions: bool,
    /// Append `(CORE)`, `(NX)` or `(CARGO)` to labels.
    pub provider_suffix_labels: bool,
    /// Folder prefix rules.
    pub folders: FolderOptions,
}

impl Default for CatalogueOptions {
    fn default() -> Self {
        Self {
            include_root: true,
            providers: ProviderToggles::default(),
            fetch_descriptions: false,
            provider_suffix_labels: false,
            folders: FolderOptions::default(),
        }
    }
}

/// Subsystem an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogueSource {
    /// The generic provider chain.
    Core,
    /// Nx projects.
    Nx,
    /// Cargo workspace members.
    Cargo,
}

impl CatalogueSource {
    fn suffix(self) -> &'static str {
        match self {
            Self::Core => "(CORE)",
            Self::Nx => "(NX)",
            Self::Cargo => "(CARGO)",
        }
    }
}

impl fmt::Display for CatalogueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Core => "core",
            Self::Nx => "nx",
            Self::Cargo => "cargo",
        })
    }
}

/// One folder of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    /// Package or project name.
    pub name: String,
    /// `name`, plus the provider suffix when enabled.
    pub label: String,
    /// Absolute folder path; unique across the catalogue.
    pub root: PathBuf,
    /// `true` only for the core workspace root entry.
    pub is_workspace_root: bool,
    /// Subsystem that reported the folder.
    pub provider: CatalogueSource,
    /// Cosmetic folder prefix.
    pub prefix: String,
    /// `"<Type> Workspace Root"` for the root entry, `"at <path>"` otherwise.
    pub description: String,
    /// Manifest description, empty unless fetched and present.
    pub detail: String,
}

/// Builds the catalogue for `root`.
///
/// Returns `Ok(None)` when `root` cannot be resolved (logged) or when no
/// subsystem recognizes anything under it. Entries are unique by `root`,
/// with later subsystems (core, then Nx, then Cargo) replacing earlier ones,
/// and sorted by path.
///
/// # Errors
///
/// Returns an error if a located config file or manifest is corrupt, or if
/// a folder rule in `options` is not a valid regular expression.
///
/// # Examples
///
/// ```no_run
/// # async fn demo() -> monodex_workspaces::Result<()> {
/// use monodex_workspaces::{CatalogueOptions, TracingLogger, resolve_catalogue};
/// use std::path::Path;
///
/// let options = CatalogueOptions::default();
/// match resolve_catalogue(Path::new("."), &options, &TracingLogger).await? {
///     Some(entries) => {
///         for entry in entries {
///             println!("{} {} {}", entry.prefix, entry.label, entry.root.display());
///         }
///     }
///     None => println!("No compatible workspace found"),
/// }
/// # Ok(())
/// # }
/// ```
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub async fn resolve_catalogue(
    root: &Path,
    options: &CatalogueOptions,
    logger: &dyn Logger,
) -> Result<Option<Vec<CatalogueEntry>>> {
    let root = match tokio::fs::canonicalize(root).await {
        Ok(root) => root,
        Err(e) => {
            logger.error(&format!(
                "root required: cannot resolve {} ({e})",
                root.display()
            ));
            return Ok(None);
        }
    };
    let folders = FolderRules::compile(&options.folders)?;

    let core = async {
        if !options.providers.core {
            return Ok(None);
        }
        logger.info("Getting core projects");
        let ws_options = WorkspaceOptions {
            cwd: root.clone(),
            provider_type: None,
            include_root: true,
        };
        Workspace::resolve(&ws_options, logger).await
    };
    let nx = async {
        if !options.providers.nx {
            return Ok(None);
        }
        logger.info("Getting Nx projects");
        nx_projects(&root, logger).await
    };
    let cargo = async {
        if !options.providers.cargo {
            return Ok(None);
        }
        logger.info("Getting Cargo projects");
        cargo_projects(&root, logger).await
    };
    let (core, nx, cargo) = tokio::join!(core, nx, cargo);
    let (core, nx, cargo) = (core?, nx?, cargo?);

    // A workspace without a single manifest (the recursive fallback on a bare
    // directory) contributes nothing.
    let core = core.filter(|ws| !ws.is_empty());
    if core.is_none() && nx.is_none() && cargo.is_none() {
        logger.warn(&format!("No compatible workspace found in {}", root.display()));
        return Ok(None);
    }

    let builder = EntryBuilder {
        base: &root,
        folders: &folders,
        suffix_labels: options.provider_suffix_labels,
    };
    let mut entries = Vec::new();
    if let Some(ws) = &core {
        entries.extend(builder.core_entries(ws, options.include_root).await?);
    }
    if let Some(set) = &nx {
        entries.extend(builder.member_entries(set, CatalogueSource::Nx));
    }
    if let Some(set) = &cargo {
        entries.extend(builder.member_entries(set, CatalogueSource::Cargo));
    }

    let mut entries = dedup_and_sort(entries);
    if options.fetch_descriptions {
        let details = join_all(entries.iter().map(|e| describe(&e.root, logger))).await;
        for (entry, detail) in entries.iter_mut().zip(details) {
            entry.detail = detail;
        }
    }

    tracing::info!(count = entries.len(), "Resolved catalogue");
    Ok(Some(entries))
}

/// Keeps the last entry per root, then orders by path.
fn dedup_and_sort(entries: Vec<CatalogueEntry>) -> Vec<CatalogueEntry> {
    let mut by_root: IndexMap<PathBuf, CatalogueEntry> = IndexMap::with_capacity(entries.len());
    for entry in entries {
        by_root.insert(entry.root.clone(), entry);
    }

    let mut entries: Vec<CatalogueEntry> = by_root.into_values().collect();
    entries.sort_by(|a, b| a.root.to_string_lossy().cmp(&b.root.to_string_lossy()));
    entries
}

struct EntryBuilder<'a> {
    base: &'a Path,
    folders: &'a FolderRules,
    suffix_labels: bool,
}

impl EntryBuilder<'_> {
    async fn core_entries(
        &self,
        ws: &Workspace,
        include_root: bool,
    ) -> Result<Vec<CatalogueEntry>> {
        let mut entries = Vec::new();

        if include_root {
            let name = ws.package_for_root(ws.root()).unwrap_or("root").to_string();
            entries.push(CatalogueEntry {
                label: name.clone(),
                name,
                root: ws.root().to_path_buf(),
                is_workspace_root: true,
                provider: CatalogueSource::Core,
                prefix: self.folders.prefix(ws.root(), ws.root()).to_string(),
                description: format!("{} Workspace Root", ws.provider().label()),
                detail: String::new(),
            });
        }

        for package in ws.packages(None, ws.root()).await? {
            if package.root == ws.root() {
                continue;
            }
            entries.push(self.entry(
                &package.name,
                &package.root,
                ws.root(),
                CatalogueSource::Core,
            ));
        }
        Ok(entries)
    }

    fn member_entries(&self, set: &ProjectSet, source: CatalogueSource) -> Vec<CatalogueEntry> {
        set.projects
            .iter()
            .map(|member| self.entry(&member.name, &member.root, &set.root, source))
            .collect()
    }

    fn entry(
        &self,
        name: &str,
        root: &Path,
        subsystem_root: &Path,
        source: CatalogueSource,
    ) -> CatalogueEntry {
        let label = if self.suffix_labels {
            format!("{name} {}", source.suffix())
        } else {
            name.to_string()
        };

        CatalogueEntry {
            name: name.to_string(),
            label,
            root: root.to_path_buf(),
            is_workspace_root: false,
            provider: source,
            prefix: self.folders.prefix(subsystem_root, root).to_string(),
            description: format!("at {}", relative_display(self.base, root)),
            detail: String::new(),
        }
    }
}

fn relative_display(base: &Path, path: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => path.display().to_string(),
    }
}

/// Compiled [`FolderOptions`].
struct FolderRules {
    prefixes: PrefixOptions,
    rules: Vec<(Regex, String)>,
}

impl FolderRules {
    fn compile(options: &FolderOptions) -> Result<Self> {
        let mut rules = Vec::new();

        for (i, custom) in options.custom.iter().enumerate() {
            if custom.regex.is_empty() || custom.prefix.is_empty() {
                continue;
            }
            rules.push((
                compile_rule(&format!("folders.custom[{i}].regex"), &custom.regex)?,
                custom.prefix.clone(),
            ));
        }

        let builtin = [
            ("apps", &options.regex.apps, &options.prefix.apps),
            ("libs", &options.regex.libs, &options.prefix.libs),
            ("tools", &options.regex.tools, &options.prefix.tools),
        ];
        for (kind, regex, prefix) in builtin {
            if regex.is_empty() || prefix.is_empty() {
                continue;
            }
            rules.push((
                compile_rule(&format!("folders.regex.{kind}"), regex)?,
                prefix.clone(),
            ));
        }

        Ok(Self {
            prefixes: options.prefix.clone(),
            rules,
        })
    }

    fn prefix(&self, subsystem_root: &Path, folder: &Path) -> &str {
        if subsystem_root == folder {
            return &self.prefixes.root;
        }

        let dir = relative_display(subsystem_root, folder);
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(&dir))
            .map_or(self.prefixes.unknown.as_str(), |(_, prefix)| prefix.as_str())
    }
}

fn compile_rule(key: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidConfig {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// First non-empty manifest description in `dir`, probing `Cargo.toml`
/// before `package.json`. Read failures are logged and yield `""`.
async fn describe(dir: &Path, logger: &dyn Logger) -> String {
    for kind in ManifestKind::DESCRIPTION_PROBE_ORDER {
        match read_manifest(dir, kind).await {
            Ok(Some(manifest)) => {
                if let Some(description) = manifest.description.filter(|d| !d.is_empty()) {
                    return description;
                }
            }
            Ok(None) => {}
            Err(e) => {
                logger.warn(&format!(
                    "Could not read description from {}: {e}",
                    dir.join(kind.file_name()).display()
                ));
                return String::new();
            }
        }
    }
    String::new()
}
