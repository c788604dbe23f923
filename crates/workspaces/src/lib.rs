//! Monorepo package discovery.
//!
//! This crate finds the packages of a monorepo whatever convention it
//! follows, and merges them into one catalogue with intra-workspace
//! dependency information.
//!
//! # Architecture
//!
//! - [`find_up`] locates marker files such as `lerna.json` by walking toward
//!   the filesystem root.
//! - [`ProviderType`] is the closed set of generic conventions: npm/yarn
//!   `workspaces`, `pnpm-workspace.yaml`, `lerna.json`, `rush.json`, a
//!   recursive scan and a single package. They are tried in declared order
//!   and the first that applies wins.
//! - [`nx_projects`] and [`cargo_projects`] are separate subsystems whose
//!   results are merged alongside the winning generic provider.
//! - [`find_packages`] expands member globs into package directories.
//! - [`Workspace`] holds the winning provider's packages, their dependency
//!   edges and a dependency-respecting order.
//! - [`resolve_catalogue`] runs everything for one root and returns a sorted
//!   list of [`CatalogueEntry`] values, unique by path.
//!
//! # Errors
//!
//! A missing marker or manifest is never an error; it shows up as `None`.
//! A file that exists but does not parse fails the operation that read it.
//! See [`Error`].
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> monodex_workspaces::Result<()> {
//! use monodex_workspaces::{TracingLogger, Workspace, WorkspaceOptions};
//! use std::path::Path;
//!
//! let options = WorkspaceOptions::new("/path/to/repo");
//! if let Some(workspace) = Workspace::resolve(&options, &TracingLogger).await? {
//!     println!("{} workspace at {}", workspace.provider(), workspace.root().display());
//!     for package in workspace.packages(None, Path::new("/path/to/repo")).await? {
//!         println!("  {} -> {:?}", package.name, workspace.deps(&package.name));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cargo;
pub mod catalogue;
pub mod error;
pub mod expand;
pub mod fs;
pub mod logger;
pub mod manifest;
pub mod nx;
pub mod provider;
pub mod workspace;

pub use cargo::cargo_projects;
pub use catalogue::{
    CatalogueEntry, CatalogueOptions, CatalogueSource, CustomFolder, FolderOptions,
    PrefixOptions, ProviderToggles, RegexOptions, resolve_catalogue,
};
pub use error::{Error, Result};
pub use expand::{BASIC_IGNORE, DEFAULT_IGNORE, ExpandOptions, find_manifest_dirs, find_packages};
pub use fs::find_up;
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use manifest::{
    DependencyMap, Manifest, ManifestKind, Member, Package, ProjectSet, WorkspacesField,
    load_package, read_manifest,
};
pub use nx::nx_projects;
pub use provider::{ProviderResult, ProviderType, detect_workspace_providers};
pub use workspace::{PackageManager, Workspace, WorkspaceOptions};
