//! Manifest reader for `package.json` and `Cargo.toml`.
//!
//! A manifest that is not present is `Ok(None)`. A manifest that is present
//! but cannot be parsed is an error for that manifest alone; callers decide
//! whether it aborts their provider.

use crate::error::Result;
use crate::fs::{path_exists, read_json_file, read_toml_file};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Map of dependency name to version specifier.
pub type DependencyMap = BTreeMap<String, String>;

/// The manifest dialects understood by the reader, selected by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    /// `package.json`; name at the top level.
    PackageJson,
    /// `Cargo.toml`; name under the `[package]` table.
    CargoToml,
}

impl ManifestKind {
    /// Probe order used when looking for a human description of a folder.
    pub const DESCRIPTION_PROBE_ORDER: [Self; 2] = [Self::CargoToml, Self::PackageJson];

    /// File name of the manifest.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::PackageJson => "package.json",
            Self::CargoToml => "Cargo.toml",
        }
    }

    /// Selects a dialect from a manifest file name.
    ///
    /// ```
    /// use monodex_workspaces::ManifestKind;
    ///
    /// assert_eq!(ManifestKind::from_file_name("Cargo.toml"), Some(ManifestKind::CargoToml));
    /// assert_eq!(ManifestKind::from_file_name("deno.json"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "package.json" => Some(Self::PackageJson),
            "Cargo.toml" => Some(Self::CargoToml),
            _ => None,
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// The `workspaces` field of a `package.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WorkspacesField {
    /// `"workspaces": ["packages/*"]`
    Array(Vec<String>),
    /// `"workspaces": { "packages": ["packages/*"], "nohoist": [...] }`
    Object {
        /// Member patterns, when the object form declares them.
        #[serde(default)]
        packages: Option<Vec<String>>,
    },
    /// Anything else; never yields patterns.
    Other(serde_json::Value),
}

impl WorkspacesField {
    /// Member patterns declared by this field, if it has a usable shape.
    #[must_use]
    pub fn patterns(&self) -> Option<&[String]> {
        match self {
            Self::Array(patterns) => Some(patterns.as_slice()),
            Self::Object {
                packages: Some(patterns),
            } => Some(patterns.as_slice()),
            Self::Object { packages: None } | Self::Other(_) => None,
        }
    }
}

/// A parsed manifest, normalized across dialects.
///
/// Dependency fields keep absence distinct from emptiness; both mean "no
/// dependencies" for edge computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Declared package name.
    pub name: Option<String>,
    /// Declared version, when it is a plain string.
    pub version: Option<String>,
    /// Human description.
    pub description: Option<String>,
    /// Runtime dependencies.
    pub dependencies: Option<DependencyMap>,
    /// Development dependencies.
    pub dev_dependencies: Option<DependencyMap>,
    /// `package.json` workspaces declaration. Always `None` for Cargo.
    pub workspaces: Option<WorkspacesField>,
}

/// A package discovered inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Package name; the absolute root path when the manifest has none.
    pub name: String,
    /// Absolute directory containing the manifest.
    pub root: PathBuf,
    /// Declared version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Human description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Runtime dependencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyMap>,
    /// Development dependencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<DependencyMap>,
}

impl Package {
    /// Builds a package from its manifest, naming it after `root` when the
    /// manifest has no name.
    #[must_use]
    pub fn from_manifest(root: PathBuf, manifest: Manifest) -> Self {
        let name = manifest
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| root.display().to_string());

        Self {
            name,
            root,
            version: manifest.version,
            description: manifest.description,
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
        }
    }

    /// Names of every declared dependency, runtime and development.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .flat_map(|deps| deps.keys().map(String::as_str))
    }
}

/// A project reported by the Nx or Cargo subsystems: just a name and a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Project name.
    pub name: String,
    /// Absolute project directory.
    pub root: PathBuf,
}

/// Projects reported by one subsystem, with the directory it resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSet {
    /// Subsystem root (the Nx root or the Cargo workspace root).
    pub root: PathBuf,
    /// Projects in discovery order.
    pub projects: Vec<Member>,
}

/// Reads the manifest of `kind` located directly in `dir`.
///
/// # Errors
///
/// Returns a parse error if the manifest exists but is malformed, or an I/O
/// error if it exists but cannot be read.
pub async fn read_manifest(dir: &Path, kind: ManifestKind) -> Result<Option<Manifest>> {
    let path = dir.join(kind.file_name());
    if !path_exists(&path).await {
        return Ok(None);
    }

    let manifest = match kind {
        ManifestKind::PackageJson => read_json_file::<PackageJson>(&path).await?.into(),
        ManifestKind::CargoToml => read_toml_file::<CargoToml>(&path).await?.into(),
    };
    Ok(Some(manifest))
}

/// Loads the `package.json` in `dir` as a [`Package`].
///
/// # Errors
///
/// Propagates parse and I/O errors from [`read_manifest`].
pub async fn load_package(dir: &Path) -> Result<Option<Package>> {
    tracing::trace!(dir = %dir.display(), "Loading package");
    Ok(read_manifest(dir, ManifestKind::PackageJson)
        .await?
        .map(|manifest| Package::from_manifest(dir.to_path_buf(), manifest)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    version: Option<serde_json::Value>,
    description: Option<serde_json::Value>,
    workspaces: Option<WorkspacesField>,
    dependencies: Option<BTreeMap<String, serde_json::Value>>,
    dev_dependencies: Option<BTreeMap<String, serde_json::Value>>,
}

impl From<PackageJson> for Manifest {
    fn from(pkg: PackageJson) -> Self {
        Self {
            name: pkg.name,
            version: pkg.version.and_then(|v| v.as_str().map(String::from)),
            description: pkg.description.and_then(|v| v.as_str().map(String::from)),
            dependencies: pkg.dependencies.map(json_specs),
            dev_dependencies: pkg.dev_dependencies.map(json_specs),
            workspaces: pkg.workspaces,
        }
    }
}

fn json_specs(deps: BTreeMap<String, serde_json::Value>) -> DependencyMap {
    deps.into_iter()
        .map(|(name, spec)| {
            let spec = spec.as_str().map_or_else(|| spec.to_string(), String::from);
            (name, spec)
        })
        .collect()
}

#[derive(Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
    dependencies: Option<BTreeMap<String, toml::Value>>,
    #[serde(rename = "dev-dependencies")]
    dev_dependencies: Option<BTreeMap<String, toml::Value>>,
}

#[derive(Deserialize)]
struct CargoPackage {
    name: Option<String>,
    version: Option<toml::Value>,
    description: Option<toml::Value>,
}

impl From<CargoToml> for Manifest {
    fn from(cargo: CargoToml) -> Self {
        let (name, version, description) = cargo.package.map_or((None, None, None), |p| {
            (
                p.name,
                p.version.and_then(|v| v.as_str().map(String::from)),
                p.description.and_then(|v| v.as_str().map(String::from)),
            )
        });

        Self {
            name,
            version,
            description,
            dependencies: cargo.dependencies.map(toml_specs),
            dev_dependencies: cargo.dev_dependencies.map(toml_specs),
            workspaces: None,
        }
    }
}

// `serde = "1"` and `serde = { version = "1", ... }` both reduce to "1";
// path and workspace-inherited dependencies reduce to "*".
fn toml_specs(deps: BTreeMap<String, toml::Value>) -> DependencyMap {
    deps.into_iter()
        .map(|(name, spec)| {
            let spec = match &spec {
                toml::Value::String(s) => s.clone(),
                toml::Value::Table(t) => t
                    .get("version")
                    .and_then(|v| v.as_str())
                    .unwrap_or("*")
                    .to_string(),
                _ => "*".to_string(),
            };
            (name, spec)
        })
        .collect()
}
