//! Workspace Model: the packages of one provider, their intra-workspace
//! dependency edges and a dependency-respecting order.

use crate::error::{Error, Result};
use crate::expand::{ExpandOptions, find_packages};
use crate::fs::path_exists;
use crate::logger::Logger;
use crate::manifest::{Package, load_package};
use crate::provider::ProviderType;
use futures::future::try_join_all;
use globset::{GlobBuilder, GlobMatcher};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Options for [`Workspace::resolve`].
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    /// Directory the providers start from.
    pub cwd: PathBuf,
    /// Only try this provider instead of the full chain.
    pub provider_type: Option<ProviderType>,
    /// Include the package at the workspace root itself.
    pub include_root: bool,
}

impl WorkspaceOptions {
    /// Options starting at `cwd` with every provider enabled.
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }
}

/// Package managers identified by their lockfiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// `package-lock.json` or `npm-shrinkwrap.json`.
    Npm,
    /// `yarn.lock`.
    Yarn,
    /// `pnpm-lock.yaml`.
    Pnpm,
    /// `bun.lock` or `bun.lockb`.
    Bun,
}

impl PackageManager {
    const LOCKFILES: [(Self, &'static [&'static str]); 4] = [
        (Self::Npm, &["package-lock.json", "npm-shrinkwrap.json"]),
        (Self::Yarn, &["yarn.lock"]),
        (Self::Pnpm, &["pnpm-lock.yaml"]),
        (Self::Bun, &["bun.lock", "bun.lockb"]),
    ];
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        })
    }
}

/// The packages found by the first provider that recognized a directory.
///
/// Built once by [`Workspace::resolve`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    provider: ProviderType,
    packages: IndexMap<String, Package>,
    roots: HashMap<PathBuf, String>,
    order: Vec<String>,
}

impl Workspace {
    /// Builds a workspace from already loaded packages.
    ///
    /// Packages sharing a name collapse onto the first one's position with
    /// the last one's contents.
    #[must_use]
    pub fn new(root: PathBuf, provider: ProviderType, packages: Vec<Package>) -> Self {
        let mut by_name = IndexMap::with_capacity(packages.len());
        let mut roots = HashMap::with_capacity(packages.len());
        for package in packages {
            roots.insert(package.root.clone(), package.name.clone());
            by_name.insert(package.name.clone(), package);
        }

        let mut workspace = Self {
            root,
            provider,
            packages: by_name,
            roots,
            order: Vec::new(),
        };
        workspace.order = workspace.compute_order();
        workspace
    }

    /// Runs the provider chain from `options.cwd` and loads the packages of
    /// the first provider that recognizes it.
    ///
    /// Returns `Ok(None)` when no provider applies, or when `cwd` is empty
    /// (logged as an error through `logger`).
    ///
    /// # Errors
    ///
    /// Returns an error if the winning provider's config file, or any member
    /// manifest it matched, exists but cannot be parsed.
    #[tracing::instrument(skip_all, fields(cwd = %options.cwd.display()))]
    pub async fn resolve(options: &WorkspaceOptions, logger: &dyn Logger) -> Result<Option<Self>> {
        if options.cwd.as_os_str().is_empty() {
            logger.error("A root directory is required to resolve a workspace. Aborting.");
            return Ok(None);
        }
        let cwd = std::path::absolute(&options.cwd).map_err(|source| Error::Io {
            source,
            path: Some(options.cwd.clone()),
            operation: "resolving the workspace start directory".to_string(),
        })?;

        let candidates = options
            .provider_type
            .map_or_else(|| ProviderType::ALL.to_vec(), |t| vec![t]);

        for provider in candidates {
            let Some(mut found) = provider.detect(&cwd, logger).await? else {
                continue;
            };

            if options.include_root {
                found.patterns.push(".".to_string());
            }
            let expand = if provider == ProviderType::Recursive {
                ExpandOptions::default()
            } else {
                ExpandOptions::with_ignore(Vec::new())
            };

            let dirs = find_packages(&found.root, &found.patterns, &expand).await?;
            let packages = try_join_all(dirs.iter().map(|dir| load_package(dir)))
                .await?
                .into_iter()
                .flatten()
                .collect();

            let workspace = Self::new(found.root, provider, packages);
            tracing::info!(
                provider = %provider,
                root = %workspace.root.display(),
                packages = workspace.packages.len(),
                "Resolved workspace"
            );
            return Ok(Some(workspace));
        }

        Ok(None)
    }

    /// Workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Provider that produced this workspace.
    #[must_use]
    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// `true` if no package was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Looks up a package by name.
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Name of the package rooted at `root`.
    #[must_use]
    pub fn package_for_root(&self, root: &Path) -> Option<&str> {
        self.roots.get(root).map(String::as_str)
    }

    /// Package names in dependency order: dependencies before dependents.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Direct in-workspace dependencies of `name`, runtime and development,
    /// never including `name` itself.
    #[must_use]
    pub fn deps(&self, name: &str) -> Vec<&str> {
        let Some(package) = self.packages.get(name) else {
            return Vec::new();
        };

        let mut deps: Vec<&str> = Vec::new();
        for dep in package.dependency_names() {
            if dep != name && self.packages.contains_key(dep) && !deps.contains(&dep) {
                deps.push(dep);
            }
        }
        deps
    }

    /// Transitive in-workspace dependencies of `name`, each listed after its
    /// own dependencies. Cycles are cut at the first repeated name.
    #[must_use]
    pub fn dep_tree(&self, name: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut tree = self.collect_tree(name, &mut seen);
        tree.retain(|n| *n != name);
        tree
    }

    fn collect_tree<'a>(&'a self, name: &str, seen: &mut HashSet<&'a str>) -> Vec<&'a str> {
        let Some((key, _)) = self.packages.get_key_value(name) else {
            return Vec::new();
        };
        if !seen.insert(key.as_str()) {
            return Vec::new();
        }

        let mut tree = Vec::new();
        for dep in self.deps(name) {
            let subtree = self.collect_tree(dep, seen);
            for n in subtree.into_iter().chain(std::iter::once(dep)) {
                if !tree.contains(&n) {
                    tree.push(n);
                }
            }
        }
        tree
    }

    fn compute_order(&self) -> Vec<String> {
        let mut placed: HashSet<&str> = HashSet::with_capacity(self.packages.len());
        let mut order = Vec::with_capacity(self.packages.len());

        for name in self.packages.keys() {
            if placed.contains(name.as_str()) {
                continue;
            }
            for n in self
                .dep_tree(name)
                .into_iter()
                .chain(std::iter::once(name.as_str()))
            {
                if placed.insert(n) {
                    order.push(n.to_string());
                }
            }
        }
        order
    }

    /// Packages matching `filter`, sorted by [`Workspace::order`].
    ///
    /// Without a filter every package is returned. The filter is a glob
    /// (braces allowed, `*` stops at `/`) tested against each package name
    /// and its path relative to the workspace root. A leading `+` also pulls
    /// in the transitive dependencies of every match; `+` or `+.` alone
    /// selects the package rooted at `cwd`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if the glob does not compile, or if
    /// `+` is used and `cwd` has no `package.json`.
    pub async fn packages(&self, filter: Option<&str>, cwd: &Path) -> Result<Vec<&Package>> {
        let mut selected: Vec<&Package> = match filter.filter(|f| !f.is_empty()) {
            None => self.packages.values().collect(),
            Some(filter) => self.filter_packages(filter, cwd).await?,
        };

        let position: HashMap<&str, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        selected.sort_by_key(|p| position.get(p.name.as_str()).copied().unwrap_or(usize::MAX));
        Ok(selected)
    }

    async fn filter_packages(&self, filter: &str, cwd: &Path) -> Result<Vec<&Package>> {
        let with_deps = filter.starts_with('+');
        let use_cwd = filter == "+" || filter == "+.";

        let cwd = std::path::absolute(cwd).unwrap_or_else(|_| cwd.to_path_buf());
        if use_cwd && !path_exists(&cwd.join("package.json")).await {
            return Err(Error::InvalidFilter {
                filter: filter.to_string(),
                message: format!(
                    "'--filter +' requires a ./package.json file in the current working directory ({})",
                    cwd.display()
                ),
            });
        }

        let matcher = if use_cwd {
            None
        } else {
            let glob = filter.strip_prefix('+').unwrap_or(filter);
            Some(compile_filter(filter, glob)?)
        };

        let mut names: HashSet<&str> = HashSet::new();
        for package in self.packages.values() {
            let matched = if use_cwd {
                package.root == cwd
            } else {
                matcher.as_ref().is_some_and(|m| {
                    m.is_match(&package.name) || m.is_match(self.relative(package))
                })
            };

            if matched {
                names.insert(package.name.as_str());
                if with_deps {
                    names.extend(self.dep_tree(&package.name));
                }
            }
        }

        Ok(self
            .packages
            .values()
            .filter(|p| names.contains(p.name.as_str()))
            .collect())
    }

    fn relative(&self, package: &Package) -> String {
        package
            .root
            .strip_prefix(&self.root)
            .map_or_else(|_| package.root.clone(), Path::to_path_buf)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Package manager inferred from the lockfile at the workspace root.
    pub async fn package_manager(&self) -> Option<PackageManager> {
        for (manager, lockfiles) in PackageManager::LOCKFILES {
            for lockfile in lockfiles {
                if path_exists(&self.root.join(lockfile)).await {
                    return Some(manager);
                }
            }
        }
        None
    }
}

fn compile_filter(filter: &str, glob: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| Error::InvalidFilter {
            filter: filter.to_string(),
            message: e.to_string(),
        })
}
