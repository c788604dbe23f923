//! Pattern expander: member globs to candidate package directories.
//!
//! Each pattern names package directories (`packages/*`); it is rewritten to
//! match the manifest one level below (`packages/*/package.json`) and
//! matched against a single walk of the workspace tree. Matches are returned
//! per pattern, in pattern order, without deduplication.

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Dependency-install directories. Always ignored, whatever the caller asks.
pub const BASIC_IGNORE: [&str; 2] = ["**/node_modules/**", "**/bower_components/**"];

/// Test directories, ignored unless the caller supplies its own ignore list.
pub const DEFAULT_IGNORE: [&str; 3] = ["**/test/**", "**/tests/**", "**/__tests__/**"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Options for [`find_packages`] and [`find_manifest_dirs`].
#[derive(Debug, Clone, Default)]
pub struct ExpandOptions {
    /// Also match the manifest at the workspace root (an implicit `.`).
    pub include_root: bool,
    /// Ignore globs replacing [`DEFAULT_IGNORE`]. [`BASIC_IGNORE`] is
    /// appended either way.
    pub ignore: Option<Vec<String>>,
}

impl ExpandOptions {
    /// Options with a caller-supplied ignore list.
    #[must_use]
    pub fn with_ignore(ignore: Vec<String>) -> Self {
        Self {
            include_root: false,
            ignore: Some(ignore),
        }
    }

    fn effective_ignore(&self) -> Vec<String> {
        let mut ignore = self.ignore.clone().unwrap_or_else(|| {
            DEFAULT_IGNORE.iter().map(ToString::to_string).collect()
        });
        ignore.extend(BASIC_IGNORE.iter().map(ToString::to_string));
        ignore
    }
}

/// Expands `package.json` member patterns under `root`.
///
/// # Errors
///
/// Returns [`Error::InvalidGlob`] if a pattern cannot be compiled.
pub async fn find_packages(
    root: &Path,
    patterns: &[String],
    options: &ExpandOptions,
) -> Result<Vec<PathBuf>> {
    find_manifest_dirs(root, patterns, "package.json", options).await
}

/// Expands member patterns under `root` into the directories holding a
/// `manifest` file.
///
/// Patterns starting with `!` exclude matches of the remaining glob.
///
/// # Errors
///
/// Returns [`Error::InvalidGlob`] if a pattern cannot be compiled, or
/// [`Error::Io`] if the blocking walk cannot be joined.
pub async fn find_manifest_dirs(
    root: &Path,
    patterns: &[String],
    manifest: &str,
    options: &ExpandOptions,
) -> Result<Vec<PathBuf>> {
    let mut patterns = patterns.to_vec();
    if options.include_root {
        patterns.push(".".to_string());
    }

    let mut inclusions = Vec::new();
    let mut exclusions = Vec::new();
    for raw in &patterns {
        if let Some(negated) = raw.strip_prefix('!') {
            exclusions.push(compile(&normalize_pattern(root, negated, manifest))?);
        } else {
            inclusions.push(compile(&normalize_pattern(root, raw, manifest))?);
        }
    }
    let ignored = options
        .effective_ignore()
        .iter()
        .map(|raw| compile(raw))
        .collect::<Result<Vec<_>>>()?;
    exclusions.extend(ignored.iter().cloned());

    if inclusions.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(
        root = %root.display(),
        patterns = ?patterns,
        manifest,
        "Expanding member patterns"
    );

    let max_depth = walk_depth(&inclusions);
    let walk_root = root.to_path_buf();
    let manifest_name = manifest.to_string();
    let manifests = tokio::task::spawn_blocking(move || {
        collect_manifests(&walk_root, &manifest_name, max_depth, &ignored)
    })
    .await
    .map_err(|e| Error::Io {
        source: std::io::Error::other(e.to_string()),
        path: Some(root.to_path_buf()),
        operation: "walking workspace tree".to_string(),
    })?;

    let mut dirs = Vec::new();
    for pattern in &inclusions {
        for rel in &manifests {
            if pattern.matches_path_with(rel, MATCH_OPTIONS)
                && !exclusions.iter().any(|e| e.matches_path_with(rel, MATCH_OPTIONS))
            {
                let dir = rel
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map_or_else(|| root.to_path_buf(), |p| root.join(p));
                dirs.push(dir);
            }
        }
    }

    tracing::debug!(count = dirs.len(), "Expanded member patterns");
    Ok(dirs)
}

/// Rewrites a member pattern into a root-relative manifest glob.
///
/// ```
/// use monodex_workspaces::expand::normalize_pattern;
/// use std::path::Path;
///
/// let root = Path::new("/repo");
/// assert_eq!(normalize_pattern(root, "packages/*", "package.json"), "packages/*/package.json");
/// assert_eq!(normalize_pattern(root, "apps/", "package.json"), "apps/package.json");
/// assert_eq!(normalize_pattern(root, ".", "package.json"), "package.json");
/// assert_eq!(normalize_pattern(root, "/repo", "package.json"), "package.json");
/// assert_eq!(normalize_pattern(root, "/repo/tools/cli", "Cargo.toml"), "tools/cli/Cargo.toml");
/// ```
#[must_use]
pub fn normalize_pattern(root: &Path, pattern: &str, manifest: &str) -> String {
    let pattern = pattern.trim();
    let relative = if Path::new(pattern).is_absolute() {
        Path::new(pattern)
            .strip_prefix(root)
            .map_or_else(|_| pattern.to_string(), |p| p.to_string_lossy().replace('\\', "/"))
    } else {
        pattern.replace('\\', "/")
    };

    let mut relative = relative.as_str();
    loop {
        if let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        } else if relative == "." {
            relative = "";
        } else {
            break;
        }
    }
    let relative = relative.strip_suffix('/').unwrap_or(relative);

    if relative.is_empty() {
        manifest.to_string()
    } else {
        format!("{relative}/{manifest}")
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| Error::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

// Without `**` no pattern can match deeper than its own component count.
fn walk_depth(inclusions: &[Pattern]) -> Option<usize> {
    if inclusions.iter().any(|p| p.as_str().contains("**")) {
        return None;
    }
    inclusions
        .iter()
        .map(|p| Path::new(p.as_str()).components().count())
        .max()
}

fn collect_manifests(
    root: &Path,
    manifest: &str,
    max_depth: Option<usize>,
    ignored: &[Pattern],
) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    walker
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() || entry.depth() == 0 {
                return true;
            }
            if entry.file_name() == ".git" {
                return false;
            }
            // Prune a directory when a manifest directly inside it would be ignored.
            let Ok(rel) = entry.path().strip_prefix(root) else {
                return true;
            };
            let probe = rel.join(manifest);
            !ignored.iter().any(|p| p.matches_path_with(&probe, MATCH_OPTIONS))
        })
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == manifest)
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_pkg(root: &Path, rel: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();
    }

    fn rels(root: &Path, dirs: &[PathBuf]) -> Vec<String> {
        dirs.iter()
            .map(|d| {
                d.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[tokio::test]
    async fn test_find_packages_basic() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_pkg(root, "packages/a");
        write_pkg(root, "packages/b");
        write_pkg(root, "apps/web");
        fs::create_dir_all(root.join("packages/no-manifest")).unwrap();

        let dirs = find_packages(root, &["packages/*".to_string()], &ExpandOptions::default())
            .await
            .unwrap();

        assert_eq!(rels(root, &dirs), vec!["packages/a", "packages/b"]);
    }

    #[tokio::test]
    async fn test_star_does_not_cross_separator() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_pkg(root, "packages/a");
        write_pkg(root, "packages/group/nested");

        let dirs = find_packages(root, &["packages/*".to_string()], &ExpandOptions::default())
            .await
            .unwrap();
        assert_eq!(rels(root, &dirs), vec!["packages/a"]);

        let dirs = find_packages(root, &["packages/**".to_string()], &ExpandOptions::default())
            .await
            .unwrap();
        assert_eq!(
            rels(root, &dirs),
            vec!["packages/a", "packages/group/nested"]
        );
    }

    #[tokio::test]
    async fn test_include_root_appends_dot() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_pkg(root, "");
        write_pkg(root, "packages/a");

        let options = ExpandOptions {
            include_root: true,
            ignore: None,
        };
        let dirs = find_packages(root, &["packages/*".to_string()], &options)
            .await
            .unwrap();

        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[1], root.to_path_buf());
    }

    #[tokio::test]
    async fn test_node_modules_always_ignored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_pkg(root, "packages/a");
        write_pkg(root, "packages/a/node_modules/dep");
        write_pkg(root, "node_modules/left-pad");
        write_pkg(root, "bower_components/jquery");

        // An explicit empty ignore list still keeps dependency directories out.
        let dirs = find_packages(root, &["**".to_string()], &ExpandOptions::with_ignore(vec![]))
            .await
            .unwrap();

        assert_eq!(rels(root, &dirs), vec!["packages/a"]);
    }

    #[tokio::test]
    async fn test_default_ignore_skips_test_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_pkg(root, "lib/a");
        write_pkg(root, "lib/a/test/fixture");
        write_pkg(root, "lib/__tests__/b");

        let dirs = find_packages(root, &["*/**".to_string()], &ExpandOptions::default())
            .await
            .unwrap();
        assert_eq!(rels(root, &dirs), vec!["lib/a"]);

        let dirs = find_packages(root, &["*/**".to_string()], &ExpandOptions::with_ignore(vec![]))
            .await
            .unwrap();
        assert_eq!(dirs.len(), 3);
    }

    #[tokio::test]
    async fn test_negated_pattern_excludes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_pkg(root, "packages/a");
        write_pkg(root, "packages/private");

        let patterns = vec!["packages/*".to_string(), "!packages/private".to_string()];
        let dirs = find_packages(root, &patterns, &ExpandOptions::default())
            .await
            .unwrap();

        assert_eq!(rels(root, &dirs), vec!["packages/a"]);
    }

    #[tokio::test]
    async fn test_overlapping_patterns_are_not_deduplicated() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_pkg(root, "packages/a");

        let patterns = vec!["packages/*".to_string(), "packages/a".to_string()];
        let dirs = find_packages(root, &patterns, &ExpandOptions::default())
            .await
            .unwrap();

        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[0], dirs[1]);
    }

    #[tokio::test]
    async fn test_invalid_glob_is_error() {
        let temp = TempDir::new().unwrap();

        let result = find_packages(
            temp.path(),
            &["packages/[".to_string()],
            &ExpandOptions::default(),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidGlob { .. })));
    }

    #[tokio::test]
    async fn test_cargo_manifest_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("crates/x")).unwrap();
        fs::write(root.join("crates/x/Cargo.toml"), "[package]\nname = \"x\"").unwrap();
        write_pkg(root, "crates/js");

        let dirs = find_manifest_dirs(
            root,
            &["crates/*".to_string()],
            "Cargo.toml",
            &ExpandOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(rels(root, &dirs), vec!["crates/x"]);
    }
}
