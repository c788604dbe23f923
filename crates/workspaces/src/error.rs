//! Error types for workspace discovery.
//!
//! A marker or manifest that simply does not exist is never an error: lookups
//! return `Ok(None)` for that case. The variants here cover files that exist
//! but cannot be read or parsed, and caller mistakes such as a bad filter.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during workspace discovery.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(monodex::workspaces::io_error),
        help("Check that the referenced paths exist and that you have permission to read them")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// JSON parsing error.
    #[error("JSON parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(monodex::workspaces::json_error),
        help("Ensure the JSON has valid syntax and matches the expected manifest schema")
    )]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },

    /// JSON-with-comments parsing error (lerna.json, rush.json, nx files).
    #[error("Failed to parse {}: {message}", path.display())]
    #[diagnostic(
        code(monodex::workspaces::jsonc_error),
        help("Comments and trailing commas are allowed, but the document must otherwise be valid JSON")
    )]
    Jsonc {
        /// Path to the file being parsed.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(monodex::workspaces::yaml_error),
        help("Ensure the YAML has valid syntax and matches the expected schema for pnpm-workspace.yaml")
    )]
    Yaml {
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },

    /// TOML parsing error.
    #[error("TOML parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(monodex::workspaces::toml_error),
        help("Ensure the TOML has valid syntax and matches the expected schema for Cargo manifests")
    )]
    Toml {
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },

    /// A package filter could not be applied.
    #[error("Invalid package filter '{filter}': {message}")]
    #[diagnostic(
        code(monodex::workspaces::invalid_filter),
        help("Filters are globs matched against package names or paths; prefix with '+' to include dependencies")
    )]
    InvalidFilter {
        /// The filter as supplied by the caller.
        filter: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Unknown workspace provider type.
    #[error("Unsupported workspace type: {name}")]
    #[diagnostic(
        code(monodex::workspaces::unsupported_type),
        help("Supported workspace types: yarn, pnpm, lerna, rush, recursive, single")
    )]
    UnsupportedWorkspaceType {
        /// The type name that was requested.
        name: String,
    },

    /// Invalid catalogue configuration value.
    #[error("Invalid configuration for {key}: {message}")]
    #[diagnostic(
        code(monodex::workspaces::invalid_config),
        help("Folder rules take regular expressions in Rust `regex` syntax")
    )]
    InvalidConfig {
        /// Dotted configuration key, e.g. `folders.regex.apps`.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// A workspace member pattern is not a valid glob.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    #[diagnostic(
        code(monodex::workspaces::invalid_glob),
        help("Check the member patterns declared by the workspace configuration")
    )]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// Description of the glob error.
        message: String,
    },
}

impl Error {
    /// Returns `true` for errors caused by a manifest or config file that
    /// exists but cannot be parsed.
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Self::Json { .. } | Self::Jsonc { .. } | Self::Yaml { .. } | Self::Toml { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source, path: None }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Yaml { source, path: None }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Self::Toml { source, path: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_io_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io {
            source: io_error,
            path: Some(PathBuf::from("/repo/package.json")),
            operation: "reading manifest".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("I/O error during reading manifest"));
        assert!(message.contains("/repo/package.json"));
    }

    #[test]
    fn test_io_error_no_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = Error::Io {
            source: io_error,
            path: None,
            operation: "walking directory".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("I/O error during walking directory"));
        assert!(!message.contains(" at "));
    }

    #[test]
    fn test_json_error_display() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::Json {
            source: json_error,
            path: Some(PathBuf::from("/repo/packages/a/package.json")),
        };

        let message = error.to_string();
        assert!(message.contains("JSON parsing error"));
        assert!(message.contains("packages/a/package.json"));
        assert!(error.is_parse_failure());
    }

    #[test]
    fn test_toml_error_display() {
        let toml_error = toml::from_str::<toml::Value>("not valid = [").unwrap_err();
        let error = Error::Toml {
            source: toml_error,
            path: Some(PathBuf::from("/repo/Cargo.toml")),
        };

        let message = error.to_string();
        assert!(message.contains("TOML parsing error"));
        assert!(message.contains("Cargo.toml"));
        assert!(error.is_parse_failure());
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: Error = yaml_error.into();

        match error {
            Error::Yaml { source: _, path } => assert_eq!(path, None),
            _ => panic!("Expected Yaml error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let error: Error = io_error.into();

        match error {
            Error::Io {
                source: _,
                path,
                operation,
            } => {
                assert_eq!(path, None);
                assert_eq!(operation, "file operation");
            }
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_invalid_filter_is_not_parse_failure() {
        let error = Error::InvalidFilter {
            filter: "+".to_string(),
            message: "no package.json in /tmp".to_string(),
        };

        assert!(error.to_string().contains("Invalid package filter '+'"));
        assert!(!error.is_parse_failure());
    }

    #[test]
    fn test_diagnostic_codes() {
        use miette::Diagnostic;

        let error = Error::Jsonc {
            path: PathBuf::from("/repo/rush.json"),
            message: "unexpected token".to_string(),
        };
        assert_eq!(
            error.code().map(|c| c.to_string()),
            Some("monodex::workspaces::jsonc_error".to_string())
        );
        assert!(error.help().is_some());

        let error = Error::InvalidGlob {
            pattern: "packages/[".to_string(),
            message: "unclosed class".to_string(),
        };
        assert!(error.code().is_some());
        assert!(error.help().is_some());
    }
}
