//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Failed to read options file {}", path.display())]
    #[diagnostic(
        code(monodex::cli::config_read_error),
        help("Check the --config path, or remove it to use monodex.toml in PATH")
    )]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse options file {}", path.display())]
    #[diagnostic(
        code(monodex::cli::config_parse_error),
        help("Option keys are camelCase, e.g. includeRoot or fetchDescriptions")
    )]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Workspace(#[from] monodex_workspaces::Error),

    #[error("Failed to format output as JSON")]
    #[diagnostic(code(monodex::cli::serialize_error))]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write output")]
    #[diagnostic(code(monodex::cli::output_error))]
    Output(#[source] std::io::Error),
}
