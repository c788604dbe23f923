use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand, ValueEnum};
use monodex_workspaces::{CatalogueOptions, ProviderType};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "monodex")]
#[command(about = "Discover and list the packages of a monorepo")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        env = "MONODEX_LOG_LEVEL",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log line format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "Tracing filter directive, e.g. monodex_workspaces::cargo=trace",
        env = "MONODEX_LOG"
    )]
    pub log_filter: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Catalogue options file (defaults to monodex.toml in PATH)",
        env = "MONODEX_CONFIG"
    )]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Log format after applying `--json`.
    pub fn tracing_format(&self) -> TracingFormat {
        if self.json {
            TracingFormat::Json
        } else {
            self.log_format
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "List every package folder found under PATH")]
    List {
        #[arg(help = "Repository directory", default_value = ".")]
        path: PathBuf,
        #[command(flatten)]
        providers: ProviderArgs,
        #[arg(long, short = 'o', help = "Output format", default_value = "text", value_enum)]
        output: OutputFormat,
    },
    #[command(about = "Print the core workspace's packages in dependency order")]
    Order {
        #[arg(help = "Directory to start from; also the directory '+' refers to", default_value = ".")]
        path: PathBuf,
        #[arg(long, short = 'f', help = "Glob over package names or paths; prefix '+' to add dependencies")]
        filter: Option<String>,
        #[arg(long = "type", short = 't', help = "Only try this workspace type")]
        provider_type: Option<ProviderType>,
        #[arg(long, help = "Include the package at the workspace root")]
        include_root: bool,
        #[arg(long, short = 'o', help = "Output format", default_value = "text", value_enum)]
        output: OutputFormat,
    },
    #[command(about = "List the workspace conventions detected at PATH")]
    Providers {
        #[arg(help = "Directory to start from", default_value = ".")]
        path: PathBuf,
        #[arg(long, short = 'o', help = "Output format", default_value = "text", value_enum)]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned human-readable lines
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Flags layered over the options file.
#[derive(Args, Debug, Default, Clone)]
pub struct ProviderArgs {
    #[arg(long, help = "Skip the npm/yarn/pnpm/lerna/rush providers", env = "MONODEX_NO_CORE")]
    pub no_core: bool,
    #[arg(long, help = "Skip Nx projects", env = "MONODEX_NO_NX")]
    pub no_nx: bool,
    #[arg(long, help = "Skip Cargo workspace members", env = "MONODEX_NO_CARGO")]
    pub no_cargo: bool,
    #[arg(long, help = "Leave out the workspace root entry")]
    pub no_root: bool,
    #[arg(long, help = "Read package descriptions from manifests", env = "MONODEX_DESCRIPTIONS")]
    pub descriptions: bool,
    #[arg(long, help = "Suffix labels with their provider, e.g. (CARGO)", env = "MONODEX_SUFFIX")]
    pub suffix: bool,
}

impl ProviderArgs {
    /// Applies the flags that were set; unset flags keep the file's value.
    pub fn apply(&self, options: &mut CatalogueOptions) {
        if self.no_core {
            options.providers.core = false;
        }
        if self.no_nx {
            options.providers.nx = false;
        }
        if self.no_cargo {
            options.providers.cargo = false;
        }
        if self.no_root {
            options.include_root = false;
        }
        if self.descriptions {
            options.fetch_descriptions = true;
        }
        if self.suffix {
            options.provider_suffix_labels = true;
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
