//! `monodex`: list the packages of a monorepo.

mod cli;
mod commands;
mod config;
mod errors;
mod tracing;

use crate::cli::{Cli, Commands};
use crate::tracing::{TracingConfig, init_tracing};
use ::tracing::instrument;
use std::io::Write;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = cli::parse();

    init_tracing(TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
        filter: cli.log_filter.clone(),
    })?;

    let output = run(cli).await?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")
        .map_err(errors::CliError::Output)
        .map_err(miette::Report::new)?;
    Ok(())
}

#[instrument(name = "monodex", skip_all)]
async fn run(cli: Cli) -> miette::Result<String> {
    let config = cli.config.as_deref();
    let output = match cli.command {
        Commands::List {
            path,
            providers,
            output,
        } => commands::list::execute_list(&path, config, &providers, output).await?,
        Commands::Order {
            path,
            filter,
            provider_type,
            include_root,
            output,
        } => {
            commands::order::execute_order(
                &path,
                filter.as_deref(),
                provider_type,
                include_root,
                output,
            )
            .await?
        }
        Commands::Providers { path, output } => {
            commands::providers::execute_providers(&path, output).await?
        }
    };
    Ok(output)
}
