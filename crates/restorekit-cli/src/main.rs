//! restorekit binary - the composition root.
//!
//! Initializes logging and `.env`, parses arguments, bootstraps the context
//! and dispatches to the command handlers.

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use restorekit_cli::handlers::{self, download::DownloadArgs};
use restorekit_cli::{Cli, CliConfig, CliError, Commands, bootstrap};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads `env` defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::default().with_downloads_dir(cli.downloads_dir);
    let ctx = bootstrap(config)?;

    match command {
        Commands::Download {
            url,
            catalog,
            build,
            cookie,
        } => {
            let args = DownloadArgs {
                url,
                catalog,
                build,
                cookie,
            };
            handlers::download::execute(&ctx, args).await?;
        }
        Commands::Identify { file } => {
            handlers::identify::execute(&ctx, &file)?;
        }
        Commands::Match { file, catalog } => {
            handlers::match_file::execute(&ctx, &file, &catalog)?;
        }
        Commands::Tag {
            file,
            build,
            filename,
        } => {
            handlers::tag::execute(&ctx, &file, &build, filename.as_deref())?;
        }
        Commands::Untag { file } => {
            handlers::tag::execute_untag(&ctx, &file)?;
        }
        Commands::Paths => {
            handlers::paths::execute(&ctx)?;
        }
    }

    Ok(())
}
