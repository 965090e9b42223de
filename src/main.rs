// folio-github command line entry point.
// Fetches profile and repository data for the configured user and prints it as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use folio_github::{
    Config, Fetched, GitHubService, Origin, RepoSort, RepositoryOptions, Result,
    SortDirection,
};

#[derive(Parser)]
#[command(name = "folio-github")]
#[command(about = "Fetch a GitHub profile and repositories with retry and offline fallback")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "folio.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the user's profile
    Profile,

    /// List the user's repositories
    Repos {
        #[arg(long, value_enum, default_value_t = SortArg::Updated)]
        sort: SortArg,

        #[arg(long, value_enum, default_value_t = DirectionArg::Desc)]
        direction: DirectionArg,

        #[arg(long, default_value_t = 100)]
        per_page: u32,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Look up repositories by name (defaults to the configured featured list)
    Featured {
        names: Vec<String>,
    },

    /// Fetch the profile, then show the rate limit GitHub reported
    RateLimit,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Created,
    Updated,
    Pushed,
    FullName,
}

impl From<SortArg> for RepoSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Created => RepoSort::Created,
            SortArg::Updated => RepoSort::Updated,
            SortArg::Pushed => RepoSort::Pushed,
            SortArg::FullName => RepoSort::FullName,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Asc,
    Desc,
}

impl From<DirectionArg> for SortDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Asc => SortDirection::Asc,
            DirectionArg::Desc => SortDirection::Desc,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio_github=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted, cancelling in-flight request");
            on_interrupt.cancel();
        }
    });

    match run(cli, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let service = GitHubService::from_config(&config)?;

    match cli.command {
        Commands::Profile => print(&service.profile(cancel).await?),
        Commands::Repos {
            sort,
            direction,
            per_page,
            page,
        } => {
            let options = RepositoryOptions {
                sort: sort.into(),
                direction: direction.into(),
                per_page,
                page,
            };
            print(&service.repositories(&options, cancel).await?)
        }
        Commands::Featured { names } if names.is_empty() => {
            print(&service.featured_repositories(cancel).await?)
        }
        Commands::Featured { names } => print(&service.lookup_repositories(&names, cancel).await?),
        Commands::RateLimit => {
            service.profile(cancel).await?;
            match service.client().rate_limit().await {
                Some(limit) => {
                    let reset_at = limit
                        .reset_at()
                        .map(|dt| dt.to_rfc3339())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!(
                        "{}/{} requests remaining, resets at {}",
                        limit.remaining, limit.limit, reset_at
                    );
                    Ok(())
                }
                None => {
                    println!("GitHub did not report a rate limit");
                    Ok(())
                }
            }
        }
    }
}

fn print<T: Serialize>(fetched: &Fetched<T>) -> Result<()> {
    if let Origin::Cache { cached_at } = fetched.origin {
        eprintln!("(cached) using data captured at {}", cached_at.to_rfc3339());
    }
    println!("{}", serde_json::to_string_pretty(&fetched.data)?);
    Ok(())
}
