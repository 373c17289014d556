//! CommitBoard - Multi-Backend Commit Statistics Aggregator
//!
//! Main entry point for the CommitBoard CLI.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use commitboard::aggregator::{CompositeClient, CompositeConfig};
use commitboard::backends::{build_clients, VcsClient};
use commitboard::config::BoardConfig;
use commitboard::stats::TimeWindow;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// CommitBoard - commit statistics merged across all your backends
#[derive(Parser, Debug)]
#[command(name = "commitboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/commitboard/config.yaml)
    #[arg(short, long)]
    config: Option<String>,

    /// Abort the query when any single backend fails, instead of merging
    /// the backends that answered
    #[arg(long)]
    require_all: bool,

    /// Per-backend deadline in seconds (overrides the config file)
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize CommitBoard configuration
    Init,

    /// Merged commit counts per author for a window
    Authors {
        /// Window start: RFC 3339, YYYY-MM-DD, or a relative duration like 30d
        #[arg(long)]
        since: String,

        /// Window end (same formats); omitted means "through now"
        #[arg(long)]
        until: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Merged total commit count for a window
    Total {
        /// Window start: RFC 3339, YYYY-MM-DD, or a relative duration like 30d
        #[arg(long)]
        since: String,

        /// Window end (same formats); omitted means "through now"
        #[arg(long)]
        until: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage configured sources
    #[command(subcommand)]
    Source(SourceCommands),
}

#[derive(Subcommand, Debug)]
enum SourceCommands {
    /// List configured sources
    List,

    /// Remove a source by name
    Remove {
        /// Source name
        name: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = commitboard::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> commitboard::Result<()> {
    // Handle init first (creates config)
    if let Commands::Init = cli.command {
        return handle_init_command(&cli.config);
    }

    // Source management commands don't need backends
    if let Commands::Source(ref src_cmd) = cli.command {
        return handle_source_command(src_cmd, &cli.config);
    }

    let config = load_config(&cli.config)?;

    if config.sources.is_empty() {
        return Err(commitboard::CommitBoardError::Config(
            "No sources configured. Add sources to the config file first.".to_string(),
        ));
    }

    tracing::info!(sources = config.sources.len(), "Configuration loaded");

    // One-time registration: config -> adapters -> aggregator
    let backends = build_clients(&config.sources)?;
    let composite_config = CompositeConfig {
        backend_timeout: Duration::from_secs(
            cli.timeout.unwrap_or(config.query.backend_timeout_secs),
        ),
        require_all: cli.require_all || config.query.require_all,
    };
    let client = CompositeClient::with_config(backends, composite_config);

    match cli.command {
        Commands::Authors { since, until, json } => {
            let window = parse_window(&since, until.as_deref())?;
            let counts = client.commits_per_author(&window).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else if counts.is_empty() {
                println!("No commits in window");
            } else {
                let mut rows: Vec<_> = counts.into_iter().collect();
                rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

                println!("{:>8}  {}", "commits", "author");
                for (author, count) in rows {
                    println!("{:>8}  {}", count, author);
                }
            }
        }

        Commands::Total { since, until, json } => {
            let window = parse_window(&since, until.as_deref())?;
            let total = client.total_commits(&window).await?;

            if json {
                println!("{}", serde_json::json!({ "total": total }));
            } else {
                println!("Total commits: {}", total);
            }
        }

        // Handled above
        Commands::Init | Commands::Source(_) => unreachable!(),
    }

    Ok(())
}

fn config_path(config: &Option<String>) -> PathBuf {
    config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(BoardConfig::default_path)
}

fn load_config(config: &Option<String>) -> commitboard::Result<BoardConfig> {
    match BoardConfig::load(config_path(config)) {
        Ok(config) => Ok(config),
        Err(commitboard::CommitBoardError::Config(msg)) if msg.contains("Config file not found") => {
            Err(commitboard::CommitBoardError::Config(
                "No configuration found. Run 'commitboard init' first, then add sources \
                 to the config file."
                    .to_string(),
            ))
        }
        Err(e) => Err(e),
    }
}

fn handle_init_command(config: &Option<String>) -> commitboard::Result<()> {
    let path = config_path(config);

    if path.exists() {
        return Err(commitboard::CommitBoardError::Config(format!(
            "Config file already exists: {}",
            path.display()
        )));
    }

    BoardConfig::new().save(&path)?;

    println!("Created {}", path.display());
    println!();
    println!("Add sources to it, for example:");
    println!("  sources:");
    println!("    - name: platform");
    println!("      type: github");
    println!("      owner: acme");
    println!("      repo: platform");
    println!("      token_env: GITHUB_TOKEN");
    println!("    - name: scratch");
    println!("      type: git");
    println!("      path: /home/dev/src/scratch");

    Ok(())
}

fn handle_source_command(
    cmd: &SourceCommands,
    config: &Option<String>,
) -> commitboard::Result<()> {
    let path = config_path(config);
    let mut config = BoardConfig::load(&path)?;

    match cmd {
        SourceCommands::List => {
            if config.sources.is_empty() {
                println!("No sources configured");
                return Ok(());
            }

            println!("Configured sources ({}):", config.sources.len());
            println!();
            for source in &config.sources {
                println!("  {}", source.name);
                println!("    Type:     {}", source.kind.type_name());
                println!("    Location: {}", source.kind.location());
                println!();
            }
        }

        SourceCommands::Remove { name } => {
            if config.remove_source(name).is_some() {
                config.save(&path)?;
                println!("Removed source '{}'", name);
            } else {
                return Err(commitboard::CommitBoardError::Config(format!(
                    "Source '{}' not found",
                    name
                )));
            }
        }
    }

    Ok(())
}

/// Parse a window bound: RFC 3339, YYYY-MM-DD, or a relative duration
/// (e.g., "30d", "2weeks") resolved against the current instant.
fn parse_when(input: &str) -> commitboard::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    if let Ok(duration) = humantime::parse_duration(input) {
        let now = std::time::SystemTime::now();
        let target = now.checked_sub(duration).ok_or_else(|| {
            commitboard::CommitBoardError::Config(format!("Duration overflow for '{}'", input))
        })?;
        return Ok(DateTime::<Utc>::from(target));
    }

    Err(commitboard::CommitBoardError::Config(format!(
        "Invalid date '{}': expected RFC 3339, YYYY-MM-DD, or a duration like 30d",
        input
    )))
}

fn parse_window(since: &str, until: Option<&str>) -> commitboard::Result<TimeWindow> {
    let from = parse_when(since)?;
    let to = until.map(parse_when).transpose()?;
    TimeWindow::new(from, to)
}
