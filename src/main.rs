//! Habitrack CLI - serve the habit tracker or work with the store directly

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use habitrack::config::{self, HabitrackConfig};
use habitrack::server::{self, ServerOptions};
use habitrack::ui::{self, Icons};
use habitrack::{HabitId, HabitStore};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "habitrack")]
#[command(version)]
#[command(about = "Daily habit tracker with a JSON API and a browser front-end")]
#[command(long_about = r#"
Habitrack keeps a list of habits and records, per day, whether each one was done.

Example usage:
  habitrack init
  habitrack serve --port 8080
  habitrack add "Read 20 pages"
  habitrack toggle 1
  habitrack list --date 2024-05-01
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the browser front-end
        #[arg(short, long)]
        static_dir: Option<PathBuf>,
    },

    /// Write a starter habitrack.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show habits and their completion for a day
    List {
        /// Day to show (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a habit
    Add {
        /// Habit name
        name: String,
    },

    /// Mark a habit done for a day
    Toggle {
        /// Habit id
        id: i64,

        /// Mark as not done instead
        #[arg(short, long)]
        undo: bool,

        /// Day to record (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a habit and its history
    Delete {
        /// Habit id
        id: i64,
    },

    /// Show statistics about the database
    Stats,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database = cfg.database_path(cli.database.clone());

    match cli.command {
        Commands::Serve { host, port, static_dir } => {
            config::ensure_db_dir(&database)?;
            let options = ServerOptions {
                host: host
                    .or_else(|| cfg.host.clone())
                    .unwrap_or_else(|| config::DEFAULT_HOST.to_string()),
                port: port.or(cfg.port).unwrap_or(config::DEFAULT_PORT),
                database_path: database,
                static_dir: static_dir.or_else(|| cfg.static_dir.as_ref().map(PathBuf::from)),
                cors: cfg.cors.unwrap_or(false),
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start_server(options))?;
        }

        Commands::Init { force } => {
            let starter = HabitrackConfig::starter();
            config::write_config(&config_path, &starter, force)?;
            ui::success(&format!("Wrote {}", config_path.display()));
            ui::info("Database", starter.database.as_deref().unwrap_or_default());
        }

        Commands::List { date, json } => {
            let store = open_store(&database)?;
            let day = date.unwrap_or_else(server::local_today);
            let habits = store.list_habits_with_today(day)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                ui::warn("No habits yet. Add one with `habitrack add <NAME>`.");
            } else {
                let done = habits.iter().filter(|h| h.is_completed_today).count();
                ui::header(&format!("Habits for {} ({}/{} done)", day, done, habits.len()));
                println!("{}", ui::habits_table(&habits));
            }
        }

        Commands::Add { name } => {
            let store = open_store(&database)?;
            let added = store.add_habit(&name)?;
            println!("{} Added habit #{}: {}", Icons::SPARKLE, added.id, added.name);
        }

        Commands::Toggle { id, undo, date } => {
            let store = open_store(&database)?;
            let id = HabitId::new(id)?;
            let day = date.unwrap_or_else(server::local_today);
            let outcome = store.toggle_habit(id, !undo, day)?;

            if outcome.completed {
                ui::success(&format!("Habit #{} done for {}", id, day));
            } else {
                println!("{} Habit #{} not done for {}", Icons::PENDING, id, day);
            }
        }

        Commands::Delete { id } => {
            let store = open_store(&database)?;
            let id = HabitId::new(id)?;
            store.delete_habit(id)?;
            println!("{} Deleted habit #{}", Icons::DEL, id);
        }

        Commands::Stats => {
            let store = open_store(&database)?;
            let stats = store.stats()?;

            println!("{} Habitrack Statistics ({})", Icons::STATS, database.display());
            println!("{}", ui::stats_table(&stats));
        }
    }

    Ok(())
}

fn open_store(database: &std::path::Path) -> anyhow::Result<HabitStore> {
    config::ensure_db_dir(database)?;
    tracing::debug!("Opening {}", database.display());
    Ok(HabitStore::open(database)?)
}
