use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod attendance;
mod config;
mod db;
mod error;
#[cfg(test)]
mod memory;
mod models;
mod profile;
mod report;
mod routes;
mod schedule;
mod server;
mod session;
mod state;
mod store;

use config::{Config, DEFAULT_CONFIG_PATH};
use db::PgStore;
use models::StudentProfile;
use state::AppState;
use store::Store;

#[derive(Parser)]
#[command(name = "smart-attendance")]
#[command(about = "Attendance summaries and student profiles for Smart Attendance", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("scope")
        .args(["user_id", "student_id"])
        .required(true)
        .multiple(false)
))]
struct ProfileScope {
    /// Resolve the profile from a user account id
    #[arg(long)]
    user_id: Option<String>,
    /// Resolve the profile from a student record id
    #[arg(long)]
    student_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import attendance records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print a student profile as JSON
    Profile {
        #[command(flatten)]
        scope: ProfileScope,
    },
    /// Generate a markdown attendance report for one student
    Report {
        #[command(flatten)]
        scope: ProfileScope,
        #[arg(long, default_value = "attendance.md")]
        out: PathBuf,
    },
    /// Run the HTTP API
    Serve,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

async fn lookup_profile(store: &dyn Store, scope: ProfileScope) -> anyhow::Result<StudentProfile> {
    let profile = match (scope.user_id, scope.student_id) {
        (Some(user_id), _) => profile::profile_for_user(store, &user_id).await?,
        (None, Some(student_id)) => profile::profile_for_student(store, &student_id).await?,
        (None, None) => anyhow::bail!("pass --user-id or --student-id"),
    };

    profile.context("Student profile not found")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::InitDb => {
            let pool = db::connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = db::connect(&config).await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let pool = db::connect(&config).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} attendance records from {}.", csv.display());
        }
        Commands::Profile { scope } => {
            let store = PgStore::new(db::connect(&config).await?);
            let profile = lookup_profile(&store, scope).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Report { scope, out } => {
            let store = PgStore::new(db::connect(&config).await?);
            let profile = lookup_profile(&store, scope).await?;
            std::fs::write(&out, report::build_report(&profile))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Serve => {
            info!("Smart Attendance v{}", env!("CARGO_PKG_VERSION"));
            let state = AppState::connect(config).await?;
            server::serve(state).await?;
        }
    }

    Ok(())
}
