/// `habit-garden-mcp` binary
///
/// Speaks MCP over stdio: JSON-RPC requests arrive on stdin, responses leave
/// on stdout and all logging goes to stderr.

use chrono::FixedOffset;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use habit_garden_mcp::{parse_utc_offset, HabitGardenServer};

const DB_FILE: &str = "habits.db";

#[derive(Parser, Debug)]
#[command(author, version, about = "Grow habits from seeds into trees, one verified day at a time", long_about = None)]
struct Args {
    /// SQLite file holding the garden. Defaults to `habits.db` in the first
    /// writable of ~/.habit_garden, the data dir, the config dir or ./.habit_garden
    #[arg(long)]
    database: Option<PathBuf>,

    /// UTC offset whose calendar days count as "today" (e.g. +09:00, -0500, Z)
    #[arg(long, default_value = "+00:00", value_parser = parse_utc_offset, allow_hyphen_values = true)]
    utc_offset: FixedOffset,

    /// Log tool calls and startup at info level
    #[arg(short, long)]
    debug: bool,

    /// Log everything at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn log_filter(&self) -> String {
        let level = match (self.verbose, self.debug) {
            (true, _) => "debug",
            (false, true) => "info",
            (false, false) => "warn",
        };
        format!("habit_garden_mcp={}", level)
    }
}

/// Whether a file can be created in `dir`, creating `dir` if needed
fn is_writable_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let marker = dir.join(".write_check");
    let writable = std::fs::write(&marker, b"").is_ok();
    let _ = std::fs::remove_file(&marker);
    writable
}

/// First writable garden directory, falling back to the temp dir
fn default_database_path() -> std::io::Result<PathBuf> {
    let candidates = [
        dirs::home_dir().map(|p| p.join(".habit_garden")),
        dirs::data_dir().map(|p| p.join("habit_garden")),
        dirs::config_dir().map(|p| p.join("habit_garden")),
        std::env::current_dir().ok().map(|p| p.join(".habit_garden")),
    ];

    if let Some(dir) = candidates.iter().flatten().find(|dir| is_writable_dir(dir)) {
        return Ok(dir.join(DB_FILE));
    }

    let dir = std::env::temp_dir().join("habit_garden");
    std::fs::create_dir_all(&dir)?;
    tracing::warn!("No writable home for the garden, using {}", dir.display());
    Ok(dir.join(DB_FILE))
}

fn resolve_database_path(requested: Option<PathBuf>) -> std::io::Result<PathBuf> {
    match requested {
        Some(path) => {
            match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)?,
                _ => {}
            }
            Ok(path)
        }
        None => default_database_path(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(std::io::stderr)
        .init();

    let db_path = resolve_database_path(args.database)?;
    info!(
        "Habit Garden starting with {} (days counted at UTC{})",
        db_path.display(),
        args.utc_offset
    );

    HabitGardenServer::new(&db_path, args.utc_offset)?.run().await?;

    info!("Habit Garden stopped");
    Ok(())
}
