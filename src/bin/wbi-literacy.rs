use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use wbi_literacy::{Console, CountryStore, Database, SqliteCountryStore, storage};

#[derive(Parser, Debug)]
#[command(
    name = "wbi-literacy",
    version,
    about = "Manage and analyze World Bank internet usage and adult literacy figures"
)]
struct Cli {
    /// SQLite database file (created if missing).
    #[arg(long, env = "WBI_DATABASE")]
    database: Option<PathBuf>,
    /// Upsert every row of this CSV (code,name,internet_users,adult_literacy_rate) before starting.
    #[arg(long)]
    import: Option<PathBuf>,
    /// Write all countries to this file and exit instead of opening the menu.
    #[arg(long)]
    export: Option<PathBuf>,
    /// Export format (csv or json). If omitted, inferred from --export extension.
    #[arg(long, value_enum, requires = "export")]
    format: Option<OutFormat>,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

/// `<data dir>/wbi-literacy/world_bank.db`, or `./world_bank.db` when the
/// platform has no data directory.
fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("wbi-literacy"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("world_bank.db")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let path = cli.database.unwrap_or_else(default_database_path);
    let db = Database::open(&path)
        .with_context(|| format!("cannot open database {}", path.display()))?;
    let store = SqliteCountryStore::new(db);

    if let Some(csv_path) = cli.import.as_ref() {
        let n = storage::import_csv(&store, csv_path)?;
        eprintln!("Imported {} countries from {}", n, csv_path.display());
    }

    if let Some(out) = cli.export.as_ref() {
        let result = export(&store, out, cli.format);
        store.close();
        return result;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let _stdout = Console::new(store, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}

fn export(store: &SqliteCountryStore, path: &Path, format: Option<OutFormat>) -> Result<()> {
    let countries = store.list_all()?;
    let fmt = match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(&countries, path)?,
        "json" => storage::save_json(&countries, path)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} countries to {}", countries.len(), path.display());
    Ok(())
}
