//! wbi_literacy
//!
//! A small Rust library for keeping a table of per-country World Bank figures
//! (internet users and adult literacy, both in percent) in SQLite, and for
//! summarizing them. Pairs with the interactive `wbi-literacy` CLI.
//!
//! ### Features
//! - Create, list, edit, and delete countries in a local SQLite file
//! - Min/max per indicator, ignoring unknown values, plus their correlation
//! - Fixed-width console tables with half-up rounding at 2 decimals
//! - CSV import and CSV/JSON export
//!
//! ### Example
//! ```no_run
//! use wbi_literacy::{CountryStore, Database, SqliteCountryStore};
//!
//! let store = SqliteCountryStore::new(Database::open("world_bank.db")?);
//! let countries = store.list_all()?;
//! let analysis = wbi_literacy::stats::analyze(&countries);
//! print!("{}", wbi_literacy::report::format_analysis(&analysis));
//! store.close();
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod console;
pub mod db;
pub mod models;
pub mod report;
pub mod stats;
pub mod storage;
pub mod store;

pub use console::Console;
pub use db::Database;
pub use models::{Country, Metric, ValidationError};
pub use store::{CountryStore, SqliteCountryStore, StoreError};
