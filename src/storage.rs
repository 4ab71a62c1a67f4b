use crate::models::{self, Country, Metric};
use crate::store::CountryStore;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const CSV_HEADER: [&str; 4] = ["code", "name", "internet_users", "adult_literacy_rate"];

/// Leading characters that make spreadsheet applications evaluate a cell,
/// plus the quote itself so that guarding stays reversible.
const GUARDED_STARTERS: [char; 5] = ['=', '+', '-', '@', '\''];

/// Prefix a single quote to cells a spreadsheet would treat as a formula.
fn guard_cell(s: &str) -> String {
    if s.starts_with(GUARDED_STARTERS) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

/// Undo [`guard_cell`] when reading back a file this crate wrote.
fn unguard_cell(s: &str) -> &str {
    match s.strip_prefix('\'') {
        Some(rest) if rest.starts_with(GUARDED_STARTERS) => rest,
        _ => s,
    }
}

/// Save countries as CSV with header. Unknown values are written as empty cells.
pub fn save_csv<P: AsRef<Path>>(countries: &[Country], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.write_record(CSV_HEADER)?;
    for c in countries {
        wtr.write_record([
            guard_cell(&c.code),
            guard_cell(&c.name),
            c.internet_users.map(|v| v.to_string()).unwrap_or_default(),
            c.adult_literacy_rate
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    info!(
        "event=export module=storage status=ok format=csv rows={}",
        countries.len()
    );
    Ok(())
}

/// Save countries as a pretty JSON array. Decimals are written as strings.
pub fn save_json<P: AsRef<Path>>(countries: &[Country], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(countries)?;
    f.write_all(s.as_bytes())?;
    info!(
        "event=export module=storage status=ok format=json rows={}",
        countries.len()
    );
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    code: String,
    name: String,
    internet_users: Option<String>,
    adult_literacy_rate: Option<String>,
}

/// Read and validate countries from a CSV file in the [`save_csv`] layout.
///
/// The first invalid row aborts the load with its line number.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Country>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<CsvRow>().enumerate() {
        // +2: one for the header, one for 1-based numbering
        let line = idx + 2;
        let row = row.with_context(|| format!("{}: malformed row on line {line}", path.display()))?;
        let country = row_to_country(&row)
            .with_context(|| format!("{}: invalid row on line {line}", path.display()))?;
        out.push(country);
    }
    Ok(out)
}

fn row_to_country(row: &CsvRow) -> Result<Country, models::ValidationError> {
    let mut country = Country::new(unguard_cell(&row.code), unguard_cell(&row.name))?;
    for (metric, raw) in [
        (Metric::InternetUsers, &row.internet_users),
        (Metric::AdultLiteracyRate, &row.adult_literacy_rate),
    ] {
        let value = models::parse_percentage(metric, raw.as_deref().unwrap_or(""))?;
        country.set_metric(metric, value);
    }
    Ok(country)
}

/// Load a CSV and upsert every row. Returns the number of rows written.
///
/// All rows go into one transaction, so an invalid row or a storage failure
/// writes nothing.
pub fn import_csv<S: CountryStore, P: AsRef<Path>>(store: &S, path: P) -> Result<usize> {
    let path = path.as_ref();
    let countries = load_csv(path)?;
    store
        .upsert_all(&countries)
        .with_context(|| format!("store countries from {}", path.display()))?;
    info!(
        "event=import module=storage status=ok rows={}",
        countries.len()
    );
    Ok(countries.len())
}
