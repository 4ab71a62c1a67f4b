//! Country persistence: the repository contract and its SQLite implementation.
//!
//! Every mutation runs in its own transaction on its own session. If any
//! step fails, the transaction is dropped uncommitted and SQLite rolls it
//! back, leaving previously persisted rows untouched.

use crate::db::{Database, DbError};
use crate::models::{Country, ValidationError};
use log::{error, info};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;

const COUNTRY_SELECT_SQL: &str =
    "SELECT code, name, internet_users, adult_literacy_rate FROM country";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no country found with code {0}")]
    NotFound(String),
    #[error("a country with code {0} already exists")]
    Duplicate(String),
    #[error("invalid persisted country data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface over the `country` table.
pub trait CountryStore {
    /// Every stored country, ordered by code.
    fn list_all(&self) -> StoreResult<Vec<Country>>;
    /// `Ok(None)` when no row has this code.
    fn get(&self, code: &str) -> StoreResult<Option<Country>>;
    /// Insert, or replace the row with the same code.
    fn upsert(&self, country: &Country) -> StoreResult<()>;
    /// Upsert every country in one transaction; on any failure none are written.
    fn upsert_all(&self, countries: &[Country]) -> StoreResult<()>;
    /// Insert a new row; fails with [`StoreError::Duplicate`] if the code is taken.
    fn insert(&self, country: &Country) -> StoreResult<()>;
    /// Remove a row; fails with [`StoreError::NotFound`] if there is none.
    fn delete(&self, code: &str) -> StoreResult<()>;
    /// Release the underlying storage resources.
    fn close(self);
}

/// SQLite-backed store. Owns the process-wide [`Database`] handle.
#[derive(Debug)]
pub struct SqliteCountryStore {
    db: Database,
}

impl SqliteCountryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run `op` in a transaction on a fresh session, logging the outcome.
    fn write<F>(&self, event: &str, subject: &str, op: F) -> StoreResult<()>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> StoreResult<()>,
    {
        let started_at = Instant::now();
        let result = (|| -> StoreResult<()> {
            let mut conn = self.db.session()?;
            let tx = conn.transaction()?;
            op(&tx)?;
            tx.commit()?;
            Ok(())
        })();

        match &result {
            Ok(()) => info!(
                "event={event} module=store status=ok subject={subject} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={event} module=store status=error subject={subject} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

impl CountryStore for SqliteCountryStore {
    fn list_all(&self) -> StoreResult<Vec<Country>> {
        let conn = self.db.session()?;
        let mut stmt = conn.prepare(&format!("{COUNTRY_SELECT_SQL} ORDER BY code"))?;
        let mut rows = stmt.query([])?;
        let mut countries = Vec::new();
        while let Some(row) = rows.next()? {
            countries.push(parse_country_row(row)?);
        }
        Ok(countries)
    }

    fn get(&self, code: &str) -> StoreResult<Option<Country>> {
        let conn = self.db.session()?;
        fetch(&conn, code)
    }

    fn upsert(&self, country: &Country) -> StoreResult<()> {
        country.validate()?;
        self.write("country_upsert", &country.code, |tx| upsert_row(tx, country))
    }

    fn upsert_all(&self, countries: &[Country]) -> StoreResult<()> {
        for country in countries {
            country.validate()?;
        }
        let subject = format!("{}_rows", countries.len());
        self.write("country_upsert_all", &subject, |tx| {
            countries.iter().try_for_each(|c| upsert_row(tx, c))
        })
    }

    fn insert(&self, country: &Country) -> StoreResult<()> {
        country.validate()?;
        self.write("country_insert", &country.code, |tx| {
            if fetch(tx, &country.code)?.is_some() {
                return Err(StoreError::Duplicate(country.code.clone()));
            }
            tx.execute(
                "INSERT INTO country (code, name, internet_users, adult_literacy_rate)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    country.code,
                    country.name,
                    decimal_to_db(country.internet_users),
                    decimal_to_db(country.adult_literacy_rate),
                ],
            )?;
            Ok(())
        })
    }

    fn delete(&self, code: &str) -> StoreResult<()> {
        self.write("country_delete", code, |tx| {
            let changed = tx.execute("DELETE FROM country WHERE code = ?1;", [code])?;
            if changed == 0 {
                return Err(StoreError::NotFound(code.to_string()));
            }
            Ok(())
        })
    }

    fn close(self) {
        self.db.close();
    }
}

fn upsert_row(conn: &Connection, country: &Country) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO country (code, name, internet_users, adult_literacy_rate)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(code) DO UPDATE SET
            name = excluded.name,
            internet_users = excluded.internet_users,
            adult_literacy_rate = excluded.adult_literacy_rate;",
        params![
            country.code,
            country.name,
            decimal_to_db(country.internet_users),
            decimal_to_db(country.adult_literacy_rate),
        ],
    )?;
    Ok(())
}

fn fetch(conn: &Connection, code: &str) -> StoreResult<Option<Country>> {
    let mut stmt = conn.prepare(&format!("{COUNTRY_SELECT_SQL} WHERE code = ?1"))?;
    let row = stmt
        .query_row([code], |row| {
            Ok((
                row.get::<_, String>("code")?,
                row.get::<_, String>("name")?,
                row.get::<_, Option<String>>("internet_users")?,
                row.get::<_, Option<String>>("adult_literacy_rate")?,
            ))
        })
        .optional()?;
    row.map(|(code, name, internet, literacy)| build_country(code, name, internet, literacy))
        .transpose()
}

fn parse_country_row(row: &Row<'_>) -> StoreResult<Country> {
    build_country(
        row.get("code")?,
        row.get("name")?,
        row.get("internet_users")?,
        row.get("adult_literacy_rate")?,
    )
}

fn build_country(
    code: String,
    name: String,
    internet_users: Option<String>,
    adult_literacy_rate: Option<String>,
) -> StoreResult<Country> {
    Ok(Country {
        internet_users: decimal_from_db(&code, "internet_users", internet_users)?,
        adult_literacy_rate: decimal_from_db(&code, "adult_literacy_rate", adult_literacy_rate)?,
        code,
        name,
    })
}

fn decimal_to_db(value: Option<Decimal>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn decimal_from_db(code: &str, column: &str, raw: Option<String>) -> StoreResult<Option<Decimal>> {
    raw.map(|text| {
        Decimal::from_str(&text).map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid decimal `{text}` in country.{column} for {code}"
            ))
        })
    })
    .transpose()
}
