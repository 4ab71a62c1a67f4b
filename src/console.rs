//! Interactive menu loop.
//!
//! The console is generic over its input and output so it can be driven by
//! stdin/stdout in the binary and by in-memory buffers in tests. Every menu
//! action runs to completion (or to a reported failure) before the menu is
//! shown again; only I/O errors on the console itself end the loop early.

use crate::models::{self, Country, Metric};
use crate::report;
use crate::stats;
use crate::store::{CountryStore, StoreError};
use log::warn;
use std::io::{self, BufRead, Write};

pub const BANNER: &str = "\
----------------------------------------------------------------------
    World Bank Public Data Set
    Is there a relationship between internet usage and adult literacy?
----------------------------------------------------------------------";

pub const MENU: &str = "\
--- World Bank Public Data Set ---
1. Display Country Data
2. Display Analysis
3. Edit Country
4. Add Country
5. Delete Country
6. Exit";

/// A menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Display,
    Analyze,
    Edit,
    Add,
    Delete,
    Exit,
}

impl Choice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Choice::Display),
            "2" => Some(Choice::Analyze),
            "3" => Some(Choice::Edit),
            "4" => Some(Choice::Add),
            "5" => Some(Choice::Delete),
            "6" => Some(Choice::Exit),
            _ => None,
        }
    }
}

pub struct Console<S, R, W> {
    store: S,
    input: R,
    output: W,
}

impl<S, R, W> Console<S, R, W>
where
    S: CountryStore,
    R: BufRead,
    W: Write,
{
    pub fn new(store: S, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Run the menu until the user exits or input ends, then close the store.
    ///
    /// Returns the output sink so callers can inspect what was written.
    pub fn run(mut self) -> io::Result<W> {
        writeln!(self.output, "{BANNER}")?;
        let result = self.menu_loop();
        self.store.close();
        result?;
        Ok(self.output)
    }

    fn menu_loop(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "{MENU}")?;
            let Some(line) = self.prompt("Select an option: ")? else {
                writeln!(self.output)?;
                return Ok(());
            };
            match Choice::parse(&line) {
                Some(Choice::Display) => self.display()?,
                Some(Choice::Analyze) => self.analyze()?,
                Some(Choice::Edit) => self.edit()?,
                Some(Choice::Add) => self.add()?,
                Some(Choice::Delete) => self.delete()?,
                Some(Choice::Exit) => {
                    writeln!(self.output, "Goodbye.")?;
                    return Ok(());
                }
                None => writeln!(self.output, "Invalid choice, please select 1-6.")?,
            }
        }
    }

    /// Print `label` and read one line. `None` means input is exhausted.
    ///
    /// The answer is followed by a newline on the output, so whatever is
    /// printed next starts on its own line even when input is not echoed.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        writeln!(self.output)?;
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn report_error(&mut self, context: &str, err: &StoreError) -> io::Result<()> {
        warn!("event=console_op module=console status=error op={context} error={err}");
        writeln!(self.output, "Error: could not {context}: {err}")
    }

    fn display(&mut self) -> io::Result<()> {
        match self.store.list_all() {
            Ok(countries) => write!(self.output, "{}", report::format_table(&countries)),
            Err(err) => self.report_error("load countries", &err),
        }
    }

    fn analyze(&mut self) -> io::Result<()> {
        match self.store.list_all() {
            Ok(countries) => {
                let analysis = stats::analyze(&countries);
                write!(self.output, "{}", report::format_analysis(&analysis))
            }
            Err(err) => self.report_error("load countries", &err),
        }
    }

    /// Ask for a code and look it up. `None` means the operation should stop.
    fn find_country(&mut self, label: &str) -> io::Result<Option<Country>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        let code = raw.trim().to_uppercase();
        match self.store.get(&code) {
            Ok(Some(country)) => Ok(Some(country)),
            Ok(None) => {
                writeln!(self.output, "No country found with code {code}.")?;
                Ok(None)
            }
            Err(err) => {
                self.report_error("look up country", &err)?;
                Ok(None)
            }
        }
    }

    fn edit(&mut self) -> io::Result<()> {
        let Some(current) = self.find_country("Enter the country code to edit: ")? else {
            return Ok(());
        };
        write!(
            self.output,
            "{}",
            report::format_table(std::slice::from_ref(&current))
        )?;
        writeln!(self.output, "Press Enter to keep the current value.")?;

        let mut updated = current.clone();
        let Some(name) = self.prompt(&format!("Name [{}]: ", current.name))? else {
            return Ok(());
        };
        if !name.trim().is_empty() {
            match models::normalize_name(&name) {
                Ok(name) => updated.name = name,
                Err(err) => writeln!(self.output, "{err}; keeping current name.")?,
            }
        }

        for metric in Metric::ALL {
            let shown = report::format_cell(current.metric(metric));
            let Some(input) = self.prompt(&format!("{} [{shown}]: ", metric.label()))? else {
                return Ok(());
            };
            if input.trim().is_empty() {
                continue;
            }
            match models::parse_percentage(metric, &input) {
                Ok(value) => updated.set_metric(metric, value),
                Err(err) => writeln!(self.output, "{err}; keeping current value.")?,
            }
        }

        match self.store.upsert(&updated) {
            Ok(()) => {
                writeln!(self.output, "Country {} updated.", updated.code)?;
                self.display()
            }
            Err(err) => self.report_error(&format!("update country {}", updated.code), &err),
        }
    }

    fn add(&mut self) -> io::Result<()> {
        let Some(code) = self.prompt("Enter the country code (3 characters): ")? else {
            return Ok(());
        };
        let code = match models::normalize_code(&code) {
            Ok(code) => code,
            Err(err) => return writeln!(self.output, "Error: {err}"),
        };
        let Some(name) = self.prompt("Enter the country name: ")? else {
            return Ok(());
        };
        let mut country = match Country::new(&code, &name) {
            Ok(country) => country,
            Err(err) => return writeln!(self.output, "Error: {err}"),
        };

        for metric in Metric::ALL {
            let Some(input) = self.prompt(&format!("{} (blank if unknown): ", metric.label()))?
            else {
                return Ok(());
            };
            match models::parse_percentage(metric, &input) {
                Ok(value) => country.set_metric(metric, value),
                Err(err) => return writeln!(self.output, "Error: {err}"),
            }
        }

        match self.store.insert(&country) {
            Ok(()) => writeln!(self.output, "Country {} added.", country.code),
            Err(err) => self.report_error(&format!("add country {}", country.code), &err),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(country) = self.find_country("Enter the country code to delete: ")? else {
            return Ok(());
        };
        write!(
            self.output,
            "{}",
            report::format_table(std::slice::from_ref(&country))
        )?;
        let Some(answer) = self.prompt("Type 'yes' to confirm deletion: ")? else {
            return Ok(());
        };
        if !answer.trim().eq_ignore_ascii_case("yes") {
            return writeln!(self.output, "Deletion canceled.");
        }
        match self.store.delete(&country.code) {
            Ok(()) => writeln!(self.output, "Country {} deleted.", country.code),
            Err(err) => self.report_error(&format!("delete country {}", country.code), &err),
        }
    }
}
