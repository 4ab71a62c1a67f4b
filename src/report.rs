//! Fixed-width text rendering for the console.
//!
//! Column widths are 20/40/20/25, separated by a single space.

use crate::models::{Country, Metric};
use crate::stats::{Analysis, Extremes};
use rust_decimal::{Decimal, RoundingStrategy};

/// Shown in place of an unknown value in a table cell.
pub const MISSING: &str = "--";
/// Shown in place of a statistic that has no input values.
pub const NO_DATA: &str = "No data";

/// Round to 2 places, half-up, and always show both fractional digits.
///
/// Only affects the rendered text; the stored value keeps its precision.
pub fn format_decimal(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

pub fn format_cell(value: Option<Decimal>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_decimal)
}

pub fn format_header() -> String {
    format_columns("Code", "Country", "Internet Users", "Literacy")
}

pub fn format_row(country: &Country) -> String {
    format_columns(
        &country.code,
        &country.name,
        &format_cell(country.internet_users),
        &format_cell(country.adult_literacy_rate),
    )
}

fn format_columns(code: &str, name: &str, internet: &str, literacy: &str) -> String {
    format!("{code:<20} {name:<40} {internet:<20} {literacy:<25}")
}

/// Header plus one line per country, newline-terminated.
pub fn format_table(countries: &[Country]) -> String {
    let mut out = format_header();
    out.push('\n');
    for country in countries {
        out.push_str(&format_row(country));
        out.push('\n');
    }
    out
}

pub fn format_extremes(label: &str, extremes: &Extremes) -> String {
    let bound = |v: Option<Decimal>| v.map_or_else(|| NO_DATA.to_string(), format_decimal);
    format!(
        "{label}: minimum {}, maximum {}",
        bound(extremes.min),
        bound(extremes.max)
    )
}

pub fn format_correlation(coefficient: Option<f64>) -> String {
    let value = match coefficient {
        Some(r) if r.is_finite() => format!("{r:.4}"),
        _ => NO_DATA.to_string(),
    };
    format!(
        "Correlation ({} vs {}): {value}",
        Metric::InternetUsers.label(),
        Metric::AdultLiteracyRate.label()
    )
}

/// The full analysis screen: one line per metric, then the correlation.
pub fn format_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    for metric in Metric::ALL {
        out.push_str(&format_extremes(metric.label(), &analysis.extremes(metric)));
        out.push('\n');
    }
    out.push_str(&format_correlation(analysis.correlation));
    out.push('\n');
    out
}
