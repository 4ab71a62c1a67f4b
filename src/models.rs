use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Required length of a country code (ISO 3166-1 alpha-3 style, e.g. `DEU`).
pub const CODE_LEN: usize = 3;
/// Longest country name the store accepts.
pub const NAME_MAX_LEN: usize = 32;

/// The two per-country indicators tracked by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Individuals using the Internet (% of population).
    InternetUsers,
    /// Literacy rate, adult total (% of people ages 15 and above).
    AdultLiteracyRate,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::InternetUsers, Metric::AdultLiteracyRate];

    /// Column title used in tables and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Metric::InternetUsers => "Internet Users",
            Metric::AdultLiteracyRate => "Literacy",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reasons a user-supplied value cannot become part of a `Country`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("country code must be exactly 3 characters, got {len} (`{code}`)")]
    CodeLength { code: String, len: usize },
    #[error("country name must not be empty")]
    EmptyName,
    #[error("country name must be at most 32 characters, got {len}")]
    NameTooLong { len: usize },
    #[error("{metric} must be a number, got `{input}`")]
    NotANumber { metric: Metric, input: String },
    #[error("{metric} must be between 0 and 100, got {value}")]
    OutOfRange { metric: Metric, value: Decimal },
}

/// One row of the data set: a country and its latest indicator values.
///
/// `None` means the value is unknown, which is different from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub internet_users: Option<Decimal>,
    pub adult_literacy_rate: Option<Decimal>,
}

impl Country {
    /// Builds a country with no indicator values, validating code and name.
    ///
    /// The code is trimmed and uppercased; the name is trimmed.
    pub fn new(code: &str, name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            code: normalize_code(code)?,
            name: normalize_name(name)?,
            internet_users: None,
            adult_literacy_rate: None,
        })
    }

    pub fn with_metric(mut self, metric: Metric, value: Option<Decimal>) -> Self {
        self.set_metric(metric, value);
        self
    }

    pub fn metric(&self, metric: Metric) -> Option<Decimal> {
        match metric {
            Metric::InternetUsers => self.internet_users,
            Metric::AdultLiteracyRate => self.adult_literacy_rate,
        }
    }

    pub fn set_metric(&mut self, metric: Metric, value: Option<Decimal>) {
        match metric {
            Metric::InternetUsers => self.internet_users = value,
            Metric::AdultLiteracyRate => self.adult_literacy_rate = value,
        }
    }

    /// Checks every field invariant. Write paths call this before touching storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.code.chars().count();
        if len != CODE_LEN {
            return Err(ValidationError::CodeLength {
                code: self.code.clone(),
                len,
            });
        }
        check_name(&self.name)?;
        for metric in Metric::ALL {
            if let Some(value) = self.metric(metric) {
                check_range(metric, value)?;
            }
        }
        Ok(())
    }
}

/// Trim and uppercase a code, rejecting anything that is not exactly 3 characters.
pub fn normalize_code(input: &str) -> Result<String, ValidationError> {
    let code = input.trim().to_uppercase();
    let len = code.chars().count();
    if len != CODE_LEN {
        return Err(ValidationError::CodeLength { code, len });
    }
    Ok(code)
}

pub fn normalize_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    check_name(name)?;
    Ok(name.to_string())
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = name.chars().count();
    if len > NAME_MAX_LEN {
        return Err(ValidationError::NameTooLong { len });
    }
    Ok(())
}

fn check_range(metric: Metric, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange { metric, value });
    }
    Ok(())
}

/// Parse an optional percentage typed by a user or read from a file.
///
/// Blank input yields `Ok(None)`. Anything else must be a plain decimal
/// number within `0..=100`; the parsed scale is kept as typed.
pub fn parse_percentage(metric: Metric, input: &str) -> Result<Option<Decimal>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let not_a_number = || ValidationError::NotANumber {
        metric,
        input: trimmed.to_string(),
    };
    if !is_plain_decimal(trimmed) {
        return Err(not_a_number());
    }
    let value = Decimal::from_str(trimmed).map_err(|_| not_a_number())?;
    check_range(metric, value)?;
    Ok(Some(value))
}

/// An optional sign, then digits with at most one `.` and at least one digit.
fn is_plain_decimal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut dots = 0;
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_trimmed_and_uppercased() {
        assert_eq!(normalize_code(" usa ").unwrap(), "USA");
    }

    #[test]
    fn code_of_wrong_length_is_rejected() {
        assert!(matches!(
            normalize_code("US"),
            Err(ValidationError::CodeLength { len: 2, .. })
        ));
        assert!(matches!(
            normalize_code("USAX"),
            Err(ValidationError::CodeLength { len: 4, .. })
        ));
        assert!(normalize_code("").is_err());
    }

    #[test]
    fn name_must_be_present_and_short() {
        assert_eq!(normalize_name("  "), Err(ValidationError::EmptyName));
        let long = "x".repeat(NAME_MAX_LEN + 1);
        assert_eq!(
            normalize_name(&long),
            Err(ValidationError::NameTooLong { len: NAME_MAX_LEN + 1 })
        );
        assert_eq!(normalize_name(" Chad ").unwrap(), "Chad");
    }

    #[test]
    fn percentage_parsing() {
        let m = Metric::InternetUsers;
        assert_eq!(parse_percentage(m, "").unwrap(), None);
        assert_eq!(parse_percentage(m, "   ").unwrap(), None);
        assert_eq!(
            parse_percentage(m, " 86.5 ").unwrap(),
            Some(Decimal::new(865, 1))
        );
        assert!(matches!(
            parse_percentage(m, "abc"),
            Err(ValidationError::NotANumber { .. })
        ));
        for typo in ["8_7", "1_0.5", "1e2", "8..7", ".", "+", "87%", "0x10"] {
            assert!(
                matches!(
                    parse_percentage(m, typo),
                    Err(ValidationError::NotANumber { .. })
                ),
                "{typo} should be rejected"
            );
        }
        assert_eq!(parse_percentage(m, ".5").unwrap(), Some(Decimal::new(5, 1)));
        assert_eq!(parse_percentage(m, "+87").unwrap(), Some(Decimal::new(87, 0)));
        assert!(matches!(
            parse_percentage(m, "100.01"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_percentage(m, "-1"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn validate_catches_bad_fields() {
        let mut c = Country::new("deu", "Germany").unwrap();
        assert_eq!(c.code, "DEU");
        assert!(c.validate().is_ok());
        c.set_metric(Metric::AdultLiteracyRate, Some(Decimal::new(101, 0)));
        assert!(c.validate().is_err());
        c.set_metric(Metric::AdultLiteracyRate, None);
        c.code = "DE".into();
        assert!(c.validate().is_err());
    }
}
