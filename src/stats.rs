use crate::models::{Country, Metric};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Smallest and largest known value of one metric.
///
/// Both bounds are `None` when no country has a value for the metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extremes {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

/// Minimum and maximum of the present values, skipping `None`.
///
/// Values are compared numerically, so `87.0` and `87.00` are equal.
/// Stored precision is returned untouched; rounding happens at display time.
pub fn extremes<I>(values: I) -> Extremes
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    let mut out = Extremes::default();
    for v in values.into_iter().flatten() {
        out.min = Some(out.min.map_or(v, |m| m.min(v)));
        out.max = Some(out.max.map_or(v, |m| m.max(v)));
    }
    out
}

/// Pearson correlation coefficient over the pairs where both sides are known.
///
/// Returns `None` for fewer than two pairs, or when either side has zero variance.
pub fn correlation<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<Decimal>, Option<Decimal>)>,
{
    let pts: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter_map(|(x, y)| Some((x?.to_f64()?, y?.to_f64()?)))
        .collect();
    if pts.len() < 2 {
        return None;
    }

    let n = pts.len() as f64;
    let mean_x = pts.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pts.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pts {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Everything the "Display Analysis" screen reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub internet_users: Extremes,
    pub adult_literacy_rate: Extremes,
    pub correlation: Option<f64>,
}

impl Analysis {
    pub fn extremes(&self, metric: Metric) -> Extremes {
        match metric {
            Metric::InternetUsers => self.internet_users,
            Metric::AdultLiteracyRate => self.adult_literacy_rate,
        }
    }
}

/// Run the statistics independently on each metric column.
pub fn analyze(countries: &[Country]) -> Analysis {
    let column = |metric: Metric| extremes(countries.iter().map(|c| c.metric(metric)));
    Analysis {
        internet_users: column(Metric::InternetUsers),
        adult_literacy_rate: column(Metric::AdultLiteracyRate),
        correlation: correlation(
            countries
                .iter()
                .map(|c| (c.internet_users, c.adult_literacy_rate)),
        ),
    }
}
