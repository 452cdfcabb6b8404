use super::domain::{DivorceRateRecord, IncomeBracketRecord};
use super::report::PipelineWarning;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivorceRatePoint {
    pub year: i32,
    /// `None` when the selected state reported nothing for the year.
    pub average_rate_selection: Option<f64>,
    pub average_rate_national: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeBracketPoint {
    pub bracket: String,
    pub bracket_floor: u64,
    pub total_households: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Average divorce rate per year, for the selected state code and nationally.
///
/// Without a selection the selection average equals the national one.
pub fn divorce_rate_series(
    records: &[DivorceRateRecord],
    state_code: Option<&str>,
) -> Vec<DivorceRatePoint> {
    let mut years: BTreeMap<i32, (Mean, Mean)> = BTreeMap::new();

    for record in records {
        let (selection, national) = years.entry(record.year).or_default();
        national.push(record.rate);
        let selected = match state_code {
            Some(code) => record.state_code.eq_ignore_ascii_case(code),
            None => true,
        };
        if selected {
            selection.push(record.rate);
        }
    }

    years
        .into_iter()
        .filter_map(|(year, (selection, national))| {
            national.value().map(|average_rate_national| DivorceRatePoint {
                year,
                average_rate_selection: selection.value(),
                average_rate_national,
            })
        })
        .collect()
}

/// Total households per income bracket, ordered by the bracket's dollar floor.
pub fn income_distribution(
    records: &[IncomeBracketRecord],
) -> (Vec<IncomeBracketPoint>, Vec<PipelineWarning>) {
    let mut brackets: BTreeMap<u64, IncomeBracketPoint> = BTreeMap::new();
    let mut warnings = Vec::new();

    for record in records {
        let Some(floor) = bracket_floor(&record.bracket) else {
            debug!(bracket = %record.bracket, "excluding unparseable income bracket");
            warnings.push(PipelineWarning::RowSkipped {
                zip: format!("{}, {}", record.city, record.state),
                reason: format!("unrecognised income bracket '{}'", record.bracket),
            });
            continue;
        };

        let point = brackets
            .entry(floor)
            .or_insert_with(|| IncomeBracketPoint {
                bracket: record.bracket.trim().to_string(),
                bracket_floor: floor,
                total_households: 0,
            });
        point.total_households = point.total_households.saturating_add(record.households);
    }

    (brackets.into_values().collect(), warnings)
}

/// Lower bound in dollars of a bracket label such as `"$10,000 to $14,999"`,
/// `"Less than $10,000"` or `"$200k+"`.
pub fn bracket_floor(label: &str) -> Option<u64> {
    let lowered = label.trim().to_ascii_lowercase();
    if lowered.starts_with("less than") || lowered.starts_with("under") {
        return Some(0);
    }

    let start = lowered.find(|ch: char| ch.is_ascii_digit())?;
    let rest = &lowered[start..];
    let digits: String = rest
        .chars()
        .take_while(|ch| ch.is_ascii_digit() || *ch == ',')
        .filter(char::is_ascii_digit)
        .collect();
    let value: u64 = digits.parse().ok()?;

    let suffix = rest.trim_start_matches(|ch: char| ch.is_ascii_digit() || ch == ',');
    if suffix.starts_with('k') {
        value.checked_mul(1_000)
    } else {
        Some(value)
    }
}
