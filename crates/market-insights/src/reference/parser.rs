use super::states::state_code;
use crate::insights::domain::{
    parse_score, DivorceRateRecord, IncomeBracketRecord, LocationRecord, ScoreRecord, Urbanicity,
};
use crate::insights::market::parse_population;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

/// A CSV row dropped because a required field was missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub source: &'static str,
    /// 1-based data row number, header excluded.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug)]
pub(crate) struct Parsed<T> {
    pub(crate) records: Vec<T>,
    pub(crate) skipped: Vec<SkippedRow>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

fn parse_rows<R, Row, T, F>(reader: R, source: &'static str, convert: F) -> Result<Parsed<T>, csv::Error>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
    F: Fn(Row) -> Result<T, String>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut parsed = Parsed::default();

    for (index, row) in csv_reader.deserialize::<Row>().enumerate() {
        // Only a failing reader aborts the file; malformed records are skipped.
        let converted = match row {
            Ok(row) => convert(row),
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => return Err(err),
            Err(err) => Err(err.to_string()),
        };
        match converted {
            Ok(record) => parsed.records.push(record),
            Err(reason) => parsed.skipped.push(SkippedRow {
                source,
                row: index + 1,
                reason,
            }),
        }
    }

    Ok(parsed)
}

pub(crate) fn parse_locations<R: Read>(reader: R) -> Result<Parsed<LocationRecord>, csv::Error> {
    parse_rows(reader, "locations", LocationRow::into_record)
}

pub(crate) fn parse_scores<R: Read>(
    reader: R,
    source: &'static str,
) -> Result<Parsed<ScoreRecord>, csv::Error> {
    parse_rows(reader, source, ScoreRow::into_record)
}

pub(crate) fn parse_divorce_rates<R: Read>(
    reader: R,
) -> Result<Parsed<DivorceRateRecord>, csv::Error> {
    parse_rows(reader, "divorce_rates", DivorceRateRow::into_record)
}

pub(crate) fn parse_income_brackets<R: Read>(
    reader: R,
) -> Result<Parsed<IncomeBracketRecord>, csv::Error> {
    parse_rows(reader, "income_brackets", IncomeBracketRow::into_record)
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(
        alias = "Zip",
        alias = "ZIP",
        alias = "zip_code",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    zip: Option<String>,
    #[serde(alias = "City", default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(alias = "State", default, deserialize_with = "empty_string_as_none")]
    state: Option<String>,
    #[serde(alias = "Population", default, deserialize_with = "empty_string_as_none")]
    population: Option<String>,
    #[serde(alias = "Urbanicity", default, deserialize_with = "empty_string_as_none")]
    urbanicity: Option<String>,
    #[serde(
        alias = "competitor_count",
        alias = "Competitors",
        alias = "Competitor Count",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    competitors: Option<String>,
    #[serde(
        alias = "latitude",
        alias = "Latitude",
        alias = "Lat",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    lat: Option<String>,
    #[serde(
        alias = "longitude",
        alias = "Longitude",
        alias = "Lng",
        alias = "lon",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    lng: Option<String>,
}

impl LocationRow {
    fn into_record(self) -> Result<LocationRecord, String> {
        let zip = self.zip.ok_or("missing zip")?;
        let population = self
            .population
            .ok_or_else(|| format!("{zip}: missing population"))
            .and_then(|raw| parse_population(&raw).map_err(|err| format!("{zip}: {err}")))?;

        Ok(LocationRecord {
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            population,
            urbanicity: Urbanicity::parse(self.urbanicity.as_deref().unwrap_or_default()),
            competitor_count: self.competitors.and_then(|raw| raw.parse().ok()),
            latitude: self.lat.and_then(|raw| raw.parse().ok()),
            longitude: self.lng.and_then(|raw| raw.parse().ok()),
            zip,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    #[serde(
        alias = "Zip",
        alias = "ZIP",
        alias = "zip_code",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    zip: Option<String>,
    #[serde(
        alias = "Score",
        alias = "divorce_score",
        alias = "income_score",
        alias = "Divorce Score",
        alias = "Income Score",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    score: Option<String>,
}

impl ScoreRow {
    fn into_record(self) -> Result<ScoreRecord, String> {
        let zip = self.zip.ok_or("missing zip")?;
        let score = parse_score(self.score.as_deref());
        Ok(ScoreRecord { zip, score })
    }
}

#[derive(Debug, Deserialize)]
struct DivorceRateRow {
    #[serde(
        alias = "State",
        alias = "state_code",
        alias = "State Code",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    state: Option<String>,
    #[serde(alias = "Year", default, deserialize_with = "empty_string_as_none")]
    year: Option<String>,
    #[serde(
        alias = "Rate",
        alias = "divorce_rate",
        alias = "Divorce Rate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    rate: Option<String>,
}

impl DivorceRateRow {
    fn into_record(self) -> Result<DivorceRateRecord, String> {
        let state = self.state.ok_or("missing state")?;
        let state_code = state_code(&state).ok_or_else(|| format!("unknown state '{state}'"))?;
        let year = self
            .year
            .as_deref()
            .and_then(|raw| raw.parse::<i32>().ok())
            .ok_or_else(|| format!("{state_code}: missing or invalid year"))?;
        let rate = self
            .rate
            .as_deref()
            .and_then(|raw| raw.trim_end_matches('%').trim().parse::<f64>().ok())
            .filter(|rate| rate.is_finite())
            .ok_or_else(|| format!("{state_code} {year}: missing or invalid rate"))?;

        Ok(DivorceRateRecord {
            state_code: state_code.to_string(),
            year,
            rate,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IncomeBracketRow {
    #[serde(alias = "State", default, deserialize_with = "empty_string_as_none")]
    state: Option<String>,
    #[serde(alias = "City", default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(
        alias = "Bracket",
        alias = "income_bracket",
        alias = "Income Bracket",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    bracket: Option<String>,
    #[serde(
        alias = "Households",
        alias = "total_households",
        alias = "Total Households",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    households: Option<String>,
}

impl IncomeBracketRow {
    fn into_record(self) -> Result<IncomeBracketRecord, String> {
        let bracket = self.bracket.ok_or("missing bracket")?;
        let households = self
            .households
            .as_deref()
            .map(|raw| raw.replace(',', ""))
            .and_then(|raw| raw.parse::<u64>().ok())
            .ok_or_else(|| format!("{bracket}: missing or invalid household count"))?;

        Ok(IncomeBracketRecord {
            state: self.state.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            bracket,
            households,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
