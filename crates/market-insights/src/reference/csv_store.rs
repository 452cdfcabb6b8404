use super::parser::{self, Parsed, SkippedRow};
use super::{LocationQuery, ProviderError, ReferenceDataProvider};
use crate::insights::domain::{
    DivorceRateRecord, IncomeBracketRecord, LocationRecord, ScoreDimension, ScoreRecord,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// File names expected inside a reference data directory.
#[derive(Debug, Clone)]
pub struct ReferenceFiles {
    pub locations: PathBuf,
    pub divorce_scores: PathBuf,
    pub income_scores: PathBuf,
    pub divorce_rates: PathBuf,
    pub income_brackets: PathBuf,
}

impl ReferenceFiles {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            locations: dir.join("locations.csv"),
            divorce_scores: dir.join("divorce_scores.csv"),
            income_scores: dir.join("income_scores.csv"),
            divorce_rates: dir.join("divorce_rates.csv"),
            income_brackets: dir.join("income_brackets.csv"),
        }
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    locations: Vec<LocationRecord>,
    divorce_scores: Vec<ScoreRecord>,
    income_scores: Vec<ScoreRecord>,
    divorce_rates: Vec<DivorceRateRecord>,
    income_brackets: Vec<IncomeBracketRecord>,
    skipped: Vec<SkippedRow>,
}

/// Immutable in-memory snapshot of CSV reference exports.
///
/// Cloning is cheap; every clone shares the same rows.
#[derive(Debug, Clone, Default)]
pub struct CsvReferenceStore {
    snapshot: Arc<Snapshot>,
}

impl CsvReferenceStore {
    /// Load every export from `dir`. Location and score files are required;
    /// the chart series files are optional and load as empty when absent.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let files = ReferenceFiles::in_dir(dir);
        let mut builder = CsvReferenceStoreBuilder::default();

        builder.locations(File::open(&files.locations)?)?;
        builder.scores(ScoreDimension::Divorce, File::open(&files.divorce_scores)?)?;
        builder.scores(ScoreDimension::Income, File::open(&files.income_scores)?)?;

        if let Some(file) = open_optional(&files.divorce_rates)? {
            builder.divorce_rates(file)?;
        }
        if let Some(file) = open_optional(&files.income_brackets)? {
            builder.income_brackets(file)?;
        }

        let store = builder.build();
        info!(
            locations = store.snapshot.locations.len(),
            skipped = store.snapshot.skipped.len(),
            "reference data loaded"
        );
        Ok(store)
    }

    pub fn builder() -> CsvReferenceStoreBuilder {
        CsvReferenceStoreBuilder::default()
    }

    /// Rows dropped while loading because of missing or malformed fields.
    pub fn skipped_rows(&self) -> &[SkippedRow] {
        &self.snapshot.skipped
    }

    pub fn location_count(&self) -> usize {
        self.snapshot.locations.len()
    }
}

fn open_optional(path: &Path) -> Result<Option<File>, ProviderError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "optional reference file missing, loading empty");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Accumulates CSV sources into a [`CsvReferenceStore`].
#[derive(Debug, Default)]
pub struct CsvReferenceStoreBuilder {
    snapshot: Snapshot,
}

impl CsvReferenceStoreBuilder {
    pub fn locations<R: Read>(&mut self, reader: R) -> Result<&mut Self, ProviderError> {
        let parsed = parser::parse_locations(reader)?;
        let records = self.absorb(parsed);
        self.snapshot.locations.extend(records);
        Ok(self)
    }

    pub fn scores<R: Read>(
        &mut self,
        dimension: ScoreDimension,
        reader: R,
    ) -> Result<&mut Self, ProviderError> {
        let source = match dimension {
            ScoreDimension::Divorce => "divorce_scores",
            ScoreDimension::Income => "income_scores",
        };
        let parsed = parser::parse_scores(reader, source)?;
        let records = self.absorb(parsed);
        match dimension {
            ScoreDimension::Divorce => self.snapshot.divorce_scores.extend(records),
            ScoreDimension::Income => self.snapshot.income_scores.extend(records),
        }
        Ok(self)
    }

    pub fn divorce_rates<R: Read>(&mut self, reader: R) -> Result<&mut Self, ProviderError> {
        let parsed = parser::parse_divorce_rates(reader)?;
        let records = self.absorb(parsed);
        self.snapshot.divorce_rates.extend(records);
        Ok(self)
    }

    pub fn income_brackets<R: Read>(&mut self, reader: R) -> Result<&mut Self, ProviderError> {
        let parsed = parser::parse_income_brackets(reader)?;
        let records = self.absorb(parsed);
        self.snapshot.income_brackets.extend(records);
        Ok(self)
    }

    pub fn build(self) -> CsvReferenceStore {
        CsvReferenceStore {
            snapshot: Arc::new(self.snapshot),
        }
    }

    fn absorb<T>(&mut self, parsed: Parsed<T>) -> Vec<T> {
        for row in &parsed.skipped {
            warn!(source = row.source, row = row.row, reason = %row.reason, "skipping reference row");
        }
        self.snapshot.skipped.extend(parsed.skipped);
        parsed.records
    }
}

impl ReferenceDataProvider for CsvReferenceStore {
    async fn locations(&self, query: LocationQuery) -> Result<Vec<LocationRecord>, ProviderError> {
        Ok(self
            .snapshot
            .locations
            .iter()
            .filter(|location| query.matches(&location.state, &location.city))
            .cloned()
            .collect())
    }

    async fn scores(
        &self,
        dimension: ScoreDimension,
        zips: Vec<String>,
    ) -> Result<Vec<ScoreRecord>, ProviderError> {
        let wanted: HashSet<String> = zips.into_iter().collect();
        let records = match dimension {
            ScoreDimension::Divorce => &self.snapshot.divorce_scores,
            ScoreDimension::Income => &self.snapshot.income_scores,
        };
        Ok(records
            .iter()
            .filter(|record| wanted.contains(&record.zip))
            .cloned()
            .collect())
    }

    async fn divorce_rates(&self) -> Result<Vec<DivorceRateRecord>, ProviderError> {
        Ok(self.snapshot.divorce_rates.clone())
    }

    async fn income_brackets(
        &self,
        query: LocationQuery,
    ) -> Result<Vec<IncomeBracketRecord>, ProviderError> {
        Ok(self
            .snapshot
            .income_brackets
            .iter()
            .filter(|row| query.matches(&row.state, &row.city))
            .cloned()
            .collect())
    }
}
