use super::domain::{MarketSize, Urbanicity};

/// 2.5 persons per household, expressed as 2 households per 5 persons.
const HOUSEHOLDS_PER_GROUP: u64 = 2;
const PERSONS_PER_GROUP: u64 = 5;
const TAM_PER_HOUSEHOLD: u64 = 100;
const SAM_MIN_COMPOSITE: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketSizeError {
    #[error("population must be non-negative, got {0}")]
    NegativePopulation(i64),
    #[error("population '{0}' is not a whole number")]
    InvalidPopulation(String),
}

/// Derive households, TAM and SAM for a location.
///
/// SAM equals TAM only for urban locations whose composite score is at least 15.
pub fn estimate(
    population: i64,
    composite_score: f64,
    urbanicity: &Urbanicity,
) -> Result<MarketSize, MarketSizeError> {
    let population =
        u64::try_from(population).map_err(|_| MarketSizeError::NegativePopulation(population))?;

    let households = households(population);
    let tam = households.saturating_mul(TAM_PER_HOUSEHOLD);
    let sam = if composite_score >= SAM_MIN_COMPOSITE && urbanicity.is_urban() {
        tam
    } else {
        0
    };

    Ok(MarketSize {
        households,
        tam,
        sam,
    })
}

/// `floor(population / 2.5)` in integer arithmetic, exact for the whole `u64` range.
pub fn households(population: u64) -> u64 {
    population / PERSONS_PER_GROUP * HOUSEHOLDS_PER_GROUP
        + population % PERSONS_PER_GROUP * HOUSEHOLDS_PER_GROUP / PERSONS_PER_GROUP
}

/// Parse a population cell. Blank and fractional values are rejected rather than coerced.
pub fn parse_population(raw: &str) -> Result<i64, MarketSizeError> {
    let trimmed = raw.trim();
    let cleaned: String = trimmed.chars().filter(|ch| *ch != ',').collect();
    cleaned
        .parse::<i64>()
        .map_err(|_| MarketSizeError::InvalidPopulation(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urban() -> Urbanicity {
        Urbanicity::Urban
    }

    #[test]
    fn households_floor_population_over_two_and_a_half() {
        assert_eq!(households(10_000), 4_000);
        assert_eq!(households(7), 2);
        assert_eq!(households(2), 0);
    }

    #[test]
    fn households_stay_exact_near_the_top_of_the_range() {
        assert_eq!(households(2_000_000_000_000_000_000), 800_000_000_000_000_000);
        assert_eq!(households(u64::MAX), u64::MAX / 5 * 2);

        let size = estimate(i64::MAX, 20.0, &urban()).expect("valid population");
        assert_eq!(size.households, 3_689_348_814_741_910_322);
        assert_eq!(size.tam, u64::MAX);
    }

    #[test]
    fn tam_is_one_hundred_per_household() {
        let size = estimate(10_000, 3.0, &urban()).expect("valid population");
        assert_eq!(size.households, 4_000);
        assert_eq!(size.tam, 400_000);
        assert_eq!(size.sam, 0);
    }

    #[test]
    fn sam_requires_high_score_and_urban() {
        let high_urban = estimate(10_000, 15.0, &urban()).expect("valid");
        assert_eq!(high_urban.sam, 400_000);

        let high_rural = estimate(10_000, 15.0, &Urbanicity::parse("Rural")).expect("valid");
        assert_eq!(high_rural.sam, 0);

        let medium_urban = estimate(10_000, 14.0, &urban()).expect("valid");
        assert_eq!(medium_urban.sam, 0);
    }

    #[test]
    fn zero_population_sizes_to_zero() {
        let size = estimate(0, 20.0, &urban()).expect("zero is valid");
        assert_eq!(size, MarketSize::default());
    }

    #[test]
    fn negative_population_is_rejected() {
        assert_eq!(
            estimate(-5, 10.0, &urban()),
            Err(MarketSizeError::NegativePopulation(-5))
        );
    }

    #[test]
    fn population_text_must_be_integral() {
        assert_eq!(parse_population(" 12,500 "), Ok(12_500));
        assert_eq!(parse_population("-3"), Ok(-3));
        assert!(matches!(
            parse_population("about 900"),
            Err(MarketSizeError::InvalidPopulation(_))
        ));
        assert!(parse_population("").is_err());
        assert!(parse_population("12.5").is_err());
    }
}
