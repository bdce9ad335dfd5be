//! Collaboration scores.
//!
//! Two sub-scores are derived from the unfiltered aggregates:
//!
//! - timezone coverage: share of the 24 UTC hours with any activity
//! - geographic diversity: `ln(k) / ln(saturation)` for `k` active countries,
//!   capped at 1
//!
//! The global score is their weighted mean.

use crate::error::MetricsError;
use crate::models::{CountryCount, HourlyHistogram, ScoreWeights, Scores, HOURS_PER_DAY};

/// Distinct countries at which geographic diversity reaches 1.
pub const DEFAULT_DIVERSITY_SATURATION: usize = 8;

/// Score with equal weights and the default saturation point.
pub fn score(histogram: &HourlyHistogram, country_counts: &[CountryCount]) -> Scores {
    score_with(
        histogram,
        country_counts,
        &ScoreWeights::default(),
        DEFAULT_DIVERSITY_SATURATION,
    )
}

/// Score with explicit weights and saturation point.
///
/// Parameters are expected to have passed [`validate_scoring`]; degenerate
/// weights produce a global score of 0.
pub fn score_with(
    histogram: &HourlyHistogram,
    country_counts: &[CountryCount],
    weights: &ScoreWeights,
    saturation: usize,
) -> Scores {
    let timezone_coverage = timezone_coverage(histogram);
    let geo_diversity = geo_diversity(country_counts, saturation);

    let weight_sum = weights.coverage + weights.diversity;
    let global_score = if weight_sum > 0.0 {
        (weights.coverage * timezone_coverage + weights.diversity * geo_diversity) / weight_sum
    } else {
        0.0
    };

    Scores {
        timezone_coverage,
        geo_diversity,
        global_score,
    }
}

/// Fraction of hours with at least one event.
pub fn timezone_coverage(histogram: &HourlyHistogram) -> f64 {
    let active = histogram.iter().filter(|&&count| count > 0).count();
    active as f64 / HOURS_PER_DAY as f64
}

/// Log-normalized number of distinct active countries, capped at 1.
pub fn geo_diversity(country_counts: &[CountryCount], saturation: usize) -> f64 {
    let k = country_counts.iter().filter(|c| c.count > 0).count();
    if k == 0 || saturation < 2 {
        return 0.0;
    }
    ((k as f64).ln() / (saturation as f64).ln()).min(1.0)
}

/// Check score weights and the saturation point.
pub fn validate_scoring(weights: &ScoreWeights, saturation: usize) -> Result<(), MetricsError> {
    for (name, value) in [
        ("coverage_weight", weights.coverage),
        ("diversity_weight", weights.diversity),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(MetricsError::invalid_param(
                name,
                format!("must be a finite non-negative number, got {value}"),
            ));
        }
    }
    if weights.coverage + weights.diversity <= 0.0 {
        return Err(MetricsError::invalid_param(
            "weights",
            "coverage and diversity weights cannot both be zero",
        ));
    }
    if saturation < 2 {
        return Err(MetricsError::invalid_param(
            "diversity_saturation",
            format!("must be at least 2, got {saturation}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn countries(k: usize) -> Vec<CountryCount> {
        (0..k)
            .map(|i| CountryCount::new(format!("C{i:02}"), 1))
            .collect()
    }

    #[test]
    fn test_empty_scores_are_zero() {
        let scores = score(&[0; HOURS_PER_DAY], &[]);
        assert_eq!(scores, Scores::default());
    }

    #[test]
    fn test_full_coverage_single_country() {
        let scores = score(&[1; HOURS_PER_DAY], &[CountryCount::new("USA", 24)]);

        assert_eq!(scores.timezone_coverage, 1.0);
        assert_eq!(scores.geo_diversity, 0.0);
        assert_eq!(scores.global_score, 0.5);
    }

    #[test]
    fn test_coverage_fraction() {
        let mut histogram = [0; HOURS_PER_DAY];
        for hour in [0, 6, 12, 18, 23, 5] {
            histogram[hour] = 3;
        }
        assert!((timezone_coverage(&histogram) - 0.25).abs() < EPS);

        histogram = [7; HOURS_PER_DAY];
        histogram[11] = 0;
        assert!(timezone_coverage(&histogram) < 1.0);
    }

    #[test]
    fn test_diversity_monotonic_and_capped() {
        let mut previous = 0.0;
        for k in 1..=20 {
            let d = geo_diversity(&countries(k), DEFAULT_DIVERSITY_SATURATION);
            assert!(d >= previous, "k = {k}");
            assert!(d <= 1.0);
            if k >= 8 {
                assert_eq!(d, 1.0, "k = {k}");
            }
            previous = d;
        }
        assert!((geo_diversity(&countries(2), 8) - 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_diversity_ignores_zero_counts() {
        let mut input = countries(2);
        input.push(CountryCount::new("NOR", 0));
        assert_eq!(geo_diversity(&input, 8), geo_diversity(&countries(2), 8));
    }

    #[test]
    fn test_weighted_global_score() {
        let histogram = [1; HOURS_PER_DAY];
        let input = countries(2);

        let equal = score(&histogram, &input);
        let explicit = score_with(&histogram, &input, &ScoreWeights::default(), 8);
        assert_eq!(equal, explicit);

        let coverage_only = ScoreWeights {
            coverage: 1.0,
            diversity: 0.0,
        };
        let scores = score_with(&histogram, &input, &coverage_only, 8);
        assert_eq!(scores.global_score, 1.0);

        let skewed = ScoreWeights {
            coverage: 1.0,
            diversity: 3.0,
        };
        let scores = score_with(&histogram, &input, &skewed, 8);
        let expected = (1.0 + 3.0 / 3.0) / 4.0;
        assert!((scores.global_score - expected).abs() < EPS);
    }

    #[test]
    fn test_custom_saturation() {
        assert_eq!(geo_diversity(&countries(4), 4), 1.0);
        assert!(geo_diversity(&countries(4), 16) < 1.0);
    }

    #[test]
    fn test_validate_scoring() {
        assert!(validate_scoring(&ScoreWeights::default(), 8).is_ok());
        assert!(validate_scoring(&ScoreWeights::default(), 1).is_err());

        let negative = ScoreWeights {
            coverage: -0.1,
            diversity: 1.0,
        };
        assert!(validate_scoring(&negative, 8).is_err());

        let zero = ScoreWeights {
            coverage: 0.0,
            diversity: 0.0,
        };
        assert!(validate_scoring(&zero, 8).is_err());

        let nan = ScoreWeights {
            coverage: f64::NAN,
            diversity: 1.0,
        };
        assert!(validate_scoring(&nan, 8).is_err());
    }
}
