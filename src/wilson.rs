use serde::Serialize;
use thiserror::Error;

// Wilson score ranking for up/down voted items.
//
// Items with few votes are pulled toward zero, so 9 up / 1 down ranks
// below 900 up / 100 down even though the raw ratio is the same.

pub const DEFAULT_CONFIDENCE: f64 = 0.95;

// Pre-computed z-scores for the common confidence levels
const Z_TABLE: [(f64, f64); 5] = [
    (0.80, 1.282),
    (0.85, 1.44),
    (0.90, 1.645),
    (0.95, 1.96),
    (0.99, 2.576),
];

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("confidence must be a finite number strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),
}

/// Two-sided confidence level in the open interval (0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(level: f64) -> Result<Self, ScoreError> {
        if !level.is_finite() || level <= 0.0 || level >= 1.0 {
            return Err(ScoreError::InvalidConfidence(level));
        }
        Ok(Self(level))
    }

    pub fn level(&self) -> f64 {
        self.0
    }

    // Table lookup first, Acklam approximation for anything else
    pub fn z_score(&self) -> f64 {
        for (level, z) in Z_TABLE {
            if (self.0 - level).abs() < f64::EPSILON {
                return z;
            }
        }
        inverse_normal_cdf((1.0 + self.0) / 2.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE)
    }
}

// Anything that carries a positive/negative vote tally
pub trait Voted {
    fn positive_count(&self) -> u64;
    fn negative_count(&self) -> u64;
}

impl Voted for (u64, u64) {
    fn positive_count(&self) -> u64 {
        self.0
    }

    fn negative_count(&self) -> u64 {
        self.1
    }
}

impl<T: Voted + ?Sized> Voted for &T {
    fn positive_count(&self) -> u64 {
        (**self).positive_count()
    }

    fn negative_count(&self) -> u64 {
        (**self).negative_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub lower: f64,
    pub upper: f64,
    // ranking key, always equal to `lower`
    pub score: f64,
}

/// Lower bound of the Wilson score interval. Returns 0 when there are no votes.
pub fn lower_bound(positive: u64, negative: u64, confidence: Confidence) -> f64 {
    let n = positive as f64 + negative as f64;
    if n == 0.0 {
        return 0.0;
    }

    let p_hat = positive as f64 / n;
    let z = confidence.z_score();
    let z2 = z * z;

    let lower = (p_hat + z2 / (2.0 * n) - z * ((p_hat * (1.0 - p_hat) + z2 / (4.0 * n)) / n).sqrt())
        / (1.0 + z2 / n);
    lower.clamp(0.0, 1.0)
}

pub fn interval(positive: u64, negative: u64, confidence: Confidence) -> ScoreResult {
    let n = positive as f64 + negative as f64;
    if n == 0.0 {
        return ScoreResult {
            lower: 0.0,
            upper: 0.0,
            score: 0.0,
        };
    }

    let p_hat = positive as f64 / n;
    let z = confidence.z_score();
    let z2 = z * z;

    let center = p_hat + z2 / (2.0 * n);
    let denom = 1.0 + z2 / n;
    let spread = z * ((p_hat * (1.0 - p_hat) + z2 / (4.0 * n)) / n).sqrt();

    let lower = ((center - spread) / denom).clamp(0.0, 1.0);
    let upper = ((center + spread) / denom).clamp(0.0, 1.0);

    ScoreResult {
        lower,
        upper,
        score: lower,
    }
}

/// Returns the items ordered by lower bound, highest first.
///
/// The sort is stable, so equally scored items keep their input order. The
/// input slice is left untouched.
pub fn sort_descending<T: Voted>(items: &[T], confidence: Confidence) -> Vec<&T> {
    let mut scored = annotate(items, confidence);
    // scores are clamped and never NaN
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().map(|(item, _)| item).collect()
}

// Pairs each item with its lower bound, keeping input order
pub fn annotate<T: Voted>(items: &[T], confidence: Confidence) -> Vec<(&T, f64)> {
    items
        .iter()
        .map(|item| {
            let score = lower_bound(item.positive_count(), item.negative_count(), confidence);
            (item, score)
        })
        .collect()
}

// Acklam's rational approximation of the inverse standard normal CDF.
// Relative error is below 1.15e-9 over the whole open interval (0, 1).
const A: [f64; 6] = [
    -3.969683028665376e+01,
    2.209460984245205e+02,
    -2.759285104469687e+02,
    1.383577518672690e+02,
    -3.066479806614716e+01,
    2.506628277459239e+00,
];
const B: [f64; 5] = [
    -5.447609879822406e+01,
    1.615858368580409e+02,
    -1.556989798598866e+02,
    6.680131188771972e+01,
    -1.328068155288572e+01,
];
const C: [f64; 6] = [
    -7.784894002430293e-03,
    -3.223964580411365e-01,
    -2.400758277161838e+00,
    -2.549732539343734e+00,
    4.374664141464968e+00,
    2.938163982698783e+00,
];
const D: [f64; 4] = [
    7.784695709041462e-03,
    3.224671290700398e-01,
    2.445134137142996e+00,
    3.754408661907416e+00,
];

const P_LOW: f64 = 0.02425;
const P_HIGH: f64 = 1.0 - P_LOW;

fn tail(q: f64) -> f64 {
    (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
        / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
}

pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        tail(q)
    } else if p > P_HIGH {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -tail(q)
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn conf(level: f64) -> Confidence {
        Confidence::new(level).unwrap()
    }

    #[test]
    fn no_votes_scores_zero_at_every_confidence() {
        for level in [0.5, 0.8, 0.95, 0.975, 0.99, 0.999] {
            assert_eq!(lower_bound(0, 0, conf(level)), 0.0);
            let result = interval(0, 0, conf(level));
            assert_eq!(result.lower, 0.0);
            assert_eq!(result.upper, 0.0);
            assert_eq!(result.score, 0.0);
        }
    }

    #[test]
    fn known_values_match_reference_outputs() {
        let c = Confidence::default();
        assert_approx(lower_bound(10, 0, c), 0.7224598312333834);
        assert_approx(lower_bound(80, 20, c), 0.7111690380734976);
        assert_approx(lower_bound(1, 1, c), 0.09452865480086611);
    }

    #[test]
    fn monotonic_in_votes() {
        let c = Confidence::default();
        for negative in 0..20 {
            let mut prev = lower_bound(0, negative, c);
            for positive in 1..50 {
                let next = lower_bound(positive, negative, c);
                assert!(next + 1e-12 >= prev, "up {positive} down {negative}");
                prev = next;
            }
        }
        for positive in 0..20 {
            let mut prev = lower_bound(positive, 0, c);
            for negative in 1..50 {
                let next = lower_bound(positive, negative, c);
                assert!(next <= prev + 1e-12, "up {positive} down {negative}");
                prev = next;
            }
        }
    }

    #[test]
    fn extreme_counts_stay_in_range() {
        let c = Confidence::default();
        let lower = lower_bound(u64::MAX, u64::MAX, c);
        assert!((lower - 0.5).abs() < 1e-6);

        let result = interval(u64::MAX, 1, c);
        assert!(result.lower.is_finite() && result.upper.is_finite());
        assert!((0.0..=1.0).contains(&result.lower));
        assert!((0.0..=1.0).contains(&result.upper));
    }

    #[test]
    fn larger_sample_wins_at_equal_ratio() {
        let c = Confidence::default();
        assert!(lower_bound(9, 1, c) < lower_bound(900, 100, c));
    }

    #[test]
    fn interval_agrees_with_lower_bound() {
        for level in [0.8, 0.9, 0.95, 0.975] {
            for (up, down) in [(0, 1), (1, 0), (3, 7), (50, 50), (999, 1)] {
                let result = interval(up, down, conf(level));
                assert_approx(result.lower, lower_bound(up, down, conf(level)));
                assert_eq!(result.score, result.lower);
                assert!(result.lower <= result.upper);
                assert!((0.0..=1.0).contains(&result.upper));
            }
        }
    }

    #[test]
    fn table_levels_use_exact_constants() {
        assert_eq!(conf(0.80).z_score(), 1.282);
        assert_eq!(conf(0.85).z_score(), 1.44);
        assert_eq!(conf(0.90).z_score(), 1.645);
        assert_eq!(conf(0.95).z_score(), 1.96);
        assert_eq!(conf(0.99).z_score(), 2.576);
    }

    #[test]
    fn off_table_levels_use_approximation() {
        assert!((conf(0.975).z_score() - 2.2414).abs() < 1e-3);
        assert!((conf(0.5).z_score() - 0.6745).abs() < 1e-3);
        assert!((conf(0.999).z_score() - 3.2905).abs() < 1e-3);
    }

    #[test]
    fn inverse_cdf_covers_all_three_branches() {
        assert_approx(inverse_normal_cdf(0.5), 0.0);
        // low tail
        assert!((inverse_normal_cdf(0.01) + 2.3263).abs() < 1e-3);
        // high tail mirrors the low tail
        assert_approx(inverse_normal_cdf(0.99), -inverse_normal_cdf(0.01));
        // central region
        assert!((inverse_normal_cdf(0.975) - 1.96).abs() < 1e-3);
    }

    #[test]
    fn rejects_invalid_confidence() {
        for level in [0.0, 1.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert!(Confidence::new(level).is_err(), "{level}");
        }
    }

    #[test]
    fn sort_is_stable_and_leaves_input_alone() {
        let items: Vec<(u64, u64)> = vec![(1, 1), (5, 0), (1, 1), (0, 3), (5, 0)];
        let before = items.clone();

        let sorted = sort_descending(&items, Confidence::default());

        assert_eq!(items, before);
        assert_eq!(sorted.len(), items.len());
        // equal tallies keep their relative input order
        assert!(std::ptr::eq(sorted[0], &items[1]));
        assert!(std::ptr::eq(sorted[1], &items[4]));
        assert!(std::ptr::eq(sorted[2], &items[0]));
        assert!(std::ptr::eq(sorted[3], &items[2]));
        assert!(std::ptr::eq(sorted[4], &items[3]));
    }

    #[test]
    fn annotate_keeps_order() {
        let items: Vec<(u64, u64)> = vec![(0, 5), (10, 0), (0, 0)];
        let annotated = annotate(&items, Confidence::default());

        assert_eq!(annotated.len(), 3);
        assert_eq!(*annotated[0].0, (0, 5));
        assert_approx(annotated[0].1, 0.0);
        assert_approx(annotated[1].1, 0.7224598312333834);
        assert_eq!(annotated[2].1, 0.0);
    }

    #[test]
    fn big_samples_beat_small_perfect_ones() {
        let items: Vec<(u64, u64)> = vec![(10, 0), (2, 0), (100, 5)];
        let sorted = sort_descending(&items, Confidence::default());
        assert_eq!(*sorted[0], (100, 5));
        assert_eq!(*sorted[1], (10, 0));
        assert_eq!(*sorted[2], (2, 0));
    }
}
