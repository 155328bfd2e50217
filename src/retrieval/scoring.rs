// Scoring helpers shared by the re-ranking strategies
use std::cmp::Ordering;

/// Lowercase and split on whitespace
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Count non-overlapping occurrences of `needle` inside `haystack`
/// This is plain substring counting: "cat" is found inside "category"
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Scale scores into [0, 1] by dividing by the maximum
/// Leaves the scores untouched when the maximum is not positive
pub fn normalize_by_max(scores: &mut [f32]) {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > 0.0 {
        for score in scores.iter_mut() {
            *score /= max;
        }
    }
}

/// Min-max normalize into [0, 1]
/// When every value is equal, every normalized value is 1.0
pub fn min_max_normalize(values: &[f64]) -> Vec<f32> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max > min {
        values
            .iter()
            .map(|v| ((v - min) / (max - min)) as f32)
            .collect()
    } else {
        vec![1.0; values.len()]
    }
}

/// Weighted blend of two score lists: `weight * signal + (1 - weight) * base`
pub fn blend(base: &[f32], signal: &[f32], weight: f32) -> Vec<f32> {
    base.iter()
        .zip(signal)
        .map(|(b, s)| (1.0 - weight) * b + weight * s)
        .collect()
}

/// Indices ordered by score descending
/// Stable: tied scores keep their original relative order
pub fn descending_order(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    order
}

/// Check that a parameter lies in the closed unit interval
pub(crate) fn check_unit_interval(parameter: &str, value: f32) -> crate::error::Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(crate::error::SemrankError::invalid_input(
            parameter,
            format!("must be between 0.0 and 1.0, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(tokenize("  The Quick\tFOX\n"), vec!["the", "quick", "fox"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_count_occurrences_is_substring_based() {
        assert_eq!(count_occurrences("cat category concat", "cat"), 3);
        assert_eq!(count_occurrences("aaaa", "aa"), 2); // Non-overlapping
        assert_eq!(count_occurrences("anything", ""), 0);
    }

    #[test]
    fn test_normalize_by_max() {
        let mut scores = vec![1.0, 2.0, 4.0];
        normalize_by_max(&mut scores);
        assert_eq!(scores, vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_by_max_all_zero() {
        let mut scores = vec![0.0, 0.0];
        normalize_by_max(&mut scores);
        assert_eq!(scores, vec![0.0, 0.0]);
        assert!(scores.iter().all(|s| !s.is_nan()));
    }

    #[test]
    fn test_min_max_equal_values_map_to_one() {
        assert_eq!(min_max_normalize(&[5.0, 5.0, 5.0]), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_min_max_range() {
        assert_eq!(min_max_normalize(&[10.0, 20.0, 15.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_descending_order_is_stable() {
        let order = descending_order(&[0.5, 0.9, 0.5, 0.9]);
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_unit_interval_check() {
        assert!(check_unit_interval("factor", 0.0).is_ok());
        assert!(check_unit_interval("factor", 1.0).is_ok());
        assert!(check_unit_interval("factor", 1.5).is_err());
        assert!(check_unit_interval("factor", f32::NAN).is_err());
    }
}
