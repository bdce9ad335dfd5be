//! Top-N collapsing of count distributions.

use crate::models::{CountryCount, OTHER_BUCKET};

/// Keep the first `n` entries of a descending distribution and merge the rest
/// into a single `"Other"` entry.
///
/// The remainder entry is appended only when its count is positive, so the
/// output count-sum always equals the input count-sum.
pub fn collapse(distribution: &[CountryCount], n: usize) -> Vec<CountryCount> {
    let head = n.min(distribution.len());
    let mut collapsed: Vec<CountryCount> = distribution[..head].to_vec();

    let rest: u64 = distribution[head..].iter().map(|c| c.count).sum();
    if rest > 0 {
        collapsed.push(CountryCount::new(OTHER_BUCKET, rest));
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution() -> Vec<CountryCount> {
        vec![
            CountryCount::new("USA", 40),
            CountryCount::new("CHN", 25),
            CountryCount::new("DEU", 10),
            CountryCount::new("IND", 4),
            CountryCount::new("BRA", 1),
        ]
    }

    fn total(entries: &[CountryCount]) -> u64 {
        entries.iter().map(|c| c.count).sum()
    }

    #[test]
    fn test_collapse_tail_into_other() {
        let collapsed = collapse(&distribution(), 2);

        assert_eq!(
            collapsed,
            vec![
                CountryCount::new("USA", 40),
                CountryCount::new("CHN", 25),
                CountryCount::new("Other", 15),
            ]
        );
    }

    #[test]
    fn test_collapse_preserves_total_for_any_n() {
        let input = distribution();
        for n in 0..8 {
            assert_eq!(total(&collapse(&input, n)), total(&input), "n = {n}");
        }
    }

    #[test]
    fn test_no_other_when_input_fits() {
        assert_eq!(collapse(&distribution(), 5), distribution());
        assert_eq!(collapse(&distribution(), 50), distribution());
        assert!(collapse(&[], 3).is_empty());
    }

    #[test]
    fn test_zero_count_tail_is_dropped() {
        let input = vec![CountryCount::new("USA", 3), CountryCount::new("CAN", 0)];
        assert_eq!(collapse(&input, 1), vec![CountryCount::new("USA", 3)]);
    }

    #[test]
    fn test_collapse_zero_keeps_only_other() {
        assert_eq!(
            collapse(&distribution(), 0),
            vec![CountryCount::new("Other", 80)]
        );
    }
}
