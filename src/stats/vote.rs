//! Majority vote with an explicit, deterministic tie-break.
//!
//! Among equally frequent values the winner is the one whose **first
//! occurrence** comes earliest in the scan order.  Both the label smoother
//! (scanning oldest → newest) and the kNN classifier (scanning nearest →
//! farthest) rely on this rule, so it lives in one place instead of
//! depending on iteration order of a hash map.

/// Return the most frequent item of `items`, or `None` if it is empty.
///
/// Ties go to the value encountered first.
///
/// ```
/// use teachable_machine::stats::most_common;
///
/// assert_eq!(most_common(['A', 'A', 'B', 'B']), Some('A'));
/// assert_eq!(most_common(['B', 'A', 'A', 'B']), Some('B'));
/// assert_eq!(most_common(Vec::<char>::new()), None);
/// ```
pub fn most_common<T, I>(items: I) -> Option<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    // (value, count) in first-occurrence order. Windows are tiny, so a
    // linear scan beats hashing and needs no `Hash` bound.
    let mut tally: Vec<(T, usize)> = Vec::new();
    for item in items {
        match tally.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => tally.push((item, 1)),
        }
    }

    let mut winner: Option<(T, usize)> = None;
    for (value, count) in tally {
        // Strictly greater: an equal count never displaces an earlier value.
        if winner.as_ref().map_or(true, |(_, best)| count > *best) {
            winner = Some((value, count));
        }
    }
    winner.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_majority_wins() {
        assert_eq!(most_common([1, 2, 2, 3]), Some(2));
    }

    #[test]
    fn tie_goes_to_first_occurrence() {
        assert_eq!(most_common(["a", "b", "b", "a"]), Some("a"));
        assert_eq!(most_common(["b", "a", "a", "b"]), Some("b"));
    }

    #[test]
    fn later_value_with_more_votes_still_wins() {
        assert_eq!(most_common([1, 2, 2]), Some(2));
    }

    #[test]
    fn none_participates_like_any_other_value() {
        let labels = [None, Some(1), None, Some(1)];
        assert_eq!(most_common(labels), Some(None));
    }

    #[test]
    fn three_way_tie_picks_first() {
        assert_eq!(most_common([3, 1, 2]), Some(3));
    }

    #[test]
    fn empty_input_returns_none() {
        assert_eq!(most_common(Vec::<u8>::new()), None);
    }
}
