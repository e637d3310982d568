//! In-place partition sort with pluggable ordering rules.
//!
//! Every ranked output of the crate goes through [`partition_sort`] so that
//! ties resolve identically on every run. The algorithm is a single-pivot
//! quicksort with a first-element pivot; the exact final order of equal
//! elements depends on the partition scheme, so it is kept as-is and the
//! recursion is bounded by an explicit stack of ranges.

/// The universal ranking unit: a project or voter index paired with the
/// metric the current method ranks it by. For Condorcet the score field
/// holds the strongly-connected-component id after resolution.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ScoreCounter {
    pub index: usize,
    pub score: i64,
}

/// Sorts `items` so that an element `a` precedes `b` whenever
/// `before(a, b)` holds. `before` must be deterministic; it does not need
/// to be a total order for the sort to terminate.
pub fn partition_sort<T, F>(items: &mut [T], before: &F)
where
    F: Fn(&T, &T) -> bool,
{
    let mut pending: Vec<(usize, usize)> = Vec::new();
    if items.len() > 1 {
        pending.push((0, items.len() - 1));
    }
    while let Some((low, high)) = pending.pop() {
        let pivot = partition(items, low, high, before);
        if low + 1 < pivot {
            pending.push((low, pivot - 1));
        }
        if pivot + 1 < high {
            pending.push((pivot + 1, high));
        }
    }
}

// First-element pivot: elements for which `before(item, pivot)` holds are
// moved in front of it. The pivot stays at `low` for the whole scan, so all
// comparisons are against the original pivot value.
fn partition<T, F>(items: &mut [T], low: usize, high: usize, before: &F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    let mut pivot_idx = low;
    for i in (low + 1)..=high {
        if before(&items[i], &items[low]) {
            pivot_idx += 1;
            items.swap(i, pivot_idx);
        }
    }
    items.swap(low, pivot_idx);
    pivot_idx
}

/// Rule 1: plain ascending order, used for the alphabetical project table.
pub fn ascending<T: Ord>(a: &T, b: &T) -> bool {
    a < b
}

/// Rule 2: score descending, index ascending within equal scores. Used by
/// the Plurality and Borda evaluators.
pub fn by_score_then_index(a: &ScoreCounter, b: &ScoreCounter) -> bool {
    a.score > b.score || (a.score == b.score && a.index < b.index)
}

/// Rule 3: counters whose score holds a component id. Within one component
/// the project index decides; across components the project whose pairwise
/// score dominates the other sorts first.
///
/// The cross-component comparison reads the raw pairwise matrix instead of
/// the component condensation. A majority tie puts both projects in the same
/// component, so duels between distinct components are strict; the rule is
/// only guaranteed transitive for well-formed tournament data.
pub fn by_component_then_duel(pairwise: &[Vec<i64>]) -> impl Fn(&ScoreCounter, &ScoreCounter) -> bool + '_ {
    move |a, b| {
        if a.score == b.score {
            a.index < b.index
        } else {
            pairwise[a.index][b.index] > pairwise[b.index][a.index]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(pairs: &[(usize, i64)]) -> Vec<ScoreCounter> {
        pairs
            .iter()
            .map(|&(index, score)| ScoreCounter { index, score })
            .collect()
    }

    #[test]
    fn sorts_alphabetically() {
        let mut names = vec![
            "Pool".to_string(),
            "Park".to_string(),
            "Library".to_string(),
        ];
        partition_sort(&mut names, &ascending);
        assert_eq!(names, vec!["Library", "Park", "Pool"]);
    }

    #[test]
    fn score_descending_index_ascending() {
        let mut items = counters(&[(0, 5), (1, 9), (2, 5), (3, 9), (4, 1)]);
        partition_sort(&mut items, &by_score_then_index);
        assert_eq!(items, counters(&[(1, 9), (3, 9), (0, 5), (2, 5), (4, 1)]));
    }

    #[test]
    fn equal_scores_resolve_to_index_order_on_every_run() {
        let base = counters(&[(3, 7), (0, 7), (2, 7), (1, 7)]);
        let mut first = base.clone();
        partition_sort(&mut first, &by_score_then_index);
        assert_eq!(first, counters(&[(0, 7), (1, 7), (2, 7), (3, 7)]));
        let mut second = base;
        partition_sort(&mut second, &by_score_then_index);
        assert_eq!(first, second);
    }

    #[test]
    fn component_rule_prefers_duel_winner_across_components() {
        // Two components: {0} beats {1} 3 to 1, component ids 1 and 2.
        let pairwise = vec![vec![0, 3], vec![1, 0]];
        let mut items = counters(&[(1, 2), (0, 1)]);
        let before = by_component_then_duel(&pairwise);
        partition_sort(&mut items, &before);
        assert_eq!(items, counters(&[(0, 1), (1, 2)]));
    }

    #[test]
    fn component_rule_uses_index_within_a_component() {
        let pairwise = vec![vec![0, 2, 0], vec![2, 0, 0], vec![0, 0, 0]];
        let mut items = counters(&[(2, 1), (1, 1), (0, 1)]);
        let before = by_component_then_duel(&pairwise);
        partition_sort(&mut items, &before);
        assert_eq!(items, counters(&[(0, 1), (1, 1), (2, 1)]));
    }

    #[test]
    fn single_element_and_empty_slices_are_untouched() {
        let mut empty: Vec<ScoreCounter> = Vec::new();
        partition_sort(&mut empty, &by_score_then_index);
        assert!(empty.is_empty());
        let mut single = counters(&[(0, 3)]);
        partition_sort(&mut single, &by_score_then_index);
        assert_eq!(single, counters(&[(0, 3)]));
    }
}
