//! Greedy partitioning of voters by similarity of their Borda score rows.
//!
//! A facility-location-style heuristic: representatives are picked one at a
//! time, each minimizing the total distance voters would sit at if it joined
//! the current representative set; voters are then reassigned to the closest
//! representative. Ties break toward the lexicographically smaller voter
//! identifier at every step, so the partition is fully deterministic.

use log::debug;

use crate::config::{ClusterGroup, ClusteringOutcome};
use crate::ordering::partition_sort;

/// Per-voter assignment: the representative the voter currently belongs to
/// and the Manhattan distance to it. Updated in place as better
/// representatives are discovered.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ClusterAssignment {
    voter: usize,
    representative: usize,
    distance: i64,
}

/// Symmetric voter-by-voter Manhattan distance matrix over Borda score rows.
fn manhattan_distances(borda_matrix: &[Vec<i64>]) -> Vec<Vec<i64>> {
    let voters = borda_matrix.len();
    let mut distances = vec![vec![0i64; voters]; voters];
    for i in 0..voters {
        for j in (i + 1)..voters {
            let distance: i64 = borda_matrix[i]
                .iter()
                .zip(borda_matrix[j].iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            distances[i][j] = distance;
            distances[j][i] = distance;
        }
    }
    distances
}

// Keeps the candidate with the smaller total, or on an exact tie the one
// with the lexicographically smaller identifier.
fn better_candidate(
    best: Option<(usize, i64)>,
    candidate: usize,
    total: i64,
    voters: &[String],
) -> Option<(usize, i64)> {
    match best {
        None => Some((candidate, total)),
        Some((_, best_total)) if total < best_total => Some((candidate, total)),
        Some((best_idx, best_total))
            if total == best_total && voters[candidate] < voters[best_idx] =>
        {
            Some((candidate, best_total))
        }
        other => other,
    }
}

/// Partitions the voters into at most `desired_groups` clusters.
///
/// `borda_matrix` is the voter-by-project score matrix; `voters` the parallel
/// identifier table. Fewer groups come out only when every voter already sits
/// at distance zero from a representative before the target is reached.
pub(crate) fn partition_voters(
    borda_matrix: &[Vec<i64>],
    voters: &[String],
    desired_groups: usize,
) -> ClusteringOutcome {
    let n = voters.len();
    let distances = manhattan_distances(borda_matrix);

    // First representative: smallest total distance to the whole electorate.
    let mut first: Option<(usize, i64)> = None;
    for i in 0..n {
        let total: i64 = distances[i].iter().sum();
        first = better_candidate(first, i, total, voters);
    }
    let (first_repr, _) = first.expect("at least one voter");
    debug!("partition_voters: first representative {}", voters[first_repr]);

    let mut assignments: Vec<ClusterAssignment> = (0..n)
        .map(|voter| ClusterAssignment {
            voter,
            representative: first_repr,
            distance: distances[first_repr][voter],
        })
        .collect();

    let mut remaining = desired_groups.saturating_sub(1);
    while remaining > 0 {
        // Candidates are the voters not yet at distance zero from any
        // representative; the score of a candidate is the total distance if
        // every voter kept the closer of its assignment and the candidate.
        let mut best: Option<(usize, i64)> = None;
        for i in 0..n {
            if assignments[i].distance == 0 {
                continue;
            }
            let total: i64 = (0..n)
                .map(|k| distances[i][k].min(assignments[k].distance))
                .sum();
            best = better_candidate(best, i, total, voters);
        }
        let new_repr = match best {
            Some((index, _)) => index,
            // Every voter already sits on a representative profile.
            None => break,
        };
        debug!("partition_voters: adding representative {}", voters[new_repr]);
        for k in 0..n {
            let distance = distances[new_repr][k];
            if distance < assignments[k].distance {
                assignments[k].representative = new_repr;
                assignments[k].distance = distance;
            } else if distance == assignments[k].distance
                && voters[new_repr] < voters[assignments[k].representative]
            {
                assignments[k].representative = new_repr;
            }
        }
        remaining -= 1;
    }

    // Rule 4 ordering: groups keyed by representative identifier, the
    // representative itself leading its group.
    let before = |a: &ClusterAssignment, b: &ClusterAssignment| {
        if a.representative == b.representative {
            a.distance == 0 || voters[a.voter] < voters[b.voter]
        } else {
            voters[a.representative] < voters[b.representative]
        }
    };
    partition_sort(&mut assignments, &before);

    // Contiguous runs of one representative are the final groups.
    let mut groups: Vec<ClusterGroup> = Vec::new();
    let mut total_distance: i64 = 0;
    let mut idx = 0;
    while idx < assignments.len() {
        let repr = assignments[idx].representative;
        let mut internal_distance: i64 = 0;
        let mut members: Vec<String> = Vec::new();
        while idx < assignments.len() && assignments[idx].representative == repr {
            internal_distance += assignments[idx].distance;
            if assignments[idx].voter != repr {
                members.push(voters[assignments[idx].voter].clone());
            }
            idx += 1;
        }
        total_distance += internal_distance;
        groups.push(ClusterGroup {
            representative: voters[repr].clone(),
            internal_distance,
            members,
        });
    }
    debug!(
        "partition_voters: {} groups, total distance {}",
        groups.len(),
        total_distance
    );
    ClusteringOutcome {
        total_distance,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn distances_are_symmetric_and_zero_on_the_diagonal() {
        let matrix = vec![vec![3, 2, 1], vec![3, 3, 1], vec![1, 2, 3]];
        let distances = manhattan_distances(&matrix);
        for i in 0..3 {
            assert_eq!(distances[i][i], 0);
            for j in 0..3 {
                assert_eq!(distances[i][j], distances[j][i]);
            }
        }
        assert_eq!(distances[0][1], 1);
        assert_eq!(distances[0][2], 4);
    }

    #[test]
    fn identical_pairs_split_into_zero_distance_groups() {
        let matrix = vec![
            vec![3, 2, 1],
            vec![3, 2, 1],
            vec![1, 2, 3],
            vec![1, 2, 3],
        ];
        let voters = names(&["V1", "V2", "V3", "V4"]);
        let outcome = partition_voters(&matrix, &voters, 2);
        assert_eq!(outcome.total_distance, 0);
        assert_eq!(outcome.groups.len(), 2);
        for group in outcome.groups.iter() {
            assert_eq!(group.internal_distance, 0);
            assert_eq!(group.members.len(), 1);
        }
    }

    #[test]
    fn total_distance_never_increases_with_more_groups() {
        let matrix = vec![
            vec![5, 4, 3, 2, 1],
            vec![5, 3, 4, 2, 1],
            vec![1, 2, 3, 4, 5],
            vec![1, 2, 3, 5, 5],
            vec![3, 3, 3, 3, 3],
        ];
        let voters = names(&["A", "B", "C", "D", "E"]);
        let mut previous = i64::MAX;
        for groups in 1..=5 {
            let outcome = partition_voters(&matrix, &voters, groups);
            assert!(
                outcome.total_distance <= previous,
                "total went up at {} groups",
                groups
            );
            previous = outcome.total_distance;
        }
    }

    #[test]
    fn representative_selection_breaks_ties_lexicographically() {
        // Two identical profiles: both are equally central, the smaller
        // identifier must win the seat.
        let matrix = vec![vec![2, 1], vec![2, 1]];
        let voters = names(&["VB", "VA"]);
        let outcome = partition_voters(&matrix, &voters, 1);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].representative, "VA");
        assert_eq!(outcome.groups[0].members, vec!["VB".to_string()]);
    }

    #[test]
    fn requesting_more_groups_than_profiles_stops_early() {
        let matrix = vec![vec![3, 2, 1], vec![3, 2, 1], vec![3, 2, 1]];
        let voters = names(&["V1", "V2", "V3"]);
        let outcome = partition_voters(&matrix, &voters, 3);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.total_distance, 0);
    }

    #[test]
    fn groups_come_out_sorted_by_representative_identifier() {
        let matrix = vec![
            vec![1, 2, 3],
            vec![9, 9, 9],
            vec![1, 2, 4],
            vec![9, 9, 8],
        ];
        let voters = names(&["VD", "VC", "VB", "VA"]);
        let outcome = partition_voters(&matrix, &voters, 2);
        let reprs: Vec<&str> = outcome
            .groups
            .iter()
            .map(|g| g.representative.as_str())
            .collect();
        let mut sorted = reprs.clone();
        sorted.sort();
        assert_eq!(reprs, sorted);
    }
}
