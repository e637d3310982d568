pub use crate::config::*;
use crate::ordering::{ascending, partition_sort};
use crate::run_tabulation;

/// A builder for assembling an election ballot by ballot.
///
/// Project names are sorted on construction; ballots reference projects by
/// name and are validated and index-encoded as they are added.
///
/// ```
/// pub use preference_tally::builder::Builder;
/// # use preference_tally::TallyErrors;
///
/// let mut builder = Builder::new(&[
///     "Park".to_string(),
///     "Library".to_string(),
///     "Pool".to_string(),
/// ])?;
///
/// builder.add_ballot(
///     "CF01",
///     &[
///         vec!["Park".to_string()],
///         vec!["Library".to_string()],
///         vec!["Pool".to_string()],
///     ],
/// )?;
/// builder.add_ballot(
///     "CF02",
///     &[
///         vec!["Park".to_string(), "Library".to_string()],
///         vec!["Pool".to_string()],
///     ],
/// )?;
///
/// let result = builder.tabulate(1)?;
/// assert_eq!(result.condorcet.groups[0].projects, vec!["Park".to_string()]);
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _project_names: Vec<String>,
    pub(crate) _ballots: Vec<Ballot>,
}

impl Builder {
    /// Starts a new election over the given slate. The names are sorted;
    /// ballot order is free.
    pub fn new(project_names: &[String]) -> Result<Builder, TallyErrors> {
        if project_names.is_empty() {
            return Err(TallyErrors::EmptyElection);
        }
        let mut names = project_names.to_vec();
        partition_sort(&mut names, &ascending);
        Ok(Builder {
            _project_names: names,
            _ballots: Vec::new(),
        })
    }

    pub fn project_names(&self) -> &[String] {
        &self._project_names
    }

    /// Adds one ballot. `groups` lists the tie-groups in preference order:
    /// every project in one group shares a rank, each group is strictly
    /// preferred to the next. The groups must cover the slate exactly once.
    pub fn add_ballot(&mut self, voter: &str, groups: &[Vec<String>]) -> Result<(), TallyErrors> {
        let slate_size = self._project_names.len();
        let mut ranking: Vec<usize> = Vec::with_capacity(slate_size);
        let mut markers: Vec<RankMarker> = Vec::with_capacity(slate_size.saturating_sub(1));
        let mut seen = vec![false; slate_size];
        for group in groups {
            for (pos, name) in group.iter().enumerate() {
                let index = self
                    ._project_names
                    .binary_search(name)
                    .map_err(|_| TallyErrors::UnknownProject(name.clone()))?;
                if seen[index] {
                    return Err(TallyErrors::MalformedBallot(voter.to_string()));
                }
                seen[index] = true;
                if !ranking.is_empty() {
                    markers.push(if pos == 0 {
                        RankMarker::Strict
                    } else {
                        RankMarker::Tie
                    });
                }
                ranking.push(index);
            }
        }
        if ranking.len() != slate_size {
            return Err(TallyErrors::MalformedBallot(voter.to_string()));
        }
        self._ballots.push(Ballot {
            voter: voter.to_string(),
            ranking,
            markers,
        });
        Ok(())
    }

    /// Runs the full tabulation over the collected ballots.
    pub fn tabulate(&self, desired_groups: usize) -> Result<TabulationResult, TallyErrors> {
        run_tabulation(&self._project_names, &self._ballots, desired_groups)
    }
}
