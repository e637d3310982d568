// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The relation between two consecutively ranked projects on a ballot.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RankMarker {
    /// The earlier project is strictly preferred to the later one.
    Strict,
    /// Both projects share the same rank.
    Tie,
}

/// One voter's ranking over the full project slate.
///
/// Invariant: `ranking` holds every project index exactly once, and `markers`
/// holds exactly one marker between each consecutive pair of ranks. Ballots
/// are validated at ingestion time; the tabulation engine asserts these
/// shapes instead of re-checking them.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    /// Voter identifier, used for lexicographic tie-breaks in clustering.
    pub voter: String,
    /// Project indices into the sorted name table, best rank first.
    pub ranking: Vec<usize>,
    /// `markers[i]` relates `ranking[i]` to `ranking[i + 1]`.
    pub markers: Vec<RankMarker>,
}

// ******** Output data structures *********

/// The supported aggregation methods.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Method {
    Plurality,
    Borda,
    Condorcet,
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Plurality => write!(f, "Plurality system"),
            Method::Borda => write!(f, "Borda count"),
            Method::Condorcet => write!(f, "Condorcet method"),
        }
    }
}

/// Projects sharing one rank in a method outcome.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedGroup {
    /// The score shared by the group, for the methods that display one.
    /// Condorcet groups carry no score: the component id is not a ranking.
    pub score: Option<i64>,
    pub projects: Vec<String>,
}

/// The full ranked outcome of one method, best tie-group first.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MethodOutcome {
    pub method: Method,
    pub groups: Vec<RankedGroup>,
}

/// One cluster of voters around its representative.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ClusterGroup {
    pub representative: String,
    /// Sum of the member distances to the representative.
    pub internal_distance: i64,
    /// Member voter identifiers, the representative excluded.
    pub members: Vec<String>,
}

/// The voter partition produced by the clustering engine, groups ordered by
/// representative identifier.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ClusteringOutcome {
    pub total_distance: i64,
    pub groups: Vec<ClusterGroup>,
}

/// Everything one tabulation run produces.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TabulationResult {
    pub plurality: MethodOutcome,
    pub borda: MethodOutcome,
    pub condorcet: MethodOutcome,
    pub clustering: ClusteringOutcome,
}

/// Errors that prevent a tabulation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    /// No projects or no ballots were provided.
    EmptyElection,
    /// The requested group count is zero or exceeds the voter count.
    InvalidGroupCount,
    /// A ballot names a project that is not part of the slate.
    UnknownProject(String),
    /// A ballot does not rank the full slate exactly once.
    MalformedBallot(String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyElection => write!(f, "no projects or ballots to tabulate"),
            TallyErrors::InvalidGroupCount => {
                write!(
                    f,
                    "the requested group count is not between 1 and the voter count"
                )
            }
            TallyErrors::UnknownProject(name) => {
                write!(f, "project {:?} is not part of the slate", name)
            }
            TallyErrors::MalformedBallot(voter) => {
                write!(f, "ballot of voter {:?} does not rank the full slate", voter)
            }
        }
    }
}
