use log::{debug, info, warn};

use preference_tally::ordering::{ascending, partition_sort};
use preference_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde::Serialize;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error opening file {path}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid header line {line:?}"))]
    InvalidHeader { line: String },
    #[snafu(display("Malformed ballot line {line:?}"))]
    MalformedLine { line: String },
    #[snafu(display("Unknown project {name:?} on line {line:?}"))]
    UnknownProject { name: String, line: String },
    #[snafu(display("Unknown relation {op:?} on line {line:?}"))]
    UnknownRelation { op: String, line: String },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    RenderingJson { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type AppResult<T> = Result<T, AppError>;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InputData {
    pub desired_groups: usize,
    pub project_names: Vec<String>,
    pub ballots: Vec<Ballot>,
}

/// Parses the election file: a header line `V P G` followed by `V` ballot
/// lines of the form `CF01 Park > Library = Pool`.
///
/// The project slate is recovered from the first ballot line and sorted
/// alphabetically; every ballot is encoded against the sorted table.
pub fn parse_input(contents: &str) -> AppResult<InputData> {
    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().unwrap_or("");
    let counts: Vec<usize> = header
        .split_whitespace()
        .map(|t| t.parse::<usize>())
        .collect::<Result<_, _>>()
        .ok()
        .context(InvalidHeaderSnafu { line: header })?;
    let (num_voters, num_projects, desired_groups) = match counts.as_slice() {
        &[v, p, g] => (v, p, g),
        _ => {
            return InvalidHeaderSnafu { line: header }.fail();
        }
    };
    debug!(
        "parse_input: {} voters, {} projects, {} groups",
        num_voters, num_projects, desired_groups
    );

    let ballot_lines: Vec<&str> = lines.collect();
    if ballot_lines.len() != num_voters {
        whatever!(
            "Expected {} ballot lines, found {}",
            num_voters,
            ballot_lines.len()
        );
    }

    // The slate is whatever the first voter ranked; order on the line is a
    // preference, the table is alphabetical.
    let first_tokens: Vec<&str> = ballot_lines
        .first()
        .copied()
        .unwrap_or("")
        .split_whitespace()
        .collect();
    ensure!(
        first_tokens.len() == 2 * num_projects,
        MalformedLineSnafu {
            line: ballot_lines.first().copied().unwrap_or("")
        }
    );
    let mut project_names: Vec<String> = (0..num_projects)
        .map(|i| first_tokens[1 + 2 * i].to_string())
        .collect();
    partition_sort(&mut project_names, &ascending);

    let mut ballots: Vec<Ballot> = Vec::with_capacity(num_voters);
    for line in ballot_lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        ensure!(tokens.len() == 2 * num_projects, MalformedLineSnafu { line });
        let voter = tokens[0].to_string();
        let mut ranking: Vec<usize> = Vec::with_capacity(num_projects);
        let mut markers: Vec<RankMarker> = Vec::with_capacity(num_projects.saturating_sub(1));
        let mut seen = vec![false; num_projects];
        for i in 0..num_projects {
            let name = tokens[1 + 2 * i];
            let index = project_names
                .binary_search_by(|p| p.as_str().cmp(name))
                .ok()
                .context(UnknownProjectSnafu { name, line })?;
            ensure!(!seen[index], MalformedLineSnafu { line });
            seen[index] = true;
            ranking.push(index);
            if i + 1 < num_projects {
                let op = tokens[2 + 2 * i];
                markers.push(match op {
                    ">" => RankMarker::Strict,
                    "=" => RankMarker::Tie,
                    _ => {
                        return UnknownRelationSnafu { op, line }.fail();
                    }
                });
            }
        }
        ballots.push(Ballot {
            voter,
            ranking,
            markers,
        });
    }

    Ok(InputData {
        desired_groups,
        project_names,
        ballots,
    })
}

// **** Text rendering ****

fn render_method(outcome: &MethodOutcome) -> String {
    let mut text = format!("Results: {}\n", outcome.method);
    for group in outcome.groups.iter() {
        let names = group.projects.join(" ");
        match group.score {
            Some(score) => text.push_str(format!("{} {}\n", score, names).as_str()),
            None => text.push_str(format!("{}\n", names).as_str()),
        }
    }
    text
}

fn render_clustering(clustering: &ClusteringOutcome) -> String {
    let mut text = format!("Groups ({})\n", clustering.total_distance);
    for group in clustering.groups.iter() {
        text.push_str(format!("{} ({})", group.representative, group.internal_distance).as_str());
        for member in group.members.iter() {
            text.push_str(format!(" {}", member).as_str());
        }
        text.push('\n');
    }
    text
}

fn render_text(result: &TabulationResult) -> String {
    let mut text = String::new();
    for outcome in [&result.plurality, &result.borda, &result.condorcet] {
        text.push_str(render_method(outcome).as_str());
        text.push('\n');
    }
    text.push_str(render_clustering(&result.clustering).as_str());
    text
}

// **** JSON summary ****

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
struct SummarySettings {
    #[serde(rename = "voterCount")]
    voter_count: usize,
    #[serde(rename = "projectCount")]
    project_count: usize,
    #[serde(rename = "groupCount")]
    group_count: usize,
}

fn method_to_json(outcome: &MethodOutcome) -> JSValue {
    let ranking: Vec<JSValue> = outcome
        .groups
        .iter()
        .map(|group| {
            json!({
                "score": group.score,
                "projects": group.projects
            })
        })
        .collect();
    json!({
        "method": outcome.method.to_string(),
        "ranking": ranking
    })
}

fn clustering_to_json(clustering: &ClusteringOutcome) -> JSValue {
    let groups: Vec<JSValue> = clustering
        .groups
        .iter()
        .map(|group| {
            json!({
                "representative": group.representative,
                "internalDistance": group.internal_distance,
                "members": group.members
            })
        })
        .collect();
    json!({
        "totalDistance": clustering.total_distance,
        "groups": groups
    })
}

fn build_summary_js(input: &InputData, result: &TabulationResult) -> JSValue {
    let settings = SummarySettings {
        voter_count: input.ballots.len(),
        project_count: input.project_names.len(),
        group_count: input.desired_groups,
    };
    json!({
        "config": settings,
        "results": [
            method_to_json(&result.plurality),
            method_to_json(&result.borda),
            method_to_json(&result.condorcet)
        ],
        "groups": clustering_to_json(&result.clustering)
    })
}

// **** Entry point ****

pub fn run_app(args: &Args) -> AppResult<()> {
    let contents = fs::read_to_string(args.input.as_str()).context(OpeningInputSnafu {
        path: args.input.clone(),
    })?;
    let input = parse_input(contents.as_str())?;
    info!(
        "run_app: {} ballots over {:?}",
        input.ballots.len(),
        input.project_names
    );

    let result = match run_tabulation(
        &input.project_names,
        &input.ballots,
        input.desired_groups,
    ) {
        Result::Ok(x) => x,
        Result::Err(x) => {
            whatever!("Tabulation error: {}", x)
        }
    };

    let text = render_text(&result);
    print!("{}", text);

    if let Some(out_path) = &args.out {
        let summary_js = build_summary_js(&input, &result);
        let pretty_js = serde_json::to_string_pretty(&summary_js).context(RenderingJsonSnafu {})?;
        if out_path == "stdout" {
            println!("{}", pretty_js);
        } else {
            fs::write(out_path, pretty_js).context(WritingSummarySnafu {
                path: out_path.clone(),
            })?;
        }
    }

    // The reference output, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let reference = fs::read_to_string(reference_path).context(OpeningInputSnafu {
            path: reference_path.clone(),
        })?;
        if reference.trim_end() != text.trim_end() {
            warn!("Found differences with the reference output");
            print_diff(reference.trim_end(), text.trim_end(), "\n");
            whatever!("Difference detected between calculated output and reference output")
        }
    }

    Ok(())
}
