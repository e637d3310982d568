//! Tournament graph over project indices and its strongly-connected-component
//! resolution.
//!
//! The Condorcet evaluator encodes every pairwise outcome as a directed edge
//! (both directions on a majority tie) and labels each project with the id of
//! its component. A component of size two or more is a Condorcet cycle; a
//! true Condorcet winner is the single member of the top component.

use log::debug;

/// Directed graph over a fixed node set, with an O(1) duplicate-edge check.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TournamentGraph {
    nodes: usize,
    edges: usize,
    // Forward stars, in insertion order.
    targets: Vec<Vec<usize>>,
    present: Vec<Vec<bool>>,
}

impl TournamentGraph {
    pub fn new(nodes: usize) -> TournamentGraph {
        TournamentGraph {
            nodes,
            edges: 0,
            targets: vec![Vec::new(); nodes],
            present: vec![vec![false; nodes]; nodes],
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Inserts the edge `from -> to` unless it is already present.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        assert!(
            from < self.nodes && to < self.nodes,
            "edge ({}, {}) outside of a graph with {} nodes",
            from,
            to,
            self.nodes
        );
        if !self.present[from][to] {
            self.present[from][to] = true;
            self.targets[from].push(to);
            self.edges += 1;
        }
    }

    pub fn successors(&self, from: usize) -> &[usize] {
        &self.targets[from]
    }

    /// Materializes the graph with every edge reversed.
    pub fn transposed(&self) -> TournamentGraph {
        let mut reversed = TournamentGraph::new(self.nodes);
        for from in 0..self.nodes {
            for &to in self.targets[from].iter() {
                reversed.add_edge(to, from);
            }
        }
        reversed
    }
}

/// Node labeling produced by the resolver. `component[v]` is a positive id;
/// lower ids belong to components whose source node was scanned earlier, so
/// the id is a discovery order, not a ranking.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SccLabels {
    pub component: Vec<u32>,
    pub count: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum NodeState {
    Unlabeled,
    Labeled(u32),
}

/// Kosaraju-style resolution by source-rooted double depth-first search.
///
/// For each unlabeled source, one traversal of the forward edges and one of
/// the transposed graph are intersected: a node belongs to the source's
/// component exactly when both passes reach it.
pub fn strongly_connected_components(graph: &TournamentGraph) -> SccLabels {
    let n = graph.node_count();
    let transpose = graph.transposed();
    let mut states: Vec<NodeState> = vec![NodeState::Unlabeled; n];
    let mut count: u32 = 0;

    for source in 0..n {
        if let NodeState::Labeled(_) = states[source] {
            continue;
        }
        count += 1;
        let forward = depth_first_reach(graph, source);
        let backward = depth_first_reach(&transpose, source);
        for v in 0..n {
            if forward[v] && backward[v] {
                // Mutual reachability with an unlabeled source implies the
                // node was not part of any earlier component.
                debug_assert!(
                    states[v] == NodeState::Unlabeled,
                    "component labels are never rewritten"
                );
                states[v] = NodeState::Labeled(count);
            }
        }
    }
    debug!(
        "strongly_connected_components: {} nodes, {} edges, {} components",
        n,
        graph.edge_count(),
        count
    );

    let component = states
        .iter()
        .map(|state| match state {
            NodeState::Labeled(id) => *id,
            // Every node reaches itself in both passes.
            NodeState::Unlabeled => unreachable!("node left unlabeled"),
        })
        .collect();
    SccLabels { component, count }
}

// Iterative depth-first traversal; the visited vector is the result.
fn depth_first_reach(graph: &TournamentGraph, source: usize) -> Vec<bool> {
    let mut visited = vec![false; graph.node_count()];
    let mut stack = vec![source];
    visited[source] = true;
    while let Some(v) = stack.pop() {
        for &w in graph.successors(v) {
            if !visited[w] {
                visited[w] = true;
                stack.push(w);
            }
        }
    }
    visited
}
