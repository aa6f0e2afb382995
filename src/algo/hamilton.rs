/*!
Budgeted backtracking search for a Hamiltonian cycle.

The search proper is exponential, so it is guarded three times over: a hard
cap on the number of vertices it will even attempt, a cheap necessary-
condition precheck that rejects obviously impossible instances, and a
[`Budget`] consulted at every branching step. Two standard pruning
heuristics shape the tree: start at the globally minimum-degree vertex and
try constrained (low-degree) candidates first. Neither affects correctness,
only which cycle is found first and how much work dead branches waste.
*/

use crate::{
    budget::Budget,
    graph::AdjGraph,
    node::{Node, NodeBitSet, NumNodes},
};

/// Default cap on the vertex count the search will attempt.
pub const DEFAULT_VERTEX_LIMIT: NumNodes = 18;

/// Result of a Hamiltonian-cycle search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HamOutcome {
    /// A Hamiltonian cycle, as the vertex sequence of length `n` starting at
    /// the search root; the closing edge back to the root is implicit.
    Cycle(Vec<Node>),
    /// Exhaustive search completed without finding a cycle.
    No,
    /// A necessary condition failed; the search was never entered.
    NoPrecheck,
    /// The instance exceeds the vertex cap and was not attempted.
    SkippedLimit { n: NumNodes, limit: NumNodes },
    /// The empty graph is trivially cyclic.
    TrivialEmpty,
    /// The budget expired before the search space was exhausted.
    Timeout,
}

/// Configurable Hamiltonian-cycle search over a borrowed graph.
pub struct HamiltonianSearch<'a> {
    graph: &'a AdjGraph,
    limit: NumNodes,
}

impl<'a> HamiltonianSearch<'a> {
    pub fn new(graph: &'a AdjGraph) -> Self {
        Self {
            graph,
            limit: DEFAULT_VERTEX_LIMIT,
        }
    }

    /// Sets the cap on the vertex count the search will attempt (min 1).
    pub fn set_limit(&mut self, limit: NumNodes) {
        self.limit = limit.max(1);
    }

    /// Sets the cap on the vertex count the search will attempt (min 1).
    pub fn limit(mut self, limit: NumNodes) -> Self {
        self.set_limit(limit);
        self
    }

    /// Runs the bounded search.
    pub fn run(&self, budget: &mut Budget) -> HamOutcome {
        let n = self.graph.number_of_nodes();
        if n > self.limit {
            return HamOutcome::SkippedLimit {
                n,
                limit: self.limit,
            };
        }
        if n == 0 {
            return HamOutcome::TrivialEmpty;
        }
        if self.quick_impossible() {
            return HamOutcome::NoPrecheck;
        }

        // fewest choices first: start at the minimum-degree vertex
        let start = self
            .graph
            .vertices()
            .min_by_key(|&u| self.graph.degree_of(u))
            .unwrap();

        let mut path = Vec::with_capacity(self.graph.len());
        path.push(start);
        let mut used = NodeBitSet::new(n);
        used.set_bit(start);

        if self.backtrack(start, &mut path, &mut used, budget) {
            HamOutcome::Cycle(path)
        } else if budget.is_expired() {
            HamOutcome::Timeout
        } else {
            HamOutcome::No
        }
    }

    /// Cheap necessary conditions. Undirected: connected over *all* vertices
    /// and minimum degree 2. Directed: minimum in- and out-degree 1 and
    /// whole-graph strong connectivity.
    fn quick_impossible(&self) -> bool {
        let graph = self.graph;

        if !graph.is_directed() {
            if graph.number_of_edges() == 0 {
                return true;
            }
            if graph.bfs(0).count() < graph.len() {
                return true;
            }
            graph.vertices().any(|u| graph.degree_of(u) < 2)
        } else {
            let in_ = graph.in_degrees();
            if graph
                .vertices()
                .any(|u| graph.degree_of(u) == 0 || in_[u as usize] == 0)
            {
                return true;
            }
            graph.bfs(0).count() < graph.len() || graph.reversed().bfs(0).count() < graph.len()
        }
    }

    fn backtrack(
        &self,
        start: Node,
        path: &mut Vec<Node>,
        used: &mut NodeBitSet,
        budget: &mut Budget,
    ) -> bool {
        if budget.consume() {
            return false;
        }
        let u = *path.last().unwrap();
        if path.len() == self.graph.len() {
            // close the cycle
            return self.graph.has_edge(u, start);
        }

        let mut candidates = self.graph.as_neighbors_slice(u).to_vec();
        candidates.sort_by_key(|&v| self.graph.degree_of(v));

        for v in candidates {
            if used.get_bit(v) {
                continue;
            }
            used.set_bit(v);
            path.push(v);
            if self.backtrack(start, path, used, budget) {
                return true;
            }
            path.pop();
            used.clear_bit(v);
            if budget.is_expired() {
                return false;
            }
        }
        false
    }
}
