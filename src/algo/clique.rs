/*!
Budgeted Bron–Kerbosch clique search with pivoting.

One recursion serves both operations: finding a single maximum clique
(with an additional branch-and-bound cutoff) and counting all maximal
cliques (which must visit every maximal clique and therefore must not
apply the size bound). Cliques are an undirected notion, so a directed
input contributes adjacency through its arcs in either direction.
*/

use crate::{
    budget::Budget,
    graph::AdjGraph,
    node::{Node, NumNodes},
};

/// A maximum clique, possibly partial if the budget expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxClique {
    /// The largest clique found, sorted by candidate order of discovery.
    pub members: Vec<Node>,
    /// If *true*, `members` is only the best clique found before the budget
    /// expired and may be smaller than the true maximum.
    pub timed_out: bool,
}

/// A maximal-clique count, possibly partial if the budget expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximalCliqueCount {
    pub count: u64,
    /// If *true*, `count` covers only the part of the search space visited
    /// before the budget expired.
    pub timed_out: bool,
}

/// Bron–Kerbosch search state over the undirected closure of a graph.
///
/// `P` and `X` are kept sorted by node id so that candidate sets can be
/// narrowed with linear merges; the degree-based heuristics only order the
/// per-branch candidate list.
pub struct BronKerbosch {
    adj: Vec<Vec<Node>>,
    best: Vec<Node>,
    num_maximal: u64,
    record_best: bool,
    aborted: bool,
}

impl BronKerbosch {
    /// Builds the search state; arcs of a directed graph count as adjacency
    /// in both directions.
    pub fn new(graph: &AdjGraph) -> Self {
        let mut adj: Vec<Vec<Node>> = vec![Vec::new(); graph.len()];
        for u in graph.vertices() {
            for v in graph.neighbors_of(u) {
                adj[u as usize].push(v);
                if graph.is_directed() {
                    adj[v as usize].push(u);
                }
            }
        }
        for row in &mut adj {
            row.sort_unstable();
            row.dedup();
        }

        Self {
            adj,
            best: Vec::new(),
            num_maximal: 0,
            record_best: false,
            aborted: false,
        }
    }

    /// Finds a maximum clique under the given budget. On expiry the best
    /// clique found so far is returned, flagged as timed out.
    pub fn max_clique(mut self, budget: &mut Budget) -> MaxClique {
        self.record_best = true;
        self.run(budget);
        MaxClique {
            members: self.best,
            timed_out: self.aborted,
        }
    }

    /// Counts all maximal cliques under the given budget. On expiry the
    /// count so far is returned, flagged as timed out.
    pub fn count_maximal(mut self, budget: &mut Budget) -> MaximalCliqueCount {
        self.record_best = false;
        self.run(budget);
        MaximalCliqueCount {
            count: self.num_maximal,
            timed_out: self.aborted,
        }
    }

    fn run(&mut self, budget: &mut Budget) {
        let mut r = Vec::new();
        let mut p: Vec<Node> = (0..self.adj.len() as Node).collect();
        let mut x = Vec::new();
        self.recurse(&mut r, &mut p, &mut x, budget);
    }

    fn degree(&self, u: Node) -> NumNodes {
        self.adj[u as usize].len() as NumNodes
    }

    fn recurse(
        &mut self,
        r: &mut Vec<Node>,
        p: &mut Vec<Node>,
        x: &mut Vec<Node>,
        budget: &mut Budget,
    ) {
        if budget.consume() {
            self.aborted = true;
            return;
        }

        // branch & bound: this subtree cannot beat the current best
        if self.record_best && r.len() + p.len() <= self.best.len() {
            return;
        }

        if p.is_empty() && x.is_empty() {
            // R is a maximal clique
            self.num_maximal += 1;
            if self.record_best && r.len() > self.best.len() {
                self.best = r.clone();
            }
            return;
        }

        // pivot: the vertex of P ∪ X with the most neighbors in P; all of
        // its neighbors in P are redundant branch points in this subtree
        let pivot = p
            .iter()
            .chain(x.iter())
            .copied()
            .max_by_key(|&c| count_common(&self.adj[c as usize], p))
            .unwrap();

        let mut candidates: Vec<Node> = diff_sorted(p, &self.adj[pivot as usize]);
        candidates.sort_by_key(|&v| self.degree(v));

        for v in candidates {
            if budget.consume() {
                self.aborted = true;
                return;
            }

            r.push(v);
            let mut p2 = intersect_sorted(p, &self.adj[v as usize]);
            let mut x2 = intersect_sorted(x, &self.adj[v as usize]);
            self.recurse(r, &mut p2, &mut x2, budget);
            r.pop();

            // move v from P to X, keeping both sorted
            let pos = p.binary_search(&v).expect("candidate must be in P");
            p.remove(pos);
            let pos = x.binary_search(&v).unwrap_err();
            x.insert(pos, v);

            if self.aborted {
                return;
            }
        }
    }
}

/// Number of elements common to two sorted slices.
fn count_common(a: &[Node], b: &[Node]) -> usize {
    let mut count = 0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// Elements of sorted `a` that also occur in sorted `b`.
fn intersect_sorted(a: &[Node], b: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Elements of sorted `a` that do not occur in sorted `b`.
fn diff_sorted(a: &[Node], b: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;
    for &v in a {
        while j < b.len() && b[j] < v {
            j += 1;
        }
        if j == b.len() || b[j] != v {
            out.push(v);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn is_clique(bk_adj: &[Vec<Node>], members: &[Node]) -> bool {
        members.iter().enumerate().all(|(i, &u)| {
            members[i + 1..]
                .iter()
                .all(|v| bk_adj[u as usize].binary_search(v).is_ok())
        })
    }

    #[test]
    fn triangle_with_pendant_path() {
        // triangle {0,1,2} plus the path 2-3-4
        let graph = AdjGraph::from_edges(5, false, [(0, 1), (1, 2), (0, 2), (2, 3), (3, 4)]);

        let result = BronKerbosch::new(&graph).max_clique(&mut Budget::unbounded());
        assert!(!result.timed_out);
        let mut members = result.members;
        members.sort_unstable();
        assert_eq!(members, vec![0, 1, 2]);

        // maximal cliques: {0,1,2}, {2,3}, {3,4}
        let count = BronKerbosch::new(&graph).count_maximal(&mut Budget::unbounded());
        assert_eq!(
            count,
            MaximalCliqueCount {
                count: 3,
                timed_out: false
            }
        );
    }

    #[test]
    fn directed_arcs_count_as_adjacency() {
        let graph = AdjGraph::from_edges(5, true, [(0, 1), (2, 1), (0, 2), (3, 2), (3, 4)]);

        let result = BronKerbosch::new(&graph).max_clique(&mut Budget::unbounded());
        let mut members = result.members;
        members.sort_unstable();
        assert_eq!(members, vec![0, 1, 2]);
    }

    #[test]
    fn complete_graph_is_one_clique() {
        let n: NumNodes = 6;
        let mut graph = AdjGraph::new_undirected(n);
        for u in 0..n {
            for v in (u + 1)..n {
                graph.try_add_edge(u, v);
            }
        }

        let bk = BronKerbosch::new(&graph);
        let adj = bk.adj.clone();
        let result = bk.max_clique(&mut Budget::unbounded());
        assert_eq!(result.members.len(), n as usize);
        assert!(is_clique(&adj, &result.members));

        let count = BronKerbosch::new(&graph).count_maximal(&mut Budget::unbounded());
        assert_eq!(count.count, 1);
    }

    #[test]
    fn edgeless_graph_has_singleton_cliques() {
        let graph = AdjGraph::new_undirected(4);

        let result = BronKerbosch::new(&graph).max_clique(&mut Budget::unbounded());
        assert_eq!(result.members.len(), 1);

        let count = BronKerbosch::new(&graph).count_maximal(&mut Budget::unbounded());
        assert_eq!(count.count, 4);
    }

    #[test]
    fn petersen_graph() {
        // triangle-free and 3-regular: every maximal clique is an edge
        let outer = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
        let spokes = [(0, 5), (1, 6), (2, 7), (3, 8), (4, 9)];
        let inner = [(5, 7), (7, 9), (9, 6), (6, 8), (8, 5)];
        let graph = AdjGraph::from_edges(
            10,
            false,
            outer.iter().chain(&spokes).chain(&inner).copied(),
        );

        let result = BronKerbosch::new(&graph).max_clique(&mut Budget::unbounded());
        assert_eq!(result.members.len(), 2);

        let count = BronKerbosch::new(&graph).count_maximal(&mut Budget::unbounded());
        assert_eq!(count.count, 15);
    }

    #[test]
    fn tight_budget_reports_partial_results() {
        let graph = AdjGraph::from_edges(5, false, [(0, 1), (1, 2), (0, 2), (2, 3), (3, 4)]);

        let result = BronKerbosch::new(&graph).max_clique(&mut Budget::new(1, None));
        assert!(result.timed_out);

        let count = BronKerbosch::new(&graph).count_maximal(&mut Budget::new(1, None));
        assert!(count.timed_out);
        assert_eq!(count.count, 0);
    }
}
