/*!
Connected components (undirected) and strongly connected components
(directed, Kosaraju's algorithm). Both are exposed as iterators that emit one
component at a time.
*/

use itertools::Itertools;

use super::traversal::Bfs;
use crate::{
    graph::AdjGraph,
    node::{Node, NodeBitSet, NumNodes},
};

/// Iterator over the connected components of an undirected graph, emitting
/// the nodes of one component at a time.
pub struct ConnectedComponents<'a> {
    bfs: Bfs<'a>,
}

impl<'a> ConnectedComponents<'a> {
    /// Construct the iterator for some undirected graph.
    /// ** Panics if the graph is directed or has no nodes **
    pub fn new(graph: &'a AdjGraph) -> Self {
        assert!(
            !graph.is_directed(),
            "Connected components are defined on undirected graphs!"
        );
        assert!(
            !graph.is_empty(),
            "Can't iterate connected components in a graph with no nodes!"
        );
        Self { bfs: graph.bfs(0) }
    }
}

impl Iterator for ConnectedComponents<'_> {
    type Item = Vec<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cc = self.bfs.by_ref().collect_vec();
            if !cc.is_empty() {
                return Some(cc);
            }

            if !self.bfs.try_restart_at_unvisited() {
                return None;
            }
        }
    }
}

/// Implementation of Kosaraju's algorithm for strongly connected components,
/// designed as an iterator that emits the nodes of one SCC at a time.
///
/// The first DFS pass (run eagerly on construction) records the finishing
/// order of all nodes; each DFS tree grown on the reverse graph in reverse
/// finishing order is exactly one strongly connected component. Both passes
/// use explicit stacks, so very deep graphs (e.g. long cycles) cannot
/// overflow the call stack.
pub struct StronglyConnectedComponents<'a> {
    graph: &'a AdjGraph,
    reversed: AdjGraph,
    finish_order: Vec<Node>,
    visited: NodeBitSet,
}

impl<'a> StronglyConnectedComponents<'a> {
    /// Construct the iterator for some directed graph.
    /// ** Panics if the graph is undirected **
    pub fn new(graph: &'a AdjGraph) -> Self {
        assert!(
            graph.is_directed(),
            "Strongly connected components require a directed graph!"
        );
        Self {
            graph,
            reversed: graph.reversed(),
            finish_order: finishing_order(graph),
            visited: NodeBitSet::new(graph.number_of_nodes()),
        }
    }
}

impl Iterator for StronglyConnectedComponents<'_> {
    type Item = Vec<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        // roots are the unvisited nodes in reverse finishing order
        while let Some(root) = self.finish_order.pop() {
            if self.visited.set_bit(root) {
                continue;
            }

            let mut component = Vec::new();
            let mut stack = vec![root];
            while let Some(u) = stack.pop() {
                component.push(u);
                for v in self.reversed.neighbors_of(u) {
                    if !self.visited.set_bit(v) {
                        stack.push(v);
                    }
                }
            }
            return Some(component);
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.finish_order.len()))
    }
}

/// DFS finishing order over all nodes of `graph`, using an explicit stack of
/// `(node, neighbor cursor)` frames.
fn finishing_order(graph: &AdjGraph) -> Vec<Node> {
    let n = graph.number_of_nodes();
    let mut visited = NodeBitSet::new(n);
    let mut order = Vec::with_capacity(graph.len());
    let mut stack: Vec<(Node, usize)> = Vec::new();

    for s in graph.vertices() {
        if visited.set_bit(s) {
            continue;
        }
        stack.push((s, 0));

        while let Some(&(u, cursor)) = stack.last() {
            match graph.as_neighbors_slice(u).get(cursor) {
                Some(&v) => {
                    stack.last_mut().unwrap().1 += 1;
                    if !visited.set_bit(v) {
                        stack.push((v, 0));
                    }
                }
                None => {
                    order.push(u);
                    stack.pop();
                }
            }
        }
    }

    order
}

/// Counts the components of a graph: strongly connected components when the
/// graph is directed, connected components otherwise.
pub fn count_components(graph: &AdjGraph) -> NumNodes {
    if graph.is_empty() {
        0
    } else if graph.is_directed() {
        StronglyConnectedComponents::new(graph).count() as NumNodes
    } else {
        ConnectedComponents::new(graph).count() as NumNodes
    }
}

/// Sorts the nodes in each component increasingly and then the components
/// themselves lexicographically.
pub fn sort_components(mut components: Vec<Vec<Node>>) -> Vec<Vec<Node>> {
    components.iter_mut().for_each(|comp| comp.sort_unstable());
    components.sort_by(|a, b| a[0].cmp(&b[0]));
    components
}
