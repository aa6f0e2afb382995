/*!
Generic traversal iterators over [`AdjGraph`].

The frontier container decides the traversal order: a queue yields BFS, a
stack yields DFS. Both variants share one lazy iterator that tracks visited
nodes in a bitset and supports restarting at unvisited nodes, which is the
building block for component enumeration and reachability checks.
*/

use std::collections::VecDeque;

use crate::{
    graph::AdjGraph,
    node::{Node, NodeBitSet},
};

/// Abstraction for the traversal frontier data structure.
///
/// - [`VecDeque`] -> queue semantics -> **BFS**
/// - [`Vec`] -> stack semantics -> **DFS**
pub trait NodeSequencer {
    /// Creates a new frontier initialized with a single node.
    fn init(u: Node) -> Self;

    /// Pushes a node into the frontier.
    fn push(&mut self, u: Node);

    /// Removes and returns the next node from the frontier.
    fn pop(&mut self) -> Option<Node>;

    /// Returns the number of items currently in the frontier.
    fn cardinality(&self) -> usize;
}

impl NodeSequencer for VecDeque<Node> {
    fn init(u: Node) -> Self {
        Self::from(vec![u])
    }
    fn push(&mut self, u: Node) {
        self.push_back(u)
    }
    fn pop(&mut self) -> Option<Node> {
        self.pop_front()
    }
    fn cardinality(&self) -> usize {
        self.len()
    }
}

impl NodeSequencer for Vec<Node> {
    fn init(u: Node) -> Self {
        vec![u]
    }
    fn push(&mut self, u: Node) {
        self.push(u)
    }
    fn pop(&mut self) -> Option<Node> {
        self.pop()
    }
    fn cardinality(&self) -> usize {
        self.len()
    }
}

/// Lazy traversal iterator with an explicit frontier and visited bitset.
pub struct TraversalSearch<'a, S: NodeSequencer> {
    graph: &'a AdjGraph,
    visited: NodeBitSet,
    sequencer: S,
}

/// A BFS traversal iterator, visiting nodes in breadth-first order from a
/// given starting node.
pub type Bfs<'a> = TraversalSearch<'a, VecDeque<Node>>;

/// A DFS traversal iterator, visiting nodes in depth-first order from a
/// given starting node.
pub type Dfs<'a> = TraversalSearch<'a, Vec<Node>>;

impl<'a, S: NodeSequencer> TraversalSearch<'a, S> {
    /// Creates a new traversal iterator starting from `start`.
    /// ** Panics if `start >= n` **
    pub fn new(graph: &'a AdjGraph, start: Node) -> Self {
        assert!(graph.valid_node(start));
        let mut visited = NodeBitSet::new(graph.number_of_nodes());
        visited.set_bit(start);
        Self {
            graph,
            visited,
            sequencer: S::init(start),
        }
    }

    /// Returns *true* if `u` has been visited (or excluded) so far.
    pub fn did_visit_node(&self, u: Node) -> bool {
        self.visited.get_bit(u)
    }

    /// Excludes a node from the search: it is treated as already visited and
    /// none of its edges are taken.
    ///
    /// # Warning
    /// Has no effect on nodes already in the frontier; call it directly after
    /// the constructor.
    pub fn exclude_node(&mut self, u: Node) {
        self.visited.set_bit(u);
    }

    /// Excludes multiple nodes from the search, see
    /// [`TraversalSearch::exclude_node`].
    pub fn with_nodes_excluded<I>(mut self, us: I) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        for u in us {
            self.exclude_node(u);
        }
        self
    }

    /// Tries to restart the exhausted search at a yet unvisited node and
    /// returns *true* iff successful. Requires that the search came to a
    /// hold earlier, i.e. `self.next()` returned `None`.
    pub fn try_restart_at_unvisited(&mut self) -> bool {
        assert_eq!(self.sequencer.cardinality(), 0);
        match self.graph.vertices().find(|&u| !self.visited.get_bit(u)) {
            None => false,
            Some(u) => {
                self.visited.set_bit(u);
                self.sequencer.push(u);
                true
            }
        }
    }
}

impl<S: NodeSequencer> Iterator for TraversalSearch<'_, S> {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let u = self.sequencer.pop()?;
        for v in self.graph.neighbors_of(u) {
            if !self.visited.set_bit(v) {
                self.sequencer.push(v);
            }
        }
        Some(u)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.sequencer.cardinality(), Some(self.graph.len()))
    }
}

impl AdjGraph {
    /// Returns a BFS iterator over the nodes reachable from `start`.
    /// ** Panics if `start >= n` **
    pub fn bfs(&self, start: Node) -> Bfs<'_> {
        Bfs::new(self, start)
    }

    /// Returns a DFS iterator over the nodes reachable from `start`.
    /// ** Panics if `start >= n` **
    pub fn dfs(&self, start: Node) -> Dfs<'_> {
        Dfs::new(self, start)
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn bfs_order() {
        //  / 2 --- \
        // 1         4 - 3
        //  \ 0 - 5 /
        let graph =
            AdjGraph::from_edges(6, false, [(1, 2), (1, 0), (4, 3), (0, 5), (2, 4), (5, 4)]);

        let order = graph.bfs(1).collect_vec();
        assert_eq!(order.len(), 6);
        assert_eq!(order[0], 1);
        assert!(order[1..3].contains(&0) && order[1..3].contains(&2));
        assert!(order[3..5].contains(&4) && order[3..5].contains(&5));
        assert_eq!(order[5], 3);
    }

    #[test]
    fn dfs_reaches_same_set() {
        let graph =
            AdjGraph::from_edges(6, false, [(1, 2), (1, 0), (4, 3), (0, 5), (2, 4), (5, 4)]);

        let mut bfs = graph.bfs(0).collect_vec();
        let mut dfs = graph.dfs(0).collect_vec();
        bfs.sort_unstable();
        dfs.sort_unstable();
        assert_eq!(bfs, dfs);
    }

    #[test]
    fn directed_reachability() {
        let graph = AdjGraph::from_edges(4, true, [(0, 1), (1, 2), (3, 0)]);
        assert_eq!(graph.bfs(0).collect_vec(), vec![0, 1, 2]);
        assert_eq!(graph.bfs(3).count(), 4);
        assert_eq!(graph.bfs(2).collect_vec(), vec![2]);
    }

    #[test]
    fn restart_covers_all_components() {
        let graph = AdjGraph::from_edges(6, false, [(0, 1), (2, 3)]);
        let mut bfs = graph.bfs(0);

        let mut seen = bfs.by_ref().collect_vec();
        while bfs.try_restart_at_unvisited() {
            seen.extend(bfs.by_ref());
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..6).collect_vec());
    }

    #[test]
    fn excluded_nodes_block_paths() {
        let graph = AdjGraph::from_edges(4, false, [(0, 1), (1, 2), (2, 3)]);
        let reached = graph.bfs(0).with_nodes_excluded([2]).collect_vec();
        assert_eq!(reached, vec![0, 1]);
    }
}
