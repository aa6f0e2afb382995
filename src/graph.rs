/*!
# Graph Representation

A single adjacency-list representation with *runtime* directedness: requests
select `directed=0|1` on the wire, so the orientation cannot be a type-level
property here. Undirected graphs store every edge symmetrically; the edge
count `m` tracks logical edges (one per undirected pair, one per arc).
*/

use smallvec::SmallVec;

use crate::{
    edge::{Edge, NumEdges},
    node::{Node, NumNodes},
};

/// Neighbor rows are short for the request sizes the bounded algorithms accept.
type NeighborRow = SmallVec<[Node; 8]>;

/// Adjacency-list graph with optional directed edges.
///
/// Self-loops and duplicate edges are rejected on insertion. For undirected
/// graphs the symmetry invariant (`(u,v)` present iff `(v,u)` present) holds
/// after every mutation.
#[derive(Clone)]
pub struct AdjGraph {
    nbs: Vec<NeighborRow>,
    directed: bool,
    num_edges: NumEdges,
}

impl AdjGraph {
    /// Creates an empty graph with `n` singleton nodes.
    pub fn new(n: NumNodes, directed: bool) -> Self {
        Self {
            nbs: vec![NeighborRow::new(); n as usize],
            directed,
            num_edges: 0,
        }
    }

    /// Creates an empty undirected graph with `n` singleton nodes.
    pub fn new_undirected(n: NumNodes) -> Self {
        Self::new(n, false)
    }

    /// Creates an empty directed graph with `n` singleton nodes.
    pub fn new_directed(n: NumNodes) -> Self {
        Self::new(n, true)
    }

    /// Creates a graph from a number of nodes and an iterator over edges.
    /// Invalid edges (loops, duplicates, out-of-range endpoints) are skipped.
    pub fn from_edges(
        n: NumNodes,
        directed: bool,
        edges: impl IntoIterator<Item = impl Into<Edge>>,
    ) -> Self {
        let mut graph = Self::new(n, directed);
        graph.add_edges(edges);
        graph
    }

    /// Returns the number of nodes of the graph
    pub fn number_of_nodes(&self) -> NumNodes {
        self.nbs.len() as NumNodes
    }

    /// Returns the number of nodes as usize
    pub fn len(&self) -> usize {
        self.nbs.len()
    }

    /// Returns *true* if the graph has no nodes (and thus no edges)
    pub fn is_empty(&self) -> bool {
        self.nbs.is_empty()
    }

    /// Returns the number of logical edges (undirected) or arcs (directed)
    pub fn number_of_edges(&self) -> NumEdges {
        self.num_edges
    }

    /// Returns *true* if edges are directed
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Returns an iterator over V.
    pub fn vertices(&self) -> impl Iterator<Item = Node> + '_ {
        0..self.number_of_nodes()
    }

    /// Returns *true* if `v` is a valid node id of this graph
    pub fn valid_node(&self, v: Node) -> bool {
        (v as usize) < self.nbs.len()
    }

    /// Returns a slice-reference of the (out-)neighborhood of a given vertex.
    /// ** Panics if `u >= n` **
    pub fn as_neighbors_slice(&self, u: Node) -> &[Node] {
        &self.nbs[u as usize]
    }

    /// Returns an iterator over the (out-)neighbors of a given vertex.
    /// ** Panics if `u >= n` **
    pub fn neighbors_of(&self, u: Node) -> impl Iterator<Item = Node> + '_ {
        self.nbs[u as usize].iter().copied()
    }

    /// Returns the number of (outgoing) neighbors of `u`.
    /// ** Panics if `u >= n` **
    pub fn degree_of(&self, u: Node) -> NumNodes {
        self.nbs[u as usize].len() as NumNodes
    }

    /// Returns *true* if the edge (u,v) exists in the graph.
    /// ** Panics if `u >= n` **
    pub fn has_edge(&self, u: Node, v: Node) -> bool {
        self.nbs[u as usize].contains(&v)
    }

    /// Returns the out-degree table; for undirected graphs this is the
    /// degree table.
    pub fn out_degrees(&self) -> Vec<NumNodes> {
        self.nbs.iter().map(|row| row.len() as NumNodes).collect()
    }

    /// Returns the in-degree table; for undirected graphs this equals
    /// [`AdjGraph::out_degrees`].
    pub fn in_degrees(&self) -> Vec<NumNodes> {
        if !self.directed {
            return self.out_degrees();
        }
        let mut degs = vec![0; self.len()];
        for row in &self.nbs {
            for &v in row {
                degs[v as usize] += 1;
            }
        }
        degs
    }

    /// Returns the graph with every arc reversed. For undirected graphs this
    /// is a plain copy, as the adjacency is symmetric already.
    pub fn reversed(&self) -> AdjGraph {
        if !self.directed {
            return self.clone();
        }
        let mut rev = AdjGraph::new(self.number_of_nodes(), true);
        for u in self.vertices() {
            for v in self.neighbors_of(u) {
                rev.nbs[v as usize].push(u);
            }
        }
        rev.num_edges = self.num_edges;
        rev
    }

    /// Adds the edge `(u, v)` (and `(v, u)` if undirected) to the graph.
    /// Returns *true* exactly if the edge was inserted; self-loops,
    /// duplicates and out-of-range endpoints are rejected.
    pub fn try_add_edge(&mut self, u: Node, v: Node) -> bool {
        if !self.valid_node(u) || !self.valid_node(v) || u == v || self.has_edge(u, v) {
            return false;
        }
        self.nbs[u as usize].push(v);
        if !self.directed {
            self.nbs[v as usize].push(u);
        }
        self.num_edges += 1;
        true
    }

    /// Adds all edges in the collection, skipping invalid ones.
    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = impl Into<Edge>>) {
        for edge in edges {
            let Edge(u, v) = edge.into();
            self.try_add_edge(u, v);
        }
    }

    /// Removes the edge `(u, v)` (and `(v, u)` if undirected) from the graph.
    /// Returns *true* exactly if the edge was present.
    pub fn try_remove_edge(&mut self, u: Node, v: Node) -> bool {
        if !self.valid_node(u) || !self.valid_node(v) || u == v {
            return false;
        }
        let row = &mut self.nbs[u as usize];
        let Some(pos) = row.iter().position(|&w| w == v) else {
            return false;
        };
        row.swap_remove(pos);
        if !self.directed {
            let row = &mut self.nbs[v as usize];
            let pos = row
                .iter()
                .position(|&w| w == u)
                .expect("symmetric entry must exist in an undirected graph");
            row.swap_remove(pos);
        }
        self.num_edges -= 1;
        true
    }
}
