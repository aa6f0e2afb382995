/*!
Eulerian-circuit existence and construction.

Existence is decided by the classic degree and connectivity conditions;
construction uses Hierholzer's algorithm on an edge-indexed adjacency where
each undirected edge carries one identifier shared by both of its adjacency
entries, so traversing it from either endpoint marks it used exactly once.
Everything here is linear in `n + m` and therefore runs without a budget.
*/

use thiserror::Error;

use crate::{edge::EdgeBitSet, graph::AdjGraph, node::Node};

/// Why a graph has no Eulerian circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotEulerian {
    #[error("Graph is not connected on its non-isolated vertices.")]
    Disconnected,
    #[error("A vertex has odd degree (all degrees must be even).")]
    OddDegree,
    #[error("In-degree != Out-degree for at least one vertex.")]
    DegreeImbalance,
    #[error("Graph is not strongly connected on its non-isolated vertices.")]
    NotStronglyConnected,
}

/// Decides existence and, if possible, constructs an Eulerian circuit.
///
/// The returned sequence visits every edge exactly once and starts and ends
/// at the same vertex. A graph without edges trivially has the degenerate
/// single-vertex circuit. Isolated vertices are ignored throughout.
pub fn eulerian_circuit(graph: &AdjGraph) -> Result<Vec<Node>, NotEulerian> {
    if graph.number_of_edges() == 0 {
        return Ok(if graph.is_empty() { vec![] } else { vec![0] });
    }

    if graph.is_directed() {
        directed_circuit(graph)
    } else {
        undirected_circuit(graph)
    }
}

fn undirected_circuit(graph: &AdjGraph) -> Result<Vec<Node>, NotEulerian> {
    let start = graph
        .vertices()
        .find(|&u| graph.degree_of(u) > 0)
        .expect("graph has edges");

    let mut bfs = graph.bfs(start);
    bfs.by_ref().for_each(drop);
    if graph
        .vertices()
        .any(|u| graph.degree_of(u) > 0 && !bfs.did_visit_node(u))
    {
        return Err(NotEulerian::Disconnected);
    }

    if graph.vertices().any(|u| graph.degree_of(u) % 2 != 0) {
        return Err(NotEulerian::OddDegree);
    }

    // Assign one edge id per undirected pair: thanks to the symmetry
    // invariant, scanning only the `u < v` entries covers each edge once.
    let mut adj = vec![Vec::new(); graph.len()];
    let mut next_id = 0;
    for u in graph.vertices() {
        for v in graph.neighbors_of(u) {
            if u < v {
                adj[u as usize].push(EdgeRef { to: v, id: next_id });
                adj[v as usize].push(EdgeRef { to: u, id: next_id });
                next_id += 1;
            }
        }
    }

    Ok(hierholzer(&adj, next_id, start))
}

fn directed_circuit(graph: &AdjGraph) -> Result<Vec<Node>, NotEulerian> {
    let out = graph.out_degrees();
    let in_ = graph.in_degrees();
    let non_isolated = |u: Node| out[u as usize] + in_[u as usize] > 0;

    if graph
        .vertices()
        .any(|u| non_isolated(u) && out[u as usize] != in_[u as usize])
    {
        return Err(NotEulerian::DegreeImbalance);
    }

    let start = graph
        .vertices()
        .find(|&u| non_isolated(u))
        .expect("graph has edges");

    // strong connectivity on non-isolated vertices: forward and reverse
    // reachability from `start` must both cover them
    for g in [graph, &graph.reversed()] {
        let mut bfs = g.bfs(start);
        bfs.by_ref().for_each(drop);
        if graph.vertices().any(|u| non_isolated(u) && !bfs.did_visit_node(u)) {
            return Err(NotEulerian::NotStronglyConnected);
        }
    }

    let mut adj = vec![Vec::new(); graph.len()];
    let mut next_id = 0;
    for u in graph.vertices() {
        for v in graph.neighbors_of(u) {
            adj[u as usize].push(EdgeRef { to: v, id: next_id });
            next_id += 1;
        }
    }

    Ok(hierholzer(&adj, next_id, start))
}

#[derive(Clone, Copy)]
struct EdgeRef {
    to: Node,
    id: u32,
}

/// Iterative Hierholzer walk: follow unused incident edges in adjacency
/// order, emit a vertex only once it has no unused edges left, and reverse
/// the emitted sequence to obtain the circuit.
fn hierholzer(adj: &[Vec<EdgeRef>], num_edge_ids: u32, start: Node) -> Vec<Node> {
    let mut used = EdgeBitSet::new(num_edge_ids);
    let mut cursor = vec![0usize; adj.len()];

    let mut stack = vec![start];
    let mut circuit = Vec::with_capacity(num_edge_ids as usize + 1);

    while let Some(&u) = stack.last() {
        let edges = &adj[u as usize];
        let c = &mut cursor[u as usize];
        while *c < edges.len() && used.get_bit(edges[*c].id) {
            *c += 1;
        }
        if *c == edges.len() {
            circuit.push(u);
            stack.pop();
        } else {
            let e = edges[*c];
            used.set_bit(e.id);
            stack.push(e.to);
        }
    }

    circuit.reverse();
    circuit
}
