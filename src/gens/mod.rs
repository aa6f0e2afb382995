/*!
# Random Graph Generation

The `RANDOM` request mode synthesizes its input graph server-side: a uniform
`G(n,m)` sample with exactly `m` distinct edges (clamped to the maximum
possible), no self-loops and no duplicates, deterministic per seed.

The generator follows the builder pattern: configure with `.nodes(n)`,
`.edges(m)` and `.directed(bool)`, then call `generate()` or `stream()` with
an [`Rng`](rand::Rng).
*/

use rand::SeedableRng;
use rand_pcg::Pcg64;

mod gnm;

pub use gnm::*;

use crate::{graph::AdjGraph, node::NumNodes};

/// Builds a uniform `G(n,m)` request graph from the wire parameters.
///
/// The requested edge count is clamped to the size of the edge space
/// (`n*(n-1)` directed, `n*(n-1)/2` undirected); the RNG is seeded
/// deterministically so equal requests produce equal graphs.
pub fn random_graph(n: NumNodes, m: u64, seed: u64, directed: bool) -> AdjGraph {
    let rng = &mut Pcg64::seed_from_u64(seed);
    let edges = Gnm::new()
        .nodes(n)
        .edges(m)
        .directed(directed)
        .stream(rng);
    AdjGraph::from_edges(n, directed, edges)
}
