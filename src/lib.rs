/*!
`graphd` is a compute engine for hard combinatorial graph problems served
over a line-oriented TCP protocol. It answers four kinds of questions about
adjacency-list graphs (directed or undirected):

- **Eulerian circuits**: existence with a specific reason on failure, and
  construction via Hierholzer's algorithm ([`algo::eulerian_circuit`]),
- **components**: connected / strongly connected component counting
  ([`algo::count_components`], Kosaraju for the directed case),
- **Hamiltonian cycles**: precheck plus bounded backtracking
  ([`algo::HamiltonianSearch`]),
- **cliques**: one maximum clique or the number of maximal cliques via
  bounded Bron–Kerbosch with pivoting ([`algo::BronKerbosch`]).

The exponential searches run under a [`budget::Budget`] (wall-clock deadline
plus step ceiling) and report expiry as an explicit, partial result rather
than a wrong answer, which makes them safe to host in a server that must
bound worst-case latency.

# Serving

Two thread-based architectures host the same engine behind the same
protocol (see [`proto`] for the wire format):

- [`server::leader_follower`]: N workers share the listening socket and pass
  a leadership baton; the baton holder accepts, promotes a follower, then
  processes its connection end-to-end.
- [`server::pipeline`]: active objects (dispatcher, one worker per
  algorithm, responder) connected by ownership-transferring queues.

Request graphs either arrive as explicit edge lists (`GRAPH` mode) or are
sampled server-side as uniform `G(n,m)` instances (`RANDOM` mode, see
[`gens`]).

# Example

```no_run
use std::net::TcpListener;
use graphd::server::{leader_follower::LeaderFollowerPool, Shutdown};

let listener = TcpListener::bind("127.0.0.1:5558").unwrap();
let pool = LeaderFollowerPool::start(listener, 4, Shutdown::new()).unwrap();
pool.join();
```
*/

pub mod algo;
pub mod budget;
pub mod edge;
pub mod gens;
pub mod graph;
pub mod node;
pub mod proto;
pub mod server;

/// `graphd::prelude` includes the graph container with its node/edge
/// vocabulary and the search budget.
pub mod prelude {
    pub use crate::{budget::Budget, edge::*, graph::AdjGraph, node::*};
}
