/*!
# Graph Algorithms

The algorithm engines of the crate, plus the closed dispatch surface the
servers route requests through. The exponential engines (Hamiltonian cycle,
cliques) accept a [`Budget`](crate::budget::Budget) and report budget expiry
as an explicit, partial result; the linear engines (Euler, components) run
unbounded.
*/

use std::{fmt::Write, str::FromStr, time::Duration};

mod clique;
mod connectivity;
mod euler;
mod hamilton;
mod traversal;

pub use clique::*;
pub use connectivity::*;
pub use euler::*;
pub use hamilton::*;
pub use traversal::*;

use crate::{budget::Budget, graph::AdjGraph, proto::Params};

/// Default wall-clock budget per bounded request.
pub const DEFAULT_TIMEOUT_MS: u64 = 300;

/// Default step ceiling for the backtracking engines; their inner loop is
/// cheap per step, so they run on a high ceiling.
pub const SEARCH_STEP_LIMIT: u64 = 800_000;

/// Outcome of running an algorithm against a request.
///
/// `ok` means "ran without protocol error": negative answers ("no Hamiltonian
/// cycle") and budget expiry are successful completions carried in `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgoResult {
    pub ok: bool,
    pub text: String,
}

/// The closed set of algorithms reachable through the `ALG` protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    SccCount,
    HamCycle,
    MaxClique,
    NumMaxCliques,
}

/// All algorithm kinds, in routing order.
pub const ALGORITHMS: [Algorithm; 4] = [
    Algorithm::SccCount,
    Algorithm::HamCycle,
    Algorithm::MaxClique,
    Algorithm::NumMaxCliques,
];

impl FromStr for Algorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCC_COUNT" => Ok(Algorithm::SccCount),
            "HAM_CYCLE" => Ok(Algorithm::HamCycle),
            "MAXCLIQUE" => Ok(Algorithm::MaxClique),
            "NUM_MAXCLIQUES" => Ok(Algorithm::NumMaxCliques),
            _ => Err(()),
        }
    }
}

impl Algorithm {
    /// The wire name of the algorithm.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::SccCount => "SCC_COUNT",
            Algorithm::HamCycle => "HAM_CYCLE",
            Algorithm::MaxClique => "MAXCLIQUE",
            Algorithm::NumMaxCliques => "NUM_MAXCLIQUES",
        }
    }

    /// Runs the algorithm against a graph with the request's parameters and
    /// renders the engine-specific result text.
    pub fn run(self, graph: &AdjGraph, params: &Params) -> AlgoResult {
        let text = match self {
            Algorithm::SccCount => {
                let c = count_components(graph);
                if graph.is_directed() {
                    format!("SCC count={c}")
                } else {
                    format!("Graph undirected; connected components={c}")
                }
            }

            Algorithm::HamCycle => {
                let mut search = HamiltonianSearch::new(graph);
                if let Some(limit) = params.get_u32("limit") {
                    search.set_limit(limit);
                }
                match search.run(&mut budget_from(params, SEARCH_STEP_LIMIT)) {
                    HamOutcome::SkippedLimit { n, limit } => {
                        format!("HAM: n={n} exceeds limit={limit} (skip)")
                    }
                    HamOutcome::TrivialEmpty => "HAM: trivial YES (empty)".to_string(),
                    HamOutcome::NoPrecheck => "NO Hamilton cycle (quick precheck)".to_string(),
                    HamOutcome::No => "NO Hamilton cycle".to_string(),
                    HamOutcome::Timeout => "HAM: TIMEOUT".to_string(),
                    HamOutcome::Cycle(cycle) => {
                        let mut out = String::from("YES Hamilton cycle: ");
                        for (i, v) in cycle.iter().enumerate() {
                            if i > 0 {
                                out.push_str(" -> ");
                            }
                            let _ = write!(out, "{v}");
                        }
                        let _ = write!(out, " -> {}", cycle[0]);
                        out
                    }
                }
            }

            Algorithm::MaxClique => {
                let result = BronKerbosch::new(graph)
                    .max_clique(&mut budget_from(params, SEARCH_STEP_LIMIT));
                if result.timed_out {
                    format!("MAXCLIQUE: TIMEOUT (current best={})", result.members.len())
                } else {
                    let mut out = format!("MaxClique size={} example:", result.members.len());
                    for v in &result.members {
                        let _ = write!(out, " {v}");
                    }
                    out
                }
            }

            Algorithm::NumMaxCliques => {
                let result = BronKerbosch::new(graph)
                    .count_maximal(&mut budget_from(params, SEARCH_STEP_LIMIT));
                if result.timed_out {
                    format!("NUM_MAXCLIQUES: TIMEOUT (count so far={})", result.count)
                } else {
                    format!("Maximal cliques count={}", result.count)
                }
            }
        };

        AlgoResult { ok: true, text }
    }
}

/// Builds the request budget from `timeout_ms` and `step_limit` parameters,
/// falling back to the defaults above. `step_limit=0` means "use default",
/// matching the wire contract.
fn budget_from(params: &Params, default_steps: u64) -> Budget {
    let timeout_ms = params.get_u64("timeout_ms").unwrap_or(DEFAULT_TIMEOUT_MS).max(1);
    let step_limit = params
        .get_u64("step_limit")
        .filter(|&v| v > 0)
        .unwrap_or(default_steps);
    Budget::new(step_limit, Some(Duration::from_millis(timeout_ms)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_round_trip() {
        for algo in ALGORITHMS {
            assert_eq!(algo.name().parse::<Algorithm>(), Ok(algo));
        }
        assert!("EULER".parse::<Algorithm>().is_err());
        assert!("scc_count".parse::<Algorithm>().is_err());
    }

    #[test]
    fn scc_count_text() {
        let graph = AdjGraph::from_edges(5, true, [(0, 1), (1, 2), (2, 0), (3, 4)]);
        let res = Algorithm::SccCount.run(&graph, &Params::default());
        assert!(res.ok);
        assert_eq!(res.text, "SCC count=3");

        let graph = AdjGraph::from_edges(5, false, [(0, 1), (1, 2), (2, 0), (3, 4)]);
        let res = Algorithm::SccCount.run(&graph, &Params::default());
        assert_eq!(res.text, "Graph undirected; connected components=2");
    }

    #[test]
    fn ham_cycle_texts() {
        let cycle = AdjGraph::from_edges(4, false, [(0, 1), (1, 2), (2, 3), (3, 0)]);
        let res = Algorithm::HamCycle.run(&cycle, &Params::default());
        let body = res.text.strip_prefix("YES Hamilton cycle: ").unwrap();
        let stops = body.split(" -> ").collect::<Vec<_>>();
        assert_eq!(stops.len(), 5);
        assert_eq!(stops.first(), stops.last());

        let path = AdjGraph::from_edges(4, false, [(0, 1), (1, 2)]);
        let res = Algorithm::HamCycle.run(&path, &Params::default());
        assert_eq!(res.text, "NO Hamilton cycle (quick precheck)");

        let big = AdjGraph::new_undirected(40);
        let res = Algorithm::HamCycle.run(&big, &Params::default());
        assert_eq!(res.text, "HAM: n=40 exceeds limit=18 (skip)");

        let mut params = Params::default();
        params.insert("step_limit", "1");
        let res = Algorithm::HamCycle.run(&cycle, &params);
        assert_eq!(res.text, "HAM: TIMEOUT");
    }

    #[test]
    fn clique_texts() {
        let graph = AdjGraph::from_edges(5, false, [(0, 1), (1, 2), (0, 2), (2, 3), (3, 4)]);

        let res = Algorithm::MaxClique.run(&graph, &Params::default());
        assert!(res.text.starts_with("MaxClique size=3 example:"));

        let res = Algorithm::NumMaxCliques.run(&graph, &Params::default());
        assert_eq!(res.text, "Maximal cliques count=3");

        let mut params = Params::default();
        params.insert("step_limit", "1");
        let res = Algorithm::MaxClique.run(&graph, &params);
        assert_eq!(res.text, "MAXCLIQUE: TIMEOUT (current best=0)");
        let res = Algorithm::NumMaxCliques.run(&graph, &params);
        assert_eq!(res.text, "NUM_MAXCLIQUES: TIMEOUT (count so far=0)");
    }
}
