use fxhash::FxHashMap;
use rand::Rng;

use crate::edge::Edge;
use crate::node::NumNodes;

/// Generator for uniform `G(n,m)` random graphs with `n` nodes and exactly
/// `m` distinct edges.
///
/// The generator is parameterized via:
/// - `.nodes(n)` sets the total number of nodes
/// - `.edges(m)` sets the total number of edges, clamped to the edge-space size
/// - `.directed(bool)` selects whether edges are oriented (loops never occur)
#[derive(Debug, Copy, Clone, Default)]
pub struct Gnm {
    n: u64,
    m: u64,
    directed: bool,
}

impl Gnm {
    /// Creates a new empty `G(n,m)` generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of nodes in the graph generator.
    pub fn nodes(mut self, n: NumNodes) -> Self {
        self.n = n as u64;
        self
    }

    /// Sets the number of edges in the graph generator.
    pub fn edges(mut self, m: u64) -> Self {
        self.m = m;
        self
    }

    /// Marks the graph as directed (or not).
    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Returns the size of the ordinal edge-ID space: all loop-free ordered
    /// pairs when directed, all loop-free normalized pairs otherwise.
    pub fn id_space(&self) -> u64 {
        if self.n < 2 {
            0
        } else if self.directed {
            self.n * (self.n - 1)
        } else {
            self.n * (self.n - 1) / 2
        }
    }

    /// Generates the full list of random edges.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<Edge> {
        self.stream(rng).collect()
    }

    /// Creates a lazy iterator (stream) over generated edges.
    pub fn stream<'a, R: Rng>(&self, rng: &'a mut R) -> GnmStream<'a, R> {
        let end = self.id_space();
        let m = self.m.min(end);
        GnmStream {
            n: self.n,
            rem: m,
            cur: 0,
            end,
            map: FxHashMap::with_capacity_and_hasher(m as usize, Default::default()),
            rng,
            directed: self.directed,
        }
    }
}

/// Iterator producing exactly `m` uniformly random, distinct edge ordinals
/// without replacement, mapped back to vertex pairs.
///
/// The algorithm is based on:
/// > *V. Batagelj and U. Brandes. Efficient Generation of Large Random
/// > Networks. Physical Review E 71.3 (2005): 036113.*
///
/// A sparse remap table simulates an in-place Fisher–Yates shuffle of the
/// ordinal space, so memory is proportional to `m` rather than to the edge
/// space.
pub struct GnmStream<'a, R: Rng> {
    n: u64,
    rem: u64,
    cur: u64,
    end: u64,
    map: FxHashMap<u64, u64>,
    rng: &'a mut R,
    directed: bool,
}

impl<R: Rng> GnmStream<'_, R> {
    fn next_ordinal(&mut self) -> Option<u64> {
        if self.rem == 0 {
            return None;
        }

        // draw a position and resolve it through the remap table
        let pos = self.rng.random_range(self.cur..self.end);
        let ordinal = self.map.get(&pos).copied().unwrap_or(pos);

        // the front element replaces the drawn position for later draws
        let front = self.map.get(&self.cur).copied().unwrap_or(self.cur);
        self.map.insert(pos, front);

        self.cur += 1;
        self.rem -= 1;

        Some(ordinal)
    }
}

impl<R: Rng> Iterator for GnmStream<'_, R> {
    type Item = Edge;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_ordinal().map(|x| {
            if self.directed {
                Edge::from_ordinal_directed(x, self.n)
            } else {
                Edge::from_ordinal_undirected(x, self.n)
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rem as usize, Some(self.rem as usize))
    }
}

impl<R: Rng> ExactSizeIterator for GnmStream<'_, R> {}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn exact_count_distinct_no_loops() {
        let rng = &mut Pcg64::seed_from_u64(42);

        for n in [5 as NumNodes, 10, 40] {
            for m in [0u64, 1, n as u64, 3 * n as u64] {
                for directed in [false, true] {
                    let edges = Gnm::new()
                        .nodes(n)
                        .edges(m)
                        .directed(directed)
                        .generate(rng);

                    let max = if directed {
                        n as u64 * (n as u64 - 1)
                    } else {
                        n as u64 * (n as u64 - 1) / 2
                    };
                    assert_eq!(edges.len() as u64, m.min(max));
                    assert!(edges.iter().all(|e| !e.is_loop()));
                    assert!(!directed || edges.iter().all(|&Edge(u, v)| u < n && v < n));
                    assert!(directed || edges.iter().all(|e| e.is_normalized()));
                    assert_eq!(edges.iter().unique().count(), edges.len());
                }
            }
        }
    }

    #[test]
    fn full_edge_space_is_exhausted() {
        let rng = &mut Pcg64::seed_from_u64(3);

        let edges = Gnm::new().nodes(6).edges(15).directed(false).generate(rng);
        let all = (0..6u32)
            .flat_map(|u| ((u + 1)..6).map(move |v| Edge(u, v)))
            .collect_vec();
        assert_eq!(edges.iter().copied().sorted().collect_vec(), all);
    }

    #[test]
    fn stream_reports_exact_length() {
        let rng = &mut Pcg64::seed_from_u64(3);
        let generator = Gnm::new().nodes(10).edges(7).directed(true);

        let mut stream = generator.stream(rng);
        assert_eq!(stream.len(), 7);
        stream.next();
        assert_eq!(stream.len(), 6);
    }

    #[test]
    fn degenerate_inputs_yield_nothing() {
        let rng = &mut Pcg64::seed_from_u64(3);
        assert!(Gnm::new().nodes(0).edges(5).generate(rng).is_empty());
        assert!(Gnm::new().nodes(1).edges(5).generate(rng).is_empty());
        assert!(Gnm::new().nodes(5).edges(0).generate(rng).is_empty());
    }
}
