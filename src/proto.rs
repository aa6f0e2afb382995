/*!
# Line Protocol

One request per connection, line-oriented. Two independently versioned
request families share a connection's first line:

```text
EULER RANDOM n=<uint> m=<uint> [seed=<uint>] [directed=0|1]
EULER GRAPH  n=<uint> m=<uint> [directed=0|1]            + m lines "<u> <v>"
ALG <NAME> RANDOM n=<uint> m=<uint> [seed=<uint>] [directed=0|1] [limit=..] [timeout_ms=..] [step_limit=..]
ALG <NAME> GRAPH  n=<uint> m=<uint> [directed=0|1] [...]  + m lines "<u> <v>"
```

Replies are a single line: `OK ...` for completed requests (including
negative and timed-out answers) or `ERR <reason>` for protocol errors, after
which the connection is closed either way.
*/

use std::io::{self, BufRead};
use std::str::FromStr;

use fxhash::FxHashMap;
use thiserror::Error;

use crate::{
    algo::{AlgoResult, Algorithm, NotEulerian},
    gens::random_graph,
    graph::AdjGraph,
    node::{Node, NumNodes, INVALID_NODE},
};

/// Requests beyond this line length are considered hostile and dropped.
pub const MAX_LINE_LEN: usize = 2_000_000;

/// Long circuits are capped in replies to keep lines bounded.
pub const CIRCUIT_PRINT_LIMIT: usize = 4000;

/// A protocol error; the `Display` text is the wire `ERR` reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtoError {
    #[error("expected 'ALG <NAME> <MODE>'")]
    BadHeader,
    #[error("unknown algorithm")]
    UnknownAlgorithm,
    #[error("missing n")]
    MissingN,
    #[error("missing m")]
    MissingM,
    #[error("n must be > 0")]
    ZeroNodes,
    #[error("mode must be RANDOM or GRAPH")]
    BadMode,
    #[error("unknown mode (use RANDOM or GRAPH)")]
    BadEulerMode,
    #[error("premature end while reading edges")]
    PrematureEnd,
    #[error("bad edge format")]
    BadEdgeLine,
}

/// String-keyed request parameters (`k=v` tokens) with typed getters.
/// Unknown keys are carried but ignored; a value that fails to parse is
/// treated as absent.
#[derive(Debug, Clone, Default)]
pub struct Params(FxHashMap<String, String>);

impl Params {
    /// Collects all `k=v` tokens; tokens without `=` are ignored.
    pub fn from_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> Self {
        let mut map = FxHashMap::default();
        for token in tokens {
            if let Some((k, v)) = token.split_once('=') {
                map.insert(k.to_string(), v.to_string());
            }
        }
        Self(map)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(|v| v.parse().ok())
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.0.get(key).and_then(|v| v.parse().ok())
    }

    /// Accepts `1`, `true` and `True` as *true*, everything else as *false*.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0
            .get(key)
            .map(|v| v == "1" || v == "true" || v == "True")
    }
}

/// The request family selected by the first token of the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// The earlier, Euler-only protocol.
    Euler,
    /// The uniform `ALG` protocol over the bounded algorithms.
    Alg(Algorithm),
}

/// How the request provides its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generate a `G(n,m)` instance server-side.
    Random,
    /// Read `m` explicit edge lines from the connection.
    Graph,
}

/// The parsed first line of a request.
#[derive(Debug)]
pub struct RequestHeader {
    pub family: Family,
    pub mode: Mode,
    pub n: NumNodes,
    pub m: u64,
    pub seed: u64,
    pub directed: bool,
    pub params: Params,
}

/// Parses the first line of a request into a header.
pub fn parse_request_line(line: &str) -> Result<RequestHeader, ProtoError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"EULER") => parse_euler(&tokens),
        Some(&"ALG") => parse_alg(&tokens),
        _ => Err(ProtoError::BadHeader),
    }
}

fn parse_euler(tokens: &[&str]) -> Result<RequestHeader, ProtoError> {
    let mode = match tokens.get(1) {
        Some(&"RANDOM") => Mode::Random,
        Some(&"GRAPH") => Mode::Graph,
        Some(_) => return Err(ProtoError::BadEulerMode),
        None => return Err(ProtoError::BadHeader),
    };

    let params = Params::from_tokens(tokens[2..].iter().copied());
    let n = params.get_u64("n").unwrap_or(0);
    if n == 0 {
        return Err(ProtoError::ZeroNodes);
    }

    Ok(RequestHeader {
        family: Family::Euler,
        mode,
        n: clamp_nodes(n),
        m: params.get_u64("m").unwrap_or(0),
        seed: params.get_u64("seed").unwrap_or(0),
        directed: params.get_bool("directed").unwrap_or(false),
        params,
    })
}

fn parse_alg(tokens: &[&str]) -> Result<RequestHeader, ProtoError> {
    if tokens.len() < 3 {
        return Err(ProtoError::BadHeader);
    }

    let mode = match tokens[2] {
        "RANDOM" => Mode::Random,
        "GRAPH" => Mode::Graph,
        _ => return Err(ProtoError::BadMode),
    };

    let params = Params::from_tokens(tokens[3..].iter().copied());
    let n = params.get_u64("n").ok_or(ProtoError::MissingN)?;
    let m = params.get_u64("m").ok_or(ProtoError::MissingM)?;

    let algo = Algorithm::from_str(tokens[1]).map_err(|_| ProtoError::UnknownAlgorithm)?;

    Ok(RequestHeader {
        family: Family::Alg(algo),
        mode,
        n: clamp_nodes(n),
        m,
        seed: params.get_u64("seed").unwrap_or(0),
        directed: params.get_bool("directed").unwrap_or(false),
        params,
    })
}

fn clamp_nodes(n: u64) -> NumNodes {
    n.min(NumNodes::MAX as u64) as NumNodes
}

/// Builds the request graph: a seeded `G(n,m)` sample in RANDOM mode, or
/// exactly `m` edge lines read from `reader` in GRAPH mode. Edge lines that
/// reference invalid endpoints are skipped like any other rejected edge.
pub fn build_graph<R: BufRead>(
    header: &RequestHeader,
    reader: &mut R,
) -> Result<AdjGraph, ProtoError> {
    match header.mode {
        Mode::Random => Ok(random_graph(header.n, header.m, header.seed, header.directed)),
        Mode::Graph => {
            let mut graph = AdjGraph::new(header.n, header.directed);
            for _ in 0..header.m {
                let line = read_trimmed_line(reader)
                    .map_err(|_| ProtoError::PrematureEnd)?
                    .ok_or(ProtoError::PrematureEnd)?;
                let (u, v) = parse_edge_line(&line)?;
                graph.try_add_edge(u, v);
            }
            Ok(graph)
        }
    }
}

fn parse_edge_line(line: &str) -> Result<(Node, Node), ProtoError> {
    let mut tokens = line.split_whitespace();
    let u = tokens.next().ok_or(ProtoError::BadEdgeLine)?;
    let v = tokens.next().ok_or(ProtoError::BadEdgeLine)?;
    // negative endpoints are syntactically valid but never match a node
    let parse = |t: &str| -> Result<Node, ProtoError> {
        t.parse::<i64>()
            .map_err(|_| ProtoError::BadEdgeLine)
            .map(|v| Node::try_from(v).unwrap_or(INVALID_NODE))
    };
    Ok((parse(u)?, parse(v)?))
}

/// Reads one `\n`-terminated line, trimming `\r` and rejecting lines longer
/// than [`MAX_LINE_LEN`]. Returns `Ok(None)` on a stream that ends before a
/// newline arrives.
pub fn read_trimmed_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = Vec::new();
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            line.extend_from_slice(&buf[..pos]);
            reader.consume(pos + 1);
            break;
        }
        let len = buf.len();
        line.extend_from_slice(buf);
        reader.consume(len);
        if line.len() > MAX_LINE_LEN {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "line too long"));
        }
    }

    line.retain(|&b| b != b'\r');
    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

/// Renders the `EULER` family reply line.
pub fn render_euler_reply(result: &Result<Vec<Node>, NotEulerian>) -> String {
    match result {
        Ok(circuit) => {
            let mut out = String::from("OK YES path:");
            for v in circuit.iter().take(CIRCUIT_PRINT_LIMIT) {
                out.push(' ');
                out.push_str(&v.to_string());
            }
            if circuit.len() > CIRCUIT_PRINT_LIMIT {
                out.push_str(" ...");
            }
            out
        }
        Err(reason) => format!("OK NO reason: {reason}"),
    }
}

/// Renders the `ALG` family reply line.
pub fn render_alg_reply(algo: Algorithm, result: &AlgoResult) -> String {
    format!("OK {} {}", algo.name(), result.text)
}

/// Renders a protocol error reply line.
pub fn render_error(error: &ProtoError) -> String {
    format!("ERR {error}")
}
