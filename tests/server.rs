//! End-to-end tests: both server architectures, both protocol families,
//! concurrent clients over loopback TCP.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use graphd::server::{
    leader_follower::LeaderFollowerPool, pipeline::PipelineServer, Shutdown,
};

fn roundtrip(addr: SocketAddr, request: &str, edge_lines: &[&str]) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(request.as_bytes()).unwrap();
    stream.write_all(b"\n").unwrap();
    for line in edge_lines {
        stream.write_all(line.as_bytes()).unwrap();
        stream.write_all(b"\n").unwrap();
    }
    // half-close so a server waiting for more edge lines sees end-of-stream
    stream.shutdown(std::net::Shutdown::Write).unwrap();

    let mut reply = String::new();
    let mut reader = BufReader::new(stream);
    reader.read_line(&mut reply).unwrap();

    // exactly one reply line, then the server closes the connection
    let mut rest = String::new();
    assert_eq!(reader.read_line(&mut rest).unwrap(), 0);

    reply.trim_end().to_string()
}

fn protocol_conformance(addr: SocketAddr) {
    // ALG family, RANDOM mode
    assert_eq!(
        roundtrip(addr, "ALG SCC_COUNT RANDOM n=5 m=0 directed=1", &[]),
        "OK SCC_COUNT SCC count=5"
    );

    // ALG family, GRAPH mode with edge lines
    assert_eq!(
        roundtrip(
            addr,
            "ALG SCC_COUNT GRAPH n=5 m=4 directed=1",
            &["0 1", "1 2", "2 0", "3 4"],
        ),
        "OK SCC_COUNT SCC count=3"
    );
    assert_eq!(
        roundtrip(
            addr,
            "ALG SCC_COUNT GRAPH n=5 m=4",
            &["0 1", "1 2", "2 0", "3 4"],
        ),
        "OK SCC_COUNT Graph undirected; connected components=2"
    );

    // Hamiltonian search: positive, precheck-negative and skipped instances
    let reply = roundtrip(
        addr,
        "ALG HAM_CYCLE GRAPH n=4 m=4",
        &["0 1", "1 2", "2 3", "3 0"],
    );
    assert!(
        reply.starts_with("OK HAM_CYCLE YES Hamilton cycle: "),
        "unexpected reply: {reply}"
    );
    assert_eq!(
        roundtrip(addr, "ALG HAM_CYCLE GRAPH n=4 m=2", &["0 1", "1 2"]),
        "OK HAM_CYCLE NO Hamilton cycle (quick precheck)"
    );
    assert_eq!(
        roundtrip(addr, "ALG HAM_CYCLE RANDOM n=30 m=60", &[]),
        "OK HAM_CYCLE HAM: n=30 exceeds limit=18 (skip)"
    );

    // a one-step budget can only ever time out on a feasible instance
    assert_eq!(
        roundtrip(
            addr,
            "ALG HAM_CYCLE GRAPH n=4 m=4 step_limit=1",
            &["0 1", "1 2", "2 3", "3 0"],
        ),
        "OK HAM_CYCLE HAM: TIMEOUT"
    );

    // cliques: triangle with pendant path
    let reply = roundtrip(
        addr,
        "ALG MAXCLIQUE GRAPH n=5 m=5",
        &["0 1", "1 2", "0 2", "2 3", "3 4"],
    );
    assert!(
        reply.starts_with("OK MAXCLIQUE MaxClique size=3 example:"),
        "unexpected reply: {reply}"
    );
    assert_eq!(
        roundtrip(
            addr,
            "ALG NUM_MAXCLIQUES GRAPH n=5 m=5",
            &["0 1", "1 2", "0 2", "2 3", "3 4"],
        ),
        "OK NUM_MAXCLIQUES Maximal cliques count=3"
    );

    // EULER family
    assert_eq!(
        roundtrip(
            addr,
            "EULER GRAPH n=4 m=4",
            &["0 1", "1 2", "2 3", "3 0"],
        ),
        "OK YES path: 0 1 2 3 0"
    );
    assert_eq!(
        roundtrip(addr, "EULER GRAPH n=3 m=2", &["0 1", "1 2"]),
        "OK NO reason: A vertex has odd degree (all degrees must be even)."
    );

    // protocol errors
    assert_eq!(
        roundtrip(addr, "ALG NOPE RANDOM n=3 m=1", &[]),
        "ERR unknown algorithm"
    );
    assert_eq!(
        roundtrip(addr, "HELLO", &[]),
        "ERR expected 'ALG <NAME> <MODE>'"
    );
    assert_eq!(roundtrip(addr, "ALG SCC_COUNT RANDOM m=1", &[]), "ERR missing n");
    assert_eq!(
        roundtrip(addr, "ALG SCC_COUNT GRAPH n=3 m=2", &["0 1"]),
        "ERR premature end while reading edges"
    );
    assert_eq!(
        roundtrip(addr, "ALG SCC_COUNT GRAPH n=3 m=2", &["0 1", "zero one"]),
        "ERR bad edge format"
    );
    assert_eq!(roundtrip(addr, "EULER RANDOM m=2", &[]), "ERR n must be > 0");
}

/// Every one of K concurrent clients gets exactly one reply and a closed
/// connection, regardless of arrival order.
fn concurrent_clients(addr: SocketAddr, k: usize) {
    let handles: Vec<_> = (0..k)
        .map(|i| {
            thread::spawn(move || {
                let request = match i % 3 {
                    0 => format!("ALG SCC_COUNT RANDOM n=50 m=120 seed={i} directed=1"),
                    1 => format!("ALG MAXCLIQUE RANDOM n=30 m=200 seed={i}"),
                    _ => format!("EULER RANDOM n=20 m=40 seed={i}"),
                };
                let reply = roundtrip(addr, &request, &[]);
                assert!(
                    reply.starts_with("OK "),
                    "client {i} got unexpected reply: {reply}"
                );
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn leader_follower_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let pool = LeaderFollowerPool::start(listener, 4, Shutdown::new()).unwrap();
    let addr = pool.local_addr();

    protocol_conformance(addr);
    concurrent_clients(addr, 16);

    pool.shutdown();
    pool.join();
}

#[test]
fn pipeline_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let server = PipelineServer::start(listener, Shutdown::new()).unwrap();
    let addr = server.local_addr();

    protocol_conformance(addr);
    concurrent_clients(addr, 16);

    server.shutdown();
    server.join();
}

#[test]
fn random_mode_is_deterministic_across_connections() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let pool = LeaderFollowerPool::start(listener, 2, Shutdown::new()).unwrap();
    let addr = pool.local_addr();

    let a = roundtrip(addr, "EULER RANDOM n=12 m=30 seed=99", &[]);
    let b = roundtrip(addr, "EULER RANDOM n=12 m=30 seed=99", &[]);
    assert_eq!(a, b);

    pool.shutdown();
    pool.join();
}
