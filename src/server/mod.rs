/*!
# Server Architectures

Two independent thread-based architectures host the algorithm engines behind
the same line protocol:

- [`leader_follower`]: N workers share the listening socket; exactly one
  holds the leadership baton and blocks in `accept`, handing the baton to a
  peer before processing its connection end-to-end.
- [`pipeline`]: a fixed set of active objects (dispatcher, one worker per
  algorithm, responder), each with a private queue and thread; requests move
  through the stages by ownership transfer.

Both are driven by an explicit [`Shutdown`] token threaded through their
constructors; there is no process-global state.
*/

use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

pub mod leader_follower;
pub mod pipeline;

use crate::{
    algo::eulerian_circuit,
    proto::{
        build_graph, parse_request_line, read_trimmed_line, render_alg_reply, render_error,
        render_euler_reply, Family,
    },
};

/// Cooperative cancellation token shared by the components of one server.
/// Closed exactly once at shutdown; observers poll it between blocking
/// operations.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Idempotent.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Writes one reply line. Failures are reported to the caller; the
/// connection is dead either way.
pub(crate) fn send_line(stream: &mut TcpStream, line: &str) -> io::Result<()> {
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")
}

/// Handles one connection end-to-end: read the request line (and GRAPH-mode
/// edge lines), run the selected engine, write the single reply line. The
/// connection closes when the stream drops.
pub(crate) fn handle_connection(stream: TcpStream) {
    let mut reader = io::BufReader::new(stream);

    let line = match read_trimmed_line(&mut reader) {
        Ok(Some(line)) => line,
        Ok(None) => return, // peer closed without sending a request
        Err(e) => {
            warn!(error = %e, "dropping connection with unreadable request");
            return;
        }
    };

    let reply = match parse_request_line(&line) {
        Err(e) => render_error(&e),
        Ok(header) => match build_graph(&header, &mut reader) {
            Err(e) => render_error(&e),
            Ok(graph) => match header.family {
                Family::Euler => render_euler_reply(&eulerian_circuit(&graph)),
                Family::Alg(algo) => render_alg_reply(algo, &algo.run(&graph, &header.params)),
            },
        },
    };

    if let Err(e) = send_line(reader.get_mut(), &reply) {
        warn!(error = %e, "failed to send reply");
    }
}
