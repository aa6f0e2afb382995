/*!
Leader-follower thread pool.

All workers share one listening socket, but only the current *leader* blocks
in `accept`. Leadership is materialized as a baton living in a single-slot
channel: holding the baton is being the leader, and handing it back is the
promotion of the next follower. The crucial ordering is that the baton is
returned immediately after `accept` returns and *before* the accepted
connection is processed; otherwise admission of new connections would stall
behind request processing and the pool would degrade to a single effective
worker.
*/

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use super::{handle_connection, Shutdown};

/// The leadership token. Exactly one exists per pool.
struct Baton;

/// How long followers wait for the baton before polling the shutdown token.
const BATON_POLL: Duration = Duration::from_millis(100);

/// A fixed pool of worker threads multiplexing one listening socket via
/// leader-follower handoff. Each accepted connection is handled end-to-end
/// (parse, run, reply, close) on the thread that accepted it.
pub struct LeaderFollowerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: Shutdown,
    local_addr: SocketAddr,
}

impl LeaderFollowerPool {
    /// Spawns `threads` workers (at least one) serving `listener`.
    pub fn start(
        listener: TcpListener,
        threads: usize,
        shutdown: Shutdown,
    ) -> io::Result<Self> {
        let threads = threads.max(1);
        let local_addr = listener.local_addr()?;
        info!(%local_addr, threads, "leader-follower pool starting");

        let (baton_tx, baton_rx) = bounded::<Baton>(1);
        baton_tx
            .send(Baton)
            .expect("fresh single-slot channel accepts the baton");

        let mut handles = Vec::with_capacity(threads);
        for id in 0..threads {
            let listener = listener.try_clone()?;
            let baton_tx = baton_tx.clone();
            let baton_rx = baton_rx.clone();
            let shutdown = shutdown.clone();
            let handle = thread::Builder::new()
                .name(format!("lf-worker-{id}"))
                .spawn(move || worker_loop(id, &listener, &baton_tx, &baton_rx, &shutdown))?;
            handles.push(handle);
        }

        Ok(Self {
            handles,
            shutdown,
            local_addr,
        })
    }

    /// The bound address of the shared listening socket.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Requests shutdown and wakes the blocked leader with a loopback
    /// connect so it can observe the token.
    pub fn shutdown(&self) {
        self.shutdown.request();
        let _ = TcpStream::connect(self.local_addr);
    }

    /// Waits for all workers to exit.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    id: usize,
    listener: &TcpListener,
    baton_tx: &Sender<Baton>,
    baton_rx: &Receiver<Baton>,
    shutdown: &Shutdown,
) {
    loop {
        // follow: wait for the baton, polling for shutdown
        let baton = match baton_rx.recv_timeout(BATON_POLL) {
            Ok(baton) => baton,
            Err(RecvTimeoutError::Timeout) => {
                if shutdown.is_requested() {
                    return;
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => return,
        };

        if shutdown.is_requested() {
            return;
        }

        // lead: the baton holder is the only thread blocked in accept
        match listener.accept() {
            Ok((stream, peer)) => {
                if shutdown.is_requested() {
                    // the wake-up connect; keep the baton so peers exit via
                    // their shutdown poll instead of re-entering accept
                    return;
                }
                // promote a follower before touching the connection
                let _ = baton_tx.send(baton);

                debug!(worker = id, %peer, "accepted connection");
                handle_connection(stream);
            }
            Err(e) => {
                if shutdown.is_requested() {
                    return;
                }
                // transient accept failure: rotate leadership and retry later
                warn!(worker = id, error = %e, "accept failed, rotating leadership");
                let _ = baton_tx.send(baton);
                thread::yield_now();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::{BufRead, BufReader, Write};

    use super::*;

    fn request(addr: SocketAddr, line: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(line.as_bytes()).unwrap();
        stream.write_all(b"\n").unwrap();
        let mut reply = String::new();
        BufReader::new(stream).read_line(&mut reply).unwrap();
        reply.trim_end().to_string()
    }

    #[test]
    fn serves_and_shuts_down() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let pool = LeaderFollowerPool::start(listener, 3, Shutdown::new()).unwrap();
        let addr = pool.local_addr();

        assert_eq!(
            request(addr, "ALG SCC_COUNT RANDOM n=6 m=0 directed=1"),
            "OK SCC_COUNT SCC count=6"
        );

        pool.shutdown();
        pool.join();
    }
}
