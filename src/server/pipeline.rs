/*!
Active-object pipeline.

Every stage is an [`ActiveObject`]: a private unbounded queue plus one
dedicated thread looping "block until an item arrives, pop it, run the
handler". Posting *moves* the item into the queue, so at any instant exactly
one component owns a request and handoff can never race.

The flow is: acceptor (parses the request, blocking on GRAPH-mode edge
lines) → dispatcher (routes by algorithm) → one of four algorithm workers →
responder (writes the reply and closes the connection). Protocol errors and
`EULER` requests short-circuit from the acceptor straight to the responder,
which therefore owns every reply in this architecture.

The queues buffer without backpressure: under sustained overload memory
grows unboundedly. This mirrors the architecture's known resource gap and is
deliberately not papered over here.
*/

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use tracing::{debug, info, warn};

use super::{send_line, Shutdown};
use crate::{
    algo::{eulerian_circuit, Algorithm},
    graph::AdjGraph,
    proto::{
        build_graph, parse_request_line, read_trimmed_line, render_alg_reply, render_error,
        render_euler_reply, Family, Params,
    },
};

/// A component with a private queue and a dedicated processing thread.
///
/// [`ActiveObject::stop`] disconnects the queue, which makes the thread
/// drain all already-posted items through the handler before exiting, and
/// then joins it (best-effort delivery of in-flight work).
pub struct ActiveObject<T: Send + 'static> {
    tx: Option<Sender<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> ActiveObject<T> {
    /// Spawns the processing thread with a fixed handler.
    pub fn spawn<F>(name: &str, mut handler: F) -> io::Result<Self>
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = unbounded::<T>();
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            // iterating the receiver blocks for new items and, once all
            // senders are gone, yields the remaining queue before ending
            for item in rx {
                handler(item);
            }
        })?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Moves an item into the queue. Items posted after `stop` are dropped.
    pub fn post(&self, item: T) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(item);
        }
    }

    /// A detached handle for posting from another component's handler.
    fn sender(&self) -> Sender<T> {
        self.tx.as_ref().expect("active object not stopped").clone()
    }

    /// Stops the component: no further posts, drain the queue, join the
    /// thread. Idempotent.
    pub fn stop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl<T: Send + 'static> Drop for ActiveObject<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A parsed request travelling towards an algorithm worker. Owns the
/// connection until the worker converts it into a [`Response`].
pub struct Request {
    pub stream: TcpStream,
    pub algo: Algorithm,
    pub graph: AdjGraph,
    pub params: Params,
}

/// A finished reply travelling to the responder, which writes it and closes
/// the connection by dropping the stream.
pub struct Response {
    pub stream: TcpStream,
    pub line: String,
}

/// The six active objects: dispatcher, one worker per algorithm, responder.
pub struct Pipeline {
    dispatcher: ActiveObject<Request>,
    scc: ActiveObject<Request>,
    ham: ActiveObject<Request>,
    maxclique: ActiveObject<Request>,
    numcliques: ActiveObject<Request>,
    responder: ActiveObject<Response>,
}

impl Pipeline {
    /// Wires up and starts all stages.
    pub fn start() -> io::Result<Self> {
        let responder = ActiveObject::spawn("responder", |mut resp: Response| {
            if let Err(e) = send_line(&mut resp.stream, &resp.line) {
                warn!(error = %e, "failed to send reply");
            }
        })?;

        let worker = |name: &str, respond: Sender<Response>| {
            ActiveObject::spawn(name, move |req: Request| {
                let result = req.algo.run(&req.graph, &req.params);
                let _ = respond.send(Response {
                    stream: req.stream,
                    line: render_alg_reply(req.algo, &result),
                });
            })
        };
        let scc = worker("algo-scc", responder.sender())?;
        let ham = worker("algo-ham", responder.sender())?;
        let maxclique = worker("algo-maxclique", responder.sender())?;
        let numcliques = worker("algo-numcliques", responder.sender())?;

        let routes = [
            (Algorithm::SccCount, scc.sender()),
            (Algorithm::HamCycle, ham.sender()),
            (Algorithm::MaxClique, maxclique.sender()),
            (Algorithm::NumMaxCliques, numcliques.sender()),
        ];
        let dispatcher = ActiveObject::spawn("dispatcher", move |req: Request| {
            let route = routes
                .iter()
                .find(|(algo, _)| *algo == req.algo)
                .map(|(_, tx)| tx)
                .expect("every algorithm has a worker");
            let _ = route.send(req);
        })?;

        Ok(Self {
            dispatcher,
            scc,
            ham,
            maxclique,
            numcliques,
            responder,
        })
    }

    /// Hands a parsed request to the dispatcher.
    pub fn dispatch(&self, request: Request) {
        self.dispatcher.post(request);
    }

    /// Hands a ready reply directly to the responder.
    pub fn respond(&self, response: Response) {
        self.responder.post(response);
    }

    /// Stops the stages upstream-first so every stage drains work posted by
    /// its predecessors before the successor goes away.
    pub fn stop(&mut self) {
        self.dispatcher.stop();
        self.scc.stop();
        self.ham.stop();
        self.maxclique.stop();
        self.numcliques.stop();
        self.responder.stop();
    }
}

/// The acceptor plus pipeline, presented with the same surface as the
/// leader-follower pool.
pub struct PipelineServer {
    acceptor: Option<JoinHandle<()>>,
    shutdown: Shutdown,
    local_addr: SocketAddr,
}

impl PipelineServer {
    /// Starts the pipeline and the acceptor thread serving `listener`.
    pub fn start(listener: TcpListener, shutdown: Shutdown) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "pipeline server starting");

        let mut pipeline = Pipeline::start()?;
        let acceptor_shutdown = shutdown.clone();
        let acceptor = thread::Builder::new().name("acceptor".to_string()).spawn(move || {
            for conn in listener.incoming() {
                if acceptor_shutdown.is_requested() {
                    break;
                }
                match conn {
                    Ok(stream) => accept_one(stream, &pipeline),
                    Err(e) => warn!(error = %e, "accept failed"),
                }
            }
            pipeline.stop();
        })?;

        Ok(Self {
            acceptor: Some(acceptor),
            shutdown,
            local_addr,
        })
    }

    /// The bound address of the listening socket.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Requests shutdown and wakes the blocked acceptor with a loopback
    /// connect so it can observe the token.
    pub fn shutdown(&self) {
        self.shutdown.request();
        let _ = TcpStream::connect(self.local_addr);
    }

    /// Waits for the acceptor (and thereby all stages) to exit.
    pub fn join(mut self) {
        if let Some(handle) = self.acceptor.take() {
            let _ = handle.join();
        }
    }
}

/// Reads and parses one request on the acceptor thread and feeds the
/// pipeline. GRAPH-mode edge lines are read here, synchronously: a slow
/// client in GRAPH mode blocks admission of further connections.
fn accept_one(stream: TcpStream, pipeline: &Pipeline) {
    let mut reader = io::BufReader::new(stream);

    let line = match read_trimmed_line(&mut reader) {
        Ok(Some(line)) => line,
        Ok(None) => return, // peer closed without sending a request
        Err(e) => {
            warn!(error = %e, "dropping connection with unreadable request");
            return;
        }
    };

    match parse_request_line(&line) {
        Err(e) => pipeline.respond(Response {
            stream: reader.into_inner(),
            line: render_error(&e),
        }),
        Ok(header) => match build_graph(&header, &mut reader) {
            Err(e) => pipeline.respond(Response {
                stream: reader.into_inner(),
                line: render_error(&e),
            }),
            Ok(graph) => match header.family {
                // the Euler engine is linear-time; run it here and let the
                // responder own the reply like everywhere else
                Family::Euler => pipeline.respond(Response {
                    stream: reader.into_inner(),
                    line: render_euler_reply(&eulerian_circuit(&graph)),
                }),
                Family::Alg(algo) => {
                    debug!(algo = algo.name(), "dispatching request");
                    pipeline.dispatch(Request {
                        stream: reader.into_inner(),
                        algo,
                        graph,
                        params: header.params,
                    });
                }
            },
        },
    }
}
