use std::net::TcpListener;

use anyhow::Result;
use graphd::server::{pipeline::PipelineServer, Shutdown};

fn usage_and_exit(code: i32) -> ! {
    eprintln!("Usage: graphd-pipeline [-p <port>]");
    std::process::exit(code);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let mut port = 5559u16;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-p" | "--port" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                port = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    let listener = TcpListener::bind(("0.0.0.0", port))?;
    let server = PipelineServer::start(listener, Shutdown::new())?;
    server.join();
    Ok(())
}
