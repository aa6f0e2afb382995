//! One-shot line-protocol client: sends a single request line (given on the
//! command line), forwards any GRAPH-mode edge lines from stdin, and prints
//! the server's reply.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

use anyhow::{Context, Result};

fn usage_and_exit(code: i32) -> ! {
    eprintln!("Usage: graphd-client [-H <host>] [-p <port>] \"<request line>\"");
    eprintln!("  GRAPH-mode edge lines are read from stdin.");
    std::process::exit(code);
}

fn main() -> Result<()> {
    let mut host = "127.0.0.1".to_string();
    let mut port = 5558u16;
    let mut request: Option<String> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-H" | "--host" => {
                host = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2)).clone();
                i += 2;
            }
            "-p" | "--port" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                port = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            line if request.is_none() => {
                request = Some(line.to_string());
                i += 1;
            }
            _ => usage_and_exit(2),
        }
    }
    let request = request.unwrap_or_else(|| usage_and_exit(2));

    let mut stream =
        TcpStream::connect((host.as_str(), port)).context("failed to connect to server")?;
    stream.write_all(request.as_bytes())?;
    stream.write_all(b"\n")?;

    // GRAPH mode expects the edge lines to follow on the same connection
    if request.contains(" GRAPH ") {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            stream.write_all(line.as_bytes())?;
            stream.write_all(b"\n")?;
        }
    }

    let mut reply = String::new();
    BufReader::new(stream)
        .read_line(&mut reply)
        .context("failed to read reply")?;
    print!("{reply}");
    Ok(())
}
