//! # Follow command line
//!
//! Interactive prompt sending telecommands to the follow executable.
//!
//! Usage: `follow_cli [endpoint]`, the endpoint defaults to `tcp://127.0.0.1:5022`.

use color_eyre::{eyre::WrapErr, Result};
use rustyline::{error::ReadlineError, DefaultEditor};
use structopt::StructOpt;

use comms_if::{
    net::{zmq, MonitoredSocket, SocketOptions},
    tc::{FollowTc, TcResponse},
};

const PROMPT: &str = "follow $ ";
const HISTORY_PATH: &str = "data/history.txt";
const DEFAULT_TC_ENDPOINT: &str = "tcp://127.0.0.1:5022";

/// How long to wait for the executable to respond.
const RESPONSE_TIMEOUT_MS: i32 = 1000;

fn main() -> Result<()> {
    color_eyre::install()?;

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_TC_ENDPOINT));

    let ctx = zmq::Context::new();

    // Relaxed and correlated so a lost reply doesn't lock the socket up
    let socket_options = SocketOptions {
        block_on_first_connect: false,
        connect_timeout: 1000,
        linger: 1,
        recv_timeout: RESPONSE_TIMEOUT_MS,
        send_timeout: 10,
        req_correlate: true,
        req_relaxed: true,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::REQ, socket_options, &endpoint)
        .wrap_err("Could not create the telecommand socket")?;

    println!("Sending telecommands to {}, type \"help\" for a list of commands", endpoint);

    let mut rl = DefaultEditor::new().wrap_err("Could not start the prompt")?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("Unhandled error: {:?}", e);
                break
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str()).ok();

        let tc = match parse(&line) {
            Ok(tc) => tc,
            // Includes the help and usage text
            Err(e) => {
                println!("{}", e.message);
                continue;
            }
        };

        match send_tc(&socket, &tc) {
            Ok(TcResponse::Ok) => println!("{:?}: Ok", tc),
            Ok(r) => println!("{:?}: rejected ({:?})", tc, r),
            Err(e) => println!("{:?}: {}", tc, e),
        }

        if tc == FollowTc::Shutdown {
            break;
        }
    }

    if let Err(e) = rl.save_history(HISTORY_PATH) {
        println!("Could not save history: {}", e);
    }

    println!("Exiting...");

    Ok(())
}

/// Parse one line of user input into a telecommand.
fn parse(line: &str) -> Result<FollowTc, structopt::clap::Error> {
    FollowTc::from_iter_safe(std::iter::once("follow").chain(line.split_whitespace()))
}

/// Send a telecommand and wait for the response.
fn send_tc(socket: &MonitoredSocket, tc: &FollowTc) -> Result<TcResponse> {
    if !socket.connected() {
        println!("Warning: not connected to the follow executable yet");
    }

    let tc_str = serde_json::to_string(tc).wrap_err("Could not serialize the TC")?;

    socket.send(&tc_str, 0).wrap_err("Could not send the TC")?;

    let response_str = socket.recv_string(0)
        .wrap_err("No response from the follow executable")?
        .map_err(|_| color_eyre::eyre::eyre!("The response was not valid UTF-8"))?;

    serde_json::from_str(&response_str).wrap_err("Could not parse the response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse("ping").unwrap(), FollowTc::Heartbeat);
        assert_eq!(parse("  shutdown  ").unwrap(), FollowTc::Shutdown);
        assert!(parse("drive 1.0").is_err());
    }
}
