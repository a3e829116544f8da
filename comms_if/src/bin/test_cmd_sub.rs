//! Command subscriber test
//!
//! Connects to the follow executable's command stream and prints every command received, along
//! with how old it is.
//!
//! Usage: `test_cmd_sub [endpoint]`, the endpoint defaults to `tcp://127.0.0.1:5021`.

use chrono::Utc;
use comms_if::{
    eqpt::car::CarCmd,
    net::{zmq, MonitoredSocket, SocketOptions},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("tcp://127.0.0.1:5021"));

    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        block_on_first_connect: false,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(
        &ctx,
        zmq::SUB,
        socket_options,
        &endpoint
    )?;

    // Commands are published without a topic
    socket.set_subscribe(b"")?;

    println!("Listening for commands on {}", endpoint);

    loop {
        let msg = socket.recv_msg(0)?;

        let cmd: CarCmd = match msg.as_str().map(serde_json::from_str::<CarCmd>) {
            Some(Ok(c)) => c,
            Some(Err(e)) => {
                println!("Could not parse command: {}", e);
                continue;
            },
            None => {
                println!("Recieved a non UTF-8 message");
                continue;
            }
        };

        let age_ms = Utc::now()
            .signed_duration_since(cmd.timestamp)
            .num_milliseconds();

        println!(
            "v = {:+.3} m/s, omega = {:+.3} rad/s (stamped {} ms ago){}",
            cmd.speed_ms,
            cmd.turn_rate_rads,
            age_ms,
            if cmd.is_stop() { " STOP" } else { "" }
        );
    }
}
