//! Command-line client for the niri-parity daemon.
//!
//! Sends one command and prints the reply:
//!
//!     niri-parity-msg ping
//!     niri-parity-msg cycle
//!     niri-parity-msg set 0.6
//!     niri-parity-msg toggle 0.5 0.9
//!     niri-parity-msg move-here spotify
//!     niri-parity-msg move-here-pid 4242
//!     niri-parity-msg go
//!
//! Exits non-zero if the daemon cannot be reached or answers `error:…`.

use log::error;
use niri_parity::command::Command;
use niri_parity::ipc::listener::send_command;
use std::process::ExitCode;

fn socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/niri-parity.sock", runtime)
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match Command::from_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: niri-parity-msg <ping|cycle|set R|toggle A B|move-here T|move-here-pid P|go>");
            return ExitCode::from(2);
        }
    };

    let path = socket_path();
    match send_command(&path, &cmd) {
        Ok(reply) => {
            println!("{}", reply);
            if reply.starts_with("error:") {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("cannot reach daemon at {}: {}", path, e);
            ExitCode::FAILURE
        }
    }
}
