//! Entry point for the **niri-parity** daemon.
//!
//! Spawns the Unix-socket [`CommandSource`](niri_parity::traits::CommandSource)
//! on a background thread and answers incoming requests on the main
//! thread, one at a time.

use niri_parity::cmdline::ProcFs;
use niri_parity::config::{home_dir, Config};
use niri_parity::engine::Engine;
use niri_parity::hyprland::wm::HyprlandWm;
use niri_parity::ipc::listener::UnixSocketListener;
use niri_parity::traits::{CommandSource, ProcessTable, Request, WindowManager};
use log::{error, info, warn};
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/niri-parity.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/niri-parity`).
fn config_dir() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from(".config"))
        .join("niri-parity")
}

/// Try to load the config from `$XDG_CONFIG_HOME/niri-parity/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    if !path.exists() {
        info!("no config file at {}, using defaults", path.display());
        return Config::default();
    }
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    info!(
        "{} placement rule(s), home target {:?}",
        config.rules.len(),
        config.home_target
    );

    let home = home_dir();
    info!("home directory {:?}", home);
    let engine = Engine::new(HyprlandWm::new(), ProcFs::new(), config, home);

    let (req_tx, req_rx) = mpsc::channel::<Request>();
    spawn_command_sources(req_tx);

    run_event_loop(&engine, req_rx);
}

//  Event loop

fn run_event_loop<W: WindowManager, P: ProcessTable>(
    engine: &Engine<W, P>,
    req_rx: mpsc::Receiver<Request>,
) {
    info!("niri-parity running");
    for req in req_rx {
        let reply = engine.handle(req.command);
        if req.reply.send(reply).is_err() {
            warn!("client went away before the reply was sent");
        }
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Request>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
