//! [`WindowManager`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Hyprland has no notion of minimized windows, input timestamps or
//! `.desktop` application ids, so:
//!
//! * windows are never minimized and `unminimize` is a no-op,
//! * the timestamp is always `0`,
//! * the application id reported is the window class (the Wayland
//!   `app_id`), and the class instance is `initialClass`.

use crate::command::{Rect, WindowIdentity};
use crate::traits::WindowManager;
use log::debug;
use serde::Deserialize;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed window manager.
///
/// Windows are identified by their client address (`0x…`), workspaces by
/// their numeric id.  Workspace index `i` is workspace id `i + 1`.
///
/// All communication happens over Hyprland's IPC socket
/// (`$XDG_RUNTIME_DIR/hypr/<instance>/.socket.sock`).  No child processes
/// are spawned.
pub struct HyprlandWm {
    workspaces: usize,
    /// Client list from the last `j/clients` query.
    snapshot: RefCell<Vec<ClientJson>>,
}

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl Default for HyprlandWm {
    fn default() -> Self {
        Self::new()
    }
}

impl HyprlandWm {
    /// Create a new handle exposing ten workspaces.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self::with_workspaces(10)
    }

    /// Create a handle exposing `workspaces` workspaces (ids `1..=workspaces`).
    pub fn with_workspaces(workspaces: usize) -> Self {
        Self {
            workspaces,
            snapshot: RefCell::new(Vec::new()),
        }
    }

    fn refresh(&self) -> Result<(), HyprlandWmError> {
        let clients = query_clients()?;
        *self.snapshot.borrow_mut() = clients;
        Ok(())
    }

    /// Look `address` up in the snapshot, refreshing it once on a miss.
    fn client(&self, address: &str) -> Option<ClientJson> {
        let cached = self.snapshot.borrow().iter().find(|c| c.address == address).cloned();
        if cached.is_some() {
            return cached;
        }
        if let Err(e) = self.refresh() {
            debug!("cannot refresh clients: {}", e);
            return None;
        }
        self.snapshot.borrow().iter().find(|c| c.address == address).cloned()
    }

    /// Query `address` fresh, for geometry that must not be stale.
    fn fresh_client(&self, address: &str) -> Result<ClientJson, HyprlandWmError> {
        self.refresh()?;
        self.snapshot
            .borrow()
            .iter()
            .find(|c| c.address == address)
            .cloned()
            .ok_or_else(|| HyprlandWmError(format!("window {} is gone", address)))
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandWmError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandWmError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandWmError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and parse the answer.
fn ipc_json<T: for<'de> Deserialize<'de>>(data_command: &str) -> Result<T, HyprlandWmError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    serde_json::from_str(&json).map_err(|e| HyprlandWmError(format!("parse {}: {}", data_command, e)))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandWmError> {
    debug!("dispatch {}", args);
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("dispatch error: {}", response)))
    }
}

fn query_clients() -> Result<Vec<ClientJson>, HyprlandWmError> {
    ipc_json("clients")
}

//  Minimal serde structs for the JSON we care about

#[derive(Debug, Clone, Deserialize)]
struct WorkspaceRef {
    id: i32,
}

/// Subset of the JSON object returned by `j/clients`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientJson {
    address: String,
    #[serde(default = "yes")]
    mapped: bool,
    at: [i32; 2],
    size: [i32; 2],
    workspace: WorkspaceRef,
    #[serde(default)]
    floating: bool,
    /// `bool` on older Hyprland, fullscreen mode number on newer ones.
    #[serde(default)]
    fullscreen: serde_json::Value,
    monitor: i64,
    #[serde(default)]
    class: String,
    #[serde(default)]
    initial_class: String,
    #[serde(default)]
    pid: i64,
}

fn yes() -> bool {
    true
}

impl ClientJson {
    fn is_fullscreen(&self) -> bool {
        match &self.fullscreen {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
            _ => false,
        }
    }

    fn frame(&self) -> Rect {
        Rect::new(self.at[0], self.at[1], self.size[0], self.size[1])
    }
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    id: i64,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    /// Space taken by bars and docks: left, top, right, bottom.
    #[serde(default)]
    reserved: [i32; 4],
}

fn unit_scale() -> f64 {
    1.0
}

impl MonitorJson {
    /// Logical monitor rectangle minus reserved edges.
    fn work_area(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let width = (self.width as f64 / scale).round() as i32;
        let height = (self.height as f64 / scale).round() as i32;
        let [left, top, right, bottom] = self.reserved;
        Rect::new(
            self.x + left,
            self.y + top,
            (width - left - right).max(0),
            (height - top - bottom).max(0),
        )
    }
}

/// Subset of the JSON object returned by `j/activewindow`.
#[derive(Deserialize)]
struct ActiveWindowJson {
    address: String,
}

//  WindowManager implementation

impl WindowManager for HyprlandWm {
    type Window = String;
    type Workspace = i32;
    type Error = HyprlandWmError;

    fn windows(&self) -> Result<Vec<String>, Self::Error> {
        self.refresh()?;
        Ok(self
            .snapshot
            .borrow()
            .iter()
            .filter(|c| c.mapped)
            .map(|c| c.address.clone())
            .collect())
    }

    fn identity(&self, window: &String) -> WindowIdentity {
        self.client(window)
            .map(|c| WindowIdentity {
                app_id: c.class.clone(),
                class: c.class,
                instance: c.initial_class,
            })
            .unwrap_or_default()
    }

    fn pid(&self, window: &String) -> u32 {
        self.client(window)
            .and_then(|c| u32::try_from(c.pid).ok())
            .unwrap_or(0)
    }

    fn window_workspace(&self, window: &String) -> Option<i32> {
        self.client(window).map(|c| c.workspace.id)
    }

    fn is_minimized(&self, _window: &String) -> bool {
        false
    }

    fn monitor(&self, window: &String) -> i32 {
        self.client(window)
            .and_then(|c| i32::try_from(c.monitor).ok())
            .unwrap_or(0)
    }

    fn active_workspace(&self) -> Result<i32, Self::Error> {
        let ws: WorkspaceRef = ipc_json("activeworkspace")?;
        Ok(ws.id)
    }

    fn workspace_by_index(&self, index: usize) -> Option<i32> {
        if index < self.workspaces {
            i32::try_from(index + 1).ok()
        } else {
            None
        }
    }

    fn move_window_to_workspace(&self, window: &String, workspace: &i32) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("movetoworkspacesilent {},address:{}", workspace, window))
    }

    fn activate_workspace(&self, workspace: &i32, _timestamp: u32) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("workspace {}", workspace))
    }

    fn unminimize(&self, _window: &String) -> Result<(), Self::Error> {
        Ok(())
    }

    fn activate_window(&self, window: &String, _timestamp: u32) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("focuswindow address:{}", window))
    }

    fn current_timestamp(&self) -> u32 {
        0
    }

    fn focused_window(&self) -> Option<String> {
        let json = ipc_request("j/activewindow").ok()?;
        // Hyprland returns an empty object `{}` when no window is focused.
        if json.trim() == "{}" {
            return None;
        }
        let w: ActiveWindowJson = serde_json::from_str(&json).ok()?;
        Some(w.address)
    }

    fn monitor_work_area(&self, monitor: i32) -> Result<Rect, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        monitors
            .iter()
            .find(|m| m.id == i64::from(monitor))
            .map(MonitorJson::work_area)
            .ok_or_else(|| HyprlandWmError(format!("unknown monitor id: {}", monitor)))
    }

    fn frame_rect(&self, window: &String) -> Result<Rect, Self::Error> {
        Ok(self.fresh_client(window)?.frame())
    }

    fn set_frame_rect(&self, window: &String, rect: Rect) -> Result<(), Self::Error> {
        // Tiled windows ignore exact geometry; float it first.
        if !self.fresh_client(window)?.floating {
            ipc_dispatch(&format!("setfloating address:{}", window))?;
        }
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},address:{}",
            rect.width, rect.height, window
        ))?;
        ipc_dispatch(&format!(
            "movewindowpixel exact {} {},address:{}",
            rect.x, rect.y, window
        ))
    }

    fn unmaximize(&self, window: &String) -> Result<(), Self::Error> {
        if !self.fresh_client(window)?.is_fullscreen() {
            return Ok(());
        }
        ipc_dispatch(&format!("focuswindow address:{}", window))?;
        ipc_dispatch("fullscreenstate 0 0")
    }
}
