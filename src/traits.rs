//! Core traits that decouple niri-parity from any specific window manager,
//! process table, or transport mechanism.
//!
//! Every concrete backend (Hyprland, `/proc`, a Unix-socket listener, a test
//! harness, …) implements one of these traits.  The
//! [`Engine`](crate::engine::Engine) only depends on these abstractions.

use crate::command::{Command, Rect, Reply, WindowIdentity};
use std::sync::mpsc;

/// Abstraction over the window manager that owns the windows, workspaces
/// and monitors.
///
/// Window and workspace handles are opaque to the engine; it only compares
/// workspaces for equality and passes handles back in.  The host must never
/// hand out a handle for a window that no longer exists from
/// [`windows`](WindowManager::windows); a window that vanishes *during* an
/// operation surfaces as an `Err` from whichever call touches it.
pub trait WindowManager {
    /// Handle to a live window.
    type Window: Clone;
    /// Handle to a workspace.
    type Workspace: Clone + PartialEq;
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Every window the window manager currently knows about, in its
    /// enumeration order.
    fn windows(&self) -> Result<Vec<Self::Window>, Self::Error>;

    /// Class, instance and application id of `window`.  Fields the host
    /// cannot determine are left empty.
    fn identity(&self, window: &Self::Window) -> WindowIdentity;

    /// Process id owning `window`, or `0` if unknown.
    fn pid(&self, window: &Self::Window) -> u32;

    /// Workspace `window` lives on, or `None` if it is on all of them or
    /// unknown.
    fn window_workspace(&self, window: &Self::Window) -> Option<Self::Workspace>;

    fn is_minimized(&self, window: &Self::Window) -> bool;

    /// Identifier of the monitor `window` is shown on.
    fn monitor(&self, window: &Self::Window) -> i32;

    fn active_workspace(&self) -> Result<Self::Workspace, Self::Error>;

    /// Workspace at zero-based `index`, or `None` if there is no such
    /// workspace.
    fn workspace_by_index(&self, index: usize) -> Option<Self::Workspace>;

    fn move_window_to_workspace(
        &self,
        window: &Self::Window,
        workspace: &Self::Workspace,
    ) -> Result<(), Self::Error>;

    /// Switch to `workspace`.
    fn activate_workspace(&self, workspace: &Self::Workspace, timestamp: u32) -> Result<(), Self::Error>;

    fn unminimize(&self, window: &Self::Window) -> Result<(), Self::Error>;

    /// Raise and focus `window`.
    fn activate_window(&self, window: &Self::Window, timestamp: u32) -> Result<(), Self::Error>;

    /// Timestamp of the current input event, for focus-stealing checks.
    fn current_timestamp(&self) -> u32;

    /// The window holding keyboard focus, if any.
    fn focused_window(&self) -> Option<Self::Window>;

    /// Usable area of `monitor`, excluding panels and docks.
    fn monitor_work_area(&self, monitor: i32) -> Result<Rect, Self::Error>;

    fn frame_rect(&self, window: &Self::Window) -> Result<Rect, Self::Error>;

    /// Move and resize `window` so that its frame covers `rect`.
    fn set_frame_rect(&self, window: &Self::Window, rect: Rect) -> Result<(), Self::Error>;

    /// Leave any maximized or fullscreen state on both axes.
    fn unmaximize(&self, window: &Self::Window) -> Result<(), Self::Error>;
}

/// Read access to the command line of running processes.
pub trait ProcessTable {
    /// Raw command-line record of `pid` (NUL-separated arguments), or
    /// `None` if it cannot be read.
    fn cmdline(&self, pid: u32) -> Option<Vec<u8>>;
}

/// A command together with the channel its [`Reply`] must be sent on.
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub reply: mpsc::Sender<Reply>,
}

impl Request {
    /// Create a request and the receiver its reply will arrive on.
    pub fn new(command: Command) -> (Self, mpsc::Receiver<Reply>) {
        let (reply, rx) = mpsc::channel();
        (Self { command, reply }, rx)
    }
}

//  Command Source

/// A source of [`Request`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel, …) and forward parsed commands into the provided
/// [`mpsc::Sender`].  The engine answers each request on its own reply
/// channel; the source is responsible for relaying that answer back to
/// its caller.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Request`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error>;
}
