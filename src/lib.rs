//! **niri-parity**: target-driven window placement for a running window
//! manager.
//!
//! An external controller (a keybinding daemon, a script, a command
//! palette) names an application by a loose *target* string.  The engine
//! resolves it to a live window, brings that window to the current
//! workspace, distributes a fixed roster of applications across numbered
//! workspaces, and cycles/sets/toggles the focused window's width as a
//! fraction of its monitor's work area.
//!
//! # Architecture
//!
//! The crate is organised around three core traits:
//!
//! * [`traits::WindowManager`]: abstracts window enumeration, workspaces
//!   and geometry so the engine is not coupled to any specific compositor.
//! * [`traits::ProcessTable`]: abstracts reading process command lines.
//! * [`traits::CommandSource`]: abstracts the transport that delivers
//!   requests (a Unix socket, a test harness, …) so the main loop is not
//!   coupled to any specific IPC mechanism.
//!
//! Concrete implementations live in [`hyprland`] (Hyprland IPC),
//! [`cmdline`] (`/proc`) and [`ipc`] (Unix-socket command listener).

pub mod cmdline;
pub mod command;
pub mod config;
pub mod engine;
pub mod hyprland;
pub mod ipc;
pub mod placement;
pub mod resolver;
pub mod traits;
pub mod util;
pub mod width;
pub mod window;

#[cfg(test)]
pub(crate) mod test_utils;
