//! Hyprland-specific implementations.
//!
//! This module provides the concrete
//! [`WindowManager`](crate::traits::WindowManager) backend, powered by
//! Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod wm;
