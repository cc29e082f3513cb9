//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (scripts, key-bind helpers, the `niri-parity-msg`
//! client, etc.) can connect to the socket, send newline-delimited JSON
//! commands, and read one reply line per command.

pub mod listener;
