//! Commands, replies and shared types used throughout niri-parity.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every operation the engine exposes, [`Reply`] is
//! the status string each one answers with, and [`Rect`] /
//! [`WindowIdentity`] are the supporting data types.
//!
//! Callers may send the pid for `MoveHerePid` as a number or a string; the
//! daemon normalises it and rejects anything that is not a positive
//! integer.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Wire format for MoveHerePid: accepts any JSON number or a string.
///
/// Values that cannot be a process id (fractional, non-numeric, out of
/// range, `null`, booleans, arrays, objects) are carried as `0` so that the engine answers `bad-pid` for them
/// exactly as it does for an explicit zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PidArg(pub i64);

impl PidArg {
    /// Parse a pid from free-form text, mapping anything non-numeric to `0`.
    pub fn parse(s: &str) -> Self {
        PidArg(s.trim().parse().unwrap_or(0))
    }
}

impl<'de> Deserialize<'de> for PidArg {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = PidArg;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "integer or string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<PidArg, E> {
                Ok(PidArg(i64::try_from(n).unwrap_or(0)))
            }
            fn visit_i64<E>(self, n: i64) -> Result<PidArg, E> {
                Ok(PidArg(n))
            }
            fn visit_f64<E>(self, n: f64) -> Result<PidArg, E> {
                if n.is_finite() && n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
                    Ok(PidArg(n as i64))
                } else {
                    Ok(PidArg(0))
                }
            }
            fn visit_str<E>(self, s: &str) -> Result<PidArg, E>
            where
                E: DeError,
            {
                Ok(PidArg::parse(s))
            }
            fn visit_bool<E>(self, _: bool) -> Result<PidArg, E> {
                Ok(PidArg(0))
            }
            fn visit_unit<E>(self) -> Result<PidArg, E> {
                Ok(PidArg(0))
            }
            fn visit_none<E>(self) -> Result<PidArg, E> {
                Ok(PidArg(0))
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<PidArg, A::Error>
            where
                A: SeqAccess<'de>,
            {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(PidArg(0))
            }
            fn visit_map<A>(self, mut map: A) -> Result<PidArg, A::Error>
            where
                A: MapAccess<'de>,
            {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(PidArg(0))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every operation the engine exposes to the control surface.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Liveness check, answered with `pong`.
    Ping,

    /// Step the focused window to the next width preset.
    ColumnWidthCycle,

    /// Set the focused window's width to the given fraction of its
    /// monitor's work area.  Out-of-range values fall back to the
    /// preferred ratio.
    ColumnWidthSet(f64),

    /// Flip the focused window between two width ratios, keyed off its
    /// current geometry.
    ColumnWidthToggle { a: f64, b: f64 },

    /// Bring the window matching a target string to the active workspace
    /// and focus it.
    MoveHere(String),

    /// Bring the window owned by a process id to the active workspace and
    /// focus it.
    MoveHerePid(PidArg),

    /// Apply the placement rule table, then return to the home workspace
    /// and home application.
    Go,
}

/// Error from turning command-line arguments into a [`Command`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandParseError {
    #[error("no command given")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0}: missing argument <{1}>")]
    MissingArgument(&'static str, &'static str),
    #[error("{0}: invalid number {1:?}")]
    InvalidNumber(&'static str, String),
}

fn parse_ratio(verb: &'static str, arg: Option<&String>, name: &'static str) -> Result<f64, CommandParseError> {
    let raw = arg.ok_or(CommandParseError::MissingArgument(verb, name))?;
    raw.trim()
        .parse()
        .map_err(|_| CommandParseError::InvalidNumber(verb, raw.clone()))
}

impl Command {
    /// Build a command from client arguments (`move-here spotify`,
    /// `toggle 0.5 0.9`, …).  Verbs are case-insensitive.
    pub fn from_args(args: &[String]) -> Result<Self, CommandParseError> {
        let (verb, rest) = args.split_first().ok_or(CommandParseError::Empty)?;
        match verb.to_lowercase().as_str() {
            "ping" => Ok(Command::Ping),
            "go" => Ok(Command::Go),
            "cycle" => Ok(Command::ColumnWidthCycle),
            "set" => Ok(Command::ColumnWidthSet(parse_ratio("set", rest.first(), "ratio")?)),
            "toggle" => Ok(Command::ColumnWidthToggle {
                a: parse_ratio("toggle", rest.first(), "a")?,
                b: parse_ratio("toggle", rest.get(1), "b")?,
            }),
            "move-here" => rest
                .first()
                .map(|t| Command::MoveHere(t.clone()))
                .ok_or(CommandParseError::MissingArgument("move-here", "target")),
            "move-here-pid" => rest
                .first()
                .map(|p| Command::MoveHerePid(PidArg::parse(p)))
                .ok_or(CommandParseError::MissingArgument("move-here-pid", "pid")),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

/// The answer to a [`Command`].
///
/// Expected empty outcomes (no focused window, nothing matched, bad input)
/// are ordinary variants, not errors.  Only a rejected geometry change is
/// reported as [`Reply::Error`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Pong,
    Ok,
    /// Width change applied; carries the ratio that was used.
    OkRatio(f64),
    NoWindow,
    NotFound,
    BadPid,
    Error(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Pong => write!(f, "pong"),
            Reply::Ok => write!(f, "ok"),
            Reply::OkRatio(r) => write!(f, "ok:{}", r),
            Reply::NoWindow => write!(f, "no-window"),
            Reply::NotFound => write!(f, "not-found"),
            Reply::BadPid => write!(f, "bad-pid"),
            Reply::Error(e) => write!(f, "error:{}", e),
        }
    }
}

/// An on-screen rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// The matchable identity fields of a window.
///
/// Any field may be empty when the host cannot provide it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowIdentity {
    /// Window class (`WM_CLASS` class part, or the Wayland app id).
    pub class: String,
    /// Class instance (`WM_CLASS` instance part).
    pub instance: String,
    /// Owning application id, possibly with a `.desktop` suffix.
    pub app_id: String,
}
