//! Small helpers shared by the engine modules.

/// Continue-on-error combinator for best-effort host calls.
///
/// Batch operations (placement, activation) must not abort because one
/// window vanished or one host call was rejected.  `ok_or_log` turns the
/// failure into a `warn!` line and a `None`, so the caller moves on.
pub trait ResultExt {
    type Ok;
    fn ok_or_log(self, what: &str) -> Option<Self::Ok>;
}

impl<T, E: std::fmt::Display> ResultExt for Result<T, E> {
    type Ok = T;

    fn ok_or_log(self, what: &str) -> Option<T> {
        match self {
            Ok(val) => Some(val),
            Err(err) => {
                log::warn!("{} failed: {}", what, err);
                None
            }
        }
    }
}

/// Round half towards positive infinity, so `-2.5` becomes `-2` and `2.5`
/// becomes `3`.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}
