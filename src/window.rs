//! Reading the matchable identity of a window.

use crate::command::WindowIdentity;
use crate::traits::WindowManager;

/// Everything the [`TargetResolver`](crate::resolver::TargetResolver)
/// may compare a target against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowProps {
    pub identity: WindowIdentity,
    /// Owning process id, `0` if unknown.
    pub pid: u32,
}

impl WindowProps {
    /// Snapshot the identity fields of `window`.
    pub fn read<W: WindowManager>(wm: &W, window: &W::Window) -> Self {
        Self {
            identity: wm.identity(window),
            pid: wm.pid(window),
        }
    }
}
