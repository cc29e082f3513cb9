//! Placement rules: distributing a fixed roster of applications across
//! numbered workspaces.
//!
//! Rules are applied in table order, and every rule visits every window.
//! A window matching several rules is therefore moved several times and
//! ends up on the workspace of the **last** matching rule; table order is
//! override priority.

use crate::resolver::TargetResolver;
use crate::traits::{ProcessTable, WindowManager};
use crate::util::ResultExt;
use crate::window::WindowProps;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Send windows matching `target` to workspace number `workspace`
/// (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRule {
    pub target: String,
    pub workspace: u32,
}

impl PlacementRule {
    pub fn new(target: impl Into<String>, workspace: u32) -> Self {
        Self {
            target: target.into(),
            workspace,
        }
    }

    /// Zero-based workspace index.  Workspace number `0` is treated as `1`.
    pub fn workspace_index(&self) -> usize {
        self.workspace.saturating_sub(1) as usize
    }
}

/// The built-in rule table.
pub fn default_rules() -> Vec<PlacementRule> {
    [
        ("Kenp", 1),
        ("TmuxKenp", 2),
        ("Ai", 3),
        ("CompecTA", 4),
        ("WebCord", 5),
        ("discord", 5),
        ("audacious", 5),
        ("org.telegram.desktop", 6),
        ("vlc", 6),
        ("remote-viewer", 6),
        ("transmission", 7),
        ("org.keepassxc.KeePassXC", 7),
        ("brave-youtube.com__-Default", 7),
        ("spotify", 8),
        ("ferdium", 9),
        ("com.rtosta.zapzap", 9),
        ("whatsie", 9),
    ]
    .into_iter()
    .map(|(target, ws)| PlacementRule::new(target, ws))
    .collect()
}

/// Apply `rules` to every window the host knows about.
///
/// Rules whose workspace does not exist are skipped.  A move the host
/// rejects is logged and skipped.  Returns the number of successful moves.
pub fn apply_rules<W, P>(wm: &W, resolver: &TargetResolver<'_, P>, rules: &[PlacementRule]) -> usize
where
    W: WindowManager,
    P: ProcessTable,
{
    let windows = wm.windows().ok_or_log("listing windows").unwrap_or_default();
    let props: Vec<WindowProps> = windows.iter().map(|w| WindowProps::read(wm, w)).collect();

    let mut moved = 0;
    for rule in rules {
        let Some(workspace) = wm.workspace_by_index(rule.workspace_index()) else {
            debug!("no workspace {} for rule {:?}, skipping", rule.workspace, rule.target);
            continue;
        };
        for (window, props) in windows.iter().zip(&props) {
            if !resolver.matches(&rule.target, props) {
                continue;
            }
            debug!("{:?} matches rule {} -> {}", props.identity, rule.target, rule.workspace);
            if wm
                .move_window_to_workspace(window, &workspace)
                .ok_or_log("moving window")
                .is_some()
            {
                moved += 1;
            }
        }
    }
    info!("placement: {} move(s) over {} window(s)", moved, windows.len());
    moved
}
