//! In-memory host doubles shared by the unit tests.
//!
//! [`MockWm`] keeps its windows in a `RefCell` and records every mutating
//! call in order, so tests can assert on both the final state and the
//! sequence of host commands.

use crate::command::{Rect, WindowIdentity};
use crate::traits::{ProcessTable, WindowManager};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct MockWindow {
    pub identity: WindowIdentity,
    pub pid: u32,
    /// Zero-based workspace index, `None` for "on all workspaces".
    pub workspace: Option<usize>,
    pub minimized: bool,
    pub monitor: i32,
    pub frame: Rect,
}

impl MockWindow {
    pub fn class(class: &str, pid: u32) -> Self {
        Self {
            identity: WindowIdentity {
                class: class.into(),
                ..Default::default()
            },
            pid,
            workspace: Some(0),
            ..Default::default()
        }
    }

    pub fn app_id(app_id: &str, pid: u32) -> Self {
        Self {
            identity: WindowIdentity {
                app_id: app_id.into(),
                ..Default::default()
            },
            pid,
            workspace: Some(0),
            ..Default::default()
        }
    }

    pub fn on(mut self, workspace: usize) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn minimized(mut self) -> Self {
        self.minimized = true;
        self
    }

    pub fn frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self
    }
}

/// Host calls that change something, in the order they were made.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Move { window: usize, workspace: usize },
    ActivateWorkspace(usize),
    Unminimize(usize),
    Activate(usize),
    Unmaximize(usize),
    SetFrame(usize, Rect),
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

/// A window manager with `workspaces` workspaces and a single monitor.
#[derive(Debug)]
pub struct MockWm {
    pub windows: RefCell<Vec<MockWindow>>,
    pub workspaces: usize,
    pub active: Cell<usize>,
    pub focused: Option<usize>,
    pub work_area: Rect,
    pub calls: RefCell<Vec<Call>>,
    pub list_calls: Cell<u32>,
    /// Windows whose moves are rejected.
    pub reject_moves: HashSet<usize>,
    pub reject_frame: Option<String>,
}

impl MockWm {
    pub fn new(windows: Vec<MockWindow>) -> Self {
        Self {
            windows: RefCell::new(windows),
            workspaces: 9,
            active: Cell::new(0),
            focused: None,
            work_area: Rect::new(0, 32, 2000, 1000),
            calls: RefCell::new(Vec::new()),
            list_calls: Cell::new(0),
            reject_moves: HashSet::new(),
            reject_frame: None,
        }
    }

    pub fn workspace_of(&self, window: usize) -> Option<usize> {
        self.windows.borrow()[window].workspace
    }

    pub fn frame_of(&self, window: usize) -> Rect {
        self.windows.borrow()[window].frame
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl WindowManager for MockWm {
    type Window = usize;
    type Workspace = usize;
    type Error = MockError;

    fn windows(&self) -> Result<Vec<usize>, MockError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok((0..self.windows.borrow().len()).collect())
    }

    fn identity(&self, window: &usize) -> WindowIdentity {
        self.windows.borrow()[*window].identity.clone()
    }

    fn pid(&self, window: &usize) -> u32 {
        self.windows.borrow()[*window].pid
    }

    fn window_workspace(&self, window: &usize) -> Option<usize> {
        self.workspace_of(*window)
    }

    fn is_minimized(&self, window: &usize) -> bool {
        self.windows.borrow()[*window].minimized
    }

    fn monitor(&self, window: &usize) -> i32 {
        self.windows.borrow()[*window].monitor
    }

    fn active_workspace(&self) -> Result<usize, MockError> {
        Ok(self.active.get())
    }

    fn workspace_by_index(&self, index: usize) -> Option<usize> {
        (index < self.workspaces).then_some(index)
    }

    fn move_window_to_workspace(&self, window: &usize, workspace: &usize) -> Result<(), MockError> {
        if self.reject_moves.contains(window) {
            return Err(MockError(format!("window {} is gone", window)));
        }
        self.record(Call::Move {
            window: *window,
            workspace: *workspace,
        });
        self.windows.borrow_mut()[*window].workspace = Some(*workspace);
        Ok(())
    }

    fn activate_workspace(&self, workspace: &usize, _timestamp: u32) -> Result<(), MockError> {
        self.record(Call::ActivateWorkspace(*workspace));
        self.active.set(*workspace);
        Ok(())
    }

    fn unminimize(&self, window: &usize) -> Result<(), MockError> {
        self.record(Call::Unminimize(*window));
        self.windows.borrow_mut()[*window].minimized = false;
        Ok(())
    }

    fn activate_window(&self, window: &usize, _timestamp: u32) -> Result<(), MockError> {
        self.record(Call::Activate(*window));
        Ok(())
    }

    fn current_timestamp(&self) -> u32 {
        0
    }

    fn focused_window(&self) -> Option<usize> {
        self.focused
    }

    fn monitor_work_area(&self, _monitor: i32) -> Result<Rect, MockError> {
        Ok(self.work_area)
    }

    fn frame_rect(&self, window: &usize) -> Result<Rect, MockError> {
        Ok(self.frame_of(*window))
    }

    fn set_frame_rect(&self, window: &usize, rect: Rect) -> Result<(), MockError> {
        if let Some(reason) = &self.reject_frame {
            return Err(MockError(reason.clone()));
        }
        self.record(Call::SetFrame(*window, rect));
        self.windows.borrow_mut()[*window].frame = rect;
        Ok(())
    }

    fn unmaximize(&self, window: &usize) -> Result<(), MockError> {
        self.record(Call::Unmaximize(*window));
        Ok(())
    }
}

/// Process table serving fixed command lines (space-separated here,
/// NUL-separated on the way out).
#[derive(Debug, Default)]
pub struct FakeProcs(pub HashMap<u32, String>);

impl FakeProcs {
    pub fn with(entries: &[(u32, &str)]) -> Self {
        Self(entries.iter().map(|(pid, cmd)| (*pid, cmd.to_string())).collect())
    }
}

impl ProcessTable for FakeProcs {
    fn cmdline(&self, pid: u32) -> Option<Vec<u8>> {
        self.0.get(&pid).map(|s| s.replace(' ', "\0").into_bytes())
    }
}
