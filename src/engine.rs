//! The operation dispatcher that ties target resolution, placement and
//! width control to a window manager.
//!
//! [`Engine`] owns the host handle, the process command-line cache and the
//! configuration, and answers each [`Command`] with a [`Reply`].  It is
//! single-threaded: the caller serializes commands (the daemon funnels
//! every transport into one channel drained on the main thread).

use crate::cmdline::CmdlineCache;
use crate::command::{Command, Reply};
use crate::config::Config;
use crate::placement::apply_rules;
use crate::resolver::TargetResolver;
use crate::traits::{ProcessTable, WindowManager};
use crate::util::ResultExt;
use crate::width::{current_ratio, frame_for_ratio, select_ratio, WidthMode};
use crate::window::WindowProps;
use log::{debug, info, warn};

/// Answers commands against a [`WindowManager`].
///
/// # Typical usage
///
/// ```ignore
/// let engine = Engine::new(HyprlandWm::new(), ProcFs::new(), Config::default(), home);
/// let reply = engine.handle(Command::MoveHere("spotify".into()));
/// ```
pub struct Engine<W: WindowManager, P: ProcessTable> {
    wm: W,
    cache: CmdlineCache<P>,
    config: Config,
    home: String,
}

impl<W: WindowManager, P: ProcessTable> Engine<W, P> {
    /// Create an engine.
    ///
    /// `home` is the user's home directory, used to recognise isolated
    /// browser profiles on process command lines.
    pub fn new(wm: W, procs: P, config: Config, home: impl Into<String>) -> Self {
        Self {
            wm,
            cache: CmdlineCache::new(procs),
            config,
            home: home.into(),
        }
    }

    pub fn wm(&self) -> &W {
        &self.wm
    }

    pub fn cache(&self) -> &CmdlineCache<P> {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolver(&self) -> TargetResolver<'_, P> {
        TargetResolver::new(&self.cache, &self.home)
    }

    /// Process a single [`Command`].
    pub fn handle(&self, cmd: Command) -> Reply {
        let reply = match cmd {
            Command::Ping => self.ping(),
            Command::ColumnWidthCycle => self.column_width(WidthMode::Cycle),
            Command::ColumnWidthSet(ratio) => self.column_width(WidthMode::Set(ratio)),
            Command::ColumnWidthToggle { a, b } => self.column_width(WidthMode::Toggle(a, b)),
            Command::MoveHere(ref target) => self.move_here(target),
            Command::MoveHerePid(pid) => self.move_here_pid(pid.0),
            Command::Go => self.go(),
        };
        info!("{:?} -> {}", cmd, reply);
        reply
    }

    pub fn ping(&self) -> Reply {
        Reply::Pong
    }

    /// Resize the focused window according to `mode`.
    ///
    /// Returns [`Reply::NoWindow`] when nothing is focused and
    /// [`Reply::Error`] when the host refuses the new geometry.
    pub fn column_width(&self, mode: WidthMode) -> Reply {
        let Some(window) = self.wm.focused_window() else {
            return Reply::NoWindow;
        };

        let geometry = self
            .wm
            .monitor_work_area(self.wm.monitor(&window))
            .and_then(|wa| self.wm.frame_rect(&window).map(|frame| (wa, frame)));
        let (work_area, frame) = match geometry {
            Ok(g) => g,
            Err(e) => {
                warn!("cannot read geometry: {}", e);
                return Reply::Error(e.to_string());
            }
        };

        let ratio = select_ratio(mode, current_ratio(frame, work_area), &self.config.width);
        let target = frame_for_ratio(ratio, frame, work_area);
        debug!("{:?}: {:?} -> {:?} (ratio {})", mode, frame, target, ratio);

        self.wm.unmaximize(&window).ok_or_log("unmaximizing window");

        let applied = self
            .wm
            .set_frame_rect(&window, target)
            .and_then(|()| self.wm.activate_window(&window, self.wm.current_timestamp()));
        match applied {
            Ok(()) => Reply::OkRatio(ratio),
            Err(e) => {
                warn!("resize rejected: {}", e);
                Reply::Error(e.to_string())
            }
        }
    }

    /// Bring the window matching `target` here and focus it.
    pub fn move_here(&self, target: &str) -> Reply {
        if target.is_empty() {
            return Reply::NotFound;
        }
        let resolver = self.resolver();
        let found = self.find_preferring_active(|w| {
            let props = WindowProps::read(&self.wm, w);
            match resolver.matching_strategy(target, &props) {
                Some(strategy) => {
                    debug!("{:?} matches {:?} by {}", props.identity, target, strategy);
                    true
                }
                None => false,
            }
        });
        match found {
            Some(window) => {
                self.activate_here(&window);
                Reply::Ok
            }
            None => Reply::NotFound,
        }
    }

    /// Bring the window owned by process `pid` here and focus it.
    ///
    /// Only exact pid equality counts; identity fields and command lines
    /// are not consulted.
    pub fn move_here_pid(&self, pid: i64) -> Reply {
        let pid = match u32::try_from(pid) {
            Ok(p) if p != 0 => p,
            _ => return Reply::BadPid,
        };
        match self.find_preferring_active(|w| self.wm.pid(w) == pid) {
            Some(window) => {
                self.activate_here(&window);
                Reply::Ok
            }
            None => Reply::NotFound,
        }
    }

    /// Apply the placement rules, then return to the home workspace and
    /// bring the home target to the front.
    pub fn go(&self) -> Reply {
        apply_rules(&self.wm, &self.resolver(), &self.config.rules);

        match self.wm.workspace_by_index(self.config.home_workspace_index()) {
            Some(home) => {
                self.wm
                    .activate_workspace(&home, self.wm.current_timestamp())
                    .ok_or_log("activating home workspace");
            }
            None => warn!("home workspace {} does not exist", self.config.home_workspace),
        }

        if self.move_here(&self.config.home_target) == Reply::NotFound {
            debug!("home target {:?} not present", self.config.home_target);
        }
        Reply::Ok
    }

    /// Make `window` visible and focused on the active workspace.
    ///
    /// Each step is attempted even if an earlier one failed.  Calling this
    /// on a window that is already active and focused changes nothing.
    pub fn activate_here(&self, window: &W::Window) {
        if let Some(active) = self.wm.active_workspace().ok_or_log("querying active workspace") {
            if self.wm.window_workspace(window).is_some_and(|ws| ws != active) {
                self.wm
                    .move_window_to_workspace(window, &active)
                    .ok_or_log("moving window to active workspace");
            }
        }

        if self.wm.is_minimized(window) {
            self.wm.unminimize(window).ok_or_log("unminimizing window");
        }

        self.wm
            .activate_window(window, self.wm.current_timestamp())
            .ok_or_log("activating window");
    }

    /// First window satisfying `pred` that is on the active workspace, or
    /// else the first one in enumeration order.
    fn find_preferring_active(&self, pred: impl Fn(&W::Window) -> bool) -> Option<W::Window> {
        let windows = self.wm.windows().ok_or_log("listing windows")?;
        let active = self.wm.active_workspace().ok_or_log("querying active workspace");
        let matching: Vec<W::Window> = windows.into_iter().filter(|w| pred(w)).collect();

        let on_active = active.and_then(|active| {
            matching
                .iter()
                .find(|w| self.wm.window_workspace(w).as_ref() == Some(&active))
                .cloned()
        });
        on_active.or_else(|| matching.into_iter().next())
    }
}
