//! Target resolution: deciding whether a window is the one a target string
//! names.
//!
//! A target is a loosely specified application identifier (`spotify`,
//! `org.keepassxc.KeePassXC`, `brave-youtube.com__-Default`, …).  It is
//! checked against a window with an ordered list of [`Strategy`]s; the
//! first one that succeeds decides the match.  All comparisons are
//! case-insensitive.
//!
//! The identity fields come first.  The command line of the owning process
//! is the last resort: browser app windows and Electron wrappers often
//! share a generic class, and their launch flags are the only thing that
//! tells them apart.

use crate::cmdline::CmdlineCache;
use crate::traits::ProcessTable;
use crate::window::WindowProps;
use std::fmt;

const DESKTOP_SUFFIX: &str = ".desktop";

/// Targets shorter than this never match a whole command-line token.
const MIN_TOKEN_TARGET_LEN: usize = 4;

/// One way of matching a target against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Window class equals the target.
    Class,
    /// Class instance equals the target.
    Instance,
    /// Application id equals the target.
    AppId,
    /// Application id equals the target with `.desktop` appended.
    AppIdDesktop,
    /// The owning process's command line names the target.
    Cmdline,
}

impl Strategy {
    pub const DEFAULT_ORDER: &'static [Strategy] = &[
        Strategy::Class,
        Strategy::Instance,
        Strategy::AppId,
        Strategy::AppIdDesktop,
        Strategy::Cmdline,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Class => write!(f, "class"),
            Strategy::Instance => write!(f, "instance"),
            Strategy::AppId => write!(f, "app-id"),
            Strategy::AppIdDesktop => write!(f, "app-id.desktop"),
            Strategy::Cmdline => write!(f, "cmdline"),
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// `target` with a `.desktop` suffix, unless it already has one.
pub fn with_desktop_suffix(target: &str) -> String {
    if target.to_lowercase().ends_with(DESKTOP_SUFFIX) {
        target.to_string()
    } else {
        format!("{}{}", target, DESKTOP_SUFFIX)
    }
}

/// Whether a process command line identifies `target`.
///
/// `home` is the user's home directory; it anchors the isolated browser
/// profile convention `<home>/.brave/isolated/<target>`.  An empty `home`
/// disables that check.
pub fn cmdline_matches(cmdline: &str, target: &str, home: &str) -> bool {
    let cmd = cmdline.to_lowercase();
    if cmd.is_empty() {
        return false;
    }
    let t = target.to_lowercase();

    if t.chars().count() >= MIN_TOKEN_TARGET_LEN {
        let suffix = format!("/{}", t);
        if cmd.split_whitespace().any(|tok| tok == t || tok.ends_with(&suffix)) {
            return true;
        }
    }

    let mut needles = vec![
        format!("--class={}", t),
        format!("--class {}", t),
        format!("--name={}", t),
        format!("--name {}", t),
    ];
    // Without a home directory the profile path cannot be anchored.
    if !home.is_empty() {
        let isolated = format!("{}/.brave/isolated/{}", home.to_lowercase(), t);
        needles.push(format!("--user-data-dir={}", isolated));
        needles.push(format!("--user-data-dir {}", isolated));
    }
    needles.iter().any(|needle| cmd.contains(needle.as_str()))
}

/// Matches targets against windows using an ordered strategy list.
pub struct TargetResolver<'a, P: ProcessTable> {
    cache: &'a CmdlineCache<P>,
    home: &'a str,
    order: &'a [Strategy],
}

impl<'a, P: ProcessTable> TargetResolver<'a, P> {
    /// Resolver using [`Strategy::DEFAULT_ORDER`].
    pub fn new(cache: &'a CmdlineCache<P>, home: &'a str) -> Self {
        Self::with_order(cache, home, Strategy::DEFAULT_ORDER)
    }

    pub fn with_order(cache: &'a CmdlineCache<P>, home: &'a str, order: &'a [Strategy]) -> Self {
        Self { cache, home, order }
    }

    fn check(&self, strategy: Strategy, target: &str, props: &WindowProps) -> bool {
        let id = &props.identity;
        match strategy {
            Strategy::Class => eq_ignore_case(&id.class, target),
            Strategy::Instance => eq_ignore_case(&id.instance, target),
            Strategy::AppId => eq_ignore_case(&id.app_id, target),
            Strategy::AppIdDesktop => eq_ignore_case(&id.app_id, &with_desktop_suffix(target)),
            Strategy::Cmdline => {
                props.pid != 0 && cmdline_matches(&self.cache.lookup(props.pid), target, self.home)
            }
        }
    }

    /// The first strategy that matches `target` against `props`.
    pub fn matching_strategy(&self, target: &str, props: &WindowProps) -> Option<Strategy> {
        self.order
            .iter()
            .copied()
            .find(|s| self.check(*s, target, props))
    }

    pub fn matches(&self, target: &str, props: &WindowProps) -> bool {
        self.matching_strategy(target, props).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::WindowIdentity;
    use crate::test_utils::FakeProcs;

    const HOME: &str = "/home/Kenan";

    fn cache(entries: &[(u32, &str)]) -> CmdlineCache<FakeProcs> {
        CmdlineCache::new(FakeProcs::with(entries))
    }

    fn props(class: &str, instance: &str, app_id: &str, pid: u32) -> WindowProps {
        WindowProps {
            identity: WindowIdentity {
                class: class.into(),
                instance: instance.into(),
                app_id: app_id.into(),
            },
            pid,
        }
    }

    #[test]
    fn identity_fields_match_case_insensitively() {
        let c = cache(&[]);
        let r = TargetResolver::new(&c, HOME);
        assert_eq!(r.matching_strategy("spotify", &props("Spotify", "", "", 0)), Some(Strategy::Class));
        assert_eq!(r.matching_strategy("VLC", &props("", "vlc", "", 0)), Some(Strategy::Instance));
        assert_eq!(
            r.matching_strategy("ORG.KEEPASSXC.KEEPASSXC", &props("", "", "org.keepassxc.KeePassXC", 0)),
            Some(Strategy::AppId)
        );
        assert_eq!(
            r.matching_strategy("org.telegram", &props("", "", "Org.Telegram.DESKTOP", 0)),
            Some(Strategy::AppIdDesktop)
        );
    }

    #[test]
    fn class_wins_over_later_strategies() {
        let c = cache(&[(5, "/usr/bin/spotify")]);
        let r = TargetResolver::new(&c, HOME);
        assert_eq!(r.matching_strategy("spotify", &props("spotify", "spotify", "spotify", 5)), Some(Strategy::Class));
        // Short-circuit: the command line was never consulted.
        assert!(c.is_empty());
    }

    #[test]
    fn desktop_suffix_is_not_doubled() {
        assert_eq!(with_desktop_suffix("firefox"), "firefox.desktop");
        assert_eq!(with_desktop_suffix("firefox.desktop"), "firefox.desktop");
        assert_eq!(with_desktop_suffix("Firefox.DESKTOP"), "Firefox.DESKTOP");

        let c = cache(&[]);
        let r = TargetResolver::new(&c, HOME);
        assert!(r.matches("firefox.desktop", &props("", "", "firefox.desktop", 0)));
        assert!(!r.matches("firefox.desktop", &props("", "", "firefox.desktop.desktop", 0)));
    }

    #[test]
    fn no_identity_and_no_pid_never_matches() {
        let c = cache(&[]);
        let r = TargetResolver::new(&c, HOME);
        assert!(!r.matches("spotify", &props("", "", "", 0)));
        assert!(c.is_empty());
    }

    #[test]
    fn cmdline_token_and_path_suffix() {
        assert!(cmdline_matches("/opt/Ferdium/ferdium --no-sandbox", "ferdium", HOME));
        assert!(cmdline_matches("WHATSIE", "whatsie", HOME));
        assert!(cmdline_matches("/usr/bin/Transmission-GTK x", "transmission-gtk", HOME));
        assert!(!cmdline_matches("/usr/bin/ferdium-beta", "ferdium", HOME));
        assert!(!cmdline_matches("", "ferdium", HOME));
    }

    #[test]
    fn short_targets_skip_token_equality() {
        assert!(!cmdline_matches("/usr/bin/vlc --started-from-file", "vlc", HOME));
        assert!(!cmdline_matches("ai", "ai", HOME));
        assert!(cmdline_matches("brave --class=Ai --app=https://x", "ai", HOME));
        assert!(cmdline_matches("electron --name AI", "ai", HOME));
    }

    #[test]
    fn class_and_name_flags_match_any_length() {
        assert!(cmdline_matches("electron --class=WebCord", "webcord", HOME));
        assert!(cmdline_matches("electron --class WebCord", "WEBCORD", HOME));
        assert!(cmdline_matches("app --name=Kenp", "kenp", HOME));
        assert!(cmdline_matches("app --name kenp", "Kenp", HOME));
    }

    #[test]
    fn isolated_profile_directory() {
        let cmd = "/usr/bin/brave --user-data-dir=/home/kenan/.brave/isolated/brave-youtube.com__-default --app=https://youtube.com";
        assert!(cmdline_matches(cmd, "brave-youtube.com__-Default", HOME));
        let spaced = "/usr/bin/brave --user-data-dir /HOME/KENAN/.brave/isolated/compecta";
        assert!(cmdline_matches(spaced, "CompecTA", HOME));
    }

    #[test]
    fn isolated_profile_is_anchored_at_home() {
        // Too short for token matching, so only the profile flag can match.
        let cmd = "brave --user-data-dir=/home/kenan/.brave/isolated/ai --app=x";
        assert!(cmdline_matches(cmd, "Ai", HOME));
        assert!(!cmdline_matches(cmd, "Ai", "/home/other"));
    }

    #[test]
    fn unknown_home_skips_isolated_profile() {
        let cmd = "brave --user-data-dir=/.brave/isolated/ai --app=x";
        assert!(!cmdline_matches(cmd, "Ai", ""));
        // Launch flags still work without a home directory.
        assert!(cmdline_matches("electron --class=Ai", "ai", ""));
    }

    #[test]
    fn resolver_falls_back_to_cmdline() {
        let c = cache(&[(300, "/usr/lib/brave --class=TmuxKenp --app=x")]);
        let r = TargetResolver::new(&c, HOME);
        assert_eq!(
            r.matching_strategy("tmuxkenp", &props("Brave-browser", "brave-browser", "", 300)),
            Some(Strategy::Cmdline)
        );
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn custom_order_restricts_strategies() {
        let c = cache(&[(1, "--class=spotify")]);
        let order = [Strategy::AppId];
        let r = TargetResolver::with_order(&c, HOME, &order);
        assert!(!r.matches("spotify", &props("Spotify", "", "", 1)));
        assert!(r.matches("spotify", &props("", "", "SPOTIFY", 1)));
    }
}
