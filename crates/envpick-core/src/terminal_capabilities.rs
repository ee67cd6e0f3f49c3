#![forbid(unsafe_code)]

//! Terminal capability probing.
//!
//! Capabilities are probed once per selection session and never change
//! afterwards. Probing never fails: anything that cannot be determined falls
//! back to the most conservative answer.
//!
//! # Detection Strategy
//!
//! - TTY-ness: `isatty` on standard input.
//! - Raw mode: enter and immediately leave raw mode. Only attempted on a TTY.
//! - Size: `TIOCGWINSZ` via Crossterm. Only attempted on a TTY; a failed or
//!   zero-sized answer falls back to 80x24.
//! - ANSI/cursor: `TERM`. Unset, `dumb` and `vt5*` (VT52-class) terminals are
//!   treated as unable to interpret cursor sequences. Evaluated even when not
//!   a TTY.
//!
//! Headless detection ([`HeadlessHints`]) is kept separate because it looks
//! at standard output and CI markers rather than the input terminal.

use std::env;
use std::io::{self, IsTerminal};

/// Width used when the size query fails or is skipped.
pub const FALLBACK_WIDTH: u16 = 80;

/// Height used when the size query fails or is skipped.
pub const FALLBACK_HEIGHT: u16 = 24;

/// Environment variables whose non-empty presence marks a CI run.
const CI_MARKERS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "JENKINS_URL",
];

/// Terminal capability model.
///
/// `supports_cursor` always equals `supports_ansi`; both are kept so tier
/// selection reads the same way the capability matrix is described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Standard input is a TTY.
    pub is_terminal: bool,
    /// Raw mode can be entered and left again.
    pub supports_raw_mode: bool,
    /// The terminal interprets ANSI escape sequences.
    pub supports_ansi: bool,
    /// The terminal honours cursor addressing.
    pub supports_cursor: bool,
    /// Columns, always at least 1.
    pub width: u16,
    /// Rows, always at least 1.
    pub height: u16,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::piped()
    }
}

impl Capabilities {
    /// Probe standard input and the environment.
    #[must_use]
    pub fn probe() -> Self {
        let is_terminal = io::stdin().is_terminal();
        let term = env::var("TERM").unwrap_or_default();

        let (supports_raw_mode, size) = if is_terminal {
            (probe_raw_mode(), crossterm::terminal::size().ok())
        } else {
            (false, None)
        };

        let caps = Self::from_parts(is_terminal, supports_raw_mode, size, &term);
        crate::debug!(
            is_terminal = caps.is_terminal,
            raw = caps.supports_raw_mode,
            ansi = caps.supports_ansi,
            width = caps.width,
            height = caps.height,
            "terminal capabilities probed"
        );
        caps
    }

    /// Assemble capabilities from raw probe results.
    ///
    /// Raw-mode support and size are ignored when `is_terminal` is false.
    #[must_use]
    pub fn from_parts(
        is_terminal: bool,
        supports_raw_mode: bool,
        size: Option<(u16, u16)>,
        term: &str,
    ) -> Self {
        let supports_ansi = ansi_from_term(term);
        let (width, height) = match size {
            Some((w, h)) if is_terminal && w > 0 && h > 0 => (w, h),
            _ => (FALLBACK_WIDTH, FALLBACK_HEIGHT),
        };
        Self {
            is_terminal,
            supports_raw_mode: is_terminal && supports_raw_mode,
            supports_ansi,
            supports_cursor: supports_ansi,
            width,
            height,
        }
    }

    // ── Predefined profiles ────────────────────────────────────────────

    /// Full TTY with raw mode and ANSI support.
    #[must_use]
    pub const fn interactive(width: u16, height: u16) -> Self {
        Self {
            is_terminal: true,
            supports_raw_mode: true,
            supports_ansi: true,
            supports_cursor: true,
            width,
            height,
        }
    }

    /// TTY with raw mode but no escape-sequence support (`TERM=dumb`).
    #[must_use]
    pub const fn raw_without_ansi(width: u16, height: u16) -> Self {
        Self {
            is_terminal: true,
            supports_raw_mode: true,
            supports_ansi: false,
            supports_cursor: false,
            width,
            height,
        }
    }

    /// TTY that refuses raw mode.
    #[must_use]
    pub const fn cooked(width: u16, height: u16) -> Self {
        Self {
            is_terminal: true,
            supports_raw_mode: false,
            supports_ansi: true,
            supports_cursor: true,
            width,
            height,
        }
    }

    /// Standard input is not a TTY.
    #[must_use]
    pub const fn piped() -> Self {
        Self {
            is_terminal: false,
            supports_raw_mode: false,
            supports_ansi: false,
            supports_cursor: false,
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
        }
    }

    /// Whether every feature the full interactive tier needs is present.
    #[must_use]
    pub const fn is_fully_interactive(&self) -> bool {
        self.supports_raw_mode && self.supports_ansi && self.supports_cursor
    }
}

/// Infer ANSI support from a `TERM` value.
#[must_use]
pub fn ansi_from_term(term: &str) -> bool {
    !term.is_empty() && term != "dumb" && !term.starts_with("vt5")
}

/// Enter raw mode and leave it again straight away.
///
/// Reports unsupported if either half fails, so a terminal that could not be
/// restored is never driven in raw mode later.
fn probe_raw_mode() -> bool {
    if crossterm::terminal::is_raw_mode_enabled().unwrap_or(false) {
        // Someone else holds raw mode; the terminal clearly supports it.
        return true;
    }
    if crossterm::terminal::enable_raw_mode().is_err() {
        return false;
    }
    crossterm::terminal::disable_raw_mode().is_ok()
}

/// Signals that nobody is at the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadlessHints {
    /// Standard output is redirected to a file or pipe.
    pub stdout_redirected: bool,
    /// A well-known CI marker variable is set.
    pub ci: bool,
}

impl HeadlessHints {
    /// Detect hints from the current process.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            stdout_redirected: !io::stdout().is_terminal(),
            ci: CI_MARKERS
                .iter()
                .any(|name| env::var_os(name).is_some_and(|v| !v.is_empty())),
        }
    }

    /// Hints for a session with nothing redirected and no CI markers.
    #[must_use]
    pub const fn attended() -> Self {
        Self {
            stdout_redirected: false,
            ci: false,
        }
    }

    /// Whether the session should pick a profile without asking.
    #[must_use]
    pub const fn is_automated(&self) -> bool {
        self.stdout_redirected || self.ci
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_does_not_panic() {
        let caps = Capabilities::probe();
        assert!(caps.width > 0);
        assert!(caps.height > 0);
        assert_eq!(caps.supports_ansi, caps.supports_cursor);
    }

    #[test]
    fn ansi_rejected_for_dumb_and_vt52_class() {
        assert!(!ansi_from_term(""));
        assert!(!ansi_from_term("dumb"));
        assert!(!ansi_from_term("vt52"));
        assert!(!ansi_from_term("vt50h"));
        assert!(ansi_from_term("vt100"));
        assert!(ansi_from_term("xterm-256color"));
        assert!(ansi_from_term("linux"));
    }

    #[test]
    fn non_terminal_uses_fallback_size_and_no_raw() {
        let caps = Capabilities::from_parts(false, true, Some((200, 60)), "xterm");
        assert!(!caps.is_terminal);
        assert!(!caps.supports_raw_mode);
        assert_eq!((caps.width, caps.height), (80, 24));
        // ANSI is still evaluated for pipelines.
        assert!(caps.supports_ansi);
        assert!(caps.supports_cursor);
    }

    #[test]
    fn failed_size_query_falls_back() {
        let caps = Capabilities::from_parts(true, true, None, "xterm");
        assert_eq!((caps.width, caps.height), (80, 24));
    }

    #[test]
    fn zero_size_falls_back() {
        let caps = Capabilities::from_parts(true, true, Some((0, 0)), "xterm");
        assert_eq!((caps.width, caps.height), (80, 24));
        let caps = Capabilities::from_parts(true, true, Some((120, 0)), "xterm");
        assert_eq!((caps.width, caps.height), (80, 24));
    }

    #[test]
    fn terminal_size_is_kept() {
        let caps = Capabilities::from_parts(true, true, Some((132, 43)), "xterm");
        assert_eq!((caps.width, caps.height), (132, 43));
        assert!(caps.is_fully_interactive());
    }

    #[test]
    fn dumb_terminal_is_not_fully_interactive() {
        let caps = Capabilities::from_parts(true, true, Some((80, 24)), "dumb");
        assert!(caps.supports_raw_mode);
        assert!(!caps.supports_ansi);
        assert!(!caps.supports_cursor);
        assert!(!caps.is_fully_interactive());
        assert_eq!(caps, Capabilities::raw_without_ansi(80, 24));
    }

    #[test]
    fn predefined_profiles_keep_cursor_equal_to_ansi() {
        for caps in [
            Capabilities::interactive(80, 24),
            Capabilities::raw_without_ansi(80, 24),
            Capabilities::cooked(80, 24),
            Capabilities::piped(),
        ] {
            assert_eq!(caps.supports_ansi, caps.supports_cursor, "{caps:?}");
        }
    }

    #[test]
    fn headless_hints_combine_with_or() {
        assert!(!HeadlessHints::attended().is_automated());
        assert!(
            HeadlessHints {
                stdout_redirected: true,
                ci: false
            }
            .is_automated()
        );
        assert!(
            HeadlessHints {
                stdout_redirected: false,
                ci: true
            }
            .is_automated()
        );
    }
}
