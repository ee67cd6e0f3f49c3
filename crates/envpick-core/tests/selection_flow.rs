//! End-to-end selection sessions over in-memory streams.
//!
//! Each test drives a [`Selector`] with scripted key bytes and a recording
//! raw-mode backend, then checks the chosen profile, the terminal output and
//! that raw mode was left exactly as often as it was entered.

use std::io::{self, Cursor};

use envpick_core::raw_mode::RawModeControl;
use envpick_core::truncate::display_width;
use envpick_core::{Capabilities, HeadlessHints, Profile, SelectConfig, SelectError, Selector};

#[derive(Debug, Default)]
struct RecordingRawMode {
    log: Vec<&'static str>,
}

impl RawModeControl for RecordingRawMode {
    fn enter(&mut self) -> io::Result<()> {
        self.log.push("enter");
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        self.log.push("leave");
        Ok(())
    }
}

fn environments() -> Vec<Profile> {
    vec![
        Profile::new("local", "http://localhost:8080", ""),
        Profile::new(
            "production-us-east-primary",
            "https://api.production.example.com/v1/messages",
            "claude-3-5-sonnet-20241022",
        ),
        Profile::new("staging", "https://staging.example.com", "haiku"),
    ]
}

fn run(
    keys: &[u8],
    caps: Capabilities,
) -> (Result<Profile, SelectError>, String, Vec<&'static str>) {
    let mut raw = RecordingRawMode::default();
    let mut out = Vec::new();
    let profiles = environments();
    let result = {
        let mut selector = Selector::new(Cursor::new(keys), &mut out, &mut raw, caps);
        selector.select(&profiles).cloned()
    };
    (result, String::from_utf8_lossy(&out).into_owned(), raw.log)
}

#[test]
fn arrow_navigation_picks_third_entry() {
    let (result, out, log) = run(b"\x1b[B\x1b[B\r", Capabilities::interactive(100, 30));
    assert_eq!(result.unwrap().name, "staging");
    assert_eq!(log, ["enter", "leave"]);
    assert!(out.contains("► local"));
}

#[test]
fn one_key_per_read_repaints_each_step() {
    let mut raw = RecordingRawMode::default();
    let mut out = Vec::new();
    let profiles = environments();
    let chosen = {
        let mut selector = Selector::new(
            Cursor::new(&b"\x1b[A\r"[..]),
            &mut out,
            &mut raw,
            Capabilities::interactive(100, 30),
        )
        .with_config(SelectConfig {
            read_chunk: 3,
            ..SelectConfig::default()
        });
        selector.select(&profiles).cloned()
    };
    assert_eq!(chosen.unwrap().name, "staging");

    let out = String::from_utf8_lossy(&out);
    assert!(out.contains("► local"));
    assert!(out.contains("► staging"));
}

#[test]
fn narrow_terminal_lines_never_overflow() {
    for width in [10u16, 20, 30, 45, 60] {
        let (result, out, _) = run(b"\x1b[B\r", Capabilities::interactive(width, 5));
        assert_eq!(result.unwrap().name, "production-us-east-primary");
        for segment in out.split(['\r', '\n']) {
            assert!(
                display_width(segment) <= usize::from(width),
                "width {width}: {segment:?}"
            );
        }
    }
}

#[test]
fn cancellation_restores_before_returning() {
    let (result, out, log) = run(b"\x1b[B\x03", Capabilities::raw_without_ansi(80, 24));
    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(log, ["enter", "leave"]);
    assert!(out.ends_with("\r\nSelection cancelled.\n"));
}

#[test]
fn numbered_selection_after_cooked_terminal() {
    let (result, out, log) = run(b"2\n", Capabilities::cooked(80, 24));
    assert_eq!(result.unwrap().name, "production-us-east-primary");
    assert!(log.is_empty());
    assert!(out.contains("2. production-us-east-primary"));
    assert!(out.contains("Enter number (1-3): "));
}

#[test]
fn numbered_out_of_range_reports_bounds() {
    let (result, _, _) = run(b"7\n", Capabilities::cooked(80, 24));
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "invalid selection 7 - must be between 1 and 3");
}

#[test]
fn headless_redirected_output_selects_first() {
    let profiles = environments();
    let mut out = Vec::new();
    let mut raw = RecordingRawMode::default();
    let chosen = {
        let mut selector = Selector::new(
            Cursor::new(&b""[..]),
            &mut out,
            &mut raw,
            Capabilities::piped(),
        )
        .with_hints(HeadlessHints {
            stdout_redirected: true,
            ci: false,
        });
        selector.select(&profiles).cloned()
    };
    assert_eq!(chosen.unwrap().name, "local");
    assert!(raw.log.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&out),
        "Headless mode: using first environment 'local'\n"
    );
}

#[test]
fn empty_list_is_an_error() {
    let mut selector = Selector::new(
        Cursor::new(&b"1\n"[..]),
        Vec::new(),
        RecordingRawMode::default(),
        Capabilities::interactive(80, 24),
    );
    let err = selector.select(&[]).unwrap_err();
    assert!(matches!(err, SelectError::NoProfiles));
    assert!(!err.is_cancelled());
}
