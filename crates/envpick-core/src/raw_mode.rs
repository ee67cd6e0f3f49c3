#![forbid(unsafe_code)]

//! Scoped raw-mode acquisition.
//!
//! [`RawModeGuard`] enters raw mode on creation and leaves it on drop, so the
//! terminal is restored on every exit path of the code that holds it:
//! normal return, `?`, and panic unwinding. The real terminal backend
//! ([`TerminalRawMode`]) adds two more paths:
//!
//! - a process-wide panic hook that restores the terminal before the previous
//!   hook prints, which also covers `panic = "abort"` builds;
//! - on Unix, a signal thread that restores the terminal on SIGINT/SIGTERM
//!   and exits with `128 + signal`. It is started on the first raw-mode entry
//!   and lives until the process ends, so a signal that arrives after raw
//!   mode was left still terminates the process.
//!
//! # Contract
//!
//! - **Exclusive ownership**: a guard borrows its [`RawModeControl`] mutably,
//!   so only one guard can hold a backend at a time.
//! - **Idempotent release**: [`RawModeGuard::release`] restores once; later
//!   calls and the eventual drop are no-ops.
//! - **Non-fatal restoration**: a failed restore prints a warning to stderr
//!   and is never returned as an error. A terminal that cannot be restored
//!   must not also cost the caller a valid selection.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Whether [`TerminalRawMode`] currently holds the terminal.
static RAW_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Something that can switch a terminal in and out of raw mode.
pub trait RawModeControl {
    /// Enter raw mode, saving the previous terminal state.
    fn enter(&mut self) -> io::Result<()>;

    /// Restore the state saved by [`enter`](Self::enter).
    fn leave(&mut self) -> io::Result<()>;
}

impl<C: RawModeControl + ?Sized> RawModeControl for &mut C {
    fn enter(&mut self) -> io::Result<()> {
        (**self).enter()
    }

    fn leave(&mut self) -> io::Result<()> {
        (**self).leave()
    }
}

/// Raw mode on the process's controlling terminal, via Crossterm.
///
/// Crossterm keeps the saved `termios` state internally and applies it to
/// standard input when it is a TTY, `/dev/tty` otherwise.
#[derive(Debug, Default)]
pub struct TerminalRawMode {
    _private: (),
}

impl TerminalRawMode {
    /// Create a backend that has not entered raw mode yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RawModeControl for TerminalRawMode {
    fn enter(&mut self) -> io::Result<()> {
        install_panic_hook();
        #[cfg(unix)]
        {
            if let Err(_err) = install_signal_cleanup() {
                crate::warn!(error = %_err, "signal cleanup unavailable");
            }
        }

        crossterm::terminal::enable_raw_mode()?;
        RAW_ACTIVE.store(true, Ordering::SeqCst);
        crate::info!("terminal raw mode enabled");
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        RAW_ACTIVE.store(false, Ordering::SeqCst);
        crossterm::terminal::disable_raw_mode()?;
        crate::info!("terminal raw mode disabled");
        io::stdout().flush()
    }
}

/// Holds raw mode for as long as it lives.
#[derive(Debug)]
pub struct RawModeGuard<C: RawModeControl> {
    control: C,
    restored: bool,
}

impl<C: RawModeControl> RawModeGuard<C> {
    /// Enter raw mode through `control`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if raw mode cannot be entered. Nothing
    /// needs releasing in that case.
    pub fn acquire(mut control: C) -> io::Result<Self> {
        control.enter()?;
        Ok(Self {
            control,
            restored: false,
        })
    }

    /// Restore the terminal now instead of at drop.
    ///
    /// Safe to call more than once. Failures are reported on stderr.
    pub fn release(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        if let Err(err) = self.control.leave() {
            crate::warn!(error = %err, "failed to restore terminal");
            eprintln!("Warning: failed to restore terminal: {err}");
        }
    }

    /// Whether the terminal has been restored.
    #[must_use]
    pub const fn is_restored(&self) -> bool {
        self.restored
    }
}

impl<C: RawModeControl> Drop for RawModeGuard<C> {
    fn drop(&mut self) {
        self.release();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = io::stdout().flush();
}

/// Install the SIGINT/SIGTERM thread once per process.
///
/// The thread outlives every raw-mode session: signal-hook keeps its handler
/// registered even after a `Signals` is closed, which would leave a later
/// Ctrl-C in the numbered prompt with no effect at all.
#[cfg(unix)]
fn install_signal_cleanup() -> io::Result<()> {
    static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();
    INSTALLED
        .get_or_init(|| spawn_signal_thread().map_err(|err| err.to_string()))
        .clone()
        .map_err(io::Error::other)
}

#[cfg(unix)]
fn spawn_signal_thread() -> io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
    std::thread::Builder::new()
        .name("envpick-signals".into())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                if RAW_ACTIVE.load(Ordering::SeqCst) {
                    crate::warn!(signal, "termination signal received, restoring terminal");
                    best_effort_cleanup();
                }
                std::process::exit(signal_exit_code(signal));
            }
        })?;
    Ok(())
}

/// Shell convention for a process ended by `signal`.
#[cfg(unix)]
const fn signal_exit_code(signal: i32) -> i32 {
    128 + signal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        enters: usize,
        leaves: usize,
        fail_enter: bool,
        fail_leave: bool,
    }

    impl RawModeControl for Recorder {
        fn enter(&mut self) -> io::Result<()> {
            if self.fail_enter {
                return Err(io::Error::other("not a tty"));
            }
            self.enters += 1;
            Ok(())
        }

        fn leave(&mut self) -> io::Result<()> {
            self.leaves += 1;
            if self.fail_leave {
                return Err(io::Error::other("tcsetattr failed"));
            }
            Ok(())
        }
    }

    #[test]
    fn drop_restores_once() {
        let mut rec = Recorder::default();
        {
            let guard = RawModeGuard::acquire(&mut rec).unwrap();
            assert!(!guard.is_restored());
        }
        assert_eq!(rec.enters, 1);
        assert_eq!(rec.leaves, 1);
    }

    #[test]
    fn release_is_idempotent() {
        let mut rec = Recorder::default();
        {
            let mut guard = RawModeGuard::acquire(&mut rec).unwrap();
            guard.release();
            guard.release();
            assert!(guard.is_restored());
        }
        assert_eq!(rec.leaves, 1);
    }

    #[test]
    fn failed_acquire_leaves_nothing_to_release() {
        let mut rec = Recorder {
            fail_enter: true,
            ..Recorder::default()
        };
        assert!(RawModeGuard::acquire(&mut rec).is_err());
        assert_eq!(rec.enters, 0);
        assert_eq!(rec.leaves, 0);
    }

    #[test]
    fn failed_restore_is_not_fatal() {
        let mut rec = Recorder {
            fail_leave: true,
            ..Recorder::default()
        };
        {
            let mut guard = RawModeGuard::acquire(&mut rec).unwrap();
            guard.release();
            assert!(guard.is_restored());
        }
        assert_eq!(rec.leaves, 1);
    }

    #[test]
    fn early_return_restores() {
        fn work(rec: &mut Recorder) -> io::Result<()> {
            let _guard = RawModeGuard::acquire(rec)?;
            Err(io::Error::other("read failed"))
        }

        let mut rec = Recorder::default();
        assert!(work(&mut rec).is_err());
        assert_eq!(rec.leaves, 1);
    }

    #[test]
    fn panic_unwind_restores() {
        let mut rec = Recorder::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = RawModeGuard::acquire(&mut rec).unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(rec.leaves, 1);
    }

    #[cfg(unix)]
    #[test]
    fn signal_cleanup_stays_installed() {
        assert!(install_signal_cleanup().is_ok());
        // A second session reuses the thread from the first.
        assert!(install_signal_cleanup().is_ok());
        assert!(!RAW_ACTIVE.load(Ordering::SeqCst));
    }

    #[cfg(unix)]
    #[test]
    fn signal_exit_codes() {
        assert_eq!(signal_exit_code(SIGINT), 130);
        assert_eq!(signal_exit_code(SIGTERM), 143);
    }
}
