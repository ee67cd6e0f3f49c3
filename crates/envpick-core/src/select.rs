#![forbid(unsafe_code)]

//! Four-tier selection state machine.
//!
//! | Tier | Entered when | Input |
//! |------|--------------|-------|
//! | [`FullInteractive`](SelectionTier::FullInteractive) | raw mode, ANSI and cursor support | arrow keys, `►` marker |
//! | [`BasicInteractive`](SelectionTier::BasicInteractive) | raw mode without ANSI | arrow keys, `*` marker |
//! | [`NumberedFallback`](SelectionTier::NumberedFallback) | TTY without raw mode, or by downgrade | one typed line |
//! | [`Headless`](SelectionTier::Headless) | standard input is not a TTY | none, first profile |
//!
//! The tier is chosen once per session. The only transitions afterwards are
//! the one-way downgrades of [`SelectionTier::downgrade`]; a session never
//! moves back up.
//!
//! # Invariants
//!
//! 1. Zero profiles fail with [`SelectError::NoProfiles`] before any I/O.
//! 2. One profile is returned before any probing, rendering or reading.
//! 3. Raw mode is held only inside an interactive tier and is restored
//!    before that tier's outcome is acted on.

use std::fmt;
use std::io::{self, BufRead, Read, StdinLock, Stdout, Write};
use std::str::FromStr;

use crate::config::SelectConfig;
use crate::error::SelectError;
use crate::key::{Key, KeyDecoder};
use crate::layout::Layout;
use crate::profile::Profile;
use crate::raw_mode::{RawModeControl, RawModeGuard, TerminalRawMode};
use crate::render::{MARKER_ARROW, MARKER_ASCII, MARKER_NONE, Renderer};
use crate::terminal_capabilities::{Capabilities, HeadlessHints};
use crate::truncate::compose_line;

const HEADER_FULL: &str = "Select environment (use ↑↓ arrows, Enter to confirm, Esc to cancel):";
const HEADER_BASIC: &str = "Select environment (use arrows, Enter to confirm, Esc to cancel):";
const NUMBERED_NOTICE: &str = "Arrow key navigation not supported, using numbered selection:";
const NUMBERED_HEADER: &str = "Select environment:";
const CANCELLED_NOTICE: &str = "Selection cancelled.";

/// Interaction mode for a selection session, most capable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionTier {
    FullInteractive,
    BasicInteractive,
    NumberedFallback,
    Headless,
}

/// Why a tier gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downgrade {
    /// Raw mode could not be entered.
    RawModeUnavailable,
    /// A key read failed or hit end of input.
    ReadFailed,
    /// No TTY, but nothing suggests an unattended run either.
    NotAutomated,
}

impl SelectionTier {
    /// Pick the starting tier for probed capabilities.
    #[must_use]
    pub const fn for_capabilities(caps: &Capabilities) -> Self {
        if !caps.is_terminal {
            Self::Headless
        } else if caps.is_fully_interactive() {
            Self::FullInteractive
        } else if caps.supports_raw_mode {
            Self::BasicInteractive
        } else {
            Self::NumberedFallback
        }
    }

    /// The tier to continue in after `reason`, if any.
    ///
    /// A failed read skips straight to numbered input: the basic tier reads
    /// the same stream and would fail the same way.
    #[must_use]
    pub const fn downgrade(self, reason: Downgrade) -> Option<Self> {
        match (self, reason) {
            (Self::FullInteractive, Downgrade::RawModeUnavailable) => Some(Self::BasicInteractive),
            (Self::BasicInteractive, Downgrade::RawModeUnavailable)
            | (Self::FullInteractive | Self::BasicInteractive, Downgrade::ReadFailed)
            | (Self::Headless, Downgrade::NotAutomated) => Some(Self::NumberedFallback),
            _ => None,
        }
    }

    /// Whether this tier reads raw key presses.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::FullInteractive | Self::BasicInteractive)
    }

    /// Marker for the selected menu line.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::FullInteractive => MARKER_ARROW,
            Self::BasicInteractive => MARKER_ASCII,
            Self::NumberedFallback | Self::Headless => MARKER_NONE,
        }
    }

    /// Header shown above the interactive menu.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::FullInteractive => HEADER_FULL,
            _ => HEADER_BASIC,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullInteractive => "full",
            Self::BasicInteractive => "basic",
            Self::NumberedFallback => "numbered",
            Self::Headless => "headless",
        }
    }
}

impl fmt::Display for SelectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tier name that is not one of `full`, `basic`, `numbered`, `headless`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTierError {
    input: String,
}

impl fmt::Display for ParseTierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown selection tier '{}' (expected full, basic, numbered or headless)",
            self.input
        )
    }
}

impl std::error::Error for ParseTierError {}

impl FromStr for SelectionTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Self::FullInteractive),
            "basic" => Ok(Self::BasicInteractive),
            "numbered" => Ok(Self::NumberedFallback),
            "headless" => Ok(Self::Headless),
            _ => Err(ParseTierError {
                input: s.to_string(),
            }),
        }
    }
}

/// Move the selection one step for an arrow key, wrapping at both ends.
///
/// Keys other than up and down leave the index unchanged.
#[must_use]
pub fn move_selection(index: usize, count: usize, key: Key) -> usize {
    if count == 0 {
        return 0;
    }
    match key {
        Key::Up => (index + count - 1) % count,
        Key::Down => (index + 1) % count,
        _ => index,
    }
}

/// Parse a numbered-tier answer into a zero-based index.
///
/// # Errors
///
/// [`SelectError::InvalidNumber`] for non-integers and
/// [`SelectError::OutOfRange`] for integers outside `1..=count`.
pub fn parse_choice(input: &str, count: usize) -> Result<usize, SelectError> {
    let input = input.trim();
    let choice: i64 = input.parse().map_err(|_| SelectError::InvalidNumber {
        input: input.to_string(),
    })?;
    match usize::try_from(choice) {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(SelectError::OutOfRange { choice, count }),
    }
}

fn short_circuit(profiles: &[Profile]) -> Option<Result<&Profile, SelectError>> {
    match profiles {
        [] => Some(Err(SelectError::NoProfiles)),
        [only] => Some(Ok(only)),
        _ => None,
    }
}

enum TierOutcome {
    Selected(usize),
    Cancelled,
    Downgrade(Downgrade),
}

/// Drives one selection session over explicit input, output and raw-mode backends.
#[derive(Debug)]
pub struct Selector<R, W, C> {
    input: R,
    output: W,
    raw: C,
    caps: Capabilities,
    hints: HeadlessHints,
    config: SelectConfig,
}

impl Selector<StdinLock<'static>, Stdout, TerminalRawMode> {
    /// A selector on the process's standard streams, probed now.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(
            io::stdin().lock(),
            io::stdout(),
            TerminalRawMode::new(),
            Capabilities::probe(),
        )
        .with_hints(HeadlessHints::detect())
    }
}

impl<R: BufRead, W: Write, C: RawModeControl> Selector<R, W, C> {
    /// Create a selector for an attended session with default configuration.
    pub fn new(input: R, output: W, raw: C, caps: Capabilities) -> Self {
        Self {
            input,
            output,
            raw,
            caps,
            hints: HeadlessHints::attended(),
            config: SelectConfig::default(),
        }
    }

    #[must_use]
    pub fn with_hints(mut self, hints: HeadlessHints) -> Self {
        self.hints = hints;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SelectConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Everything written so far.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Tier the next session starts in.
    #[must_use]
    pub fn initial_tier(&self) -> SelectionTier {
        self.config
            .force_tier
            .unwrap_or_else(|| SelectionTier::for_capabilities(&self.caps))
    }

    /// Run a selection session over `profiles`.
    ///
    /// # Errors
    ///
    /// - [`SelectError::NoProfiles`] for an empty list.
    /// - [`SelectError::Cancelled`] when the user presses Escape or Ctrl-C.
    /// - [`SelectError::InvalidNumber`] / [`SelectError::OutOfRange`] for a
    ///   bad numbered answer.
    /// - [`SelectError::Io`] when writing fails or the numbered tier finds
    ///   no input.
    pub fn select<'p>(&mut self, profiles: &'p [Profile]) -> Result<&'p Profile, SelectError> {
        if let Some(result) = short_circuit(profiles) {
            return result;
        }

        let span = crate::info_span!("select", count = profiles.len());
        let _enter = span.enter();

        let mut tier = self.initial_tier();
        crate::info!(tier = %tier, forced = self.config.force_tier.is_some(), "selection tier chosen");

        loop {
            let outcome = match tier {
                SelectionTier::FullInteractive | SelectionTier::BasicInteractive => {
                    self.run_interactive(tier, profiles)?
                }
                SelectionTier::NumberedFallback => TierOutcome::Selected(self.run_numbered(profiles)?),
                SelectionTier::Headless => self.run_headless(profiles)?,
            };

            match outcome {
                TierOutcome::Selected(index) => return Ok(&profiles[index]),
                TierOutcome::Cancelled => {
                    crate::info!("selection cancelled");
                    return Err(SelectError::Cancelled);
                }
                TierOutcome::Downgrade(reason) => {
                    let next = tier
                        .downgrade(reason)
                        .unwrap_or(SelectionTier::NumberedFallback);
                    crate::warn!(from = %tier, to = %next, reason = ?reason, "selection tier downgraded");
                    tier = next;
                }
            }
        }
    }

    fn run_interactive(
        &mut self,
        tier: SelectionTier,
        profiles: &[Profile],
    ) -> Result<TierOutcome, SelectError> {
        let mut guard = match RawModeGuard::acquire(&mut self.raw) {
            Ok(guard) => guard,
            Err(_err) => {
                crate::warn!(error = %_err, "raw mode unavailable");
                return Ok(TierOutcome::Downgrade(Downgrade::RawModeUnavailable));
            }
        };

        let mut renderer = Renderer::new(Layout::plan(&self.caps), tier.marker());
        let header = self.config.header.as_deref().unwrap_or(tier.header());
        let mut decoder = KeyDecoder::new();
        let mut buf = vec![0u8; self.config.read_chunk.max(1)];
        let mut selected = 0usize;

        let result = 'session: loop {
            if let Err(err) = renderer.render_menu(&mut self.output, profiles, selected, header) {
                break Err(SelectError::Io(err));
            }

            let n = match self.input.read(&mut buf) {
                Ok(0) => {
                    crate::warn!("end of input in interactive tier");
                    break Ok(TierOutcome::Downgrade(Downgrade::ReadFailed));
                }
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(_err) => {
                    crate::warn!(error = %_err, "key read failed");
                    break Ok(TierOutcome::Downgrade(Downgrade::ReadFailed));
                }
            };

            for key in decoder.decode(&buf[..n]) {
                match key {
                    Key::Enter => break 'session Ok(TierOutcome::Selected(selected)),
                    key if key.is_cancel() => break 'session Ok(TierOutcome::Cancelled),
                    key => selected = move_selection(selected, profiles.len(), key),
                }
            }
        };

        let finished = renderer.finish(&mut self.output);
        guard.release();
        drop(guard);

        let outcome = result?;
        finished?;
        if matches!(outcome, TierOutcome::Cancelled) {
            writeln!(self.output, "{CANCELLED_NOTICE}")?;
            self.output.flush()?;
        }
        Ok(outcome)
    }

    fn run_numbered(&mut self, profiles: &[Profile]) -> Result<usize, SelectError> {
        let layout = Layout::plan(&self.caps);

        writeln!(self.output, "{NUMBERED_NOTICE}")?;
        writeln!(self.output, "{NUMBERED_HEADER}")?;
        for (idx, profile) in profiles.iter().enumerate() {
            let prefix = format!("{}. ", idx + 1);
            writeln!(self.output, "{}", compose_line(&prefix, profile, &layout))?;
        }
        write!(self.output, "Enter number (1-{}): ", profiles.len())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SelectError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no selection entered",
            )));
        }
        parse_choice(&line, profiles.len())
    }

    fn run_headless(&mut self, profiles: &[Profile]) -> Result<TierOutcome, SelectError> {
        if !self.hints.is_automated() {
            return Ok(TierOutcome::Downgrade(Downgrade::NotAutomated));
        }
        let first = &profiles[0];
        crate::info!(
            profile = %first.name,
            stdout_redirected = self.hints.stdout_redirected,
            ci = self.hints.ci,
            "headless selection"
        );
        writeln!(
            self.output,
            "Headless mode: using first environment '{}'",
            first.name
        )?;
        self.output.flush()?;
        Ok(TierOutcome::Selected(0))
    }
}

/// Select a profile on the standard streams.
///
/// Zero or one profile is resolved without touching the terminal at all.
///
/// # Errors
///
/// See [`Selector::select`].
pub fn select_profile(profiles: &[Profile], config: SelectConfig) -> Result<&Profile, SelectError> {
    if let Some(result) = short_circuit(profiles) {
        return result;
    }
    Selector::stdio().with_config(config).select(profiles)
}
