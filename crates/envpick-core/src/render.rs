#![forbid(unsafe_code)]

//! Stateful menu rendering without cursor addressing.
//!
//! The menu is drawn with nothing but carriage returns, newlines and space
//! padding, so it works on terminals that ignore escape sequences entirely.
//!
//! # Key Invariants
//!
//! 1. Every written line is padded to exactly the terminal width, so a
//!    shorter line fully overwrites a longer one.
//! 2. No written line is wider than the terminal.
//! 3. One [`Renderer`] per selection session; nothing is shared between
//!    sessions.
//!
//! # Repaint policy
//!
//! [`RenderState::update`] distinguishes content changes from selection-only
//! changes, but both currently trigger a full repaint. A partial overwrite
//! would need to move the cursor up, which cannot be done portably without
//! escape sequences.

use std::io::{self, Write};

use crate::layout::Layout;
use crate::profile::Profile;
use crate::truncate::{clamp_line, compose_line, display_width};

/// Selection marker on terminals that can show the arrow glyph.
pub const MARKER_ARROW: &str = "► ";

/// Selection marker on terminals limited to ASCII.
pub const MARKER_ASCII: &str = "* ";

/// Marker column for unselected lines.
pub const MARKER_NONE: &str = "  ";

/// Lines cleared when the terminal height is unknown.
const FALLBACK_CLEAR_LINES: usize = 25;

// ============================================================================
// TextPositioner
// ============================================================================

/// Line positioning with carriage returns and padding only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPositioner {
    width: usize,
}

impl TextPositioner {
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self { width }
    }

    /// Terminal width this positioner pads to.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn move_to_start_of_line(&self) -> &'static str {
        "\r"
    }

    /// Spaces covering a whole line.
    #[must_use]
    pub fn clear_to_end_of_line(&self) -> String {
        " ".repeat(self.width)
    }

    /// Blank the current line and return to its start.
    #[must_use]
    pub fn clear_line(&self) -> String {
        let mut out = String::with_capacity(self.width + 2);
        out.push_str(self.move_to_start_of_line());
        out.push_str(&self.clear_to_end_of_line());
        out.push_str(self.move_to_start_of_line());
        out
    }

    /// Replace the current line with `content`, padded to the full width.
    #[must_use]
    pub fn overwrite_line(&self, content: &str) -> String {
        let content = clamp_line(content, self.width);
        let padding = self.width.saturating_sub(display_width(&content));

        let mut out = String::with_capacity(content.len() + padding + 2);
        out.push_str(self.move_to_start_of_line());
        out.push_str(&content);
        out.extend(std::iter::repeat_n(' ', padding));
        out.push_str(self.move_to_start_of_line());
        out
    }
}

// ============================================================================
// RenderState
// ============================================================================

/// What was drawn last, and what changed since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    current_lines: Vec<String>,
    current_selection: usize,
    last_selection: Option<usize>,
    content_changed: bool,
    selection_changed: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            current_lines: Vec::new(),
            current_selection: 0,
            last_selection: None,
            content_changed: true,
            selection_changed: false,
        }
    }
}

impl RenderState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new frame and work out what changed.
    ///
    /// `selection_changed` is only set when the lines themselves are
    /// identical; a content change already implies a full repaint.
    pub fn update(&mut self, lines: Vec<String>, selection: usize) {
        self.content_changed = lines != self.current_lines;
        self.selection_changed = !self.content_changed && selection != self.current_selection;

        self.last_selection = Some(self.current_selection);
        self.current_selection = selection;
        self.current_lines = lines;
    }

    /// Back to the state of a fresh session.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.current_lines
    }

    #[must_use]
    pub const fn current_selection(&self) -> usize {
        self.current_selection
    }

    #[must_use]
    pub const fn last_selection(&self) -> Option<usize> {
        self.last_selection
    }

    #[must_use]
    pub const fn content_changed(&self) -> bool {
        self.content_changed
    }

    #[must_use]
    pub const fn selection_changed(&self) -> bool {
        self.selection_changed
    }

    /// Whether the last update needs anything drawn.
    #[must_use]
    pub const fn needs_repaint(&self) -> bool {
        self.content_changed || self.selection_changed
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Draws the selection menu for one session.
#[derive(Debug)]
pub struct Renderer {
    state: RenderState,
    positioner: TextPositioner,
    layout: Layout,
    marker: &'static str,
}

impl Renderer {
    /// Create a renderer for `layout` that marks the selected line with `marker`.
    #[must_use]
    pub fn new(layout: Layout, marker: &'static str) -> Self {
        Self {
            state: RenderState::new(),
            positioner: TextPositioner::new(layout.width),
            layout,
            marker,
        }
    }

    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Header followed by one composed line per profile.
    #[must_use]
    pub fn menu_lines(&self, profiles: &[Profile], selected: usize, header: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(profiles.len() + 1);
        if !header.is_empty() {
            lines.push(header.to_string());
        }
        lines.extend(profiles.iter().enumerate().map(|(idx, profile)| {
            let prefix = if idx == selected {
                self.marker
            } else {
                MARKER_NONE
            };
            compose_line(prefix, profile, &self.layout)
        }));
        lines
    }

    /// Draw the menu if anything changed since the last call.
    pub fn render_menu<W: Write>(
        &mut self,
        out: &mut W,
        profiles: &[Profile],
        selected: usize,
        header: &str,
    ) -> io::Result<()> {
        let lines = self.menu_lines(profiles, selected, header);
        self.state.update(lines, selected);

        if self.state.content_changed() {
            self.render_full(out)?;
        } else if self.state.selection_changed() {
            self.render_selection_change(out)?;
        }
        out.flush()
    }

    fn render_full<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.clear_screen(out)?;
        for (idx, line) in self.state.lines().iter().enumerate() {
            if idx > 0 {
                out.write_all(b"\n")?;
            }
            out.write_all(self.positioner.overwrite_line(line).as_bytes())?;
        }
        Ok(())
    }

    fn render_selection_change<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.render_full(out)
    }

    /// Blank a screenful of lines and return to column 0.
    pub fn clear_screen<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let count = match self.layout.height {
            0 => FALLBACK_CLEAR_LINES,
            height => height,
        };
        let blank = self.positioner.clear_line();
        for idx in 0..count {
            out.write_all(blank.as_bytes())?;
            if idx + 1 < count {
                out.write_all(b"\n")?;
            }
        }
        out.write_all("\r".repeat(count).as_bytes())
    }

    /// Leave the menu: move below it and forget everything drawn.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.state.clear();
        out.write_all(b"\r\n")?;
        out.flush()
    }
}
