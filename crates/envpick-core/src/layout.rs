#![forbid(unsafe_code)]

//! Layout budgeting.
//!
//! Pure functions from terminal dimensions to a content budget and the three
//! column widths used by the truncator.
//!
//! # Invariants
//!
//! 1. `content_width >= 20` and `truncation_limit >= 10` for any width,
//!    including a width of 1.
//! 2. Column widths never drop below 8/10/6 (name/url/model). Below a content
//!    width of about 30 the floors, not the proportions, decide the widths.

use crate::terminal_capabilities::Capabilities;

/// Terminals narrower than this get the reduced decoration budget.
const NARROW_WIDTH: usize = 40;

/// Decoration budget: marker, brackets and spacing around the fields.
const UI_OVERHEAD: usize = 8;

/// Decoration budget on narrow terminals.
const UI_OVERHEAD_NARROW: usize = 4;

/// Floor for [`Layout::content_width`].
pub const MIN_CONTENT_WIDTH: usize = 20;

/// Floor for [`Layout::truncation_limit`].
pub const MIN_TRUNCATION_LIMIT: usize = 10;

/// Column floors (name, url, model).
pub const MIN_NAME_WIDTH: usize = 8;
pub const MIN_URL_WIDTH: usize = 10;
pub const MIN_MODEL_WIDTH: usize = 6;

/// Responsive layout derived from the terminal dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Terminal columns.
    pub width: usize,
    /// Terminal rows.
    pub height: usize,
    /// Whether the arrow marker and other non-ASCII glyphs may be used.
    pub supports_ansi: bool,
    /// Columns left for content once decoration is paid for.
    pub content_width: usize,
    /// Longest field value shown before truncation kicks in.
    pub truncation_limit: usize,
}

impl Layout {
    /// Plan the layout for probed capabilities.
    #[must_use]
    pub fn plan(caps: &Capabilities) -> Self {
        Self::for_size(
            usize::from(caps.width),
            usize::from(caps.height),
            caps.supports_ansi,
        )
    }

    /// Plan the layout for explicit dimensions.
    #[must_use]
    pub fn for_size(width: usize, height: usize, supports_ansi: bool) -> Self {
        let ui_overhead = if width < NARROW_WIDTH {
            UI_OVERHEAD_NARROW
        } else {
            UI_OVERHEAD
        };
        let content_width = width.saturating_sub(ui_overhead).max(MIN_CONTENT_WIDTH);
        let truncation_limit = content_width
            .saturating_sub(10)
            .max(MIN_TRUNCATION_LIMIT);

        Self {
            width,
            height,
            supports_ansi,
            content_width,
            truncation_limit,
        }
    }
}

/// Column widths for the name, url and model fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub name_width: usize,
    pub url_width: usize,
    pub model_width: usize,
}

impl ColumnWidths {
    /// Split the content budget 40/45/15, then apply the floors.
    #[must_use]
    pub fn plan(layout: &Layout) -> Self {
        let content = layout.content_width;
        Self {
            name_width: proportion(content, 40).max(MIN_NAME_WIDTH),
            url_width: proportion(content, 45).max(MIN_URL_WIDTH),
            model_width: proportion(content, 15).max(MIN_MODEL_WIDTH),
        }
    }
}

/// `total * percent / 100`, rounded down.
pub(crate) const fn proportion(total: usize, percent: usize) -> usize {
    total.saturating_mul(percent) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_terminal_budget() {
        let layout = Layout::for_size(80, 24, true);
        assert_eq!(layout.content_width, 72);
        assert_eq!(layout.truncation_limit, 62);

        let cols = ColumnWidths::plan(&layout);
        assert_eq!(cols.name_width, 28);
        assert_eq!(cols.url_width, 32);
        assert_eq!(cols.model_width, 10);
    }

    #[test]
    fn narrow_terminal_hits_floors() {
        let layout = Layout::for_size(15, 24, true);
        assert_eq!(layout.content_width, 20);
        assert_eq!(layout.truncation_limit, 10);

        let cols = ColumnWidths::plan(&layout);
        assert_eq!(cols.name_width, 8);
        assert_eq!(cols.url_width, 10);
        assert_eq!(cols.model_width, 6);
    }

    #[test]
    fn narrow_overhead_applies_below_forty_columns() {
        assert_eq!(Layout::for_size(39, 24, true).content_width, 35);
        assert_eq!(Layout::for_size(40, 24, true).content_width, 32);
    }

    #[test]
    fn width_one_is_protected() {
        let layout = Layout::for_size(1, 1, false);
        assert_eq!(layout.content_width, MIN_CONTENT_WIDTH);
        assert_eq!(layout.truncation_limit, MIN_TRUNCATION_LIMIT);
    }

    #[test]
    fn plan_reads_capabilities() {
        let caps = Capabilities::raw_without_ansi(120, 40);
        let layout = Layout::plan(&caps);
        assert_eq!(layout.width, 120);
        assert_eq!(layout.height, 40);
        assert!(!layout.supports_ansi);
        assert_eq!(layout.content_width, 112);
    }

    #[test]
    fn wide_terminal_follows_proportions() {
        let cols = ColumnWidths::plan(&Layout::for_size(208, 50, true));
        // content = 200
        assert_eq!(cols.name_width, 80);
        assert_eq!(cols.url_width, 90);
        assert_eq!(cols.model_width, 30);
    }
}
