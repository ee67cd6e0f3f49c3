#![forbid(unsafe_code)]

//! Field truncation and menu line composition.
//!
//! Every function here measures in terminal display columns and cuts on
//! grapheme boundaries, so a returned string never splits a character and
//! never exceeds the requested width.
//!
//! | Field | Strategy when too long |
//! |-------|------------------------|
//! | name  | keep head and tail, `...` in the middle (plain cut below 8 columns) |
//! | url   | keep `scheme://host...` when that fits, else plain cut |
//! | model | empty shows `default`; otherwise plain cut |
//!
//! A plain cut keeps `width - 3` columns and appends `...`.

use std::borrow::Cow;

use bitflags::bitflags;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::layout::{
    ColumnWidths, Layout, MIN_MODEL_WIDTH, MIN_NAME_WIDTH, MIN_URL_WIDTH, proportion,
};
use crate::profile::Profile;

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Below this width names lose the middle ellipsis.
const MIN_MIDDLE_ELLIPSIS_WIDTH: usize = 8;

/// Shown in place of an empty model.
pub const DEFAULT_MODEL_LABEL: &str = "default";

/// `" ("`, `") ["` and `"]"` around the three fields of a menu line.
const LINE_DECORATION: usize = 6;

/// Lines with less content room than this use the name-only format.
const MIN_LINE_CONTENT: usize = 20;

/// Name-only format: names wider than this are cut to [`MINIMAL_NAME_KEEP`].
const MINIMAL_NAME_MAX: usize = 10;
const MINIMAL_NAME_KEEP: usize = 7;

/// Display width in terminal columns.
#[must_use]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest leading slice of `text` that fits in `cols` columns.
fn take_prefix(text: &str, cols: usize) -> &str {
    let mut used = 0usize;
    for (idx, g) in text.grapheme_indices(true) {
        let w = display_width(g);
        if used + w > cols {
            return &text[..idx];
        }
        used += w;
    }
    text
}

/// Longest trailing slice of `text` that fits in `cols` columns.
fn take_suffix(text: &str, cols: usize) -> &str {
    let mut used = 0usize;
    let mut start = text.len();
    for (idx, g) in text.grapheme_indices(true).rev() {
        let w = display_width(g);
        if used + w > cols {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}

/// Plain cut: `width - 3` columns of prefix plus `...`.
///
/// Widths too small to hold the ellipsis get a bare prefix instead.
fn cut_with_ellipsis(text: &str, width: usize) -> String {
    if width < ELLIPSIS_WIDTH {
        return take_prefix(text, width).to_string();
    }
    let mut out = String::with_capacity(width);
    out.push_str(take_prefix(text, width - ELLIPSIS_WIDTH));
    out.push_str(ELLIPSIS);
    out
}

/// Truncate a profile name, keeping its head and tail.
#[must_use]
pub fn truncate_name(text: &str, width: usize) -> (Cow<'_, str>, bool) {
    if display_width(text) <= width {
        return (Cow::Borrowed(text), false);
    }
    if width < MIN_MIDDLE_ELLIPSIS_WIDTH {
        return (Cow::Owned(cut_with_ellipsis(text, width)), true);
    }

    let budget = width - ELLIPSIS_WIDTH;
    let head = take_prefix(text, budget / 2);
    let tail = take_suffix(text, budget - budget / 2);
    (Cow::Owned(format!("{head}{ELLIPSIS}{tail}")), true)
}

/// Truncate a URL, preferring to keep the scheme and host.
#[must_use]
pub fn truncate_url(text: &str, width: usize) -> (Cow<'_, str>, bool) {
    if display_width(text) <= width {
        return (Cow::Borrowed(text), false);
    }

    if let Some((scheme, rest)) = text.split_once("://") {
        let host = rest.split_once('/').map_or(rest, |(host, _)| host);
        let head_width = display_width(scheme) + "://".len() + display_width(host);
        if width >= ELLIPSIS_WIDTH && head_width <= width - ELLIPSIS_WIDTH {
            return (Cow::Owned(format!("{scheme}://{host}{ELLIPSIS}")), true);
        }
    }

    (Cow::Owned(cut_with_ellipsis(text, width)), true)
}

/// Truncate a model identifier; empty models show [`DEFAULT_MODEL_LABEL`].
///
/// The placeholder is never reported as truncated, even on a column too
/// narrow to show all of it.
#[must_use]
pub fn truncate_model(text: &str, width: usize) -> (Cow<'_, str>, bool) {
    if text.is_empty() {
        let label = if display_width(DEFAULT_MODEL_LABEL) <= width {
            Cow::Borrowed(DEFAULT_MODEL_LABEL)
        } else {
            Cow::Owned(cut_with_ellipsis(DEFAULT_MODEL_LABEL, width))
        };
        return (label, false);
    }
    if display_width(text) <= width {
        return (Cow::Borrowed(text), false);
    }
    (Cow::Owned(cut_with_ellipsis(text, width)), true)
}

/// Clamp a whole line to the terminal width.
#[must_use]
pub fn clamp_line(line: &str, width: usize) -> Cow<'_, str> {
    if display_width(line) <= width {
        Cow::Borrowed(line)
    } else {
        Cow::Owned(cut_with_ellipsis(line, width))
    }
}

bitflags! {
    /// Fields shortened for display.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TruncatedFields: u8 {
        const NAME  = 0b001;
        const URL   = 0b010;
        const MODEL = 0b100;
    }
}

impl Default for TruncatedFields {
    fn default() -> Self {
        Self::empty()
    }
}

impl TruncatedFields {
    /// Field names in display order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        [
            (Self::NAME, "name"),
            (Self::URL, "url"),
            (Self::MODEL, "model"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect()
    }
}

/// A profile with its fields fitted to column widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDisplay {
    pub display_name: String,
    pub display_url: String,
    pub display_model: String,
    /// Which fields lost characters.
    pub truncated: TruncatedFields,
}

/// Fit each field of `profile` to its column.
#[must_use]
pub fn format_profile(profile: &Profile, columns: &ColumnWidths) -> ProfileDisplay {
    let mut truncated = TruncatedFields::empty();

    let (name, cut) = truncate_name(&profile.name, columns.name_width);
    truncated.set(TruncatedFields::NAME, cut);
    let (url, cut) = truncate_url(&profile.url, columns.url_width);
    truncated.set(TruncatedFields::URL, cut);
    let (model, cut) = truncate_model(&profile.model, columns.model_width);
    truncated.set(TruncatedFields::MODEL, cut);

    ProfileDisplay {
        display_name: name.into_owned(),
        display_url: url.into_owned(),
        display_model: model.into_owned(),
        truncated,
    }
}

/// Build a menu line `"<prefix><name> (<url>) [<model>]"` no wider than the terminal.
///
/// When fewer than 20 columns remain for the fields the line degrades to
/// `"<prefix><name>"`.
#[must_use]
pub fn compose_line(prefix: &str, profile: &Profile, layout: &Layout) -> String {
    let room = layout
        .width
        .saturating_sub(display_width(prefix))
        .saturating_sub(LINE_DECORATION);

    if room < MIN_LINE_CONTENT {
        let name = if display_width(&profile.name) > MINIMAL_NAME_MAX {
            Cow::Owned(format!(
                "{}{ELLIPSIS}",
                take_prefix(&profile.name, MINIMAL_NAME_KEEP)
            ))
        } else {
            Cow::Borrowed(profile.name.as_str())
        };
        let line = format!("{prefix}{name}");
        return clamp_line(&line, layout.width).into_owned();
    }

    let name_room = proportion(room, 40);
    let url_room = proportion(room, 45);
    let model_room = room - name_room - url_room;

    let (name, _) = truncate_name(&profile.name, name_room.max(MIN_NAME_WIDTH));
    let (url, _) = truncate_url(&profile.url, url_room.max(MIN_URL_WIDTH));
    let (model, _) = truncate_model(&profile.model, model_room.max(MIN_MODEL_WIDTH));

    let line = format!("{prefix}{name} ({url}) [{model}]");
    clamp_line(&line, layout.width).into_owned()
}
