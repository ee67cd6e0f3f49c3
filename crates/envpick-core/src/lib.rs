#![forbid(unsafe_code)]

//! Core: terminal capability negotiation and responsive profile selection.
//!
//! The entry point is [`select::Selector`], which probes the terminal once,
//! picks a [`select::SelectionTier`] and drives the menu until the user picks
//! a profile, cancels, or the input runs dry.

pub mod config;
pub mod error;
pub mod key;
pub mod layout;
pub mod logging;
pub mod profile;
pub mod raw_mode;
pub mod render;
pub mod select;
pub mod terminal_capabilities;
pub mod truncate;

pub use config::SelectConfig;
pub use error::SelectError;
pub use profile::{Profile, find_profile};
pub use select::{SelectionTier, Selector, select_profile};
pub use terminal_capabilities::{Capabilities, HeadlessHints};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, info_span, warn};
