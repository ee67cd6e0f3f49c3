#![forbid(unsafe_code)]

//! Selection session configuration.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `ENVPICK_FORCE_TIER` | pin the starting tier: `full`, `basic`, `numbered` or `headless` |
//! | `ENVPICK_READ_CHUNK` | bytes per blocking key read (default 10, minimum 1) |
//!
//! Unparseable values are ignored rather than reported.

use std::env;

use crate::select::SelectionTier;

/// Bytes requested per blocking read in the interactive tiers.
pub const DEFAULT_READ_CHUNK: usize = 10;

/// Knobs for a selection session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectConfig {
    /// Replaces the interactive header line.
    pub header: Option<String>,
    /// Start in this tier instead of the one capabilities suggest.
    ///
    /// A forced tier still short-circuits on zero or one profile and still
    /// downgrades on failure.
    pub force_tier: Option<SelectionTier>,
    /// Bytes per blocking key read.
    pub read_chunk: usize,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            header: None,
            force_tier: None,
            read_chunk: DEFAULT_READ_CHUNK,
        }
    }
}

impl SelectConfig {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("ENVPICK_FORCE_TIER").ok().as_deref(),
            env::var("ENVPICK_READ_CHUNK").ok().as_deref(),
        )
    }

    /// Build a configuration from raw variable values.
    #[must_use]
    pub fn from_values(force_tier: Option<&str>, read_chunk: Option<&str>) -> Self {
        let force_tier = force_tier.and_then(|value| value.trim().parse().ok());
        let read_chunk = read_chunk
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_READ_CHUNK);
        Self {
            header: None,
            force_tier,
            read_chunk,
        }
    }

    /// Set the interactive header.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Pin the starting tier.
    #[must_use]
    pub fn with_force_tier(mut self, tier: SelectionTier) -> Self {
        self.force_tier = Some(tier);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SelectConfig::default();
        assert_eq!(config.read_chunk, 10);
        assert!(config.force_tier.is_none());
        assert!(config.header.is_none());
        assert_eq!(SelectConfig::from_values(None, None), config);
    }

    #[test]
    fn parses_tier_names() {
        let config = SelectConfig::from_values(Some("numbered"), None);
        assert_eq!(config.force_tier, Some(SelectionTier::NumberedFallback));
        let config = SelectConfig::from_values(Some(" Basic "), None);
        assert_eq!(config.force_tier, Some(SelectionTier::BasicInteractive));
    }

    #[test]
    fn invalid_values_are_ignored() {
        let config = SelectConfig::from_values(Some("fancy"), Some("lots"));
        assert!(config.force_tier.is_none());
        assert_eq!(config.read_chunk, DEFAULT_READ_CHUNK);
    }

    #[test]
    fn zero_read_chunk_uses_default() {
        assert_eq!(SelectConfig::from_values(None, Some("0")).read_chunk, 10);
        assert_eq!(SelectConfig::from_values(None, Some("64")).read_chunk, 64);
    }

    #[test]
    fn builders() {
        let config = SelectConfig::default()
            .with_header("Pick one:")
            .with_force_tier(SelectionTier::Headless);
        assert_eq!(config.header.as_deref(), Some("Pick one:"));
        assert_eq!(config.force_tier, Some(SelectionTier::Headless));
    }
}
