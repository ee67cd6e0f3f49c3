#![forbid(unsafe_code)]

//! The profile entity as seen by the selection engine.
//!
//! Profiles are owned by the caller. The engine only reads the three display
//! fields and identifies a profile by its name.

/// A named configuration profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    /// Unique profile name.
    pub name: String,
    /// Endpoint the profile points at.
    pub url: String,
    /// Model identifier; empty means the endpoint's default.
    pub model: String,
}

impl Profile {
    /// Create a profile from its display fields.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            model: model.into(),
        }
    }
}

/// Find a profile by exact name.
#[must_use]
pub fn find_profile<'p>(profiles: &'p [Profile], name: &str) -> Option<&'p Profile> {
    profiles.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_profile_matches_exact_name() {
        let profiles = vec![
            Profile::new("prod", "https://prod.example.com", ""),
            Profile::new("production", "https://p2.example.com", "big"),
        ];
        assert_eq!(
            find_profile(&profiles, "production").map(|p| p.model.as_str()),
            Some("big")
        );
        assert!(find_profile(&profiles, "Prod").is_none());
        assert!(find_profile(&[], "prod").is_none());
    }
}
