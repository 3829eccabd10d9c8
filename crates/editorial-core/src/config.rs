//! Editorial configuration.
//!
//! Loaded from environment variables with defaults that match the
//! validation rules of the HTTP layer.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use editorial_rbac::DEFAULT_GUARD;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// What happens to an existing slug when an article's title is edited.
///
/// The direct title-setter ([`crate::Article::set_title`]) always
/// regenerates; the generic update hook only re-derives an empty slug. The
/// article service follows whichever behavior is configured here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlugPolicy {
    /// Keep the slug; only a cleared slug is re-derived.
    #[default]
    Preserve,
    /// Derive a fresh slug whenever the title is set.
    Regenerate,
}

impl FromStr for SlugPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "preserve" | "keep" => Ok(SlugPolicy::Preserve),
            "regenerate" | "title" => Ok(SlugPolicy::Regenerate),
            other => Err(format!("expected 'preserve' or 'regenerate', got '{}'", other)),
        }
    }
}

/// Editorial core configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorialConfig {
    /// Guard the role/permission names are registered under.
    pub guard: String,

    /// Length of the random slug suffix.
    pub slug_suffix_len: usize,

    /// How many suffixes to try when a slug is already taken.
    pub slug_attempts: u32,

    /// Slug behavior on title edits.
    pub slug_policy: SlugPolicy,

    /// Maximum title length in characters.
    pub max_title_len: usize,

    /// Maximum excerpt length in characters.
    pub max_excerpt_len: usize,
}

impl Default for EditorialConfig {
    fn default() -> Self {
        Self {
            guard: DEFAULT_GUARD.to_string(),
            slug_suffix_len: 6,
            slug_attempts: 3,
            slug_policy: SlugPolicy::Preserve,
            max_title_len: 255,
            max_excerpt_len: 500,
        }
    }
}

impl EditorialConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EDITORIAL_GUARD`: Role/permission guard (default: web)
    /// - `EDITORIAL_SLUG_SUFFIX_LEN`: Random slug suffix length (default: 6)
    /// - `EDITORIAL_SLUG_ATTEMPTS`: Slug generation attempts on conflict (default: 3)
    /// - `EDITORIAL_SLUG_POLICY`: `preserve` or `regenerate` (default: preserve)
    /// - `EDITORIAL_MAX_TITLE_LEN`: Maximum title length (default: 255)
    /// - `EDITORIAL_MAX_EXCERPT_LEN`: Maximum excerpt length (default: 500)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let config = Self {
            guard: lookup("EDITORIAL_GUARD").unwrap_or(default.guard),
            slug_suffix_len: parse_var(&lookup, "EDITORIAL_SLUG_SUFFIX_LEN")?
                .unwrap_or(default.slug_suffix_len),
            slug_attempts: parse_var(&lookup, "EDITORIAL_SLUG_ATTEMPTS")?
                .unwrap_or(default.slug_attempts),
            slug_policy: parse_var(&lookup, "EDITORIAL_SLUG_POLICY")?
                .unwrap_or(default.slug_policy),
            max_title_len: parse_var(&lookup, "EDITORIAL_MAX_TITLE_LEN")?
                .unwrap_or(default.max_title_len),
            max_excerpt_len: parse_var(&lookup, "EDITORIAL_MAX_EXCERPT_LEN")?
                .unwrap_or(default.max_excerpt_len),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("guard", self.guard.trim().is_empty(), "must not be empty"),
            ("slug_suffix_len", self.slug_suffix_len == 0, "must be at least 1"),
            ("slug_attempts", self.slug_attempts == 0, "must be at least 1"),
            ("max_title_len", self.max_title_len == 0, "must be at least 1"),
            ("max_excerpt_len", self.max_excerpt_len == 0, "must be at least 1"),
        ];

        match checks.iter().find(|(_, failed, _)| *failed) {
            Some((key, _, message)) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Use a different slug policy.
    pub fn with_slug_policy(mut self, policy: SlugPolicy) -> Self {
        self.slug_policy = policy;
        self
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}
