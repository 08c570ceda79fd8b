//! Resolver settings
//!
//! This module provides the knobs that change how a [`crate::Resolver`] reads configurations,
//! picks module versions and validates class names. Settings are plain data; presets cover
//! the common setups and [`ResolverSettings::from_env`] layers environment overrides on top of
//! the defaults.
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `MODLIB_CONFIG_FORMAT` | `simple` or `indexed` |
//! | `MODLIB_VERSION_POLICY` | `newest` or `last-match` |
//! | `JIGSAW_DEBUG` | `true` enables trace diagnostics |

use std::env;

use crate::{config::ConfigFormat, library::VersionPolicy};

/// Longest platform path the class entry name must fit in.
const MAX_PATH_LEN: usize = 4096;

/// Default limit for class names: room for the `.class` suffix and a terminator within a
/// platform path.
pub const DEFAULT_MAX_CLASS_NAME_LEN: usize = MAX_PATH_LEN - 6;

/// Environment variable selecting the configuration format.
pub const ENV_CONFIG_FORMAT: &str = "MODLIB_CONFIG_FORMAT";
/// Environment variable selecting the version policy.
pub const ENV_VERSION_POLICY: &str = "MODLIB_VERSION_POLICY";
/// Environment variable enabling trace diagnostics when set to `true`.
pub const ENV_DEBUG: &str = "JIGSAW_DEBUG";

/// Configuration for a [`crate::Resolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Body format of module configuration files (default: simple)
    pub config_format: ConfigFormat,

    /// How to choose among installed versions of a module (default: newest)
    pub version_policy: VersionPolicy,

    /// Class names of this many bytes or more are rejected (default: 4090)
    pub max_class_name_len: usize,

    /// Log every parsed record and resolution step at trace level
    pub trace: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            config_format: ConfigFormat::Simple,
            version_policy: VersionPolicy::Newest,
            max_class_name_len: DEFAULT_MAX_CLASS_NAME_LEN,
            trace: false,
        }
    }
}

impl ResolverSettings {
    /// Settings for well-formed, current libraries
    ///
    /// Always picks the newest installed version.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Settings reproducing the behaviour of early prototype libraries
    ///
    /// The last index entry with the queried name wins. Versions and version constraints are
    /// not consulted, which is what those libraries were built against.
    #[must_use]
    pub fn compat() -> Self {
        Self {
            version_policy: VersionPolicy::LastMatch,
            ..Self::default()
        }
    }

    /// Default settings with environment overrides applied
    ///
    /// Unrecognized values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env(|key| env::var(key).ok())
    }

    /// Apply overrides from a variable lookup function.
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CONFIG_FORMAT) {
            match value.parse() {
                Ok(format) => self.config_format = format,
                Err(_) => log::warn!("ignoring {}={:?}", ENV_CONFIG_FORMAT, value),
            }
        }

        if let Some(value) = lookup(ENV_VERSION_POLICY) {
            match value.parse() {
                Ok(policy) => self.version_policy = policy,
                Err(_) => log::warn!("ignoring {}={:?}", ENV_VERSION_POLICY, value),
            }
        }

        if let Some(value) = lookup(ENV_DEBUG) {
            self.trace = value == "true";
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let settings = ResolverSettings::default();
        assert_eq!(settings.config_format, ConfigFormat::Simple);
        assert_eq!(settings.version_policy, VersionPolicy::Newest);
        assert_eq!(settings.max_class_name_len, 4090);
        assert!(!settings.trace);
        assert_eq!(ResolverSettings::strict(), settings);
    }

    #[test]
    fn compat_preset() {
        assert_eq!(
            ResolverSettings::compat().version_policy,
            VersionPolicy::LastMatch
        );
    }

    #[test]
    fn env_overrides() {
        let settings = ResolverSettings::default().with_env(lookup(&[
            (ENV_CONFIG_FORMAT, "indexed"),
            (ENV_VERSION_POLICY, "last-match"),
            (ENV_DEBUG, "true"),
        ]));

        assert_eq!(settings.config_format, ConfigFormat::Indexed);
        assert_eq!(settings.version_policy, VersionPolicy::LastMatch);
        assert!(settings.trace);
    }

    #[test]
    fn invalid_env_values_ignored() {
        let settings = ResolverSettings::default().with_env(lookup(&[
            (ENV_CONFIG_FORMAT, "xml"),
            (ENV_VERSION_POLICY, "oldest"),
            (ENV_DEBUG, "yes"),
        ]));

        assert_eq!(settings, ResolverSettings::default());
    }
}
