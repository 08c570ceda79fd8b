//! Module versions and the policy used to pick among installed versions.

use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{Error, Result};

/// One dot-separated component of a [`ModuleVersion`].
#[derive(Debug, Clone)]
enum Component {
    /// Decimal digits, leading zeros stripped
    Number(String),
    /// Anything else, compared lexically
    Text(String),
}

impl Component {
    fn parse(raw: &str) -> Component {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            let digits = raw.trim_start_matches('0');
            Component::Number(digits.to_string())
        } else {
            Component::Text(raw.to_string())
        }
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Same digit count compares lexically, otherwise the longer number is larger.
            // Works for arbitrarily long components without overflow.
            (Component::Number(a), Component::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Component::Number(_), Component::Text(_)) => Ordering::Less,
            (Component::Text(_), Component::Number(_)) => Ordering::Greater,
            (Component::Text(a), Component::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Component {}

/// A dotted module version such as `1.0.2` or `8-ea`.
///
/// Versions are ordered component by component: numeric components compare numerically,
/// other components lexically, and a numeric component sorts before a non-numeric one.
/// A version that is a prefix of another sorts first, so `1.0 < 1.0.1`.
///
/// The raw text is preserved, because it names the module's directory in the library.
#[derive(Debug, Clone)]
pub struct ModuleVersion {
    raw: String,
    components: Vec<Component>,
}

impl ModuleVersion {
    /// Parse a version string.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an empty version.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modlib::library::ModuleVersion;
    ///
    /// let a = ModuleVersion::parse("1.10")?;
    /// let b = ModuleVersion::parse("1.9")?;
    /// assert!(a > b);
    /// # Ok::<(), modlib::Error>(())
    /// ```
    pub fn parse(raw: &str) -> Result<ModuleVersion> {
        if raw.is_empty() {
            return Err(malformed_error!("Empty module version"));
        }

        Ok(ModuleVersion {
            raw: raw.to_string(),
            components: raw.split('.').map(Component::parse).collect(),
        })
    }

    /// The version exactly as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ModuleVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModuleVersion::parse(s)
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for ModuleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for ModuleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ModuleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModuleVersion {}

/// How to choose among several installed versions of the same module.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VersionPolicy {
    /// Pick the highest [`ModuleVersion`]; an alias without version sorts lowest and ties go to
    /// the later index entry.
    #[default]
    Newest,
    /// Pick the last entry of the index with the queried name. Versions are not compared and
    /// a query's version constraint is ignored.
    LastMatch,
}

impl VersionPolicy {
    /// Returns `true` if `candidate` should replace the current pick `best`.
    ///
    /// Candidates are offered in index order.
    #[must_use]
    pub fn prefers(self, candidate: Option<&ModuleVersion>, best: Option<&ModuleVersion>) -> bool {
        match self {
            VersionPolicy::Newest => candidate >= best,
            VersionPolicy::LastMatch => true,
        }
    }

    /// Returns `false` if candidates are matched on the module name alone.
    #[must_use]
    pub fn honors_constraints(self) -> bool {
        self == VersionPolicy::Newest
    }
}
