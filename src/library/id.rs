//! Module identifiers and module-id queries.
//!
//! A module id is written `name@version`. An id without `@` names an alias, which has no
//! version of its own and is resolved through the library's module-id index. A query adds an
//! optional relation in front of the version: `name`, `name@1.0`, `name@>=1.0`.

use std::fmt;

use crate::{library::version::ModuleVersion, Result};

/// A parsed `name[@version]` module id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleId {
    name: String,
    version: Option<ModuleVersion>,
}

impl ModuleId {
    /// Parse a module id, splitting on the first `@`.
    ///
    /// An empty version (`name@`) is treated as absent.
    #[must_use]
    pub fn parse(id: &str) -> ModuleId {
        let (name, version) = match id.split_once('@') {
            Some((name, version)) => (name, ModuleVersion::parse(version).ok()),
            None => (id, None),
        };

        ModuleId {
            name: name.to_string(),
            version,
        }
    }

    /// The module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module version, `None` for an alias.
    #[must_use]
    pub fn version(&self) -> Option<&ModuleVersion> {
        self.version.as_ref()
    }

    /// Returns `true` if this id has no version.
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.version.is_none()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

/// Relation between a candidate version and the version named in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum Relation {
    /// `<`
    #[strum(serialize = "<")]
    Less,
    /// `<=`
    #[strum(serialize = "<=")]
    LessOrEqual,
    /// `=`
    #[strum(serialize = "=")]
    Equal,
    /// `>=`
    #[strum(serialize = ">=")]
    GreaterOrEqual,
    /// `>`
    #[strum(serialize = ">")]
    Greater,
}

impl Relation {
    /// Returns `true` if `candidate` stands in this relation to `bound`.
    #[must_use]
    pub fn holds(self, candidate: &ModuleVersion, bound: &ModuleVersion) -> bool {
        match self {
            Relation::Less => candidate < bound,
            Relation::LessOrEqual => candidate <= bound,
            Relation::Equal => candidate == bound,
            Relation::GreaterOrEqual => candidate >= bound,
            Relation::Greater => candidate > bound,
        }
    }

    /// Split a leading relation off a version constraint, `=` if there is none.
    fn split(constraint: &str) -> (Relation, &str) {
        // two-character operators first
        for prefix in ["<=", ">=", "<", ">", "="] {
            if let Some(rest) = constraint.strip_prefix(prefix) {
                if let Ok(relation) = prefix.parse() {
                    return (relation, rest);
                }
            }
        }
        (Relation::Equal, constraint)
    }
}

/// A query for a module: a name and an optional version constraint.
///
/// # Examples
///
/// ```rust
/// use modlib::library::{ModuleId, ModuleIdQuery};
///
/// let query = ModuleIdQuery::parse("app@>=1.2")?;
/// assert_eq!(query.name(), "app");
/// assert!(query.matches(&ModuleId::parse("app@1.10")));
/// assert!(!query.matches(&ModuleId::parse("app@1.1")));
/// assert!(!query.matches(&ModuleId::parse("app")));
/// # Ok::<(), modlib::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdQuery {
    name: String,
    constraint: Option<(Relation, ModuleVersion)>,
}

impl ModuleIdQuery {
    /// Parse a `name[@[relation]version]` query.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the name is empty, or if an `@` is not followed by
    /// a version.
    pub fn parse(query: &str) -> Result<ModuleIdQuery> {
        let (name, constraint) = match query.split_once('@') {
            Some((name, constraint)) => {
                let (relation, version) = Relation::split(constraint);
                let version = ModuleVersion::parse(version)
                    .map_err(|_| malformed_error!("Module query {:?} lacks a version", query))?;
                (name, Some((relation, version)))
            }
            None => (query, None),
        };

        if name.is_empty() {
            return Err(malformed_error!("Module query {:?} lacks a name", query));
        }

        Ok(ModuleIdQuery {
            name: name.to_string(),
            constraint,
        })
    }

    /// The queried module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version constraint, if any.
    #[must_use]
    pub fn constraint(&self) -> Option<(Relation, &ModuleVersion)> {
        self.constraint
            .as_ref()
            .map(|(relation, version)| (*relation, version))
    }

    /// Returns `true` if `id` has the queried name and satisfies the version constraint.
    ///
    /// An alias never satisfies a version constraint.
    #[must_use]
    pub fn matches(&self, id: &ModuleId) -> bool {
        if id.name() != self.name {
            return false;
        }

        match (&self.constraint, id.version()) {
            (None, _) => true,
            (Some((relation, bound)), Some(version)) => relation.holds(version, bound),
            (Some(_), None) => false,
        }
    }
}

impl fmt::Display for ModuleIdQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some((Relation::Equal, version)) => write!(f, "{}@{}", self.name, version),
            Some((relation, version)) => write!(f, "{}@{}{}", self.name, relation, version),
            None => f.write_str(&self.name),
        }
    }
}
