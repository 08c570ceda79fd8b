//! The `%mids` module-id index of a library.
//!
//! The index maps every installed module id to the id that provides it. A versioned module
//! provides itself; an alias names another id, which may itself be an alias.
//!
//! # Layout
//!
//! After the common file header (kind [`FileKind::ModuleIds`]) a 4-byte entry count follows,
//! then that many `(module-id, providing-module-id)` string pairs.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::{
    file::{parser::Parser, File},
    format::{check_header, FileKind},
    library::{ModuleId, ModuleIdQuery, VersionPolicy},
    Error, Result,
};

/// Smallest encoding of an entry: two empty strings.
const MIN_ENTRY_SIZE: usize = 4;

/// One `(module-id, providing-module-id)` pair of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdEntry {
    /// The installed id
    pub id: String,
    /// The id that provides it, equal to `id` for a versioned module
    pub provider: String,
}

impl ModuleIdEntry {
    /// Returns `true` if this entry points at another id.
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.id != self.provider
    }
}

/// The in-memory form of a `%mids` file.
///
/// The index is transient, built for one resolution and dropped afterwards.
#[derive(Debug, Default)]
pub struct ModuleIdIndex {
    entries: Vec<ModuleIdEntry>,
    by_id: HashMap<String, usize>,
}

impl ModuleIdIndex {
    /// Read the index file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidModuleIds`] if the file cannot be opened, and the parse
    /// errors of [`ModuleIdIndex::parse`] otherwise.
    pub fn read(path: &Path) -> Result<ModuleIdIndex> {
        let file = File::open(path).map_err(|e| {
            log::debug!("{}", e);
            Error::InvalidModuleIds(path.to_path_buf())
        })?;

        ModuleIdIndex::parse(file.data())
    }

    /// Parse an index from raw bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadHeader`], [`crate::Error::OutOfBounds`] or
    /// [`crate::Error::Malformed`] for damaged data.
    pub fn parse(data: &[u8]) -> Result<ModuleIdIndex> {
        let mut parser = Parser::new(data);
        check_header(&mut parser, FileKind::ModuleIds)?;

        let count = parser.read_count_of(MIN_ENTRY_SIZE)?;
        let mut entries = Vec::with_capacity(count);
        let mut by_id = HashMap::with_capacity(count);
        for index in 0..count {
            let id = parser.read_utf8()?;
            let provider = parser.read_utf8()?;
            log::trace!("[{}] {} -> {}", index, id, provider);

            // a later duplicate shadows the earlier one
            by_id.insert(id.clone(), index);
            entries.push(ModuleIdEntry { id, provider });
        }

        Ok(ModuleIdIndex { entries, by_id })
    }

    /// All entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[ModuleIdEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry for an exact module id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ModuleIdEntry> {
        self.by_id.get(id).map(|&index| &self.entries[index])
    }

    /// Pick the entry that best matches `query` under `policy`.
    ///
    /// Entries are offered to the policy in file order; aliases take part for a bare-name query.
    /// Under [`VersionPolicy::LastMatch`] only the name is compared.
    #[must_use]
    pub fn select(&self, query: &ModuleIdQuery, policy: VersionPolicy) -> Option<&ModuleIdEntry> {
        let mut best: Option<(&ModuleIdEntry, ModuleId)> = None;

        for entry in &self.entries {
            let id = ModuleId::parse(&entry.id);
            let matched = if policy.honors_constraints() {
                query.matches(&id)
            } else {
                id.name() == query.name()
            };
            if !matched {
                continue;
            }

            let replace = match &best {
                Some((_, current)) => policy.prefers(id.version(), current.version()),
                None => true,
            };
            if replace {
                best = Some((entry, id));
            }
        }

        best.map(|(entry, _)| entry)
    }

    /// Find the versioned module that ultimately provides `query`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] if no entry matches, and
    /// [`crate::Error::Malformed`] if an alias chain is broken, loops, or ends in an id without
    /// a version.
    pub fn resolve(&self, query: &ModuleIdQuery, policy: VersionPolicy) -> Result<ModuleId> {
        let Some(mut entry) = self.select(query, policy) else {
            log::debug!("no module matches {}", query);
            return Err(Error::ModuleNotFound(query.to_string()));
        };

        let mut visited = HashSet::new();
        while entry.is_alias() {
            if !visited.insert(entry.id.as_str()) {
                return Err(malformed_error!(
                    "Alias loop through {} while resolving {}",
                    entry.id,
                    query
                ));
            }

            entry = self.get(&entry.provider).ok_or_else(|| {
                malformed_error!(
                    "{} is provided by {}, which is not in the index",
                    entry.id,
                    entry.provider
                )
            })?;
        }

        let id = ModuleId::parse(&entry.id);
        if id.is_alias() {
            return Err(malformed_error!(
                "{} resolves to {}, which has no version",
                query,
                entry.id
            ));
        }
        Ok(id)
    }
}
