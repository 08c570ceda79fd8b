//! Module libraries and their parent chains.
//!
//! A module library is a directory holding installed modules, laid out as
//! `<root>/<name>/<version>/{config,classes}`, plus two index files at the root: the library
//! header `%jigsaw-library` and the module-id index `%mids`. A library may name a parent
//! library in its header; queries the library cannot answer are delegated to the parent.
//!
//! # Key Components
//!
//! - [`ModuleLibrary`] - An opened library together with its chain of ancestors
//! - [`LibraryHeader`] / [`LibraryFlags`] - The parsed `%jigsaw-library` header
//! - [`ModuleIdIndex`] - The parsed `%mids` index with alias resolution
//! - [`ModuleId`] / [`ModuleIdQuery`] / [`ModuleVersion`] - Module identification
//! - [`VersionPolicy`] - How to choose among installed versions
//!
//! # Examples
//!
//! ```rust,no_run
//! use modlib::library::{ModuleIdQuery, ModuleLibrary, VersionPolicy};
//!
//! let library = ModuleLibrary::open("/opt/app/modules")?;
//! for lib in library.chain() {
//!     println!("library {}", lib.root().display());
//! }
//!
//! let query = ModuleIdQuery::parse("app@>=1.0")?;
//! let config = library.find_config(&query, VersionPolicy::Newest)?;
//! println!("config at {}", config.display());
//! # Ok::<(), modlib::Error>(())
//! ```

mod header;
mod id;
mod mids;
mod version;

pub use header::{LibraryFlags, LibraryHeader};
pub use id::{ModuleId, ModuleIdQuery, Relation};
pub use mids::{ModuleIdEntry, ModuleIdIndex};
pub use version::{ModuleVersion, VersionPolicy};

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    format::{CONFIG_FILE, MODULE_IDS_FILE},
    Error, Result,
};

/// An opened module library and, recursively, its parent.
///
/// Dropping a library drops its whole ancestor chain.
#[derive(Debug)]
pub struct ModuleLibrary {
    root: PathBuf,
    header: LibraryHeader,
    parent: Option<Box<ModuleLibrary>>,
}

impl ModuleLibrary {
    /// Open the library rooted at `root` and all of its ancestors.
    ///
    /// A relative parent path is resolved against the root of the library naming it.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidLibrary`] if a header is missing, a header error if one
    /// is damaged, and [`crate::Error::LibraryCycle`] if the parent chain loops. Any failure
    /// fails the whole open.
    pub fn open(root: impl AsRef<Path>) -> Result<ModuleLibrary> {
        let mut visited = HashSet::new();
        ModuleLibrary::open_chain(root.as_ref(), &mut visited)
    }

    fn open_chain(root: &Path, visited: &mut HashSet<PathBuf>) -> Result<ModuleLibrary> {
        let canonical =
            fs::canonicalize(root).map_err(|_| Error::InvalidLibrary(root.to_path_buf()))?;
        if !visited.insert(canonical) {
            return Err(Error::LibraryCycle(root.to_path_buf()));
        }

        let header = LibraryHeader::read(root)?;
        log::debug!("opened module library {}", root.display());

        let parent = match &header.parent {
            Some(parent) => {
                let parent_root = root.join(parent);
                Some(Box::new(ModuleLibrary::open_chain(&parent_root, visited)?))
            }
            None => None,
        };

        Ok(ModuleLibrary {
            root: root.to_path_buf(),
            header,
            parent,
        })
    }

    /// The library root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The parsed library header.
    #[must_use]
    pub fn header(&self) -> &LibraryHeader {
        &self.header
    }

    /// The parent library, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&ModuleLibrary> {
        self.parent.as_deref()
    }

    /// Iterate this library and its ancestors, most specific first.
    pub fn chain(&self) -> impl Iterator<Item = &ModuleLibrary> {
        std::iter::successors(Some(self), |library| library.parent())
    }

    /// Find the directory of the module that declares `query` in this library only.
    ///
    /// Aliases are followed to the providing module, and the result is
    /// `<root>/<name>/<version>` of that module.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidModuleIds`] if the library has no `%mids` index,
    /// [`crate::Error::ModuleNotFound`] if nothing matches, and format errors for a damaged
    /// index.
    pub fn find_declaring_module_dir(
        &self,
        query: &ModuleIdQuery,
        policy: VersionPolicy,
    ) -> Result<PathBuf> {
        log::trace!(
            "find_declaring_module_dir matching {} in {}",
            query,
            self.root.display()
        );

        let index = ModuleIdIndex::read(&self.root.join(MODULE_IDS_FILE))?;
        let id = index.resolve(query, policy)?;

        let mut dir = self.root.join(id.name());
        if let Some(version) = id.version() {
            dir.push(version.as_str());
        }
        Ok(dir)
    }

    /// Find the configuration file of the module declaring `query`, searching this library
    /// first and then each ancestor.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModuleNotFound`] if no library in the chain declares the query.
    /// A damaged index stops the search and is returned as is.
    pub fn find_config(&self, query: &ModuleIdQuery, policy: VersionPolicy) -> Result<PathBuf> {
        for library in self.chain() {
            match library.find_declaring_module_dir(query, policy) {
                Ok(dir) => return Ok(dir.join(CONFIG_FILE)),
                Err(e) if e.is_not_found() => {
                    log::debug!("{} - trying parent library", e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::ModuleNotFound(query.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::LibraryFixture;

    fn query(q: &str) -> ModuleIdQuery {
        ModuleIdQuery::parse(q).unwrap()
    }

    #[test]
    fn open_single_library() {
        let fixture = LibraryFixture::new();
        let root = fixture.library("lib", None, &[("app@1.0", "app@1.0")]);

        let library = ModuleLibrary::open(&root).unwrap();
        assert_eq!(library.root(), root.as_path());
        assert!(library.parent().is_none());
        assert_eq!(library.chain().count(), 1);
    }

    #[test]
    fn open_missing_library() {
        let fixture = LibraryFixture::new();
        assert!(matches!(
            ModuleLibrary::open(fixture.path().join("nope")),
            Err(Error::InvalidLibrary(_))
        ));
    }

    #[test]
    fn parent_failure_fails_open() {
        let fixture = LibraryFixture::new();
        let root = fixture.library("child", Some("../missing"), &[]);
        assert!(matches!(
            ModuleLibrary::open(root),
            Err(Error::InvalidLibrary(_))
        ));
    }

    #[test]
    fn parent_cycle_detected() {
        let fixture = LibraryFixture::new();
        fixture.library("a", Some("../b"), &[]);
        let root = fixture.library("b", Some("../a"), &[]);
        assert!(matches!(
            ModuleLibrary::open(root),
            Err(Error::LibraryCycle(_))
        ));
    }

    #[test]
    fn declaring_dir_follows_aliases() {
        let fixture = LibraryFixture::new();
        let root = fixture.library(
            "lib",
            None,
            &[("A", "B"), ("B", "C@2.1"), ("C@2.1", "C@2.1")],
        );

        let library = ModuleLibrary::open(&root).unwrap();
        let dir = library
            .find_declaring_module_dir(&query("A"), VersionPolicy::Newest)
            .unwrap();
        assert_eq!(dir, root.join("C").join("2.1"));
    }

    #[test]
    fn config_found_in_parent() {
        let fixture = LibraryFixture::new();
        let parent = fixture.library("parent", None, &[("q@1", "q@1")]);
        let child = fixture.library("child", Some("../parent"), &[("other@1", "other@1")]);

        let library = ModuleLibrary::open(&child).unwrap();
        assert_eq!(library.chain().count(), 2);

        let config = library.find_config(&query("q"), VersionPolicy::Newest).unwrap();
        assert_eq!(
            fs::canonicalize(config.parent().unwrap()).unwrap(),
            fs::canonicalize(parent.join("q").join("1")).unwrap()
        );
        assert!(config.ends_with("config"));
    }

    #[test]
    fn child_shadows_parent() {
        let fixture = LibraryFixture::new();
        fixture.library("parent", None, &[("q@1", "q@1")]);
        let child = fixture.library("child", Some("../parent"), &[("q@2", "q@2")]);

        let library = ModuleLibrary::open(&child).unwrap();
        let config = library.find_config(&query("q"), VersionPolicy::Newest).unwrap();
        assert_eq!(config, child.join("q").join("2").join("config"));
    }

    #[test]
    fn config_not_found_anywhere() {
        let fixture = LibraryFixture::new();
        fixture.library("parent", None, &[]);
        let child = fixture.library("child", Some("../parent"), &[]);

        let library = ModuleLibrary::open(&child).unwrap();
        assert!(matches!(
            library.find_config(&query("q"), VersionPolicy::Newest),
            Err(Error::ModuleNotFound(_))
        ));
    }

    #[test]
    fn corrupt_index_is_surfaced() {
        let fixture = LibraryFixture::new();
        fixture.library("parent", None, &[("q@1", "q@1")]);
        let child = fixture.library("child", Some("../parent"), &[]);
        fs::write(child.join(MODULE_IDS_FILE), [0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        let library = ModuleLibrary::open(&child).unwrap();
        assert!(library
            .find_config(&query("q"), VersionPolicy::Newest)
            .unwrap_err()
            .is_header_mismatch());
    }
}
