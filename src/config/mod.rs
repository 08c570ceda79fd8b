//! Binary module configurations.
//!
//! A resolved module query points at a `config` file describing the contexts of the
//! application: named groups of modules that share a class loader, in class-search order.
//! The file also carries class maps, remote package maps, supplier lists and service
//! tables; the resolver only needs the contexts and their modules, the rest is skipped.
//!
//! # Layout
//!
//! After the common file header (kind [`crate::format::FileKind::ModuleConfig`]):
//!
//! ```text
//! roots            count, then module-id strings          (skipped)
//! context names    count, then strings
//! package names    count, then strings                    (indexed format only, skipped)
//! per context:
//!   modules        count, then (module-id, library-path, view count, view strings)
//!   local classes  count, then (class, module-id)          simple format
//!                         or (pkg index i32, class, module index i32)   indexed format
//!   remote pkgs    count, then (package, context) pairs
//!   suppliers      count, then context-name strings
//!   services       count, then (service, impl count, impl strings)
//! ```
//!
//! Bytes after the last context are ignored.
//!
//! # Examples
//!
//! ```rust,no_run
//! use modlib::config::{ConfigFormat, ConfigReader};
//! use std::path::Path;
//!
//! let config = ConfigReader::new(ConfigFormat::Simple)
//!     .read(Path::new("/opt/app/modules/app/1.0/config"))?;
//! for context in &config.contexts {
//!     println!("{}: {} modules", context.name, context.modules.len());
//! }
//! # Ok::<(), modlib::Error>(())
//! ```

mod reader;

pub use reader::ConfigReader;

use std::path::Path;

use crate::library::{ModuleId, ModuleVersion};

/// Encoding variant of the configuration body.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConfigFormat {
    /// Local classes stored as (class, module-id) string pairs
    #[default]
    Simple,
    /// Package names interned in a table, local classes stored with indices into it
    Indexed,
}

/// One module record of a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// The module id as declared
    pub id: ModuleId,
    /// Library holding the module, `None` for the configuration's own library
    pub library_path: Option<String>,
}

impl ModuleRecord {
    /// The module name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// The module version, `None` for an alias.
    #[must_use]
    pub fn version(&self) -> Option<&ModuleVersion> {
        self.id.version()
    }

    /// The library path override as a path.
    #[must_use]
    pub fn library_override(&self) -> Option<&Path> {
        self.library_path.as_deref().map(Path::new)
    }
}

/// A context as declared in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRecord {
    /// Context name
    pub name: String,
    /// Modules in class-search order
    pub modules: Vec<ModuleRecord>,
}

/// The parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Contexts in declaration order
    pub contexts: Vec<ContextRecord>,
}
