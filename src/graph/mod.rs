//! The context graph of a loaded configuration.
//!
//! A [`Configuration`] is the in-memory result of resolving one module query: the contexts of
//! the parsed configuration file, the modules they contain, and the base context holding
//! `jdk.base`. Contexts and modules live in flat tables owned by the configuration and are
//! addressed through generation-checked [`ContextHandle`] and [`ModuleHandle`] values.
//!
//! # Key Components
//!
//! - [`Configuration`] - Context and module tables, base identification, class search
//! - [`Context`] - A named, ordered group of modules with its bootstrap classification
//! - [`ModuleEntry`] - A module with its lazily opened class container
//! - [`ModuleInfo`] - Owned snapshot of a module's identity and container source
//!
//! # Class Search
//!
//! Within a context modules are searched in declaration order, except that the base context
//! always starts with the base module. `jdk.classpath` is never searched. In classpath mode a
//! class missing from the requested context is looked up in every other bootstrap-eligible
//! context. See [`Configuration::find_local_class`].

mod handle;
mod search;

pub use handle::{ContextHandle, ModuleHandle};

use std::path::{Path, PathBuf};

use crate::{
    config::ModuleConfig,
    container::ModuleContainer,
    format::{BASE_MODULE, CLASSES_FILE},
    library::ModuleVersion,
    Error, Result,
};

/// A named group of modules sharing a class loader.
#[derive(Debug)]
pub struct Context {
    name: String,
    modules: Vec<ModuleHandle>,
    bootstrap: bool,
}

impl Context {
    /// The context name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modules in class-search order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleHandle] {
        &self.modules
    }

    /// Returns `true` if the bootstrap loader may load classes from this context.
    #[must_use]
    pub fn is_bootstrap(&self) -> bool {
        self.bootstrap
    }
}

/// A module of a loaded configuration.
#[derive(Debug)]
pub struct ModuleEntry {
    name: String,
    version: Option<ModuleVersion>,
    library_path: Option<PathBuf>,
    context: ContextHandle,
    container: ModuleContainer,
}

impl ModuleEntry {
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

    /// The library path override, `None` if the module lives in the configuration's library.
    #[must_use]
    pub fn library_path(&self) -> Option<&Path> {
        self.library_path.as_deref()
    }

    /// The context this module belongs to.
    #[must_use]
    pub fn context(&self) -> ContextHandle {
        self.context
    }

    /// The module's container cache.
    #[must_use]
    pub fn container(&self) -> &ModuleContainer {
        &self.container
    }
}

/// Snapshot of a module's identity, as reported by [`crate::Resolver::module_info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name
    pub name: String,
    /// Module version, `None` for an alias
    pub version: Option<String>,
    /// Library path override
    pub library_path: Option<PathBuf>,
    /// Path of the class container, `None` until it has been opened
    pub source: Option<PathBuf>,
}

/// The contexts and modules of one resolved module query.
#[derive(Debug)]
pub struct Configuration {
    generation: u64,
    classpath_mode: bool,
    library_root: PathBuf,
    config_path: PathBuf,
    contexts: Vec<Context>,
    modules: Vec<ModuleEntry>,
    base_context: usize,
    base_module: usize,
}

impl Configuration {
    /// Build the context graph of a parsed configuration and identify its base.
    ///
    /// The base context is the first context containing a module named `jdk.base`. All
    /// contexts start out bootstrap-eligible.
    ///
    /// # Errors
    /// Returns [`crate::Error::BaseModuleNotFound`] if no context contains `jdk.base`.
    pub fn new(
        config: ModuleConfig,
        library_root: PathBuf,
        config_path: PathBuf,
        classpath_mode: bool,
        generation: u64,
    ) -> Result<Configuration> {
        let mut contexts = Vec::with_capacity(config.contexts.len());
        let mut modules = Vec::new();
        let mut base = None;

        for (cx_index, record) in config.contexts.into_iter().enumerate() {
            let context = ContextHandle {
                index: cx_index,
                generation,
            };

            let mut members = Vec::with_capacity(record.modules.len());
            for module in record.modules {
                let handle = ModuleHandle {
                    index: modules.len(),
                    generation,
                };
                if base.is_none() && module.name() == BASE_MODULE {
                    base = Some((cx_index, handle.index));
                }

                members.push(handle);
                modules.push(ModuleEntry {
                    name: module.id.name().to_string(),
                    version: module.id.version().cloned(),
                    library_path: module.library_path.map(PathBuf::from),
                    context,
                    container: ModuleContainer::new(),
                });
            }

            log::trace!("{}: {} modules", record.name, members.len());
            contexts.push(Context {
                name: record.name,
                modules: members,
                bootstrap: true,
            });
        }

        let Some((base_context, base_module)) = base else {
            return Err(Error::BaseModuleNotFound);
        };

        Ok(Configuration {
            generation,
            classpath_mode,
            library_root,
            config_path,
            contexts,
            modules,
            base_context,
            base_module,
        })
    }

    /// Classify contexts for the bootstrap loader.
    ///
    /// A context is eligible iff none of its modules is named in `excluded`. The base context is
    /// classified like any other.
    pub fn init_bootstrap(&mut self, excluded: &[&str]) {
        for context in &mut self.contexts {
            context.bootstrap = context.modules.iter().all(|handle| {
                let name = self.modules[handle.index].name.as_str();
                !excluded.contains(&name)
            });
        }
    }

    /// The generation handles of this configuration carry.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if this configuration was loaded without a module query.
    #[must_use]
    pub fn is_classpath_mode(&self) -> bool {
        self.classpath_mode
    }

    /// Root of the library the query was resolved in.
    #[must_use]
    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Path of the parsed configuration file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Handle of the base context.
    #[must_use]
    pub fn base_context(&self) -> ContextHandle {
        ContextHandle {
            index: self.base_context,
            generation: self.generation,
        }
    }

    /// Handle of the base module.
    #[must_use]
    pub fn base_module(&self) -> ModuleHandle {
        ModuleHandle {
            index: self.base_module,
            generation: self.generation,
        }
    }

    /// Iterate all contexts in declaration order.
    pub fn contexts(&self) -> impl Iterator<Item = (ContextHandle, &Context)> {
        let generation = self.generation;
        self.contexts
            .iter()
            .enumerate()
            .map(move |(index, context)| (ContextHandle { index, generation }, context))
    }

    /// Look up a context.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContext`] for a handle of another configuration.
    pub fn context(&self, handle: ContextHandle) -> Result<&Context> {
        if handle.generation != self.generation {
            return Err(Error::InvalidContext);
        }
        self.contexts.get(handle.index).ok_or(Error::InvalidContext)
    }

    /// Look up a module.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidModule`] for a handle of another configuration.
    pub fn module(&self, handle: ModuleHandle) -> Result<&ModuleEntry> {
        if handle.generation != self.generation {
            return Err(Error::InvalidModule);
        }
        self.modules.get(handle.index).ok_or(Error::InvalidModule)
    }

    /// Path of a module's class container:
    /// `<library>/<name>/<version>/classes`, where `<library>` is the module's override or the
    /// configuration's library root.
    #[must_use]
    pub fn container_path(&self, module: &ModuleEntry) -> PathBuf {
        let library = module.library_path().unwrap_or(&self.library_root);
        let mut path = library.join(&module.name);
        if let Some(version) = &module.version {
            path.push(version.as_str());
        }
        path.push(CLASSES_FILE);
        path
    }

    /// Snapshot a module's identity and container source.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidModule`] for a stale handle, and
    /// [`crate::Error::LockError`] if the module's mutex is poisoned.
    pub fn module_info(&self, handle: ModuleHandle) -> Result<ModuleInfo> {
        let module = self.module(handle)?;
        Ok(ModuleInfo {
            name: module.name.clone(),
            version: module.version.as_ref().map(ToString::to_string),
            library_path: module.library_path.clone(),
            source: module.container.source()?,
        })
    }
}
