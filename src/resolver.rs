//! The resolver entry point used by an embedding virtual machine.
//!
//! A [`Resolver`] owns at most one loaded [`Configuration`]. Loading resolves a module query
//! against a library chain, parses the declaring module's configuration and builds the
//! context graph; lookups then find and read class files through the configured
//! [`ContainerBackend`].
//!
//! # Lifecycle
//!
//! - [`Resolver::load_contexts`] replaces any previous configuration. Its containers are
//!   closed and every handle it issued becomes invalid.
//! - [`Resolver::unload`] releases the configuration explicitly.
//! - Lookups take `&self` and may run concurrently; loading and unloading take `&mut self`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use modlib::Resolver;
//!
//! let library = Resolver::system_module_library_path("/opt/jdk")?;
//! let mut resolver = Resolver::new();
//! let base = resolver.load_contexts(&library, None, Some("app@1.0"), &["jdk.zipfs"])?;
//!
//! let (module, size) = resolver.find_local_class(Some(base), "app/Main")?;
//! let mut buf = vec![0u8; size as usize];
//! resolver.read_local_class(module, "app/Main", &mut buf)?;
//!
//! let info = resolver.module_info(module)?;
//! println!("{} bytes from {}@{:?}", size, info.name, info.version);
//! # Ok::<(), modlib::Error>(())
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    config::ConfigReader,
    container::{ContainerBackend, ZipBackend},
    file::File,
    format::{check_header, FileKind, BASE_MODULE, CLASSPATH_MODULE, LIBRARY_FILE},
    graph::{Configuration, Context, ContextHandle, ModuleHandle, ModuleInfo},
    library::{ModuleIdQuery, ModuleLibrary},
    settings::ResolverSettings,
    Error, Result,
};

/// Generations are unique across every resolver in the process, so a handle is only ever
/// accepted by the configuration that issued it.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Resolves module queries to context graphs and classes to modules.
pub struct Resolver {
    settings: ResolverSettings,
    backend: Box<dyn ContainerBackend>,
    config: Option<Configuration>,
    generation: u64,
}

impl Resolver {
    /// Create a resolver with default settings and the zip container backend.
    #[must_use]
    pub fn new() -> Resolver {
        Resolver::with_settings(ResolverSettings::default())
    }

    /// Create a resolver with the given settings and the zip container backend.
    #[must_use]
    pub fn with_settings(settings: ResolverSettings) -> Resolver {
        Resolver::with_backend(settings, Box::new(ZipBackend))
    }

    /// Create a resolver with the given settings and container backend.
    #[must_use]
    pub fn with_backend(settings: ResolverSettings, backend: Box<dyn ContainerBackend>) -> Resolver {
        Resolver {
            settings,
            backend,
            config: None,
            generation: 0,
        }
    }

    /// The settings this resolver was created with.
    #[must_use]
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Locate the system module library of a runtime installation.
    ///
    /// Returns `<java_home>/lib/modules` after checking its library header.
    ///
    /// # Errors
    /// Returns [`crate::Error::LibraryNotFound`] if the header file is missing, and
    /// [`crate::Error::InvalidLibrary`] if its header is damaged.
    pub fn system_module_library_path(java_home: impl AsRef<Path>) -> Result<PathBuf> {
        let path = java_home.as_ref().join("lib").join("modules");
        log::trace!("system module library {}", path.display());

        let file = File::open(&path.join(LIBRARY_FILE)).map_err(|e| {
            log::debug!("{}", e);
            Error::LibraryNotFound(path.clone())
        })?;
        check_header(&mut file.parser(), FileKind::LibraryHeader).map_err(|e| {
            log::debug!("{}", e);
            Error::InvalidLibrary(path.clone())
        })?;

        Ok(path)
    }

    /// Like [`Resolver::system_module_library_path`], writing the path into `buf`.
    ///
    /// The path bytes are followed by a NUL terminator. Returns the path length without the
    /// terminator.
    ///
    /// # Errors
    /// Returns [`crate::Error::BufferTooShort`] if the path and terminator do not fit, and the
    /// errors of [`Resolver::system_module_library_path`] otherwise.
    pub fn system_module_library_path_into(
        java_home: impl AsRef<Path>,
        buf: &mut [u8],
    ) -> Result<usize> {
        let path = Resolver::system_module_library_path(java_home)?;
        let bytes = path.as_os_str().as_encoded_bytes();

        let needed = bytes.len() + 1;
        if needed > buf.len() {
            return Err(Error::BufferTooShort {
                needed,
                available: buf.len(),
            });
        }

        buf[..bytes.len()].copy_from_slice(bytes);
        buf[bytes.len()] = 0;
        Ok(bytes.len())
    }

    /// Resolve `query` in the library chain rooted at `library` and load its contexts.
    ///
    /// Without a query the configuration is loaded in classpath mode from the module
    /// `jdk.classpath`, or from `jdk.base` if the chain does not declare it. Contexts
    /// containing a module named in `non_bootstrap` are excluded from bootstrap loading.
    /// `module_path` is accepted for interface compatibility and ignored.
    ///
    /// On success the previous configuration is released and the base context is returned. On
    /// failure the previous configuration stays loaded.
    ///
    /// # Errors
    /// Returns library errors from opening the chain, [`crate::Error::ModuleNotFound`] if no
    /// library declares the query, configuration format errors, and
    /// [`crate::Error::BaseModuleNotFound`] if no context contains `jdk.base`.
    pub fn load_contexts(
        &mut self,
        library: impl AsRef<Path>,
        module_path: Option<&Path>,
        query: Option<&str>,
        non_bootstrap: &[&str],
    ) -> Result<ContextHandle> {
        let library = library.as_ref();
        self.trace(format_args!(
            "load_contexts {} {}",
            library.display(),
            query.unwrap_or("<classpath>")
        ));
        if let Some(module_path) = module_path {
            log::debug!("module path {} ignored", module_path.display());
        }

        let chain = ModuleLibrary::open(library)?;
        let config_path = match query {
            Some(query) => {
                let query = ModuleIdQuery::parse(query)?;
                chain.find_config(&query, self.settings.version_policy)?
            }
            None => self.find_classpath_config(&chain)?,
        };
        self.trace(format_args!("config {}", config_path.display()));

        let parsed = ConfigReader::new(self.settings.config_format)
            .with_trace(self.settings.trace)
            .read(&config_path)?;

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let mut config = Configuration::new(
            parsed,
            library.to_path_buf(),
            config_path,
            query.is_none(),
            generation,
        )?;
        config.init_bootstrap(non_bootstrap);

        let base = config.base_context();
        self.generation = generation;
        if let Some(previous) = self.config.replace(config) {
            log::debug!(
                "released configuration {}",
                previous.config_path().display()
            );
        }
        Ok(base)
    }

    fn find_classpath_config(&self, chain: &ModuleLibrary) -> Result<PathBuf> {
        let policy = self.settings.version_policy;
        match chain.find_config(&ModuleIdQuery::parse(CLASSPATH_MODULE)?, policy) {
            Err(Error::ModuleNotFound(_)) => {
                log::debug!("{} not installed, using {}", CLASSPATH_MODULE, BASE_MODULE);
                chain.find_config(&ModuleIdQuery::parse(BASE_MODULE)?, policy)
            }
            other => other,
        }
    }

    /// Release the loaded configuration, closing its containers.
    ///
    /// Returns `true` if a configuration was loaded.
    pub fn unload(&mut self) -> bool {
        self.config.take().is_some()
    }

    /// Reclassify the contexts of the loaded configuration for the bootstrap loader.
    ///
    /// Does nothing if no configuration is loaded.
    pub fn init_bootstrap_contexts(&mut self, excluded: &[&str]) {
        if let Some(config) = self.config.as_mut() {
            config.init_bootstrap(excluded);
        }
    }

    /// The loaded configuration, if any.
    #[must_use]
    pub fn configuration(&self) -> Option<&Configuration> {
        self.config.as_ref()
    }

    /// Iterate the contexts of the loaded configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::ContextsNotLoaded`] if nothing is loaded.
    pub fn contexts(&self) -> Result<impl Iterator<Item = (ContextHandle, &Context)>> {
        Ok(self.loaded()?.contexts())
    }

    /// Find the module supplying `class_name` and the size of its class file.
    ///
    /// `context` defaults to the base context. See [`Configuration::find_local_class`] for the
    /// search order.
    ///
    /// # Errors
    /// Returns [`crate::Error::ContextsNotLoaded`] if nothing is loaded,
    /// [`crate::Error::InvalidContext`] for a stale handle, and the lookup errors of
    /// [`Configuration::find_local_class`].
    pub fn find_local_class(
        &self,
        context: Option<ContextHandle>,
        class_name: &str,
    ) -> Result<(ModuleHandle, u64)> {
        let config = self.loaded()?;
        let (module, entry) = config.find_local_class(
            context,
            class_name,
            self.backend.as_ref(),
            self.settings.max_class_name_len,
        )?;

        self.trace(format_args!(
            "{} found in {} ({} bytes)",
            class_name, module, entry.size
        ));
        Ok((module, entry.size))
    }

    /// Read the class file of `class_name` from `module` into `buf`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ContextsNotLoaded`] if nothing is loaded,
    /// [`crate::Error::InvalidModule`] for a stale handle, and the errors of
    /// [`Configuration::read_local_class`].
    pub fn read_local_class(
        &self,
        module: ModuleHandle,
        class_name: &str,
        buf: &mut [u8],
    ) -> Result<()> {
        let config = self.loaded()?;
        config.read_local_class(
            module,
            class_name,
            buf,
            self.backend.as_ref(),
            self.settings.max_class_name_len,
        )?;
        Ok(())
    }

    /// Describe a module of the loaded configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::ContextsNotLoaded`] if nothing is loaded and
    /// [`crate::Error::InvalidModule`] for a stale handle.
    pub fn module_info(&self, module: ModuleHandle) -> Result<ModuleInfo> {
        self.loaded()?.module_info(module)
    }

    fn loaded(&self) -> Result<&Configuration> {
        self.config.as_ref().ok_or(Error::ContextsNotLoaded)
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.settings.trace {
            log::trace!("{}", args);
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("settings", &self.settings)
            .field("generation", &self.generation)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
