// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # modlib
//!
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://www.apache.org/licenses/LICENSE-2.0)
//!
//! A resolver for native module libraries as used by modular Java runtimes. `modlib` reads the
//! on-disk metadata of a module library, resolves a module query to the module that declares
//! it, loads that module's configuration into a graph of contexts and finds class files inside
//! the per-module `classes` containers.
//!
//! ## Features
//!
//! - **Binary format readers** - Bounds-checked big-endian decoding of library headers, `%mids`
//!   indexes and module configurations, in both the simple and the indexed body format
//! - **Library chains** - Parent delegation across libraries with cycle detection
//! - **Version selection** - Module queries with version constraints and alias chasing
//! - **Context graph** - Typed, generation-checked handles instead of raw pointers
//! - **Lazy containers** - Zip containers opened on first lookup and cached per module
//!
//! ## Quick Start
//!
//! Add `modlib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! modlib = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use modlib::prelude::*;
//!
//! let library = Resolver::system_module_library_path("/opt/jdk")?;
//! let mut resolver = Resolver::with_settings(ResolverSettings::from_env());
//! resolver.load_contexts(&library, None, None, &[])?;
//!
//! let (module, size) = resolver.find_local_class(None, "java/lang/Object")?;
//! let mut class = vec![0u8; size as usize];
//! resolver.read_local_class(module, "java/lang/Object", &mut class)?;
//! # Ok::<(), modlib::Error>(())
//! ```
//!
//! ### Inspecting a Library
//!
//! ```rust,no_run
//! use modlib::library::{ModuleIdQuery, ModuleLibrary, VersionPolicy};
//!
//! let chain = ModuleLibrary::open("/opt/app/lib/modules")?;
//! for library in chain.chain() {
//!     println!("{}", library.root().display());
//! }
//!
//! let query = ModuleIdQuery::parse("app@>=1.0")?;
//! let config = chain.find_config(&query, VersionPolicy::Newest)?;
//! println!("configuration at {}", config.display());
//! # Ok::<(), modlib::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - Byte sources and the bounds-checked [`Parser`]
//! - [`format`] - Magic numbers, file kinds and the shared header check
//! - [`library`] - Library headers, module ids, `%mids` indexes and chain traversal
//! - [`config`] - Module configuration reader
//! - [`container`] - Class containers and the per-module open-once cache
//! - [`graph`] - The loaded [`graph::Configuration`] and class search
//! - [`resolver`] - The [`Resolver`] entry point
//! - [`settings`] - [`ResolverSettings`] and environment overrides
//!
//! A library chain is opened fresh for every load. Nothing read from the library is cached
//! between loads except through the returned [`graph::Configuration`], which is replaced as a
//! whole by the next successful load.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Lookup failures that the runtime is
//! expected to recover from are distinct variants:
//!
//! ```rust,no_run
//! use modlib::{Error, Resolver};
//!
//! let mut resolver = Resolver::new();
//! resolver.load_contexts("/opt/jdk/lib/modules", None, None, &[])?;
//! match resolver.find_local_class(None, "com/example/Missing") {
//!     Ok((module, size)) => println!("{} bytes in {}", size, module),
//!     Err(Error::ClassNotFound(name)) => println!("no class {}", name),
//!     Err(Error::SearchFailed { class, failures }) => {
//!         println!("{} not found, {} containers failed", class, failures.len())
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! # Ok::<(), modlib::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger. Resolution steps are
//! logged at `debug`, parsed records at `trace` when [`ResolverSettings::trace`] is set.
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! # Install fuzzing tools
//! cargo install cargo-fuzz
//!
//! # Run the configuration reader fuzzer
//! cargo +nightly fuzz run config --release
//!
//! # Run the %mids reader fuzzer
//! cargo +nightly fuzz run mids --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench --bench config
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// Import with `use modlib::prelude::*;` to get the resolver, its settings, handles and error
/// types in one line.
pub mod prelude;

/// Byte sources and low-level decoding.
///
/// Provides [`File`] for memory-mapped metadata files and [`Parser`] for
/// bounds-checked big-endian reads.
pub mod file;

/// Constants and header validation shared by all library file formats.
pub mod format;

/// Module libraries: headers, module ids, `%mids` indexes and parent chains.
///
/// # Example
///
/// ```rust,no_run
/// use modlib::library::{ModuleLibrary, ModuleIdQuery, VersionPolicy};
///
/// let chain = ModuleLibrary::open("/opt/app/lib/modules")?;
/// let dir = chain.find_declaring_module_dir(&ModuleIdQuery::parse("app")?, VersionPolicy::Newest)?;
/// println!("app installed at {}", dir.display());
/// # Ok::<(), modlib::Error>(())
/// ```
pub mod library;

/// Module configuration files.
///
/// A configuration lists the contexts of a module's world and the modules in each context.
pub mod config;

/// Class containers and the per-module container cache.
pub mod container;

/// The loaded context graph and class search.
pub mod graph;

/// Settings that tune a [`Resolver`].
pub mod settings;

/// The resolver entry point.
pub mod resolver;

/// `modlib` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// # Example
///
/// ```rust,no_run
/// use modlib::{Result, Resolver};
///
/// fn base_of(java_home: &str) -> Result<()> {
///     let library = Resolver::system_module_library_path(java_home)?;
///     let mut resolver = Resolver::new();
///     resolver.load_contexts(&library, None, None, &[])?;
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `modlib` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the full list of
/// variants.
pub use error::Error;

/// Main entry point for loading contexts and finding classes.
///
/// # Example
///
/// ```rust,no_run
/// use modlib::Resolver;
///
/// let mut resolver = Resolver::new();
/// let base = resolver.load_contexts("/opt/jdk/lib/modules", None, Some("jdk.base"), &[])?;
/// println!("base context {}", base);
/// # Ok::<(), modlib::Error>(())
/// ```
pub use resolver::Resolver;

/// Resolver configuration and presets.
pub use settings::ResolverSettings;

/// Handles and descriptions issued by a loaded configuration.
pub use graph::{Configuration, ContextHandle, ModuleHandle, ModuleInfo};

/// Provides access to the low-level byte parser.
///
/// # Example
///
/// ```rust
/// use modlib::Parser;
///
/// let data = [0xCA, 0xFE, 0x00, 0xFA];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_be::<u32>()?, 0xCAFE_00FA);
/// # Ok::<(), modlib::Error>(())
/// ```
pub use file::{parser::Parser, File};
