//! # modlib Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the modlib library. Import this module to get quick access to the resolver, its
//! settings and the handles it hands out.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all modlib operations
pub use crate::Error;

/// The result type used throughout modlib
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Resolves module queries and finds classes
pub use crate::Resolver;

/// Resolver configuration
pub use crate::ResolverSettings;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Context Graph
// ================================================================================================

/// Loaded configuration and the handles it issues
pub use crate::graph::{Configuration, Context, ContextHandle, ModuleHandle, ModuleInfo};

// ================================================================================================
// Module Libraries
// ================================================================================================

/// Library chains and module identifiers
pub use crate::library::{
    ModuleId, ModuleIdQuery, ModuleLibrary, ModuleVersion, Relation, VersionPolicy,
};

/// Configuration body formats
pub use crate::config::ConfigFormat;

// ================================================================================================
// Class Containers
// ================================================================================================

/// Pluggable container backends
pub use crate::container::{ClassContainer, ContainerBackend, EntryInfo, ZipBackend};
