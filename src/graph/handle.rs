use std::fmt;

/// Opaque reference to a context of a loaded configuration.
///
/// A handle records the generation of the configuration that issued it. Once that
/// configuration is replaced or unloaded, the handle is rejected with
/// [`crate::Error::InvalidContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

/// Opaque reference to a module of a loaded configuration.
///
/// See [`ContextHandle`] for the validity rules; stale module handles are rejected with
/// [`crate::Error::InvalidModule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl ContextHandle {
    /// Position of the context in declaration order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl ModuleHandle {
    /// Position of the module in the configuration's module table.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}@{}", self.index, self.generation)
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}@{}", self.index, self.generation)
    }
}
