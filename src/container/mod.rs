//! Class containers and the per-module container cache.
//!
//! Every installed module keeps its compiled classes in a single container file,
//! `<library>/<name>/<version>/classes`, which is a zip archive. This module abstracts the
//! container format behind two traits so an embedder can plug in its own reader, ships a
//! [`ZipBackend`] built on the `zip` crate, and provides [`ModuleContainer`], the lazily
//! opened, mutex-guarded slot each module uses to cache its open container.
//!
//! # Key Components
//!
//! - [`ContainerBackend`] - Opens a container by path
//! - [`ClassContainer`] - Finds and reads entries of one open container
//! - [`EntryInfo`] - Descriptor of a found entry
//! - [`ZipBackend`] - Default backend for zip archives, stored and deflated entries
//! - [`ModuleContainer`] - Per-module cache of the open container
//!
//! # Thread Safety
//!
//! Opening a module's container and every find or read through it happen under that module's
//! mutex, so containers only need to be [`Send`]. Different modules are independent.
//!
//! # Examples
//!
//! ```rust,no_run
//! use modlib::container::{ContainerBackend, ZipBackend};
//! use std::path::Path;
//!
//! let mut container = ZipBackend.open(Path::new("/opt/app/modules/app/1.0/classes"))?;
//! if let Some(entry) = container.find("app/Main.class")? {
//!     let mut buf = vec![0u8; entry.size as usize];
//!     container.read(&entry, &mut buf)?;
//! }
//! # Ok::<(), modlib::Error>(())
//! ```

mod archive;

pub use archive::ZipBackend;

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{Error, Result};

/// Descriptor of a container entry returned by [`ClassContainer::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// Backend specific position of the entry
    pub index: usize,
    /// Uncompressed size in bytes
    pub size: u64,
    /// Length of the stored entry name in bytes
    pub name_len: usize,
}

/// An open class container.
pub trait ClassContainer: Send {
    /// Look up an entry by its full name.
    ///
    /// # Errors
    /// Returns an error only if the container itself is unreadable; an absent entry is
    /// `Ok(None)`.
    fn find(&mut self, name: &str) -> Result<Option<EntryInfo>>;

    /// Copy the uncompressed content of `entry` into the start of `buf`.
    ///
    /// Callers guarantee that `buf` holds at least `entry.size` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReadClassEntry`] if the entry cannot be read.
    fn read(&mut self, entry: &EntryInfo, buf: &mut [u8]) -> Result<()>;
}

/// A factory for [`ClassContainer`]s.
pub trait ContainerBackend: Send + Sync {
    /// Open the container at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ContainerOpen`] if the file is missing or not a container, and
    /// [`crate::Error::BackendUnavailable`] if the backend cannot operate at all.
    fn open(&self, path: &Path) -> Result<Box<dyn ClassContainer>>;
}

#[derive(Default)]
struct Slot {
    container: Option<Box<dyn ClassContainer>>,
    source: Option<PathBuf>,
}

impl Slot {
    fn open(&mut self, path: &Path, backend: &dyn ContainerBackend) -> Result<()> {
        if self.container.is_some() {
            return Ok(());
        }

        log::debug!("open class container {}", path.display());
        // A failed open leaves the slot empty, the next lookup tries again
        let container = backend.open(path)?;
        self.container = Some(container);
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    fn find(
        &mut self,
        path: &Path,
        backend: &dyn ContainerBackend,
        entry: &str,
    ) -> Result<Option<EntryInfo>> {
        self.open(path, backend)?;
        match self.container.as_mut() {
            Some(container) => container.find(entry),
            None => Err(Error::BackendUnavailable(path.display().to_string())),
        }
    }
}

/// The lazily opened class container of one module.
///
/// The container is opened on first use and kept until the owning configuration is dropped.
#[derive(Default)]
pub struct ModuleContainer {
    slot: Mutex<Slot>,
}

impl ModuleContainer {
    /// Create an empty, unopened slot.
    #[must_use]
    pub fn new() -> ModuleContainer {
        ModuleContainer::default()
    }

    /// Path of the opened container, `None` until it has been opened.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the slot mutex is poisoned.
    pub fn source(&self) -> Result<Option<PathBuf>> {
        let source = with_lock!(self.slot, |slot: &mut Slot| slot.source.clone());
        Ok(source)
    }

    /// Returns `true` once the container has been opened.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the slot mutex is poisoned.
    pub fn is_open(&self) -> Result<bool> {
        let open = with_lock!(self.slot, |slot: &mut Slot| slot.container.is_some());
        Ok(open)
    }

    /// Find `entry`, opening the container at `path` first if needed.
    ///
    /// # Errors
    /// Returns the backend's open error (not cached), or a container failure.
    pub fn find(
        &self,
        path: &Path,
        backend: &dyn ContainerBackend,
        entry: &str,
    ) -> Result<Option<EntryInfo>> {
        let mut slot = lock!(self.slot);
        slot.find(path, backend, entry)
    }

    /// Find `entry` and copy its content into `buf`, holding the module lock throughout.
    ///
    /// Returns the entry descriptor, or `None` if the container has no such entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::BufferTooShort`] if `buf` is smaller than the entry, the
    /// backend's open error, or [`crate::Error::ReadClassEntry`] if reading fails.
    pub fn read(
        &self,
        path: &Path,
        backend: &dyn ContainerBackend,
        entry: &str,
        buf: &mut [u8],
    ) -> Result<Option<EntryInfo>> {
        let mut slot = lock!(self.slot);
        let Some(info) = slot.find(path, backend, entry)? else {
            return Ok(None);
        };

        let needed = usize::try_from(info.size).unwrap_or(usize::MAX);
        if buf.len() < needed {
            return Err(Error::BufferTooShort {
                needed,
                available: buf.len(),
            });
        }

        match slot.container.as_mut() {
            Some(container) => container.read(&info, buf)?,
            None => return Err(Error::BackendUnavailable(path.display().to_string())),
        }
        Ok(Some(info))
    }
}

impl std::fmt::Debug for ModuleContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = self
            .slot
            .try_lock()
            .ok()
            .and_then(|slot| slot.source.clone());
        f.debug_struct("ModuleContainer")
            .field("source", &source)
            .finish()
    }
}
