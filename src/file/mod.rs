//! File abstraction for module library metadata.
//!
//! Module libraries keep three kinds of small binary metadata files: the library header
//! (`%jigsaw-library`), the module-id index (`%mids`) and the per-module configuration
//! (`config`). This module maps their bytes from disk and provides the low-level decoding
//! utilities every reader uses.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - Owned view over the bytes of one metadata file
//! - [`crate::file::Backend`] - Trait over the storage of a mapped file
//! - [`crate::file::parser::Parser`] - Cursor-based, bounds-checked big-endian decoder
//! - [`crate::file::io`] - Endian-aware primitive decoding
//!
//! # Resource Model
//!
//! Readers open a [`File`], parse it completely and drop it before returning, so no file
//! descriptor or mapping outlives a single resolver call.
//!
//! # Examples
//!
//! ```rust,no_run
//! use modlib::File;
//! use std::path::Path;
//!
//! let file = File::open(Path::new("/opt/jdk/lib/modules/%mids"))?;
//! let mut parser = file.parser();
//! let magic = parser.read_be::<u32>()?;
//! println!("magic 0x{:08x}, {} bytes", magic, file.len());
//! # Ok::<(), modlib::Error>(())
//! ```

pub mod io;
pub mod parser;

mod physical;

use std::path::{Path, PathBuf};

use crate::Result;
use parser::Parser;
use physical::Physical;

/// Abstraction over the storage of a metadata file.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// The bytes of a single metadata file, together with where they came from.
pub struct File {
    path: PathBuf,
    data: Box<dyn Backend>,
}

impl File {
    /// Map the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OpenFailed`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<File> {
        let input = Physical::new(path)?;
        Ok(File {
            path: path.to_path_buf(),
            data: Box::new(input),
        })
    }

    /// The path this file was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the entire file content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns the file length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Create a parser positioned at the start of the file.
    #[must_use]
    pub fn parser(&self) -> Parser<'_> {
        Parser::new(self.data())
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}
