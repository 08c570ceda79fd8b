//! The `%jigsaw-library` header of a module library.
//!
//! # Layout
//!
//! After the common file header (kind [`FileKind::LibraryHeader`]):
//!
//! | Field | Encoding |
//! |-------|----------|
//! | flags | `u16`, see [`LibraryFlags`] |
//! | parent | `u8` present flag, then a string if set |
//! | natlibs | optional: `u8` present flag, then a string if set |
//! | natcmds | optional: `u8` present flag, then a string if set |
//! | configs | optional: `u8` present flag, then a string if set |
//!
//! Paths are stored with `/` separators. A header ending right after the parent path is valid,
//! older libraries do not record the native and config directories.

use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use bitflags::bitflags;

use crate::{
    file::{parser::Parser, File},
    format::{check_header, FileKind, LIBRARY_FILE},
    Error, Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Flags word of a library header
    pub struct LibraryFlags : u16 {
        /// Class containers of this library are deflated
        const DEFLATED = 0x0001;
    }
}

/// The parsed header of a module library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryHeader {
    /// Flags word, unknown bits are retained
    pub flags: LibraryFlags,
    /// Path of the parent library, as stored
    pub parent: Option<PathBuf>,
    /// Directory holding native libraries
    pub natlibs: Option<PathBuf>,
    /// Directory holding native commands
    pub natcmds: Option<PathBuf>,
    /// Directory holding configuration files
    pub configs: Option<PathBuf>,
}

impl LibraryHeader {
    /// Read the header of the library rooted at `root`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidLibrary`] if the header file cannot be opened, and the
    /// parse errors of [`LibraryHeader::parse`] otherwise.
    pub fn read(root: &Path) -> Result<LibraryHeader> {
        let path = root.join(LIBRARY_FILE);
        let file = File::open(&path).map_err(|e| {
            log::debug!("{}", e);
            Error::InvalidLibrary(root.to_path_buf())
        })?;

        LibraryHeader::parse(file.data())
    }

    /// Parse a library header from raw bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadHeader`] for a header mismatch, [`crate::Error::OutOfBounds`]
    /// if the data ends before the parent path, and [`crate::Error::Malformed`] for invalid
    /// UTF-8 paths.
    pub fn parse(data: &[u8]) -> Result<LibraryHeader> {
        let mut parser = Parser::new(data);
        check_header(&mut parser, FileKind::LibraryHeader)?;

        let flags = LibraryFlags::from_bits_retain(parser.read_be::<u16>()?);
        let parent = read_path(&mut parser)?;

        let mut trailing = [None, None, None];
        for slot in &mut trailing {
            if !parser.has_more_data() {
                break;
            }
            *slot = read_path(&mut parser)?;
        }
        let [natlibs, natcmds, configs] = trailing;

        Ok(LibraryHeader {
            flags,
            parent,
            natlibs,
            natcmds,
            configs,
        })
    }

    /// Returns `true` if the library has a parent.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

/// Read a flag byte and, if it is set, a `/`-separated path.
fn read_path(parser: &mut Parser<'_>) -> Result<Option<PathBuf>> {
    if parser.read_be::<u8>()? == 0 {
        return Ok(None);
    }

    let raw = parser.read_utf8_ref()?;
    Ok(Some(PathBuf::from(raw.replace('/', MAIN_SEPARATOR_STR))))
}
