//! Memory-mapped file backend for on-disk library metadata.
//!
//! The [`crate::file::physical::Physical`] backend maps a file read-only into memory. The file
//! descriptor is released as soon as the mapping exists, and the mapping itself lives only as
//! long as the [`crate::file::File`] that owns it, which the readers drop before returning.

use super::Backend;
use crate::{Error, Result};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A read-only memory mapping of a file on disk.
#[derive(Debug)]
pub struct Physical {
    data: Mmap,
}

impl Physical {
    /// Map the file at `path` into memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::OpenFailed`] if the file cannot be opened and
    /// [`crate::Error::FileError`] if it cannot be mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| Error::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: the mapping is read-only and library metadata files are never rewritten in
        // place while a resolver reads them.
        let mmap = unsafe { Mmap::map(&file) }?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [0xCA, 0xFE, 0x00, 0xFA, 0x00, 0x02]).unwrap();

        let physical = Physical::new(&path).unwrap();
        assert_eq!(physical.len(), 6);
        assert_eq!(physical.data()[0], 0xCA);
        assert_eq!(physical.data()[5], 0x02);
    }

    #[test]
    fn test_physical_invalid_file_path() {
        let result = Physical::new("/nonexistent/path/to/%mids");
        match result.unwrap_err() {
            Error::OpenFailed { path, source } => {
                assert!(path.ends_with("%mids"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected OpenFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_physical_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let physical = Physical::new(&path).unwrap();
        assert_eq!(physical.len(), 0);
        assert!(physical.data().is_empty());
    }
}
