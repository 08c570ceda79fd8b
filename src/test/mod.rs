//! Shared helpers for unit tests: byte-level builders for the library formats, an on-disk
//! library fixture and an in-memory container backend.


pub use backend::MockBackend;
pub use builders::{ConfigBuilder, FormatBuilder};

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::{
    config::{ConfigFormat, ConfigReader, ModuleConfig},
    format::{FileKind, CONFIG_FILE, LIBRARY_FILE, MODULE_IDS_FILE},
};

// Helper function to encode a %mids index
pub fn mids_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = FormatBuilder::new()
        .header(FileKind::ModuleIds)
        .i32(entries.len() as i32);
    for (id, provider) in entries {
        builder = builder.utf8(id).utf8(provider);
    }
    builder.build()
}

// Helper function to encode a library header
pub fn library_bytes(parent: Option<&str>) -> Vec<u8> {
    FormatBuilder::new()
        .header(FileKind::LibraryHeader)
        .u16(0)
        .optional_utf8(parent)
        .build()
}

// Helper function to encode a simple config with the given contexts and (module-id, libpath) records
pub fn config_bytes(contexts: &[(&str, &[(&str, &str)])]) -> Vec<u8> {
    let mut builder = ConfigBuilder::new(ConfigFormat::Simple);
    for (name, modules) in contexts {
        builder = builder.context(name, modules);
    }
    builder.build()
}

// Helper function to create a parsed config
pub fn module_config(contexts: &[(&str, &[(&str, &str)])]) -> ModuleConfig {
    ConfigReader::new(ConfigFormat::Simple)
        .parse(&config_bytes(contexts))
        .unwrap()
}

/// A temporary directory holding module libraries.
pub struct LibraryFixture {
    dir: TempDir,
}

impl LibraryFixture {
    pub fn new() -> LibraryFixture {
        LibraryFixture {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a library below the fixture with a header and a `%mids` index.
    pub fn library(&self, name: &str, parent: Option<&str>, mids: &[(&str, &str)]) -> PathBuf {
        let root = self.dir.path().join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(LIBRARY_FILE), library_bytes(parent)).unwrap();
        fs::write(root.join(MODULE_IDS_FILE), mids_bytes(mids)).unwrap();
        root
    }

    /// Install a module directory with the given config file.
    pub fn module(&self, root: &Path, name: &str, version: &str, config: &[u8]) -> PathBuf {
        let dir = root.join(name).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), config).unwrap();
        dir
    }
}
