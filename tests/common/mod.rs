//! On-disk module library fixtures for the integration tests.
//!
//! Libraries are written into a temporary directory with real `%jigsaw-library`, `%mids` and
//! `config` files and zip class containers.

#![allow(dead_code)]

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use modlib::{
    container::{ClassContainer, ContainerBackend, ZipBackend},
    format::{
        FileKind, CLASSES_FILE, CONFIG_FILE, LIBRARY_FILE, MAGIC, MAJOR_VERSION, MINOR_VERSION,
        MODULE_IDS_FILE,
    },
    Result,
};
use tempfile::TempDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Big-endian encoder for the library file formats.
#[derive(Default)]
pub struct Encoder {
    data: Vec<u8>,
}

impl Encoder {
    pub fn new(kind: FileKind) -> Encoder {
        Encoder::default()
            .u32(MAGIC)
            .u16(kind as u16)
            .u16(MAJOR_VERSION)
            .u16(MINOR_VERSION)
    }

    pub fn u8(mut self, value: u8) -> Encoder {
        self.data.push(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Encoder {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Encoder {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn i32(mut self, value: i32) -> Encoder {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn str(mut self, value: &str) -> Encoder {
        let encoded = cesu8::to_java_cesu8(value);
        self.data
            .extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        self.data.extend_from_slice(&encoded);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

/// A context of a configuration: name and `(module-id, library-path)` records.
pub type ContextDef<'a> = (&'a str, &'a [(&'a str, &'a str)]);

/// Encode a library header, optionally naming a parent library.
pub fn library_header(parent: Option<&str>) -> Vec<u8> {
    let encoder = Encoder::new(FileKind::LibraryHeader).u16(0);
    match parent {
        Some(parent) => encoder.u8(1).str(parent).u8(0).u8(0).u8(0),
        None => encoder.u8(0),
    }
    .finish()
}

/// Encode a `%mids` index from `(id, provider)` pairs.
pub fn module_ids(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut encoder = Encoder::new(FileKind::ModuleIds).i32(entries.len() as i32);
    for (id, provider) in entries {
        encoder = encoder.str(id).str(provider);
    }
    encoder.finish()
}

/// Encode a simple-format configuration.
///
/// Every context also carries one local class, one remote package, one supplier and one service
/// so the reader has to skip over populated sections.
pub fn module_config(contexts: &[ContextDef<'_>]) -> Vec<u8> {
    let mut encoder = Encoder::new(FileKind::ModuleConfig).i32(1).str("root@1");

    encoder = encoder.i32(contexts.len() as i32);
    for (name, _) in contexts {
        encoder = encoder.str(name);
    }

    for (name, modules) in contexts {
        encoder = encoder.i32(modules.len() as i32);
        for (id, path) in modules.iter() {
            encoder = encoder.str(id).str(path).i32(1).str("view");
        }
        encoder = encoder
            .i32(1)
            .str("p/Local")
            .str("m@1")
            .i32(1)
            .str("p/remote")
            .str(name)
            .i32(1)
            .str(name)
            .i32(1)
            .str("p/Service")
            .i32(2)
            .str("p/ImplA")
            .str("p/ImplB");
    }
    encoder.finish()
}

/// Write a zip container holding `entries`, alternating stored and deflated entries.
pub fn write_container(path: &Path, entries: &[(&str, &[u8])]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
    for (i, (name, data)) in entries.iter().enumerate() {
        let method = if i % 2 == 0 {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        writer
            .start_file(*name, SimpleFileOptions::default().compression_method(method))
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// A temporary directory holding any number of module libraries.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Workspace {
        Workspace {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create the library `name` with the given parent and `%mids` entries.
    pub fn library(&self, name: &str, parent: Option<&str>, mids: &[(&str, &str)]) -> PathBuf {
        let root = self.dir.path().join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(LIBRARY_FILE), library_header(parent)).unwrap();
        fs::write(root.join(MODULE_IDS_FILE), module_ids(mids)).unwrap();
        root
    }

    /// Install a module's configuration into `root`.
    pub fn config(&self, root: &Path, name: &str, version: &str, contexts: &[ContextDef<'_>]) {
        let dir = root.join(name).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), module_config(contexts)).unwrap();
    }

    /// Install a module's class container into `root`.
    pub fn classes(&self, root: &Path, name: &str, version: &str, entries: &[(&str, &[u8])]) {
        write_container(&root.join(name).join(version).join(CLASSES_FILE), entries);
    }
}

/// Zip backend that records every container open.
#[derive(Clone, Default)]
pub struct CountingBackend {
    opens: Arc<Mutex<Vec<PathBuf>>>,
}

impl CountingBackend {
    pub fn opens(&self) -> Vec<PathBuf> {
        self.opens.lock().unwrap().clone()
    }

    /// How often a container of module `name` was opened.
    pub fn opens_of(&self, name: &str) -> usize {
        self.opens()
            .iter()
            .filter(|path| {
                path.parent()
                    .and_then(Path::parent)
                    .and_then(Path::file_name)
                    .is_some_and(|n| n == name)
            })
            .count()
    }
}

impl ContainerBackend for CountingBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn ClassContainer>> {
        self.opens.lock().unwrap().push(path.to_path_buf());
        ZipBackend.open(path)
    }
}
