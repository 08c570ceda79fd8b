use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use zip::ZipArchive;

use crate::{
    container::{ClassContainer, ContainerBackend, EntryInfo},
    Error, Result,
};

/// Opens module class containers as zip archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipBackend;

impl ContainerBackend for ZipBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn ClassContainer>> {
        let open_error = |message: String| Error::ContainerOpen {
            path: path.to_path_buf(),
            message,
        };

        let file = fs::File::open(path).map_err(|e| open_error(e.to_string()))?;
        let archive = ZipArchive::new(file).map_err(|e| open_error(e.to_string()))?;

        Ok(Box::new(ZipContainer {
            path: path.to_path_buf(),
            archive,
        }))
    }
}

struct ZipContainer {
    path: PathBuf,
    archive: ZipArchive<fs::File>,
}

impl ClassContainer for ZipContainer {
    fn find(&mut self, name: &str) -> Result<Option<EntryInfo>> {
        let Some(index) = self.archive.index_for_name(name) else {
            return Ok(None);
        };

        let entry = self
            .archive
            .by_index_raw(index)
            .map_err(|e| Error::ReadClassEntry {
                entry: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(EntryInfo {
            index,
            size: entry.size(),
            name_len: entry.name().len(),
        }))
    }

    fn read(&mut self, entry: &EntryInfo, buf: &mut [u8]) -> Result<()> {
        let read_error = |message: String| Error::ReadClassEntry {
            entry: format!("{}#{}", self.path.display(), entry.index),
            message,
        };

        let Ok(size) = usize::try_from(entry.size) else {
            return Err(read_error("entry too large".to_string()));
        };
        let Some(target) = buf.get_mut(..size) else {
            return Err(read_error(format!("buffer holds {} bytes", buf.len())));
        };

        let mut file = self
            .archive
            .by_index(entry.index)
            .map_err(|e| read_error(e.to_string()))?;
        file.read_exact(target)
            .map_err(|e| read_error(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

    fn write_archive(path: &Path, entries: &[(&str, &[u8], CompressionMethod)]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, data, method) in entries {
            let options = SimpleFileOptions::default().compression_method(*method);
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn find_and_read_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes");
        let body = vec![0xAB_u8; 300];
        write_archive(
            &path,
            &[
                ("p/Stored.class", b"\xCA\xFE\xBA\xBE", CompressionMethod::Stored),
                ("p/Deflated.class", &body, CompressionMethod::Deflated),
            ],
        );

        let mut container = ZipBackend.open(&path).unwrap();

        let stored = container.find("p/Stored.class").unwrap().unwrap();
        assert_eq!(stored.size, 4);
        assert_eq!(stored.name_len, "p/Stored.class".len());
        let mut buf = [0u8; 4];
        container.read(&stored, &mut buf).unwrap();
        assert_eq!(&buf, b"\xCA\xFE\xBA\xBE");

        let deflated = container.find("p/Deflated.class").unwrap().unwrap();
        assert_eq!(deflated.size, 300);
        let mut buf = vec![0u8; 512];
        container.read(&deflated, &mut buf).unwrap();
        assert_eq!(&buf[..300], body.as_slice());

        assert!(container.find("p/Missing.class").unwrap().is_none());
    }

    #[test]
    fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ZipBackend.open(&dir.path().join("classes")),
            Err(Error::ContainerOpen { .. })
        ));
    }

    #[test]
    fn open_non_zip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes");
        fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(
            ZipBackend.open(&path),
            Err(Error::ContainerOpen { .. })
        ));
    }

    #[test]
    fn read_with_short_buffer_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes");
        write_archive(&path, &[("A.class", b"0123456789", CompressionMethod::Stored)]);

        let mut container = ZipBackend.open(&path).unwrap();
        let entry = container.find("A.class").unwrap().unwrap();
        let mut buf = [0u8; 3];
        assert!(matches!(
            container.read(&entry, &mut buf),
            Err(Error::ReadClassEntry { .. })
        ));
    }
}
