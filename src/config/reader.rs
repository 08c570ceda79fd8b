use std::path::Path;

use crate::{
    config::{ConfigFormat, ContextRecord, ModuleConfig, ModuleRecord},
    file::{parser::Parser, File},
    format::{check_header, FileKind},
    library::ModuleId,
    Result,
};

/// Module id, library path and view count.
const MIN_MODULE_SIZE: usize = 8;
/// Two strings.
const MIN_PAIR_SIZE: usize = 4;
/// Package index, class string, module index.
const MIN_INDEXED_CLASS_SIZE: usize = 10;
/// Service name and impl count.
const MIN_SERVICE_SIZE: usize = 6;

/// Reader for binary module configuration files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigReader {
    format: ConfigFormat,
    trace: bool,
}

impl ConfigReader {
    /// Create a reader for the given body format.
    #[must_use]
    pub fn new(format: ConfigFormat) -> ConfigReader {
        ConfigReader {
            format,
            trace: false,
        }
    }

    /// Log every context and module record at trace level.
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> ConfigReader {
        self.trace = trace;
        self
    }

    /// The body format this reader expects.
    #[must_use]
    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// The file is closed before this returns.
    ///
    /// # Errors
    /// Returns [`crate::Error::OpenFailed`] if the file cannot be opened, and the errors of
    /// [`ConfigReader::parse`] otherwise.
    pub fn read(&self, path: &Path) -> Result<ModuleConfig> {
        log::debug!("load_config {}", path.display());
        let file = File::open(path)?;
        self.parse(file.data())
    }

    /// Parse a configuration from raw bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadHeader`] for a header mismatch,
    /// [`crate::Error::OutOfBounds`] for truncated data and [`crate::Error::Malformed`] for
    /// invalid strings or impossible counts.
    pub fn parse(&self, data: &[u8]) -> Result<ModuleConfig> {
        let mut parser = Parser::new(data);
        check_header(&mut parser, FileKind::ModuleConfig)?;

        let roots = parser.read_string_count()?;
        for _ in 0..roots {
            parser.skip_utf8()?;
        }

        let count = parser.read_string_count()?;
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(parser.read_utf8()?);
        }

        if self.format == ConfigFormat::Indexed {
            let packages = parser.read_string_count()?;
            for _ in 0..packages {
                parser.skip_utf8()?;
            }
        }

        let mut contexts = Vec::with_capacity(count);
        for (index, name) in names.into_iter().enumerate() {
            let modules = self.read_modules(&mut parser)?;
            if self.trace {
                log::trace!("contexts[{}] = {} ({} modules)", index, name, modules.len());
            }

            self.skip_local_classes(&mut parser)?;
            skip_remote_packages(&mut parser)?;
            skip_suppliers(&mut parser)?;
            skip_services(&mut parser)?;

            contexts.push(ContextRecord { name, modules });
        }

        Ok(ModuleConfig { contexts })
    }

    fn read_modules(&self, parser: &mut Parser<'_>) -> Result<Vec<ModuleRecord>> {
        let count = parser.read_count_of(MIN_MODULE_SIZE)?;
        let mut modules = Vec::with_capacity(count);

        for index in 0..count {
            let id = ModuleId::parse(&parser.read_utf8_ref()?);
            let library_path = parser.read_utf8()?;
            let views = parser.read_string_count()?;
            for _ in 0..views {
                parser.skip_utf8()?;
            }

            if self.trace {
                log::trace!(
                    "  modules[{}] = {} path {:?} ({} views)",
                    index,
                    id,
                    library_path,
                    views
                );
            }

            modules.push(ModuleRecord {
                id,
                library_path: (!library_path.is_empty()).then_some(library_path),
            });
        }

        Ok(modules)
    }

    fn skip_local_classes(&self, parser: &mut Parser<'_>) -> Result<()> {
        match self.format {
            ConfigFormat::Simple => {
                let count = parser.read_count_of(MIN_PAIR_SIZE)?;
                for _ in 0..count {
                    parser.skip_utf8()?;
                    parser.skip_utf8()?;
                }
            }
            ConfigFormat::Indexed => {
                let count = parser.read_count_of(MIN_INDEXED_CLASS_SIZE)?;
                for _ in 0..count {
                    parser.read_be::<i32>()?;
                    parser.skip_utf8()?;
                    parser.read_be::<i32>()?;
                }
            }
        }
        Ok(())
    }
}

fn skip_remote_packages(parser: &mut Parser<'_>) -> Result<()> {
    let count = parser.read_count_of(MIN_PAIR_SIZE)?;
    for _ in 0..count {
        parser.skip_utf8()?;
        parser.skip_utf8()?;
    }
    Ok(())
}

fn skip_suppliers(parser: &mut Parser<'_>) -> Result<()> {
    let count = parser.read_string_count()?;
    for _ in 0..count {
        parser.skip_utf8()?;
    }
    Ok(())
}

fn skip_services(parser: &mut Parser<'_>) -> Result<()> {
    let count = parser.read_count_of(MIN_SERVICE_SIZE)?;
    for _ in 0..count {
        parser.skip_utf8()?;
        let impls = parser.read_string_count()?;
        for _ in 0..impls {
            parser.skip_utf8()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::FileKind,
        test::{config_bytes, ConfigBuilder, FormatBuilder},
        Error,
    };

    fn tuples(config: &ModuleConfig) -> Vec<(String, Vec<(String, Option<String>, Option<String>)>)> {
        config
            .contexts
            .iter()
            .map(|cx| {
                let modules = cx
                    .modules
                    .iter()
                    .map(|m| {
                        (
                            m.name().to_string(),
                            m.version().map(ToString::to_string),
                            m.library_path.clone(),
                        )
                    })
                    .collect();
                (cx.name.clone(), modules)
            })
            .collect()
    }

    #[test]
    fn modified_utf8_names() {
        let data = ConfigBuilder::new(ConfigFormat::Simple)
            .root("app@1.0")
            .context("+\0b", &[("app@1.0", "")])
            .context("+\u{1F600}", &[("m\u{1F600}@1", "")])
            .build();

        // NUL and supplementary characters are written the way the JVM writes them
        let nul = [0x00, 0x04, b'+', 0xC0, 0x80, b'b'];
        assert!(data.windows(nul.len()).any(|w| w == nul));
        assert!(!data.windows(4).any(|w| w == "\u{1F600}".as_bytes()));

        let config = ConfigReader::new(ConfigFormat::Simple).parse(&data).unwrap();
        assert_eq!(config.contexts[0].name, "+\0b");
        assert_eq!(config.contexts[1].name, "+\u{1F600}");
        assert_eq!(config.contexts[1].modules[0].name(), "m\u{1F600}");
    }

    #[test]
    fn parse_simple_config() {
        let data = ConfigBuilder::new(ConfigFormat::Simple)
            .root("app@1.0")
            .context("+app", &[("app@1.0", ""), ("lib@2.1", "/opt/other")])
            .context("+jdk.base", &[("jdk.base@8", "")])
            .build();

        let config = ConfigReader::new(ConfigFormat::Simple).parse(&data).unwrap();
        assert_eq!(
            tuples(&config),
            vec![
                (
                    "+app".to_string(),
                    vec![
                        ("app".to_string(), Some("1.0".to_string()), None),
                        (
                            "lib".to_string(),
                            Some("2.1".to_string()),
                            Some("/opt/other".to_string())
                        ),
                    ]
                ),
                (
                    "+jdk.base".to_string(),
                    vec![("jdk.base".to_string(), Some("8".to_string()), None)]
                ),
            ]
        );
        assert_eq!(
            config.contexts[0].modules[1].library_override(),
            Some(Path::new("/opt/other"))
        );
    }

    #[test]
    fn parse_indexed_config() {
        let data = ConfigBuilder::new(ConfigFormat::Indexed)
            .package("java.lang")
            .context("+jdk.base", &[("jdk.base@8", "")])
            .build();

        let config = ConfigReader::new(ConfigFormat::Indexed).parse(&data).unwrap();
        assert_eq!(config.contexts.len(), 1);
        assert_eq!(config.contexts[0].modules[0].name(), "jdk.base");
    }

    #[test]
    fn body_sections_are_skipped() {
        let data = ConfigBuilder::new(ConfigFormat::Simple)
            .context("+a", &[("a@1", "")])
            .local_class("a.Main", "a@1")
            .remote_package("b.api", "+b")
            .supplier("+b")
            .service("a.Spi", &["a.Impl1", "a.Impl2"])
            .context("+b", &[("b@1", "")])
            .build();

        let config = ConfigReader::new(ConfigFormat::Simple).parse(&data).unwrap();
        assert_eq!(config.contexts.len(), 2);
        assert_eq!(config.contexts[1].name, "+b");
        assert_eq!(config.contexts[1].modules[0].name(), "b");
    }

    #[test]
    fn indexed_local_classes_are_skipped() {
        let data = ConfigBuilder::new(ConfigFormat::Indexed)
            .package("p")
            .context("+a", &[("a@1", "")])
            .local_class("Main", "0")
            .context("+b", &[("b@1", "")])
            .build();

        let config = ConfigReader::new(ConfigFormat::Indexed).parse(&data).unwrap();
        assert_eq!(config.contexts[1].modules[0].name(), "b");
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut data = config_bytes(&[("+jdk.base", &[("jdk.base@8", "")])]);
        data.extend_from_slice(&[0xFF; 16]);

        let config = ConfigReader::default().parse(&data).unwrap();
        assert_eq!(config.contexts.len(), 1);
    }

    #[test]
    fn header_mismatch() {
        let data = FormatBuilder::new()
            .header(FileKind::ModuleIds)
            .i32(0)
            .i32(0)
            .build();

        match ConfigReader::default().parse(&data) {
            Err(Error::BadHeader { file, .. }) => assert_eq!(file, FileKind::ModuleConfig),
            other => panic!("Expected BadHeader, got {:?}", other),
        }
    }

    #[test]
    fn truncation_never_panics() {
        let data = ConfigBuilder::new(ConfigFormat::Simple)
            .root("app@1.0")
            .context("+app", &[("app@1.0", "")])
            .local_class("app.Main", "app@1.0")
            .service("s.S", &["s.I"])
            .build();

        for end in 0..data.len() {
            let result = ConfigReader::default().parse(&data[..end]);
            assert!(
                matches!(
                    result,
                    Err(Error::OutOfBounds { .. } | Error::Malformed { .. })
                ),
                "offset {} gave {:?}",
                end,
                result
            );
        }
        assert!(ConfigReader::default().parse(&data).is_ok());
    }

    #[test]
    fn negative_module_count() {
        let data = FormatBuilder::new()
            .header(FileKind::ModuleConfig)
            .i32(0)
            .i32(1)
            .utf8("+a")
            .i32(-1)
            .build();

        assert!(matches!(
            ConfigReader::default().parse(&data),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn invalid_utf8_name() {
        let data = FormatBuilder::new()
            .header(FileKind::ModuleConfig)
            .i32(0)
            .i32(1)
            .u16(2)
            .bytes(&[0xC3, 0x28])
            .build();

        assert!(matches!(
            ConfigReader::default().parse(&data),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ConfigReader::default().read(&dir.path().join("config")),
            Err(Error::OpenFailed { .. })
        ));
    }
}
