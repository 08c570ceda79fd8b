//! Common header and naming conventions of module library files.
//!
//! Every binary metadata file of a module library starts with the same 10-byte header:
//!
//! | Offset | Size | Field | Value |
//! |--------|------|-------|-------|
//! | 0      | 4    | magic | `0xCAFE00FA` |
//! | 4      | 2    | kind  | see [`FileKind`] |
//! | 6      | 2    | major | `0` |
//! | 8      | 2    | minor | `1` |
//!
//! Fields are validated in order and the first mismatch is reported as
//! [`crate::Error::BadHeader`], naming the field together with the expected and the found value.

use crate::{file::parser::Parser, Error, Result};

/// Magic number at the start of every module library file.
pub const MAGIC: u32 = 0xCAFE_00FA;
/// Supported major format version.
pub const MAJOR_VERSION: u16 = 0;
/// Supported minor format version.
pub const MINOR_VERSION: u16 = 1;

/// Name of the library header file in a library root.
pub const LIBRARY_FILE: &str = "%jigsaw-library";
/// Name of the module-id index file in a library root.
pub const MODULE_IDS_FILE: &str = "%mids";
/// Name of the configuration file in a module directory.
pub const CONFIG_FILE: &str = "config";
/// Name of the class container in a module directory.
pub const CLASSES_FILE: &str = "classes";

/// Name of the module every configuration must contain.
pub const BASE_MODULE: &str = "jdk.base";
/// Name of the pseudo-module representing the class path.
pub const CLASSPATH_MODULE: &str = "jdk.classpath";
/// Suffix appended to a class name to form its container entry name.
pub const CLASS_SUFFIX: &str = ".class";

/// The kind tag stored in a file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[repr(u16)]
pub enum FileKind {
    /// `%jigsaw-library`
    #[strum(serialize = "library header")]
    LibraryHeader = 0,
    /// Per-module `config`
    #[strum(serialize = "module config")]
    ModuleConfig = 2,
    /// `%mids`
    #[strum(serialize = "module ids")]
    ModuleIds = 8,
}

/// A field of the common file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HeaderField {
    /// The 4-byte magic number
    Magic,
    /// The 2-byte file kind
    Kind,
    /// The 2-byte major version
    Major,
    /// The 2-byte minor version
    Minor,
}

/// Read the common header from `parser` and check it against `kind`.
///
/// On success the parser is positioned at the first body byte.
///
/// # Errors
/// Returns [`crate::Error::BadHeader`] for the first field that does not match, and
/// [`crate::Error::OutOfBounds`] if the data ends inside the header.
pub fn check_header(parser: &mut Parser<'_>, kind: FileKind) -> Result<()> {
    let magic = parser.read_be::<u32>()?;
    expect(kind, HeaderField::Magic, MAGIC, magic)?;

    let found = parser.read_be::<u16>()?;
    expect(kind, HeaderField::Kind, u32::from(kind as u16), u32::from(found))?;

    let major = parser.read_be::<u16>()?;
    expect(
        kind,
        HeaderField::Major,
        u32::from(MAJOR_VERSION),
        u32::from(major),
    )?;

    let minor = parser.read_be::<u16>()?;
    expect(
        kind,
        HeaderField::Minor,
        u32::from(MINOR_VERSION),
        u32::from(minor),
    )
}

fn expect(file: FileKind, field: HeaderField, expected: u32, found: u32) -> Result<()> {
    if expected == found {
        return Ok(());
    }

    log::debug!(
        "{} header: {} is 0x{:x}, expected 0x{:x}",
        file,
        field,
        found,
        expected
    );
    Err(Error::BadHeader {
        file,
        field,
        expected,
        found,
    })
}
