use std::path::PathBuf;

use thiserror::Error;

use crate::format::{FileKind, HeaderField};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure mode of library opening, configuration parsing, module resolution and class
/// lookup is represented by a dedicated variant, so the embedding runtime can decide on its own
/// fallback policy without string matching.
///
/// # Error Categories
///
/// ## Library Errors
/// - [`Error::InvalidLibrary`] - The library header is missing, unreadable or invalid
/// - [`Error::LibraryNotFound`] - No system module library below the given home directory
/// - [`Error::LibraryCycle`] - A library names one of its own descendants as parent
/// - [`Error::InvalidModuleIds`] - The `%mids` index of a library is missing
///
/// ## Format Errors
/// - [`Error::BadHeader`] - Magic, file kind or version of a file header did not match
/// - [`Error::Malformed`] - The body of a file is structurally invalid
/// - [`Error::OutOfBounds`] - A read would have run past the end of the data (truncated file)
///
/// ## Resolution Errors
/// - [`Error::ModuleNotFound`] - No library in the chain declares the module query
/// - [`Error::BaseModuleNotFound`] - No context of the configuration contains the base module
/// - [`Error::ContextsNotLoaded`] - A lookup was attempted before contexts were loaded
/// - [`Error::InvalidContext`] / [`Error::InvalidModule`] - Stale or foreign handle
///
/// ## Class Lookup Errors
/// - [`Error::ClassNotFound`] - The class is absent from every module searched
/// - [`Error::SearchFailed`] - The class was not found and container failures occurred
/// - [`Error::ContainerOpen`] / [`Error::ReadClassEntry`] - Class container failures
///
/// # Examples
///
/// ```rust,no_run
/// use modlib::{Error, Resolver};
///
/// let mut resolver = Resolver::new();
/// match resolver.load_contexts("/opt/jdk/lib/modules", None, Some("app@1.0"), &[]) {
///     Ok(base) => println!("base context: {}", base),
///     Err(Error::ModuleNotFound(query)) => eprintln!("nothing declares {}", query),
///     Err(Error::BadHeader { file, field, .. }) => eprintln!("bad {} header ({})", file, field),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Library errors
    /// The module library at the given path is missing, unreadable or has an invalid header.
    #[error("Invalid module library - {0}")]
    InvalidLibrary(PathBuf),

    /// No system module library exists below the given home directory.
    #[error("Module library not found - {0}")]
    LibraryNotFound(PathBuf),

    /// The parent chain of a library loops back onto itself.
    ///
    /// The associated path is the library root that was encountered twice.
    #[error("Cyclic module library parent chain at {0}")]
    LibraryCycle(PathBuf),

    /// The module-id index (`%mids`) of a library could not be opened.
    #[error("Invalid module id index - {0}")]
    InvalidModuleIds(PathBuf),

    // Format errors
    /// A file header field did not carry the expected value.
    ///
    /// # Fields
    ///
    /// * `file` - The kind of file whose header was being validated
    /// * `field` - Which header field failed the check
    /// * `expected` - The value the reader requires
    /// * `found` - The value present in the file
    #[error("Bad {file} header - {field} is 0x{found:x}, expected 0x{expected:x}")]
    BadHeader {
        /// The kind of file that was being read
        file: FileKind,
        /// The header field that failed validation
        field: HeaderField,
        /// The expected value
        expected: u32,
        /// The value found in the file
        found: u32,
    },

    /// The file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    ///
    /// A fixed-size or length-prefixed field extends past the end of the data, which
    /// means the file was truncated.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A configuration or index file could not be opened.
    #[error("Failed to open {path} - {source}")]
    OpenFailed {
        /// The path that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    // Resolution errors
    /// No library in the chain declares a module matching the query.
    #[error("Module not found - {0}")]
    ModuleNotFound(String),

    /// No context of the loaded configuration contains the base module.
    #[error("Base module not found in any context")]
    BaseModuleNotFound,

    /// A lookup was attempted while no configuration is loaded.
    #[error("Contexts have not been loaded")]
    ContextsNotLoaded,

    /// The context handle does not belong to the currently loaded configuration.
    #[error("Invalid context handle")]
    InvalidContext,

    /// The module handle does not belong to the currently loaded configuration.
    #[error("Invalid module handle")]
    InvalidModule,

    // Class lookup errors
    /// The class is not present in any module that was searched.
    #[error("Class not found - {0}")]
    ClassNotFound(String),

    /// The class was not found, and at least one container failed during the search.
    ///
    /// The collected failures allow callers to distinguish a genuinely absent class
    /// from a broken container backend.
    #[error("Class {class} not found, {} container failure(s) during the search", failures.len())]
    SearchFailed {
        /// The class that was looked up
        class: String,
        /// The errors encountered while searching
        failures: Vec<Error>,
    },

    /// The class name is empty or otherwise unusable as a container entry name.
    #[error("Invalid class name - {0:?}")]
    InvalidClassName(String),

    /// The class name exceeds the configured maximum length.
    #[error("Class name too long - {len} bytes, limit is {max}")]
    ClassNameTooLong {
        /// Length of the supplied class name
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// The class container of a module could not be opened.
    #[error("Failed to open class container {path} - {message}")]
    ContainerOpen {
        /// Path of the container
        path: PathBuf,
        /// Backend specific failure description
        message: String,
    },

    /// A class entry could not be read from its container.
    #[error("Failed to read class entry {entry} - {message}")]
    ReadClassEntry {
        /// The entry name that was read
        entry: String,
        /// Backend specific failure description
        message: String,
    },

    /// A caller supplied buffer is too small for the data to be written.
    #[error("Buffer too short - {needed} bytes needed, {available} available")]
    BufferTooShort {
        /// Bytes required
        needed: usize,
        /// Bytes available in the buffer
        available: usize,
    },

    /// The class container backend is not available.
    #[error("Class container backend unavailable - {0}")]
    BackendUnavailable(String),

    /// Failed to lock target.
    ///
    /// A mutex guarding a module container was poisoned by a panicking thread.
    #[error("Failed to lock target")]
    LockError,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this error reports a header field mismatch.
    #[must_use]
    pub fn is_header_mismatch(&self) -> bool {
        matches!(self, Error::BadHeader { .. })
    }

    /// Returns `true` if this error means "nothing was found", as opposed to a failure.
    ///
    /// Chain walkers use this to decide whether the next candidate may be tried.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ModuleNotFound(_) | Error::ClassNotFound(_) | Error::InvalidModuleIds(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_macro_captures_location() {
        let err = malformed_error!("bad count - {}", 7);
        match err {
            Error::Malformed {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "bad count - 7");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            _ => panic!("Expected Malformed"),
        }
    }

    #[test]
    fn test_bad_header_display() {
        let err = Error::BadHeader {
            file: FileKind::ModuleConfig,
            field: HeaderField::Magic,
            expected: 0xCAFE_00FA,
            found: 0xDEAD_BEEF,
        };
        let text = err.to_string();
        assert!(text.contains("module config"));
        assert!(text.contains("magic"));
        assert!(text.contains("0xdeadbeef"));
        assert!(err.is_header_mismatch());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::ModuleNotFound("a".into()).is_not_found());
        assert!(Error::ClassNotFound("a.B".into()).is_not_found());
        assert!(!Error::BaseModuleNotFound.is_not_found());
        assert!(!out_of_bounds_error!().is_not_found());
    }

    #[test]
    fn test_search_failed_counts_failures() {
        let err = Error::SearchFailed {
            class: "p.C".to_string(),
            failures: vec![Error::LockError, Error::BackendUnavailable("x".into())],
        };
        assert!(err.to_string().contains("2 container failure(s)"));
    }
}
