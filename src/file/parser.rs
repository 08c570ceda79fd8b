//! Low-level byte stream parser for module library metadata.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser for the big-endian, length-prefixed formats used by module libraries: the library
//! header, the module-id index and the per-module configuration. Every access is bounds checked
//! and a truncated stream surfaces as [`crate::Error::OutOfBounds`] instead of partial data.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::remaining`] - Bytes left in the stream
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_be`] - Read primitive types (big-endian)
//! - [`crate::file::parser::Parser::read_count`] - Read a 4-byte element count
//! - [`crate::file::parser::Parser::read_utf8`] - Read a 2-byte length-prefixed string
//! - [`crate::file::parser::Parser::read_utf8_ref`] - Variant of `read_utf8` that borrows
//!   whenever the bytes need no decoding
//!
//! Strings are written in the JVM's modified UTF-8: NUL is stored as `C0 80` and
//! supplementary characters as encoded surrogate pairs. Both are decoded here.
//! - [`crate::file::parser::Parser::skip_utf8`] - Skip a string without decoding it
//!
//! # Usage Examples
//!
//! ```rust
//! use modlib::Parser;
//!
//! let data = [0x00, 0x00, 0x00, 0x01, 0x00, 0x03, b'a', b'@', b'1'];
//! let mut parser = Parser::new(&data);
//!
//! let count = parser.read_count()?;
//! assert_eq!(count, 1);
//! assert_eq!(parser.read_utf8()?, "a@1");
//! assert!(!parser.has_more_data());
//! # Ok::<(), modlib::Error>(())
//! ```

use std::borrow::Cow;

use crate::{
    file::io::{read_be_at, ByteIO},
    Result,
};

/// Minimum number of bytes a length-prefixed string occupies on the wire.
const MIN_STRING_SIZE: usize = 2;

/// A cursor over a byte slice that decodes big-endian module library structures.
///
/// The parser never panics on malformed input: all reads validate the remaining length
/// first, and counts are sanity-checked against the bytes that could possibly back them.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modlib::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes between the current position and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        let end = self.calc_end_position(step)?;
        self.position = end;
        Ok(())
    }

    /// Execute a closure transactionally, rolling back the position on failure.
    ///
    /// # Errors
    /// Returns whatever error the closure returns.
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }

    /// Read a value of type `T` in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `T` would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modlib::Parser;
    /// let data = [0xCA, 0xFE, 0x00, 0xFA];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_be::<u32>()?, 0xCAFE_00FA);
    /// # Ok::<(), modlib::Error>(())
    /// ```
    pub fn read_be<T: ByteIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Read a 4-byte signed element count.
    ///
    /// Counts are written as Java `int`s. A negative count, or one that claims more
    /// elements than the remaining bytes could hold at `min_element_size` bytes each,
    /// is rejected before any allocation happens.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on a short read and [`crate::Error::Malformed`]
    /// for an impossible count.
    pub fn read_count(&mut self) -> Result<usize> {
        self.read_count_of(0)
    }

    /// Read a 4-byte element count whose elements occupy at least `min_element_size` bytes.
    ///
    /// # Errors
    /// See [`Parser::read_count`].
    pub fn read_count_of(&mut self, min_element_size: usize) -> Result<usize> {
        let start = self.position;
        let raw = self.read_be::<i32>()?;
        let Ok(count) = usize::try_from(raw) else {
            return Err(malformed_error!("Negative count {} at offset {}", raw, start));
        };

        if min_element_size > 0 && count > self.remaining() / min_element_size {
            return Err(malformed_error!(
                "Count {} at offset {} exceeds the remaining {} bytes",
                count,
                start,
                self.remaining()
            ));
        }

        Ok(count)
    }

    /// Read a count of length-prefixed strings.
    ///
    /// # Errors
    /// See [`Parser::read_count`].
    pub fn read_string_count(&mut self) -> Result<usize> {
        self.read_count_of(MIN_STRING_SIZE)
    }

    /// Read a 2-byte length-prefixed modified UTF-8 string into an owned `String`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the prefix or the payload is truncated,
    /// and [`crate::Error::Malformed`] if the payload is not valid modified UTF-8.
    pub fn read_utf8(&mut self) -> Result<String> {
        self.read_utf8_ref().map(Cow::into_owned)
    }

    /// Read a 2-byte length-prefixed modified UTF-8 string.
    ///
    /// Plain UTF-8 payloads borrow from the underlying data; `C0 80` and surrogate pairs
    /// are decoded into an owned string.
    ///
    /// # Errors
    /// See [`Parser::read_utf8`].
    pub fn read_utf8_ref(&mut self) -> Result<Cow<'a, str>> {
        self.transactional(|parser| {
            let length = usize::from(parser.read_be::<u16>()?);
            let bytes = parser.read_bytes(length)?;
            cesu8::from_java_cesu8(bytes).map_err(|e| {
                malformed_error!(
                    "Invalid modified UTF-8 string at offset {} - {}",
                    parser.position - length,
                    e
                )
            })
        })
    }

    /// Skip over a 2-byte length-prefixed string without validating or allocating it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the prefix or the payload is truncated.
    pub fn skip_utf8(&mut self) -> Result<()> {
        self.transactional(|parser| {
            let length = usize::from(parser.read_be::<u16>()?);
            parser.advance_by(length)
        })
    }

    /// Read `length` raw bytes, borrowing from the underlying data.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_read_utf8() {
        let test_cases = vec![
            (vec![0x00, 0x03, b'a', b'b', b'c'], "abc"),
            (vec![0x00, 0x00], ""),
            (vec![0x00, 0x06, 0xE4, 0xB8, 0xAD, 0xE6, 0x96, 0x87], "中文"),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            let result = parser.read_utf8().unwrap();
            assert_eq!(result, expected);
            assert!(!parser.has_more_data());
        }
    }

    #[test]
    fn test_read_utf8_truncated_payload() {
        let mut parser = Parser::new(&[0x00, 0x05, b'a', b'b']);
        assert!(matches!(
            parser.read_utf8(),
            Err(Error::OutOfBounds { .. })
        ));
        // Position is rolled back to the start of the string
        assert_eq!(parser.pos(), 0);
    }

    #[test]
    fn test_read_utf8_truncated_prefix() {
        let mut parser = Parser::new(&[0x00]);
        assert!(matches!(
            parser.read_utf8(),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_read_utf8_invalid() {
        let mut parser = Parser::new(&[0x00, 0x02, 0xC3, 0x28]);
        assert!(matches!(parser.read_utf8(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_read_modified_utf8_nul() {
        let mut parser = Parser::new(&[0x00, 0x04, b'+', 0xC0, 0x80, b'b']);
        assert_eq!(parser.read_utf8().unwrap(), "+\0b");
        assert!(!parser.has_more_data());
    }

    #[test]
    fn test_read_modified_utf8_surrogate_pair() {
        // U+1F600 as a high and a low surrogate, three bytes each
        let data = [0x00, 0x07, b'm', 0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        let mut parser = Parser::new(&data);
        let name = parser.read_utf8_ref().unwrap();
        assert!(matches!(name, Cow::Owned(_)));
        assert_eq!(name, "m\u{1F600}");
    }

    #[test]
    fn test_read_utf8_ref_borrows() {
        let data = [0x00, 0x08, b'j', b'd', b'k', b'.', b'b', b'a', b's', b'e'];
        let mut parser = Parser::new(&data);
        let name = parser.read_utf8_ref().unwrap();
        assert!(matches!(name, Cow::Borrowed("jdk.base")));
        assert_eq!(parser.pos(), 10);
    }

    #[test]
    fn test_skip_utf8() {
        let data = [0x00, 0x02, b'x', b'y', 0x00, 0x01, b'z'];
        let mut parser = Parser::new(&data);
        parser.skip_utf8().unwrap();
        assert_eq!(parser.pos(), 4);
        assert_eq!(parser.read_utf8().unwrap(), "z");
    }

    #[test]
    fn test_read_count() {
        let mut parser = Parser::new(&[0x00, 0x00, 0x01, 0x00]);
        assert_eq!(parser.read_count().unwrap(), 256);
    }

    #[test]
    fn test_read_count_negative() {
        let mut parser = Parser::new(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(parser.read_count(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_read_string_count_exceeding_data() {
        // Claims 3 strings, but only 4 bytes follow (room for at most 2 empty strings)
        let mut parser = Parser::new(&[0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(
            parser.read_string_count(),
            Err(Error::Malformed { .. })
        ));

        let mut parser = Parser::new(&[0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(parser.read_string_count().unwrap(), 2);
    }

    #[test]
    fn test_read_count_truncated() {
        let mut parser = Parser::new(&[0x00, 0x00, 0x01]);
        assert!(matches!(
            parser.read_count(),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_advance_by() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);
        parser.advance_by(3).unwrap();
        assert_eq!(parser.remaining(), 0);
        assert!(parser.advance_by(1).is_err());
        assert!(parser.advance_by(usize::MAX).is_err());
    }

    #[test]
    fn test_transactional_rollback() {
        let data = [0x00, 0x01, 0x02];
        let mut parser = Parser::new(&data);
        let result: Result<u32> = parser.transactional(|p| {
            p.read_be::<u16>()?;
            p.read_be::<u32>()
        });
        assert!(result.is_err());
        assert_eq!(parser.pos(), 0);
    }
}
