//! Low-level byte order and safe reading utilities for library metadata files.
//!
//! Every integer in the module library formats is stored big-endian. This module provides the
//! [`crate::file::io::ByteIO`] trait which gives a unified, type-safe way to decode primitive
//! values from byte buffers, and bounds-checked helpers built on top of it.
//!
//! # Key Components
//!
//! - [`crate::file::io::ByteIO`] - Trait defining endian-aware decoding for primitive types
//! - [`crate::file::io::read_be`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_be_at`] - Read a value at an offset and advance the offset
//!
//! ## Supported Types
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//!
//! # Examples
//!
//! ```rust,ignore
//! use modlib::file::io::read_be_at;
//!
//! let data = [0xCA, 0xFE, 0x00, 0xFA, 0x00, 0x02];
//! let mut offset = 0;
//!
//! let magic: u32 = read_be_at(&data, &mut offset)?;  // offset: 0 -> 4
//! let kind: u16 = read_be_at(&data, &mut offset)?;   // offset: 4 -> 6
//!
//! assert_eq!(magic, 0xCAFE_00FA);
//! assert_eq!(kind, 2);
//! # Ok::<(), modlib::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All functions return [`crate::Error::OutOfBounds`] if there are insufficient bytes in the
//! buffer to complete the operation. A short read is never silently accepted.

use crate::Result;

/// Trait for primitive types that can be decoded from a fixed number of big-endian bytes.
pub trait ByteIO: Sized {
    /// The byte array representation of the type
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decode the value from big-endian bytes
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_byte_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl ByteIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_byte_io!(
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
);

/// Safely reads a value of type `T` in big-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `T`.
pub fn read_be<T: ByteIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at `offset`, advancing the offset.
///
/// On failure the offset is left unchanged.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_be_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_be_u8() {
        let result = read_be::<u8>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_be_u16() {
        let result = read_be::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102);
    }

    #[test]
    fn read_be_u32() {
        let result = read_be::<u32>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102_0304);
    }

    #[test]
    fn read_be_i32_negative() {
        let result = read_be::<i32>(&[0xFF, 0xFF, 0xFF, 0xFE]).unwrap();
        assert_eq!(result, -2);
    }

    #[test]
    fn read_be_u64() {
        let result = read_be::<u64>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102_0304_0506_0708);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 0;
        assert_eq!(read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap(), 0x0102);
        assert_eq!(offset, 2);
        assert_eq!(read_be_at::<u32>(&TEST_BUFFER, &mut offset).unwrap(), 0x0304_0506);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_be_at_short_read_keeps_offset() {
        let mut offset = 6;
        let result = read_be_at::<u32>(&TEST_BUFFER, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_be_at_overflowing_offset() {
        let mut offset = usize::MAX;
        let result = read_be_at::<u16>(&TEST_BUFFER, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn read_be_empty() {
        assert!(read_be::<u8>(&[]).is_err());
    }
}
