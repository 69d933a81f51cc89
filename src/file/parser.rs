//! Cursor-based byte stream parser for DEX structures.
//!
//! [`Parser`] maintains a position within a byte slice and offers bounds-checked reads of the
//! encodings used by the DEX format: fixed-width little-endian integers, unsigned LEB128 and
//! NUL-terminated modified UTF-8 strings.
//!
//! # Usage Examples
//!
//! ```rust
//! use dextree::Parser;
//!
//! // uleb128 0x80 0x01 = 128, then a little-endian u16
//! let data = [0x80, 0x01, 0x34, 0x12];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_uleb128()?, 128);
//! assert_eq!(parser.read_le::<u16>()?, 0x1234);
//! assert!(!parser.has_more_data());
//! # Ok::<(), dextree::Error>(())
//! ```

use std::char::{decode_utf16, REPLACEMENT_CHARACTER};

use crate::{
    file::io::{read_le_at, DexIO},
    Result,
};

/// A generic binary data parser for reading DEX structures.
///
/// The parser never reads past the end of its slice; every failing read leaves the position
/// where it was and reports [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`].
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
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

    /// Move the current position to the specified index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(out_of_bounds_error!()),
        }
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(out_of_bounds_error!());
        }
        Ok(self.data[self.position])
    }

    /// Read a value of type `T` in little-endian format and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `T` would exceed the data length.
    pub fn read_le<T: DexIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read `len` raw bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance_by(len)?;
        Ok(&self.data[start..self.position])
    }

    /// Read an unsigned LEB128 value of at most five bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncation, or [`crate::Error::Malformed`] if
    /// the encoding runs longer than five bytes.
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let start = self.position;
        let mut result: u32 = 0;
        let mut shift = 0_u32;

        loop {
            let byte = match self.read_le::<u8>() {
                Ok(byte) => byte,
                Err(error) => {
                    self.position = start;
                    return Err(error);
                }
            };

            result |= u32::from(byte & 0x7F).wrapping_shl(shift);
            if byte & 0x80 == 0 {
                return Ok(result);
            }

            shift += 7;
            if shift > 28 {
                self.position = start;
                return Err(malformed_error!("uleb128 longer than 5 bytes at {}", start));
            }
        }
    }

    /// Read a NUL-terminated modified UTF-8 string and advance past the terminator.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found, or
    /// [`crate::Error::Malformed`] on an invalid byte sequence.
    pub fn read_mutf8(&mut self) -> Result<String> {
        let remaining = &self.data[self.position.min(self.data.len())..];
        let Some(end) = remaining.iter().position(|&byte| byte == 0) else {
            return Err(out_of_bounds_error!());
        };

        let decoded = decode_mutf8(&remaining[..end])?;
        self.position += end + 1;
        Ok(decoded)
    }
}

/// Decode modified UTF-8 bytes (without terminator) into a [`String`].
///
/// Modified UTF-8 encodes `U+0000` as `C0 80` and supplementary characters as two 3-byte
/// surrogate sequences. Unpaired surrogates are replaced with `U+FFFD`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on a truncated or invalid byte sequence.
pub fn decode_mutf8(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        let first = bytes[index];
        let continuation = |at: usize| -> Result<u16> {
            match bytes.get(at) {
                Some(&byte) if byte & 0xC0 == 0x80 => Ok(u16::from(byte & 0x3F)),
                _ => Err(malformed_error!("Invalid MUTF-8 continuation at {}", at)),
            }
        };

        if first & 0x80 == 0 {
            units.push(u16::from(first));
            index += 1;
        } else if first & 0xE0 == 0xC0 {
            let second = continuation(index + 1)?;
            units.push((u16::from(first & 0x1F) << 6) | second);
            index += 2;
        } else if first & 0xF0 == 0xE0 {
            let second = continuation(index + 1)?;
            let third = continuation(index + 2)?;
            units.push((u16::from(first & 0x0F) << 12) | (second << 6) | third);
            index += 3;
        } else {
            return Err(malformed_error!("Invalid MUTF-8 lead byte 0x{:02X} at {}", first, index));
        }
    }

    Ok(decode_utf16(units)
        .map(|unit| unit.unwrap_or(REPLACEMENT_CHARACTER))
        .collect())
}
