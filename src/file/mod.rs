//! Raw data access for DEX containers.
//!
//! This module abstracts over where container bytes come from and provides the low-level,
//! bounds-checked primitives every higher layer reads through.
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//!
//! ## Parsing Infrastructure
//! - [`crate::file::parser::Parser`] - Cursor over a byte slice with LEB128 and MUTF-8 support
//! - [`crate::file::io`] - Little-endian primitive reads at arbitrary offsets
//!
//! ## Backend Implementations
//! - [`crate::file::physical::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::memory::Memory`] - In-memory buffer backend
//!
//! Containers themselves are modelled in [`crate::dex`], which owns one boxed backend per
//! opened file.

pub mod io;
pub mod memory;
pub mod parser;
pub mod physical;

use crate::Result;

/// Backend trait for container data sources.
///
/// This trait abstracts over the source of DEX data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the backend holds no data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
