//! Little-endian primitive reads for DEX parsing.
//!
//! DEX containers are little-endian throughout (big-endian files are rejected at the header),
//! so only little-endian reading is provided. Every read is bounds checked and returns
//! [`crate::Error::OutOfBounds`] instead of panicking on truncated data.
//!
//! ```rust,ignore
//! use dextree::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! let second: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!((first, second, offset), (1, 2, 6));
//! # Ok::<(), dextree::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for type-specific safe binary data reading.
///
/// Each implementation names the fixed-size byte array backing the type (e.g. `[u8; 4]` for
/// `u32`), which the reading functions convert from a sub-slice of the input.
pub trait DexIO: Sized {
    /// Byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_dex_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DexIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_dex_io!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Reads a value of type `T` in little-endian byte order from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le<T: DexIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a value of type `T` in little-endian byte order at `offset`, advancing `offset` by
/// the size of `T`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes; `offset` is left
/// untouched in that case.
pub fn read_le_at<T: DexIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}
