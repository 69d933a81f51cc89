//! DEX header parsing and integrity checks.
//!
//! The header occupies the first `0x70` bytes of every container. It identifies the format
//! version, carries an Adler-32 checksum and a SHA-1 signature over the rest of the file, and
//! locates every id table.
//!
//! # Reference
//! - [Dalvik Executable format](https://source.android.com/docs/core/runtime/dex-format#header-item)

use sha1::{Digest, Sha1};

use crate::{file::parser::Parser, Error::NotSupported, Result};

/// Size of the header item in bytes.
pub const HEADER_SIZE: u32 = 0x70;
/// Byte-order marker of a little-endian container.
pub const ENDIAN_CONSTANT: u32 = 0x1234_5678;
/// Byte-order marker of a byte-swapped container.
pub const REVERSE_ENDIAN_CONSTANT: u32 = 0x7856_3412;
/// Oldest accepted format version.
pub const MIN_VERSION: u16 = 35;
/// Newest accepted format version.
pub const MAX_VERSION: u16 = 41;

/// Location of one id table: number of entries and file offset of the first entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Section {
    /// Number of entries
    pub size: u32,
    /// File offset of the first entry, `0` if the table is empty
    pub offset: u32,
}

impl Section {
    fn read(parser: &mut Parser) -> Result<Section> {
        Ok(Section {
            size: parser.read_le::<u32>()?,
            offset: parser.read_le::<u32>()?,
        })
    }

    /// Checks that `size` entries of `entry_size` bytes fit into the first `limit` bytes.
    fn check(&self, name: &str, entry_size: u32, limit: u32) -> Result<()> {
        if self.size == 0 {
            return Ok(());
        }

        let end = u64::from(self.offset) + u64::from(self.size) * u64::from(entry_size);
        if end > u64::from(limit) {
            return Err(malformed_error!(
                "{} table ({} entries at 0x{:X}) exceeds file size {}",
                name,
                self.size,
                self.offset,
                limit
            ));
        }

        Ok(())
    }
}

/// The DEX header item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Format version from the magic, e.g. `35` for `dex\n035\0`
    pub version: u16,
    /// Adler-32 of everything after this field
    pub checksum: u32,
    /// SHA-1 of everything after this field
    pub signature: [u8; 20],
    /// Size of the whole container in bytes
    pub file_size: u32,
    /// Size of the header, always `0x70`
    pub header_size: u32,
    /// Static linking data (unused by the format)
    pub link: Section,
    /// Offset of the map list
    pub map_off: u32,
    /// `string_ids`
    pub string_ids: Section,
    /// `type_ids`
    pub type_ids: Section,
    /// `proto_ids`
    pub proto_ids: Section,
    /// `field_ids`
    pub field_ids: Section,
    /// `method_ids`
    pub method_ids: Section,
    /// `class_defs`
    pub class_defs: Section,
    /// Data section holding everything referenced by offset
    pub data: Section,
}

impl Header {
    /// Parse and validate the header at the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for an unknown magic, version or byte order,
    /// [`crate::Error::OutOfBounds`] if `data` is shorter than a header and
    /// [`crate::Error::Malformed`] if the header is inconsistent with the buffer.
    pub fn read(data: &[u8]) -> Result<Header> {
        let mut parser = Parser::new(data);

        let magic = parser.read_bytes(8)?;
        if &magic[..4] != b"dex\n" || magic[7] != 0 {
            return Err(NotSupported);
        }

        let version = parse_version(&magic[4..7]).ok_or(NotSupported)?;
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return Err(NotSupported);
        }

        let checksum = parser.read_le::<u32>()?;
        let mut signature = [0_u8; 20];
        signature.copy_from_slice(parser.read_bytes(20)?);

        let file_size = parser.read_le::<u32>()?;
        let header_size = parser.read_le::<u32>()?;
        let endian_tag = parser.read_le::<u32>()?;

        match endian_tag {
            ENDIAN_CONSTANT => {}
            REVERSE_ENDIAN_CONSTANT => return Err(NotSupported),
            other => {
                return Err(malformed_error!("Invalid endian tag 0x{:08X}", other));
            }
        }

        if header_size != HEADER_SIZE {
            return Err(malformed_error!(
                "Invalid header size: expected 0x70, got 0x{:X}",
                header_size
            ));
        }

        if file_size < HEADER_SIZE || file_size as usize > data.len() {
            return Err(malformed_error!(
                "Header file size {} does not match buffer of {} bytes",
                file_size,
                data.len()
            ));
        }

        let header = Header {
            version,
            checksum,
            signature,
            file_size,
            header_size,
            link: Section::read(&mut parser)?,
            map_off: parser.read_le::<u32>()?,
            string_ids: Section::read(&mut parser)?,
            type_ids: Section::read(&mut parser)?,
            proto_ids: Section::read(&mut parser)?,
            field_ids: Section::read(&mut parser)?,
            method_ids: Section::read(&mut parser)?,
            class_defs: Section::read(&mut parser)?,
            data: Section::read(&mut parser)?,
        };

        header.string_ids.check("string_ids", 4, file_size)?;
        header.type_ids.check("type_ids", 4, file_size)?;
        header.proto_ids.check("proto_ids", 12, file_size)?;
        header.field_ids.check("field_ids", 8, file_size)?;
        header.method_ids.check("method_ids", 8, file_size)?;
        header.class_defs.check("class_defs", 32, file_size)?;

        Ok(header)
    }

    /// Verify the checksum and signature against the container bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] naming the first mismatch.
    pub fn verify(&self, data: &[u8]) -> Result<()> {
        let Some(content) = data.get(..self.file_size as usize) else {
            return Err(out_of_bounds_error!());
        };

        let checksum = adler32(&content[12..]);
        if checksum != self.checksum {
            return Err(malformed_error!(
                "Checksum mismatch: header 0x{:08X}, computed 0x{:08X}",
                self.checksum,
                checksum
            ));
        }

        let signature: [u8; 20] = Sha1::digest(&content[32..]).into();
        if signature != self.signature {
            return Err(malformed_error!("SHA-1 signature mismatch"));
        }

        Ok(())
    }
}

fn parse_version(digits: &[u8]) -> Option<u16> {
    digits.iter().try_fold(0_u16, |acc, &digit| {
        digit
            .is_ascii_digit()
            .then(|| acc * 10 + u16::from(digit - b'0'))
    })
}

/// Adler-32 as used by the header checksum.
#[must_use]
pub fn adler32(data: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65521;
    // Largest n with 255 * n * (n + 1) / 2 + (n + 1) * (MOD_ADLER - 1) <= u32::MAX
    const NMAX: usize = 5552;

    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for chunk in data.chunks(NMAX) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }

    (b << 16) | a
}
