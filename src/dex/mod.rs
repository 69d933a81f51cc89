//! DEX container reader.
//!
//! [`DexFile`] owns the bytes of one container (memory-mapped or in memory) together with a
//! validated [`view::DexView`] borrowing them. Class definitions are read lazily through
//! [`DexFile::classes`]; code items are decoded on request through [`DexFile::read_code`].
//!
//! # Key Components
//!
//! - [`DexFile`] - Loaded container, entry point for all reads
//! - [`ClassIter`] - Lazy, single-pass iterator over class records
//! - [`header::Header`] - Parsed and validated header item
//! - [`records`] - Owned records handed out by the reader
//!
//! # Example
//!
//! ```rust,no_run
//! use dextree::DexFile;
//! use std::path::Path;
//!
//! let dex = DexFile::from_file(Path::new("classes.dex"))?;
//! for class in dex.classes() {
//!     let class = class?;
//!     for method in class.direct_methods.iter().filter(|m| m.has_code()) {
//!         let code = dex.read_code(method.code_off)?;
//!         println!("{} {}: {} instructions", class.descriptor, method.name, code.instructions.len());
//!     }
//! }
//! # Ok::<(), dextree::Error>(())
//! ```

pub mod header;
pub mod records;
pub mod view;

use std::{iter::FusedIterator, path::Path};

use ouroboros::self_referencing;

use crate::{
    file::{memory::Memory, physical::Physical, Backend},
    Error::Empty,
    Result,
};

use header::Header;
use records::{ClassRecord, CodeItem};
use view::DexView;

#[self_referencing]
/// A loaded DEX container.
///
/// The backing data lives as long as the `DexFile`; for file-backed containers the memory
/// map is released when the value is dropped.
pub struct DexFile {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// Validated table access, referencing the data.
    #[borrows(data)]
    #[not_covariant]
    view: DexView<'this>,
}

impl DexFile {
    /// Loads a container from the given path, memory-mapping it.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the DEX file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened or mapped
    /// - The file is empty
    /// - The header is not a supported, well-formed DEX header
    pub fn from_file(path: &Path) -> Result<DexFile> {
        let input = Physical::new(path)?;

        Self::load(input)
    }

    /// Loads a container from a memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty or does not start with a valid DEX header.
    pub fn from_mem(data: Vec<u8>) -> Result<DexFile> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<DexFile> {
        if data.is_empty() {
            return Err(Empty);
        }

        let data: Box<dyn Backend> = Box::new(data);

        DexFile::try_new(data, |data| DexView::new(data.data()))
    }

    /// Returns the total size of the loaded buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrow_data().len()
    }

    /// Returns `true` if the loaded buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.borrow_data().is_empty()
    }

    /// Returns the parsed header.
    #[must_use]
    pub fn header(&self) -> &Header {
        self.with_view(|view| view.header())
    }

    /// Verifies the header checksum and SHA-1 signature.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] on a mismatch.
    pub fn verify(&self) -> Result<()> {
        self.with_view(|view| view.header().verify(view.data()))
    }

    /// Number of class definitions in the container.
    #[must_use]
    pub fn class_count(&self) -> u32 {
        self.with_view(|view| view.class_count())
    }

    /// Reads the class definition at `index` together with its members.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition or any id it references is invalid.
    pub fn class(&self, index: u32) -> Result<ClassRecord> {
        self.with_view(|view| view.class(index))
    }

    /// Returns a lazy iterator over all class definitions, in table order.
    #[must_use]
    pub fn classes(&self) -> ClassIter<'_> {
        ClassIter {
            file: self,
            next: 0,
            count: self.class_count(),
        }
    }

    /// Reads and decodes the code item at `offset`.
    ///
    /// `const-string` and `const-string/jumbo` operands come back resolved to their string
    /// values.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is `0` or out of range, or if the code item is truncated or
    /// contains an invalid instruction.
    pub fn read_code(&self, offset: u32) -> Result<CodeItem> {
        self.with_view(|view| view.code_item(offset))
    }

    /// Resolves an index into the string table.
    ///
    /// # Errors
    ///
    /// Returns an error if the index or the string data is invalid.
    pub fn string(&self, index: u32) -> Result<String> {
        self.with_view(|view| view.string(index))
    }

    /// Resolves an index into the type table to its descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the index or the referenced string is invalid.
    pub fn type_descriptor(&self, index: u32) -> Result<String> {
        self.with_view(|view| view.type_descriptor(index))
    }
}

/// Lazy iterator over the class definitions of a [`DexFile`].
///
/// Yields one `Result` per definition. After the first error the iterator is exhausted.
pub struct ClassIter<'a> {
    file: &'a DexFile,
    next: u32,
    count: u32,
}

impl Iterator for ClassIter<'_> {
    type Item = Result<ClassRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }

        let result = self.file.class(self.next);
        self.next = if result.is_ok() {
            self.next + 1
        } else {
            self.count
        };

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some((self.count - self.next) as usize))
    }
}

impl FusedIterator for ClassIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{ClassSpec, DexBuilder},
        Error,
    };

    #[test]
    fn empty_input() {
        assert!(matches!(DexFile::from_mem(Vec::new()), Err(Error::Empty)));
    }

    #[test]
    fn not_a_dex() {
        let result = DexFile::from_mem(b"MZ\x90\x00 not a dex file at all".to_vec());
        assert!(matches!(result, Err(Error::NotSupported)));
    }

    #[test]
    fn iterates_classes_in_order() {
        let mut builder = DexBuilder::new();
        builder
            .class(ClassSpec::new("La/First;"))
            .class(ClassSpec::new("La/Second;"))
            .class(ClassSpec::new("La/Third;"));

        let dex = DexFile::from_mem(builder.build()).unwrap();
        assert!(dex.verify().is_ok());
        assert_eq!(dex.class_count(), 3);

        let descriptors: Vec<_> = dex
            .classes()
            .map(|class| class.unwrap().descriptor)
            .collect();
        assert_eq!(descriptors, vec!["La/First;", "La/Second;", "La/Third;"]);

        let ids: Vec<_> = dex.classes().map(|class| class.unwrap().id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut builder = DexBuilder::new();
        builder
            .class(ClassSpec::new("La/First;"))
            .class(ClassSpec::new("La/Second;"));
        let mut data = builder.build();

        // point the second class_def at a type index that does not exist
        let class_defs_off =
            u32::from_le_bytes(data[100..104].try_into().unwrap()) as usize;
        let second = class_defs_off + 32;
        data[second..second + 4].copy_from_slice(&0x7FFF_u32.to_le_bytes());
        let dex = DexFile::from_mem(data).unwrap();

        let mut classes = dex.classes();
        assert!(classes.next().unwrap().is_ok());
        assert!(classes.next().unwrap().is_err());
        assert!(classes.next().is_none());
    }

    #[test]
    fn read_code_resolves_jumbo_strings() {
        let mut builder = DexBuilder::new();
        let index = builder.string("jumbo");
        builder.class(ClassSpec::new("LA;").direct_method(
            "go",
            &[],
            "V",
            Some(&[0x011B, index as u16, (index >> 16) as u16, 0x000E]),
        ));

        let dex = DexFile::from_mem(builder.build()).unwrap();
        let class = dex.classes().next().unwrap().unwrap();
        let code = dex.read_code(class.direct_methods[0].code_off).unwrap();

        assert_eq!(code.instructions[0].mnemonic, "const-string/jumbo");
        assert_eq!(code.instructions[0].registers, vec![1]);
        assert_eq!(code.instructions[0].string_value(), Some("jumbo"));
    }

    #[test]
    fn from_file_roundtrip() {
        let mut builder = DexBuilder::new();
        builder.class(ClassSpec::new("Lfile/Backed;"));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &builder.build()).unwrap();

        let dex = DexFile::from_file(file.path()).unwrap();
        assert_eq!(dex.class(0).unwrap().descriptor, "Lfile/Backed;");
        assert_eq!(dex.len(), dex.header().file_size as usize);
    }
}
