//! Assembly of [`DexTree`] forests from containers on disk.
//!
//! [`disassemble`] processes its inputs strictly in order, one container at a time. Each
//! container is memory-mapped for the duration of its own iteration only. The first error
//! opening a container, reading its header or reading a class definition aborts the whole
//! batch; no partial forest is returned.
//!
//! Methods are handled by policy: a method without code is left out of the tree, a method
//! whose code item fails to decode is skipped with a warning by default, or aborts the batch
//! when [`Options::strict`] is set.
//!
//! # Example
//!
//! ```rust,no_run
//! use dextree::{disassemble_with, Options, TreeNode};
//!
//! let options = Options::default().with_strict(true);
//! let tree = disassemble_with(&["classes.dex", "classes2.dex"], &options)?;
//!
//! for class in tree.classes() {
//!     println!("{} ({} strings)", class.path(), class.strings().len());
//! }
//! # Ok::<(), dextree::Error>(())
//! ```

use std::path::Path;

use log::{debug, warn};

use crate::{
    dex::{
        records::{ClassRecord, MethodRecord},
        DexFile,
    },
    disassembler::{ConstKind, Instruction},
    tree::{DexClass, DexContainer, DexField, DexMethod, DexTree, NodeRc},
    Result,
};

/// Settings for [`disassemble_with`].
///
/// The default is lenient decoding without integrity verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Abort on the first method whose code fails to decode instead of skipping it
    pub strict: bool,
    /// Check the header checksum and signature of every container before reading it
    pub verify_integrity: bool,
}

impl Options {
    /// Sets [`Options::strict`].
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets [`Options::verify_integrity`].
    #[must_use]
    pub fn with_verify_integrity(mut self, verify_integrity: bool) -> Self {
        self.verify_integrity = verify_integrity;
        self
    }
}

/// Disassembles every container in `paths` with default [`Options`].
///
/// # Errors
///
/// Returns the first error encountered; see [`disassemble_with`].
pub fn disassemble<I>(paths: I) -> Result<DexTree>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    disassemble_with(paths, &Options::default())
}

/// Disassembles every container in `paths` into one forest, in input order.
///
/// # Errors
///
/// Returns an error, and no forest, if any container cannot be opened, has an invalid
/// header, fails verification (with [`Options::verify_integrity`]), contains an unreadable
/// class definition, or, with [`Options::strict`], contains a method whose code cannot be
/// decoded.
pub fn disassemble_with<I>(paths: I, options: &Options) -> Result<DexTree>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut tree = DexTree::new();

    for path in paths {
        let path = path.as_ref();
        let dex = DexFile::from_file(path)?;
        if options.verify_integrity {
            dex.verify()?;
        }

        let container = build_container(tree.node(), path, &dex, options)?;
        debug!("{}: {} classes", path.display(), container.classes().len());
        tree.push(container);
    }

    Ok(tree)
}

/// Builds the container entity for one opened file below `parent`.
///
/// # Errors
///
/// Returns an error if a class definition cannot be read, or in strict mode if a method's
/// code cannot be decoded.
pub fn build_container(
    parent: &NodeRc,
    path: &Path,
    dex: &DexFile,
    options: &Options,
) -> Result<DexContainer> {
    let mut container = DexContainer::new(parent, path);

    for record in dex.classes() {
        let record = record?;
        let class = build_class(container.node(), &record, dex, options)?;
        container.push(class);
    }

    Ok(container)
}

fn build_class(
    parent: &NodeRc,
    record: &ClassRecord,
    dex: &DexFile,
    options: &Options,
) -> Result<DexClass> {
    let mut class = DexClass::new(parent, record);

    let methods = record
        .direct_methods
        .iter()
        .map(|method| (method, true))
        .chain(record.virtual_methods.iter().map(|method| (method, false)));

    for (method, direct) in methods {
        if let Some(method) = build_method(class.node(), record, method, direct, dex, options)? {
            class.push_method(method);
        }
    }

    for field in &record.static_fields {
        class.push_field(DexField::new(class.node(), field.clone(), true));
    }
    for field in &record.instance_fields {
        class.push_field(DexField::new(class.node(), field.clone(), false));
    }

    Ok(class)
}

fn build_method(
    parent: &NodeRc,
    class: &ClassRecord,
    method: &MethodRecord,
    direct: bool,
    dex: &DexFile,
    options: &Options,
) -> Result<Option<DexMethod>> {
    if !method.has_code() {
        return Ok(None);
    }

    let code = match dex.read_code(method.code_off) {
        Ok(code) => code,
        Err(error) if !options.strict => {
            warn!("Skipping {}->{}: {}", class.descriptor, method.name, error);
            return Ok(None);
        }
        Err(error) => return Err(error),
    };

    let strings = extract_strings(&code.instructions);
    Ok(Some(DexMethod::new(parent, method.clone(), direct, code, strings)))
}

/// Collects the string payloads of all `const-string` and `const-string/jumbo`
/// instructions, in instruction order.
///
/// Duplicates are kept; empty strings and unresolved loads are left out.
#[must_use]
pub fn extract_strings(instructions: &[Instruction]) -> Vec<String> {
    instructions
        .iter()
        .filter(|instruction| {
            matches!(
                instruction.const_kind(),
                Some(ConstKind::String | ConstKind::StringJumbo)
            )
        })
        .filter_map(Instruction::string_value)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
