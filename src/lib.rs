// Copyright 2025 dextree contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dextree
//!
//! Decode Android DEX containers into a navigable, path-addressable tree of classes, methods,
//! fields and the string constants each method loads.
//!
//! ## Features
//!
//! - **Memory-mapped input** - Containers are mapped read-only and decoded lazily, one at a time
//! - **Complete Dalvik decoding** - All 256 opcode slots, including payload pseudo-instructions
//! - **Path-addressable tree** - Every class, method and field knows its full path
//! - **Descriptor decoding** - `[[Ljava/lang/String;` becomes `java.lang.String[][]`
//! - **Memory safe** - Every read is bounds checked and reported as an [`Error`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dextree::prelude::*;
//!
//! let tree = disassemble(&["classes.dex"])?;
//!
//! for class in tree.classes() {
//!     println!("{}", class.name());
//!     for method in class.methods() {
//!         println!("  {} -> {:?}", method.path(), method.strings());
//!     }
//! }
//! # Ok::<(), dextree::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`dex`] - Container reader: header validation, id tables, class data and code items
//! - [`disassembler`] - Dalvik instruction decoding
//! - [`descriptor`] - Type descriptor to display name conversion
//! - [`tree`] - Tree model and the entities of a disassembly
//! - [`disassemble`] / [`disassemble_with`] - Build a [`DexTree`] from container paths
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! use dextree::{disassemble, Error};
//!
//! match disassemble(&["classes.dex"]) {
//!     Ok(tree) => println!("{} classes", tree.classes().count()),
//!     Err(Error::NotSupported) => println!("Not a supported DEX container"),
//!     Err(Error::Malformed { message, .. }) => println!("Malformed container: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

mod builder;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use dextree::prelude::*;
///
/// let tree = disassemble(&["classes.dex"])?;
/// println!("{} containers", tree.containers().len());
/// # Ok::<(), dextree::Error>(())
/// ```
pub mod prelude;

pub mod descriptor;
pub mod dex;
pub mod disassembler;
pub mod tree;

/// `dextree` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dextree` Error type
///
/// See [`error::Error`](Error) for the individual categories.
pub use error::Error;

/// Build a disassembly tree from container paths.
///
/// # Example
///
/// ```rust,no_run
/// use dextree::{disassemble_with, Options};
///
/// let tree = disassemble_with(&["a.dex", "b.dex"], &Options::default().with_strict(true))?;
/// assert_eq!(tree.containers().len(), 2);
/// # Ok::<(), dextree::Error>(())
/// ```
pub use builder::{build_container, disassemble, disassemble_with, extract_strings, Options};

/// A single loaded container.
pub use dex::DexFile;

/// Descriptor decoding.
pub use descriptor::{type_string, type_string_lossy};

/// Tree entities and the trait giving them a key, parent and path.
pub use tree::{DexClass, DexContainer, DexField, DexMethod, DexTree, TreeNode};

/// Provides access to the bounds-checked byte reader used for all container parsing.
///
/// # Example
///
/// ```rust
/// use dextree::{Parser, disassembler::decode_instruction};
/// let code = [0x0E, 0x00]; // return-void
/// let mut parser = Parser::new(&code);
/// let instr = decode_instruction(&mut parser)?;
/// assert_eq!(instr.mnemonic, "return-void");
/// # Ok::<(), dextree::Error>(())
/// ```
pub use file::parser::Parser;
