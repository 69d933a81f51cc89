//! # dextree Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dextree library. Import this module to get quick access to the essential
//! types for disassembling DEX containers.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dextree operations
pub use crate::Error;

/// The result type used throughout dextree
pub use crate::Result;

/// Settings for building a disassembly tree
pub use crate::Options;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Build a disassembly tree from container paths
pub use crate::{disassemble, disassemble_with};

/// A single loaded container and its lazy class iterator
pub use crate::dex::{ClassIter, DexFile};

/// Low-level parsing utilities
pub use crate::Parser;

// ================================================================================================
// Tree Model
// ================================================================================================

/// Tree link types and the trait shared by all entities
pub use crate::tree::{Node, NodeRc, NodeRef, TreeNode, PATH_SEPARATOR, ROOT_KEY};

/// Entities of a disassembly
pub use crate::tree::{DexClass, DexContainer, DexField, DexMethod, DexTree};

// ================================================================================================
// Container Records
// ================================================================================================

/// Owned records read from a container
pub use crate::dex::records::{AccessFlags, ClassRecord, CodeItem, FieldRecord, MethodRecord};

/// Header item
pub use crate::dex::header::Header;

// ================================================================================================
// Disassembler
// ================================================================================================

/// Dalvik instruction decoding
pub use crate::disassembler::{
    decode_instruction, decode_stream, ConstKind, Format, IndexKind, Instruction,
    InstructionCategory, Operand, Payload,
};

// ================================================================================================
// Descriptors
// ================================================================================================

/// Type descriptor decoding
pub use crate::descriptor::{type_string, type_string_lossy, Primitive};
