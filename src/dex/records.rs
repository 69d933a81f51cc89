//! Owned records produced by the container reader.
//!
//! Every record carries resolved strings instead of raw table indices, so that consumers
//! never need to go back to the container once a record has been read.

use bitflags::bitflags;

use crate::disassembler::Instruction;

bitflags! {
    /// Access flags of classes, fields and methods.
    ///
    /// Some bits are shared between member kinds and mean different things: `0x40` is
    /// `VOLATILE` on fields and `BRIDGE` on methods, `0x80` is `TRANSIENT` on fields and
    /// `VARARGS` on methods.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Only visible to the defining class
        const PRIVATE = 0x0002;
        /// Visible to the package and subclasses
        const PROTECTED = 0x0004;
        /// Not constructed with a `this` reference
        const STATIC = 0x0008;
        /// Not subclassable or overridable, or assigned once
        const FINAL = 0x0010;
        /// Method holds the monitor of its receiver while executing
        const SYNCHRONIZED = 0x0020;
        /// Field is accessed with memory barriers
        const VOLATILE = 0x0040;
        /// Compiler-generated bridge method
        const BRIDGE = 0x0040;
        /// Field is not serialized
        const TRANSIENT = 0x0080;
        /// Last argument is a rest argument
        const VARARGS = 0x0080;
        /// Implemented in native code
        const NATIVE = 0x0100;
        /// Class is an interface
        const INTERFACE = 0x0200;
        /// Not directly instantiable or callable
        const ABSTRACT = 0x0400;
        /// Strict floating-point rules
        const STRICT = 0x0800;
        /// Not directly defined in source
        const SYNTHETIC = 0x1000;
        /// Class is an annotation type
        const ANNOTATION = 0x2000;
        /// Class or field is an enum (constant)
        const ENUM = 0x4000;
        /// Constructor method
        const CONSTRUCTOR = 0x1_0000;
        /// Method declared `synchronized`
        const DECLARED_SYNCHRONIZED = 0x2_0000;
    }
}

/// A field declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    /// Index into `field_ids`
    pub id: u32,
    /// Field name
    pub name: String,
    /// Type descriptor of the field
    pub type_descriptor: String,
    /// Access flags from the class data
    pub access_flags: AccessFlags,
}

/// A method declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRecord {
    /// Index into `method_ids`
    pub id: u32,
    /// Method name
    pub name: String,
    /// Parameter type descriptors, in declaration order
    pub params: Vec<String>,
    /// Return type descriptor
    pub return_type: String,
    /// Access flags from the class data
    pub access_flags: AccessFlags,
    /// Offset of the method's code item, `0` for abstract and native methods
    pub code_off: u32,
}

impl MethodRecord {
    /// Returns `true` if the method has a code item.
    #[must_use]
    pub fn has_code(&self) -> bool {
        self.code_off != 0
    }
}

/// A class definition together with its decoded class data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    /// Index into `class_defs`
    pub id: u32,
    /// Type descriptor of the class, e.g. `Lcom/example/Main;`
    pub descriptor: String,
    /// Access flags from the class definition
    pub access_flags: AccessFlags,
    /// Type descriptor of the superclass, `None` for `java.lang.Object`
    pub superclass: Option<String>,
    /// Name of the source file, if recorded
    pub source_file: Option<String>,
    /// Static, private and constructor methods
    pub direct_methods: Vec<MethodRecord>,
    /// Virtual methods
    pub virtual_methods: Vec<MethodRecord>,
    /// Static fields
    pub static_fields: Vec<FieldRecord>,
    /// Instance fields
    pub instance_fields: Vec<FieldRecord>,
}

/// A decoded code item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeItem {
    /// Number of registers used by the method
    pub registers_size: u16,
    /// Number of words of incoming arguments
    pub ins_size: u16,
    /// Number of words of outgoing argument space
    pub outs_size: u16,
    /// Number of try items
    pub tries_size: u16,
    /// Offset of the debug info sequence, `0` if absent
    pub debug_info_off: u32,
    /// Size of the instruction array in code units
    pub insns_size: u32,
    /// Decoded instructions, `const-string` operands resolved
    pub instructions: Vec<Instruction>,
}
