//! Dalvik instruction representation, operand types, and decoding metadata.
//!
//! The module is organized around [`Instruction`], which aggregates everything known about a
//! decoded instruction: where it sits in the code item, its opcode information from the
//! static table in [`crate::disassembler::opcodes`], the registers it names, and a typed
//! [`Operand`].
//!
//! # Key Components
//!
//! - [`Instruction`] - Complete decoded instruction representation
//! - [`Operand`] - Type-safe operand representation
//! - [`Format`] - Dalvik encoding format (`10x`, `21c`, `35c`, ...)
//! - [`IndexKind`] - Which id table an index operand refers to
//! - [`ConstKind`] - Classification of constant-load instructions
//! - [`Payload`] - Switch and array-data pseudo-instructions

use strum::{Display, IntoStaticStr};

/// Encoding format of a Dalvik instruction.
///
/// The first digit is the size in 16-bit code units, the second the number of registers, the
/// letter the kind of extra data. Payload pseudo-instructions have a variable size.
///
/// ```rust
/// use dextree::disassembler::Format;
///
/// assert_eq!(Format::F21c.units(), Some(2));
/// assert_eq!(Format::F51l.units(), Some(5));
/// assert_eq!(Format::Payload.units(), None);
/// assert_eq!(Format::F3rc.to_string(), "3rc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Format {
    /// `op` - no operands
    #[strum(serialize = "10x")]
    F10x,
    /// `op vA, vB` - two 4-bit registers
    #[strum(serialize = "12x")]
    F12x,
    /// `op vA, #+B` - 4-bit register and 4-bit signed literal
    #[strum(serialize = "11n")]
    F11n,
    /// `op vAA` - one 8-bit register
    #[strum(serialize = "11x")]
    F11x,
    /// `op +AA` - 8-bit branch offset
    #[strum(serialize = "10t")]
    F10t,
    /// `op +AAAA` - 16-bit branch offset
    #[strum(serialize = "20t")]
    F20t,
    /// `op vAA, vBBBB`
    #[strum(serialize = "22x")]
    F22x,
    /// `op vAA, +BBBB` - register and 16-bit branch offset
    #[strum(serialize = "21t")]
    F21t,
    /// `op vAA, #+BBBB` - register and 16-bit signed literal
    #[strum(serialize = "21s")]
    F21s,
    /// `op vAA, #+BBBB0000(00000000)` - register and high-order literal
    #[strum(serialize = "21h")]
    F21h,
    /// `op vAA, kind@BBBB` - register and 16-bit index
    #[strum(serialize = "21c")]
    F21c,
    /// `op vAA, vBB, vCC`
    #[strum(serialize = "23x")]
    F23x,
    /// `op vAA, vBB, #+CC` - 8-bit signed literal
    #[strum(serialize = "22b")]
    F22b,
    /// `op vA, vB, +CCCC` - conditional branch
    #[strum(serialize = "22t")]
    F22t,
    /// `op vA, vB, #+CCCC` - 16-bit signed literal
    #[strum(serialize = "22s")]
    F22s,
    /// `op vA, vB, kind@CCCC`
    #[strum(serialize = "22c")]
    F22c,
    /// `op +AAAAAAAA` - 32-bit branch offset
    #[strum(serialize = "30t")]
    F30t,
    /// `op vAAAA, vBBBB`
    #[strum(serialize = "32x")]
    F32x,
    /// `op vAA, #+BBBBBBBB` - 32-bit literal
    #[strum(serialize = "31i")]
    F31i,
    /// `op vAA, +BBBBBBBB` - 32-bit offset to a payload
    #[strum(serialize = "31t")]
    F31t,
    /// `op vAA, kind@BBBBBBBB` - 32-bit index
    #[strum(serialize = "31c")]
    F31c,
    /// `op {vC, vD, vE, vF, vG}, kind@BBBB` - up to five argument registers
    #[strum(serialize = "35c")]
    F35c,
    /// `op {vCCCC .. vNNNN}, kind@BBBB` - register range
    #[strum(serialize = "3rc")]
    F3rc,
    /// `op {vC, vD, vE, vF, vG}, meth@BBBB, proto@HHHH`
    #[strum(serialize = "45cc")]
    F45cc,
    /// `op {vCCCC .. vNNNN}, meth@BBBB, proto@HHHH`
    #[strum(serialize = "4rcc")]
    F4rcc,
    /// `op vAA, #+BBBBBBBBBBBBBBBB` - 64-bit literal
    #[strum(serialize = "51l")]
    F51l,
    /// Switch or array-data payload embedded in the instruction stream
    #[strum(serialize = "payload")]
    Payload,
}

impl Format {
    /// Returns the size in code units of this format, or `None` for payloads whose size
    /// depends on their content.
    #[must_use]
    pub const fn units(&self) -> Option<u32> {
        match self {
            Format::F10x | Format::F12x | Format::F11n | Format::F11x | Format::F10t => Some(1),
            Format::F20t
            | Format::F22x
            | Format::F21t
            | Format::F21s
            | Format::F21h
            | Format::F21c
            | Format::F23x
            | Format::F22b
            | Format::F22t
            | Format::F22s
            | Format::F22c => Some(2),
            Format::F30t
            | Format::F32x
            | Format::F31i
            | Format::F31t
            | Format::F31c
            | Format::F35c
            | Format::F3rc => Some(3),
            Format::F45cc | Format::F4rcc => Some(4),
            Format::F51l => Some(5),
            Format::Payload => None,
        }
    }
}

/// The id table an index operand refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IndexKind {
    /// The instruction carries no index
    None,
    /// `string_ids`
    String,
    /// `type_ids`
    Type,
    /// `field_ids`
    Field,
    /// `method_ids`
    Method,
    /// `proto_ids`
    Proto,
    /// `call_site_ids`
    CallSite,
    /// `method_handles`
    MethodHandle,
}

/// Categorization of instructions by their primary function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionCategory {
    /// Register moves and result/exception retrieval
    Move,
    /// Literal, string, class, method-handle and method-type loads
    Constant,
    /// `return*`
    Return,
    /// Branches, switches and `throw`
    ControlFlow,
    /// Comparisons producing a value (`cmp*`)
    Comparison,
    /// Array element access and `array-length`
    Array,
    /// Instance and static field access
    Field,
    /// `invoke*`
    Invoke,
    /// Object creation, type checks and monitors
    Object,
    /// Unary and binary arithmetic, bitwise and shift operations
    Arithmetic,
    /// Primitive conversions
    Conversion,
    /// `nop` and payload pseudo-instructions
    Misc,
}

/// Classification of constant-load instructions.
///
/// The `String` / `StringJumbo` split matches the two encodings of `const-string`, which
/// differ only in the width of the string index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstKind {
    /// `const/4` through `const-wide/high16`
    Literal,
    /// `const-string`
    String,
    /// `const-string/jumbo`
    StringJumbo,
    /// `const-class`
    Class,
    /// `const-method-handle`
    MethodHandle,
    /// `const-method-type`
    MethodType,
}

/// Switch and array-data tables stored inline in a code item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `packed-switch-payload`: consecutive keys starting at `first_key`
    PackedSwitch {
        /// First (lowest) switch case value
        first_key: i32,
        /// Branch targets relative to the owning `packed-switch` instruction
        targets: Vec<i32>,
    },
    /// `sparse-switch-payload`: sorted keys with one target each
    SparseSwitch {
        /// Sorted case values
        keys: Vec<i32>,
        /// Branch targets relative to the owning `sparse-switch` instruction
        targets: Vec<i32>,
    },
    /// `fill-array-data-payload`
    FillArrayData {
        /// Bytes per element
        element_width: u16,
        /// Raw element data, `element_width * count` bytes
        data: Vec<u8>,
    },
}

/// Represents an operand after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// No operand beyond the registers
    None,
    /// Literal value, sign-extended (high16 forms already shifted into place)
    Literal(i64),
    /// Branch or payload offset in code units, relative to the instruction
    Target(i32),
    /// Index into one of the id tables
    Index(IndexKind, u32),
    /// `const-string` index resolved against the string table
    String {
        /// Index into `string_ids`
        index: u32,
        /// Decoded string value
        value: String,
    },
    /// `invoke-polymorphic` method and prototype indices
    Polymorphic {
        /// Index into `method_ids`
        method: u32,
        /// Index into `proto_ids`
        proto: u32,
    },
    /// Inline payload table
    Payload(Payload),
}

/// A decoded Dalvik instruction.
///
/// Offsets and sizes are measured in 16-bit code units from the start of the code item's
/// instruction array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset in code units from the start of the instruction array
    pub offset: u32,
    /// Size in code units
    pub size: u32,
    /// Opcode byte (`0x00` for payloads)
    pub opcode: u8,
    /// Human-readable mnemonic (e.g. `const-string`, `invoke-virtual`)
    pub mnemonic: &'static str,
    /// Encoding format
    pub format: Format,
    /// Functional categorization
    pub category: InstructionCategory,
    /// Registers named by the instruction, in encoding order
    pub registers: Vec<u16>,
    /// Remaining operand data
    pub operand: Operand,
}

impl Instruction {
    /// Classifies this instruction as a constant load, or `None` for every other kind.
    ///
    /// ```rust
    /// use dextree::{disassembler::{decode_instruction, ConstKind}, Parser};
    ///
    /// // const-string v0, string@0001
    /// let code = [0x1A, 0x00, 0x01, 0x00];
    /// let mut parser = Parser::new(&code);
    /// let instruction = decode_instruction(&mut parser)?;
    /// assert_eq!(instruction.const_kind(), Some(ConstKind::String));
    /// # Ok::<(), dextree::Error>(())
    /// ```
    #[must_use]
    pub fn const_kind(&self) -> Option<ConstKind> {
        if self.format == Format::Payload {
            return None;
        }

        match self.opcode {
            0x12..=0x19 => Some(ConstKind::Literal),
            super::opcodes::CONST_STRING => Some(ConstKind::String),
            super::opcodes::CONST_STRING_JUMBO => Some(ConstKind::StringJumbo),
            super::opcodes::CONST_CLASS => Some(ConstKind::Class),
            super::opcodes::CONST_METHOD_HANDLE => Some(ConstKind::MethodHandle),
            super::opcodes::CONST_METHOD_TYPE => Some(ConstKind::MethodType),
            _ => None,
        }
    }

    /// Returns the resolved string payload of a `const-string` / `const-string/jumbo`.
    ///
    /// `None` if the instruction carries no resolved string (including string loads that
    /// were decoded without a string table).
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        match &self.operand {
            Operand::String { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the index operand and the table it refers to.
    #[must_use]
    pub fn index(&self) -> Option<(IndexKind, u32)> {
        match &self.operand {
            Operand::Index(kind, index) => Some((*kind, *index)),
            Operand::String { index, .. } => Some((IndexKind::String, *index)),
            Operand::Polymorphic { method, .. } => Some((IndexKind::Method, *method)),
            _ => None,
        }
    }

    /// Absolute code-unit offset of a branch or payload reference, if any.
    #[must_use]
    pub fn target(&self) -> Option<u32> {
        match self.operand {
            Operand::Target(relative) => self.offset.checked_add_signed(relative),
            _ => None,
        }
    }

    /// Returns `true` for payload pseudo-instructions.
    #[must_use]
    pub fn is_payload(&self) -> bool {
        self.format == Format::Payload
    }
}
