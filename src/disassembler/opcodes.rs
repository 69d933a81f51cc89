//! Dalvik opcode constants and the static opcode table.
//!
//! [`INSTRUCTIONS`] maps every opcode byte to its mnemonic, [`Format`], category and the id
//! table its index operand refers to. Slots the instruction set leaves unused carry an empty
//! mnemonic and are rejected by the decoder.
//!
//! Payload pseudo-instructions share opcode [`NOP`] and are told apart by the high byte of
//! their first code unit ([`PACKED_SWITCH_PAYLOAD`], [`SPARSE_SWITCH_PAYLOAD`],
//! [`FILL_ARRAY_DATA_PAYLOAD`]).
#![allow(missing_docs)]

use super::{
    Format::{self, *},
    IndexKind as I, InstructionCategory as C,
};

pub const NOP: u8 = 0x00;
pub const CONST_STRING: u8 = 0x1A;
pub const CONST_STRING_JUMBO: u8 = 0x1B;
pub const CONST_CLASS: u8 = 0x1C;
pub const CONST_WIDE_HIGH16: u8 = 0x19;
pub const CONST_METHOD_HANDLE: u8 = 0xFE;
pub const CONST_METHOD_TYPE: u8 = 0xFF;

pub const PACKED_SWITCH_PAYLOAD: u8 = 0x01;
pub const SPARSE_SWITCH_PAYLOAD: u8 = 0x02;
pub const FILL_ARRAY_DATA_PAYLOAD: u8 = 0x03;

/// Static description of one opcode slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Mnemonic, empty for unused slots
    pub mnemonic: &'static str,
    /// Encoding format
    pub format: Format,
    /// Functional categorization
    pub category: C,
    /// Table referenced by the index operand, if any
    pub index: I,
}

impl OpcodeInfo {
    /// Returns `true` for slots the instruction set does not assign.
    #[must_use]
    pub const fn is_unused(&self) -> bool {
        self.mnemonic.is_empty()
    }
}

const fn op(mnemonic: &'static str, format: Format, category: C, index: I) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        format,
        category,
        index,
    }
}

const UNUSED: OpcodeInfo = op("", F10x, C::Misc, I::None);

/// Opcode table indexed by opcode byte.
#[rustfmt::skip]
pub static INSTRUCTIONS: [OpcodeInfo; 256] = [
    /* 0x00 */ op("nop", F10x, C::Misc, I::None),
    /* 0x01 */ op("move", F12x, C::Move, I::None),
    /* 0x02 */ op("move/from16", F22x, C::Move, I::None),
    /* 0x03 */ op("move/16", F32x, C::Move, I::None),
    /* 0x04 */ op("move-wide", F12x, C::Move, I::None),
    /* 0x05 */ op("move-wide/from16", F22x, C::Move, I::None),
    /* 0x06 */ op("move-wide/16", F32x, C::Move, I::None),
    /* 0x07 */ op("move-object", F12x, C::Move, I::None),
    /* 0x08 */ op("move-object/from16", F22x, C::Move, I::None),
    /* 0x09 */ op("move-object/16", F32x, C::Move, I::None),
    /* 0x0A */ op("move-result", F11x, C::Move, I::None),
    /* 0x0B */ op("move-result-wide", F11x, C::Move, I::None),
    /* 0x0C */ op("move-result-object", F11x, C::Move, I::None),
    /* 0x0D */ op("move-exception", F11x, C::Move, I::None),
    /* 0x0E */ op("return-void", F10x, C::Return, I::None),
    /* 0x0F */ op("return", F11x, C::Return, I::None),
    /* 0x10 */ op("return-wide", F11x, C::Return, I::None),
    /* 0x11 */ op("return-object", F11x, C::Return, I::None),
    /* 0x12 */ op("const/4", F11n, C::Constant, I::None),
    /* 0x13 */ op("const/16", F21s, C::Constant, I::None),
    /* 0x14 */ op("const", F31i, C::Constant, I::None),
    /* 0x15 */ op("const/high16", F21h, C::Constant, I::None),
    /* 0x16 */ op("const-wide/16", F21s, C::Constant, I::None),
    /* 0x17 */ op("const-wide/32", F31i, C::Constant, I::None),
    /* 0x18 */ op("const-wide", F51l, C::Constant, I::None),
    /* 0x19 */ op("const-wide/high16", F21h, C::Constant, I::None),
    /* 0x1A */ op("const-string", F21c, C::Constant, I::String),
    /* 0x1B */ op("const-string/jumbo", F31c, C::Constant, I::String),
    /* 0x1C */ op("const-class", F21c, C::Constant, I::Type),
    /* 0x1D */ op("monitor-enter", F11x, C::Object, I::None),
    /* 0x1E */ op("monitor-exit", F11x, C::Object, I::None),
    /* 0x1F */ op("check-cast", F21c, C::Object, I::Type),
    /* 0x20 */ op("instance-of", F22c, C::Object, I::Type),
    /* 0x21 */ op("array-length", F12x, C::Array, I::None),
    /* 0x22 */ op("new-instance", F21c, C::Object, I::Type),
    /* 0x23 */ op("new-array", F22c, C::Object, I::Type),
    /* 0x24 */ op("filled-new-array", F35c, C::Object, I::Type),
    /* 0x25 */ op("filled-new-array/range", F3rc, C::Object, I::Type),
    /* 0x26 */ op("fill-array-data", F31t, C::Array, I::None),
    /* 0x27 */ op("throw", F11x, C::ControlFlow, I::None),
    /* 0x28 */ op("goto", F10t, C::ControlFlow, I::None),
    /* 0x29 */ op("goto/16", F20t, C::ControlFlow, I::None),
    /* 0x2A */ op("goto/32", F30t, C::ControlFlow, I::None),
    /* 0x2B */ op("packed-switch", F31t, C::ControlFlow, I::None),
    /* 0x2C */ op("sparse-switch", F31t, C::ControlFlow, I::None),
    /* 0x2D */ op("cmpl-float", F23x, C::Comparison, I::None),
    /* 0x2E */ op("cmpg-float", F23x, C::Comparison, I::None),
    /* 0x2F */ op("cmpl-double", F23x, C::Comparison, I::None),
    /* 0x30 */ op("cmpg-double", F23x, C::Comparison, I::None),
    /* 0x31 */ op("cmp-long", F23x, C::Comparison, I::None),
    /* 0x32 */ op("if-eq", F22t, C::ControlFlow, I::None),
    /* 0x33 */ op("if-ne", F22t, C::ControlFlow, I::None),
    /* 0x34 */ op("if-lt", F22t, C::ControlFlow, I::None),
    /* 0x35 */ op("if-ge", F22t, C::ControlFlow, I::None),
    /* 0x36 */ op("if-gt", F22t, C::ControlFlow, I::None),
    /* 0x37 */ op("if-le", F22t, C::ControlFlow, I::None),
    /* 0x38 */ op("if-eqz", F21t, C::ControlFlow, I::None),
    /* 0x39 */ op("if-nez", F21t, C::ControlFlow, I::None),
    /* 0x3A */ op("if-ltz", F21t, C::ControlFlow, I::None),
    /* 0x3B */ op("if-gez", F21t, C::ControlFlow, I::None),
    /* 0x3C */ op("if-gtz", F21t, C::ControlFlow, I::None),
    /* 0x3D */ op("if-lez", F21t, C::ControlFlow, I::None),
    /* 0x3E */ UNUSED,
    /* 0x3F */ UNUSED,
    /* 0x40 */ UNUSED,
    /* 0x41 */ UNUSED,
    /* 0x42 */ UNUSED,
    /* 0x43 */ UNUSED,
    /* 0x44 */ op("aget", F23x, C::Array, I::None),
    /* 0x45 */ op("aget-wide", F23x, C::Array, I::None),
    /* 0x46 */ op("aget-object", F23x, C::Array, I::None),
    /* 0x47 */ op("aget-boolean", F23x, C::Array, I::None),
    /* 0x48 */ op("aget-byte", F23x, C::Array, I::None),
    /* 0x49 */ op("aget-char", F23x, C::Array, I::None),
    /* 0x4A */ op("aget-short", F23x, C::Array, I::None),
    /* 0x4B */ op("aput", F23x, C::Array, I::None),
    /* 0x4C */ op("aput-wide", F23x, C::Array, I::None),
    /* 0x4D */ op("aput-object", F23x, C::Array, I::None),
    /* 0x4E */ op("aput-boolean", F23x, C::Array, I::None),
    /* 0x4F */ op("aput-byte", F23x, C::Array, I::None),
    /* 0x50 */ op("aput-char", F23x, C::Array, I::None),
    /* 0x51 */ op("aput-short", F23x, C::Array, I::None),
    /* 0x52 */ op("iget", F22c, C::Field, I::Field),
    /* 0x53 */ op("iget-wide", F22c, C::Field, I::Field),
    /* 0x54 */ op("iget-object", F22c, C::Field, I::Field),
    /* 0x55 */ op("iget-boolean", F22c, C::Field, I::Field),
    /* 0x56 */ op("iget-byte", F22c, C::Field, I::Field),
    /* 0x57 */ op("iget-char", F22c, C::Field, I::Field),
    /* 0x58 */ op("iget-short", F22c, C::Field, I::Field),
    /* 0x59 */ op("iput", F22c, C::Field, I::Field),
    /* 0x5A */ op("iput-wide", F22c, C::Field, I::Field),
    /* 0x5B */ op("iput-object", F22c, C::Field, I::Field),
    /* 0x5C */ op("iput-boolean", F22c, C::Field, I::Field),
    /* 0x5D */ op("iput-byte", F22c, C::Field, I::Field),
    /* 0x5E */ op("iput-char", F22c, C::Field, I::Field),
    /* 0x5F */ op("iput-short", F22c, C::Field, I::Field),
    /* 0x60 */ op("sget", F21c, C::Field, I::Field),
    /* 0x61 */ op("sget-wide", F21c, C::Field, I::Field),
    /* 0x62 */ op("sget-object", F21c, C::Field, I::Field),
    /* 0x63 */ op("sget-boolean", F21c, C::Field, I::Field),
    /* 0x64 */ op("sget-byte", F21c, C::Field, I::Field),
    /* 0x65 */ op("sget-char", F21c, C::Field, I::Field),
    /* 0x66 */ op("sget-short", F21c, C::Field, I::Field),
    /* 0x67 */ op("sput", F21c, C::Field, I::Field),
    /* 0x68 */ op("sput-wide", F21c, C::Field, I::Field),
    /* 0x69 */ op("sput-object", F21c, C::Field, I::Field),
    /* 0x6A */ op("sput-boolean", F21c, C::Field, I::Field),
    /* 0x6B */ op("sput-byte", F21c, C::Field, I::Field),
    /* 0x6C */ op("sput-char", F21c, C::Field, I::Field),
    /* 0x6D */ op("sput-short", F21c, C::Field, I::Field),
    /* 0x6E */ op("invoke-virtual", F35c, C::Invoke, I::Method),
    /* 0x6F */ op("invoke-super", F35c, C::Invoke, I::Method),
    /* 0x70 */ op("invoke-direct", F35c, C::Invoke, I::Method),
    /* 0x71 */ op("invoke-static", F35c, C::Invoke, I::Method),
    /* 0x72 */ op("invoke-interface", F35c, C::Invoke, I::Method),
    /* 0x73 */ UNUSED,
    /* 0x74 */ op("invoke-virtual/range", F3rc, C::Invoke, I::Method),
    /* 0x75 */ op("invoke-super/range", F3rc, C::Invoke, I::Method),
    /* 0x76 */ op("invoke-direct/range", F3rc, C::Invoke, I::Method),
    /* 0x77 */ op("invoke-static/range", F3rc, C::Invoke, I::Method),
    /* 0x78 */ op("invoke-interface/range", F3rc, C::Invoke, I::Method),
    /* 0x79 */ UNUSED,
    /* 0x7A */ UNUSED,
    /* 0x7B */ op("neg-int", F12x, C::Arithmetic, I::None),
    /* 0x7C */ op("not-int", F12x, C::Arithmetic, I::None),
    /* 0x7D */ op("neg-long", F12x, C::Arithmetic, I::None),
    /* 0x7E */ op("not-long", F12x, C::Arithmetic, I::None),
    /* 0x7F */ op("neg-float", F12x, C::Arithmetic, I::None),
    /* 0x80 */ op("neg-double", F12x, C::Arithmetic, I::None),
    /* 0x81 */ op("int-to-long", F12x, C::Conversion, I::None),
    /* 0x82 */ op("int-to-float", F12x, C::Conversion, I::None),
    /* 0x83 */ op("int-to-double", F12x, C::Conversion, I::None),
    /* 0x84 */ op("long-to-int", F12x, C::Conversion, I::None),
    /* 0x85 */ op("long-to-float", F12x, C::Conversion, I::None),
    /* 0x86 */ op("long-to-double", F12x, C::Conversion, I::None),
    /* 0x87 */ op("float-to-int", F12x, C::Conversion, I::None),
    /* 0x88 */ op("float-to-long", F12x, C::Conversion, I::None),
    /* 0x89 */ op("float-to-double", F12x, C::Conversion, I::None),
    /* 0x8A */ op("double-to-int", F12x, C::Conversion, I::None),
    /* 0x8B */ op("double-to-long", F12x, C::Conversion, I::None),
    /* 0x8C */ op("double-to-float", F12x, C::Conversion, I::None),
    /* 0x8D */ op("int-to-byte", F12x, C::Conversion, I::None),
    /* 0x8E */ op("int-to-char", F12x, C::Conversion, I::None),
    /* 0x8F */ op("int-to-short", F12x, C::Conversion, I::None),
    /* 0x90 */ op("add-int", F23x, C::Arithmetic, I::None),
    /* 0x91 */ op("sub-int", F23x, C::Arithmetic, I::None),
    /* 0x92 */ op("mul-int", F23x, C::Arithmetic, I::None),
    /* 0x93 */ op("div-int", F23x, C::Arithmetic, I::None),
    /* 0x94 */ op("rem-int", F23x, C::Arithmetic, I::None),
    /* 0x95 */ op("and-int", F23x, C::Arithmetic, I::None),
    /* 0x96 */ op("or-int", F23x, C::Arithmetic, I::None),
    /* 0x97 */ op("xor-int", F23x, C::Arithmetic, I::None),
    /* 0x98 */ op("shl-int", F23x, C::Arithmetic, I::None),
    /* 0x99 */ op("shr-int", F23x, C::Arithmetic, I::None),
    /* 0x9A */ op("ushr-int", F23x, C::Arithmetic, I::None),
    /* 0x9B */ op("add-long", F23x, C::Arithmetic, I::None),
    /* 0x9C */ op("sub-long", F23x, C::Arithmetic, I::None),
    /* 0x9D */ op("mul-long", F23x, C::Arithmetic, I::None),
    /* 0x9E */ op("div-long", F23x, C::Arithmetic, I::None),
    /* 0x9F */ op("rem-long", F23x, C::Arithmetic, I::None),
    /* 0xA0 */ op("and-long", F23x, C::Arithmetic, I::None),
    /* 0xA1 */ op("or-long", F23x, C::Arithmetic, I::None),
    /* 0xA2 */ op("xor-long", F23x, C::Arithmetic, I::None),
    /* 0xA3 */ op("shl-long", F23x, C::Arithmetic, I::None),
    /* 0xA4 */ op("shr-long", F23x, C::Arithmetic, I::None),
    /* 0xA5 */ op("ushr-long", F23x, C::Arithmetic, I::None),
    /* 0xA6 */ op("add-float", F23x, C::Arithmetic, I::None),
    /* 0xA7 */ op("sub-float", F23x, C::Arithmetic, I::None),
    /* 0xA8 */ op("mul-float", F23x, C::Arithmetic, I::None),
    /* 0xA9 */ op("div-float", F23x, C::Arithmetic, I::None),
    /* 0xAA */ op("rem-float", F23x, C::Arithmetic, I::None),
    /* 0xAB */ op("add-double", F23x, C::Arithmetic, I::None),
    /* 0xAC */ op("sub-double", F23x, C::Arithmetic, I::None),
    /* 0xAD */ op("mul-double", F23x, C::Arithmetic, I::None),
    /* 0xAE */ op("div-double", F23x, C::Arithmetic, I::None),
    /* 0xAF */ op("rem-double", F23x, C::Arithmetic, I::None),
    /* 0xB0 */ op("add-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB1 */ op("sub-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB2 */ op("mul-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB3 */ op("div-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB4 */ op("rem-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB5 */ op("and-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB6 */ op("or-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB7 */ op("xor-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB8 */ op("shl-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xB9 */ op("shr-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xBA */ op("ushr-int/2addr", F12x, C::Arithmetic, I::None),
    /* 0xBB */ op("add-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xBC */ op("sub-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xBD */ op("mul-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xBE */ op("div-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xBF */ op("rem-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC0 */ op("and-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC1 */ op("or-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC2 */ op("xor-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC3 */ op("shl-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC4 */ op("shr-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC5 */ op("ushr-long/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC6 */ op("add-float/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC7 */ op("sub-float/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC8 */ op("mul-float/2addr", F12x, C::Arithmetic, I::None),
    /* 0xC9 */ op("div-float/2addr", F12x, C::Arithmetic, I::None),
    /* 0xCA */ op("rem-float/2addr", F12x, C::Arithmetic, I::None),
    /* 0xCB */ op("add-double/2addr", F12x, C::Arithmetic, I::None),
    /* 0xCC */ op("sub-double/2addr", F12x, C::Arithmetic, I::None),
    /* 0xCD */ op("mul-double/2addr", F12x, C::Arithmetic, I::None),
    /* 0xCE */ op("div-double/2addr", F12x, C::Arithmetic, I::None),
    /* 0xCF */ op("rem-double/2addr", F12x, C::Arithmetic, I::None),
    /* 0xD0 */ op("add-int/lit16", F22s, C::Arithmetic, I::None),
    /* 0xD1 */ op("rsub-int", F22s, C::Arithmetic, I::None),
    /* 0xD2 */ op("mul-int/lit16", F22s, C::Arithmetic, I::None),
    /* 0xD3 */ op("div-int/lit16", F22s, C::Arithmetic, I::None),
    /* 0xD4 */ op("rem-int/lit16", F22s, C::Arithmetic, I::None),
    /* 0xD5 */ op("and-int/lit16", F22s, C::Arithmetic, I::None),
    /* 0xD6 */ op("or-int/lit16", F22s, C::Arithmetic, I::None),
    /* 0xD7 */ op("xor-int/lit16", F22s, C::Arithmetic, I::None),
    /* 0xD8 */ op("add-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xD9 */ op("rsub-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xDA */ op("mul-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xDB */ op("div-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xDC */ op("rem-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xDD */ op("and-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xDE */ op("or-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xDF */ op("xor-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xE0 */ op("shl-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xE1 */ op("shr-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xE2 */ op("ushr-int/lit8", F22b, C::Arithmetic, I::None),
    /* 0xE3 */ UNUSED,
    /* 0xE4 */ UNUSED,
    /* 0xE5 */ UNUSED,
    /* 0xE6 */ UNUSED,
    /* 0xE7 */ UNUSED,
    /* 0xE8 */ UNUSED,
    /* 0xE9 */ UNUSED,
    /* 0xEA */ UNUSED,
    /* 0xEB */ UNUSED,
    /* 0xEC */ UNUSED,
    /* 0xED */ UNUSED,
    /* 0xEE */ UNUSED,
    /* 0xEF */ UNUSED,
    /* 0xF0 */ UNUSED,
    /* 0xF1 */ UNUSED,
    /* 0xF2 */ UNUSED,
    /* 0xF3 */ UNUSED,
    /* 0xF4 */ UNUSED,
    /* 0xF5 */ UNUSED,
    /* 0xF6 */ UNUSED,
    /* 0xF7 */ UNUSED,
    /* 0xF8 */ UNUSED,
    /* 0xF9 */ UNUSED,
    /* 0xFA */ op("invoke-polymorphic", F45cc, C::Invoke, I::Method),
    /* 0xFB */ op("invoke-polymorphic/range", F4rcc, C::Invoke, I::Method),
    /* 0xFC */ op("invoke-custom", F35c, C::Invoke, I::CallSite),
    /* 0xFD */ op("invoke-custom/range", F3rc, C::Invoke, I::CallSite),
    /* 0xFE */ op("const-method-handle", F21c, C::Constant, I::MethodHandle),
    /* 0xFF */ op("const-method-type", F21c, C::Constant, I::Proto),
];
