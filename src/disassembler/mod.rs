//! Dalvik bytecode decoding.
//!
//! This module decodes the instruction arrays of DEX code items into typed [`Instruction`]
//! values. It covers all 256 opcode slots through the static table in [`opcodes`], including
//! the three payload pseudo-instructions that share opcode `0x00` with `nop`.
//!
//! # Key Types
//! - [`Instruction`] - Represents a decoded Dalvik instruction
//! - [`Operand`] - Instruction operands (literals, indices, targets, payloads)
//! - [`ConstKind`] - Classification of constant loads, used to find string literals
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a whole instruction array
//!
//! # Example
//! ```rust
//! use dextree::disassembler::decode_instruction;
//! use dextree::Parser;
//!
//! let bytecode = [0x0E, 0x00]; // return-void
//! let mut parser = Parser::new(&bytecode);
//! let instruction = decode_instruction(&mut parser)?;
//! assert_eq!(instruction.mnemonic, "return-void");
//! # Ok::<(), dextree::Error>(())
//! ```

mod decoder;
mod instruction;
pub mod opcodes;

pub use decoder::{decode_instruction, decode_stream};
pub use instruction::{
    ConstKind, Format, IndexKind, Instruction, InstructionCategory, Operand, Payload,
};
