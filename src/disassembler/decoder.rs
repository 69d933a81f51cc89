//! Dalvik instruction decoding.
//!
//! Decoding is linear: instructions are read back to back from the start of a code item's
//! instruction array, with payload pseudo-instructions decoded in place so that the scan
//! stays aligned. No control flow is followed.
//!
//! # Example: Decoding a Stream of Instructions
//!
//! ```rust
//! use dextree::{Parser, disassembler::decode_stream};
//!
//! // const/4 v0, #1 ; return v0
//! let code = [0x12, 0x10, 0x0F, 0x00];
//! let mut parser = Parser::new(&code);
//! let instructions = decode_stream(&mut parser)?;
//!
//! assert_eq!(instructions.len(), 2);
//! assert_eq!(instructions[0].mnemonic, "const/4");
//! assert_eq!(instructions[1].mnemonic, "return");
//! assert_eq!(instructions[1].offset, 1);
//! # Ok::<(), dextree::Error>(())
//! ```

use crate::{
    disassembler::{
        opcodes::{
            CONST_WIDE_HIGH16, FILL_ARRAY_DATA_PAYLOAD, INSTRUCTIONS, NOP, PACKED_SWITCH_PAYLOAD,
            SPARSE_SWITCH_PAYLOAD,
        },
        Format, Instruction, InstructionCategory, Operand, Payload,
    },
    file::parser::Parser,
    Error::InvalidOpcode,
    Result,
};

/// Decodes every instruction until the parser runs out of data.
///
/// # Errors
///
/// Returns an error if an unused opcode is encountered or an instruction is truncated.
pub fn decode_stream(parser: &mut Parser) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(parser)?);
    }

    Ok(instructions)
}

/// Decodes a single instruction from the current parser position.
///
/// The parser must be positioned on a code unit boundary, relative to the start of the
/// instruction array; the resulting [`Instruction::offset`] is that position in code units.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidOpcode`] for unused opcode slots,
/// [`crate::Error::OutOfBounds`] for truncated instructions and [`crate::Error::Malformed`]
/// for impossible encodings (misaligned start, more than five argument registers, register
/// ranges past `v65535`).
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let start = parser.pos();
    if start % 2 != 0 {
        return Err(malformed_error!("Instruction starts at unaligned byte offset {}", start));
    }
    let Ok(offset) = u32::try_from(start / 2) else {
        return Err(out_of_bounds_error!());
    };

    let unit = parser.read_le::<u16>()?;
    let [opcode, high] = unit.to_le_bytes();

    if opcode == NOP
        && matches!(
            high,
            PACKED_SWITCH_PAYLOAD | SPARSE_SWITCH_PAYLOAD | FILL_ARRAY_DATA_PAYLOAD
        )
    {
        return decode_payload(parser, start, offset, high);
    }

    let info = &INSTRUCTIONS[opcode as usize];
    if info.is_unused() {
        return Err(InvalidOpcode(opcode));
    }

    let reg_a = u16::from(high & 0x0F);
    let reg_b = u16::from(high >> 4);
    let reg_aa = u16::from(high);

    let (registers, operand) = match info.format {
        Format::F10x => (Vec::new(), Operand::None),
        Format::F12x => (vec![reg_a, reg_b], Operand::None),
        Format::F11n => {
            let literal = i64::from((high as i8) >> 4);
            (vec![reg_a], Operand::Literal(literal))
        }
        Format::F11x => (vec![reg_aa], Operand::None),
        Format::F10t => (Vec::new(), Operand::Target(i32::from(high as i8))),
        Format::F20t => {
            let target = parser.read_le::<i16>()?;
            (Vec::new(), Operand::Target(i32::from(target)))
        }
        Format::F22x => {
            let source = parser.read_le::<u16>()?;
            (vec![reg_aa, source], Operand::None)
        }
        Format::F21t => {
            let target = parser.read_le::<i16>()?;
            (vec![reg_aa], Operand::Target(i32::from(target)))
        }
        Format::F21s => {
            let literal = parser.read_le::<i16>()?;
            (vec![reg_aa], Operand::Literal(i64::from(literal)))
        }
        Format::F21h => {
            let raw = parser.read_le::<u16>()?;
            let literal = if opcode == CONST_WIDE_HIGH16 {
                i64::from(raw) << 48
            } else {
                i64::from((u32::from(raw) << 16) as i32)
            };
            (vec![reg_aa], Operand::Literal(literal))
        }
        Format::F21c => {
            let index = parser.read_le::<u16>()?;
            (vec![reg_aa], Operand::Index(info.index, u32::from(index)))
        }
        Format::F23x => {
            let [reg_bb, reg_cc] = parser.read_le::<u16>()?.to_le_bytes();
            (
                vec![reg_aa, u16::from(reg_bb), u16::from(reg_cc)],
                Operand::None,
            )
        }
        Format::F22b => {
            let [reg_bb, literal] = parser.read_le::<u16>()?.to_le_bytes();
            (
                vec![reg_aa, u16::from(reg_bb)],
                Operand::Literal(i64::from(literal as i8)),
            )
        }
        Format::F22t => {
            let target = parser.read_le::<i16>()?;
            (vec![reg_a, reg_b], Operand::Target(i32::from(target)))
        }
        Format::F22s => {
            let literal = parser.read_le::<i16>()?;
            (vec![reg_a, reg_b], Operand::Literal(i64::from(literal)))
        }
        Format::F22c => {
            let index = parser.read_le::<u16>()?;
            (
                vec![reg_a, reg_b],
                Operand::Index(info.index, u32::from(index)),
            )
        }
        Format::F30t => {
            let target = parser.read_le::<i32>()?;
            (Vec::new(), Operand::Target(target))
        }
        Format::F32x => {
            let destination = parser.read_le::<u16>()?;
            let source = parser.read_le::<u16>()?;
            (vec![destination, source], Operand::None)
        }
        Format::F31i => {
            let literal = parser.read_le::<i32>()?;
            (vec![reg_aa], Operand::Literal(i64::from(literal)))
        }
        Format::F31t => {
            let target = parser.read_le::<i32>()?;
            (vec![reg_aa], Operand::Target(target))
        }
        Format::F31c => {
            let index = parser.read_le::<u32>()?;
            (vec![reg_aa], Operand::Index(info.index, index))
        }
        Format::F35c => {
            let index = parser.read_le::<u16>()?;
            let registers = read_register_list(parser, high)?;
            (registers, Operand::Index(info.index, u32::from(index)))
        }
        Format::F3rc => {
            let index = parser.read_le::<u16>()?;
            let registers = read_register_range(parser, high)?;
            (registers, Operand::Index(info.index, u32::from(index)))
        }
        Format::F45cc => {
            let method = parser.read_le::<u16>()?;
            let registers = read_register_list(parser, high)?;
            let proto = parser.read_le::<u16>()?;
            (
                registers,
                Operand::Polymorphic {
                    method: u32::from(method),
                    proto: u32::from(proto),
                },
            )
        }
        Format::F4rcc => {
            let method = parser.read_le::<u16>()?;
            let registers = read_register_range(parser, high)?;
            let proto = parser.read_le::<u16>()?;
            (
                registers,
                Operand::Polymorphic {
                    method: u32::from(method),
                    proto: u32::from(proto),
                },
            )
        }
        Format::F51l => {
            let literal = parser.read_le::<i64>()?;
            (vec![reg_aa], Operand::Literal(literal))
        }
        Format::Payload => {
            return Err(malformed_error!("Opcode 0x{:02X} has no fixed encoding", opcode))
        }
    };

    let size = units_since(parser, start);
    debug_assert_eq!(info.format.units(), Some(size), "{}", info.mnemonic);

    Ok(Instruction {
        offset,
        size,
        opcode,
        mnemonic: info.mnemonic,
        format: info.format,
        category: info.category,
        registers,
        operand,
    })
}

/// `{vC, vD, vE, vF, vG}`: the count sits in the high nibble of the first unit, `vG` in its
/// low nibble, the rest in the next unit.
fn read_register_list(parser: &mut Parser, high: u8) -> Result<Vec<u16>> {
    let count = usize::from(high >> 4);
    if count > 5 {
        return Err(malformed_error!("Invalid argument count {}", count));
    }

    let packed = parser.read_le::<u16>()?;
    let all = [
        packed & 0x0F,
        (packed >> 4) & 0x0F,
        (packed >> 8) & 0x0F,
        packed >> 12,
        u16::from(high & 0x0F),
    ];

    Ok(all[..count].to_vec())
}

fn read_register_range(parser: &mut Parser, count: u8) -> Result<Vec<u16>> {
    let first = parser.read_le::<u16>()?;

    (0..u16::from(count))
        .map(|step| {
            first
                .checked_add(step)
                .ok_or_else(|| malformed_error!("Register range starting at v{} overflows", first))
        })
        .collect()
}

fn decode_payload(parser: &mut Parser, start: usize, offset: u32, kind: u8) -> Result<Instruction> {
    let (mnemonic, payload) = match kind {
        PACKED_SWITCH_PAYLOAD => {
            let size = parser.read_le::<u16>()?;
            let first_key = parser.read_le::<i32>()?;
            let targets = (0..size)
                .map(|_| parser.read_le::<i32>())
                .collect::<Result<Vec<_>>>()?;

            (
                "packed-switch-payload",
                Payload::PackedSwitch { first_key, targets },
            )
        }
        SPARSE_SWITCH_PAYLOAD => {
            let size = parser.read_le::<u16>()?;
            let keys = (0..size)
                .map(|_| parser.read_le::<i32>())
                .collect::<Result<Vec<_>>>()?;
            let targets = (0..size)
                .map(|_| parser.read_le::<i32>())
                .collect::<Result<Vec<_>>>()?;

            ("sparse-switch-payload", Payload::SparseSwitch { keys, targets })
        }
        FILL_ARRAY_DATA_PAYLOAD => {
            let element_width = parser.read_le::<u16>()?;
            let count = parser.read_le::<u32>()?;
            let Some(total) = (count as usize).checked_mul(usize::from(element_width)) else {
                return Err(malformed_error!(
                    "Array data of {} x {} bytes overflows",
                    count,
                    element_width
                ));
            };

            let data = parser.read_bytes(total)?.to_vec();
            if total % 2 != 0 {
                parser.advance_by(1)?;
            }

            (
                "fill-array-data-payload",
                Payload::FillArrayData {
                    element_width,
                    data,
                },
            )
        }
        _ => return Err(malformed_error!("Unknown payload kind 0x{:02X}", kind)),
    };

    Ok(Instruction {
        offset,
        size: units_since(parser, start),
        opcode: NOP,
        mnemonic,
        format: Format::Payload,
        category: InstructionCategory::Misc,
        registers: Vec::new(),
        operand: Operand::Payload(payload),
    })
}

#[allow(clippy::cast_possible_truncation)]
fn units_since(parser: &Parser, start: usize) -> u32 {
    ((parser.pos() - start) / 2) as u32
}

#[cfg(test)]
mod tests {
    use crate::{
        disassembler::{
            decode_instruction, decode_stream, ConstKind, Format, IndexKind, InstructionCategory,
            opcodes::INSTRUCTIONS, Operand, Payload,
        },
        Error, Parser,
    };

    fn code(units: &[u16]) -> Vec<u8> {
        units.iter().flat_map(|unit| unit.to_le_bytes()).collect()
    }

    fn decode_one(units: &[u16]) -> crate::disassembler::Instruction {
        let bytes = code(units);
        let mut parser = Parser::new(&bytes);
        let instruction = decode_instruction(&mut parser).unwrap();
        assert_eq!(parser.pos(), bytes.len(), "not fully consumed: {units:04X?}");
        instruction
    }

    #[test]
    fn sizes_match_formats() {
        for (opcode, info) in INSTRUCTIONS.iter().enumerate() {
            if info.is_unused() {
                continue;
            }

            let mut units = vec![0_u16; 5];
            units[0] = opcode as u16;
            let bytes = code(&units);
            let instruction = decode_instruction(&mut Parser::new(&bytes)).unwrap();

            assert_eq!(
                Some(instruction.size),
                info.format.units(),
                "{}",
                info.mnemonic
            );
            assert_eq!(instruction.format, info.format);
        }
    }

    #[test]
    fn const_string() {
        // const-string v3, string@0x0102
        let instruction = decode_one(&[0x031A, 0x0102]);

        assert_eq!(instruction.mnemonic, "const-string");
        assert_eq!(instruction.format, Format::F21c);
        assert_eq!(instruction.size, 2);
        assert_eq!(instruction.registers, vec![3]);
        assert_eq!(instruction.operand, Operand::Index(IndexKind::String, 0x0102));
        assert_eq!(instruction.const_kind(), Some(ConstKind::String));
        assert_eq!(instruction.category, InstructionCategory::Constant);
        assert_eq!(instruction.string_value(), None);
    }

    #[test]
    fn const_string_jumbo() {
        // const-string/jumbo v0, string@0x00012345
        let instruction = decode_one(&[0x001B, 0x2345, 0x0001]);

        assert_eq!(instruction.format, Format::F31c);
        assert_eq!(instruction.size, 3);
        assert_eq!(instruction.operand, Operand::Index(IndexKind::String, 0x12345));
        assert_eq!(instruction.const_kind(), Some(ConstKind::StringJumbo));
    }

    #[test]
    fn literals() {
        // const/4 v1, #-1
        let instruction = decode_one(&[0xF112]);
        assert_eq!(instruction.registers, vec![1]);
        assert_eq!(instruction.operand, Operand::Literal(-1));

        // const/4 v2, #7
        assert_eq!(decode_one(&[0x7212]).operand, Operand::Literal(7));

        // const/16 v0, #-2
        assert_eq!(decode_one(&[0x0013, 0xFFFE]).operand, Operand::Literal(-2));

        // const v0, #0x12345678
        assert_eq!(
            decode_one(&[0x0014, 0x5678, 0x1234]).operand,
            Operand::Literal(0x12345678)
        );

        // const/high16 v0, #0x80000000
        assert_eq!(
            decode_one(&[0x0015, 0x8000]).operand,
            Operand::Literal(i64::from(i32::MIN))
        );

        // const-wide/high16 v0, #0x4000000000000000
        assert_eq!(
            decode_one(&[0x0019, 0x4000]).operand,
            Operand::Literal(0x4000_0000_0000_0000)
        );

        // const-wide v0, #0x0102030405060708
        let instruction = decode_one(&[0x0018, 0x0708, 0x0506, 0x0304, 0x0102]);
        assert_eq!(instruction.size, 5);
        assert_eq!(instruction.operand, Operand::Literal(0x0102030405060708));
        assert_eq!(instruction.const_kind(), Some(ConstKind::Literal));

        // add-int/lit8 v0, v1, #-3
        let instruction = decode_one(&[0x00D8, 0xFD01]);
        assert_eq!(instruction.registers, vec![0, 1]);
        assert_eq!(instruction.operand, Operand::Literal(-3));
    }

    #[test]
    fn registers() {
        // move v1, v2
        assert_eq!(decode_one(&[0x2101]).registers, vec![1, 2]);
        // move/from16 v255, v1000
        assert_eq!(decode_one(&[0xFF02, 1000]).registers, vec![255, 1000]);
        // move/16 v300, v400
        assert_eq!(decode_one(&[0x0003, 300, 400]).registers, vec![300, 400]);
        // add-int v0, v1, v2
        assert_eq!(decode_one(&[0x0090, 0x0201]).registers, vec![0, 1, 2]);
    }

    #[test]
    fn branches() {
        // goto -2
        let instruction = decode_one(&[0xFE28]);
        assert_eq!(instruction.operand, Operand::Target(-2));

        // if-eqz v0, +4
        let instruction = decode_one(&[0x0038, 0x0004]);
        assert_eq!(instruction.registers, vec![0]);
        assert_eq!(instruction.target(), Some(4));
        assert_eq!(instruction.category, InstructionCategory::ControlFlow);

        // goto/32 +0x10000
        assert_eq!(
            decode_one(&[0x002A, 0x0000, 0x0001]).operand,
            Operand::Target(0x10000)
        );
    }

    #[test]
    fn invokes() {
        // invoke-virtual {v1, v2, v3}, method@0x0010
        let instruction = decode_one(&[0x306E, 0x0010, 0x0321]);
        assert_eq!(instruction.registers, vec![1, 2, 3]);
        assert_eq!(instruction.operand, Operand::Index(IndexKind::Method, 0x10));

        // invoke-static {v0, v1, v2, v3, v4}, method@0x0001
        let instruction = decode_one(&[0x5471, 0x0001, 0x3210]);
        assert_eq!(instruction.registers, vec![0, 1, 2, 3, 4]);

        // invoke-direct/range {v10 .. v12}, method@0x0002
        let instruction = decode_one(&[0x0376, 0x0002, 0x000A]);
        assert_eq!(instruction.registers, vec![10, 11, 12]);
        assert_eq!(instruction.format, Format::F3rc);

        // invoke-polymorphic {v0, v1}, method@0x0005, proto@0x0006
        let instruction = decode_one(&[0x20FA, 0x0005, 0x0010, 0x0006]);
        assert_eq!(instruction.size, 4);
        assert_eq!(instruction.registers, vec![0, 1]);
        assert_eq!(
            instruction.operand,
            Operand::Polymorphic {
                method: 5,
                proto: 6
            }
        );
    }

    #[test]
    fn invalid_argument_count() {
        let bytes = code(&[0x606E, 0x0001, 0x0000]);
        let mut parser = Parser::new(&bytes);
        assert!(matches!(
            decode_instruction(&mut parser),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn unused_opcode() {
        let bytes = code(&[0x003E]);
        let mut parser = Parser::new(&bytes);
        assert!(matches!(
            decode_instruction(&mut parser),
            Err(Error::InvalidOpcode(0x3E))
        ));
    }

    #[test]
    fn truncated() {
        // const-string with its index missing
        let bytes = code(&[0x001A]);
        let mut parser = Parser::new(&bytes);
        assert!(matches!(decode_instruction(&mut parser), Err(Error::OutOfBounds)));
    }

    #[test]
    fn packed_switch_payload() {
        let instruction = decode_one(&[0x0100, 0x0002, 0x000A, 0x0000, 0x0005, 0x0000, 0x0009, 0x0000]);

        assert!(instruction.is_payload());
        assert_eq!(instruction.mnemonic, "packed-switch-payload");
        assert_eq!(instruction.size, 8);
        assert_eq!(instruction.const_kind(), None);
        assert_eq!(
            instruction.operand,
            Operand::Payload(Payload::PackedSwitch {
                first_key: 10,
                targets: vec![5, 9]
            })
        );
    }

    #[test]
    fn sparse_switch_payload() {
        let instruction = decode_one(&[
            0x0200, 0x0002, 0xFFFF, 0xFFFF, 0x0064, 0x0000, 0x0003, 0x0000, 0x0007, 0x0000,
        ]);

        assert_eq!(instruction.size, 10);
        assert_eq!(
            instruction.operand,
            Operand::Payload(Payload::SparseSwitch {
                keys: vec![-1, 100],
                targets: vec![3, 7]
            })
        );
    }

    #[test]
    fn fill_array_data_payload_with_padding() {
        // three 1-byte elements, padded to a full code unit
        let instruction = decode_one(&[0x0300, 0x0001, 0x0003, 0x0000, 0x0201, 0x0003]);

        assert_eq!(instruction.size, 6);
        assert_eq!(
            instruction.operand,
            Operand::Payload(Payload::FillArrayData {
                element_width: 1,
                data: vec![1, 2, 3]
            })
        );
    }

    #[test]
    fn stream_stays_aligned_across_payloads() {
        let bytes = code(&[
            0x002B, 0x0004, 0x0000, // packed-switch v0, +4
            0x000E, // return-void
            0x0100, 0x0001, 0x0000, 0x0000, 0x0003, 0x0000, // payload
            0x001A, 0x0000, // const-string v0, string@0
        ]);
        let mut parser = Parser::new(&bytes);
        let instructions = decode_stream(&mut parser).unwrap();

        let mnemonics: Vec<_> = instructions.iter().map(|i| i.mnemonic).collect();
        assert_eq!(
            mnemonics,
            vec![
                "packed-switch",
                "return-void",
                "packed-switch-payload",
                "const-string"
            ]
        );
        assert_eq!(instructions[0].target(), Some(4));
        assert_eq!(instructions[2].offset, 4);
        assert_eq!(instructions[3].offset, 10);
    }
}
