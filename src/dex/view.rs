//! Table lookups over the raw bytes of a container.
//!
//! [`DexView`] borrows the container bytes and resolves indices into the string, type,
//! prototype, field and method id tables. All lookups are bounds checked against the table
//! sizes from the [`Header`] and against the container length.

use crate::{
    dex::{
        header::{Header, Section},
        records::{AccessFlags, ClassRecord, CodeItem, FieldRecord, MethodRecord},
    },
    disassembler::{decode_stream, IndexKind, Operand},
    file::parser::Parser,
    Result,
};

/// Marks an absent index in `class_defs` (superclass, source file).
pub const NO_INDEX: u32 = 0xFFFF_FFFF;

const CLASS_DEF_SIZE: usize = 32;

/// A `class_def_item` with its indices still unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDef {
    /// Index into `type_ids` of this class
    pub class_idx: u32,
    /// Raw access flags
    pub access_flags: u32,
    /// Index into `type_ids` of the superclass, or [`NO_INDEX`]
    pub superclass_idx: u32,
    /// Offset of the implemented interfaces type list, `0` if none
    pub interfaces_off: u32,
    /// Index into `string_ids` of the source file name, or [`NO_INDEX`]
    pub source_file_idx: u32,
    /// Offset of the annotations directory, `0` if none
    pub annotations_off: u32,
    /// Offset of the class data, `0` for marker classes without members
    pub class_data_off: u32,
    /// Offset of the static initial values, `0` if none
    pub static_values_off: u32,
}

/// Borrowed, validated view over a container's bytes.
pub struct DexView<'a> {
    data: &'a [u8],
    header: Header,
}

impl<'a> DexView<'a> {
    /// Parse the header of `data` and build a view limited to the declared file size.
    ///
    /// # Errors
    /// Returns an error if the header is invalid, see [`Header::read`].
    pub fn new(data: &'a [u8]) -> Result<DexView<'a>> {
        let header = Header::read(data)?;
        let data = &data[..header.file_size as usize];

        Ok(DexView { data, header })
    }

    /// The parsed header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The container bytes, limited to the declared file size.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns a parser positioned at `offset`.
    fn parser_at(&self, offset: u32) -> Result<Parser<'a>> {
        let mut parser = Parser::new(self.data);
        parser.seek(offset as usize)?;
        Ok(parser)
    }

    /// Returns a parser positioned at entry `index` of `section`.
    fn entry(&self, section: &Section, index: u32, entry_size: usize) -> Result<Parser<'a>> {
        if index >= section.size {
            return Err(out_of_bounds_error!());
        }

        let offset = section.offset as usize + index as usize * entry_size;
        let Ok(offset) = u32::try_from(offset) else {
            return Err(out_of_bounds_error!());
        };

        self.parser_at(offset)
    }

    /// Resolve an index into `string_ids`.
    ///
    /// # Errors
    /// Returns an error if the index or the string data offset is out of range, or the data
    /// is not valid modified UTF-8.
    pub fn string(&self, index: u32) -> Result<String> {
        let data_off = self
            .entry(&self.header.string_ids, index, 4)?
            .read_le::<u32>()?;

        let mut parser = self.parser_at(data_off)?;
        // utf16_size, only informative
        parser.read_uleb128()?;
        parser.read_mutf8()
    }

    /// Resolve an index into `type_ids` to its descriptor.
    ///
    /// # Errors
    /// Returns an error if the index or the referenced string is invalid.
    pub fn type_descriptor(&self, index: u32) -> Result<String> {
        let descriptor_idx = self
            .entry(&self.header.type_ids, index, 4)?
            .read_le::<u32>()?;
        self.string(descriptor_idx)
    }

    /// Resolve a `type_list` at `offset`; offset `0` is the empty list.
    ///
    /// # Errors
    /// Returns an error if the list or one of its types is invalid.
    pub fn type_list(&self, offset: u32) -> Result<Vec<String>> {
        if offset == 0 {
            return Ok(Vec::new());
        }

        let mut parser = self.parser_at(offset)?;
        let size = parser.read_le::<u32>()?;

        let mut types = Vec::with_capacity(size.min(256) as usize);
        for _ in 0..size {
            let type_idx = parser.read_le::<u16>()?;
            types.push(self.type_descriptor(u32::from(type_idx))?);
        }

        Ok(types)
    }

    /// Resolve an index into `proto_ids` to its parameter and return type descriptors.
    ///
    /// # Errors
    /// Returns an error if the prototype or any referenced type is invalid.
    pub fn proto(&self, index: u32) -> Result<(Vec<String>, String)> {
        let mut parser = self.entry(&self.header.proto_ids, index, 12)?;
        let _shorty_idx = parser.read_le::<u32>()?;
        let return_type_idx = parser.read_le::<u32>()?;
        let parameters_off = parser.read_le::<u32>()?;

        Ok((
            self.type_list(parameters_off)?,
            self.type_descriptor(return_type_idx)?,
        ))
    }

    /// Resolve an index into `field_ids` into a [`FieldRecord`] with the given flags.
    ///
    /// # Errors
    /// Returns an error if the field id or its type or name is invalid.
    pub fn field(&self, index: u32, access_flags: u32) -> Result<FieldRecord> {
        let mut parser = self.entry(&self.header.field_ids, index, 8)?;
        let _class_idx = parser.read_le::<u16>()?;
        let type_idx = parser.read_le::<u16>()?;
        let name_idx = parser.read_le::<u32>()?;

        Ok(FieldRecord {
            id: index,
            name: self.string(name_idx)?,
            type_descriptor: self.type_descriptor(u32::from(type_idx))?,
            access_flags: AccessFlags::from_bits_retain(access_flags),
        })
    }

    /// Resolve an index into `method_ids` into a [`MethodRecord`].
    ///
    /// # Errors
    /// Returns an error if the method id, its prototype or its name is invalid.
    pub fn method(&self, index: u32, access_flags: u32, code_off: u32) -> Result<MethodRecord> {
        let mut parser = self.entry(&self.header.method_ids, index, 8)?;
        let _class_idx = parser.read_le::<u16>()?;
        let proto_idx = parser.read_le::<u16>()?;
        let name_idx = parser.read_le::<u32>()?;

        let (params, return_type) = self.proto(u32::from(proto_idx))?;

        Ok(MethodRecord {
            id: index,
            name: self.string(name_idx)?,
            params,
            return_type,
            access_flags: AccessFlags::from_bits_retain(access_flags),
            code_off,
        })
    }

    /// Number of entries in `class_defs`.
    #[must_use]
    pub fn class_count(&self) -> u32 {
        self.header.class_defs.size
    }

    /// Read the raw class definition at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is not a valid class definition.
    pub fn class_def(&self, index: u32) -> Result<ClassDef> {
        let mut parser = self.entry(&self.header.class_defs, index, CLASS_DEF_SIZE)?;

        Ok(ClassDef {
            class_idx: parser.read_le::<u32>()?,
            access_flags: parser.read_le::<u32>()?,
            superclass_idx: parser.read_le::<u32>()?,
            interfaces_off: parser.read_le::<u32>()?,
            source_file_idx: parser.read_le::<u32>()?,
            annotations_off: parser.read_le::<u32>()?,
            class_data_off: parser.read_le::<u32>()?,
            static_values_off: parser.read_le::<u32>()?,
        })
    }

    /// Read the class definition at `index` and decode its class data.
    ///
    /// Member indices in the class data are delta encoded; each of the four member lists
    /// restarts from zero.
    ///
    /// # Errors
    /// Returns an error if the definition, its class data or any referenced id is invalid.
    pub fn class(&self, index: u32) -> Result<ClassRecord> {
        let def = self.class_def(index)?;

        let mut record = ClassRecord {
            id: index,
            descriptor: self.type_descriptor(def.class_idx)?,
            access_flags: AccessFlags::from_bits_retain(def.access_flags),
            superclass: match def.superclass_idx {
                NO_INDEX => None,
                idx => Some(self.type_descriptor(idx)?),
            },
            source_file: match def.source_file_idx {
                NO_INDEX => None,
                idx => Some(self.string(idx)?),
            },
            direct_methods: Vec::new(),
            virtual_methods: Vec::new(),
            static_fields: Vec::new(),
            instance_fields: Vec::new(),
        };

        if def.class_data_off == 0 {
            return Ok(record);
        }

        let mut parser = self.parser_at(def.class_data_off)?;
        let static_fields_size = parser.read_uleb128()?;
        let instance_fields_size = parser.read_uleb128()?;
        let direct_methods_size = parser.read_uleb128()?;
        let virtual_methods_size = parser.read_uleb128()?;

        record.static_fields = self.encoded_fields(&mut parser, static_fields_size)?;
        record.instance_fields = self.encoded_fields(&mut parser, instance_fields_size)?;
        record.direct_methods = self.encoded_methods(&mut parser, direct_methods_size)?;
        record.virtual_methods = self.encoded_methods(&mut parser, virtual_methods_size)?;

        Ok(record)
    }

    fn encoded_fields(&self, parser: &mut Parser, count: u32) -> Result<Vec<FieldRecord>> {
        let mut fields = Vec::with_capacity(count.min(1024) as usize);
        let mut field_idx = 0_u32;

        for _ in 0..count {
            field_idx = next_index(field_idx, parser.read_uleb128()?)?;
            let access_flags = parser.read_uleb128()?;
            fields.push(self.field(field_idx, access_flags)?);
        }

        Ok(fields)
    }

    fn encoded_methods(&self, parser: &mut Parser, count: u32) -> Result<Vec<MethodRecord>> {
        let mut methods = Vec::with_capacity(count.min(1024) as usize);
        let mut method_idx = 0_u32;

        for _ in 0..count {
            method_idx = next_index(method_idx, parser.read_uleb128()?)?;
            let access_flags = parser.read_uleb128()?;
            let code_off = parser.read_uleb128()?;
            methods.push(self.method(method_idx, access_flags, code_off)?);
        }

        Ok(methods)
    }

    /// Read and decode the code item at `offset`.
    ///
    /// String loads are resolved against the string table, turning their
    /// `Operand::Index(IndexKind::String, _)` into [`Operand::String`].
    ///
    /// # Errors
    /// Returns an error if the code item is truncated, contains an invalid instruction or
    /// references a string that does not exist.
    pub fn code_item(&self, offset: u32) -> Result<CodeItem> {
        if offset == 0 {
            return Err(malformed_error!("Code item offset 0 is reserved for methods without code"));
        }

        let mut parser = self.parser_at(offset)?;
        let registers_size = parser.read_le::<u16>()?;
        let ins_size = parser.read_le::<u16>()?;
        let outs_size = parser.read_le::<u16>()?;
        let tries_size = parser.read_le::<u16>()?;
        let debug_info_off = parser.read_le::<u32>()?;
        let insns_size = parser.read_le::<u32>()?;

        let Some(insns_len) = (insns_size as usize).checked_mul(2) else {
            return Err(out_of_bounds_error!());
        };
        let insns = parser.read_bytes(insns_len)?;

        let mut instructions = decode_stream(&mut Parser::new(insns))?;
        for instruction in &mut instructions {
            if let Operand::Index(IndexKind::String, index) = instruction.operand {
                instruction.operand = Operand::String {
                    index,
                    value: self.string(index)?,
                };
            }
        }

        Ok(CodeItem {
            registers_size,
            ins_size,
            outs_size,
            tries_size,
            debug_info_off,
            insns_size,
            instructions,
        })
    }
}

fn next_index(previous: u32, diff: u32) -> Result<u32> {
    previous
        .checked_add(diff)
        .ok_or_else(|| malformed_error!("Member index overflow: {} + {}", previous, diff))
}
