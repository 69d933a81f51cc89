//! Factory for well-formed DEX images.
//!
//! [`DexBuilder`] collects strings, types, prototypes, member ids and class definitions, and
//! lays them out into a container with a valid header, checksum and signature. Member lists
//! keep declaration order, which the class data encodes as ascending index deltas.

use std::collections::HashMap;

use sha1::{Digest, Sha1};

use crate::dex::header::adler32;

const NO_INDEX: u32 = 0xFFFF_FFFF;
const ACC_PUBLIC: u32 = 0x0001;
const ACC_STATIC: u32 = 0x0008;
const ACC_ABSTRACT: u32 = 0x0400;
const ACC_CONSTRUCTOR: u32 = 0x1_0000;

struct MethodSpec {
    name: String,
    params: Vec<String>,
    return_type: String,
    access_flags: u32,
    code: Option<Vec<u16>>,
}

struct FieldSpec {
    name: String,
    type_descriptor: String,
    access_flags: u32,
}

/// Declarative description of one class for [`DexBuilder::class`].
pub struct ClassSpec {
    descriptor: String,
    access_flags: u32,
    superclass: Option<String>,
    source_file: Option<String>,
    static_fields: Vec<FieldSpec>,
    instance_fields: Vec<FieldSpec>,
    direct_methods: Vec<MethodSpec>,
    virtual_methods: Vec<MethodSpec>,
}

impl ClassSpec {
    pub fn new(descriptor: &str) -> Self {
        ClassSpec {
            descriptor: descriptor.to_string(),
            access_flags: ACC_PUBLIC,
            superclass: None,
            source_file: None,
            static_fields: Vec::new(),
            instance_fields: Vec::new(),
            direct_methods: Vec::new(),
            virtual_methods: Vec::new(),
        }
    }

    pub fn superclass(mut self, descriptor: &str) -> Self {
        self.superclass = Some(descriptor.to_string());
        self
    }

    pub fn source_file(mut self, name: &str) -> Self {
        self.source_file = Some(name.to_string());
        self
    }

    pub fn static_field(mut self, name: &str, type_descriptor: &str) -> Self {
        self.static_fields.push(FieldSpec {
            name: name.to_string(),
            type_descriptor: type_descriptor.to_string(),
            access_flags: ACC_PUBLIC | ACC_STATIC,
        });
        self
    }

    pub fn instance_field(mut self, name: &str, type_descriptor: &str) -> Self {
        self.instance_fields.push(FieldSpec {
            name: name.to_string(),
            type_descriptor: type_descriptor.to_string(),
            access_flags: ACC_PUBLIC,
        });
        self
    }

    /// Adds a direct method; `code` holds the raw instruction units, `None` for no code item.
    pub fn direct_method(
        mut self,
        name: &str,
        params: &[&str],
        return_type: &str,
        code: Option<&[u16]>,
    ) -> Self {
        let access_flags = if name == "<init>" {
            ACC_PUBLIC | ACC_CONSTRUCTOR
        } else {
            ACC_PUBLIC | ACC_STATIC
        };
        self.direct_methods
            .push(method_spec(name, params, return_type, access_flags, code));
        self
    }

    /// Adds a virtual method; `code` holds the raw instruction units, `None` for abstract.
    pub fn virtual_method(
        mut self,
        name: &str,
        params: &[&str],
        return_type: &str,
        code: Option<&[u16]>,
    ) -> Self {
        let access_flags = if code.is_some() {
            ACC_PUBLIC
        } else {
            ACC_PUBLIC | ACC_ABSTRACT
        };
        self.virtual_methods
            .push(method_spec(name, params, return_type, access_flags, code));
        self
    }
}

fn method_spec(
    name: &str,
    params: &[&str],
    return_type: &str,
    access_flags: u32,
    code: Option<&[u16]>,
) -> MethodSpec {
    MethodSpec {
        name: name.to_string(),
        params: params.iter().map(ToString::to_string).collect(),
        return_type: return_type.to_string(),
        access_flags,
        code: code.map(<[u16]>::to_vec),
    }
}

struct ClassEntry {
    class_idx: u32,
    access_flags: u32,
    superclass_idx: u32,
    source_file_idx: u32,
    // (field_idx, access_flags)
    static_fields: Vec<(u32, u32)>,
    instance_fields: Vec<(u32, u32)>,
    // (method_idx, access_flags, code)
    direct_methods: Vec<(u32, u32, Option<Vec<u16>>)>,
    virtual_methods: Vec<(u32, u32, Option<Vec<u16>>)>,
}

impl ClassEntry {
    fn has_members(&self) -> bool {
        !(self.static_fields.is_empty()
            && self.instance_fields.is_empty()
            && self.direct_methods.is_empty()
            && self.virtual_methods.is_empty())
    }
}

/// Builder for in-memory DEX images used by unit tests.
#[derive(Default)]
pub struct DexBuilder {
    strings: Vec<String>,
    string_lookup: HashMap<String, u32>,
    types: Vec<u32>,
    type_lookup: HashMap<String, u32>,
    // (shorty string, return type, params)
    protos: Vec<(u32, u32, Vec<u32>)>,
    // (class type, field type, name string)
    fields: Vec<(u16, u16, u32)>,
    // (class type, proto, name string)
    methods: Vec<(u16, u16, u32)>,
    classes: Vec<ClassEntry>,
}

impl DexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `value` and returns its string index.
    pub fn string(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.string_lookup.get(value) {
            return index;
        }

        let index = self.strings.len() as u32;
        self.strings.push(value.to_string());
        self.string_lookup.insert(value.to_string(), index);
        index
    }

    /// Interns `descriptor` and returns its type index.
    pub fn type_id(&mut self, descriptor: &str) -> u32 {
        if let Some(&index) = self.type_lookup.get(descriptor) {
            return index;
        }

        let string_idx = self.string(descriptor);
        let index = self.types.len() as u32;
        self.types.push(string_idx);
        self.type_lookup.insert(descriptor.to_string(), index);
        index
    }

    /// Adds a prototype and returns its index.
    pub fn proto(&mut self, return_type: &str, params: &[&str]) -> u32 {
        let shorty: String = std::iter::once(return_type)
            .chain(params.iter().copied())
            .map(|descriptor| match descriptor.as_bytes().first() {
                Some(b'[') | Some(b'L') => 'L',
                Some(&code) => char::from(code),
                None => 'V',
            })
            .collect();

        let shorty_idx = self.string(&shorty);
        let return_idx = self.type_id(return_type);
        let param_idx = params.iter().map(|param| self.type_id(param)).collect();

        self.protos.push((shorty_idx, return_idx, param_idx));
        (self.protos.len() - 1) as u32
    }

    /// Adds a field id and returns its index.
    pub fn field(&mut self, class: &str, name: &str, type_descriptor: &str) -> u32 {
        let class_idx = self.type_id(class) as u16;
        let type_idx = self.type_id(type_descriptor) as u16;
        let name_idx = self.string(name);

        self.fields.push((class_idx, type_idx, name_idx));
        (self.fields.len() - 1) as u32
    }

    /// Adds a method id and returns its index.
    pub fn method(&mut self, class: &str, name: &str, params: &[&str], return_type: &str) -> u32 {
        let class_idx = self.type_id(class) as u16;
        let proto_idx = self.proto(return_type, params) as u16;
        let name_idx = self.string(name);

        self.methods.push((class_idx, proto_idx, name_idx));
        (self.methods.len() - 1) as u32
    }

    /// Adds a class definition together with ids for all of its members.
    pub fn class(&mut self, spec: ClassSpec) -> &mut Self {
        let descriptor = spec.descriptor.clone();

        let fields = |builder: &mut Self, specs: &[FieldSpec]| -> Vec<(u32, u32)> {
            specs
                .iter()
                .map(|field| {
                    let idx = builder.field(&descriptor, &field.name, &field.type_descriptor);
                    (idx, field.access_flags)
                })
                .collect()
        };
        let static_fields = fields(self, &spec.static_fields);
        let instance_fields = fields(self, &spec.instance_fields);

        let methods = |builder: &mut Self, specs: Vec<MethodSpec>| {
            specs
                .into_iter()
                .map(|method| {
                    let params: Vec<&str> = method.params.iter().map(String::as_str).collect();
                    let idx = builder.method(&descriptor, &method.name, &params, &method.return_type);
                    (idx, method.access_flags, method.code)
                })
                .collect::<Vec<_>>()
        };
        let direct_methods = methods(self, spec.direct_methods);
        let virtual_methods = methods(self, spec.virtual_methods);

        let entry = ClassEntry {
            class_idx: self.type_id(&spec.descriptor),
            access_flags: spec.access_flags,
            superclass_idx: spec
                .superclass
                .as_deref()
                .map_or(NO_INDEX, |superclass| self.type_id(superclass)),
            source_file_idx: spec
                .source_file
                .as_deref()
                .map_or(NO_INDEX, |source| self.string(source)),
            static_fields,
            instance_fields,
            direct_methods,
            virtual_methods,
        };

        self.classes.push(entry);
        self
    }

    /// Lays out the container and returns its bytes.
    pub fn build(&self) -> Vec<u8> {
        let string_ids_off = 0x70_u32;
        let type_ids_off = string_ids_off + 4 * self.strings.len() as u32;
        let proto_ids_off = type_ids_off + 4 * self.types.len() as u32;
        let field_ids_off = proto_ids_off + 12 * self.protos.len() as u32;
        let method_ids_off = field_ids_off + 8 * self.fields.len() as u32;
        let class_defs_off = method_ids_off + 8 * self.methods.len() as u32;
        let data_off = class_defs_off + 32 * self.classes.len() as u32;

        let mut data = Vec::new();
        let at = |data: &Vec<u8>| data_off + data.len() as u32;

        let mut string_offsets = Vec::with_capacity(self.strings.len());
        for value in &self.strings {
            string_offsets.push(at(&data));
            write_uleb128(&mut data, value.encode_utf16().count() as u32);
            data.extend_from_slice(&encode_mutf8(value));
            data.push(0);
        }

        let mut param_offsets = Vec::with_capacity(self.protos.len());
        for (_, _, params) in &self.protos {
            if params.is_empty() {
                param_offsets.push(0);
                continue;
            }

            align4(&mut data, data_off);
            param_offsets.push(at(&data));
            data.extend_from_slice(&(params.len() as u32).to_le_bytes());
            for &param in params {
                data.extend_from_slice(&(param as u16).to_le_bytes());
            }
        }

        let mut code_offsets: HashMap<(usize, bool, usize), u32> = HashMap::new();
        for (class_pos, class) in self.classes.iter().enumerate() {
            for (is_virtual, methods) in [(false, &class.direct_methods), (true, &class.virtual_methods)]
            {
                for (method_pos, (_, _, code)) in methods.iter().enumerate() {
                    let Some(units) = code else {
                        continue;
                    };

                    align4(&mut data, data_off);
                    code_offsets.insert((class_pos, is_virtual, method_pos), at(&data));
                    // registers_size, ins_size, outs_size, tries_size
                    for value in [4_u16, 0, 0, 0] {
                        data.extend_from_slice(&value.to_le_bytes());
                    }
                    data.extend_from_slice(&0_u32.to_le_bytes());
                    data.extend_from_slice(&(units.len() as u32).to_le_bytes());
                    for unit in units {
                        data.extend_from_slice(&unit.to_le_bytes());
                    }
                }
            }
        }

        let mut class_data_offsets = Vec::with_capacity(self.classes.len());
        for (class_pos, class) in self.classes.iter().enumerate() {
            if !class.has_members() {
                class_data_offsets.push(0);
                continue;
            }

            class_data_offsets.push(at(&data));
            write_uleb128(&mut data, class.static_fields.len() as u32);
            write_uleb128(&mut data, class.instance_fields.len() as u32);
            write_uleb128(&mut data, class.direct_methods.len() as u32);
            write_uleb128(&mut data, class.virtual_methods.len() as u32);

            for fields in [&class.static_fields, &class.instance_fields] {
                let mut previous = 0;
                for &(idx, flags) in fields {
                    write_uleb128(&mut data, idx - previous);
                    write_uleb128(&mut data, flags);
                    previous = idx;
                }
            }

            for (is_virtual, methods) in [(false, &class.direct_methods), (true, &class.virtual_methods)]
            {
                let mut previous = 0;
                for (method_pos, (idx, flags, _)) in methods.iter().enumerate() {
                    let code_off = code_offsets
                        .get(&(class_pos, is_virtual, method_pos))
                        .copied()
                        .unwrap_or(0);
                    write_uleb128(&mut data, idx - previous);
                    write_uleb128(&mut data, *flags);
                    write_uleb128(&mut data, code_off);
                    previous = *idx;
                }
            }
        }

        let mut out = vec![0_u8; 0x70];

        for offset in &string_offsets {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        for string_idx in &self.types {
            out.extend_from_slice(&string_idx.to_le_bytes());
        }
        for ((shorty, return_type, _), params_off) in self.protos.iter().zip(&param_offsets) {
            out.extend_from_slice(&shorty.to_le_bytes());
            out.extend_from_slice(&return_type.to_le_bytes());
            out.extend_from_slice(&params_off.to_le_bytes());
        }
        for (class_idx, type_idx, name_idx) in &self.fields {
            out.extend_from_slice(&class_idx.to_le_bytes());
            out.extend_from_slice(&type_idx.to_le_bytes());
            out.extend_from_slice(&name_idx.to_le_bytes());
        }
        for (class_idx, proto_idx, name_idx) in &self.methods {
            out.extend_from_slice(&class_idx.to_le_bytes());
            out.extend_from_slice(&proto_idx.to_le_bytes());
            out.extend_from_slice(&name_idx.to_le_bytes());
        }
        for (class, class_data_off) in self.classes.iter().zip(&class_data_offsets) {
            for value in [
                class.class_idx,
                class.access_flags,
                class.superclass_idx,
                0,
                class.source_file_idx,
                0,
                *class_data_off,
                0,
            ] {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }

        assert_eq!(out.len() as u32, data_off);
        out.extend_from_slice(&data);

        let file_size = out.len() as u32;
        let section = |size: usize, offset: u32| -> [u32; 2] {
            if size == 0 {
                [0, 0]
            } else {
                [size as u32, offset]
            }
        };

        let mut header = Vec::with_capacity(0x70);
        header.extend_from_slice(b"dex\n035\0");
        header.extend_from_slice(&[0; 24]);
        for value in [file_size, 0x70, 0x1234_5678, 0, 0, 0]
            .into_iter()
            .chain(section(self.strings.len(), string_ids_off))
            .chain(section(self.types.len(), type_ids_off))
            .chain(section(self.protos.len(), proto_ids_off))
            .chain(section(self.fields.len(), field_ids_off))
            .chain(section(self.methods.len(), method_ids_off))
            .chain(section(self.classes.len(), class_defs_off))
            .chain([data.len() as u32, data_off])
        {
            header.extend_from_slice(&value.to_le_bytes());
        }
        assert_eq!(header.len(), 0x70);
        out[..0x70].copy_from_slice(&header);

        let signature = Sha1::digest(&out[32..]);
        out[12..32].copy_from_slice(&signature);
        let checksum = adler32(&out[12..]);
        out[8..12].copy_from_slice(&checksum.to_le_bytes());

        out
    }
}

fn align4(data: &mut Vec<u8>, base: u32) {
    while (base as usize + data.len()) % 4 != 0 {
        data.push(0);
    }
}

pub fn write_uleb128(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Encodes `value` as modified UTF-8 (without terminator).
pub fn encode_mutf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());

    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutf8_encoding() {
        assert_eq!(encode_mutf8("abc"), b"abc");
        assert_eq!(encode_mutf8("\0"), [0xC0, 0x80]);
        assert_eq!(encode_mutf8("\u{00E9}"), [0xC3, 0xA9]);
        assert_eq!(encode_mutf8("\u{1F600}").len(), 6);
    }

    #[test]
    fn empty_container() {
        let data = DexBuilder::new().build();
        assert_eq!(data.len(), 0x70);
        assert_eq!(&data[..8], b"dex\n035\0");
    }
}
