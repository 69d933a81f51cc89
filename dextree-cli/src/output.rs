use std::io::{self, Write};

use dextree::{type_string_lossy, DexClass, DexField, DexMethod, DexTree, TreeNode};
use serde::Serialize;

use crate::{app::GlobalOptions, color::Color};

/// Print `data` as JSON (if `--json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    display_fn: impl FnOnce(&T) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
        Ok(())
    } else {
        display_fn(data)
    }
}

#[derive(Debug, Serialize)]
pub struct TreeOutput {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClassEntry {
    pub id: u32,
    pub descriptor: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    pub methods: Vec<MethodEntry>,
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Serialize)]
pub struct MethodEntry {
    pub id: u32,
    pub name: String,
    pub params: Vec<String>,
    pub return_type: String,
    pub direct: bool,
    pub instructions: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldEntry {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "static")]
    pub is_static: bool,
}

impl From<&DexTree> for TreeOutput {
    fn from(tree: &DexTree) -> Self {
        let files = tree
            .containers()
            .iter()
            .map(|container| FileEntry {
                path: container.key().to_string(),
                classes: container.classes().iter().map(ClassEntry::from).collect(),
            })
            .collect();

        TreeOutput { files }
    }
}

impl From<&DexClass> for ClassEntry {
    fn from(class: &DexClass) -> Self {
        ClassEntry {
            id: class.id(),
            descriptor: class.descriptor().to_string(),
            name: class.name(),
            superclass: class.superclass().map(type_string_lossy),
            methods: class.methods().iter().map(MethodEntry::from).collect(),
            fields: class.fields().iter().map(FieldEntry::from).collect(),
        }
    }
}

impl From<&DexMethod> for MethodEntry {
    fn from(method: &DexMethod) -> Self {
        MethodEntry {
            id: method.id(),
            name: method.name().to_string(),
            params: method
                .params()
                .iter()
                .map(|param| type_string_lossy(param))
                .collect(),
            return_type: type_string_lossy(method.return_type()),
            direct: method.is_direct(),
            instructions: method.instructions().len(),
            strings: method.strings().to_vec(),
        }
    }
}

impl From<&DexField> for FieldEntry {
    fn from(field: &DexField) -> Self {
        FieldEntry {
            id: field.id(),
            name: field.name().to_string(),
            type_name: type_string_lossy(field.type_descriptor()),
            is_static: field.is_static(),
        }
    }
}

/// Writes the indented listing of `output`, one line per entity and string constant.
pub fn write_listing(w: &mut dyn Write, output: &TreeOutput, color: bool) -> io::Result<()> {
    for file in &output.files {
        writeln!(w, "file {}", Color::Cyan.paint(&file.path, color))?;

        for class in &file.classes {
            writeln!(
                w,
                "  id:c0x{:08x} {}",
                class.id,
                Color::Cyan.paint(&class.name, color)
            )?;

            for method in &class.methods {
                writeln!(
                    w,
                    "    {}({})",
                    Color::Blue.paint(&method.name, color),
                    method.params.join(", ")
                )?;
                for string in &method.strings {
                    let stripped = string.replace(['\n', '\r'], "");
                    let quoted = format!("\"{stripped}\"");
                    writeln!(w, "      {}", Color::Yellow.paint(&quoted, color))?;
                }
            }

            for field in &class.fields {
                writeln!(
                    w,
                    "    id:f0x{:08x} {} {}",
                    field.id,
                    Color::White.paint(&field.type_name, color),
                    Color::Green.paint(&field.name, color)
                )?;
            }
        }
    }

    Ok(())
}
