use std::path::{Path, PathBuf};

use crate::{
    descriptor::type_string_lossy,
    dex::records::{AccessFlags, ClassRecord, CodeItem, FieldRecord, MethodRecord},
    disassembler::Instruction,
    tree::{Node, NodeRc, TreeNode, ROOT_KEY},
};

/// Root of a disassembly, owning one [`DexContainer`] per input path.
#[derive(Debug)]
pub struct DexTree {
    node: NodeRc,
    containers: Vec<DexContainer>,
}

impl DexTree {
    /// Creates an empty forest with the fixed root key `<root>`.
    #[must_use]
    pub fn new() -> Self {
        DexTree {
            node: Node::root(ROOT_KEY),
            containers: Vec::new(),
        }
    }

    /// Containers in input order.
    #[must_use]
    pub fn containers(&self) -> &[DexContainer] {
        &self.containers
    }

    /// Iterates over the classes of every container, in input order.
    pub fn classes(&self) -> impl Iterator<Item = &DexClass> {
        self.containers
            .iter()
            .flat_map(|container| container.classes.iter())
    }

    pub(crate) fn push(&mut self, container: DexContainer) {
        self.containers.push(container);
    }
}

impl Default for DexTree {
    fn default() -> Self {
        Self::new()
    }
}

/// One input file and the classes it defines.
#[derive(Debug)]
pub struct DexContainer {
    node: NodeRc,
    source: PathBuf,
    classes: Vec<DexClass>,
}

impl DexContainer {
    /// Creates an empty container below `parent`, keyed by the input path as given.
    #[must_use]
    pub fn new(parent: &NodeRc, source: &Path) -> Self {
        DexContainer {
            node: Node::child(parent, source.to_string_lossy()),
            source: source.to_path_buf(),
            classes: Vec::new(),
        }
    }

    /// The input path this container was read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Classes in definition order.
    #[must_use]
    pub fn classes(&self) -> &[DexClass] {
        &self.classes
    }

    pub(crate) fn push(&mut self, class: DexClass) {
        self.classes.push(class);
    }
}

/// A class definition with its methods, fields and referenced string constants.
///
/// Methods are direct methods followed by virtual methods, fields are static fields followed
/// by instance fields, each group in definition order. Methods without code are not part of
/// the tree.
#[derive(Debug)]
pub struct DexClass {
    node: NodeRc,
    id: u32,
    access_flags: AccessFlags,
    superclass: Option<String>,
    source_file: Option<String>,
    methods: Vec<DexMethod>,
    fields: Vec<DexField>,
    strings: Vec<String>,
}

impl DexClass {
    /// Creates a class below `parent` from the header part of `record`; members are added
    /// separately.
    #[must_use]
    pub fn new(parent: &NodeRc, record: &ClassRecord) -> Self {
        DexClass {
            node: Node::child(parent, record.descriptor.as_str()),
            id: record.id,
            access_flags: record.access_flags,
            superclass: record.superclass.clone(),
            source_file: record.source_file.clone(),
            methods: Vec::new(),
            fields: Vec::new(),
            strings: Vec::new(),
        }
    }

    /// Index of the class definition in its container.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Raw type descriptor, same as the key.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        self.node.key()
    }

    /// Display name, e.g. `com.example.Main`.
    #[must_use]
    pub fn name(&self) -> String {
        type_string_lossy(self.descriptor())
    }

    /// Access flags of the class definition
    #[must_use]
    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// Descriptor of the superclass
    #[must_use]
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Source file name, if the container records one
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Methods with code, direct methods first.
    #[must_use]
    pub fn methods(&self) -> &[DexMethod] {
        &self.methods
    }

    /// Fields, static fields first.
    #[must_use]
    pub fn fields(&self) -> &[DexField] {
        &self.fields
    }

    /// Distinct string constants of all methods, in the order they are first loaded.
    #[must_use]
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub(crate) fn push_method(&mut self, method: DexMethod) {
        for string in &method.strings {
            if !self.strings.contains(string) {
                self.strings.push(string.clone());
            }
        }
        self.methods.push(method);
    }

    pub(crate) fn push_field(&mut self, field: DexField) {
        self.fields.push(field);
    }
}

/// A method with its decoded code item.
#[derive(Debug)]
pub struct DexMethod {
    node: NodeRc,
    record: MethodRecord,
    direct: bool,
    code: CodeItem,
    strings: Vec<String>,
}

impl DexMethod {
    /// Creates a method below `parent`.
    #[must_use]
    pub fn new(
        parent: &NodeRc,
        record: MethodRecord,
        direct: bool,
        code: CodeItem,
        strings: Vec<String>,
    ) -> Self {
        DexMethod {
            node: Node::child(parent, record.name.as_str()),
            record,
            direct,
            code,
            strings,
        }
    }

    /// Index into the container's `method_ids`.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.record.id
    }

    /// Method name, same as the key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// `true` for direct (static, private, constructor) methods.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.direct
    }

    /// Parameter type descriptors.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.record.params
    }

    /// Return type descriptor.
    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.record.return_type
    }

    /// Access flags from the class data.
    #[must_use]
    pub fn access_flags(&self) -> AccessFlags {
        self.record.access_flags
    }

    /// The record this method was built from.
    #[must_use]
    pub fn record(&self) -> &MethodRecord {
        &self.record
    }

    /// The decoded code item.
    #[must_use]
    pub fn code(&self) -> &CodeItem {
        &self.code
    }

    /// Decoded instructions, in code order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.code.instructions
    }

    /// String constants loaded by this method, in code order with duplicates.
    #[must_use]
    pub fn strings(&self) -> &[String] {
        &self.strings
    }
}

/// A field declaration.
#[derive(Debug)]
pub struct DexField {
    node: NodeRc,
    record: FieldRecord,
    is_static: bool,
}

impl DexField {
    /// Creates a field below `parent`.
    #[must_use]
    pub fn new(parent: &NodeRc, record: FieldRecord, is_static: bool) -> Self {
        DexField {
            node: Node::child(parent, record.name.as_str()),
            record,
            is_static,
        }
    }

    /// Index into the container's `field_ids`.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.record.id
    }

    /// Field name, same as the key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Type descriptor of the field.
    #[must_use]
    pub fn type_descriptor(&self) -> &str {
        &self.record.type_descriptor
    }

    /// Access flags from the class data.
    #[must_use]
    pub fn access_flags(&self) -> AccessFlags {
        self.record.access_flags
    }

    /// `true` for static fields.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

impl_tree_node!(DexTree, DexContainer, DexClass, DexMethod, DexField);

#[cfg(test)]
mod tests {
    use super::*;

    fn class_record(descriptor: &str) -> ClassRecord {
        ClassRecord {
            id: 7,
            descriptor: descriptor.to_string(),
            access_flags: AccessFlags::PUBLIC,
            superclass: Some("Ljava/lang/Object;".to_string()),
            source_file: None,
            direct_methods: Vec::new(),
            virtual_methods: Vec::new(),
            static_fields: Vec::new(),
            instance_fields: Vec::new(),
        }
    }

    fn method_record(name: &str) -> MethodRecord {
        MethodRecord {
            id: 3,
            name: name.to_string(),
            params: vec!["I".to_string()],
            return_type: "V".to_string(),
            access_flags: AccessFlags::PUBLIC,
            code_off: 0x100,
        }
    }

    fn empty_code() -> CodeItem {
        CodeItem {
            registers_size: 1,
            ins_size: 0,
            outs_size: 0,
            tries_size: 0,
            debug_info_off: 0,
            insns_size: 0,
            instructions: Vec::new(),
        }
    }

    #[test]
    fn entity_paths() {
        let mut tree = DexTree::new();
        let mut container = DexContainer::new(tree.node(), Path::new("app/classes.dex"));
        let mut class = DexClass::new(container.node(), &class_record("Lcom/example/Main;"));

        class.push_method(DexMethod::new(
            class.node(),
            method_record("run"),
            false,
            empty_code(),
            vec!["x".to_string()],
        ));
        class.push_field(DexField::new(
            class.node(),
            FieldRecord {
                id: 1,
                name: "count".to_string(),
                type_descriptor: "I".to_string(),
                access_flags: AccessFlags::STATIC,
            },
            true,
        ));
        container.push(class);
        tree.push(container);

        assert_eq!(tree.path(), "<root>");
        let container = &tree.containers()[0];
        assert_eq!(container.path(), "<root>/app/classes.dex");
        assert_eq!(container.source(), Path::new("app/classes.dex"));

        let class = &container.classes()[0];
        assert_eq!(class.key(), "Lcom/example/Main;");
        assert_eq!(class.name(), "com.example.Main");
        assert_eq!(class.id(), 7);
        assert_eq!(class.path(), "<root>/app/classes.dex/Lcom/example/Main;");

        let method = &class.methods()[0];
        assert_eq!(method.path(), format!("{}/run", class.path()));
        assert_eq!(method.depth(), 3);
        assert!(!method.is_direct());
        assert_eq!(class.strings(), ["x"]);

        let field = &class.fields()[0];
        assert_eq!(field.path(), format!("{}/count", class.path()));
        assert!(field.is_static());

        assert_eq!(tree.classes().count(), 1);
    }

    #[test]
    fn method_parent_is_declaring_class() {
        let tree = DexTree::new();
        let container = DexContainer::new(tree.node(), Path::new("a.dex"));
        let class = DexClass::new(container.node(), &class_record("LA;"));
        let method = DexMethod::new(class.node(), method_record("m"), true, empty_code(), vec![]);

        assert_eq!(method.parent().unwrap().key(), "LA;");
        assert_eq!(method.params(), ["I"]);
        assert_eq!(method.return_type(), "V");
    }
}
