//! The program view: an immutable snapshot of the classes and methods being
//! optimized.
//!
//! Classes and methods live in arenas owned by [`Program`] and are addressed
//! by [`ClassId`] / [`MethodId`] indices. Strings (descriptors, names,
//! protos) are interned. Once built, a program is structurally read-only;
//! the only mutable state is the per-method [`PolicyState`], which is
//! atomic and monotonic.

pub mod builder;
pub mod instruction;
pub mod interner;
pub mod policy;

pub use builder::ProgramBuilder;
pub use instruction::{Instruction, InvokeKind, MethodRef};
pub use interner::{Symbol, TypeId, TypeInterner};
pub use policy::PolicyState;

use crate::types::collections::{FxHashMap, FxHashSet};

/// Index of a class in its program's class arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Index of a method in its program's method arena.
///
/// This is the method identity used by the policy resolver and the call
/// graph; it is unique program-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub u32);

/// Whether a method participates in virtual dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Direct,
    Virtual,
}

/// A class definition.
#[derive(Debug)]
pub struct Class {
    /// Internal name, e.g. `Lcom/example/Foo;`.
    pub name: String,
    pub type_id: TypeId,
    pub super_type: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub direct_methods: Vec<MethodId>,
    pub virtual_methods: Vec<MethodId>,
    pub annotations: FxHashSet<TypeId>,
}

impl Class {
    /// All methods of the class, direct first, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.direct_methods
            .iter()
            .chain(self.virtual_methods.iter())
            .copied()
    }
}

/// A method definition.
#[derive(Debug)]
pub struct Method {
    pub owner: ClassId,
    pub owner_type: TypeId,
    pub name: Symbol,
    pub proto: Symbol,
    pub kind: MethodKind,
    /// `None` for abstract and native methods.
    pub code: Option<Vec<Instruction>>,
    pub annotations: FxHashSet<TypeId>,
    /// Set when external keep-rule policy pins this method as a program root.
    pub is_root: bool,
    pub state: PolicyState,
}

impl Method {
    pub fn is_virtual(&self) -> bool {
        self.kind == MethodKind::Virtual
    }

    /// A concrete method carries an instruction body.
    pub fn is_concrete(&self) -> bool {
        self.code.is_some()
    }

    /// The instruction stream, empty for bodyless methods.
    pub fn instructions(&self) -> &[Instruction] {
        self.code.as_deref().unwrap_or(&[])
    }
}

/// An immutable program view over which the optimizer core runs.
#[derive(Debug)]
pub struct Program {
    types: TypeInterner,
    classes: Vec<Class>,
    methods: Vec<Method>,
    class_by_type: FxHashMap<TypeId, ClassId>,
    method_index: FxHashMap<MethodRef, MethodId>,
    clinit_name: Symbol,
}

impl Program {
    pub(crate) fn new(
        types: TypeInterner,
        classes: Vec<Class>,
        methods: Vec<Method>,
        class_by_type: FxHashMap<TypeId, ClassId>,
        method_index: FxHashMap<MethodRef, MethodId>,
    ) -> Self {
        let clinit_name = types.intern("<clinit>");
        Self {
            types,
            classes,
            methods,
            class_by_type,
            method_index,
            clinit_name,
        }
    }

    pub fn types(&self) -> &TypeInterner {
        &self.types
    }

    /// Classes in program order.
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Methods in definition order (grouped by class, direct before virtual).
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0 as usize]
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.0 as usize]
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len() as u32).map(ClassId)
    }

    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> {
        (0..self.methods.len() as u32).map(MethodId)
    }

    /// The class defining `type_id`, if the program contains one.
    pub fn class_of_type(&self, type_id: TypeId) -> Option<ClassId> {
        self.class_by_type.get(&type_id).copied()
    }

    /// Exact-definition lookup: the method whose owner, name and proto match
    /// the reference. No hierarchy search.
    pub fn find_method(&self, reference: &MethodRef) -> Option<MethodId> {
        self.method_index.get(reference).copied()
    }

    /// Whether `id` is a static class initializer.
    pub fn is_clinit(&self, id: MethodId) -> bool {
        let method = self.method(id);
        method.kind == MethodKind::Direct && method.name == self.clinit_name
    }

    /// Human-readable method description for logs and test failure messages.
    pub fn describe(&self, id: MethodId) -> String {
        let method = self.method(id);
        format!(
            "{}.{}{}",
            self.types.resolve_type(method.owner_type),
            self.types.resolve(method.name),
            self.types.resolve(method.proto),
        )
    }
}
