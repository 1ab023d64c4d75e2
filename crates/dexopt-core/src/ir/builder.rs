//! Fluent assembly of program views.
//!
//! Frontends (and tests) feed the optimizer through this builder; it is the
//! only way to construct a [`Program`]. Structural problems are collected
//! during assembly and reported by [`ProgramBuilder::build`], so the scoped
//! closures stay free of error plumbing.

use crate::errors::IrError;
use crate::types::collections::{FxHashMap, FxHashSet};

use super::instruction::{Instruction, InvokeKind, MethodRef};
use super::interner::{TypeId, TypeInterner};
use super::{Class, ClassId, Method, MethodId, MethodKind, Program};
use super::policy::PolicyState;

/// Builder for a [`Program`].
#[derive(Default)]
pub struct ProgramBuilder {
    types: TypeInterner,
    classes: Vec<Class>,
    methods: Vec<Method>,
    class_by_type: FxHashMap<TypeId, ClassId>,
    method_index: FxHashMap<MethodRef, MethodId>,
    error: Option<IrError>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a class and populate it through the scoped builder.
    pub fn class(&mut self, descriptor: &str, define: impl FnOnce(&mut ClassBuilder<'_>)) -> &mut Self {
        if !is_class_descriptor(descriptor) {
            self.record(IrError::InvalidDescriptor {
                descriptor: descriptor.to_string(),
            });
            return self;
        }
        let type_id = self.types.intern_type(descriptor);
        if self.class_by_type.contains_key(&type_id) {
            self.record(IrError::DuplicateClass {
                descriptor: descriptor.to_string(),
            });
            return self;
        }
        let class_id = ClassId(self.classes.len() as u32);
        self.classes.push(Class {
            name: descriptor.to_string(),
            type_id,
            super_type: None,
            interfaces: Vec::new(),
            direct_methods: Vec::new(),
            virtual_methods: Vec::new(),
            annotations: FxHashSet::default(),
        });
        self.class_by_type.insert(type_id, class_id);

        let mut class_builder = ClassBuilder {
            program: self,
            class_id,
        };
        define(&mut class_builder);
        self
    }

    /// Finish assembly, reporting the first structural problem encountered.
    pub fn build(self) -> Result<Program, IrError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(Program::new(
            self.types,
            self.classes,
            self.methods,
            self.class_by_type,
            self.method_index,
        ))
    }

    fn record(&mut self, error: IrError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// Scoped builder for a single class.
pub struct ClassBuilder<'a> {
    program: &'a mut ProgramBuilder,
    class_id: ClassId,
}

impl ClassBuilder<'_> {
    pub fn super_class(&mut self, descriptor: &str) -> &mut Self {
        let type_id = self.program.types.intern_type(descriptor);
        self.class_mut().super_type = Some(type_id);
        self
    }

    pub fn interface(&mut self, descriptor: &str) -> &mut Self {
        let type_id = self.program.types.intern_type(descriptor);
        self.class_mut().interfaces.push(type_id);
        self
    }

    pub fn annotation(&mut self, descriptor: &str) -> &mut Self {
        let type_id = self.program.types.intern_type(descriptor);
        self.class_mut().annotations.insert(type_id);
        self
    }

    /// Define a direct (statically dispatched) method.
    pub fn direct_method(
        &mut self,
        name: &str,
        proto: &str,
        define: impl FnOnce(&mut MethodBuilder),
    ) -> &mut Self {
        self.add_method(name, proto, MethodKind::Direct, define)
    }

    /// Define a virtual method.
    pub fn virtual_method(
        &mut self,
        name: &str,
        proto: &str,
        define: impl FnOnce(&mut MethodBuilder),
    ) -> &mut Self {
        self.add_method(name, proto, MethodKind::Virtual, define)
    }

    fn add_method(
        &mut self,
        name: &str,
        proto: &str,
        kind: MethodKind,
        define: impl FnOnce(&mut MethodBuilder),
    ) -> &mut Self {
        let owner_type = self.class_mut().type_id;
        let name_sym = self.program.types.intern(name);
        let proto_sym = self.program.types.intern(proto);
        let reference = MethodRef {
            owner: owner_type,
            name: name_sym,
            proto: proto_sym,
        };
        if self.program.method_index.contains_key(&reference) {
            let class = self.program.classes[self.class_id.0 as usize].name.clone();
            self.program.record(IrError::DuplicateMethod {
                class,
                name: name.to_string(),
                proto: proto.to_string(),
            });
            return self;
        }

        let mut method_builder = MethodBuilder {
            types: &self.program.types,
            instructions: Vec::new(),
            annotations: FxHashSet::default(),
            has_code: true,
            is_root: false,
        };
        define(&mut method_builder);
        let MethodBuilder {
            instructions,
            annotations,
            has_code,
            is_root,
            ..
        } = method_builder;

        let method_id = MethodId(self.program.methods.len() as u32);
        self.program.methods.push(Method {
            owner: self.class_id,
            owner_type,
            name: name_sym,
            proto: proto_sym,
            kind,
            code: has_code.then_some(instructions),
            annotations,
            is_root,
            state: PolicyState::default(),
        });
        self.program.method_index.insert(reference, method_id);
        let class = self.class_mut();
        match kind {
            MethodKind::Direct => class.direct_methods.push(method_id),
            MethodKind::Virtual => class.virtual_methods.push(method_id),
        }
        self
    }

    fn class_mut(&mut self) -> &mut Class {
        &mut self.program.classes[self.class_id.0 as usize]
    }
}

/// Scoped builder for a single method body.
pub struct MethodBuilder<'a> {
    types: &'a TypeInterner,
    instructions: Vec<Instruction>,
    annotations: FxHashSet<TypeId>,
    has_code: bool,
    is_root: bool,
}

impl MethodBuilder<'_> {
    /// Mark this method as a program root (keep-rule policy).
    pub fn root(&mut self) -> &mut Self {
        self.is_root = true;
        self
    }

    pub fn annotation(&mut self, descriptor: &str) -> &mut Self {
        let type_id = self.types.intern_type(descriptor);
        self.annotations.insert(type_id);
        self
    }

    /// Declare the method abstract or native: no instruction stream at all.
    pub fn without_code(&mut self) -> &mut Self {
        self.has_code = false;
        self.instructions.clear();
        self
    }

    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn nop(&mut self) -> &mut Self {
        self.push(Instruction::Nop)
    }

    pub fn const_(&mut self, dest: u16, value: i32) -> &mut Self {
        self.push(Instruction::Const { dest, value })
    }

    pub fn ret_void(&mut self) -> &mut Self {
        self.push(Instruction::ReturnVoid)
    }

    pub fn invoke_static(&mut self, owner: &str, name: &str, proto: &str) -> &mut Self {
        self.invoke(InvokeKind::Static, owner, name, proto)
    }

    pub fn invoke_direct(&mut self, owner: &str, name: &str, proto: &str) -> &mut Self {
        self.invoke(InvokeKind::Direct, owner, name, proto)
    }

    pub fn invoke_virtual(&mut self, owner: &str, name: &str, proto: &str) -> &mut Self {
        self.invoke(InvokeKind::Virtual, owner, name, proto)
    }

    pub fn invoke_interface(&mut self, owner: &str, name: &str, proto: &str) -> &mut Self {
        self.invoke(InvokeKind::Interface, owner, name, proto)
    }

    pub fn invoke_super(&mut self, owner: &str, name: &str, proto: &str) -> &mut Self {
        self.invoke(InvokeKind::Super, owner, name, proto)
    }

    fn invoke(&mut self, kind: InvokeKind, owner: &str, name: &str, proto: &str) -> &mut Self {
        let target = MethodRef {
            owner: self.types.intern_type(owner),
            name: self.types.intern(name),
            proto: self.types.intern(proto),
        };
        self.push(Instruction::Invoke { kind, target })
    }
}

fn is_class_descriptor(descriptor: &str) -> bool {
    descriptor.len() > 2 && descriptor.starts_with('L') && descriptor.ends_with(';')
}
