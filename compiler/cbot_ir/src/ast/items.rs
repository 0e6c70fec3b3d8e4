//! Functions, classes and their members.

use rustc_hash::FxHashMap;

use crate::{ClassId, ExprId, FuncId, LocalSlot, MethodSlot, Modifiers, NativeId, Span, StmtId};
use crate::{TypeDesc, Visibility};

/// How a method is implemented.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodImpl {
    /// Compiled CBOT method body.
    User(FuncId),
    /// Host method from the registry.
    Native(NativeId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeDesc,
    pub slot: LocalSlot,
    /// Constant default used when the caller omits this argument.
    pub default: Option<ExprId>,
}

/// A local variable slot of a function frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalDef {
    pub name: String,
    pub ty: TypeDesc,
}

/// A user function or method.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    /// Owning class, for methods.
    pub class: Option<ClassId>,
    pub params: Vec<Param>,
    pub ret: TypeDesc,
    pub modifiers: Modifiers,
    /// `None` until the body pass compiled it.
    pub body: Option<StmtId>,
    /// Every local slot, parameters first.
    pub locals: Vec<LocalDef>,
    /// Span of the function name.
    pub span: Span,
}

impl FunctionDef {
    pub fn is_extern(&self) -> bool {
        self.modifiers.contains(Modifiers::EXTERN)
    }

    /// Constructors are methods named like their class.
    pub fn is_constructor(&self, class_name: &str) -> bool {
        self.class.is_some() && self.name == class_name
    }

    /// Number of parameters without a default value.
    pub fn required_params(&self) -> usize {
        self.params.iter().take_while(|p| p.default.is_none()).count()
    }

    /// Overload key: name and parameter types, e.g. `Test(int,float)`.
    pub fn signature_key(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeDesc,
    pub visibility: Visibility,
    pub init: Option<ExprId>,
    /// Declared array dimensions, outermost first; `None` is unbounded.
    pub limits: Vec<Option<u32>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub imp: MethodImpl,
    pub visibility: Visibility,
    /// Virtual dispatch key for user methods.
    pub slot: Option<MethodSlot>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<ClassId>,
    /// Instance fields declared by this class, in declaration order.
    pub fields: Vec<FieldDef>,
    pub statics: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    /// Most-derived user implementation for every inherited slot.
    pub vtable: FxHashMap<MethodSlot, FuncId>,
    /// Imported from the host registry.
    pub host: bool,
    pub span: Span,
}

impl ClassDef {
    pub fn new(name: &str, span: Span) -> Self {
        ClassDef {
            name: name.to_owned(),
            span,
            ..ClassDef::default()
        }
    }

    pub fn static_named(&self, name: &str) -> Option<(u32, &FieldDef)> {
        self.statics
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
            .map(|(i, f)| (i as u32, f))
    }
}
