//! The registry proper: natives, host classes and named constants.

use std::fmt;
use std::sync::Arc;

use cbot_diagnostic::ErrorCode;
use cbot_ir::{NativeId, TypeDesc, Visibility};
use cbot_lexer::Constants;
use cbot_value::{ObjRef, Value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::FileAccess;

/// Compile-time half of a native: argument types to result type.
pub type TypeCheck = Arc<dyn Fn(&[TypeDesc]) -> Result<TypeDesc, ErrorCode> + Send + Sync>;

/// Run-time half of a native.
pub type NativeExec = Arc<dyn Fn(&mut NativeCall<'_>) -> Result<Value, ErrorCode> + Send + Sync>;

/// Arguments of one native invocation.
pub struct NativeCall<'a> {
    /// Receiver, for host methods.
    pub this: Option<&'a ObjRef>,
    pub args: &'a [Value],
    /// Static types of `args`, as the compiler saw them.
    pub arg_types: &'a [TypeDesc],
}

impl<'a> NativeCall<'a> {
    pub fn new(this: Option<&'a ObjRef>, args: &'a [Value], arg_types: &'a [TypeDesc]) -> Self {
        NativeCall {
            this,
            args,
            arg_types,
        }
    }

    /// Argument `index` as a string; non-string values use their text form.
    pub fn string(&self, index: usize) -> Result<String, ErrorCode> {
        let value = self.args.get(index).ok_or(ErrorCode::LowParam)?;
        match value {
            Value::Str(s) => Ok(s.to_string()),
            Value::Nan | Value::Void | Value::Null => Err(ErrorCode::BadString),
            other => Ok(other.to_text(self.arg_types.get(index).unwrap_or(&TypeDesc::String))),
        }
    }

    /// Argument `index` as an integer, truncating floats.
    pub fn int(&self, index: usize) -> Result<i64, ErrorCode> {
        let value = self.args.get(index).ok_or(ErrorCode::LowParam)?;
        match value {
            Value::Nan => Err(ErrorCode::Nan),
            other => other.as_int().ok_or(ErrorCode::BadNum),
        }
    }

    /// The receiver; host methods are only called on live instances.
    pub fn receiver(&self) -> Result<&'a ObjRef, ErrorCode> {
        self.this.ok_or(ErrorCode::Null)
    }
}

/// A registered native function or host method.
#[derive(Clone)]
pub struct NativeFn {
    pub name: String,
    pub check: TypeCheck,
    pub exec: NativeExec,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Handle returned by `add_class`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassHandle(u32);

impl ClassHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HostField {
    pub name: String,
    pub ty: TypeDesc,
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HostMethod {
    pub name: String,
    pub native: NativeId,
}

/// A class implemented by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct HostClass {
    pub name: String,
    pub parent: Option<String>,
    pub fields: Vec<HostField>,
    pub methods: Vec<HostMethod>,
}

impl HostClass {
    /// Methods with the given name, in registration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NativeId> + 'a {
        self.methods
            .iter()
            .filter(move |m| m.name == name)
            .map(|m| m.native)
    }
}

/// Natives, host classes and named constants shared by every program.
pub struct Registry {
    natives: Vec<NativeFn>,
    /// Free functions only; methods are reached through their class.
    functions: FxHashMap<String, SmallVec<[NativeId; 2]>>,
    classes: Vec<HostClass>,
    constants: Constants,
}

impl Registry {
    /// An empty registry. Every built-in error code is already defined as
    /// a named constant (`CBotErrZeroDiv`, ...).
    pub fn new() -> Self {
        let mut constants = Constants::new();
        for code in ErrorCode::ALL {
            constants.define(code.name(), i64::from(code.code()));
        }
        Registry {
            natives: Vec::new(),
            functions: FxHashMap::default(),
            classes: Vec::new(),
            constants,
        }
    }

    /// A registry holding the standard library, with file access going
    /// through `files`.
    pub fn with_stdlib(files: Arc<dyn FileAccess>) -> Self {
        let mut registry = Registry::new();
        crate::stdlib::install(&mut registry, files);
        registry
    }

    fn push_native(&mut self, name: &str, check: TypeCheck, exec: NativeExec) -> NativeId {
        let id = NativeId::from_index(self.natives.len());
        self.natives.push(NativeFn {
            name: name.to_owned(),
            check,
            exec,
        });
        id
    }

    /// Register a free native function. Several natives may share a name;
    /// the first whose checker accepts the arguments is used.
    pub fn add_function<C, E>(&mut self, name: &str, check: C, exec: E) -> NativeId
    where
        C: Fn(&[TypeDesc]) -> Result<TypeDesc, ErrorCode> + Send + Sync + 'static,
        E: Fn(&mut NativeCall<'_>) -> Result<Value, ErrorCode> + Send + Sync + 'static,
    {
        let id = self.push_native(name, Arc::new(check), Arc::new(exec));
        self.functions.entry(name.to_owned()).or_default().push(id);
        debug!(name, id = id.raw(), "native function registered");
        id
    }

    /// Register a host class. Returns the existing handle when the name is
    /// taken.
    pub fn add_class(&mut self, name: &str, parent: Option<&str>) -> ClassHandle {
        if let Some(pos) = self.classes.iter().position(|c| c.name == name) {
            return ClassHandle(pos as u32);
        }
        self.classes.push(HostClass {
            name: name.to_owned(),
            parent: parent.map(str::to_owned),
            fields: Vec::new(),
            methods: Vec::new(),
        });
        debug!(name, parent, "host class registered");
        ClassHandle((self.classes.len() - 1) as u32)
    }

    /// # Panics
    /// Panics if `class` was not returned by this registry.
    pub fn add_field(&mut self, class: ClassHandle, name: &str, ty: TypeDesc, visibility: Visibility) {
        self.classes[class.index()].fields.push(HostField {
            name: name.to_owned(),
            ty,
            visibility,
        });
    }

    /// Add a native method. A method named like its class is a constructor.
    ///
    /// # Panics
    /// Panics if `class` was not returned by this registry.
    pub fn add_method<C, E>(&mut self, class: ClassHandle, name: &str, check: C, exec: E) -> NativeId
    where
        C: Fn(&[TypeDesc]) -> Result<TypeDesc, ErrorCode> + Send + Sync + 'static,
        E: Fn(&mut NativeCall<'_>) -> Result<Value, ErrorCode> + Send + Sync + 'static,
    {
        let id = self.push_native(name, Arc::new(check), Arc::new(exec));
        self.classes[class.index()].methods.push(HostMethod {
            name: name.to_owned(),
            native: id,
        });
        id
    }

    /// Define a named numeric constant. Returns `false` if already defined.
    pub fn define_constant(&mut self, name: &str, value: i64) -> bool {
        self.constants.define(name, value)
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn native(&self, id: NativeId) -> Option<&NativeFn> {
        self.natives.get(id.index())
    }

    pub fn natives_len(&self) -> usize {
        self.natives.len()
    }

    /// Free natives registered under `name`.
    pub fn functions_named(&self, name: &str) -> &[NativeId] {
        self.functions
            .get(name)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    pub fn class(&self, name: &str) -> Option<&HostClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn classes(&self) -> &[HostClass] {
        &self.classes
    }

    /// Resolve a call among same-named natives: the first accepting checker
    /// wins, otherwise the first checker's error is reported.
    pub fn resolve(
        &self,
        candidates: &[NativeId],
        arg_types: &[TypeDesc],
    ) -> Option<Result<(NativeId, TypeDesc), ErrorCode>> {
        let mut first_error = None;
        for &id in candidates {
            let Some(native) = self.native(id) else {
                continue;
            };
            match (native.check)(arg_types) {
                Ok(ty) => return Some(Ok((id, ty))),
                Err(code) => {
                    first_error.get_or_insert(code);
                }
            }
        }
        first_error.map(Err)
    }

    /// Run a native.
    pub fn call(&self, id: NativeId, call: &mut NativeCall<'_>) -> Result<Value, ErrorCode> {
        let native = self.native(id).ok_or(ErrorCode::UndefFunc)?;
        (native.exec)(call)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("natives", &self.natives.len())
            .field("classes", &self.classes.len())
            .field("constants", &self.constants.len())
            .finish()
    }
}
