//! Program structure: the scan, declare and body passes.

use cbot_diagnostic::{CompileError, CompileResult, ErrorCode};
use cbot_ir::{
    ClassDef, ClassId, ExprId, ExprKind, FieldDef, FuncId, FunctionDef, Literal, LocalSlot,
    MethodDef, MethodImpl, Modifiers, Module, Param, Span, TokenId, TypeDesc,
};
use cbot_lexer::TokenIdx;
use cbot_value::{convert, Value, MAX_ARRAY_SIZE};
use rustc_hash::FxHashMap;
use tracing::{debug, debug_span};

use crate::parser::{array_depth, Parser};
use crate::returns::always_returns;
use crate::types::is_assignable;

/// A class found by the scan pass.
struct ClassItem {
    id: ClassId,
    parent: Option<(String, Span)>,
    /// The `{` opening the class body.
    body: TokenIdx,
}

/// Top-level items found by the scan pass.
#[derive(Default)]
struct Outline {
    classes: Vec<ClassItem>,
    /// First token (modifiers included) of every function definition.
    functions: Vec<TokenIdx>,
}

/// A function whose body waits for the body pass.
struct PendingBody {
    func: FuncId,
    body: TokenIdx,
}

/// A field initializer waiting for the body pass.
struct PendingInit {
    class: ClassId,
    is_static: bool,
    index: usize,
    at: TokenIdx,
}

impl<'a> Parser<'a> {
    /// Compile the whole token list.
    pub fn compile_program(mut self) -> CompileResult<Module> {
        let outline = self.scan()?;
        self.resolve_parents(&outline.classes)?;

        let mut bodies = Vec::new();
        let mut inits = Vec::new();
        for item in &outline.classes {
            self.declare_members(item, &mut bodies, &mut inits)?;
        }
        for &start in &outline.functions {
            bodies.push(self.declare_function(start)?);
        }
        self.build_vtables();

        for init in &inits {
            self.compile_field_init(init)?;
        }
        for pending in &bodies {
            self.compile_body(pending)?;
        }
        Ok(self.module)
    }

    // Pass 1

    fn scan(&mut self) -> CompileResult<Outline> {
        let mut outline = Outline::default();
        while !self.cursor.is_at_end() {
            if self.cursor.is(TokenId::CloseBlock) {
                return self.error(ErrorCode::NoEnd);
            }
            let start = self.cursor.position();
            self.parse_modifiers();
            if self.cursor.eat(TokenId::Class) {
                outline.classes.push(self.scan_class()?);
                continue;
            }
            outline.functions.push(start);
            // A malformed item stops the scan; the declare pass reports it.
            if !self.skip_to_body()? {
                break;
            }
        }
        Ok(outline)
    }

    fn scan_class(&mut self) -> CompileResult<ClassItem> {
        let (name, span) = self.expect_name(ErrorCode::NoClassName)?;
        if self.module.class_named(name).is_some() || self.registry.class(name).is_some() {
            return Self::error_at(ErrorCode::RedefClass, span);
        }
        let parent = if self.cursor.eat(TokenId::Extends) {
            let (parent, parent_span) = self.cursor.expect_ident(ErrorCode::NoClassName)?;
            Some((parent.to_owned(), parent_span))
        } else {
            None
        };
        if !self.cursor.is(TokenId::OpenBlock) {
            return self.error(ErrorCode::OpenBlock);
        }
        let body = self.cursor.position();
        self.cursor.skip_block()?;
        self.module.classes.push(ClassDef::new(name, span));
        debug!(class = name, "found class");
        Ok(ClassItem {
            id: ClassId::from_index(self.module.classes.len() - 1),
            parent,
            body,
        })
    }

    /// Skip to the end of a function body. `false` when a `;`, a stray
    /// `}` or the end of input came before any `{`.
    fn skip_to_body(&mut self) -> CompileResult<bool> {
        loop {
            match self.cursor.id() {
                Some(TokenId::OpenBlock) => {
                    self.cursor.skip_block()?;
                    return Ok(true);
                }
                Some(TokenId::Semicolon | TokenId::CloseBlock) => return Ok(false),
                _ if self.cursor.is_at_end() => return Ok(false),
                _ => self.cursor.advance(),
            }
        }
    }

    // Pass 2

    fn resolve_parents(&mut self, classes: &[ClassItem]) -> CompileResult<()> {
        for item in classes {
            let Some((name, span)) = &item.parent else {
                continue;
            };
            let parent = self
                .resolve_class(name)
                .ok_or_else(|| CompileError::new(ErrorCode::UndefClass, *span))?;
            self.module.classes[item.id.index()].parent = Some(parent);
        }
        for item in classes {
            if self.inherits_itself(item.id) {
                let span = item.parent.as_ref().map_or(Span::DUMMY, |(_, span)| *span);
                return Self::error_at(ErrorCode::UndefClass, span);
            }
        }
        Ok(())
    }

    fn inherits_itself(&self, class: ClassId) -> bool {
        let mut current = self.module.class(class).parent;
        let mut steps = 0;
        while let Some(id) = current {
            if id == class || steps > self.module.classes.len() {
                return true;
            }
            steps += 1;
            current = self.module.class(id).parent;
        }
        false
    }

    fn declare_members(
        &mut self,
        item: &ClassItem,
        bodies: &mut Vec<PendingBody>,
        inits: &mut Vec<PendingInit>,
    ) -> CompileResult<()> {
        let class = item.id;
        let class_name = self.module.class(class).name.clone();
        self.cursor.set_position(item.body);
        self.cursor.advance();
        loop {
            if self.cursor.eat(TokenId::CloseBlock) {
                return Ok(());
            }
            if self.cursor.is_at_end() {
                return self.error(ErrorCode::CloseBlock);
            }
            let modifiers = self.parse_modifiers();

            // `ClassName(...)` without a return type is a constructor.
            let is_bare_ctor =
                self.cursor.text() == class_name && self.cursor.peek_is(1, TokenId::OpenPar);
            let ty = if is_bare_ctor {
                TypeDesc::Void
            } else {
                self.parse_type()?
            };
            let (name, span) = self.expect_name(ErrorCode::NoVar)?;
            if self.cursor.is(TokenId::OpenPar) {
                let func = self.declare_signature(modifiers, ty, Some(class), name, span)?;
                let body = self.skip_body()?;
                bodies.push(PendingBody { func, body });
            } else {
                self.declare_fields(class, modifiers, &ty, (name, span), inits)?;
            }
        }
    }

    fn declare_fields(
        &mut self,
        class: ClassId,
        modifiers: Modifiers,
        base: &TypeDesc,
        first: (&'a str, Span),
        inits: &mut Vec<PendingInit>,
    ) -> CompileResult<()> {
        if base.is_void() {
            return Self::error_at(ErrorCode::NoType, first.1);
        }
        let is_static = modifiers.contains(Modifiers::STATIC);
        let (mut name, mut span) = first;
        loop {
            let mut limits = self.parse_limits()?;
            let ty = (0..limits.len()).fold(base.clone(), |ty, _| TypeDesc::array_of(ty));
            limits.extend(std::iter::repeat(None).take(array_depth(base)));

            let def = self.module.class(class);
            if def.fields.iter().chain(&def.statics).any(|f| f.name == name) {
                return Self::error_at(ErrorCode::RedefVar, span);
            }
            let field = FieldDef {
                name: name.to_owned(),
                ty,
                visibility: modifiers.visibility(),
                init: None,
                limits,
                span,
            };
            let def = &mut self.module.classes[class.index()];
            let list = if is_static {
                &mut def.statics
            } else {
                &mut def.fields
            };
            list.push(field);
            let index = list.len() - 1;

            if self.cursor.eat(TokenId::Assign) {
                inits.push(PendingInit {
                    class,
                    is_static,
                    index,
                    at: self.cursor.position(),
                });
                self.skip_initializer()?;
            }
            if !self.cursor.eat(TokenId::Comma) {
                break;
            }
            (name, span) = self.expect_name(ErrorCode::NoVar)?;
        }
        self.expect_semicolon()
    }

    /// `[n]` and `[]` groups after a declared name, outermost first.
    pub(crate) fn parse_limits(&mut self) -> CompileResult<Vec<Option<u32>>> {
        let mut limits = Vec::new();
        while self.cursor.eat(TokenId::OpenBracket) {
            if self.cursor.eat(TokenId::CloseBracket) {
                limits.push(None);
                continue;
            }
            let size = self.compile_expr()?;
            let span = self.span_of(size);
            if !self.ty(size).is_integer() {
                return Self::error_at(ErrorCode::BadIndex, span);
            }
            let value = self.constant_value(size, ErrorCode::BadIndex)?;
            let limit = value
                .as_int()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| CompileError::new(ErrorCode::BadIndex, span))?;
            if limit > MAX_ARRAY_SIZE {
                return Self::error_at(ErrorCode::OutArray, span);
            }
            limits.push(Some(limit));
            self.cursor
                .expect(TokenId::CloseBracket, ErrorCode::CloseIndex)?;
        }
        Ok(limits)
    }

    /// Skip a field initializer up to the `,` or `;` that ends it.
    fn skip_initializer(&mut self) -> CompileResult<()> {
        let mut depth = 0u32;
        loop {
            match self.cursor.id() {
                Some(TokenId::OpenPar | TokenId::OpenBracket | TokenId::OpenBlock) => depth += 1,
                Some(TokenId::ClosePar | TokenId::CloseBracket | TokenId::CloseBlock) => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                Some(TokenId::Comma | TokenId::Semicolon) if depth == 0 => return Ok(()),
                _ if self.cursor.is_at_end() => return self.error(ErrorCode::NoTerminator),
                _ => {}
            }
            self.cursor.advance();
        }
    }

    fn declare_function(&mut self, start: TokenIdx) -> CompileResult<PendingBody> {
        self.cursor.set_position(start);
        let modifiers = self.parse_modifiers();
        let ret = self.parse_type()?;
        let (mut name, mut span) = self.expect_name(ErrorCode::NoFunc)?;
        let mut class = None;
        if self.cursor.eat(TokenId::DoubleColon) {
            let owner = self
                .module
                .class_named(name)
                .filter(|&id| !self.module.class(id).host)
                .ok_or_else(|| CompileError::new(ErrorCode::UndefClass, span))?;
            class = Some(owner);
            (name, span) = self.expect_name(ErrorCode::NoFunc)?;
        }
        if !self.cursor.is(TokenId::OpenPar) {
            return self.error(ErrorCode::OpenPar);
        }
        let func = self.declare_signature(modifiers, ret, class, name, span)?;
        let body = self.skip_body()?;
        Ok(PendingBody { func, body })
    }

    fn skip_body(&mut self) -> CompileResult<TokenIdx> {
        if !self.cursor.is(TokenId::OpenBlock) {
            return self.error(ErrorCode::OpenBlock);
        }
        let at = self.cursor.position();
        self.cursor.skip_block()?;
        Ok(at)
    }

    /// Register a function from its parameter list (the cursor is on `(`).
    fn declare_signature(
        &mut self,
        modifiers: Modifiers,
        ret: TypeDesc,
        class: Option<ClassId>,
        name: &str,
        span: Span,
    ) -> CompileResult<FuncId> {
        self.cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar)?;
        let params = self.parse_params()?;
        let def = FunctionDef {
            name: name.to_owned(),
            class,
            params,
            ret,
            modifiers,
            body: None,
            locals: Vec::new(),
            span,
        };
        let key = def.signature_key();
        let duplicate = self
            .module
            .functions
            .iter()
            .any(|f| f.class == class && f.signature_key() == key);
        if duplicate {
            return Self::error_at(ErrorCode::RedefFunc, span);
        }
        self.module.functions.push(def);
        let func = FuncId::from_index(self.module.functions.len() - 1);

        if let Some(class) = class {
            let is_ctor = self.module.class(class).name == name;
            let slot = (!is_ctor).then(|| self.module.intern_method_slot(&key));
            self.module.classes[class.index()].methods.push(MethodDef {
                name: name.to_owned(),
                imp: MethodImpl::User(func),
                visibility: modifiers.visibility(),
                slot,
            });
        }
        debug!(signature = %key, "declared function");
        Ok(func)
    }

    fn parse_params(&mut self) -> CompileResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        if self.cursor.eat(TokenId::ClosePar) {
            return Ok(params);
        }
        loop {
            let type_span = self.cursor.span();
            let mut ty = self.parse_type()?;
            if ty.is_void() {
                return Self::error_at(ErrorCode::Void, type_span);
            }
            let (name, span) = self.expect_name(ErrorCode::NoVar)?;
            while self.cursor.eat(TokenId::OpenBracket) {
                self.cursor
                    .expect(TokenId::CloseBracket, ErrorCode::CloseIndex)?;
                ty = TypeDesc::array_of(ty);
            }
            if params.iter().any(|p| p.name == name) {
                return Self::error_at(ErrorCode::RedefVar, span);
            }
            let default = if self.cursor.eat(TokenId::Assign) {
                Some(self.compile_default(&ty)?)
            } else if params.last().is_some_and(|p| p.default.is_some()) {
                return Self::error_at(ErrorCode::DefaultValue, span);
            } else {
                None
            };
            params.push(Param {
                name: name.to_owned(),
                ty,
                slot: LocalSlot::from_index(params.len()),
                default,
            });
            if self.cursor.eat(TokenId::ClosePar) {
                return Ok(params);
            }
            self.cursor.expect(TokenId::Comma, ErrorCode::ClosePar)?;
        }
    }

    /// Compile a parameter default down to a literal of the parameter type.
    fn compile_default(&mut self, ty: &TypeDesc) -> CompileResult<ExprId> {
        if self.cursor.is_any(&[TokenId::Comma, TokenId::ClosePar]) {
            return self.error(ErrorCode::NoExpression);
        }
        self.stack.enter_initializer(None, false);
        let expr = self.compile_expr();
        self.stack.leave_initializer();
        let expr = expr?;

        let span = self.span_of(expr);
        let from = self.ty(expr).clone();
        if !is_assignable(&self.module, &from, ty) {
            return Self::error_at(ErrorCode::BadType1, span);
        }
        let value = self.constant_value(expr, ErrorCode::NoExpression)?;
        let value = convert(value, &from, ty).map_err(|code| CompileError::new(code, span))?;
        let literal =
            literal_of(&value).ok_or_else(|| CompileError::new(ErrorCode::NoExpression, span))?;
        Ok(self.alloc_expr(ExprKind::Literal(literal), ty.clone(), span))
    }

    /// Fill every user class's vtable, parents first.
    fn build_vtables(&mut self) {
        let mut done = vec![false; self.module.classes.len()];
        for index in 0..self.module.classes.len() {
            self.build_vtable(ClassId::from_index(index), &mut done);
        }
    }

    fn build_vtable(&mut self, class: ClassId, done: &mut [bool]) {
        if done[class.index()] {
            return;
        }
        let mut table = match self.module.class(class).parent {
            Some(parent) => {
                self.build_vtable(parent, done);
                self.module.class(parent).vtable.clone()
            }
            None => FxHashMap::default(),
        };
        for method in &self.module.class(class).methods {
            if let (MethodImpl::User(func), Some(slot)) = (method.imp, method.slot) {
                table.insert(slot, func);
            }
        }
        self.module.classes[class.index()].vtable = table;
        done[class.index()] = true;
    }

    // Pass 3

    fn compile_field_init(&mut self, init: &PendingInit) -> CompileResult<()> {
        let def = self.module.class(init.class);
        let list = if init.is_static {
            &def.statics
        } else {
            &def.fields
        };
        let ty = list[init.index].ty.clone();

        self.cursor.set_position(init.at);
        self.stack.enter_initializer(Some(init.class), !init.is_static);
        let value = self.compile_initializer(&ty);
        self.stack.leave_initializer();
        let value = value?;
        if !self.cursor.is_any(&[TokenId::Comma, TokenId::Semicolon]) {
            return self.error(ErrorCode::NoTerminator);
        }

        let def = &mut self.module.classes[init.class.index()];
        let list = if init.is_static {
            &mut def.statics
        } else {
            &mut def.fields
        };
        list[init.index].init = Some(value);
        Ok(())
    }

    fn compile_body(&mut self, pending: &PendingBody) -> CompileResult<()> {
        let def = self.module.function(pending.func);
        let _span = debug_span!("compile_function", name = %def.name).entered();
        let (ret, class, span) = (def.ret.clone(), def.class, def.span);
        let params: Vec<(String, TypeDesc)> = def
            .params
            .iter()
            .map(|p| (p.name.clone(), p.ty.clone()))
            .collect();

        self.stack.enter_function(ret.clone(), class, class.is_some());
        for (name, ty) in params {
            self.stack
                .declare(&name, ty)
                .map_err(|code| CompileError::new(code, span))?;
        }
        self.cursor.set_position(pending.body);
        let body = self.compile_block(false);
        let locals = self.stack.leave_function();
        let body = body?;

        if !ret.is_void() && !always_returns(&self.module, body) {
            return Self::error_at(ErrorCode::NoReturn, span);
        }
        let def = &mut self.module.functions[pending.func.index()];
        def.body = Some(body);
        def.locals = locals;
        Ok(())
    }
}

/// Literal holding a constant value.
fn literal_of(value: &Value) -> Option<Literal> {
    Some(match value {
        Value::Bool(b) => Literal::Bool(*b),
        Value::Int(n) => Literal::Int(*n),
        Value::Float(f) => Literal::Float(*f),
        Value::Str(s) => Literal::Str(s.to_string()),
        Value::Null => Literal::Null,
        Value::Nan => Literal::Nan,
        Value::Void | Value::Array(_) | Value::Object(_) => return None,
    })
}
