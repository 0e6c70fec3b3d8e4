//! Calls, method calls and object construction, with overload resolution.
//!
//! A call first looks at the methods of the enclosing class, then at the
//! host functions, then at user functions. Among same-named user
//! candidates the one with the lowest total conversion cost wins; ties
//! go to the one declared first.

use cbot_diagnostic::{CompileError, CompileResult, ErrorCode};
use cbot_ir::{
    ClassId, ExprId, ExprKind, MethodImpl, MethodSlot, Span, TokenId, TypeDesc, Visibility,
};

use crate::parser::Parser;
use crate::types::conversion_cost;

/// Why a candidate did not accept the arguments.
#[derive(Copy, Clone, Debug)]
enum Mismatch {
    TooMany,
    TooFew,
    Types,
    Native(ErrorCode),
}

/// The selected overload.
struct Resolved {
    imp: MethodImpl,
    ret: TypeDesc,
    /// Default values for the parameters the caller left out.
    defaults: Vec<ExprId>,
}

/// A method visible on a class, most derived first.
#[derive(Copy, Clone)]
struct MethodCandidate {
    owner: ClassId,
    imp: MethodImpl,
    visibility: Visibility,
    slot: Option<MethodSlot>,
}

impl Parser<'_> {
    /// `( arg, ... )`.
    pub(crate) fn compile_args(&mut self) -> CompileResult<Vec<ExprId>> {
        self.cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar)?;
        let mut args = Vec::new();
        if self.cursor.eat(TokenId::ClosePar) {
            return Ok(args);
        }
        loop {
            args.push(self.compile_expr()?);
            if self.cursor.eat(TokenId::ClosePar) {
                return Ok(args);
            }
            self.cursor.expect(TokenId::Comma, ErrorCode::ClosePar)?;
        }
    }

    fn arg_types(&self, args: &[ExprId]) -> Vec<TypeDesc> {
        args.iter().map(|&arg| self.ty(arg).clone()).collect()
    }

    /// An unqualified call `name(args)`; the cursor is on `(`.
    pub(crate) fn compile_call(&mut self, name: &str, span: Span) -> CompileResult<ExprId> {
        let mut args = self.compile_args()?;
        let arg_types = self.arg_types(&args);
        let full_span = self.span_from(span);

        if let Some(class) = self.stack.class().filter(|_| self.stack.has_this()) {
            if !self.method_candidates(class, name).is_empty() {
                let this = self.alloc_this(class, span);
                return self.finish_method_call(this, class, name, span, args, &arg_types);
            }
        }

        let natives = self.registry.functions_named(name);
        if let Some(found) = self.registry.resolve(natives, &arg_types) {
            let (native, ret) = found.map_err(|code| CompileError::new(code, span))?;
            let kind = ExprKind::NativeCall { native, args };
            return Ok(self.alloc_expr(kind, ret, full_span));
        }

        let candidates: Vec<MethodImpl> = self
            .module
            .functions_named(name)
            .map(MethodImpl::User)
            .collect();
        if candidates.is_empty() {
            return Self::error_at(ErrorCode::UndefCall, span);
        }
        let resolved = self
            .resolve_overload(&candidates, &arg_types)
            .map_err(|code| CompileError::new(code, span))?;
        let MethodImpl::User(func) = resolved.imp else {
            return Self::error_at(ErrorCode::UndefCall, span);
        };
        args.extend(resolved.defaults);
        Ok(self.alloc_expr(ExprKind::Call { func, args }, resolved.ret, full_span))
    }

    /// `object.name(args)`; the cursor is on `(`.
    pub(crate) fn compile_method_call(
        &mut self,
        object: ExprId,
        class: ClassId,
        name: &str,
        span: Span,
    ) -> CompileResult<ExprId> {
        let args = self.compile_args()?;
        let arg_types = self.arg_types(&args);
        self.finish_method_call(object, class, name, span, args, &arg_types)
    }

    fn finish_method_call(
        &mut self,
        object: ExprId,
        class: ClassId,
        name: &str,
        span: Span,
        mut args: Vec<ExprId>,
        arg_types: &[TypeDesc],
    ) -> CompileResult<ExprId> {
        let candidates = self.method_candidates(class, name);
        if candidates.is_empty() {
            return Self::error_at(ErrorCode::UndefItem, span);
        }
        let imps: Vec<MethodImpl> = candidates.iter().map(|c| c.imp).collect();
        let resolved = self
            .resolve_overload(&imps, arg_types)
            .map_err(|code| CompileError::new(code, span))?;
        let Some(chosen) = candidates.iter().find(|c| c.imp == resolved.imp) else {
            return Self::error_at(ErrorCode::UndefItem, span);
        };
        self.check_access(chosen.owner, chosen.visibility, span)?;

        args.extend(resolved.defaults);
        let full_span = self.span_from(self.span_of(object));
        let kind = ExprKind::MethodCall {
            object,
            slot: chosen.slot,
            target: resolved.imp,
            args,
        };
        Ok(self.alloc_expr(kind, resolved.ret, full_span))
    }

    /// Methods named `name` visible on `class`, most derived first. An
    /// override hides the methods it replaces; constructors are excluded.
    fn method_candidates(&self, class: ClassId, name: &str) -> Vec<MethodCandidate> {
        let mut found: Vec<MethodCandidate> = Vec::new();
        for owner in self.module.class_chain(class) {
            let def = self.module.class(owner);
            if def.name == name {
                continue;
            }
            for method in def.methods.iter().filter(|m| m.name == name) {
                let hidden = method
                    .slot
                    .is_some_and(|slot| found.iter().any(|c| c.slot == Some(slot)));
                if !hidden {
                    found.push(MethodCandidate {
                        owner,
                        imp: method.imp,
                        visibility: method.visibility,
                        slot: method.slot,
                    });
                }
            }
        }
        found
    }

    /// `Foo f(args)` in a declaration; the cursor is on `(`.
    pub(crate) fn compile_construction(
        &mut self,
        ty: &TypeDesc,
        span: Span,
    ) -> CompileResult<ExprId> {
        let Some(class) = self.class_of(ty) else {
            return Self::error_at(ErrorCode::BadNew, span);
        };
        let args = self.compile_args()?;
        let span = self.span_from(span);
        self.construct(class, args, span)
    }

    /// Build a `New` node, selecting the constructor for `args`.
    pub(crate) fn construct(
        &mut self,
        class: ClassId,
        mut args: Vec<ExprId>,
        span: Span,
    ) -> CompileResult<ExprId> {
        let def = self.module.class(class);
        let ty = TypeDesc::class(&def.name);
        let ctors: Vec<MethodCandidate> = def
            .methods
            .iter()
            .filter(|m| m.name == def.name)
            .map(|m| MethodCandidate {
                owner: class,
                imp: m.imp,
                visibility: m.visibility,
                slot: None,
            })
            .collect();

        if ctors.is_empty() {
            if !args.is_empty() {
                return Self::error_at(ErrorCode::NoConstruct, span);
            }
            let kind = ExprKind::New {
                class,
                ctor: None,
                args,
            };
            return Ok(self.alloc_expr(kind, ty, span));
        }

        let arg_types = self.arg_types(&args);
        let imps: Vec<MethodImpl> = ctors.iter().map(|c| c.imp).collect();
        let resolved = self
            .resolve_overload(&imps, &arg_types)
            .map_err(|_| CompileError::new(ErrorCode::NoConstruct, span))?;
        if let Some(chosen) = ctors.iter().find(|c| c.imp == resolved.imp) {
            self.check_access(chosen.owner, chosen.visibility, span)?;
        }
        args.extend(resolved.defaults);
        let kind = ExprKind::New {
            class,
            ctor: Some(resolved.imp),
            args,
        };
        Ok(self.alloc_expr(kind, ty, span))
    }

    /// Pick the cheapest candidate accepting `arg_types`.
    fn resolve_overload(
        &self,
        candidates: &[MethodImpl],
        arg_types: &[TypeDesc],
    ) -> Result<Resolved, ErrorCode> {
        let mut best: Option<(u32, Resolved)> = None;
        let mut mismatches = Vec::new();
        for &imp in candidates {
            match self.candidate_cost(imp, arg_types) {
                Ok((cost, resolved)) => {
                    if !matches!(&best, Some((best_cost, _)) if *best_cost <= cost) {
                        best = Some((cost, resolved));
                    }
                }
                Err(mismatch) => mismatches.push(mismatch),
            }
        }
        if let Some((_, resolved)) = best {
            return Ok(resolved);
        }
        Err(match mismatches.as_slice() {
            [Mismatch::TooMany] => ErrorCode::OverParam,
            [Mismatch::TooFew] => ErrorCode::LowParam,
            [Mismatch::Types] => ErrorCode::BadParam,
            [Mismatch::Native(code)] => *code,
            all if all.iter().any(|m| matches!(m, Mismatch::Types | Mismatch::Native(_))) => {
                ErrorCode::BadParam
            }
            _ => ErrorCode::NbParam,
        })
    }

    fn candidate_cost(
        &self,
        imp: MethodImpl,
        arg_types: &[TypeDesc],
    ) -> Result<(u32, Resolved), Mismatch> {
        match imp {
            MethodImpl::User(func) => {
                let def = self.module.function(func);
                if arg_types.len() > def.params.len() {
                    return Err(Mismatch::TooMany);
                }
                if arg_types.len() < def.required_params() {
                    return Err(Mismatch::TooFew);
                }
                let mut cost = 0;
                for (arg, param) in arg_types.iter().zip(&def.params) {
                    cost += conversion_cost(&self.module, arg, &param.ty).ok_or(Mismatch::Types)?;
                }
                let defaults = def.params[arg_types.len()..]
                    .iter()
                    .filter_map(|p| p.default)
                    .collect();
                Ok((
                    cost,
                    Resolved {
                        imp,
                        ret: def.ret.clone(),
                        defaults,
                    },
                ))
            }
            MethodImpl::Native(native) => match self.registry.resolve(&[native], arg_types) {
                Some(Ok((_, ret))) => Ok((
                    0,
                    Resolved {
                        imp,
                        ret,
                        defaults: Vec::new(),
                    },
                )),
                Some(Err(code)) => Err(Mismatch::Native(code)),
                None => Err(Mismatch::Native(ErrorCode::UndefCall)),
            },
        }
    }
}
