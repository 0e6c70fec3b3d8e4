//! Parser state shared by every grammar module.
//!
//! The parser owns the `Module` under construction. Nothing is handed
//! out until the whole program compiled: on the first error the module
//! is dropped with the parser, so a failed compile leaves no tree behind.

use cbot_diagnostic::{CompileError, CompileResult, ErrorCode};
use cbot_ir::{
    ClassDef, ClassId, Expr, ExprId, ExprKind, FieldDef, MethodDef, MethodImpl, Modifiers, Module,
    Span, Stmt, StmtId, StmtKind, TokenId, TokenKind, TypeDesc, Visibility,
};
use cbot_lexer::TokenList;
use cbot_registry::Registry;
use cbot_value::Value;
use tracing::debug;

use crate::const_eval::eval_constant;
use crate::cursor::Cursor;
use crate::scope::CompileStack;
use crate::types::is_assignable;

pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) registry: &'a Registry,
    pub(crate) module: Module,
    pub(crate) stack: CompileStack,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList, registry: &'a Registry) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            registry,
            module: Module::new(),
            stack: CompileStack::new(),
        }
    }

    // Node construction

    pub(crate) fn alloc_expr(&mut self, kind: ExprKind, ty: TypeDesc, span: Span) -> ExprId {
        self.module.alloc_expr(Expr::new(kind, ty, span))
    }

    pub(crate) fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.module.alloc_stmt(Stmt::new(kind, span))
    }

    #[inline]
    pub(crate) fn ty(&self, id: ExprId) -> &TypeDesc {
        &self.module.expr(id).ty
    }

    #[inline]
    pub(crate) fn span_of(&self, id: ExprId) -> Span {
        self.module.expr(id).span
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    // Errors

    #[cold]
    pub(crate) fn error<T>(&self, code: ErrorCode) -> CompileResult<T> {
        Err(self.cursor.error(code))
    }

    #[cold]
    pub(crate) fn error_at<T>(code: ErrorCode, span: Span) -> CompileResult<T> {
        Err(CompileError::new(code, span))
    }

    /// Consume a name being declared.
    ///
    /// Keywords and named constants are reserved and fail with `Reserved`;
    /// anything else that is not an identifier fails with `code`.
    pub(crate) fn expect_name(&mut self, code: ErrorCode) -> CompileResult<(&'a str, Span)> {
        match self.cursor.kind() {
            TokenKind::Constant(_) => self.error(ErrorCode::Reserved),
            TokenKind::Keyword(id) if TokenId::KEYWORDS.contains(&id) => {
                self.error(ErrorCode::Reserved)
            }
            _ => self.cursor.expect_ident(code),
        }
    }

    /// Consume `;` or fail with `NoTerminator`.
    pub(crate) fn expect_semicolon(&mut self) -> CompileResult<()> {
        self.cursor
            .expect(TokenId::Semicolon, ErrorCode::NoTerminator)
            .map(|_| ())
    }

    pub(crate) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        while let Some(id) = self.cursor.id().filter(|id| id.is_modifier()) {
            modifiers |= match id {
                TokenId::Public => Modifiers::PUBLIC,
                TokenId::Private => Modifiers::PRIVATE,
                TokenId::Protected => Modifiers::PROTECTED,
                TokenId::Static => Modifiers::STATIC,
                TokenId::Extern => Modifiers::EXTERN,
                _ => Modifiers::SYNCHRONIZED,
            };
            self.cursor.advance();
        }
        modifiers
    }

    /// Value of a constant expression; `code` when it is not constant.
    pub(crate) fn constant_value(&self, id: ExprId, code: ErrorCode) -> CompileResult<Value> {
        let span = self.span_of(id);
        match eval_constant(&self.module, id) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Self::error_at(code, span),
            Err(err) => Self::error_at(err, span),
        }
    }

    /// Fail with `BadType1` unless `value` can be stored in a `to` cell.
    pub(crate) fn check_assignable(&self, value: ExprId, to: &TypeDesc) -> CompileResult<()> {
        if is_assignable(&self.module, self.ty(value), to) {
            Ok(())
        } else {
            Self::error_at(ErrorCode::BadType1, self.span_of(value))
        }
    }

    // Types

    /// Whether the current token can start a type.
    pub(crate) fn at_type(&mut self) -> bool {
        match self.cursor.kind() {
            TokenKind::Keyword(id) => id.is_type_keyword(),
            TokenKind::Ident => {
                let name = self.cursor.text();
                self.resolve_class(name).is_some()
            }
            _ => false,
        }
    }

    /// Parse a type: a primitive keyword or class name followed by any
    /// number of `[]`.
    pub(crate) fn parse_type(&mut self) -> CompileResult<TypeDesc> {
        let mut ty = match self.cursor.kind() {
            TokenKind::Keyword(id) => {
                keyword_type(id).ok_or_else(|| self.cursor.error(ErrorCode::NoType))?
            }
            TokenKind::Ident => {
                let name = self.cursor.text();
                let id = self
                    .resolve_class(name)
                    .ok_or_else(|| self.cursor.error(ErrorCode::NoType))?;
                TypeDesc::class(&self.module.class(id).name)
            }
            _ => return self.error(ErrorCode::NoType),
        };
        self.cursor.advance();
        while self.cursor.eat(TokenId::OpenBracket) {
            self.cursor.expect(TokenId::CloseBracket, ErrorCode::CloseIndex)?;
            ty = TypeDesc::array_of(ty);
        }
        Ok(ty)
    }

    // Classes

    /// Find a class by name, importing it from the registry on first use.
    pub(crate) fn resolve_class(&mut self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.module.class_named(name) {
            return Some(id);
        }
        let host = self.registry.class(name)?.clone();
        let parent = match &host.parent {
            Some(parent) => Some(self.resolve_class(parent)?),
            None => None,
        };
        let mut def = ClassDef::new(&host.name, Span::DUMMY);
        def.parent = parent;
        def.host = true;
        def.fields = host
            .fields
            .iter()
            .map(|f| FieldDef {
                name: f.name.clone(),
                ty: f.ty.clone(),
                visibility: f.visibility,
                init: None,
                limits: vec![None; array_depth(&f.ty)],
                span: Span::DUMMY,
            })
            .collect();
        def.methods = host
            .methods
            .iter()
            .map(|m| MethodDef {
                name: m.name.clone(),
                imp: MethodImpl::Native(m.native),
                visibility: Visibility::Public,
                slot: None,
            })
            .collect();
        self.module.classes.push(def);
        debug!(class = name, "imported host class");
        Some(ClassId::from_index(self.module.classes.len() - 1))
    }

    /// Class id of a class-typed value.
    pub(crate) fn class_of(&self, ty: &TypeDesc) -> Option<ClassId> {
        ty.class_name().and_then(|name| self.module.class_named(name))
    }

    /// Check that code in the current class may use a member of
    /// `declaring` with visibility `vis`.
    pub(crate) fn check_access(&self, declaring: ClassId, vis: Visibility, span: Span) -> CompileResult<()> {
        let current = self.stack.class();
        let allowed = match vis {
            Visibility::Public => true,
            Visibility::Private => current == Some(declaring),
            Visibility::Protected => {
                current.is_some_and(|c| self.module.is_subclass_of(c, declaring))
            }
        };
        if allowed {
            Ok(())
        } else {
            Self::error_at(ErrorCode::Private, span)
        }
    }
}

/// Type named by a primitive type keyword.
pub(crate) fn keyword_type(id: TokenId) -> Option<TypeDesc> {
    Some(match id {
        TokenId::Int => TypeDesc::Int,
        TokenId::Float => TypeDesc::Float,
        TokenId::Boolean | TokenId::Bool => TypeDesc::Boolean,
        TokenId::String => TypeDesc::String,
        TokenId::Void => TypeDesc::Void,
        TokenId::Byte => TypeDesc::Byte,
        TokenId::Short => TypeDesc::Short,
        TokenId::Char => TypeDesc::Char,
        TokenId::Long => TypeDesc::Long,
        TokenId::Double => TypeDesc::Double,
        _ => return None,
    })
}

/// Number of array dimensions of `ty`.
pub(crate) fn array_depth(ty: &TypeDesc) -> usize {
    std::iter::successors(ty.element(), |t| t.element()).count()
}
