//! Expression compilation.
//!
//! Precedence, lowest first: assignment (right associative), `?:`, `||`,
//! `&&`, `|`, `^`, `&`, equality, comparison, shifts, `+ -`, `* / %`,
//! `**`, then the unary prefix operators and finally the postfix `.`,
//! `[]`, `()`, `++` and `--`.

use cbot_diagnostic::{CompileError, CompileResult, ErrorCode};
use cbot_ir::{
    BinaryOp, ClassId, ExprId, ExprKind, IncDecOp, Literal, LogicalOp, Span, TokenId, TokenKind,
    TypeDesc, UnaryOp,
};
use cbot_lexer::literal::{decode_char, decode_string, parse_number, Number};

use crate::parser::Parser;
use crate::stack::ensure_sufficient_stack;
use crate::types::{binary_types, common_type, compound_operand};

/// Binary operator tokens by precedence level, lowest first.
const LEVELS: &[&[TokenId]] = &[
    &[TokenId::LogOr, TokenId::TxtOr],
    &[TokenId::LogAnd, TokenId::TxtAnd],
    &[TokenId::BitOr],
    &[TokenId::BitXor],
    &[TokenId::BitAnd],
    &[TokenId::Eq, TokenId::Ne],
    &[TokenId::Lt, TokenId::Gt, TokenId::Le, TokenId::Ge],
    &[TokenId::Shl, TokenId::Shr, TokenId::Ushr],
    &[TokenId::Add, TokenId::Sub],
    &[TokenId::Mul, TokenId::Div, TokenId::Modulo],
    &[TokenId::Power],
];

impl Parser<'_> {
    pub(crate) fn compile_expr(&mut self) -> CompileResult<ExprId> {
        ensure_sufficient_stack(|| self.assignment())
    }

    fn assignment(&mut self) -> CompileResult<ExprId> {
        let target = self.conditional()?;
        let Some(op_token) = self.cursor.id().filter(|id| id.is_assignment()) else {
            return Ok(target);
        };
        let op_span = self.cursor.span();
        if !self.module.expr(target).kind.is_place() {
            return Self::error_at(ErrorCode::BadLeft, self.span_of(target));
        }
        self.cursor.advance();

        let target_ty = self.ty(target).clone();
        let op = compound_op(op_token);
        let (value, operand) = match op {
            None => (self.compile_initializer(&target_ty)?, target_ty.clone()),
            Some(op) => {
                let value = self.compile_expr()?;
                let operand = compound_operand(op, &target_ty, self.ty(value))
                    .ok_or_else(|| CompileError::new(ErrorCode::BadType2, op_span))?;
                (value, operand)
            }
        };
        let span = self.span_of(target).merge(self.span_of(value));
        let kind = ExprKind::Assign {
            op,
            operand,
            target,
            value,
        };
        Ok(self.alloc_expr(kind, target_ty, span))
    }

    fn conditional(&mut self) -> CompileResult<ExprId> {
        let cond = self.binary(0)?;
        if !self.cursor.eat(TokenId::Question) {
            return Ok(cond);
        }
        if *self.ty(cond) != TypeDesc::Boolean {
            return Self::error_at(ErrorCode::BadType1, self.span_of(cond));
        }
        let then_expr = self.compile_expr()?;
        self.cursor.expect(TokenId::Colon, ErrorCode::NoDoubleDots)?;
        let else_expr = self.compile_expr()?;
        let ty = common_type(&self.module, self.ty(then_expr), self.ty(else_expr))
            .ok_or_else(|| CompileError::new(ErrorCode::BadType2, self.span_of(else_expr)))?;
        let span = self.span_of(cond).merge(self.span_of(else_expr));
        let kind = ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        };
        Ok(self.alloc_expr(kind, ty, span))
    }

    fn binary(&mut self, level: usize) -> CompileResult<ExprId> {
        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };
        let mut left = self.binary(level + 1)?;
        while let Some(op_token) = self.cursor.eat_any(ops) {
            let op_span = self.cursor.previous_span();
            let right = self.binary(level + 1)?;
            left = self.combine(op_token, op_span, left, right)?;
        }
        Ok(left)
    }

    fn combine(
        &mut self,
        op_token: TokenId,
        op_span: Span,
        left: ExprId,
        right: ExprId,
    ) -> CompileResult<ExprId> {
        let span = self.span_of(left).merge(self.span_of(right));
        let mismatch = || CompileError::new(ErrorCode::BadType2, op_span);

        if let Some(op) = logical_op(op_token) {
            if *self.ty(left) != TypeDesc::Boolean || *self.ty(right) != TypeDesc::Boolean {
                return Err(mismatch());
            }
            let kind = ExprKind::Logical { op, left, right };
            return Ok(self.alloc_expr(kind, TypeDesc::Boolean, span));
        }
        let op = binary_op(op_token).ok_or_else(mismatch)?;
        let (operand, result) =
            binary_types(op, self.ty(left), self.ty(right)).ok_or_else(mismatch)?;
        let kind = ExprKind::Binary {
            op,
            operand,
            left,
            right,
        };
        Ok(self.alloc_expr(kind, result, span))
    }

    fn unary(&mut self) -> CompileResult<ExprId> {
        let start = self.cursor.span();
        let Some(token) = self.cursor.id() else {
            return self.postfix();
        };
        if let Some(op) = unary_op(token) {
            self.cursor.advance();
            let operand = ensure_sufficient_stack(|| self.unary())?;
            let ty = self.ty(operand);
            let result = match op {
                UnaryOp::Neg | UnaryOp::Plus => ty.arithmetic_result(ty),
                UnaryOp::Not => (*ty == TypeDesc::Boolean).then_some(TypeDesc::Boolean),
                UnaryOp::BitNot if ty.is_integer() => ty.arithmetic_result(ty),
                UnaryOp::BitNot => None,
            };
            let result = result
                .ok_or_else(|| CompileError::new(ErrorCode::BadType1, self.span_of(operand)))?;
            let span = self.span_from(start);
            return Ok(self.alloc_expr(ExprKind::Unary { op, operand }, result, span));
        }
        if matches!(token, TokenId::Inc | TokenId::Dec) {
            self.cursor.advance();
            let target = ensure_sufficient_stack(|| self.unary())?;
            let op = if token == TokenId::Inc {
                IncDecOp::PreInc
            } else {
                IncDecOp::PreDec
            };
            return self.inc_dec(op, target, start);
        }
        self.postfix()
    }

    fn inc_dec(&mut self, op: IncDecOp, target: ExprId, start: Span) -> CompileResult<ExprId> {
        if !self.module.expr(target).kind.is_place() {
            return Self::error_at(ErrorCode::BadLeft, self.span_of(target));
        }
        let ty = self.ty(target).clone();
        if !ty.is_numeric() {
            return Self::error_at(ErrorCode::BadType1, self.span_of(target));
        }
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::IncDec { op, target }, ty, span))
    }

    fn postfix(&mut self) -> CompileResult<ExprId> {
        let mut expr = self.primary()?;
        loop {
            match self.cursor.id() {
                Some(TokenId::Dot) => {
                    self.cursor.advance();
                    expr = self.member(expr)?;
                }
                Some(TokenId::OpenBracket) => {
                    self.cursor.advance();
                    expr = self.index(expr)?;
                }
                Some(token @ (TokenId::Inc | TokenId::Dec)) => {
                    self.cursor.advance();
                    let op = if token == TokenId::Inc {
                        IncDecOp::PostInc
                    } else {
                        IncDecOp::PostDec
                    };
                    let start = self.span_of(expr);
                    expr = self.inc_dec(op, expr, start)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    fn member(&mut self, object: ExprId) -> CompileResult<ExprId> {
        let Some(class) = self.class_of(self.ty(object)) else {
            return Self::error_at(ErrorCode::UndefClass, self.span_of(object));
        };
        let (name, span) = self.cursor.expect_ident(ErrorCode::UndefItem)?;
        if self.cursor.is(TokenId::OpenPar) {
            return self.compile_method_call(object, class, name, span);
        }
        self.field_access(Some(object), class, name, span)?
            .ok_or_else(|| CompileError::new(ErrorCode::UndefItem, span))
    }

    /// Field `name` of `class`, read through `object` (or the implicit
    /// `this` when `object` is `None`). Statics are found either way.
    pub(crate) fn field_access(
        &mut self,
        object: Option<ExprId>,
        class: ClassId,
        name: &str,
        span: Span,
    ) -> CompileResult<Option<ExprId>> {
        if object.is_some() || self.stack.has_this() {
            let found = self
                .module
                .instance_fields(class)
                .iter()
                .enumerate()
                .rev()
                .find(|(_, (_, f))| f.name == name)
                .map(|(index, (owner, f))| (index, *owner, f.visibility, f.ty.clone()));
            if let Some((index, owner, visibility, ty)) = found {
                self.check_access(owner, visibility, span)?;
                let object = match object {
                    Some(object) => object,
                    None => self.alloc_this(class, span),
                };
                let span = self.span_of(object).merge(span);
                let kind = ExprKind::Field {
                    object,
                    index: index as u32,
                };
                return Ok(Some(self.alloc_expr(kind, ty, span)));
            }
        }
        for owner in self.module.class_chain(class) {
            let found = self
                .module
                .class(owner)
                .static_named(name)
                .map(|(index, f)| (index, f.visibility, f.ty.clone()));
            if let Some((index, visibility, ty)) = found {
                self.check_access(owner, visibility, span)?;
                let kind = ExprKind::StaticField {
                    class: owner,
                    index,
                };
                return Ok(Some(self.alloc_expr(kind, ty, span)));
            }
        }
        Ok(None)
    }

    pub(crate) fn alloc_this(&mut self, class: ClassId, span: Span) -> ExprId {
        let ty = TypeDesc::class(&self.module.class(class).name);
        self.alloc_expr(ExprKind::This, ty, span)
    }

    fn index(&mut self, array: ExprId) -> CompileResult<ExprId> {
        let Some(elem) = self.ty(array).element().cloned() else {
            return Self::error_at(ErrorCode::BadIndex, self.span_of(array));
        };
        let index = self.compile_expr()?;
        if !self.ty(index).is_integer() {
            return Self::error_at(ErrorCode::BadIndex, self.span_of(index));
        }
        self.cursor
            .expect(TokenId::CloseBracket, ErrorCode::CloseIndex)?;
        let span = self.span_from(self.span_of(array));
        Ok(self.alloc_expr(ExprKind::Index { array, index }, elem, span))
    }

    fn primary(&mut self) -> CompileResult<ExprId> {
        let span = self.cursor.span();
        let text = self.cursor.text();
        let at = |code| CompileError::new(code, span);
        let (literal, ty) = match self.cursor.kind() {
            TokenKind::Number => match parse_number(text).map_err(at)? {
                Number::Int(n) => (Literal::Int(n), int_literal_type(n)),
                Number::Float(f) => (Literal::Float(f64::from(f as f32)), TypeDesc::Float),
            },
            TokenKind::Str => (Literal::Str(decode_string(text).map_err(at)?), TypeDesc::String),
            TokenKind::Char => {
                let c = decode_char(text).map_err(at)?;
                (Literal::Int(i64::from(u32::from(c))), TypeDesc::Char)
            }
            TokenKind::Constant(n) => (Literal::Int(n), int_literal_type(n)),
            TokenKind::Ident => return self.identifier(),
            TokenKind::Keyword(TokenId::True) => (Literal::Bool(true), TypeDesc::Boolean),
            TokenKind::Keyword(TokenId::False) => (Literal::Bool(false), TypeDesc::Boolean),
            TokenKind::Keyword(TokenId::Null) => (Literal::Null, TypeDesc::Null),
            TokenKind::Keyword(TokenId::Nan) => (Literal::Nan, TypeDesc::Int),
            TokenKind::Keyword(TokenId::OpenPar) => {
                self.cursor.advance();
                let inner = self.compile_expr()?;
                self.cursor.expect(TokenId::ClosePar, ErrorCode::ClosePar)?;
                return Ok(inner);
            }
            TokenKind::Keyword(TokenId::New) => return self.compile_new(),
            TokenKind::Keyword(_) | TokenKind::End => return self.error(ErrorCode::NoExpression),
        };
        self.cursor.advance();
        Ok(self.alloc_expr(ExprKind::Literal(literal), ty, span))
    }

    fn identifier(&mut self) -> CompileResult<ExprId> {
        let (name, span) = (self.cursor.text(), self.cursor.span());
        self.cursor.advance();
        if self.cursor.is(TokenId::OpenPar) {
            return self.compile_call(name, span);
        }
        let current = self.stack.class();
        if name == "this" {
            return match current.filter(|_| self.stack.has_this()) {
                Some(class) => Ok(self.alloc_this(class, span)),
                None => Self::error_at(ErrorCode::UndefVar, span),
            };
        }
        if let Some((slot, ty)) = self.stack.lookup(name) {
            let ty = ty.clone();
            return Ok(self.alloc_expr(ExprKind::Local(slot), ty, span));
        }
        if let Some(class) = current {
            if let Some(field) = self.field_access(None, class, name, span)? {
                return Ok(field);
            }
        }
        Self::error_at(ErrorCode::UndefVar, span)
    }

    fn compile_new(&mut self) -> CompileResult<ExprId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let (name, name_span) = self.cursor.expect_ident(ErrorCode::NoClassName)?;
        let class = self
            .resolve_class(name)
            .ok_or_else(|| CompileError::new(ErrorCode::BadNew, name_span))?;
        let args = if self.cursor.is(TokenId::OpenPar) {
            self.compile_args()?
        } else {
            Vec::new()
        };
        let span = self.span_from(start);
        self.construct(class, args, span)
    }
}

/// `int` when the value fits, else `long`.
fn int_literal_type(n: i64) -> TypeDesc {
    if i32::try_from(n).is_ok() {
        TypeDesc::Int
    } else {
        TypeDesc::Long
    }
}

fn logical_op(token: TokenId) -> Option<LogicalOp> {
    match token {
        TokenId::LogAnd | TokenId::TxtAnd => Some(LogicalOp::And),
        TokenId::LogOr | TokenId::TxtOr => Some(LogicalOp::Or),
        _ => None,
    }
}

fn binary_op(token: TokenId) -> Option<BinaryOp> {
    Some(match token {
        TokenId::Add => BinaryOp::Add,
        TokenId::Sub => BinaryOp::Sub,
        TokenId::Mul => BinaryOp::Mul,
        TokenId::Div => BinaryOp::Div,
        TokenId::Modulo => BinaryOp::Mod,
        TokenId::Power => BinaryOp::Pow,
        TokenId::Shl => BinaryOp::Shl,
        TokenId::Shr => BinaryOp::Shr,
        TokenId::Ushr => BinaryOp::Ushr,
        TokenId::BitAnd => BinaryOp::BitAnd,
        TokenId::BitOr => BinaryOp::BitOr,
        TokenId::BitXor => BinaryOp::BitXor,
        TokenId::Eq => BinaryOp::Eq,
        TokenId::Ne => BinaryOp::Ne,
        TokenId::Lt => BinaryOp::Lt,
        TokenId::Le => BinaryOp::Le,
        TokenId::Gt => BinaryOp::Gt,
        TokenId::Ge => BinaryOp::Ge,
        _ => return None,
    })
}

/// Operator of a compound assignment; `None` for plain `=`.
fn compound_op(token: TokenId) -> Option<BinaryOp> {
    Some(match token {
        TokenId::AssignAdd => BinaryOp::Add,
        TokenId::AssignSub => BinaryOp::Sub,
        TokenId::AssignMul => BinaryOp::Mul,
        TokenId::AssignDiv => BinaryOp::Div,
        TokenId::AssignModulo => BinaryOp::Mod,
        TokenId::AssignOr => BinaryOp::BitOr,
        TokenId::AssignAnd => BinaryOp::BitAnd,
        TokenId::AssignXor => BinaryOp::BitXor,
        TokenId::AssignShl => BinaryOp::Shl,
        TokenId::AssignShr => BinaryOp::Shr,
        TokenId::AssignUshr => BinaryOp::Ushr,
        _ => return None,
    })
}

fn unary_op(token: TokenId) -> Option<UnaryOp> {
    match token {
        TokenId::Sub => Some(UnaryOp::Neg),
        TokenId::Add => Some(UnaryOp::Plus),
        TokenId::LogNot | TokenId::TxtNot => Some(UnaryOp::Not),
        TokenId::BitNot => Some(UnaryOp::BitNot),
        _ => None,
    }
}
