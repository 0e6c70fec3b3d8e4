//! Statement compilation.

use cbot_diagnostic::{CompileError, CompileResult, ErrorCode};
use cbot_ir::{
    CatchClause, CatchKind, ExprId, ExprKind, Span, StmtId, StmtKind, SwitchCase, TokenId,
    TokenKind, TypeDesc,
};

use crate::parser::{array_depth, Parser};
use crate::stack::ensure_sufficient_stack;

impl Parser<'_> {
    /// Compile `{ ... }`. A `scoped` block gets its own names; a function
    /// body shares the scope its parameters were declared in.
    pub(crate) fn compile_block(&mut self, scoped: bool) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        let stmts = self.compile_block_stmts(scoped)?;
        Ok(self.alloc_stmt(StmtKind::Block(stmts), self.span_from(start)))
    }

    fn compile_block_stmts(&mut self, scoped: bool) -> CompileResult<Vec<StmtId>> {
        self.cursor.expect(TokenId::OpenBlock, ErrorCode::OpenBlock)?;
        if scoped {
            self.stack.push_block();
        }
        let mut stmts = Vec::new();
        while !self.cursor.eat(TokenId::CloseBlock) {
            if self.cursor.is_at_end() {
                return self.error(ErrorCode::CloseBlock);
            }
            stmts.push(self.compile_statement()?);
        }
        if scoped {
            self.stack.pop_block();
        }
        Ok(stmts)
    }

    pub(crate) fn compile_statement(&mut self) -> CompileResult<StmtId> {
        ensure_sufficient_stack(|| self.statement())
    }

    fn statement(&mut self) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        match self.cursor.kind() {
            TokenKind::Keyword(id) => match id {
                TokenId::OpenBlock => self.compile_block(true),
                TokenId::If => self.compile_if(),
                TokenId::While => self.compile_while(None),
                TokenId::Do => self.compile_do(None),
                TokenId::For => self.compile_for(None),
                TokenId::Repeat => self.compile_repeat(None),
                TokenId::Switch => self.compile_switch(),
                TokenId::Try => self.compile_try(),
                TokenId::Throw => self.compile_throw(),
                TokenId::Return => self.compile_return(),
                TokenId::Break | TokenId::Continue => self.compile_jump(id),
                TokenId::Else => self.error(ErrorCode::ElseWhitoutIf),
                TokenId::Case | TokenId::Default => self.error(ErrorCode::CaseOut),
                TokenId::Semicolon => {
                    self.cursor.advance();
                    Ok(self.alloc_stmt(StmtKind::Block(Vec::new()), start))
                }
                _ if id.is_type_keyword() => self.compile_declaration_stmt(),
                _ => self.compile_expr_stmt(),
            },
            TokenKind::Ident if self.cursor.peek_is(1, TokenId::Colon) => self.compile_labeled(),
            TokenKind::Ident if self.at_declaration() => self.compile_declaration_stmt(),
            _ => self.compile_expr_stmt(),
        }
    }

    /// A declaration starts with a type keyword, or a class name followed
    /// by a name or `[`.
    fn at_declaration(&mut self) -> bool {
        match self.cursor.kind() {
            TokenKind::Keyword(id) => id.is_type_keyword(),
            TokenKind::Ident => {
                let next = self.cursor.peek_kind(1);
                let follows = next == TokenKind::Ident
                    || next == TokenKind::Keyword(TokenId::OpenBracket);
                follows && self.at_type()
            }
            _ => false,
        }
    }

    fn compile_expr_stmt(&mut self) -> CompileResult<StmtId> {
        let expr = self.compile_expr()?;
        self.expect_semicolon()?;
        let span = self.span_from(self.span_of(expr));
        Ok(self.alloc_stmt(StmtKind::Expr(expr), span))
    }

    fn compile_declaration_stmt(&mut self) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        let mut decls = self.compile_declaration()?;
        self.expect_semicolon()?;
        if decls.len() == 1 {
            if let Some(decl) = decls.pop() {
                return Ok(decl);
            }
        }
        Ok(self.alloc_stmt(StmtKind::Block(decls), self.span_from(start)))
    }

    /// `type name [= init], name [= init] ...` without the terminator.
    fn compile_declaration(&mut self) -> CompileResult<Vec<StmtId>> {
        let type_span = self.cursor.span();
        let base = self.parse_type()?;
        if base.is_void() {
            return Self::error_at(ErrorCode::Void, type_span);
        }
        let mut decls = Vec::new();
        loop {
            let (name, span) = self.expect_name(ErrorCode::NoVar)?;
            let mut limits = self.parse_limits()?;
            let ty = (0..limits.len()).fold(base.clone(), |ty, _| TypeDesc::array_of(ty));
            limits.extend(std::iter::repeat(None).take(array_depth(&base)));

            let init = if self.cursor.is(TokenId::OpenPar) && self.class_of(&ty).is_some() {
                Some(self.compile_construction(&ty, span)?)
            } else if self.cursor.eat(TokenId::Assign) {
                Some(self.compile_initializer(&ty)?)
            } else {
                None
            };
            let slot = self
                .stack
                .declare(name, ty)
                .map_err(|code| CompileError::new(code, span))?;
            let decl = StmtKind::Decl { slot, limits, init };
            decls.push(self.alloc_stmt(decl, self.span_from(span)));

            if !self.cursor.eat(TokenId::Comma) {
                return Ok(decls);
            }
        }
    }

    /// Value stored by a declaration or assignment: an expression, or a
    /// `{ ... }` list when the target is an array.
    pub(crate) fn compile_initializer(&mut self, ty: &TypeDesc) -> CompileResult<ExprId> {
        if let (Some(elem), true) = (ty.element(), self.cursor.is(TokenId::OpenBlock)) {
            let elem = elem.clone();
            let start = self.cursor.span();
            self.cursor.advance();
            let mut items = Vec::new();
            if !self.cursor.eat(TokenId::CloseBlock) {
                loop {
                    items.push(ensure_sufficient_stack(|| self.compile_initializer(&elem))?);
                    if self.cursor.eat(TokenId::CloseBlock) {
                        break;
                    }
                    self.cursor.expect(TokenId::Comma, ErrorCode::CloseBlock)?;
                }
            }
            let span = self.span_from(start);
            return Ok(self.alloc_expr(ExprKind::ArrayLit(items), ty.clone(), span));
        }
        let value = self.compile_expr()?;
        self.check_assignable(value, ty)?;
        Ok(value)
    }

    /// `( condition )` where the condition must be boolean.
    fn compile_condition(&mut self) -> CompileResult<ExprId> {
        self.cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar)?;
        let cond = self.compile_expr()?;
        if *self.ty(cond) != TypeDesc::Boolean {
            return Self::error_at(ErrorCode::NotBoolean, self.span_of(cond));
        }
        self.cursor.expect(TokenId::ClosePar, ErrorCode::ClosePar)?;
        Ok(cond)
    }

    fn compile_loop_body(&mut self, label: Option<String>) -> CompileResult<StmtId> {
        self.stack.push_loop(label);
        let body = self.compile_statement();
        self.stack.pop_breakable();
        body
    }

    fn compile_labeled(&mut self) -> CompileResult<StmtId> {
        let label = Some(self.cursor.text().to_owned());
        self.cursor.advance();
        self.cursor.advance();
        match self.cursor.id() {
            Some(TokenId::While) => self.compile_while(label),
            Some(TokenId::Do) => self.compile_do(label),
            Some(TokenId::For) => self.compile_for(label),
            Some(TokenId::Repeat) => self.compile_repeat(label),
            _ => self.error(ErrorCode::Label),
        }
    }

    fn compile_if(&mut self) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let cond = self.compile_condition()?;
        let then_branch = self.compile_statement()?;
        let else_branch = if self.cursor.eat(TokenId::Else) {
            Some(self.compile_statement()?)
        } else {
            None
        };
        let kind = StmtKind::If {
            cond,
            then_branch,
            else_branch,
        };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn compile_while(&mut self, label: Option<String>) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let cond = self.compile_condition()?;
        let body = self.compile_loop_body(label.clone())?;
        let kind = StmtKind::While { label, cond, body };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn compile_do(&mut self, label: Option<String>) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let body = self.compile_loop_body(label.clone())?;
        self.cursor.expect(TokenId::While, ErrorCode::NoWhile)?;
        let cond = self.compile_condition()?;
        self.expect_semicolon()?;
        let kind = StmtKind::DoWhile { label, body, cond };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn compile_for(&mut self, label: Option<String>) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        self.cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar)?;
        self.stack.push_block();
        let result = self.compile_for_parts(label, start);
        self.stack.pop_block();
        result
    }

    fn compile_for_parts(&mut self, label: Option<String>, start: Span) -> CompileResult<StmtId> {
        let mut init = Vec::new();
        if !self.cursor.is(TokenId::Semicolon) {
            if self.at_declaration() {
                init = self.compile_declaration()?;
            } else {
                for expr in self.compile_expr_list()? {
                    let span = self.span_of(expr);
                    init.push(self.alloc_stmt(StmtKind::Expr(expr), span));
                }
            }
        }
        self.expect_semicolon()?;

        let cond = if self.cursor.is(TokenId::Semicolon) {
            None
        } else {
            let cond = self.compile_expr()?;
            if *self.ty(cond) != TypeDesc::Boolean {
                return Self::error_at(ErrorCode::NotBoolean, self.span_of(cond));
            }
            Some(cond)
        };
        self.expect_semicolon()?;

        let step = if self.cursor.is(TokenId::ClosePar) {
            Vec::new()
        } else {
            self.compile_expr_list()?
        };
        self.cursor.expect(TokenId::ClosePar, ErrorCode::ClosePar)?;

        let body = self.compile_loop_body(label.clone())?;
        let kind = StmtKind::For {
            label,
            init,
            cond,
            step,
            body,
        };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn compile_expr_list(&mut self) -> CompileResult<Vec<ExprId>> {
        let mut list = vec![self.compile_expr()?];
        while self.cursor.eat(TokenId::Comma) {
            list.push(self.compile_expr()?);
        }
        Ok(list)
    }

    fn compile_repeat(&mut self, label: Option<String>) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        self.cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar)?;
        if self.cursor.is_any(&[TokenId::ClosePar, TokenId::Semicolon]) {
            return self.error(ErrorCode::BadNum);
        }
        let count = self.compile_expr()?;
        if !self.ty(count).is_numeric() {
            return Self::error_at(ErrorCode::BadType1, self.span_of(count));
        }
        self.cursor.expect(TokenId::ClosePar, ErrorCode::ClosePar)?;
        let body = self.compile_loop_body(label.clone())?;
        let kind = StmtKind::Repeat { label, count, body };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn compile_switch(&mut self) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        self.cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar)?;
        let value = self.compile_expr()?;
        if !self.ty(value).is_integer() {
            return Self::error_at(ErrorCode::BadType1, self.span_of(value));
        }
        self.cursor.expect(TokenId::ClosePar, ErrorCode::ClosePar)?;
        self.cursor.expect(TokenId::OpenBlock, ErrorCode::OpenBlock)?;

        self.stack.push_switch();
        self.stack.push_block();
        let result = self.compile_switch_body(value, start);
        self.stack.pop_block();
        self.stack.pop_breakable();
        result
    }

    fn compile_switch_body(&mut self, value: ExprId, start: Span) -> CompileResult<StmtId> {
        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut body = Vec::new();
        loop {
            if self.cursor.eat(TokenId::CloseBlock) {
                break;
            }
            if self.cursor.is_at_end() {
                return self.error(ErrorCode::CloseBlock);
            }
            let label_span = self.cursor.span();
            let case_value = if self.cursor.eat(TokenId::Case) {
                let expr = self.compile_expr()?;
                if !self.ty(expr).is_integer() {
                    return Self::error_at(ErrorCode::BadType1, self.span_of(expr));
                }
                let value = self.constant_value(expr, ErrorCode::BadNum)?;
                let value = value
                    .as_int()
                    .ok_or_else(|| CompileError::new(ErrorCode::BadNum, self.span_of(expr)))?;
                Some(value)
            } else if self.cursor.eat(TokenId::Default) {
                None
            } else {
                if cases.is_empty() {
                    return self.error(ErrorCode::NoCase);
                }
                body.push(self.compile_statement()?);
                continue;
            };
            self.cursor.expect(TokenId::Colon, ErrorCode::NoDoubleDots)?;
            if cases.iter().any(|c| c.value == case_value) {
                return Self::error_at(ErrorCode::RedefCase, label_span);
            }
            cases.push(SwitchCase {
                value: case_value,
                start: body.len() as u32,
            });
        }
        let kind = StmtKind::Switch { value, cases, body };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn compile_try(&mut self) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let body = self.compile_block_stmts(true)?;

        let mut catches = Vec::new();
        while self.cursor.is(TokenId::Catch) {
            let clause_start = self.cursor.span();
            self.cursor.advance();
            self.cursor.expect(TokenId::OpenPar, ErrorCode::OpenPar)?;
            let cond = self.compile_expr()?;
            let kind = match self.ty(cond) {
                TypeDesc::Boolean => CatchKind::Condition,
                ty if ty.is_integer() => CatchKind::Code,
                _ => return Self::error_at(ErrorCode::BadType1, self.span_of(cond)),
            };
            self.cursor.expect(TokenId::ClosePar, ErrorCode::ClosePar)?;
            let span = self.span_from(clause_start);
            let body = self.compile_block(true)?;
            catches.push(CatchClause {
                kind,
                cond,
                body,
                span,
            });
        }
        let finally = if self.cursor.eat(TokenId::Finally) {
            Some(self.compile_block(true)?)
        } else {
            None
        };
        let kind = StmtKind::Try {
            body,
            catches,
            finally,
        };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn compile_throw(&mut self) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let code = self.compile_expr()?;
        if !self.ty(code).is_integer() {
            return Self::error_at(ErrorCode::BadType1, self.span_of(code));
        }
        self.expect_semicolon()?;
        Ok(self.alloc_stmt(StmtKind::Throw(code), self.span_from(start)))
    }

    fn compile_return(&mut self) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let ret = self.stack.return_type().cloned().unwrap_or(TypeDesc::Void);
        let value = if self.cursor.is(TokenId::Semicolon) {
            None
        } else {
            Some(self.compile_expr()?)
        };
        match value {
            Some(value) if ret.is_void() => {
                return Self::error_at(ErrorCode::BadType1, self.span_of(value));
            }
            Some(value) => self.check_assignable(value, &ret)?,
            None if !ret.is_void() => return Self::error_at(ErrorCode::BadType1, start),
            None => {}
        }
        self.expect_semicolon()?;
        Ok(self.alloc_stmt(StmtKind::Return(value), self.span_from(start)))
    }

    fn compile_jump(&mut self, id: TokenId) -> CompileResult<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance();
        let label = if self.cursor.is_ident() {
            let label = self.cursor.text().to_owned();
            self.cursor.advance();
            Some(label)
        } else {
            None
        };
        let is_continue = id == TokenId::Continue;
        self.stack
            .check_jump(label.as_deref(), is_continue)
            .map_err(|code| CompileError::new(code, self.span_from(start)))?;
        self.expect_semicolon()?;
        let kind = if is_continue {
            StmtKind::Continue(label)
        } else {
            StmtKind::Break(label)
        };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }
}
