//! Statements.
//!
//! Every statement counts one step when it is entered (state 0); loops
//! count one more per test after the first. Loops intercept `break` and
//! `continue` aimed at them, `switch` intercepts an unlabeled `break`.

use std::sync::Arc;

use cbot_diagnostic::{ErrorCode, RuntimeError};
use cbot_ir::{ExprId, StmtId, StmtKind};
use cbot_value::{convert, ops, Value, Var, VarCell};

use super::{push_expr, push_stmt, store_declared, type_of, Action, StepResult};
use crate::completion::{settle, value, Interrupt};
use crate::machine::fresh_cell;
use crate::{Completion, Frame, Machine, Want};

const ENTER: u32 = 0;
const FIRST: u32 = 1;

/// What a loop does with its body's completion.
enum LoopFlow {
    /// Run the next iteration.
    Next,
    /// Leave the loop normally.
    Exit,
}

/// Whether a `break`/`continue` with `jump` label targets a loop labeled `label`.
fn targets(jump: Option<&str>, label: Option<&str>) -> bool {
    jump.map_or(true, |jump| Some(jump) == label)
}

fn loop_flow(incoming: Option<Completion>, label: Option<&str>) -> Result<LoopFlow, Interrupt> {
    match incoming {
        Some(Completion::Break(jump)) if targets(jump.as_deref(), label) => Ok(LoopFlow::Exit),
        Some(Completion::Continue(jump)) if targets(jump.as_deref(), label) => Ok(LoopFlow::Next),
        other => settle(other).map(|()| LoopFlow::Next),
    }
}

fn condition(incoming: Option<Completion>) -> Result<bool, Interrupt> {
    Ok(ops::truthy(&value(incoming)?)?)
}

fn normal() -> StepResult {
    Ok(Action::Complete(Completion::Normal))
}

pub(super) fn max_state(kind: &StmtKind) -> u32 {
    match kind {
        StmtKind::Block(_) | StmtKind::Break(_) | StmtKind::Continue(_) => 1,
        StmtKind::Expr(_)
        | StmtKind::Decl { .. }
        | StmtKind::Return(_)
        | StmtKind::Throw(_) => 2,
        StmtKind::If { .. } | StmtKind::While { .. } | StmtKind::Switch { .. } => 3,
        StmtKind::DoWhile { .. } | StmtKind::Repeat { .. } => 4,
        StmtKind::For { .. } => 5,
        StmtKind::Try { .. } => super::handler::TRY_MAX,
    }
}

impl Machine {
    pub(super) fn step_stmt(
        &mut self,
        frame: &mut Frame,
        id: StmtId,
        incoming: Option<Completion>,
    ) -> StepResult {
        if frame.state == ENTER {
            frame.state = FIRST;
            return Ok(Action::Tick);
        }
        let module = Arc::clone(&self.module);
        let stmt = module.stmt(id);
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                if frame.state == FIRST {
                    frame.state = 2;
                    return Ok(push_expr(frame, *expr, Want::Value));
                }
                value(incoming)?;
                normal()
            }
            StmtKind::Decl { slot, limits, init } => {
                let index = slot.index();
                let ty = self
                    .activation(frame)?
                    .locals
                    .get(index)
                    .map(|cell| cell.borrow().ty().clone())
                    .ok_or(ErrorCode::UndefVar)?;
                let cell = match (frame.state, init) {
                    (FIRST, Some(init)) => {
                        frame.state = 2;
                        return Ok(push_expr(frame, *init, Want::Value));
                    }
                    (FIRST, None) => fresh_cell(&ty, limits),
                    (_, init) => {
                        let value = value(incoming)?;
                        let init = init.ok_or(ErrorCode::NoRun)?;
                        let cell = VarCell::new(Var::new(ty));
                        store_declared(&cell, value, type_of(&module, init), limits)?;
                        cell
                    }
                };
                let act = self.activation_mut(frame)?;
                if let Some(slot) = act.locals.get_mut(index) {
                    *slot = cell;
                }
                normal()
            }
            StmtKind::Block(stmts) => {
                settle(incoming)?;
                match stmts.get(frame.cursor as usize) {
                    Some(&next) => {
                        frame.cursor += 1;
                        Ok(push_stmt(frame, next))
                    }
                    None => normal(),
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => match frame.state {
                FIRST => {
                    frame.state = 2;
                    Ok(push_expr(frame, *cond, Want::Value))
                }
                2 => {
                    let branch = if condition(incoming)? {
                        Some(*then_branch)
                    } else {
                        *else_branch
                    };
                    frame.state = 3;
                    match branch {
                        Some(branch) => Ok(push_stmt(frame, branch)),
                        None => normal(),
                    }
                }
                _ => {
                    settle(incoming)?;
                    normal()
                }
            },
            StmtKind::While { label, cond, body } => match frame.state {
                FIRST => {
                    frame.state = 2;
                    Ok(push_expr(frame, *cond, Want::Value))
                }
                2 => {
                    if !condition(incoming)? {
                        return normal();
                    }
                    frame.state = 3;
                    Ok(push_stmt(frame, *body))
                }
                _ => match loop_flow(incoming, label.as_deref())? {
                    LoopFlow::Exit => normal(),
                    LoopFlow::Next => {
                        frame.state = FIRST;
                        Ok(Action::Tick)
                    }
                },
            },
            StmtKind::DoWhile { label, body, cond } => match frame.state {
                FIRST => {
                    frame.state = 2;
                    Ok(push_stmt(frame, *body))
                }
                2 => match loop_flow(incoming, label.as_deref())? {
                    LoopFlow::Exit => normal(),
                    LoopFlow::Next => {
                        frame.state = 3;
                        Ok(Action::Tick)
                    }
                },
                3 => {
                    frame.state = 4;
                    Ok(push_expr(frame, *cond, Want::Value))
                }
                _ => {
                    if !condition(incoming)? {
                        return normal();
                    }
                    frame.state = 2;
                    Ok(push_stmt(frame, *body))
                }
            },
            StmtKind::For {
                label,
                init,
                cond,
                step,
                body,
            } => self.step_for(frame, init, *cond, step, *body, label.as_deref(), incoming),
            StmtKind::Repeat { label, count, body } => match frame.state {
                FIRST => {
                    frame.state = 2;
                    Ok(push_expr(frame, *count, Want::Value))
                }
                2 => {
                    let count = match value(incoming)? {
                        Value::Nan => return Err(ErrorCode::Nan.into()),
                        other => other.as_int().ok_or(ErrorCode::BadNum)?,
                    };
                    frame.values = vec![Value::Int(count)];
                    frame.state = 3;
                    repeat_next(frame, *body)
                }
                3 => repeat_next(frame, *body),
                _ => match loop_flow(incoming, label.as_deref())? {
                    LoopFlow::Exit => normal(),
                    LoopFlow::Next => {
                        frame.state = 3;
                        Ok(Action::Tick)
                    }
                },
            },
            StmtKind::Switch { value: scrutinee, cases, body } => match frame.state {
                FIRST => {
                    frame.state = 2;
                    Ok(push_expr(frame, *scrutinee, Want::Value))
                }
                2 => {
                    let selected = value(incoming)?.as_int().ok_or(ErrorCode::BadType1)?;
                    let case = cases
                        .iter()
                        .find(|c| c.value == Some(selected))
                        .or_else(|| cases.iter().find(|c| c.value.is_none()));
                    let Some(case) = case else {
                        return normal();
                    };
                    frame.cursor = case.start;
                    frame.state = 3;
                    switch_next(frame, body)
                }
                _ => match incoming {
                    Some(Completion::Break(None)) => normal(),
                    other => {
                        settle(other)?;
                        switch_next(frame, body)
                    }
                },
            },
            StmtKind::Break(label) => Ok(Action::Complete(Completion::Break(label.clone()))),
            StmtKind::Continue(label) => Ok(Action::Complete(Completion::Continue(label.clone()))),
            StmtKind::Return(None) => Ok(Action::Complete(Completion::Return(Value::Void))),
            StmtKind::Return(Some(expr)) => {
                if frame.state == FIRST {
                    frame.state = 2;
                    return Ok(push_expr(frame, *expr, Want::Value));
                }
                let result = value(incoming)?;
                let ret = self
                    .activation(frame)?
                    .func
                    .map(|func| module.function(func).ret.clone())
                    .ok_or(ErrorCode::NoRun)?;
                let result = convert(result, type_of(&module, *expr), &ret)?;
                Ok(Action::Complete(Completion::Return(result)))
            }
            StmtKind::Throw(expr) => {
                if frame.state == FIRST {
                    frame.state = 2;
                    return Ok(push_expr(frame, *expr, Want::Value));
                }
                let code = value(incoming)?.as_int().ok_or(ErrorCode::BadThrow)?;
                let code = i32::try_from(code)
                    .ok()
                    .filter(|code| *code > 0)
                    .ok_or(ErrorCode::BadThrow)?;
                let error = RuntimeError::thrown(code, stmt.span);
                Ok(Action::Complete(Completion::Throw(error)))
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => self.step_try(frame, body, catches, *finally, incoming),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn step_for(
        &mut self,
        frame: &mut Frame,
        init: &[StmtId],
        cond: Option<ExprId>,
        step: &[ExprId],
        body: StmtId,
        label: Option<&str>,
        mut incoming: Option<Completion>,
    ) -> StepResult {
        loop {
            match frame.state {
                // Initializers, one statement at a time.
                FIRST => {
                    settle(incoming.take())?;
                    if let Some(&next) = init.get(frame.cursor as usize) {
                        frame.cursor += 1;
                        return Ok(push_stmt(frame, next));
                    }
                    frame.state = 2;
                }
                // Test.
                2 => {
                    frame.state = 3;
                    if let Some(cond) = cond {
                        return Ok(push_expr(frame, cond, Want::Value));
                    }
                }
                3 => {
                    if incoming.is_some() && !condition(incoming.take())? {
                        return normal();
                    }
                    frame.state = 4;
                    return Ok(push_stmt(frame, body));
                }
                // Body finished.
                4 => match loop_flow(incoming.take(), label)? {
                    LoopFlow::Exit => return normal(),
                    LoopFlow::Next => {
                        frame.cursor = 0;
                        frame.state = 5;
                    }
                },
                // Step expressions, then the next test.
                _ => {
                    if incoming.is_some() {
                        value(incoming.take())?;
                    }
                    if let Some(&next) = step.get(frame.cursor as usize) {
                        frame.cursor += 1;
                        return Ok(push_expr(frame, next, Want::Value));
                    }
                    frame.state = 2;
                    return Ok(Action::Tick);
                }
            }
        }
    }
}

/// Next `repeat` iteration; `values[0]` holds the iterations left.
fn repeat_next(frame: &mut Frame, body: StmtId) -> StepResult {
    let left = frame.values.first().and_then(Value::as_int).unwrap_or(0);
    if left <= 0 {
        return normal();
    }
    frame.values = vec![Value::Int(left - 1)];
    frame.state = 4;
    Ok(push_stmt(frame, body))
}

fn switch_next(frame: &mut Frame, body: &[StmtId]) -> StepResult {
    match body.get(frame.cursor as usize) {
        Some(&next) => {
            frame.cursor += 1;
            Ok(push_stmt(frame, next))
        }
        None => normal(),
    }
}
