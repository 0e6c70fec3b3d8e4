//! `try` / `catch` / `finally`.
//!
//! The body runs one statement at a time. After each statement that
//! completes normally, every `catch (bool)` condition is polled and the
//! first one that holds diverts to its handler. An exception from the body
//! is matched against the clauses in order: `catch (int)` by code,
//! `catch (bool)` when the condition holds.
//!
//! Whatever ends the body or the handler (normal end, `break`, `continue`,
//! `return` or an exception) is parked in `frame.pending` while `finally`
//! runs. If `finally` completes normally the parked completion resumes;
//! otherwise the completion of `finally` replaces it.

use cbot_diagnostic::ErrorCode;
use cbot_ir::{CatchClause, CatchKind, StmtId};
use cbot_value::ops;

use super::{push_expr, push_stmt, Action, StepResult};
use crate::completion::value;
use crate::{Completion, Frame, Machine, Want};

const BODY: u32 = 1;
const POLL: u32 = 2;
const POLL_RESULT: u32 = 3;
const MATCH: u32 = 4;
const MATCH_RESULT: u32 = 5;
const HANDLER: u32 = 6;
const HANDLER_DONE: u32 = 7;
const FINALLY: u32 = 8;
const FINALLY_DONE: u32 = 9;
pub(super) const TRY_MAX: u32 = FINALLY_DONE;

impl Machine {
    /// `cursor` is the next body statement, `aux` the catch clause under test.
    pub(super) fn step_try(
        &mut self,
        frame: &mut Frame,
        body: &[StmtId],
        catches: &[CatchClause],
        finally: Option<StmtId>,
        mut incoming: Option<Completion>,
    ) -> StepResult {
        loop {
            match frame.state {
                BODY => match incoming.take() {
                    Some(Completion::Throw(error)) => {
                        frame.pending = Some(Completion::Throw(error));
                        frame.aux = 0;
                        frame.state = MATCH;
                    }
                    Some(abrupt) if abrupt.is_abrupt() => {
                        frame.pending = Some(abrupt);
                        frame.state = FINALLY;
                    }
                    Some(_) if catches.iter().any(|c| c.kind == CatchKind::Condition) => {
                        frame.aux = 0;
                        frame.state = POLL;
                    }
                    _ => {
                        if let Some(&next) = body.get(frame.cursor as usize) {
                            frame.cursor += 1;
                            return Ok(push_stmt(frame, next));
                        }
                        frame.pending = Some(Completion::Normal);
                        frame.state = FINALLY;
                    }
                },
                POLL => {
                    let next = catches
                        .iter()
                        .enumerate()
                        .skip(frame.aux as usize)
                        .find(|(_, c)| c.kind == CatchKind::Condition);
                    match next {
                        Some((index, clause)) => {
                            frame.aux = index as u32;
                            frame.state = POLL_RESULT;
                            return Ok(push_expr(frame, clause.cond, Want::Value));
                        }
                        // No condition holds: on with the body.
                        None => frame.state = BODY,
                    }
                }
                POLL_RESULT => match incoming.take() {
                    Some(Completion::Throw(error)) => {
                        frame.pending = Some(Completion::Throw(error));
                        frame.aux = 0;
                        frame.state = MATCH;
                    }
                    other => {
                        if ops::truthy(&value(other)?)? {
                            frame.pending = None;
                            frame.state = HANDLER;
                        } else {
                            frame.aux += 1;
                            frame.state = POLL;
                        }
                    }
                },
                MATCH => {
                    let Some(clause) = catches.get(frame.aux as usize) else {
                        frame.state = FINALLY;
                        continue;
                    };
                    frame.state = MATCH_RESULT;
                    return Ok(push_expr(frame, clause.cond, Want::Value));
                }
                MATCH_RESULT => match incoming.take() {
                    // A failing catch condition replaces the exception.
                    Some(Completion::Throw(error)) => {
                        frame.pending = Some(Completion::Throw(error));
                        frame.state = FINALLY;
                    }
                    other => {
                        let clause = catches.get(frame.aux as usize).ok_or(ErrorCode::NoRun)?;
                        let tested = value(other)?;
                        let matched = match clause.kind {
                            CatchKind::Code => match &frame.pending {
                                Some(Completion::Throw(error)) => {
                                    tested.as_int() == Some(i64::from(error.code))
                                }
                                _ => false,
                            },
                            CatchKind::Condition => ops::truthy(&tested)?,
                        };
                        if matched {
                            frame.pending = None;
                            frame.state = HANDLER;
                        } else {
                            frame.aux += 1;
                            frame.state = MATCH;
                        }
                    }
                },
                HANDLER => {
                    let clause = catches.get(frame.aux as usize).ok_or(ErrorCode::NoRun)?;
                    frame.state = HANDLER_DONE;
                    return Ok(push_stmt(frame, clause.body));
                }
                HANDLER_DONE => {
                    let done = match incoming.take() {
                        Some(abrupt) if abrupt.is_abrupt() => abrupt,
                        _ => Completion::Normal,
                    };
                    frame.pending = Some(done);
                    frame.state = FINALLY;
                }
                FINALLY => {
                    if let Some(finally) = finally {
                        frame.state = FINALLY_DONE;
                        return Ok(push_stmt(frame, finally));
                    }
                    let done = frame.pending.take().unwrap_or(Completion::Normal);
                    return Ok(Action::Complete(done));
                }
                _ => {
                    let done = match incoming.take() {
                        Some(abrupt) if abrupt.is_abrupt() => abrupt,
                        _ => frame.pending.take().unwrap_or(Completion::Normal),
                    };
                    return Ok(Action::Complete(done));
                }
            }
        }
    }
}
