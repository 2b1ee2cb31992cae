//! Grammar scopes, rule variables and parse-tree capturing.
//!
//! `let_in` binds named rules for the duration of its entry pattern;
//! rules may recurse freely (bounded by the callstack limit) and inner
//! scopes shadow outer ones. An undefined variable is an error only when
//! dereferenced.

use std::collections::HashMap;
use std::sync::Arc;

use crate::capture::{Capture, NonTerminalConstructor, TerminalConstructor, Token, Variable};
use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::pattern::{Node, Pattern};
use crate::position::Position;

/// Binds rule definitions for `entry` and its descendants.
pub fn let_in<I, K>(bindings: I, entry: Pattern) -> Pattern
where
    I: IntoIterator<Item = (K, Pattern)>,
    K: Into<String>,
{
    let vars: HashMap<String, Pattern> = bindings
        .into_iter()
        .map(|(name, pat)| (name.into(), pat))
        .collect();
    Pattern::new(Node::Scope {
        vars: Arc::new(vars),
        entry,
    })
}

/// Invokes a bound rule without capturing.
pub fn v(name: &str) -> Pattern {
    Pattern::new(Node::Var {
        name: name.to_string(),
        cons: None,
    })
}

/// Invokes a bound rule, collecting its captures into a [`Variable`]
/// non-terminal named after the rule.
pub fn cv(name: &str) -> Pattern {
    Pattern::new(Node::Var {
        name: name.to_string(),
        cons: Some(variable_constructor(name)),
    })
}

/// Captures the matched text as a [`Token`] terminal of the given type.
pub fn ck(tok_type: i32, pat: Pattern) -> Pattern {
    Pattern::new(Node::CaptureToken { tok_type, pat })
}

/// Captures through a user terminal constructor, invoked with the
/// matched text and its start position.
pub fn ct<F>(cons: F, pat: Pattern) -> Pattern
where
    F: Fn(&str, Position) -> Result<Box<dyn Capture>, BoxError> + Send + Sync + 'static,
{
    Pattern::new(Node::CaptureTerminal {
        cons: Arc::new(cons),
        pat,
    })
}

/// Captures through a user non-terminal constructor, invoked with the
/// captures collected while `pat` matched.
pub fn cc<F>(cons: F, pat: Pattern) -> Pattern
where
    F: Fn(Vec<Box<dyn Capture>>) -> Result<Box<dyn Capture>, BoxError> + Send + Sync + 'static,
{
    Pattern::new(Node::CaptureNonTerminal {
        cons: Arc::new(cons),
        pat,
    })
}

fn variable_constructor(name: &str) -> NonTerminalConstructor {
    let name = name.to_string();
    Arc::new(move |subs| {
        Ok(Box::new(Variable {
            name: name.clone(),
            subs,
        }) as Box<dyn Capture>)
    })
}

// ─── Steps ──────────────────────────────────────────────────────────────

pub(crate) fn step_scope(
    vars: &Arc<HashMap<String, Pattern>>,
    entry: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        ctx.enter(vars.clone());
        return ctx.call(entry);
    }
    let ret = ctx.ret.clone();
    ctx.leave();
    ctx.returns(ret)
}

pub(crate) fn step_var(
    name: &str,
    cons: Option<&NonTerminalConstructor>,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        let Some(callee) = ctx.lookup(name) else {
            return Err(Error::UndefinedVariable(name.to_string()));
        };
        return match cons {
            // Plain invocation is a tail call.
            None => ctx.execute(&callee),
            Some(cons) => {
                ctx.begin(cons.clone());
                ctx.call(&callee)
            }
        };
    }

    let ret = ctx.ret.clone();
    ctx.end(ret.ok)?;
    ctx.returns(ret)
}

pub(crate) fn step_capture_token(
    tok_type: i32,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        return ctx.call(pat);
    }
    if !ctx.ret.ok {
        return ctx.predicates(false);
    }
    let head = ctx.tell();
    let n = ctx.ret.n;
    ctx.consume(n);
    let token = Token {
        tok_type,
        value: ctx.span().to_string(),
        position: head,
    };
    ctx.push_capture(Box::new(token))?;
    ctx.commit()
}

pub(crate) fn step_capture_terminal(
    cons: &TerminalConstructor,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        return ctx.call(pat);
    }
    if !ctx.ret.ok {
        return ctx.predicates(false);
    }
    let head = ctx.tell();
    let n = ctx.ret.n;
    ctx.consume(n);
    let term = cons(ctx.span(), head).map_err(Error::Hook)?;
    ctx.push_capture(term)?;
    ctx.commit()
}

pub(crate) fn step_capture_non_terminal(
    cons: &NonTerminalConstructor,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        ctx.begin(cons.clone());
        return ctx.call(pat);
    }
    let ret = ctx.ret.clone();
    ctx.end(ret.ok)?;
    ctx.returns(ret)
}
