//! Predicators, anchors and branches. Everything here consumes no text.
//!
//! Predicators that report success do *not* discard the groups or parse
//! captures their sub-pattern produced; lookahead is allowed to have
//! visible side effects.

use crate::context::Context;
use crate::error::Error;
use crate::pattern::{Node, Pattern};

/// Always matches, consuming nothing.
pub fn always() -> Pattern {
    Pattern::new(Node::Bool(true))
}

/// Never matches.
pub fn never() -> Pattern {
    Pattern::new(Node::Bool(false))
}

/// Aborts the whole run with a message when reached.
pub fn abort(msg: &str) -> Pattern {
    Pattern::new(Node::Abort(msg.to_string()))
}

/// Predicates start of line: offset zero or just after a line break.
pub fn sol() -> Pattern {
    Pattern::new(Node::LineStart)
}

/// Predicates end of line: end of input or just before a line break.
pub fn eol() -> Pattern {
    Pattern::new(Node::LineEnd)
}

/// Predicates end of input.
pub fn eof() -> Pattern {
    Pattern::new(Node::InputEnd)
}

/// Predicates that `pat` matches here, consuming nothing.
pub fn test(pat: Pattern) -> Pattern {
    Pattern::new(Node::Predicate {
        negated: false,
        pat,
    })
}

/// Predicates that `pat` dismatches here, consuming nothing.
pub fn not(pat: Pattern) -> Pattern {
    Pattern::new(Node::Predicate { negated: true, pat })
}

/// Predicates that every pattern matches at the current position.
///
/// `and([])` is equivalent to [`always`].
pub fn and<I>(pats: I) -> Pattern
where
    I: IntoIterator<Item = Pattern>,
{
    let pats: Vec<Pattern> = pats.into_iter().collect();
    if pats.is_empty() {
        return always();
    }
    Pattern::new(Node::AllOf(pats))
}

/// Predicates that some pattern matches at the current position.
///
/// `or([])` is equivalent to [`never`].
pub fn or<I>(pats: I) -> Pattern
where
    I: IntoIterator<Item = Pattern>,
{
    let pats: Vec<Pattern> = pats.into_iter().collect();
    if pats.is_empty() {
        return never();
    }
    Pattern::new(Node::AnyOf(pats))
}

/// Tests `cond` without consuming, then matches `then` or predicates
/// false.
pub fn when(cond: Pattern, then: Pattern) -> Pattern {
    Pattern::new(Node::Branch {
        cond,
        yes: then,
        no: never(),
    })
}

/// Tests `cond` without consuming, then matches `yes` or `no`.
pub fn if_else(cond: Pattern, yes: Pattern, no: Pattern) -> Pattern {
    Pattern::new(Node::Branch { cond, yes, no })
}

/// Tests the conditions in order and matches the branch of the first
/// that holds; matches empty when none does.
pub fn switch<I>(cases: I) -> Pattern
where
    I: IntoIterator<Item = (Pattern, Pattern)>,
{
    switch_else(cases, always())
}

/// Like [`switch`], with an explicit fallback branch.
pub fn switch_else<I>(cases: I, otherwise: Pattern) -> Pattern
where
    I: IntoIterator<Item = (Pattern, Pattern)>,
{
    Pattern::new(Node::Switch {
        cases: cases.into_iter().collect(),
        otherwise,
    })
}

// ─── Steps ──────────────────────────────────────────────────────────────

pub(crate) fn step_abort(msg: &str, ctx: &mut Context<'_>) -> Result<(), Error> {
    Err(Error::Aborted {
        message: msg.to_string(),
        position: ctx.tell(),
    })
}

pub(crate) fn step_line_anchor(line_start: bool, ctx: &mut Context<'_>) -> Result<(), Error> {
    let prev = ctx.prev_bytes(1).first().copied();
    let next = ctx.next_bytes(1).first().copied();

    let ok = if line_start {
        // Start of input, or just after "\n" | "\r" | "\r\n".
        match prev {
            None => true,
            Some(b'\n') => true,
            Some(b'\r') => next != Some(b'\n'),
            Some(_) => false,
        }
    } else {
        // End of input, or just before "\n" | "\r" | "\r\n".
        match next {
            None => true,
            Some(b'\r') => true,
            Some(b'\n') => prev != Some(b'\r'),
            Some(_) => false,
        }
    };
    ctx.predicates(ok)
}

pub(crate) fn step_eof(ctx: &mut Context<'_>) -> Result<(), Error> {
    let ok = ctx.next_bytes(1).is_empty();
    ctx.predicates(ok)
}

pub(crate) fn step_predicate(
    negated: bool,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        return ctx.call(pat);
    }
    let ok = ctx.ret.ok != negated;
    ctx.predicates(ok)
}

pub(crate) fn step_all_of(pats: &[Pattern], ctx: &mut Context<'_>) -> Result<(), Error> {
    while ctx.locals.i < pats.len() {
        if !ctx.just_returned() {
            return ctx.call(&pats[ctx.locals.i]);
        }
        if !ctx.ret.ok {
            return ctx.predicates(false);
        }
        ctx.locals.i += 1;
    }
    ctx.predicates(true)
}

pub(crate) fn step_any_of(pats: &[Pattern], ctx: &mut Context<'_>) -> Result<(), Error> {
    while ctx.locals.i < pats.len() {
        if !ctx.just_returned() {
            return ctx.call(&pats[ctx.locals.i]);
        }
        if ctx.ret.ok {
            return ctx.predicates(true);
        }
        ctx.locals.i += 1;
    }
    ctx.predicates(false)
}

pub(crate) fn step_branch(
    cond: &Pattern,
    yes: &Pattern,
    no: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        return ctx.call(cond);
    }
    if ctx.ret.ok {
        ctx.execute(yes)
    } else {
        ctx.execute(no)
    }
}

pub(crate) fn step_switch(
    cases: &[(Pattern, Pattern)],
    otherwise: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    while ctx.locals.i < cases.len() {
        if !ctx.just_returned() {
            return ctx.call(&cases[ctx.locals.i].0);
        }
        if ctx.ret.ok {
            return ctx.execute(&cases[ctx.locals.i].1);
        }
        ctx.locals.i += 1;
    }
    ctx.execute(otherwise)
}
