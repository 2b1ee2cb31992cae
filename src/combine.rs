//! Combinators: sequences, ordered choice, repetition qualifiers,
//! bounded skips, scanning and the separated-item helpers.

use crate::context::Context;
use crate::error::Error;
use crate::pattern::{Node, Pattern};
use crate::predicate::{always, never};

/// Matches the patterns in order; dismatches at the first dismatch.
///
/// `seq([])` is equivalent to [`always`].
pub fn seq<I>(sequence: I) -> Pattern
where
    I: IntoIterator<Item = Pattern>,
{
    let pats: Vec<Pattern> = sequence.into_iter().collect();
    if pats.is_empty() {
        return always();
    }
    Pattern::new(Node::Seq(pats))
}

/// Ordered choice: matches the first choice that matches.
///
/// `alt([])` is equivalent to [`never`]. Put longer alternatives first:
/// `alt([t("match"), t("match more")])` never reaches the second branch.
pub fn alt<I>(choices: I) -> Pattern
where
    I: IntoIterator<Item = Pattern>,
{
    let pats: Vec<Pattern> = choices.into_iter().collect();
    if pats.is_empty() {
        return never();
    }
    Pattern::new(Node::Alt(pats))
}

/// Consumes exactly `n_runes` characters.
pub fn skip(n_runes: usize) -> Pattern {
    Pattern::new(Node::Skip(n_runes))
}

/// Scans forward to the nearest match of `pat`, consuming the scanned
/// text but not the match itself.
pub fn until(pat: Pattern) -> Pattern {
    Pattern::new(Node::Until {
        consume: false,
        pat,
    })
}

/// Scans forward to the nearest match of `pat` and consumes through the
/// end of that match.
pub fn until_end_of(pat: Pattern) -> Pattern {
    Pattern::new(Node::Until { consume: true, pat })
}

/// Matches `pat` repeated any number of times.
pub fn q0(pat: Pattern) -> Pattern {
    Pattern::new(Node::RepeatAtLeast { min: 0, pat })
}

/// Matches `pat` repeated at least once.
pub fn q1(pat: Pattern) -> Pattern {
    Pattern::new(Node::RepeatAtLeast { min: 1, pat })
}

/// Matches `pat` repeated at least `least` times.
pub fn qn(least: usize, pat: Pattern) -> Pattern {
    Pattern::new(Node::RepeatAtLeast { min: least, pat })
}

/// Matches `pat` optionally.
pub fn q01(pat: Pattern) -> Pattern {
    Pattern::new(Node::RepeatOptional(pat))
}

/// Matches `pat` at most `n` times.
pub fn q0n(n: usize, pat: Pattern) -> Pattern {
    match n {
        0 => always(),
        1 => Pattern::new(Node::RepeatOptional(pat)),
        _ => Pattern::new(Node::RepeatRange { min: 0, max: n, pat }),
    }
}

/// Matches `pat` exactly `n` times.
pub fn qnn(n: usize, pat: Pattern) -> Pattern {
    match n {
        0 => always(),
        1 => pat,
        _ => Pattern::new(Node::RepeatRange { min: n, max: n, pat }),
    }
}

/// Matches `pat` repeated `m` to `n` times.
pub fn qmn(m: usize, n: usize, pat: Pattern) -> Pattern {
    let (m, n) = if m > n { (n, m) } else { (m, n) };
    match (m, n) {
        (_, 0) => always(),
        (0, 1) => Pattern::new(Node::RepeatOptional(pat)),
        _ => Pattern::new(Node::RepeatRange { min: m, max: n, pat }),
    }
}

/// Matches any number of `item`s separated by `sep`.
pub fn j0(item: Pattern, sep: Pattern) -> Pattern {
    jn(0, item, sep)
}

/// Matches at least one `item` separated by `sep`.
pub fn j1(item: Pattern, sep: Pattern) -> Pattern {
    jn(1, item, sep)
}

/// Matches at least `n` `item`s separated by `sep`.
pub fn jn(n: usize, item: Pattern, sep: Pattern) -> Pattern {
    if n == 0 {
        return alt([
            seq([item.clone(), q0(seq([sep, item]))]),
            always(),
        ]);
    }
    seq([item.clone(), qn(n - 1, seq([sep, item]))])
}

/// Matches at most `n` `item`s separated by `sep`.
pub fn j0n(n: usize, item: Pattern, sep: Pattern) -> Pattern {
    jmn(0, n, item, sep)
}

/// Matches exactly `n` `item`s separated by `sep`.
pub fn jnn(n: usize, item: Pattern, sep: Pattern) -> Pattern {
    match n {
        0 => always(),
        1 => item,
        _ => seq([item.clone(), qnn(n - 1, seq([sep, item]))]),
    }
}

/// Matches `m` to `n` `item`s separated by `sep`.
pub fn jmn(m: usize, n: usize, item: Pattern, sep: Pattern) -> Pattern {
    let (m, n) = if m > n { (n, m) } else { (m, n) };
    if n == 0 {
        return always();
    }
    if m == 0 {
        return alt([
            seq([item.clone(), qmn(0, n - 1, seq([sep, item]))]),
            always(),
        ]);
    }
    seq([item.clone(), qmn(m - 1, n - 1, seq([sep, item]))])
}

// ─── Steps ──────────────────────────────────────────────────────────────

pub(crate) fn step_seq(pats: &[Pattern], ctx: &mut Context<'_>) -> Result<(), Error> {
    while ctx.locals.i < pats.len() {
        if !ctx.just_returned() {
            return ctx.call(&pats[ctx.locals.i]);
        }
        if !ctx.ret.ok {
            return ctx.predicates(false);
        }
        let n = ctx.ret.n;
        ctx.consume(n);
        ctx.locals.i += 1;
    }
    ctx.commit()
}

pub(crate) fn step_alt(pats: &[Pattern], ctx: &mut Context<'_>) -> Result<(), Error> {
    while ctx.locals.i < pats.len() {
        if !ctx.just_returned() {
            // The last choice is a tail position: nothing is consumed in
            // this frame, so it can replace it outright.
            if ctx.locals.i + 1 == pats.len() {
                return ctx.execute(&pats[ctx.locals.i]);
            }
            return ctx.call(&pats[ctx.locals.i]);
        }
        if ctx.ret.ok {
            let n = ctx.ret.n;
            ctx.consume(n);
            return ctx.commit();
        }
        ctx.locals.i += 1;
    }
    ctx.predicates(false)
}

pub(crate) fn step_skip(n_runes: usize, ctx: &mut Context<'_>) -> Result<(), Error> {
    for _ in 0..n_runes {
        match ctx.read_rune() {
            Some(c) => ctx.consume(c.len_utf8()),
            None => return ctx.predicates(false),
        }
    }
    ctx.commit()
}

pub(crate) fn step_until(
    consume_match: bool,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    loop {
        if ctx.reached_repeat_limit() {
            return Err(Error::RepeatLimitReached);
        }
        if !ctx.just_returned() {
            return ctx.call(pat);
        }
        if ctx.ret.ok {
            if consume_match {
                let n = ctx.ret.n;
                ctx.consume(n);
            }
            return ctx.commit();
        }
        match ctx.read_rune() {
            Some(c) => {
                ctx.consume(c.len_utf8());
                ctx.locals.i += 1;
            }
            None => return ctx.predicates(false),
        }
    }
}

pub(crate) fn step_repeat_at_least(
    min: usize,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    loop {
        if ctx.reached_repeat_limit() {
            return Err(Error::RepeatLimitReached);
        }
        if !ctx.just_returned() {
            return ctx.call(pat);
        }
        if ctx.ret.ok {
            let n = ctx.ret.n;
            ctx.consume(n);
            ctx.locals.i += 1;
            continue;
        }
        if ctx.locals.i < min {
            return ctx.predicates(false);
        }
        return ctx.commit();
    }
}

pub(crate) fn step_repeat_optional(pat: &Pattern, ctx: &mut Context<'_>) -> Result<(), Error> {
    if !ctx.just_returned() {
        return ctx.call(pat);
    }
    if !ctx.ret.ok {
        return ctx.predicates(true);
    }
    let n = ctx.ret.n;
    ctx.consume(n);
    ctx.commit()
}

pub(crate) fn step_repeat_range(
    min: usize,
    max: usize,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    while ctx.locals.i < max {
        if ctx.reached_repeat_limit() {
            return Err(Error::RepeatLimitReached);
        }
        if !ctx.just_returned() {
            return ctx.call(pat);
        }
        if !ctx.ret.ok {
            if ctx.locals.i < min {
                return ctx.predicates(false);
            }
            return ctx.commit();
        }
        let n = ctx.ret.n;
        ctx.consume(n);
        ctx.locals.i += 1;
    }
    ctx.commit()
}
