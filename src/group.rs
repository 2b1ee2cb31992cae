//! Text groups and user hooks: triggers fire on a sub-pattern's success,
//! injectors validate and possibly truncate the matched text.
//!
//! Hooks fire when their immediate pattern succeeds. Matching never
//! backtracks into a committed match, so a hook fires at most once per
//! position — but if an enclosing pattern later dismatches, the hook's
//! effect is not undone.

use std::sync::{Arc, Mutex, mpsc};

use crate::capture::Token;
use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::pattern::{Node, Pattern};
use crate::position::Position;

/// Hook invoked with the matched text and the position of its start.
pub type TriggerHook = Arc<dyn Fn(&str, Position) -> Result<(), BoxError> + Send + Sync>;

/// Post-match validator: returns how many bytes to accept and whether the
/// match stands.
pub type InjectFn = Arc<dyn Fn(&str) -> (usize, bool) + Send + Sync>;

/// Stores the matched text as an anonymous group.
pub fn g(pat: Pattern) -> Pattern {
    Pattern::new(Node::Group {
        name: String::new(),
        pat,
    })
}

/// Stores the matched text as a named group, overwriting earlier text
/// under the same name.
pub fn ng(name: &str, pat: Pattern) -> Pattern {
    Pattern::new(Node::Group {
        name: name.to_string(),
        pat,
    })
}

/// Passes the matched text and its start position to `hook` when `pat`
/// matches. A hook error aborts the whole run.
pub fn trigger<F>(hook: F, pat: Pattern) -> Pattern
where
    F: Fn(&str, Position) -> Result<(), BoxError> + Send + Sync + 'static,
{
    make_trigger("trigger", hook, pat)
}

/// Stores the matched text into `slot` when `pat` matches.
pub fn save(slot: Arc<Mutex<String>>, pat: Pattern) -> Pattern {
    make_trigger("save", move |span, _| match slot.lock() {
        Ok(mut dst) => {
            *dst = span.to_string();
            Ok(())
        }
        Err(_) => Err("save slot poisoned".into()),
    }, pat)
}

/// Sends the matched text to `dst` when `pat` matches.
pub fn send(dst: mpsc::Sender<String>, pat: Pattern) -> Pattern {
    make_trigger("send", move |span, _| {
        dst.send(span.to_string()).map_err(|e| -> BoxError { e.into() })
    }, pat)
}

/// Sends the matched text to `dst` as a typed [`Token`] when `pat`
/// matches.
pub fn send_token(dst: mpsc::Sender<Token>, tok_type: i32, pat: Pattern) -> Pattern {
    make_trigger("send_token", move |span, position| {
        dst.send(Token {
            tok_type,
            value: span.to_string(),
            position,
        })
        .map_err(|e| -> BoxError { e.into() })
    }, pat)
}

fn make_trigger<F>(label: &str, hook: F, pat: Pattern) -> Pattern
where
    F: Fn(&str, Position) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Pattern::new(Node::Trigger {
        label: label.to_string(),
        hook: Arc::new(hook),
        pat,
    })
}

/// Attaches a validator that inspects the matched text and decides how
/// many of its bytes to accept, or rejects the match outright.
pub fn inject<F>(f: F, pat: Pattern) -> Pattern
where
    F: Fn(&str) -> (usize, bool) + Send + Sync + 'static,
{
    make_inject("inject".to_string(), f, pat)
}

/// Attaches a validator that accepts or rejects the whole matched text.
///
/// Unlike `test`, this is not a predicator: on acceptance the match is
/// consumed.
pub fn check<F>(f: F, pat: Pattern) -> Pattern
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    make_inject(
        "check".to_string(),
        move |s: &str| {
            if f(s) {
                (s.len(), true)
            } else {
                (0, false)
            }
        },
        pat,
    )
}

/// Truncates the matched text to at most `max_runes` characters.
pub fn trunc(max_runes: usize, pat: Pattern) -> Pattern {
    make_inject(
        format!("trunc_{max_runes}"),
        move |s: &str| {
            if max_runes == 0 {
                return (0, true);
            }
            if s.len() < max_runes {
                return (s.len(), true);
            }
            let mut count = 0;
            for (at, _) in s.char_indices() {
                if count >= max_runes {
                    return (at, true);
                }
                count += 1;
            }
            (s.len(), true)
        },
        pat,
    )
}

fn make_inject<F>(label: String, f: F, pat: Pattern) -> Pattern
where
    F: Fn(&str) -> (usize, bool) + Send + Sync + 'static,
{
    Pattern::new(Node::Inject {
        label,
        inject: Arc::new(f),
        pat,
    })
}

// ─── Steps ──────────────────────────────────────────────────────────────

pub(crate) fn step_group(name: &str, pat: &Pattern, ctx: &mut Context<'_>) -> Result<(), Error> {
    if !ctx.just_returned() {
        return ctx.call(pat);
    }
    if !ctx.ret.ok {
        return ctx.predicates(false);
    }
    let n = ctx.ret.n;
    ctx.consume(n);
    ctx.group(name);
    ctx.commit()
}

pub(crate) fn step_trigger(
    hook: &TriggerHook,
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
    hook(ctx.span(), head).map_err(Error::Hook)?;
    ctx.commit()
}

pub(crate) fn step_inject(
    inject: &InjectFn,
    pat: &Pattern,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    if !ctx.just_returned() {
        return ctx.call(pat);
    }
    if ctx.ret.ok {
        let n = ctx.ret.n;
        if let Some(matched) = ctx.next_str(n) {
            let (accept, ok) = inject(matched);
            if ok {
                ctx.consume(accept);
                return ctx.commit();
            }
        }
    }
    ctx.predicates(false)
}
