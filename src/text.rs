//! Text matchers: literals, case-insensitive literals, text sets and
//! group references.

use crate::combine::{alt, seq};
use crate::context::Context;
use crate::error::Error;
use crate::fold::{UNSAFE_FOLD_ORBITS, fold_bytes, fold_str, is_fold_safe};
use crate::pattern::{Node, Pattern};
use crate::predicate::{always, never};
use crate::prefix_tree::{PrefixTree, build_prefix_tree};

/// Matches `text` literally.
pub fn t(text: &str) -> Pattern {
    if text.is_empty() {
        return always();
    }
    Pattern::new(Node::Text {
        fold: false,
        text: text.to_string(),
    })
}

/// Matches `text` case-insensitively.
///
/// Characters whose case fold changes the encoded length compile to
/// character sets over their whole case orbit; everything else compiles
/// to folded literal runs.
pub fn ti(text: &str) -> Pattern {
    let mut pats = Vec::new();
    let mut span_start = 0;
    for (at, c) in text.char_indices() {
        if let Some(&orbit) = UNSAFE_FOLD_ORBITS.get(&c) {
            if at > span_start {
                pats.push(folded_text(&text[span_start..at]));
            }
            pats.push(crate::char_class::s(orbit));
            span_start = at + c.len_utf8();
        }
    }
    if span_start < text.len() {
        pats.push(folded_text(&text[span_start..]));
    }

    match pats.len() {
        0 => always(),
        1 => pats.swap_remove(0),
        _ => seq(pats),
    }
}

fn folded_text(text: &str) -> Pattern {
    Pattern::new(Node::Text {
        fold: true,
        text: fold_str(text),
    })
}

/// Predicates that `text` ends immediately before the cursor. Consumes
/// nothing.
pub fn back(text: &str) -> Pattern {
    if text.is_empty() {
        return always();
    }
    Pattern::new(Node::BackText {
        text: text.to_string(),
    })
}

/// Matches the longest member of `texts` found at the cursor.
pub fn ts<I, S>(texts: I) -> Pattern
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    make_text_set(false, texts.into_iter().map(Into::into).collect())
}

/// Matches members of `texts` case-insensitively, longest first.
pub fn tsi<I, S>(texts: I) -> Pattern
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut safe = Vec::new();
    let mut unsafe_texts = Vec::new();
    for text in texts {
        let text = text.into();
        if is_fold_safe(&text) {
            safe.push(text);
        } else {
            unsafe_texts.push(text);
        }
    }

    let tail = if safe.is_empty() {
        None
    } else {
        Some(make_text_set(true, safe))
    };
    if unsafe_texts.is_empty() {
        return match tail {
            Some(tail) => tail,
            None => never(),
        };
    }

    // Longer alternatives must come first: ordered choice takes the first
    // match, not the longest.
    unsafe_texts.sort();
    let mut pats: Vec<Pattern> = unsafe_texts.iter().rev().map(|text| ti(text)).collect();
    if let Some(tail) = tail {
        pats.push(tail);
    }
    alt(pats)
}

fn make_text_set(fold: bool, mut texts: Vec<String>) -> Pattern {
    if fold {
        for text in &mut texts {
            *text = fold_str(text);
        }
    }
    texts.sort();
    let bytes: Vec<Vec<u8>> = texts.iter().map(|s| s.as_bytes().to_vec()).collect();
    Pattern::new(Node::TextSet {
        fold,
        sorted: texts,
        tree: build_prefix_tree(&bytes),
    })
}

/// Matches the text most recently stored in the named group (or in the
/// anonymous groups when `name` is empty).
pub fn refer(name: &str) -> Pattern {
    Pattern::new(Node::RefText {
        name: name.to_string(),
    })
}

/// Predicates that the referenced group's text ends immediately before
/// the cursor. Consumes nothing.
pub fn refer_back(name: &str) -> Pattern {
    Pattern::new(Node::RefBack {
        name: name.to_string(),
    })
}

// ─── Steps ──────────────────────────────────────────────────────────────

pub(crate) fn step_text(fold: bool, text: &str, ctx: &mut Context<'_>) -> Result<(), Error> {
    let ahead = ctx.next_bytes(text.len());
    let matched = if fold {
        fold_bytes(ahead) == text.as_bytes()
    } else {
        ahead == text.as_bytes()
    };
    if matched {
        ctx.consume(text.len());
        ctx.commit()
    } else {
        ctx.predicates(false)
    }
}

pub(crate) fn step_back_text(text: &str, ctx: &mut Context<'_>) -> Result<(), Error> {
    let ok = ctx.prev_bytes(text.len()) == text.as_bytes();
    ctx.predicates(ok)
}

pub(crate) fn step_text_set(
    fold: bool,
    tree: &PrefixTree,
    ctx: &mut Context<'_>,
) -> Result<(), Error> {
    let mut stack: Vec<(usize, &PrefixTree)> = vec![(0, tree)];
    let mut back = false;
    while let Some(&(n, node)) = stack.last() {
        if back {
            stack.pop();
            if node.term {
                ctx.consume(n);
                return ctx.commit();
            }
            continue;
        }

        let key = &ctx.next_bytes(n + node.width)[n..];
        let folded;
        let key: &[u8] = if fold {
            folded = fold_bytes(key);
            &folded
        } else {
            key
        };
        match node.search(key) {
            Some(i) => stack.push((n + node.width, &node.subs[i])),
            None => back = true,
        }
    }
    ctx.predicates(false)
}

pub(crate) fn step_ref_text(name: &str, ctx: &mut Context<'_>) -> Result<(), Error> {
    let text = ctx.refer(name);
    if ctx.next_bytes(text.len()) == text.as_bytes() {
        ctx.consume(text.len());
        ctx.commit()
    } else {
        ctx.predicates(false)
    }
}

pub(crate) fn step_ref_back(name: &str, ctx: &mut Context<'_>) -> Result<(), Error> {
    let text = ctx.refer(name);
    let ok = ctx.prev_bytes(text.len()) == text.as_bytes();
    ctx.predicates(ok)
}
