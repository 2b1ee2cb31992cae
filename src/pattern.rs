//! The pattern tree and its single `step` operation.
//!
//! A [`Pattern`] is an immutable, cheaply clonable handle to a node tree.
//! Nodes hold no matching state; stepping a node mutates the engine
//! context into one of the four yield states (call, execute, return,
//! error) and returns, so the engine loop in [`crate::context`] can drive
//! arbitrarily deep grammars without host recursion.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::capture::{NonTerminalConstructor, TerminalConstructor};
use crate::char_class::{self, UnicodeClasses, rune_ranges_have, rune_set_has};
use crate::combine;
use crate::context::Context;
use crate::error::Error;
use crate::grammar;
use crate::group::{self, InjectFn, TriggerHook};
use crate::predicate;
use crate::prefix_tree::PrefixTree;
use crate::text;

/// An immutable pattern, shareable across concurrent match runs.
#[derive(Clone)]
pub struct Pattern(Arc<Node>);

pub(crate) enum Node {
    // Anchors and rune matchers.
    Bool(bool),
    Abort(String),
    LineStart,
    LineEnd,
    InputEnd,
    AnyRune,
    RuneSet {
        negated: bool,
        runes: Vec<char>,
    },
    RuneRanges {
        negated: bool,
        ranges: Vec<(char, char)>,
    },
    UnicodeClasses(UnicodeClasses),
    UnicodeIncludeExclude {
        include: UnicodeClasses,
        exclude: UnicodeClasses,
    },

    // Text matchers.
    Text {
        fold: bool,
        text: String,
    },
    BackText {
        text: String,
    },
    TextSet {
        fold: bool,
        sorted: Vec<String>,
        tree: PrefixTree,
    },
    RefText {
        name: String,
    },
    RefBack {
        name: String,
    },

    // Combinators.
    Seq(Vec<Pattern>),
    Alt(Vec<Pattern>),
    Skip(usize),
    Until {
        consume: bool,
        pat: Pattern,
    },
    RepeatAtLeast {
        min: usize,
        pat: Pattern,
    },
    RepeatOptional(Pattern),
    RepeatRange {
        min: usize,
        max: usize,
        pat: Pattern,
    },

    // Predicators and branches.
    Predicate {
        negated: bool,
        pat: Pattern,
    },
    AllOf(Vec<Pattern>),
    AnyOf(Vec<Pattern>),
    Branch {
        cond: Pattern,
        yes: Pattern,
        no: Pattern,
    },
    Switch {
        cases: Vec<(Pattern, Pattern)>,
        otherwise: Pattern,
    },

    // Groups and hooks.
    Group {
        name: String,
        pat: Pattern,
    },
    Trigger {
        label: String,
        hook: TriggerHook,
        pat: Pattern,
    },
    Inject {
        label: String,
        inject: InjectFn,
        pat: Pattern,
    },

    // Grammar and capturing.
    Scope {
        vars: Arc<HashMap<String, Pattern>>,
        entry: Pattern,
    },
    Var {
        name: String,
        cons: Option<NonTerminalConstructor>,
    },
    CaptureToken {
        tok_type: i32,
        pat: Pattern,
    },
    CaptureTerminal {
        cons: TerminalConstructor,
        pat: Pattern,
    },
    CaptureNonTerminal {
        cons: NonTerminalConstructor,
        pat: Pattern,
    },
}

impl Pattern {
    pub(crate) fn new(node: Node) -> Self {
        Self(Arc::new(node))
    }

    pub(crate) fn node(&self) -> &Node {
        &self.0
    }

    /// Run one step of this pattern against the engine context.
    pub(crate) fn step(&self, ctx: &mut Context<'_>) -> Result<(), Error> {
        match self.node() {
            Node::Bool(ok) => ctx.predicates(*ok),
            Node::Abort(msg) => predicate::step_abort(msg, ctx),
            Node::LineStart => predicate::step_line_anchor(true, ctx),
            Node::LineEnd => predicate::step_line_anchor(false, ctx),
            Node::InputEnd => predicate::step_eof(ctx),

            Node::AnyRune => char_class::step_rune_class(ctx, |_| true),
            Node::RuneSet { negated, runes } => {
                char_class::step_rune_class(ctx, |c| rune_set_has(runes, *negated, c))
            }
            Node::RuneRanges { negated, ranges } => {
                char_class::step_rune_class(ctx, |c| rune_ranges_have(ranges, *negated, c))
            }
            Node::UnicodeClasses(classes) => {
                char_class::step_rune_class(ctx, |c| classes.has(c))
            }
            Node::UnicodeIncludeExclude { include, exclude } => {
                char_class::step_rune_class(ctx, |c| include.has(c) && exclude.has(c))
            }

            Node::Text { fold, text } => text::step_text(*fold, text, ctx),
            Node::BackText { text } => text::step_back_text(text, ctx),
            Node::TextSet { fold, tree, .. } => text::step_text_set(*fold, tree, ctx),
            Node::RefText { name } => text::step_ref_text(name, ctx),
            Node::RefBack { name } => text::step_ref_back(name, ctx),

            Node::Seq(pats) => combine::step_seq(pats, ctx),
            Node::Alt(pats) => combine::step_alt(pats, ctx),
            Node::Skip(n_runes) => combine::step_skip(*n_runes, ctx),
            Node::Until { consume, pat } => combine::step_until(*consume, pat, ctx),
            Node::RepeatAtLeast { min, pat } => combine::step_repeat_at_least(*min, pat, ctx),
            Node::RepeatOptional(pat) => combine::step_repeat_optional(pat, ctx),
            Node::RepeatRange { min, max, pat } => {
                combine::step_repeat_range(*min, *max, pat, ctx)
            }

            Node::Predicate { negated, pat } => predicate::step_predicate(*negated, pat, ctx),
            Node::AllOf(pats) => predicate::step_all_of(pats, ctx),
            Node::AnyOf(pats) => predicate::step_any_of(pats, ctx),
            Node::Branch { cond, yes, no } => predicate::step_branch(cond, yes, no, ctx),
            Node::Switch { cases, otherwise } => predicate::step_switch(cases, otherwise, ctx),

            Node::Group { name, pat } => group::step_group(name, pat, ctx),
            Node::Trigger { hook, pat, .. } => group::step_trigger(hook, pat, ctx),
            Node::Inject { inject, pat, .. } => group::step_inject(inject, pat, ctx),

            Node::Scope { vars, entry } => grammar::step_scope(vars, entry, ctx),
            Node::Var { name, cons } => grammar::step_var(name, cons.as_ref(), ctx),
            Node::CaptureToken { tok_type, pat } => {
                grammar::step_capture_token(*tok_type, pat, ctx)
            }
            Node::CaptureTerminal { cons, pat } => {
                grammar::step_capture_terminal(cons, pat, ctx)
            }
            Node::CaptureNonTerminal { cons, pat } => {
                grammar::step_capture_non_terminal(cons, pat, ctx)
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Bool(true) => write!(f, "true"),
            Node::Bool(false) => write!(f, "false"),
            Node::Abort(msg) => write!(f, "abort({msg:?})"),
            Node::LineStart => write!(f, "sol?"),
            Node::LineEnd => write!(f, "eol?"),
            Node::InputEnd => write!(f, "eof?"),

            Node::AnyRune => write!(f, "#."),
            Node::RuneSet { negated, runes } => {
                let set: String = runes.iter().collect();
                if *negated {
                    write!(f, "#-{set:?}")
                } else {
                    write!(f, "#{set:?}")
                }
            }
            Node::RuneRanges { negated, ranges } => {
                let sep = if *negated { "-" } else { "+" };
                let body = ranges
                    .iter()
                    .map(|(low, high)| format!("{low:?}..{high:?}"))
                    .join(sep);
                if *negated {
                    write!(f, "#<-{body}>")
                } else {
                    write!(f, "#<{body}>")
                }
            }
            Node::UnicodeClasses(classes) => {
                if classes.negated {
                    write!(f, "#[-{}]", classes.names.iter().join("-"))
                } else {
                    write!(f, "#[{}]", classes.names.iter().join("+"))
                }
            }
            Node::UnicodeIncludeExclude { include, exclude } => write!(
                f,
                "#[{}-{}]",
                include.names.iter().join("+"),
                exclude.names.iter().join("-")
            ),

            Node::Text { fold, text } => {
                if *fold {
                    write!(f, "I{text:?}")
                } else {
                    write!(f, "{text:?}")
                }
            }
            Node::BackText { text } => write!(f, "back? {text:?}"),
            Node::TextSet { fold, sorted, .. } => {
                let prefix = if *fold { "I" } else { "" };
                write!(
                    f,
                    "({})",
                    sorted.iter().map(|s| format!("{prefix}{s:?}")).join("|")
                )
            }
            Node::RefText { name } => {
                if name.is_empty() {
                    write!(f, "%%")
                } else {
                    write!(f, "%{name:?}%")
                }
            }
            Node::RefBack { name } => {
                if name.is_empty() {
                    write!(f, "back? %%")
                } else {
                    write!(f, "back? %{name:?}%")
                }
            }

            Node::Seq(pats) => write!(f, "({})", pats.iter().join(" ")),
            Node::Alt(pats) => write!(f, "({})", pats.iter().join(" | ")),
            Node::Skip(n_runes) => write!(f, "skip({n_runes})"),
            Node::Until { consume, pat } => {
                if *consume {
                    write!(f, "until_end({pat})")
                } else {
                    write!(f, "until({pat})")
                }
            }
            Node::RepeatAtLeast { min, pat } => match min {
                0 => write!(f, "{pat} *"),
                1 => write!(f, "{pat} +"),
                _ => write!(f, "{pat} <{min}..>"),
            },
            Node::RepeatOptional(pat) => write!(f, "[ {pat} ]"),
            Node::RepeatRange { min, max, pat } => {
                if min == max {
                    write!(f, "{pat} <{min}>")
                } else {
                    write!(f, "{pat} <{min}..{max}>")
                }
            }

            Node::Predicate { negated, pat } => {
                if *negated {
                    write!(f, "!{pat}")
                } else {
                    write!(f, "?{pat}")
                }
            }
            Node::AllOf(pats) => write!(f, "({})", pats.iter().join(" && ")),
            Node::AnyOf(pats) => write!(f, "({})", pats.iter().join(" || ")),
            Node::Branch { cond, yes, no } => {
                if matches!(no.node(), Node::Bool(false)) {
                    write!(f, "switch({cond}: {yes})")
                } else {
                    write!(f, "switch({cond}: {yes}; {no})")
                }
            }
            Node::Switch { cases, otherwise } => {
                let body = cases
                    .iter()
                    .map(|(cond, then)| format!("{cond}: {then}"))
                    .join("; ");
                if matches!(otherwise.node(), Node::Bool(false)) {
                    write!(f, "switch({body})")
                } else {
                    write!(f, "switch({body}; {otherwise})")
                }
            }

            Node::Group { name, pat } => {
                if name.is_empty() {
                    write!(f, "{{{pat}}}")
                } else {
                    write!(f, "%{name}%{{{pat}}}")
                }
            }
            Node::Trigger { label, pat, .. } => write!(f, "{label}({pat})"),
            Node::Inject { label, pat, .. } => write!(f, "{label}({pat})"),

            Node::Scope { vars, entry } => {
                let bindings = vars
                    .iter()
                    .sorted_by(|a, b| a.0.cmp(b.0))
                    .map(|(name, value)| format!("${name} := {value}"))
                    .join("; ");
                write!(f, "let ({bindings}) in {entry}")
            }
            Node::Var { name, cons } => {
                if cons.is_some() {
                    write!(f, "${{{name}}}")
                } else {
                    write!(f, "${name}")
                }
            }
            Node::CaptureToken { tok_type, pat } => write!(f, "token_{tok_type}{{{pat}}}"),
            Node::CaptureTerminal { pat, .. } => write!(f, "term{{{pat}}}"),
            Node::CaptureNonTerminal { pat, .. } => write!(f, "cons{{{pat}}}"),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
