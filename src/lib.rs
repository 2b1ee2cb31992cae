//! Parsing Expression Grammar combinators with an explicit-stack engine.
//!
//! Patterns are built from a small algebra of constructors and run
//! against a UTF-8 string. Matching is greedy and ordered-choice: a
//! qualifier takes as many repetitions as it can and never gives any
//! back, and `alt` commits to the first matching branch. The engine
//! keeps its own call stack, so deeply recursive grammars cannot
//! overflow the host stack and recursion depth is bounded by
//! configuration instead.
//!
//! # Example
//!
//! ```rust
//! use pegma::{match_text, ng, q1, r, refer, seq, t};
//!
//! // A number, "==", then the same number again (a backreference).
//! let pat = seq([ng("n", q1(r('0', '9'))), t("=="), refer("n")]);
//!
//! let result = match_text(&pat, "42==42").unwrap();
//! assert!(result.ok);
//! assert_eq!(result.n, 6);
//! assert_eq!(result.named_groups["n"], "42");
//!
//! let result = match_text(&pat, "42==43").unwrap();
//! assert!(!result.ok);
//! ```
//!
//! # Common mistakes
//!
//! Greedy qualifiers may starve what follows: in
//! `seq([q0(r('0', '9')), s("02468")])` the qualifier consumes every
//! digit, so the set can never match. Ordered choice makes
//! `alt([t("match"), t("match more")])` stop at `"match"`; put longer
//! alternatives first. Any pattern matching the empty string directly
//! inside `q0`/`q1`/`qn` loops until the repeat limit errors out. And
//! left-recursive grammar rules expand forever, erroring at the
//! callstack limit; keep recursion to the right.

mod capture;
mod char_class;
mod combine;
mod context;
mod error;
mod fold;
mod grammar;
mod group;
mod pattern;
mod position;
mod predicate;
mod prefix_tree;
mod text;

pub mod util;


use std::collections::HashMap;

pub use capture::{Capture, NonTerminalConstructor, TerminalConstructor, Token, Variable};
pub use char_class::{dot, is_unicode_class_name, not_ranges, nr, ns, r, ranges, s, u};
pub use combine::{
    alt, j0, j0n, j1, jmn, jn, jnn, q0, q01, q0n, q1, qmn, qn, qnn, seq, skip, until, until_end_of,
};
pub use error::{BoxError, Error};
pub use grammar::{cc, ck, ct, cv, let_in, v};
pub use group::{InjectFn, TriggerHook, check, g, inject, ng, save, send, send_token, trigger, trunc};
pub use pattern::Pattern;
pub use position::Position;
pub use predicate::{
    abort, always, and, eof, eol, if_else, never, not, or, sol, switch, switch_else, test, when,
};
pub use text::{back, refer, refer_back, t, ti, ts, tsi};

use context::Context;

/// Default bound on call/execute nesting depth.
pub const DEFAULT_CALLSTACK_LIMIT: usize = 500;

/// Default bound on per-pattern repetition counts.
pub const DEFAULT_REPEAT_LIMIT: usize = 500;

/// Matching configuration. Limits of zero mean unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum call/execute nesting depth; zero for unlimited.
    pub callstack_limit: usize,
    /// Maximum repetitions of one qualifier or scan; zero for unlimited.
    pub repeat_limit: usize,
    /// Skip line/column counting; positions carry only byte offsets.
    pub disable_line_column: bool,
    /// Skip group collection; references resolve to empty text.
    pub disable_grouping: bool,
    /// Skip parse-tree capturing.
    pub disable_capturing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            callstack_limit: DEFAULT_CALLSTACK_LIMIT,
            repeat_limit: DEFAULT_REPEAT_LIMIT,
            disable_line_column: false,
            disable_grouping: false,
            disable_capturing: false,
        }
    }
}

/// Everything a match run produced.
///
/// A dismatch is a normal result with `ok == false` and everything else
/// empty; only run errors surface as [`Error`].
#[derive(Debug)]
pub struct MatchResult {
    pub ok: bool,
    /// Bytes matched from the start of the input.
    pub n: usize,
    /// Anonymous group texts, in match order.
    pub groups: Vec<String>,
    /// Named group texts; later stores overwrite earlier ones.
    pub named_groups: HashMap<String, String>,
    /// Top-level parse captures.
    pub captures: Vec<Box<dyn Capture>>,
}

impl Config {
    /// Runs `pat` against `text` under this configuration.
    pub fn match_text(&self, pat: &Pattern, text: &str) -> Result<MatchResult, Error> {
        let mut ctx = Context::new(pat.clone(), text, *self);
        ctx.run()?;
        let (ret, captures) = ctx.finish();
        if ret.ok {
            Ok(MatchResult {
                ok: true,
                n: ret.n,
                groups: ret.groups,
                named_groups: ret.named_groups,
                captures,
            })
        } else {
            Ok(MatchResult {
                ok: false,
                n: 0,
                groups: Vec::new(),
                named_groups: HashMap::new(),
                captures: Vec::new(),
            })
        }
    }

    /// The matched prefix of `text`, if `pat` matches. Line/column
    /// counting and capturing are disabled.
    pub fn matched_prefix<'t>(&self, pat: &Pattern, text: &'t str) -> Option<&'t str> {
        let mut config = *self;
        config.disable_line_column = true;
        config.disable_capturing = true;
        match config.match_text(pat, text) {
            Ok(result) if result.ok => Some(&text[..result.n]),
            _ => None,
        }
    }

    /// Whether `pat` matches all of `text`. Line/column counting and
    /// capturing are disabled.
    ///
    /// Prefer `seq([inner, eof()])` over a bare `alt` here: with
    /// `alt([t("match"), t("match more")])` the first branch wins, so
    /// the full text `"match more"` counter-intuitively does not
    /// full-match.
    pub fn is_full_matched(&self, pat: &Pattern, text: &str) -> bool {
        let mut config = *self;
        config.disable_line_column = true;
        config.disable_capturing = true;
        match config.match_text(pat, text) {
            Ok(result) => result.ok && result.n == text.len(),
            Err(_) => false,
        }
    }

    /// Runs `pat` and returns its captures, requiring the whole text to
    /// match.
    pub fn parse(&self, pat: &Pattern, text: &str) -> Result<Vec<Box<dyn Capture>>, Error> {
        let mut config = *self;
        config.disable_line_column = false;
        config.disable_capturing = false;
        let result = config.match_text(pat, text)?;
        if !result.ok {
            return Err(Error::Dismatch);
        }
        if result.n != text.len() {
            return Err(Error::NotFullMatched);
        }
        Ok(result.captures)
    }
}

/// Runs `pat` against `text` with the default configuration.
pub fn match_text(pat: &Pattern, text: &str) -> Result<MatchResult, Error> {
    Config::default().match_text(pat, text)
}

/// Runs `pat` against `text` with the given configuration.
pub fn configured_match(config: Config, pat: &Pattern, text: &str) -> Result<MatchResult, Error> {
    config.match_text(pat, text)
}

/// The matched prefix of `text` under the default configuration.
pub fn matched_prefix<'t>(pat: &Pattern, text: &'t str) -> Option<&'t str> {
    Config::default().matched_prefix(pat, text)
}

/// Whether `pat` matches all of `text` under the default configuration.
pub fn is_full_matched(pat: &Pattern, text: &str) -> bool {
    Config::default().is_full_matched(pat, text)
}

/// Parses `text` with `pat`, returning the captures of a full match.
pub fn parse(pat: &Pattern, text: &str) -> Result<Vec<Box<dyn Capture>>, Error> {
    Config::default().parse(pat, text)
}
