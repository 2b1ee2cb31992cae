//! The matching engine: an explicit call stack driven by a trampoline.
//!
//! Pattern nodes hold no state; everything a run needs lives here. Each
//! trampoline iteration steps the current pattern, which yields by either
//! calling a sub-pattern (push a frame), tail-executing one (no frame,
//! but counted against the depth limit), or returning to its caller
//! (pop a frame, roll the cursor back to the call point and let the
//! caller decide what to consume).

use std::collections::HashMap;
use std::sync::Arc;

use crate::Config;
use crate::capture::{Capture, NonTerminalConstructor};
use crate::error::Error;
use crate::pattern::Pattern;
use crate::position::{Position, PositionCalculator};

/// Per-frame scratch state, reset on every call.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Locals {
    /// Loop counter reused by iterating patterns.
    pub(crate) i: usize,
}

/// What a finished callee reports to its caller.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReturnValues {
    pub(crate) ok: bool,
    pub(crate) n: usize,
    pub(crate) groups: Vec<String>,
    pub(crate) named_groups: HashMap<String, String>,
}

/// A saved caller frame.
struct Frame {
    pat: Pattern,
    at: usize,
    n: usize,
    locals: Locals,
    depth: usize,
    groups: Vec<String>,
    named_groups: HashMap<String, String>,
}

/// An in-progress non-terminal capture.
struct CaptureFrame {
    cons: Option<NonTerminalConstructor>,
    args: Vec<Box<dyn Capture>>,
}

/// Running state of one pattern match.
pub(crate) struct Context<'t> {
    config: Config,

    text: &'t str,
    at: usize,
    n: usize,
    pcalc: PositionCalculator<'t>,

    // Current frame.
    pat: Option<Pattern>,
    pub(crate) locals: Locals,
    is_ret: bool,
    pub(crate) ret: ReturnValues,

    groups: Vec<String>,
    named_groups: HashMap<String, String>,

    // Tail executions bump `depth` without pushing a frame, so the depth
    // limit covers them too.
    depth: usize,
    callstack: Vec<Frame>,

    scopes: Vec<Arc<HashMap<String, Pattern>>>,
    capstack: Vec<CaptureFrame>,
}

impl<'t> Context<'t> {
    pub(crate) fn new(pat: Pattern, text: &'t str, config: Config) -> Self {
        Self {
            config,
            text,
            at: 0,
            n: 0,
            pcalc: PositionCalculator::new(text),
            pat: Some(pat),
            locals: Locals::default(),
            is_ret: false,
            ret: ReturnValues::default(),
            groups: Vec::new(),
            named_groups: HashMap::new(),
            depth: 0,
            callstack: Vec::new(),
            scopes: Vec::new(),
            capstack: vec![CaptureFrame {
                cons: None,
                args: Vec::new(),
            }],
        }
    }

    /// The trampoline. Steps the current pattern until the engine halts
    /// or a step reports a run error.
    pub(crate) fn run(&mut self) -> Result<(), Error> {
        while let Some(pat) = self.pat.clone() {
            pat.step(self)?;
        }
        Ok(())
    }

    /// Whether the run ended in a match, and the final return values.
    pub(crate) fn finish(mut self) -> (ReturnValues, Vec<Box<dyn Capture>>) {
        let caps = match self.capstack.first_mut() {
            Some(bottom) => std::mem::take(&mut bottom.args),
            None => Vec::new(),
        };
        (self.ret, caps)
    }

    // ─── Yields ─────────────────────────────────────────────────────────

    /// Invoke `callee`, saving the current frame.
    pub(crate) fn call(&mut self, callee: &Pattern) -> Result<(), Error> {
        if self.config.callstack_limit > 0 && self.depth >= self.config.callstack_limit {
            return Err(Error::CallstackOverflow);
        }
        let Some(pat) = self.pat.take() else {
            return Err(Error::Internal);
        };
        self.callstack.push(Frame {
            pat,
            at: self.at,
            n: self.n,
            locals: self.locals,
            depth: self.depth,
            groups: std::mem::take(&mut self.groups),
            named_groups: std::mem::take(&mut self.named_groups),
        });
        self.depth += 1;

        // The callee starts with a clean span at the current cursor.
        self.n = 0;
        self.pat = Some(callee.clone());
        self.locals = Locals::default();
        self.is_ret = false;
        self.ret = ReturnValues::default();
        Ok(())
    }

    /// Tail-invoke `callee` without saving a frame. Only legal while the
    /// current frame has consumed nothing since its last call point.
    pub(crate) fn execute(&mut self, callee: &Pattern) -> Result<(), Error> {
        if self.n != 0 {
            return Err(Error::ExecuteWhenConsumed);
        }
        if self.config.callstack_limit > 0 && self.depth >= self.config.callstack_limit {
            return Err(Error::CallstackOverflow);
        }
        self.depth += 1;

        self.pat = Some(callee.clone());
        self.locals = Locals::default();
        self.is_ret = false;
        self.ret = ReturnValues::default();
        Ok(())
    }

    /// Return a predication: `ok` with no text consumed.
    pub(crate) fn predicates(&mut self, ok: bool) -> Result<(), Error> {
        let ret = ReturnValues {
            ok,
            n: 0,
            groups: std::mem::take(&mut self.groups),
            named_groups: std::mem::take(&mut self.named_groups),
        };
        self.returns(ret)
    }

    /// Return a match committing everything this frame consumed.
    pub(crate) fn commit(&mut self) -> Result<(), Error> {
        let ret = ReturnValues {
            ok: true,
            n: self.n,
            groups: std::mem::take(&mut self.groups),
            named_groups: std::mem::take(&mut self.named_groups),
        };
        self.returns(ret)
    }

    /// Return to the caller frame, or halt the engine at the bottom.
    ///
    /// The caller's cursor is restored to its call point; on success the
    /// callee's groups are merged into the caller's.
    pub(crate) fn returns(&mut self, ret: ReturnValues) -> Result<(), Error> {
        self.is_ret = true;

        if let Some(frame) = self.callstack.pop() {
            self.pat = Some(frame.pat);
            self.at = frame.at;
            self.n = frame.n;
            self.locals = frame.locals;
            self.depth = frame.depth;
            self.groups = frame.groups;
            self.named_groups = frame.named_groups;

            // `ret` stays whole: scope and capture frames re-return it to
            // their own callers after this merge.
            if ret.ok {
                if self.groups.is_empty() {
                    self.groups = ret.groups.clone();
                } else {
                    self.groups.extend(ret.groups.iter().cloned());
                }
                if self.named_groups.is_empty() {
                    self.named_groups = ret.named_groups.clone();
                } else {
                    for (name, text) in &ret.named_groups {
                        self.named_groups.insert(name.clone(), text.clone());
                    }
                }
            }
            self.ret = ret;
        } else {
            self.pat = None;
            self.ret = ret;
        }
        Ok(())
    }

    /// Whether the last yield was a return. Reads and clears the flag, so
    /// a step function re-entered later will not see the return twice.
    pub(crate) fn just_returned(&mut self) -> bool {
        std::mem::take(&mut self.is_ret)
    }

    /// Whether the frame's loop counter hit the repeat limit.
    pub(crate) fn reached_repeat_limit(&self) -> bool {
        self.config.repeat_limit > 0 && self.locals.i >= self.config.repeat_limit
    }

    // ─── Cursor ─────────────────────────────────────────────────────────

    /// Move the cursor forward over `n` bytes of matched text.
    pub(crate) fn consume(&mut self, n: usize) {
        self.n += n;
        self.at += n;
    }

    /// The position of the cursor, with line/column when enabled.
    pub(crate) fn tell(&mut self) -> Position {
        if self.config.disable_line_column {
            return Position {
                offset: self.at,
                line: 0,
                column: 0,
            };
        }
        self.pcalc.calculate(self.at)
    }

    /// The text consumed by the current frame since its last call point.
    pub(crate) fn span(&self) -> &'t str {
        &self.text[self.at - self.n..self.at]
    }

    /// Up to `n` bytes ahead of the cursor.
    pub(crate) fn next_bytes(&self, n: usize) -> &'t [u8] {
        let tail = &self.text.as_bytes()[self.at..];
        &tail[..n.min(tail.len())]
    }

    /// Up to `n` bytes behind the cursor.
    pub(crate) fn prev_bytes(&self, n: usize) -> &'t [u8] {
        let head = &self.text.as_bytes()[..self.at];
        &head[head.len().saturating_sub(n)..]
    }

    /// The `n` bytes ahead of the cursor as text, when they are there.
    pub(crate) fn next_str(&self, n: usize) -> Option<&'t str> {
        self.text.get(self.at..self.at + n)
    }

    /// Decode the character at the cursor.
    pub(crate) fn read_rune(&self) -> Option<char> {
        self.text[self.at..].chars().next()
    }

    // ─── Scopes ─────────────────────────────────────────────────────────

    pub(crate) fn enter(&mut self, vars: Arc<HashMap<String, Pattern>>) {
        self.scopes.push(vars);
    }

    pub(crate) fn leave(&mut self) {
        self.scopes.pop();
    }

    /// Look up a variable binding, innermost scope first.
    pub(crate) fn lookup(&self, name: &str) -> Option<Pattern> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).cloned())
    }

    // ─── Groups ─────────────────────────────────────────────────────────

    /// Record the frame's span as an anonymous group (empty name) or a
    /// named group (overwriting an earlier one).
    pub(crate) fn group(&mut self, name: &str) {
        if self.config.disable_grouping {
            return;
        }
        let span = self.span().to_string();
        if name.is_empty() {
            self.groups.push(span);
        } else {
            self.named_groups.insert(name.to_string(), span);
        }
    }

    /// The text of the referenced group: the current frame first, then
    /// callers top-down. Empty name means the most recent anonymous
    /// group. Missing groups read as empty.
    pub(crate) fn refer(&self, name: &str) -> String {
        if self.config.disable_grouping {
            return String::new();
        }

        if !name.is_empty() {
            if let Some(text) = self.named_groups.get(name) {
                return text.clone();
            }
            for frame in self.callstack.iter().rev() {
                if let Some(text) = frame.named_groups.get(name) {
                    return text.clone();
                }
            }
            return String::new();
        }

        if let Some(text) = self.groups.last() {
            return text.clone();
        }
        for frame in self.callstack.iter().rev() {
            if let Some(text) = frame.groups.last() {
                return text.clone();
            }
        }
        String::new()
    }

    // ─── Captures ───────────────────────────────────────────────────────

    /// Append a constructed capture to the innermost capture frame.
    pub(crate) fn push_capture(&mut self, cap: Box<dyn Capture>) -> Result<(), Error> {
        if self.config.disable_capturing {
            return Ok(());
        }
        match self.capstack.last_mut() {
            Some(frame) => {
                frame.args.push(cap);
                Ok(())
            }
            None => Err(Error::Internal),
        }
    }

    /// Open a non-terminal capture frame.
    pub(crate) fn begin(&mut self, cons: NonTerminalConstructor) {
        if self.config.disable_capturing {
            return;
        }
        self.capstack.push(CaptureFrame {
            cons: Some(cons),
            args: Vec::new(),
        });
    }

    /// Close the innermost capture frame. On a match, its constructor is
    /// invoked over the collected children and the result is pushed one
    /// frame up; on a dismatch the children are dropped.
    pub(crate) fn end(&mut self, matched: bool) -> Result<(), Error> {
        if self.config.disable_capturing {
            return Ok(());
        }
        if self.capstack.len() < 2 {
            return Err(Error::Internal);
        }
        let frame = match self.capstack.pop() {
            Some(frame) => frame,
            None => return Err(Error::Internal),
        };
        if !matched {
            return Ok(());
        }
        let cons = match frame.cons {
            Some(cons) => cons,
            None => return Err(Error::Internal),
        };
        let cap = cons(frame.args).map_err(Error::Hook)?;
        self.push_capture(cap)
    }
}
