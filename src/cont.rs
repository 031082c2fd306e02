// ABOUTME: The evaluator's continuation stack, copyable so call/cc is first-class

use crate::env::Environment;
use crate::sym::Symbol;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// One unit of pending work on the continuation stack.
#[derive(Debug, Clone)]
pub enum Step {
    /// Branches of a pending `if`: the list `(then [else])`.
    Then(Value),
    /// Remaining expressions of a `begin` or a function body.
    Begin(Value),
    /// Symbol to define once its value has been computed.
    Define(Symbol),
    /// Binding cell to overwrite once its new value has been computed.
    SetQ(Rc<Environment>),
    /// Unevaluated argument expressions of a pending application.
    Apply(Value),
    /// The already-evaluated operator of a pending application.
    ApplyFun(Value),
    /// An argument expression still waiting its turn.
    EvalArg(Value),
    /// Arguments evaluated so far, most recent first.
    ConsArgs(Value),
    /// Environment to reinstate when the current call returns.
    RestoreEnv(Rc<Environment>),
}

/// A last-in-first-out stack of steps. Cloning takes a snapshot whose step
/// sequence is independent of the original; payloads are shared, which is
/// harmless because the evaluator treats them as read-only.
#[derive(Debug, Clone, Default)]
pub struct Continuation {
    steps: Vec<Step>,
}

impl Continuation {
    pub fn new() -> Self {
        Continuation { steps: Vec::new() }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Option<Step> {
        self.steps.pop()
    }

    #[allow(dead_code)]
    pub fn peek(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Pushes a `RestoreEnv` unless one is already on top. A tail call finds
    /// the caller's restore still pending and reuses it, which is the single
    /// mechanism bounding stack depth over tail recursion.
    pub fn push_restore_env(&mut self, env: &Rc<Environment>) {
        if !matches!(self.steps.last(), Some(Step::RestoreEnv(_))) {
            self.push(Step::RestoreEnv(Rc::clone(env)));
        }
    }

    /// Replaces this stack's contents with a snapshot of `other`.
    pub fn copy_from(&mut self, other: &Continuation) {
        self.steps.clone_from(&other.steps);
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Then(v) => write!(f, "Then {}", v),
            Step::Begin(v) => write!(f, "Begin {}", v),
            Step::Define(s) => write!(f, "Define {}", s),
            Step::SetQ(cell) => match cell.symbol() {
                Some(s) => write!(f, "SetQ {}", s),
                None => write!(f, "SetQ |"),
            },
            Step::Apply(v) => write!(f, "Apply {}", v),
            Step::ApplyFun(v) => write!(f, "ApplyFun {}", v),
            Step::EvalArg(v) => write!(f, "EvalArg {}", v),
            Step::ConsArgs(v) => write!(f, "ConsArgs {}", v),
            Step::RestoreEnv(env) => write!(f, "RestoreEnv ({})", env),
        }
    }
}

impl fmt::Display for Continuation {
    /// Pending steps, topmost first, one per line as used in error traces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().rev().enumerate() {
            if i > 0 {
                write!(f, "\n\t")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
