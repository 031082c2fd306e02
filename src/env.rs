// ABOUTME: Environment chain of bindings with frame markers delimiting scopes

use crate::error::EvalError;
use crate::sym::Symbol;
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One cell of the binding chain.
///
/// A cell either binds a symbol to a value or, when `sym` is `None`, marks
/// the start of a lexical frame. `define` splices new bindings in right
/// behind the marker that heads the current frame, so the marker cell is the
/// one spot in the chain whose `next` pointer mutates. Chain tails are
/// shared freely between closures and captured continuations.
pub struct Environment {
    sym: Option<Symbol>,
    val: RefCell<Value>,
    next: RefCell<Option<Rc<Environment>>>,
    global_head: bool,
}

impl Environment {
    fn cell(sym: Option<Symbol>, val: Value, next: Option<Rc<Environment>>) -> Rc<Self> {
        Rc::new(Environment {
            sym,
            val: RefCell::new(val),
            next: RefCell::new(next),
            global_head: false,
        })
    }

    /// Creates the head of a global chain. The cell is a frame marker so
    /// top-level `define` has an insertion point, and it is flagged so the
    /// stringifier and `globals` can recognise where the global chain starts.
    pub fn global() -> Rc<Self> {
        Rc::new(Environment {
            sym: None,
            val: RefCell::new(Value::Nil),
            next: RefCell::new(None),
            global_head: true,
        })
    }

    /// Opens a new lexical frame on top of `next`.
    pub fn frame(next: Rc<Environment>) -> Rc<Self> {
        Environment::cell(None, Value::Nil, Some(next))
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.sym
    }

    pub fn value(&self) -> Value {
        self.val.borrow().clone()
    }

    pub fn set_value(&self, value: Value) {
        *self.val.borrow_mut() = value;
    }

    pub fn next(&self) -> Option<Rc<Environment>> {
        self.next.borrow().clone()
    }

    pub fn is_global_head(&self) -> bool {
        self.global_head
    }

    /// Walks the chain for the first cell binding `sym`. Frame markers are
    /// never matched.
    pub fn look_for(self: &Rc<Self>, sym: Symbol) -> Result<Rc<Environment>, EvalError> {
        let mut current = Some(Rc::clone(self));
        while let Some(cell) = current {
            if cell.sym == Some(sym) {
                return Ok(cell);
            }
            current = cell.next();
        }
        Err(EvalError::UnboundSymbol(sym.name().to_string()))
    }

    /// Splices a new binding in immediately behind this frame's head, so a
    /// `define` lands in the current frame instead of an enclosing one.
    pub fn define_here(&self, sym: Symbol, value: Value) {
        let tail = self.next();
        let cell = Environment::cell(Some(sym), value, tail);
        *self.next.borrow_mut() = Some(cell);
    }

    /// Prepends `params[i] -> args[i]` bindings onto this chain, newest
    /// frame first, failing when the two lists differ in length.
    pub fn prepend(self: &Rc<Self>, params: &Value, args: &Value) -> Result<Rc<Environment>, EvalError> {
        let names = params.try_to_vec()?;
        let values = args.try_to_vec()?;
        if names.len() != values.len() {
            return Err(EvalError::arity_error(
                "lambda",
                names.len().to_string(),
                values.len(),
            ));
        }
        let mut chain = Rc::clone(self);
        for (position, (name, value)) in names.into_iter().zip(values).enumerate().rev() {
            let sym = match name {
                Value::Sym(s) => s,
                other => {
                    return Err(EvalError::type_error("lambda", "symbol", &other, position + 1))
                }
            };
            chain = Environment::cell(Some(sym), value, Some(chain));
        }
        Ok(chain)
    }
}

impl fmt::Display for Environment {
    /// Symbol names in chain order, `|` for frame markers, stopping with the
    /// `GlobalEnv` sentinel once the global chain head is reached.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global_head {
            return write!(f, "GlobalEnv");
        }
        match self.sym {
            Some(s) => write!(f, "{}", s)?,
            None => write!(f, "|")?,
        }
        let mut current = self.next();
        while let Some(cell) = current {
            write!(f, " ")?;
            if cell.global_head {
                return write!(f, "GlobalEnv");
            }
            match cell.sym {
                Some(s) => write!(f, "{}", s)?,
                None => write!(f, "|")?,
            }
            current = cell.next();
        }
        Ok(())
    }
}

// Debug delegates to Display: the chain below a definition can reach the
// closure being defined, so a derived Debug would never terminate.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment({})", self)
    }
}
