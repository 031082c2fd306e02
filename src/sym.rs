// ABOUTME: Process-wide symbol interning so identity comparison suffices for equality

use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex};

/// Index into the global symbol table.
///
/// Two `Symbol`s are the same symbol exactly when their indices are equal,
/// so `==` is the identity comparison the evaluator relies on. Names are
/// leaked into the table on first intern; the table only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

struct Interner {
    names: Vec<&'static str>,
    ids: HashMap<&'static str, u32>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&id) = self.ids.get(name) {
            return Symbol(id);
        }
        // Leaking is bounded by the set of distinct names ever interned,
        // and buys 'static access without a second lock on every lookup.
        let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let id = u32::try_from(self.names.len()).expect("symbol table overflow");
        self.names.push(leaked);
        self.ids.insert(leaked, id);
        Symbol(id)
    }
}

/// Special-form keywords, interned eagerly so they occupy fixed slots.
/// Order must match the `Symbol` constants below.
const KEYWORD_NAMES: [&str; 8] = [
    "quote", "if", "begin", "lambda", "define", "set!", "apply", "call/cc",
];

pub const QUOTE: Symbol = Symbol(0);
pub const IF: Symbol = Symbol(1);
pub const BEGIN: Symbol = Symbol(2);
pub const LAMBDA: Symbol = Symbol(3);
pub const DEFINE: Symbol = Symbol(4);
pub const SETQ: Symbol = Symbol(5);
pub const APPLY: Symbol = Symbol(6);
pub const CALLCC: Symbol = Symbol(7);

static INTERNER: LazyLock<Mutex<Interner>> = LazyLock::new(|| {
    let mut table = Interner {
        names: Vec::new(),
        ids: HashMap::new(),
    };
    for name in KEYWORD_NAMES {
        table.intern(name);
    }
    Mutex::new(table)
});

impl Symbol {
    /// Returns the unique symbol for `name`, creating it on first use.
    pub fn intern(name: &str) -> Symbol {
        INTERNER.lock().expect("symbol table poisoned").intern(name)
    }

    /// The text this symbol was interned from.
    pub fn name(self) -> &'static str {
        INTERNER.lock().expect("symbol table poisoned").names[self.0 as usize]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
