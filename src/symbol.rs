use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Serialize, Serializer};

/// Interned variable name. Ids are handed out in order of first appearance
/// and stay valid for the lifetime of the process. Names are never freed, so
/// a long-running caller that keeps seeing new names keeps growing the table.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Copy, Clone)]
pub struct Symbol {
    id: u32,
}

impl Symbol {
    pub fn intern(name: &str) -> Symbol {
        let mut table = table();
        if let Some(&symbol) = table.ids.get(name) {
            return symbol;
        }
        let sym = Symbol {
            id: table.names.len() as u32,
        };
        table.names.push(name.to_string());
        table.ids.insert(name.to_string(), sym);
        sym
    }

    /// Finds an already interned name without interning it.
    pub fn lookup(name: &str) -> Option<Symbol> {
        table().ids.get(name).copied()
    }

    pub fn id(self) -> u32 {
        self.id
    }

    pub fn name(self) -> String {
        table().names[self.id as usize].clone()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let table = table();
        let name = &table.names[self.id as usize];
        write!(f, "{}", name)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

struct SymbolTable {
    names: Vec<String>,
    ids: HashMap<String, Symbol>,
}

lazy_static! {
    static ref SYMBOL_TABLE: Mutex<SymbolTable> = Mutex::new(SymbolTable {
        names: Vec::new(),
        ids: HashMap::new(),
    });
}

// The table is append-only, so a poisoned lock still guards consistent data.
fn table() -> MutexGuard<'static, SymbolTable> {
    SYMBOL_TABLE.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let a = Symbol::intern("symbol_test_a");
        let b = Symbol::intern("symbol_test_b");
        assert_ne!(a, b);
        assert_eq!(Symbol::intern("symbol_test_a"), a);
        assert_eq!(Symbol::lookup("symbol_test_b"), Some(b));
        assert_eq!(a.name(), "symbol_test_a");
        assert_eq!(b.to_string(), "symbol_test_b");
    }

    #[test]
    fn lookup_does_not_intern() {
        assert_eq!(Symbol::lookup("symbol_test_never_seen"), None);
        assert_eq!(Symbol::lookup("symbol_test_never_seen"), None);
    }
}
