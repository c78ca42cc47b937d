//! Two-scope symbol table for Jack identifiers.
//!
//! Class scope holds `STATIC` and `FIELD` entries for the lifetime of a
//! class; subroutine scope holds `ARG` and `VAR` entries and is reset at
//! every [`SymbolTable::start_subroutine`]. Indices are assigned in
//! declaration order, dense per kind per scope, and sourced from four
//! per-kind counters; the counters, not the maps, are the authority for
//! the next index.

use phf::phf_map;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Static => "STATIC",
            Kind::Field => "FIELD",
            Kind::Arg => "ARG",
            Kind::Var => "VAR",
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }

    /// The VM segment backing this kind: `FIELD`→`this`, `STATIC`→`static`,
    /// `ARG`→`argument`, `VAR`→`local`.
    #[must_use]
    pub fn segment(self) -> &'static str {
        SEGMENT_OF_KIND[self.as_str()]
    }
}

static SEGMENT_OF_KIND: phf::Map<&'static str, &'static str> = phf_map! {
    "STATIC" => "static",
    "FIELD" => "this",
    "ARG" => "argument",
    "VAR" => "local",
};

#[derive(Debug, Clone)]
struct SymbolEntry {
    type_name: String,
    kind: Kind,
    index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, SymbolEntry>,
    subroutine_scope: HashMap<String, SymbolEntry>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    var_count: u16,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets subroutine scope and its two counters. Class scope, and its
    /// counters, persist across subroutines of the same class.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_count = 0;
        self.var_count = 0;
    }

    /// Declares `name` in the scope matching `kind`. Errs if `name` is
    /// already defined in that scope.
    pub fn define(&mut self, name: &str, type_name: &str, kind: Kind) -> Result<(), String> {
        let already_defined = if kind.is_class_scope() {
            self.class_scope.contains_key(name)
        } else {
            self.subroutine_scope.contains_key(name)
        };
        if already_defined {
            return Err(format!("'{name}' is already defined in this scope"));
        }

        let index = match kind {
            Kind::Static => {
                let i = self.static_count;
                self.static_count += 1;
                i
            }
            Kind::Field => {
                let i = self.field_count;
                self.field_count += 1;
                i
            }
            Kind::Arg => {
                let i = self.arg_count;
                self.arg_count += 1;
                i
            }
            Kind::Var => {
                let i = self.var_count;
                self.var_count += 1;
                i
            }
        };

        let entry = SymbolEntry {
            type_name: type_name.to_string(),
            kind,
            index,
        };
        if kind.is_class_scope() {
            self.class_scope.insert(name.to_string(), entry);
        } else {
            self.subroutine_scope.insert(name.to_string(), entry);
        }
        Ok(())
    }

    #[must_use]
    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.static_count,
            Kind::Field => self.field_count,
            Kind::Arg => self.arg_count,
            Kind::Var => self.var_count,
        }
    }

    /// Subroutine scope first, then class scope, per the lookup invariant.
    fn find(&self, name: &str) -> Option<&SymbolEntry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.find(name).map(|e| e.kind)
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.find(name).map(|e| e.type_name.as_str())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.find(name).map(|e| e.index)
    }
}
