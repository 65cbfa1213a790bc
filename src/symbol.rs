//! Component C: symbol tables and pending relocations.

/// An append-only `name -> address` table. Lookup is linear scan by
/// string equality, matching the reference implementation — symbol
/// counts in this domain are per-function, not whole-program, so a
/// hash map buys nothing here.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: Vec<(String, u64)>,
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append `name -> address`. Symbol entries are immutable once
    /// inserted; this never overwrites an existing entry with the same
    /// name, it just appends another one (the first match wins on
    /// lookup).
    pub fn declare(&mut self, name: impl Into<String>, address: u64) {
        self.entries.push((name.into(), address));
    }

    /// Look up `name`, returning its address if present.
    pub fn resolve(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, address)| *address)
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a relocation resolves against a buffer's own local table or
/// the owning context's global table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelocationScope {
    /// Resolve in the buffer's own local symbol table.
    Local,
    /// Resolve in the context's global symbol table.
    Global,
}

/// A deferred byte-level patch, keyed by a symbolic name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relocation {
    /// Which table to resolve `name` against.
    pub scope: RelocationScope,
    /// The symbol name to resolve.
    pub name: String,
    /// Byte offset within the owning buffer of the 8-byte patch window.
    pub offset: u32,
    /// Bitmask selecting which bits of the patch window to overwrite.
    pub mask: u64,
}
