//! Run-time configuration flags.
//!
//! Unlike the declarative, template-generated settings groups of the
//! crate this one descends from, there is exactly one documented
//! compatibility switch here, so a plain struct suffices. It is still
//! named and shaped so that a second flag can be added later without an
//! API break.

/// Configuration consulted by linking and (indirectly) allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flags {
    strict_symbols: bool,
}

impl Flags {
    /// Flags with every switch at its documented default.
    pub fn new() -> Self {
        Self {
            strict_symbols: false,
        }
    }

    /// Return a copy of these flags with `strict_symbols` set.
    ///
    /// When set, an unresolved relocation during `Context::link` is
    /// reported as `CodegenError::UnresolvedSymbol` instead of being
    /// silently skipped.
    pub fn with_strict_symbols(mut self, strict: bool) -> Self {
        self.strict_symbols = strict;
        self
    }

    /// Whether unresolved symbols should be treated as a hard error.
    pub fn strict_symbols(self) -> bool {
        self.strict_symbols
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}
