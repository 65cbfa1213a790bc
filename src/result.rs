//! Result and error types for the whole crate.
//!
//! The taxonomy is deliberately narrow: out-of-memory on buffer growth,
//! a preassigned-register collision during allocation, and an unresolved
//! symbol during linking (only reachable under `Flags::strict_symbols`).

use failure_derive::Fail;

use crate::isa::RegUnit;

/// The error type returned by every fallible operation in this crate.
#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A buffer or table failed to grow to the requested capacity.
    #[fail(display = "out of memory while growing a code buffer")]
    OutOfMemory,

    /// A preassigned (parameter) interval could not find its register in
    /// the free pool; `register` names the conflicting physical register.
    #[fail(display = "no register available: register {} is not free", register)]
    NoRegisterAvailable {
        /// The physical register the interval was pinned to.
        register: RegUnit,
    },

    /// A relocation's name was not found in the expected scope, and
    /// `Flags::strict_symbols` was set.
    #[fail(display = "unresolved symbol: {}", name)]
    UnresolvedSymbol {
        /// The symbol name that failed to resolve.
        name: String,
    },
}

/// A `Result` alias for this crate's single error type.
pub type CodegenResult<T> = Result<T, CodegenError>;
