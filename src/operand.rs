//! Component B: the operand matrix.
//!
//! The encoder collapses e.g. `iload` and `istore` onto the same
//! 3-register header shape, but downstream consumers need to know
//! that `iload` reads a memory-indirect `[src1 + src2]` and writes a
//! GPR. `Operand` is that semantic classification, reified as a tagged
//! enum rather than a kind tag plus a side payload, since in Rust the
//! two collapse into one type naturally.

/// A register operand: a register number, its size class, and (for
/// moves) an optional sign/zero-extend flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegOperand {
    /// The register number.
    pub reg: u8,
    /// The size-class code (meaning depends on register class).
    pub size: u8,
    /// `Some(true)` for sign-extending moves, `Some(false)` for
    /// zero-extending moves, `None` when extension doesn't apply.
    pub ext: Option<bool>,
}

/// How a memory-indirect operand's index is expressed: either a second
/// register (`[base + index_reg]`, used by `iload`/`istore`-family
/// opcodes) or a literal byte offset (`[base + offset]`, used by the
/// stack-relative push/pop convention).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemIndex {
    /// `[base + register]`.
    Register(u8),
    /// `[base + literal]`.
    Immediate(i32),
}

/// One operand's abstract class and payload. `place`/`value` in an
/// `OperandEntry` are each one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Not yet classified / not applicable.
    Uninit,
    /// A 64-bit literal.
    Immediate(u64),
    /// A general-purpose register.
    GpReg(RegOperand),
    /// A floating-point register.
    FpReg(RegOperand),
    /// A vector register.
    VReg(RegOperand),
    /// An immediate memory address. Part of the declared kind space
    /// (mirrored from the reference implementation's tag enumeration)
    /// though no current façade constructor emits it.
    MemImm(u64),
    /// `[base + literal offset]`, used by the stack push/pop
    /// convention (`[RSP + 0]`, `[RSP - 8]`).
    MemBase {
        /// The base register.
        base: u8,
        /// The literal byte offset.
        offset: i32,
    },
    /// `[base + index]`, where the index is either another register or
    /// a literal.
    MemIndirect {
        /// The base register.
        base: u8,
        /// The index, register or literal.
        index: MemIndex,
    },
}

/// One entry in a buffer's operand matrix: the byte offset immediately
/// past the instruction's header, plus the abstract destination
/// (`place`) and source (`value`) it moves data between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperandEntry {
    /// Byte offset of the tail end of the instruction this entry
    /// describes (i.e. the offset of the *next* instruction's header).
    pub offset: u32,
    /// The destination operand.
    pub place: Operand,
    /// The source operand.
    pub value: Operand,
}
