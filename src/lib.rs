//! An in-memory assembler for a small fixed-width register-transfer
//! instruction set, plus a Poletto-Sarkar linear-scan register
//! allocator.
//!
//! Clients build one or more [`CodeBuffer`]s by calling the named
//! constructor for each opcode (see the `facade` module), register
//! buffers and global symbols into a [`Context`], declare symbolic
//! references, then [`Context::link`] the whole thing into a
//! self-consistent binary image. Separately, [`regalloc::synthesize`]
//! and [`regalloc::Allocator`] turn a buffer's instruction stream into
//! a register/stack assignment for every live value.
//!
//! This crate does not lower to a native ISA, does not execute code,
//! and does not parse any file format — its output is a byte buffer
//! plus side-tables describing the allocation outcome.

#![warn(missing_docs)]
#![deny(trivial_numeric_casts, unused_extern_crates)]
#![warn(unused_import_braces)]

mod buffer;
mod context;
mod facade;
mod isa;
mod opcode;
mod operand;
pub mod regalloc;
mod result;
mod settings;
mod symbol;

pub use crate::buffer::{decode, Instruction, InstructionData};
pub use crate::context::{BufferIndex, Context};
pub use crate::isa::{is_reserved, DisplayReg, FloatSize, IntSize, RegUnit, VectorSize, MAX_GENERAL_REGISTER, RFP, RSP};
pub use crate::opcode::{Opcode, OperandArity, Shape};
pub use crate::operand::{MemIndex, Operand, OperandEntry, RegOperand};
pub use crate::result::{CodegenError, CodegenResult};
pub use crate::settings::Flags;
pub use crate::symbol::{Relocation, RelocationScope, SymbolTable};

#[doc(inline)]
pub use crate::buffer::CodeBuffer;
