//! Live intervals and the two possible outcomes of allocating one.

use crate::isa::RegUnit;

/// Size and alignment of the value an interval carries, used to compute
/// a stack slot when the interval spills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// Size in bytes.
    pub size: u32,
    /// Required alignment in bytes; always a power of two.
    pub align: u32,
}

impl TypeInfo {
    /// A scalar of `size` bytes, self-aligned.
    pub fn scalar(size: u32) -> Self {
        Self { size, align: size }
    }
}

/// Whether an interval is free to receive a register, or was pinned to
/// the stack from the start (e.g. a value whose address is taken).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntervalKind {
    /// Ordinary value: try a register first, spill on pressure.
    TryRegister,
    /// Forced to the stack regardless of register pressure.
    ForceStack,
}

/// The allocator's decision for one interval, once it has been
/// processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purpose {
    /// Not yet processed.
    Unassigned,
    /// Assigned a physical register.
    Allocated {
        /// The physical register.
        reg: RegUnit,
        /// The value's size in bytes.
        size: u32,
    },
    /// Spilled to a stack slot.
    Spilled {
        /// Byte offset from the frame base.
        offset: u32,
        /// The value's size in bytes.
        size: u32,
        /// Required alignment in bytes.
        align: u32,
    },
}

/// One value's lifetime, expressed as a half-open range of byte offsets
/// `[start, end)` into the buffer's encoded instruction stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    /// The interval's key in the output projection (component H),
    /// encoded as `(counter << 8) | register_number` by whoever
    /// synthesizes this interval. Two intervals bound to the same
    /// transient register at different points in the stream get
    /// distinct names because `counter` differs; `0` for intervals
    /// built directly rather than through synthesis.
    pub name: u64,
    /// Byte offset of the instruction that first defines this value.
    pub start: u32,
    /// Byte offset of the instruction past the value's last use.
    pub end: u32,
    /// How this interval should be treated by the scan.
    pub kind: IntervalKind,
    /// Size/alignment of the carried value.
    pub ty: TypeInfo,
    /// A register this interval must land in, if it was pre-assigned
    /// (e.g. an incoming parameter bound to a calling-convention
    /// register before the scan begins).
    pub preassigned: Option<RegUnit>,
    /// The outcome, filled in by the allocator.
    pub purpose: Purpose,
}

impl Interval {
    /// A fresh, unassigned interval spanning `[start, end)`, named `0`
    /// (the caller should follow up with `with_name` if this interval
    /// needs a real projection key).
    pub fn new(start: u32, end: u32, kind: IntervalKind, ty: TypeInfo) -> Self {
        Self {
            name: 0,
            start,
            end,
            kind,
            ty,
            preassigned: None,
            purpose: Purpose::Unassigned,
        }
    }

    /// Set this interval's projection name/key.
    pub fn with_name(mut self, name: u64) -> Self {
        self.name = name;
        self
    }

    /// Pin this interval to a specific physical register before the
    /// scan runs (used for incoming parameters).
    pub fn with_preassigned(mut self, reg: RegUnit) -> Self {
        self.preassigned = Some(reg);
        self
    }
}
