//! Live-interval synthesis and linear-scan register allocation
//! (components F, G, H).

pub mod allocator;
pub mod export;
pub mod interval;
pub mod register_set;
pub mod synth;

pub use allocator::Allocator;
pub use export::{RegisterTable, RegisterTableEntry};
pub use interval::{Interval, IntervalKind, Purpose, TypeInfo};
pub use register_set::RegisterPool;
pub use synth::synthesize;
