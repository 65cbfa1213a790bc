//! Component H: output projection.
//!
//! Flattens an `Allocator`'s result into a single ordered table a
//! caller can walk once to know, for every live range, whether it
//! landed in a register or on the stack. A prior revision of this
//! projection read `start`/`end` from the wrong source array while
//! iterating the stack list (indexing into the register-allocated list
//! instead); this version reads each entry's bounds from the same list
//! it is iterating, never the other one.

use crate::regalloc::allocator::Allocator;
use crate::regalloc::interval::Purpose;

/// One projected interval: its bounds plus where it ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterTableEntry {
    /// The source interval's name, carried through unchanged so a
    /// caller can look up "where did temporary X end up?" instead of
    /// only iterating in bulk.
    pub key: u64,
    /// Start of the interval (instruction index).
    pub start: u32,
    /// End of the interval (instruction index, exclusive).
    pub end: u32,
    /// Where the value lives.
    pub purpose: Purpose,
}

/// The flattened allocation result for one buffer.
#[derive(Clone, Debug, Default)]
pub struct RegisterTable {
    entries: Vec<RegisterTableEntry>,
}

impl RegisterTable {
    /// Project an `Allocator`'s `live` and `stack` lists into one
    /// table, in no particular order (callers that need the original
    /// program order should sort on `start`).
    pub fn build(allocator: &Allocator) -> Self {
        let mut entries = Vec::with_capacity(allocator.live.len() + allocator.stack.len());
        for interval in &allocator.live {
            entries.push(RegisterTableEntry {
                key: interval.name,
                start: interval.start,
                end: interval.end,
                purpose: interval.purpose,
            });
        }
        for interval in &allocator.stack {
            entries.push(RegisterTableEntry {
                key: interval.name,
                start: interval.start,
                end: interval.end,
                purpose: interval.purpose,
            });
        }
        Self { entries }
    }

    /// The projected entries.
    pub fn entries(&self) -> &[RegisterTableEntry] {
        &self.entries
    }

    /// Total number of entries, register-allocated plus spilled.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regalloc::interval::{Interval, IntervalKind, TypeInfo};
    use crate::settings::Flags;

    #[test]
    fn entries_keep_each_interval_s_own_bounds() {
        let mut allocator = Allocator::new(1, &[]);
        allocator.add(Interval::new(0, 3, IntervalKind::TryRegister, TypeInfo::scalar(8)));
        allocator.add(Interval::new(5, 9, IntervalKind::TryRegister, TypeInfo::scalar(8)));
        allocator.run(&Flags::new()).unwrap();
        let table = allocator.export();
        assert_eq!(table.len(), 2);
        let bounds: Vec<(u32, u32)> = table.entries().iter().map(|e| (e.start, e.end)).collect();
        assert!(bounds.contains(&(0, 3)));
        assert!(bounds.contains(&(5, 9)));
    }

    #[test]
    fn spilled_entries_carry_a_stack_purpose() {
        let mut forced = Interval::new(0, 4, IntervalKind::ForceStack, TypeInfo::scalar(8));
        forced.kind = IntervalKind::ForceStack;
        let mut allocator = Allocator::new(4, &[]);
        allocator.add(forced);
        allocator.run(&Flags::new()).unwrap();
        let table = allocator.export();
        assert_eq!(table.len(), 1);
        assert!(matches!(table.entries()[0].purpose, Purpose::Spilled { .. }));
        assert_eq!(table.entries()[0].start, 0);
        assert_eq!(table.entries()[0].end, 4);
    }

    #[test]
    fn each_entry_s_key_is_looked_up_from_the_list_it_came_from() {
        // One interval tight enough to keep a register, one forced to
        // the stack; both carry a distinct name that must survive
        // unchanged into the projected table, read from whichever of
        // `live`/`stack` actually holds it.
        let mut allocator = Allocator::new(1, &[]);
        allocator.add(
            Interval::new(0, 3, IntervalKind::TryRegister, TypeInfo::scalar(8)).with_name(0x0100),
        );
        allocator.add(
            Interval::new(0, 4, IntervalKind::ForceStack, TypeInfo::scalar(8)).with_name(0x0200),
        );
        allocator.run(&Flags::new()).unwrap();
        let table = allocator.export();
        assert_eq!(table.len(), 2);
        let keyed: std::collections::HashMap<u64, RegisterTableEntry> =
            table.entries().iter().map(|e| (e.key, *e)).collect();
        assert!(matches!(keyed[&0x0100].purpose, Purpose::Allocated { .. }));
        assert!(matches!(keyed[&0x0200].purpose, Purpose::Spilled { .. }));
        assert_eq!(keyed[&0x0200].start, 0);
        assert_eq!(keyed[&0x0200].end, 4);
    }
}
