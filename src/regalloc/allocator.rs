//! Component G: the Poletto–Sarkar linear-scan allocator.
//!
//! `Allocator` is a small builder: seed it with the register budget and
//! the parameter-register convention, feed it intervals either
//! directly (`add`) or by synthesizing them from an already-emitted
//! buffer (`scan`), then `run` the scan once and `export` the result.
//!
//! Intervals are processed in order of increasing `start`. A min-heap
//! keyed by `end` tracks which currently-active intervals can be
//! expired (their register returned to the pool) before the next one
//! is considered. When the pool is empty, the heaviest-pressure
//! interval — the active one ending furthest in the future, compared
//! against the interval now being considered — is the one sent to the
//! stack, per the classic `SpillAtInterval` rule.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::{debug, warn};

use crate::context::{BufferIndex, Context};
use crate::isa::RegUnit;
use crate::regalloc::interval::{Interval, IntervalKind, Purpose};
use crate::regalloc::register_set::RegisterPool;
use crate::regalloc::synth::synthesize;
use crate::result::{CodegenError, CodegenResult};
use crate::settings::Flags;

fn spill(interval: &mut Interval, frame_offset: &mut u32) {
    let align = interval.ty.align.max(1);
    let aligned = (*frame_offset + align - 1) / align * align;
    interval.purpose = Purpose::Spilled {
        offset: aligned,
        size: interval.ty.size,
        align,
    };
    *frame_offset = aligned + interval.ty.size;
}

/// The first `FRAME_RESERVED_BYTES` of every frame are reserved ahead
/// of the first spill slot (conventionally, the saved frame pointer);
/// spills start at this offset rather than 0.
const FRAME_RESERVED_BYTES: u32 = 8;

fn scan_intervals(mut intervals: Vec<Interval>, register_count: u32) -> CodegenResult<(Vec<Interval>, Vec<Interval>, u32)> {
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by_key(|&i| intervals[i].start);

    let mut free = RegisterPool::new(register_count);
    let mut expiry: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    let mut active: Vec<usize> = Vec::new();
    let mut frame_offset: u32 = FRAME_RESERVED_BYTES;

    for idx in order {
        let start = intervals[idx].start;

        while let Some(&Reverse((end, top))) = expiry.peek() {
            if end > start {
                break;
            }
            expiry.pop();
            if let Purpose::Allocated { reg, .. } = intervals[top].purpose {
                free.give(reg);
            }
            active.retain(|&a| a != top);
        }

        if intervals[idx].kind == IntervalKind::ForceStack {
            spill(&mut intervals[idx], &mut frame_offset);
            continue;
        }

        if let Some(reg) = intervals[idx].preassigned {
            let reg = free
                .take_specific(reg)
                .ok_or(CodegenError::NoRegisterAvailable { register: reg })?;
            intervals[idx].purpose = Purpose::Allocated {
                reg,
                size: intervals[idx].ty.size,
            };
            active.push(idx);
            expiry.push(Reverse((intervals[idx].end, idx)));
            continue;
        }

        if let Some(reg) = free.take() {
            intervals[idx].purpose = Purpose::Allocated {
                reg,
                size: intervals[idx].ty.size,
            };
            active.push(idx);
            expiry.push(Reverse((intervals[idx].end, idx)));
            continue;
        }

        let heaviest = active.iter().copied().max_by_key(|&a| intervals[a].end);

        match heaviest {
            Some(a) if intervals[a].end > intervals[idx].end => {
                let reg = match intervals[a].purpose {
                    Purpose::Allocated { reg, .. } => reg,
                    _ => unreachable!("an active interval always holds a register"),
                };
                debug!(
                    "regalloc: evicting interval ending at {} to free register {} for interval ending at {}",
                    intervals[a].end, reg, intervals[idx].end
                );
                spill(&mut intervals[a], &mut frame_offset);
                active.retain(|&x| x != a);
                intervals[idx].purpose = Purpose::Allocated {
                    reg,
                    size: intervals[idx].ty.size,
                };
                active.push(idx);
                expiry.push(Reverse((intervals[idx].end, idx)));
            }
            _ => {
                warn!(
                    "regalloc: register pressure exceeded, spilling interval [{}, {})",
                    intervals[idx].start, intervals[idx].end
                );
                spill(&mut intervals[idx], &mut frame_offset);
            }
        }
    }

    let (live, stack) = intervals
        .into_iter()
        .partition(|interval| matches!(interval.purpose, Purpose::Allocated { .. }));

    Ok((live, stack, frame_offset))
}

/// Accumulates intervals from one or more buffers, then runs the scan
/// once over all of them.
pub struct Allocator {
    register_count: u32,
    param_regs: Vec<RegUnit>,
    pending: Vec<Interval>,
    /// Intervals that hold a physical register for their whole
    /// lifetime, after `run`.
    pub live: Vec<Interval>,
    /// Intervals spilled to the stack, whether forced from the start
    /// or evicted under register pressure, after `run`.
    pub stack: Vec<Interval>,
    /// Total bytes of stack frame consumed by `stack`'s slots, after
    /// `run`.
    pub frame_size: u32,
}

impl Allocator {
    /// A new allocator with `register_count` physical registers
    /// available, using `param_regs` to resolve parameter intervals
    /// synthesized by `scan`.
    pub fn new(register_count: u32, param_regs: &[RegUnit]) -> Self {
        Self {
            register_count,
            param_regs: param_regs.to_vec(),
            pending: Vec::new(),
            live: Vec::new(),
            stack: Vec::new(),
            frame_size: 0,
        }
    }

    /// Add an interval directly, bypassing synthesis. Useful for
    /// intervals not derived from an encoded buffer (tests, or values
    /// that live outside any one function's instruction stream).
    pub fn add(&mut self, interval: Interval) {
        self.pending.push(interval);
    }

    /// Synthesize live intervals for `buffer` (component F) and queue
    /// them for the next `run`.
    pub fn scan(&mut self, ctx: &Context, buffer: BufferIndex) {
        let intervals = synthesize(ctx.buffer(buffer), &self.param_regs);
        self.pending.extend(intervals);
    }

    /// Run the linear scan over every interval queued by `add`/`scan`
    /// so far, consuming them and populating `live`/`stack`/
    /// `frame_size`. `flags` is accepted for interface symmetry with
    /// `Context::link`; the scan itself has no configurable policy
    /// today.
    pub fn run(&mut self, _flags: &Flags) -> CodegenResult<()> {
        let pending = core::mem::take(&mut self.pending);
        let (live, stack, frame_size) = scan_intervals(pending, self.register_count)?;
        self.live = live;
        self.stack = stack;
        self.frame_size = frame_size;
        Ok(())
    }

    /// Project the last `run`'s result into a flat table (component H).
    pub fn export(&self) -> crate::regalloc::export::RegisterTable {
        crate::regalloc::export::RegisterTable::build(self)
    }
}
