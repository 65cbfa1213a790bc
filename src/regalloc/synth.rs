//! Component F: live-interval synthesis.
//!
//! Walks a buffer's already-encoded instruction stream and, for every
//! register number it sees, builds one `Interval` per def-to-last-use
//! span, bounded by the byte offsets of the defining and last-using
//! instructions' headers. Mirrors the reference allocator's two-switch
//! structure: a use-side pass that extends whatever interval is
//! currently open on a register field, followed by a def-side pass
//! that closes it and opens a fresh one when the opcode (re)defines its
//! destination.
//!
//! Every interval this module creates also carries a `name`, the key
//! output projection (component H) indexes by: `(counter << 8) |
//! register_number`, where `counter` is the parameter index for
//! preassigned parameter intervals and a defs-seen-so-far count,
//! starting from the parameter count, for every other interval.

use core::convert::TryInto;

use crate::buffer::{decode, instruction_length, CodeBuffer, InstructionData};
use crate::isa::{is_reserved, size_class_bytes, RegUnit};
use crate::opcode::OperandArity;
use crate::regalloc::interval::{Interval, IntervalKind, TypeInfo};

/// One instruction, decoded, alongside the byte offset of its header.
struct PositionedInstruction {
    offset: u32,
    opcode: crate::opcode::Opcode,
    size: u8,
    data: InstructionData,
}

fn walk(bytes: &[u8]) -> Vec<PositionedInstruction> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let header: [u8; 4] = bytes[offset..offset + 4].try_into().expect("4-byte header");
        let inst = decode(header);
        let total_len = match inst.data {
            InstructionData::Rel { len, .. } => instruction_length(len) as usize,
            _ => 4,
        };
        out.push(PositionedInstruction {
            offset: offset as u32,
            opcode: inst.opcode,
            size: inst.size,
            data: inst.data,
        });
        offset += total_len;
    }
    out
}

/// Produce the live intervals for one buffer's instruction stream.
///
/// `param_regs` supplies, for each of the buffer's formal parameters in
/// order, the physical register it arrives in under the calling
/// convention; parameter `i` is referenced throughout the buffer's body
/// as register number `i`. A prior revision of this synthesis pinned
/// parameter intervals to the loop index `i` itself rather than looking
/// up `param_regs[i]`; that bug is fixed here.
pub fn synthesize(buffer: &CodeBuffer, param_regs: &[RegUnit]) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = Vec::new();
    let mut open: [Option<usize>; 256] = [None; 256];

    for (i, &reg) in param_regs.iter().enumerate().take(buffer.param_count() as usize) {
        let idx = intervals.len();
        let name = (i as u64) << 8 | u64::from(reg);
        intervals.push(
            Interval::new(0, 0, IntervalKind::TryRegister, TypeInfo::scalar(8))
                .with_name(name)
                .with_preassigned(reg),
        );
        open[i] = Some(idx);
    }

    // Definition names continue the index sequence the parameter loop
    // above left off, so a def-side name never collides with a
    // parameter's.
    let mut counter: u64 = u64::from(buffer.param_count());

    for inst in walk(buffer.bytes()) {
        let arity = inst.opcode.operand_arity();
        let (dest, src1, src2) = inst.data.register_fields();
        let reads_dest = inst.opcode.reads_dest();
        let mut use_fields: [u8; 3] = [0; 3];
        let mut use_count = 0;
        match arity {
            OperandArity::Zero => {}
            OperandArity::One => {
                if reads_dest {
                    use_fields[use_count] = dest;
                    use_count += 1;
                }
            }
            OperandArity::Two => {
                use_fields[use_count] = src1;
                use_count += 1;
                if reads_dest {
                    use_fields[use_count] = dest;
                    use_count += 1;
                }
            }
            OperandArity::Three => {
                use_fields[use_count] = src1;
                use_count += 1;
                use_fields[use_count] = src2;
                use_count += 1;
                if reads_dest {
                    use_fields[use_count] = dest;
                    use_count += 1;
                }
            }
        }

        // Use-side: every register field genuinely read by this
        // instruction extends whatever interval is currently open on
        // it. `dest` only participates here when `reads_dest` holds —
        // an ordinary arithmetic or load destination is a pure output
        // and never extends a prior interval of the same number.
        for &reg in &use_fields[..use_count] {
            if is_reserved(reg) {
                continue;
            }
            if let Some(idx) = open[reg as usize] {
                intervals[idx].end = inst.offset;
            }
        }

        // Def-side: an opcode that (re)defines dest closes whatever was
        // open there and starts a fresh interval.
        if arity != OperandArity::Zero && inst.opcode.defines_dest() && !is_reserved(dest) {
            let ty = TypeInfo::scalar(size_class_bytes(inst.size));
            let name = counter << 8 | u64::from(dest);
            counter += 1;
            let idx = intervals.len();
            intervals.push(
                Interval::new(inst.offset, inst.offset, IntervalKind::TryRegister, ty).with_name(name),
            );
            open[dest as usize] = Some(idx);
        }
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::IntSize;

    #[test]
    fn a_single_add_produces_three_touched_intervals() {
        let mut buf = CodeBuffer::new(0);
        buf.iadd(IntSize::I32, 2, 0, 1).unwrap();
        let intervals = synthesize(&buf, &[]);
        // dest=2 gets a fresh def interval; src1=0, src2=1 were never
        // open so they produce nothing to extend.
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, 0);
        assert_eq!(intervals[0].end, 0);
    }

    #[test]
    fn redefinition_closes_the_prior_interval_and_opens_a_new_one() {
        let mut buf = CodeBuffer::new(0);
        buf.imove_immediate(IntSize::I32, 0, 1).unwrap(); // 5 bytes, offset 0
        buf.iadd(IntSize::I32, 1, 0, 0).unwrap(); // 4 bytes, offset 5
        buf.imove_immediate(IntSize::I32, 0, 2).unwrap(); // offset 9
        let intervals = synthesize(&buf, &[]);
        assert_eq!(intervals.len(), 3);
        // First def of reg 0 stays open through the add at offset 5
        // (read as src1/src2), then is closed by the redefinition at
        // offset 9.
        assert_eq!(intervals[0].start, 0);
        assert_eq!(intervals[0].end, 5);
        assert_eq!(intervals[2].start, 9);
    }

    #[test]
    fn parameter_intervals_are_preassigned_to_the_looked_up_register() {
        let buf = CodeBuffer::new(2);
        let intervals = synthesize(&buf, &[5, 9]);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].preassigned, Some(5));
        assert_eq!(intervals[1].preassigned, Some(9));
        assert_eq!(intervals[0].name, 0 << 8 | 5);
        assert_eq!(intervals[1].name, 1 << 8 | 9);
    }

    #[test]
    fn def_side_names_continue_the_index_sequence_past_the_parameter_count() {
        let mut buf = CodeBuffer::new(1);
        buf.iadd(IntSize::I32, 7, 0, 0).unwrap();
        buf.iadd(IntSize::I32, 8, 7, 7).unwrap();
        let intervals = synthesize(&buf, &[2]);
        assert_eq!(intervals.len(), 3);
        assert_eq!(intervals[0].name, 0 << 8 | 2); // the parameter
        assert_eq!(intervals[1].name, 1 << 8 | 7); // first def, counter starts at params=1
        assert_eq!(intervals[2].name, 2 << 8 | 8);
    }

    #[test]
    fn push_and_call_indirect_extend_but_never_define() {
        let mut buf = CodeBuffer::new(0);
        buf.imove_immediate(IntSize::I32, 3, 7).unwrap(); // 5 bytes, offset 0
        buf.ipush(IntSize::I32, 3).unwrap(); // offset 5
        let intervals = synthesize(&buf, &[]);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].end, 5);
    }
}
