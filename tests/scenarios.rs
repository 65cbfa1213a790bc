//! Integration tests exercising the documented usage scenarios end to
//! end, through the public API only.

use std::convert::TryInto;

use openrtl_codegen::regalloc::{Allocator, Interval, IntervalKind, Purpose, TypeInfo};
use openrtl_codegen::{CodeBuffer, Context, Flags, IntSize, Operand, RelocationScope};

#[test]
fn s1_minimal_return() {
    let mut buf = CodeBuffer::new(0);
    buf.ret().unwrap();
    assert_eq!(buf.len(), 4);
    assert_eq!(buf.bytes(), &[openrtl_codegen::Opcode::Return as u8, 0, 0, 0]);
}

#[test]
fn s2_immediate_move() {
    let mut buf = CodeBuffer::new(0);
    buf.imove_immediate(IntSize::I32, 3, 0x00AA).unwrap();
    assert_eq!(buf.len(), 6);
    assert_eq!(&buf.bytes()[4..6], &[0xAA, 0x00]);
    assert_eq!(buf.matrix().len(), 1);
    let entry = buf.matrix()[0];
    match entry.place {
        Operand::GpReg(reg) => {
            assert_eq!(reg.reg, 3);
            assert_eq!(reg.size, IntSize::I32.code());
        }
        other => panic!("expected a GpReg place, got {:?}", other),
    }
    assert_eq!(entry.value, Operand::Immediate(0x00AA));
}

#[test]
fn s3_local_call_patched() {
    let mut buf = CodeBuffer::new(0);
    buf.declare_symbol(RelocationScope::Local, "L");
    buf.call(0).unwrap();
    buf.declare_local("L", 0x1234);

    let mut ctx = Context::new();
    let index = ctx.add_buffer("f", buf);
    ctx.link(&Flags::new()).unwrap();

    let bytes = ctx.buffer(index).bytes();
    let window = &bytes[4..12];
    assert_eq!(u64::from_le_bytes(window.try_into().unwrap()), 0x1234);
}

#[test]
fn s4_global_cross_buffer_call() {
    let mut ctx = Context::new();
    let a = CodeBuffer::new(0);
    ctx.add_buffer("a", a);

    let mut b = CodeBuffer::new(0);
    b.declare_symbol(RelocationScope::Global, "a");
    b.call(0).unwrap();
    let b_index = ctx.add_buffer("b", b);

    ctx.link(&Flags::new()).unwrap();

    let bytes = ctx.buffer(b_index).bytes();
    let window = &bytes[4..12];
    assert_eq!(u64::from_le_bytes(window.try_into().unwrap()), 0);
}

#[test]
fn s5_linear_scan_with_spill_free_expiry() {
    let mut alloc = Allocator::new(2, &[]);
    alloc.add(Interval::new(0, 10, IntervalKind::TryRegister, TypeInfo::scalar(8)));
    alloc.add(Interval::new(1, 3, IntervalKind::TryRegister, TypeInfo::scalar(8)));
    alloc.add(Interval::new(4, 20, IntervalKind::TryRegister, TypeInfo::scalar(8)));
    alloc.run(&Flags::new()).unwrap();

    assert!(alloc.stack.is_empty(), "no spills expected once the short interval expires");
    assert_eq!(alloc.live.len(), 3);
    let registers: Vec<_> = alloc
        .live
        .iter()
        .map(|iv| match iv.purpose {
            Purpose::Allocated { reg, .. } => reg,
            _ => unreachable!(),
        })
        .collect();
    // i1 and i3 overlap ([0,10) and [4,20)) so they must land on
    // distinct registers even though i2's register frees up for i3.
    let i1_reg = registers[0];
    let i3_reg = registers[2];
    assert_ne!(i1_reg, i3_reg);
}

#[test]
fn s6_forced_spill() {
    let mut alloc = Allocator::new(2, &[]);
    for _ in 0..4 {
        alloc.add(Interval::new(0, 10, IntervalKind::TryRegister, TypeInfo::scalar(8)));
    }
    alloc.run(&Flags::new()).unwrap();

    assert_eq!(alloc.live.len(), 2);
    assert_eq!(alloc.stack.len(), 2);
    let mut offsets: Vec<u32> = alloc
        .stack
        .iter()
        .map(|iv| match iv.purpose {
            Purpose::Spilled { offset, .. } => offset,
            _ => unreachable!(),
        })
        .collect();
    offsets.sort_unstable();
    assert_eq!(offsets, vec![8, 16]);
}

#[test]
fn strict_symbols_turns_an_unresolved_relocation_into_an_error() {
    let mut buf = CodeBuffer::new(0);
    buf.declare_symbol(RelocationScope::Local, "missing");
    buf.call(0).unwrap();

    let mut ctx = Context::new();
    ctx.add_buffer("f", buf);

    assert!(ctx.link(&Flags::new().with_strict_symbols(true)).is_err());
}

#[test]
fn lenient_linking_leaves_unresolved_bytes_untouched() {
    let mut buf = CodeBuffer::new(0);
    buf.declare_symbol(RelocationScope::Local, "missing");
    buf.call(0).unwrap();

    let mut ctx = Context::new();
    let index = ctx.add_buffer("f", buf);
    ctx.link(&Flags::new()).unwrap();

    let window = &ctx.buffer(index).bytes()[4..12];
    assert_eq!(u64::from_le_bytes(window.try_into().unwrap()), 0);
}

#[test]
fn relinking_an_already_linked_buffer_is_a_no_op() {
    let mut buf = CodeBuffer::new(0);
    buf.declare_symbol(RelocationScope::Local, "L");
    buf.call(0).unwrap();
    buf.declare_local("L", 0xBEEF);

    let mut ctx = Context::new();
    let index = ctx.add_buffer("f", buf);
    ctx.link(&Flags::new()).unwrap();
    let first = ctx.buffer(index).bytes().to_vec();
    ctx.link(&Flags::new()).unwrap();
    let second = ctx.buffer(index).bytes().to_vec();
    assert_eq!(first, second);
}
