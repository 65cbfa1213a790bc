//! Component E: the instruction-set façade. One named constructor per
//! opcode, each composing the encoder (component A) with an operand
//! matrix entry (component B) for the opcodes that move data.

use crate::buffer::CodeBuffer;
use crate::isa::{FloatSize, IntSize, VectorSize, RSP};
use crate::opcode::Opcode;
use crate::operand::{MemIndex, Operand, RegOperand};
use crate::result::CodegenResult;

fn gp(reg: u8, size: u8, ext: Option<bool>) -> Operand {
    Operand::GpReg(RegOperand { reg, size, ext })
}

fn fp(reg: u8, size: u8, ext: Option<bool>) -> Operand {
    Operand::FpReg(RegOperand { reg, size, ext })
}

fn vreg(reg: u8, size: u8) -> Operand {
    Operand::VReg(RegOperand { reg, size, ext: None })
}

impl CodeBuffer {
    // -- Zero-operand ----------------------------------------------------

    /// Return from the current function.
    pub fn ret(&mut self) -> CodegenResult<()> {
        self.emit_none(Opcode::Return)
    }

    // -- Short-immediate ---------------------------------------------------

    /// Allocate `frame_size` bytes of stack frame on entry.
    pub fn enter(&mut self, frame_size: u32) -> CodegenResult<()> {
        self.emit_imm(Opcode::Enter, frame_size)
    }

    /// Release the current stack frame before returning.
    pub fn leave(&mut self, frame_size: u32) -> CodegenResult<()> {
        self.emit_imm(Opcode::Leave, frame_size)
    }

    // -- Long-immediate / relative ------------------------------------------

    /// Direct call to `addr` (conventionally a placeholder of `0` when
    /// the target is a forward symbolic reference to be resolved by
    /// `declare_symbol` + `Context::link`).
    pub fn call(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::Call, IntSize::I64.code(), 0, addr)
    }

    /// Indirect call through the address held in `dest`.
    pub fn call_indirect(&mut self, dest: u8) -> CodegenResult<()> {
        self.emit_rel(Opcode::CallIndirect, IntSize::I64.code(), dest, 0)
    }

    /// Unconditional branch to `addr`.
    pub fn branch(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::Branch, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the previous compare was equal.
    pub fn branch_equal(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchEqual, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the previous compare was not equal.
    pub fn branch_not_equal(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchNotEqual, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the previous compare was less-than.
    pub fn branch_less_than(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchLessThan, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the previous compare was less-than-or-equal.
    pub fn branch_less_equal(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchLessEqual, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the previous compare was greater-than.
    pub fn branch_greater_than(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchGreaterThan, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the previous compare was greater-than-or-equal.
    pub fn branch_greater_equal(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchGreaterEqual, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the carry flag is set.
    pub fn branch_carry(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchCarry, IntSize::I64.code(), 0, addr)
    }

    /// Branch to `addr` if the previous arithmetic op overflowed.
    pub fn branch_overflow(&mut self, addr: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::BranchOverflow, IntSize::I64.code(), 0, addr)
    }

    /// Materialize the literal `imm` into `dest`.
    pub fn imove_immediate(&mut self, size: IntSize, dest: u8, imm: u64) -> CodegenResult<()> {
        self.emit_rel(Opcode::IMoveImmediate, size.code(), dest, imm)?;
        self.push_operand(gp(dest, size.code(), None), Operand::Immediate(imm));
        Ok(())
    }

    // -- Integer arithmetic (no operand-matrix entry) -----------------------

    /// `dest = src1 + src2`.
    pub fn iadd(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IAdd, size.code(), dest, src1, src2)
    }

    /// `dest = src1 + src2`, also updating the carry flag.
    pub fn iadd_carry(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IAddCarry, size.code(), dest, src1, src2)
    }

    /// `dest = src1 & src2`.
    pub fn iand(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IAnd, size.code(), dest, src1, src2)
    }

    /// `dest = src1 | src2`.
    pub fn ior(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IOr, size.code(), dest, src1, src2)
    }

    /// `dest = src1 ^ src2`.
    pub fn ixor(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IXor, size.code(), dest, src1, src2)
    }

    /// `dest = src1 - src2`.
    pub fn isubtract(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::ISubtract, size.code(), dest, src1, src2)
    }

    /// Compare `src1` against `src2`, leaving flags for a subsequent
    /// `branch_*`.
    pub fn icompare(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::ICompare, size.code(), dest, src1, src2)
    }

    /// `dest = src1 * src2` (unsigned).
    pub fn imultiply_unsigned(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IMultiplyUnsigned, size.code(), dest, src1, src2)
    }

    /// `dest = src1 * src2` (signed).
    pub fn imultiply_signed(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IMultiplySigned, size.code(), dest, src1, src2)
    }

    /// `dest = src1 / src2` (unsigned).
    pub fn idivide_unsigned(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IDivideUnsigned, size.code(), dest, src1, src2)
    }

    /// `dest = src1 / src2` (signed).
    pub fn idivide_signed(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IDivideSigned, size.code(), dest, src1, src2)
    }

    /// `dest = src1 % src2` (unsigned).
    pub fn imodulo_unsigned(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IModuloUnsigned, size.code(), dest, src1, src2)
    }

    /// `dest = src1 % src2` (signed).
    pub fn imodulo_signed(&mut self, size: IntSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IModuloSigned, size.code(), dest, src1, src2)
    }

    // -- Integer memory / stack / moves (operand-matrix entries) ------------

    /// `dest = *[base + index]`.
    pub fn iload(&mut self, size: IntSize, dest: u8, base: u8, index: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::ILoad, size.code(), dest, base, index)?;
        self.push_operand(
            gp(dest, size.code(), None),
            Operand::MemIndirect {
                base,
                index: MemIndex::Register(index),
            },
        );
        Ok(())
    }

    /// `*[base + index] = value`.
    pub fn istore(&mut self, size: IntSize, base: u8, index: u8, value: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IStore, size.code(), base, index, value)?;
        self.push_operand(
            Operand::MemIndirect {
                base,
                index: MemIndex::Register(index),
            },
            gp(value, size.code(), None),
        );
        Ok(())
    }

    /// Pop the top of the integer stack into `dest`.
    pub fn ipop(&mut self, size: IntSize, dest: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IPop, size.code(), dest, 0, 0)?;
        self.push_operand(
            gp(dest, size.code(), None),
            Operand::MemBase { base: RSP, offset: -8 },
        );
        Ok(())
    }

    /// Push `src` onto the integer stack.
    pub fn ipush(&mut self, size: IntSize, src: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::IPush, size.code(), src, 0, 0)?;
        self.push_operand(
            Operand::MemIndirect {
                base: RSP,
                index: MemIndex::Immediate(0),
            },
            gp(src, size.code(), None),
        );
        Ok(())
    }

    /// `dest = zero_extend(src)`.
    pub fn imove_unsigned(&mut self, size: IntSize, dest: u8, src: u8, from_size: IntSize) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::IMoveUnsigned, size.code(), dest, src, from_size.code())?;
        self.push_operand(
            gp(dest, size.code(), Some(false)),
            gp(src, from_size.code(), Some(false)),
        );
        Ok(())
    }

    /// `dest = sign_extend(src)`.
    pub fn imove_signed(&mut self, size: IntSize, dest: u8, src: u8, from_size: IntSize) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::IMoveSigned, size.code(), dest, src, from_size.code())?;
        self.push_operand(
            gp(dest, size.code(), Some(true)),
            gp(src, from_size.code(), Some(true)),
        );
        Ok(())
    }

    // -- Floating point -------------------------------------------------

    /// `dest = src1 + src2`.
    pub fn fadd(&mut self, size: FloatSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FAdd, size.code(), dest, src1, src2)
    }

    /// `dest = src1 - src2`.
    pub fn fsubtract(&mut self, size: FloatSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FSubtract, size.code(), dest, src1, src2)
    }

    /// Compare `src1` against `src2`, leaving flags for a subsequent
    /// `branch_*`.
    pub fn fcompare(&mut self, size: FloatSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FCompare, size.code(), dest, src1, src2)
    }

    /// `dest = src1 * src2`.
    pub fn fmultiply(&mut self, size: FloatSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FMultiply, size.code(), dest, src1, src2)
    }

    /// `dest = src1 / src2`.
    pub fn fdivide(&mut self, size: FloatSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FDivide, size.code(), dest, src1, src2)
    }

    /// `dest = src` (same size, register to register).
    pub fn fmove(&mut self, size: FloatSize, dest: u8, src: u8) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::FMove, size.code(), dest, src, 0)?;
        self.push_operand(fp(dest, size.code(), None), fp(src, size.code(), None));
        Ok(())
    }

    /// `dest = *[base + index]`.
    pub fn fload(&mut self, size: FloatSize, dest: u8, base: u8, index: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FLoad, size.code(), dest, base, index)?;
        self.push_operand(
            fp(dest, size.code(), None),
            Operand::MemIndirect {
                base,
                index: MemIndex::Register(index),
            },
        );
        Ok(())
    }

    /// `*[base + index] = value`.
    pub fn fstore(&mut self, size: FloatSize, base: u8, index: u8, value: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FStore, size.code(), base, index, value)?;
        self.push_operand(
            Operand::MemIndirect {
                base,
                index: MemIndex::Register(index),
            },
            fp(value, size.code(), None),
        );
        Ok(())
    }

    /// Pop the top of the float stack into `dest`.
    pub fn fpop(&mut self, size: FloatSize, dest: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FPop, size.code(), dest, 0, 0)?;
        self.push_operand(
            fp(dest, size.code(), None),
            Operand::MemBase { base: RSP, offset: -8 },
        );
        Ok(())
    }

    /// Push `src` onto the float stack.
    pub fn fpush(&mut self, size: FloatSize, src: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::FPush, size.code(), src, 0, 0)?;
        self.push_operand(
            Operand::MemIndirect {
                base: RSP,
                index: MemIndex::Immediate(0),
            },
            fp(src, size.code(), None),
        );
        Ok(())
    }

    /// `dest (int) = truncate_to_int(src (float))`.
    pub fn f2i(&mut self, dest: u8, src: u8, float_size: FloatSize, int_size: IntSize) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::F2I, float_size.code(), dest, src, int_size.code())
    }

    /// `dest (float) = convert_from_int(src (int))`.
    pub fn i2f(&mut self, dest: u8, src: u8, int_size: IntSize, float_size: FloatSize) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::I2F, float_size.code(), dest, src, int_size.code())
    }

    /// `dest (int) = bit_pattern_of(src (float))`.
    pub fn f2bits(&mut self, dest: u8, src: u8, float_size: FloatSize) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::F2Bits, float_size.code(), dest, src, 0)
    }

    /// `dest (float) = reinterpret_as_float(src (int))`.
    pub fn bits2f(&mut self, dest: u8, src: u8, float_size: FloatSize) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::Bits2F, float_size.code(), dest, src, 0)
    }

    /// Widen the float value in `reg` (single precision to double, in
    /// place).
    pub fn extend(&mut self, reg: u8) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::Extend, FloatSize::F32.code(), reg, reg, 0)
    }

    /// Narrow the float value in `reg` (double precision to single, in
    /// place). Shares `Extend`'s opcode value by design: direction is
    /// carried entirely by the size field.
    pub fn truncate(&mut self, reg: u8) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::Extend, FloatSize::F64.code(), reg, reg, 0)
    }

    // -- Vector -----------------------------------------------------------

    /// Elementwise `dest = src1 + src2`.
    pub fn vadd(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VAdd, size.code(), dest, src1, src2)
    }

    /// Elementwise `dest = src1 - src2`.
    pub fn vsubtract(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VSubtract, size.code(), dest, src1, src2)
    }

    /// `dest = src1 * scalar(src2)`.
    pub fn vmultiplyf(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VMultiplyF, size.code(), dest, src1, src2)
    }

    /// `dest = src1 / scalar(src2)`.
    pub fn vdividef(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VDivideF, size.code(), dest, src1, src2)
    }

    /// Elementwise `dest = src1 * src2`.
    pub fn vmultiply(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VMultiply, size.code(), dest, src1, src2)
    }

    /// Elementwise `dest = src1 / src2`.
    pub fn vdivide(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VDivide, size.code(), dest, src1, src2)
    }

    /// `dest = dot(src1, src2)`.
    pub fn vdot(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VDot, size.code(), dest, src1, src2)
    }

    /// `dest = cross(src1, src2)`.
    pub fn vcross(&mut self, size: VectorSize, dest: u8, src1: u8, src2: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VCross, size.code(), dest, src1, src2)
    }

    /// `dest = *[base + index]`.
    pub fn vload(&mut self, size: VectorSize, dest: u8, base: u8, index: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VLoad, size.code(), dest, base, index)?;
        self.push_operand(
            vreg(dest, size.code()),
            Operand::MemIndirect {
                base,
                index: MemIndex::Register(index),
            },
        );
        Ok(())
    }

    /// `*[base + index] = value`.
    pub fn vstore(&mut self, size: VectorSize, base: u8, index: u8, value: u8) -> CodegenResult<()> {
        self.emit_arith(Opcode::VStore, size.code(), base, index, value)?;
        self.push_operand(
            Operand::MemIndirect {
                base,
                index: MemIndex::Register(index),
            },
            vreg(value, size.code()),
        );
        Ok(())
    }

    /// `dest = widen(src)` to `to_size` lanes.
    pub fn vextend(&mut self, dest: u8, src: u8, to_size: VectorSize) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::VExtend, to_size.code(), dest, src, 0)
    }

    /// Narrow the vector value in `reg`, in place.
    ///
    /// Emits the dedicated `VTruncate` opcode. A prior revision of this
    /// façade emitted `VExtend` here by mistake; that bug is fixed.
    pub fn vtruncate(&mut self, reg: u8) -> CodegenResult<()> {
        self.emit_arith_b(Opcode::VTruncate, 0, reg, reg, 0)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::TryInto;

    use super::*;

    #[test]
    fn return_is_four_zero_bytes() {
        let mut buf = CodeBuffer::new(0);
        buf.ret().unwrap();
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.bytes(), &[Opcode::Return as u8, 0, 0, 0]);
    }

    #[test]
    fn immediate_move_records_matrix_entry() {
        let mut buf = CodeBuffer::new(0);
        buf.imove_immediate(IntSize::I32, 3, 0x00AA).unwrap();
        assert_eq!(buf.len(), 6);
        assert_eq!(&buf.bytes()[4..6], &[0xAA, 0x00]);
        assert_eq!(buf.matrix().len(), 1);
        let entry = &buf.matrix()[0];
        assert_eq!(entry.offset, buf.len());
        assert_eq!(entry.place, gp(3, IntSize::I32.code(), None));
        assert_eq!(entry.value, Operand::Immediate(0x00AA));
    }

    #[test]
    fn vtruncate_emits_its_own_opcode_not_vextend() {
        let mut buf = CodeBuffer::new(0);
        buf.vtruncate(5).unwrap();
        let header: [u8; 4] = buf.bytes()[0..4].try_into().unwrap();
        let inst = crate::buffer::decode(header);
        assert_eq!(inst.opcode, Opcode::VTruncate);
    }

    #[test]
    fn push_and_pop_record_stack_relative_operands() {
        let mut buf = CodeBuffer::new(0);
        buf.ipush(IntSize::I64, 7).unwrap();
        buf.ipop(IntSize::I64, 9).unwrap();
        assert_eq!(
            buf.matrix()[0].place,
            Operand::MemIndirect {
                base: RSP,
                index: MemIndex::Immediate(0)
            }
        );
        assert_eq!(
            buf.matrix()[1].value,
            Operand::MemBase { base: RSP, offset: -8 }
        );
    }

    #[test]
    fn arithmetic_triples_do_not_record_matrix_entries() {
        let mut buf = CodeBuffer::new(0);
        buf.iadd(IntSize::I32, 1, 2, 3).unwrap();
        assert!(buf.matrix().is_empty());
    }
}
