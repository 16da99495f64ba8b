//! Execute dispatch (spec.md §4.3 "Execute"): the four categories —
//! Register/ALU, Memory, Control transfer, Exception entry — implemented
//! as one big match over [`Mnemonic`]. Each arm returns the bus cycles
//! consumed; costs are approximate constants rather than a full
//! per-region access-cost table (see DESIGN.md).

use crate::bus::SysBus;
use crate::decode::{DecodedArgs, Mnemonic};

use super::exceptions::TRAPA_VECTOR_BASE;
use super::Sh2;

fn sext8(v: u32) -> u32 {
    (v as i8) as i32 as u32
}
fn sext16(v: u32) -> u32 {
    (v as i16) as i32 as u32
}

pub fn execute(cpu: &mut Sh2, m: Mnemonic, a: DecodedArgs, bus: &mut dyn SysBus) -> u32 {
    use Mnemonic::*;
    let n = a.rn as usize;
    let mrr = a.rm as usize;
    let branch_pc = cpu.pc.wrapping_sub(2);

    match m {
        Nop => 1,
        Sleep => {
            cpu.sleeping = true;
            3
        }
        MovR => {
            cpu.regs[n] = cpu.regs[mrr];
            1
        }
        MovbL => {
            cpu.regs[n] = sext8(cpu.read8(cpu.regs[mrr], bus) as u32);
            1
        }
        MovwL => {
            cpu.regs[n] = sext16(cpu.read16(cpu.regs[mrr], bus) as u32);
            1
        }
        MovlL => {
            cpu.regs[n] = cpu.read32(cpu.regs[mrr], bus);
            1
        }
        MovbL0 => {
            let addr = cpu.regs[mrr].wrapping_add(cpu.regs[0]);
            cpu.regs[n] = sext8(cpu.read8(addr, bus) as u32);
            1
        }
        MovwL0 => {
            let addr = cpu.regs[mrr].wrapping_add(cpu.regs[0]);
            cpu.regs[n] = sext16(cpu.read16(addr, bus) as u32);
            1
        }
        MovlL0 => {
            let addr = cpu.regs[mrr].wrapping_add(cpu.regs[0]);
            cpu.regs[n] = cpu.read32(addr, bus);
            1
        }
        MovbL4 => {
            let addr = cpu.regs[mrr].wrapping_add(a.disp_imm as u32);
            cpu.regs[0] = sext8(cpu.read8(addr, bus) as u32);
            1
        }
        MovwL4 => {
            let addr = cpu.regs[mrr].wrapping_add(a.disp_imm as u32);
            cpu.regs[0] = sext16(cpu.read16(addr, bus) as u32);
            1
        }
        MovlL4 => {
            let addr = cpu.regs[mrr].wrapping_add(a.disp_imm as u32);
            cpu.regs[n] = cpu.read32(addr, bus);
            1
        }
        MovbLg => {
            let addr = cpu.gbr.wrapping_add(a.disp_imm as u32);
            cpu.regs[0] = sext8(cpu.read8(addr, bus) as u32);
            1
        }
        MovwLg => {
            let addr = cpu.gbr.wrapping_add(a.disp_imm as u32);
            cpu.regs[0] = sext16(cpu.read16(addr, bus) as u32);
            1
        }
        MovlLg => {
            let addr = cpu.gbr.wrapping_add(a.disp_imm as u32);
            cpu.regs[0] = cpu.read32(addr, bus);
            1
        }
        MovbM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(1);
            cpu.write8(cpu.regs[n], cpu.regs[mrr] as u8, bus);
            1
        }
        MovwM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(2);
            cpu.write16(cpu.regs[n], cpu.regs[mrr] as u16, bus);
            1
        }
        MovlM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(4);
            cpu.write32(cpu.regs[n], cpu.regs[mrr], bus);
            1
        }
        MovbP => {
            let addr = cpu.regs[mrr];
            let val = sext8(cpu.read8(addr, bus) as u32);
            cpu.regs[mrr] = addr.wrapping_add(1);
            cpu.regs[n] = val;
            1
        }
        MovwP => {
            let addr = cpu.regs[mrr];
            let val = sext16(cpu.read16(addr, bus) as u32);
            cpu.regs[mrr] = addr.wrapping_add(2);
            cpu.regs[n] = val;
            1
        }
        MovlP => {
            let addr = cpu.regs[mrr];
            let val = cpu.read32(addr, bus);
            cpu.regs[mrr] = addr.wrapping_add(4);
            cpu.regs[n] = val;
            1
        }
        MovbS => {
            cpu.write8(cpu.regs[n], cpu.regs[mrr] as u8, bus);
            1
        }
        MovwS => {
            cpu.write16(cpu.regs[n], cpu.regs[mrr] as u16, bus);
            1
        }
        MovlS => {
            cpu.write32(cpu.regs[n], cpu.regs[mrr], bus);
            1
        }
        MovbS0 => {
            let addr = cpu.regs[n].wrapping_add(cpu.regs[0]);
            cpu.write8(addr, cpu.regs[mrr] as u8, bus);
            1
        }
        MovwS0 => {
            let addr = cpu.regs[n].wrapping_add(cpu.regs[0]);
            cpu.write16(addr, cpu.regs[mrr] as u16, bus);
            1
        }
        MovlS0 => {
            let addr = cpu.regs[n].wrapping_add(cpu.regs[0]);
            cpu.write32(addr, cpu.regs[mrr], bus);
            1
        }
        MovbS4 => {
            let addr = cpu.regs[n].wrapping_add(a.disp_imm as u32);
            cpu.write8(addr, cpu.regs[0] as u8, bus);
            1
        }
        MovwS4 => {
            let addr = cpu.regs[n].wrapping_add(a.disp_imm as u32);
            cpu.write16(addr, cpu.regs[0] as u16, bus);
            1
        }
        MovlS4 => {
            let addr = cpu.regs[n].wrapping_add(a.disp_imm as u32);
            cpu.write32(addr, cpu.regs[mrr], bus);
            1
        }
        MovbSg => {
            let addr = cpu.gbr.wrapping_add(a.disp_imm as u32);
            cpu.write8(addr, cpu.regs[0] as u8, bus);
            1
        }
        MovwSg => {
            let addr = cpu.gbr.wrapping_add(a.disp_imm as u32);
            cpu.write16(addr, cpu.regs[0] as u16, bus);
            1
        }
        MovlSg => {
            let addr = cpu.gbr.wrapping_add(a.disp_imm as u32);
            cpu.write32(addr, cpu.regs[0], bus);
            1
        }
        MovI => {
            cpu.regs[n] = a.disp_imm as u32;
            1
        }
        MovwI => {
            let addr = cpu.pc.wrapping_add(a.disp_imm as u32);
            cpu.regs[n] = sext16(cpu.read16(addr, bus) as u32);
            1
        }
        MovlI => {
            let addr = (cpu.pc & !3).wrapping_add(a.disp_imm as u32);
            cpu.regs[n] = cpu.read32(addr, bus);
            1
        }
        Mova => {
            cpu.regs[0] = (cpu.pc & !3).wrapping_add(a.disp_imm as u32);
            1
        }
        Movt => {
            cpu.regs[n] = cpu.sr.t() as u32;
            1
        }
        Clrt => {
            cpu.sr.set_t(false);
            1
        }
        Sett => {
            cpu.sr.set_t(true);
            1
        }
        Extub => {
            cpu.regs[n] = cpu.regs[mrr] & 0xFF;
            1
        }
        Extuw => {
            cpu.regs[n] = cpu.regs[mrr] & 0xFFFF;
            1
        }
        Extsb => {
            cpu.regs[n] = sext8(cpu.regs[mrr]);
            1
        }
        Extsw => {
            cpu.regs[n] = sext16(cpu.regs[mrr]);
            1
        }
        Swapb => {
            let v = cpu.regs[mrr];
            cpu.regs[n] = (v & 0xFFFF_0000) | ((v & 0xFF) << 8) | ((v >> 8) & 0xFF);
            1
        }
        Swapw => {
            let v = cpu.regs[mrr];
            cpu.regs[n] = (v << 16) | (v >> 16);
            1
        }
        Xtrct => {
            cpu.regs[n] = (cpu.regs[n] >> 16) | (cpu.regs[mrr] << 16);
            1
        }
        StcSrR => {
            cpu.regs[n] = cpu.sr.0;
            1
        }
        StcGbrR => {
            cpu.regs[n] = cpu.gbr;
            1
        }
        StcVbrR => {
            cpu.regs[n] = cpu.vbr;
            1
        }
        LdcSrR => {
            cpu.sr.0 = cpu.regs[n];
            1
        }
        LdcGbrR => {
            cpu.gbr = cpu.regs[n];
            1
        }
        LdcVbrR => {
            cpu.vbr = cpu.regs[n];
            1
        }
        StcSrM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(4);
            cpu.write32(cpu.regs[n], cpu.sr.0, bus);
            1
        }
        StcGbrM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(4);
            cpu.write32(cpu.regs[n], cpu.gbr, bus);
            1
        }
        StcVbrM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(4);
            cpu.write32(cpu.regs[n], cpu.vbr, bus);
            1
        }
        LdcSrM => {
            cpu.sr.0 = cpu.read32(cpu.regs[n], bus);
            cpu.regs[n] = cpu.regs[n].wrapping_add(4);
            1
        }
        LdcGbrM => {
            cpu.gbr = cpu.read32(cpu.regs[n], bus);
            cpu.regs[n] = cpu.regs[n].wrapping_add(4);
            1
        }
        LdcVbrM => {
            cpu.vbr = cpu.read32(cpu.regs[n], bus);
            cpu.regs[n] = cpu.regs[n].wrapping_add(4);
            1
        }
        StsMachR => {
            cpu.regs[n] = cpu.mach;
            1
        }
        StsMaclR => {
            cpu.regs[n] = cpu.macl;
            1
        }
        StsPrR => {
            cpu.regs[n] = cpu.pr;
            1
        }
        LdsMachR => {
            cpu.mach = cpu.regs[n];
            1
        }
        LdsMaclR => {
            cpu.macl = cpu.regs[n];
            1
        }
        LdsPrR => {
            cpu.pr = cpu.regs[n];
            1
        }
        StsMachM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(4);
            cpu.write32(cpu.regs[n], cpu.mach, bus);
            1
        }
        StsMaclM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(4);
            cpu.write32(cpu.regs[n], cpu.macl, bus);
            1
        }
        StsPrM => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(4);
            cpu.write32(cpu.regs[n], cpu.pr, bus);
            1
        }
        LdsMachM => {
            cpu.mach = cpu.read32(cpu.regs[n], bus);
            cpu.regs[n] = cpu.regs[n].wrapping_add(4);
            1
        }
        LdsMaclM => {
            cpu.macl = cpu.read32(cpu.regs[n], bus);
            cpu.regs[n] = cpu.regs[n].wrapping_add(4);
            1
        }
        LdsPrM => {
            cpu.pr = cpu.read32(cpu.regs[n], bus);
            cpu.regs[n] = cpu.regs[n].wrapping_add(4);
            1
        }
        Add => {
            cpu.regs[n] = cpu.regs[n].wrapping_add(cpu.regs[mrr]);
            1
        }
        AddI => {
            cpu.regs[n] = cpu.regs[n].wrapping_add(a.disp_imm as u32);
            1
        }
        Addc => {
            let (r1, c1) = cpu.regs[n].overflowing_add(cpu.regs[mrr]);
            let (r2, c2) = r1.overflowing_add(cpu.sr.t() as u32);
            cpu.regs[n] = r2;
            cpu.sr.set_t(c1 || c2);
            1
        }
        Addv => {
            let rn = cpu.regs[n] as i32;
            let rm = cpu.regs[mrr] as i32;
            let (res, overflow) = rn.overflowing_add(rm);
            cpu.regs[n] = res as u32;
            cpu.sr.set_t(overflow);
            1
        }
        AndR => {
            cpu.regs[n] &= cpu.regs[mrr];
            1
        }
        AndI => {
            cpu.regs[0] &= a.disp_imm as u32;
            1
        }
        AndM => {
            let addr = cpu.gbr.wrapping_add(cpu.regs[0]);
            let v = cpu.read8(addr, bus) & (a.disp_imm as u8);
            cpu.write8(addr, v, bus);
            3
        }
        Neg => {
            cpu.regs[n] = (cpu.regs[mrr] as i32).wrapping_neg() as u32;
            1
        }
        Negc => {
            let (r1, b1) = 0u32.overflowing_sub(cpu.regs[mrr]);
            let (r2, b2) = r1.overflowing_sub(cpu.sr.t() as u32);
            cpu.regs[n] = r2;
            cpu.sr.set_t(b1 || b2);
            1
        }
        Not => {
            cpu.regs[n] = !cpu.regs[mrr];
            1
        }
        OrR => {
            cpu.regs[n] |= cpu.regs[mrr];
            1
        }
        OrI => {
            cpu.regs[0] |= a.disp_imm as u32;
            1
        }
        OrM => {
            let addr = cpu.gbr.wrapping_add(cpu.regs[0]);
            let v = cpu.read8(addr, bus) | (a.disp_imm as u8);
            cpu.write8(addr, v, bus);
            3
        }
        Rotcl => {
            let carry = cpu.regs[n] & 0x8000_0000 != 0;
            cpu.regs[n] = (cpu.regs[n] << 1) | (cpu.sr.t() as u32);
            cpu.sr.set_t(carry);
            1
        }
        Rotcr => {
            let carry = cpu.regs[n] & 1 != 0;
            cpu.regs[n] = (cpu.regs[n] >> 1) | ((cpu.sr.t() as u32) << 31);
            cpu.sr.set_t(carry);
            1
        }
        Rotl => {
            let carry = cpu.regs[n] & 0x8000_0000 != 0;
            cpu.regs[n] = cpu.regs[n].rotate_left(1);
            cpu.sr.set_t(carry);
            1
        }
        Rotr => {
            let carry = cpu.regs[n] & 1 != 0;
            cpu.regs[n] = cpu.regs[n].rotate_right(1);
            cpu.sr.set_t(carry);
            1
        }
        Shal => {
            let carry = cpu.regs[n] & 0x8000_0000 != 0;
            cpu.regs[n] <<= 1;
            cpu.sr.set_t(carry);
            1
        }
        Shar => {
            let carry = cpu.regs[n] & 1 != 0;
            cpu.regs[n] = ((cpu.regs[n] as i32) >> 1) as u32;
            cpu.sr.set_t(carry);
            1
        }
        Shll => {
            let carry = cpu.regs[n] & 0x8000_0000 != 0;
            cpu.regs[n] <<= 1;
            cpu.sr.set_t(carry);
            1
        }
        Shlr => {
            let carry = cpu.regs[n] & 1 != 0;
            cpu.regs[n] >>= 1;
            cpu.sr.set_t(carry);
            1
        }
        Shll2 => {
            cpu.regs[n] <<= 2;
            1
        }
        Shll8 => {
            cpu.regs[n] <<= 8;
            1
        }
        Shll16 => {
            cpu.regs[n] <<= 16;
            1
        }
        Shlr2 => {
            cpu.regs[n] >>= 2;
            1
        }
        Shlr8 => {
            cpu.regs[n] >>= 8;
            1
        }
        Shlr16 => {
            cpu.regs[n] >>= 16;
            1
        }
        Sub => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(cpu.regs[mrr]);
            1
        }
        Subc => {
            let (r1, b1) = cpu.regs[n].overflowing_sub(cpu.regs[mrr]);
            let (r2, b2) = r1.overflowing_sub(cpu.sr.t() as u32);
            cpu.regs[n] = r2;
            cpu.sr.set_t(b1 || b2);
            1
        }
        Subv => {
            let rn = cpu.regs[n] as i32;
            let rm = cpu.regs[mrr] as i32;
            let (res, overflow) = rn.overflowing_sub(rm);
            cpu.regs[n] = res as u32;
            cpu.sr.set_t(overflow);
            1
        }
        XorR => {
            cpu.regs[n] ^= cpu.regs[mrr];
            1
        }
        XorI => {
            cpu.regs[0] ^= a.disp_imm as u32;
            1
        }
        XorM => {
            let addr = cpu.gbr.wrapping_add(cpu.regs[0]);
            let v = cpu.read8(addr, bus) ^ (a.disp_imm as u8);
            cpu.write8(addr, v, bus);
            3
        }
        Dt => {
            cpu.regs[n] = cpu.regs[n].wrapping_sub(1);
            cpu.sr.set_t(cpu.regs[n] == 0);
            1
        }
        Clrmac => {
            cpu.mach = 0;
            cpu.macl = 0;
            1
        }
        Macw => {
            let av = sext16(cpu.read16(cpu.regs[mrr], bus) as u32) as i32;
            let bv = sext16(cpu.read16(cpu.regs[n], bus) as u32) as i32;
            cpu.regs[mrr] = cpu.regs[mrr].wrapping_add(2);
            cpu.regs[n] = cpu.regs[n].wrapping_add(2);
            let product = (av as i64) * (bv as i64);
            let acc = (((cpu.mach as u64) << 32) | cpu.macl as u64) as i64;
            let mut sum = acc.wrapping_add(product);
            if cpu.sr.s() {
                // 16.16 saturating accumulator (spec.md §4.3).
                let max = 0x0000_7FFF_FFFFi64;
                let min = -0x0000_8000_0000i64;
                if sum > max {
                    sum = max;
                    cpu.mach = 1;
                } else if sum < min {
                    sum = min;
                    cpu.mach = 1;
                }
            }
            cpu.mach = if cpu.sr.s() && (sum == 0x0000_7FFF_FFFF || sum == -0x0000_8000_0000) {
                cpu.mach
            } else {
                (sum >> 32) as u32
            };
            cpu.macl = sum as u32;
            2
        }
        Macl => {
            let av = cpu.read32(cpu.regs[mrr], bus) as i32 as i64;
            let bv = cpu.read32(cpu.regs[n], bus) as i32 as i64;
            cpu.regs[mrr] = cpu.regs[mrr].wrapping_add(4);
            cpu.regs[n] = cpu.regs[n].wrapping_add(4);
            let product = av * bv;
            let acc = (((cpu.mach as u64) << 32) | cpu.macl as u64) as i64;
            let mut sum = acc.wrapping_add(product);
            if cpu.sr.s() {
                const MAX47: i64 = (1i64 << 47) - 1;
                const MIN47: i64 = -(1i64 << 47);
                if sum > MAX47 {
                    sum = MAX47;
                } else if sum < MIN47 {
                    sum = MIN47;
                }
            }
            cpu.mach = (sum >> 32) as u32;
            cpu.macl = sum as u32;
            2
        }
        Mul => {
            cpu.macl = cpu.regs[n].wrapping_mul(cpu.regs[mrr]);
            2
        }
        Muls => {
            let a = (cpu.regs[n] as i16) as i32;
            let b = (cpu.regs[mrr] as i16) as i32;
            cpu.macl = (a * b) as u32;
            2
        }
        Mulu => {
            let a = cpu.regs[n] & 0xFFFF;
            let b = cpu.regs[mrr] & 0xFFFF;
            cpu.macl = a * b;
            2
        }
        Dmuls => {
            let result = (cpu.regs[n] as i32 as i64) * (cpu.regs[mrr] as i32 as i64);
            cpu.mach = (result >> 32) as u32;
            cpu.macl = result as u32;
            2
        }
        Dmulu => {
            let result = (cpu.regs[n] as u64) * (cpu.regs[mrr] as u64);
            cpu.mach = (result >> 32) as u32;
            cpu.macl = result as u32;
            2
        }
        Div0s => {
            let q = cpu.regs[n] & 0x8000_0000 != 0;
            let mbit = cpu.regs[mrr] & 0x8000_0000 != 0;
            cpu.sr.set_q(q);
            cpu.sr.set_m(mbit);
            cpu.sr.set_t(q != mbit);
            1
        }
        Div0u => {
            cpu.sr.set_q(false);
            cpu.sr.set_m(false);
            cpu.sr.set_t(false);
            1
        }
        Div1 => {
            div1(cpu, n, mrr);
            1
        }
        CmpEqI => {
            cpu.sr.set_t(cpu.regs[0] as i32 == a.disp_imm);
            1
        }
        CmpEqR => {
            cpu.sr.set_t(cpu.regs[n] == cpu.regs[mrr]);
            1
        }
        CmpGe => {
            cpu.sr.set_t((cpu.regs[n] as i32) >= (cpu.regs[mrr] as i32));
            1
        }
        CmpGt => {
            cpu.sr.set_t((cpu.regs[n] as i32) > (cpu.regs[mrr] as i32));
            1
        }
        CmpHi => {
            cpu.sr.set_t(cpu.regs[n] > cpu.regs[mrr]);
            1
        }
        CmpHs => {
            cpu.sr.set_t(cpu.regs[n] >= cpu.regs[mrr]);
            1
        }
        CmpPl => {
            cpu.sr.set_t((cpu.regs[n] as i32) > 0);
            1
        }
        CmpPz => {
            cpu.sr.set_t((cpu.regs[n] as i32) >= 0);
            1
        }
        CmpStr => {
            let x = cpu.regs[n] ^ cpu.regs[mrr];
            let any_zero_byte =
                x & 0xFF == 0 || (x >> 8) & 0xFF == 0 || (x >> 16) & 0xFF == 0 || (x >> 24) & 0xFF == 0;
            cpu.sr.set_t(any_zero_byte);
            1
        }
        Tas => {
            let addr = cpu.regs[n];
            let v = cpu.read8(addr, bus);
            cpu.sr.set_t(v == 0);
            cpu.write8(addr, v | 0x80, bus);
            4
        }
        TstR => {
            cpu.sr.set_t(cpu.regs[n] & cpu.regs[mrr] == 0);
            1
        }
        TstI => {
            cpu.sr.set_t(cpu.regs[0] & (a.disp_imm as u32) == 0);
            1
        }
        TstM => {
            let addr = cpu.gbr.wrapping_add(cpu.regs[0]);
            let v = cpu.read8(addr, bus);
            cpu.sr.set_t(v as u32 & (a.disp_imm as u32) == 0);
            3
        }
        Bf => {
            if !cpu.sr.t() {
                cpu.pc = branch_pc.wrapping_add(4).wrapping_add((a.disp_imm * 2) as u32);
                3
            } else {
                1
            }
        }
        Bt => {
            if cpu.sr.t() {
                cpu.pc = branch_pc.wrapping_add(4).wrapping_add((a.disp_imm * 2) as u32);
                3
            } else {
                1
            }
        }
        Bfs => {
            if !cpu.sr.t() {
                let target = branch_pc.wrapping_add(4).wrapping_add((a.disp_imm * 2) as u32);
                cpu.set_delay_slot(target);
            }
            1
        }
        Bts => {
            if cpu.sr.t() {
                let target = branch_pc.wrapping_add(4).wrapping_add((a.disp_imm * 2) as u32);
                cpu.set_delay_slot(target);
            }
            1
        }
        Bra => {
            let target = branch_pc.wrapping_add(4).wrapping_add(a.disp_imm as u32);
            cpu.set_delay_slot(target);
            1
        }
        Braf => {
            let target = branch_pc.wrapping_add(4).wrapping_add(cpu.regs[mrr]);
            cpu.set_delay_slot(target);
            1
        }
        Bsr => {
            cpu.pr = branch_pc.wrapping_add(4);
            let target = branch_pc.wrapping_add(4).wrapping_add(a.disp_imm as u32);
            cpu.set_delay_slot(target);
            1
        }
        Bsrf => {
            cpu.pr = branch_pc.wrapping_add(4);
            let target = branch_pc.wrapping_add(4).wrapping_add(cpu.regs[mrr]);
            cpu.set_delay_slot(target);
            1
        }
        Jmp => {
            let target = cpu.regs[mrr];
            cpu.set_delay_slot(target);
            1
        }
        Jsr => {
            cpu.pr = branch_pc.wrapping_add(4);
            let target = cpu.regs[mrr];
            cpu.set_delay_slot(target);
            1
        }
        Rts => {
            let target = cpu.pr;
            cpu.set_delay_slot(target);
            1
        }
        Trapa => {
            cpu.regs[15] = cpu.regs[15].wrapping_sub(4);
            cpu.write32(cpu.regs[15], cpu.sr.0, bus);
            cpu.regs[15] = cpu.regs[15].wrapping_sub(4);
            cpu.write32(cpu.regs[15], cpu.pc, bus);
            cpu.pc = cpu.read32(cpu.vbr.wrapping_add((TRAPA_VECTOR_BASE as u32 + a.disp_imm as u32) * 4), bus);
            8
        }
        Rte => {
            let saved_pc = cpu.read32(cpu.regs[15], bus);
            let saved_sr = cpu.read32(cpu.regs[15].wrapping_add(4), bus);
            cpu.regs[15] = cpu.regs[15].wrapping_add(8);
            cpu.sr.0 = saved_sr;
            cpu.set_delay_slot(saved_pc);
            4
        }
        Illegal | IllegalSlot => 1,
    }
}

/// SH-2 DIV1 single-step division (spec.md §3 "DIVU" note: a parallel
/// 1-bit-per-instruction divider feeds the T/Q/M flags). Overflow-flag
/// based formulation, matching widely documented SH-2 implementations.
fn div1(cpu: &mut Sh2, n: usize, m: usize) {
    let old_q = cpu.sr.q();
    let q = cpu.regs[n] & 0x8000_0000 != 0;
    let mut val = (cpu.regs[n] << 1) | (cpu.sr.t() as u32);
    let mbit = cpu.sr.m();
    let new_q;
    if !old_q {
        if !mbit {
            let (res, carry) = val.overflowing_sub(cpu.regs[m]);
            val = res;
            new_q = if q { !carry } else { carry };
        } else {
            let (res, carry) = val.overflowing_add(cpu.regs[m]);
            val = res;
            new_q = if q { carry } else { !carry };
        }
    } else if !mbit {
        let (res, carry) = val.overflowing_add(cpu.regs[m]);
        val = res;
        new_q = if q { carry } else { !carry };
    } else {
        let (res, carry) = val.overflowing_sub(cpu.regs[m]);
        val = res;
        new_q = if q { !carry } else { carry };
    }
    cpu.regs[n] = val;
    cpu.sr.set_q(new_q);
    cpu.sr.set_t(new_q == mbit);
}
