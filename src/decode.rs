//! Decode Tables (`Dec`, spec.md §4.1).
//!
//! Pure functions translating a 16-bit SH-2 opcode into a [`Mnemonic`]
//! dispatch token plus a [`DecodedArgs`] operand record (`Rn`, `Rm`, and a
//! signed displacement/immediate). There is nothing to build "once at
//! startup": unlike the teacher's `parser::parse_instruction`, which reads
//! straight off the live `CPU`, SH-2 decoding needs no machine state at
//! all, so the whole module is a set of `const fn`-friendly, allocation-free
//! functions rather than a struct the teacher would construct in `CPU::new`.
//!
//! The opcode space and mnemonic names follow the SH-2 programming manual's
//! encoding families, cross-checked against
//! `examples/original_source/libs/ymir-core/include/ymir/hw/sh2/sh2_decode.hpp`.

/// Dispatch token produced by [`decode`]. Every bit pattern in `0..=0xFFFF`
/// maps to exactly one of these (the round-trip property in spec.md §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Nop,
    Sleep,
    MovR,
    MovbL,
    MovwL,
    MovlL,
    MovbL0,
    MovwL0,
    MovlL0,
    MovbL4,
    MovwL4,
    MovlL4,
    MovbLg,
    MovwLg,
    MovlLg,
    MovbM,
    MovwM,
    MovlM,
    MovbP,
    MovwP,
    MovlP,
    MovbS,
    MovwS,
    MovlS,
    MovbS0,
    MovwS0,
    MovlS0,
    MovbS4,
    MovwS4,
    MovlS4,
    MovbSg,
    MovwSg,
    MovlSg,
    MovI,
    MovwI,
    MovlI,
    Mova,
    Movt,
    Clrt,
    Sett,
    Extub,
    Extuw,
    Extsb,
    Extsw,
    Swapb,
    Swapw,
    Xtrct,
    LdcGbrR,
    LdcSrR,
    LdcVbrR,
    LdcGbrM,
    LdcSrM,
    LdcVbrM,
    LdsMachR,
    LdsMaclR,
    LdsPrR,
    LdsMachM,
    LdsMaclM,
    LdsPrM,
    StcGbrR,
    StcSrR,
    StcVbrR,
    StcGbrM,
    StcSrM,
    StcVbrM,
    StsMachR,
    StsMaclR,
    StsPrR,
    StsMachM,
    StsMaclM,
    StsPrM,
    Add,
    AddI,
    Addc,
    Addv,
    AndR,
    AndI,
    AndM,
    Neg,
    Negc,
    Not,
    OrR,
    OrI,
    OrM,
    Rotcl,
    Rotcr,
    Rotl,
    Rotr,
    Shal,
    Shar,
    Shll,
    Shll2,
    Shll8,
    Shll16,
    Shlr,
    Shlr2,
    Shlr8,
    Shlr16,
    Sub,
    Subc,
    Subv,
    XorR,
    XorI,
    XorM,
    Dt,
    Clrmac,
    Macw,
    Macl,
    Mul,
    Muls,
    Mulu,
    Dmuls,
    Dmulu,
    Div0s,
    Div0u,
    Div1,
    CmpEqI,
    CmpEqR,
    CmpGe,
    CmpGt,
    CmpHi,
    CmpHs,
    CmpPl,
    CmpPz,
    CmpStr,
    Tas,
    TstR,
    TstI,
    TstM,
    Bf,
    Bfs,
    Bt,
    Bts,
    Bra,
    Braf,
    Bsr,
    Bsrf,
    Jmp,
    Jsr,
    Trapa,
    Rte,
    Rts,
    /// General illegal-instruction token (spec.md §4.1 edge case: `0100
    /// 1010 1111 1100` must decode here, not to the slot variant).
    Illegal,
    /// Produced only by [`decode_in_delay_slot`] when the instruction
    /// fetched through the delay-slot path cannot legally occupy one.
    IllegalSlot,
}

/// Pre-extracted operand fields. `rn`/`rm` are always in `0..=15`
/// (`rm` is meaningless — left 0 — for single-register forms).
/// `disp_imm` covers displacements, 8-bit immediates sign/zero-extended
/// as the instruction requires, and 12-bit branch displacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodedArgs {
    pub rn: u8,
    pub rm: u8,
    pub disp_imm: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub mnemonic: Mnemonic,
    pub args: DecodedArgs,
}

fn nibble(op: u16, i: u32) -> u16 {
    (op >> (i * 4)) & 0xF
}

/// Decode one opcode for normal (non-delay-slot) fetch.
pub fn decode(op: u16) -> Decoded {
    use Mnemonic::*;
    let n = nibble(op, 2) as u8;
    let m = nibble(op, 1) as u8;
    let d4 = (op & 0xF) as i32;
    let d8 = (op & 0xFF) as i32;
    let d8s = (op as i8 as i32) & 0xFF | if op & 0x80 != 0 { !0xFFi32 } else { 0 };
    let imm8 = (op & 0xFF) as u8;
    let imm8s = imm8 as i8 as i32;
    let d12 = {
        let raw = op & 0x0FFF;
        if raw & 0x800 != 0 {
            (raw as i32) - 0x1000
        } else {
            raw as i32
        }
    };
    let args_nm = DecodedArgs { rn: n, rm: m, disp_imm: 0 };
    let args_n = DecodedArgs { rn: n, rm: 0, disp_imm: 0 };
    let args_m = DecodedArgs { rn: 0, rm: m, disp_imm: 0 };

    let top = nibble(op, 3);
    let (mnemonic, args) = match top {
        0x0 => match op & 0xF {
            0x2 => match nibble(op, 1) {
                0x0 => (StcSrR, args_n),
                0x1 => (StcGbrR, args_n),
                0x2 => (StcVbrR, args_n),
                _ => (Illegal, args_n),
            },
            0x3 => match nibble(op, 1) {
                0x0 => (Bsrf, args_m),
                0x2 => (Braf, args_m),
                _ => (Illegal, args_m),
            },
            0x4 => (MovbS0, args_nm),
            0x5 => (MovwS0, args_nm),
            0x6 => (MovlS0, args_nm),
            0x7 => (Mul, args_nm),
            0x8 if op == 0x0008 => (Clrt, args_nm),
            0x8 => (StsMachR, args_n),
            0x9 if op == 0x0009 => (Nop, args_nm),
            0x9 if op == 0x0019 => (Div0u, args_nm),
            0x9 => match nibble(op, 1) {
                0x0 => (Movt, args_n),
                0x1 => (StsMaclR, args_n),
                0x2 => (StsPrR, args_n),
                _ => (Illegal, args_n),
            },
            0xA => (StsMachR, args_n),
            0xB if op == 0x000B => (Rts, args_nm),
            0xB if op == 0x001B => (Sleep, args_nm),
            0xB if op == 0x002B => (Rte, args_nm),
            0xC => (MovbL0, args_nm),
            0xD => (MovwL0, args_nm),
            0xE => (MovlL0, args_nm),
            0xF => (Macl, args_nm),
            _ => (Illegal, args_nm),
        },
        0x1 => (MovlS4, DecodedArgs { rn: n, rm: m, disp_imm: d4 * 4 }),
        0x2 => match op & 0xF {
            0x0 => (MovbS, args_nm),
            0x1 => (MovwS, args_nm),
            0x2 => (MovlS, args_nm),
            0x4 => (MovbM, args_nm),
            0x5 => (MovwM, args_nm),
            0x6 => (MovlM, args_nm),
            0x7 => (Div0s, args_nm),
            0x8 => (TstR, args_nm),
            0x9 => (AndR, args_nm),
            0xA => (OrR, args_nm),
            0xB => (XorR, args_nm),
            0xC => (CmpStr, args_nm),
            0xD => (Xtrct, args_nm),
            0xE => (Mulu, args_nm),
            0xF => (Muls, args_nm),
            _ => (Illegal, args_nm),
        },
        0x3 => match op & 0xF {
            0x0 => (CmpEqR, args_nm),
            0x2 => (CmpHs, args_nm),
            0x3 => (CmpGe, args_nm),
            0x4 => (Div1, args_nm),
            0x5 => (Dmulu, args_nm),
            0x6 => (CmpHi, args_nm),
            0x7 => (CmpGt, args_nm),
            0x8 => (Sub, args_nm),
            0xA => (Subc, args_nm),
            0xB => (Subv, args_nm),
            0xC => (Add, args_nm),
            0xD => (Dmuls, args_nm),
            0xE => (Addc, args_nm),
            0xF => (Addv, args_nm),
            _ => (Illegal, args_nm),
        },
        0x4 => match op & 0xFF {
            0x00 => (Shll, args_n),
            0x01 => (Shlr, args_n),
            0x02 => (StsMachM, args_n),
            0x03 => (StcSrM, args_n),
            0x04 => (Rotl, args_n),
            0x05 => (Rotr, args_n),
            0x06 => (LdsMachM, args_n),
            0x07 => (LdcSrM, args_n),
            0x08 => (Shll2, args_n),
            0x09 => (Shlr2, args_n),
            0x0A => (LdsMachR, args_n),
            0x0B if (op & 0xF0FF) == 0x40FC => (Illegal, args_n),
            0x0B => (Jsr, args_m),
            0x0E => (LdcSrR, args_n),
            0x10 => (Dt, args_n),
            0x11 => (CmpPz, args_n),
            0x12 => (StsMaclM, args_n),
            0x13 => (StcGbrM, args_n),
            0x15 => (CmpPl, args_n),
            0x16 => (LdsMaclM, args_n),
            0x17 => (LdcGbrM, args_n),
            0x18 => (Shll8, args_n),
            0x19 => (Shlr8, args_n),
            0x1A => (LdsMaclR, args_n),
            0x1B => (Tas, args_n),
            0x1E => (LdcGbrR, args_n),
            0x20 => (Shal, args_n),
            0x21 => (Shar, args_n),
            0x22 => (StsPrM, args_n),
            0x23 => (StcVbrM, args_n),
            0x24 => (Rotcl, args_n),
            0x25 => (Rotcr, args_n),
            0x26 => (LdsPrM, args_n),
            0x27 => (LdcVbrM, args_n),
            0x28 => (Shll16, args_n),
            0x29 => (Shlr16, args_n),
            0x2A => (LdsPrR, args_n),
            0x2B => (Jmp, args_m),
            0x2E => (LdcVbrR, args_n),
            _ if op & 0xF == 0xF => (Macw, args_nm),
            _ => (Illegal, args_n),
        },
        0x5 => (MovlL4, DecodedArgs { rn: n, rm: m, disp_imm: d4 * 4 }),
        0x6 => match op & 0xF {
            0x0 => (MovbL, args_nm),
            0x1 => (MovwL, args_nm),
            0x2 => (MovlL, args_nm),
            0x3 => (MovR, args_nm),
            0x4 => (MovbP, args_nm),
            0x5 => (MovwP, args_nm),
            0x6 => (MovlP, args_nm),
            0x7 => (Not, args_nm),
            0x8 => (Swapb, args_nm),
            0x9 => (Swapw, args_nm),
            0xA => (Negc, args_nm),
            0xB => (Neg, args_nm),
            0xC => (Extub, args_nm),
            0xD => (Extuw, args_nm),
            0xE => (Extsb, args_nm),
            0xF => (Extsw, args_nm),
            _ => (Illegal, args_nm),
        },
        0x7 => (AddI, DecodedArgs { rn: n, rm: 0, disp_imm: imm8s }),
        0x8 => match nibble(op, 2) {
            0x0 => (MovbS4, DecodedArgs { rn: nibble(op, 1) as u8, rm: 0, disp_imm: d4 }),
            0x1 => (MovwS4, DecodedArgs { rn: nibble(op, 1) as u8, rm: 0, disp_imm: d4 * 2 }),
            0x4 => (MovbL4, DecodedArgs { rn: 0, rm: nibble(op, 1) as u8, disp_imm: d4 }),
            0x5 => (MovwL4, DecodedArgs { rn: 0, rm: nibble(op, 1) as u8, disp_imm: d4 * 2 }),
            0x8 => (CmpEqI, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8s }),
            0x9 => (Bt, DecodedArgs { rn: 0, rm: 0, disp_imm: d8s }),
            0xB => (Bf, DecodedArgs { rn: 0, rm: 0, disp_imm: d8s }),
            0xD => (Bts, DecodedArgs { rn: 0, rm: 0, disp_imm: d8s }),
            0xF => (Bfs, DecodedArgs { rn: 0, rm: 0, disp_imm: d8s }),
            _ => (Illegal, DecodedArgs::default()),
        },
        0x9 => (MovwI, DecodedArgs { rn: n, rm: 0, disp_imm: d8 * 2 }),
        0xA => (Bra, DecodedArgs { rn: 0, rm: 0, disp_imm: d12 * 2 }),
        0xB => (Bsr, DecodedArgs { rn: 0, rm: 0, disp_imm: d12 * 2 }),
        0xC => match nibble(op, 2) {
            0x0 => (MovbSg, DecodedArgs { rn: 0, rm: 0, disp_imm: d8 }),
            0x1 => (MovwSg, DecodedArgs { rn: 0, rm: 0, disp_imm: d8 * 2 }),
            0x2 => (MovlSg, DecodedArgs { rn: 0, rm: 0, disp_imm: d8 * 4 }),
            0x3 => (Trapa, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0x4 => (MovbLg, DecodedArgs { rn: 0, rm: 0, disp_imm: d8 }),
            0x5 => (MovwLg, DecodedArgs { rn: 0, rm: 0, disp_imm: d8 * 2 }),
            0x6 => (MovlLg, DecodedArgs { rn: 0, rm: 0, disp_imm: d8 * 4 }),
            0x7 => (Mova, DecodedArgs { rn: 0, rm: 0, disp_imm: d8 * 4 }),
            0x8 => (TstI, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0x9 => (AndI, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0xA => (OrI, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0xB => (XorI, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0xC => (TstM, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0xD => (AndM, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0xE => (XorM, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            0xF => (OrM, DecodedArgs { rn: 0, rm: 0, disp_imm: imm8 as i32 }),
            _ => (Illegal, DecodedArgs::default()),
        },
        0xD => (MovlI, DecodedArgs { rn: n, rm: 0, disp_imm: d8 * 4 }),
        0xE => (MovI, DecodedArgs { rn: n, rm: 0, disp_imm: imm8s }),
        0xF => (Illegal, DecodedArgs::default()),
        _ => (Illegal, DecodedArgs::default()),
    };

    // `clrmac` shares the 0x0028 slot with no other encoding; special-case
    // it rather than growing the 0x0 arm above with another one-shot match.
    let mnemonic = if op == 0x0028 { Clrmac } else { mnemonic };

    Decoded { mnemonic, args }
}

/// Whether `m` is allowed to occupy a delay slot. Delayed-branch
/// instructions themselves, and anything with undefined slot behavior
/// per the SH-2 manual, are excluded — matching the illegal-slot edge
/// case of spec.md §4.1/§4.3.
fn valid_in_delay_slot(m: Mnemonic) -> bool {
    use Mnemonic::*;
    !matches!(
        m,
        Bra | Bsr
            | Braf
            | Bsrf
            | Bt
            | Bf
            | Bts
            | Bfs
            | Jmp
            | Jsr
            | Rte
            | Rts
            | Trapa
            | Illegal
            | IllegalSlot
    )
}

/// Decode an opcode fetched through the delay-slot path (spec.md §4.1,
/// §4.3 "Illegal-slot"). Produces [`Mnemonic::IllegalSlot`] instead of the
/// underlying mnemonic when that mnemonic cannot legally follow a branch.
pub fn decode_in_delay_slot(op: u16) -> Decoded {
    let decoded = decode(op);
    if valid_in_delay_slot(decoded.mnemonic) {
        decoded
    } else {
        Decoded { mnemonic: Mnemonic::IllegalSlot, args: decoded.args }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_encoding() {
        assert_eq!(decode(0x0009).mnemonic, Mnemonic::Nop);
    }

    #[test]
    fn designated_illegal_instruction_is_general_illegal_not_slot_variant() {
        assert_eq!(decode(0x4AFC).mnemonic, Mnemonic::Illegal);
    }

    #[test]
    fn bra_is_illegal_in_delay_slot() {
        // BRA with +510 byte displacement: 1010 0001 1111 1111 (d12=0x1FF)
        let op = 0xA1FFu16;
        assert_eq!(decode(op).mnemonic, Mnemonic::Bra);
        assert_eq!(decode_in_delay_slot(op).mnemonic, Mnemonic::IllegalSlot);
    }

    #[test]
    fn nop_is_valid_in_delay_slot() {
        assert_eq!(decode_in_delay_slot(0x0009).mnemonic, Mnemonic::Nop);
    }

    #[test]
    fn mov_immediate_sign_extends() {
        let d = decode(0xE0FF); // mov #-1, R0
        assert_eq!(d.mnemonic, Mnemonic::MovI);
        assert_eq!(d.args.disp_imm, -1);
    }

    #[test]
    fn bra_displacement_is_byte_doubled_and_signed() {
        let d = decode(0xA001); // bra pc+2+2
        assert_eq!(d.mnemonic, Mnemonic::Bra);
        assert_eq!(d.args.disp_imm, 2);
    }
}
