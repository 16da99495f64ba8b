//! On-chip register map (spec.md §6 "On-chip register map (per CPU,
//! relative to 0xFFFFFE00)"). Bridges the flat MMIO offset space the CPU
//! sees through the region-111 window to the individual OCP submodules.

use super::Sh2;
use crate::ocp::intc::InterruptSource;

/// Generic helper: read a 16-bit register as an 8 or 16-bit access, high
/// byte first (big-endian register layout, as on real SH-2).
fn read16_reg(value: u16, width: u32, low_byte: bool) -> u32 {
    match width {
        8 => {
            if low_byte {
                (value & 0xFF) as u32
            } else {
                (value >> 8) as u32
            }
        }
        _ => value as u32,
    }
}

fn write16_reg(old: u16, width: u32, low_byte: bool, value: u32) -> u16 {
    match width {
        8 => {
            if low_byte {
                (old & 0xFF00) | (value as u16 & 0xFF)
            } else {
                (old & 0x00FF) | ((value as u16 & 0xFF) << 8)
            }
        }
        _ => value as u16,
    }
}

pub fn read(cpu: &mut Sh2, offset: u32, width: u32) -> u32 {
    match offset {
        0x010 => cpu.ocp.frt.tier.read() as u32,
        0x011 => cpu.ocp.frt.ftcsr.read() as u32,
        0x012 => cpu.ocp.frt.read_frc_h() as u32,
        0x013 => cpu.ocp.frt.read_frc_l() as u32,
        0x014 => cpu.ocp.frt.read_ocr_h() as u32,
        0x015 => cpu.ocp.frt.read_ocr_l() as u32,
        0x016 => cpu.ocp.frt.tcr.cks as u32,
        0x017 => {
            let t = &cpu.ocp.frt.tocr;
            ((t.olvla as u32) << 4) | ((t.olvlb as u32) << 5) | ((t.ocrs as u32) << 4) | 0x1
        }
        0x018 => cpu.ocp.frt.read_icr_h() as u32,
        0x019 => cpu.ocp.frt.read_icr_l() as u32,
        0x080 => cpu.ocp.wdt.wtcsr.read() as u32,
        0x081 => cpu.ocp.wdt.wtcnt as u32,
        0x083 => cpu.ocp.wdt.rstcsr.read() as u32,
        0x092 => cpu.ocp.cache.ccr.read() as u32,
        0x060 => read16_reg(
            ((cpu.ocp.intc.level_of(InterruptSource::SciEri) as u16) << 12)
                | ((cpu.ocp.intc.level_of(InterruptSource::FrtOvi) as u16) << 8),
            width,
            false,
        ),
        0x062 => read16_reg(
            ((cpu.ocp.intc.vector_of(InterruptSource::SciRxi) as u16) << 8)
                | cpu.ocp.intc.vector_of(InterruptSource::SciEri) as u16,
            width,
            false,
        ),
        0x064 => read16_reg(
            ((cpu.ocp.intc.vector_of(InterruptSource::SciTxi) as u16) << 8)
                | cpu.ocp.intc.vector_of(InterruptSource::SciTei) as u16,
            width,
            false,
        ),
        0x066 => read16_reg(
            ((cpu.ocp.intc.vector_of(InterruptSource::FrtIci) as u16) << 8)
                | cpu.ocp.intc.vector_of(InterruptSource::FrtOci) as u16,
            width,
            false,
        ),
        0x068 => read16_reg((cpu.ocp.intc.vector_of(InterruptSource::FrtOvi) as u16) << 8, width, false),
        0x0E0 => {
            let nmil = cpu.nmi_pin_high as u16;
            read16_reg(cpu.ocp.intc.icr.read(nmil != 0), width, false)
        }
        0x0E2 => read16_reg(
            ((cpu.ocp.intc.level_of(InterruptSource::DivuOvfi) as u16) << 12)
                | ((cpu.ocp.intc.level_of(InterruptSource::Dmac0XferEnd) as u16) << 8)
                | ((cpu.ocp.intc.level_of(InterruptSource::WdtIti) as u16) << 4),
            width,
            false,
        ),
        0x0E4 => read16_reg(
            ((cpu.ocp.intc.vector_of(InterruptSource::WdtIti) as u16) << 8)
                | (cpu.ocp.intc.vector_of(InterruptSource::BscRefCmi) as u16),
            width,
            false,
        ),
        0x100..=0x13F => read_divu(cpu, (offset - 0x100) % 0x20),
        0x071 => cpu.ocp.dmac.channels[0].read_drcr() as u32,
        0x072 => cpu.ocp.dmac.channels[1].read_drcr() as u32,
        0x180..=0x1BF => read_dmac(cpu, offset - 0x180),
        0x1E0..=0x1F8 => read_bsc(cpu, offset - 0x1E0),
        _ => 0,
    }
}

pub fn write(cpu: &mut Sh2, offset: u32, width: u32, value: u32) {
    match offset {
        0x010 => cpu.ocp.frt.tier.write(value as u8),
        0x011 => cpu.ocp.frt.ftcsr.write(value as u8),
        0x012 => cpu.ocp.frt.write_frc_h(value as u8),
        0x013 => cpu.ocp.frt.write_frc_l(value as u8),
        0x014 => cpu.ocp.frt.write_ocr_h(value as u8),
        0x015 => cpu.ocp.frt.write_ocr_l(value as u8),
        0x016 => cpu.ocp.frt.tcr.cks = value as u8 & 0x3,
        0x017 => {
            cpu.ocp.frt.tocr.olvla = value & (1 << 4) != 0;
            cpu.ocp.frt.tocr.olvlb = value & (1 << 5) != 0;
            cpu.ocp.frt.tocr.ocrs = value & (1 << 4) != 0;
        }
        0x080 => cpu.ocp.wdt.wtcsr.write(value as u8),
        0x081 => cpu.ocp.wdt.wtcnt = value as u8,
        0x083 => cpu.ocp.wdt.rstcsr.write(value as u8),
        0x092 => cpu.ocp.cache.write_ccr(value as u8),
        0x060 => {
            cpu.ocp.intc.set_priority(InterruptSource::SciEri, ((value >> 12) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::SciRxi, ((value >> 12) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::SciTxi, ((value >> 12) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::SciTei, ((value >> 12) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::FrtOvi, ((value >> 8) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::FrtOci, ((value >> 8) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::FrtIci, ((value >> 8) & 0xF) as u8);
        }
        0x062 => {
            cpu.ocp.intc.set_vector(InterruptSource::SciRxi, (value >> 8) as u8 & 0x7F);
            cpu.ocp.intc.set_vector(InterruptSource::SciEri, value as u8 & 0x7F);
        }
        0x064 => {
            cpu.ocp.intc.set_vector(InterruptSource::SciTxi, (value >> 8) as u8 & 0x7F);
            cpu.ocp.intc.set_vector(InterruptSource::SciTei, value as u8 & 0x7F);
        }
        0x066 => {
            cpu.ocp.intc.set_vector(InterruptSource::FrtIci, (value >> 8) as u8 & 0x7F);
            cpu.ocp.intc.set_vector(InterruptSource::FrtOci, value as u8 & 0x7F);
        }
        0x068 => cpu.ocp.intc.set_vector(InterruptSource::FrtOvi, (value >> 8) as u8 & 0x7F),
        0x0E0 => cpu.ocp.intc.icr.write(write16_reg(0, width, false, value)),
        0x0E2 => {
            cpu.ocp.intc.set_priority(InterruptSource::DivuOvfi, ((value >> 12) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::Dmac0XferEnd, ((value >> 8) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::Dmac1XferEnd, ((value >> 8) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::WdtIti, ((value >> 4) & 0xF) as u8);
            cpu.ocp.intc.set_priority(InterruptSource::BscRefCmi, ((value >> 4) & 0xF) as u8);
        }
        0x0E4 => {
            cpu.ocp.intc.set_vector(InterruptSource::WdtIti, ((value >> 8) & 0x7F) as u8);
            cpu.ocp.intc.set_vector(InterruptSource::BscRefCmi, (value & 0x7F) as u8);
        }
        0x100..=0x13F => write_divu(cpu, (offset - 0x100) % 0x20, value),
        0x071 => cpu.ocp.dmac.channels[0].write_drcr(value as u8),
        0x072 => cpu.ocp.dmac.channels[1].write_drcr(value as u8),
        0x180..=0x1BF => write_dmac(cpu, offset - 0x180, value),
        0x1E0..=0x1F8 => write_bsc(cpu, offset - 0x1E0, value),
        _ => {}
    }
}

fn read_divu(cpu: &Sh2, offset: u32) -> u32 {
    let d = &cpu.ocp.divu;
    match offset {
        0x00 => d.dvsr,
        0x04 => d.dvdnt,
        0x08 => d.dvcr.read(),
        0x0C => 0,
        0x10 => d.dvdnth,
        0x14 => d.dvdntl,
        0x18 => d.dvdntuh,
        0x1C => d.dvdntul,
        _ => 0,
    }
}

fn write_divu(cpu: &mut Sh2, offset: u32, value: u32) {
    let d = &mut cpu.ocp.divu;
    match offset {
        0x00 => d.dvsr = value,
        0x04 => {
            d.dvdntl = value;
            d.dvdnt = value;
            d.calc32();
        }
        0x08 => d.dvcr.write(value),
        0x10 => d.dvdnth = value,
        0x14 => {
            d.dvdntl = value;
            d.calc64();
        }
        0x18 => d.dvdntuh = value,
        0x1C => d.dvdntul = value,
        _ => {}
    }
}

fn read_dmac(cpu: &Sh2, offset: u32) -> u32 {
    let ch = |i: usize| &cpu.ocp.dmac.channels[i];
    match offset {
        0x00 => ch(0).src_address,
        0x04 => ch(0).dst_address,
        0x08 => ch(0).xfer_count,
        0x0C => ch(0).read_chcr(),
        0x10 => ch(1).src_address,
        0x14 => ch(1).dst_address,
        0x18 => ch(1).xfer_count,
        0x1C => ch(1).read_chcr(),
        0x20 => ch(0).vector as u32,
        0x28 => ch(1).vector as u32,
        0x30 => cpu.ocp.dmac.dmaor.read(),
        _ => 0,
    }
}

fn write_dmac(cpu: &mut Sh2, offset: u32, value: u32) {
    let dmac = &mut cpu.ocp.dmac;
    match offset {
        0x00 => dmac.channels[0].src_address = value,
        0x04 => dmac.channels[0].dst_address = value,
        0x08 => dmac.channels[0].xfer_count = value & 0xFF_FFFF,
        0x0C => dmac.channels[0].write_chcr(value, false),
        0x10 => dmac.channels[1].src_address = value,
        0x14 => dmac.channels[1].dst_address = value,
        0x18 => dmac.channels[1].xfer_count = value & 0xFF_FFFF,
        0x1C => dmac.channels[1].write_chcr(value, false),
        0x20 => dmac.channels[0].vector = value as u8,
        0x28 => dmac.channels[1].vector = value as u8,
        0x30 => dmac.dmaor.write(value, false),
        _ => {}
    }
}

fn read_bsc(cpu: &Sh2, offset: u32) -> u32 {
    let b = &cpu.ocp.bsc;
    match offset {
        0x00 => b.bcr1 as u32,
        0x04 => b.bcr2 as u32,
        0x08 => b.wcr as u32,
        0x0C => b.mcr as u32,
        0x10 => b.rtcsr as u32,
        0x14 => b.rtcnt as u32,
        0x18 => b.rtcor as u32,
        _ => 0,
    }
}

fn write_bsc(cpu: &mut Sh2, offset: u32, value: u32) {
    let b = &mut cpu.ocp.bsc;
    match offset {
        0x00 => b.write_bcr1(value as u16),
        0x04 => b.bcr2 = value as u16,
        0x08 => b.wcr = value as u16,
        0x0C => b.mcr = value as u16,
        0x10 => b.write_rtcsr(value as u16),
        0x14 => b.rtcnt = value as u8,
        0x18 => b.rtcor = value as u8,
        _ => {}
    }
}
