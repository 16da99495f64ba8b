//! Shared Bus (spec.md §4.4, §6 "Memory map").
//!
//! Dispatches physical (27-bit) memory accesses across 64 KiB pages to
//! their owning region. Unmapped pages log via the `log` crate and return
//! zero for reads, dropping writes (spec.md §7.3: "Never fatal").

use log::debug;

use crate::config::MachineConfig;

pub const ADDRESS_MASK: u32 = 0x07FF_FFFF; // 27-bit physical space

const BOOT_ROM_BASE: u32 = 0x0000_0000;
const BOOT_ROM_SIZE: u32 = 512 * 1024;
const SMPC_BASE: u32 = 0x0010_0000;
const SMPC_SIZE: u32 = 0x8000;
const BACKUP_RAM_BASE: u32 = 0x0018_0000;
const BACKUP_RAM_SIZE: u32 = 0x8000;
const WORK_RAM_LOW_BASE: u32 = 0x0020_0000;
const WORK_RAM_LOW_SIZE: u32 = 1024 * 1024;
const SCU_A_BUS_BASE: u32 = 0x0200_0000;
const SCU_A_BUS_END: u32 = 0x058F_FFFF;
const SCU_B_BUS_BASE: u32 = 0x05A0_0000;
const SCU_B_BUS_END: u32 = 0x05FB_FFFF;
const WORK_RAM_HIGH_BASE: u32 = 0x0600_0000;
const WORK_RAM_HIGH_SIZE: u32 = 1024 * 1024;

// VDP1/VDP2 live inside the SCU B-bus window on real hardware (spec.md §6
// lists VDP1/VDP2 registers as required external interfaces, so these are
// carved out of the otherwise-stubbed B-bus range rather than left inert).
const VDP1_VRAM_BASE: u32 = 0x05C0_0000;
const VDP1_VRAM_SIZE: u32 = 512 * 1024;
const VDP1_REG_BASE: u32 = 0x05D0_0000;
const VDP1_REG_SIZE: u32 = 0x20;
const VDP2_VRAM_BASE: u32 = 0x05E0_0000;
const VDP2_VRAM_SIZE: u32 = 512 * 1024;
const VDP2_CRAM_BASE: u32 = 0x05F0_0000;
const VDP2_CRAM_SIZE: u32 = 4 * 1024;
const VDP2_REG_BASE: u32 = 0x05F8_0000;
const VDP2_REG_SIZE: u32 = 0x200;

/// Methods a CPU needs from whatever owns the peer's on-chip FRT, so the
/// cross-CPU mirror window (spec.md §6) can reach it without the bus
/// owning a whole `Sh2`.
pub trait FrtMirrorTarget {
    fn write_frc_h(&mut self, value: u8);
    fn write_frc_l(&mut self, value: u8);
}

/// What the CPU core needs from the system bus. Implemented by [`Bus`];
/// kept as a trait so `cpu` tests can swap in a bare-metal fake.
pub trait SysBus {
    fn read8(&mut self, address: u32) -> u8;
    fn read16(&mut self, address: u32) -> u16;
    fn read32(&mut self, address: u32) -> u32;
    fn write8(&mut self, address: u32, value: u8);
    fn write16(&mut self, address: u32, value: u16);
    fn write32(&mut self, address: u32, value: u32);
}

/// VDP register/VRAM/CRAM writes observed on the bus are posted to the
/// video pipeline's event queue rather than applied in place for bulk
/// memory (spec.md §4.5.3); the bus only needs a sink to post through.
pub trait VdpSink {
    fn post_vram_write(&mut self, offset: u32, width: u8, value: u32);
    fn post_cram_write(&mut self, offset: u32, width: u8, value: u32);
    fn post_reg_write(&mut self, offset: u32, value: u16);

    /// Scanline/frame-boundary events, posted by
    /// [`crate::scheduler::Scheduler`] through the same sink so write
    /// ordering relative to rendering events is preserved (spec.md §5
    /// "a rendering event following a batch of writes always observes
    /// those writes").
    fn reset(&mut self);
    fn odd_field(&mut self, flag: bool);
    fn vdp1_erase(&mut self);
    fn vdp1_swap(&mut self);
    fn vdp1_begin_frame(&mut self);
    fn vdp2_draw_line(&mut self, y: u32);
    fn vdp2_end_frame(&mut self);
}

pub struct Bus {
    boot_rom: Vec<u8>,
    backup_ram: Vec<u8>,
    work_ram_low: Vec<u8>,
    work_ram_high: Vec<u8>,
    smpc: Vec<u8>,
    // CPU-visible mirrors of VDP state (spec.md §4.5.2: the renderer works
    // off its own async mirror kept current through the event queue; the
    // bus keeps this synchronous copy so a CPU read-after-write sees its
    // own write immediately).
    vdp1_vram: Vec<u8>,
    vdp1_regs: Vec<u8>,
    vdp2_vram: Vec<u8>,
    vdp2_cram: Vec<u8>,
    vdp2_regs: Vec<u8>,
    vdp: Option<Box<dyn VdpSink>>,
}

fn mask(address: u32) -> u32 {
    address & ADDRESS_MASK
}

impl Bus {
    pub fn new(config: &MachineConfig) -> Self {
        let mut boot_rom = vec![0u8; BOOT_ROM_SIZE as usize];
        let n = config.boot_rom.len().min(boot_rom.len());
        boot_rom[..n].copy_from_slice(&config.boot_rom[..n]);
        let mut backup_ram = vec![0u8; BACKUP_RAM_SIZE as usize];
        let n = config.backup_ram.len().min(backup_ram.len());
        backup_ram[..n].copy_from_slice(&config.backup_ram[..n]);
        Bus {
            boot_rom,
            backup_ram,
            work_ram_low: vec![0u8; WORK_RAM_LOW_SIZE as usize],
            work_ram_high: vec![0u8; WORK_RAM_HIGH_SIZE as usize],
            smpc: vec![0u8; SMPC_SIZE as usize],
            vdp1_vram: vec![0u8; VDP1_VRAM_SIZE as usize],
            vdp1_regs: vec![0u8; VDP1_REG_SIZE as usize],
            vdp2_vram: vec![0u8; VDP2_VRAM_SIZE as usize],
            vdp2_cram: vec![0u8; VDP2_CRAM_SIZE as usize],
            vdp2_regs: vec![0u8; VDP2_REG_SIZE as usize],
            vdp: None,
        }
    }

    /// Wires the video pipeline's producer handle so VRAM/CRAM/register
    /// writes reach the renderer (spec.md §4.5.3). Without a sink, writes
    /// still land in the CPU-visible mirror above, just never render.
    pub fn set_vdp_sink(&mut self, sink: Box<dyn VdpSink>) {
        self.vdp = Some(sink);
    }

    /// The scheduler's gateway to rendering events; `None` when no sink
    /// was wired (spec.md §7.5: a core without a running VDP worker still
    /// has to tolerate `Advance`-adjacent scanline bookkeeping).
    pub fn vdp_mut(&mut self) -> Option<&mut dyn VdpSink> {
        self.vdp.as_deref_mut()
    }

    /// Soft reset (spec.md §6 "Exit/reset contract"): RAM contents survive.
    pub fn soft_reset(&mut self) {}

    /// Hard reset: reinitializes backup RAM and work RAM along with
    /// everything else (spec.md §6).
    pub fn hard_reset(&mut self) {
        for b in self.backup_ram.iter_mut() {
            *b = 0;
        }
        for b in self.work_ram_low.iter_mut() {
            *b = 0;
        }
        for b in self.work_ram_high.iter_mut() {
            *b = 0;
        }
        for b in self.vdp1_vram.iter_mut() {
            *b = 0;
        }
        for b in self.vdp2_vram.iter_mut() {
            *b = 0;
        }
        for b in self.vdp2_cram.iter_mut() {
            *b = 0;
        }
    }

    fn read_region_byte(&self, address: u32) -> Option<u8> {
        let a = mask(address);
        if a < BOOT_ROM_BASE + BOOT_ROM_SIZE {
            return Some(self.boot_rom[(a - BOOT_ROM_BASE) as usize]);
        }
        if a >= SMPC_BASE && a < SMPC_BASE + SMPC_SIZE {
            return Some(self.smpc[(a - SMPC_BASE) as usize]);
        }
        if a >= BACKUP_RAM_BASE && a < BACKUP_RAM_BASE + BACKUP_RAM_SIZE {
            // Odd-byte-only window: even addresses read 0xFF (spec.md §6).
            return Some(if a & 1 == 0 { 0xFF } else { self.backup_ram[((a - BACKUP_RAM_BASE) / 2) as usize] });
        }
        if a >= WORK_RAM_LOW_BASE && a < WORK_RAM_LOW_BASE + WORK_RAM_LOW_SIZE {
            return Some(self.work_ram_low[(a - WORK_RAM_LOW_BASE) as usize]);
        }
        if a >= WORK_RAM_HIGH_BASE {
            let offset = (a - WORK_RAM_HIGH_BASE) % WORK_RAM_HIGH_SIZE;
            return Some(self.work_ram_high[offset as usize]);
        }
        if a >= VDP1_VRAM_BASE && a < VDP1_VRAM_BASE + VDP1_VRAM_SIZE {
            return Some(self.vdp1_vram[(a - VDP1_VRAM_BASE) as usize]);
        }
        if a >= VDP1_REG_BASE && a < VDP1_REG_BASE + VDP1_REG_SIZE {
            return Some(self.vdp1_regs[(a - VDP1_REG_BASE) as usize]);
        }
        if a >= VDP2_VRAM_BASE && a < VDP2_VRAM_BASE + VDP2_VRAM_SIZE {
            return Some(self.vdp2_vram[(a - VDP2_VRAM_BASE) as usize]);
        }
        if a >= VDP2_CRAM_BASE && a < VDP2_CRAM_BASE + VDP2_CRAM_SIZE {
            return Some(self.vdp2_cram[(a - VDP2_CRAM_BASE) as usize]);
        }
        if a >= VDP2_REG_BASE && a < VDP2_REG_BASE + VDP2_REG_SIZE {
            return Some(self.vdp2_regs[(a - VDP2_REG_BASE) as usize]);
        }
        if (SCU_A_BUS_BASE..=SCU_A_BUS_END).contains(&a) || (SCU_B_BUS_BASE..=SCU_B_BUS_END).contains(&a) {
            return Some(0); // TODO: SCU DSP/other B-bus devices are out of scope (spec.md §1).
        }
        None
    }

    fn write_region_byte(&mut self, address: u32, value: u8) {
        let a = mask(address);
        if a >= BACKUP_RAM_BASE && a < BACKUP_RAM_BASE + BACKUP_RAM_SIZE {
            // "even writes mirror to the next odd" (spec.md §6).
            let idx = if a & 1 == 0 { a + 1 } else { a } - BACKUP_RAM_BASE;
            self.backup_ram[(idx / 2) as usize] = value;
            return;
        }
        if a >= WORK_RAM_LOW_BASE && a < WORK_RAM_LOW_BASE + WORK_RAM_LOW_SIZE {
            self.work_ram_low[(a - WORK_RAM_LOW_BASE) as usize] = value;
            return;
        }
        if a >= WORK_RAM_HIGH_BASE {
            let offset = (a - WORK_RAM_HIGH_BASE) % WORK_RAM_HIGH_SIZE;
            self.work_ram_high[offset as usize] = value;
            return;
        }
        if a >= SMPC_BASE && a < SMPC_BASE + SMPC_SIZE {
            self.smpc[(a - SMPC_BASE) as usize] = value;
            return;
        }
        if a >= VDP1_VRAM_BASE && a < VDP1_VRAM_BASE + VDP1_VRAM_SIZE {
            let offset = a - VDP1_VRAM_BASE;
            self.vdp1_vram[offset as usize] = value;
            if let Some(vdp) = self.vdp.as_mut() {
                vdp.post_vram_write(offset, 1, value as u32);
            }
            return;
        }
        if a >= VDP1_REG_BASE && a < VDP1_REG_BASE + VDP1_REG_SIZE {
            let offset = a - VDP1_REG_BASE;
            self.vdp1_regs[offset as usize] = value;
            if let Some(vdp) = self.vdp.as_mut() {
                let word = ((self.vdp1_regs[(offset & !1) as usize] as u16) << 8)
                    | self.vdp1_regs[(offset | 1) as usize] as u16;
                vdp.post_reg_write(offset & !1, word);
            }
            return;
        }
        if a >= VDP2_VRAM_BASE && a < VDP2_VRAM_BASE + VDP2_VRAM_SIZE {
            let offset = a - VDP2_VRAM_BASE;
            self.vdp2_vram[offset as usize] = value;
            if let Some(vdp) = self.vdp.as_mut() {
                vdp.post_vram_write(VDP1_VRAM_SIZE + offset, 1, value as u32);
            }
            return;
        }
        if a >= VDP2_CRAM_BASE && a < VDP2_CRAM_BASE + VDP2_CRAM_SIZE {
            let offset = a - VDP2_CRAM_BASE;
            self.vdp2_cram[offset as usize] = value;
            if let Some(vdp) = self.vdp.as_mut() {
                vdp.post_cram_write(offset, 1, value as u32);
            }
            return;
        }
        if a >= VDP2_REG_BASE && a < VDP2_REG_BASE + VDP2_REG_SIZE {
            let offset = a - VDP2_REG_BASE;
            self.vdp2_regs[offset as usize] = value;
            if let Some(vdp) = self.vdp.as_mut() {
                let word = ((self.vdp2_regs[(offset & !1) as usize] as u16) << 8)
                    | self.vdp2_regs[(offset | 1) as usize] as u16;
                vdp.post_reg_write(0x20 + (offset & !1), word);
            }
            return;
        }
        // Boot ROM, remaining SCU windows: writes dropped (spec.md §7.3).
    }
}

impl SysBus for Bus {
    fn read8(&mut self, address: u32) -> u8 {
        match self.read_region_byte(address) {
            Some(v) => v,
            None => {
                debug!("unmapped bus read8 at {:#010x}", mask(address));
                0
            }
        }
    }

    fn read16(&mut self, address: u32) -> u16 {
        let a = address & !1;
        ((self.read8(a) as u16) << 8) | self.read8(a + 1) as u16
    }

    fn read32(&mut self, address: u32) -> u32 {
        let a = address & !3;
        ((self.read16(a) as u32) << 16) | self.read16(a + 2) as u32
    }

    fn write8(&mut self, address: u32, value: u8) {
        if self.read_region_byte(address).is_none() {
            debug!("unmapped bus write8 at {:#010x}", mask(address));
            return;
        }
        self.write_region_byte(address, value);
    }

    fn write16(&mut self, address: u32, value: u16) {
        let a = address & !1;
        self.write8(a, (value >> 8) as u8);
        self.write8(a + 1, value as u8);
    }

    fn write32(&mut self, address: u32, value: u32) {
        let a = address & !3;
        self.write16(a, (value >> 16) as u16);
        self.write16(a + 2, value as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MachineConfig {
        MachineConfig::new(vec![0xAA; 16])
    }

    #[test]
    fn boot_rom_is_readable_at_base() {
        let mut bus = Bus::new(&config());
        assert_eq!(bus.read8(0x0000_0000), 0xAA);
    }

    #[test]
    fn backup_ram_even_bytes_read_as_ff() {
        let mut bus = Bus::new(&config());
        assert_eq!(bus.read8(BACKUP_RAM_BASE), 0xFF);
        bus.write8(BACKUP_RAM_BASE + 1, 0x42);
        assert_eq!(bus.read8(BACKUP_RAM_BASE + 1), 0x42);
    }

    #[test]
    fn work_ram_high_mirrors_every_megabyte() {
        let mut bus = Bus::new(&config());
        bus.write8(WORK_RAM_HIGH_BASE, 0x55);
        assert_eq!(bus.read8(WORK_RAM_HIGH_BASE + WORK_RAM_HIGH_SIZE), 0x55);
    }

    #[test]
    fn unmapped_read_returns_zero() {
        let mut bus = Bus::new(&config());
        assert_eq!(bus.read8(SCU_A_BUS_BASE), 0);
    }
}
