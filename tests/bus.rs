//! Bus memory-map behavior from spec.md §6/§7.3: VDP1/VDP2 window
//! mirror consistency, the backup-RAM odd-byte quirk, and unmapped
//! accesses being logged rather than fatal.

use saturn_core::bus::{Bus, SysBus};
use saturn_core::config::MachineConfig;

const VDP1_VRAM_BASE: u32 = 0x05C0_0000;
const VDP1_REG_BASE: u32 = 0x05D0_0000;
const VDP2_VRAM_BASE: u32 = 0x05E0_0000;
const VDP2_CRAM_BASE: u32 = 0x05F0_0000;
const VDP2_REG_BASE: u32 = 0x05F8_0000;
const BACKUP_RAM_BASE: u32 = 0x0018_0000;

// Falls between the backup-RAM window (ends 0x188000) and the low work
// RAM window (starts 0x200000): no region claims it.
const UNMAPPED_ADDRESS: u32 = 0x0018_9000;

fn fresh_bus() -> Bus {
    Bus::new(&MachineConfig::new(vec![0u8; MachineConfig::BOOT_ROM_SIZE]))
}

#[test]
fn vdp1_vram_write_is_visible_on_readback() {
    let mut bus = fresh_bus();
    bus.write16(VDP1_VRAM_BASE + 0x10, 0xBEEF);
    assert_eq!(bus.read16(VDP1_VRAM_BASE + 0x10), 0xBEEF);
}

#[test]
fn vdp2_cram_write_is_visible_on_readback() {
    let mut bus = fresh_bus();
    bus.write16(VDP2_CRAM_BASE + 0x20, 0x7C1F);
    assert_eq!(bus.read16(VDP2_CRAM_BASE + 0x20), 0x7C1F);
}

#[test]
fn vdp2_vram_write_is_visible_on_readback() {
    let mut bus = fresh_bus();
    bus.write32(VDP2_VRAM_BASE + 0x100, 0x1122_3344);
    assert_eq!(bus.read32(VDP2_VRAM_BASE + 0x100), 0x1122_3344);
}

#[test]
fn vdp1_and_vdp2_register_writes_are_visible_on_readback() {
    let mut bus = fresh_bus();
    bus.write16(VDP1_REG_BASE, 0x0001);
    assert_eq!(bus.read16(VDP1_REG_BASE), 0x0001);

    bus.write16(VDP2_REG_BASE + 2, 0x00F0);
    assert_eq!(bus.read16(VDP2_REG_BASE + 2), 0x00F0);
}

/// Even addresses in the backup-RAM window always read 0xFF; a write to
/// an even address mirrors to the following odd byte (spec.md §6).
#[test]
fn backup_ram_even_bytes_read_ff_and_writes_mirror_to_odd() {
    let mut bus = fresh_bus();
    assert_eq!(bus.read8(BACKUP_RAM_BASE), 0xFF);

    bus.write8(BACKUP_RAM_BASE, 0x42);
    assert_eq!(bus.read8(BACKUP_RAM_BASE), 0xFF, "even address still reads 0xFF after write");
    assert_eq!(bus.read8(BACKUP_RAM_BASE + 1), 0x42, "write mirrored to the odd byte");

    bus.write8(BACKUP_RAM_BASE + 1, 0x99);
    assert_eq!(bus.read8(BACKUP_RAM_BASE + 1), 0x99);
}

/// spec.md §7.3: unmapped accesses are never fatal. Reads return 0,
/// writes are silently dropped rather than panicking.
#[test]
fn unmapped_access_reads_zero_and_drops_writes_without_panicking() {
    let mut bus = fresh_bus();
    assert_eq!(bus.read8(UNMAPPED_ADDRESS), 0);

    bus.write8(UNMAPPED_ADDRESS, 0xAB);
    assert_eq!(bus.read8(UNMAPPED_ADDRESS), 0, "dropped write must not appear on readback");

    bus.write32(UNMAPPED_ADDRESS, 0xDEAD_BEEF);
    assert_eq!(bus.read32(UNMAPPED_ADDRESS), 0);
}
