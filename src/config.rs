//! Construction-time configuration for a [`crate::machine::Machine`].
//!
//! Mirrors the role of the teacher crate's `Configuration` struct
//! (`em68k::Configuration`, the old `src/lib.rs`): a plain data bag handed
//! to the constructor, not a config-file loader (loading/parsing a config
//! file is the front-end's job, out of scope per spec.md §1).

#[derive(Clone)]
pub struct MachineConfig {
    /// 512 KiB IPL boot ROM image, mapped at physical 0x000000.
    pub boot_rom: Vec<u8>,
    /// Contents of internal backup RAM (odd-byte-only window at 0x180000).
    /// Persistence across runs is the front-end's job (spec.md §1); this
    /// is just the initial image.
    pub backup_ram: Vec<u8>,
    /// Whether the two-level SH-2 cache is modeled. When `false`, all
    /// cached-region accesses bypass straight to the bus, matching the
    /// "single hot path with a runtime fast-check" choice in spec.md §9.
    pub cache_enabled: bool,
    /// When `true`, posting a VDP event blocks the caller until the
    /// worker thread signals completion (used by tests and by front ends
    /// that want synchronous frame composition, per spec.md §4.5.3).
    pub synchronous_vdp: bool,
}

impl MachineConfig {
    pub const BOOT_ROM_SIZE: usize = 512 * 1024;

    pub fn new(boot_rom: Vec<u8>) -> Self {
        MachineConfig { boot_rom, backup_ram: vec![0xFF; 32 * 1024], cache_enabled: true, synchronous_vdp: false }
    }
}
