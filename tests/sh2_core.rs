//! Concrete scenarios from spec.md §8 that exercise the SH-2 core
//! through its public `Sh2`/`Bus` surface rather than a single module's
//! internals.

use saturn_core::bus::{Bus, SysBus};
use saturn_core::config::MachineConfig;
use saturn_core::cpu::Sh2;
use saturn_core::ocp::intc::InterruptSource;

fn fresh_bus() -> Bus {
    Bus::new(&MachineConfig::new(vec![0u8; MachineConfig::BOOT_ROM_SIZE]))
}

/// Scenario 1: delay slot and BRA. `BRA 0x200` at 0x100 (disp encodes
/// +510 words... here we just place the branch and its slot directly
/// and confirm the slot instruction executes at the un-redirected PC
/// before the branch target takes effect.
#[test]
fn delay_slot_instruction_executes_before_branch_target_takes_effect() {
    let mut bus = fresh_bus();
    // BRA disp: target = pc_after_bra(0x102) + 2 + disp*2. We want 0x200,
    // so disp*2 = 0x200 - 0x104 = 0xFC, disp = 0x7E.
    let bra = 0xA000u16 | 0x007E;
    bus.write16(0x0600_0100, bra);
    bus.write16(0x0600_0102, 0x0009); // nop, the delay slot

    let mut cpu = Sh2::new(true);
    cpu.probe().set_pc(0x0600_0100);

    cpu.step(&mut bus); // executes BRA, sets delay-slot pending
    assert!(cpu.in_delay_slot());
    assert_eq!(cpu.pc(), 0x0600_0102);

    cpu.step(&mut bus); // executes the slot's nop, then redirects PC
    assert!(!cpu.in_delay_slot());
    assert_eq!(cpu.pc(), 0x0600_0200);
}

/// Scenario 4: interrupt masking. A level-4 source pending under
/// SR.ILevel=4 is not serviced; NMI (level 16, unmaskable) always is,
/// and dispatches to vector 11.
#[test]
fn level_4_source_masked_but_nmi_always_dispatches() {
    // Boot ROM is read-only once the bus is constructed (spec.md §7.3),
    // so the vector table entry has to be baked into the initial image.
    let mut boot_rom = vec![0u8; MachineConfig::BOOT_ROM_SIZE];
    boot_rom[0x2C..0x30].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    let mut bus = Bus::new(&MachineConfig::new(boot_rom));
    bus.write16(0x0600_0100, 0x0009); // nop, runs forever if nothing fires

    let mut cpu = Sh2::new(true);
    cpu.probe().set_pc(0x0600_0100);
    cpu.probe().set_r(15, 0x0601_0000);
    let mut sr = cpu.sr();
    sr.set_ilevel(0x4);
    cpu.probe().set_sr(sr.0);

    cpu.ocp.intc.set_priority(InterruptSource::FrtOci, 0x4);
    cpu.ocp.intc.raise(InterruptSource::FrtOci);
    cpu.step(&mut bus);
    // Masked: PC advanced past the nop, not redirected to any vector.
    assert_eq!(cpu.pc(), 0x0600_0102);

    cpu.set_nmi();
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0001_0000);
    assert_eq!(cpu.sr().ilevel(), 0xF);
}
