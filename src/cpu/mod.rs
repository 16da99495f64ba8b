//! SH-2 Core (spec.md §4.3 "SH-2 Core").
//!
//! Fetch-decode-execute interpreter for one processor: delay-slot
//! tracking, exception entry, and integration with OCP and the bus.
//! Instantiated twice by [`crate::machine::Machine`] (master and slave).

mod exceptions;
mod exec;
mod mem;
mod onchip;
pub mod probe;
pub mod sr;

use crate::bus::SysBus;
use crate::decode::{decode, decode_in_delay_slot, Mnemonic};
use crate::ocp::intc::InterruptSource;
use crate::ocp::Ocp;
use sr::Sr;

pub use probe::Probe;

const RESET_VECTOR: u32 = 0;

pub struct Sh2 {
    pub(crate) regs: [u32; 16],
    pub(crate) pc: u32,
    pub(crate) pr: u32,
    pub(crate) gbr: u32,
    pub(crate) vbr: u32,
    pub(crate) mach: u32,
    pub(crate) macl: u32,
    pub(crate) sr: Sr,
    delay_slot: bool,
    delay_slot_target: u32,
    sleeping: bool,
    cache_enabled: bool,
    nmi_pin_high: bool,
    nmi_edge_pending: bool,
    pub ocp: Ocp,
}

impl Sh2 {
    pub fn new(cache_enabled: bool) -> Self {
        let mut cpu = Sh2 {
            regs: [0; 16],
            pc: 0,
            pr: 0,
            gbr: 0,
            vbr: 0,
            mach: 0,
            macl: 0,
            sr: Sr::default(),
            delay_slot: false,
            delay_slot_target: 0,
            sleeping: false,
            cache_enabled,
            nmi_pin_high: false,
            nmi_edge_pending: false,
            ocp: Ocp::new(),
        };
        cpu.hard_reset_registers();
        cpu
    }

    fn hard_reset_registers(&mut self) {
        self.regs = [0; 16];
        self.pc = RESET_VECTOR;
        self.pr = 0;
        self.gbr = 0;
        self.vbr = 0;
        self.mach = 0;
        self.macl = 0;
        self.sr = Sr::default();
        self.sr.set_ilevel(0xF);
        self.delay_slot = false;
        self.delay_slot_target = 0;
        self.sleeping = false;
    }

    /// `hard`: reinitializes registers and OCP state. `watchdog_initiated`:
    /// forwarded to the WDT so RSTCSR.WOVF survives its own reset (spec.md
    /// §6 "Exit/reset contract").
    pub fn reset(&mut self, hard: bool, watchdog_initiated: bool, bus: &mut dyn SysBus) {
        if hard {
            self.hard_reset_registers();
            self.ocp.reset(watchdog_initiated);
        } else {
            self.sr.set_ilevel(0xF);
            self.delay_slot = false;
            self.sleeping = false;
        }
        self.pc = self.read32(RESET_VECTOR, bus);
        self.regs[15] = self.read32(RESET_VECTOR + 4, bus);
    }

    pub fn probe(&mut self) -> Probe<'_> {
        Probe::new(self)
    }

    /// Edge-triggered NMI raise (spec.md §8 scenario 4): always unmaskable
    /// at level 16, vector 11.
    pub fn set_nmi(&mut self) {
        if !self.nmi_pin_high {
            self.nmi_edge_pending = true;
        }
        self.nmi_pin_high = true;
        self.ocp.intc.raise(InterruptSource::Nmi);
    }
    pub fn clear_nmi(&mut self) {
        self.nmi_pin_high = false;
    }

    fn check_and_service_interrupt(&mut self, bus: &mut dyn SysBus) -> bool {
        // An interrupt taken between a delayed branch and its slot
        // instruction is illegal (spec.md §8 "Delay-slot ordering").
        if self.delay_slot {
            return false;
        }
        if !self.ocp.intc.should_service(self.sr.ilevel()) {
            return false;
        }
        let source = self.ocp.intc.pending.source;
        // NMI's priority (16) is a sentinel above the 4-bit ILevel range;
        // real hardware sets ILevel to 0xF (all maskable sources blocked)
        // on NMI entry rather than truncating 16 down to 0.
        let level = self.ocp.intc.pending.level.min(0xF);
        let vector = self.ocp.intc.vector_of(source);
        self.sleeping = false;
        self.enter_exception(vector, Some(level), bus);
        true
    }

    /// Pushes SR then PC to the stack at R15, loads PC from
    /// `VBR + vector*4` (spec.md §4.3/§8). Final stack layout: `[R15]` =
    /// saved PC, `[R15+4]` = saved SR, matching real SH-2 `rte` (which
    /// pops PC then SR).
    fn enter_exception(&mut self, vector: u8, new_ilevel: Option<u8>, bus: &mut dyn SysBus) {
        self.regs[15] = self.regs[15].wrapping_sub(4);
        self.write32(self.regs[15], self.sr.0, bus);
        self.regs[15] = self.regs[15].wrapping_sub(4);
        self.write32(self.regs[15], self.pc, bus);
        if let Some(level) = new_ilevel {
            self.sr.set_ilevel(level);
        }
        self.pc = self.read32(self.vbr.wrapping_add(vector as u32 * 4), bus);
        self.delay_slot = false;
    }

    pub fn raise_illegal_instruction(&mut self, bus: &mut dyn SysBus) {
        self.enter_exception(exceptions::VEC_ILLEGAL_INSTRUCTION, None, bus);
    }

    /// "writing back the address of the delayed branch, not the slot"
    /// (spec.md §4.3 "Illegal-slot"): caller passes the branch's own PC.
    pub fn raise_illegal_slot(&mut self, branch_pc: u32, bus: &mut dyn SysBus) {
        self.pc = branch_pc;
        self.enter_exception(exceptions::VEC_ILLEGAL_SLOT, None, bus);
    }

    /// One fetch-decode-execute step. Returns the number of bus cycles
    /// consumed. Honors the delay-slot fetch path and the pre-fetch
    /// interrupt check (spec.md §4.3 "Fetch", §4.2 "INTC").
    pub fn step(&mut self, bus: &mut dyn SysBus) -> u32 {
        if self.check_and_service_interrupt(bus) {
            return 8;
        }
        if self.sleeping {
            return 1;
        }

        if self.delay_slot {
            let target = self.delay_slot_target;
            let branch_pc = self.pc.wrapping_sub(2);
            let op = self.fetch(self.pc, bus);
            let decoded = decode_in_delay_slot(op);
            self.delay_slot = false;
            if decoded.mnemonic == Mnemonic::IllegalSlot {
                self.raise_illegal_slot(branch_pc, bus);
                return 4;
            }
            self.pc = self.pc.wrapping_add(2);
            let cycles = exec::execute(self, decoded.mnemonic, decoded.args, bus);
            self.pc = target;
            cycles
        } else {
            let op = self.fetch(self.pc, bus);
            let decoded = decode(op);
            if decoded.mnemonic == Mnemonic::Illegal {
                self.raise_illegal_instruction(bus);
                return 4;
            }
            self.pc = self.pc.wrapping_add(2);
            exec::execute(self, decoded.mnemonic, decoded.args, bus)
        }
    }

    /// Loops `step` until at least `cycles` bus cycles have been consumed,
    /// returning the actual total (spec.md §4.3 "Cycle accounting").
    pub fn advance(&mut self, cycles: u32, bus: &mut dyn SysBus) -> u32 {
        let mut executed = 0u32;
        while executed < cycles {
            executed += self.step(bus);
            self.step_dma(bus);
        }
        self.ocp.advance_timers(executed as u64);
        executed
    }

    /// Runs one transfer unit on whichever DMAC channel is next up (spec.md
    /// §4.2 "DMAC"), moving bytes directly through the bus — DMA bypasses
    /// the cache, it is a separate bus master, not the executing core.
    fn step_dma(&mut self, bus: &mut dyn SysBus) {
        let selected = self.ocp.next_dma_channel();
        let idx = match selected {
            crate::ocp::dmac::Selected::Channel(idx) => idx,
            crate::ocp::dmac::Selected::None => return,
        };
        let (src, dst, len) = self.ocp.dmac.channels[idx].step_unit();
        for i in 0..len {
            let byte = bus.read8(src.wrapping_add(i));
            bus.write8(dst.wrapping_add(i), byte);
        }
        if self.ocp.dmac.channels[idx].xfer_ended {
            let source =
                if idx == 0 { InterruptSource::Dmac0XferEnd } else { InterruptSource::Dmac1XferEnd };
            self.ocp.intc.raise(source);
        }
    }

    pub(crate) fn set_delay_slot(&mut self, target: u32) {
        self.delay_slot = true;
        self.delay_slot_target = target;
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }
    pub fn sr(&self) -> Sr {
        self.sr
    }
    pub fn in_delay_slot(&self) -> bool {
        self.delay_slot
    }
}
