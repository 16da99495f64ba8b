//! Cooperative scheduler (spec.md §5 "Scheduling model").
//!
//! Drives both SH-2 cores and the VDP event producer in cycle-count
//! order, one scanline at a time. A scanline is the scheduler's slice
//! granularity: both cores advance by the same cycle budget, then any
//! scanline-boundary VDP events (draw-line, VBlank in/out, field flip)
//! are posted. The CPUs themselves run on this thread; the VDP worker
//! runs on its own and only ever sees posted events (spec.md §4.5.3).

use crate::bus::{Bus, VdpSink};
use crate::cpu::Sh2;
use crate::ocp::intc::InterruptSource;

/// NTSC timing, SH-2 clock divided down to one tick per pixel clock's
/// worth of scanline (spec.md §1 footnote: "cycle-countable events for
/// HBlank/VBlank/frame boundaries" without pinning exact constants).
/// 704-pixel-wide lines at the SH-2's ~26.8 MHz clock land close to 455
/// cycles/line; 263 lines/frame matches NTSC's non-interlaced total.
pub const CYCLES_PER_SCANLINE: u32 = 455;
pub const SCANLINES_PER_FRAME: u32 = 263;
pub const VBLANK_START_LINE: u32 = 224;

/// Priority level VBlank-in drives onto `Irl` (spec.md doesn't pin a
/// number since the SCU interrupt-status mux that would normally select
/// this is out of scope; 6 matches real Saturn VBlank-IN's SCU level).
pub const VBLANK_IRL_LEVEL: u8 = 6;

/// Cooperative driver for one machine tick. Holds no CPU/bus/VDP state
/// itself — those are owned by [`crate::machine::Machine`] — only the
/// scanline/field position needed to know when to post frame-boundary
/// events.
pub struct Scheduler {
    scanline: u32,
    odd_field: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { scanline: 0, odd_field: false }
    }

    pub fn reset(&mut self) {
        self.scanline = 0;
        self.odd_field = false;
    }

    pub fn scanline(&self) -> u32 {
        self.scanline
    }

    /// Runs one scanline: both cores advance in lockstep by
    /// [`CYCLES_PER_SCANLINE`] (spec.md §5: "CPU cores, OCP counters, the
    /// bus, and posted VDP events are advanced in cycle-count order"),
    /// then the scanline-boundary VDP events are posted through whatever
    /// sink the bus was wired with (spec.md §7.5: no sink, no rendering,
    /// but CPU execution still proceeds).
    pub fn run_scanline(&mut self, master: &mut Sh2, slave: &mut Sh2, bus: &mut Bus) {
        master.advance(CYCLES_PER_SCANLINE, bus);
        slave.advance(CYCLES_PER_SCANLINE, bus);

        if self.scanline < VBLANK_START_LINE {
            if let Some(vdp) = bus.vdp_mut() {
                vdp.vdp2_draw_line(self.scanline);
            }
        } else if self.scanline == VBLANK_START_LINE {
            if let Some(vdp) = bus.vdp_mut() {
                vdp.vdp1_swap();
                vdp.vdp1_begin_frame();
            }
            master.ocp.intc.set_irl_level(VBLANK_IRL_LEVEL);
            master.ocp.intc.raise(InterruptSource::Irl);
            slave.ocp.intc.set_irl_level(VBLANK_IRL_LEVEL);
            slave.ocp.intc.raise(InterruptSource::Irl);
        }

        self.scanline += 1;
        if self.scanline >= SCANLINES_PER_FRAME {
            self.scanline = 0;
            self.odd_field = !self.odd_field;
            if let Some(vdp) = bus.vdp_mut() {
                vdp.odd_field(self.odd_field);
                vdp.vdp2_end_frame();
            }
        }
    }

    /// Runs scanlines until a full frame (one VBlank-to-VBlank span) has
    /// elapsed.
    pub fn run_frame(&mut self, master: &mut Sh2, slave: &mut Sh2, bus: &mut Bus) {
        for _ in 0..SCANLINES_PER_FRAME {
            self.run_scanline(master, slave, bus);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
