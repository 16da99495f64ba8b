//! Top-level machine (spec.md §2 "System overview", §6 "External
//! interfaces"). Wires the two SH-2 cores, the shared bus, the VDP
//! worker thread, and the scheduler together behind a small external
//! surface: construct, reset, advance by frames, read back the output
//! framebuffer.

use log::{debug, info};

use crate::bus::Bus;
use crate::config::MachineConfig;
use crate::cpu::Sh2;
use crate::error::{CoreError, CoreResult};
use crate::scheduler::Scheduler;
use crate::vdp::{FrameBuffer, VdpPipeline};

/// Collaborator seam for the SCU interrupt/DMA bridge (spec.md §1: out
/// of scope as an implementation, but the core still needs somewhere to
/// forward the acknowledgements and external raises a real SCU would
/// produce). Never implemented in this crate.
pub trait ScuBridge {
    fn ack_interrupt(&mut self, vector: u8);
    fn raise_external(&mut self, source: u8);
}

/// Collaborator seam for a front end that wants composited frames
/// pushed to it instead of polling [`Machine::framebuffer`].
pub trait FrameSink {
    fn present(&mut self, frame: &[u32]);
}

/// Collaborator seam for backup-RAM persistence (spec.md §1: persistence
/// across runs is the front end's job).
pub trait BackupRamStore {
    fn load(&self) -> Vec<u8>;
    fn persist(&self, data: &[u8]);
}

/// A complete simulated Saturn core: two SH-2 CPUs (master/slave), the
/// bus they share, and the video pipeline running on its own thread.
pub struct Machine {
    pub master: Sh2,
    pub slave: Sh2,
    pub bus: Bus,
    vdp: VdpPipeline,
    scheduler: Scheduler,
    config: MachineConfig,
}

impl Machine {
    /// Builds a machine from `config`. Fails only for the host-level
    /// reasons spec.md §7.5 enumerates: a malformed boot ROM image or a
    /// VDP worker thread that could not be spawned.
    pub fn new(config: MachineConfig) -> CoreResult<Self> {
        if config.boot_rom.len() != MachineConfig::BOOT_ROM_SIZE {
            return Err(CoreError::BadBootRomSize {
                actual: config.boot_rom.len(),
                expected: MachineConfig::BOOT_ROM_SIZE,
            });
        }

        let vdp = VdpPipeline::start()?;
        let mut bus = Bus::new(&config);
        bus.set_vdp_sink(Box::new(vdp.producer_handle()));

        let mut master = Sh2::new(config.cache_enabled);
        let mut slave = Sh2::new(config.cache_enabled);
        master.reset(true, false, &mut bus);
        slave.reset(true, false, &mut bus);

        info!("machine constructed, cache_enabled={}", config.cache_enabled);
        Ok(Machine { master, slave, bus, vdp, scheduler: Scheduler::new(), config })
    }

    /// Hard reset: reinitializes every register and memory bank (spec.md
    /// §6 "Exit/reset contract").
    pub fn hard_reset(&mut self) {
        self.bus.hard_reset();
        self.master.reset(true, false, &mut self.bus);
        self.slave.reset(true, false, &mut self.bus);
        self.scheduler.reset();
        if let Some(vdp) = self.bus.vdp_mut() {
            vdp.reset();
        }
        debug!("hard reset");
    }

    /// Soft reset: RAM survives, registers reinitialize (spec.md §6).
    pub fn soft_reset(&mut self) {
        self.bus.soft_reset();
        self.master.reset(false, false, &mut self.bus);
        self.slave.reset(false, false, &mut self.bus);
        debug!("soft reset");
    }

    /// Advances the machine by one scanline's worth of both CPUs, posting
    /// any scanline-boundary VDP events (spec.md §5 "Scheduling model").
    pub fn run_scanline(&mut self) {
        self.scheduler.run_scanline(&mut self.master, &mut self.slave, &mut self.bus);
    }

    /// Advances the machine by one complete frame. When
    /// [`MachineConfig::synchronous_vdp`] is set, blocks until the
    /// renderer has finished compositing it before returning, so the
    /// caller's next [`Machine::framebuffer`] read observes it.
    pub fn run_frame(&mut self) {
        self.scheduler.run_frame(&mut self.master, &mut self.slave, &mut self.bus);
        if self.config.synchronous_vdp {
            self.vdp.producer().wait_render_finished();
        }
    }

    /// The renderer's latest composited frame, shared with the worker
    /// thread behind a mutex (spec.md §4.5.3).
    pub fn framebuffer(&self) -> FrameBuffer {
        self.vdp.frame()
    }

    pub fn scanline(&self) -> u32 {
        self.scheduler.scanline()
    }

    /// Pushes the current composited frame to a front end's sink, for
    /// callers that prefer push over polling [`Machine::framebuffer`].
    pub fn present(&self, sink: &mut dyn FrameSink) {
        let frame = self.vdp.frame();
        let frame = frame.lock().unwrap();
        sink.present(&frame);
    }
}
