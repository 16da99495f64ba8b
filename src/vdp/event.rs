//! VDP event queue (spec.md §4.5.3 "Threading").
//!
//! The main thread posts events describing CPU-visible state changes
//! (register/VRAM/CRAM writes, frame boundaries); a single worker thread
//! drains them and runs the VDP1/VDP2 pipeline. Write events are batched
//! on the producer side so a tight loop of VRAM pokes doesn't hit the
//! channel once per byte.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};

const BATCH_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug)]
pub enum MemWrite {
    Vram { offset: u32, width: u8, value: u32 },
    Cram { offset: u32, width: u8, value: u32 },
    Reg { offset: u32, value: u16 },
}

#[derive(Debug)]
pub enum VdpEvent {
    Reset,
    OddField(bool),
    Vdp1Erase,
    Vdp1Swap,
    Vdp1BeginFrame,
    Vdp2DrawLine(u32),
    Vdp2EndFrame,
    Writes(Vec<MemWrite>),
    PreSave,
    PostLoad,
    Shutdown,
}

/// Lets the producer (the CPU/bus thread) wait for a frame boundary when
/// the frontend wants synchronous composition (spec.md §4.5.3).
#[derive(Default)]
struct Signals {
    render_finished: Mutex<u64>,
    framebuffer_swap: Mutex<u64>,
    condvar: Condvar,
}

impl Signals {
    fn bump(&self, which: &Mutex<u64>) {
        let mut counter = which.lock().unwrap();
        *counter = counter.wrapping_add(1);
        self.condvar.notify_all();
    }

    fn wait_past(&self, which: &Mutex<u64>, observed: u64) {
        let mut counter = which.lock().unwrap();
        while *counter == observed {
            counter = self.condvar.wait(counter).unwrap();
        }
    }
}

/// Producer-side handle: owns the batching buffer and the sending half of
/// the channel plus the shared wait signals. Cloning shares the channel
/// and signals but starts a fresh, empty batch — safe because only the
/// single main thread ever produces (spec.md §5 "Shared resources"), so
/// two handles calling in program order still enqueue in that order.
#[derive(Clone)]
pub struct Producer {
    tx: Sender<VdpEvent>,
    signals: Arc<Signals>,
    batch: Vec<MemWrite>,
}

impl Producer {
    fn new(tx: Sender<VdpEvent>, signals: Arc<Signals>) -> Self {
        Producer { tx, signals, batch: Vec::with_capacity(BATCH_CAPACITY) }
    }

    fn push_write(&mut self, write: MemWrite) {
        self.batch.push(write);
        if self.batch.len() >= BATCH_CAPACITY {
            self.flush();
        }
    }

    pub fn post_vram_write(&mut self, offset: u32, width: u8, value: u32) {
        self.push_write(MemWrite::Vram { offset, width, value });
    }
    pub fn post_cram_write(&mut self, offset: u32, width: u8, value: u32) {
        self.push_write(MemWrite::Cram { offset, width, value });
    }
    pub fn post_reg_write(&mut self, offset: u32, value: u16) {
        self.push_write(MemWrite::Reg { offset, value });
    }

    /// Ensures queued writes are visible before a rendering event is sent
    /// ("a rendering event following a batch of writes always observes
    /// those writes", spec.md §5 "Ordering").
    pub fn flush(&mut self) {
        if !self.batch.is_empty() {
            let batch = std::mem::replace(&mut self.batch, Vec::with_capacity(BATCH_CAPACITY));
            let _ = self.tx.send(VdpEvent::Writes(batch));
        }
    }

    fn send_rendering(&mut self, event: VdpEvent) {
        self.flush();
        let _ = self.tx.send(event);
    }

    pub fn reset(&mut self) {
        self.send_rendering(VdpEvent::Reset);
    }
    pub fn odd_field(&mut self, flag: bool) {
        self.send_rendering(VdpEvent::OddField(flag));
    }
    pub fn vdp1_erase(&mut self) {
        self.send_rendering(VdpEvent::Vdp1Erase);
    }
    pub fn vdp1_swap(&mut self) {
        self.send_rendering(VdpEvent::Vdp1Swap);
    }
    pub fn vdp1_begin_frame(&mut self) {
        self.send_rendering(VdpEvent::Vdp1BeginFrame);
    }
    pub fn vdp2_draw_line(&mut self, y: u32) {
        self.send_rendering(VdpEvent::Vdp2DrawLine(y));
    }
    pub fn vdp2_end_frame(&mut self) {
        self.send_rendering(VdpEvent::Vdp2EndFrame);
    }
    pub fn pre_save(&mut self) {
        self.send_rendering(VdpEvent::PreSave);
    }
    pub fn post_load(&mut self) {
        self.send_rendering(VdpEvent::PostLoad);
    }
    pub fn shutdown(&mut self) {
        self.send_rendering(VdpEvent::Shutdown);
    }

    /// Blocks until the worker has signaled at least one render-finished
    /// event since `self` last observed one (synchronous composition
    /// mode, [`crate::config::MachineConfig::synchronous_vdp`]).
    pub fn wait_render_finished(&self) {
        let observed = *self.signals.render_finished.lock().unwrap();
        self.signals.wait_past(&self.signals.render_finished, observed);
    }
    pub fn wait_framebuffer_swap(&self) {
        let observed = *self.signals.framebuffer_swap.lock().unwrap();
        self.signals.wait_past(&self.signals.framebuffer_swap, observed);
    }
}

pub struct Consumer {
    pub rx: Receiver<VdpEvent>,
    signals: Arc<Signals>,
}

impl Consumer {
    pub fn signal_render_finished(&self) {
        self.signals.bump(&self.signals.render_finished);
    }
    pub fn signal_framebuffer_swap(&self) {
        self.signals.bump(&self.signals.framebuffer_swap);
    }
}

impl crate::bus::VdpSink for Producer {
    fn post_vram_write(&mut self, offset: u32, width: u8, value: u32) {
        Producer::post_vram_write(self, offset, width, value);
    }
    fn post_cram_write(&mut self, offset: u32, width: u8, value: u32) {
        Producer::post_cram_write(self, offset, width, value);
    }
    fn post_reg_write(&mut self, offset: u32, value: u16) {
        Producer::post_reg_write(self, offset, value);
    }
    fn reset(&mut self) {
        Producer::reset(self);
    }
    fn odd_field(&mut self, flag: bool) {
        Producer::odd_field(self, flag);
    }
    fn vdp1_erase(&mut self) {
        Producer::vdp1_erase(self);
    }
    fn vdp1_swap(&mut self) {
        Producer::vdp1_swap(self);
    }
    fn vdp1_begin_frame(&mut self) {
        Producer::vdp1_begin_frame(self);
    }
    fn vdp2_draw_line(&mut self, y: u32) {
        Producer::vdp2_draw_line(self, y);
    }
    fn vdp2_end_frame(&mut self) {
        Producer::vdp2_end_frame(self);
    }
}

pub fn channel() -> (Producer, Consumer) {
    let (tx, rx) = std::sync::mpsc::channel();
    let signals = Arc::new(Signals::default());
    (Producer::new(tx, signals.clone()), Consumer { rx, signals })
}
