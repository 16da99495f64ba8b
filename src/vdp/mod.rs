//! Video pipeline (spec.md §4.5): VDP1 rasterizer, VDP2 compositor, and
//! the worker thread/event queue that isolates them from the CPU thread.

pub mod event;
pub mod vdp1;
pub mod vdp2;

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::warn;

use crate::error::{CoreError, CoreResult};
use event::{Consumer, MemWrite, Producer, VdpEvent};
use vdp1::Vdp1;
use vdp2::Vdp2;

/// RGB888 frame, one entry per pixel, row-major, sized to VDP2's current
/// output resolution — what a frontend blits.
pub type FrameBuffer = Arc<Mutex<Vec<u32>>>;

fn rgb555_to_888(c: u16) -> u32 {
    let r = ((c & 0x1F) as u32) << 3;
    let g = (((c >> 5) & 0x1F) as u32) << 3;
    let b = (((c >> 10) & 0x1F) as u32) << 3;
    (r << 16) | (g << 8) | b
}

struct Worker {
    vdp1: Vdp1,
    vdp2: Vdp2,
    frame: FrameBuffer,
    consumer: Consumer,
}

impl Worker {
    fn apply_write(&mut self, write: MemWrite) {
        match write {
            MemWrite::Vram { offset, width: _, value } => {
                if offset < vdp1::VRAM_SIZE as u32 {
                    self.vdp1.write_vram8(offset, value as u8);
                } else {
                    self.vdp2.write_vram8(offset - vdp1::VRAM_SIZE as u32, value as u8);
                }
            }
            MemWrite::Cram { offset, width: _, value } => {
                self.vdp2.write_cram8(offset, value as u8);
            }
            MemWrite::Reg { offset, value } => {
                if offset < 0x20 {
                    self.vdp1.write_reg(offset, value);
                } else {
                    self.vdp2.write_reg(offset - 0x20, value);
                }
            }
        }
    }

    fn publish_frame(&mut self) {
        let mut frame = self.frame.lock().unwrap();
        let (w, h) = (self.vdp2.width(), self.vdp2.height());
        if frame.len() != w * h {
            frame.resize(w * h, 0);
        }
        for y in 0..h {
            for x in 0..w {
                frame[y * w + x] = rgb555_to_888(self.vdp2.output_pixel(x, y));
            }
        }
    }

    fn run(mut self) {
        while let Ok(event) = self.consumer.rx.recv() {
            match event {
                VdpEvent::Reset => {
                    self.vdp1.reset(true);
                    self.vdp2.reset(true);
                }
                VdpEvent::OddField(flag) => self.vdp1.set_odd_field(flag),
                VdpEvent::Vdp1Erase => self.vdp1.erase(),
                VdpEvent::Vdp1Swap => {
                    self.vdp1.swap();
                    self.consumer.signal_framebuffer_swap();
                }
                VdpEvent::Vdp1BeginFrame => self.vdp1.begin_frame(),
                VdpEvent::Vdp2DrawLine(y) => self.vdp2.draw_line(y, &self.vdp1),
                VdpEvent::Vdp2EndFrame => {
                    self.publish_frame();
                    self.consumer.signal_render_finished();
                }
                VdpEvent::Writes(writes) => {
                    for w in writes {
                        self.apply_write(w);
                    }
                }
                VdpEvent::PreSave | VdpEvent::PostLoad => {}
                VdpEvent::Shutdown => break,
            }
        }
    }
}

/// Owns the VDP worker thread. Dropping this joins the thread after
/// posting `Shutdown` (spec.md §7.5: a core whose worker failed to start
/// "must not accept Advance").
pub struct VdpPipeline {
    producer: Producer,
    frame: FrameBuffer,
    handle: Option<JoinHandle<()>>,
}

impl VdpPipeline {
    pub fn start() -> CoreResult<Self> {
        let (producer, consumer) = event::channel();
        let frame = Arc::new(Mutex::new(vec![0u32; vdp2::MAX_WIDTH * vdp2::MAX_HEIGHT]));
        let worker = Worker { vdp1: Vdp1::new(), vdp2: Vdp2::new(), frame: frame.clone(), consumer };
        let handle = std::thread::Builder::new()
            .name("vdp-worker".into())
            .spawn(move || worker.run())
            .map_err(CoreError::WorkerSpawn)?;
        Ok(VdpPipeline { producer, frame, handle: Some(handle) })
    }

    pub fn producer(&mut self) -> &mut Producer {
        &mut self.producer
    }

    /// A cloned handle sharing this pipeline's channel and wait signals,
    /// for wiring into [`crate::bus::Bus::set_vdp_sink`] — the bus needs
    /// its own owned sink, independent of the handle this struct keeps
    /// for `Drop`'s shutdown call.
    pub fn producer_handle(&self) -> Producer {
        self.producer.clone()
    }

    pub fn frame(&self) -> FrameBuffer {
        self.frame.clone()
    }
}

impl Drop for VdpPipeline {
    fn drop(&mut self) {
        self.producer.shutdown();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("VDP worker thread panicked during shutdown");
            }
        }
    }
}

// `Producer` itself implements `VdpSink` (vdp/event.rs) — cloned handles
// of it are what `Bus::set_vdp_sink` and the scheduler actually use, so
// CPU-observed writes and scanline/frame rendering events interleave in
// the single producer thread's true call order (spec.md §5 "Ordering").
