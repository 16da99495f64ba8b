//! Scenario 6 (spec.md §8): an untextured VDP1 polygon, driven through
//! the full `Machine` stack — CPU-visible bus writes into VDP1 VRAM and
//! registers, the scheduler's scanline/frame boundaries, the VDP worker
//! thread, and VDP2's sprite-layer compositing — rather than calling
//! `Vdp1`'s own command interpreter directly.

use saturn_core::bus::SysBus;
use saturn_core::config::MachineConfig;
use saturn_core::machine::Machine;

const VDP1_VRAM_BASE: u32 = 0x05C0_0000;
const VDP1_REG_BASE: u32 = 0x05D0_0000;

fn write_word(m: &mut Machine, addr: u32, value: u16) {
    m.bus.write16(addr, value);
}

/// The rasterizer runs one frame behind what's visible: a command list
/// processed during frame N's VBlank becomes the *display* buffer only
/// once frame N+1's own VBlank swap flips it into view, and the
/// composited frame a caller reads back was built from scanlines drawn
/// *before* that frame's own swap. A polygon drawn once therefore needs
/// three frames to surface in `Machine::framebuffer`.
#[test]
fn untextured_polygon_becomes_visible_after_pipeline_latency() {
    let mut config = MachineConfig::new(vec![0u8; MachineConfig::BOOT_ROM_SIZE]);
    config.synchronous_vdp = true;
    let mut machine = Machine::new(config).expect("machine construction should succeed");

    // Same command layout as the quad in spec.md §8 scenario 6: a flat
    // 0x1234 polygon over (10,10)-(20,10)-(20,20)-(10,20).
    write_word(&mut machine, VDP1_VRAM_BASE + 0, 0x0004); // CMDCTRL: polygon
    write_word(&mut machine, VDP1_VRAM_BASE + 2, 0); // CMDLINK unused
    write_word(&mut machine, VDP1_VRAM_BASE + 4, 0); // CMDPMOD: no gouraud/clip
    write_word(&mut machine, VDP1_VRAM_BASE + 6, 0x1234); // CMDCOLR
    write_word(&mut machine, VDP1_VRAM_BASE + 12, 10); // CMDXA
    write_word(&mut machine, VDP1_VRAM_BASE + 14, 10); // CMDYA
    write_word(&mut machine, VDP1_VRAM_BASE + 16, 20); // CMDXB
    write_word(&mut machine, VDP1_VRAM_BASE + 18, 10); // CMDYB
    write_word(&mut machine, VDP1_VRAM_BASE + 20, 20); // CMDXC
    write_word(&mut machine, VDP1_VRAM_BASE + 22, 20); // CMDYC
    write_word(&mut machine, VDP1_VRAM_BASE + 24, 10); // CMDXD
    write_word(&mut machine, VDP1_VRAM_BASE + 26, 20); // CMDYD
    write_word(&mut machine, VDP1_VRAM_BASE + 32, 0x8000); // End command

    write_word(&mut machine, VDP1_REG_BASE + 0x04, 1); // PTMR: automatic draw

    for _ in 0..3 {
        machine.run_frame();
    }

    let frame = machine.framebuffer();
    let frame = frame.lock().unwrap();
    let width = 704; // VdpPipeline's default output width (vdp2::MAX_WIDTH)

    let inside = frame[15 * width + 15];
    let outside = frame[0 * width + 0];
    assert_ne!(inside, 0, "a pixel inside the quad should carry the polygon's color");
    assert_eq!(outside, 0, "a pixel outside the quad should remain untouched");
}
