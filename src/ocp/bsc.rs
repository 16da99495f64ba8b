//! Bus State Controller (spec.md §4.4: BSC register window at
//! 0x1E0..0x1F8). Ported register-for-register from
//! `examples/original_source/libs/satemu-core/include/satemu/hw/sh2/
//! sh2_bsc.hpp`; none of these control real wait-state or refresh timing
//! here; they are plain storage so guest software reading/writing BCR1,
//! BCR2, WCR, MCR, RTCSR, RTCNT, and RTCOR observes the documented reset
//! values and write-back behavior.

pub struct Bsc {
    pub bcr1: u16,
    pub bcr2: u16,
    pub wcr: u16,
    pub mcr: u16,
    pub rtcsr: u16,
    pub rtcnt: u8,
    pub rtcor: u8,
}

impl Bsc {
    pub fn new() -> Self {
        let mut b = Bsc { bcr1: 0, bcr2: 0, wcr: 0, mcr: 0, rtcsr: 0, rtcnt: 0, rtcor: 0 };
        b.reset();
        b
    }

    pub fn reset(&mut self) {
        self.bcr1 = 0x03F0;
        self.bcr2 = 0x00FC;
        self.wcr = 0xAAFF;
        self.mcr = 0x0000;
        self.rtcsr = 0x0000;
        self.rtcnt = 0;
        self.rtcor = 0;
    }

    pub fn write_bcr1(&mut self, value: u16) {
        self.bcr1 = value & 0x7FFF;
    }

    /// RTCSR.CMF (bit 0) follows the same clear-if-previously-set
    /// discipline as the FRT/WDT status bits (spec.md §4.2 "Failures").
    pub fn write_rtcsr(&mut self, value: u16) {
        let cmf = self.rtcsr & 1 != 0 && value & 1 != 0;
        self.rtcsr = (value & !1) | (cmf as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_values_match_hardware_defaults() {
        let bsc = Bsc::new();
        assert_eq!(bsc.bcr1, 0x03F0);
        assert_eq!(bsc.wcr, 0xAAFF);
    }

    #[test]
    fn rtcsr_cmf_only_clears_if_previously_set() {
        let mut bsc = Bsc::new();
        bsc.write_rtcsr(0x01);
        assert_eq!(bsc.rtcsr & 1, 0);
        bsc.rtcsr |= 1;
        bsc.write_rtcsr(0x01);
        assert_eq!(bsc.rtcsr & 1, 1);
        bsc.write_rtcsr(0x00);
        assert_eq!(bsc.rtcsr & 1, 0);
    }
}
