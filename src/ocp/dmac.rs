//! DMA Controller (spec.md §3 "DMA channel", §4.2 "DMAC").
//!
//! Ported from `examples/original_source/libs/satemu-core/include/satemu/
//! hw/sh2/sh2_dmac.hpp`. This module only models channel/operation-register
//! state and the per-unit transfer step; the bus itself drives the actual
//! byte/word/long/16-byte-block moves (spec.md §9: MMIO registers stay
//! opaque values with explicit accessors, not field-by-field externally).

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IncrementMode {
    Fixed,
    Increment,
    Decrement,
    Reserved,
}

impl IncrementMode {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => IncrementMode::Fixed,
            1 => IncrementMode::Increment,
            2 => IncrementMode::Decrement,
            _ => IncrementMode::Reserved,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransferSize {
    Byte,
    Word,
    Longword,
    QuadLongword,
}

impl TransferSize {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => TransferSize::Byte,
            1 => TransferSize::Word,
            2 => TransferSize::Longword,
            _ => TransferSize::QuadLongword,
        }
    }
    pub fn bytes(self) -> u32 {
        match self {
            TransferSize::Byte => 1,
            TransferSize::Word => 2,
            TransferSize::Longword => 4,
            TransferSize::QuadLongword => 16,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BusMode {
    CycleSteal,
    Burst,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddressMode {
    Dual,
    Single,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResourceSelect {
    Dreq,
    Rxi,
    Txi,
    Reserved,
}

pub struct DmaChannel {
    pub src_address: u32,
    pub dst_address: u32,
    pub xfer_count: u32, // 24 bits
    pub xfer_size: TransferSize,
    pub src_mode: IncrementMode,
    pub dst_mode: IncrementMode,
    pub auto_request: bool,
    pub ack_xfer_mode: bool,
    pub ack_level: bool,
    pub dreq_level: bool,
    pub xfer_bus_mode: BusMode,
    pub xfer_address_mode: AddressMode,
    pub irq_enable: bool,
    pub xfer_ended: bool,
    pub xfer_enabled: bool,
    pub res_select: ResourceSelect,
    pub vector: u8,
}

impl DmaChannel {
    pub fn new() -> Self {
        let mut c = DmaChannel {
            src_address: 0,
            dst_address: 0,
            xfer_count: 0,
            xfer_size: TransferSize::Byte,
            src_mode: IncrementMode::Fixed,
            dst_mode: IncrementMode::Fixed,
            auto_request: false,
            ack_xfer_mode: false,
            ack_level: false,
            dreq_level: false,
            xfer_bus_mode: BusMode::CycleSteal,
            xfer_address_mode: AddressMode::Dual,
            irq_enable: false,
            xfer_ended: false,
            xfer_enabled: false,
            res_select: ResourceSelect::Dreq,
            vector: 0,
        };
        c.reset();
        c
    }

    pub fn reset(&mut self) {
        self.xfer_size = TransferSize::Byte;
        self.src_mode = IncrementMode::Fixed;
        self.dst_mode = IncrementMode::Fixed;
        self.auto_request = false;
        self.ack_xfer_mode = false;
        self.ack_level = false;
        self.dreq_level = false;
        self.xfer_bus_mode = BusMode::CycleSteal;
        self.xfer_address_mode = AddressMode::Dual;
        self.irq_enable = false;
        self.xfer_ended = false;
        self.xfer_enabled = false;
        self.res_select = ResourceSelect::Dreq;
    }

    /// DE=1, TE=0 (spec.md §4.2: "eligible when its enable bit ... [is]
    /// satisfied"). DME/NMIF/AE live on `Dmaor` and are checked there.
    pub fn is_enabled(&self) -> bool {
        self.xfer_enabled && !self.xfer_ended
    }

    pub fn read_chcr(&self) -> u32 {
        ((self.dst_mode as u32) << 14)
            | ((self.src_mode as u32) << 12)
            | ((self.xfer_size as u32) << 10)
            | ((self.auto_request as u32) << 9)
            | ((self.ack_xfer_mode as u32) << 8)
            | ((self.ack_level as u32) << 7)
            | ((self.dreq_level as u32) << 5)
            | ((self.xfer_bus_mode as u32) << 4)
            | ((self.xfer_address_mode as u32) << 3)
            | ((self.irq_enable as u32) << 2)
            | ((self.xfer_ended as u32) << 1)
            | (self.xfer_enabled as u32)
    }

    pub fn write_chcr(&mut self, value: u32, poke: bool) {
        self.dst_mode = IncrementMode::from_bits(value >> 14);
        self.src_mode = IncrementMode::from_bits(value >> 12);
        self.xfer_size = TransferSize::from_bits(value >> 10);
        self.auto_request = value & (1 << 9) != 0;
        self.ack_xfer_mode = value & (1 << 8) != 0;
        self.ack_level = value & (1 << 7) != 0;
        self.dreq_level = value & (1 << 5) != 0;
        self.xfer_bus_mode = if value & (1 << 4) != 0 { BusMode::Burst } else { BusMode::CycleSteal };
        self.xfer_address_mode = if value & (1 << 3) != 0 { AddressMode::Single } else { AddressMode::Dual };
        self.irq_enable = value & (1 << 2) != 0;
        let te_bit = value & (1 << 1) != 0;
        if poke {
            self.xfer_ended = te_bit;
        } else {
            self.xfer_ended &= te_bit;
        }
        self.xfer_enabled = value & 1 != 0;
    }

    pub fn read_drcr(&self) -> u8 {
        self.res_select as u8
    }
    pub fn write_drcr(&mut self, value: u8) {
        self.res_select = match value & 0x3 {
            0 => ResourceSelect::Dreq,
            1 => ResourceSelect::Rxi,
            2 => ResourceSelect::Txi,
            _ => ResourceSelect::Reserved,
        };
    }

    fn step_address(mode: IncrementMode, address: u32, unit: u32) -> u32 {
        match mode {
            IncrementMode::Increment => address.wrapping_add(unit),
            IncrementMode::Decrement => address.wrapping_sub(unit),
            IncrementMode::Fixed | IncrementMode::Reserved => address,
        }
    }

    /// Steps the channel by one transfer unit, returning the byte range to
    /// copy (src, dst, len) for the bus to execute, and latching TE when
    /// the count reaches zero (spec.md §4.2: "upon reaching zero, TE is
    /// set and the end-of-xfer interrupt is latched").
    pub fn step_unit(&mut self) -> (u32, u32, u32) {
        let unit = self.xfer_size.bytes();
        let src = self.src_address;
        let dst = self.dst_address;
        self.src_address = Self::step_address(self.src_mode, self.src_address, unit);
        self.dst_address = Self::step_address(self.dst_mode, self.dst_address, unit);
        let units = if self.xfer_count == 0 { 0x1_0000_00 } else { self.xfer_count };
        self.xfer_count = units.wrapping_sub(1) & 0xFF_FFFF;
        if self.xfer_count == 0 {
            self.xfer_ended = true;
        }
        (src, dst, unit)
    }
}

/// 1B0 DMAOR: priority mode plus sticky AE/NMIF error latches shared by
/// both channels (spec.md §4.2 "Failures").
#[derive(Clone, Copy, Default)]
pub struct Dmaor {
    pub round_robin: bool,
    pub address_error: bool,
    pub nmi_flag: bool,
    pub master_enable: bool,
}

impl Dmaor {
    pub fn read(&self) -> u32 {
        ((self.round_robin as u32) << 3)
            | ((self.address_error as u32) << 2)
            | ((self.nmi_flag as u32) << 1)
            | (self.master_enable as u32)
    }
    pub fn write(&mut self, value: u32, poke: bool) {
        self.round_robin = value & (1 << 3) != 0;
        if poke {
            self.address_error = value & (1 << 2) != 0;
            self.nmi_flag = value & (1 << 1) != 0;
        } else {
            self.address_error &= value & (1 << 2) != 0;
            self.nmi_flag &= value & (1 << 1) != 0;
        }
        self.master_enable = value & 1 != 0;
    }
}

pub struct Dmac {
    pub channels: [DmaChannel; 2],
    pub dmaor: Dmaor,
}

/// Outcome of `select_channel`: which channel (if any) is ready to run a
/// transfer unit this cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Selected {
    None,
    Channel(usize),
}

impl Dmac {
    pub fn new() -> Self {
        Dmac { channels: [DmaChannel::new(), DmaChannel::new()], dmaor: Dmaor::default() }
    }

    pub fn reset(&mut self) {
        for c in self.channels.iter_mut() {
            c.reset();
        }
        self.dmaor = Dmaor::default();
    }

    /// Eligibility per spec.md §4.2: "eligible when its enable bit, the
    /// master enable bit, and lack of NMI/address errors are all
    /// satisfied." Priority is fixed (channel 0 first) or round-robin.
    pub fn select_channel(&self, round_robin_turn: usize) -> Selected {
        if !self.dmaor.master_enable || self.dmaor.address_error || self.dmaor.nmi_flag {
            return Selected::None;
        }
        let eligible: Vec<usize> =
            (0..2).filter(|&i| self.channels[i].is_enabled()).collect();
        if eligible.is_empty() {
            return Selected::None;
        }
        if !self.dmaor.round_robin {
            Selected::Channel(eligible[0])
        } else {
            let start = round_robin_turn % 2;
            for offset in 0..2 {
                let idx = (start + offset) % 2;
                if eligible.contains(&idx) {
                    return Selected::Channel(idx);
                }
            }
            Selected::None
        }
    }

    /// Suspends every channel on a DMA address error (spec.md §4.2
    /// "Failures"); software clears AE to resume.
    pub fn raise_address_error(&mut self) {
        self.dmaor.address_error = true;
    }

    pub fn raise_nmi(&mut self) {
        self.dmaor.nmi_flag = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_copies_full_count_and_sets_te() {
        let mut dmac = Dmac::new();
        dmac.dmaor.master_enable = true;
        let ch = &mut dmac.channels[0];
        ch.src_address = 0x0600_0000;
        ch.dst_address = 0x0601_0000;
        ch.xfer_count = 4;
        ch.xfer_size = TransferSize::Longword;
        ch.auto_request = true;
        ch.xfer_enabled = true;

        let mut moved = 0u32;
        loop {
            match dmac.select_channel(0) {
                Selected::Channel(0) => {
                    let (_s, _d, unit) = dmac.channels[0].step_unit();
                    moved += unit;
                }
                _ => break,
            }
        }
        assert_eq!(moved, 16);
        assert!(dmac.channels[0].xfer_ended);
    }

    #[test]
    fn address_error_suspends_all_channels() {
        let mut dmac = Dmac::new();
        dmac.dmaor.master_enable = true;
        dmac.channels[0].xfer_enabled = true;
        dmac.channels[1].xfer_enabled = true;
        dmac.raise_address_error();
        assert_eq!(dmac.select_channel(0), Selected::None);
    }

    #[test]
    fn fixed_priority_always_prefers_channel_zero() {
        let mut dmac = Dmac::new();
        dmac.dmaor.master_enable = true;
        dmac.dmaor.round_robin = false;
        dmac.channels[0].xfer_enabled = true;
        dmac.channels[1].xfer_enabled = true;
        assert_eq!(dmac.select_channel(1), Selected::Channel(0));
    }
}
