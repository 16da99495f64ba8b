//! Virtual-address translation (spec.md §6 "SH-2 virtual address bits
//! 31..29"). Every CPU memory access — fetch, load, store — goes through
//! here so the cache-bypass regions (cache-through, associative purge,
//! address-array, data-array, on-chip registers) apply uniformly.

use crate::bus::SysBus;
use crate::ocp::cache::AccessClass;

use super::Sh2;

/// Reads return this constant from the associative-purge window
/// (spec.md §6).
const ASSOCIATIVE_PURGE_READ: u32 = 0x2312;

fn region(address: u32) -> u8 {
    ((address >> 29) & 0x7) as u8
}

impl Sh2 {
    fn cached_read_byte(&mut self, address: u32, bus: &mut dyn SysBus, class: AccessClass) -> u8 {
        if !self.cache_enabled {
            return bus.read8(address & crate::bus::ADDRESS_MASK);
        }
        let phys = address & crate::bus::ADDRESS_MASK;
        if let Some(way) = self.ocp.cache.find_way(phys) {
            self.ocp.cache.update_lru(phys, way);
            let offset = (phys & 0xF) as usize;
            return self.ocp.cache.read_line(phys, way)[offset];
        }
        match self.ocp.cache.select_replacement_way(phys, class) {
            Some(way) => {
                let base = phys & !0xF;
                for i in 0..16u32 {
                    let byte = bus.read8(base + i);
                    self.ocp.cache.write_line_byte(phys, way, i as usize, byte);
                }
                self.ocp.cache.update_lru(phys, way);
                let offset = (phys & 0xF) as usize;
                self.ocp.cache.read_line(phys, way)[offset]
            }
            None => bus.read8(phys),
        }
    }

    fn cached_write_byte(&mut self, address: u32, value: u8, bus: &mut dyn SysBus) {
        let phys = address & crate::bus::ADDRESS_MASK;
        bus.write8(phys, value);
        if self.cache_enabled {
            if let Some(way) = self.ocp.cache.find_way(phys) {
                self.ocp.cache.write_line_byte(phys, way, (phys & 0xF) as usize, value);
                self.ocp.cache.update_lru(phys, way);
            }
        }
    }

    fn onchip_read(&mut self, offset: u32, width: u32) -> u32 {
        crate::cpu::onchip::read(self, offset, width)
    }
    fn onchip_write(&mut self, offset: u32, width: u32, value: u32) {
        crate::cpu::onchip::write(self, offset, width, value)
    }

    pub(super) fn read_u8_class(&mut self, address: u32, bus: &mut dyn SysBus, class: AccessClass) -> u8 {
        match region(address) {
            0 => self.cached_read_byte(address, bus, class),
            1 | 5 => bus.read8(address & crate::bus::ADDRESS_MASK),
            2 => ASSOCIATIVE_PURGE_READ as u8,
            3 => {
                let way = ((address >> 12) & 0x3) as usize;
                self.ocp.cache.read_address_array(address, way) as u8
            }
            4 | 6 => self.ocp.cache.read_data_array_byte(address),
            _ => self.onchip_read(address & 0x1FF, 8) as u8,
        }
    }

    pub(super) fn write_u8_class(&mut self, address: u32, value: u8, bus: &mut dyn SysBus) {
        match region(address) {
            0 => self.cached_write_byte(address, value, bus),
            1 | 5 => bus.write8(address & crate::bus::ADDRESS_MASK, value),
            2 => {
                self.ocp.cache.associative_purge(address);
            }
            3 => {
                let way = ((address >> 12) & 0x3) as usize;
                self.ocp.cache.write_address_array(address, way, value as u32);
            }
            4 | 6 => self.ocp.cache.write_data_array_byte(address, value),
            _ => self.onchip_write(address & 0x1FF, 8, value as u32),
        }
    }

    pub(super) fn read_u16_class(&mut self, address: u32, bus: &mut dyn SysBus, class: AccessClass) -> u16 {
        let a = address & !1;
        match region(a) {
            0 if self.cache_enabled => {
                ((self.read_u8_class(a, bus, class) as u16) << 8) | self.read_u8_class(a + 1, bus, class) as u16
            }
            0 | 1 | 5 => bus.read16(a & crate::bus::ADDRESS_MASK),
            2 => ASSOCIATIVE_PURGE_READ as u16,
            7 => self.onchip_read(a & 0x1FF, 16) as u16,
            _ => ((self.read_u8_class(a, bus, class) as u16) << 8) | self.read_u8_class(a + 1, bus, class) as u16,
        }
    }

    pub(super) fn write_u16_class(&mut self, address: u32, value: u16, bus: &mut dyn SysBus) {
        let a = address & !1;
        match region(a) {
            0 | 1 | 5 => bus.write16(a & crate::bus::ADDRESS_MASK, value),
            7 => self.onchip_write(a & 0x1FF, 16, value as u32),
            _ => {
                self.write_u8_class(a, (value >> 8) as u8, bus);
                self.write_u8_class(a + 1, value as u8, bus);
            }
        }
    }

    pub(super) fn read_u32_class(&mut self, address: u32, bus: &mut dyn SysBus, class: AccessClass) -> u32 {
        let a = address & !3;
        match region(a) {
            0 | 1 | 5 => bus.read32(a & crate::bus::ADDRESS_MASK),
            2 => ASSOCIATIVE_PURGE_READ,
            3 => {
                let way = ((a >> 12) & 0x3) as usize;
                self.ocp.cache.read_address_array(a, way)
            }
            7 => self.onchip_read(a & 0x1FF, 32),
            _ => ((self.read_u16_class(a, bus, class) as u32) << 16) | self.read_u16_class(a + 2, bus, class) as u32,
        }
    }

    pub(super) fn write_u32_class(&mut self, address: u32, value: u32, bus: &mut dyn SysBus) {
        let a = address & !3;
        match region(a) {
            0 | 1 | 5 => bus.write32(a & crate::bus::ADDRESS_MASK, value),
            3 => {
                let way = ((a >> 12) & 0x3) as usize;
                self.ocp.cache.write_address_array(a, way, value);
            }
            7 => self.onchip_write(a & 0x1FF, 32, value),
            _ => {
                self.write_u16_class(a, (value >> 16) as u16, bus);
                self.write_u16_class(a + 2, value as u16, bus);
            }
        }
    }

    pub fn read8(&mut self, address: u32, bus: &mut dyn SysBus) -> u8 {
        self.read_u8_class(address, bus, AccessClass::Data)
    }
    pub fn read16(&mut self, address: u32, bus: &mut dyn SysBus) -> u16 {
        self.read_u16_class(address, bus, AccessClass::Data)
    }
    pub fn read32(&mut self, address: u32, bus: &mut dyn SysBus) -> u32 {
        self.read_u32_class(address, bus, AccessClass::Data)
    }
    pub fn write8(&mut self, address: u32, value: u8, bus: &mut dyn SysBus) {
        self.write_u8_class(address, value, bus)
    }
    pub fn write16(&mut self, address: u32, value: u16, bus: &mut dyn SysBus) {
        self.write_u16_class(address, value, bus)
    }
    pub fn write32(&mut self, address: u32, value: u32, bus: &mut dyn SysBus) {
        self.write_u32_class(address, value, bus)
    }

    pub(super) fn fetch(&mut self, address: u32, bus: &mut dyn SysBus) -> u16 {
        self.read_u16_class(address, bus, AccessClass::Instruction)
    }
}
