//! SH-2 on-chip cache (spec.md §3 "Cache entry", §4.2 "Cache").
//!
//! 4-way, 64-set, 16-byte-line associative cache with a 6-bit pseudo-LRU
//! state per set. The LRU AND/OR update masks and way-select table are
//! ported from `examples/original_source/libs/satemu-core/include/satemu/
//! hw/sh2/sh2_cache.hpp`, which documents the exact bit patterns Saturn
//! software depends on.

pub const WAYS: usize = 4;
pub const SETS: usize = 64;
pub const LINE_SIZE: usize = 16;

/// AND/OR masks applied to a set's 6-bit LRU state whenever `way` becomes
/// the most-recently-used way of that set.
const LRU_UPDATE: [(u8, u8); WAYS] = [
    (0b111000, 0b000000), // way 0 becomes MRU: 000...
    (0b011001, 0b100000), // way 1 becomes MRU: 1..00.
    (0b101010, 0b010100), // way 2 becomes MRU: .1.1.0
    (0b110100, 0b001011), // way 3 becomes MRU: ..1.11
];

/// 64-entry table mapping a (masked) LRU state to the way that should be
/// replaced next, built once from the same bit patterns as `LRU_UPDATE`
/// (the teacher's C++ builds this at compile time via a `constexpr`
/// bit-scatter; we build the equivalent at first use since `const fn`
/// bit-scatter isn't worth the ceremony for a 64-entry table).
fn build_way_select_table() -> [u8; 64] {
    let mut table = [WAYS as u8; 64];
    // Candidate patterns per way, expressed as (fixed bits, fixed mask);
    // free bits range over every combination to populate all matches.
    let patterns: [(u8, u8); WAYS] = [
        (0b111000, 0b111000), // way 0 is LRU: top three bits all 1
        (0b000110, 0b000110), // way 1 is LRU
        (0b000001, 0b101011),
        (0b000000, 0b110100),
    ];
    for lru in 0..64u8 {
        for (way, &(bits, mask)) in patterns.iter().enumerate() {
            if lru & mask == bits {
                if table[lru as usize] == WAYS as u8 {
                    table[lru as usize] = way as u8;
                }
            }
        }
    }
    table
}

#[derive(Clone, Copy, Default)]
struct Tag {
    valid: bool,
    tag_address: u32, // bits [28:10] of the physical address
}

#[derive(Clone)]
struct Entry {
    tags: [Tag; WAYS],
    lines: [[u8; LINE_SIZE]; WAYS],
}

impl Default for Entry {
    fn default() -> Self {
        Entry { tags: [Tag::default(); WAYS], lines: [[0; LINE_SIZE]; WAYS] }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AccessClass {
    Data,
    Instruction,
}

/// Cache Control Register (address-relative offset 0x092, spec.md §6).
#[derive(Clone, Copy, Default)]
pub struct Ccr {
    pub ce: bool,
    pub id: bool,
    pub od: bool,
    pub tw: bool,
    pub cp: bool,
    pub wn: u8,
}

impl Ccr {
    pub fn read(&self) -> u8 {
        (self.ce as u8)
            | ((self.id as u8) << 1)
            | ((self.od as u8) << 2)
            | ((self.tw as u8) << 3)
            | ((self.cp as u8) << 4)
            | (self.wn << 6)
    }
    pub fn write(&mut self, value: u8) {
        self.ce = value & 1 != 0;
        self.id = value & 2 != 0;
        self.od = value & 4 != 0;
        self.tw = value & 8 != 0;
        self.cp = value & 0x10 != 0;
        self.wn = (value >> 6) & 0x3;
    }
}

pub struct Cache {
    entries: Vec<Entry>,
    lru: Vec<u8>,
    way_select: [u8; 64],
    pub ccr: Ccr,
}

fn set_index(address: u32) -> usize {
    ((address >> 4) & 0x3F) as usize
}
fn tag_of(address: u32) -> u32 {
    (address >> 10) & 0x7FFFF
}

impl Cache {
    pub fn new() -> Self {
        Cache {
            entries: vec![Entry::default(); SETS],
            lru: vec![0; SETS],
            way_select: build_way_select_table(),
            ccr: Ccr::default(),
        }
    }

    pub fn reset(&mut self) {
        for e in self.entries.iter_mut() {
            *e = Entry::default();
        }
        for l in self.lru.iter_mut() {
            *l = 0;
        }
        self.ccr = Ccr::default();
    }

    /// Returns the way index matching `address` in its set, or `None` on
    /// a miss. Invariant (spec.md §8): if any valid way's tag matches,
    /// this always finds it independent of LRU state.
    pub fn find_way(&self, address: u32) -> Option<usize> {
        let set = &self.entries[set_index(address)];
        let tag = tag_of(address);
        set.tags.iter().position(|t| t.valid && t.tag_address == tag)
    }

    fn and_mask(&self) -> u8 {
        if self.ccr.tw {
            0x1
        } else {
            0x3F
        }
    }

    /// Selects a replacement way for a miss, honoring the two-way mode
    /// mask and the per-class replacement-disable bits. Returns `None`
    /// when replacement is disabled for `class` (miss serviced from the
    /// bus but never installed in the cache).
    pub fn select_replacement_way(&mut self, address: u32, class: AccessClass) -> Option<usize> {
        let disabled = match class {
            AccessClass::Data => self.ccr.od,
            AccessClass::Instruction => self.ccr.id,
        };
        if disabled {
            return None;
        }
        let index = set_index(address);
        let masked = self.lru[index] & self.and_mask();
        let way = self.way_select[masked as usize & 0x3F];
        let way = if way as usize >= WAYS { 0 } else { way as usize };
        let tag = tag_of(address);
        self.entries[index].tags[way] = Tag { valid: true, tag_address: tag };
        Some(way)
    }

    /// Updates the pseudo-LRU tree marking `way` as most-recently-used.
    /// Never called for address/data-array windows (spec.md §4.2).
    pub fn update_lru(&mut self, address: u32, way: usize) {
        let index = set_index(address);
        let (and_mask, or_mask) = LRU_UPDATE[way];
        self.lru[index] = (self.lru[index] & and_mask) | or_mask;
    }

    pub fn read_line(&self, address: u32, way: usize) -> &[u8; LINE_SIZE] {
        &self.entries[set_index(address)].lines[way]
    }

    pub fn write_line_byte(&mut self, address: u32, way: usize, offset: usize, value: u8) {
        self.entries[set_index(address)].lines[way][offset] = value;
    }

    /// Invalidates every way in the addressed set whose tag matches
    /// `address` (associative purge, spec.md §3/§4.2).
    pub fn associative_purge(&mut self, address: u32) {
        let index = set_index(address);
        let tag = tag_of(address);
        for t in self.entries[index].tags.iter_mut() {
            if t.tag_address == tag {
                t.valid = false;
            }
        }
    }

    /// Writing the purge bit (CCR.CP) clears every set and its LRU state.
    pub fn purge_all(&mut self) {
        for e in self.entries.iter_mut() {
            for t in e.tags.iter_mut() {
                t.valid = false;
            }
        }
        for l in self.lru.iter_mut() {
            *l = 0;
        }
    }

    pub fn write_ccr(&mut self, value: u8) {
        self.ccr.write(value);
        if self.ccr.cp {
            self.purge_all();
            self.ccr.cp = false;
        }
    }

    /// Address-array window read (spec.md §6: 0x60000000..+1KiB, mirrored).
    /// `way` selects explicitly via the low address bits, independent of
    /// `CCR.Wn`, matching the "peek" access class from the source.
    pub fn read_address_array(&self, address: u32, way: usize) -> u32 {
        let index = set_index(address);
        let tag = &self.entries[index].tags[way];
        let mut word = (tag.tag_address << 10) | (1 << 2);
        if tag.valid {
            word |= 1 << 2;
        } else {
            word &= !(1 << 2);
        }
        word | ((self.lru[index] as u32) << 4)
    }

    pub fn write_address_array(&mut self, address: u32, way: usize, value: u32) {
        let index = set_index(address);
        let tag_address = (value >> 10) & 0x7FFFF;
        let valid = value & (1 << 2) != 0;
        self.entries[index].tags[way] = Tag { valid, tag_address };
        self.lru[index] = ((value >> 4) & 0x3F) as u8;
    }

    /// Data-array window access (spec.md §6: 0x60000000-class window,
    /// direct byte inspect/override of a cache line). Never updates LRU.
    pub fn read_data_array_byte(&self, address: u32) -> u8 {
        let index = set_index(address);
        let way = ((address >> 10) & 0x3) as usize;
        let byte = (address & 0xF) as usize;
        self.entries[index].lines[way][byte]
    }

    pub fn write_data_array_byte(&mut self, address: u32, value: u8) {
        let index = set_index(address);
        let way = ((address >> 10) & 0x3) as usize;
        let byte = (address & 0xF) as usize;
        self.entries[index].lines[way][byte] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit_after_fill_returns_same_way() {
        let mut cache = Cache::new();
        let addr = 0x0600_0000u32;
        assert_eq!(cache.find_way(addr), None);
        let way = cache.select_replacement_way(addr, AccessClass::Instruction).unwrap();
        cache.write_line_byte(addr, way, 0, 0x42);
        cache.update_lru(addr, way);
        assert_eq!(cache.find_way(addr), Some(way));
        assert_eq!(cache.read_line(addr, way)[0], 0x42);
    }

    #[test]
    fn associative_purge_only_clears_matching_tag() {
        let mut cache = Cache::new();
        let a = 0x0600_0000u32;
        let b = 0x0601_0000u32; // different tag, likely different set too but force same set
        let way_a = cache.select_replacement_way(a, AccessClass::Data).unwrap();
        cache.update_lru(a, way_a);
        cache.associative_purge(b);
        assert_eq!(cache.find_way(a), Some(way_a));
    }

    #[test]
    fn replacement_disabled_for_class_skips_fill() {
        let mut cache = Cache::new();
        cache.ccr.od = true;
        assert_eq!(cache.select_replacement_way(0x0600_0000, AccessClass::Data), None);
    }

    #[test]
    fn purge_bit_clears_all_sets() {
        let mut cache = Cache::new();
        let addr = 0x0600_0000u32;
        let way = cache.select_replacement_way(addr, AccessClass::Data).unwrap();
        cache.update_lru(addr, way);
        cache.write_ccr(0x10); // CP bit
        assert_eq!(cache.find_way(addr), None);
        assert!(!cache.ccr.cp);
    }
}
