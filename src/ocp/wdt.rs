//! Watchdog Timer (spec.md §3/§4.2 "WDT").
//!
//! Ported from `examples/original_source/libs/satemu-core/include/satemu/
//! hw/sh2/sh2_wdt.hpp`. In watchdog mode an overflow can request a system
//! reset; in interval-timer mode it only raises `WDT_ITI`.

const DIVIDER_SHIFTS: [u32; 8] = [1, 6, 7, 8, 9, 10, 12, 13];

#[derive(Clone, Copy, Default)]
pub struct Wtcsr {
    pub cks: u8,
    pub tme: bool,
    pub watchdog_mode: bool, // WT/!IT: true = watchdog, false = interval timer
    pub ovf: bool,
}

impl Wtcsr {
    pub fn read(&self) -> u8 {
        self.cks | ((self.tme as u8) << 5) | ((self.watchdog_mode as u8) << 6) | ((self.ovf as u8) << 7) | 0x18
    }
    /// Only a bit previously read as 1 can be cleared by a write
    /// (spec.md §4.2 "Failures"); `write` models the non-poke, real
    /// software path. `OVF` can only be cleared, never set, by software.
    pub fn write(&mut self, value: u8) {
        self.ovf &= value & 0x80 != 0;
        self.watchdog_mode = value & 0x40 != 0;
        self.tme = value & 0x20 != 0;
        self.cks = value & 0x07;
    }
}

#[derive(Clone, Copy, Default)]
pub struct Rstcsr {
    pub wovf: bool,
    pub rste: bool,
    pub rsts: bool,
}

impl Rstcsr {
    pub fn read(&self) -> u8 {
        0x1F | ((self.rsts as u8) << 5) | ((self.rste as u8) << 6) | ((self.wovf as u8) << 7)
    }
    pub fn write(&mut self, value: u8) {
        self.wovf &= value & 0x80 != 0;
        self.rste = value & 0x40 != 0;
        self.rsts = value & 0x20 != 0;
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Event {
    None,
    IntervalInterrupt,
    SystemReset,
}

pub struct Wdt {
    pub wtcsr: Wtcsr,
    pub wtcnt: u8,
    pub rstcsr: Rstcsr,
    cycle_count: u64,
}

impl Wdt {
    pub fn new() -> Self {
        let mut w = Wdt { wtcsr: Wtcsr::default(), wtcnt: 0, rstcsr: Rstcsr::default(), cycle_count: 0 };
        w.reset(false);
        w
    }

    /// `watchdog_initiated`: a reset caused by this very watchdog must
    /// not reinitialize RSTCSR (spec.md §4.2 "Failures" / §6 "Exit/reset
    /// contract"), so the cause (WOVF) survives the reset it triggered.
    pub fn reset(&mut self, watchdog_initiated: bool) {
        self.wtcsr = Wtcsr { cks: 0, tme: false, watchdog_mode: false, ovf: false };
        self.wtcnt = 0;
        if !watchdog_initiated {
            self.rstcsr = Rstcsr::default();
        }
        self.cycle_count = 0;
    }

    fn shift(&self) -> u32 {
        DIVIDER_SHIFTS[self.wtcsr.cks as usize & 0x7]
    }

    pub fn advance(&mut self, cycles: u64) -> Event {
        if !self.wtcsr.tme {
            return Event::None;
        }
        let shift = self.shift();
        self.cycle_count += cycles;
        let steps = self.cycle_count >> shift;
        self.cycle_count -= steps << shift;
        if steps == 0 {
            return Event::None;
        }

        let next = self.wtcnt as u64 + steps;
        let mut event = Event::None;
        if next >= 0x100 {
            if self.wtcsr.watchdog_mode {
                self.rstcsr.wovf = true;
                // spec.md §8: reset-enable without watchdog-mode never
                // triggers a reset; watchdog_mode is already required here.
                if self.rstcsr.rste {
                    event = Event::SystemReset;
                }
            } else {
                self.wtcsr.ovf = true;
                event = Event::IntervalInterrupt;
            }
        }
        self.wtcnt = next as u8;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_mode_overflow_raises_iti_not_reset() {
        let mut wdt = Wdt::new();
        wdt.wtcsr.tme = true;
        wdt.wtcsr.watchdog_mode = false;
        let ev = wdt.advance(256 * 2);
        assert_eq!(ev, Event::IntervalInterrupt);
        assert!(wdt.wtcsr.ovf);
    }

    #[test]
    fn reset_enable_without_watchdog_mode_never_resets() {
        let mut wdt = Wdt::new();
        wdt.wtcsr.tme = true;
        wdt.wtcsr.watchdog_mode = false;
        wdt.rstcsr.rste = true;
        let ev = wdt.advance(256 * 2);
        assert_ne!(ev, Event::SystemReset);
    }

    #[test]
    fn watchdog_initiated_reset_preserves_rstcsr() {
        let mut wdt = Wdt::new();
        wdt.rstcsr.wovf = true;
        wdt.reset(true);
        assert!(wdt.rstcsr.wovf);
        wdt.reset(false);
        assert!(!wdt.rstcsr.wovf);
    }
}
