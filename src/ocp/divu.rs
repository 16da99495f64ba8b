//! Division Unit (spec.md §3 "DIVU", §4.2 "Division Unit").
//!
//! Bit-exact port of the overflow/saturation/partial-fixup behavior in
//! `examples/original_source/libs/satemu-core/include/satemu/hw/sh2/
//! sh2_divu.hpp`. `calc32`/`calc64` only compute the result and stage it;
//! `DVDNT*`/`DVCR` only become visible once `advance` has serviced the
//! documented completion latency (39 cycles normal, 6 on overflow), the
//! same deferred-completion shape `Frt`/`Wdt` use for their own counters.

#[derive(Clone, Copy, Default)]
pub struct Dvcr {
    pub ovf: bool,
    pub ovfie: bool,
}

impl Dvcr {
    pub fn read(&self) -> u32 {
        (self.ovf as u32) | ((self.ovfie as u32) << 1)
    }
    pub fn write(&mut self, value: u32) {
        self.ovf = value & 1 != 0;
        self.ovfie = value & 2 != 0;
    }
}

struct Pending {
    cycles_remaining: u32,
    dvdnth: u32,
    dvdntl: u32,
    overflow: bool,
}

#[derive(Default)]
pub struct Divu {
    pub dvsr: u32,
    pub dvdnt: u32,
    pub dvcr: Dvcr,
    pub dvdnth: u32,
    pub dvdntl: u32,
    pub dvdntuh: u32,
    pub dvdntul: u32,
    pending: Option<Pending>,
}

pub struct DivResult {
    /// Cycles until DVDNT*/DVCR reflect the final result (39 or 6).
    pub latency_cycles: u32,
    pub overflow: bool,
}

/// Result of advancing a pending division by some number of cycles.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Event {
    None,
    /// The staged result just landed in DVDNT*/DVCR.
    Completed { overflow: bool },
}

impl Divu {
    pub fn reset(&mut self) {
        *self = Divu::default();
    }

    /// 32-bit ÷ 32-bit signed division, triggered by writing `DVDNT`
    /// (spec.md §4.2). `INT32_MIN / -1` is the documented boundary case
    /// (spec.md §8): it yields `INT32_MIN` with no overflow flagged. The
    /// result is staged, not committed; call `advance` to land it.
    pub fn calc32(&mut self) -> DivResult {
        let dividend = self.dvdntl as i32;
        let divisor = self.dvsr as i32;

        if divisor != 0 {
            let (dvdntl, dvdnth) = if dividend == i32::MIN && divisor == -1 {
                (i32::MIN as u32, 0)
            } else {
                let quot = dividend / divisor;
                let rem = dividend % divisor;
                (quot as u32, rem as u32)
            };
            self.schedule(dvdnth, dvdntl, false, 39)
        } else {
            let dvdnth = ((dividend as i64) >> 29) as u32;
            let dvdntl = if self.dvcr.ovfie {
                let partial = ((dividend as i64) << 3) | (((dividend as i64) >> 31) & 7);
                partial as u32
            } else if dividend < 0 {
                i32::MIN as u32
            } else {
                i32::MAX as u32
            };
            self.schedule(dvdnth, dvdntl, true, 6)
        }
    }

    /// 64-bit ÷ 32-bit signed division, triggered by writing `DVDNTL`
    /// while `DVDNTH` holds the dividend's upper half (spec.md §4.2). The
    /// no-overflow boundary is a sign-extended 32-bit `INT32_MIN` dividend
    /// (DVDNTH=0xFFFFFFFF, DVDNTL=0x80000000) divided by -1, not a true
    /// 64-bit `i64::MIN` dividend. The result is staged, not committed;
    /// call `advance` to land it.
    pub fn calc64(&mut self) -> DivResult {
        let dividend = ((self.dvdnth as i64) << 32) | (self.dvdntl as i64 & 0xFFFF_FFFF);
        let divisor = self.dvsr as i32;

        if dividend == -0x8000_0000i64 && divisor == -1 {
            return self.schedule(0, i32::MIN as u32, false, 39);
        }

        let mut overflow = divisor == 0;
        if !overflow {
            let quotient = dividend / (divisor as i64);
            let remainder = (dividend % (divisor as i64)) as i32;
            if quotient < i32::MIN as i64 || quotient > i32::MAX as i64 {
                overflow = true;
            } else {
                return self.schedule(remainder as u32, quotient as u32, false, 39);
            }
        }

        // Overflow: three fixup iterations of the restoring-division step.
        let orig_dividend = dividend;
        let mut dividend = dividend;
        let mut q = dividend < 0;
        let m = divisor < 0;
        for _ in 0..3 {
            if q == m {
                dividend = dividend.wrapping_sub((divisor as i64) << 32);
            } else {
                dividend = dividend.wrapping_add((divisor as i64) << 32);
            }
            q = dividend < 0;
            dividend = (dividend << 1) | (q == m) as i64;
        }

        let dvdntl = if self.dvcr.ovfie {
            dividend as u32
        } else {
            let sign_mismatch = (((orig_dividend >> 32) as i32) ^ divisor) < 0;
            if sign_mismatch { i32::MIN as u32 } else { i32::MAX as u32 }
        };
        self.schedule((dividend >> 32) as u32, dvdntl, true, 6)
    }

    fn schedule(&mut self, dvdnth: u32, dvdntl: u32, overflow: bool, latency_cycles: u32) -> DivResult {
        self.pending = Some(Pending { cycles_remaining: latency_cycles, dvdnth, dvdntl, overflow });
        DivResult { latency_cycles, overflow }
    }

    /// Services the pending completion by `cycles`. Returns
    /// `Event::Completed` the instant the latency elapses, the same turn
    /// DVDNT*/DVCR.OVF actually take on the staged result.
    pub fn advance(&mut self, cycles: u64) -> Event {
        let done = match self.pending.as_mut() {
            Some(p) => {
                let elapsed = cycles.min(p.cycles_remaining as u64) as u32;
                p.cycles_remaining -= elapsed;
                p.cycles_remaining == 0
            }
            None => return Event::None,
        };
        if !done {
            return Event::None;
        }
        let p = self.pending.take().unwrap();
        self.dvdnth = p.dvdnth;
        self.dvdntl = p.dvdntl;
        self.dvdnt = p.dvdntl;
        self.dvdntuh = p.dvdnth;
        self.dvdntul = p.dvdntl;
        self.dvcr.ovf = p.overflow;
        Event::Completed { overflow: p.overflow }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish(d: &mut Divu, r: &DivResult) {
        let ev = d.advance(r.latency_cycles as u64);
        assert_eq!(ev, Event::Completed { overflow: r.overflow });
    }

    #[test]
    fn div32_no_overflow_satisfies_remainder_invariant() {
        let mut d = Divu::default();
        d.dvsr = (-7i32) as u32;
        d.dvdntl = 100u32;
        let r = d.calc32();
        assert!(!r.overflow);
        finish(&mut d, &r);
        let quot = d.dvdntl as i32;
        let rem = d.dvdnth as i32;
        assert_eq!(quot.wrapping_mul(-7).wrapping_add(rem), 100);
        assert!(rem.unsigned_abs() < 7);
    }

    #[test]
    fn div32_int_min_by_minus_one_has_no_overflow() {
        let mut d = Divu::default();
        d.dvsr = (-1i32) as u32;
        d.dvdntl = i32::MIN as u32;
        let r = d.calc32();
        assert!(!r.overflow);
        finish(&mut d, &r);
        assert_eq!(d.dvdntl as i32, i32::MIN);
        assert!(!d.dvcr.ovf);
    }

    #[test]
    fn div32_by_zero_saturates_without_ovfie() {
        let mut d = Divu::default();
        d.dvsr = 0;
        d.dvdntl = 0x10;
        d.dvcr.ovfie = false;
        let r = d.calc32();
        assert!(r.overflow);
        finish(&mut d, &r);
        assert_eq!(d.dvdnt, 0x7FFF_FFFF);
        assert!(d.dvcr.ovf);
    }

    #[test]
    fn div32_result_does_not_land_before_latency_elapses() {
        let mut d = Divu::default();
        d.dvsr = (-7i32) as u32;
        d.dvdntl = 100u32;
        let r = d.calc32();
        assert_eq!(d.advance(r.latency_cycles as u64 - 1), Event::None);
        assert_eq!(d.dvdntl, 100u32, "DVDNTL must still read the pre-division dividend");
    }

    /// `original_source`'s `sh2_divu.hpp` special-cases a sign-extended
    /// 32-bit `INT32_MIN` dividend (DVDNTH=0xFFFFFFFF, DVDNTL=0x80000000),
    /// not a true 64-bit `i64::MIN` dividend.
    #[test]
    fn div64_sign_extended_int32_min_by_minus_one_has_no_overflow() {
        let mut d = Divu::default();
        d.dvsr = (-1i32) as u32;
        d.dvdnth = (-1i32) as u32;
        d.dvdntl = i32::MIN as u32;
        let r = d.calc64();
        assert!(!r.overflow);
        finish(&mut d, &r);
        assert_eq!(d.dvdntl as i32, i32::MIN);
        assert_eq!(d.dvdnth, 0);
        assert!(!d.dvcr.ovf);
    }

    #[test]
    fn div64_no_overflow_satisfies_remainder_invariant() {
        let mut d = Divu::default();
        d.dvsr = (-7i32) as u32;
        d.dvdnth = 0;
        d.dvdntl = 100u32;
        let r = d.calc64();
        assert!(!r.overflow);
        finish(&mut d, &r);
        let quot = d.dvdntl as i32;
        let rem = d.dvdnth as i32;
        assert_eq!(quot.wrapping_mul(-7).wrapping_add(rem), 100);
    }
}
