//! On-chip peripherals (spec.md §4.2). One `Ocp` instance exists per SH-2
//! core; the shared bus and scheduler drive it through these submodules.

pub mod bsc;
pub mod cache;
pub mod divu;
pub mod dmac;
pub mod frt;
pub mod intc;
pub mod wdt;

pub struct Ocp {
    pub cache: cache::Cache,
    pub divu: divu::Divu,
    pub frt: frt::Frt,
    pub wdt: wdt::Wdt,
    pub dmac: dmac::Dmac,
    pub intc: intc::Intc,
    pub bsc: bsc::Bsc,
    dma_round_robin_turn: usize,
}

impl Ocp {
    pub fn new() -> Self {
        Ocp {
            cache: cache::Cache::new(),
            divu: divu::Divu::default(),
            frt: frt::Frt::new(),
            wdt: wdt::Wdt::new(),
            dmac: dmac::Dmac::new(),
            intc: intc::Intc::new(),
            bsc: bsc::Bsc::new(),
            dma_round_robin_turn: 0,
        }
    }

    pub fn reset(&mut self, watchdog_initiated: bool) {
        self.cache.reset();
        self.divu.reset();
        self.frt.reset();
        self.wdt.reset(watchdog_initiated);
        self.dmac.reset();
        self.intc.reset();
        self.bsc.reset();
        self.dma_round_robin_turn = 0;
    }

    /// Advances the cycle-driven peripherals (FRT, WDT, DIVU) and folds any
    /// resulting status transition into the interrupt controller
    /// (spec.md §4.2: each transition "can raise" its associated source).
    pub fn advance_timers(&mut self, cycles: u64) {
        match self.frt.advance(cycles) {
            frt::Event::Overflow => self.intc.raise(intc::InterruptSource::FrtOvi),
            frt::Event::OutputCompare => self.intc.raise(intc::InterruptSource::FrtOci),
            frt::Event::None => {}
        }
        match self.wdt.advance(cycles) {
            wdt::Event::IntervalInterrupt => self.intc.raise(intc::InterruptSource::WdtIti),
            wdt::Event::SystemReset => {
                self.reset(true);
                self.wdt.rstcsr.wovf = true;
            }
            wdt::Event::None => {}
        }
        if let divu::Event::Completed { overflow } = self.divu.advance(cycles) {
            if overflow && self.divu.dvcr.ovfie {
                self.intc.raise(intc::InterruptSource::DivuOvfi);
            }
        }
    }

    pub fn next_dma_channel(&mut self) -> dmac::Selected {
        let selected = self.dmac.select_channel(self.dma_round_robin_turn);
        if let dmac::Selected::Channel(idx) = selected {
            self.dma_round_robin_turn = idx + 1;
        }
        selected
    }
}
