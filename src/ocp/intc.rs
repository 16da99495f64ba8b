//! Interrupt Controller (spec.md §3 "Interrupt Controller", §4.2 "INTC").
//!
//! Priority/vector register map ported from `examples/original_source/
//! libs/satemu-core/include/satemu/hw/sh2/sh2_intc.hpp`; the admission and
//! recompute algorithm follows the `RaiseInterrupt`/`LowerInterrupt`/
//! `RecalcInterrupts` shape in `examples/original_source/libs/ymir-core/
//! include/ymir/hw/sh2/sh2.hpp`, adjusted to match spec.md §4.2's stated
//! tie-break rule (lower source identifier wins a level tie).

/// Ordered so a numerically lower discriminant is the tie-break winner at
/// equal priority level (spec.md §4.2: "DMAC ... channel 0 is prioritized").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum InterruptSource {
    None,
    Nmi,
    UserBreak,
    Irl,
    DivuOvfi,
    Dmac0XferEnd,
    Dmac1XferEnd,
    WdtIti,
    BscRefCmi,
    FrtIci,
    FrtOci,
    FrtOvi,
    SciEri,
    SciRxi,
    SciTxi,
    SciTei,
}

pub const NMI_LEVEL: u8 = 16;
pub const NMI_VECTOR: u8 = 11;

#[derive(Clone, Copy, Default)]
pub struct Icr {
    pub nmi_edge_rising: bool,
    pub vector_external: bool,
}

impl Icr {
    pub fn read(&self, nmi_level_high: bool) -> u16 {
        ((nmi_level_high as u16) << 15) | ((self.nmi_edge_rising as u16) << 8) | (self.vector_external as u16)
    }
    pub fn write(&mut self, value: u16) {
        self.nmi_edge_rising = value & (1 << 8) != 0;
        self.vector_external = value & 1 != 0;
    }
}

/// Per-source priority (IPRA/IPRB, 4 bits each) and vector (VCRx, 7-8 bits).
#[derive(Clone, Copy, Default)]
struct Entry {
    level: u8,
    vector: u8,
}

#[derive(Clone, Copy, Default)]
pub struct Pending {
    pub level: u8,
    pub source: InterruptSource,
}

impl Default for InterruptSource {
    fn default() -> Self {
        InterruptSource::None
    }
}

pub struct Intc {
    levels: [Entry; 16],
    pub icr: Icr,
    pub irl_level: u8,
    pub pending: Pending,
}

impl Intc {
    pub fn new() -> Self {
        Intc { levels: [Entry::default(); 16], icr: Icr::default(), irl_level: 0, pending: Pending::default() }
    }

    pub fn reset(&mut self) {
        self.levels = [Entry::default(); 16];
        self.icr = Icr::default();
        self.irl_level = 0;
        self.pending = Pending::default();
    }

    pub fn set_priority(&mut self, source: InterruptSource, level: u8) {
        self.levels[source as usize] = Entry { level: level & 0xF, vector: self.levels[source as usize].vector };
    }
    /// Sets the external interrupt request line's priority (spec.md §4.2:
    /// `Irl` has no IPR field of its own, its level is driven by whatever
    /// asserts the line, here the scheduler's VBlank-in path).
    pub fn set_irl_level(&mut self, level: u8) {
        self.irl_level = level & 0xF;
    }
    pub fn set_vector(&mut self, source: InterruptSource, vector: u8) {
        self.levels[source as usize].vector = vector;
    }

    pub fn level_of(&self, source: InterruptSource) -> u8 {
        match source {
            InterruptSource::None => 0,
            InterruptSource::Nmi => NMI_LEVEL,
            InterruptSource::Irl => self.irl_level,
            _ => self.levels[source as usize].level,
        }
    }
    pub fn vector_of(&self, source: InterruptSource) -> u8 {
        match source {
            InterruptSource::Nmi => NMI_VECTOR,
            _ => self.levels[source as usize].vector,
        }
    }

    /// Admits `source` as the pending interrupt if it strictly outranks the
    /// current one, or ties it with a lower source identifier (spec.md
    /// §4.2). Otherwise the raise is dropped.
    pub fn raise(&mut self, source: InterruptSource) {
        let level = self.level_of(source);
        if level < self.pending.level {
            return;
        }
        if level == self.pending.level && source >= self.pending.source {
            return;
        }
        self.pending = Pending { level, source };
    }

    /// Lowering the currently pending source forces a full rescan (spec.md
    /// §4.2: "Lowering a source that equals the current pending source
    /// triggers a full recomputation by scanning all sources"). `is_raised`
    /// tells the controller which sources still have their condition set.
    pub fn lower(&mut self, source: InterruptSource, is_raised: impl Fn(InterruptSource) -> bool) {
        if source == self.pending.source {
            self.recalc(is_raised);
        }
    }

    fn recalc(&mut self, is_raised: impl Fn(InterruptSource) -> bool) {
        self.pending = Pending::default();
        const ALL: [InterruptSource; 16] = [
            InterruptSource::None,
            InterruptSource::Nmi,
            InterruptSource::UserBreak,
            InterruptSource::Irl,
            InterruptSource::DivuOvfi,
            InterruptSource::Dmac0XferEnd,
            InterruptSource::Dmac1XferEnd,
            InterruptSource::WdtIti,
            InterruptSource::BscRefCmi,
            InterruptSource::FrtIci,
            InterruptSource::FrtOci,
            InterruptSource::FrtOvi,
            InterruptSource::SciEri,
            InterruptSource::SciRxi,
            InterruptSource::SciTxi,
            InterruptSource::SciTei,
        ];
        for &source in ALL.iter() {
            if source != InterruptSource::None && is_raised(source) {
                self.raise(source);
            }
        }
    }

    /// Per-instruction admission test (spec.md §4.2/§4.3): "Before each
    /// instruction the CPU tests `pending.level > SR.ILevel`".
    pub fn should_service(&self, sr_ilevel: u8) -> bool {
        self.pending.level > sr_ilevel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_level_preempts_lower_pending() {
        let mut intc = Intc::new();
        intc.set_priority(InterruptSource::FrtOci, 4);
        intc.raise(InterruptSource::FrtOci);
        assert_eq!(intc.pending.level, 4);
        assert!(!intc.should_service(4));

        intc.raise(InterruptSource::Nmi);
        assert_eq!(intc.pending.source, InterruptSource::Nmi);
        assert_eq!(intc.pending.level, NMI_LEVEL);
        assert_eq!(intc.vector_of(InterruptSource::Nmi), NMI_VECTOR);
        assert!(intc.should_service(4));
    }

    #[test]
    fn equal_level_tie_break_prefers_lower_source_id() {
        let mut intc = Intc::new();
        intc.set_priority(InterruptSource::Dmac0XferEnd, 6);
        intc.set_priority(InterruptSource::Dmac1XferEnd, 6);
        intc.raise(InterruptSource::Dmac1XferEnd);
        intc.raise(InterruptSource::Dmac0XferEnd);
        assert_eq!(intc.pending.source, InterruptSource::Dmac0XferEnd);

        // A later, lower-priority-id raise at the same level does not evict it.
        intc.raise(InterruptSource::Dmac1XferEnd);
        assert_eq!(intc.pending.source, InterruptSource::Dmac0XferEnd);
    }

    #[test]
    fn lowering_pending_source_rescans_remaining() {
        let mut intc = Intc::new();
        intc.set_priority(InterruptSource::FrtOci, 4);
        intc.set_priority(InterruptSource::WdtIti, 2);
        intc.raise(InterruptSource::WdtIti);
        intc.raise(InterruptSource::FrtOci);
        assert_eq!(intc.pending.source, InterruptSource::FrtOci);

        intc.lower(InterruptSource::FrtOci, |s| s == InterruptSource::WdtIti);
        assert_eq!(intc.pending.source, InterruptSource::WdtIti);
        assert_eq!(intc.pending.level, 2);
    }
}
