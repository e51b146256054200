//! Non-fatal conditions detected during DDR initialization.
//!
//! Boot firmware should come up with whatever memory can be configured safely, so most
//! inconsistencies degrade the configuration instead of aborting it. Every degradation is recorded
//! as a [Warning] so that a higher layer can decide to be stricter.
use super::{common::TimingError, options::BankInterleave, spd::SpdError};

/// Maximum number of warnings which are stored. Further warnings are still logged.
pub const MAX_WARNINGS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// The SPD EEPROM could not be read. The slot is treated as empty.
    SpdReadFailed { ctrl: usize, slot: usize },
    /// The SPD contents were rejected. The slot is treated as empty.
    SpdUnusable {
        ctrl: usize,
        slot: usize,
        error: SpdError,
    },
    /// The SPD CRC was invalid and the configured raw timing parameters were used instead.
    RawTimingFallback { ctrl: usize, slot: usize },
    /// A quad-rank DIMM was found in a slot which does not support it.
    QuadRankDimmIgnored { ctrl: usize, slot: usize },
    /// Registered and unbuffered DIMMs are installed on the same controller.
    MixedDimmTypes { ctrl: usize },
    /// The register control words of the registered DIMMs differ.
    RdimmControlWordMismatch { ctrl: usize },
    /// The memory clock is faster than the minimum clock period of at least one DIMM.
    ClockFasterThanDimm {
        ctrl: usize,
        mclk_ps: u32,
        tckmin_ps: u32,
    },
    /// CL * tCK exceeds the JEDEC maximum tAA of 20 ns.
    CasLatencyExceedsTaaMax { ctrl: usize, caslat: u32 },
    /// The memory clock is faster than the CAS write latency table, the slowest entry is used.
    CasWriteLatencyFallback { mclk_ps: u32 },
    /// Timing reconciliation failed and the controller is left unconfigured.
    ControllerSkipped { ctrl: usize, error: TimingError },
    /// The requested chip select interleaving is not possible with the installed ranks.
    BankInterleaveUnsupported {
        ctrl: usize,
        requested: BankInterleave,
    },
    /// Controller interleaving was requested but disabled on all controllers.
    ControllerInterleavingDisabled,
    /// No board parameter entry covers the data rate, the fastest matching entry is used.
    BoardTimingFallback { ctrl: usize, data_rate_mts: u32 },
    /// No board parameter entry matches the DIMM population.
    BoardTimingMissing { ctrl: usize },
    /// The synthesized registers contain an illegal combination.
    InvalidRegisterConfig { ctrl: usize, count: u32 },
    /// Automatic data initialization did not complete in time.
    DataInitTimeout { ctrl: usize },
    /// The memory size exceeds the mapped region and was clamped.
    MemoryClamped { total: u64, clamped: u64 },
}

/// Collected warnings of one initialization run.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    list: heapless::Vec<Warning, MAX_WARNINGS>,
    dropped: usize,
}

impl Warnings {
    pub const fn new() -> Self {
        Self {
            list: heapless::Vec::new(),
            dropped: 0,
        }
    }

    /// Record and log a warning.
    pub fn push(&mut self, warning: Warning) {
        log::warn!("DDR: {:?}", warning);
        if self.list.push(warning).is_err() {
            self.dropped += 1;
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Warning] {
        &self.list
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty() && self.dropped == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Number of warnings which did not fit into the list.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Warning> {
        self.list.iter()
    }

    pub fn any(&self, f: impl FnMut(&Warning) -> bool) -> bool {
        self.list.iter().any(f)
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = core::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
