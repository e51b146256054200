//! DDR clock context and time base conversions.
//!
//! All timing calculations are performed relative to the live DDR data rate, which is passed
//! around explicitly as a [ClockContext].
use crate::time::Hertz;

/// 5^12. Picoseconds are converted to clocks by dividing by 5^12 * 2^13 = 2 * 10^12, which splits
/// the 64 bit division into a division by a 32 bit value and a shift.
const POW5_12: u64 = 244_140_625;
const POW2_13_MASK: u64 = (1 << 13) - 1;

/// Clock periods at or below this value are faster than every entry of the CWL table.
pub const CWL_FASTEST_PERIOD_PS: u32 = 750;

/// CAS write latency table. Each entry is the minimum clock period in picoseconds and the
/// resulting CWL in clocks.
const CWL_TABLE: [(u32, u32); 8] = [
    (2500, 5),
    (1875, 6),
    (1500, 7),
    (1250, 8),
    (1070, 9),
    (935, 10),
    (833, 11),
    (CWL_FASTEST_PERIOD_PS, 12),
];

/// CWL used for clock periods faster than the table.
const CWL_FALLBACK: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockContext {
    data_rate: Hertz,
}

impl ClockContext {
    /// Create a context for the given DDR data rate, which is twice the memory clock frequency.
    pub const fn new(data_rate: Hertz) -> Self {
        Self { data_rate }
    }

    #[inline]
    pub const fn data_rate(&self) -> Hertz {
        self.data_rate
    }

    /// Data rate in MT/s.
    #[inline]
    pub const fn data_rate_mts(&self) -> u32 {
        self.data_rate.raw() / 1_000_000
    }

    /// Memory clock period in picoseconds, rounded to nearest.
    pub const fn mclk_period_ps(&self) -> u32 {
        let rate = self.data_rate.raw() as u64;
        if rate == 0 {
            return 0;
        }
        ((2_000_000_000_000 + rate / 2) / rate) as u32
    }

    /// Convert picoseconds to memory clocks, rounding up.
    ///
    /// A value of 0 is converted to 0 clocks. The result saturates at [u32::MAX].
    pub const fn picos_to_mclk(&self, picos: u32) -> u32 {
        if picos == 0 {
            return 0;
        }
        let rate = self.data_rate.raw() as u64;
        let mut clks = picos as u64 * rate;
        let mut rem = clks % POW5_12;
        clks /= POW5_12;
        rem += (clks & POW2_13_MASK) * POW5_12;
        clks >>= 13;
        // Round up if the remainder is larger than the 1 ps error.
        if rem > rate {
            clks += 1;
        }
        if clks > u32::MAX as u64 {
            return u32::MAX;
        }
        clks as u32
    }

    /// Convert memory clocks to picoseconds.
    #[inline]
    pub const fn mclk_to_picos(&self, mclk: u32) -> u32 {
        mclk.saturating_mul(self.mclk_period_ps())
    }

    /// CAS write latency in clocks for the current clock period.
    ///
    /// Periods faster than [CWL_FASTEST_PERIOD_PS] are not covered by JEDEC DDR3 and use the
    /// slowest table entry of 12 clocks.
    pub const fn cas_write_latency(&self) -> u32 {
        let mclk_ps = self.mclk_period_ps();
        let mut i = 0;
        while i < CWL_TABLE.len() {
            if mclk_ps >= CWL_TABLE[i].0 {
                return CWL_TABLE[i].1;
            }
            i += 1;
        }
        CWL_FALLBACK
    }

    /// Whether [Self::cas_write_latency] had to use the fallback value.
    #[inline]
    pub const fn cas_write_latency_is_fallback(&self) -> bool {
        self.mclk_period_ps() < CWL_FASTEST_PERIOD_PS
    }
}

/// Integer base 2 logarithm. Returns 0 for an input of 0.
#[inline]
pub const fn ilog2(value: u32) -> u32 {
    if value == 0 { 0 } else { value.ilog2() }
}
