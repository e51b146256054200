//! Board specific controller tuning.
use ls1043a::ddrc::regs::{Cdr1, Cdr2, CdrOdt, DataBusWidth};
use arbitrary_int::Number;

use super::{
    clock::ClockContext,
    options::MemctlOptions,
    spd::DimmParams,
    warning::{Warning, Warnings},
};

/// Board hook which refines the generic controller options.
pub trait BoardOptions {
    fn apply(
        &self,
        opts: &mut MemctlOptions,
        dimms: &[DimmParams],
        ctx: &ClockContext,
        ctrl: usize,
        warnings: &mut Warnings,
    );
}

/// Keeps the generic options.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBoardOptions;

impl BoardOptions for NoBoardOptions {
    fn apply(
        &self,
        _: &mut MemctlOptions,
        _: &[DimmParams],
        _: &ClockContext,
        _: usize,
        _: &mut Warnings,
    ) {
    }
}

/// Clock adjust and write levelling values measured on a board for one DIMM population and
/// data rate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSpecificParameters {
    pub n_ranks: u32,
    /// Highest data rate in MT/s this entry applies to.
    pub datarate_mhz_high: u32,
    /// Minimum rank density in GiB.
    pub rank_gb: u32,
    pub clk_adjust: u8,
    pub wrlvl_start: u8,
    pub wrlvl_ctl_2: u32,
    pub wrlvl_ctl_3: u32,
}

impl BoardSpecificParameters {
    pub const fn new(
        n_ranks: u32,
        datarate_mhz_high: u32,
        rank_gb: u32,
        clk_adjust: u8,
        wrlvl_start: u8,
        wrlvl_ctl_2: u32,
        wrlvl_ctl_3: u32,
    ) -> Self {
        Self {
            n_ranks,
            datarate_mhz_high,
            rank_gb,
            clk_adjust,
            wrlvl_start,
            wrlvl_ctl_2,
            wrlvl_ctl_3,
        }
    }

    fn matches(&self, dimm: &DimmParams) -> bool {
        self.n_ranks == dimm.n_ranks && (dimm.rank_density >> 30) >= self.rank_gb as u64
    }
}

/// Result of a board table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardLookup<'a> {
    /// Entry whose rate ceiling covers the data rate.
    Exact(&'a BoardSpecificParameters),
    /// No entry covers the data rate, this is the fastest matching one.
    Fallback(&'a BoardSpecificParameters),
    NotFound,
}

/// Find the entry for a DIMM at the given data rate.
///
/// Entries of the same population are expected in ascending data rate order. The first entry
/// whose ceiling is at least the data rate is used.
pub fn lookup_board_parameters<'a>(
    table: &'a [BoardSpecificParameters],
    dimm: &DimmParams,
    data_rate_mts: u32,
) -> BoardLookup<'a> {
    let mut fastest: Option<&BoardSpecificParameters> = None;
    for entry in table.iter().filter(|e| e.matches(dimm)) {
        if data_rate_mts <= entry.datarate_mhz_high {
            return BoardLookup::Exact(entry);
        }
        if fastest.is_none_or(|f| entry.datarate_mhz_high > f.datarate_mhz_high) {
            fastest = Some(entry);
        }
    }
    match fastest {
        Some(entry) => BoardLookup::Fallback(entry),
        None => BoardLookup::NotFound,
    }
}

/// Board options backed by a table of measured parameters.
#[derive(Debug, Clone, Copy)]
pub struct TableBoardOptions {
    pub params: &'static [BoardSpecificParameters],
    pub half_strength_driver: bool,
    /// Driver hardware compensation.
    pub cdr_dhc_en: bool,
    pub cdr_odt: CdrOdt,
    /// Bus width the board is wired for, if narrower than the DIMM.
    pub force_bus_width: Option<DataBusWidth>,
}

impl TableBoardOptions {
    fn apply_parameters(&self, opts: &mut MemctlOptions, entry: &BoardSpecificParameters) {
        opts.clk_adjust = entry.clk_adjust;
        opts.wrlvl_start = entry.wrlvl_start;
        opts.wrlvl_ctl_2 = entry.wrlvl_ctl_2;
        opts.wrlvl_ctl_3 = entry.wrlvl_ctl_3;
    }
}

impl BoardOptions for TableBoardOptions {
    fn apply(
        &self,
        opts: &mut MemctlOptions,
        dimms: &[DimmParams],
        ctx: &ClockContext,
        ctrl: usize,
        warnings: &mut Warnings,
    ) {
        let data_rate_mts = ctx.data_rate_mts();
        if let Some(dimm) = dimms.first().filter(|d| !d.is_empty()) {
            match lookup_board_parameters(self.params, dimm, data_rate_mts) {
                BoardLookup::Exact(entry) => self.apply_parameters(opts, entry),
                BoardLookup::Fallback(entry) => {
                    warnings.push(Warning::BoardTimingFallback {
                        ctrl,
                        data_rate_mts,
                    });
                    self.apply_parameters(opts, entry);
                }
                BoardLookup::NotFound => warnings.push(Warning::BoardTimingMissing { ctrl }),
            }
        }

        opts.half_strength_driver_enable = self.half_strength_driver;
        opts.wrlvl_override = true;
        opts.wrlvl_sample = 0xF;
        opts.zq_en = true;

        let odt = self.cdr_odt.raw_value().value();
        opts.ddr_cdr1 = Cdr1::new_with_raw_value(0)
            .with_dhc_en(self.cdr_dhc_en)
            .with_odt(arbitrary_int::u2::masked_new(odt >> 1))
            .raw_value();
        opts.ddr_cdr2 = Cdr2::new_with_raw_value(0)
            .with_odt(odt & 1 != 0)
            .raw_value();

        if let Some(width) = self.force_bus_width {
            opts.data_bus_width = width;
        }
    }
}

/// Parameters of the LS1043A RDB with unbuffered DIMMs.
pub static LS1043ARDB_UDIMM_PARAMS: [BoardSpecificParameters; 6] = [
    BoardSpecificParameters::new(1, 833, 0, 4, 6, 0x0606_0607, 0x0808_0807),
    BoardSpecificParameters::new(1, 1350, 0, 4, 7, 0x0708_080A, 0x0A0B_0C09),
    BoardSpecificParameters::new(1, 1666, 0, 4, 7, 0x0808_090B, 0x0C0D_0E0A),
    BoardSpecificParameters::new(2, 833, 0, 4, 6, 0x0606_0607, 0x0808_0807),
    BoardSpecificParameters::new(2, 1350, 0, 4, 7, 0x0708_080A, 0x0A0B_0C09),
    BoardSpecificParameters::new(2, 1666, 0, 4, 7, 0x0808_090B, 0x0C0D_0E0A),
];

/// LS1043A RDB: 32 bit data bus, half strength drivers.
pub const LS1043ARDB_BOARD_OPTIONS: TableBoardOptions = TableBoardOptions {
    params: &LS1043ARDB_UDIMM_PARAMS,
    half_strength_driver: true,
    cdr_dhc_en: true,
    cdr_odt: CdrOdt::Ohm60,
    force_bus_width: Some(DataBusWidth::_32Bit),
};
