//! Memory controller options.
//!
//! The options are derived from the common timing parameters and the DIMM population, then
//! refined by the interleaving configuration source and the board specific tuning.
use ls1043a::ddrc::regs::{DataBusWidth, OdtConfig};

use super::{
    board::BoardOptions,
    clock::ClockContext,
    common::CommonTimingParams,
    config::{CHIP_SELECTS_PER_CTRL, DdrPlatformConfig},
    spd::DimmParams,
    warning::{Warning, Warnings},
};

/// Nominal termination, DDR3 MR1 RTT_Nom encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Rtt {
    Off = 0,
    Ohm60 = 1,
    Ohm120 = 2,
    Ohm40 = 3,
    Ohm20 = 4,
    Ohm30 = 5,
}

/// Dynamic write termination, DDR3 MR2 RTT_WR encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RttWr {
    Off = 0,
    Ohm60 = 1,
    Ohm120 = 2,
}

/// ODT configuration of one chip select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsOdt {
    pub odt_rd_cfg: OdtConfig,
    pub odt_wr_cfg: OdtConfig,
    pub rtt_nom: Rtt,
    pub rtt_wr: RttWr,
}

impl CsOdt {
    pub const OFF: Self = Self::new(OdtConfig::Never, OdtConfig::Never, Rtt::Off, RttWr::Off);

    pub const fn new(
        odt_rd_cfg: OdtConfig,
        odt_wr_cfg: OdtConfig,
        rtt_nom: Rtt,
        rtt_wr: RttWr,
    ) -> Self {
        Self {
            odt_rd_cfg,
            odt_wr_cfg,
            rtt_nom,
            rtt_wr,
        }
    }

    /// ODT is driven for reads or writes.
    #[inline]
    pub fn odt_used(&self) -> bool {
        self.odt_rd_cfg != OdtConfig::Never || self.odt_wr_cfg != OdtConfig::Never
    }
}

impl Default for CsOdt {
    fn default() -> Self {
        Self::OFF
    }
}

use OdtConfig::{AllCs, CsAndOtherDimm, Never, OnlyToCsBeingAccessed, OtherDimm, SameDimm};

const fn odt(rd: OdtConfig, wr: OdtConfig, rtt_nom: Rtt, rtt_wr: RttWr) -> CsOdt {
    CsOdt::new(rd, wr, rtt_nom, rtt_wr)
}

const OFF: CsOdt = CsOdt::OFF;

static SINGLE_Q: [CsOdt; 4] = [
    odt(Never, CsAndOtherDimm, Rtt::Ohm20, RttWr::Ohm120),
    odt(Never, Never, Rtt::Off, RttWr::Ohm120),
    odt(Never, CsAndOtherDimm, Rtt::Ohm20, RttWr::Ohm120),
    odt(Never, Never, Rtt::Off, RttWr::Ohm120),
];
static SINGLE_D: [CsOdt; 4] = [odt(Never, AllCs, Rtt::Ohm40, RttWr::Off), OFF, OFF, OFF];
static SINGLE_S: [CsOdt; 4] = [odt(Never, AllCs, Rtt::Ohm40, RttWr::Off), OFF, OFF, OFF];
static DUAL_DD: [CsOdt; 4] = [
    odt(Never, SameDimm, Rtt::Ohm120, RttWr::Off),
    odt(OtherDimm, OtherDimm, Rtt::Ohm30, RttWr::Off),
    odt(Never, SameDimm, Rtt::Ohm120, RttWr::Off),
    odt(OtherDimm, OtherDimm, Rtt::Ohm30, RttWr::Off),
];
static DUAL_DS: [CsOdt; 4] = [
    odt(Never, SameDimm, Rtt::Ohm120, RttWr::Off),
    odt(OtherDimm, OtherDimm, Rtt::Ohm30, RttWr::Off),
    odt(OtherDimm, AllCs, Rtt::Ohm20, RttWr::Ohm120),
    OFF,
];
static DUAL_SD: [CsOdt; 4] = [
    odt(OtherDimm, AllCs, Rtt::Ohm20, RttWr::Ohm120),
    OFF,
    odt(Never, SameDimm, Rtt::Ohm120, RttWr::Off),
    odt(OtherDimm, OtherDimm, Rtt::Ohm20, RttWr::Off),
];
static DUAL_SS: [CsOdt; 4] = [
    odt(OtherDimm, AllCs, Rtt::Ohm30, RttWr::Ohm120),
    OFF,
    odt(OtherDimm, AllCs, Rtt::Ohm30, RttWr::Ohm120),
    OFF,
];
static DUAL_D0: [CsOdt; 4] = [odt(Never, SameDimm, Rtt::Ohm40, RttWr::Off), OFF, OFF, OFF];
static DUAL_0D: [CsOdt; 4] = [OFF, OFF, odt(Never, SameDimm, Rtt::Ohm40, RttWr::Off), OFF];
static DUAL_S0: [CsOdt; 4] = [
    odt(Never, OnlyToCsBeingAccessed, Rtt::Ohm40, RttWr::Off),
    OFF,
    OFF,
    OFF,
];
static DUAL_0S: [CsOdt; 4] = [
    OFF,
    OFF,
    odt(Never, OnlyToCsBeingAccessed, Rtt::Ohm40, RttWr::Off),
    OFF,
];
static ODT_UNKNOWN: [CsOdt; 4] = [odt(Never, OnlyToCsBeingAccessed, Rtt::Ohm120, RttWr::Off); 4];

/// DIMM population patterns with a recommended ODT setting.
///
/// Single slot patterns are named by the rank count of the DIMM (Single, Dual, Quad). Dual slot
/// patterns are named by the rank count of slot 0 and slot 1, `0` denoting an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdtPopulation {
    SingleS,
    SingleD,
    SingleQ,
    DualDD,
    DualDS,
    DualSD,
    DualSS,
    DualD0,
    Dual0D,
    DualS0,
    Dual0S,
    Unknown,
}

impl OdtPopulation {
    /// Classify the rank counts of the slots of one controller.
    pub fn select(slots: usize, ranks: [u32; 2], first_slot_quad_capable: bool) -> Self {
        if slots == 1 {
            return match ranks[0] {
                1 => Self::SingleS,
                2 => Self::SingleD,
                4 => Self::SingleQ,
                _ => Self::Unknown,
            };
        }
        if ranks[0] == 4 && first_slot_quad_capable {
            return Self::SingleQ;
        }
        match (ranks[0], ranks[1]) {
            (2, 2) => Self::DualDD,
            (2, 1) => Self::DualDS,
            (2, 0) => Self::DualD0,
            (1, 2) => Self::DualSD,
            (1, 1) => Self::DualSS,
            (1, 0) => Self::DualS0,
            (0, 2) => Self::Dual0D,
            (0, 1) => Self::Dual0S,
            _ => Self::Unknown,
        }
    }

    pub fn table(self) -> &'static [CsOdt; CHIP_SELECTS_PER_CTRL] {
        match self {
            Self::SingleS => &SINGLE_S,
            Self::SingleD => &SINGLE_D,
            Self::SingleQ => &SINGLE_Q,
            Self::DualDD => &DUAL_DD,
            Self::DualDS => &DUAL_DS,
            Self::DualSD => &DUAL_SD,
            Self::DualSS => &DUAL_SS,
            Self::DualD0 => &DUAL_D0,
            Self::Dual0D => &DUAL_0D,
            Self::DualS0 => &DUAL_S0,
            Self::Dual0S => &DUAL_0S,
            Self::Unknown => &ODT_UNKNOWN,
        }
    }
}

/// Controller (memory) interleaving mode.
///
/// The discriminants are the mode encodings of the chip select configuration and the 3-way
/// interleaving control register.
#[derive(
    Debug, Eq, PartialEq, Clone, Copy, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum ControllerInterleave {
    CacheLine = 0x00,
    Page = 0x01,
    Bank = 0x02,
    Superbank = 0x03,
    ThreeWay1k = 0x0A,
    ThreeWay4k = 0x0C,
    ThreeWay8k = 0x0D,
    FourWay1k = 0x1A,
    FourWay4k = 0x1C,
    FourWay8k = 0x1D,
}

impl ControllerInterleave {
    /// Number of controllers sharing the address range.
    pub const fn ways(self) -> usize {
        match self {
            Self::CacheLine | Self::Page | Self::Bank | Self::Superbank => 2,
            Self::ThreeWay1k | Self::ThreeWay4k | Self::ThreeWay8k => 3,
            Self::FourWay1k | Self::FourWay4k | Self::FourWay8k => 4,
        }
    }
}

/// Chip select (bank) interleaving mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankInterleave {
    #[default]
    None,
    Cs0Cs1,
    Cs2Cs3,
    Cs0Cs1AndCs2Cs3,
    Cs0Cs1Cs2Cs3,
    /// Pick the widest mode the DIMM population allows. Only valid as a request.
    Auto,
}

impl BankInterleave {
    /// Encoding of the `BA_INTLV_CTL` field of the SDRAM configuration.
    pub const fn ba_intlv_ctl(self) -> u8 {
        match self {
            Self::None | Self::Auto => 0x00,
            Self::Cs0Cs1 => 0x40,
            Self::Cs2Cs3 => 0x20,
            Self::Cs0Cs1AndCs2Cs3 => 0x60,
            Self::Cs0Cs1Cs2Cs3 => 0x04,
        }
    }
}

/// Burst length policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstLength {
    /// Fixed burst chop 4.
    Bc4,
    /// Fixed burst length 8.
    Bl8,
    /// Burst chop 4 or burst length 8 selected on the fly.
    OnTheFly,
}

/// Source of the interleaving and ECC configuration of the controllers.
///
/// Boards without a configuration mechanism use [NotConfigured].
pub trait InterleaveSource {
    fn controller_interleaving(&self, _ctrl: usize) -> Option<ControllerInterleave> {
        None
    }

    fn bank_interleaving(&self, _ctrl: usize) -> Option<BankInterleave> {
        None
    }

    fn ecc_mode(&self, _ctrl: usize) -> Option<bool> {
        None
    }
}

/// No interleaving and ECC disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotConfigured;

impl InterleaveSource for NotConfigured {}

/// Fixed configuration applied to every controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticInterleaveConfig {
    pub controller: Option<ControllerInterleave>,
    pub bank: Option<BankInterleave>,
    pub ecc: bool,
}

impl InterleaveSource for StaticInterleaveConfig {
    fn controller_interleaving(&self, _ctrl: usize) -> Option<ControllerInterleave> {
        self.controller
    }

    fn bank_interleaving(&self, _ctrl: usize) -> Option<BankInterleave> {
        self.bank
    }

    fn ecc_mode(&self, _ctrl: usize) -> Option<bool> {
        Some(self.ecc)
    }
}

/// Configuration knobs of one memory controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemctlOptions {
    pub cs_local_opts: [CsOdt; CHIP_SELECTS_PER_CTRL],

    /// Controller interleaving mode, [None] if the controller is not interleaved.
    pub memctl_interleaving: Option<ControllerInterleave>,
    pub ba_intlv: BankInterleave,
    pub addr_hash: bool,

    pub ecc_mode: bool,
    pub ecc_init_using_memctl: bool,
    pub dqs_config: u8,
    pub self_refresh_in_sleep: bool,
    pub dynamic_power: bool,
    pub data_bus_width: DataBusWidth,
    pub burst_length: BurstLength,
    pub otf_burst_chop_en: bool,
    pub mirrored_dimm: bool,
    pub quad_rank_present: bool,
    pub registered_dimm_en: bool,
    /// Address parity for registered DIMMs.
    pub ap_en: bool,
    pub x4_en: bool,

    /// CAS latency in clocks.
    pub cas_latency_override: Option<u32>,
    /// Additive latency in clocks.
    pub additive_latency_override: Option<u32>,
    pub cpo_override: u32,
    pub write_data_delay: u32,
    pub twot_en: bool,
    pub threet_en: bool,
    /// Precharge interval in clocks.
    pub bstopre: u32,
    pub tfaw_window_four_activates_ps: u32,
    pub tcke_clock_pulse_width_ps: u32,

    pub rtt_override: Option<Rtt>,
    pub rtt_wr_override: Option<RttWr>,
    pub half_strength_driver_enable: bool,
    pub clk_adjust: u8,

    pub auto_self_refresh_en: bool,
    pub sr_it: u8,

    pub zq_en: bool,
    pub wrlvl_en: bool,
    pub wrlvl_override: bool,
    pub wrlvl_sample: u8,
    pub wrlvl_start: u8,
    pub wrlvl_ctl_2: u32,
    pub wrlvl_ctl_3: u32,

    pub rcw_override: bool,
    pub rcw_1: u32,
    pub rcw_2: u32,

    /// Chip select write latency override, written to debug register 18.
    pub cswl_override: u32,
    pub ddr_cdr1: u32,
    pub ddr_cdr2: u32,
}

impl Default for MemctlOptions {
    fn default() -> Self {
        Self {
            cs_local_opts: [CsOdt::OFF; CHIP_SELECTS_PER_CTRL],
            memctl_interleaving: None,
            ba_intlv: BankInterleave::None,
            addr_hash: false,
            ecc_mode: false,
            ecc_init_using_memctl: false,
            dqs_config: 0,
            self_refresh_in_sleep: false,
            dynamic_power: false,
            data_bus_width: DataBusWidth::_64Bit,
            burst_length: BurstLength::Bl8,
            otf_burst_chop_en: false,
            mirrored_dimm: false,
            quad_rank_present: false,
            registered_dimm_en: false,
            ap_en: false,
            x4_en: false,
            cas_latency_override: None,
            additive_latency_override: None,
            cpo_override: 0,
            write_data_delay: 0,
            twot_en: false,
            threet_en: false,
            bstopre: 0,
            tfaw_window_four_activates_ps: 0,
            tcke_clock_pulse_width_ps: 0,
            rtt_override: None,
            rtt_wr_override: None,
            half_strength_driver_enable: false,
            clk_adjust: 0,
            auto_self_refresh_en: false,
            sr_it: 0,
            zq_en: false,
            wrlvl_en: false,
            wrlvl_override: false,
            wrlvl_sample: 0,
            wrlvl_start: 0,
            wrlvl_ctl_2: 0,
            wrlvl_ctl_3: 0,
            rcw_override: false,
            rcw_1: 0,
            rcw_2: 0,
            cswl_override: 0,
            ddr_cdr1: 0,
            ddr_cdr2: 0,
        }
    }
}

impl MemctlOptions {
    /// Select the burst policy matching the data bus width. On-the-fly burst chop is only
    /// supported on a 64 bit bus.
    pub fn derive_burst_length(&mut self) {
        if self.data_bus_width == DataBusWidth::_64Bit {
            self.burst_length = BurstLength::OnTheFly;
            self.otf_burst_chop_en = true;
        } else {
            self.burst_length = BurstLength::Bl8;
            self.otf_burst_chop_en = false;
        }
    }
}

/// Data bus width for a DIMM data width, 64 bit for unknown widths.
pub fn data_bus_width_for(data_width: u32) -> DataBusWidth {
    match data_width {
        64..=72 => DataBusWidth::_64Bit,
        32..=40 => DataBusWidth::_32Bit,
        16..=24 => DataBusWidth::_16Bit,
        _ => {
            log::warn!("DDR: unknown data width {}, using 64 bit", data_width);
            DataBusWidth::_64Bit
        }
    }
}

/// Widest chip select interleaving mode the DIMM population supports.
pub fn auto_bank_interleave(
    slots: usize,
    ranks: [u32; 2],
    first_slot_quad_capable: bool,
) -> BankInterleave {
    if slots == 1 {
        return match ranks[0] {
            4 => BankInterleave::Cs0Cs1Cs2Cs3,
            2 => BankInterleave::Cs0Cs1,
            _ => BankInterleave::None,
        };
    }
    match (ranks[0], ranks[1]) {
        (4, _) if first_slot_quad_capable => BankInterleave::Cs0Cs1Cs2Cs3,
        (2, 2) => BankInterleave::Cs0Cs1Cs2Cs3,
        (2, _) => BankInterleave::Cs0Cs1,
        _ => BankInterleave::None,
    }
}

/// Whether the chip select interleaving mode is possible with the installed ranks.
pub fn bank_interleave_supported(
    mode: BankInterleave,
    slots: usize,
    ranks: [u32; 2],
    first_slot_quad_capable: bool,
) -> bool {
    let single = slots == 1;
    match mode {
        BankInterleave::None | BankInterleave::Auto => true,
        BankInterleave::Cs0Cs1Cs2Cs3 => {
            if single {
                ranks[0] >= 4
            } else if first_slot_quad_capable && ranks[0] == 4 {
                true
            } else {
                ranks[0] >= 2 && ranks[0] == ranks[1]
            }
        }
        BankInterleave::Cs0Cs1 => ranks[0] >= 2,
        BankInterleave::Cs2Cs3 => {
            if single {
                ranks[0] >= 4
            } else {
                ranks[1] >= 2
            }
        }
        BankInterleave::Cs0Cs1AndCs2Cs3 => {
            if single {
                ranks[0] >= 4
            } else {
                ranks[0] >= 2 && ranks[1] >= 2
            }
        }
    }
}

/// Minimum CKE pulse width of the DDR3 speed bin: 7.5 ns at DDR3-800, 5.625 ns at DDR3-1066 and
/// DDR3-1333, 5 ns above. The 3 clock minimum is applied by the register computation.
pub const fn tcke_min_ps(ctx: &ClockContext) -> u32 {
    match ctx.data_rate_mts() {
        0..=800 => 7500,
        801..=1333 => 5625,
        _ => 5000,
    }
}

/// RCW2 for registered DIMMs, selects the operating speed of the register.
const fn rdimm_rcw_2(data_rate_mts: u32) -> u32 {
    match data_rate_mts {
        0..=800 => 0x0000_0000,
        801..=1066 => 0x0010_0000,
        1067..=1333 => 0x0020_0000,
        _ => 0x0030_0000,
    }
}

pub const RDIMM_RCW_1: u32 = 0x000a_5a00;

/// Populate the controller options from the DIMM population and the reconciled timing.
#[allow(clippy::too_many_arguments)]
pub fn populate_memctl_options<I: InterleaveSource, B: BoardOptions>(
    ctx: &ClockContext,
    common: &CommonTimingParams,
    dimms: &[DimmParams],
    ctrl: usize,
    platform: &DdrPlatformConfig,
    interleave_src: &I,
    board: &B,
    warnings: &mut Warnings,
) -> MemctlOptions {
    let slots = platform.slots();
    let mut ranks = [0; 2];
    for (slot, dimm) in dimms.iter().take(slots).enumerate() {
        ranks[slot] = dimm.n_ranks;
    }
    let slot0 = dimms.first();

    let odt_population = OdtPopulation::select(slots, ranks, platform.first_slot_quad_capable);
    log::debug!("DDR{}: ODT population {:?}", ctrl, odt_population);

    let mut opts = MemctlOptions {
        cs_local_opts: *odt_population.table(),
        registered_dimm_en: common.all_dimms_registered,
        ecc_mode: interleave_src.ecc_mode(ctrl).unwrap_or(false),
        dqs_config: 1,
        self_refresh_in_sleep: true,
        dynamic_power: false,
        mirrored_dimm: slot0.is_some_and(|d| d.mirrored_dimm),
        x4_en: slot0.is_some_and(|d| d.device_width == 4),
        quad_rank_present: dimms.iter().any(|d| d.is_quad_rank()),
        ap_en: common.all_dimms_registered,
        bstopre: ctx.picos_to_mclk(common.refresh_rate_ps) >> 2,
        tfaw_window_four_activates_ps: common.tfaw_ps,
        tcke_clock_pulse_width_ps: tcke_min_ps(ctx),
        write_data_delay: 2,
        zq_en: true,
        wrlvl_en: true,
        ..Default::default()
    };
    opts.ecc_init_using_memctl = opts.ecc_mode;
    opts.data_bus_width = dimms
        .iter()
        .find(|d| !d.is_empty())
        .map(|d| data_bus_width_for(d.data_width))
        .unwrap_or(DataBusWidth::_64Bit);
    opts.derive_burst_length();

    if platform.controllers() > 1 {
        opts.memctl_interleaving = interleave_src.controller_interleaving(ctrl);
    }

    let requested = interleave_src
        .bank_interleaving(ctrl)
        .unwrap_or(BankInterleave::None);
    let mode = if requested == BankInterleave::Auto {
        auto_bank_interleave(slots, ranks, platform.first_slot_quad_capable)
    } else {
        requested
    };
    let quad_capable = platform.first_slot_quad_capable;
    opts.ba_intlv = if bank_interleave_supported(mode, slots, ranks, quad_capable) {
        mode
    } else {
        warnings.push(Warning::BankInterleaveUnsupported {
            ctrl,
            requested: mode,
        });
        BankInterleave::None
    };

    if common.all_dimms_registered {
        opts.rcw_override = true;
        opts.rcw_1 = RDIMM_RCW_1;
        opts.rcw_2 = rdimm_rcw_2(ctx.data_rate_mts());
    }

    board.apply(&mut opts, dimms, ctx, ctrl, warnings);
    // The board may have narrowed the bus.
    opts.derive_burst_length();

    log::debug!("DDR{}: options {:?}", ctrl, opts);
    opts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ddr::{board::NoBoardOptions, testutil},
        time::Hertz,
    };

    fn ddr3_1600() -> ClockContext {
        ClockContext::new(Hertz::from_raw(1_600_000_000))
    }

    fn populate_with<I: InterleaveSource>(
        dimms: &[DimmParams],
        platform: &DdrPlatformConfig,
        src: &I,
        warnings: &mut Warnings,
    ) -> MemctlOptions {
        let ctx = ddr3_1600();
        let common = crate::ddr::common::compute_lowest_common_dimm_parameters(
            &ctx, dimms, platform, 0, warnings,
        )
        .unwrap();
        populate_memctl_options(&ctx, &common, dimms, 0, platform, src, &NoBoardOptions, warnings)
    }

    #[test]
    fn odt_population_selection() {
        assert_eq!(OdtPopulation::select(1, [1, 0], false), OdtPopulation::SingleS);
        assert_eq!(OdtPopulation::select(1, [2, 0], false), OdtPopulation::SingleD);
        assert_eq!(OdtPopulation::select(1, [4, 0], false), OdtPopulation::SingleQ);
        assert_eq!(OdtPopulation::select(1, [3, 0], false), OdtPopulation::Unknown);
        assert_eq!(OdtPopulation::select(2, [4, 0], true), OdtPopulation::SingleQ);
        assert_eq!(OdtPopulation::select(2, [4, 0], false), OdtPopulation::Unknown);
        assert_eq!(OdtPopulation::select(2, [2, 2], false), OdtPopulation::DualDD);
        assert_eq!(OdtPopulation::select(2, [2, 1], false), OdtPopulation::DualDS);
        assert_eq!(OdtPopulation::select(2, [1, 2], false), OdtPopulation::DualSD);
        assert_eq!(OdtPopulation::select(2, [1, 1], false), OdtPopulation::DualSS);
        assert_eq!(OdtPopulation::select(2, [0, 2], false), OdtPopulation::Dual0D);
        assert_eq!(OdtPopulation::select(2, [1, 0], false), OdtPopulation::DualS0);
        assert_eq!(OdtPopulation::select(2, [0, 1], false), OdtPopulation::Dual0S);
    }

    #[test]
    fn odt_tables() {
        let dd = OdtPopulation::DualDD.table();
        assert_eq!(dd[0], odt(Never, SameDimm, Rtt::Ohm120, RttWr::Off));
        assert_eq!(dd[1], odt(OtherDimm, OtherDimm, Rtt::Ohm30, RttWr::Off));
        assert_eq!(dd[0], dd[2]);
        let s = OdtPopulation::SingleS.table();
        assert!(s[0].odt_used());
        assert!(s[1..].iter().all(|cs| !cs.odt_used()));
        assert!(OdtPopulation::Unknown.table().iter().all(|cs| cs.rtt_nom == Rtt::Ohm120));
    }

    #[test]
    fn bank_interleave_modes() {
        assert_eq!(BankInterleave::Cs0Cs1.ba_intlv_ctl(), 0x40);
        assert_eq!(BankInterleave::Cs0Cs1Cs2Cs3.ba_intlv_ctl(), 0x04);
        assert_eq!(auto_bank_interleave(1, [2, 0], false), BankInterleave::Cs0Cs1);
        assert_eq!(auto_bank_interleave(1, [4, 0], false), BankInterleave::Cs0Cs1Cs2Cs3);
        assert_eq!(auto_bank_interleave(1, [1, 0], false), BankInterleave::None);
        assert_eq!(auto_bank_interleave(2, [2, 2], false), BankInterleave::Cs0Cs1Cs2Cs3);
        assert_eq!(auto_bank_interleave(2, [2, 1], false), BankInterleave::Cs0Cs1);
        assert_eq!(auto_bank_interleave(2, [4, 0], true), BankInterleave::Cs0Cs1Cs2Cs3);
        assert_eq!(auto_bank_interleave(2, [1, 1], false), BankInterleave::None);

        assert!(bank_interleave_supported(BankInterleave::Cs0Cs1, 1, [2, 0], false));
        assert!(!bank_interleave_supported(BankInterleave::Cs0Cs1, 1, [1, 0], false));
        assert!(!bank_interleave_supported(BankInterleave::Cs2Cs3, 1, [2, 0], false));
        assert!(bank_interleave_supported(BankInterleave::Cs2Cs3, 2, [1, 2], false));
        assert!(!bank_interleave_supported(BankInterleave::Cs0Cs1Cs2Cs3, 2, [2, 1], false));
        assert!(bank_interleave_supported(BankInterleave::Cs0Cs1AndCs2Cs3, 2, [2, 2], false));
    }

    #[test]
    fn controller_interleave_encoding() {
        assert_eq!(ControllerInterleave::Bank.ways(), 2);
        assert_eq!(ControllerInterleave::ThreeWay4k.ways(), 3);
        assert_eq!(ControllerInterleave::FourWay1k.ways(), 4);
        assert_eq!(u8::from(ControllerInterleave::FourWay8k), 0x1D);
        assert_eq!(
            ControllerInterleave::try_from(0x0Cu8).unwrap(),
            ControllerInterleave::ThreeWay4k
        );
        assert!(ControllerInterleave::try_from(0x07u8).is_err());
    }

    #[test]
    fn udimm_defaults() {
        let dimms = [testutil::udimm_2r_4gib(), testutil::udimm_2r_4gib()];
        let mut warnings = Warnings::new();
        let platform = testutil::two_slot_platform();
        let opts = populate_with(&dimms, &platform, &NotConfigured, &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(opts.cs_local_opts, *OdtPopulation::DualDD.table());
        assert_eq!(opts.memctl_interleaving, None);
        assert_eq!(opts.ba_intlv, BankInterleave::None);
        assert!(!opts.ecc_mode);
        assert!(!opts.registered_dimm_en);
        assert!(!opts.ap_en);
        assert_eq!(opts.dqs_config, 1);
        assert!(opts.self_refresh_in_sleep);
        assert_eq!(opts.data_bus_width, DataBusWidth::_64Bit);
        assert_eq!(opts.burst_length, BurstLength::OnTheFly);
        assert!(opts.otf_burst_chop_en);
        assert!(opts.mirrored_dimm);
        assert!(!opts.x4_en);
        assert!(!opts.twot_en);
        // 7.8 us at 800 MHz is 6240 clocks.
        assert_eq!(opts.bstopre, 1560);
        assert_eq!(opts.tfaw_window_four_activates_ps, 30_000);
        assert_eq!(opts.tcke_clock_pulse_width_ps, 5000);
        assert_eq!(opts.write_data_delay, 2);
        assert!(opts.zq_en && opts.wrlvl_en);
        assert!(!opts.rcw_override);
    }

    #[test]
    fn tcke_speed_bins() {
        let tcke = |mts: u32| tcke_min_ps(&ClockContext::new(Hertz::from_raw(mts * 1_000_000)));
        assert_eq!(tcke(800), 7500);
        assert_eq!(tcke(1066), 5625);
        assert_eq!(tcke(1333), 5625);
        assert_eq!(tcke(1600), 5000);
        assert_eq!(tcke(2133), 5000);
    }

    #[test]
    fn narrow_bus_uses_fixed_burst() {
        let mut dimm = testutil::udimm_2r_4gib();
        dimm.primary_sdram_width = 32;
        dimm.data_width = 32;
        let mut warnings = Warnings::new();
        let platform = testutil::single_slot_platform();
        let opts = populate_with(&[dimm], &platform, &NotConfigured, &mut warnings);
        assert_eq!(opts.data_bus_width, DataBusWidth::_32Bit);
        assert_eq!(opts.burst_length, BurstLength::Bl8);
        assert!(!opts.otf_burst_chop_en);
        assert_eq!(data_bus_width_for(72), DataBusWidth::_64Bit);
        assert_eq!(data_bus_width_for(16), DataBusWidth::_16Bit);
        assert_eq!(data_bus_width_for(8), DataBusWidth::_64Bit);
    }

    #[test]
    fn rdimm_control_word_override() {
        let mut dimm = testutil::udimm_2r_4gib();
        dimm.registered_dimm = true;
        let mut warnings = Warnings::new();
        let platform = testutil::single_slot_platform();
        let opts = populate_with(&[dimm], &platform, &NotConfigured, &mut warnings);
        assert!(opts.registered_dimm_en);
        assert!(opts.ap_en);
        assert!(opts.rcw_override);
        assert_eq!(opts.rcw_1, RDIMM_RCW_1);
        assert_eq!(opts.rcw_2, 0x0030_0000);
        assert_eq!(rdimm_rcw_2(800), 0);
        assert_eq!(rdimm_rcw_2(1066), 0x0010_0000);
        assert_eq!(rdimm_rcw_2(1333), 0x0020_0000);
    }

    #[test]
    fn interleave_requests() {
        let dimms = [testutil::udimm_2r_4gib(), testutil::udimm_2r_4gib()];
        let platform = testutil::two_slot_platform();
        let mut warnings = Warnings::new();
        let src = StaticInterleaveConfig {
            controller: Some(ControllerInterleave::CacheLine),
            bank: Some(BankInterleave::Auto),
            ecc: true,
        };
        let opts = populate_with(&dimms, &platform, &src, &mut warnings);
        assert_eq!(opts.ba_intlv, BankInterleave::Cs0Cs1Cs2Cs3);
        // A single controller is never interleaved.
        assert_eq!(opts.memctl_interleaving, None);
        assert!(opts.ecc_mode);
        assert!(opts.ecc_init_using_memctl);
        assert!(warnings.is_empty());

        let src = StaticInterleaveConfig {
            bank: Some(BankInterleave::Cs2Cs3),
            ..Default::default()
        };
        let platform = testutil::single_slot_platform();
        let opts = populate_with(&dimms[..1], &platform, &src, &mut warnings);
        assert_eq!(opts.ba_intlv, BankInterleave::None);
        assert!(warnings.any(|w| *w
            == Warning::BankInterleaveUnsupported {
                ctrl: 0,
                requested: BankInterleave::Cs2Cs3
            }));
    }
}
