//! Register synthesis.
//!
//! Translates the common timing parameters, the controller options and the assigned addresses
//! into the register values of one DDR controller. Nothing in here touches the hardware, the
//! values are written by [super::ll::set_memctl_regs].
use arbitrary_int::{Number, u2, u3, u4, u5, u6, u7, u14};
use ls1043a::ddrc::{
    CHIP_SELECTS, DEBUG_REGS, sdram_cfg,
    regs::{
        CsBounds, CsConfig, DataBusWidth, Ddr3Mr0, Ddr3Mr1, Ddr3Mr2, Eor, SdramCfg, SdramCfg2,
        SdramClkCntl, SdramInterval, SdramMode, SdramType, SrCntr, TimingCfg0, TimingCfg1,
        TimingCfg2, TimingCfg3, TimingCfg4, TimingCfg5, WrlvlCntl, ZqCntl,
    },
};

use super::{
    clock::{ClockContext, ilog2},
    common::CommonTimingParams,
    config::MAX_DIMM_SLOTS,
    options::{BankInterleave, BurstLength, MemctlOptions},
    spd::DimmParams,
};

/// Pattern written by the controller during automatic data initialization.
pub const SDRAM_DATA_INIT_PATTERN: u32 = 0xDEAD_BEEF;

/// Controllers newer than this revision support unique mode registers per chip select.
pub const IP_REV_UNIQUE_MRS: u32 = 0x0004_0400;
/// From this revision on the mode register cycle time includes tMOD.
pub const IP_REV_TMOD: u32 = 0x0004_0700;
/// From this revision on the clock adjust field has five bits.
pub const IP_REV_CLK_ADJUST_5BIT: u32 = 0x0004_0701;

/// Debug register holding the chip select write latency override.
const DEBUG_CSWL: usize = 18;

/// Write recovery field encoding, indexed by clocks - 1.
const WRREC_TABLE: [u32; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 10, 10, 12, 12, 14, 14, 0, 0];
/// MR0 write recovery encoding, indexed by clocks - 5.
const MR0_WR_TABLE: [u8; 12] = [1, 2, 3, 4, 5, 5, 6, 6, 7, 7, 0, 0];
/// MR0 CAS latency encoding (A6:A4 and A2), indexed by CL - 5.
const MR0_CASLAT_TABLE: [u8; 12] = [0x2, 0x4, 0x6, 0x8, 0xA, 0xC, 0xE, 0x1, 0x3, 0x5, 0x7, 0x9];

/// Data rate below which the controller runs in slow mode.
const SLOW_MODE_DATA_RATE: u32 = 1_249_000_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CsRegs {
    pub bnds: u32,
    pub config: u32,
    pub config_2: u32,
}

impl CsRegs {
    #[inline]
    pub fn enabled(&self) -> bool {
        CsConfig::new_with_raw_value(self.config).cs_en()
    }
}

/// Register values of one DDR controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FslDdrCfgRegs {
    pub cs: [CsRegs; CHIP_SELECTS],
    pub timing_cfg_3: u32,
    pub timing_cfg_0: u32,
    pub timing_cfg_1: u32,
    pub timing_cfg_2: u32,
    pub sdram_cfg: u32,
    pub sdram_cfg_2: u32,
    pub sdram_mode: u32,
    pub sdram_mode_2: u32,
    /// Mode registers of chip selects 1 to 3, MR1/MR0 and MR2/MR3 pairs.
    pub sdram_mode_3_to_8: [u32; 6],
    pub sdram_md_cntl: u32,
    pub sdram_interval: u32,
    pub sdram_data_init: u32,
    pub sdram_clk_cntl: u32,
    pub sdram_init_addr: u32,
    pub sdram_init_addr_ext: u32,
    pub timing_cfg_4: u32,
    pub timing_cfg_5: u32,
    pub zq_cntl: u32,
    pub wrlvl_cntl: u32,
    pub wrlvl_cntl_2: u32,
    pub wrlvl_cntl_3: u32,
    pub sr_cntr: u32,
    pub sdram_rcw_1: u32,
    pub sdram_rcw_2: u32,
    pub cdr1: u32,
    pub cdr2: u32,
    pub err_disable: u32,
    pub err_int_en: u32,
    pub eor: u32,
    pub debug: [u32; DEBUG_REGS],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegsError {
    #[error("no DIMMs with common timing parameters")]
    NoCommonTiming,
    /// The registers were computed but contain illegal combinations.
    #[error("{count} illegal register combinations")]
    InvalidConfig { count: u32, regs: FslDdrCfgRegs },
}

/// Common inputs of the register computations.
struct Inputs<'a> {
    ctx: &'a ClockContext,
    opts: &'a MemctlOptions,
    common: &'a CommonTimingParams,
    dimms: &'a [DimmParams],
    ip_version: u32,
    cas_latency: u32,
    additive_latency: u32,
}

impl Inputs<'_> {
    #[inline]
    fn clocks(&self, ps: u32) -> u32 {
        self.ctx.picos_to_mclk(ps)
    }

    #[inline]
    fn otf_adjust(&self) -> u32 {
        if self.opts.otf_burst_chop_en { 2 } else { 0 }
    }

    fn unique_mrs(&self) -> bool {
        self.ip_version > IP_REV_UNIQUE_MRS
    }
}

/// End address of a range, inclusive.
#[inline]
fn range_end(start: u64, len: u64) -> u64 {
    start.saturating_add(len).saturating_sub(1)
}

/// Address range of a chip select, [None] if the chip select does not map memory.
fn cs_address_range(
    inp: &Inputs,
    cs: usize,
    cs_per_dimm: usize,
    dimm_number: usize,
    dbw_cap_adj: u32,
) -> Option<(u64, u64)> {
    let dimm = &inp.dimms[dimm_number];
    let rank_density = dimm.rank_density >> dbw_cap_adj;
    let base = dimm.base_address;
    let rank = (cs % cs_per_dimm) as u64;
    let has_rank = dimm.n_ranks as u64 > rank;
    let ctrl_range = || {
        let sa = inp.common.base_address;
        (sa, range_end(sa, inp.common.total_mem))
    };

    if inp.opts.memctl_interleaving.is_some() {
        let enabled = match inp.opts.ba_intlv {
            BankInterleave::Cs0Cs1Cs2Cs3 => true,
            BankInterleave::Cs0Cs1 | BankInterleave::Cs0Cs1AndCs2Cs3 => cs <= 1,
            _ => cs == 0,
        };
        return enabled.then(ctrl_range);
    }

    let range = match inp.opts.ba_intlv {
        BankInterleave::Cs0Cs1Cs2Cs3 => ctrl_range(),
        BankInterleave::Cs0Cs1AndCs2Cs3 => {
            let sa = if cs >= 2 && dimm_number == 0 {
                base + 2 * rank_density
            } else {
                base
            };
            (sa, range_end(sa, 2 * rank_density))
        }
        BankInterleave::Cs0Cs1 => {
            if !has_rank {
                return None;
            }
            let mut sa = base;
            let mut ea = range_end(sa, rank_density) + rank * rank_density;
            if cs != 1 {
                sa += rank * rank_density;
            }
            if cs == 0 {
                ea += rank_density;
            }
            (sa, ea)
        }
        BankInterleave::Cs2Cs3 => {
            if !has_rank {
                return None;
            }
            let mut sa = base;
            let mut ea = range_end(sa, rank_density) + rank * rank_density;
            if cs != 3 {
                sa += rank * rank_density;
            }
            if cs == 2 {
                ea += rank_density;
            }
            (sa, ea)
        }
        BankInterleave::None | BankInterleave::Auto => {
            if !has_rank {
                return None;
            }
            let sa = base + rank * rank_density;
            (sa, range_end(sa, rank_density))
        }
    };
    Some(range)
}

/// Chip select configuration, 0 for chip selects without a rank.
fn cs_config(inp: &Inputs, cs: usize, dimm_number: usize) -> u32 {
    let ranks = |n: usize| inp.dimms.get(n).map_or(0, |d| d.n_ranks);
    let go_config = match cs {
        0 => ranks(dimm_number) > 0,
        1 => (dimm_number == 0 && ranks(0) > 1) || (dimm_number == 1 && ranks(1) > 0),
        2 => (dimm_number == 0 && ranks(0) > 2) || (dimm_number >= 1 && ranks(dimm_number) > 0),
        3 => (dimm_number == 0 && ranks(0) > 3) || (dimm_number == 1 && ranks(1) > 1),
        _ => false,
    };
    if !go_config {
        return 0;
    }
    let dimm = &inp.dimms[dimm_number];
    let odt = inp.opts.cs_local_opts[cs];
    let mut config = CsConfig::new_with_raw_value(0)
        .with_cs_en(true)
        .with_odt_rd_cfg(odt.odt_rd_cfg)
        .with_odt_wr_cfg(odt.odt_wr_cfg)
        .with_ba_bits(u2::masked_new(
            ilog2(dimm.n_banks_per_sdram_device).saturating_sub(2) as u8,
        ))
        .with_row_bits(u3::masked_new(dimm.n_row_addr.saturating_sub(12) as u8))
        .with_col_bits(u3::masked_new(dimm.n_col_addr.saturating_sub(8) as u8));
    // Controller interleaving is configured in CS0 only.
    if cs == 0 {
        if let Some(mode) = inp.opts.memctl_interleaving {
            if mode.ways() == 2 {
                config = config
                    .with_intlv_en(u2::new(1))
                    .with_intlv_ctl(u4::masked_new(u8::from(mode)));
            }
        }
    }
    config.raw_value()
}

fn chip_select_regs(inp: &Inputs, dbw_cap_adj: u32) -> [CsRegs; CHIP_SELECTS] {
    let mut cs_regs = [CsRegs::default(); CHIP_SELECTS];
    let slots = inp.dimms.len().min(MAX_DIMM_SLOTS);
    if slots == 0 {
        return cs_regs;
    }
    let cs_per_dimm = CHIP_SELECTS / slots;
    for (cs, regs) in cs_regs.iter_mut().enumerate() {
        regs.bnds = CsBounds::INACTIVE;
        let dimm_number = cs / cs_per_dimm;
        if inp.dimms[dimm_number].is_empty() {
            log::debug!("DDR: skipping CS{}, DIMM {} has no ranks", cs, dimm_number);
            continue;
        }
        if let Some((sa, ea)) = cs_address_range(inp, cs, cs_per_dimm, dimm_number, dbw_cap_adj) {
            regs.bnds = CsBounds::new_with_raw_value(0)
                .with_start_addr((sa >> 24) as u16)
                .with_end_addr((ea >> 24) as u16)
                .raw_value();
        }
        regs.config = cs_config(inp, cs, dimm_number);
        regs.config_2 = 0;
    }
    cs_regs
}

/// Turnaround spacing needed to avoid ODT overlap between ranks: 2, 1 or 0.
fn avoid_odt_overlap(dimms: &[DimmParams]) -> u32 {
    let ranks = |n: usize| dimms.get(n).map_or(0, |d| d.n_ranks);
    if dimms.len() == 1 {
        return if ranks(0) == 4 { 2 } else { 0 };
    }
    if (ranks(0) == 2 && ranks(1) == 2) || ranks(0) == 4 {
        return 2;
    }
    if ranks(0) != 0 && ranks(1) != 0 {
        return 1;
    }
    0
}

fn timing_cfg_0(inp: &Inputs) -> u32 {
    let data_rate_mts = inp.ctx.data_rate_mts();
    let (twwt, trrt): (u8, u8) = match avoid_odt_overlap(inp.dimms) {
        2 => (2, 1),
        1 => (1, 0),
        _ => (0, 0),
    };
    let trwt: u8 = if data_rate_mts > 1800 { 2 } else { 1 };
    let twrt: u8 = if data_rate_mts > 1150 || inp.opts.memctl_interleaving.is_some() {
        1
    } else {
        0
    };
    // tXP = max(3 tCK, 7.5 ns), also used for tXARD.
    let txp = inp.clocks(inp.ctx.mclk_to_picos(3).max(7500));
    let tmrd = if inp.ip_version >= IP_REV_TMOD {
        // max(tMRD, tMOD)
        inp.clocks(15_000).max(12)
    } else if inp.common.all_dimms_registered {
        8
    } else {
        4
    };
    TimingCfg0::new_with_raw_value(0)
        .with_rwt(u2::masked_new(trwt))
        .with_wrt(u2::masked_new(twrt))
        .with_rrt(u2::masked_new(trrt))
        .with_wwt(u2::masked_new(twwt))
        .with_act_pd_exit(u4::masked_new(txp as u8))
        .with_pre_pd_exit(u4::masked_new(txp as u8))
        .with_odt_pd_exit(u4::new(1))
        .with_mrs_cyc(u5::masked_new(tmrd as u8))
        .raw_value()
}

fn timing_cfg_3(inp: &Inputs) -> u32 {
    let trfc = inp.clocks(inp.common.trfc_ps);
    let twr = inp.clocks(inp.common.twr_ps);
    TimingCfg3::new_with_raw_value(0)
        .with_ext_pretoact((inp.clocks(inp.common.trp_ps) >> 4) != 0)
        .with_ext_acttopre(u2::masked_new((inp.clocks(inp.common.tras_ps) >> 4) as u8))
        .with_ext_acttorw((inp.clocks(inp.common.trcd_ps) >> 4) != 0)
        .with_ext_refrec(u5::masked_new((trfc.saturating_sub(8) >> 4) as u8))
        .with_ext_caslat(u2::masked_new(((2 * inp.cas_latency).saturating_sub(1) >> 4) as u8))
        .with_ext_add_lat((inp.additive_latency >> 4) != 0)
        .with_ext_wrrec(((twr + inp.otf_adjust()) >> 4) != 0)
        .with_cntl_adj(u3::new(0))
        .raw_value()
}

fn timing_cfg_1(inp: &Inputs) -> u32 {
    let cl = inp.cas_latency;
    let caslat_ctrl = if inp.ip_version <= IP_REV_UNIQUE_MRS {
        (2 * cl).saturating_sub(1)
    } else {
        cl.saturating_sub(1) << 1
    };
    let twr = inp.clocks(inp.common.twr_ps);
    let wrrec = match twr {
        0 => 0,
        1..=16 => WRREC_TABLE[twr as usize - 1],
        _ => {
            log::error!("DDR: write recovery of {} clocks not supported", twr);
            twr
        }
    } + inp.otf_adjust();
    let acttoact = inp.clocks(inp.common.trrd_ps).max(4);
    let wrtord = inp.clocks(inp.common.twtr_ps).max(4) + inp.otf_adjust();
    let refrec = inp.clocks(inp.common.trfc_ps).saturating_sub(8);
    let field = |v: u32| u4::masked_new(v as u8);
    TimingCfg1::new_with_raw_value(0)
        .with_pretoact(field(inp.clocks(inp.common.trp_ps)))
        .with_acttopre(field(inp.clocks(inp.common.tras_ps)))
        .with_acttorw(field(inp.clocks(inp.common.trcd_ps)))
        .with_caslat_ctrl(field(caslat_ctrl))
        .with_refrec(field(refrec))
        .with_wrrec(field(wrrec))
        .with_acttoact(field(acttoact))
        .with_wrtord(field(wrtord))
        .raw_value()
}

fn timing_cfg_2(inp: &Inputs) -> u32 {
    let cwl = inp.ctx.cas_write_latency();
    let rd_to_pre = inp.clocks(inp.common.trtp_ps).max(4) + inp.otf_adjust();
    let cke_pls = inp.clocks(inp.opts.tcke_clock_pulse_width_ps).max(3);
    let four_act = inp.clocks(inp.opts.tfaw_window_four_activates_ps);
    TimingCfg2::new_with_raw_value(0)
        .with_add_lat(u4::masked_new(inp.additive_latency as u8))
        .with_cpo(u5::masked_new(inp.opts.cpo_override as u8))
        .with_wr_lat(u4::masked_new(cwl as u8))
        .with_wr_lat_ext((cwl >> 4) & 1 != 0)
        .with_rd_to_pre(u4::masked_new(rd_to_pre as u8))
        .with_wr_data_delay(u4::masked_new(inp.opts.write_data_delay as u8))
        .with_cke_pls(u3::masked_new(cke_pls as u8))
        .with_four_act(u6::masked_new(four_act as u8))
        .raw_value()
}

fn ddr_sdram_cfg(inp: &Inputs) -> u32 {
    let opts = inp.opts;
    let ecc_en = opts.ecc_mode && inp.common.all_dimms_ecc_capable;
    let rd_en = inp.common.all_dimms_registered;
    let dbw = opts.data_bus_width;
    // Clear for on-the-fly burst chop, required for a 32 bit bus.
    let eight_be = opts.burst_length == BurstLength::Bl8 || dbw == DataBusWidth::_32Bit;
    SdramCfg::new_with_raw_value(0)
        .with_mem_en(true)
        .with_sren(opts.self_refresh_in_sleep)
        .with_ecc_en(ecc_en)
        .with_rd_en(rd_en)
        .with_sdram_type(SdramType::Ddr3)
        .with_dyn_pwr(opts.dynamic_power)
        .with_dbw(dbw)
        .with_eight_be(eight_be)
        .with_threet_en(opts.threet_en)
        .with_twot_en(opts.twot_en && !rd_en)
        .with_ba_intlv_ctl(u7::masked_new(opts.ba_intlv.ba_intlv_ctl()))
        .with_hse(opts.half_strength_driver_enable)
        .with_acc_ecc_en(dbw != DataBusWidth::_64Bit && ecc_en)
        .raw_value()
}

fn ddr_sdram_cfg_2(inp: &Inputs) -> u32 {
    let opts = inp.opts;
    let registered = opts.registered_dimm_en;
    let odt_cfg = if opts.cs_local_opts.iter().any(|cs| cs.odt_used()) {
        2
    } else {
        0
    };
    SdramCfg2::new_with_raw_value(0)
        .with_dll_rst_dis(true)
        .with_dqs_cfg(u2::masked_new(opts.dqs_config))
        .with_odt_cfg(u2::new(odt_cfg))
        .with_num_pr(u4::new(1))
        .with_slow(inp.ctx.data_rate().raw() < SLOW_MODE_DATA_RATE)
        .with_x4_en(opts.x4_en)
        .with_qd_en(opts.quad_rank_present)
        .with_unq_mrs_en(inp.unique_mrs())
        .with_obc_cfg(opts.otf_burst_chop_en)
        .with_ap_en(registered && opts.ap_en)
        .with_d_init(opts.ecc_init_using_memctl)
        .with_rcw_en(registered)
        .with_md_en(opts.mirrored_dimm)
        .raw_value()
}

/// MR1 with the nominal termination of one chip select.
fn ddr3_mr1(inp: &Inputs, cs: usize) -> Ddr3Mr1 {
    let rtt = inp
        .opts
        .rtt_override
        .unwrap_or(inp.opts.cs_local_opts[cs].rtt_nom) as u8;
    let cl = inp.cas_latency;
    let al: u8 = if Some(inp.additive_latency) == cl.checked_sub(1) {
        1
    } else if Some(inp.additive_latency) == cl.checked_sub(2) {
        2
    } else {
        0
    };
    // 240/7 ohm output driver impedance for quad-rank DIMMs.
    let dic: u8 = if inp.opts.quad_rank_present { 1 } else { 0 };
    Ddr3Mr1::new_with_raw_value(0)
        .with_rtt_nom_2(rtt & 0x4 != 0)
        .with_rtt_nom_1(rtt & 0x2 != 0)
        .with_rtt_nom_0(rtt & 0x1 != 0)
        .with_dic_1(dic & 0x2 != 0)
        .with_dic_0(dic & 0x1 != 0)
        .with_al(u2::masked_new(al))
}

fn ddr3_mr0(inp: &Inputs) -> Ddr3Mr0 {
    let mclk_ps = inp.ctx.mclk_period_ps().max(1);
    let wr_mclk = inp.common.twr_ps.div_ceil(mclk_ps);
    let wr = if wr_mclk <= 16 {
        MR0_WR_TABLE[wr_mclk.max(5) as usize - 5]
    } else {
        log::error!("DDR: MR0 write recovery of {} clocks not supported", wr_mclk);
        0
    };
    let cl = inp.cas_latency;
    let caslat = if (5..=16).contains(&cl) {
        MR0_CASLAT_TABLE[cl as usize - 5]
    } else {
        log::error!("DDR: MR0 CAS latency {} not supported", cl);
        0
    };
    let bl = match inp.opts.burst_length {
        BurstLength::Bl8 => 0,
        BurstLength::OnTheFly => 1,
        BurstLength::Bc4 => 2,
    };
    Ddr3Mr0::new_with_raw_value(0)
        .with_dll_on(true)
        .with_wr(u3::masked_new(wr))
        .with_caslat_hi(u3::masked_new(caslat >> 1))
        .with_caslat_lo(caslat & 1 != 0)
        .with_bl(u2::new(bl))
}

fn ddr3_mr2(inp: &Inputs, cs: usize) -> Ddr3Mr2 {
    let rtt_wr = inp
        .opts
        .rtt_wr_override
        .unwrap_or(inp.opts.cs_local_opts[cs].rtt_wr) as u8;
    let cwl = inp.ctx.cas_write_latency().saturating_sub(5);
    Ddr3Mr2::new_with_raw_value(0)
        .with_rtt_wr(u2::masked_new(rtt_wr))
        .with_srt(inp.common.extended_op_srt)
        .with_cwl(u3::masked_new(cwl as u8))
}

#[inline]
fn sdram_mode(high: u16, low: u16) -> u32 {
    SdramMode::new_with_raw_value(0)
        .with_esdmode(high)
        .with_sdmode(low)
        .raw_value()
}

/// Mode registers of chip select 0 and, with unique mode register support, of chip selects 1
/// to 3. Chip selects 1 to 3 only differ in the termination settings.
fn mode_regs(inp: &Inputs, regs: &mut FslDdrCfgRegs) {
    let sdmode = ddr3_mr0(inp).raw_value();
    let mut esdmode = ddr3_mr1(inp, 0).raw_value();
    regs.sdram_mode = sdram_mode(esdmode, sdmode);

    let mut esdmode2 = ddr3_mr2(inp, 0).raw_value();
    let esdmode3 = 0;
    regs.sdram_mode_2 = sdram_mode(esdmode2, esdmode3);

    if !inp.unique_mrs() {
        return;
    }
    for cs in 1..CHIP_SELECTS {
        esdmode = (esdmode & Ddr3Mr1::RTT_NOM_CLEAR_MASK)
            | (ddr3_mr1(inp, cs).raw_value() & !Ddr3Mr1::RTT_NOM_CLEAR_MASK);
        esdmode2 = (esdmode2 & Ddr3Mr2::RTT_WR_CLEAR_MASK)
            | (ddr3_mr2(inp, cs).raw_value() & !Ddr3Mr2::RTT_WR_CLEAR_MASK);
        let idx = 2 * (cs - 1);
        regs.sdram_mode_3_to_8[idx] = sdram_mode(esdmode, sdmode);
        regs.sdram_mode_3_to_8[idx + 1] = sdram_mode(esdmode2, esdmode3);
    }
}

fn sdram_interval(inp: &Inputs) -> u32 {
    let refint = inp.clocks(inp.common.refresh_rate_ps);
    SdramInterval::new_with_raw_value(0)
        .with_refint(refint as u16)
        .with_bstopre(u14::masked_new(inp.opts.bstopre as u16))
        .raw_value()
}

fn sdram_clk_cntl(inp: &Inputs) -> u32 {
    let clk_adjust = if inp.ip_version >= IP_REV_CLK_ADJUST_5BIT {
        inp.opts.clk_adjust & 0x1F
    } else {
        (inp.opts.clk_adjust & 0xF) << 1
    };
    SdramClkCntl::new_with_raw_value(0)
        .with_clk_adjust(u5::masked_new(clk_adjust))
        .raw_value()
}

fn timing_cfg_4(inp: &Inputs) -> u32 {
    // BL/2 for fixed BL8, BL/2 + 2 for burst chop.
    let turnaround = if inp.opts.burst_length == BurstLength::Bl8 {
        0
    } else {
        2
    };
    TimingCfg4::new_with_raw_value(0)
        .with_rrt(u4::new(turnaround))
        .with_wwt(u4::new(turnaround))
        // tDLLK = 512 clocks
        .with_dll_lock(u2::new(1))
        .raw_value()
}

fn timing_cfg_5(inp: &Inputs, timing_cfg_2: u32) -> u32 {
    let cfg2 = TimingCfg2::new_with_raw_value(timing_cfg_2);
    let wr_lat = cfg2.wr_lat().value() as u32 + if cfg2.wr_lat_ext() { 16 } else { 0 };
    // rodt_on = CL - CWL + 1
    let rodt_on = if inp.cas_latency >= wr_lat {
        inp.cas_latency - wr_lat + 1
    } else {
        0
    };
    TimingCfg5::new_with_raw_value(0)
        .with_rodt_on(u5::masked_new(rodt_on as u8))
        .with_rodt_off(u3::new(4))
        .with_wodt_on(u5::new(1))
        .with_wodt_off(u3::new(4))
        .raw_value()
}

fn zq_cntl(opts: &MemctlOptions) -> u32 {
    if !opts.zq_en {
        return 0;
    }
    // 512, 256 and 64 clocks
    ZqCntl::new_with_raw_value(0)
        .with_zq_en(true)
        .with_zqinit(u4::new(9))
        .with_zqoper(u4::new(8))
        .with_zqcs(u4::new(6))
        .raw_value()
}

fn wrlvl_cntl(opts: &MemctlOptions) -> u32 {
    if !opts.wrlvl_en {
        return 0;
    }
    let (smpl, start) = if opts.wrlvl_override {
        (opts.wrlvl_sample, opts.wrlvl_start)
    } else {
        (0xF, 0x8)
    };
    // tWL_MRD 64, tWL_ODTEN 128, tWL_DQSEN 32, repetition 64 clocks
    WrlvlCntl::new_with_raw_value(0)
        .with_wrlvl_en(true)
        .with_wrlvl_mrd(u3::new(6))
        .with_wrlvl_odten(u3::new(7))
        .with_wrlvl_dqsen(u3::new(5))
        .with_wrlvl_smpl(u4::masked_new(smpl))
        .with_wrlvl_wlr(u3::new(6))
        .with_wrlvl_start(u5::masked_new(start))
        .raw_value()
}

fn sr_cntr(opts: &MemctlOptions) -> u32 {
    let sr_it = if opts.auto_self_refresh_en {
        opts.sr_it
    } else {
        0
    };
    SrCntr::new_with_raw_value(0)
        .with_sr_it(u4::masked_new(sr_it))
        .raw_value()
}

/// Pack RC0..RC15 nibbles, RC0 in the most significant nibble.
fn pack_rcw(nibbles: &[u8]) -> u32 {
    nibbles
        .iter()
        .fold(0, |acc, &nibble| (acc << 4) | (nibble & 0xF) as u32)
}

fn rcw_regs(inp: &Inputs, regs: &mut FslDdrCfgRegs) {
    if !inp.common.all_dimms_registered || inp.common.all_dimms_unbuffered {
        return;
    }
    if inp.opts.rcw_override {
        regs.sdram_rcw_1 = inp.opts.rcw_1;
        regs.sdram_rcw_2 = inp.opts.rcw_2;
    } else {
        regs.sdram_rcw_1 = pack_rcw(&inp.common.rcw[..8]);
        regs.sdram_rcw_2 = pack_rcw(&inp.common.rcw[8..]);
    }
}

/// Compute the register values of one controller.
///
/// With `size_only`, only the chip select registers are computed, which is enough to determine
/// the memory size. An illegal register combination is reported as [RegsError::InvalidConfig],
/// which still carries the computed registers.
pub fn compute_memctl_config_regs(
    ctx: &ClockContext,
    opts: &MemctlOptions,
    common: &CommonTimingParams,
    dimms: &[DimmParams],
    dbw_cap_adj: u32,
    ip_version: u32,
    size_only: bool,
) -> Result<FslDdrCfgRegs, RegsError> {
    if common.ndimms_present == 0 {
        return Err(RegsError::NoCommonTiming);
    }
    let inp = Inputs {
        ctx,
        opts,
        common,
        dimms,
        ip_version,
        cas_latency: opts
            .cas_latency_override
            .unwrap_or(common.lowest_common_spd_caslat),
        additive_latency: opts
            .additive_latency_override
            .unwrap_or(common.additive_latency),
    };

    let mut regs = FslDdrCfgRegs {
        cs: chip_select_regs(&inp, dbw_cap_adj),
        ..Default::default()
    };
    if size_only {
        return Ok(regs);
    }

    if opts.addr_hash {
        regs.eor = Eor::new_with_raw_value(0)
            .with_addr_hash_en(true)
            .raw_value();
    }
    regs.timing_cfg_0 = timing_cfg_0(&inp);
    regs.timing_cfg_3 = timing_cfg_3(&inp);
    regs.timing_cfg_1 = timing_cfg_1(&inp);
    regs.timing_cfg_2 = timing_cfg_2(&inp);
    regs.cdr1 = opts.ddr_cdr1;
    regs.cdr2 = opts.ddr_cdr2;
    regs.sdram_cfg = ddr_sdram_cfg(&inp);
    if ip_version > IP_REV_TMOD && opts.cswl_override != 0 {
        regs.debug[DEBUG_CSWL] = opts.cswl_override;
    }
    regs.sdram_cfg_2 = ddr_sdram_cfg_2(&inp);
    mode_regs(&inp, &mut regs);
    regs.sdram_md_cntl = 0;
    regs.sdram_interval = sdram_interval(&inp);
    regs.sdram_data_init = SDRAM_DATA_INIT_PATTERN;
    regs.sdram_clk_cntl = sdram_clk_cntl(&inp);
    regs.sdram_init_addr = 0;
    regs.sdram_init_addr_ext = 0;
    regs.timing_cfg_4 = timing_cfg_4(&inp);
    regs.timing_cfg_5 = timing_cfg_5(&inp, regs.timing_cfg_2);
    regs.zq_cntl = zq_cntl(opts);
    regs.wrlvl_cntl = wrlvl_cntl(opts);
    regs.wrlvl_cntl_2 = opts.wrlvl_ctl_2;
    regs.wrlvl_cntl_3 = opts.wrlvl_ctl_3;
    regs.sr_cntr = sr_cntr(opts);
    rcw_regs(&inp, &mut regs);

    log::debug!("DDR: registers {:#x?}", regs);
    match check_memctl_config_regs(&regs) {
        0 => Ok(regs),
        count => Err(RegsError::InvalidConfig { count, regs }),
    }
}

/// Count illegal register combinations.
pub fn check_memctl_config_regs(regs: &FslDdrCfgRegs) -> u32 {
    let mut count = 0;
    // Registered DIMMs and 2T timing are mutually exclusive.
    if regs.sdram_cfg & sdram_cfg::RD_EN != 0 && regs.sdram_cfg & sdram_cfg::TWO_T_EN != 0 {
        log::error!("DDR: RD_EN and 2T_EN must not be set at the same time");
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ddr::{
            addr,
            board::NoBoardOptions,
            common::compute_lowest_common_dimm_parameters,
            options::{NotConfigured, Rtt, populate_memctl_options},
            testutil,
            warning::Warnings,
        },
        time::Hertz,
    };
    use ls1043a::ddrc::regs::OdtConfig;

    const IP_REV: u32 = 0x0004_0502;

    struct Setup {
        ctx: ClockContext,
        dimms: [DimmParams; 2],
        common: CommonTimingParams,
        opts: MemctlOptions,
    }

    /// Two dual rank UDIMMs at DDR3-1600, linearly assigned.
    fn dual_udimm_setup() -> Setup {
        dual_udimm_setup_at(1600)
    }

    /// Two dual rank UDIMMs at the given data rate. The DIMMs support CL5 to CL16.
    fn dual_udimm_setup_at(data_rate_mts: u32) -> Setup {
        let ctx = ClockContext::new(Hertz::from_raw(data_rate_mts * 1_000_000));
        let platform = testutil::two_slot_platform();
        let mut dimms = [testutil::udimm_2r_4gib(), testutil::udimm_2r_4gib()];
        for dimm in &mut dimms {
            dimm.caslat_x |= 0x0001_FFE0;
        }
        let mut warnings = Warnings::new();
        let mut common =
            compute_lowest_common_dimm_parameters(&ctx, &dimms, &platform, 0, &mut warnings)
                .unwrap();
        let opts = populate_memctl_options(
            &ctx,
            &common,
            &dimms,
            0,
            &platform,
            &NotConfigured,
            &NoBoardOptions,
            &mut warnings,
        );
        addr::assign_controller_linear(platform.sdram_base, &mut dimms, &mut common, 0);
        Setup {
            ctx,
            dimms,
            common,
            opts,
        }
    }

    impl Setup {
        fn compute(&self, size_only: bool) -> Result<FslDdrCfgRegs, RegsError> {
            compute_memctl_config_regs(
                &self.ctx,
                &self.opts,
                &self.common,
                &self.dimms,
                0,
                IP_REV,
                size_only,
            )
        }
    }

    #[test]
    fn no_dimms() {
        let setup = dual_udimm_setup();
        let err = compute_memctl_config_regs(
            &setup.ctx,
            &setup.opts,
            &CommonTimingParams::default(),
            &setup.dimms,
            0,
            IP_REV,
            false,
        )
        .unwrap_err();
        assert_eq!(err, RegsError::NoCommonTiming);
    }

    #[test]
    fn chip_selects_linear() {
        let regs = dual_udimm_setup().compute(true).unwrap();
        assert_eq!(regs.cs[0].bnds, 0x0080_00FF);
        assert_eq!(regs.cs[1].bnds, 0x0100_017F);
        assert_eq!(regs.cs[2].bnds, 0x0180_01FF);
        assert_eq!(regs.cs[3].bnds, 0x0200_027F);
        // CS enable, write ODT to the same DIMM, 8 banks, 15 rows, 10 columns
        assert_eq!(regs.cs[0].config, 0x8005_4302);
        assert_eq!(regs.cs[1].config, 0x8033_4302);
        assert!(regs.cs.iter().all(|cs| cs.enabled() && cs.config_2 == 0));
        // Size only stops after the chip selects.
        assert_eq!(regs.timing_cfg_1, 0);
        assert_eq!(regs.sdram_cfg, 0);
    }

    #[test]
    fn inactive_chip_selects_use_sentinel() {
        let mut setup = dual_udimm_setup();
        setup.dimms[1] = DimmParams::default();
        setup.dimms[0].n_ranks = 1;
        let regs = setup.compute(true).unwrap();
        assert_eq!(regs.cs[0].bnds, 0x0080_00FF);
        for cs in &regs.cs[1..] {
            assert_eq!(cs.bnds, CsBounds::INACTIVE);
            assert!(!cs.enabled());
        }
    }

    #[test]
    fn chip_select_interleaving_bounds() {
        let mut setup = dual_udimm_setup();
        setup.opts.ba_intlv = BankInterleave::Cs0Cs1Cs2Cs3;
        let regs = setup.compute(true).unwrap();
        for cs in &regs.cs {
            assert_eq!(cs.bnds, 0x0080_027F);
        }

        setup.opts.ba_intlv = BankInterleave::Cs0Cs1;
        let regs = setup.compute(true).unwrap();
        assert_eq!(regs.cs[0].bnds, 0x0080_017F);
        assert_eq!(regs.cs[1].bnds, 0x0080_017F);
        assert_eq!(regs.cs[2].bnds, 0x0180_01FF);
        assert_eq!(regs.cs[3].bnds, 0x0200_027F);
    }

    #[test]
    fn timing_registers_ddr3_1600() {
        let regs = dual_udimm_setup().compute(false).unwrap();
        // rwt 1, wrt 1, rrt 1, wwt 2, pd exits 6, odt pd exit 1, mrs 4
        assert_eq!(regs.timing_cfg_0, 0x5666_0104);
        // acttopre 28 and refrec 120 overflow into the extended fields.
        assert_eq!(regs.timing_cfg_3, 0x0107_1000);
        // trp 11, tras 28, trcd 11, CL 11, trfc 120, twr 12+2, trrd 5, twtr 6+2
        assert_eq!(regs.timing_cfg_1, 0xBCB4_8E58);
        // CWL 8, rd_to_pre 6+2, wr_data_delay 2, cke_pls 4, four_act 24
        assert_eq!(regs.timing_cfg_2, 0x0041_0518);
        assert_eq!(regs.timing_cfg_4, 0x0022_0001);
        // rodt_on = 11 - 8 + 1
        assert_eq!(regs.timing_cfg_5, 0x0440_1400);
        assert_eq!(regs.sdram_interval, 0x1860_0618);
        assert_eq!(regs.sdram_data_init, SDRAM_DATA_INIT_PATTERN);
        assert_eq!(regs.zq_cntl, 0x8908_0600);
        assert_eq!(regs.wrlvl_cntl, 0x8675_F608);
        assert_eq!(regs.sr_cntr, 0);
        assert_eq!(regs.sdram_rcw_1, 0);
        assert_eq!(check_memctl_config_regs(&regs), 0);
    }

    #[test]
    fn timing_registers_ddr3_800() {
        let setup = dual_udimm_setup_at(800);
        assert_eq!(setup.common.lowest_common_spd_caslat, 6);
        let regs = setup.compute(false).unwrap();
        // rwt 1, wrt 0, rrt 1, wwt 2, pd exits 3, odt pd exit 1, mrs 4
        assert_eq!(regs.timing_cfg_0, 0x4633_0104);
        // trp 6, tras 14, trcd 6, CL 6, trfc 64, twr 6+2, trrd 4, twtr 4+2
        assert_eq!(regs.timing_cfg_1, 0x6E6A_8846);
        let cfg2 = TimingCfg2::new_with_raw_value(regs.timing_cfg_2);
        assert_eq!(cfg2.wr_lat().value(), 5);
        assert_eq!(cfg2.rd_to_pre().value(), 6);
        // 7.5 ns is exactly 3 clocks.
        assert_eq!(cfg2.cke_pls().value(), 3);
        assert_eq!(cfg2.four_act().value(), 12);
        assert_eq!(regs.timing_cfg_2, 0x0028_C4CC);
        assert_eq!(check_memctl_config_regs(&regs), 0);
    }

    #[test]
    fn timing_registers_ddr3_2133() {
        let setup = dual_udimm_setup_at(2133);
        assert_eq!(setup.ctx.mclk_period_ps(), 938);
        assert_eq!(setup.common.lowest_common_spd_caslat, 15);
        let regs = compute_memctl_config_regs(
            &setup.ctx,
            &setup.opts,
            &setup.common,
            &setup.dimms,
            0,
            0x0005_0200,
            false,
        )
        .unwrap();
        let cfg0 = TimingCfg0::new_with_raw_value(regs.timing_cfg_0);
        // max(tMRD, tMOD) = 15 ns needs the fifth bit.
        assert_eq!(cfg0.mrs_cyc().value(), 16);
        assert_eq!(cfg0.act_pd_exit().value(), 8);
        // rwt 2, wrt 1, rrt 1, wwt 2, pd exits 8, odt pd exit 1, mrs 16
        assert_eq!(regs.timing_cfg_0, 0x9688_0110);
        let cfg2 = TimingCfg2::new_with_raw_value(regs.timing_cfg_2);
        assert_eq!(cfg2.wr_lat().value(), 10);
        assert!(!cfg2.wr_lat_ext());
        assert_eq!(cfg2.rd_to_pre().value(), 10);
        assert_eq!(cfg2.cke_pls().value(), 6);
        assert_eq!(cfg2.four_act().value(), 32);
        assert!(!setup.ctx.cas_write_latency_is_fallback());
    }

    #[test]
    fn cke_pulse_width_follows_options() {
        let mut setup = dual_udimm_setup();
        setup.opts.tcke_clock_pulse_width_ps = 7500;
        let regs = setup.compute(false).unwrap();
        assert_eq!(TimingCfg2::new_with_raw_value(regs.timing_cfg_2).cke_pls().value(), 6);
        // Never below 3 clocks.
        setup.opts.tcke_clock_pulse_width_ps = 0;
        let regs = setup.compute(false).unwrap();
        assert_eq!(TimingCfg2::new_with_raw_value(regs.timing_cfg_2).cke_pls().value(), 3);
    }

    #[test]
    fn sdram_cfg_udimm() {
        let regs = dual_udimm_setup().compute(false).unwrap();
        let cfg = SdramCfg::new_with_raw_value(regs.sdram_cfg);
        assert!(cfg.mem_en());
        assert!(cfg.sren());
        assert!(!cfg.rd_en());
        assert!(!cfg.twot_en());
        assert!(!cfg.ecc_en());
        assert_eq!(cfg.sdram_type().unwrap(), SdramType::Ddr3);
        assert_eq!(cfg.dbw().unwrap(), DataBusWidth::_64Bit);
        // On-the-fly burst chop on the 64 bit bus.
        assert!(!cfg.eight_be());
        assert_eq!(regs.sdram_cfg, 0xC700_0000);

        let cfg2 = SdramCfg2::new_with_raw_value(regs.sdram_cfg_2);
        assert!(cfg2.dll_rst_dis());
        assert_eq!(cfg2.dqs_cfg().value(), 1);
        assert_eq!(cfg2.odt_cfg().value(), 2);
        assert_eq!(cfg2.num_pr().value(), 1);
        assert!(!cfg2.slow());
        assert!(cfg2.unq_mrs_en());
        assert!(cfg2.obc_cfg());
        assert!(!cfg2.rcw_en());
        assert!(!cfg2.ap_en());
        assert!(cfg2.md_en());
    }

    #[test]
    fn ecc_requires_capable_dimms() {
        let mut setup = dual_udimm_setup();
        setup.opts.ecc_mode = true;
        let regs = setup.compute(false).unwrap();
        assert!(!SdramCfg::new_with_raw_value(regs.sdram_cfg).ecc_en());

        setup.common.all_dimms_ecc_capable = true;
        let regs = setup.compute(false).unwrap();
        assert!(SdramCfg::new_with_raw_value(regs.sdram_cfg).ecc_en());
        assert!(!SdramCfg::new_with_raw_value(regs.sdram_cfg).acc_ecc_en());

        setup.opts.data_bus_width = DataBusWidth::_32Bit;
        setup.opts.derive_burst_length();
        let regs = setup.compute(false).unwrap();
        let cfg = SdramCfg::new_with_raw_value(regs.sdram_cfg);
        assert!(cfg.acc_ecc_en());
        assert!(cfg.eight_be());
    }

    #[test]
    fn registered_dimms_disable_2t() {
        let mut setup = dual_udimm_setup();
        setup.common.all_dimms_registered = true;
        setup.common.all_dimms_unbuffered = false;
        setup.common.rcw = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
        setup.opts.registered_dimm_en = true;
        setup.opts.ap_en = true;
        setup.opts.twot_en = true;
        let regs = setup.compute(false).unwrap();
        let cfg = SdramCfg::new_with_raw_value(regs.sdram_cfg);
        assert!(cfg.rd_en());
        assert!(!cfg.twot_en());
        assert_eq!(regs.sdram_rcw_1, 0x0123_4567);
        assert_eq!(regs.sdram_rcw_2, 0x89AB_CDEF);
        let cfg2 = SdramCfg2::new_with_raw_value(regs.sdram_cfg_2);
        assert!(cfg2.rcw_en());
        assert!(cfg2.ap_en());

        setup.opts.rcw_override = true;
        setup.opts.rcw_1 = 0x000a_5a00;
        setup.opts.rcw_2 = 0x0030_0000;
        let regs = setup.compute(false).unwrap();
        assert_eq!(regs.sdram_rcw_1, 0x000a_5a00);
        assert_eq!(regs.sdram_rcw_2, 0x0030_0000);
    }

    #[test]
    fn registered_and_2t_is_invalid() {
        let regs = FslDdrCfgRegs {
            sdram_cfg: sdram_cfg::MEM_EN | sdram_cfg::RD_EN | sdram_cfg::TWO_T_EN,
            ..Default::default()
        };
        assert!(check_memctl_config_regs(&regs) >= 1);
        let regs = FslDdrCfgRegs {
            sdram_cfg: sdram_cfg::RD_EN,
            ..Default::default()
        };
        assert_eq!(check_memctl_config_regs(&regs), 0);
    }

    #[test]
    fn mode_registers() {
        let regs = dual_udimm_setup().compute(false).unwrap();
        let mode = SdramMode::new_with_raw_value(regs.sdram_mode);
        let mr0 = Ddr3Mr0::new_with_raw_value(mode.sdmode());
        assert!(mr0.dll_on());
        // 12 clocks write recovery
        assert_eq!(mr0.wr().value(), 6);
        // CL 11: 0xE
        assert_eq!(mr0.caslat_hi().value(), 7);
        assert!(!mr0.caslat_lo());
        assert_eq!(mr0.bl().value(), 1);
        assert_eq!(mode.sdmode(), 0x1C71);
        // RTT_Nom 120 ohm for CS0 of a dual DIMM population.
        assert_eq!(mode.esdmode(), 0x0040);

        let mode2 = SdramMode::new_with_raw_value(regs.sdram_mode_2);
        let mr2 = Ddr3Mr2::new_with_raw_value(mode2.esdmode());
        assert_eq!(mr2.cwl().value(), 3);
        assert_eq!(mr2.rtt_wr().value(), 0);
        assert_eq!(mode2.sdmode(), 0);

        // CS1: RTT_Nom 30 ohm (5).
        let mode3 = SdramMode::new_with_raw_value(regs.sdram_mode_3_to_8[0]);
        assert_eq!(mode3.esdmode(), 0x0204);
        assert_eq!(mode3.sdmode(), mode.sdmode());
        assert_eq!(regs.sdram_mode_3_to_8[2], regs.sdram_mode);
        assert_eq!(regs.sdram_mode_3_to_8[4], regs.sdram_mode_3_to_8[0]);
    }

    #[test]
    fn old_controllers_share_mode_registers() {
        let setup = dual_udimm_setup();
        let regs = compute_memctl_config_regs(
            &setup.ctx,
            &setup.opts,
            &setup.common,
            &setup.dimms,
            0,
            0x0004_0400,
            false,
        )
        .unwrap();
        assert_eq!(regs.sdram_mode_3_to_8, [0; 6]);
        assert!(!SdramCfg2::new_with_raw_value(regs.sdram_cfg_2).unq_mrs_en());
        // CL 11 encoded as 2 * CL - 1 = 21
        let cfg1 = TimingCfg1::new_with_raw_value(regs.timing_cfg_1);
        assert_eq!(cfg1.caslat_ctrl().value(), 5);
    }

    #[test]
    fn rtt_override_applies_to_all_chip_selects() {
        let mut setup = dual_udimm_setup();
        setup.opts.rtt_override = Some(Rtt::Ohm60);
        let regs = setup.compute(false).unwrap();
        for reg in [regs.sdram_mode, regs.sdram_mode_3_to_8[0], regs.sdram_mode_3_to_8[4]] {
            assert_eq!(SdramMode::new_with_raw_value(reg).esdmode(), 0x0004);
        }
    }

    #[test]
    fn clock_adjust_encoding() {
        let mut setup = dual_udimm_setup();
        setup.opts.clk_adjust = 4;
        let regs = setup.compute(false).unwrap();
        // Four bit field at bit 23.
        assert_eq!(regs.sdram_clk_cntl, 0x0200_0000);
        let regs = compute_memctl_config_regs(
            &setup.ctx,
            &setup.opts,
            &setup.common,
            &setup.dimms,
            0,
            IP_REV_CLK_ADJUST_5BIT,
            false,
        )
        .unwrap();
        assert_eq!(regs.sdram_clk_cntl, 0x0100_0000);
    }

    #[test]
    fn newer_controllers() {
        let mut setup = dual_udimm_setup();
        setup.opts.cswl_override = 3;
        let regs = compute_memctl_config_regs(
            &setup.ctx,
            &setup.opts,
            &setup.common,
            &setup.dimms,
            0,
            0x0004_0800,
            false,
        )
        .unwrap();
        assert_eq!(regs.debug[DEBUG_CSWL], 3);
        // tMOD = max(12 clocks, 15 ns)
        assert_eq!(TimingCfg0::new_with_raw_value(regs.timing_cfg_0).mrs_cyc().value(), 12);
    }

    #[test]
    fn odt_overlap() {
        let dimm = testutil::udimm_2r_4gib();
        let mut quad = dimm.clone();
        quad.n_ranks = 4;
        let mut single = dimm.clone();
        single.n_ranks = 1;
        assert_eq!(avoid_odt_overlap(&[quad.clone()]), 2);
        assert_eq!(avoid_odt_overlap(core::slice::from_ref(&dimm)), 0);
        assert_eq!(avoid_odt_overlap(&[dimm.clone(), dimm.clone()]), 2);
        assert_eq!(avoid_odt_overlap(&[dimm.clone(), single.clone()]), 1);
        assert_eq!(avoid_odt_overlap(&[single, DimmParams::default()]), 0);
        assert_eq!(avoid_odt_overlap(&[quad, DimmParams::default()]), 2);
    }

    #[test]
    fn odt_config_of_single_rank() {
        let mut setup = dual_udimm_setup();
        setup.opts.cs_local_opts = [Default::default(); CHIP_SELECTS];
        let regs = setup.compute(false).unwrap();
        assert_eq!(SdramCfg2::new_with_raw_value(regs.sdram_cfg_2).odt_cfg().value(), 0);
        let config = CsConfig::new_with_raw_value(regs.cs[0].config);
        assert_eq!(config.odt_wr_cfg(), OdtConfig::Never);
    }

    #[test]
    fn rcw_packing() {
        assert_eq!(pack_rcw(&[0xF, 0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7]), 0xF123_4567);
    }
}
