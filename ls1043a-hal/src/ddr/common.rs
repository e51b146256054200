//! Reconciliation of the DIMM parameters of one controller into a common timing set.
use super::{
    clock::ClockContext,
    config::DdrPlatformConfig,
    spd::DimmParams,
    warning::{Warning, Warnings},
};

/// Maximum tAA of all DDR3 speed grades.
pub const TAA_MAX_PS: u32 = 20_000;

/// Number of CAS latencies above the computed minimum which are tried.
const CAS_LATENCY_RETRIES: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimingError {
    #[error("memory clock period is zero")]
    InvalidClock,
    #[error("no common CAS latency at or above {min_caslat} in mask {mask:#x}")]
    NoCommonCasLatency { mask: u32, min_caslat: u32 },
    #[error("additive latency of {al_ps} ps exceeds tRCD of {trcd_ps} ps")]
    AdditiveLatencyExceedsTrcd { al_ps: u32, trcd_ps: u32 },
}

/// Worst case timing parameters of all DIMMs on a controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommonTimingParams {
    pub tckmin_x_ps: u32,
    /// 0 means unbounded.
    pub tckmax_ps: u32,
    pub taa_ps: u32,
    pub trcd_ps: u32,
    pub trp_ps: u32,
    pub tras_ps: u32,
    pub twr_ps: u32,
    pub twtr_ps: u32,
    pub trfc_ps: u32,
    pub trrd_ps: u32,
    pub trtp_ps: u32,
    pub trc_ps: u32,
    pub tfaw_ps: u32,
    pub refresh_rate_ps: u32,
    pub extended_op_srt: bool,

    pub ndimms_present: u32,
    pub all_dimms_registered: bool,
    pub all_dimms_unbuffered: bool,
    pub all_dimms_ecc_capable: bool,
    pub all_dimms_burst_lengths_bitmask: u32,
    pub rcw: [u8; 16],

    /// CAS latency in clocks.
    pub lowest_common_spd_caslat: u32,
    /// Additive latency in clocks.
    pub additive_latency: u32,

    /// Assigned by the address assignment.
    pub base_address: u64,
    pub total_mem: u64,
}

/// Whether the DIMM in the given slot takes part in the controller configuration.
fn dimm_usable(
    dimm: &DimmParams,
    slot: usize,
    platform: &DdrPlatformConfig,
    ctrl: usize,
    warnings: &mut Warnings,
) -> bool {
    if dimm.is_empty() {
        return false;
    }
    if dimm.is_quad_rank()
        && (slot != 0 || (platform.cs_per_dimm() < 4 && !platform.first_slot_quad_capable))
    {
        warnings.push(Warning::QuadRankDimmIgnored { ctrl, slot });
        return false;
    }
    true
}

/// Compute the common timing parameters of the DIMMs installed on one controller.
///
/// Empty slots and quad-rank DIMMs the platform can not address are skipped. If no DIMM remains,
/// the result has [CommonTimingParams::ndimms_present] set to 0 and the controller is not
/// configured.
pub fn compute_lowest_common_dimm_parameters(
    ctx: &ClockContext,
    dimms: &[DimmParams],
    platform: &DdrPlatformConfig,
    ctrl: usize,
    warnings: &mut Warnings,
) -> Result<CommonTimingParams, TimingError> {
    let mut common = CommonTimingParams {
        extended_op_srt: true,
        all_dimms_ecc_capable: true,
        all_dimms_burst_lengths_bitmask: 0xFF,
        ..Default::default()
    };
    let mut tckmax_ps = u32::MAX;
    let mut registered = false;
    let mut unbuffered = false;
    let mut first: Option<&DimmParams> = None;
    let mut rcw_mismatch = false;
    let mut caslat_mask = u32::MAX;

    for (slot, dimm) in dimms.iter().enumerate() {
        if !dimm_usable(dimm, slot, platform, ctrl, warnings) {
            continue;
        }
        common.ndimms_present += 1;

        if dimm.tckmax_ps != 0 {
            tckmax_ps = tckmax_ps.min(dimm.tckmax_ps);
        }
        common.tckmin_x_ps = common.tckmin_x_ps.max(dimm.tckmin_x_ps);
        common.taa_ps = common.taa_ps.max(dimm.taa_ps);
        common.trcd_ps = common.trcd_ps.max(dimm.trcd_ps);
        common.trp_ps = common.trp_ps.max(dimm.trp_ps);
        common.tras_ps = common.tras_ps.max(dimm.tras_ps);
        common.twr_ps = common.twr_ps.max(dimm.twr_ps);
        common.twtr_ps = common.twtr_ps.max(dimm.twtr_ps);
        common.trfc_ps = common.trfc_ps.max(dimm.trfc_ps);
        common.trrd_ps = common.trrd_ps.max(dimm.trrd_ps);
        common.trtp_ps = common.trtp_ps.max(dimm.trtp_ps);
        common.trc_ps = common.trc_ps.max(dimm.trc_ps);
        common.tfaw_ps = common.tfaw_ps.max(dimm.tfaw_ps);
        common.refresh_rate_ps = common.refresh_rate_ps.max(dimm.refresh_rate_ps);
        common.extended_op_srt &= dimm.extended_op_srt;
        common.all_dimms_ecc_capable &= dimm.ecc_capable;
        common.all_dimms_burst_lengths_bitmask &= dimm.burst_lengths_bitmask;
        caslat_mask &= dimm.caslat_x;

        if dimm.registered_dimm {
            registered = true;
            log::info!("DDR{}: slot {}: RDIMM {}", ctrl, slot, dimm.mpart);
        } else {
            unbuffered = true;
            log::info!("DDR{}: slot {}: UDIMM {}", ctrl, slot, dimm.mpart);
        }
        match first {
            None => first = Some(dimm),
            Some(reference) => rcw_mismatch |= reference.rcw != dimm.rcw,
        }
    }

    if common.ndimms_present == 0 {
        log::debug!("DDR{}: no DIMMs present", ctrl);
        return Ok(CommonTimingParams::default());
    }
    common.tckmax_ps = if tckmax_ps == u32::MAX { 0 } else { tckmax_ps };

    common.all_dimms_registered = registered && !unbuffered;
    common.all_dimms_unbuffered = unbuffered && !registered;
    if registered && unbuffered {
        warnings.push(Warning::MixedDimmTypes { ctrl });
    }
    if common.all_dimms_registered {
        if let Some(reference) = first {
            common.rcw = reference.rcw;
        }
        if rcw_mismatch {
            warnings.push(Warning::RdimmControlWordMismatch { ctrl });
        }
    }

    common.lowest_common_spd_caslat =
        compute_cas_latency_ddr3(ctx, caslat_mask, &common, ctrl, warnings)?;

    // Page mode without posted CAS.
    common.additive_latency = 0;
    let al_ps = ctx.mclk_to_picos(common.additive_latency);
    if al_ps > common.trcd_ps {
        return Err(TimingError::AdditiveLatencyExceedsTrcd {
            al_ps,
            trcd_ps: common.trcd_ps,
        });
    }

    log::debug!("DDR{}: common timing {:?}", ctrl, common);
    Ok(common)
}

/// Select the lowest CAS latency which satisfies tAA at the current clock and is supported by
/// every DIMM.
///
/// `caslat_mask` is the AND of the CAS latency masks of the DIMMs, bit n set for CL n.
pub fn compute_cas_latency_ddr3(
    ctx: &ClockContext,
    caslat_mask: u32,
    common: &CommonTimingParams,
    ctrl: usize,
    warnings: &mut Warnings,
) -> Result<u32, TimingError> {
    let mclk_ps = ctx.mclk_period_ps();
    if mclk_ps == 0 {
        return Err(TimingError::InvalidClock);
    }
    if mclk_ps < common.tckmin_x_ps {
        warnings.push(Warning::ClockFasterThanDimm {
            ctrl,
            mclk_ps,
            tckmin_ps: common.tckmin_x_ps,
        });
    }

    let min_caslat = common.taa_ps.div_ceil(mclk_ps);
    let supported = |cl: u32| cl < u32::BITS && caslat_mask & (1 << cl) != 0;
    let caslat = (min_caslat..=min_caslat.saturating_add(CAS_LATENCY_RETRIES))
        .find(|&cl| supported(cl))
        .ok_or(TimingError::NoCommonCasLatency {
            mask: caslat_mask,
            min_caslat,
        })?;

    if caslat.saturating_mul(mclk_ps) > TAA_MAX_PS {
        warnings.push(Warning::CasLatencyExceedsTaaMax { ctrl, caslat });
    }
    log::debug!("DDR{}: CAS latency {} (minimum {})", ctrl, caslat, min_caslat);
    Ok(caslat)
}
