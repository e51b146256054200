//! Low level programming of the DDR controller registers.
//!
//! The controller is programmed in two steps. The first step writes all registers with the
//! controller disabled, the second step enables it and waits for the automatic data
//! initialization. Boards with registered DIMMs release the memory reset between the two steps.
use embedded_hal::delay::DelayNs;
use ls1043a::ddrc::{
    cs_config, intl3r,
    offsets::{self, CS_BNDS, CS_CONFIG, CS_CONFIG_2},
    regs::CsConfig,
    sdram_cfg, sdram_cfg_2,
};

use super::{
    clock::ClockContext,
    ctrl_regs::FslDdrCfgRegs,
    io::RegisterIo,
    options::ControllerInterleave,
    warning::{Warning, Warnings},
};

/// Clock stabilization time after writing the configuration.
const CLOCK_STABLE_US: u32 = 200;
/// Interval between two polls of the data initialization bit.
const D_INIT_POLL_INTERVAL_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStep {
    /// Write the registers and enable the controller.
    Full,
    /// Only write the registers, leaving the controller disabled.
    WriteOnly,
    /// Only enable a controller whose registers were written before.
    EnableOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    NotProgrammed,
    RegistersWritten,
    Enabled,
}

/// Read the IP revision of the controller at `base` as `0xMMmmee` (major, minor, errata).
pub fn read_ip_version<IO: RegisterIo>(io: &mut IO, base: usize) -> u32 {
    let major_minor = io.read32(base + offsets::IP_REV1) & 0xFFFF;
    let errata = (io.read32(base + offsets::IP_REV2) & 0xFF00) >> 8;
    (major_minor << 8) | errata
}

/// Enable 3-way interleaving with the granule of the given mode.
pub fn enable_3way_interleaving<IO: RegisterIo>(
    io: &mut IO,
    intl3r_addr: usize,
    mode: ControllerInterleave,
) {
    let value = intl3r::ENABLE | (u8::from(mode) as u32 & intl3r::MODE_MASK);
    log::debug!("DDR: INTL3R {:#010x}", value);
    io.write32(intl3r_addr, value);
}

fn write_registers<IO: RegisterIo>(io: &mut IO, base: usize, regs: &FslDdrCfgRegs) {
    let mut out = |offset: usize, value: u32| io.write32(base + offset, value);

    if regs.eor != 0 {
        out(offsets::EOR, regs.eor);
    }
    for (i, cs) in regs.cs.iter().enumerate() {
        out(CS_BNDS[i], cs.bnds);
        out(CS_CONFIG[i], cs.config);
        out(CS_CONFIG_2[i], cs.config_2);
    }
    out(offsets::TIMING_CFG_3, regs.timing_cfg_3);
    out(offsets::TIMING_CFG_0, regs.timing_cfg_0);
    out(offsets::TIMING_CFG_1, regs.timing_cfg_1);
    out(offsets::TIMING_CFG_2, regs.timing_cfg_2);
    out(offsets::SDRAM_MODE, regs.sdram_mode);
    out(offsets::SDRAM_MODE_2, regs.sdram_mode_2);
    for (offset, value) in offsets::SDRAM_MODE_3_TO_8
        .iter()
        .zip(regs.sdram_mode_3_to_8.iter())
    {
        out(*offset, *value);
    }
    out(offsets::SDRAM_MD_CNTL, regs.sdram_md_cntl);
    out(offsets::SDRAM_INTERVAL, regs.sdram_interval);
    out(offsets::SDRAM_DATA_INIT, regs.sdram_data_init);
    out(offsets::SDRAM_CLK_CNTL, regs.sdram_clk_cntl);
    out(offsets::TIMING_CFG_4, regs.timing_cfg_4);
    out(offsets::TIMING_CFG_5, regs.timing_cfg_5);
    out(offsets::ZQ_CNTL, regs.zq_cntl);
    out(offsets::WRLVL_CNTL, regs.wrlvl_cntl);
    if regs.wrlvl_cntl_2 != 0 {
        out(offsets::WRLVL_CNTL_2, regs.wrlvl_cntl_2);
    }
    if regs.wrlvl_cntl_3 != 0 {
        out(offsets::WRLVL_CNTL_3, regs.wrlvl_cntl_3);
    }
    out(offsets::SR_CNTR, regs.sr_cntr);
    out(offsets::SDRAM_RCW_1, regs.sdram_rcw_1);
    out(offsets::SDRAM_RCW_2, regs.sdram_rcw_2);
    out(offsets::CDR1, regs.cdr1);
    out(offsets::CDR2, regs.cdr2);
    out(offsets::ERR_DISABLE, regs.err_disable);
    out(offsets::ERR_INT_EN, regs.err_int_en);
    for (i, value) in regs.debug.iter().enumerate() {
        if *value != 0 {
            out(offsets::DEBUG + 4 * i, *value);
        }
    }
    out(offsets::SDRAM_INIT_ADDR, regs.sdram_init_addr);
    out(offsets::SDRAM_INIT_ADDR_EXT, regs.sdram_init_addr_ext);
    // Configured, but not enabled yet.
    out(offsets::SDRAM_CFG, regs.sdram_cfg & !sdram_cfg::MEM_EN);
    out(offsets::SDRAM_CFG_2, regs.sdram_cfg_2);
}

/// Memory behind the enabled chip selects in units of 64 MiB.
fn controller_size_64m(regs: &FslDdrCfgRegs, three_way: bool) -> u64 {
    let dbw = (regs.sdram_cfg & sdram_cfg::DBW_MASK) >> sdram_cfg::DBW_SHIFT;
    let mut size = 0u64;
    for cs in regs.cs.iter().filter(|cs| cs.enabled()) {
        let config = CsConfig::new_with_raw_value(cs.config);
        let bits = config.ba_bits().value() as u32
            + 2
            + config.row_bits().value() as u32
            + 12
            + config.col_bits().value() as u32
            + 8
            + 3;
        size += 1 << bits.saturating_sub(dbw + 26);
    }
    if three_way {
        size *= 3;
    } else if regs.cs[0].config & cs_config::INTLV_2WAY != 0 {
        size <<= 1;
    }
    size
}

/// Number of [D_INIT_POLL_INTERVAL_MS] polls to wait for the data initialization.
///
/// The initialization writes the whole memory once, twice the transfer time of the memory size
/// at the data rate is allowed.
fn d_init_timeout(size_64m: u64, regs: &FslDdrCfgRegs, ctx: &ClockContext) -> u64 {
    let dbw = ((regs.sdram_cfg & sdram_cfg::DBW_MASK) >> sdram_cfg::DBW_SHIFT) as u64;
    let bus_width = 3u64.saturating_sub(dbw);
    let rate_mib = (ctx.data_rate().raw() >> 20).max(1) as u64;
    ((size_64m << (6 - bus_width)) * 100 / rate_mib) * 2
}

/// Program the controller at `base`.
///
/// A data initialization which does not complete within the computed timeout is recorded as
/// [Warning::DataInitTimeout], the controller is left enabled.
#[allow(clippy::too_many_arguments)]
pub fn set_memctl_regs<IO: RegisterIo, D: DelayNs>(
    io: &mut IO,
    delay: &mut D,
    base: usize,
    regs: &FslDdrCfgRegs,
    ctx: &ClockContext,
    step: ProgramStep,
    intl3r_addr: Option<usize>,
    ctrl: usize,
    warnings: &mut Warnings,
) -> ProgramState {
    if step != ProgramStep::EnableOnly {
        write_registers(io, base, regs);
        delay.delay_us(CLOCK_STABLE_US);
        io.fence();
        if step == ProgramStep::WriteOnly {
            log::debug!("DDR{}: registers written, controller disabled", ctrl);
            return ProgramState::RegistersWritten;
        }
    }

    io.fence();
    let cfg = io.read32(base + offsets::SDRAM_CFG) & !sdram_cfg::BI;
    io.write32(base + offsets::SDRAM_CFG, cfg);
    io.fence();
    io.write32(base + offsets::SDRAM_CFG, cfg | sdram_cfg::MEM_EN);
    io.fence();

    let three_way = intl3r_addr.is_some_and(|addr| io.read32(addr) & intl3r::ENABLE != 0);
    let size_64m = controller_size_64m(regs, three_way);
    let mut timeout = d_init_timeout(size_64m, regs, ctx);
    log::debug!(
        "DDR{}: {} MiB, waiting up to {} * {} ms for data init",
        ctrl,
        size_64m * 64,
        timeout,
        D_INIT_POLL_INTERVAL_MS
    );

    loop {
        if io.read32(base + offsets::SDRAM_CFG_2) & sdram_cfg_2::D_INIT == 0 {
            break;
        }
        if timeout == 0 {
            warnings.push(Warning::DataInitTimeout { ctrl });
            break;
        }
        delay.delay_ms(D_INIT_POLL_INTERVAL_MS);
        timeout -= 1;
    }
    ProgramState::Enabled
}
