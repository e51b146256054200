//! # DDR3 SDRAM controller configuration
//!
//! The configuration is computed in stages, see [Stage]:
//!
//! 1. The SPD EEPROM of every DIMM slot is read.
//! 2. The SPD images are decoded into [spd::DimmParams].
//! 3. The parameters of all DIMMs of a controller are reconciled into the
//!    [common::CommonTimingParams].
//! 4. The controller options are derived from the DIMM population and the board, see
//!    [options].
//! 5. Physical addresses are assigned to the DIMMs, see [addr].
//! 6. The register values are computed, see [ctrl_regs].
//!
//! [DdrInit::fsl_ddr_sdram] runs all stages and programs the controllers with [ll].
//!
//! ## Example
//!
//! ```ignore
//! let spd = I2cSpdSource::new(i2c, [[Some(0x51), None], [None; 2], [None; 2]]);
//! let mut ddr = DdrInit::new(
//!     LS1043A_PLATFORM,
//!     Hertz::from_raw(1_600_000_000),
//!     spd,
//!     NotConfigured,
//!     LS1043ARDB_BOARD_OPTIONS,
//!     NoBoardReset,
//! );
//! // Safety: The DDR controller is only accessed here.
//! let mut mmio = unsafe { BigEndianMmio::steal() };
//! let outcome = ddr.fsl_ddr_sdram(&mut mmio, &mut delay);
//! ```
use ls1043a::ddrc::regs::CsBounds;

use crate::time::Hertz;

pub mod addr;
pub mod board;
pub mod clock;
pub mod common;
pub mod config;
pub mod ctrl_regs;
pub mod io;
pub mod ll;
pub mod options;
pub mod spd;
pub mod warning;

#[cfg(test)]
mod testutil;

pub use config::{DdrPlatformConfig, LS1043A_PLATFORM, MAX_CONTROLLERS, MAX_DIMM_SLOTS};
pub use warning::{Warning, Warnings};

use board::BoardOptions;
use clock::ClockContext;
use common::CommonTimingParams;
use ctrl_regs::{FslDdrCfgRegs, RegsError};
use io::{BoardHooks, RegisterIo, SpdSource};
use ll::{ProgramState, ProgramStep};
use options::{InterleaveSource, MemctlOptions};
use spd::{Ddr3Spd, DimmParams, SpdError};

/// Stages of the configuration computation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    GetSpd,
    ComputeDimmParams,
    ComputeCommonParams,
    GatherOptions,
    AssignAddresses,
    ComputeRegs,
    Done,
}

impl Stage {
    pub const fn next(self) -> Self {
        match self {
            Stage::GetSpd => Stage::ComputeDimmParams,
            Stage::ComputeDimmParams => Stage::ComputeCommonParams,
            Stage::ComputeCommonParams => Stage::GatherOptions,
            Stage::GatherOptions => Stage::AssignAddresses,
            Stage::AssignAddresses => Stage::ComputeRegs,
            Stage::ComputeRegs | Stage::Done => Stage::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DdrError {
    #[error("uncorrectable SPD on controller {ctrl} slot {slot}: {error}")]
    UncorrectableSpd {
        ctrl: usize,
        slot: usize,
        error: SpdError,
    },
}

/// State of the configuration computation of all controllers.
#[derive(Debug, Clone)]
pub struct DdrInfo {
    pub platform: DdrPlatformConfig,
    pub spd: [[Ddr3Spd; MAX_DIMM_SLOTS]; MAX_CONTROLLERS],
    pub dimms: [[DimmParams; MAX_DIMM_SLOTS]; MAX_CONTROLLERS],
    pub common: [CommonTimingParams; MAX_CONTROLLERS],
    pub opts: [MemctlOptions; MAX_CONTROLLERS],
    pub regs: [FslDdrCfgRegs; MAX_CONTROLLERS],
    pub dbw_capacity_adjust: [u32; MAX_CONTROLLERS],
    /// Controller IP revisions, see [ll::read_ip_version].
    pub ip_version: [u32; MAX_CONTROLLERS],
    /// Registered DIMMs are installed, the memory reset must be held during programming.
    pub assert_reset: bool,
    pub warnings: Warnings,
}

impl DdrInfo {
    pub fn new(platform: DdrPlatformConfig) -> Self {
        Self {
            platform,
            spd: Default::default(),
            dimms: Default::default(),
            common: Default::default(),
            opts: Default::default(),
            regs: Default::default(),
            dbw_capacity_adjust: [0; MAX_CONTROLLERS],
            ip_version: [0; MAX_CONTROLLERS],
            assert_reset: false,
            warnings: Warnings::new(),
        }
    }

    /// Memory size derived from the highest end address of all enabled chip selects.
    pub fn total_memory(&self) -> u64 {
        let max_end = self.regs[..self.platform.controllers()]
            .iter()
            .flat_map(|regs| regs.cs.iter())
            .filter(|cs| cs.enabled() && cs.bnds != CsBounds::INACTIVE)
            .map(|cs| CsBounds::new_with_raw_value(cs.bnds).end_addr())
            .max();
        match max_end {
            Some(end) => (((end as u64) << 24) | 0xFF_FFFF)
                .saturating_add(1)
                .saturating_sub(self.platform.sdram_base),
            None => 0,
        }
    }
}

/// Result of [DdrInit::fsl_ddr_sdram].
#[derive(Debug, Clone)]
pub struct DdrInitOutcome {
    /// Usable memory in bytes.
    pub total_memory: u64,
    pub states: [ProgramState; MAX_CONTROLLERS],
    pub warnings: Warnings,
    /// The computation was aborted and no controller was programmed.
    pub error: Option<DdrError>,
}

/// DDR initialization driver.
pub struct DdrInit<S, I, B, H> {
    info: DdrInfo,
    ctx: ClockContext,
    spd_source: S,
    interleave: I,
    board: B,
    hooks: H,
}

impl<S: SpdSource, I: InterleaveSource, B: BoardOptions, H: BoardHooks> DdrInit<S, I, B, H> {
    /// Create the driver for a DDR data rate, which is twice the memory clock.
    pub fn new(
        platform: DdrPlatformConfig,
        data_rate: Hertz,
        spd_source: S,
        interleave: I,
        board: B,
        hooks: H,
    ) -> Self {
        Self {
            info: DdrInfo::new(platform),
            ctx: ClockContext::new(data_rate),
            spd_source,
            interleave,
            board,
            hooks,
        }
    }

    #[inline]
    pub fn info(&self) -> &DdrInfo {
        &self.info
    }

    /// Mutable access to the computation state, for example to adjust the options before
    /// resuming at [Stage::ComputeRegs].
    #[inline]
    pub fn info_mut(&mut self) -> &mut DdrInfo {
        &mut self.info
    }

    #[inline]
    pub fn clock(&self) -> &ClockContext {
        &self.ctx
    }

    /// Run all stages starting at `stage` and return the memory size.
    ///
    /// With `size_only`, only the chip select registers are computed.
    pub fn run_from(&mut self, stage: Stage, size_only: bool) -> Result<u64, DdrError> {
        let mut stage = stage;
        while stage != Stage::Done {
            log::debug!("DDR: stage {:?}", stage);
            self.run_stage(stage, size_only)?;
            stage = stage.next();
        }
        Ok(self.info.total_memory())
    }

    fn run_stage(&mut self, stage: Stage, size_only: bool) -> Result<(), DdrError> {
        match stage {
            Stage::GetSpd => self.get_spd(),
            Stage::ComputeDimmParams => self.compute_dimm_params()?,
            Stage::ComputeCommonParams => self.compute_common_params(),
            Stage::GatherOptions => self.gather_options(),
            Stage::AssignAddresses => {
                addr::check_interleaving_options(&mut self.info);
                let total = addr::assign_addresses(&mut self.info);
                log::debug!("DDR: {:#x} bytes assigned", total);
            }
            Stage::ComputeRegs => self.compute_regs(size_only),
            Stage::Done => (),
        }
        Ok(())
    }

    fn get_spd(&mut self) {
        let info = &mut self.info;
        for ctrl in 0..info.platform.controllers() {
            for slot in 0..info.platform.slots() {
                let spd = &mut info.spd[ctrl][slot];
                *spd = Ddr3Spd::zeroed();
                if let Err(e) = self.spd_source.read_spd(ctrl, slot, spd.raw_mut()) {
                    log::debug!("DDR{}: SPD read of slot {} failed: {:?}", ctrl, slot, e);
                    *spd = Ddr3Spd::zeroed();
                    info.warnings.push(Warning::SpdReadFailed { ctrl, slot });
                }
            }
        }
    }

    fn compute_dimm_params(&mut self) -> Result<(), DdrError> {
        let info = &mut self.info;
        for ctrl in 0..info.platform.controllers() {
            for slot in 0..info.platform.slots() {
                info.dimms[ctrl][slot] = match spd::decode_ddr3_spd(&info.spd[ctrl][slot]) {
                    Ok(dimm) => {
                        log::info!(
                            "DDR{}: slot {}: {} MiB, {} rank(s), {} bit",
                            ctrl,
                            slot,
                            dimm.capacity >> 20,
                            dimm.n_ranks,
                            dimm.data_width
                        );
                        dimm
                    }
                    Err(SpdError::Empty) => DimmParams::default(),
                    Err(error) if error.is_fatal() => {
                        match info.platform.raw_timing_fallback.filter(|_| slot == 0) {
                            Some(fallback) => {
                                info.warnings.push(Warning::RawTimingFallback { ctrl, slot });
                                fallback.clone()
                            }
                            None => {
                                log::error!("DDR{}: slot {}: {}", ctrl, slot, error);
                                return Err(DdrError::UncorrectableSpd { ctrl, slot, error });
                            }
                        }
                    }
                    Err(error) => {
                        info.warnings.push(Warning::SpdUnusable { ctrl, slot, error });
                        DimmParams::default()
                    }
                };
            }
        }
        Ok(())
    }

    fn compute_common_params(&mut self) {
        let info = &mut self.info;
        let slots = info.platform.slots();
        for ctrl in 0..info.platform.controllers() {
            info.common[ctrl] = match common::compute_lowest_common_dimm_parameters(
                &self.ctx,
                &info.dimms[ctrl][..slots],
                &info.platform,
                ctrl,
                &mut info.warnings,
            ) {
                Ok(common) => common,
                Err(error) => {
                    info.warnings.push(Warning::ControllerSkipped { ctrl, error });
                    CommonTimingParams::default()
                }
            };
        }
    }

    fn gather_options(&mut self) {
        let info = &mut self.info;
        let slots = info.platform.slots();
        info.assert_reset = false;
        for ctrl in 0..info.platform.controllers() {
            info.opts[ctrl] = options::populate_memctl_options(
                &self.ctx,
                &info.common[ctrl],
                &info.dimms[ctrl][..slots],
                ctrl,
                &info.platform,
                &self.interleave,
                &self.board,
                &mut info.warnings,
            );
            // Registered DIMMs need stable clocks before the reset is released.
            if info.common[ctrl].all_dimms_registered {
                info.assert_reset = true;
            }
        }
    }

    fn compute_regs(&mut self, size_only: bool) {
        let info = &mut self.info;
        let slots = info.platform.slots();
        if !size_only && self.ctx.cas_write_latency_is_fallback() {
            info.warnings.push(Warning::CasWriteLatencyFallback {
                mclk_ps: self.ctx.mclk_period_ps(),
            });
        }
        for ctrl in 0..info.platform.controllers() {
            if info.common[ctrl].ndimms_present == 0 {
                log::debug!("DDR{}: no DIMMs, skipping", ctrl);
                info.regs[ctrl] = FslDdrCfgRegs::default();
                continue;
            }
            let result = ctrl_regs::compute_memctl_config_regs(
                &self.ctx,
                &info.opts[ctrl],
                &info.common[ctrl],
                &info.dimms[ctrl][..slots],
                info.dbw_capacity_adjust[ctrl],
                info.ip_version[ctrl],
                size_only,
            );
            info.regs[ctrl] = match result {
                Ok(regs) => regs,
                Err(RegsError::InvalidConfig { count, regs }) => {
                    info.warnings.push(Warning::InvalidRegisterConfig { ctrl, count });
                    regs
                }
                Err(RegsError::NoCommonTiming) => FslDdrCfgRegs::default(),
            };
        }
    }

    /// Compute the memory size without programming the controllers.
    pub fn sdram_size(&mut self) -> Result<u64, DdrError> {
        self.info = DdrInfo::new(self.info.platform);
        self.run_from(Stage::GetSpd, true)
    }

    /// Configure and enable all controllers and return the usable memory.
    ///
    /// Failures never abort the boot. An uncorrectable SPD leaves the controllers unprogrammed
    /// and reports no memory.
    pub fn fsl_ddr_sdram<IO: RegisterIo, D: embedded_hal::delay::DelayNs>(
        &mut self,
        io: &mut IO,
        delay: &mut D,
    ) -> DdrInitOutcome {
        let platform = self.info.platform;
        let controllers = platform.controllers();
        self.info = DdrInfo::new(platform);
        for ctrl in 0..controllers {
            self.info.ip_version[ctrl] = ll::read_ip_version(io, platform.ctrl_base_addrs[ctrl]);
            log::debug!("DDR{}: IP revision {:#08x}", ctrl, self.info.ip_version[ctrl]);
        }

        let mut states = [ProgramState::NotProgrammed; MAX_CONTROLLERS];
        let computed = self
            .run_from(Stage::GetSpd, true)
            .and_then(|_| self.run_from(Stage::ComputeRegs, false));
        let mut total_memory = match computed {
            Ok(total) => total,
            Err(error) => {
                log::error!("DDR: configuration failed: {}", error);
                return DdrInitOutcome {
                    total_memory: 0,
                    states,
                    warnings: core::mem::take(&mut self.info.warnings),
                    error: Some(error),
                };
            }
        };

        if let (Some(mode), Some(intl3r_addr)) =
            (self.info.opts[0].memctl_interleaving, platform.intl3r_addr)
        {
            if mode.ways() == 3 {
                ll::enable_3way_interleaving(io, intl3r_addr, mode);
            }
        }

        let staged = self.info.assert_reset || self.hooks.need_mem_reset();
        if staged {
            log::debug!("DDR: asserting memory reset");
            self.hooks.assert_mem_reset();
        }
        let first_step = if staged {
            ProgramStep::WriteOnly
        } else {
            ProgramStep::Full
        };
        for ctrl in 0..controllers {
            states[ctrl] = self.program(io, delay, ctrl, first_step);
        }
        if staged {
            log::debug!("DDR: releasing memory reset");
            self.hooks.deassert_mem_reset();
            for ctrl in 0..controllers {
                if states[ctrl] == ProgramState::RegistersWritten {
                    states[ctrl] = self.program(io, delay, ctrl, ProgramStep::EnableOnly);
                }
            }
        }

        if !platform.phys_64bit && total_memory >= 1 << 32 {
            let clamped = platform.max_mem_mapped;
            self.info.warnings.push(Warning::MemoryClamped {
                total: total_memory,
                clamped,
            });
            total_memory = clamped;
        }
        log::info!("DDR: {} MiB", total_memory >> 20);

        DdrInitOutcome {
            total_memory,
            states,
            warnings: core::mem::take(&mut self.info.warnings),
            error: None,
        }
    }

    fn program<IO: RegisterIo, D: embedded_hal::delay::DelayNs>(
        &mut self,
        io: &mut IO,
        delay: &mut D,
        ctrl: usize,
        step: ProgramStep,
    ) -> ProgramState {
        if self.info.common[ctrl].ndimms_present == 0 {
            log::debug!("DDR{}: not programmed, no DIMMs", ctrl);
            return ProgramState::NotProgrammed;
        }
        ll::set_memctl_regs(
            io,
            delay,
            self.info.platform.ctrl_base_addrs[ctrl],
            &self.info.regs[ctrl],
            &self.ctx,
            step,
            self.info.platform.intl3r_addr,
            ctrl,
            &mut self.info.warnings,
        )
    }
}
