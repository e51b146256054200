//! Platform configuration of the DDR subsystem.
use ls1043a::ddrc::{CHIP_SELECTS, DDRC_BASE_ADDR, SDRAM_BASE_ADDR};

use super::spd::DimmParams;

/// Maximum number of DDR controllers supported by the data structures.
pub const MAX_CONTROLLERS: usize = 3;
/// Maximum number of DIMM slots per controller supported by the data structures.
pub const MAX_DIMM_SLOTS: usize = 2;
/// Chip selects per controller.
pub const CHIP_SELECTS_PER_CTRL: usize = CHIP_SELECTS;

/// Static description of the DDR subsystem of a platform.
#[derive(Debug, Clone, Copy)]
pub struct DdrPlatformConfig {
    /// Number of populated DDR controllers, at most [MAX_CONTROLLERS].
    pub num_controllers: usize,
    /// DIMM slots per controller, at most [MAX_DIMM_SLOTS].
    pub dimm_slots_per_ctrl: usize,
    /// Slot 0 can hold a quad-rank DIMM using all chip selects.
    pub first_slot_quad_capable: bool,
    /// Register base addresses of the controllers.
    pub ctrl_base_addrs: [usize; MAX_CONTROLLERS],
    /// Physical base address of the SDRAM.
    pub sdram_base: u64,
    /// The platform can address more than 4 GiB.
    pub phys_64bit: bool,
    /// Memory size reported when [Self::phys_64bit] is not set and at least 4 GiB are installed.
    pub max_mem_mapped: u64,
    /// 3-way interleaving control register, if the platform supports 3-way interleaving.
    pub intl3r_addr: Option<usize>,
    /// DIMM parameters used for slot 0 when its SPD fails the CRC check.
    pub raw_timing_fallback: Option<&'static DimmParams>,
}

impl DdrPlatformConfig {
    /// Number of controllers, clamped to the supported maximum.
    #[inline]
    pub fn controllers(&self) -> usize {
        self.num_controllers.min(MAX_CONTROLLERS)
    }

    /// Number of DIMM slots per controller, clamped to the supported range.
    #[inline]
    pub fn slots(&self) -> usize {
        self.dimm_slots_per_ctrl.clamp(1, MAX_DIMM_SLOTS)
    }

    /// Chip selects assigned to each DIMM slot.
    #[inline]
    pub fn cs_per_dimm(&self) -> usize {
        CHIP_SELECTS_PER_CTRL / self.slots()
    }
}

/// LS1043A: one DDR3 controller with a single DIMM slot.
pub const LS1043A_PLATFORM: DdrPlatformConfig = DdrPlatformConfig {
    num_controllers: 1,
    dimm_slots_per_ctrl: 1,
    first_slot_quad_capable: true,
    ctrl_base_addrs: [DDRC_BASE_ADDR, 0, 0],
    sdram_base: SDRAM_BASE_ADDR,
    phys_64bit: true,
    max_mem_mapped: 0x8000_0000,
    intl3r_addr: None,
    raw_timing_fallback: None,
};
