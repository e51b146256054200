//! Physical address assignment of the DIMMs.
use ls1043a::ddrc::regs::DataBusWidth;

use super::{
    DdrInfo,
    common::CommonTimingParams,
    options::{BankInterleave, MemctlOptions},
    spd::DimmParams,
    warning::Warning,
};

/// Disable controller interleaving on all controllers unless every interleaving controller has
/// the geometry of controller 0 and the number of interleaving controllers matches the mode.
pub fn check_interleaving_options(info: &mut DdrInfo) {
    let controllers = info.platform.controllers();
    let reference = &info.dimms[0][0];
    let mode = info.opts[0].memctl_interleaving;

    let mut interleaving = 0;
    let mut invalid = false;
    for ctrl in 0..controllers {
        let opts = &info.opts[ctrl];
        if opts.memctl_interleaving.is_none() {
            continue;
        }
        let dimm = &info.dimms[ctrl][0];
        if dimm.rank_density != reference.rank_density
            || dimm.n_ranks != reference.n_ranks
            || dimm.n_row_addr != reference.n_row_addr
            || dimm.n_col_addr != reference.n_col_addr
            || opts.memctl_interleaving != mode
        {
            invalid = true;
            break;
        }
        interleaving += 1;
    }

    if !invalid {
        let required = match mode {
            Some(mode) if mode.ways() == 2 => {
                if controllers == 3 {
                    2
                } else {
                    controllers
                }
            }
            Some(mode) => mode.ways(),
            None => controllers,
        };
        log::debug!(
            "DDR: {} of {} controllers are interleaving",
            interleaving,
            required
        );
        invalid = interleaving != 0 && interleaving != required;
    }

    if invalid {
        for opts in info.opts.iter_mut().take(controllers) {
            opts.memctl_interleaving = None;
        }
        info.warnings.push(Warning::ControllerInterleavingDisabled);
    }
}

/// Capacity shift for a controller running a narrower data bus than its DIMMs provide.
pub fn compute_dbw_capacity_adjust(opts: &MemctlOptions, dimms: &[DimmParams]) -> u32 {
    match opts.data_bus_width {
        DataBusWidth::_16Bit => {
            let width = dimms
                .iter()
                .find(|d| !d.is_empty())
                .map_or(0, |d| d.primary_sdram_width);
            match width {
                64 | 72 => 2,
                32 | 40 => 1,
                _ => 0,
            }
        }
        DataBusWidth::_32Bit => {
            if dimms.iter().any(|d| matches!(d.data_width, 64 | 72)) {
                1
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Place the DIMMs of one controller one after another starting at `base`. Returns the end
/// address.
pub fn assign_controller_linear(
    base: u64,
    dimms: &mut [DimmParams],
    common: &mut CommonTimingParams,
    dbw_cap_adj: u32,
) -> u64 {
    let mut current = base;
    common.base_address = base;
    for dimm in dimms.iter_mut() {
        dimm.base_address = current;
        current += dimm.capacity >> dbw_cap_adj;
    }
    common.total_mem = current - base;
    current
}

/// Assign the physical base addresses of all DIMMs and controllers, returning the total memory
/// size in bytes.
pub fn assign_addresses(info: &mut DdrInfo) -> u64 {
    let controllers = info.platform.controllers();
    let slots = info.platform.slots();
    for ctrl in 0..controllers {
        info.dbw_capacity_adjust[ctrl] =
            compute_dbw_capacity_adjust(&info.opts[ctrl], &info.dimms[ctrl][..slots]);
    }

    let start = info.platform.sdram_base;
    let mut end = start;
    if info.opts[0].memctl_interleaving.is_some() {
        let rank_density = info.dimms[0][0].rank_density >> info.dbw_capacity_adjust[0];
        let ctrl_density = match info.opts[0].ba_intlv {
            BankInterleave::Cs0Cs1Cs2Cs3 => 4 * rank_density,
            BankInterleave::Cs0Cs1 | BankInterleave::Cs0Cs1AndCs2Cs3 => 2 * rank_density,
            _ => rank_density,
        };
        let mut current = start;
        for ctrl in 0..controllers {
            match info.opts[ctrl].memctl_interleaving {
                Some(mode) => {
                    let total = mode.ways() as u64 * ctrl_density;
                    let common = &mut info.common[ctrl];
                    common.base_address = current;
                    common.total_mem = total;
                    for dimm in info.dimms[ctrl][..slots].iter_mut() {
                        dimm.base_address = current;
                    }
                    end = current + total;
                    log::debug!(
                        "DDR{}: interleaved at {:#x}, {:#x} bytes in the group",
                        ctrl,
                        current,
                        total
                    );
                }
                // A controller outside the interleaving group follows the group.
                None => {
                    current = end;
                    end = assign_controller_linear(
                        current,
                        &mut info.dimms[ctrl][..slots],
                        &mut info.common[ctrl],
                        info.dbw_capacity_adjust[ctrl],
                    );
                    current = end;
                }
            }
        }
    } else {
        for ctrl in 0..controllers {
            end = assign_controller_linear(
                end,
                &mut info.dimms[ctrl][..slots],
                &mut info.common[ctrl],
                info.dbw_capacity_adjust[ctrl],
            );
            log::debug!(
                "DDR{}: {:#x} bytes at {:#x}",
                ctrl,
                info.common[ctrl].total_mem,
                info.common[ctrl].base_address
            );
        }
    }
    end - start
}
