//! Synthetic SPD images and fake collaborators for host tests.
extern crate std;

use std::{collections::HashMap, vec::Vec};

use ls1043a::{
    ddrc::{DDRC_BASE_ADDR, offsets, sdram_cfg_2},
    spd::{self as offs, DDR3_SPD_SIZE, module_type},
};

use super::{
    config::{DdrPlatformConfig, MAX_CONTROLLERS, MAX_DIMM_SLOTS},
    io::{RegisterIo, SpdSource},
    spd::{DimmParams, Ddr3Spd, decode_ddr3_spd},
};

/// Builds DDR3 SPD images with a valid CRC.
#[derive(Debug, Clone)]
pub struct SpdBuilder {
    pub info_size_crc: u8,
    pub module_type: u8,
    pub ecc: bool,
    pub therm_ref_opt: u8,
    /// Packed RCW nibbles of registered DIMMs.
    pub rcw: [u8; 8],
    pub part_number: &'static str,
}

impl SpdBuilder {
    /// Dual rank 4 GiB unbuffered DIMM, 2 Gibit x8 devices, CL5 to CL11, tCKmin 625 ps.
    pub fn udimm_2r_4gib_1600() -> Self {
        Self {
            info_size_crc: 0x92,
            module_type: module_type::UDIMM,
            ecc: false,
            therm_ref_opt: 0,
            rcw: [0; 8],
            part_number: "TEST-UDIMM-4G",
        }
    }

    pub fn build(&self) -> Ddr3Spd {
        let mut raw = [0u8; DDR3_SPD_SIZE];
        raw[offs::INFO_SIZE_CRC] = self.info_size_crc;
        raw[offs::SPD_REV] = 0x11;
        raw[offs::MEM_TYPE] = offs::MEM_TYPE_DDR3;
        raw[offs::MODULE_TYPE] = self.module_type;
        raw[offs::DENSITY_BANKS] = 0x03;
        raw[offs::ADDRESSING] = 0x19;
        raw[offs::ORGANIZATION] = 0x09;
        raw[offs::BUS_WIDTH] = if self.ecc { 0x0B } else { 0x03 };
        raw[offs::FTB_DIV] = 0x11;
        raw[offs::MTB_DIVIDEND] = 1;
        raw[offs::MTB_DIVISOR] = 8;
        raw[offs::TCK_MIN] = 5;
        raw[offs::CASLAT_LSB] = 0xFE;
        raw[offs::CASLAT_MSB] = 0x00;
        raw[offs::TAA_MIN] = 110;
        raw[offs::TWR_MIN] = 120;
        raw[offs::TRCD_MIN] = 110;
        raw[offs::TRRD_MIN] = 48;
        raw[offs::TRP_MIN] = 110;
        raw[offs::TRAS_TRC_EXT] = 0x11;
        raw[offs::TRAS_MIN_LSB] = 0x18;
        raw[offs::TRC_MIN_LSB] = 0x86;
        raw[offs::TRFC_MIN_LSB] = 0x00;
        raw[offs::TRFC_MIN_MSB] = 0x05;
        raw[offs::TWTR_MIN] = 60;
        raw[offs::TRTP_MIN] = 60;
        raw[offs::TFAW_MSB] = 0;
        raw[offs::TFAW_MIN] = 240;
        raw[offs::THERM_REF_OPT] = self.therm_ref_opt;
        if self.module_type == module_type::RDIMM {
            raw[offs::RDIMM_RCW_START..offs::RDIMM_RCW_START + offs::RDIMM_RCW_LEN]
                .copy_from_slice(&self.rcw);
        } else {
            raw[offs::UDIMM_ADDR_MAPPING] = 0x01;
        }
        let start = offs::PART_NUMBER_START;
        let part = &mut raw[start..start + offs::PART_NUMBER_LEN];
        part.fill(b' ');
        part[..self.part_number.len()].copy_from_slice(self.part_number.as_bytes());

        let mut spd = Ddr3Spd::new(raw);
        spd.update_crc();
        spd
    }
}

/// Decoded [SpdBuilder::udimm_2r_4gib_1600].
pub fn udimm_2r_4gib() -> DimmParams {
    decode_ddr3_spd(&SpdBuilder::udimm_2r_4gib_1600().build()).unwrap()
}

pub const CTRL_BASES: [usize; MAX_CONTROLLERS] = [DDRC_BASE_ADDR, 0x0109_0000, 0x010A_0000];

/// One controller with two DIMM slots.
pub fn two_slot_platform() -> DdrPlatformConfig {
    DdrPlatformConfig {
        num_controllers: 1,
        dimm_slots_per_ctrl: 2,
        first_slot_quad_capable: true,
        ctrl_base_addrs: CTRL_BASES,
        sdram_base: 0x8000_0000,
        phys_64bit: true,
        max_mem_mapped: 0x8000_0000,
        intl3r_addr: None,
        raw_timing_fallback: None,
    }
}

pub fn single_slot_platform() -> DdrPlatformConfig {
    DdrPlatformConfig {
        dimm_slots_per_ctrl: 1,
        ..two_slot_platform()
    }
}

/// Register file which records every access.
///
/// The data initialization bit of the SDRAM configuration 2 register clears on the first read
/// unless [Self::d_init_stuck] is set.
#[derive(Debug, Default)]
pub struct FakeRegisterIo {
    pub regs: HashMap<usize, u32>,
    pub writes: Vec<(usize, u32)>,
    pub reads: Vec<usize>,
    pub fences: usize,
    pub d_init_stuck: bool,
}

impl FakeRegisterIo {
    pub fn value(&self, addr: usize) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    /// Writes to the given address, in order.
    pub fn writes_to(&self, addr: usize) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn position_of_write(&self, addr: usize) -> Option<usize> {
        self.writes.iter().position(|(a, _)| *a == addr)
    }
}

impl RegisterIo for FakeRegisterIo {
    fn read32(&mut self, addr: usize) -> u32 {
        self.reads.push(addr);
        let mut value = self.value(addr);
        if addr & 0xFFF == offsets::SDRAM_CFG_2 && !self.d_init_stuck {
            value &= !sdram_cfg_2::D_INIT;
            self.regs.insert(addr, value);
        }
        value
    }

    fn write32(&mut self, addr: usize, value: u32) {
        self.writes.push((addr, value));
        self.regs.insert(addr, value);
    }

    fn fence(&mut self) {
        self.fences += 1;
    }
}

/// Delay provider which only accumulates the requested time.
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl embedded_hal::delay::DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }
}

/// SPD images per controller and slot. Missing images fail to read.
#[derive(Debug, Default)]
pub struct FakeSpdSource {
    pub images: [[Option<Ddr3Spd>; MAX_DIMM_SLOTS]; MAX_CONTROLLERS],
}

impl SpdSource for FakeSpdSource {
    type Error = ();

    fn read_spd(
        &mut self,
        ctrl: usize,
        slot: usize,
        buf: &mut [u8; DDR3_SPD_SIZE],
    ) -> Result<(), Self::Error> {
        let image = self.images[ctrl][slot].as_ref().ok_or(())?;
        buf.copy_from_slice(image.raw());
        Ok(())
    }
}
