//! JEDEC DDR3 SPD EEPROM byte offsets.
//!
//! Only the bytes which are required for DDR3 module decoding are listed here.

/// Size of a DDR3 SPD image in bytes.
pub const DDR3_SPD_SIZE: usize = 256;

/// Memory type code of DDR3 SDRAM in byte 2.
pub const MEM_TYPE_DDR3: u8 = 0x0B;

/// Bytes used, bytes total, CRC coverage. Bit 7 set: CRC covers bytes 0..=116.
pub const INFO_SIZE_CRC: usize = 0;
pub const SPD_REV: usize = 1;
pub const MEM_TYPE: usize = 2;
pub const MODULE_TYPE: usize = 3;
pub const DENSITY_BANKS: usize = 4;
pub const ADDRESSING: usize = 5;
pub const MODULE_VDD: usize = 6;
pub const ORGANIZATION: usize = 7;
pub const BUS_WIDTH: usize = 8;
pub const FTB_DIV: usize = 9;
pub const MTB_DIVIDEND: usize = 10;
pub const MTB_DIVISOR: usize = 11;
pub const TCK_MIN: usize = 12;
pub const CASLAT_LSB: usize = 14;
pub const CASLAT_MSB: usize = 15;
pub const TAA_MIN: usize = 16;
pub const TWR_MIN: usize = 17;
pub const TRCD_MIN: usize = 18;
pub const TRRD_MIN: usize = 19;
pub const TRP_MIN: usize = 20;
pub const TRAS_TRC_EXT: usize = 21;
pub const TRAS_MIN_LSB: usize = 22;
pub const TRC_MIN_LSB: usize = 23;
pub const TRFC_MIN_LSB: usize = 24;
pub const TRFC_MIN_MSB: usize = 25;
pub const TWTR_MIN: usize = 26;
pub const TRTP_MIN: usize = 27;
pub const TFAW_MSB: usize = 28;
pub const TFAW_MIN: usize = 29;
pub const OPT_FEATURES: usize = 30;
pub const THERM_REF_OPT: usize = 31;
pub const FINE_TCK_MIN: usize = 34;
pub const FINE_TAA_MIN: usize = 35;
pub const FINE_TRCD_MIN: usize = 36;
pub const FINE_TRP_MIN: usize = 37;
pub const FINE_TRC_MIN: usize = 38;

/// Unbuffered module section: address mapping from edge connector to DRAM. Bit 0: rank 1 is
/// mirrored.
pub const UDIMM_ADDR_MAPPING: usize = 63;
/// Registered module section: SSTE32882 register control words RC0..RC15, packed as nibbles,
/// low nibble first.
pub const RDIMM_RCW_START: usize = 69;
pub const RDIMM_RCW_LEN: usize = 8;

pub const CRC_LSB: usize = 126;
pub const CRC_MSB: usize = 127;

pub const PART_NUMBER_START: usize = 128;
pub const PART_NUMBER_LEN: usize = 18;

/// Module type field (lower nibble of byte 3).
pub mod module_type {
    pub const RDIMM: u8 = 0x01;
    pub const UDIMM: u8 = 0x02;
    pub const SO_DIMM: u8 = 0x03;
    pub const MICRO_DIMM: u8 = 0x04;
    pub const MINI_RDIMM: u8 = 0x05;
    pub const MINI_UDIMM: u8 = 0x06;
    pub const MINI_CDIMM: u8 = 0x07;
    pub const SO_UDIMM_72B: u8 = 0x08;
    pub const SO_RDIMM_72B: u8 = 0x09;
    pub const SO_CDIMM_72B: u8 = 0x0A;
    pub const LRDIMM: u8 = 0x0B;
    pub const SO_DIMM_16B: u8 = 0x0C;
    pub const SO_DIMM_32B: u8 = 0x0D;
}
