//! DDR3 SPD decoding.
//!
//! Translates the raw JEDEC DDR3 SPD EEPROM image of a DIMM into [DimmParams], with all timing
//! values converted to picoseconds.
use ls1043a::spd::{self as offs, DDR3_SPD_SIZE, MEM_TYPE_DDR3, module_type};

/// CRC16 used by DDR3 SPD: polynomial 0x1021, initial value 0, not reflected.
pub const SPD_CRC: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);

pub const BURST_LENGTH_BC4: u32 = 0x04;
pub const BURST_LENGTH_BL8: u32 = 0x08;

/// Refresh interval for the normal temperature range.
pub const REFRESH_RATE_NORMAL_PS: u32 = 7_800_000;
/// Refresh interval with extended temperature range operation.
pub const REFRESH_RATE_EXTENDED_PS: u32 = 3_900_000;

pub const PART_NUMBER_LEN: usize = offs::PART_NUMBER_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpdError {
    #[error("SPD is empty")]
    Empty,
    #[error("unsupported memory type {0:#04x}")]
    UnsupportedMemoryType(u8),
    #[error("unsupported module type {0:#04x}")]
    UnsupportedModuleType(u8),
    #[error("SPD CRC mismatch, expected {expected:#06x}, computed {computed:#06x}")]
    CrcMismatch { expected: u16, computed: u16 },
    #[error("invalid medium timebase {dividend}/{divisor}")]
    InvalidTimebase { dividend: u8, divisor: u8 },
}

impl SpdError {
    /// The SPD contents are present but can not be trusted.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, SpdError::CrcMismatch { .. })
    }
}

/// Raw DDR3 SPD EEPROM image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ddr3Spd([u8; DDR3_SPD_SIZE]);

impl Default for Ddr3Spd {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Ddr3Spd {
    pub const fn new(raw: [u8; DDR3_SPD_SIZE]) -> Self {
        Self(raw)
    }

    pub const fn zeroed() -> Self {
        Self([0; DDR3_SPD_SIZE])
    }

    #[inline]
    pub const fn raw(&self) -> &[u8; DDR3_SPD_SIZE] {
        &self.0
    }

    #[inline]
    pub fn raw_mut(&mut self) -> &mut [u8; DDR3_SPD_SIZE] {
        &mut self.0
    }

    #[inline]
    pub const fn mem_type(&self) -> u8 {
        self.0[offs::MEM_TYPE]
    }

    /// Lower nibble of byte 3.
    #[inline]
    pub const fn module_type(&self) -> u8 {
        self.0[offs::MODULE_TYPE] & 0x0F
    }

    /// Number of bytes covered by the CRC.
    #[inline]
    pub const fn crc_coverage(&self) -> usize {
        if self.0[offs::INFO_SIZE_CRC] & 0x80 != 0 {
            117
        } else {
            126
        }
    }

    /// CRC stored in bytes 126 and 127.
    #[inline]
    pub const fn stored_crc(&self) -> u16 {
        u16::from_le_bytes([self.0[offs::CRC_LSB], self.0[offs::CRC_MSB]])
    }

    pub fn computed_crc(&self) -> u16 {
        spd_crc16(&self.0[..self.crc_coverage()])
    }

    pub fn crc_valid(&self) -> bool {
        self.stored_crc() == self.computed_crc()
    }

    /// Recompute and store the CRC.
    pub fn update_crc(&mut self) {
        let [lsb, msb] = self.computed_crc().to_le_bytes();
        self.0[offs::CRC_LSB] = lsb;
        self.0[offs::CRC_MSB] = msb;
    }

    #[inline]
    fn byte(&self, offset: usize) -> u32 {
        self.0[offset] as u32
    }

    /// Fine timebase offsets are signed.
    #[inline]
    fn fine(&self, offset: usize) -> i64 {
        self.0[offset] as i8 as i64
    }
}

/// CRC16 over an SPD byte range.
pub fn spd_crc16(bytes: &[u8]) -> u16 {
    SPD_CRC.checksum(bytes)
}

/// Parameters of one DIMM slot. A rank count of 0 denotes an empty slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DimmParams {
    pub mpart: heapless::String<PART_NUMBER_LEN>,

    pub n_ranks: u32,
    pub rank_density: u64,
    pub capacity: u64,
    pub primary_sdram_width: u32,
    pub ec_sdram_width: u32,
    pub data_width: u32,
    pub device_width: u32,
    pub registered_dimm: bool,
    pub mirrored_dimm: bool,
    pub ecc_capable: bool,

    pub n_row_addr: u32,
    pub n_col_addr: u32,
    pub n_banks_per_sdram_device: u32,
    pub burst_lengths_bitmask: u32,

    /// Assigned physical base address.
    pub base_address: u64,

    pub mtb_ps: u32,
    pub ftb_10th_ps: u32,
    pub tckmin_x_ps: u32,
    /// Not part of DDR3 SPD. 0 means unbounded.
    pub tckmax_ps: u32,
    /// Supported CAS latencies, bit n set for CL n.
    pub caslat_x: u32,
    pub taa_ps: u32,
    pub twr_ps: u32,
    pub trcd_ps: u32,
    pub trrd_ps: u32,
    pub trp_ps: u32,
    pub tras_ps: u32,
    pub trc_ps: u32,
    pub trfc_ps: u32,
    pub twtr_ps: u32,
    pub trtp_ps: u32,
    pub tfaw_ps: u32,
    pub refresh_rate_ps: u32,
    pub extended_op_srt: bool,

    /// SSTE32882 register control words RC0..RC15, registered DIMMs only.
    pub rcw: [u8; 16],
}

impl DimmParams {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_ranks == 0
    }

    #[inline]
    pub fn is_quad_rank(&self) -> bool {
        self.n_ranks == 4
    }
}

/// Rank density in bytes, from the SDRAM capacity, primary bus width and SDRAM device width.
fn compute_ranksize(spd: &Ddr3Spd) -> u64 {
    let nbit_sdram_cap_bsize = (spd.byte(offs::DENSITY_BANKS) & 0x0F) + 28;
    let nbit_primary_bus_width = (spd.byte(offs::BUS_WIDTH) & 0x07) + 3;
    let nbit_sdram_width = (spd.byte(offs::ORGANIZATION) & 0x07) + 2;
    1u64 << (nbit_sdram_cap_bsize - 3 + nbit_primary_bus_width - nbit_sdram_width)
}

/// Copy the printable part number, if the SPD contains one.
fn part_number(spd: &Ddr3Spd) -> heapless::String<PART_NUMBER_LEN> {
    let mut mpart = heapless::String::new();
    if spd.byte(offs::INFO_SIZE_CRC) & 0x0F <= 1 {
        return mpart;
    }
    let raw = &spd.raw()[offs::PART_NUMBER_START..offs::PART_NUMBER_START + PART_NUMBER_LEN];
    for &byte in raw.iter().take_while(|&&b| b != 0) {
        let c = if byte.is_ascii_graphic() || byte == b' ' {
            byte as char
        } else {
            '?'
        };
        // Can not overflow, the capacity matches the field length.
        let _ = mpart.push(c);
    }
    while mpart.ends_with(' ') {
        mpart.pop();
    }
    mpart
}

/// Decode a DDR3 SPD image.
///
/// Empty slots and non-DDR3 modules are reported with [SpdError::Empty] and
/// [SpdError::UnsupportedMemoryType]. A CRC mismatch means the SPD can not be trusted, see
/// [SpdError::is_fatal].
pub fn decode_ddr3_spd(spd: &Ddr3Spd) -> Result<DimmParams, SpdError> {
    match spd.mem_type() {
        0 => return Err(SpdError::Empty),
        MEM_TYPE_DDR3 => (),
        other => return Err(SpdError::UnsupportedMemoryType(other)),
    }
    let computed = spd.computed_crc();
    let expected = spd.stored_crc();
    if computed != expected {
        return Err(SpdError::CrcMismatch { expected, computed });
    }

    let mut pdimm = DimmParams {
        mpart: part_number(spd),
        ..Default::default()
    };

    let organization = spd.byte(offs::ORGANIZATION);
    let bus_width = spd.byte(offs::BUS_WIDTH);
    pdimm.n_ranks = ((organization >> 3) & 0x07) + 1;
    pdimm.rank_density = compute_ranksize(spd);
    pdimm.capacity = pdimm.n_ranks as u64 * pdimm.rank_density;
    pdimm.primary_sdram_width = 1 << (3 + (bus_width & 0x07));
    pdimm.ec_sdram_width = if (bus_width >> 3) & 0x03 != 0 { 8 } else { 0 };
    pdimm.data_width = pdimm.primary_sdram_width + pdimm.ec_sdram_width;
    pdimm.device_width = 1 << ((organization & 0x07) + 2);

    match spd.module_type() {
        module_type::RDIMM | module_type::MINI_RDIMM | module_type::SO_RDIMM_72B => {
            pdimm.registered_dimm = true;
            let start = offs::RDIMM_RCW_START;
            let rcw = &spd.raw()[start..start + offs::RDIMM_RCW_LEN];
            for (i, byte) in rcw.iter().enumerate() {
                pdimm.rcw[2 * i] = byte & 0x0F;
                pdimm.rcw[2 * i + 1] = byte >> 4;
            }
        }
        module_type::UDIMM
        | module_type::SO_DIMM
        | module_type::MICRO_DIMM
        | module_type::MINI_UDIMM
        | module_type::MINI_CDIMM
        | module_type::SO_UDIMM_72B
        | module_type::SO_CDIMM_72B
        | module_type::LRDIMM
        | module_type::SO_DIMM_16B
        | module_type::SO_DIMM_32B => {
            pdimm.registered_dimm = false;
            pdimm.mirrored_dimm = spd.byte(offs::UDIMM_ADDR_MAPPING) & 0x01 != 0;
        }
        other => return Err(SpdError::UnsupportedModuleType(other)),
    }

    let addressing = spd.byte(offs::ADDRESSING);
    pdimm.n_row_addr = ((addressing >> 3) & 0x07) + 12;
    pdimm.n_col_addr = (addressing & 0x07) + 9;
    pdimm.n_banks_per_sdram_device = 8 << ((spd.byte(offs::DENSITY_BANKS) >> 4) & 0x07);
    pdimm.ecc_capable = pdimm.ec_sdram_width != 0;
    // DDR3 always supports BL8 and burst chop 4.
    pdimm.burst_lengths_bitmask = BURST_LENGTH_BC4 | BURST_LENGTH_BL8;

    let dividend = spd.raw()[offs::MTB_DIVIDEND];
    let divisor = spd.raw()[offs::MTB_DIVISOR];
    if divisor == 0 {
        return Err(SpdError::InvalidTimebase { dividend, divisor });
    }
    let mtb_ps = dividend as u32 * 1000 / divisor as u32;
    let ftb = spd.byte(offs::FTB_DIV);
    let ftb_10th_ps = if ftb & 0x0F != 0 {
        ((ftb & 0xF0) >> 4) * 10 / (ftb & 0x0F)
    } else {
        0
    };
    pdimm.mtb_ps = mtb_ps;
    pdimm.ftb_10th_ps = ftb_10th_ps;

    let mtb = |offset: usize| spd.byte(offset) * mtb_ps;
    // Medium timebase value with a signed fine timebase correction in tenths of a picosecond.
    let mtb_fine = |medium_ps: u32, fine_offset: usize| -> u32 {
        let ps = medium_ps as i64 + spd.fine(fine_offset) * ftb_10th_ps as i64 / 10;
        ps.clamp(0, u32::MAX as i64) as u32
    };

    pdimm.tckmin_x_ps = mtb_fine(mtb(offs::TCK_MIN), offs::FINE_TCK_MIN);
    pdimm.tckmax_ps = 0;
    pdimm.caslat_x = ((spd.byte(offs::CASLAT_MSB) << 8) | spd.byte(offs::CASLAT_LSB)) << 4;
    pdimm.taa_ps = mtb_fine(mtb(offs::TAA_MIN), offs::FINE_TAA_MIN);
    pdimm.twr_ps = mtb(offs::TWR_MIN);
    pdimm.trcd_ps = mtb_fine(mtb(offs::TRCD_MIN), offs::FINE_TRCD_MIN);
    pdimm.trrd_ps = mtb(offs::TRRD_MIN);
    pdimm.trp_ps = mtb_fine(mtb(offs::TRP_MIN), offs::FINE_TRP_MIN);

    let tras_trc_ext = spd.byte(offs::TRAS_TRC_EXT);
    pdimm.tras_ps = (((tras_trc_ext & 0x0F) << 8) | spd.byte(offs::TRAS_MIN_LSB)) * mtb_ps;
    pdimm.trc_ps = mtb_fine(
        (((tras_trc_ext & 0xF0) << 4) | spd.byte(offs::TRC_MIN_LSB)) * mtb_ps,
        offs::FINE_TRC_MIN,
    );
    pdimm.trfc_ps =
        ((spd.byte(offs::TRFC_MIN_MSB) << 8) | spd.byte(offs::TRFC_MIN_LSB)) * mtb_ps;
    pdimm.twtr_ps = mtb(offs::TWTR_MIN);
    pdimm.trtp_ps = mtb(offs::TRTP_MIN);
    pdimm.tfaw_ps =
        (((spd.byte(offs::TFAW_MSB) & 0x0F) << 8) | spd.byte(offs::TFAW_MIN)) * mtb_ps;

    // Extended temperature range supported and not in the normal range: refresh twice as often.
    let therm_ref_opt = spd.byte(offs::THERM_REF_OPT);
    pdimm.refresh_rate_ps = REFRESH_RATE_NORMAL_PS;
    if therm_ref_opt & 0x01 != 0 && therm_ref_opt & 0x02 == 0 {
        pdimm.refresh_rate_ps = REFRESH_RATE_EXTENDED_PS;
        pdimm.extended_op_srt = true;
    }

    Ok(pdimm)
}
