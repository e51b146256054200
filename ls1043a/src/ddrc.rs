//! DDR memory controller (DDRC) register block.
//!
//! All registers are 32 bits wide and big-endian.

/// Base address of DDR controller 1 in the CCSR space.
pub const DDRC_BASE_ADDR: usize = 0x0108_0000;

/// Base address of the DDR SDRAM in the system memory map.
pub const SDRAM_BASE_ADDR: u64 = 0x8000_0000;

/// Number of chip selects provided by one controller.
pub const CHIP_SELECTS: usize = 4;

/// Number of debug registers.
pub const DEBUG_REGS: usize = 32;

/// Byte offsets of the controller registers, relative to the controller base address.
pub mod offsets {
    use super::CHIP_SELECTS;

    pub const CS_BNDS: [usize; CHIP_SELECTS] = [0x000, 0x008, 0x010, 0x018];
    pub const CS_CONFIG: [usize; CHIP_SELECTS] = [0x080, 0x084, 0x088, 0x08C];
    pub const CS_CONFIG_2: [usize; CHIP_SELECTS] = [0x0C0, 0x0C4, 0x0C8, 0x0CC];
    pub const TIMING_CFG_3: usize = 0x100;
    pub const TIMING_CFG_0: usize = 0x104;
    pub const TIMING_CFG_1: usize = 0x108;
    pub const TIMING_CFG_2: usize = 0x10C;
    pub const SDRAM_CFG: usize = 0x110;
    pub const SDRAM_CFG_2: usize = 0x114;
    pub const SDRAM_MODE: usize = 0x118;
    pub const SDRAM_MODE_2: usize = 0x11C;
    pub const SDRAM_MD_CNTL: usize = 0x120;
    pub const SDRAM_INTERVAL: usize = 0x124;
    pub const SDRAM_DATA_INIT: usize = 0x128;
    pub const SDRAM_CLK_CNTL: usize = 0x130;
    pub const SDRAM_INIT_ADDR: usize = 0x148;
    pub const SDRAM_INIT_ADDR_EXT: usize = 0x14C;
    pub const TIMING_CFG_4: usize = 0x160;
    pub const TIMING_CFG_5: usize = 0x164;
    pub const ZQ_CNTL: usize = 0x170;
    pub const WRLVL_CNTL: usize = 0x174;
    pub const SR_CNTR: usize = 0x17C;
    pub const SDRAM_RCW_1: usize = 0x180;
    pub const SDRAM_RCW_2: usize = 0x184;
    pub const WRLVL_CNTL_2: usize = 0x190;
    pub const WRLVL_CNTL_3: usize = 0x194;
    /// SDRAM_MODE_3 to SDRAM_MODE_8, the per chip select mode register variants.
    pub const SDRAM_MODE_3_TO_8: [usize; 6] = [0x200, 0x204, 0x208, 0x20C, 0x210, 0x214];
    pub const EOR: usize = 0x1F0;
    pub const CDR1: usize = 0xB28;
    pub const CDR2: usize = 0xB2C;
    pub const IP_REV1: usize = 0xBF8;
    pub const IP_REV2: usize = 0xBFC;
    pub const ERR_DISABLE: usize = 0xE44;
    pub const ERR_INT_EN: usize = 0xE48;
    pub const DEBUG: usize = 0xF00;
}

/// Raw masks of the [regs::SdramCfg] bits which are manipulated by the enable sequence.
pub mod sdram_cfg {
    pub const MEM_EN: u32 = 0x8000_0000;
    pub const RD_EN: u32 = 0x1000_0000;
    pub const TWO_T_EN: u32 = 0x0000_8000;
    pub const BI: u32 = 0x0000_0001;
    pub const DBW_MASK: u32 = 0x0018_0000;
    pub const DBW_SHIFT: u32 = 19;
}

/// Raw masks of [regs::SdramCfg2] bits.
pub mod sdram_cfg_2 {
    pub const D_INIT: u32 = 0x0000_0010;
}

/// Raw masks of [regs::CsConfig] bits.
pub mod cs_config {
    pub const CS_EN: u32 = 0x8000_0000;
    /// Two-way chip select interleaving is enabled on CS0.
    pub const INTLV_2WAY: u32 = 0x2000_0000;
}

/// 3-way interleaving control register in the DCSR space.
pub mod intl3r {
    pub const ENABLE: u32 = 0x8000_0000;
    /// Interleaving mode and granule, written together with [ENABLE].
    pub const MODE_MASK: u32 = 0x0000_001F;
}

pub mod regs {
    use arbitrary_int::{u2, u3, u4, u5, u6, u7, u14};

    /// Chip select memory bounds. Start and end are bits 39..24 of the physical address.
    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct CsBounds {
        #[bits(16..=31, rw)]
        start_addr: u16,
        #[bits(0..=15, rw)]
        end_addr: u16,
    }

    impl CsBounds {
        /// Bounds value of an inactive chip select.
        pub const INACTIVE: u32 = 0xFFFF_FFFF;
    }

    /// ODT assertion policy for reads and writes.
    #[bitbybit::bitenum(u3, exhaustive = true)]
    #[derive(Debug, PartialEq, Eq)]
    pub enum OdtConfig {
        Never = 0,
        OnlyToCsBeingAccessed = 1,
        AllOtherCs = 2,
        OtherDimm = 3,
        AllCs = 4,
        SameDimm = 5,
        CsAndOtherDimm = 6,
        OtherCsOnSameDimm = 7,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct CsConfig {
        #[bit(31, rw)]
        cs_en: bool,
        #[bits(29..=30, rw)]
        intlv_en: u2,
        #[bits(24..=27, rw)]
        intlv_ctl: u4,
        #[bit(23, rw)]
        ap_en: bool,
        #[bits(20..=22, rw)]
        odt_rd_cfg: OdtConfig,
        #[bits(16..=18, rw)]
        odt_wr_cfg: OdtConfig,
        /// Number of bank bits minus 2.
        #[bits(14..=15, rw)]
        ba_bits: u2,
        /// Number of row bits minus 12.
        #[bits(8..=10, rw)]
        row_bits: u3,
        /// Number of column bits minus 8.
        #[bits(0..=2, rw)]
        col_bits: u3,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct TimingCfg0 {
        /// Read-to-write turnaround.
        #[bits(30..=31, rw)]
        rwt: u2,
        /// Write-to-read turnaround.
        #[bits(28..=29, rw)]
        wrt: u2,
        /// Read-to-read turnaround.
        #[bits(26..=27, rw)]
        rrt: u2,
        /// Write-to-write turnaround.
        #[bits(24..=25, rw)]
        wwt: u2,
        /// Active powerdown exit timing (tXP).
        #[bits(20..=23, rw)]
        act_pd_exit: u4,
        /// Precharge powerdown exit timing (tXP).
        #[bits(16..=19, rw)]
        pre_pd_exit: u4,
        /// ODT powerdown exit timing (tAXPD).
        #[bits(8..=11, rw)]
        odt_pd_exit: u4,
        /// Mode register set cycle time (tMRD).
        #[bits(0..=4, rw)]
        mrs_cyc: u5,
    }

    /// Extended bits of the [TimingCfg1] and [TimingCfg2] fields.
    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct TimingCfg3 {
        #[bit(28, rw)]
        ext_pretoact: bool,
        #[bits(24..=25, rw)]
        ext_acttopre: u2,
        #[bit(22, rw)]
        ext_acttorw: bool,
        #[bits(16..=20, rw)]
        ext_refrec: u5,
        #[bits(12..=13, rw)]
        ext_caslat: u2,
        #[bit(10, rw)]
        ext_add_lat: bool,
        #[bit(8, rw)]
        ext_wrrec: bool,
        #[bits(0..=2, rw)]
        cntl_adj: u3,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct TimingCfg1 {
        /// Precharge-to-activate interval (tRP).
        #[bits(28..=31, rw)]
        pretoact: u4,
        /// Activate to precharge interval (tRAS).
        #[bits(24..=27, rw)]
        acttopre: u4,
        /// Activate to read/write interval (tRCD).
        #[bits(20..=23, rw)]
        acttorw: u4,
        /// MCAS latency from READ command, encoded as 2 * CL - 1.
        #[bits(16..=19, rw)]
        caslat_ctrl: u4,
        /// Refresh recovery time (tRFC) minus 8.
        #[bits(12..=15, rw)]
        refrec: u4,
        /// Last data to precharge minimum interval (tWR).
        #[bits(8..=11, rw)]
        wrrec: u4,
        /// Activate to activate interval (tRRD).
        #[bits(4..=7, rw)]
        acttoact: u4,
        /// Last write data pair to read command issue interval (tWTR).
        #[bits(0..=3, rw)]
        wrtord: u4,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct TimingCfg2 {
        #[bits(28..=31, rw)]
        add_lat: u4,
        /// MCAS-to-preamble override.
        #[bits(23..=27, rw)]
        cpo: u5,
        /// Write latency (CWL).
        #[bits(19..=22, rw)]
        wr_lat: u4,
        /// Bit 4 of the write latency.
        #[bit(18, rw)]
        wr_lat_ext: bool,
        /// Read to precharge (tRTP).
        #[bits(13..=16, rw)]
        rd_to_pre: u4,
        #[bits(9..=12, rw)]
        wr_data_delay: u4,
        /// Minimum CKE pulse width (tCKE).
        #[bits(6..=8, rw)]
        cke_pls: u3,
        /// Window for four activates (tFAW).
        #[bits(0..=5, rw)]
        four_act: u6,
    }

    #[bitbybit::bitenum(u3)]
    #[derive(Debug, PartialEq, Eq)]
    pub enum SdramType {
        Ddr1 = 2,
        Ddr2 = 3,
        Ddr4 = 5,
        Lpddr1 = 6,
        Ddr3 = 7,
    }

    #[bitbybit::bitenum(u2)]
    #[derive(Debug, PartialEq, Eq)]
    pub enum DataBusWidth {
        _64Bit = 0b00,
        _32Bit = 0b01,
        _16Bit = 0b10,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct SdramCfg {
        #[bit(31, rw)]
        mem_en: bool,
        #[bit(30, rw)]
        sren: bool,
        #[bit(29, rw)]
        ecc_en: bool,
        /// Registered DIMM enable.
        #[bit(28, rw)]
        rd_en: bool,
        #[bits(24..=26, rw)]
        sdram_type: Option<SdramType>,
        #[bit(21, rw)]
        dyn_pwr: bool,
        #[bits(19..=20, rw)]
        dbw: Option<DataBusWidth>,
        /// 8-beat burst enable.
        #[bit(18, rw)]
        eight_be: bool,
        /// Non-concurrent auto-precharge.
        #[bit(17, rw)]
        ncap: bool,
        #[bit(16, rw)]
        threet_en: bool,
        #[bit(15, rw)]
        twot_en: bool,
        /// Bank (chip select) interleaving control.
        #[bits(8..=14, rw)]
        ba_intlv_ctl: u7,
        #[bit(5, rw)]
        x32_en: bool,
        /// Precharge bit 8 enable.
        #[bit(4, rw)]
        pchb8: bool,
        /// Half-strength output driver enable.
        #[bit(3, rw)]
        hse: bool,
        /// Address parity / ECC access enable.
        #[bit(2, rw)]
        acc_ecc_en: bool,
        #[bit(1, rw)]
        mem_halt: bool,
        /// Bypass initialization.
        #[bit(0, rw)]
        bi: bool,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct SdramCfg2 {
        #[bit(31, rw)]
        frc_sr: bool,
        #[bit(30, rw)]
        sr_ie: bool,
        /// DLL reset disable.
        #[bit(29, rw)]
        dll_rst_dis: bool,
        #[bits(26..=27, rw)]
        dqs_cfg: u2,
        #[bits(21..=22, rw)]
        odt_cfg: u2,
        /// Number of posted refreshes.
        #[bits(12..=15, rw)]
        num_pr: u4,
        #[bit(11, rw)]
        slow: bool,
        #[bit(10, rw)]
        x4_en: bool,
        /// Quad-rank enable.
        #[bit(9, rw)]
        qd_en: bool,
        /// Unique mode registers per chip select.
        #[bit(8, rw)]
        unq_mrs_en: bool,
        #[bit(6, rw)]
        obc_cfg: bool,
        /// Address parity enable.
        #[bit(5, rw)]
        ap_en: bool,
        /// Automatic data initialization. Cleared by hardware when done.
        #[bit(4, rw)]
        d_init: bool,
        #[bit(2, rw)]
        rcw_en: bool,
        /// Mirrored DIMM support.
        #[bit(0, rw)]
        md_en: bool,
    }

    /// SDRAM_MODE and SDRAM_MODE_2 to 8: two 16 bit mode register values.
    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct SdramMode {
        #[bits(16..=31, rw)]
        esdmode: u16,
        #[bits(0..=15, rw)]
        sdmode: u16,
    }

    /// DDR3 MR0.
    #[bitbybit::bitfield(u16, default = 0x0, debug)]
    pub struct Ddr3Mr0 {
        /// Precharge powerdown DLL control: DLL on.
        #[bit(12, rw)]
        dll_on: bool,
        #[bits(9..=11, rw)]
        wr: u3,
        #[bit(8, rw)]
        dll_rst: bool,
        #[bit(7, rw)]
        test_mode: bool,
        #[bits(4..=6, rw)]
        caslat_hi: u3,
        /// Burst type. Set for interleaved bursts.
        #[bit(3, rw)]
        bt: bool,
        #[bit(2, rw)]
        caslat_lo: bool,
        #[bits(0..=1, rw)]
        bl: u2,
    }

    /// DDR3 MR1.
    #[bitbybit::bitfield(u16, default = 0x0, debug)]
    pub struct Ddr3Mr1 {
        #[bit(12, rw)]
        qoff: bool,
        #[bit(11, rw)]
        tdqs_en: bool,
        #[bit(9, rw)]
        rtt_nom_2: bool,
        #[bit(7, rw)]
        wrlvl_en: bool,
        #[bit(6, rw)]
        rtt_nom_1: bool,
        #[bit(5, rw)]
        dic_1: bool,
        #[bits(3..=4, rw)]
        al: u2,
        #[bit(2, rw)]
        rtt_nom_0: bool,
        #[bit(1, rw)]
        dic_0: bool,
        /// Set to disable the DLL.
        #[bit(0, rw)]
        dll_dis: bool,
    }

    impl Ddr3Mr1 {
        /// Mask clearing the Rtt_Nom bits 9, 6 and 2.
        pub const RTT_NOM_CLEAR_MASK: u16 = 0xFDBB;
    }

    /// DDR3 MR2.
    #[bitbybit::bitfield(u16, default = 0x0, debug)]
    pub struct Ddr3Mr2 {
        #[bits(9..=10, rw)]
        rtt_wr: u2,
        /// Self-refresh temperature range.
        #[bit(7, rw)]
        srt: bool,
        /// Auto self-refresh.
        #[bit(6, rw)]
        asr: bool,
        /// CAS write latency minus 5.
        #[bits(3..=5, rw)]
        cwl: u3,
        /// Partial array self-refresh.
        #[bits(0..=2, rw)]
        pasr: u3,
    }

    impl Ddr3Mr2 {
        /// Mask clearing the Rtt_WR bits 9 and 10.
        pub const RTT_WR_CLEAR_MASK: u16 = 0xF9FF;
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct SdramInterval {
        /// Refresh interval in memory clocks.
        #[bits(16..=31, rw)]
        refint: u16,
        /// Precharge interval.
        #[bits(0..=13, rw)]
        bstopre: u14,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct SdramClkCntl {
        /// Clock adjust in 1/16 clock steps. Controllers before IP revision 4.7.1 only implement
        /// the upper four bits.
        #[bits(22..=26, rw)]
        clk_adjust: u5,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct TimingCfg4 {
        #[bits(28..=31, rw)]
        rwt: u4,
        #[bits(24..=27, rw)]
        wrt: u4,
        #[bits(20..=23, rw)]
        rrt: u4,
        #[bits(16..=19, rw)]
        wwt: u4,
        #[bits(0..=1, rw)]
        dll_lock: u2,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct TimingCfg5 {
        #[bits(24..=28, rw)]
        rodt_on: u5,
        #[bits(20..=22, rw)]
        rodt_off: u3,
        #[bits(12..=16, rw)]
        wodt_on: u5,
        #[bits(8..=10, rw)]
        wodt_off: u3,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct ZqCntl {
        #[bit(31, rw)]
        zq_en: bool,
        /// ZQ calibration after reset, 2^n memory clocks.
        #[bits(24..=27, rw)]
        zqinit: u4,
        /// ZQ calibration long, 2^n memory clocks.
        #[bits(16..=19, rw)]
        zqoper: u4,
        /// ZQ calibration short, 2^n memory clocks.
        #[bits(8..=11, rw)]
        zqcs: u4,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct WrlvlCntl {
        #[bit(31, rw)]
        wrlvl_en: bool,
        #[bits(24..=26, rw)]
        wrlvl_mrd: u3,
        #[bits(20..=22, rw)]
        wrlvl_odten: u3,
        #[bits(16..=18, rw)]
        wrlvl_dqsen: u3,
        #[bits(12..=15, rw)]
        wrlvl_smpl: u4,
        #[bits(8..=10, rw)]
        wrlvl_wlr: u3,
        #[bits(0..=4, rw)]
        wrlvl_start: u5,
    }

    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct SrCntr {
        /// Self-refresh idle threshold.
        #[bits(16..=19, rw)]
        sr_it: u4,
    }

    /// Enhanced optimization register.
    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct Eor {
        #[bit(30, rw)]
        addr_hash_en: bool,
    }

    /// Termination code shared by CDR1 and CDR2.
    #[bitbybit::bitenum(u3, exhaustive = true)]
    #[derive(Debug, PartialEq, Eq)]
    pub enum CdrOdt {
        Off = 0,
        Ohm120 = 1,
        Ohm180 = 2,
        Ohm75 = 3,
        Ohm110 = 4,
        Ohm60 = 5,
        Ohm70 = 6,
        Ohm47 = 7,
    }

    /// Control driver register 1.
    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct Cdr1 {
        /// Driver hardware compensation enable.
        #[bit(31, rw)]
        dhc_en: bool,
        /// Upper two bits of the [CdrOdt] code.
        #[bits(18..=19, rw)]
        odt: u2,
    }

    /// Control driver register 2.
    #[bitbybit::bitfield(u32, default = 0x0, debug)]
    pub struct Cdr2 {
        /// Lowest bit of the [CdrOdt] code.
        #[bit(0, rw)]
        odt: bool,
    }
}

static_assertions::const_assert_eq!(offsets::DEBUG + 4 * (DEBUG_REGS - 1), 0xF7C);
static_assertions::const_assert_eq!(offsets::CS_BNDS.len(), CHIP_SELECTS);
