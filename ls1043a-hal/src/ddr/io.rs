//! Hardware collaborators of the DDR initialization.
use core::sync::atomic::{Ordering, fence};

use embedded_hal::i2c::I2c;
use ls1043a::spd::DDR3_SPD_SIZE;

use super::config::{MAX_CONTROLLERS, MAX_DIMM_SLOTS};

/// 32 bit register access.
///
/// The addresses are absolute physical addresses.
pub trait RegisterIo {
    fn read32(&mut self, addr: usize) -> u32;
    fn write32(&mut self, addr: usize, value: u32);

    /// Order all previous register accesses before the following ones.
    fn fence(&mut self) {
        fence(Ordering::SeqCst);
    }
}

/// Volatile access to big-endian memory mapped registers.
#[derive(Debug)]
pub struct BigEndianMmio {
    _private: (),
}

impl BigEndianMmio {
    /// # Safety
    ///
    /// All addresses passed to this accessor must be valid, mapped device registers. The DDR
    /// controller registers must not be accessed by anything else during initialization.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl RegisterIo for BigEndianMmio {
    #[inline]
    fn read32(&mut self, addr: usize) -> u32 {
        // Safety: The address validity is guaranteed by the constructor contract.
        u32::from_be(unsafe { core::ptr::read_volatile(addr as *const u32) })
    }

    #[inline]
    fn write32(&mut self, addr: usize, value: u32) {
        // Safety: The address validity is guaranteed by the constructor contract.
        unsafe { core::ptr::write_volatile(addr as *mut u32, value.to_be()) }
    }
}

/// Source of raw SPD EEPROM images.
pub trait SpdSource {
    type Error: core::fmt::Debug;

    fn read_spd(
        &mut self,
        ctrl: usize,
        slot: usize,
        buf: &mut [u8; DDR3_SPD_SIZE],
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpdReadError<E: core::fmt::Debug> {
    #[error("no SPD EEPROM address for controller {ctrl} slot {slot}")]
    NoAddress { ctrl: usize, slot: usize },
    #[error("I2C error: {0:?}")]
    I2c(E),
}

/// Reads the SPD EEPROMs over I2C.
///
/// DDR3 SPD EEPROMs hold 256 bytes in a single page, which is read in one transfer starting at
/// offset 0.
pub struct I2cSpdSource<I> {
    i2c: I,
    addresses: [[Option<u8>; MAX_DIMM_SLOTS]; MAX_CONTROLLERS],
}

impl<I: I2c> I2cSpdSource<I> {
    /// The address table is indexed by controller and slot.
    pub const fn new(i2c: I, addresses: [[Option<u8>; MAX_DIMM_SLOTS]; MAX_CONTROLLERS]) -> Self {
        Self { i2c, addresses }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> SpdSource for I2cSpdSource<I> {
    type Error = SpdReadError<I::Error>;

    fn read_spd(
        &mut self,
        ctrl: usize,
        slot: usize,
        buf: &mut [u8; DDR3_SPD_SIZE],
    ) -> Result<(), Self::Error> {
        let addr = self
            .addresses
            .get(ctrl)
            .and_then(|slots| slots.get(slot))
            .copied()
            .flatten()
            .ok_or(SpdReadError::NoAddress { ctrl, slot })?;
        self.i2c
            .write_read(addr, &[0], buf)
            .map_err(SpdReadError::I2c)
    }
}

/// Board specific memory reset control.
///
/// Registered DIMMs require the reset to be asserted while the controller registers are written
/// and the clocks stabilize.
pub trait BoardHooks {
    /// The board drives the memory reset itself and needs it released between programming steps.
    fn need_mem_reset(&self) -> bool {
        false
    }

    fn assert_mem_reset(&mut self) {}

    fn deassert_mem_reset(&mut self) {}
}

/// Board without a controllable memory reset.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBoardReset;

impl BoardHooks for NoBoardReset {}
