//! # Register definitions for the NXP LS1043A DDR memory controller
//!
//! This crate only covers the parts of the SoC required for DDR3 SDRAM bring-up: the memory
//! controller register block and the JEDEC DDR3 SPD byte layout which is read from the DIMM
//! EEPROMs.
//!
//! The DDR controller of the LS1043A is a big-endian peripheral. The register types in this crate
//! are plain 32 bit values, the byte order is handled by the register access layer of the HAL.
#![no_std]

pub mod ddrc;
pub mod spd;
