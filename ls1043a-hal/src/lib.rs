//! # DDR3 SDRAM controller configuration for the NXP LS1043A
//!
//! This crate computes and programs the DDR memory controller configuration of the LS1043A from
//! the SPD EEPROM contents of the installed DIMMs. It builds on top of the register definitions
//! of the [ls1043a] crate.
//!
//! The main entry point is [ddr::DdrInit::fsl_ddr_sdram], which runs the whole bring-up flow and
//! returns the amount of usable memory.
//!
//! Hardware access is abstracted by the traits in [ddr::io] and the
//! [embedded-hal](https://github.com/rust-embedded/embedded-hal) I2C and delay traits, which also
//! makes the computation pipeline testable on a host.
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod ddr;
pub mod time;
