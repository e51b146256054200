//! # Time units

/// Hertz, used for the DDR data rate.
pub type Hertz = fugit::HertzU32;
