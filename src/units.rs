//! Length unit conversion
//!
//! Print Schema lengths are integer microns. Public accessors report them
//! in device-independent pixels (1/96 inch).

/// Microns per inch
pub const MICRONS_PER_INCH: i32 = 25_400;

/// Device-independent pixels per inch
pub const DIPS_PER_INCH: i32 = 96;

/// Convert microns to device-independent pixels
///
/// The result is exact (no rounding); `micron_to_dip(25400) == 96.0`.
pub fn micron_to_dip(micron: i32) -> f64 {
    f64::from(micron) * f64::from(DIPS_PER_INCH) / f64::from(MICRONS_PER_INCH)
}

/// Convert device-independent pixels to microns, rounding to the nearest micron
pub fn dip_to_micron(dip: f64) -> i32 {
    (dip * f64::from(MICRONS_PER_INCH) / f64::from(DIPS_PER_INCH)).round() as i32
}
