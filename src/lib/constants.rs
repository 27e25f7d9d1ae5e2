/// No-data sentinel used by the grid files and the warm state on disk.
/// In memory missing cells are NaN.
pub const NODATAVAL: f32 = -9999.0;

/// Temperatures above this value are assumed to be in Kelvin.
pub const KELVIN_THRESHOLD: f32 = 200.0;
pub const KELVIN_OFFSET: f32 = 273.15;

/// True if the value read from disk is the no-data sentinel (or below it).
pub fn is_nodata(value: f32) -> bool {
    value <= (NODATAVAL + 1.0)
}

/// Maps the on-disk sentinel to NaN.
pub fn nodata_to_nan(value: f32) -> f32 {
    if is_nodata(value) {
        f32::NAN
    } else {
        value
    }
}

/// Maps NaN (and infinities) to the on-disk sentinel.
pub fn nan_to_nodata(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        NODATAVAL
    }
}
