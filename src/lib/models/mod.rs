pub mod dataset;
pub mod input;
pub mod output;

use ndarray::ArrayD;

/// A field sampled at fixed locations (and optionally times).
pub type Grid = ArrayD<f32>;
