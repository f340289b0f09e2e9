//! Laplacian-based sharpness estimation over single-channel and RGB sample buffers.
//!
//! A [`Kernel`] is correlated with a [`PixelBuffer`] by [`convolve`]; the
//! filtered response is reduced to a score either by its variance
//! ([`variance_sharpness`]) or by the mean of the responses above a threshold
//! ([`average_sharpness`]).

pub mod buffer;
pub mod config;
pub mod error;
pub mod processing;

pub use buffer::{Pixel, PixelBuffer, RgbBuffer};
pub use config::{Measure, SharpnessConfig};
pub use error::SharpnessError;
pub use processing::convolve::{convolve, convolve_rgb, convolve_slice};
pub use processing::kernel::Kernel;
pub use processing::sharpness::{
    ChannelScores, DEFAULT_THRESHOLD, average_sharpness, average_sharpness_with_threshold,
    estimate, mean, population_variance, rgb_sharpness, threshold_average, variance_sharpness,
};
