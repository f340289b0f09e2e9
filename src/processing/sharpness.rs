use std::time::Instant;

use serde::Serialize;

use crate::buffer::{Pixel, PixelBuffer, RgbBuffer};
use crate::config::{Measure, SharpnessConfig};
use crate::error::SharpnessError;

use super::convolve::convolve;
use super::kernel::Kernel;

/// Laplacian responses must exceed this to count towards the threshold average.
pub const DEFAULT_THRESHOLD: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
/// Per-channel scores of an RGB image.
pub struct ChannelScores {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Arithmetic mean, accumulated in f64 so small samples are not swallowed by a
/// large running sum.
pub fn mean(values: &[Pixel]) -> Result<f64, SharpnessError> {
    if values.is_empty() {
        return Err(SharpnessError::EmptyBuffer);
    }
    let total: f64 = values.iter().map(|&v| v as f64).sum();
    Ok(total / values.len() as f64)
}

/// Population variance around `mean` (divides by the sample count).
pub fn population_variance(values: &[Pixel], mean: f64) -> Result<f64, SharpnessError> {
    if values.is_empty() {
        return Err(SharpnessError::EmptyBuffer);
    }
    let total: f64 = values
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum();
    Ok(total / values.len() as f64)
}

/// Mean of the samples strictly greater than `threshold`.
///
/// Negative responses never qualify, however strong.
pub fn threshold_average(values: &[Pixel], threshold: f64) -> Result<f64, SharpnessError> {
    let mut total = 0.0f64;
    let mut count = 0usize;
    for &v in values {
        let v = v as f64;
        if v > threshold {
            total += v;
            count += 1;
        }
    }
    if count == 0 {
        return Err(SharpnessError::NoSignal { threshold });
    }
    Ok(total / count as f64)
}

fn laplacian(input: &PixelBuffer) -> PixelBuffer {
    convolve(&Kernel::laplacian_3x3(), input)
}

/// Variance of the Laplacian response. Higher values indicate a sharper image.
pub fn variance_sharpness(input: &PixelBuffer) -> Result<f64, SharpnessError> {
    if input.is_empty() {
        return Err(SharpnessError::EmptyBuffer);
    }
    let filtered = laplacian(input);

    let t0 = Instant::now();
    let avg = mean(filtered.as_slice())?;
    tracing::debug!(
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        "mean of laplacian"
    );

    let t0 = Instant::now();
    let variance = population_variance(filtered.as_slice(), avg)?;
    tracing::debug!(
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        "variance of laplacian"
    );

    Ok(variance)
}

/// Threshold average of the Laplacian response using [`DEFAULT_THRESHOLD`].
pub fn average_sharpness(input: &PixelBuffer) -> Result<f64, SharpnessError> {
    average_sharpness_with_threshold(input, DEFAULT_THRESHOLD)
}

pub fn average_sharpness_with_threshold(
    input: &PixelBuffer,
    threshold: f64,
) -> Result<f64, SharpnessError> {
    let filtered = laplacian(input);
    threshold_average(filtered.as_slice(), threshold)
}

/// Scores `input` with the measure selected in `config`.
pub fn estimate(input: &PixelBuffer, config: &SharpnessConfig) -> Result<f64, SharpnessError> {
    match config.measure {
        Measure::Variance => variance_sharpness(input),
        Measure::ThresholdAverage => average_sharpness_with_threshold(input, config.threshold),
    }
}

/// Scores each channel of `input` independently.
pub fn rgb_sharpness(
    input: &RgbBuffer,
    config: &SharpnessConfig,
) -> Result<ChannelScores, SharpnessError> {
    Ok(ChannelScores {
        r: estimate(input.r(), config)?,
        g: estimate(input.g(), config)?,
        b: estimate(input.b(), config)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::buffer::{PixelBuffer, RgbBuffer};
    use crate::config::{Measure, SharpnessConfig};
    use crate::error::SharpnessError;

    use super::*;

    fn two_spikes(a: (usize, usize), b: (usize, usize)) -> PixelBuffer {
        let mut buf = PixelBuffer::new(5, 5);
        buf.set(a.0, a.1, 1.0);
        buf.set(b.0, b.1, 1.0);
        buf
    }

    #[test]
    fn variance_of_zero_image_is_zero() {
        assert_eq!(variance_sharpness(&PixelBuffer::new(6, 4)).unwrap(), 0.0);
    }

    #[test]
    fn variance_of_single_pixel_is_zero() {
        assert_eq!(
            variance_sharpness(&PixelBuffer::filled(1, 1, 5.0)).unwrap(),
            0.0
        );
    }

    #[test]
    fn variance_of_constant_image_comes_from_the_border() {
        // 4x4 of 5.0 filters to 25 at the corners, 15 on the edges, 0 inside.
        let v = variance_sharpness(&PixelBuffer::filled(4, 4, 5.0)).unwrap();
        assert_eq!(v, 1275.0 / 16.0);
    }

    #[test]
    fn variance_rejects_empty_buffer() {
        assert_eq!(
            variance_sharpness(&PixelBuffer::new(0, 3)),
            Err(SharpnessError::EmptyBuffer)
        );
    }

    #[test]
    fn variance_is_population_not_sample() {
        let values = [1.0, 3.0];
        let m = mean(&values).unwrap();
        assert_eq!(m, 2.0);
        assert_eq!(population_variance(&values, m).unwrap(), 1.0);
    }

    #[test]
    fn mean_accumulates_in_wide_precision() {
        let values = vec![0.1f32; 4_000_000];
        let m = mean(&values).unwrap();
        assert!((m - 0.1f32 as f64).abs() < 1e-9);
    }

    #[test]
    fn sharp_image_scores_higher_than_soft() {
        let sharp = PixelBuffer::from_fn(16, 16, |y, x| ((x / 2 + y / 2) % 2) as f32);
        let soft = PixelBuffer::from_fn(16, 16, |y, x| (x + y) as f32 / 30.0);
        assert!(variance_sharpness(&sharp).unwrap() > variance_sharpness(&soft).unwrap());
    }

    #[test]
    fn average_of_isolated_spike_is_center_response() {
        let mut buf = PixelBuffer::new(3, 3);
        buf.set(1, 1, 1.0);
        // Only the centre (8) passes; the neighbours are all -1.
        assert_eq!(average_sharpness(&buf).unwrap(), 8.0);
    }

    #[test]
    fn average_of_flat_image_has_no_signal() {
        let err = average_sharpness(&PixelBuffer::new(4, 4)).unwrap_err();
        assert_eq!(err, SharpnessError::NoSignal { threshold: 0.2 });
    }

    #[test]
    fn average_of_empty_image_has_no_signal() {
        assert!(matches!(
            average_sharpness(&PixelBuffer::new(0, 0)),
            Err(SharpnessError::NoSignal { .. })
        ));
    }

    #[test]
    fn threshold_is_strict_and_ignores_negatives() {
        assert_eq!(threshold_average(&[0.25, 0.75], 0.25).unwrap(), 0.75);
        assert_eq!(threshold_average(&[-50.0, 0.5, 1.5], 0.2).unwrap(), 1.0);
        assert!(threshold_average(&[-50.0, 0.1], 0.2).is_err());
    }

    #[test]
    fn threshold_average_ignores_sample_order() {
        let values = [0.5f32, -3.0, 1.0, 0.0, 2.0, 4.0];
        let mut reversed = values;
        reversed.reverse();
        assert_eq!(
            threshold_average(&values, 0.2).unwrap(),
            threshold_average(&reversed, 0.2).unwrap()
        );
    }

    #[test]
    fn average_depends_on_spatial_layout() {
        // Same pixel values; adjacent spikes cancel part of each other's response.
        let apart = two_spikes((1, 1), (3, 3));
        let adjacent = two_spikes((1, 1), (1, 2));
        assert_eq!(average_sharpness(&apart).unwrap(), 8.0);
        assert_eq!(average_sharpness(&adjacent).unwrap(), 7.0);
    }

    #[test]
    fn custom_threshold_changes_qualifying_set() {
        let adjacent = two_spikes((1, 1), (1, 2));
        assert!(matches!(
            average_sharpness_with_threshold(&adjacent, 7.0),
            Err(SharpnessError::NoSignal { .. })
        ));
    }

    #[test]
    fn estimate_follows_configured_measure() {
        let mut buf = PixelBuffer::new(3, 3);
        buf.set(1, 1, 1.0);
        let mut config = SharpnessConfig::default();
        assert_eq!(estimate(&buf, &config), variance_sharpness(&buf));
        config.measure = Measure::ThresholdAverage;
        assert_eq!(estimate(&buf, &config).unwrap(), 8.0);
    }

    #[test]
    fn rgb_scores_each_channel() {
        let mut spike = PixelBuffer::new(3, 3);
        spike.set(1, 1, 1.0);
        let flat = PixelBuffer::new(3, 3);
        let rgb = RgbBuffer::new(spike.clone(), flat, spike).unwrap();
        let scores = rgb_sharpness(&rgb, &SharpnessConfig::default()).unwrap();
        assert_eq!(scores.r, scores.b);
        assert_eq!(scores.g, 0.0);
        assert!(scores.r > 0.0);
    }
}
