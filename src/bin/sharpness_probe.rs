use std::f32::consts::TAU;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use image::{Rgb, RgbImage};
use sharpness::{
    ChannelScores, Kernel, Measure, PixelBuffer, RgbBuffer, SharpnessConfig, SharpnessError,
    convolve, estimate, rgb_sharpness, variance_sharpness,
};

const DEFAULT_SIZE: usize = 512;
const DEFAULT_ITERATIONS: usize = 20;
const MEASURE_ENV: &str = "SHARPNESS_MEASURE";
const PERIODS: &[usize] = &[3, 4, 8, 16, 32, 64];

#[derive(Debug, Serialize)]
struct PeriodScore {
    period: usize,
    variance: f64,
    score: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    size: usize,
    measure: Measure,
    threshold: f64,
    scores: Vec<PeriodScore>,
    rgb: Option<ChannelScores>,
}

fn median_ms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}

fn resolve_config() -> SharpnessConfig {
    let mut config = SharpnessConfig::load();
    if let Ok(raw) = std::env::var(MEASURE_ENV) {
        match Measure::parse(&raw) {
            Some(measure) => config.measure = measure,
            None => tracing::warn!(
                "{MEASURE_ENV}={raw:?} not recognised; keeping {:?}",
                config.measure
            ),
        }
    }
    config
}

/// Separable sinusoid in [0, 1]; shorter periods carry more high-frequency energy.
fn sinusoid(size: usize, period: usize) -> PixelBuffer {
    let step = TAU / period as f32;
    PixelBuffer::from_fn(size, size, |y, x| {
        0.5 + 0.5 * (x as f32 * step).sin() * (y as f32 * step).cos()
    })
}

/// 8-bit RGB pattern: fine detail in red, coarse in green, flat blue.
fn rgb_pattern(size: usize) -> RgbImage {
    let quantize = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    let fine = sinusoid(size, 4);
    let coarse = sinusoid(size, 32);
    RgbImage::from_fn(size as u32, size as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        Rgb([
            quantize(fine.get(y, x).unwrap_or(0.0)),
            quantize(coarse.get(y, x).unwrap_or(0.0)),
            128,
        ])
    })
}

/// Runs the configured measure, failing instead of timing a degenerate score.
fn measure_once(input: &PixelBuffer, config: &SharpnessConfig) -> Result<f64> {
    estimate(input, config).context("configured measure of probe buffer")
}

fn score_or_none(result: Result<f64, SharpnessError>, period: usize) -> Option<f64> {
    match result {
        Ok(score) => Some(score),
        Err(err) => {
            tracing::warn!(period, "no score: {err}");
            None
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args();
    let _bin = args.next();
    let size = match args.next() {
        Some(raw) => raw.parse::<usize>().with_context(|| {
            format!("usage: sharpness_probe [size] [iterations]; bad size {raw:?}")
        })?,
        None => DEFAULT_SIZE,
    };
    if size == 0 {
        anyhow::bail!("size must be at least 1");
    }
    let iterations = args
        .next()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_ITERATIONS)
        .max(1);

    let config = resolve_config();
    eprintln!(
        "Probing {size}x{size} buffers, {iterations} iterations, measure = {:?}",
        config.measure
    );

    let laplacian = Kernel::laplacian_3x3();
    let input = sinusoid(size, PERIODS[0]);

    measure_once(&input, &config)?;

    let mut convolve_samples = Vec::with_capacity(iterations);
    let mut variance_samples = Vec::with_capacity(iterations);
    let mut measure_samples = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let t0 = Instant::now();
        let _filtered = convolve(&laplacian, &input);
        convolve_samples.push(t0.elapsed().as_secs_f64() * 1000.0);

        let t0 = Instant::now();
        variance_sharpness(&input).context("variance of probe buffer")?;
        variance_samples.push(t0.elapsed().as_secs_f64() * 1000.0);

        let t0 = Instant::now();
        measure_once(&input, &config)?;
        measure_samples.push(t0.elapsed().as_secs_f64() * 1000.0);
    }

    let batch_start = Instant::now();
    let scores = PERIODS
        .par_iter()
        .map(|&period| -> Result<PeriodScore> {
            let buf = sinusoid(size, period);
            let variance = variance_sharpness(&buf)
                .with_context(|| format!("variance failed for period {period}"))?;
            Ok(PeriodScore {
                period,
                variance,
                score: score_or_none(estimate(&buf, &config), period),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let batch_wall_s = batch_start.elapsed().as_secs_f64();

    let rgb = match rgb_sharpness(&RgbBuffer::from_rgb8(&rgb_pattern(size)), &config) {
        Ok(scores) => Some(scores),
        Err(err) => {
            tracing::warn!("no rgb score: {err}");
            None
        }
    };

    println!("METRIC size={size}");
    println!("METRIC convolve_ms_median={:.3}", median_ms(&convolve_samples));
    println!("METRIC variance_ms_median={:.3}", median_ms(&variance_samples));
    println!("METRIC measure_ms_median={:.3}", median_ms(&measure_samples));
    println!("METRIC batch_wall_s={:.3}", batch_wall_s);
    println!(
        "METRIC batch_buffers_per_sec={:.3}",
        PERIODS.len() as f64 / batch_wall_s.max(1e-9)
    );

    let report = ProbeReport {
        size,
        measure: config.measure,
        threshold: config.threshold,
        scores,
        rgb,
    };
    println!("{}", serde_json::to_string(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use sharpness::{Measure, PixelBuffer, RgbBuffer, SharpnessConfig, variance_sharpness};

    use super::{measure_once, median_ms, rgb_pattern, sinusoid};

    #[test]
    fn median_handles_even_and_odd_counts() {
        assert_eq!(median_ms(&[]), 0.0);
        assert_eq!(median_ms(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median_ms(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn shorter_periods_score_sharper() {
        let fine = variance_sharpness(&sinusoid(64, 4)).unwrap();
        let coarse = variance_sharpness(&sinusoid(64, 32)).unwrap();
        assert!(fine > coarse);
    }

    #[test]
    fn measure_once_fails_on_flat_buffer() {
        let config = SharpnessConfig {
            measure: Measure::ThresholdAverage,
            ..SharpnessConfig::default()
        };
        let err = measure_once(&PixelBuffer::new(8, 8), &config).unwrap_err();
        assert!(format!("{err:#}").contains("no signal"));
        assert!(measure_once(&sinusoid(8, 4), &config).is_ok());
    }

    #[test]
    fn rgb_pattern_puts_detail_in_red() {
        let rgb = RgbBuffer::from_rgb8(&rgb_pattern(32));
        let red = variance_sharpness(rgb.r()).unwrap();
        let green = variance_sharpness(rgb.g()).unwrap();
        assert!(red > green);
    }
}
