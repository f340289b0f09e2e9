use crate::buffer::{Pixel, PixelBuffer, RgbBuffer};
use crate::error::SharpnessError;

use super::kernel::Kernel;

/// Correlates `kernel` with `input`, anchoring the kernel centre on each output pixel.
///
/// Taps that fall outside the image are skipped, not clamped or wrapped, and
/// the remaining sum is not renormalized: border pixels see fewer taps than
/// interior ones. Dot products accumulate in f64.
pub fn convolve(kernel: &Kernel, input: &PixelBuffer) -> PixelBuffer {
    let height = input.height();
    let width = input.width();
    let (kh, kw) = (kernel.height(), kernel.width());
    let (yoffs, xoffs) = kernel.center();
    let coefs = kernel.coefficients();

    tracing::trace!(height, width, kh, kw, "convolve");

    let mut output = PixelBuffer::new(height, width);
    let out = output.as_mut_slice();
    for y in 0..height {
        // Kernel rows whose tap lands inside [0, height).
        let fy_start = yoffs.saturating_sub(y);
        let fy_end = kh.min(height + yoffs - y);
        for x in 0..width {
            let fx_start = xoffs.saturating_sub(x);
            let fx_end = kw.min(width + xoffs - x);

            let mut dotp = 0.0f64;
            for fy in fy_start..fy_end {
                let iy = y + fy - yoffs;
                let img_row = input.row(iy);
                let filt_row = &coefs[fy * kw..(fy + 1) * kw];
                for fx in fx_start..fx_end {
                    let ix = x + fx - xoffs;
                    dotp += img_row[ix] as f64 * filt_row[fx];
                }
            }
            out[y * width + x] = dotp as Pixel;
        }
    }

    output
}

/// Convolves a caller-shaped row-major slice.
pub fn convolve_slice(
    kernel: &Kernel,
    data: &[Pixel],
    height: usize,
    width: usize,
) -> Result<PixelBuffer, SharpnessError> {
    let input = PixelBuffer::from_vec(height, width, data.to_vec())?;
    Ok(convolve(kernel, &input))
}

/// Convolves each channel independently; channels are never mixed.
pub fn convolve_rgb(kernel: &Kernel, input: &RgbBuffer) -> RgbBuffer {
    let [r, g, b] = input.channels().map(|channel| convolve(kernel, channel));
    RgbBuffer::from_same_shape(r, g, b)
}
