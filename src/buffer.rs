//! Owned single-channel and three-channel sample buffers in row-major layout.
//!
//! Shapes are checked once, at construction, so the convolution and the
//! reductions can index without further validation.

use image::RgbImage;

use crate::error::SharpnessError;

/// Sample type stored in every buffer.
pub type Pixel = f32;

/// Number of samples in a `height x width` buffer. Panics when the product overflows.
fn sample_count(height: usize, width: usize) -> usize {
    match height.checked_mul(width) {
        Some(n) => n,
        None => panic!("buffer shape {height}x{width} overflows usize"),
    }
}

#[derive(Clone, Debug, PartialEq)]
/// One channel of intensities, `height * width` samples stored row by row.
pub struct PixelBuffer {
    height: usize,
    width: usize,
    data: Vec<Pixel>,
}

impl PixelBuffer {
    /// Zero-initialized buffer of `height x width`.
    pub fn new(height: usize, width: usize) -> Self {
        Self::filled(height, width, 0.0)
    }

    pub fn filled(height: usize, width: usize, value: Pixel) -> Self {
        Self {
            height,
            width,
            data: vec![value; sample_count(height, width)],
        }
    }

    /// Builds a buffer by evaluating `f(y, x)` for every position.
    pub fn from_fn<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Pixel,
    {
        let mut data = Vec::with_capacity(sample_count(height, width));
        for y in 0..height {
            for x in 0..width {
                data.push(f(y, x));
            }
        }
        Self {
            height,
            width,
            data,
        }
    }

    /// Wraps a row-major vector, rejecting it when the length disagrees with the shape.
    pub fn from_vec(
        height: usize,
        width: usize,
        data: Vec<Pixel>,
    ) -> Result<Self, SharpnessError> {
        if height.checked_mul(width) != Some(data.len()) {
            return Err(SharpnessError::DimensionMismatch {
                height,
                width,
                len: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> Option<Pixel> {
        if y < self.height && x < self.width {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Writes `value` at (y, x). Panics when the position is out of bounds.
    #[inline]
    pub fn set(&mut self, y: usize, x: usize, value: Pixel) {
        assert!(
            y < self.height && x < self.width,
            "position ({y}, {x}) outside {}x{}",
            self.height,
            self.width
        );
        self.data[y * self.width + x] = value;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[Pixel] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn as_slice(&self) -> &[Pixel] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Pixel] {
        &mut self.data
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Three equally shaped channels.
pub struct RgbBuffer {
    r: PixelBuffer,
    g: PixelBuffer,
    b: PixelBuffer,
}

impl RgbBuffer {
    pub fn new(r: PixelBuffer, g: PixelBuffer, b: PixelBuffer) -> Result<Self, SharpnessError> {
        let shape = |c: &PixelBuffer| (c.height(), c.width());
        if shape(&r) != shape(&g) || shape(&r) != shape(&b) {
            return Err(SharpnessError::ChannelMismatch {
                r: shape(&r),
                g: shape(&g),
                b: shape(&b),
            });
        }
        Ok(Self { r, g, b })
    }

    /// For channels produced by a shape-preserving operation on one `RgbBuffer`.
    pub(crate) fn from_same_shape(r: PixelBuffer, g: PixelBuffer, b: PixelBuffer) -> Self {
        debug_assert_eq!((r.height(), r.width()), (g.height(), g.width()));
        debug_assert_eq!((r.height(), r.width()), (b.height(), b.width()));
        Self { r, g, b }
    }

    /// Splits an 8-bit RGB image into three channels scaled to [0, 1].
    pub fn from_rgb8(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let (width, height) = (width as usize, height as usize);
        let count = sample_count(height, width);
        let mut channels = [
            Vec::with_capacity(count),
            Vec::with_capacity(count),
            Vec::with_capacity(count),
        ];
        for px in img.pixels() {
            for (c, samples) in channels.iter_mut().enumerate() {
                samples.push(px[c] as Pixel / 255.0);
            }
        }
        let [r, g, b] = channels.map(|data| PixelBuffer {
            height,
            width,
            data,
        });
        Self { r, g, b }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.r.height()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.r.width()
    }

    pub fn r(&self) -> &PixelBuffer {
        &self.r
    }

    pub fn g(&self) -> &PixelBuffer {
        &self.g
    }

    pub fn b(&self) -> &PixelBuffer {
        &self.b
    }

    pub fn channels(&self) -> [&PixelBuffer; 3] {
        [&self.r, &self.g, &self.b]
    }
}
