use crate::error::SharpnessError;

/// Coefficients of the built-in 3x3 Laplacian, row-major.
const LAPLACIAN_3X3: [f64; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

#[derive(Clone, Debug, PartialEq)]
/// Immutable `height x width` matrix of filter coefficients, row-major.
pub struct Kernel {
    height: usize,
    width: usize,
    coefficients: Vec<f64>,
}

impl Kernel {
    /// Validates that both dimensions are non-zero and match the coefficient count.
    pub fn new(
        height: usize,
        width: usize,
        coefficients: Vec<f64>,
    ) -> Result<Self, SharpnessError> {
        if height == 0 || width == 0 || height.checked_mul(width) != Some(coefficients.len()) {
            return Err(SharpnessError::MalformedKernel {
                height,
                width,
                coefficients: coefficients.len(),
            });
        }
        Ok(Self {
            height,
            width,
            coefficients,
        })
    }

    /// The 3x3 discrete Laplacian: eight neighbours at -1, centre at 8.
    pub fn laplacian_3x3() -> Self {
        Self {
            height: 3,
            width: 3,
            coefficients: LAPLACIAN_3X3.to_vec(),
        }
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
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Offset of the anchor cell, `(height / 2, width / 2)`.
    #[inline]
    pub fn center(&self) -> (usize, usize) {
        (self.height / 2, self.width / 2)
    }

    #[inline]
    pub fn get(&self, fy: usize, fx: usize) -> f64 {
        self.coefficients[fy * self.width + fx]
    }
}
