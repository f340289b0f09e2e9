/// Failures reported by kernel construction, buffer construction and the
/// sharpness reductions.
#[derive(Clone, Debug, PartialEq)]
pub enum SharpnessError {
    /// Kernel dimensions are zero or disagree with the coefficient count.
    MalformedKernel {
        height: usize,
        width: usize,
        coefficients: usize,
    },
    /// A buffer's length does not match its declared height * width.
    DimensionMismatch {
        height: usize,
        width: usize,
        len: usize,
    },
    /// The three channels of an RGB buffer do not share one shape.
    ChannelMismatch {
        r: (usize, usize),
        g: (usize, usize),
        b: (usize, usize),
    },
    /// A statistic was requested over zero samples.
    EmptyBuffer,
    /// No filtered sample exceeded the threshold.
    NoSignal { threshold: f64 },
}

impl std::fmt::Display for SharpnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharpnessError::MalformedKernel {
                height,
                width,
                coefficients,
            } => write!(
                f,
                "malformed kernel: {height}x{width} needs {} coefficients, got {coefficients}",
                height * width
            ),
            SharpnessError::DimensionMismatch { height, width, len } => write!(
                f,
                "buffer of length {len} does not match {height}x{width}"
            ),
            SharpnessError::ChannelMismatch { r, g, b } => write!(
                f,
                "rgb channel shapes differ (r={}x{}, g={}x{}, b={}x{})",
                r.0, r.1, g.0, g.1, b.0, b.1
            ),
            SharpnessError::EmptyBuffer => write!(f, "no signal: buffer has no samples"),
            SharpnessError::NoSignal { threshold } => {
                write!(f, "no signal: no filtered sample exceeds {threshold}")
            }
        }
    }
}

impl std::error::Error for SharpnessError {}
