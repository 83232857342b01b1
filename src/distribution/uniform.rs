use super::Scale;
use crate::error::{Result, invalid_value};
use crate::interval::Interval;
use crate::numeric::{Numeric, NumericType};
use crate::rng_util;

/// Uniform distribution over `[lower, upper)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
    data_type: NumericType,
    lower: Numeric,
    upper: Numeric,
    scale: Scale,
    quantization: Numeric,
}

impl Uniform {
    pub(super) fn float(lower: f64, upper: f64, scale: Scale, quantization: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(invalid_value!(
                "uniform bounds [{lower}, {upper}) must be finite and non-empty"
            ));
        }
        if quantization.is_nan() || quantization < 0.0 {
            return Err(invalid_value!("quantization must be non-negative"));
        }
        if scale == Scale::Logarithmic && lower <= 0.0 {
            return Err(invalid_value!(
                "logarithmic scale needs a positive lower bound"
            ));
        }
        Ok(Self {
            data_type: NumericType::Float,
            lower: Numeric::Float(lower),
            upper: Numeric::Float(upper),
            scale,
            quantization: Numeric::Float(quantization),
        })
    }

    pub(super) fn int(lower: i64, upper: i64, scale: Scale, quantization: i64) -> Result<Self> {
        if lower >= upper {
            return Err(invalid_value!(
                "uniform bounds [{lower}, {upper}) are empty"
            ));
        }
        if quantization < 0 {
            return Err(invalid_value!("quantization must be non-negative"));
        }
        if scale == Scale::Logarithmic && lower <= 0 {
            return Err(invalid_value!(
                "logarithmic scale needs a positive lower bound"
            ));
        }
        Ok(Self {
            data_type: NumericType::Int,
            lower: Numeric::Int(lower),
            upper: Numeric::Int(upper),
            scale,
            quantization: Numeric::Int(quantization),
        })
    }

    /// Whether draws are integers or floats.
    #[must_use]
    pub fn data_type(&self) -> NumericType {
        self.data_type
    }

    /// The inclusive lower bound.
    #[must_use]
    pub fn lower(&self) -> Numeric {
        self.lower
    }

    /// The exclusive upper bound.
    #[must_use]
    pub fn upper(&self) -> Numeric {
        self.upper
    }

    /// How draws are mapped back to values.
    #[must_use]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Grid step; zero means continuous.
    #[must_use]
    pub fn quantization(&self) -> Numeric {
        self.quantization
    }

    pub(super) fn bounds(&self) -> Interval {
        match (self.lower, self.upper) {
            (Numeric::Int(l), Numeric::Int(u)) => Interval::int(l, u),
            (l, u) => Interval::float(l.as_f64(), u.as_f64()),
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub(super) fn sample(&self, rng: &mut fastrand::Rng) -> Numeric {
        match (self.lower, self.upper, self.quantization) {
            (Numeric::Int(l), Numeric::Int(u), Numeric::Int(q)) => {
                let q = q.max(1);
                let value = if self.scale == Scale::Logarithmic {
                    let log_value = rng_util::f64_range(rng, (l as f64).ln(), (u as f64).ln());
                    let raw = (log_value.exp().floor() as i64).clamp(l, u - 1);
                    l + (raw - l) / q * q
                } else {
                    // Widen so that spans near the i64 limits do not overflow.
                    let span = i128::from(u) - i128::from(l);
                    let steps = (span + i128::from(q) - 1) / i128::from(q);
                    let k = rng.u64(0..steps as u64);
                    (i128::from(l) + i128::from(k) * i128::from(q)) as i64
                };
                Numeric::Int(value)
            }
            (lower, upper, quantization) => {
                let (l, u, q) = (lower.as_f64(), upper.as_f64(), quantization.as_f64());
                let value = match self.scale {
                    Scale::Logarithmic => {
                        let drawn = rng_util::f64_range(rng, l.ln(), u.ln())
                            .exp()
                            .clamp(l, u.next_down());
                        if q > 0.0 {
                            l + ((drawn - l) / q).floor() * q
                        } else {
                            drawn
                        }
                    }
                    Scale::Linear if q > 0.0 => {
                        let steps = ((u - l) / q).ceil().max(1.0) as u64;
                        let k = rng.u64(0..steps);
                        l + k as f64 * q
                    }
                    Scale::Linear => rng_util::f64_range(rng, l, u),
                };
                Numeric::Float(value)
            }
        }
    }
}
