use super::Scale;
use crate::error::{Result, invalid_value};
use crate::interval::Interval;
use crate::numeric::{Numeric, NumericType};
use crate::rng_util;

/// Normal distribution `N(mu, sigma)`, optionally exponentiated and rounded
/// to a quantization step.
#[derive(Clone, Debug, PartialEq)]
pub struct Normal {
    data_type: NumericType,
    mu: f64,
    sigma: f64,
    scale: Scale,
    quantization: f64,
}

impl Normal {
    pub(super) fn new(
        data_type: NumericType,
        mu: f64,
        sigma: f64,
        scale: Scale,
        quantization: f64,
    ) -> Result<Self> {
        if !mu.is_finite() {
            return Err(invalid_value!("mu must be finite"));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(invalid_value!(
                "sigma {sigma} must be finite and non-negative"
            ));
        }
        if quantization.is_nan() || quantization < 0.0 {
            return Err(invalid_value!("quantization must be non-negative"));
        }
        Ok(Self {
            data_type,
            mu,
            sigma,
            scale,
            quantization,
        })
    }

    /// Whether draws are integers or floats.
    #[must_use]
    pub fn data_type(&self) -> NumericType {
        self.data_type
    }

    /// Mean, before the scale is applied.
    #[must_use]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Standard deviation, before the scale is applied.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// How draws are mapped back to values.
    #[must_use]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Grid step; zero means continuous.
    #[must_use]
    pub fn quantization(&self) -> f64 {
        self.quantization
    }

    pub(super) fn bounds(&self) -> Interval {
        match (self.data_type, self.scale) {
            (NumericType::Float, Scale::Linear) => Interval::unbounded(NumericType::Float),
            (NumericType::Float, Scale::Logarithmic) => Interval::float(0.0, f64::INFINITY),
            (NumericType::Int, Scale::Linear) => Interval::unbounded(NumericType::Int),
            (NumericType::Int, Scale::Logarithmic) => Interval::int(0, i64::MAX),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn sample(&self, rng: &mut fastrand::Rng) -> Numeric {
        let mut v = self.mu + self.sigma * rng_util::standard_normal(rng);
        if self.scale == Scale::Logarithmic {
            v = v.exp();
        }
        if self.quantization > 0.0 {
            v = (v / self.quantization).round() * self.quantization;
        }
        match self.data_type {
            // `as` saturates at the i64 limits.
            NumericType::Int => Numeric::Int(v.round() as i64),
            NumericType::Float => Numeric::Float(v),
        }
    }
}
