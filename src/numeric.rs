//! Raw numeric sample values.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The numeric type a distribution dimension produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumericType {
    /// 64-bit signed integers.
    Int,
    /// 64-bit floats.
    Float,
}

/// A raw sample drawn from a distribution, before it is converted into a
/// parameter value.
///
/// Enumerated parameters (categorical, ordinal, discrete) receive `Int`
/// samples that index into their value set.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Numeric {
    /// An integer sample.
    Int(i64),
    /// A floating-point sample.
    Float(f64),
}

impl Numeric {
    /// Returns the type of this sample.
    #[must_use]
    pub fn numeric_type(self) -> NumericType {
        match self {
            Numeric::Int(_) => NumericType::Int,
            Numeric::Float(_) => NumericType::Float,
        }
    }

    /// Returns the sample as a float, converting integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(v) => v as f64,
            Numeric::Float(v) => v,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(v) => write!(f, "{v}"),
            Numeric::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Numeric::Int(v)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}
