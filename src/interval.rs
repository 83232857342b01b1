//! Numeric intervals used for parameter domains and distribution bounds.

use core::cmp::Ordering;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, invalid_value};
use crate::numeric::{Numeric, NumericType};

/// A one-dimensional numeric interval with open or closed ends.
///
/// Both bounds always share the interval's [`NumericType`]. Unbounded integer
/// intervals use `i64::MIN`/`i64::MAX`, unbounded float intervals use
/// infinities.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    numeric_type: NumericType,
    lower: Numeric,
    upper: Numeric,
    lower_included: bool,
    upper_included: bool,
}

fn cmp_numeric(a: Numeric, b: Numeric) -> Ordering {
    match (a, b) {
        (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
        (a, b) => a.as_f64().total_cmp(&b.as_f64()),
    }
}

impl Interval {
    /// Creates an interval, checking that both bounds have `numeric_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) if a bound
    /// has the wrong type or is NaN.
    pub fn new(
        numeric_type: NumericType,
        lower: Numeric,
        upper: Numeric,
        lower_included: bool,
        upper_included: bool,
    ) -> Result<Self> {
        if lower.numeric_type() != numeric_type || upper.numeric_type() != numeric_type {
            return Err(invalid_value!(
                "interval bounds must both be {numeric_type:?}"
            ));
        }
        if lower.as_f64().is_nan() || upper.as_f64().is_nan() {
            return Err(invalid_value!("interval bounds cannot be NaN"));
        }
        Ok(Self {
            numeric_type,
            lower,
            upper,
            lower_included,
            upper_included,
        })
    }

    /// The half-open float interval `[lower, upper)`.
    #[must_use]
    pub fn float(lower: f64, upper: f64) -> Self {
        Self {
            numeric_type: NumericType::Float,
            lower: Numeric::Float(lower),
            upper: Numeric::Float(upper),
            lower_included: true,
            upper_included: false,
        }
    }

    /// The half-open integer interval `[lower, upper)`.
    #[must_use]
    pub fn int(lower: i64, upper: i64) -> Self {
        Self {
            numeric_type: NumericType::Int,
            lower: Numeric::Int(lower),
            upper: Numeric::Int(upper),
            lower_included: true,
            upper_included: false,
        }
    }

    /// The whole line for `numeric_type`.
    #[must_use]
    pub fn unbounded(numeric_type: NumericType) -> Self {
        match numeric_type {
            NumericType::Int => Self {
                upper_included: true,
                ..Self::int(i64::MIN, i64::MAX)
            },
            NumericType::Float => Self {
                lower_included: false,
                ..Self::float(f64::NEG_INFINITY, f64::INFINITY)
            },
        }
    }

    /// Whether the bounds are integers or floats.
    #[must_use]
    pub fn numeric_type(&self) -> NumericType {
        self.numeric_type
    }

    /// The lower bound.
    #[must_use]
    pub fn lower(&self) -> Numeric {
        self.lower
    }

    /// The upper bound.
    #[must_use]
    pub fn upper(&self) -> Numeric {
        self.upper
    }

    /// Returns `true` if the lower bound belongs to the interval.
    #[must_use]
    pub fn lower_included(&self) -> bool {
        self.lower_included
    }

    /// Returns `true` if the upper bound belongs to the interval.
    #[must_use]
    pub fn upper_included(&self) -> bool {
        self.upper_included
    }

    /// Closed integer bounds, or `None` when the integer interval is empty.
    fn closed_int(&self) -> Option<(i64, i64)> {
        let (Numeric::Int(l), Numeric::Int(u)) = (self.lower, self.upper) else {
            return None;
        };
        let l = if self.lower_included { Some(l) } else { l.checked_add(1) };
        let u = if self.upper_included { Some(u) } else { u.checked_sub(1) };
        match (l, u) {
            (Some(l), Some(u)) if l <= u => Some((l, u)),
            _ => None,
        }
    }

    /// Returns `true` if no value lies in the interval.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.numeric_type {
            NumericType::Int => self.closed_int().is_none(),
            NumericType::Float => match cmp_numeric(self.lower, self.upper) {
                Ordering::Less => false,
                Ordering::Equal => !(self.lower_included && self.upper_included),
                Ordering::Greater => true,
            },
        }
    }

    /// Returns `true` if `value` lies inside the interval.
    ///
    /// Values of the other numeric type are never contained.
    #[must_use]
    pub fn contains(&self, value: Numeric) -> bool {
        if value.numeric_type() != self.numeric_type || value.as_f64().is_nan() {
            return false;
        }
        let above = match cmp_numeric(value, self.lower) {
            Ordering::Greater => true,
            Ordering::Equal => self.lower_included,
            Ordering::Less => false,
        };
        let below = match cmp_numeric(value, self.upper) {
            Ordering::Less => true,
            Ordering::Equal => self.upper_included,
            Ordering::Greater => false,
        };
        above && below
    }

    /// Returns `true` if every value of `other` lies inside `self`.
    #[must_use]
    pub fn includes(&self, other: &Interval) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.numeric_type != other.numeric_type || self.is_empty() {
            return false;
        }
        if let (Some((l1, u1)), Some((l2, u2))) = (self.closed_int(), other.closed_int()) {
            return l1 <= l2 && u2 <= u1;
        }
        let lower_ok = match cmp_numeric(self.lower, other.lower) {
            Ordering::Less => true,
            Ordering::Equal => self.lower_included || !other.lower_included,
            Ordering::Greater => false,
        };
        let upper_ok = match cmp_numeric(self.upper, other.upper) {
            Ordering::Greater => true,
            Ordering::Equal => self.upper_included || !other.upper_included,
            Ordering::Less => false,
        };
        lower_ok && upper_ok
    }

    /// The smallest interval containing both `self` and `other`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) when the
    /// intervals have different numeric types.
    pub fn union(&self, other: &Interval) -> Result<Interval> {
        if self.numeric_type != other.numeric_type {
            return Err(invalid_value!("cannot unite intervals of different types"));
        }
        if self.is_empty() {
            return Ok(*other);
        }
        if other.is_empty() {
            return Ok(*self);
        }
        let (lower, lower_included) = match cmp_numeric(self.lower, other.lower) {
            Ordering::Less => (self.lower, self.lower_included),
            Ordering::Greater => (other.lower, other.lower_included),
            Ordering::Equal => (self.lower, self.lower_included || other.lower_included),
        };
        let (upper, upper_included) = match cmp_numeric(self.upper, other.upper) {
            Ordering::Greater => (self.upper, self.upper_included),
            Ordering::Less => (other.upper, other.upper_included),
            Ordering::Equal => (self.upper, self.upper_included || other.upper_included),
        };
        Ok(Interval {
            numeric_type: self.numeric_type,
            lower,
            upper,
            lower_included,
            upper_included,
        })
    }

    /// The overlap of `self` and `other`; may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) when the
    /// intervals have different numeric types.
    pub fn intersect(&self, other: &Interval) -> Result<Interval> {
        if self.numeric_type != other.numeric_type {
            return Err(invalid_value!(
                "cannot intersect intervals of different types"
            ));
        }
        let (lower, lower_included) = match cmp_numeric(self.lower, other.lower) {
            Ordering::Greater => (self.lower, self.lower_included),
            Ordering::Less => (other.lower, other.lower_included),
            Ordering::Equal => (self.lower, self.lower_included && other.lower_included),
        };
        let (upper, upper_included) = match cmp_numeric(self.upper, other.upper) {
            Ordering::Less => (self.upper, self.upper_included),
            Ordering::Greater => (other.upper, other.upper_included),
            Ordering::Equal => (self.upper, self.upper_included && other.upper_included),
        };
        Ok(Interval {
            numeric_type: self.numeric_type,
            lower,
            upper,
            lower_included,
            upper_included,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_included { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_included { ']' } else { ')' },
        )
    }
}
