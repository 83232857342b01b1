//! Parameters: the typed dimensions of a configuration space.
//!
//! A [`Parameter`] is an immutable, shared handle. Every parameter gets a
//! process-unique [`ParamId`] at creation; clones share it.
//!
//! | Kind | Domain | Default distribution |
//! |------|--------|----------------------|
//! | Numerical (float or int) | `[lower, upper)` on a quantization grid | uniform over the domain |
//! | Categorical | unordered value set | uniform over indices |
//! | Ordinal | ordered value set | uniform over indices |
//! | Discrete | ordered numeric set | uniform over indices |
//! | String | any string | none (cannot be sampled) |
//!
//! # Example
//!
//! ```
//! use configspace::Datum;
//! use configspace::parameter::Parameter;
//!
//! let lr = Parameter::float("lr", 1e-5, 1e-1).default_value(1e-3).build().unwrap();
//! let layers = Parameter::int("layers", 1, 10).build().unwrap();
//! let optimizer = Parameter::categorical("optimizer", ["sgd", "adam"]).build().unwrap();
//!
//! assert!(lr.check_value(&Datum::Float(0.01)));
//! assert!(!layers.check_value(&Datum::Int(10)));
//! assert_eq!(optimizer.default_value(), &Datum::from("sgd"));
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::collections::HashMap;
use std::sync::Arc;

use crate::datum::Datum;
use crate::distribution::{Distribution, Scale, draw_with_rejection};
use crate::error::{Error, Result, invalid_value};
use crate::interval::Interval;
use crate::lifecycle::DestroyCallbacks;
use crate::numeric::{Numeric, NumericType};

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// A unique identifier for a parameter instance.
///
/// Each parameter is assigned a unique `ParamId` at creation time. Cloning a parameter
/// copies its `ParamId`, so clones refer to the same logical parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u64);

impl ParamId {
    fn next() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "param_{}", self.0)
    }
}

/// The kind tag of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// An integer or float range, optionally quantized.
    Numerical,
    /// An unordered set of values.
    Categorical,
    /// A set of values ranked in declaration order.
    Ordinal,
    /// A sorted set of numbers.
    Discrete,
    /// Any string; never sampled.
    String,
}

/// Domain of a numerical parameter: `[lower, upper)` on a quantization grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Numerical {
    data_type: NumericType,
    lower: Numeric,
    upper: Numeric,
    quantization: Numeric,
}

impl Numerical {
    /// Whether values are integers or floats.
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

    /// Grid step; zero means continuous for floats and a step of 1 for ints.
    #[must_use]
    pub fn quantization(&self) -> Numeric {
        self.quantization
    }

    /// The domain as an [`Interval`], closed below and open above.
    #[must_use]
    pub fn interval(&self) -> Interval {
        match (self.lower, self.upper) {
            (Numeric::Int(l), Numeric::Int(u)) => Interval::int(l, u),
            (l, u) => Interval::float(l.as_f64(), u.as_f64()),
        }
    }

    /// Returns `true` if a raw sample lies in `[lower, upper)`, before any
    /// snapping.
    fn admits(&self, raw: Numeric) -> bool {
        match (self.data_type, raw) {
            (NumericType::Int, Numeric::Int(_)) => self.interval().contains(raw),
            _ => {
                let value = raw.as_f64();
                value >= self.lower.as_f64() && value < self.upper.as_f64()
            }
        }
    }

    /// Maps a raw sample onto the grid point at or below it; `None` when it
    /// cannot be represented.
    ///
    /// Grid point `lower + k * step` owns `[lower + k * step, lower + (k + 1) * step)`.
    #[allow(clippy::cast_possible_truncation)]
    fn snap(&self, raw: Numeric) -> Option<Numeric> {
        match (self.lower, self.upper, self.quantization) {
            (Numeric::Int(lower), Numeric::Int(_), Numeric::Int(step)) => {
                let value = match raw {
                    Numeric::Int(value) => value,
                    Numeric::Float(x) if x.is_finite() => x.floor() as i64,
                    Numeric::Float(_) => return None,
                };
                let step = i128::from(step.max(1));
                let steps = (i128::from(value) - i128::from(lower)).div_euclid(step);
                i64::try_from(i128::from(lower) + steps * step)
                    .ok()
                    .map(Numeric::Int)
            }
            (Numeric::Float(lower), Numeric::Float(upper), Numeric::Float(step)) => {
                let value = raw.as_f64();
                if step > 0.0 {
                    let mut steps = ((value - lower) / step).floor();
                    // Rounding can carry the last grid point onto the open bound.
                    if lower + steps * step >= upper {
                        steps -= 1.0;
                    }
                    Some(Numeric::Float(lower + steps * step))
                } else {
                    Some(Numeric::Float(value))
                }
            }
            _ => None,
        }
    }

    fn on_grid(&self, value: Numeric) -> bool {
        match (self.lower, self.quantization, value) {
            (Numeric::Int(l), Numeric::Int(q), Numeric::Int(v)) => {
                q <= 1 || (i128::from(v) - i128::from(l)) % i128::from(q) == 0
            }
            (Numeric::Float(l), Numeric::Float(q), Numeric::Float(v)) => {
                if q <= 0.0 {
                    return true;
                }
                let k = (v - l) / q;
                (k - k.round()).abs() <= 1e-9 * k.abs().max(1.0)
            }
            _ => false,
        }
    }
}

/// An indexed value set shared by categorical, ordinal and discrete kinds.
///
/// Lookups by value are O(1) through a hash map from value to position.
#[derive(Clone, Debug)]
pub struct ValueSet {
    values: Vec<Datum>,
    index: HashMap<Datum, usize>,
}

impl ValueSet {
    fn new(values: Vec<Datum>) -> Result<Self> {
        if values.is_empty() {
            return Err(invalid_value!("value set cannot be empty"));
        }
        let mut index = HashMap::with_capacity(values.len());
        for (i, v) in values.iter().enumerate() {
            if v.is_inactive() {
                return Err(invalid_value!("inactive cannot be a parameter value"));
            }
            if index.insert(v.clone(), i).is_some() {
                return Err(invalid_value!("duplicate value {v} in value set"));
            }
        }
        Ok(Self { values, index })
    }

    /// The values in index order.
    #[must_use]
    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a built parameter; empty sets are rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of `value`, or `None` if it is not in the set.
    #[must_use]
    pub fn position(&self, value: &Datum) -> Option<usize> {
        self.index.get(value).copied()
    }
}

/// What a parameter's values look like.
#[derive(Clone, Debug)]
pub enum ParameterKind {
    /// A numeric range.
    Numerical(Numerical),
    /// Values compared by equality only.
    Categorical(ValueSet),
    /// Values ordered by their position in the set.
    Ordinal(ValueSet),
    /// Numeric values in increasing order, all of one numeric type.
    Discrete(ValueSet),
    /// Free-form strings.
    String,
}

struct ParameterInner {
    id: ParamId,
    name: String,
    kind: ParameterKind,
    default_value: Datum,
    default_distribution: Option<Distribution>,
    callbacks: DestroyCallbacks,
}

/// A shared, immutable parameter.
///
/// Equality and hashing use the [`ParamId`], so clones are equal to each
/// other and distinct parameters with the same name are not.
#[derive(Clone)]
pub struct Parameter(Arc<ParameterInner>);

impl Parameter {
    /// Starts a float parameter over `[lower, upper)`.
    #[must_use]
    pub fn float(name: impl Into<String>, lower: f64, upper: f64) -> NumericalBuilder {
        NumericalBuilder {
            name: name.into(),
            lower: Numeric::Float(lower),
            upper: Numeric::Float(upper),
            quantization: Numeric::Float(0.0),
            default_value: None,
        }
    }

    /// Starts an integer parameter over `[lower, upper)`.
    #[must_use]
    pub fn int(name: impl Into<String>, lower: i64, upper: i64) -> NumericalBuilder {
        NumericalBuilder {
            name: name.into(),
            lower: Numeric::Int(lower),
            upper: Numeric::Int(upper),
            quantization: Numeric::Int(0),
            default_value: None,
        }
    }

    /// Starts an unordered categorical parameter.
    #[must_use]
    pub fn categorical<I, T>(name: impl Into<String>, values: I) -> EnumeratedBuilder
    where
        I: IntoIterator<Item = T>,
        T: Into<Datum>,
    {
        EnumeratedBuilder::new(name.into(), ParameterType::Categorical, values)
    }

    /// Starts an ordinal parameter; `values` are listed from lowest to highest rank.
    #[must_use]
    pub fn ordinal<I, T>(name: impl Into<String>, values: I) -> EnumeratedBuilder
    where
        I: IntoIterator<Item = T>,
        T: Into<Datum>,
    {
        EnumeratedBuilder::new(name.into(), ParameterType::Ordinal, values)
    }

    /// Starts a discrete parameter over a set of numbers of one type.
    ///
    /// Values are stored in increasing order.
    #[must_use]
    pub fn discrete<I, T>(name: impl Into<String>, values: I) -> EnumeratedBuilder
    where
        I: IntoIterator<Item = T>,
        T: Into<Datum>,
    {
        EnumeratedBuilder::new(name.into(), ParameterType::Discrete, values)
    }

    /// Creates a string parameter accepting any string value.
    ///
    /// String parameters can be bound and evaluated but not sampled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `name` is not an identifier.
    pub fn string(name: impl Into<String>) -> Result<Self> {
        Self::create(
            name.into(),
            ParameterKind::String,
            Datum::String(String::new()),
        )
    }

    // Names must read back through the expression parser.
    fn create(name: String, kind: ParameterKind, default_value: Datum) -> Result<Self> {
        if !is_identifier(&name) {
            return Err(invalid_value!("'{name}' is not a valid parameter name"));
        }
        let default_distribution = match &kind {
            ParameterKind::Numerical(n) => Some(match (n.lower, n.upper, n.quantization) {
                (Numeric::Int(l), Numeric::Int(u), Numeric::Int(q)) => {
                    Distribution::uniform_int(l, u, Scale::Linear, q)?
                }
                (l, u, q) => {
                    Distribution::uniform_float(l.as_f64(), u.as_f64(), Scale::Linear, q.as_f64())?
                }
            }),
            ParameterKind::Categorical(set)
            | ParameterKind::Ordinal(set)
            | ParameterKind::Discrete(set) => Some(Distribution::uniform_int(
                0,
                i64::try_from(set.len()).map_err(|_| invalid_value!("value set too large"))?,
                Scale::Linear,
                0,
            )?),
            ParameterKind::String => None,
        };
        let parameter = Self(Arc::new(ParameterInner {
            id: ParamId::next(),
            name,
            kind,
            default_value,
            default_distribution,
            callbacks: DestroyCallbacks::new(),
        }));
        if !parameter.check_value(parameter.default_value()) {
            return Err(invalid_value!(
                "default value {} is outside the domain of '{}'",
                parameter.default_value(),
                parameter.name()
            ));
        }
        Ok(parameter)
    }

    /// Process-unique identity, shared by clones.
    #[must_use]
    pub fn id(&self) -> ParamId {
        self.0.id
    }

    /// The name expressions use to refer to this parameter.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The domain, with its bounds or value set.
    #[must_use]
    pub fn kind(&self) -> &ParameterKind {
        &self.0.kind
    }

    /// The kind tag, without the domain.
    #[must_use]
    pub fn parameter_type(&self) -> ParameterType {
        match self.kind() {
            ParameterKind::Numerical(_) => ParameterType::Numerical,
            ParameterKind::Categorical(_) => ParameterType::Categorical,
            ParameterKind::Ordinal(_) => ParameterType::Ordinal,
            ParameterKind::Discrete(_) => ParameterType::Discrete,
            ParameterKind::String => ParameterType::String,
        }
    }

    /// The value used by the default configuration when active.
    #[must_use]
    pub fn default_value(&self) -> &Datum {
        &self.0.default_value
    }

    /// The value set of an enumerated parameter.
    #[must_use]
    pub fn values(&self) -> Option<&ValueSet> {
        match self.kind() {
            ParameterKind::Categorical(set)
            | ParameterKind::Ordinal(set)
            | ParameterKind::Discrete(set) => Some(set),
            ParameterKind::Numerical(_) | ParameterKind::String => None,
        }
    }

    /// Number of admissible values for enumerated parameters.
    #[must_use]
    pub fn cardinality(&self) -> Option<usize> {
        self.values().map(ValueSet::len)
    }

    /// Registers a callback run once when the last handle to this parameter drops.
    pub fn on_destroy(&self, callback: impl FnOnce() + Send + 'static) {
        self.0.callbacks.push(callback);
    }

    /// Returns the canonical form of `value` if it belongs to the domain.
    ///
    /// Integers are accepted for float domains and converted; discrete sets
    /// accept either numeric type.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn validate_value(&self, value: &Datum) -> Option<Datum> {
        match self.kind() {
            ParameterKind::Numerical(n) => {
                let candidate = match (n.data_type, value) {
                    (NumericType::Float, Datum::Float(v)) => Numeric::Float(*v),
                    (NumericType::Float, Datum::Int(v)) => Numeric::Float(*v as f64),
                    (NumericType::Int, Datum::Int(v)) => Numeric::Int(*v),
                    _ => return None,
                };
                (n.interval().contains(candidate) && n.on_grid(candidate))
                    .then(|| Datum::from(candidate))
            }
            ParameterKind::Categorical(set) | ParameterKind::Ordinal(set) => {
                set.position(value).map(|_| value.clone())
            }
            ParameterKind::Discrete(set) => {
                if set.position(value).is_some() {
                    return Some(value.clone());
                }
                let converted = match value {
                    Datum::Int(v) => Datum::Float(*v as f64),
                    Datum::Float(v) if v.fract() == 0.0 && v.is_finite() => Datum::Int(*v as i64),
                    _ => return None,
                };
                set.position(&converted).map(|_| converted)
            }
            ParameterKind::String => matches!(value, Datum::String(_)).then(|| value.clone()),
        }
    }

    /// Returns `true` if `value` is an admissible, exactly typed value.
    #[must_use]
    pub fn check_value(&self, value: &Datum) -> bool {
        match self.kind() {
            ParameterKind::Numerical(n) => match (n.data_type, value) {
                (NumericType::Float, Datum::Float(v)) => {
                    let v = Numeric::Float(*v);
                    n.interval().contains(v) && n.on_grid(v)
                }
                (NumericType::Int, Datum::Int(v)) => {
                    let v = Numeric::Int(*v);
                    n.interval().contains(v) && n.on_grid(v)
                }
                _ => false,
            },
            ParameterKind::Categorical(set)
            | ParameterKind::Ordinal(set)
            | ParameterKind::Discrete(set) => set.position(value).is_some(),
            ParameterKind::String => matches!(value, Datum::String(_)),
        }
    }

    /// [`check_value`](Self::check_value) over a slice.
    #[must_use]
    pub fn check_values(&self, values: &[Datum]) -> Vec<bool> {
        values.iter().map(|v| self.check_value(v)).collect()
    }

    /// Position of `value` in an enumerated parameter's value set.
    #[must_use]
    pub fn index_of(&self, value: &Datum) -> Option<usize> {
        let set = self.values()?;
        let canonical = self.validate_value(value)?;
        set.position(&canonical)
    }

    /// Declared rank of `value`; `None` unless the parameter is ordinal or
    /// discrete and `value` belongs to it.
    #[must_use]
    pub fn rank_of(&self, value: &Datum) -> Option<usize> {
        match self.kind() {
            ParameterKind::Ordinal(_) | ParameterKind::Discrete(_) => self.index_of(value),
            _ => None,
        }
    }

    /// Compares two values by the declared order of an ordinal or discrete
    /// parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] for other parameter kinds and
    /// [`Error::InvalidValue`] when a value is not in the set.
    pub fn compare_values(&self, a: &Datum, b: &Datum) -> Result<Ordering> {
        if !matches!(
            self.kind(),
            ParameterKind::Ordinal(_) | ParameterKind::Discrete(_)
        ) {
            return Err(Error::InvalidType(format!(
                "'{}' has no declared value order",
                self.name()
            )));
        }
        let rank = |v: &Datum| {
            self.rank_of(v)
                .ok_or_else(|| invalid_value!("{v} is not a value of '{}'", self.name()))
        };
        Ok(rank(a)?.cmp(&rank(b)?))
    }

    /// The interval raw samples must fall into: the numerical domain, or the
    /// index range `[0, cardinality)` for enumerated parameters.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn sampling_interval(&self) -> Option<Interval> {
        match self.kind() {
            ParameterKind::Numerical(n) => Some(n.interval()),
            ParameterKind::Categorical(set)
            | ParameterKind::Ordinal(set)
            | ParameterKind::Discrete(set) => Some(Interval::int(0, set.len() as i64)),
            ParameterKind::String => None,
        }
    }

    /// Uniform distribution spanning the parameter's sampling interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] for string parameters.
    pub fn default_distribution(&self) -> Result<Distribution> {
        self.0.default_distribution.clone().ok_or_else(|| {
            let name = self.name();
            Error::InvalidType(format!("string parameter '{name}' cannot be sampled"))
        })
    }

    /// Returns `true` if `bounds` reaches outside the sampling interval, so
    /// that converted samples must be checked and possibly rejected.
    #[must_use]
    pub fn is_oversampled_by(&self, bounds: &Interval) -> bool {
        self.sampling_interval()
            .is_none_or(|interval| !interval.includes(bounds))
    }

    /// Converts raw samples into parameter values.
    ///
    /// With `oversampling`, raw samples outside the domain become
    /// [`Datum::Inactive`]; without it the samples are trusted to lie inside.
    /// Numerical samples that pass are floored onto the quantization grid; enumerated
    /// samples index the value set, and indices past its end are always
    /// inactive.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn convert_samples(&self, raw: &[Numeric], oversampling: bool) -> Vec<Datum> {
        raw.iter()
            .map(|&sample| match self.kind() {
                ParameterKind::Numerical(n) if oversampling && !n.admits(sample) => {
                    Datum::Inactive
                }
                ParameterKind::Numerical(n) => n.snap(sample).map_or(Datum::Inactive, Datum::from),
                ParameterKind::Categorical(set)
                | ParameterKind::Ordinal(set)
                | ParameterKind::Discrete(set) => {
                    let index = match sample {
                        Numeric::Int(i) => usize::try_from(i).ok(),
                        Numeric::Float(x) if x >= 0.0 && x.is_finite() => Some(x.floor() as usize),
                        Numeric::Float(_) => None,
                    };
                    index
                        .and_then(|i| set.values.get(i).cloned())
                        .unwrap_or(Datum::Inactive)
                }
                ParameterKind::String => Datum::Inactive,
            })
            .collect()
    }

    /// Draws `n` values from a one-dimensional `distribution`.
    ///
    /// When the distribution's support exceeds the domain, rejected draws
    /// are replaced by batches two, four, ... up to 32 times the shortfall.
    /// Either all `n` values are returned or none.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if the distribution is not one-dimensional.
    /// - [`Error::InvalidType`] for string parameters.
    /// - [`Error::SamplingUnsuccessful`] if the retry schedule runs out.
    pub fn sample(
        &self,
        distribution: &Distribution,
        rng: &mut fastrand::Rng,
        n: usize,
    ) -> Result<Vec<Datum>> {
        if distribution.dimension() != 1 {
            return Err(invalid_value!(
                "parameter sampling needs a one-dimensional distribution, got {}",
                distribution.dimension()
            ));
        }
        if self.sampling_interval().is_none() {
            return Err(Error::InvalidType(format!(
                "string parameter '{}' cannot be sampled",
                self.name()
            )));
        }
        let oversampling = distribution
            .bounds()
            .first()
            .is_none_or(|b| self.is_oversampled_by(b));

        draw_with_rejection(n, |batch| {
            let raw = distribution.samples(rng, batch);
            Ok(self
                .convert_samples(&raw, oversampling)
                .into_iter()
                .map(|v| (!v.is_inactive()).then_some(v))
                .collect())
        })
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding the literal keywords.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(name, "none" | "true" | "false")
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("kind", self.kind())
            .field("default_value", self.default_value())
            .finish()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builder for numerical parameters, created by [`Parameter::float`] and
/// [`Parameter::int`].
#[derive(Clone, Debug)]
pub struct NumericalBuilder {
    name: String,
    lower: Numeric,
    upper: Numeric,
    quantization: Numeric,
    default_value: Option<Datum>,
}

impl NumericalBuilder {
    /// Restricts values to `lower + k * step`.
    ///
    /// For integer parameters the step is truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn quantization(mut self, step: f64) -> Self {
        self.quantization = match self.lower {
            Numeric::Int(_) => Numeric::Int(step as i64),
            Numeric::Float(_) => Numeric::Float(step),
        };
        self
    }

    /// Sets the default value; defaults to the lower bound.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Datum>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Validates the bounds and creates the parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for a name that is not an identifier,
    /// empty or non-finite bounds, a negative quantization, or a default value
    /// outside the domain.
    pub fn build(self) -> Result<Parameter> {
        let data_type = self.lower.numeric_type();
        let empty = match (self.lower, self.upper) {
            (Numeric::Int(l), Numeric::Int(u)) => l >= u,
            (Numeric::Float(l), Numeric::Float(u)) => !(l.is_finite() && u.is_finite() && l < u),
            _ => true,
        };
        if empty {
            return Err(invalid_value!(
                "bounds [{}, {}) of '{}' are empty or not finite",
                self.lower,
                self.upper,
                self.name
            ));
        }
        let q = self.quantization.as_f64();
        if q.is_nan() || q < 0.0 {
            return Err(invalid_value!(
                "quantization of '{}' must be non-negative",
                self.name
            ));
        }
        let numerical = Numerical {
            data_type,
            lower: self.lower,
            upper: self.upper,
            quantization: self.quantization,
        };
        let default_value = match self.default_value {
            Some(Datum::Int(v)) if data_type == NumericType::Float => {
                Numeric::Float(Numeric::Int(v).as_f64()).into()
            }
            Some(v) => v,
            None => Datum::from(self.lower),
        };
        let kind = ParameterKind::Numerical(numerical);
        Parameter::create(self.name, kind, default_value)
    }
}

/// Builder for categorical, ordinal and discrete parameters.
#[derive(Clone, Debug)]
pub struct EnumeratedBuilder {
    name: String,
    parameter_type: ParameterType,
    values: Vec<Datum>,
    default_index: usize,
}

impl EnumeratedBuilder {
    fn new<I, T>(name: String, parameter_type: ParameterType, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Datum>,
    {
        Self {
            name,
            parameter_type,
            values: values.into_iter().map(Into::into).collect(),
            default_index: 0,
        }
    }

    /// Selects the default value by position in the value list; defaults to 0.
    #[must_use]
    pub fn default_index(mut self, index: usize) -> Self {
        self.default_index = index;
        self
    }

    /// Validates the value set and creates the parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for a name that is not an identifier,
    /// an empty or duplicated value set, non-numeric or mixed-type discrete
    /// values, or a default index out of range.
    pub fn build(mut self) -> Result<Parameter> {
        if self.parameter_type == ParameterType::Discrete {
            let Some(first) = self.values.first().map(Datum::datum_type) else {
                return Err(invalid_value!("value set cannot be empty"));
            };
            let one_type = self
                .values
                .iter()
                .all(|v| v.is_numeric() && v.datum_type() == first);
            if !one_type {
                return Err(invalid_value!(
                    "discrete values of '{}' must be numbers of one type",
                    self.name
                ));
            }
            let default = self.values.get(self.default_index).cloned();
            self.values.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
            if let Some(default) = default {
                self.default_index = self
                    .values
                    .iter()
                    .position(|v| *v == default)
                    .unwrap_or(self.default_index);
            }
        }
        let default_value = self.values.get(self.default_index).cloned().ok_or_else(|| {
            invalid_value!(
                "default index {} out of range for '{}'",
                self.default_index,
                self.name
            )
        })?;
        let set = ValueSet::new(self.values)?;
        let kind = match self.parameter_type {
            ParameterType::Categorical => ParameterKind::Categorical(set),
            ParameterType::Ordinal => ParameterKind::Ordinal(set),
            _ => ParameterKind::Discrete(set),
        };
        Parameter::create(self.name, kind, default_value)
    }
}
