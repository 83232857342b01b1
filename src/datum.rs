//! The [`Datum`] value type shared by parameters, bindings and expressions.

use core::any::Any;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, invalid_value};
use crate::numeric::Numeric;

/// An opaque shared object carried inside a [`Datum`].
///
/// Two references are equal only when they point to the same allocation.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Any + Send + Sync>);

impl ObjectRef {
    /// Wraps a value in a new shared object.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wraps an existing shared object.
    #[must_use]
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    /// Returns the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:p})", self.addr())
    }
}

/// A dynamically typed value.
///
/// `PartialEq`, `Eq` and `Hash` are structural: an `Int(1)` is not equal to a
/// `Float(1.0)` and floats compare by bit pattern. Use [`Datum::equals`] and
/// [`Datum::compare`] for the type-aware comparisons expressions perform.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Datum {
    /// The absence of a value.
    #[default]
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    String(String),
    /// A shared object reference.
    #[cfg_attr(feature = "serde", serde(skip))]
    Object(ObjectRef),
    /// Marks a parameter that is inactive in a configuration.
    Inactive,
}

/// The kind of a [`Datum`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatumType {
    /// [`Datum::None`]
    None,
    /// [`Datum::Bool`]
    Bool,
    /// [`Datum::Int`]
    Int,
    /// [`Datum::Float`]
    Float,
    /// [`Datum::String`]
    String,
    /// [`Datum::Object`]
    Object,
    /// [`Datum::Inactive`]
    Inactive,
}

impl Datum {
    /// The variant tag.
    #[must_use]
    pub fn datum_type(&self) -> DatumType {
        match self {
            Datum::None => DatumType::None,
            Datum::Bool(_) => DatumType::Bool,
            Datum::Int(_) => DatumType::Int,
            Datum::Float(_) => DatumType::Float,
            Datum::String(_) => DatumType::String,
            Datum::Object(_) => DatumType::Object,
            Datum::Inactive => DatumType::Inactive,
        }
    }

    /// Returns `true` for the inactive marker.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Datum::Inactive)
    }

    /// Returns `true` for integers and floats.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Datum::Int(_) | Datum::Float(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns numeric values as `f64`, converting integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(v) => Some(*v as f64),
            Datum::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts numeric data to a raw [`Numeric`].
    #[must_use]
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Datum::Int(v) => Some(Numeric::Int(*v)),
            Datum::Float(v) => Some(Numeric::Float(*v)),
            _ => None,
        }
    }

    /// Type-aware equality.
    ///
    /// Integers and floats compare as floats, strings by content and objects
    /// by identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) when the two
    /// values have incomparable types.
    pub fn equals(&self, other: &Datum) -> Result<bool> {
        match (self, other) {
            (Datum::None, Datum::None) | (Datum::Inactive, Datum::Inactive) => Ok(true),
            (Datum::Bool(a), Datum::Bool(b)) => Ok(a == b),
            (Datum::Int(a), Datum::Int(b)) => Ok(a == b),
            (Datum::String(a), Datum::String(b)) => Ok(a == b),
            (Datum::Object(a), Datum::Object(b)) => Ok(a == b),
            (a, b) if a.is_numeric() && b.is_numeric() => Ok(a.as_f64() == b.as_f64()),
            (a, b) => Err(invalid_value!(
                "cannot compare {:?} with {:?}",
                a.datum_type(),
                b.datum_type()
            )),
        }
    }

    /// Type-aware ordering, defined for numbers and strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) for
    /// unordered types or NaN operands.
    pub fn compare(&self, other: &Datum) -> Result<Ordering> {
        match (self, other) {
            (Datum::Int(a), Datum::Int(b)) => Ok(a.cmp(b)),
            (Datum::String(a), Datum::String(b)) => Ok(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                x.partial_cmp(&y)
                    .ok_or_else(|| invalid_value!("cannot order NaN"))
            }
            (a, b) => Err(invalid_value!(
                "cannot order {:?} against {:?}",
                a.datum_type(),
                b.datum_type()
            )),
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::None, Datum::None) | (Datum::Inactive, Datum::Inactive) => true,
            (Datum::Bool(a), Datum::Bool(b)) => a == b,
            (Datum::Int(a), Datum::Int(b)) => a == b,
            (Datum::Float(a), Datum::Float(b)) => a.to_bits() == b.to_bits(),
            (Datum::String(a), Datum::String(b)) => a == b,
            (Datum::Object(a), Datum::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Datum {}

impl Hash for Datum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Datum::Bool(b) => b.hash(state),
            Datum::Int(v) => v.hash(state),
            Datum::Float(v) => v.to_bits().hash(state),
            Datum::String(s) => s.hash(state),
            Datum::Object(o) => o.hash(state),
            Datum::None | Datum::Inactive => {}
        }
    }
}

/// Writes `s` as a double-quoted literal with `\\`, `\"` and control escapes.
pub(crate) fn write_quoted(f: &mut impl fmt::Write, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::None => f.write_str("none"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Int(v) => write!(f, "{v}"),
            Datum::Float(v) => write!(f, "{v:?}"),
            Datum::String(s) => write_quoted(f, s),
            Datum::Object(o) => write!(f, "<object {:p}>", o.addr()),
            Datum::Inactive => f.write_str("inactive"),
        }
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<i32> for Datum {
    fn from(v: i32) -> Self {
        Datum::Int(i64::from(v))
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Float(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::String(v.to_owned())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::String(v)
    }
}

impl From<Numeric> for Datum {
    fn from(v: Numeric) -> Self {
        match v {
            Numeric::Int(i) => Datum::Int(i),
            Numeric::Float(x) => Datum::Float(x),
        }
    }
}

impl From<ObjectRef> for Datum {
    fn from(v: ObjectRef) -> Self {
        Datum::Object(v)
    }
}
