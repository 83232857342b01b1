//! Configurations: one value per parameter of a space.

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::binding::{Binding, Context};
use crate::datum::Datum;
use crate::error::{Error, Result, invalid_value};
use crate::space::ConfigurationSpace;

/// A value vector bound to a [`ConfigurationSpace`].
///
/// Inactive parameters hold [`Datum::Inactive`]. A configuration keeps its
/// space alive. Values are not checked on construction; use
/// [`check`](Self::check) or [`ConfigurationSpace::check_configuration`].
#[derive(Clone)]
pub struct Configuration {
    space: ConfigurationSpace,
    values: Vec<Datum>,
}

impl Configuration {
    /// Binds `values` to `space`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `values` does not hold exactly one
    /// value per parameter.
    pub fn new(space: &ConfigurationSpace, values: Vec<Datum>) -> Result<Self> {
        if values.len() != space.num_parameters() {
            return Err(invalid_value!(
                "space '{}' has {} parameters, got {} values",
                space.name(),
                space.num_parameters(),
                values.len()
            ));
        }
        Ok(Self::from_parts(space.clone(), values))
    }

    pub(crate) fn from_parts(space: ConfigurationSpace, values: Vec<Datum>) -> Self {
        Self { space, values }
    }

    /// The space these values belong to.
    #[must_use]
    pub fn space(&self) -> &ConfigurationSpace {
        &self.space
    }

    /// One value per parameter, in index order.
    #[must_use]
    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// Releases the value vector, in index order.
    #[must_use]
    pub fn into_values(self) -> Vec<Datum> {
        self.values
    }

    /// Checks activity, domains and forbidden clauses against the space.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfiguration`] naming the first violation.
    /// - [`Error::InvalidCondition`] if a condition does not evaluate to a
    ///   boolean.
    pub fn check(&self) -> Result<()> {
        match self.space.violation(&self.values)? {
            Some(reason) => Err(Error::InvalidConfiguration(reason)),
            None => Ok(()),
        }
    }

    /// Like [`check`](Self::check), reporting a violation as `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCondition`] if a condition does not evaluate
    /// to a boolean.
    pub fn is_valid(&self) -> Result<bool> {
        self.space.check_values(&self.values)
    }
}

impl Binding for Configuration {
    fn context(&self) -> &dyn Context {
        &self.space
    }

    fn values(&self) -> &[Datum] {
        &self.values
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.space.id() == other.space.id() && self.values == other.values
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.space.id().hash(state);
        self.values.hash(state);
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("space", &self.space.name())
            .field("values", &self.values)
            .finish()
    }
}

/// `{name: value, ...}` in parameter order.
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (p, v)) in self.space.parameters().iter().zip(&self.values).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {v}", p.name())?;
        }
        f.write_str("}")
    }
}
