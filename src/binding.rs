//! Contexts and bindings.
//!
//! A [`Context`] is an ordered set of parameters with O(1) lookup by
//! position, identity and name. A [`Binding`] pairs a context with one value
//! per parameter; expressions are evaluated against bindings, and every
//! [`Configuration`](crate::Configuration) is one.

use std::collections::HashMap;

use crate::datum::Datum;
use crate::error::{Error, Result, invalid_value};
use crate::parameter::{ParamId, Parameter};

/// An ordered set of parameters.
pub trait Context: Send + Sync {
    /// All parameters, in index order.
    fn parameters(&self) -> &[Parameter];

    /// Index of `parameter`, matched by identity.
    fn parameter_index(&self, parameter: &Parameter) -> Option<usize>;

    /// Index of the parameter called `name`.
    fn parameter_index_by_name(&self, name: &str) -> Option<usize>;

    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }

    /// The parameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is past the end.
    fn parameter(&self, index: usize) -> Result<&Parameter> {
        let parameters = self.parameters();
        parameters.get(index).ok_or(Error::OutOfBounds {
            index,
            len: parameters.len(),
        })
    }

    fn parameter_by_name(&self, name: &str) -> Option<&Parameter> {
        self.parameter_index_by_name(name)
            .and_then(|i| self.parameters().get(i))
    }
}

/// A [`Context`] backed by a vector and two hash indexes.
#[derive(Clone, Debug, Default)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
    by_id: HashMap<ParamId, usize>,
    by_name: HashMap<String, usize>,
}

impl ParameterSet {
    /// Indexes `parameters` in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if a parameter or a name appears twice.
    pub fn new(parameters: Vec<Parameter>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(parameters.len());
        let mut by_name = HashMap::with_capacity(parameters.len());
        for (i, p) in parameters.iter().enumerate() {
            if by_id.insert(p.id(), i).is_some() {
                return Err(invalid_value!("parameter '{}' is listed twice", p.name()));
            }
            if by_name.insert(p.name().to_owned(), i).is_some() {
                return Err(invalid_value!("duplicate parameter name '{}'", p.name()));
            }
        }
        Ok(Self {
            parameters,
            by_id,
            by_name,
        })
    }

    /// The default value of every parameter, in index order.
    #[must_use]
    pub fn default_values(&self) -> Vec<Datum> {
        self.parameters
            .iter()
            .map(|p| p.default_value().clone())
            .collect()
    }
}

impl Context for ParameterSet {
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn parameter_index(&self, parameter: &Parameter) -> Option<usize> {
        self.by_id.get(&parameter.id()).copied()
    }

    fn parameter_index_by_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

/// Values bound to the parameters of a context.
pub trait Binding {
    fn context(&self) -> &dyn Context;

    /// One value per context parameter, in index order.
    fn values(&self) -> &[Datum];

    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is past the end.
    fn value(&self, index: usize) -> Result<&Datum> {
        let values = self.values();
        values.get(index).ok_or(Error::OutOfBounds {
            index,
            len: values.len(),
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if no parameter is called `name`.
    fn value_by_name(&self, name: &str) -> Result<&Datum> {
        let index = self
            .context()
            .parameter_index_by_name(name)
            .ok_or_else(|| invalid_value!("unknown parameter '{name}'"))?;
        self.value(index)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `parameter` is not in the context.
    fn value_of(&self, parameter: &Parameter) -> Result<&Datum> {
        let index = self
            .context()
            .parameter_index(parameter)
            .ok_or_else(|| invalid_value!("parameter '{}' is not bound", parameter.name()))?;
        self.value(index)
    }
}

/// A borrowed binding over any context.
#[derive(Clone, Copy)]
pub struct BoundValues<'a> {
    context: &'a dyn Context,
    values: &'a [Datum],
}

impl<'a> BoundValues<'a> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the value count differs from the
    /// parameter count.
    pub fn new(context: &'a dyn Context, values: &'a [Datum]) -> Result<Self> {
        if values.len() != context.num_parameters() {
            return Err(invalid_value!(
                "expected {} values, got {}",
                context.num_parameters(),
                values.len()
            ));
        }
        Ok(Self { context, values })
    }

    pub(crate) fn unchecked(context: &'a dyn Context, values: &'a [Datum]) -> Self {
        Self { context, values }
    }
}

impl Binding for BoundValues<'_> {
    fn context(&self) -> &dyn Context {
        self.context
    }

    fn values(&self) -> &[Datum] {
        self.values
    }
}
