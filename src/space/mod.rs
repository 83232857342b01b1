//! Configuration spaces.
//!
//! A [`ConfigurationSpace`] is an ordered set of parameters, an optional
//! activation condition per parameter, a list of forbidden clauses, a default
//! distribution assignment and a seeded random number generator.
//!
//! The parameter list and forbidden clauses are fixed at construction.
//! Conditions and the default distributions can change afterwards; such
//! updates take the write side of a [`RwLock`] while sampling and validation
//! take the read side.
//!
//! # Example
//!
//! ```
//! use configspace::prelude::*;
//!
//! let kind = Parameter::categorical("kind", ["linear", "rbf"]).build().unwrap();
//! let gamma = Parameter::float("gamma", 1e-4, 1.0).default_value(0.1).build().unwrap();
//!
//! let space = ConfigurationSpace::builder("svm")
//!     .parameter(kind.clone())
//!     .parameter(gamma.clone())
//!     .condition_text(&gamma, r#"kind == "rbf""#)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! for c in space.samples(100).unwrap() {
//!     let rbf = c.value_of(&kind).unwrap() == &Datum::from("rbf");
//!     assert_eq!(c.value_of(&gamma).unwrap().is_inactive(), !rbf);
//! }
//! ```

mod builder;
mod sampling;
mod validation;

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

pub use builder::ConfigurationSpaceBuilder;

use crate::binding::{Context, ParameterSet};
use crate::distribution::Distribution;
use crate::distribution_space::{DistributionState, DistributionWrapper};
use crate::error::{Error, Result, invalid_value};
use crate::expression::Expression;
use crate::graph::DependencyGraph;
use crate::lifecycle::DestroyCallbacks;
use crate::parameter::Parameter;

static NEXT_SPACE_ID: AtomicU64 = AtomicU64::new(0);

/// A process-unique identifier for a configuration space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpaceId(u64);

impl SpaceId {
    fn next() -> Self {
        Self(NEXT_SPACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything that can change after construction.
struct SpaceState {
    conditions: Vec<Option<Expression>>,
    graph: DependencyGraph,
    distributions: DistributionState,
}

struct SpaceInner {
    id: SpaceId,
    name: String,
    parameters: ParameterSet,
    forbidden_clauses: Vec<Expression>,
    state: RwLock<SpaceState>,
    rng: Mutex<fastrand::Rng>,
    callbacks: DestroyCallbacks,
}

/// A shared handle to a configuration space.
///
/// Clones refer to the same space. See the [module documentation](self).
#[derive(Clone)]
pub struct ConfigurationSpace(Arc<SpaceInner>);

/// A non-owning handle, upgraded on use.
#[derive(Clone, Debug)]
pub struct WeakConfigurationSpace(Weak<SpaceInner>);

impl WeakConfigurationSpace {
    /// # Errors
    ///
    /// Returns [`Error::InvalidObject`] once every strong handle is gone.
    pub fn upgrade(&self) -> Result<ConfigurationSpace> {
        self.0
            .upgrade()
            .map(ConfigurationSpace)
            .ok_or(Error::InvalidObject("configuration space has been dropped"))
    }
}

impl ConfigurationSpace {
    /// Starts a space called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ConfigurationSpaceBuilder {
        ConfigurationSpaceBuilder::new(name.into())
    }

    /// Process-unique identity of the space.
    #[must_use]
    pub fn id(&self) -> SpaceId {
        self.0.id
    }

    /// The name given to the builder.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns `true` if both handles refer to the same space.
    #[must_use]
    pub fn ptr_eq(&self, other: &ConfigurationSpace) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A handle that does not keep the space alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakConfigurationSpace {
        WeakConfigurationSpace(Arc::downgrade(&self.0))
    }

    /// Registers `callback` to run when the last handle is dropped.
    pub fn on_destroy(&self, callback: impl FnOnce() + Send + 'static) {
        self.0.callbacks.push(callback);
    }

    fn index_of_parameter(&self, parameter: &Parameter) -> Result<usize> {
        self.parameter_index(parameter).ok_or_else(|| {
            invalid_value!(
                "parameter '{}' is not in space '{}'",
                parameter.name(),
                self.name()
            )
        })
    }

    /// The condition of the parameter at `index`, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is past the last parameter.
    pub fn condition(&self, index: usize) -> Result<Option<Expression>> {
        let state = self.0.state.read();
        state
            .conditions
            .get(index)
            .cloned()
            .ok_or(Error::OutOfBounds {
                index,
                len: state.conditions.len(),
            })
    }

    /// One optional condition per parameter, in index order.
    #[must_use]
    pub fn conditions(&self) -> Vec<Option<Expression>> {
        self.0.state.read().conditions.clone()
    }

    /// Forbidden clauses in registration order.
    #[must_use]
    pub fn forbidden_clauses(&self) -> &[Expression] {
        &self.0.forbidden_clauses
    }

    /// Replaces the condition of `parameter`; `None` removes it.
    ///
    /// The dependency graph is rebuilt and the default configuration
    /// re-checked; on any failure the previous condition stays in place.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if `parameter` is not in the space or the
    ///   condition compares it with an inadmissible literal.
    /// - [`Error::InvalidExpression`] if the condition reads a foreign
    ///   parameter.
    /// - [`Error::InvalidGraph`] if the condition closes a cycle.
    /// - [`Error::InvalidCondition`] if it does not evaluate to a boolean on
    ///   the default configuration.
    /// - [`Error::InvalidConfiguration`] if a forbidden clause would then
    ///   hold for the default configuration.
    pub fn set_condition(
        &self,
        parameter: &Parameter,
        condition: Option<Expression>,
    ) -> Result<()> {
        let index = self.index_of_parameter(parameter)?;
        if let Some(c) = &condition {
            c.check_context(self)?;
        }

        let mut state = self.0.state.write();
        let mut conditions = state.conditions.clone();
        conditions[index] = condition;
        let graph = DependencyGraph::from_conditions(&conditions, self)?;
        validation::check_defaults(
            &self.0.parameters,
            &conditions,
            &graph,
            &self.0.forbidden_clauses,
        )?;
        state.conditions = conditions;
        state.graph = graph;
        trace_info!(space = %self.0.name, parameter = parameter.name(), "condition updated");
        Ok(())
    }

    /// Indices the condition of parameter `index` reads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is past the last parameter.
    pub fn parents(&self, index: usize) -> Result<Vec<usize>> {
        self.0.state.read().graph.parents(index).map(<[usize]>::to_vec)
    }

    /// Indices whose conditions read parameter `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is past the last parameter.
    pub fn children(&self, index: usize) -> Result<Vec<usize>> {
        self.0.state.read().graph.children(index).map(<[usize]>::to_vec)
    }

    /// Parameter indices in activation order, parents first.
    #[must_use]
    pub fn sorted_indexes(&self) -> Vec<usize> {
        self.0.state.read().graph.sorted_indexes().to_vec()
    }

    /// Rebinds part of the default distribution assignment.
    ///
    /// # Errors
    ///
    /// Same as [`DistributionSpace::set_distribution`](crate::DistributionSpace::set_distribution).
    pub fn set_distribution(&self, distribution: &Distribution, indices: &[usize]) -> Result<()> {
        self.0
            .state
            .write()
            .distributions
            .set_distribution(self.0.parameters.parameters(), distribution, indices)?;
        trace_debug!(space = %self.0.name, ?indices, "default distribution reassigned");
        Ok(())
    }

    /// The default distribution covering parameter `index`, and the dimension
    /// that draws it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is past the last parameter.
    pub fn distribution(&self, index: usize) -> Result<(Distribution, usize)> {
        self.0.state.read().distributions.distribution(index)
    }

    /// The default distribution assignment, in list order.
    #[must_use]
    pub fn distribution_wrappers(&self) -> Vec<DistributionWrapper> {
        self.0.state.read().distributions.wrappers()
    }

    /// Reseeds the space's own generator.
    pub fn set_seed(&self, seed: u64) {
        self.0.rng.lock().seed(seed);
    }
}

impl Context for ConfigurationSpace {
    fn parameters(&self) -> &[Parameter] {
        self.0.parameters.parameters()
    }

    fn parameter_index(&self, parameter: &Parameter) -> Option<usize> {
        self.0.parameters.parameter_index(parameter)
    }

    fn parameter_index_by_name(&self, name: &str) -> Option<usize> {
        self.0.parameters.parameter_index_by_name(name)
    }
}

impl fmt::Debug for ConfigurationSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.parameters().iter().map(Parameter::name).collect();
        f.debug_struct("ConfigurationSpace")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("parameters", &names)
            .field("forbidden_clauses", &self.0.forbidden_clauses.len())
            .finish_non_exhaustive()
    }
}
