use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::{ConfigurationSpace, SpaceId, SpaceInner, SpaceState, validation};
use crate::binding::{Context, ParameterSet};
use crate::distribution_space::DistributionState;
use crate::error::{Error, Result, invalid_value};
use crate::expression::Expression;
use crate::graph::DependencyGraph;
use crate::lifecycle::DestroyCallbacks;
use crate::parameter::{Parameter, ParameterType};

/// An expression given directly or as text parsed against the finished
/// parameter list.
enum Source {
    Tree(Expression),
    Text(String),
}

impl Source {
    fn resolve(self, context: &dyn Context) -> Result<Expression> {
        match self {
            Source::Tree(expression) => Ok(expression),
            Source::Text(text) => Expression::parse(&text, context),
        }
    }
}

/// A builder for [`ConfigurationSpace`] instances.
///
/// Created via [`ConfigurationSpace::builder()`]. Parameters keep the order
/// they are added in; that order defines their indices. Conditions and
/// forbidden clauses given as text are parsed in [`build`](Self::build), so
/// they may name parameters added later.
///
/// # Examples
///
/// ```
/// use configspace::prelude::*;
///
/// let depth = Parameter::int("depth", 1, 8).build().unwrap();
/// let width = Parameter::ordinal("width", ["narrow", "wide"]).build().unwrap();
///
/// let space = ConfigurationSpace::builder("net")
///     .parameter(depth)
///     .parameter(width)
///     .forbidden_clause_text(r#"depth > 6 && width == "wide""#)
///     .seed(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(space.num_parameters(), 2);
/// assert_eq!(space.forbidden_clauses().len(), 1);
/// ```
pub struct ConfigurationSpaceBuilder {
    name: String,
    parameters: Vec<Parameter>,
    conditions: Vec<(Parameter, Source)>,
    forbidden_clauses: Vec<Source>,
    seed: Option<u64>,
}

impl ConfigurationSpaceBuilder {
    pub(super) fn new(name: String) -> Self {
        Self {
            name,
            parameters: Vec::new(),
            conditions: Vec::new(),
            forbidden_clauses: Vec::new(),
            seed: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Appends several parameters in iteration order.
    #[must_use]
    pub fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Makes `parameter` active only where `condition` holds.
    #[must_use]
    pub fn condition(mut self, parameter: &Parameter, condition: Expression) -> Self {
        self.conditions.push((parameter.clone(), Source::Tree(condition)));
        self
    }

    /// Like [`condition`](Self::condition), parsing `text` at build time.
    #[must_use]
    pub fn condition_text(mut self, parameter: &Parameter, text: impl Into<String>) -> Self {
        self.conditions.push((parameter.clone(), Source::Text(text.into())));
        self
    }

    /// Rules out every configuration for which `clause` holds.
    #[must_use]
    pub fn forbidden_clause(mut self, clause: Expression) -> Self {
        self.forbidden_clauses.push(Source::Tree(clause));
        self
    }

    /// Like [`forbidden_clause`](Self::forbidden_clause), parsing `text` at
    /// build time.
    #[must_use]
    pub fn forbidden_clause_text(mut self, text: impl Into<String>) -> Self {
        self.forbidden_clauses.push(Source::Text(text.into()));
        self
    }

    /// Seeds the space's generator. Without a seed it is seeded from
    /// entropy.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the space.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidType`] for a string parameter.
    /// - [`Error::InvalidValue`] for a repeated parameter or name, a
    ///   condition on an unknown parameter, a second condition on the same
    ///   parameter, or a literal outside the domain it is compared with.
    /// - [`Error::InvalidExpression`] for text that does not parse or an
    ///   expression reading a parameter outside the space.
    /// - [`Error::InvalidGraph`] if the conditions form a cycle.
    /// - [`Error::InvalidCondition`] if a condition does not evaluate to a
    ///   boolean on the default configuration.
    /// - [`Error::InvalidConfiguration`] if a forbidden clause holds for the
    ///   default configuration.
    pub fn build(self) -> Result<ConfigurationSpace> {
        if let Some(p) = self
            .parameters
            .iter()
            .find(|p| p.parameter_type() == ParameterType::String)
        {
            return Err(Error::InvalidType(format!(
                "string parameter '{}' cannot be part of a configuration space",
                p.name()
            )));
        }
        let parameters = ParameterSet::new(self.parameters)?;

        let mut conditions: Vec<Option<Expression>> = vec![None; parameters.num_parameters()];
        for (parameter, source) in self.conditions {
            let index = parameters.parameter_index(&parameter).ok_or_else(|| {
                invalid_value!(
                    "condition on '{}', which is not in space '{}'",
                    parameter.name(),
                    self.name
                )
            })?;
            if conditions[index].is_some() {
                return Err(invalid_value!(
                    "parameter '{}' already has a condition",
                    parameter.name()
                ));
            }
            let condition = source.resolve(&parameters)?;
            condition.check_context(&parameters)?;
            conditions[index] = Some(condition);
        }

        let forbidden_clauses = self
            .forbidden_clauses
            .into_iter()
            .map(|source| {
                let clause = source.resolve(&parameters)?;
                clause.check_context(&parameters)?;
                Ok(clause)
            })
            .collect::<Result<Vec<_>>>()?;

        let graph = DependencyGraph::from_conditions(&conditions, &parameters)?;
        let distributions = DistributionState::new(parameters.parameters())?;
        validation::check_defaults(&parameters, &conditions, &graph, &forbidden_clauses)?;

        trace_info!(
            space = %self.name,
            parameters = parameters.num_parameters(),
            conditions = conditions.iter().flatten().count(),
            forbidden_clauses = forbidden_clauses.len(),
            "configuration space built"
        );

        let rng = self
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Ok(ConfigurationSpace(Arc::new(SpaceInner {
            id: SpaceId::next(),
            name: self.name,
            parameters,
            forbidden_clauses,
            state: RwLock::new(SpaceState {
                conditions,
                graph,
                distributions,
            }),
            rng: Mutex::new(rng),
            callbacks: DestroyCallbacks::new(),
        })))
    }
}
