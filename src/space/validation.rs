//! Activation and validity checks.

use super::ConfigurationSpace;
use crate::binding::{BoundValues, Context, ParameterSet};
use crate::configuration::Configuration;
use crate::datum::Datum;
use crate::error::{Error, Result, invalid_value};
use crate::expression::Expression;
use crate::graph::DependencyGraph;

/// Evaluates the condition of parameter `index`; an inactive operand makes
/// the condition false.
fn condition_holds(
    parameters: &ParameterSet,
    index: usize,
    condition: &Expression,
    values: &[Datum],
) -> Result<bool> {
    match condition.eval(&BoundValues::unchecked(parameters, values)) {
        Ok(Datum::Bool(holds)) => Ok(holds),
        Err(e) if e.is_inactive() => Ok(false),
        Ok(other) => Err(Error::InvalidCondition(format!(
            "condition `{condition}` of '{}' evaluates to {other}",
            parameters.parameters()[index].name()
        ))),
        Err(e) => Err(e),
    }
}

/// Marks every parameter whose condition does not hold as inactive, parents
/// first.
pub(super) fn activate(
    parameters: &ParameterSet,
    conditions: &[Option<Expression>],
    graph: &DependencyGraph,
    values: &mut [Datum],
) -> Result<()> {
    for &i in graph.sorted_indexes() {
        if let Some(condition) = &conditions[i]
            && !condition_holds(parameters, i, condition, values)?
        {
            values[i] = Datum::Inactive;
        }
    }
    Ok(())
}

/// The first forbidden clause that holds, skipping clauses that read an
/// inactive parameter.
pub(super) fn holding_clause<'a>(
    parameters: &ParameterSet,
    forbidden_clauses: &'a [Expression],
    values: &[Datum],
) -> Result<Option<&'a Expression>> {
    let binding = BoundValues::unchecked(parameters, values);
    for clause in forbidden_clauses {
        match clause.eval(&binding) {
            Ok(Datum::Bool(true)) => return Ok(Some(clause)),
            Ok(Datum::Bool(false)) => {}
            Err(e) if e.is_inactive() => {}
            Ok(other) => {
                return Err(invalid_value!(
                    "forbidden clause `{clause}` evaluates to {other}"
                ));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

/// Activates the default values and fails if a forbidden clause holds.
pub(super) fn check_defaults(
    parameters: &ParameterSet,
    conditions: &[Option<Expression>],
    graph: &DependencyGraph,
    forbidden_clauses: &[Expression],
) -> Result<Vec<Datum>> {
    let mut values = parameters.default_values();
    activate(parameters, conditions, graph, &mut values)?;
    if let Some(clause) = holding_clause(parameters, forbidden_clauses, &values)? {
        return Err(Error::InvalidConfiguration(format!(
            "forbidden clause `{clause}` holds for the default configuration"
        )));
    }
    Ok(values)
}

impl ConfigurationSpace {
    /// Why `values` is not a valid configuration, or `None` if it is.
    pub(crate) fn violation(&self, values: &[Datum]) -> Result<Option<String>> {
        if values.len() != self.num_parameters() {
            return Ok(Some(format!(
                "expected {} values, got {}",
                self.num_parameters(),
                values.len()
            )));
        }
        let parameters = &self.0.parameters;
        let state = self.0.state.read();
        for &i in state.graph.sorted_indexes() {
            let p = &parameters.parameters()[i];
            let active = match &state.conditions[i] {
                Some(condition) => condition_holds(parameters, i, condition, values)?,
                None => true,
            };
            match (active, &values[i]) {
                (false, Datum::Inactive) => {}
                (false, v) => {
                    return Ok(Some(format!(
                        "'{}' should be inactive but is {v}",
                        p.name()
                    )));
                }
                (true, Datum::Inactive) => {
                    return Ok(Some(format!("'{}' should be active", p.name())));
                }
                (true, v) if !p.check_value(v) => {
                    return Ok(Some(format!("{v} is not a value of '{}'", p.name())));
                }
                (true, _) => {}
            }
        }
        Ok(holding_clause(parameters, &self.0.forbidden_clauses, values)?
            .map(|clause| format!("forbidden clause `{clause}` holds")))
    }

    /// Default values with inactive parameters marked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCondition`] if a condition does not evaluate
    /// to a boolean.
    pub fn default_configuration(&self) -> Result<Configuration> {
        let state = self.0.state.read();
        let mut values = self.0.parameters.default_values();
        activate(
            &self.0.parameters,
            &state.conditions,
            &state.graph,
            &mut values,
        )?;
        Ok(Configuration::from_parts(self.clone(), values))
    }

    /// Marks parameters whose condition does not hold as
    /// [`Datum::Inactive`]. Parameters without a condition are left alone.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if `values` does not hold one value per
    ///   parameter.
    /// - [`Error::InvalidCondition`] if a condition does not evaluate to a
    ///   boolean.
    pub fn set_actives(&self, values: &mut [Datum]) -> Result<()> {
        if values.len() != self.num_parameters() {
            return Err(invalid_value!(
                "expected {} values, got {}",
                self.num_parameters(),
                values.len()
            ));
        }
        let state = self.0.state.read();
        activate(&self.0.parameters, &state.conditions, &state.graph, values)
    }

    /// Returns `true` if `configuration` has exactly the expected parameters
    /// active, every active value in its domain, and no forbidden clause
    /// holding.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if `configuration` belongs to another space.
    /// - [`Error::InvalidCondition`] if a condition does not evaluate to a
    ///   boolean, and [`Error::InvalidValue`] if a forbidden clause does not.
    pub fn check_configuration(&self, configuration: &Configuration) -> Result<bool> {
        if configuration.space().id() != self.id() {
            return Err(invalid_value!(
                "configuration belongs to space '{}', not '{}'",
                configuration.space().name(),
                self.name()
            ));
        }
        self.check_values(configuration.values())
    }

    /// [`check_configuration`](Self::check_configuration) on a raw value
    /// vector; a wrong number of values is invalid.
    ///
    /// # Errors
    ///
    /// Same as [`check_configuration`](Self::check_configuration).
    pub fn check_values(&self, values: &[Datum]) -> Result<bool> {
        Ok(self.violation(values)?.is_none())
    }
}
