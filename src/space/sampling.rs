//! Rejection sampling of valid configurations.

use super::{ConfigurationSpace, validation};
use crate::binding::Context;
use crate::configuration::Configuration;
use crate::distribution_space::{DistributionSpace, DistributionState};
use crate::error::{Error, Result, invalid_value};

/// Candidate draws allowed per requested configuration.
const SAMPLING_ATTEMPTS_PER_VALUE: usize = 100;

impl ConfigurationSpace {
    /// Draws one valid configuration with the space's own generator and
    /// default distributions.
    ///
    /// # Errors
    ///
    /// Same as [`samples_with`](Self::samples_with).
    pub fn sample(&self) -> Result<Configuration> {
        self.sample_with(None, None)
    }

    /// Draws `n` valid configurations with the space's own generator and
    /// default distributions.
    ///
    /// # Errors
    ///
    /// Same as [`samples_with`](Self::samples_with).
    pub fn samples(&self, n: usize) -> Result<Vec<Configuration>> {
        self.samples_with(None, None, n)
    }

    /// Draws one valid configuration; see [`samples_with`](Self::samples_with).
    ///
    /// # Errors
    ///
    /// Same as [`samples_with`](Self::samples_with).
    pub fn sample_with(
        &self,
        distributions: Option<&DistributionSpace>,
        rng: Option<&mut fastrand::Rng>,
    ) -> Result<Configuration> {
        self.samples_with(distributions, rng, 1)?
            .pop()
            .ok_or(Error::SamplingUnsuccessful {
                requested: 1,
                obtained: 0,
            })
    }

    /// Draws `n` valid configurations.
    ///
    /// Candidates are drawn from `distributions` (the space's default
    /// assignment when `None`), their activity is resolved from the
    /// conditions, and candidates for which a forbidden clause holds are
    /// discarded. At most `100 * n` candidates are drawn. The result is all
    /// or nothing.
    ///
    /// `rng` defaults to the space's own generator, which is locked for the
    /// duration of the call.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if `distributions` belongs to another space.
    /// - [`Error::SamplingUnsuccessful`] if fewer than `n` candidates survive
    ///   the attempt budget, or a distribution keeps drawing outside its
    ///   parameters' domains.
    /// - [`Error::InvalidCondition`] if a condition does not evaluate to a
    ///   boolean.
    pub fn samples_with(
        &self,
        distributions: Option<&DistributionSpace>,
        rng: Option<&mut fastrand::Rng>,
        n: usize,
    ) -> Result<Vec<Configuration>> {
        if let Some(ds) = distributions
            && ds.configuration_space().id() != self.id()
        {
            return Err(invalid_value!(
                "distribution space belongs to '{}', not '{}'",
                ds.configuration_space().name(),
                self.name()
            ));
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let state = self.0.state.read();
        let custom = distributions.map(DistributionSpace::read);
        let table = custom.as_deref().unwrap_or(&state.distributions);
        match rng {
            Some(rng) => self.draw(&state, table, rng, n),
            None => self.draw(&state, table, &mut self.0.rng.lock(), n),
        }
    }

    fn draw(
        &self,
        state: &super::SpaceState,
        table: &DistributionState,
        rng: &mut fastrand::Rng,
        n: usize,
    ) -> Result<Vec<Configuration>> {
        let parameters = &self.0.parameters;
        let mut budget = SAMPLING_ATTEMPTS_PER_VALUE.saturating_mul(n);
        let mut accepted = Vec::with_capacity(n);

        while accepted.len() < n && budget > 0 {
            let batch = (n - accepted.len()).min(budget);
            budget -= batch;
            let rows = table
                .sample_rows(parameters.parameters(), rng, batch)
                .map_err(|e| match e {
                    Error::SamplingUnsuccessful { .. } => Error::SamplingUnsuccessful {
                        requested: n,
                        obtained: accepted.len(),
                    },
                    other => other,
                })?;
            for mut values in rows {
                validation::activate(parameters, &state.conditions, &state.graph, &mut values)?;
                if validation::holding_clause(parameters, &self.0.forbidden_clauses, &values)?
                    .is_none()
                {
                    accepted.push(Configuration::from_parts(self.clone(), values));
                }
            }
        }

        trace_debug!(
            space = %self.0.name,
            requested = n,
            accepted = accepted.len(),
            drawn = SAMPLING_ATTEMPTS_PER_VALUE.saturating_mul(n) - budget,
            "sampled configurations"
        );
        if accepted.len() < n {
            return Err(Error::SamplingUnsuccessful {
                requested: n,
                obtained: accepted.len(),
            });
        }
        Ok(accepted)
    }
}
