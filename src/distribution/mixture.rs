use super::{Distribution, cumulative_table, dichotomic_search};
use crate::error::{Result, invalid_value};
use crate::interval::Interval;
use crate::numeric::{Numeric, NumericType};

/// A weighted mixture: each draw picks one component by weight and samples it.
#[derive(Debug)]
pub struct Mixture {
    distributions: Vec<Distribution>,
    weights: Vec<f64>,
    table: Vec<f64>,
    data_types: Vec<NumericType>,
    bounds: Vec<Interval>,
}

impl Mixture {
    pub(super) fn new(distributions: Vec<Distribution>, weights: &[f64]) -> Result<Self> {
        if distributions.is_empty() {
            return Err(invalid_value!("a mixture needs at least one distribution"));
        }
        if distributions.len() != weights.len() {
            return Err(invalid_value!(
                "{} distributions but {} weights",
                distributions.len(),
                weights.len()
            ));
        }
        let table = cumulative_table(weights)?;

        let data_types = distributions[0].data_types();
        let mut bounds = distributions[0].bounds();
        for d in &distributions[1..] {
            if d.dimension() != data_types.len() {
                return Err(invalid_value!(
                    "mixture components must share dimension {}",
                    data_types.len()
                ));
            }
            if d.data_types() != data_types {
                return Err(invalid_value!("mixture components must share data types"));
            }
            for (acc, b) in bounds.iter_mut().zip(d.bounds()) {
                *acc = acc.union(&b)?;
            }
        }

        Ok(Self {
            distributions,
            weights: weights.to_vec(),
            table,
            data_types,
            bounds,
        })
    }

    /// The components, in pick order.
    #[must_use]
    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    /// Component weights as given.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Running sums of the weights, starting at zero.
    #[must_use]
    pub fn cumulative(&self) -> &[f64] {
        &self.table
    }

    pub(super) fn dimension(&self) -> usize {
        self.data_types.len()
    }

    pub(super) fn data_types(&self) -> Vec<NumericType> {
        self.data_types.clone()
    }

    /// Per-dimension union of the component supports.
    pub(super) fn bounds(&self) -> &[Interval] {
        &self.bounds
    }

    pub(super) fn sample_into(&self, rng: &mut fastrand::Rng, out: &mut [Numeric]) {
        let index = dichotomic_search(&self.table, rng.f64());
        self.distributions[index].sample_into(rng, out);
    }
}
