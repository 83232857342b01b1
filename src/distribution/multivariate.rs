use super::Distribution;
use crate::error::{Result, invalid_value};
use crate::interval::Interval;
use crate::numeric::{Numeric, NumericType};

/// Independent distributions sampled side by side.
#[derive(Debug)]
pub struct Multivariate {
    distributions: Vec<Distribution>,
    dimension: usize,
}

impl Multivariate {
    pub(super) fn new(distributions: Vec<Distribution>) -> Result<Self> {
        if distributions.is_empty() {
            return Err(invalid_value!(
                "a multivariate distribution needs at least one component"
            ));
        }
        let dimension = distributions.iter().map(Distribution::dimension).sum();
        Ok(Self {
            distributions,
            dimension,
        })
    }

    /// One distribution per dimension.
    #[must_use]
    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    pub(super) fn dimension(&self) -> usize {
        self.dimension
    }

    pub(super) fn data_types(&self) -> Vec<NumericType> {
        self.distributions
            .iter()
            .flat_map(Distribution::data_types)
            .collect()
    }

    pub(super) fn bounds(&self) -> Vec<Interval> {
        self.distributions
            .iter()
            .flat_map(Distribution::bounds)
            .collect()
    }

    pub(super) fn sample_into(&self, rng: &mut fastrand::Rng, out: &mut [Numeric]) {
        let mut offset = 0;
        for d in &self.distributions {
            let dim = d.dimension();
            d.sample_into(rng, &mut out[offset..offset + dim]);
            offset += dim;
        }
    }
}
