use super::{cumulative_table, dichotomic_search};
use crate::error::Result;
use crate::interval::Interval;
use crate::numeric::Numeric;

/// Weighted choice among the indices `[0, k)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Roulette {
    areas: Vec<f64>,
    table: Vec<f64>,
}

impl Roulette {
    pub(super) fn new(areas: &[f64]) -> Result<Self> {
        let table = cumulative_table(areas)?;
        Ok(Self {
            areas: areas.to_vec(),
            table,
        })
    }

    /// The raw weights as given at construction.
    #[must_use]
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    /// The normalized cumulative table, `k + 1` entries from 0 to 1.
    #[must_use]
    pub fn cumulative(&self) -> &[f64] {
        &self.table
    }

    /// The index selected by a uniform draw `r` in `[0, 1)`.
    #[must_use]
    pub fn index_for(&self, r: f64) -> usize {
        dichotomic_search(&self.table, r)
    }

    #[allow(clippy::cast_possible_wrap)]
    pub(super) fn bounds(&self) -> Interval {
        Interval::int(0, self.areas.len() as i64)
    }

    #[allow(clippy::cast_possible_wrap)]
    pub(super) fn sample(&self, rng: &mut fastrand::Rng) -> Numeric {
        Numeric::Int(self.index_for(rng.f64()) as i64)
    }
}
