//! Sampling distributions.
//!
//! A [`Distribution`] produces raw [`Numeric`] samples over one or more
//! dimensions. Parameters convert those raw samples into typed values, so the
//! same distribution can drive a float parameter or index an enumerated one.
//!
//! | Variant | Dimension | Support |
//! |---------|-----------|---------|
//! | [`Uniform`] | 1 | `[lower, upper)`, linear or log scale, optional quantization |
//! | [`Normal`] | 1 | whole line (or positive half-line on log scale) |
//! | [`Roulette`] | 1 | integer indices `[0, k)` with given weights |
//! | [`Mixture`] | d | union of the component supports |
//! | [`Multivariate`] | sum of parts | product of the component supports |
//!
//! # Example
//!
//! ```
//! use configspace::distribution::{Distribution, Scale};
//!
//! let d = Distribution::uniform_float(1e-4, 1.0, Scale::Logarithmic, 0.0).unwrap();
//! let mut rng = fastrand::Rng::with_seed(7);
//! let draws = d.samples(&mut rng, 10);
//! assert_eq!(draws.len(), 10);
//! ```

mod mixture;
mod multivariate;
mod normal;
mod roulette;
mod uniform;

use std::sync::Arc;

pub use mixture::Mixture;
pub use multivariate::Multivariate;
pub use normal::Normal;
pub use roulette::Roulette;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
pub use uniform::Uniform;

use crate::error::{Error, Result, invalid_value};
use crate::interval::Interval;
use crate::numeric::{Numeric, NumericType};

/// Whether a distribution samples on a linear or logarithmic scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Scale {
    /// Sample uniformly in value space.
    #[default]
    Linear,
    /// Sample uniformly in log space.
    Logarithmic,
}

/// The concrete distribution behind a [`Distribution`] handle.
#[derive(Debug)]
pub enum DistributionKind {
    /// Flat over a range, linear or logarithmic.
    Uniform(Uniform),
    /// Gaussian, linear or logarithmic.
    Normal(Normal),
    /// Weighted pick of an index.
    Roulette(Roulette),
    /// Weighted pick of a component, then a draw from it.
    Mixture(Mixture),
    /// Independent draws, one per dimension.
    Multivariate(Multivariate),
}

/// A shared, immutable sampling distribution.
///
/// Cloning the handle is cheap; clones refer to the same distribution.
#[derive(Clone, Debug)]
pub struct Distribution(Arc<DistributionKind>);

impl Distribution {
    fn from_kind(kind: DistributionKind) -> Self {
        Self(Arc::new(kind))
    }

    /// A uniform float distribution over `[lower, upper)`.
    ///
    /// A positive `quantization` restricts samples to `lower + k * quantization`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) for empty
    /// or non-finite bounds, a negative quantization, or a non-positive lower
    /// bound on a logarithmic scale.
    pub fn uniform_float(lower: f64, upper: f64, scale: Scale, quantization: f64) -> Result<Self> {
        Ok(Self::from_kind(DistributionKind::Uniform(Uniform::float(
            lower,
            upper,
            scale,
            quantization,
        )?)))
    }

    /// A uniform integer distribution over `[lower, upper)`.
    ///
    /// A `quantization` of 0 behaves like 1.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Distribution::uniform_float`].
    pub fn uniform_int(lower: i64, upper: i64, scale: Scale, quantization: i64) -> Result<Self> {
        Ok(Self::from_kind(DistributionKind::Uniform(Uniform::int(
            lower,
            upper,
            scale,
            quantization,
        )?)))
    }

    /// A normal float distribution `N(mu, sigma)`; on a logarithmic scale the
    /// draw is exponentiated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) for a
    /// negative or non-finite `sigma`, a non-finite `mu`, or a negative
    /// quantization.
    pub fn normal_float(mu: f64, sigma: f64, scale: Scale, quantization: f64) -> Result<Self> {
        Ok(Self::from_kind(DistributionKind::Normal(Normal::new(
            NumericType::Float,
            mu,
            sigma,
            scale,
            quantization,
        )?)))
    }

    /// A normal distribution whose draws are rounded to integers.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Distribution::normal_float`].
    pub fn normal_int(mu: f64, sigma: f64, scale: Scale, quantization: i64) -> Result<Self> {
        #[allow(clippy::cast_precision_loss)]
        let q = quantization as f64;
        Ok(Self::from_kind(DistributionKind::Normal(Normal::new(
            NumericType::Int,
            mu,
            sigma,
            scale,
            q,
        )?)))
    }

    /// A roulette over indices `[0, areas.len())` weighted by `areas`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) if `areas`
    /// is empty, contains a negative or non-finite weight, or sums to zero.
    pub fn roulette(areas: &[f64]) -> Result<Self> {
        Ok(Self::from_kind(DistributionKind::Roulette(Roulette::new(
            areas,
        )?)))
    }

    /// A weighted mixture of distributions sharing dimension and data types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) on
    /// mismatched lengths, dimensions or data types, or invalid weights.
    pub fn mixture(distributions: Vec<Distribution>, weights: &[f64]) -> Result<Self> {
        Ok(Self::from_kind(DistributionKind::Mixture(Mixture::new(
            distributions,
            weights,
        )?)))
    }

    /// Independent distributions concatenated into one joint distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) if
    /// `distributions` is empty.
    pub fn multivariate(distributions: Vec<Distribution>) -> Result<Self> {
        Ok(Self::from_kind(DistributionKind::Multivariate(
            Multivariate::new(distributions)?,
        )))
    }

    /// The concrete distribution.
    #[must_use]
    pub fn kind(&self) -> &DistributionKind {
        &self.0
    }

    /// Returns `true` if both handles point to the same distribution.
    #[must_use]
    pub fn ptr_eq(&self, other: &Distribution) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of values produced by one joint draw.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self.kind() {
            DistributionKind::Uniform(_)
            | DistributionKind::Normal(_)
            | DistributionKind::Roulette(_) => 1,
            DistributionKind::Mixture(m) => m.dimension(),
            DistributionKind::Multivariate(m) => m.dimension(),
        }
    }

    /// The numeric type of each dimension.
    #[must_use]
    pub fn data_types(&self) -> Vec<NumericType> {
        match self.kind() {
            DistributionKind::Uniform(u) => vec![u.data_type()],
            DistributionKind::Normal(n) => vec![n.data_type()],
            DistributionKind::Roulette(_) => vec![NumericType::Int],
            DistributionKind::Mixture(m) => m.data_types(),
            DistributionKind::Multivariate(m) => m.data_types(),
        }
    }

    /// The support of each dimension.
    #[must_use]
    pub fn bounds(&self) -> Vec<Interval> {
        match self.kind() {
            DistributionKind::Uniform(u) => vec![u.bounds()],
            DistributionKind::Normal(n) => vec![n.bounds()],
            DistributionKind::Roulette(r) => vec![r.bounds()],
            DistributionKind::Mixture(m) => m.bounds().to_vec(),
            DistributionKind::Multivariate(m) => m.bounds(),
        }
    }

    /// Writes one joint draw into `out`, which must hold
    /// [`dimension`](Self::dimension) values.
    pub(crate) fn sample_into(&self, rng: &mut fastrand::Rng, out: &mut [Numeric]) {
        debug_assert_eq!(out.len(), self.dimension());
        match self.kind() {
            DistributionKind::Uniform(u) => out[0] = u.sample(rng),
            DistributionKind::Normal(n) => out[0] = n.sample(rng),
            DistributionKind::Roulette(r) => out[0] = r.sample(rng),
            DistributionKind::Mixture(m) => m.sample_into(rng, out),
            DistributionKind::Multivariate(m) => m.sample_into(rng, out),
        }
    }

    /// One joint draw.
    #[must_use]
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<Numeric> {
        let mut out = vec![Numeric::Int(0); self.dimension()];
        self.sample_into(rng, &mut out);
        out
    }

    /// `n` joint draws laid out row after row (`n * dimension` values).
    #[must_use]
    pub fn samples(&self, rng: &mut fastrand::Rng, n: usize) -> Vec<Numeric> {
        let dim = self.dimension();
        let mut out = vec![Numeric::Int(0); n * dim];
        for row in out.chunks_exact_mut(dim) {
            self.sample_into(rng, row);
        }
        out
    }

    /// `n` joint draws split into one vector per dimension.
    #[must_use]
    pub fn soa_samples(&self, rng: &mut fastrand::Rng, n: usize) -> Vec<Vec<Numeric>> {
        let dim = self.dimension();
        let mut columns = vec![Vec::with_capacity(n); dim];
        let mut row = vec![Numeric::Int(0); dim];
        for _ in 0..n {
            self.sample_into(rng, &mut row);
            for (column, value) in columns.iter_mut().zip(&row) {
                column.push(*value);
            }
        }
        columns
    }
}

/// Rejected draws are retried in batches growing by this factor...
pub(crate) const OVERSAMPLING_GROWTH: usize = 2;
/// ...until the batch multiplier exceeds this cap.
pub(crate) const OVERSAMPLING_CAP: usize = 32;

/// Collects `n` accepted items from the batches produced by `draw`, which
/// maps a batch size to one `Option` per draw (`None` for a rejection).
///
/// The first batch holds `n` draws; later ones hold the shortfall times a
/// multiplier that doubles every round. Once the multiplier passes the cap
/// the accepted items are discarded and sampling fails.
pub(crate) fn draw_with_rejection<T>(
    n: usize,
    mut draw: impl FnMut(usize) -> Result<Vec<Option<T>>>,
) -> Result<Vec<T>> {
    let mut accepted = Vec::with_capacity(n);
    let mut batch = n;
    let mut factor = 1;
    while accepted.len() < n {
        if factor > OVERSAMPLING_CAP {
            return Err(Error::SamplingUnsuccessful {
                requested: n,
                obtained: accepted.len(),
            });
        }
        let missing = n - accepted.len();
        accepted.extend(draw(batch)?.into_iter().flatten().take(missing));
        factor *= OVERSAMPLING_GROWTH;
        batch = (n - accepted.len()) * factor;
    }
    Ok(accepted)
}

/// Normalizes raw weights into a cumulative table `[0, w0, w0 + w1, ..., 1]`.
pub(crate) fn cumulative_table(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(invalid_value!("weights cannot be empty"));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(invalid_value!("weight {w} must be finite and non-negative"));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(invalid_value!("weights must have a positive finite sum"));
    }
    let mut table = Vec::with_capacity(weights.len() + 1);
    let mut acc = 0.0;
    table.push(0.0);
    for w in weights {
        acc += w / total;
        table.push(acc.min(1.0));
    }
    if let Some(last) = table.last_mut() {
        *last = 1.0;
    }
    Ok(table)
}

/// Binary search over a cumulative table.
///
/// Returns the index `i` with `table[i] <= r < table[i + 1]`. Values of `r`
/// at or past the last entry select the last non-empty bucket.
///
/// ```
/// use configspace::distribution::dichotomic_search;
///
/// let table = [0.0, 0.25, 0.5, 1.0];
/// assert_eq!(dichotomic_search(&table, 0.6), 2);
/// assert_eq!(dichotomic_search(&table, 0.0), 0);
/// assert_eq!(dichotomic_search(&table, 0.25), 1);
/// ```
#[must_use]
pub fn dichotomic_search(table: &[f64], r: f64) -> usize {
    let buckets = table.len().saturating_sub(1);
    if buckets == 0 {
        return 0;
    }
    let mut lo = 0;
    let mut hi = buckets;
    // lo is the largest visited index with table[lo] <= r; zero-width buckets
    // share their left edge with the next one and are therefore skipped.
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if table[mid] <= r {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn cumulative_table_normalizes() {
        let table = cumulative_table(&[1.0, 1.0, 2.0]).unwrap();
        assert_eq!(table, vec![0.0, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn cumulative_table_rejects_bad_weights() {
        assert!(cumulative_table(&[]).is_err());
        assert!(cumulative_table(&[0.0, 0.0]).is_err());
        assert!(cumulative_table(&[1.0, -1.0]).is_err());
        assert!(cumulative_table(&[f64::NAN]).is_err());
    }

    #[test]
    fn dichotomic_search_skips_empty_buckets() {
        let table = cumulative_table(&[1.0, 0.0, 1.0]).unwrap();
        assert_eq!(table, vec![0.0, 0.5, 0.5, 1.0]);
        assert_eq!(dichotomic_search(&table, 0.5), 2);
        assert_eq!(dichotomic_search(&table, 0.49), 0);
    }

    #[test]
    fn dichotomic_search_clamps_top() {
        let table = [0.0, 0.5, 1.0];
        assert_eq!(dichotomic_search(&table, 1.0), 1);
    }

    #[test]
    fn samples_layout() {
        let a = Distribution::uniform_float(0.0, 1.0, Scale::Linear, 0.0).unwrap();
        let b = Distribution::uniform_int(10, 20, Scale::Linear, 0).unwrap();
        let joint = Distribution::multivariate(vec![a, b]).unwrap();
        let mut rng = fastrand::Rng::with_seed(1);

        let rows = joint.samples(&mut rng, 5);
        assert_eq!(rows.len(), 10);
        for row in rows.chunks_exact(2) {
            assert!(matches!(row[0], Numeric::Float(_)));
            assert!(matches!(row[1], Numeric::Int(_)));
        }

        let columns = joint.soa_samples(&mut rng, 5);
        assert_eq!(columns.len(), 2);
        assert!(columns.iter().all(|c| c.len() == 5));
    }

    #[test]
    fn rejection_batches_grow_then_give_up() {
        let mut batches = Vec::new();
        let result: Result<Vec<u8>> = draw_with_rejection(3, |batch| {
            batches.push(batch);
            Ok(vec![None; batch])
        });
        assert_eq!(
            result,
            Err(Error::SamplingUnsuccessful {
                requested: 3,
                obtained: 0
            })
        );
        assert_eq!(batches, vec![3, 6, 12, 24, 48, 96]);
    }

    #[test]
    fn rejection_keeps_only_what_is_missing() {
        let mut round = 0;
        let values = draw_with_rejection(4, |batch| {
            round += 1;
            // Every other draw is rejected.
            Ok((0..batch).map(|i| (i % 2 == 0).then_some(round)).collect())
        })
        .unwrap();
        assert_eq!(values, vec![1, 1, 2, 2]);
    }

    proptest! {
        #[test]
        fn dichotomic_search_brackets_r(
            weights in prop::collection::vec(0.01f64..100.0, 1..20),
            r in 0.0f64..1.0,
        ) {
            let table = cumulative_table(&weights).unwrap();
            let i = dichotomic_search(&table, r);
            prop_assert!(i < weights.len());
            prop_assert!(table[i] <= r);
            prop_assert!(r < table[i + 1]);
        }
    }
}
