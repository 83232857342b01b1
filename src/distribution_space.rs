//! Assignment of distributions to the parameters of a configuration space.
//!
//! Every parameter is covered by exactly one wrapper: a distribution of
//! dimension `k` bound to `k` parameter indices. Wrappers live in a
//! slab-backed doubly linked list, and a reverse index maps each parameter to
//! its wrapper slot and dimension, so lookups and reassignment are O(1) per
//! affected parameter.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::binding::Context;
use crate::datum::Datum;
use crate::distribution::{Distribution, draw_with_rejection};
use crate::error::{Error, Result, invalid_value};
use crate::parameter::Parameter;
use crate::space::ConfigurationSpace;

#[derive(Clone, Debug)]
struct Wrapper {
    distribution: Distribution,
    indices: Vec<usize>,
    /// Per dimension: whether the distribution reaches outside the domain.
    oversampling: Vec<bool>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Wrapper {
    fn new(distribution: Distribution, indices: Vec<usize>, parameters: &[Parameter]) -> Self {
        let oversampling = indices
            .iter()
            .zip(distribution.bounds())
            .map(|(&i, bounds)| parameters[i].is_oversampled_by(&bounds))
            .collect();
        Self {
            distribution,
            indices,
            oversampling,
            prev: None,
            next: None,
        }
    }
}

/// A distribution together with the parameter indices it draws for.
#[derive(Clone, Debug)]
pub struct DistributionWrapper {
    distribution: Distribution,
    indices: Vec<usize>,
}

impl DistributionWrapper {
    /// The distribution drawn for this wrapper.
    #[must_use]
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Parameter index of each dimension.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// The wrapper list itself, without locking or space bookkeeping.
#[derive(Clone, Debug)]
pub(crate) struct DistributionState {
    slots: Vec<Option<Wrapper>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    /// `(slot, dimension)` of the wrapper covering each parameter.
    reverse: Vec<(usize, usize)>,
}

impl DistributionState {
    /// One default wrapper per parameter, in index order.
    pub(crate) fn new(parameters: &[Parameter]) -> Result<Self> {
        let mut state = Self {
            slots: Vec::with_capacity(parameters.len()),
            free: Vec::new(),
            head: None,
            tail: None,
            reverse: vec![(0, 0); parameters.len()],
        };
        for (i, p) in parameters.iter().enumerate() {
            state.push_back(Wrapper::new(p.default_distribution()?, vec![i], parameters));
        }
        Ok(state)
    }

    fn push_back(&mut self, mut wrapper: Wrapper) {
        let slot = self.free.pop().unwrap_or(self.slots.len());
        if slot == self.slots.len() {
            self.slots.push(None);
        }
        wrapper.prev = self.tail;
        wrapper.next = None;
        match self.tail.and_then(|t| self.slots[t].as_mut()) {
            Some(last) => last.next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        for (dimension, &index) in wrapper.indices.iter().enumerate() {
            self.reverse[index] = (slot, dimension);
        }
        self.slots[slot] = Some(wrapper);
    }

    fn unlink(&mut self, slot: usize) -> Option<Wrapper> {
        let wrapper = self.slots.get_mut(slot)?.take()?;
        match wrapper.prev.and_then(|p| self.slots[p].as_mut()) {
            Some(prev) => prev.next = wrapper.next,
            None => self.head = wrapper.next,
        }
        match wrapper.next.and_then(|n| self.slots[n].as_mut()) {
            Some(next) => next.prev = wrapper.prev,
            None => self.tail = wrapper.prev,
        }
        self.free.push(slot);
        Some(wrapper)
    }

    fn iter(&self) -> impl Iterator<Item = &Wrapper> {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let wrapper = self.slots.get(cursor?)?.as_ref()?;
            cursor = wrapper.next;
            Some(wrapper)
        })
    }

    /// Binds `distribution` to `indices`, one index per dimension.
    ///
    /// Wrappers sharing an index with the new group are removed; their
    /// remaining indices fall back to their parameter's default distribution.
    /// Nothing changes if validation fails.
    pub(crate) fn set_distribution(
        &mut self,
        parameters: &[Parameter],
        distribution: &Distribution,
        indices: &[usize],
    ) -> Result<()> {
        if indices.len() != distribution.dimension() {
            return Err(invalid_value!(
                "a distribution of dimension {} needs as many indices, got {}",
                distribution.dimension(),
                indices.len()
            ));
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= parameters.len()) {
            return Err(Error::OutOfBounds {
                index,
                len: parameters.len(),
            });
        }
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != indices.len() {
            return Err(invalid_value!("an index appears twice in {indices:?}"));
        }

        let mut overlapped: Vec<usize> = indices.iter().map(|&i| self.reverse[i].0).collect();
        overlapped.sort_unstable();
        overlapped.dedup();
        let mut orphans = Vec::new();
        for &slot in &overlapped {
            if let Some(w) = &self.slots[slot] {
                for &i in w.indices.iter().filter(|i| !indices.contains(i)) {
                    orphans.push((i, parameters[i].default_distribution()?));
                }
            }
        }
        orphans.sort_by_key(|(i, _)| *i);

        let wrapper = Wrapper::new(distribution.clone(), indices.to_vec(), parameters);
        for slot in overlapped {
            self.unlink(slot);
        }
        self.push_back(wrapper);
        for (i, default) in orphans {
            self.push_back(Wrapper::new(default, vec![i], parameters));
        }
        Ok(())
    }

    pub(crate) fn distribution(&self, index: usize) -> Result<(Distribution, usize)> {
        let &(slot, dimension) = self.reverse.get(index).ok_or(Error::OutOfBounds {
            index,
            len: self.reverse.len(),
        })?;
        self.slots[slot]
            .as_ref()
            .map(|w| (w.distribution.clone(), dimension))
            .ok_or(Error::InvalidObject("distribution wrapper"))
    }

    pub(crate) fn wrappers(&self) -> Vec<DistributionWrapper> {
        self.iter()
            .map(|w| DistributionWrapper {
                distribution: w.distribution.clone(),
                indices: w.indices.clone(),
            })
            .collect()
    }

    /// Draws `n` value vectors, one joint draw per wrapper each.
    ///
    /// A joint draw is rejected as a whole when any of its dimensions falls
    /// outside its parameter's domain; rejected draws are retried on the
    /// oversampling schedule.
    pub(crate) fn sample_rows(
        &self,
        parameters: &[Parameter],
        rng: &mut fastrand::Rng,
        n: usize,
    ) -> Result<Vec<Vec<Datum>>> {
        let mut rows = vec![vec![Datum::Inactive; parameters.len()]; n];
        for w in self.iter() {
            let draws = draw_with_rejection(n, |batch| {
                let columns: Vec<Vec<Datum>> = w
                    .distribution
                    .soa_samples(rng, batch)
                    .iter()
                    .zip(&w.indices)
                    .zip(&w.oversampling)
                    .map(|((raw, &i), &oversampling)| {
                        parameters[i].convert_samples(raw, oversampling)
                    })
                    .collect();
                Ok((0..batch)
                    .map(|row| {
                        let joint: Vec<Datum> = columns.iter().map(|c| c[row].clone()).collect();
                        (!joint.iter().any(Datum::is_inactive)).then_some(joint)
                    })
                    .collect())
            })?;
            for (row, joint) in rows.iter_mut().zip(draws) {
                for (&i, value) in w.indices.iter().zip(joint) {
                    row[i] = value;
                }
            }
        }
        Ok(rows)
    }
}

/// A standalone distribution assignment for one configuration space.
///
/// Every configuration space carries a default assignment; a
/// `DistributionSpace` is an alternative one that can be passed to
/// [`ConfigurationSpace::samples_with`].
///
/// # Example
///
/// ```
/// use configspace::prelude::*;
///
/// let x = Parameter::float("x", 0.0, 1.0).build().unwrap();
/// let y = Parameter::float("y", 0.0, 1.0).build().unwrap();
/// let space = ConfigurationSpace::builder("demo").parameters([x, y]).build().unwrap();
///
/// let joint = Distribution::multivariate(vec![
///     Distribution::uniform_float(0.0, 0.5, Scale::Linear, 0.0).unwrap(),
///     Distribution::uniform_float(0.5, 1.0, Scale::Linear, 0.0).unwrap(),
/// ])
/// .unwrap();
/// let ds = DistributionSpace::new(&space).unwrap();
/// ds.set_distribution(&joint, &[0, 1]).unwrap();
///
/// let c = space.sample_with(Some(&ds), None).unwrap();
/// assert!(c.value(0).unwrap().as_f64().unwrap() < 0.5);
/// ```
#[derive(Clone, Debug)]
pub struct DistributionSpace(Arc<DistributionSpaceInner>);

#[derive(Debug)]
struct DistributionSpaceInner {
    space: ConfigurationSpace,
    state: RwLock<DistributionState>,
}

impl DistributionSpace {
    /// Starts from the default distribution of every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] if a parameter cannot be sampled.
    pub fn new(space: &ConfigurationSpace) -> Result<Self> {
        let state = DistributionState::new(space.parameters())?;
        Ok(Self(Arc::new(DistributionSpaceInner {
            space: space.clone(),
            state: RwLock::new(state),
        })))
    }

    /// The space this assignment belongs to.
    #[must_use]
    pub fn configuration_space(&self) -> &ConfigurationSpace {
        &self.0.space
    }

    /// Binds `distribution` to the parameters at `indices`, one index per
    /// dimension.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] if the index count differs from the
    ///   distribution's dimension or an index repeats.
    /// - [`Error::OutOfBounds`] for an index past the last parameter.
    pub fn set_distribution(&self, distribution: &Distribution, indices: &[usize]) -> Result<()> {
        self.0
            .state
            .write()
            .set_distribution(self.0.space.parameters(), distribution, indices)?;
        trace_debug!(?indices, "distribution space reassigned");
        Ok(())
    }

    /// The distribution covering parameter `index`, and the dimension that
    /// draws it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is past the last parameter.
    pub fn distribution(&self, index: usize) -> Result<(Distribution, usize)> {
        self.0.state.read().distribution(index)
    }

    /// All wrappers in list order.
    #[must_use]
    pub fn wrappers(&self) -> Vec<DistributionWrapper> {
        self.0.state.read().wrappers()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, DistributionState> {
        self.0.state.read()
    }
}
