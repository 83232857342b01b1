//! Condition dependency graph.
//!
//! A parameter's condition reads other parameters, its parents. Activation
//! visits parameters so that every parent is resolved before its children,
//! which requires the graph to be acyclic.

use std::collections::VecDeque;

use crate::binding::Context;
use crate::error::{Error, Result};
use crate::expression::Expression;

/// Parent and child lists plus a topological order of parameter indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    sorted_indexes: Vec<usize>,
}

impl DependencyGraph {
    /// Builds the graph from each node's parent list.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if a parent index is not a node.
    /// - [`Error::InvalidGraph`] if the edges form a cycle, including a node
    ///   that is its own parent.
    pub fn new(mut parents: Vec<Vec<usize>>) -> Result<Self> {
        let len = parents.len();
        let mut children = vec![Vec::new(); len];
        for (child, list) in parents.iter_mut().enumerate() {
            list.sort_unstable();
            list.dedup();
            for &parent in list.iter() {
                if parent >= len {
                    return Err(Error::OutOfBounds { index: parent, len });
                }
                children[parent].push(child);
            }
        }

        // Kahn's algorithm, seeded in index order.
        let mut in_degree: Vec<usize> = parents.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..len).filter(|&i| in_degree[i] == 0).collect();
        let mut sorted_indexes = Vec::with_capacity(len);
        while let Some(node) = queue.pop_front() {
            sorted_indexes.push(node);
            for &child in &children[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }
        if sorted_indexes.len() < len {
            trace_debug!(
                resolved = sorted_indexes.len(),
                total = len,
                "condition graph has a cycle"
            );
            return Err(Error::InvalidGraph);
        }

        Ok(Self {
            parents,
            children,
            sorted_indexes,
        })
    }

    /// Builds the graph of `conditions`, one optional condition per
    /// parameter of `context`.
    ///
    /// # Errors
    ///
    /// As [`DependencyGraph::new`], plus [`Error::InvalidExpression`] when a
    /// condition reads a parameter outside `context`.
    pub fn from_conditions(
        conditions: &[Option<Expression>],
        context: &dyn Context,
    ) -> Result<Self> {
        let parents = conditions
            .iter()
            .map(|c| {
                c.as_ref()
                    .map_or_else(|| Ok(Vec::new()), |e| e.parameter_indices(context))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(parents)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns `true` for a graph without nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Parents of `index`, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is not a node.
    pub fn parents(&self, index: usize) -> Result<&[usize]> {
        self.parents
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::OutOfBounds {
                index,
                len: self.len(),
            })
    }

    /// Children of `index`, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is not a node.
    pub fn children(&self, index: usize) -> Result<&[usize]> {
        self.children
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::OutOfBounds {
                index,
                len: self.len(),
            })
    }

    /// Every node, parents before children.
    #[must_use]
    pub fn sorted_indexes(&self) -> &[usize] {
        &self.sorted_indexes
    }
}
