//! Tree node store (C1).
//!
//! Grounded on `Models/TreeModelUtilities/TreeNode.h`: a node holds one underlying
//! value plus aligned forward child indices and forward probabilities. Unlike the
//! original's `shared_ptr<TreeNode>` graph, children are integer indices into the
//! next time slice's `Vec<TreeNode>` — there are no pointers between nodes.

use crate::error::{PricingError, Result};

/// One node of one time slice. Interior nodes carry forward transition data;
/// terminal nodes (the last slice of a tree) carry none.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    value: f64,
    forward_children: Vec<usize>,
    forward_probabilities: Vec<f64>,
}

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-9;

impl TreeNode {
    /// A terminal node: value only, no forward arrays.
    pub fn terminal(value: f64) -> Self {
        TreeNode {
            value,
            forward_children: Vec::new(),
            forward_probabilities: Vec::new(),
        }
    }

    /// An interior node with forward children and aligned probabilities.
    /// The two arrays must be the same length and the probabilities must be
    /// non-negative and sum to 1.
    pub fn interior(
        value: f64,
        forward_children: Vec<usize>,
        forward_probabilities: Vec<f64>,
    ) -> Result<Self> {
        validate_forward(&forward_children, &forward_probabilities)?;
        Ok(TreeNode {
            value,
            forward_children,
            forward_probabilities,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Overwrites this node's value in place. Used by the dividend-deduction pass,
    /// which subtracts and floors a node's value after the graph has already been
    /// built.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn is_terminal(&self) -> bool {
        self.forward_children.is_empty()
    }

    pub fn forward_children(&self) -> &[usize] {
        &self.forward_children
    }

    pub fn forward_probabilities(&self) -> &[f64] {
        &self.forward_probabilities
    }

    /// Retroactively shortens (or otherwise replaces) this node's forward arrays.
    /// Used by the tree builder when a standard-deviation or dividend boundary
    /// collapses one of this node's children after the node was already created
    /// with the "optimistic" two- or ten-wide forward array.
    pub fn set_forward(
        &mut self,
        forward_children: Vec<usize>,
        forward_probabilities: Vec<f64>,
    ) -> Result<()> {
        validate_forward(&forward_children, &forward_probabilities)?;
        self.forward_children = forward_children;
        self.forward_probabilities = forward_probabilities;
        Ok(())
    }
}

fn validate_forward(children: &[usize], probabilities: &[f64]) -> Result<()> {
    if children.len() != probabilities.len() {
        return Err(PricingError::InvalidInput(format!(
            "forward children ({}) and probabilities ({}) must be the same length",
            children.len(),
            probabilities.len()
        )));
    }
    if probabilities.iter().any(|&p| p < 0.0) {
        return Err(PricingError::InvalidInput(
            "forward probabilities must be non-negative".to_string(),
        ));
    }
    let sum: f64 = probabilities.iter().sum();
    if children.is_empty() {
        return Ok(());
    }
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(PricingError::InvalidInput(format!(
            "forward probabilities must sum to 1, got {sum}"
        )));
    }
    Ok(())
}

/// A time slice's worth of nodes; `tree::builder` produces a `Vec<Slice>` per tree.
pub type Slice = Vec<TreeNode>;

/// An ordered sequence of time slices for a fixed horizon, produced by
/// [`crate::tree::builder::construct_tree`].
#[derive(Debug, Clone)]
pub struct Tree {
    slices: Vec<Slice>,
    time_to_expiry: f64,
}

impl Tree {
    pub(crate) fn new(slices: Vec<Slice>, time_to_expiry: f64) -> Self {
        Tree {
            slices,
            time_to_expiry,
        }
    }

    pub fn n_steps(&self) -> usize {
        self.slices.len() - 1
    }

    pub fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }

    pub fn slice(&self, i: usize) -> &Slice {
        &self.slices[i]
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_node_has_no_forward_arrays() {
        let node = TreeNode::terminal(100.0);
        assert!(node.is_terminal());
        assert!(node.forward_children().is_empty());
    }

    #[test]
    fn interior_node_requires_matching_lengths() {
        let result = TreeNode::interior(100.0, vec![0, 1], vec![0.5]);
        assert!(result.is_err());
    }

    #[test]
    fn interior_node_requires_probabilities_summing_to_one() {
        let result = TreeNode::interior(100.0, vec![0, 1], vec![0.5, 0.6]);
        assert!(result.is_err());
    }

    #[test]
    fn set_forward_can_collapse_to_a_single_child() {
        let mut node = TreeNode::interior(100.0, vec![0, 1], vec![0.4, 0.6]).unwrap();
        node.set_forward(vec![0], vec![1.0]).unwrap();
        assert_eq!(node.forward_children(), &[0]);
    }
}
