//! Tree construction, backward-induction pricing, and Richardson extrapolation
//! (components C1-C5).

pub mod builder;
pub mod node;
pub mod pricer;
pub mod richardson;
pub mod states;

pub use builder::{construct_tree, JumpSpec, TreeBuildParams};
pub use node::{Slice, Tree, TreeNode};
pub use states::{DiscreteDistribution, Implementation};
