//! Log-normal diffusion with one scheduled dividend and a Bernoulli mixture of two
//! normal jumps.
//!
//! Grounded on `Models/BlackScholesWithDoubleJumpModel.{h,cpp}`: at the jump date,
//! the underlying follows jump branch 1 with probability `bernoulli_probability` and
//! branch 2 otherwise, each branch contributing its own mean/volatility to the
//! discrete jump distribution. `construct_tree` realises this as two independent
//! single-jump trees merged at the root: the root's forward arcs fan into both
//! sub-trees' first slices, weighted by the Bernoulli probability, and every later
//! slice is the concatenation of the two sub-trees' corresponding slices with one
//! side's child indices shifted past the other's. This model is used only in the
//! pricing path — calibration only ever drives [`super::SingleJumpModel`].

use crate::analytic::black_scholes_price;
use crate::error::{require_non_negative, require_strictly_positive, PricingError, Result, EPS};
use crate::models::TreeModel;
use crate::option::{UnderlyingCode, VanillaOption};
use crate::tree::builder::{construct_tree, JumpSpec, TreeBuildParams};
use crate::tree::node::{Slice, Tree, TreeNode};
use crate::tree::Implementation;

#[derive(Debug, Clone)]
pub struct DoubleJumpModel {
    cost_of_carry: f64,
    discount_rate: f64,
    implied_volatility: f64,
    initial_underlying_price: f64,
    underlying_code: UnderlyingCode,
    dividend_time: f64,
    dividend_amount: f64,
    jump_time: f64,
    jump_mean_1: f64,
    jump_volatility_1: f64,
    jump_mean_2: f64,
    jump_volatility_2: f64,
    bernoulli_probability: f64,
}

impl DoubleJumpModel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cost_of_carry: f64,
        discount_rate: f64,
        implied_volatility: f64,
        initial_underlying_price: f64,
        underlying_code: UnderlyingCode,
        dividend_time: f64,
        dividend_amount: f64,
        jump_time: f64,
        jump_mean_1: f64,
        jump_volatility_1: f64,
        jump_mean_2: f64,
        jump_volatility_2: f64,
        bernoulli_probability: f64,
    ) -> Result<Self> {
        require_strictly_positive(implied_volatility, "implied_volatility")?;
        require_strictly_positive(initial_underlying_price, "initial_underlying_price")?;
        require_non_negative(dividend_time, "dividend_time")?;
        require_non_negative(dividend_amount, "dividend_amount")?;
        require_non_negative(jump_time, "jump_time")?;
        require_strictly_positive(jump_volatility_1, "jump_volatility_1")?;
        require_strictly_positive(jump_volatility_2, "jump_volatility_2")?;
        if !(0.0..=1.0).contains(&bernoulli_probability) {
            return Err(PricingError::InvalidInput(format!(
                "bernoulli_probability must be in [0, 1], got {bernoulli_probability}"
            )));
        }
        Ok(DoubleJumpModel {
            cost_of_carry,
            discount_rate,
            implied_volatility,
            initial_underlying_price,
            underlying_code,
            dividend_time,
            dividend_amount,
            jump_time,
            jump_mean_1,
            jump_volatility_1,
            jump_mean_2,
            jump_volatility_2,
            bernoulli_probability,
        })
    }

    fn branch_params(&self, n_steps: usize, time_to_expiry: f64, implementation: Implementation, upper_sd: f64, lower_sd: f64, mu: f64, sigma_j: f64) -> TreeBuildParams {
        TreeBuildParams {
            s0: self.initial_underlying_price,
            n_steps,
            time_to_expiry,
            sigma: self.implied_volatility,
            discount_rate: self.discount_rate,
            cost_of_carry: self.cost_of_carry,
            implementation,
            upper_sd,
            lower_sd,
            dividend: Some((self.dividend_time, self.dividend_amount)),
            jump: Some(JumpSpec {
                time: self.jump_time,
                mu,
                sigma_j,
            }),
        }
    }
}

impl TreeModel for DoubleJumpModel {
    fn underlying_code(&self) -> &UnderlyingCode {
        &self.underlying_code
    }

    fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    fn construct_tree(
        &self,
        n_steps: usize,
        time_to_expiry: f64,
        implementation: Implementation,
        upper_sd: f64,
        lower_sd: f64,
    ) -> Result<Tree> {
        let branch_a = construct_tree(&self.branch_params(
            n_steps,
            time_to_expiry,
            implementation,
            upper_sd,
            lower_sd,
            self.jump_mean_1,
            self.jump_volatility_1,
        ))?;
        let branch_b = construct_tree(&self.branch_params(
            n_steps,
            time_to_expiry,
            implementation,
            upper_sd,
            lower_sd,
            self.jump_mean_2,
            self.jump_volatility_2,
        ))?;
        merge_bernoulli_branches(
            self.initial_underlying_price,
            time_to_expiry,
            branch_a,
            branch_b,
            self.bernoulli_probability,
        )
    }

    fn smoothed_terminal_value(&self, s: f64, option: &VanillaOption, dt: f64) -> Result<f64> {
        black_scholes_price(
            s,
            option.strike(),
            dt,
            self.discount_rate,
            self.cost_of_carry,
            self.implied_volatility,
            option.right(),
        )
    }

    fn supports_smoothing(&self, t_start: f64, t_end: f64) -> bool {
        let dividend_inside = self.dividend_time > t_start + EPS && self.dividend_time < t_end + EPS;
        let jump_inside = self.jump_time > t_start + EPS && self.jump_time < t_end + EPS;
        !dividend_inside && !jump_inside
    }
}

/// Splices two independently built trees (same `n_steps`, same horizon) into one,
/// replacing each tree's own root with a single synthetic root whose forward arcs
/// reach into branch A's first slice with probability `p` and branch B's with
/// probability `1 - p`. Every later slice is the concatenation of the two branches'
/// slices at that depth, with branch B's forward child indices shifted past the end
/// of branch A's corresponding next slice.
fn merge_bernoulli_branches(
    s0: f64,
    time_to_expiry: f64,
    branch_a: Tree,
    branch_b: Tree,
    p: f64,
) -> Result<Tree> {
    let n = branch_a.n_steps();
    let mut combined: Vec<Slice> = Vec::with_capacity(n + 1);

    let root_a = &branch_a.slice(0)[0];
    let root_b = &branch_b.slice(0)[0];
    let a_slice_1_len = branch_a.slice(1).len();

    let mut children = Vec::with_capacity(root_a.forward_children().len() + root_b.forward_children().len());
    let mut probabilities = Vec::with_capacity(children.capacity());
    for (&child, &probability) in root_a.forward_children().iter().zip(root_a.forward_probabilities()) {
        children.push(child);
        probabilities.push(p * probability);
    }
    for (&child, &probability) in root_b.forward_children().iter().zip(root_b.forward_probabilities()) {
        children.push(a_slice_1_len + child);
        probabilities.push((1.0 - p) * probability);
    }
    combined.push(vec![TreeNode::interior(s0, children, probabilities)?]);

    for i in 1..=n {
        let a_slice = branch_a.slice(i);
        let b_slice = branch_b.slice(i);
        let shift = if i < n { branch_a.slice(i + 1).len() } else { 0 };
        let mut slice: Slice = Vec::with_capacity(a_slice.len() + b_slice.len());
        slice.extend(a_slice.iter().cloned());
        for node in b_slice {
            if node.is_terminal() {
                slice.push(node.clone());
            } else {
                let shifted_children: Vec<usize> =
                    node.forward_children().iter().map(|&c| c + shift).collect();
                slice.push(TreeNode::interior(
                    node.value(),
                    shifted_children,
                    node.forward_probabilities().to_vec(),
                )?);
            }
        }
        combined.push(slice);
    }

    Ok(Tree::new(combined, time_to_expiry))
}
