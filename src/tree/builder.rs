//! Tree builder (C3).
//!
//! Grounded on `Models/TreeModelUtilities/LogNormalDiffusionTreeHelper.cpp`:
//! `constructRecombiningTree`/`constructRecombiningTreeNodes` (recombining-phase
//! growth with standard-deviation truncation and dividend absorption) and
//! `constructJumpDiffusionTree` (phase classification around the jump date and the
//! non-recombining fan-out after it). Unlike the original, standard-deviation
//! truncation is applied in every recombining-growth step regardless of whether the
//! model has a jump (see DESIGN.md) — the original only truncates in its dedicated
//! no-jump builder and relies on the dividend zero-floor alone in the jump builder's
//! recombining phase.

use crate::error::{require_non_negative, require_strictly_positive, PricingError, Result, EPS};
use crate::tree::node::{Slice, Tree, TreeNode};
use crate::tree::states::{
    diffusion_states_and_probabilities, jump_diffusion_states_and_probabilities,
    jump_states_and_probabilities, DiscreteDistribution, Implementation,
};

/// A single permitted jump: its time, mean, and volatility. Present only for the
/// single- and double-jump model variants (the double-jump model builds two trees,
/// one per Bernoulli branch, each with its own `JumpSpec`).
#[derive(Debug, Clone, Copy)]
pub struct JumpSpec {
    pub time: f64,
    pub mu: f64,
    pub sigma_j: f64,
}

/// Everything the tree builder needs to assemble one [`Tree`].
#[derive(Debug, Clone)]
pub struct TreeBuildParams {
    pub s0: f64,
    pub n_steps: usize,
    pub time_to_expiry: f64,
    pub sigma: f64,
    pub discount_rate: f64,
    pub cost_of_carry: f64,
    pub implementation: Implementation,
    pub upper_sd: f64,
    pub lower_sd: f64,
    pub dividend: Option<(f64, f64)>,
    pub jump: Option<JumpSpec>,
}

/// Builds the `n_steps + 1` time-sliced node graph described by `params`.
pub fn construct_tree(params: &TreeBuildParams) -> Result<Tree> {
    require_strictly_positive(params.s0, "s0")?;
    require_strictly_positive(params.sigma, "sigma")?;
    require_non_negative(params.time_to_expiry, "time_to_expiry")?;
    if params.n_steps == 0 {
        return Err(PricingError::InvalidInput(
            "n_steps must be at least 1".to_string(),
        ));
    }
    if let Some((t_d, d)) = params.dividend {
        require_non_negative(t_d, "dividend_time")?;
        require_non_negative(d, "dividend_amount")?;
    }
    if let Some(jump) = params.jump {
        require_non_negative(jump.time, "jump_time")?;
        require_strictly_positive(jump.sigma_j, "jump_volatility")?;
    }

    let n = params.n_steps;
    let dt = params.time_to_expiry / n as f64;

    let diffusion = diffusion_states_and_probabilities(
        dt,
        params.sigma,
        params.discount_rate,
        params.cost_of_carry,
        params.implementation,
    )?;
    let jump_diffusion: Option<DiscreteDistribution> = params.jump.map(|jump| {
        let jump_dist = jump_states_and_probabilities(jump.mu, jump.sigma_j);
        jump_diffusion_states_and_probabilities(&jump_dist, &diffusion)
    });

    let u0 = params.s0 * params.sigma.exp();

    let mut slices: Vec<Slice> = Vec::with_capacity(n + 1);

    // Slice 0: the root.
    let jump_in_first_step = params
        .jump
        .is_some_and(|j| j.time > 0.0 && j.time <= dt + EPS);
    let (root_arity, root_dist) = if jump_in_first_step {
        (10, jump_diffusion.as_ref().unwrap())
    } else {
        (2, &diffusion)
    };
    let root = TreeNode::interior(
        params.s0,
        (0..root_arity).collect(),
        root_dist.probabilities.clone(),
    )?;
    slices.push(vec![root]);

    for i in 1..=n {
        let time_i = i as f64 * dt;
        let step_start = (i - 1) as f64 * dt;
        let is_last_time = i == n;

        let is_jump_step = params
            .jump
            .is_some_and(|j| j.time > step_start + EPS && j.time <= time_i + EPS);
        let already_jumped = params.jump.is_some_and(|j| j.time <= step_start + EPS);
        let current_is_recombining = !(is_jump_step || already_jumped);

        let dividend_this_step = params.dividend.and_then(|(t_d, d)| {
            if t_d >= step_start - EPS && t_d < step_start + dt - EPS {
                Some(d)
            } else {
                None
            }
        });

        let upper_limit = u0 * (params.upper_sd * time_i.sqrt()).exp();
        let lower_limit = (u0 * (params.lower_sd * time_i.sqrt()).exp()).max(1e-8);

        let new_slice = if current_is_recombining {
            let jump_in_next_step = params
                .jump
                .is_some_and(|j| j.time > time_i + EPS && j.time <= time_i + dt + EPS);
            let (own_arity, own_dist) = if jump_in_next_step {
                (10, jump_diffusion.as_ref().unwrap())
            } else {
                (2, &diffusion)
            };
            build_recombining_growth_slice(
                &mut slices[i - 1],
                &diffusion,
                own_arity,
                own_dist,
                upper_limit,
                lower_limit,
                dividend_this_step,
                is_last_time,
            )?
        } else {
            let state_dist = if is_jump_step {
                jump_diffusion.as_ref().unwrap()
            } else {
                &diffusion
            };
            build_full_fanout_slice(
                &slices[i - 1],
                state_dist,
                &diffusion,
                dividend_this_step,
                is_last_time,
            )?
        };

        tracing::trace!(slice = i, nodes = new_slice.len(), "tree slice constructed");
        slices.push(new_slice);
    }

    if let Some((t_d, d)) = params.dividend {
        deduct_dividend(&mut slices, t_d, d, dt, n);
    }

    tracing::debug!(
        n_steps = n,
        total_nodes = slices.iter().map(|s| s.len()).sum::<usize>(),
        "tree constructed"
    );

    Ok(Tree::new(slices, params.time_to_expiry))
}

/// Case (a)/(b): builds slice `i` from a still-recombining slice `i-1` (size
/// `prev.len()`, growing to `prev.len() + 1`), applying the standard-deviation and
/// dividend zero-absorbing boundary. `own_arity`/`own_dist` are the forward arity
/// and distribution assigned to the *new* slice's own nodes (2-wide diffusion, or
/// 10-wide jump-diffusion if the jump falls in the step immediately following).
#[allow(clippy::too_many_arguments)]
fn build_recombining_growth_slice(
    prev: &mut Slice,
    diffusion: &DiscreteDistribution,
    own_arity: usize,
    own_dist: &DiscreteDistribution,
    upper_limit: f64,
    lower_limit: f64,
    dividend_amount: Option<f64>,
    is_last_time: bool,
) -> Result<Slice> {
    let mut cur = Slice::with_capacity(prev.len() + 1);
    let mut next_index: usize = 0;
    let increment = if own_arity == 2 { 1 } else { own_arity };

    let up_value = prev[0].value() * diffusion.values[0].exp();
    if up_value < upper_limit {
        cur.push(make_node(up_value, next_index, own_arity, own_dist, is_last_time)?);
        next_index += increment;
    } else {
        prev[0].set_forward(vec![next_index], vec![1.0])?;
    }

    for parent in prev.iter_mut() {
        let down_value = parent.value() * diffusion.values[1].exp();
        let dividend_absorbs = dividend_amount.is_some_and(|d| down_value - d < EPS);
        if dividend_absorbs || down_value < lower_limit {
            let up_index = *parent.forward_children().first().ok_or_else(|| {
                PricingError::InvalidInput(
                    "cannot redirect a node whose up child was already removed".to_string(),
                )
            })?;
            parent.set_forward(vec![up_index], vec![1.0])?;
        } else {
            cur.push(make_node(
                down_value,
                next_index,
                own_arity,
                own_dist,
                is_last_time,
            )?);
            next_index += increment;
        }
    }

    Ok(cur)
}

/// Case (c): builds slice `i` from a non-recombining slice `i-1`. Every previous
/// node expands to `state_dist.len()` distinct children (no sharing, no
/// truncation); a dividend inside the current step still floors a child's value at
/// zero but never removes it (there is no sibling to redirect mass to).
fn build_full_fanout_slice(
    prev: &Slice,
    state_dist: &DiscreteDistribution,
    diffusion: &DiscreteDistribution,
    dividend_amount: Option<f64>,
    is_last_time: bool,
) -> Result<Slice> {
    let mut cur = Slice::with_capacity(prev.len() * state_dist.len());
    let mut next_index: usize = 0;
    for parent in prev {
        for &state_value in &state_dist.values {
            let mut value = (parent.value() * state_value.exp()).max(0.0);
            if let Some(d) = dividend_amount {
                if value - d < EPS {
                    value = 0.0;
                }
            }
            let node = if is_last_time {
                TreeNode::terminal(value)
            } else {
                let children: Vec<usize> = (next_index..next_index + 2).collect();
                TreeNode::interior(value, children, diffusion.probabilities.clone())?
            };
            cur.push(node);
            next_index += 2;
        }
    }
    Ok(cur)
}

fn make_node(
    value: f64,
    start_index: usize,
    arity: usize,
    dist: &DiscreteDistribution,
    is_last_time: bool,
) -> Result<TreeNode> {
    if is_last_time {
        Ok(TreeNode::terminal(value))
    } else {
        let children: Vec<usize> = (start_index..start_index + arity).collect();
        TreeNode::interior(value, children, dist.probabilities.clone())
    }
}

/// Step 6: after the graph is built, subtract `d` from every node's value at and
/// after the first slice whose time is at or past `t_d` (ceiling under `dt`), and
/// clamp to zero.
fn deduct_dividend(slices: &mut [Slice], t_d: f64, d: f64, dt: f64, n_steps: usize) {
    if t_d > n_steps as f64 * dt {
        return;
    }
    let first_slice = ((t_d / dt).ceil() as usize).min(n_steps);
    for slice in &mut slices[first_slice..] {
        for node in slice.iter_mut() {
            node.set_value((node.value() - d).max(0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jump_params() -> TreeBuildParams {
        TreeBuildParams {
            s0: 100.0,
            n_steps: 20,
            time_to_expiry: 0.5,
            sigma: 0.2,
            discount_rate: 0.05,
            cost_of_carry: 0.02,
            implementation: Implementation::Crr,
            upper_sd: 6.0,
            lower_sd: -6.0,
            dividend: None,
            jump: None,
        }
    }

    #[test]
    fn root_slice_has_a_single_node_at_spot() {
        let tree = construct_tree(&no_jump_params()).unwrap();
        assert_eq!(tree.slice(0).len(), 1);
        assert_eq!(tree.slice(0)[0].value(), 100.0);
    }

    #[test]
    fn recombining_slices_grow_by_one_node_per_step_until_truncated() {
        let tree = construct_tree(&no_jump_params()).unwrap();
        // Early slices haven't hit the truncation boundary yet.
        assert_eq!(tree.slice(1).len(), 2);
        assert_eq!(tree.slice(2).len(), 3);
    }

    #[test]
    fn terminal_slice_nodes_have_no_forward_arrays() {
        let tree = construct_tree(&no_jump_params()).unwrap();
        let last = tree.slice(tree.n_steps());
        assert!(last.iter().all(|node| node.is_terminal()));
    }

    #[test]
    fn interior_nodes_conserve_probability() {
        let tree = construct_tree(&no_jump_params()).unwrap();
        for slice in &tree.slices()[..tree.n_steps()] {
            for node in slice {
                let sum: f64 = node.forward_probabilities().iter().sum();
                assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");
            }
        }
    }

    #[test]
    fn single_jump_tree_explodes_in_size_after_the_jump_step() {
        let mut params = no_jump_params();
        params.n_steps = 10;
        params.time_to_expiry = 0.4;
        params.jump = Some(JumpSpec {
            time: 7.0 / 365.0,
            mu: -0.1,
            sigma_j: 0.4,
        });
        let tree = construct_tree(&params).unwrap();
        // The first slice or two are still recombining; after the jump slice the
        // non-recombining count should start multiplying rapidly.
        let sizes: Vec<usize> = (0..=tree.n_steps()).map(|i| tree.slice(i).len()).collect();
        assert!(sizes.windows(2).any(|w| w[1] > 2 * w[0]));
    }

    #[test]
    fn dividend_is_subtracted_and_floored_at_zero() {
        let mut params = no_jump_params();
        params.dividend = Some((0.1, 95.0));
        let tree = construct_tree(&params).unwrap();
        let last = tree.slice(tree.n_steps());
        assert!(last.iter().all(|node| node.value() >= 0.0));
    }

    #[test]
    fn rejects_non_positive_spot() {
        let mut params = no_jump_params();
        params.s0 = 0.0;
        assert!(construct_tree(&params).is_err());
    }
}
