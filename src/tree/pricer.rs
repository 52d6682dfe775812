//! Backward-induction pricer (C4).
//!
//! Grounded on `Pricers/TreePricer.cpp`'s `price(discountRate, tree, vanillaOption,
//! useVanillaOptionSmoothing)` overload: two aligned value buffers, the smoothing
//! branch taken only at `i == N-1`, and `VanillaOption::valueAtTreeNode` applied at
//! every step for early exercise.

use crate::error::{PricingError, Result, HORIZON_EPS};
use crate::models::TreeModel;
use crate::option::VanillaOption;
use crate::tree::node::Tree;

/// Prices `option` against a prebuilt `tree`, delegating model-specific behaviour
/// (discount rate, terminal smoothing) to `model`.
pub fn price(
    model: &dyn TreeModel,
    tree: &Tree,
    option: &VanillaOption,
    use_smoothing: bool,
) -> Result<f64> {
    if (tree.time_to_expiry() - option.time_to_expiry()).abs() > HORIZON_EPS {
        return Err(PricingError::HorizonMismatch {
            tree_t: tree.time_to_expiry(),
            option_t: option.time_to_expiry(),
        });
    }

    let n = tree.n_steps();
    let dt = tree.time_to_expiry() / n as f64;
    let mut future: Vec<f64> = Vec::new();

    for i in (0..n).rev() {
        let t_start = dt * i as f64;
        let t_end = dt * (i + 1) as f64;

        let current = if i == n - 1 && use_smoothing && model.supports_smoothing(t_start, t_end) {
            let mut values = Vec::with_capacity(tree.slice(i).len());
            for node in tree.slice(i) {
                let smoothed = model.smoothed_terminal_value(node.value(), option, dt)?;
                values.push(option.value_at_tree_node(smoothed, node.value())?);
            }
            values
        } else {
            if i == n - 1 {
                future = tree
                    .slice(n)
                    .iter()
                    .map(|node| option.intrinsic_value(node.value()))
                    .collect();
            }
            back_propagate(model, tree, option, i, dt, &future)?
        };

        future = current;
    }

    future.first().copied().ok_or_else(|| {
        PricingError::InvalidInput("tree has no nodes at the root slice".to_string())
    })
}

fn back_propagate(
    model: &dyn TreeModel,
    tree: &Tree,
    option: &VanillaOption,
    i: usize,
    dt: f64,
    future: &[f64],
) -> Result<Vec<f64>> {
    let discount = (-model.discount_rate() * dt).exp();
    let mut values = Vec::with_capacity(tree.slice(i).len());
    for node in tree.slice(i) {
        let mut expected = 0.0;
        for (&child, &probability) in node
            .forward_children()
            .iter()
            .zip(node.forward_probabilities())
        {
            expected += probability * future[child];
        }
        expected *= discount;
        values.push(option.value_at_tree_node(expected, node.value())?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes::BlackScholesModel;
    use crate::option::{ExerciseType, OptionRight, UnderlyingCode};
    use crate::tree::states::Implementation;
    use approx::assert_relative_eq;

    fn code() -> UnderlyingCode {
        UnderlyingCode::new("TEST")
    }

    // Scenario S1: analytic BS Euro put ~= 5.63; tree with N=100 + smoothing within 0.3%.
    #[test]
    fn scenario_s1_matches_analytic_within_tolerance() {
        let model =
            BlackScholesModel::new(0.03, 0.06, 0.1, 100.0, code()).unwrap();
        let tree = model
            .construct_tree(100, 0.5, Implementation::Crr, 6.0, -6.0)
            .unwrap();
        let option =
            VanillaOption::new(105.0, 0.5, ExerciseType::European, OptionRight::Put, code())
                .unwrap();
        let value = price(&model, &tree, &option, true).unwrap();
        assert_relative_eq!(value, 5.63, epsilon = 0.02);
    }

    #[test]
    fn horizon_mismatch_is_rejected() {
        let model = BlackScholesModel::new(0.03, 0.06, 0.1, 100.0, code()).unwrap();
        let tree = model
            .construct_tree(10, 0.5, Implementation::Crr, 6.0, -6.0)
            .unwrap();
        let option =
            VanillaOption::new(100.0, 1.0, ExerciseType::European, OptionRight::Call, code())
                .unwrap();
        assert!(matches!(
            price(&model, &tree, &option, false),
            Err(PricingError::HorizonMismatch { .. })
        ));
    }

    // Scenario S2: American put must be worth at least as much as the European one.
    #[test]
    fn american_dominates_european() {
        let model = BlackScholesModel::new(0.03, 0.06, 0.1, 100.0, code()).unwrap();
        let tree = model
            .construct_tree(100, 0.5, Implementation::Crr, 6.0, -6.0)
            .unwrap();
        let euro =
            VanillaOption::new(105.0, 0.5, ExerciseType::European, OptionRight::Put, code())
                .unwrap();
        let american =
            VanillaOption::new(105.0, 0.5, ExerciseType::American, OptionRight::Put, code())
                .unwrap();
        let euro_price = price(&model, &tree, &euro, true).unwrap();
        let american_price = price(&model, &tree, &american, true).unwrap();
        assert!(american_price >= euro_price - 1e-9);
    }
}
