//! Model variants and the trait that lets the pricer treat them uniformly.
//!
//! Grounded on `Models/ITreeModel.h` (the virtual interface the original dispatches
//! through) and, for the default-method-over-accessor shape, an `OptionCalculations`-style
//! accessor trait. The four model variants are kept as separate structs behind one
//! trait object (`&dyn TreeModel`) rather than wrapped in an enum, since every
//! consumer (pricer, Richardson wrapper, calibration adapter) only ever needs the
//! trait's five operations, never a match on which variant it holds.

pub mod black_scholes;
pub mod double_jump;
pub mod single_jump;
pub mod with_dividend;

use crate::error::Result;
use crate::option::{UnderlyingCode, VanillaOption};
use crate::tree::{Implementation, Tree};

/// The contract shared by every pricing model.
pub trait TreeModel {
    fn underlying_code(&self) -> &UnderlyingCode;
    fn discount_rate(&self) -> f64;

    fn construct_tree(
        &self,
        n_steps: usize,
        time_to_expiry: f64,
        implementation: Implementation,
        upper_sd: f64,
        lower_sd: f64,
    ) -> Result<Tree>;

    /// The Black-Scholes European value of `option` over a single remaining step of
    /// size `dt`, evaluated at spot `s`. Used only when `supports_smoothing` allows it.
    fn smoothed_terminal_value(&self, s: f64, option: &VanillaOption, dt: f64) -> Result<f64>;

    /// True unless an event (dividend or jump) strictly inside `(t_start, t_end]`
    /// would require redefining the strike or payoff.
    fn supports_smoothing(&self, t_start: f64, t_end: f64) -> bool;
}

pub use black_scholes::BlackScholesModel;
pub use double_jump::DoubleJumpModel;
pub use single_jump::SingleJumpModel;
pub use with_dividend::WithDividendModel;
