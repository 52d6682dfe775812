//! Tree-based American/European vanilla option pricing and differential-evolution
//! calibration over log-normal diffusion models with discrete dividends and normal
//! jumps.
//!
//! The core is laid out in three layers:
//!
//! - [`tree`] — node store, diffusion/jump state calculator, tree builder,
//!   backward-induction pricer, and the Richardson-extrapolation batch pricer
//!   (components C1-C5).
//! - [`models`] — the four model variants (`BlackScholes`, `WithDividend`,
//!   `SingleJump`, `DoubleJump`) behind the [`models::TreeModel`] trait.
//! - [`optimize`] and [`calibration`] — the differential-evolution optimiser
//!   (C6) and the calibration objective adapters that bind it to a batch of
//!   observed market prices (C7).
//!
//! [`analytic`] holds the closed-form Black-Scholes price, used both standalone
//! and as the terminal-smoothing dependency of [`tree::pricer`]. [`stochastic`] is
//! an ambient Monte-Carlo cross-check that nothing in the core depends on.

pub mod analytic;
pub mod calibration;
pub mod error;
pub mod models;
pub mod option;
pub mod optimize;
pub mod stochastic;
pub mod tree;

pub use error::{PricingError, Result};
pub use option::{ExerciseType, ObservedPrice, OptionRight, UnderlyingCode, VanillaOption};
pub use optimize::{Bound, DifferentialEvolution, OptimisationResult};
pub use tree::states::Implementation;
