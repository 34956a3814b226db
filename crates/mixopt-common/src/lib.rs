//! # MixOpt Common
//!
//! Shared types, errors, and saturation curve math for the MixOpt budget optimizer.
//!
//! ## Core Types
//!
//! - [`HillCurve`]: diminishing-returns response curve `α·s^γ / (β^γ + s^γ)`
//! - [`ChannelHistory`]/[`SpendObservation`]: historical spend and revenue per channel
//! - [`FittedCurve`]: a fitted curve with its diagnostics
//! - [`ChannelConstraint`]: per-channel min/max spend bounds
//! - [`Scenario`]: weighted response outlook used by the fitness function
//! - [`AllocationReport`]: projected outcome of a budget split

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{CurveError, FitError, MixError, OptimizeError, Result};
pub use types::{
    allocation::{to_currency, AllocationReport, ChannelAllocation, ReportEntry},
    constraint::ChannelConstraint,
    curve::{FitDiagnostics, FittedCurve, HillCurve},
    observation::{ChannelHistory, SpendObservation},
    scenario::Scenario,
};

/// MixOpt version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum number of observations required to fit a curve
pub const MIN_OBSERVATIONS: usize = 3;

/// Default genetic population size
pub const DEFAULT_POPULATION_SIZE: usize = 100;

/// Default number of generations
pub const DEFAULT_GENERATIONS: usize = 200;

/// Default weight of the diversification bonus in fitness
pub const DEFAULT_DIVERSIFICATION_WEIGHT: f64 = 0.1;

/// Decimal places used when reporting currency amounts
pub const CURRENCY_SCALE: u32 = 2;
