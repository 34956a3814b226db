//! # MixOpt Service
//!
//! REST surface over the saturation curve fitter and the genetic budget
//! optimizer.
//!
//! ## Flow
//!
//! 1. `POST /api/v1/curves/fit` fits Hill curves from spend/revenue history
//!    and keeps them in the curve store
//! 2. `POST /api/v1/optimize` allocates a budget across stored (or inline)
//!    curves under per-channel constraints and weighted scenarios
//! 3. `GET /api/v1/runs/:run_id` returns a recent optimization result

pub mod api;
pub mod config;
pub mod error;
pub mod infra;
pub mod service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use service::MixOptService;

/// Service version
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default cap on fitted curves kept in memory
pub const MAX_STORED_CURVES: usize = 1_000;

/// Default number of optimization results kept for lookup
pub const MAX_STORED_RUNS: usize = 256;

/// Default cap on a request's population size
pub const MAX_POPULATION_SIZE: usize = 1_000;

/// Default cap on a request's generation count
pub const MAX_GENERATIONS: usize = 5_000;
