//! In-memory storage for fitted curves and optimization runs

pub mod curve_store;
pub mod run_store;

pub use curve_store::{CurveStore, InMemoryCurveStore};
pub use run_store::RunStore;

/// Errors from store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Curve not found: {0}")]
    NotFound(String),

    #[error("Curve store is full: max {0} channels")]
    CapacityExceeded(usize),
}
