//! Core domain types for MixOpt
pub mod allocation;
pub mod constraint;
pub mod curve;
pub mod observation;
pub mod scenario;
