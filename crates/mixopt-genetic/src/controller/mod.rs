//! PID controller module
pub mod mutation;

pub use self::mutation::MutationController;
