//! Probing of individual targets

pub mod outcome;
pub mod probe;

pub use outcome::Outcome;
pub use probe::{CLIENT_IDENTIFIER, ProbeError, Prober};
