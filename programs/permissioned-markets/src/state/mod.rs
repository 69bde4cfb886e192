pub mod attestation;
pub mod market_policy;

pub use attestation::*;
pub use market_policy::*;
