pub mod attest;
pub mod close_account;
pub mod configure_policy;
pub mod init_account;
pub mod relay;
pub mod revoke_attestation;
pub mod update_allow_list;

pub use attest::*;
pub use close_account::*;
pub use configure_policy::*;
pub use init_account::*;
pub use revoke_attestation::*;
pub use update_allow_list::*;
