//! The permissioning decision taken before an open orders account is created.
//!
//! Policies are pure: everything they look at, the clock included, arrives in
//! the [`AuthorizationRequest`]. The controller evaluates the policy before it
//! touches any account, so a denial leaves no trace.

use crate::errors::ErrorCode;
use anchor_lang::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttestationView {
    pub market: Pubkey,
    pub owner: Pubkey,
    pub attester: Pubkey,
    /// Unix timestamp, 0 for attestations that never expire.
    pub expires_at: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub market: Pubkey,
    pub owner: Pubkey,
    /// Init authority presented by the caller.
    pub witness: Pubkey,
    /// Init authority derived for `market`.
    pub expected_witness: Pubkey,
    pub attestation: Option<AttestationView>,
    pub now: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    WitnessMismatch,
    NotAllowListed,
    MissingAttestation,
    AttestationMismatch,
    AttestationExpired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                msg!("Authorization denied: {:?}", reason);
                err!(ErrorCode::Unauthorized)
            }
        }
    }
}

pub trait AuthorizationPolicy {
    fn authorize(&self, request: &AuthorizationRequest) -> Decision;
}

/// Only requires that the request went through the sanctioned creation path.
pub struct WitnessOnly;

impl AuthorizationPolicy for WitnessOnly {
    fn authorize(&self, request: &AuthorizationRequest) -> Decision {
        if request.witness == request.expected_witness {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::WitnessMismatch)
        }
    }
}

pub struct AllowList<'a> {
    pub entries: &'a [Pubkey],
}

impl AuthorizationPolicy for AllowList<'_> {
    fn authorize(&self, request: &AuthorizationRequest) -> Decision {
        match WitnessOnly.authorize(request) {
            Decision::Allow if self.entries.contains(&request.owner) => Decision::Allow,
            Decision::Allow => Decision::Deny(DenyReason::NotAllowListed),
            deny => deny,
        }
    }
}

/// Requires a live attestation for (market, owner) issued by `attester`.
pub struct AttestationRequired {
    pub attester: Pubkey,
}

impl AuthorizationPolicy for AttestationRequired {
    fn authorize(&self, request: &AuthorizationRequest) -> Decision {
        if let deny @ Decision::Deny(_) = WitnessOnly.authorize(request) {
            return deny;
        }
        let Some(attestation) = request.attestation else {
            return Decision::Deny(DenyReason::MissingAttestation);
        };
        if attestation.market != request.market
            || attestation.owner != request.owner
            || attestation.attester != self.attester
        {
            return Decision::Deny(DenyReason::AttestationMismatch);
        }
        if attestation.expires_at != 0 && attestation.expires_at <= request.now {
            return Decision::Deny(DenyReason::AttestationExpired);
        }
        Decision::Allow
    }
}
