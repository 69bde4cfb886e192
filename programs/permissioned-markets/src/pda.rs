//! Program derived addresses owned by the gateway.
//!
//! Every account the gateway authorizes lives at an address computed from a
//! namespace tag and the market (and, for per-owner accounts, the owner). The
//! address is the uniqueness key: there is no registry mapping
//! (market, owner) to an account.
//!
//! Tags are versioned as a set. The open-orders tags are shared with DEX
//! clients that compute the same addresses and are frozen; a change in scheme
//! introduces new tags rather than editing these.

use crate::errors::ErrorCode;
use anchor_lang::prelude::*;

pub const OPEN_ORDERS_TAG: &[u8] = b"open-orders";
pub const OPEN_ORDERS_INIT_TAG: &[u8] = b"open-orders-init";
pub const MARKET_POLICY_TAG: &[u8] = b"market-policy";
pub const ATTESTATION_TAG: &[u8] = b"attestation";

/// Namespace scheme version of the tags above.
pub const NAMESPACE_VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    /// Per-(market, owner) open orders account.
    OpenOrders,
    /// Per-market authority that co-signs open orders creation.
    OpenOrdersInit,
    /// Per-market authorization policy.
    MarketPolicy,
    /// Per-(market, owner) attestation.
    Attestation,
}

impl Namespace {
    pub const fn tag(self) -> &'static [u8] {
        match self {
            Namespace::OpenOrders => OPEN_ORDERS_TAG,
            Namespace::OpenOrdersInit => OPEN_ORDERS_INIT_TAG,
            Namespace::MarketPolicy => MARKET_POLICY_TAG,
            Namespace::Attestation => ATTESTATION_TAG,
        }
    }
}

/// Finds the address and canonical bump for `[tag, market, owner?]` under this program.
///
/// The bump search starts at 255 and walks down to the first off-curve
/// candidate.
pub fn derive(namespace: Namespace, market: &Pubkey, owner: Option<&Pubkey>) -> Result<(Pubkey, u8)> {
    derive_for_program(namespace, market, owner, &crate::ID)
}

pub fn derive_for_program(
    namespace: Namespace,
    market: &Pubkey,
    owner: Option<&Pubkey>,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8)> {
    let tag = namespace.tag();
    let seeds: Vec<&[u8]> = match owner {
        Some(owner) => vec![tag, market.as_ref(), owner.as_ref()],
        None => vec![tag, market.as_ref()],
    };
    Pubkey::try_find_program_address(&seeds, program_id)
        .ok_or_else(|| error!(ErrorCode::DerivationExhausted))
}

/// Checks that `bump` is the canonical bump for the seeds and that the
/// derived address is `expected`.
///
/// Non-canonical bumps are rejected even when they reproduce `expected`,
/// otherwise one (market, owner) pair could own several accounts.
pub fn verify(
    namespace: Namespace,
    market: &Pubkey,
    owner: Option<&Pubkey>,
    bump: u8,
    expected: &Pubkey,
) -> Result<()> {
    let (address, canonical_bump) = derive(namespace, market, owner)?;
    require!(
        bump == canonical_bump && address == *expected,
        ErrorCode::BumpMismatch
    );
    Ok(())
}

pub fn open_orders_address(market: &Pubkey, authority: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(Namespace::OpenOrders, market, Some(authority))
}

pub fn init_authority_address(market: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(Namespace::OpenOrdersInit, market, None)
}

pub fn market_policy_address(market: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(Namespace::MarketPolicy, market, None)
}

pub fn attestation_address(market: &Pubkey, owner: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(Namespace::Attestation, market, Some(owner))
}

/// Signer seeds of the open orders PDA for (market, authority).
#[macro_export]
macro_rules! open_orders_seeds {
    ( $market:expr, $authority:expr, $bump:expr ) => {
        &[
            $crate::pda::OPEN_ORDERS_TAG,
            $market.as_ref(),
            $authority.as_ref(),
            &[$bump],
        ]
    };
}

/// Signer seeds of the market's open orders init authority.
#[macro_export]
macro_rules! init_authority_seeds {
    ( $market:expr, $bump:expr ) => {
        &[$crate::pda::OPEN_ORDERS_INIT_TAG, $market.as_ref(), &[$bump]]
    };
}
