use anchor_lang::prelude::*;

pub mod dex;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod pda;
pub mod policy;
pub mod proxy;
pub mod state;

pub use errors::ErrorCode;
use instructions::*;

declare_id!("86nihhbSKYa7GVQ4Qk3MUy7bXrYuCwvY5WvUEUXX4Gou");

/// Permissioned markets on a Serum-compatible DEX.
///
/// The market's open orders authority is a PDA of this program, so every open
/// orders account has to be created through `init_account`, where the
/// market's authorization policy decides who may trade. Each open orders
/// account is itself a PDA of (market, owner) and is recorded by the DEX as
/// its own owner; the gateway signs for it when relaying the owner's
/// instructions.
#[program]
pub mod permissioned_markets {
    use super::*;

    pub fn init_account(ctx: Context<InitAccount>, bump: u8, bump_init: u8) -> Result<()> {
        InitAccount::apply(ctx, bump, bump_init)
    }

    pub fn close_account(ctx: Context<CloseAccount>) -> Result<()> {
        CloseAccount::apply(ctx)
    }

    pub fn configure_policy(
        ctx: Context<ConfigurePolicy>,
        params: ConfigurePolicyParams,
    ) -> Result<()> {
        ConfigurePolicy::apply(ctx, params)
    }

    pub fn update_allow_list(
        ctx: Context<UpdateAllowList>,
        params: UpdateAllowListParams,
    ) -> Result<()> {
        UpdateAllowList::apply(ctx, params)
    }

    pub fn attest(ctx: Context<Attest>, params: AttestParams) -> Result<()> {
        Attest::apply(ctx, params)
    }

    pub fn revoke_attestation(ctx: Context<RevokeAttestation>) -> Result<()> {
        RevokeAttestation::apply(ctx)
    }

    /// Fallback for instructions built for the DEX and sent through
    /// `proxy::proxy`.
    pub fn dex_instruction(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> Result<()> {
        require_keys_eq!(*program_id, crate::ID);
        instructions::relay::relay(accounts, data)
    }
}
