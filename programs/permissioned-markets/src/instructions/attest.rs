use crate::errors::ErrorCode;
use crate::events::AttestationIssued;
use crate::pda::{ATTESTATION_TAG, MARKET_POLICY_TAG};
use crate::state::{Attestation, MarketPolicy};
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(params: AttestParams)]
pub struct Attest<'info> {
    #[account(mut)]
    pub attester: Signer<'info>,

    #[account(
        seeds = [MARKET_POLICY_TAG, market_policy.market.as_ref()],
        bump = market_policy.bump,
        constraint = market_policy.attester == attester.key() @ ErrorCode::NotAttester
    )]
    pub market_policy: Account<'info, MarketPolicy>,

    #[account(
        init_if_needed,
        payer = attester,
        space = 8 + Attestation::INIT_SPACE,
        seeds = [ATTESTATION_TAG, market_policy.market.as_ref(), params.owner.as_ref()],
        bump
    )]
    pub attestation: Account<'info, Attestation>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct AttestParams {
    pub owner: Pubkey,
    /// Unix timestamp, 0 for no expiry.
    pub expires_at: i64,
}

impl Attest<'_> {
    pub fn apply(ctx: Context<Attest>, params: AttestParams) -> Result<()> {
        let market = ctx.accounts.market_policy.market;
        let attestation = &mut ctx.accounts.attestation;
        attestation.market = market;
        attestation.owner = params.owner;
        attestation.attester = ctx.accounts.attester.key();
        attestation.expires_at = params.expires_at;
        attestation.bump = ctx.bumps.attestation;

        emit!(AttestationIssued {
            market,
            owner: params.owner,
            attester: attestation.attester,
            expires_at: params.expires_at,
        });

        msg!("Attested: market={}, owner={}", market, params.owner);

        Ok(())
    }
}
