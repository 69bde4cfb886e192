use crate::errors::ErrorCode;
use crate::pda::ATTESTATION_TAG;
use crate::state::Attestation;
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct RevokeAttestation<'info> {
    #[account(mut)]
    pub attester: Signer<'info>,

    #[account(
        mut,
        close = attester,
        seeds = [ATTESTATION_TAG, attestation.market.as_ref(), attestation.owner.as_ref()],
        bump = attestation.bump,
        has_one = attester @ ErrorCode::NotAttester
    )]
    pub attestation: Account<'info, Attestation>,
}

impl RevokeAttestation<'_> {
    pub fn apply(ctx: Context<RevokeAttestation>) -> Result<()> {
        msg!(
            "Attestation revoked: market={}, owner={}",
            ctx.accounts.attestation.market,
            ctx.accounts.attestation.owner
        );

        Ok(())
    }
}
