use crate::dex;
use crate::errors::ErrorCode;
use crate::events::PolicyConfigured;
use crate::pda::MARKET_POLICY_TAG;
use crate::state::{MarketPolicy, PolicyKind};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::bpf_loader_upgradeable;

#[derive(Accounts)]
pub struct ConfigurePolicy<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    /// CHECK: Owner and self-reported address checked in `apply`
    pub market: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = admin,
        space = 8 + MarketPolicy::INIT_SPACE,
        seeds = [MARKET_POLICY_TAG, market.key().as_ref()],
        bump
    )]
    pub market_policy: Account<'info, MarketPolicy>,

    /// The gateway's own program data; its upgrade authority makes the
    /// first claim on a market.
    #[account(
        seeds = [crate::ID.as_ref()],
        bump,
        seeds::program = bpf_loader_upgradeable::ID
    )]
    pub program_data: Account<'info, ProgramData>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct ConfigurePolicyParams {
    pub kind: PolicyKind,
    pub attester: Pubkey,
}

impl ConfigurePolicy<'_> {
    pub fn apply(ctx: Context<ConfigurePolicy>, params: ConfigurePolicyParams) -> Result<()> {
        dex::check_market(&ctx.accounts.market)?;

        let admin = ctx.accounts.admin.key();
        let policy = &mut ctx.accounts.market_policy;
        if policy.admin == Pubkey::default() {
            require!(
                ctx.accounts.program_data.upgrade_authority_address == Some(admin),
                ErrorCode::NotAdmin
            );
            policy.market = ctx.accounts.market.key();
            policy.admin = admin;
            policy.allow_list = Vec::new();
            policy.bump = ctx.bumps.market_policy;
        }
        require_keys_eq!(policy.admin, admin, ErrorCode::NotAdmin);

        policy.kind = params.kind;
        policy.attester = params.attester;

        emit!(PolicyConfigured {
            market: policy.market,
            admin,
            kind: policy.kind,
            attester: policy.attester,
        });

        msg!(
            "Policy configured: market={}, kind={:?}",
            policy.market,
            policy.kind
        );

        Ok(())
    }
}
