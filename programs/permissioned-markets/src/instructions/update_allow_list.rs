use crate::errors::ErrorCode;
use crate::events::AllowListUpdated;
use crate::pda::MARKET_POLICY_TAG;
use crate::state::MarketPolicy;
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct UpdateAllowList<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [MARKET_POLICY_TAG, market_policy.market.as_ref()],
        bump = market_policy.bump,
        has_one = admin @ ErrorCode::NotAdmin
    )]
    pub market_policy: Account<'info, MarketPolicy>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct UpdateAllowListParams {
    pub add: Vec<Pubkey>,
    pub remove: Vec<Pubkey>,
}

impl UpdateAllowList<'_> {
    pub fn apply(ctx: Context<UpdateAllowList>, params: UpdateAllowListParams) -> Result<()> {
        let policy = &mut ctx.accounts.market_policy;

        for owner in &params.remove {
            policy.disallow(owner);
        }
        for owner in &params.add {
            require!(policy.allow(*owner), ErrorCode::AllowListFull);
        }

        emit!(AllowListUpdated {
            market: policy.market,
            added: count(params.add.len())?,
            removed: count(params.remove.len())?,
            len: count(policy.allow_list.len())?,
        });

        msg!(
            "Allow list updated: market={}, len={}",
            policy.market,
            policy.allow_list.len()
        );

        Ok(())
    }
}

fn count(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| error!(ErrorCode::AllowListFull))
}
