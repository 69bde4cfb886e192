use crate::dex::{self, MarketInstruction};
use crate::errors::ErrorCode;
use crate::events::OpenOrdersClosed;
use crate::open_orders_seeds;
use crate::pda;
use crate::proxy::InvocationContext;
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct CloseAccount<'info> {
    /// CHECK: Existence, owner and derivation checked in `apply`
    #[account(mut)]
    pub open_orders: UncheckedAccount<'info>,

    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: Bound to the open orders account through its derivation
    pub market: UncheckedAccount<'info>,

    /// CHECK: Address constraint
    #[account(address = dex::ID @ ErrorCode::InvalidDexPid)]
    pub dex_program: UncheckedAccount<'info>,
}

impl CloseAccount<'_> {
    pub fn apply(ctx: Context<CloseAccount>) -> Result<()> {
        let market = ctx.accounts.market.key();
        let authority = ctx.accounts.authority.to_account_info();
        let open_orders = ctx.accounts.open_orders.to_account_info();

        let bump = check_closable(&open_orders, &market, authority.key)?;
        let seeds: &[&[u8]] = open_orders_seeds!(market, authority.key, bump);

        let balance_before = authority.lamports();
        let dex_program = ctx.accounts.dex_program.to_account_info();
        InvocationContext::new(
            &dex_program,
            vec![
                open_orders.clone(),
                open_orders.clone(),
                authority.clone(),
                ctx.accounts.market.to_account_info(),
            ],
        )?
        .sign(1)?
        .invoke_signed(&MarketInstruction::CloseOpenOrders.pack(), &[seeds])?;

        let reclaimed_lamports = authority.lamports().saturating_sub(balance_before);

        emit!(OpenOrdersClosed {
            market,
            authority: *authority.key,
            open_orders: *open_orders.key,
            reclaimed_lamports,
        });

        msg!(
            "Open orders closed: open_orders={}, reclaimed={}",
            open_orders.key,
            reclaimed_lamports
        );

        Ok(())
    }
}

/// Checks that `open_orders` is a live DEX account belonging to
/// (market, authority) and returns its bump.
pub(crate) fn check_closable(
    open_orders: &AccountInfo,
    market: &Pubkey,
    authority: &Pubkey,
) -> Result<u8> {
    require!(open_orders.lamports() > 0, ErrorCode::NotFound);
    require_keys_eq!(*open_orders.owner, dex::ID, ErrorCode::NotOwner);
    owned_open_orders_bump(open_orders.key, market, authority)
}

/// Returns the bump of `open_orders` if it is the PDA of (market, authority).
pub(crate) fn owned_open_orders_bump(
    open_orders: &Pubkey,
    market: &Pubkey,
    authority: &Pubkey,
) -> Result<u8> {
    let (address, bump) = pda::open_orders_address(market, authority)?;
    require_keys_eq!(address, *open_orders, ErrorCode::NotOwner);
    Ok(bump)
}
