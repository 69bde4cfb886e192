use super::close_account::{check_closable, owned_open_orders_bump};
use crate::dex::{self, MarketInstruction};
use crate::errors::ErrorCode;
use crate::events::DexInstructionRelayed;
use crate::open_orders_seeds;
use crate::proxy::InvocationContext;
use anchor_lang::prelude::*;

/// Relays a proxied DEX instruction.
///
/// The client signs in the open orders authority slot; the gateway swaps in
/// the open orders PDA, which is the authority the DEX knows, and signs for it.
pub fn relay<'info>(accounts: &[AccountInfo<'info>], data: &[u8]) -> Result<()> {
    let instruction = MarketInstruction::unpack(data).ok_or(ErrorCode::InvalidInstruction)?;
    let layout = dex::relay_layout(&instruction).ok_or(ErrorCode::InvalidInstruction)?;
    let tag = dex::instruction_tag(data).ok_or(ErrorCode::InvalidInstruction)?;

    let ctx = InvocationContext::from_proxied(accounts)?;
    require!(
        ctx.accounts().len() >= layout.min_accounts,
        ErrorCode::NotEnoughAccounts
    );

    let market = *ctx.account(layout.market)?.key;
    let open_orders = ctx.account(layout.open_orders)?.clone();
    let user = ctx.account(layout.authority)?;
    require!(user.is_signer, ErrorCode::NotOwner);
    let authority = *user.key;

    let bump = match instruction {
        MarketInstruction::CloseOpenOrders => check_closable(&open_orders, &market, &authority)?,
        _ => owned_open_orders_bump(open_orders.key, &market, &authority)?,
    };
    let seeds: &[&[u8]] = open_orders_seeds!(market, authority, bump);

    ctx.sign_as(layout.authority, open_orders.clone())?
        .invoke_signed(data, &[seeds])?;

    emit!(DexInstructionRelayed {
        market,
        authority,
        open_orders: *open_orders.key,
        tag,
    });

    msg!(
        "Relayed DEX instruction {}: market={}, open_orders={}",
        tag,
        market,
        open_orders.key
    );

    Ok(())
}
