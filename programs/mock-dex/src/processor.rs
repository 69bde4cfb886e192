use crate::error::DexError;
use crate::state::{MarketState, OpenOrders, OPEN_ORDERS_SPACE};
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

const SETTLE_FUNDS: u32 = 5;
const NEW_ORDER_V3: u32 = 10;
const CANCEL_ORDER_V2: u32 = 11;
const CANCEL_ORDER_BY_CLIENT_ID_V2: u32 = 12;
const CLOSE_OPEN_ORDERS: u32 = 14;
const INIT_OPEN_ORDERS: u32 = 15;

pub fn process(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let (tag, payload) = match data {
        [0, a, b, c, d, payload @ ..] => (u32::from_le_bytes([*a, *b, *c, *d]), payload),
        _ => return Err(DexError::InvalidInstruction.into()),
    };

    match tag {
        INIT_OPEN_ORDERS => init_open_orders(program_id, accounts),
        CLOSE_OPEN_ORDERS => close_open_orders(program_id, accounts),
        NEW_ORDER_V3 => new_order(program_id, accounts, payload),
        CANCEL_ORDER_V2 => cancel_order(program_id, accounts, payload),
        CANCEL_ORDER_BY_CLIENT_ID_V2 => cancel_order_by_client_id(program_id, accounts, payload),
        SETTLE_FUNDS => settle_funds(program_id, accounts),
        _ => Err(DexError::InvalidInstruction.into()),
    }
}

fn account<'a, 'info>(
    accounts: &'a [AccountInfo<'info>],
    index: usize,
) -> Result<&'a AccountInfo<'info>, ProgramError> {
    accounts.get(index).ok_or(ProgramError::NotEnoughAccountKeys)
}

fn load_market(program_id: &Pubkey, market: &AccountInfo) -> Result<MarketState, ProgramError> {
    if market.owner != program_id {
        return Err(DexError::InvalidMarket.into());
    }
    let state = MarketState::load(&market.try_borrow_data()?)?;
    if state.own_address() != *market.key {
        return Err(DexError::InvalidMarket.into());
    }
    Ok(state)
}

/// Loads open orders that belong to `market` and whose owner signed.
fn load_owned_open_orders(
    program_id: &Pubkey,
    open_orders: &AccountInfo,
    owner: &AccountInfo,
    market: &Pubkey,
) -> Result<OpenOrders, ProgramError> {
    if open_orders.owner != program_id {
        return Err(DexError::InvalidOpenOrders.into());
    }
    let state = OpenOrders::load(&open_orders.try_borrow_data()?)?;
    if state.market() != *market {
        return Err(DexError::InvalidOpenOrders.into());
    }
    if state.owner() != *owner.key {
        return Err(DexError::WrongOwner.into());
    }
    if !owner.is_signer {
        return Err(DexError::MissingSignature.into());
    }
    Ok(state)
}

fn init_open_orders(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let open_orders = account(accounts, 0)?;
    let owner = account(accounts, 1)?;
    let market = account(accounts, 2)?;

    let market_state = load_market(program_id, market)?;
    if let Some(expected) = market_state.open_orders_authority() {
        let authority = account(accounts, 4).map_err(|_| DexError::InvalidMarketAuthority)?;
        if *authority.key != expected || !authority.is_signer {
            return Err(DexError::InvalidMarketAuthority.into());
        }
    }
    if !owner.is_signer {
        return Err(DexError::MissingSignature.into());
    }
    if open_orders.owner != program_id || open_orders.data_len() != OPEN_ORDERS_SPACE {
        return Err(DexError::InvalidOpenOrders.into());
    }

    let mut data = open_orders.try_borrow_mut_data()?;
    if data.iter().any(|byte| *byte != 0) {
        return Err(DexError::AlreadyInitialized.into());
    }
    OpenOrders::new(market.key, owner.key).store(&mut data);

    msg!("Open orders initialized: {}", open_orders.key);
    Ok(())
}

fn close_open_orders(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let open_orders = account(accounts, 0)?;
    let owner = account(accounts, 1)?;
    let destination = account(accounts, 2)?;
    let market = account(accounts, 3)?;

    load_market(program_id, market)?;
    let state = load_owned_open_orders(program_id, open_orders, owner, market.key)?;
    if !state.is_empty() {
        return Err(DexError::OpenOrdersNotEmpty.into());
    }

    let reclaimed = destination
        .lamports()
        .checked_add(open_orders.lamports())
        .ok_or(ProgramError::ArithmeticOverflow)?;
    **destination.try_borrow_mut_lamports()? = reclaimed;
    **open_orders.try_borrow_mut_lamports()? = 0;
    open_orders.try_borrow_mut_data()?.fill(0);

    msg!("Open orders closed: {}", open_orders.key);
    Ok(())
}

fn read_u32(payload: &[u8], offset: usize) -> Result<u32, ProgramError> {
    payload
        .get(offset..offset + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| DexError::InvalidInstruction.into())
}

fn read_u64(payload: &[u8], offset: usize) -> Result<u64, ProgramError> {
    payload
        .get(offset..offset + 8)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or_else(|| DexError::InvalidInstruction.into())
}

fn new_order(program_id: &Pubkey, accounts: &[AccountInfo], payload: &[u8]) -> ProgramResult {
    let market = account(accounts, 0)?;
    let open_orders = account(accounts, 1)?;
    let owner = account(accounts, 7)?;

    let side = read_u32(payload, 0)?;
    let limit_price = read_u64(payload, 4)?;
    let client_order_id = read_u64(payload, 36)?;

    load_market(program_id, market)?;
    let mut state = load_owned_open_orders(program_id, open_orders, owner, market.key)?;
    let order_id = state.add_order(side == 0, limit_price, client_order_id)?;
    state.store(&mut open_orders.try_borrow_mut_data()?);

    msg!("Order placed: id={}, client_id={}", order_id, client_order_id);
    Ok(())
}

fn cancel_order(program_id: &Pubkey, accounts: &[AccountInfo], payload: &[u8]) -> ProgramResult {
    let order_id = payload
        .get(4..20)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u128::from_le_bytes)
        .ok_or(DexError::InvalidInstruction)?;
    cancel(program_id, accounts, |state| state.find_order(order_id))
}

fn cancel_order_by_client_id(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    payload: &[u8],
) -> ProgramResult {
    let client_order_id = read_u64(payload, 0)?;
    cancel(program_id, accounts, |state| state.find_client_order(client_order_id))
}

fn cancel(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    find: impl FnOnce(&OpenOrders) -> Option<usize>,
) -> ProgramResult {
    let market = account(accounts, 0)?;
    let open_orders = account(accounts, 3)?;
    let owner = account(accounts, 4)?;

    load_market(program_id, market)?;
    let mut state = load_owned_open_orders(program_id, open_orders, owner, market.key)?;
    let slot = find(&state).ok_or(DexError::OrderNotFound)?;
    state.remove_order(slot);
    state.store(&mut open_orders.try_borrow_mut_data()?);

    msg!("Order cancelled: slot={}", slot);
    Ok(())
}

fn settle_funds(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let market = account(accounts, 0)?;
    let open_orders = account(accounts, 1)?;
    let owner = account(accounts, 2)?;

    load_market(program_id, market)?;
    let mut state = load_owned_open_orders(program_id, open_orders, owner, market.key)?;
    state.native_coin_total -= state.native_coin_free;
    state.native_pc_total -= state.native_pc_free;
    state.native_coin_free = 0;
    state.native_pc_free = 0;
    state.store(&mut open_orders.try_borrow_mut_data()?);

    msg!("Funds settled: {}", open_orders.key);
    Ok(())
}
