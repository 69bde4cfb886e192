//! The DEX instruction interface, as consumed by the gateway.
//!
//! The DEX is a Serum v3 compatible program. Its instructions are encoded as
//! `[version: u8][tag: u32 LE][payload]` and its accounts carry a 5 byte
//! `"serum"` head and a 7 byte `"padding"` tail around the state.

use crate::errors::ErrorCode;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, sysvar};
use bytemuck::{Pod, Zeroable};

declare_id!("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin");

pub use serum_dex::instruction::{
    CancelOrderInstructionV2, MarketInstruction, NewOrderInstructionV3, SelfTradeBehavior,
};
pub use serum_dex::matching::{OrderType, Side};

pub const ACCOUNT_HEAD_PADDING: &[u8; 5] = b"serum";
pub const ACCOUNT_TAIL_PADDING: &[u8; 7] = b"padding";

/// Allocated size of an open orders account, padding included.
pub const OPEN_ORDERS_SPACE: usize = ACCOUNT_HEAD_PADDING.len()
    + std::mem::size_of::<serum_dex::state::OpenOrders>()
    + ACCOUNT_TAIL_PADDING.len();

/// Account indices of a DEX instruction, counted without the proxied program
/// account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayLayout {
    pub market: usize,
    pub open_orders: usize,
    /// Signer slot holding the open orders owner.
    pub authority: usize,
    pub min_accounts: usize,
}

/// Where the relay finds the accounts it cares about, or `None` if the
/// instruction may not be relayed.
pub fn relay_layout(instruction: &MarketInstruction) -> Option<RelayLayout> {
    match instruction {
        MarketInstruction::SettleFunds => Some(RelayLayout {
            market: 0,
            open_orders: 1,
            authority: 2,
            min_accounts: 9,
        }),
        MarketInstruction::NewOrderV3(_) => Some(RelayLayout {
            market: 0,
            open_orders: 1,
            authority: 7,
            min_accounts: 12,
        }),
        MarketInstruction::CancelOrderV2(_) | MarketInstruction::CancelOrderByClientIdV2(_) => {
            Some(RelayLayout {
                market: 0,
                open_orders: 3,
                authority: 4,
                min_accounts: 6,
            })
        }
        MarketInstruction::CloseOpenOrders => Some(RelayLayout {
            market: 3,
            open_orders: 0,
            authority: 1,
            min_accounts: 4,
        }),
        // Creation must go through `init_account` so the policy runs.
        _ => None,
    }
}

/// The instruction tag following the version byte.
pub fn instruction_tag(data: &[u8]) -> Option<u32> {
    let tag = data.get(1..5)?;
    Some(u32::from_le_bytes(tag.try_into().ok()?))
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct MarketHeader {
    account_flags: u64,
    own_address: [u8; 32],
}

/// Reads the `own_address` field a DEX market records about itself.
pub fn market_own_address(data: &[u8]) -> Option<Pubkey> {
    let start = ACCOUNT_HEAD_PADDING.len();
    let bytes = data.get(start..start + std::mem::size_of::<MarketHeader>())?;
    if &data[..start] != ACCOUNT_HEAD_PADDING {
        return None;
    }
    let header: MarketHeader = bytemuck::pod_read_unaligned(bytes);
    Some(Pubkey::new_from_array(header.own_address))
}

/// Requires `market` to be a DEX market that records its own address.
pub fn check_market(market: &AccountInfo) -> Result<()> {
    require_keys_eq!(*market.owner, ID, ErrorCode::InvalidMarket);
    let data = market.try_borrow_data()?;
    let own_address = market_own_address(&data).ok_or(ErrorCode::InvalidMarket)?;
    require_keys_eq!(own_address, *market.key, ErrorCode::InvalidMarket);
    Ok(())
}

pub struct NewOrderAccounts {
    pub market: Pubkey,
    pub open_orders: Pubkey,
    pub request_queue: Pubkey,
    pub event_queue: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
    pub order_payer: Pubkey,
    pub owner: Pubkey,
    pub coin_vault: Pubkey,
    pub pc_vault: Pubkey,
}

pub struct CancelOrderAccounts {
    pub market: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
    pub open_orders: Pubkey,
    pub owner: Pubkey,
    pub event_queue: Pubkey,
}

pub struct SettleFundsAccounts {
    pub market: Pubkey,
    pub open_orders: Pubkey,
    pub owner: Pubkey,
    pub coin_vault: Pubkey,
    pub pc_vault: Pubkey,
    pub coin_wallet: Pubkey,
    pub pc_wallet: Pubkey,
    pub vault_signer: Pubkey,
}

// Instruction builders. `program_id` is the program the instruction is sent
// to: the DEX itself, or the gateway when the instruction is proxied.

pub fn init_open_orders(
    program_id: &Pubkey,
    open_orders: &Pubkey,
    owner: &Pubkey,
    market: &Pubkey,
    market_authority: Option<&Pubkey>,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new(*open_orders, false),
        AccountMeta::new_readonly(*owner, true),
        AccountMeta::new_readonly(*market, false),
        AccountMeta::new_readonly(sysvar::rent::ID, false),
    ];
    if let Some(market_authority) = market_authority {
        accounts.push(AccountMeta::new_readonly(*market_authority, true));
    }
    Instruction {
        program_id: *program_id,
        accounts,
        data: MarketInstruction::InitOpenOrders.pack(),
    }
}

pub fn close_open_orders(
    program_id: &Pubkey,
    open_orders: &Pubkey,
    owner: &Pubkey,
    destination: &Pubkey,
    market: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*open_orders, false),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*market, false),
        ],
        data: MarketInstruction::CloseOpenOrders.pack(),
    }
}

pub fn new_order_v3(
    program_id: &Pubkey,
    accounts: &NewOrderAccounts,
    order: NewOrderInstructionV3,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.market, false),
            AccountMeta::new(accounts.open_orders, false),
            AccountMeta::new(accounts.request_queue, false),
            AccountMeta::new(accounts.event_queue, false),
            AccountMeta::new(accounts.bids, false),
            AccountMeta::new(accounts.asks, false),
            AccountMeta::new(accounts.order_payer, false),
            AccountMeta::new_readonly(accounts.owner, true),
            AccountMeta::new(accounts.coin_vault, false),
            AccountMeta::new(accounts.pc_vault, false),
            AccountMeta::new_readonly(anchor_spl::token::ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data: MarketInstruction::NewOrderV3(order).pack(),
    }
}

fn cancel_metas(accounts: &CancelOrderAccounts) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(accounts.market, false),
        AccountMeta::new(accounts.bids, false),
        AccountMeta::new(accounts.asks, false),
        AccountMeta::new(accounts.open_orders, false),
        AccountMeta::new_readonly(accounts.owner, true),
        AccountMeta::new(accounts.event_queue, false),
    ]
}

pub fn cancel_order_v2(
    program_id: &Pubkey,
    accounts: &CancelOrderAccounts,
    side: Side,
    order_id: u128,
) -> Instruction {
    let order = CancelOrderInstructionV2 { side, order_id };
    Instruction {
        program_id: *program_id,
        accounts: cancel_metas(accounts),
        data: MarketInstruction::CancelOrderV2(order).pack(),
    }
}

pub fn cancel_order_by_client_id_v2(
    program_id: &Pubkey,
    accounts: &CancelOrderAccounts,
    client_order_id: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: cancel_metas(accounts),
        data: MarketInstruction::CancelOrderByClientIdV2(client_order_id).pack(),
    }
}

pub fn settle_funds(program_id: &Pubkey, accounts: &SettleFundsAccounts) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.market, false),
            AccountMeta::new(accounts.open_orders, false),
            AccountMeta::new_readonly(accounts.owner, true),
            AccountMeta::new(accounts.coin_vault, false),
            AccountMeta::new(accounts.pc_vault, false),
            AccountMeta::new(accounts.coin_wallet, false),
            AccountMeta::new(accounts.pc_wallet, false),
            AccountMeta::new_readonly(accounts.vault_signer, false),
            AccountMeta::new_readonly(anchor_spl::token::ID, false),
        ],
        data: MarketInstruction::SettleFunds.pack(),
    }
}
