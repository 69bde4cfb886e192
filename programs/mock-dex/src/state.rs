use crate::error::DexError;
use bytemuck::{Pod, Zeroable};
use solana_program::pubkey::Pubkey;

pub const ACCOUNT_HEAD_PADDING: &[u8; 5] = b"serum";
pub const ACCOUNT_TAIL_PADDING: &[u8; 7] = b"padding";

pub const FLAG_INITIALIZED: u64 = 1 << 0;
pub const FLAG_MARKET: u64 = 1 << 1;
pub const FLAG_OPEN_ORDERS: u64 = 1 << 2;

pub const MAX_ORDERS: usize = 128;

/// Market header. The real market state continues after `own_address`; the
/// test double keeps only what the open orders lifecycle needs.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct MarketState {
    pub account_flags: u64,
    pub own_address: [u8; 32],
    pub open_orders_authority: [u8; 32],
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct OpenOrders {
    pub account_flags: u64,
    pub market: [u8; 32],
    pub owner: [u8; 32],
    pub native_coin_free: u64,
    pub native_coin_total: u64,
    pub native_pc_free: u64,
    pub native_pc_total: u64,
    pub free_slot_bits: [u8; 16],
    pub is_bid_bits: [u8; 16],
    pub orders: [[u8; 16]; MAX_ORDERS],
    pub client_order_ids: [u64; MAX_ORDERS],
    pub referrer_rebates_accrued: u64,
}

pub const OPEN_ORDERS_SPACE: usize =
    ACCOUNT_HEAD_PADDING.len() + std::mem::size_of::<OpenOrders>() + ACCOUNT_TAIL_PADDING.len();

/// Reads a `T` out of `[head padding][T][tail padding]`.
fn load_padded<T: Pod>(data: &[u8]) -> Option<T> {
    let head = ACCOUNT_HEAD_PADDING.len();
    let end = head + std::mem::size_of::<T>();
    if data.len() != end + ACCOUNT_TAIL_PADDING.len() || &data[..head] != ACCOUNT_HEAD_PADDING {
        return None;
    }
    Some(bytemuck::pod_read_unaligned(&data[head..end]))
}

fn store_padded<T: Pod>(data: &mut [u8], value: &T) {
    let head = ACCOUNT_HEAD_PADDING.len();
    let end = head + std::mem::size_of::<T>();
    data[..head].copy_from_slice(ACCOUNT_HEAD_PADDING);
    data[head..end].copy_from_slice(bytemuck::bytes_of(value));
    data[end..].copy_from_slice(ACCOUNT_TAIL_PADDING);
}

impl MarketState {
    pub fn load(data: &[u8]) -> Result<Self, DexError> {
        load_padded::<Self>(data)
            .filter(|market| market.account_flags & FLAG_MARKET != 0)
            .ok_or(DexError::InvalidMarket)
    }

    pub fn own_address(&self) -> Pubkey {
        Pubkey::new_from_array(self.own_address)
    }

    pub fn open_orders_authority(&self) -> Option<Pubkey> {
        let authority = Pubkey::new_from_array(self.open_orders_authority);
        (authority != Pubkey::default()).then_some(authority)
    }
}

/// Account data of a market at `own_address`, optionally permissioned by
/// `open_orders_authority`.
pub fn market_account_data(own_address: &Pubkey, open_orders_authority: Option<&Pubkey>) -> Vec<u8> {
    let state = MarketState {
        account_flags: FLAG_INITIALIZED | FLAG_MARKET,
        own_address: own_address.to_bytes(),
        open_orders_authority: open_orders_authority.map(|key| key.to_bytes()).unwrap_or_default(),
    };
    let mut data = vec![0; ACCOUNT_HEAD_PADDING.len() + std::mem::size_of::<MarketState>() + ACCOUNT_TAIL_PADDING.len()];
    store_padded(&mut data, &state);
    data
}

impl OpenOrders {
    pub fn new(market: &Pubkey, owner: &Pubkey) -> Self {
        Self {
            account_flags: FLAG_INITIALIZED | FLAG_OPEN_ORDERS,
            market: market.to_bytes(),
            owner: owner.to_bytes(),
            free_slot_bits: u128::MAX.to_le_bytes(),
            ..Zeroable::zeroed()
        }
    }

    pub fn load(data: &[u8]) -> Result<Self, DexError> {
        load_padded::<Self>(data)
            .filter(|open_orders| open_orders.account_flags & FLAG_OPEN_ORDERS != 0)
            .ok_or(DexError::InvalidOpenOrders)
    }

    pub fn store(&self, data: &mut [u8]) {
        store_padded(data, self);
    }

    pub fn owner(&self) -> Pubkey {
        Pubkey::new_from_array(self.owner)
    }

    pub fn market(&self) -> Pubkey {
        Pubkey::new_from_array(self.market)
    }

    fn free_slots(&self) -> u128 {
        u128::from_le_bytes(self.free_slot_bits)
    }

    pub fn has_open_orders(&self) -> bool {
        self.free_slots() != u128::MAX
    }

    pub fn is_empty(&self) -> bool {
        !self.has_open_orders() && self.native_coin_total == 0 && self.native_pc_total == 0
    }

    pub fn order_id(&self, slot: usize) -> u128 {
        u128::from_le_bytes(self.orders[slot])
    }

    /// Takes the lowest free slot. Order ids are `price << 64 | slot`.
    pub fn add_order(&mut self, is_bid: bool, price: u64, client_order_id: u64) -> Result<u128, DexError> {
        let free = self.free_slots();
        if free == 0 {
            return Err(DexError::TooManyOpenOrders);
        }
        let slot = free.trailing_zeros() as usize;
        let order_id = (u128::from(price) << 64) | slot as u128;

        self.free_slot_bits = (free & !(1u128 << slot)).to_le_bytes();
        let mut is_bid_bits = u128::from_le_bytes(self.is_bid_bits);
        if is_bid {
            is_bid_bits |= 1u128 << slot;
        } else {
            is_bid_bits &= !(1u128 << slot);
        }
        self.is_bid_bits = is_bid_bits.to_le_bytes();
        self.orders[slot] = order_id.to_le_bytes();
        self.client_order_ids[slot] = client_order_id;
        Ok(order_id)
    }

    pub fn find_order(&self, order_id: u128) -> Option<usize> {
        let free = self.free_slots();
        (0..MAX_ORDERS).find(|&slot| free & (1u128 << slot) == 0 && self.order_id(slot) == order_id)
    }

    pub fn find_client_order(&self, client_order_id: u64) -> Option<usize> {
        let free = self.free_slots();
        (0..MAX_ORDERS).find(|&slot| {
            free & (1u128 << slot) == 0 && self.client_order_ids[slot] == client_order_id
        })
    }

    pub fn remove_order(&mut self, slot: usize) {
        self.free_slot_bits = (self.free_slots() | (1u128 << slot)).to_le_bytes();
        self.orders[slot] = [0; 16];
        self.client_order_ids[slot] = 0;
    }
}
