use crate::state::PolicyKind;
use anchor_lang::prelude::*;

#[event]
pub struct OpenOrdersCreated {
    pub market: Pubkey,
    pub authority: Pubkey,
    pub open_orders: Pubkey,
    pub lamports: u64,
}

#[event]
pub struct OpenOrdersClosed {
    pub market: Pubkey,
    pub authority: Pubkey,
    pub open_orders: Pubkey,
    pub reclaimed_lamports: u64,
}

#[event]
pub struct PolicyConfigured {
    pub market: Pubkey,
    pub admin: Pubkey,
    pub kind: PolicyKind,
    pub attester: Pubkey,
}

#[event]
pub struct AllowListUpdated {
    pub market: Pubkey,
    pub added: u16,
    pub removed: u16,
    pub len: u16,
}

#[event]
pub struct AttestationIssued {
    pub market: Pubkey,
    pub owner: Pubkey,
    pub attester: Pubkey,
    pub expires_at: i64,
}

#[event]
pub struct DexInstructionRelayed {
    pub market: Pubkey,
    pub authority: Pubkey,
    pub open_orders: Pubkey,
    pub tag: u32,
}
