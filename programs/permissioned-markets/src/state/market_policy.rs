use crate::policy::{AllowList, AttestationRequired, AuthorizationPolicy, WitnessOnly};
use anchor_lang::prelude::*;

pub const ALLOW_LIST_CAPACITY: usize = 32;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum PolicyKind {
    WitnessOnly,
    AllowList,
    Attestation,
}

/// Authorization policy of one market. Markets without one are witness-only.
#[account]
#[derive(InitSpace)]
pub struct MarketPolicy {
    pub market: Pubkey,
    pub admin: Pubkey,
    pub kind: PolicyKind,
    pub attester: Pubkey,
    #[max_len(32)]
    pub allow_list: Vec<Pubkey>,
    pub bump: u8,
}

impl MarketPolicy {
    pub fn policy(&self) -> Box<dyn AuthorizationPolicy + '_> {
        match self.kind {
            PolicyKind::WitnessOnly => Box::new(WitnessOnly),
            PolicyKind::AllowList => Box::new(AllowList {
                entries: &self.allow_list,
            }),
            PolicyKind::Attestation => Box::new(AttestationRequired {
                attester: self.attester,
            }),
        }
    }

    /// Adds `owner` unless present. Returns false when the list is full.
    pub fn allow(&mut self, owner: Pubkey) -> bool {
        if self.allow_list.contains(&owner) {
            return true;
        }
        if self.allow_list.len() >= ALLOW_LIST_CAPACITY {
            return false;
        }
        self.allow_list.push(owner);
        true
    }

    pub fn disallow(&mut self, owner: &Pubkey) {
        self.allow_list.retain(|entry| entry != owner);
    }
}
