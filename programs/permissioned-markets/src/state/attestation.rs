use crate::policy::AttestationView;
use anchor_lang::prelude::*;

/// Off-chain check (KYC or similar) recorded by a market's attester.
#[account]
#[derive(InitSpace)]
pub struct Attestation {
    pub market: Pubkey,
    pub owner: Pubkey,
    pub attester: Pubkey,
    pub expires_at: i64,
    pub bump: u8,
}

impl Attestation {
    pub fn view(&self) -> AttestationView {
        AttestationView {
            market: self.market,
            owner: self.owner,
            attester: self.attester,
            expires_at: self.expires_at,
        }
    }
}
