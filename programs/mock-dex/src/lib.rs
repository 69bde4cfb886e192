//! A stand-in for a Serum v3 DEX, covering the open orders lifecycle only.
//!
//! Accounts use the DEX layouts (`"serum"` head, `"padding"` tail) and
//! instructions use its `[version][u32 tag][payload]` encoding. Orders are
//! recorded in the open orders slots but never matched.

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

pub mod error;
pub mod processor;
pub mod state;

pub use error::DexError;

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    processor::process(program_id, accounts, data)
}
