use crate::dex;
use crate::errors::ErrorCode;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, program::invoke_signed};

/// Prepares a DEX instruction for submission through the gateway.
///
/// The gateway, not the client, is the immediate caller of the DEX, and a CPI
/// needs the callee's program account. The callee is prepended as a read-only,
/// non-signer account; everything else is left untouched. Apply exactly once
/// per hop.
pub fn proxy(mut instruction: Instruction, callee: &Pubkey) -> Instruction {
    instruction
        .accounts
        .insert(0, AccountMeta::new_readonly(*callee, false));
    instruction
}

/// Accounts available for one more hop of invocation into the DEX.
pub struct InvocationContext<'a, 'info> {
    program: &'a AccountInfo<'info>,
    accounts: Vec<AccountInfo<'info>>,
    signer_slots: Vec<usize>,
}

impl<'a, 'info> InvocationContext<'a, 'info> {
    pub fn new(program: &'a AccountInfo<'info>, accounts: Vec<AccountInfo<'info>>) -> Result<Self> {
        require_keys_eq!(*program.key, dex::ID, ErrorCode::InvalidDexPid);
        Ok(Self {
            program,
            accounts,
            signer_slots: Vec::new(),
        })
    }

    /// Splits the leading program account off an account list built by [`proxy`].
    pub fn from_proxied(accounts: &'a [AccountInfo<'info>]) -> Result<Self> {
        let (program, accounts) = accounts
            .split_first()
            .ok_or(ErrorCode::NotEnoughAccounts)?;
        Self::new(program, accounts.to_vec())
    }

    pub fn program(&self) -> &AccountInfo<'info> {
        self.program
    }

    pub fn accounts(&self) -> &[AccountInfo<'info>] {
        &self.accounts
    }

    pub fn account(&self, slot: usize) -> Result<&AccountInfo<'info>> {
        self.accounts
            .get(slot)
            .ok_or_else(|| error!(ErrorCode::NotEnoughAccounts))
    }

    /// Marks `slot` as signed by the gateway through `invoke_signed`.
    pub fn sign(mut self, slot: usize) -> Result<Self> {
        require!(slot < self.accounts.len(), ErrorCode::NotEnoughAccounts);
        self.signer_slots.push(slot);
        Ok(self)
    }

    /// Replaces the account in `slot` with `signer` and marks it signed.
    pub fn sign_as(mut self, slot: usize, signer: AccountInfo<'info>) -> Result<Self> {
        let account = self
            .accounts
            .get_mut(slot)
            .ok_or(ErrorCode::NotEnoughAccounts)?;
        *account = signer;
        self.sign(slot)
    }

    pub fn instruction(&self, data: &[u8]) -> Instruction {
        let accounts = self
            .accounts
            .iter()
            .enumerate()
            .map(|(slot, account)| AccountMeta {
                pubkey: *account.key,
                is_signer: account.is_signer || self.signer_slots.contains(&slot),
                is_writable: account.is_writable,
            })
            .collect();
        Instruction {
            program_id: *self.program.key,
            accounts,
            data: data.to_vec(),
        }
    }

    pub fn invoke_signed(self, data: &[u8], signer_seeds: &[&[&[u8]]]) -> Result<()> {
        let instruction = self.instruction(data);
        let mut account_infos = Vec::with_capacity(self.accounts.len() + 1);
        account_infos.push(self.program.clone());
        account_infos.extend(self.accounts);
        invoke_signed(&instruction, &account_infos, signer_seeds)?;
        Ok(())
    }
}
