use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("No valid bump exists for the derivation seeds")]
    DerivationExhausted,
    #[msg("Bump does not reproduce the expected address")]
    BumpMismatch,
    #[msg("Open orders account already exists")]
    AlreadyExists,
    #[msg("Open orders account does not exist")]
    NotFound,
    #[msg("Denied by the market's authorization policy")]
    Unauthorized,
    #[msg("Authority cannot cover the rent-exempt minimum")]
    InsufficientFunds,
    #[msg("Authority does not own the open orders account")]
    NotOwner,
    #[msg("Program ID does not match the DEX")]
    InvalidDexPid,
    #[msg("Market is not a valid DEX market")]
    InvalidMarket,
    #[msg("Invalid instruction given")]
    InvalidInstruction,
    #[msg("Not enough accounts for the DEX instruction")]
    NotEnoughAccounts,
    #[msg("Signer is not the policy admin")]
    NotAdmin,
    #[msg("Signer is not the policy attester")]
    NotAttester,
    #[msg("Allow list is full")]
    AllowListFull,
}

#[cfg(test)]
pub(crate) fn assert_error<T: std::fmt::Debug>(result: Result<T>, expected: ErrorCode) {
    let err = result.expect_err("expected an error");
    assert_eq!(ProgramError::from(err), ProgramError::from(Error::from(expected)));
}
