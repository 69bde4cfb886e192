use solana_program::program_error::ProgramError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum DexError {
    InvalidInstruction = 0x100,
    InvalidMarket,
    InvalidOpenOrders,
    AlreadyInitialized,
    WrongOwner,
    MissingSignature,
    InvalidMarketAuthority,
    OpenOrdersNotEmpty,
    TooManyOpenOrders,
    OrderNotFound,
}

impl From<DexError> for ProgramError {
    fn from(e: DexError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
