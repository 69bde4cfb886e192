use crate::dex::{self, MarketInstruction, OPEN_ORDERS_SPACE};
use crate::errors::ErrorCode;
use crate::events::OpenOrdersCreated;
use crate::pda::{self, Namespace, MARKET_POLICY_TAG};
use crate::policy::{AuthorizationPolicy, AuthorizationRequest, WitnessOnly};
use crate::proxy::InvocationContext;
use crate::state::{Attestation, MarketPolicy};
use crate::{init_authority_seeds, open_orders_seeds};
use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

#[derive(Accounts)]
pub struct InitAccount<'info> {
    /// CHECK: Verified against the market's init authority PDA in `apply`
    pub open_orders_init_authority: UncheckedAccount<'info>,

    /// CHECK: Verified against the (market, authority) PDA, then created here and handed to the DEX
    #[account(mut)]
    pub open_orders: UncheckedAccount<'info>,

    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: Owner and self-reported address checked in `apply`
    pub market: UncheckedAccount<'info>,

    /// CHECK: May be uninitialized, in which case the market is witness-only
    #[account(
        seeds = [MARKET_POLICY_TAG, market.key().as_ref()],
        bump
    )]
    pub market_policy: UncheckedAccount<'info>,

    pub attestation: Option<Account<'info, Attestation>>,

    pub rent: Sysvar<'info, Rent>,
    pub system_program: Program<'info, System>,

    /// CHECK: Address constraint
    #[account(address = dex::ID @ ErrorCode::InvalidDexPid)]
    pub dex_program: UncheckedAccount<'info>,
}

impl<'info> InitAccount<'info> {
    pub fn apply(ctx: Context<InitAccount>, bump: u8, bump_init: u8) -> Result<()> {
        let market = ctx.accounts.market.key();
        let authority = ctx.accounts.authority.key();
        let open_orders = ctx.accounts.open_orders.to_account_info();
        let init_authority = ctx.accounts.open_orders_init_authority.to_account_info();

        dex::check_market(&ctx.accounts.market)?;
        pda::verify(
            Namespace::OpenOrders,
            &market,
            Some(&authority),
            bump,
            open_orders.key,
        )?;
        pda::verify(
            Namespace::OpenOrdersInit,
            &market,
            None,
            bump_init,
            init_authority.key,
        )?;

        ctx.accounts.authorize()?;

        require!(
            open_orders.owner == &system_program::ID && open_orders.data_is_empty(),
            ErrorCode::AlreadyExists
        );

        let required = ctx.accounts.rent.minimum_balance(OPEN_ORDERS_SPACE);
        let shortfall = required.saturating_sub(open_orders.lamports());
        require!(
            can_fund(
                ctx.accounts.authority.lamports(),
                shortfall,
                &ctx.accounts.rent
            ),
            ErrorCode::InsufficientFunds
        );

        let seeds: &[&[u8]] = open_orders_seeds!(market, authority, bump);
        let init_seeds: &[&[u8]] = init_authority_seeds!(market, bump_init);

        ctx.accounts.allocate(&open_orders, required, shortfall, seeds)?;

        let dex_program = ctx.accounts.dex_program.to_account_info();
        InvocationContext::new(
            &dex_program,
            vec![
                open_orders.clone(),
                open_orders.clone(),
                ctx.accounts.market.to_account_info(),
                ctx.accounts.rent.to_account_info(),
                init_authority,
            ],
        )?
        .sign(1)?
        .sign(4)?
        .invoke_signed(
            &MarketInstruction::InitOpenOrders.pack(),
            &[seeds, init_seeds],
        )?;

        emit!(OpenOrdersCreated {
            market,
            authority,
            open_orders: *open_orders.key,
            lamports: open_orders.lamports(),
        });

        msg!(
            "Open orders created: market={}, authority={}, open_orders={}",
            market,
            authority,
            open_orders.key
        );

        Ok(())
    }

    fn authorize(&self) -> Result<()> {
        let market = self.market.key();
        let (expected_witness, _) = pda::init_authority_address(&market)?;
        let request = AuthorizationRequest {
            market,
            owner: self.authority.key(),
            witness: self.open_orders_init_authority.key(),
            expected_witness,
            attestation: self.attestation.as_ref().map(|attestation| attestation.view()),
            now: Clock::get()?.unix_timestamp,
        };

        let decision = match self.load_policy()? {
            Some(policy) => policy.policy().authorize(&request),
            None => WitnessOnly.authorize(&request),
        };
        decision.into_result()
    }

    fn load_policy(&self) -> Result<Option<MarketPolicy>> {
        let info = self.market_policy.to_account_info();
        if info.owner != &crate::ID || info.data_is_empty() {
            return Ok(None);
        }
        let data = info.try_borrow_data()?;
        Ok(Some(MarketPolicy::try_deserialize(&mut &data[..])?))
    }

    /// Funds, sizes and assigns the open orders account to the DEX. Lamports
    /// already sitting at the address count towards rent.
    fn allocate(
        &self,
        open_orders: &AccountInfo<'info>,
        required: u64,
        shortfall: u64,
        seeds: &[&[u8]],
    ) -> Result<()> {
        let system = self.system_program.to_account_info();
        let authority = self.authority.to_account_info();

        if open_orders.lamports() == 0 {
            return system_program::create_account(
                CpiContext::new_with_signer(
                    system,
                    CreateAccount {
                        from: authority,
                        to: open_orders.clone(),
                    },
                    &[seeds],
                ),
                required,
                OPEN_ORDERS_SPACE as u64,
                &dex::ID,
            );
        }

        if shortfall > 0 {
            system_program::transfer(
                CpiContext::new(
                    system.clone(),
                    Transfer {
                        from: authority,
                        to: open_orders.clone(),
                    },
                ),
                shortfall,
            )?;
        }
        system_program::allocate(
            CpiContext::new_with_signer(
                system.clone(),
                Allocate {
                    account_to_allocate: open_orders.clone(),
                },
                &[seeds],
            ),
            OPEN_ORDERS_SPACE as u64,
        )?;
        system_program::assign(
            CpiContext::new_with_signer(
                system,
                Assign {
                    account_to_assign: open_orders.clone(),
                },
                &[seeds],
            ),
            &dex::ID,
        )
    }
}

/// The payer must cover `shortfall` and either be drained or keep a
/// rent-exempt balance.
fn can_fund(balance: u64, shortfall: u64, rent: &Rent) -> bool {
    match balance.checked_sub(shortfall) {
        Some(0) => true,
        Some(remaining) => remaining >= rent.minimum_balance(0),
        None => false,
    }
}
