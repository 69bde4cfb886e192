use std::rc::Rc;

use permissioned_markets::{dex, pda, ErrorCode};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use crate::svm::{
    market::{assert_custom_error, gateway_error, MarketFixture},
    test::TestFixture,
};

const OPEN_ORDERS_RENT: u64 = 23_357_760;

#[tokio::test]
async fn test_create_then_close_returns_the_rent() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let user = ctx.borrow_mut().gen_and_fund_key();
    let (open_orders, _) = market.open_orders(&user.pubkey());

    let initial_balance = ctx.borrow().balance(&user.pubkey());

    market
        .init_account(&user)
        .await
        .expect("Expected init_account to succeed");

    {
        let ctx = ctx.borrow();
        let account = ctx.account(&open_orders).expect("open orders account");
        assert_eq!(account.owner, dex::ID);
        assert_eq!(account.data.len(), dex::OPEN_ORDERS_SPACE);
        assert_eq!(account.lamports, OPEN_ORDERS_RENT);
        assert_eq!(ctx.balance(&user.pubkey()), initial_balance - OPEN_ORDERS_RENT);

        let state = mock_dex::state::OpenOrders::load(&account.data).unwrap();
        assert_eq!(state.market(), market.market);
        assert_eq!(state.owner(), open_orders);
    }

    market
        .close_account(&user)
        .await
        .expect("Expected close_account to succeed");

    let ctx = ctx.borrow();
    assert!(ctx.account(&open_orders).is_none());
    assert_eq!(ctx.balance(&user.pubkey()), initial_balance);
}

#[tokio::test]
async fn test_create_twice_fails_and_recreate_after_close_succeeds() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let user = ctx.borrow_mut().gen_and_fund_key();

    market.init_account(&user).await.unwrap();
    assert_custom_error(
        market.init_account(&user).await,
        gateway_error(ErrorCode::AlreadyExists),
    );

    market.close_account(&user).await.unwrap();
    market
        .init_account(&user)
        .await
        .expect("Expected the address to be reusable after close");
}

#[tokio::test]
async fn test_prefunded_address_only_charges_the_shortfall() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let user = ctx.borrow_mut().gen_and_fund_key();
    let (open_orders, _) = market.open_orders(&user.pubkey());

    let prefunded = 1_000_000;
    ctx.borrow_mut().svm.airdrop(&open_orders, prefunded).unwrap();
    let initial_balance = ctx.borrow().balance(&user.pubkey());

    market.init_account(&user).await.unwrap();

    let ctx = ctx.borrow();
    assert_eq!(ctx.balance(&open_orders), OPEN_ORDERS_RENT);
    assert_eq!(
        ctx.balance(&user.pubkey()),
        initial_balance - (OPEN_ORDERS_RENT - prefunded)
    );
}

#[tokio::test]
async fn test_owner_must_afford_the_rent() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let rent_floor = ctx.borrow().svm.minimum_balance_for_rent_exemption(0);

    // Below the rent-exempt minimum of the open orders account
    let poor = Keypair::new();
    ctx.borrow_mut().svm.airdrop(&poor.pubkey(), 1_000_000).unwrap();
    let (open_orders, _) = market.open_orders(&poor.pubkey());
    assert_custom_error(
        market.init_account(&poor).await,
        gateway_error(ErrorCode::InsufficientFunds),
    );
    assert!(ctx.borrow().account(&open_orders).is_none());
    assert_eq!(ctx.borrow().balance(&poor.pubkey()), 1_000_000);

    // Enough for the account, but the payer would be left below its own rent
    let short = Keypair::new();
    ctx.borrow_mut()
        .svm
        .airdrop(&short.pubkey(), OPEN_ORDERS_RENT + rent_floor - 1)
        .unwrap();
    let (open_orders, _) = market.open_orders(&short.pubkey());
    assert_custom_error(
        market.init_account(&short).await,
        gateway_error(ErrorCode::InsufficientFunds),
    );
    assert!(ctx.borrow().account(&open_orders).is_none());

    // Exactly the rent drains the payer
    let exact = Keypair::new();
    ctx.borrow_mut()
        .svm
        .airdrop(&exact.pubkey(), OPEN_ORDERS_RENT)
        .unwrap();
    let (open_orders, _) = market.open_orders(&exact.pubkey());
    market
        .init_account(&exact)
        .await
        .expect("Expected an exactly funded owner to be admitted");
    assert_eq!(ctx.borrow().balance(&open_orders), OPEN_ORDERS_RENT);
    assert_eq!(ctx.borrow().balance(&exact.pubkey()), 0);
}

#[tokio::test]
async fn test_bump_must_be_canonical() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let user = ctx.borrow_mut().gen_and_fund_key();
    let (_, canonical) = market.open_orders(&user.pubkey());

    let (address, bump) = (0..canonical)
        .rev()
        .find_map(|bump| {
            Pubkey::create_program_address(
                &[
                    pda::OPEN_ORDERS_TAG,
                    market.market.as_ref(),
                    user.pubkey().as_ref(),
                    &[bump],
                ],
                &permissioned_markets::ID,
            )
            .ok()
            .map(|address| (address, bump))
        })
        .expect("a non-canonical bump");

    let ix = market.init_account_ix(&user.pubkey(), address, bump, None);
    let result = ctx.borrow_mut().submit_transaction(&[ix], &[&user]);
    assert_custom_error(result, gateway_error(ErrorCode::BumpMismatch));

    // Someone else's address with the caller's canonical bump
    let other = Pubkey::new_unique();
    let (other_open_orders, _) = market.open_orders(&other);
    let ix = market.init_account_ix(&user.pubkey(), other_open_orders, canonical, None);
    let result = ctx.borrow_mut().submit_transaction(&[ix], &[&user]);
    assert_custom_error(result, gateway_error(ErrorCode::BumpMismatch));

    assert!(ctx.borrow().account(&address).is_none());
}

#[tokio::test]
async fn test_close_requires_a_live_dex_account() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let user = ctx.borrow_mut().gen_and_fund_key();
    let (open_orders, _) = market.open_orders(&user.pubkey());

    assert_custom_error(
        market.close_account(&user).await,
        gateway_error(ErrorCode::NotFound),
    );

    // Lamports at the address, but nothing the DEX owns
    ctx.borrow_mut().svm.airdrop(&open_orders, 1_000_000).unwrap();
    assert_custom_error(
        market.close_account(&user).await,
        gateway_error(ErrorCode::NotOwner),
    );
}

#[tokio::test]
async fn test_market_must_belong_to_the_dex() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let mut market = MarketFixture::new(ctx.clone()).await;
    let user = ctx.borrow_mut().gen_and_fund_key();

    // A copy of a real market's data under another address
    let impostor = Pubkey::new_unique();
    let data = ctx.borrow().account(&market.market).unwrap().data;
    ctx.borrow_mut()
        .set_program_account(impostor, dex::ID, data);
    market.market = impostor;
    (market.init_authority, market.bump_init) = pda::init_authority_address(&impostor).unwrap();
    (market.market_policy, _) = pda::market_policy_address(&impostor).unwrap();

    assert_custom_error(
        market.init_account(&user).await,
        gateway_error(ErrorCode::InvalidMarket),
    );
}
