use std::rc::Rc;

use permissioned_markets::state::{MarketPolicy, PolicyKind};
use permissioned_markets::ErrorCode;
use solana_sdk::{pubkey::Pubkey, signature::Signer};

use crate::svm::{
    market::{assert_custom_error, gateway_error, MarketFixture},
    test::TestFixture,
};

#[tokio::test]
async fn test_allow_list_policy() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let admin = fixture.upgrade_authority;
    let user = ctx.borrow_mut().gen_and_fund_key();
    let (open_orders, _) = market.open_orders(&user.pubkey());

    market
        .configure_policy(&admin, PolicyKind::AllowList, Pubkey::default())
        .await
        .expect("Expected the first configuration to claim the market");

    let policy: MarketPolicy = ctx.borrow().load_and_deserialize(&market.market_policy);
    assert_eq!(policy.admin, admin.pubkey());
    assert_eq!(policy.market, market.market);
    assert_eq!(policy.kind, PolicyKind::AllowList);

    assert_custom_error(
        market.init_account(&user).await,
        gateway_error(ErrorCode::Unauthorized),
    );
    assert!(ctx.borrow().account(&open_orders).is_none());

    // Only the admin edits the list or reconfigures
    assert_custom_error(
        market
            .update_allow_list(&user, vec![user.pubkey()], vec![])
            .await,
        gateway_error(ErrorCode::NotAdmin),
    );
    assert_custom_error(
        market
            .configure_policy(&user, PolicyKind::WitnessOnly, Pubkey::default())
            .await,
        gateway_error(ErrorCode::NotAdmin),
    );

    market
        .update_allow_list(&admin, vec![user.pubkey()], vec![])
        .await
        .unwrap();
    market
        .init_account(&user)
        .await
        .expect("Expected an allow-listed owner to be admitted");
    market.close_account(&user).await.unwrap();

    market
        .update_allow_list(&admin, vec![], vec![user.pubkey()])
        .await
        .unwrap();
    assert_custom_error(
        market.init_account(&user).await,
        gateway_error(ErrorCode::Unauthorized),
    );
}

#[tokio::test]
async fn test_first_claim_requires_the_upgrade_authority() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let squatter = ctx.borrow_mut().gen_and_fund_key();

    assert_custom_error(
        market
            .configure_policy(&squatter, PolicyKind::AllowList, Pubkey::default())
            .await,
        gateway_error(ErrorCode::NotAdmin),
    );
    assert!(ctx.borrow().account(&market.market_policy).is_none());

    // The market stays open to the rightful claim
    market
        .configure_policy(
            &fixture.upgrade_authority,
            PolicyKind::AllowList,
            Pubkey::default(),
        )
        .await
        .expect("Expected the upgrade authority to claim the market");
    let policy: MarketPolicy = ctx.borrow().load_and_deserialize(&market.market_policy);
    assert_eq!(policy.admin, fixture.upgrade_authority.pubkey());
}

#[tokio::test]
async fn test_allow_list_capacity() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let admin = fixture.upgrade_authority;

    market
        .configure_policy(&admin, PolicyKind::AllowList, Pubkey::default())
        .await
        .unwrap();

    let full: Vec<Pubkey> = (0..permissioned_markets::state::ALLOW_LIST_CAPACITY)
        .map(|_| Pubkey::new_unique())
        .collect();
    for chunk in full.chunks(8) {
        market
            .update_allow_list(&admin, chunk.to_vec(), vec![])
            .await
            .unwrap();
    }

    assert_custom_error(
        market
            .update_allow_list(&admin, vec![Pubkey::new_unique()], vec![])
            .await,
        gateway_error(ErrorCode::AllowListFull),
    );

    // Removals apply before additions
    market
        .update_allow_list(&admin, vec![Pubkey::new_unique()], vec![full[0]])
        .await
        .expect("Expected a swap to fit");
}

#[tokio::test]
async fn test_attestation_policy() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let admin = fixture.upgrade_authority;
    let attester = ctx.borrow_mut().gen_and_fund_key();
    let user = ctx.borrow_mut().gen_and_fund_key();

    market
        .configure_policy(&admin, PolicyKind::Attestation, attester.pubkey())
        .await
        .unwrap();

    assert_custom_error(
        market.init_account(&user).await,
        gateway_error(ErrorCode::Unauthorized),
    );

    assert_custom_error(
        market.attest(&user, user.pubkey(), 0).await,
        gateway_error(ErrorCode::NotAttester),
    );

    let now = ctx.borrow().clock().unix_timestamp;
    market
        .attest(&attester, user.pubkey(), now + 60)
        .await
        .unwrap();

    ctx.borrow_mut().set_clock(now + 60);
    assert_custom_error(
        market.init_attested_account(&user).await,
        gateway_error(ErrorCode::Unauthorized),
    );

    ctx.borrow_mut().set_clock(now + 59);
    market
        .init_attested_account(&user)
        .await
        .expect("Expected an attested owner to be admitted");
    market.close_account(&user).await.unwrap();

    // Another owner cannot ride on someone else's attestation
    let other = ctx.borrow_mut().gen_and_fund_key();
    let (attestation, _) =
        permissioned_markets::pda::attestation_address(&market.market, &user.pubkey()).unwrap();
    let (open_orders, bump) = market.open_orders(&other.pubkey());
    let ix = market.init_account_ix(&other.pubkey(), open_orders, bump, Some(attestation));
    let result = ctx.borrow_mut().submit_transaction(&[ix], &[&other]);
    assert_custom_error(result, gateway_error(ErrorCode::Unauthorized));

    market
        .revoke_attestation(&attester, user.pubkey())
        .await
        .unwrap();
    assert!(ctx.borrow().account(&attestation).is_none());
    assert_custom_error(
        market.init_account(&user).await,
        gateway_error(ErrorCode::Unauthorized),
    );
}

#[tokio::test]
async fn test_markets_without_policy_only_check_the_witness() {
    let fixture = TestFixture::new().await;
    let ctx = Rc::clone(&fixture.ctx);
    let market = MarketFixture::new(ctx.clone()).await;
    let user = ctx.borrow_mut().gen_and_fund_key();

    assert!(ctx.borrow().account(&market.market_policy).is_none());
    market
        .init_account(&user)
        .await
        .expect("Expected witness-only admission");
}
