use rust_decimal_macros::dec;
use wallet_ledger::application::engine::TransferEngine;
use wallet_ledger::application::query::{PageRequest, QueryService};
use wallet_ledger::domain::account::{Amount, Balance};
use wallet_ledger::domain::payment::PaymentEntry;
use wallet_ledger::domain::ports::QueryStore;
use wallet_ledger::error::TransferError;

mod common;
use common::{deadline, id, wallet};

async fn balance_of(backend: &impl QueryStore, name: &str) -> Balance {
    backend.find_account(&id(name)).await.unwrap().unwrap().balance
}

#[tokio::test]
async fn test_simple_transfer() {
    let backend = wallet();
    let engine = TransferEngine::new(backend.clone());
    let query = QueryService::new(backend.clone());

    engine
        .transfer(&id("alice"), &id("bob"), dec!(20), deadline())
        .await
        .unwrap();

    assert_eq!(balance_of(&*backend, "alice").await, Balance::new(dec!(80)));
    assert_eq!(balance_of(&*backend, "bob").await, Balance::new(dec!(120)));

    let page = query.payments(PageRequest::default()).await.unwrap();
    let amount = Amount::new(dec!(20)).unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(
        page.results,
        vec![
            PaymentEntry::outgoing(&id("alice"), &id("bob"), amount),
            PaymentEntry::incoming(&id("bob"), &id("alice"), amount),
        ]
    );
}

#[tokio::test]
async fn test_bunch_of_transfers() {
    let backend = wallet();
    let engine = TransferEngine::new(backend.clone());
    let query = QueryService::new(backend.clone());

    engine.transfer(&id("alice"), &id("bob"), dec!(20), deadline()).await.unwrap();
    engine.transfer(&id("alice"), &id("john"), dec!(30), deadline()).await.unwrap();
    engine.transfer(&id("mark"), &id("bob"), dec!(40), deadline()).await.unwrap();

    assert_eq!(balance_of(&*backend, "alice").await, Balance::new(dec!(50)));
    assert_eq!(balance_of(&*backend, "bob").await, Balance::new(dec!(160)));
    assert_eq!(balance_of(&*backend, "john").await, Balance::new(dec!(130)));
    assert_eq!(balance_of(&*backend, "mark").await, Balance::new(dec!(60)));

    let payments = query.payments(PageRequest::default()).await.unwrap();
    assert_eq!(payments.total, 6);
    let owners: Vec<&str> = payments.results.iter().map(|p| p.account.as_str()).collect();
    assert_eq!(owners, vec!["alice", "bob", "alice", "john", "mark", "bob"]);

    let second_page = query.payments(PageRequest::new(4, 10)).await.unwrap();
    assert_eq!(second_page.results.len(), 2);
    assert_eq!(second_page.results[0].account.as_str(), "mark");
}

#[tokio::test]
async fn test_account_does_not_exist() {
    let backend = wallet();
    let engine = TransferEngine::new(backend.clone());

    let result = engine
        .transfer(&id("unknown_from_account"), &id("bob"), dec!(20), deadline())
        .await;
    assert!(matches!(result, Err(TransferError::SourceNotFound)));
    assert_eq!(balance_of(&*backend, "bob").await, Balance::new(dec!(100)));

    let result = engine
        .transfer(&id("alice"), &id("unknown_to_account"), dec!(20), deadline())
        .await;
    assert!(matches!(result, Err(TransferError::DestinationNotFound)));
    assert_eq!(balance_of(&*backend, "alice").await, Balance::new(dec!(100)));
    assert_eq!(backend.count_payments().await.unwrap(), 0);
}

#[tokio::test]
async fn test_different_currencies() {
    let backend = wallet();
    let engine = TransferEngine::new(backend.clone());

    let result = engine
        .transfer(&id("alice"), &id("kate_in_europe"), dec!(20), deadline())
        .await;
    match result {
        Err(TransferError::CurrencyMismatch { from, to }) => {
            assert_eq!((from.as_str(), to.as_str()), ("USD", "EUR"));
        }
        other => panic!("expected a currency mismatch, got {other:?}"),
    }

    assert_eq!(balance_of(&*backend, "alice").await, Balance::new(dec!(100)));
    assert_eq!(balance_of(&*backend, "kate_in_europe").await, Balance::new(dec!(100)));
    assert_eq!(backend.count_payments().await.unwrap(), 0);
}

#[tokio::test]
async fn test_low_balance() {
    let backend = wallet();
    let engine = TransferEngine::new(backend.clone());

    let result = engine
        .transfer(&id("alice"), &id("bob"), dec!(200), deadline())
        .await;
    assert!(matches!(result, Err(TransferError::InsufficientFunds)));
    assert_eq!(result.unwrap_err().code(), "LOW_BALANCE");

    assert_eq!(balance_of(&*backend, "alice").await, Balance::new(dec!(100)));
    assert_eq!(balance_of(&*backend, "bob").await, Balance::new(dec!(100)));
    assert_eq!(backend.count_payments().await.unwrap(), 0);
}

#[tokio::test]
async fn test_validation_order_on_multiple_failures() {
    let backend = wallet();
    let engine = TransferEngine::new(backend.clone());

    let cases = [
        ("alice", "alice", dec!(0), "PAYMENT_TO_SAME_ACCOUNT"),
        ("ghost", "phantom", dec!(-1), "NOT_POSITIVE_PAYMENT_AMOUNT"),
        ("ghost", "kate_in_europe", dec!(1000), "FROM_ACCOUNT_NOT_FOUND"),
        ("alice", "phantom", dec!(1000), "TO_ACCOUNT_NOT_FOUND"),
        ("alice", "kate_in_europe", dec!(1000), "DIFFERENT_CURRENCIES"),
        ("alice", "bob", dec!(1000), "LOW_BALANCE"),
    ];
    for (from, to, amount, code) in cases {
        let err = engine
            .transfer(&id(from), &id(to), amount, deadline())
            .await
            .unwrap_err();
        assert_eq!(err.code(), code, "{from} -> {to} {amount}");
    }
    assert_eq!(backend.count_payments().await.unwrap(), 0);
}
