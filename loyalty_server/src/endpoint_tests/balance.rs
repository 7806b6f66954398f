use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use loyalty_engine::{
    db_types::{OrderId, Withdrawal, WithdrawalStatus},
    traits::LedgerError,
    AccountApi,
    WithdrawalApi,
};
use lpg_common::Points;
use serde_json::json;

use super::{
    helpers::{alice, ledger_with_session, send_request, timestamp, with_session, ALICE_TOKEN},
    mocks::MockLedger,
};
use crate::routes::{MyBalanceRoute, MyWithdrawalsRoute, WithdrawRoute};

fn withdrawal(order_id: &str, amount: Points, status: WithdrawalStatus) -> Withdrawal {
    Withdrawal {
        id: 1,
        order_id: OrderId::from(order_id),
        user_id: 1,
        amount,
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn configure_balance(cfg: &mut ServiceConfig) {
    let mut ledger = ledger_with_session();
    ledger.expect_fetch_user_account().returning(|_| Ok(Some(alice())));
    ledger.expect_fetch_total_withdrawn().returning(|_| Ok(Points::from_hundredths(4250)));
    cfg.service(MyBalanceRoute::<MockLedger>::new()).app_data(web::Data::new(AccountApi::new(ledger)));
}

#[actix_web::test]
async fn fetch_my_balance() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::get().uri("/user/balance"), ALICE_TOKEN);
    let (status, body) = send_request(req, configure_balance).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"current":500,"withdrawn":42.5}"#);
}

#[actix_web::test]
async fn fetch_balance_without_session() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(TestRequest::get().uri("/user/balance"), configure_balance).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn configure_withdraw(cfg: &mut ServiceConfig) {
    let mut ledger = MockLedger::new();
    ledger.expect_process_withdrawal().returning(|w| match w.order_id.as_str() {
        _ if w.amount.is_negative() => Err(LedgerError::NegativeAmount(w.amount)),
        "2377225624" => Err(LedgerError::WithdrawalAlreadyProcessed(w.order_id.clone())),
        _ if w.amount > Points::from_whole(500) => {
            Err(LedgerError::InsufficientFunds { available: Points::from_whole(500), requested: w.amount })
        },
        "11111111115" => Err(LedgerError::DatabaseError("database is locked".into())),
        "22222222220" => Err(LedgerError::UserNotFound(w.user_id)),
        id => Ok(withdrawal(id, w.amount, WithdrawalStatus::Processed)),
    });
    cfg.service(WithdrawRoute::<MockLedger>::new())
        .app_data(web::Data::new(AccountApi::new(ledger_with_session())))
        .app_data(web::Data::new(WithdrawalApi::new(ledger)));
}

fn withdraw(body: serde_json::Value) -> TestRequest {
    with_session(TestRequest::post().uri("/user/balance/withdraw"), ALICE_TOKEN).set_json(body)
}

#[actix_web::test]
async fn successful_withdrawal() {
    let _ = env_logger::try_init().ok();
    let req = withdraw(json!({"order": "9278923470", "sum": 200.25}));
    let (status, body) = send_request(req, configure_withdraw).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"order":"9278923470","sum":200.25,"status":"PROCESSED","processed_at":"2024-03-01T12:00:00Z"}"#
    );
}

#[actix_web::test]
async fn withdrawal_with_insufficient_funds() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(withdraw(json!({"order": "9278923470", "sum": 751})), configure_withdraw).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[actix_web::test]
async fn repeated_withdrawal() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(withdraw(json!({"order": "2377225624", "sum": 10})), configure_withdraw).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn negative_withdrawal() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(withdraw(json!({"order": "9278923470", "sum": -10})), configure_withdraw).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn withdrawal_with_invalid_order_number() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(withdraw(json!({"order": "12345678901", "sum": 10})), configure_withdraw).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn malformed_withdrawal_request() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(withdraw(json!({"order": "9278923470"})), configure_withdraw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send_request(withdraw(json!({"order": 9278923470_u64, "sum": 1})), configure_withdraw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn withdrawal_backend_failure() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(withdraw(json!({"order": "11111111115", "sum": 10})), configure_withdraw).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn withdrawal_for_a_vanished_account() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(withdraw(json!({"order": "22222222220", "sum": 10})), configure_withdraw).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("does not exist"), "{body}");
}

fn configure_withdrawals(cfg: &mut ServiceConfig) {
    let mut ledger = ledger_with_session();
    ledger.expect_fetch_withdrawals_for_user().returning(|user_id| match user_id {
        1 => Ok(vec![
            withdrawal("2377225624", Points::from_whole(100), WithdrawalStatus::Processed),
            withdrawal("9278923470", Points::from_whole(900), WithdrawalStatus::Invalid),
        ]),
        _ => Ok(vec![]),
    });
    cfg.service(MyWithdrawalsRoute::<MockLedger>::new()).app_data(web::Data::new(AccountApi::new(ledger)));
}

#[actix_web::test]
async fn fetch_my_withdrawals() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::get().uri("/user/withdrawals"), ALICE_TOKEN);
    let (status, body) = send_request(req, configure_withdrawals).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, WITHDRAWALS_JSON);
}

const WITHDRAWALS_JSON: &str = r#"[{"order":"2377225624","sum":100,"status":"PROCESSED","processed_at":"2024-03-01T12:00:00Z"},{"order":"9278923470","sum":900,"status":"INVALID","processed_at":"2024-03-01T12:00:00Z"}]"#;
