use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use loyalty_engine::{
    db_types::{Order, OrderId, OrderStatusType},
    traits::{InsertOrderResult, LedgerError},
    AccountApi,
    OrderFlowApi,
};
use lpg_common::Points;

use super::{
    helpers::{ledger_with_session, send_request, timestamp, with_session, ALICE_TOKEN},
    mocks::MockLedger,
};
use crate::routes::{MyOrdersRoute, UploadOrderRoute};

fn order(order_id: &str, user_id: i64, status: OrderStatusType, accrual: Points) -> Order {
    Order {
        id: 1,
        order_id: OrderId::from(order_id),
        user_id,
        status,
        accrual,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn configure_upload(cfg: &mut ServiceConfig) {
    let mut ledger = MockLedger::new();
    ledger.expect_insert_order().returning(|new_order| match new_order.order_id.as_str() {
        // Already uploaded by alice
        id @ "12345678903" => Ok(InsertOrderResult::AlreadyExists(order(id, 1, OrderStatusType::New, Points::ZERO))),
        // Already uploaded by someone else
        id @ "9278923470" => Ok(InsertOrderResult::AlreadyExists(order(id, 2, OrderStatusType::New, Points::ZERO))),
        "2377225624" => Err(LedgerError::DatabaseError("disk I/O error".into())),
        id => Ok(InsertOrderResult::Inserted(order(id, new_order.user_id, OrderStatusType::New, Points::ZERO))),
    });
    cfg.service(UploadOrderRoute::<MockLedger>::new())
        .app_data(web::Data::new(AccountApi::new(ledger_with_session())))
        .app_data(web::Data::new(OrderFlowApi::new(ledger)));
}

fn upload(number: &str) -> TestRequest {
    with_session(TestRequest::post().uri("/user/orders"), ALICE_TOKEN)
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(number.to_string())
}

#[actix_web::test]
async fn upload_without_session() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/user/orders").set_payload("79927398713");
    let (status, body) = send_request(req, configure_upload).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication required. No session cookie was provided."}"#);
}

#[actix_web::test]
async fn upload_with_unknown_session() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::post().uri("/user/orders"), "stale-token").set_payload("79927398713");
    let (status, _) = send_request(req, configure_upload).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn upload_new_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(upload("79927398713"), configure_upload).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, r#"{"number":"79927398713","status":"NEW","uploaded_at":"2024-03-01T12:00:00Z"}"#);
}

#[actix_web::test]
async fn upload_trims_whitespace() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(upload("  79927398713\n"), configure_upload).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn upload_own_order_again() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(upload("12345678903"), configure_upload).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn upload_someone_elses_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(upload("9278923470"), configure_upload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Order 9278923470 has already been uploaded by another user"}"#);
}

#[actix_web::test]
async fn upload_invalid_order_number() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(upload("79927398710"), configure_upload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send_request(upload("order-1"), configure_upload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn upload_empty_body() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(upload(""), configure_upload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn upload_backend_failure() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(upload("2377225624"), configure_upload).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

fn configure_orders(cfg: &mut ServiceConfig) {
    let mut ledger = ledger_with_session();
    ledger.expect_fetch_orders_for_user().returning(|_| {
        Ok(vec![
            order("79927398713", 1, OrderStatusType::Processed, Points::from_hundredths(50050)),
            order("12345678903", 1, OrderStatusType::Processing, Points::ZERO),
            order("9278923470", 1, OrderStatusType::Invalid, Points::ZERO),
        ])
    });
    cfg.service(MyOrdersRoute::<MockLedger>::new()).app_data(web::Data::new(AccountApi::new(ledger)));
}

fn configure_no_orders(cfg: &mut ServiceConfig) {
    let mut ledger = ledger_with_session();
    ledger.expect_fetch_orders_for_user().returning(|_| Ok(vec![]));
    cfg.service(MyOrdersRoute::<MockLedger>::new()).app_data(web::Data::new(AccountApi::new(ledger)));
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::get().uri("/user/orders"), ALICE_TOKEN);
    let (status, body) = send_request(req, configure_orders).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn fetch_my_orders_when_there_are_none() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::get().uri("/user/orders"), ALICE_TOKEN);
    let (status, body) = send_request(req, configure_no_orders).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn fetch_my_orders_without_session() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(TestRequest::get().uri("/user/orders"), configure_orders).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

const ORDERS_JSON: &str = r#"[{"number":"79927398713","status":"PROCESSED","accrual":500.5,"uploaded_at":"2024-03-01T12:00:00Z"},{"number":"12345678903","status":"PROCESSING","uploaded_at":"2024-03-01T12:00:00Z"},{"number":"9278923470","status":"INVALID","uploaded_at":"2024-03-01T12:00:00Z"}]"#;
