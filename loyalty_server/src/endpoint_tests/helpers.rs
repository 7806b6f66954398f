use actix_web::{
    cookie::Cookie,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, TimeZone, Utc};
use loyalty_engine::db_types::UserAccount;
use lpg_common::Points;

use crate::{auth::REMEMBER_COOKIE, endpoint_tests::mocks::MockLedger};

pub const ALICE_TOKEN: &str = "alice-remember-token";

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn alice() -> UserAccount {
    UserAccount {
        id: 1,
        login: "alice".into(),
        balance: Points::from_whole(500),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// A ledger that knows alice's session token, and nobody else's.
pub fn ledger_with_session() -> MockLedger {
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_user_by_remember_token().returning(|token| Ok((token == ALICE_TOKEN).then(alice)));
    ledger
}

pub fn with_session(req: TestRequest, token: &str) -> TestRequest {
    req.cookie(Cookie::new(REMEMBER_COOKIE, token.to_string()))
}

pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}
