use std::time::Duration;

use accrual_tools::{AccrualApiError, AccrualResponse, AccrualStatus};
use cucumber::{given, then, when};
use lpg_common::Points;
use loyalty_engine::{
    db_types::{OrderId, OrderStatusType, WithdrawalStatus},
    shutdown::shutdown_signal,
    traits::AccountManagement,
    AccountApi,
    AccrualReconciler,
    BalanceMaterializer,
    OrderFlowApi,
    OrderUploadError,
    WithdrawalApi,
    WithdrawalError,
};

use crate::cucumber::LedgerWorld;

//----------------------------------------------   Accrual service  ----------------------------------------------------
#[given(expr = "the accrual service reports order {word} as {word}")]
async fn gateway_status(world: &mut LedgerWorld, order_id: String, status: String) {
    let status = serde_json::from_value::<AccrualStatus>(serde_json::Value::String(status)).expect("Bad status");
    world.system().gateway.respond(AccrualResponse::new(order_id, status));
}

#[given(expr = "the accrual service awards {int} points for order {word}")]
async fn gateway_award(world: &mut LedgerWorld, amount: i64, order_id: String) {
    world.system().gateway.respond(AccrualResponse::processed(order_id, Points::from_whole(amount)));
}

#[given(expr = "the accrual service is unavailable for order {word}")]
async fn gateway_down(world: &mut LedgerWorld, order_id: String) {
    let err = AccrualApiError::Unavailable("connection refused".into());
    world.system().gateway.fail(&order_id, err);
}

//----------------------------------------------       Orders       ----------------------------------------------------
#[when(expr = "user {word} uploads order {word}")]
async fn upload_order(world: &mut LedgerWorld, login: String, order_id: String) {
    let user_id = world.user_id(&login);
    let api = OrderFlowApi::new(world.db().clone());
    let result = api.upload_order(user_id, OrderId::from(order_id)).await;
    world.last_upload = Some(result);
}

#[then("the upload is accepted")]
async fn upload_accepted(world: &mut LedgerWorld) {
    let result = world.last_upload.as_ref().expect("No upload was made");
    let order = result.as_ref().expect("Upload was rejected");
    assert_eq!(order.status, OrderStatusType::New);
    assert!(order.accrual.is_zero());
}

#[then(expr = "the upload is rejected as {string}")]
async fn upload_rejected(world: &mut LedgerWorld, reason: String) {
    let result = world.last_upload.as_ref().expect("No upload was made");
    let err = result.as_ref().expect_err("Upload was accepted");
    let matched = match reason.as_str() {
        "already uploaded by the user" => matches!(err, OrderUploadError::AlreadyUploadedByUser(_)),
        "owned by another user" => matches!(err, OrderUploadError::OwnedByAnotherUser(_)),
        "an invalid order number" => matches!(err, OrderUploadError::InvalidOrderNumber(_)),
        _ => panic!("Unknown rejection reason: {reason}"),
    };
    assert!(matched, "Expected the upload to be rejected as {reason}, but got {err}");
}

#[then(expr = "order {word} has status {word}")]
async fn order_status(world: &mut LedgerWorld, order_id: String, status: String) {
    let order = world.db().fetch_order_by_order_id(&OrderId::from(order_id)).await.unwrap().expect("No such order");
    assert_eq!(order.status.to_string(), status);
}

#[then(expr = "order {word} belongs to user {word}")]
async fn order_owner(world: &mut LedgerWorld, order_id: String, login: String) {
    let order = world.db().fetch_order_by_order_id(&OrderId::from(order_id)).await.unwrap().expect("No such order");
    assert_eq!(order.user_id, world.user_id(&login));
}

#[then(expr = "user {word} has {int} order(s)")]
async fn order_count(world: &mut LedgerWorld, login: String, count: usize) {
    let orders = world.db().fetch_orders_for_user(world.user_id(&login)).await.unwrap();
    assert_eq!(orders.len(), count);
}

//----------------------------------------------      Workers       ----------------------------------------------------
#[when("the reconciler runs a sweep")]
async fn reconciler_sweep(world: &mut LedgerWorld) {
    let sys = world.system();
    let reconciler = AccrualReconciler::new(sys.db.clone(), sys.gateway.clone());
    let (_trigger, shutdown) = shutdown_signal();
    reconciler.run_sweep(&shutdown).await.expect("Sweep failed");
}

#[when("the balance materializer ticks")]
async fn materializer_tick(world: &mut LedgerWorld) {
    let materializer = BalanceMaterializer::new(world.db().clone());
    materializer.tick().await.expect("Tick failed");
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut LedgerWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

//----------------------------------------------      Accruals      ----------------------------------------------------
#[then(expr = "order {word} has an accrual of {int} points that {word} been applied")]
async fn accrual_entry(world: &mut LedgerWorld, order_id: String, amount: i64, applied: String) {
    let entry =
        world.db().fetch_accrual_for_order(&OrderId::from(order_id)).await.unwrap().expect("No accrual entry");
    assert_eq!(entry.amount, Points::from_whole(amount));
    match applied.as_str() {
        "has" => assert!(entry.applied && entry.applied_at.is_some()),
        "hasn't" => assert!(!entry.applied && entry.applied_at.is_none()),
        _ => panic!("Expected 'has' or 'hasn't', got {applied}"),
    }
}

#[then(expr = "order {word} has no accrual")]
async fn no_accrual(world: &mut LedgerWorld, order_id: String) {
    let entry = world.db().fetch_accrual_for_order(&OrderId::from(order_id)).await.unwrap();
    assert!(entry.is_none(), "Unexpected accrual entry: {entry:?}");
}

#[then(expr = "there are {int} pending accruals")]
async fn pending_accruals(world: &mut LedgerWorld, count: usize) {
    let pending = world.db().fetch_pending_accruals().await.unwrap();
    assert_eq!(pending.len(), count);
}

//----------------------------------------------      Balances      ----------------------------------------------------
#[then(expr = "user {word} has a balance of {int} points")]
async fn balance(world: &mut LedgerWorld, login: String, amount: i64) {
    let api = AccountApi::new(world.db().clone());
    let summary = api.balance(world.user_id(&login)).await.unwrap().expect("No such user");
    assert_eq!(summary.current, Points::from_whole(amount));
}

#[then(expr = "user {word} has withdrawn {int} points in total")]
async fn total_withdrawn(world: &mut LedgerWorld, login: String, amount: i64) {
    let api = AccountApi::new(world.db().clone());
    let summary = api.balance(world.user_id(&login)).await.unwrap().expect("No such user");
    assert_eq!(summary.withdrawn, Points::from_whole(amount));
}

//----------------------------------------------     Withdrawals    ----------------------------------------------------
#[when(expr = "user {word} withdraws {int} points against order {word}")]
async fn withdraw(world: &mut LedgerWorld, login: String, amount: i64, order_id: String) {
    let user_id = world.user_id(&login);
    let api = WithdrawalApi::new(world.db().clone());
    let result = api.withdraw(user_id, OrderId::from(order_id), Points::from_whole(amount)).await;
    world.last_withdrawal = Some(result);
}

#[then("the withdrawal is processed")]
async fn withdrawal_processed(world: &mut LedgerWorld) {
    let result = world.last_withdrawal.as_ref().expect("No withdrawal was made");
    let withdrawal = result.as_ref().expect("Withdrawal was rejected");
    assert_eq!(withdrawal.status, WithdrawalStatus::Processed);
}

#[then(expr = "the withdrawal is rejected as {string}")]
async fn withdrawal_rejected(world: &mut LedgerWorld, reason: String) {
    let result = world.last_withdrawal.as_ref().expect("No withdrawal was made");
    let err = result.as_ref().expect_err("Withdrawal was accepted");
    let matched = match reason.as_str() {
        "already processed" => matches!(err, WithdrawalError::AlreadyProcessed(_)),
        "insufficient funds" => matches!(err, WithdrawalError::InsufficientFunds { .. }),
        "a negative amount" => matches!(err, WithdrawalError::NegativeAmount(_)),
        "an invalid order number" => matches!(err, WithdrawalError::InvalidOrderNumber(_)),
        _ => panic!("Unknown rejection reason: {reason}"),
    };
    assert!(matched, "Expected the withdrawal to be rejected as {reason}, but got {err}");
}

#[then(expr = "user {word} has a withdrawal for order {word} with status {word}")]
async fn withdrawal_status(world: &mut LedgerWorld, login: String, order_id: String, status: String) {
    let withdrawals = world.db().fetch_withdrawals_for_user(world.user_id(&login)).await.unwrap();
    let matching = withdrawals.iter().filter(|w| w.order_id.as_str() == order_id).collect::<Vec<_>>();
    assert_eq!(matching.len(), 1, "Expected exactly one withdrawal for {order_id}");
    assert_eq!(matching[0].status.to_string(), status);
}

#[then(expr = "user {word} has {int} withdrawal(s)")]
async fn withdrawal_count(world: &mut LedgerWorld, login: String, count: usize) {
    let withdrawals = world.db().fetch_withdrawals_for_user(world.user_id(&login)).await.unwrap();
    assert_eq!(withdrawals.len(), count);
}
