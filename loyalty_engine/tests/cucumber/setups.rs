use cucumber::given;
use lpg_common::{luhn, Points};
use loyalty_engine::{
    db_types::{NewOrder, OrderId},
    traits::{LedgerDatabase, UserManagement},
};

use crate::cucumber::{LedgerSystem, LedgerWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut LedgerWorld) {
    let system = LedgerSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a user {word}")]
async fn create_user(world: &mut LedgerWorld, login: String) {
    let user = world.db().create_user(&login).await.expect("Error creating user");
    world.system_mut().users.insert(login, user.id);
}

/// Funds the account the same way production does: an order, an accrual for it, and a materializer pass.
#[given(expr = "user {word} has earned {int} points")]
async fn fund_user(world: &mut LedgerWorld, login: String, amount: i64) {
    let user_id = world.user_id(&login);
    let payload = format!("{}", rand::random::<u32>());
    let order_id = OrderId::from(luhn::with_check_digit(&payload).expect("Not a valid payload"));
    let db = world.db();
    db.insert_order(NewOrder::new(order_id.clone(), user_id)).await.expect("Error inserting funding order");
    db.record_accrual(&order_id, Points::from_whole(amount)).await.expect("Error recording funding accrual");
    db.apply_pending_accruals().await.expect("Error applying funding accrual");
}
