//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use loyalty_engine::{
    db_types::OrderId,
    traits::{AccountManagement, LedgerDatabase},
    AccountApi,
    OrderFlowApi,
    OrderUploadError,
    WithdrawalApi,
};

use crate::{
    auth::{current_user, RememberToken},
    data_objects::{OrderView, WithdrawRequest, WithdrawalView},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(upload_order => Post "/user/orders" impl LedgerDatabase);
/// Route handler for order uploads
///
/// The body is the order number, as plain text. The response codes are
/// * `202 Accepted`: the order is new, and will be reconciled with the accrual service.
/// * `200 OK`: this user has already uploaded the order.
/// * `409 Conflict`: another user has already uploaded the order.
/// * `422 Unprocessable Entity`: the order number fails the Luhn check.
/// * `400 Bad Request`: the body is empty.
pub async fn upload_order<B: LedgerDatabase>(
    token: RememberToken,
    body: String,
    accounts: web::Data<AccountApi<B>>,
    orders: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = current_user(&token, accounts.as_ref()).await?;
    let number = body.trim();
    if number.is_empty() {
        return Err(ServerError::InvalidRequestBody("Expected an order number".into()));
    }
    debug!("💻️ POST order {number} for user #{}", user.id);
    match orders.upload_order(user.id, OrderId::from(number)).await {
        Ok(order) => Ok(HttpResponse::Accepted().json(OrderView::from(order))),
        Err(OrderUploadError::AlreadyUploadedByUser(order)) => Ok(HttpResponse::Ok().json(OrderView::from(*order))),
        Err(e) => {
            debug!("💻️ Order {number} was not accepted. {e}");
            Err(e.into())
        },
    }
}

route!(my_orders => Get "/user/orders" impl AccountManagement);
/// Route handler for the orders endpoint
///
/// Returns the orders uploaded by the current user, oldest first. If there are none, the response is
/// `204 No Content`.
pub async fn my_orders<B: AccountManagement>(
    token: RememberToken,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = current_user(&token, api.as_ref()).await?;
    debug!("💻️ GET orders for user #{}", user.id);
    let orders = api.orders_for_user(user.id).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let orders = orders.into_iter().map(OrderView::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Balance  ----------------------------------------------------
route!(my_balance => Get "/user/balance" impl AccountManagement);
/// Route handler for the balance endpoint
///
/// Returns `{ "current": ..., "withdrawn": ... }` for the current user. Accruals that have not been credited yet are
/// not included.
pub async fn my_balance<B: AccountManagement>(
    token: RememberToken,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = current_user(&token, api.as_ref()).await?;
    debug!("💻️ GET balance for user #{}", user.id);
    let balance = api
        .balance(user.id)
        .await?
        .ok_or_else(|| ServerError::BackendError(format!("User #{} disappeared", user.id)))?;
    Ok(HttpResponse::Ok().json(balance))
}

route!(withdraw => Post "/user/balance/withdraw" impl LedgerDatabase);
/// Route handler for withdrawals
///
/// The body is `{ "order": "<order number>", "sum": <points> }`. The response codes are
/// * `200 OK`: the balance was debited.
/// * `402 Payment Required`: the balance is too low. Nothing was debited.
/// * `409 Conflict`: a withdrawal against this order number already exists.
/// * `422 Unprocessable Entity`: the order number fails the Luhn check, or the sum is negative.
pub async fn withdraw<B: LedgerDatabase>(
    token: RememberToken,
    body: web::Json<WithdrawRequest>,
    accounts: web::Data<AccountApi<B>>,
    api: web::Data<WithdrawalApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = current_user(&token, accounts.as_ref()).await?;
    let WithdrawRequest { order, sum } = body.into_inner();
    debug!("💻️ POST withdrawal of {sum} against order {order} for user #{}", user.id);
    let withdrawal = api.withdraw(user.id, OrderId::from(order), sum).await?;
    Ok(HttpResponse::Ok().json(WithdrawalView::from(withdrawal)))
}

route!(my_withdrawals => Get "/user/withdrawals" impl AccountManagement);
/// Route handler for the withdrawal history. If there are no withdrawals, the response is `204 No Content`.
pub async fn my_withdrawals<B: AccountManagement>(
    token: RememberToken,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = current_user(&token, api.as_ref()).await?;
    debug!("💻️ GET withdrawals for user #{}", user.id);
    let withdrawals = api.withdrawals_for_user(user.id).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let withdrawals = withdrawals.into_iter().map(WithdrawalView::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(withdrawals))
}
