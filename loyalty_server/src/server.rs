use std::time::Duration;

use accrual_tools::AccrualApi;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use loyalty_engine::{traits::LedgerDatabase, AccountApi, OrderFlowApi, SqliteDatabase, WithdrawalApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{health, MyBalanceRoute, MyOrdersRoute, MyWithdrawalsRoute, UploadOrderRoute, WithdrawRoute},
    workers::{start_balance_materializer, start_reconciler, stop_all, WorkerHandle},
};

/// Runs the server until it receives a shutdown signal (actix handles SIGINT and SIGTERM), then stops the background
/// workers, waits for them to finish, and closes the database.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let mut db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.auto_migrate {
        if let Err(e) = db.migrate().await {
            close_database(&mut db).await;
            return Err(ServerError::InitializeError(e.to_string()));
        }
    }
    let (srv, workers) = match launch(config, &db) {
        Ok(launched) => launched,
        Err(e) => {
            close_database(&mut db).await;
            return Err(e);
        },
    };
    let result = srv.await.map_err(ServerError::from);
    info!("🧵️ HTTP server has stopped. Stopping {} background workers", workers.len());
    stop_all(workers).await;
    close_database(&mut db).await;
    result
}

/// Binds the HTTP server and, once the address is ours, starts the background workers. Nothing is left running if
/// this returns an error.
pub fn launch(config: ServerConfig, db: &SqliteDatabase) -> Result<(Server, Vec<WorkerHandle>), ServerError> {
    let gateway = accrual_gateway(&config)?;
    let srv = create_server_instance(config.clone(), db.clone())?;
    let workers = match gateway {
        Some(gateway) => start_workers(&config, db, gateway),
        None => Vec::new(),
    };
    Ok((srv, workers))
}

/// The accrual service client, or `None` if the background workers are disabled.
fn accrual_gateway(config: &ServerConfig) -> Result<Option<AccrualApi>, ServerError> {
    if config.workers.disabled {
        warn!("🧵️ Background workers are disabled");
        return Ok(None);
    }
    let gateway = AccrualApi::new(config.accrual.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    Ok(Some(gateway))
}

pub fn start_workers(config: &ServerConfig, db: &SqliteDatabase, gateway: AccrualApi) -> Vec<WorkerHandle> {
    info!("🧵️ Starting background workers. Accrual service: {}", config.accrual.base_url);
    let reconciler = start_reconciler(db.clone(), gateway, config.workers.poll_interval);
    let materializer = start_balance_materializer(db.clone(), config.workers.balance_update_interval);
    vec![reconciler, materializer]
}

async fn close_database(db: &mut SqliteDatabase) {
    if let Err(e) = db.close().await {
        error!("🗃️ Could not close the database cleanly. {e}");
    }
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let withdrawal_api = WithdrawalApi::new(db.clone());
        let api_scope = web::scope("/api")
            .service(UploadOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(MyBalanceRoute::<SqliteDatabase>::new())
            .service(WithdrawRoute::<SqliteDatabase>::new())
            .service(MyWithdrawalsRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lpg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(withdrawal_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
