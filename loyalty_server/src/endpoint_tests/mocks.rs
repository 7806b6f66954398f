use loyalty_engine::{
    db_types::{AccrualEntry, NewOrder, NewWithdrawal, Order, OrderId, OrderStatusType, UserAccount, Withdrawal},
    traits::{AccountApiError, AccountManagement, InsertOrderResult, LedgerDatabase, LedgerError},
};
use lpg_common::Points;
use mockall::mock;

mock! {
    pub Ledger {}
    impl Clone for Ledger {
        fn clone(&self) -> Self;
    }
    impl AccountManagement for Ledger {
        async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_user_by_remember_token(&self, token: &str) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError>;
        async fn fetch_accrual_for_order(&self, order_id: &OrderId) -> Result<Option<AccrualEntry>, AccountApiError>;
        async fn fetch_pending_accruals(&self) -> Result<Vec<AccrualEntry>, AccountApiError>;
        async fn fetch_total_withdrawn(&self, user_id: i64) -> Result<Points, AccountApiError>;
    }
    impl LedgerDatabase for Ledger {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, LedgerError>;
        async fn update_order_status(&self, order_id: &OrderId, status: OrderStatusType) -> Result<Order, LedgerError>;
        async fn fetch_orders_by_status(&self, statuses: &[OrderStatusType]) -> Result<Vec<Order>, LedgerError>;
        async fn record_accrual(&self, order_id: &OrderId, amount: Points) -> Result<AccrualEntry, LedgerError>;
        async fn apply_pending_accruals(&self) -> Result<Vec<AccrualEntry>, LedgerError>;
        async fn process_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError>;
        async fn close(&mut self) -> Result<(), LedgerError>;
    }
}
