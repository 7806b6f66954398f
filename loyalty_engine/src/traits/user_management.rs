use thiserror::Error;

use crate::db_types::UserAccount;

#[derive(Debug, Clone, Error)]
pub enum UserManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The login '{0}' is already taken")]
    LoginAlreadyExists(String),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
}

impl From<sqlx::Error> for UserManagementError {
    fn from(e: sqlx::Error) -> Self {
        UserManagementError::DatabaseError(e.to_string())
    }
}

/// Provisioning of users and their session tokens.
///
/// Registration and password handling live outside the ledger. This trait only covers what the ledger needs in order
/// to own balances and resolve the current user.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Creates a new user with a zero balance.
    async fn create_user(&self, login: &str) -> Result<UserAccount, UserManagementError>;

    /// Sets (or clears, with `None`) the session token for the user.
    async fn set_remember_token(&self, user_id: i64, token: Option<&str>) -> Result<(), UserManagementError>;
}
