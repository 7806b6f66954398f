//! Resolving the current user.
//!
//! Sessions are issued elsewhere. All the server sees is the `lpg_remember` cookie, whose value is looked up against
//! the users table on every request.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use log::*;
use loyalty_engine::{db_types::UserAccount, traits::AccountManagement, AccountApi};
use lpg_common::Secret;

use crate::errors::ServerError;

pub const REMEMBER_COOKIE: &str = "lpg_remember";

/// The session token carried by the `lpg_remember` cookie. Extraction fails with a 401 if the cookie is missing or
/// empty. The token still has to be resolved with [`current_user`].
#[derive(Debug, Clone)]
pub struct RememberToken(Secret<String>);

impl RememberToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(Secret::new(token.into()))
    }
}

impl FromRequest for RememberToken {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .cookie(REMEMBER_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .map(RememberToken::new)
            .ok_or_else(|| {
                debug!("💻️ Request to {} has no session cookie", req.path());
                ServerError::Unauthenticated("No session cookie was provided.".into())
            });
        ready(token)
    }
}

/// Resolves the session token to a user account.
pub async fn current_user<B: AccountManagement>(
    token: &RememberToken,
    api: &AccountApi<B>,
) -> Result<UserAccount, ServerError> {
    match api.account_by_remember_token(token.0.reveal()).await? {
        Some(user) => {
            trace!("💻️ Request authenticated as user #{}", user.id);
            Ok(user)
        },
        None => {
            debug!("💻️ Session token {} does not belong to any user", token.0);
            Err(ServerError::Unauthenticated("The session is not valid.".into()))
        },
    }
}
