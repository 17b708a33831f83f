use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::token::parse_authorization;
use crate::{accounts::model::Account, error::AppError, state::AppState};

/// Resolves the `Authorization` token to its active account.
pub struct AuthUser(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".into())
            })?;

        let key = parse_authorization(header)
            .ok_or_else(|| AppError::Unauthorized("Invalid token header.".into()))?;

        let account = match state.accounts.find_by_token(key).await? {
            Some(a) => a,
            None => {
                warn!("unknown token");
                return Err(AppError::Unauthorized("Invalid token.".into()));
            }
        };

        if !account.is_active {
            warn!(account_id = %account.id, "inactive account presented a token");
            return Err(AppError::Unauthorized("User inactive or deleted.".into()));
        }

        Ok(AuthUser(account))
    }
}
