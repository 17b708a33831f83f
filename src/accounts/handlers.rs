use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    accounts::{
        dto::{
            AccountSummary, LoginRequest, ProfilePatch, ProfileView, RegisterRequest,
            RegisterResponse, TokenResponse,
        },
        services,
    },
    auth::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub const REGISTERED: &str = "Account Successfully Created!";

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account/test/", get(list_accounts))
        .route("/account/register/", post(register))
        .route("/account/login/", post(login))
        .route(
            "/account/:role/:email/",
            get(get_profile).patch(patch_profile),
        )
}

#[instrument(skip(state))]
pub async fn list_accounts(State(state): State<AppState>) -> AppResult<Json<Vec<AccountSummary>>> {
    let accounts = state.accounts.list().await?;
    Ok(Json(accounts.into_iter().map(AccountSummary::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(payload) = payload?;
    let (account, token) = services::register(state.accounts.as_ref(), payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            email: account.email,
            username: account.username,
            token,
            status: REGISTERED.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(payload) = payload?;
    let token = services::login(state.accounts.as_ref(), payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, requester), fields(requester = %requester.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path((role, email)): Path<(String, String)>,
) -> AppResult<Json<ProfileView>> {
    let account =
        services::load_profile(state.accounts.as_ref(), &requester, &role, &email).await?;
    Ok(Json(ProfileView::from(account)))
}

#[instrument(skip(state, requester, payload), fields(requester = %requester.id))]
pub async fn patch_profile(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path((role, email)): Path<(String, String)>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProfileView>)> {
    let account =
        services::load_profile(state.accounts.as_ref(), &requester, &role, &email).await?;
    let Json(body) = payload?;

    let patch = ProfilePatch::for_role(account.role, body).map_err(|e| {
        warn!(error = %e, "malformed profile patch");
        AppError::BadRequest(e.to_string())
    })?;

    let account_id = account.id;
    let updated = services::update_profile(state.accounts.as_ref(), account, patch).await?;
    info!(account_id = %account_id, "profile updated");

    Ok((StatusCode::ACCEPTED, Json(ProfileView::from(updated))))
}
