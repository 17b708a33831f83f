use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    menu::{dto::MenuRequest, model::MenuItem},
    state::AppState,
};

pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/menu/", get(list_menu).post(create_menu))
        .route(
            "/menu/:id/",
            get(get_menu).put(replace_menu).delete(delete_menu),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Not found.".into())
}

/// Ids that are not integers can never match a row.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse().map_err(|_| not_found())
}

#[instrument(skip(state, _user))]
pub async fn list_menu(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.menus.list().await?))
}

#[instrument(skip(state, _user, payload))]
pub async fn create_menu(
    State(state): State<AppState>,
    _user: AuthUser,
    payload: Result<Json<MenuRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    let Json(payload) = payload?;
    let input = payload.validate().map_err(AppError::Validation)?;
    let item = state.menus.create(input).await?;
    info!(menu_id = item.id, "menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, _user))]
pub async fn get_menu(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MenuItem>> {
    let id = parse_id(&id)?;
    let item = state.menus.get(id).await?.ok_or_else(not_found)?;
    Ok(Json(item))
}

#[instrument(skip(state, _user, payload))]
pub async fn replace_menu(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<MenuRequest>, JsonRejection>,
) -> AppResult<Json<MenuItem>> {
    let id = parse_id(&id)?;
    if state.menus.get(id).await?.is_none() {
        return Err(not_found());
    }
    let Json(payload) = payload?;
    let input = payload.validate().map_err(AppError::Validation)?;
    let item = state.menus.replace(id, input).await?.ok_or_else(not_found)?;
    info!(menu_id = item.id, "menu item replaced");
    Ok(Json(item))
}

#[instrument(skip(state, _user))]
pub async fn delete_menu(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    if !state.menus.delete(id).await? {
        return Err(not_found());
    }
    info!(menu_id = id, "menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}
