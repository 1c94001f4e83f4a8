//! User endpoints

use axum::{extract::State, Json};

use crate::{
    error::{messages, AppResult, OrFail},
    models::user::User,
};

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(State(state): State<crate::AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state
        .services
        .users
        .list()
        .await
        .or_fail(messages::LIST_USERS_FAILED)?;
    Ok(Json(users))
}
