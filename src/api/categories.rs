//! Category endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{messages, AppResult, OrFail},
    models::category::{Category, CategoryDetails, CreateCategory},
};

use super::AppJson;

/// List categories with their books
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryDetails>),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<CategoryDetails>>> {
    let categories = state
        .services
        .catalog
        .list_categories()
        .await
        .or_fail(messages::LIST_CATEGORIES_FAILED)?;
    Ok(Json(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    AppJson(data): AppJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state
        .services
        .catalog
        .create_category(data)
        .await
        .or_fail(messages::CREATE_CATEGORY_FAILED)?;
    Ok((StatusCode::CREATED, Json(category)))
}
