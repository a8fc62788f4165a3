//! Category handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::{CategoryRequest, MessageResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/category
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state.categories.create(&body.name).await?;
    Ok(HttpResponse::Created().json(category))
}

/// GET /api/category
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.categories.list().await?))
}

/// GET /api/category/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.categories.get(path.into_inner()).await?))
}

/// PUT /api/category/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .update(path.into_inner(), &body.name)
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

/// DELETE /api/category/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let category = state.categories.delete(path.into_inner()).await?;
    tracing::info!(category_id = %category.id, "Category deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Category deleted successfully")))
}
