//! Post handlers: lifecycle, comments and the query/ranking endpoints.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::domain::{NewPost, PostChanges, PostStatus};
use quill_core::services::{RELATED_LIMIT, parse_page_size};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    CommentRequest, CreatePostRequest, RelatedPostsResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TagParams {
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub tags: Option<String>,
}

fn parse_status(raw: Option<String>) -> AppResult<Option<PostStatus>> {
    raw.map(|s| s.trim().to_lowercase().parse::<PostStatus>())
        .transpose()
        .map_err(AppError::BadRequest)
}

/// Blank means "not given"; anything else must be a UUID.
fn parse_optional_id(name: &str, raw: Option<&str>) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{name} must be a UUID, got '{s}'"))),
    }
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new = NewPost {
        title: req.title,
        content: req.content,
        image_url: req.image_url,
        is_featured: req.is_featured,
        status: parse_status(req.status)?.unwrap_or_default(),
        tags: req.tags,
        category_ids: req.category_ids,
    };

    tracing::debug!(
        user_id = %identity.user_id,
        username = %identity.username,
        role = identity.role,
        "Creating post"
    );
    let post = state.posts.create(identity.user_id, new).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        content: req.content,
        image_url: req.image_url,
        is_featured: req.is_featured,
        status: parse_status(req.status)?,
        tags: req.tags,
        category_ids: req.category_ids,
    };

    let post = state.posts.update(path.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .posts
        .add_comment(path.into_inner(), identity.user_id, body.into_inner().text)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(comment)))
}

/// GET /api/posts/{postId}/related
pub async fn related(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let related_posts = state
        .queries
        .related_to(path.into_inner(), RELATED_LIMIT)
        .await?;
    Ok(HttpResponse::Ok().json(RelatedPostsResponse { related_posts }))
}

/// GET /api/posts/category/{categoryId}
pub async fn by_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.queries.by_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/posts/tags?tag=
pub async fn by_tag(
    state: web::Data<AppState>,
    params: web::Query<TagParams>,
) -> AppResult<HttpResponse> {
    let tag = params.into_inner().tag.unwrap_or_default();
    let posts = state.queries.by_tag(&tag).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/popular-post?size=
pub async fn popular(
    state: web::Data<AppState>,
    params: web::Query<PopularParams>,
) -> AppResult<HttpResponse> {
    let size = parse_page_size(params.size.as_deref())?;
    let posts = state.queries.popular(size).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/search?query=&tags=
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let text = params.query.unwrap_or_default();
    let posts = state.queries.search(&text, params.tags.as_deref()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/filter?category=&search=
pub async fn filter(
    state: web::Data<AppState>,
    params: web::Query<FilterParams>,
) -> AppResult<HttpResponse> {
    let category = parse_optional_id("category", params.category.as_deref())?;
    let posts = state
        .queries
        .filter(category, params.search.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(
            parse_status(Some(" Published ".to_string())).unwrap(),
            Some(PostStatus::Published)
        );
        assert!(parse_status(Some("archived".to_string())).is_err());
    }

    #[test]
    fn test_parse_optional_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_optional_id("category", None).unwrap(), None);
        assert_eq!(parse_optional_id("category", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_optional_id("category", Some(&id.to_string())).unwrap(),
            Some(id)
        );
        assert!(parse_optional_id("category", Some("rust")).is_err());
    }
}
