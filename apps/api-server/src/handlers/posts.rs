//! Post handlers - thin glue between HTTP and the storage selector.

use actix_web::{HttpResponse, web};

use memoir_core::domain::{Category, NewPost, PostPatch};
use memoir_core::error::DomainError;
use memoir_shared::MessageResponse;
use memoir_shared::dto::{CreatePostRequest, UpdatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Treat blank strings the same as a missing field.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_category(value: &str) -> Result<Category, DomainError> {
    Ok(value.parse::<Category>()?)
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let (Some(title), Some(content), Some(category)) = (
        non_blank(req.title),
        non_blank(req.content),
        non_blank(req.category),
    ) else {
        return Err(AppError::BadRequest(
            "Required fields: title, content, category".to_string(),
        ));
    };

    let mut input = NewPost::new(title, content, parse_category(&category)?)?;
    if let Some(excerpt) = req.excerpt {
        input = input.with_excerpt(excerpt);
    }
    if let Some(read_time) = non_blank(req.read_time) {
        input = input.with_read_time(read_time);
    }

    let post = state.posts.create(input).await?;
    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();

    let category = non_blank(req.category)
        .map(|c| parse_category(&c))
        .transpose()?;
    let patch = PostPatch {
        title: non_blank(req.title).map(|t| t.trim().to_string()),
        content: non_blank(req.content),
        category,
        excerpt: req.excerpt.map(|e| e.trim().to_string()),
        read_time: non_blank(req.read_time),
    };

    let post = state
        .posts
        .update(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
///
/// Deleting an unknown id is a successful no-op.
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}

/// GET /api/posts/category/{category}
///
/// An unknown category matches nothing.
pub async fn posts_by_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = match path.into_inner().parse::<Category>() {
        Ok(category) => state.posts.list_by_category(category).await?,
        Err(_) => Vec::new(),
    };
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/search/{query}
pub async fn search_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.search(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}
