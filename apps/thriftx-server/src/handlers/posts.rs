//! Blog post handlers.

use actix_web::{HttpResponse, http::header, web};

use thriftx_core::domain::{
    NewPost, Post, PostChanges, PostSummary, normalize_tags, parse_post_date,
};
use thriftx_core::error::DomainError;
use thriftx_core::services::parse_post_id;
use thriftx_shared::dto::{
    OkResponse, PostListQuery, PostRequest, PostResponse, PostSummaryResponse,
};

use super::body::read_json;
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const LIST_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        date: post.date,
        author: post.author,
        body: post.body,
        image_url: post.image_url,
        category: post.category,
        tags: post.tags,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn summary_response(summary: PostSummary) -> PostSummaryResponse {
    PostSummaryResponse {
        id: summary.id,
        title: summary.title,
        date: summary.date,
        author: summary.author,
        image_url: summary.image_url,
    }
}

/// A blank date string means "not given".
fn optional_date(raw: Option<&str>) -> Result<Option<chrono::DateTime<chrono::Utc>>, DomainError> {
    match raw.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => parse_post_date(d).map(Some),
        None => Ok(None),
    }
}

fn new_post(mut req: PostRequest) -> Result<NewPost, DomainError> {
    Ok(NewPost {
        date: optional_date(req.date.as_deref())?,
        body: req.html(),
        title: req.title,
        author: req.author,
        image_url: req.image_url,
        category: req.category,
        tags: req.tags.as_ref().map(normalize_tags).unwrap_or_default(),
    })
}

fn post_changes(mut req: PostRequest) -> Result<PostChanges, DomainError> {
    Ok(PostChanges {
        date: optional_date(req.date.as_deref())?,
        body: req.html(),
        title: req.title,
        author: req.author,
        image_url: req.image_url,
        category: req.category,
        tags: req.tags.as_ref().map(normalize_tags),
    })
}

/// GET /api/posts - summaries newest first, or full posts matching `?q=`.
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let mut response = HttpResponse::Ok();
    response.insert_header((header::CACHE_CONTROL, LIST_CACHE_CONTROL));

    match search {
        Some(q) => {
            let posts = state.content.search(q).await?;
            Ok(response.json(posts.into_iter().map(post_response).collect::<Vec<_>>()))
        }
        None => {
            let summaries = state.content.list().await?;
            Ok(response.json(
                summaries
                    .into_iter()
                    .map(summary_response)
                    .collect::<Vec<_>>(),
            ))
        }
    }
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = state.content.get(id).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts (admin)
pub async fn create(
    state: web::Data<AppState>,
    caller: Caller,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let draft = new_post(read_json(payload).await?)?;
    let post = state.content.create(&caller, draft).await?;
    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PUT /api/posts/{id} (admin)
pub async fn update(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let id = parse_post_id(&path)?;
    let changes = post_changes(read_json(payload).await?)?;
    let post = state.content.update(&caller, id, changes).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id} (admin)
pub async fn delete(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    caller.require_admin()?;
    let id = parse_post_id(&path)?;
    state.content.delete(&caller, id).await?;
    Ok(HttpResponse::Ok().json(OkResponse { ok: true }))
}
