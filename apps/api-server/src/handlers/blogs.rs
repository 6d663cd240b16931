//! Blog handlers - the HTTP face of the query and mutation engines.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::service::{ListBlogsParams, Paginated};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    BlogResponse, CreateBlogRequest, ListBlogsQuery, MyBlogsQuery, UpdateBlogRequest,
    UpdateStateRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/blogs - list published blogs (public).
pub async fn list_published(
    state: web::Data<AppState>,
    query: web::Query<ListBlogsQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .blogs
        .list_published(to_list_params(query.into_inner()))
        .await?;

    Ok(paginated_response(page))
}

/// GET /api/blogs/{id} - fetch one published blog, bumping its read count.
pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let blog = state.blogs.get_published(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(BlogResponse::from(blog))))
}

/// GET /api/blogs/me/posts - the caller's own blogs.
pub async fn my_blogs(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<MyBlogsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = state
        .blogs
        .list_own(
            identity.user_id,
            query.state.as_deref(),
            query.page,
            query.limit,
        )
        .await?;

    Ok(paginated_response(page))
}

/// POST /api/blogs - create a draft.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateBlogRequest>,
) -> AppResult<HttpResponse> {
    let blog = state
        .blogs
        .create(identity.user_id, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(BlogResponse::from(blog))))
}

/// PUT /api/blogs/{id} - partial or full update by the owner.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdateBlogRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let blog = state
        .blogs
        .update(identity.user_id, id, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(BlogResponse::from(blog))))
}

/// PATCH /api/blogs/{id}/state - move between draft and published.
pub async fn update_state(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdateStateRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let blog = state
        .blogs
        .set_state(identity.user_id, id, body.state.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(BlogResponse::from(blog))))
}

/// DELETE /api/blogs/{id} - permanent delete by the owner.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.blogs.delete(identity.user_id, id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Blog deleted successfully")))
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid blog id '{raw}'")))
}

fn to_list_params(query: ListBlogsQuery) -> ListBlogsParams {
    ListBlogsParams {
        page: query.page,
        limit: query.limit,
        search: query.author,
        title: query.title,
        tags: query.tags.map(split_tags),
        order_by: query.order_by,
        order: query.order,
    }
}

fn split_tags(raw: String) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn paginated_response<T: Into<BlogResponse>>(page: Paginated<T>) -> HttpResponse {
    let count = page.count();
    let data: Vec<BlogResponse> = page.items.into_iter().map(Into::into).collect();
    HttpResponse::Ok().json(ApiResponse::paginated(
        data, count, page.total, page.page, page.pages,
    ))
}
