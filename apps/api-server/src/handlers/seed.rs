//! Demo seeding and statistics handlers.

use actix_web::{HttpResponse, web};

use quill_shared::ApiResponse;
use quill_shared::dto::{SeedRequest, SeedSummary, StatsResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_USERS: u64 = 10;
const DEFAULT_BLOGS: u64 = 100;

/// POST /api/seed - populate the database with sample data.
pub async fn seed(
    state: web::Data<AppState>,
    body: Option<web::Json<SeedRequest>>,
) -> AppResult<HttpResponse> {
    refuse_in_production(&state, "Seeding")?;

    let req = body.map(web::Json::into_inner).unwrap_or_default();
    let report = state
        .seeder
        .seed(
            req.user_count.unwrap_or(DEFAULT_USERS),
            req.blog_count.unwrap_or(DEFAULT_BLOGS),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        SeedSummary {
            users: report.users,
            blogs: report.blogs,
            published: report.published,
            drafts: report.drafts,
        },
        "Database seeded successfully",
    )))
}

/// DELETE /api/seed - clear all data.
pub async fn clear(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    refuse_in_production(&state, "Clearing the database")?;

    state.seeder.clear().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Database cleared successfully")))
}

/// GET /api/seed/stats - database statistics.
pub async fn stats(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = state.stats.stats().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(StatsResponse::from(stats))))
}

fn refuse_in_production(state: &AppState, action: &str) -> Result<(), AppError> {
    if state.is_production {
        return Err(AppError::Forbidden(format!(
            "{action} is not allowed in production environment"
        )));
    }
    Ok(())
}
