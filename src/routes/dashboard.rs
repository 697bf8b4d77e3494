use actix_web::{get, web};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::join;
use tracing::error;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CalendarEvent, Profile};
use crate::AppState;

const UPCOMING_LIMIT: i64 = 5;

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub profile: Option<Profile>,
    pub upcoming_events: Vec<CalendarEvent>,
}

/// Profile summary plus the next (at most) five events, fetched
/// concurrently.
#[get("")]
pub async fn dashboard(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<web::Json<DashboardResponse>, AppError> {
    let user_id = user.user_id.clone();

    let profile_future = Profile::get(&app_state.pool, &user_id);
    let events_future = CalendarEvent::list_upcoming(
        &app_state.pool,
        &user_id,
        Utc::now(),
        None,
        Some(UPCOMING_LIMIT),
    );

    let (profile_result, events_result) = join!(profile_future, events_future);

    let profile = profile_result.map_err(|e| {
        error!("Failed to fetch profile: {:?}", e);
        AppError::from(e)
    })?;

    let upcoming_events = events_result.map_err(|e| {
        error!("Failed to fetch upcoming events: {:?}", e);
        AppError::from(e)
    })?;

    Ok(web::Json(DashboardResponse {
        profile,
        upcoming_events,
    }))
}
