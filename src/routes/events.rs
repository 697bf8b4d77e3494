use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::CalendarEvent;
use crate::types::{CreateEventRequest, UpcomingQuery, UpdateEventRequest};
use crate::AppState;

#[derive(Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub overdue: bool,
}

fn into_views(events: Vec<CalendarEvent>) -> Vec<EventView> {
    let now = Utc::now();
    events
        .into_iter()
        .map(|event| EventView {
            overdue: event.is_overdue(now),
            event,
        })
        .collect()
}

/// Incomplete events ordered by start time, each flagged overdue when its
/// deadline has passed. Served from the per-user cache when warm; mutations
/// below invalidate it.
#[get("")]
pub async fn list_events(
    app_state: web::Data<Arc<AppState>>,
    user: Option<AuthenticatedUser>,
) -> Result<web::Json<Vec<EventView>>, AppError> {
    let Some(user) = user else {
        return Ok(web::Json(Vec::new()));
    };

    if let Some(cached) = app_state.events_cache.get(&user.user_id).await {
        debug!("Serving cached events for user: {}", user.user_id);
        return Ok(web::Json(into_views(cached)));
    }

    let events = CalendarEvent::list_incomplete(&app_state.pool, &user.user_id).await?;
    app_state
        .events_cache
        .insert(user.user_id.clone(), events.clone())
        .await;

    Ok(web::Json(into_views(events)))
}

/// Future events for the dashboard, at most 5 by default.
#[get("/upcoming")]
pub async fn upcoming_events(
    app_state: web::Data<Arc<AppState>>,
    user: Option<AuthenticatedUser>,
    query: web::Query<UpcomingQuery>,
) -> Result<web::Json<Vec<CalendarEvent>>, AppError> {
    let Some(user) = user else {
        return Ok(web::Json(Vec::new()));
    };

    let limit = query.limit.unwrap_or(5);
    let events =
        CalendarEvent::list_upcoming(&app_state.pool, &user.user_id, Utc::now(), None, Some(limit))
            .await?;

    Ok(web::Json(events))
}

#[post("")]
pub async fn create_event(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(request): web::Json<CreateEventRequest>,
) -> Result<web::Json<CalendarEvent>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let event = CalendarEvent::create(
        &app_state.pool,
        &authenticated_user.user_id,
        &request.title,
        request.description.as_deref(),
        request.start_time,
        request.end_time,
        request.kind,
    )
    .await?;
    app_state
        .events_cache
        .invalidate(&authenticated_user.user_id)
        .await;

    Ok(web::Json(event))
}

#[put("/{event_id}")]
pub async fn update_event(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    event_id: web::Path<Uuid>,
    web::Json(request): web::Json<UpdateEventRequest>,
) -> Result<web::Json<CalendarEvent>, AppError> {
    let event = CalendarEvent::update(
        &app_state.pool,
        event_id.into_inner(),
        &authenticated_user.user_id,
        &request.title,
        request.description.as_deref(),
        request.start_time,
        request.end_time,
        request.kind,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    app_state
        .events_cache
        .invalidate(&authenticated_user.user_id)
        .await;

    Ok(web::Json(event))
}

#[post("/{event_id}/complete")]
pub async fn complete_event(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let affected = CalendarEvent::complete(
        &app_state.pool,
        event_id.into_inner(),
        &authenticated_user.user_id,
    )
    .await?;
    if affected == 0 {
        return Err(AppError::NotFound("Event not found".to_string()));
    }
    app_state
        .events_cache
        .invalidate(&authenticated_user.user_id)
        .await;

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{event_id}")]
pub async fn delete_event(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let affected = CalendarEvent::delete(
        &app_state.pool,
        event_id.into_inner(),
        &authenticated_user.user_id,
    )
    .await?;
    if affected == 0 {
        return Err(AppError::NotFound("Event not found".to_string()));
    }
    app_state
        .events_cache
        .invalidate(&authenticated_user.user_id)
        .await;

    Ok(HttpResponse::NoContent().finish())
}
