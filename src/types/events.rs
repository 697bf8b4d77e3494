use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::EventKind;

#[derive(Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

#[derive(Deserialize, ToSchema)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}
