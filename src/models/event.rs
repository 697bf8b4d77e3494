use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use std::fmt;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "event_kind_enum", rename_all = "lowercase")] // SQL value name
#[serde(rename_all = "lowercase")] // JSON value name
pub enum EventKind {
    Class,
    Lab,
    Meeting,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Class => write!(f, "class"),
            EventKind::Lab => write!(f, "lab"),
            EventKind::Meeting => write!(f, "meeting"),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for CalendarEvent {
    fn default() -> Self {
        CalendarEvent {
            id: Uuid::new_v4(),
            user_id: String::new(),
            title: String::new(),
            description: None,
            start_time: Utc::now(),
            end_time: None,
            kind: EventKind::Class,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl CalendarEvent {
    /// Overdue once the end time (start time when no end is set) has passed,
    /// unless the event was marked done.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.end_time.unwrap_or(self.start_time) < now
    }

    /// Incomplete events ordered by start time, the calendar view's read.
    pub async fn list_incomplete(pool: &PgPool, user_id: &str) -> Result<Vec<Self>> {
        let events = sqlx::query_as::<_, CalendarEvent>(
            r#"
            SELECT * FROM calendar_events
            WHERE user_id = $1 AND completed = FALSE
            ORDER BY start_time ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Incomplete events with start_time at or after `from` (and at or
    /// before `to`, when given), ordered ascending, optionally limited.
    /// Serves the dashboard and the reminder poll.
    pub async fn list_upcoming(
        pool: &PgPool,
        user_id: &str,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<Self>> {
        let events = sqlx::query_as::<_, CalendarEvent>(
            r#"
            SELECT * FROM calendar_events
            WHERE user_id = $1
              AND completed = FALSE
              AND start_time >= $2
              AND ($3::timestamptz IS NULL OR start_time <= $3)
            ORDER BY start_time ASC
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(limit.unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        title: &str,
        description: Option<&str>,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        kind: EventKind,
    ) -> Result<Self> {
        let event = CalendarEvent {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            start_time,
            end_time,
            kind,
            ..Default::default()
        };

        let event = sqlx::query_as::<_, CalendarEvent>(
            r#"
            INSERT INTO calendar_events
                (id, user_id, title, description, start_time, end_time, kind, completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.user_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.kind.clone())
        .bind(event.completed)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(pool)
        .await?;

        debug!("Event created: {:?}", event.id);
        Ok(event)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &PgPool,
        event_id: Uuid,
        user_id: &str,
        title: &str,
        description: Option<&str>,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        kind: EventKind,
    ) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, CalendarEvent>(
            r#"
            UPDATE calendar_events
            SET title = $1, description = $2, start_time = $3, end_time = $4, kind = $5, updated_at = $6
            WHERE id = $7 AND user_id = $8
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(start_time)
        .bind(end_time)
        .bind(kind)
        .bind(Utc::now())
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        debug!("Event updated: {:?}", event_id);
        Ok(event)
    }

    /// Soft-completes the event. The row stays for history; list reads
    /// filter it out.
    pub async fn complete(pool: &PgPool, event_id: Uuid, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE calendar_events
            SET completed = TRUE, updated_at = $1
            WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(Utc::now())
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        debug!("Event completed: {:?}", event_id);
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, event_id: Uuid, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM calendar_events
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        debug!("Event deleted: {:?}", event_id);
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event_ending(end: Option<DateTime<Utc>>, start: DateTime<Utc>, completed: bool) -> CalendarEvent {
        CalendarEvent {
            start_time: start,
            end_time: end,
            completed,
            ..Default::default()
        }
    }

    #[test]
    fn past_end_time_is_overdue() {
        let now = Utc::now();
        let event = event_ending(Some(now - Duration::hours(1)), now - Duration::hours(2), false);
        assert!(event.is_overdue(now));
    }

    #[test]
    fn completed_event_is_never_overdue() {
        let now = Utc::now();
        let event = event_ending(Some(now - Duration::hours(1)), now - Duration::hours(2), true);
        assert!(!event.is_overdue(now));
    }

    #[test]
    fn start_time_is_the_fallback_deadline() {
        let now = Utc::now();
        let past = event_ending(None, now - Duration::minutes(5), false);
        let future = event_ending(None, now + Duration::minutes(5), false);
        assert!(past.is_overdue(now));
        assert!(!future.is_overdue(now));
    }
}
