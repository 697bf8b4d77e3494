use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{types::Json, FromRow};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CalendarEvent, NotificationPreferences, NotificationStyle};
use crate::AppState;

pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// One reminder, tagged with the style the client should render it in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReminderNotification {
    pub event_id: Uuid,
    pub title: String,
    pub message: String,
    pub style: NotificationStyle,
    pub minutes_until_start: i64,
    pub start_time: DateTime<Utc>,
}

/// Evaluates one polling pass for one user: every incomplete future event
/// starting within the lead window yields exactly one notification. The
/// evaluation is stateless, so an event still inside the window on the next
/// pass fires again.
pub fn due_reminders(
    now: DateTime<Utc>,
    lead_minutes: i64,
    style: &NotificationStyle,
    events: &[CalendarEvent],
) -> Vec<ReminderNotification> {
    events
        .iter()
        .filter(|event| !event.completed && now < event.start_time)
        .filter_map(|event| {
            let minutes_until_start = (event.start_time - now).num_minutes();
            if minutes_until_start > lead_minutes {
                return None;
            }
            Some(ReminderNotification {
                event_id: event.id,
                title: event.title.clone(),
                message: format!(
                    "Upcoming event: {} in {} minutes",
                    event.title, minutes_until_start
                ),
                style: style.clone(),
                minutes_until_start,
                start_time: event.start_time,
            })
        })
        .collect()
}

#[derive(FromRow)]
struct ReminderTarget {
    id: String,
    notification_preferences: Json<NotificationPreferences>,
}

/// One pass over all users: re-query events inside each user's lead window
/// and queue the resulting notifications for delivery.
pub async fn poll_once(state: &AppState) -> anyhow::Result<usize> {
    let targets = sqlx::query_as::<_, ReminderTarget>(
        r#"
        SELECT id, notification_preferences FROM users
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let now = Utc::now();
    let mut queued = 0;

    for target in targets {
        let preferences = &target.notification_preferences.0;
        let lead = chrono::Duration::minutes(preferences.event_reminder);

        let events =
            CalendarEvent::list_upcoming(&state.pool, &target.id, now, Some(now + lead), None)
                .await?;

        let notifications = due_reminders(
            now,
            preferences.event_reminder,
            &preferences.notification_style,
            &events,
        );
        if notifications.is_empty() {
            continue;
        }

        queued += notifications.len();
        let mut queue = state.reminder_queue.lock().await;
        queue.entry(target.id.clone()).or_default().extend(notifications);
    }

    if queued > 0 {
        debug!("Queued {} reminder notifications", queued);
    }
    Ok(queued)
}

/// Starts the fixed-interval reminder poll. The job runs independently of
/// user-initiated requests; overlap is harmless.
pub async fn start(state: Arc<AppState>) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create scheduler: {}", e))?;

    let job = Job::new_repeated_async(POLL_INTERVAL, move |_id, _lock| {
        let state = state.clone();
        Box::pin(async move {
            if let Err(e) = poll_once(&state).await {
                error!("Reminder poll failed: {:?}", e);
            }
        })
    })
    .map_err(|e| anyhow::anyhow!("Failed to create reminder job: {}", e))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to schedule reminder job: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start scheduler: {}", e))?;

    info!("Reminder poll started ({}s interval)", POLL_INTERVAL.as_secs());
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event_starting_in(now: DateTime<Utc>, minutes: i64, completed: bool) -> CalendarEvent {
        CalendarEvent {
            title: "Staff meeting".to_string(),
            start_time: now + Duration::minutes(minutes),
            completed,
            ..Default::default()
        }
    }

    #[test]
    fn event_inside_lead_window_fires() {
        let now = Utc::now();
        let events = vec![event_starting_in(now, 20, false)];
        let fired = due_reminders(now, 30, &NotificationStyle::Popup, &events);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].minutes_until_start, 20);
        assert_eq!(fired[0].message, "Upcoming event: Staff meeting in 20 minutes");
    }

    #[test]
    fn event_outside_lead_window_is_silent() {
        let now = Utc::now();
        let events = vec![event_starting_in(now, 40, false)];
        assert!(due_reminders(now, 30, &NotificationStyle::Popup, &events).is_empty());
    }

    #[test]
    fn past_and_completed_events_never_fire() {
        let now = Utc::now();
        let events = vec![
            event_starting_in(now, -5, false),
            event_starting_in(now, 10, true),
        ];
        assert!(due_reminders(now, 30, &NotificationStyle::Standard, &events).is_empty());
    }

    #[test]
    fn each_qualifying_event_fires_once_per_pass() {
        let now = Utc::now();
        let events = vec![
            event_starting_in(now, 5, false),
            event_starting_in(now, 25, false),
        ];
        let fired = due_reminders(now, 30, &NotificationStyle::Glow, &events);
        assert_eq!(fired.len(), 2);
    }
}
