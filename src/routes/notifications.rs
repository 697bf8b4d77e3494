use actix_web::{get, web};
use std::sync::Arc;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::reminders::ReminderNotification;
use crate::AppState;

/// Drains the pending reminder notifications queued by the poll job. Each
/// notification carries the user's preferred display style.
#[get("")]
pub async fn pending_notifications(
    app_state: web::Data<Arc<AppState>>,
    user: Option<AuthenticatedUser>,
) -> Result<web::Json<Vec<ReminderNotification>>, AppError> {
    let Some(user) = user else {
        return Ok(web::Json(Vec::new()));
    };

    let mut queue = app_state.reminder_queue.lock().await;
    let notifications = queue.remove(&user.user_id).unwrap_or_default();

    Ok(web::Json(notifications))
}
