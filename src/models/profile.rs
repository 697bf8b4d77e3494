use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStyle {
    Popup,
    Glow,
    Standard,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationPreferences {
    /// Minutes before an event's start at which a reminder should fire.
    pub event_reminder: i64,
    pub notification_style: NotificationStyle,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        NotificationPreferences {
            event_reminder: 30,
            notification_style: NotificationStyle::Popup,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub school_name: String,
    pub subjects_taught: Vec<String>,
    pub grade_levels: Vec<String>,
    pub years_of_experience: i32,
    pub teaching_style: String,
    pub interests: Vec<String>,
    #[schema(value_type = NotificationPreferences)]
    pub notification_preferences: Json<NotificationPreferences>,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields captured by the onboarding and settings forms.
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub school_name: String,
    pub subjects_taught: Vec<String>,
    pub grade_levels: Vec<String>,
    pub years_of_experience: i32,
    pub teaching_style: String,
    pub interests: Vec<String>,
}

impl Profile {
    /// Creates the blank profile row at registration. The onboarding form
    /// fills it in afterwards.
    pub async fn create_blank(pool: &PgPool, user_id: &str) -> Result<Self> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO users (id, notification_preferences, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(Json(NotificationPreferences::default()))
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        debug!("Profile created: {}", profile.id);
        Ok(profile)
    }

    pub async fn get(pool: &PgPool, user_id: &str) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Onboarding form: populates the profile and flips the gating flag.
    pub async fn complete_onboarding(
        pool: &PgPool,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<Self> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE users
            SET full_name = COALESCE($1, full_name),
                school_name = $2,
                subjects_taught = $3,
                grade_levels = $4,
                years_of_experience = $5,
                teaching_style = $6,
                interests = $7,
                onboarding_completed = TRUE,
                updated_at = $8
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&fields.full_name)
        .bind(&fields.school_name)
        .bind(&fields.subjects_taught)
        .bind(&fields.grade_levels)
        .bind(fields.years_of_experience)
        .bind(&fields.teaching_style)
        .bind(&fields.interests)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        info!("Onboarding completed for user: {}", user_id);
        Ok(profile)
    }

    /// Settings form: same fields as onboarding plus notification preferences.
    pub async fn update_settings(
        pool: &PgPool,
        user_id: &str,
        fields: &ProfileFields,
        preferences: &NotificationPreferences,
    ) -> Result<Self> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE users
            SET full_name = COALESCE($1, full_name),
                school_name = $2,
                subjects_taught = $3,
                grade_levels = $4,
                years_of_experience = $5,
                teaching_style = $6,
                interests = $7,
                notification_preferences = $8,
                updated_at = $9
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&fields.full_name)
        .bind(&fields.school_name)
        .bind(&fields.subjects_taught)
        .bind(&fields.grade_levels)
        .bind(fields.years_of_experience)
        .bind(&fields.teaching_style)
        .bind(&fields.interests)
        .bind(Json(preferences.clone()))
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        debug!("Profile updated: {}", user_id);
        Ok(profile)
    }

    /// Removes the profile row. Child rows (events, resources, quizzes)
    /// cascade with it; the identity row is marked deleted by the caller.
    pub async fn delete(pool: &PgPool, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        info!("Profile deleted for user: {}", user_id);
        Ok(result.rows_affected())
    }
}
