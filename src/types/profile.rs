use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::NotificationPreferences;

#[derive(Deserialize, ToSchema)]
pub struct OnboardingRequest {
    pub full_name: String,
    pub school_name: String,
    pub subjects_taught: Vec<String>,
    pub grade_levels: Vec<String>,
    pub years_of_experience: i32,
    pub teaching_style: String,
    pub interests: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub school_name: String,
    pub subjects_taught: Vec<String>,
    pub grade_levels: Vec<String>,
    pub years_of_experience: i32,
    pub teaching_style: String,
    pub interests: Vec<String>,
    pub notification_preferences: NotificationPreferences,
}
