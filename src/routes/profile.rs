use actix_web::{get, post, put, web};
use std::sync::Arc;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::profile::ProfileFields;
use crate::models::Profile;
use crate::types::{OnboardingRequest, UpdateProfileRequest};
use crate::AppState;

#[get("")]
pub async fn get_profile(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<Profile>, AppError> {
    let profile = Profile::get(&app_state.pool, &authenticated_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(web::Json(profile))
}

#[put("")]
pub async fn update_profile(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(request): web::Json<UpdateProfileRequest>,
) -> Result<web::Json<Profile>, AppError> {
    let fields = ProfileFields {
        full_name: request.full_name,
        school_name: request.school_name,
        subjects_taught: request.subjects_taught,
        grade_levels: request.grade_levels,
        years_of_experience: request.years_of_experience,
        teaching_style: request.teaching_style,
        interests: request.interests,
    };

    let profile = Profile::update_settings(
        &app_state.pool,
        &authenticated_user.user_id,
        &fields,
        &request.notification_preferences,
    )
    .await?;

    Ok(web::Json(profile))
}

/// Populates the profile and sets the onboarding-completed flag, after which
/// the client stops redirecting to the setup flow.
#[post("/onboarding")]
pub async fn complete_onboarding(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(request): web::Json<OnboardingRequest>,
) -> Result<web::Json<Profile>, AppError> {
    if request.full_name.trim().is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }

    let fields = ProfileFields {
        full_name: Some(request.full_name),
        school_name: request.school_name,
        subjects_taught: request.subjects_taught,
        grade_levels: request.grade_levels,
        years_of_experience: request.years_of_experience,
        teaching_style: request.teaching_style,
        interests: request.interests,
    };

    let profile =
        Profile::complete_onboarding(&app_state.pool, &authenticated_user.user_id, &fields).await?;

    Ok(web::Json(profile))
}
