use actix_web::{delete, get, post, put, web, HttpResponse};
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::{hash_password, sign_jwt, verify_password};
use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{Identity, Profile};
use crate::types::{
    ChangePasswordRequest, DeleteAccountRequest, LoginRequest, RegisterRequest, SessionResponse,
    TokenResponse,
};
use crate::AppState;

#[post("/register")]
pub async fn register(
    app_state: web::Data<Arc<AppState>>,
    web::Json(request): web::Json<RegisterRequest>,
) -> Result<web::Json<TokenResponse>, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    if Identity::get_by_email(&app_state.pool, &request.email)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let user_id = Identity::new_user_id();
    let password_hash = hash_password(&request.password)?;
    let identity = Identity::create(&app_state.pool, &user_id, &request.email, &password_hash)
        .await?;
    Profile::create_blank(&app_state.pool, &identity.id).await?;

    let token = sign_jwt(&identity.id, &app_state.config.jwt_secret).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        AppError::Internal("Failed to sign token".to_string())
    })?;

    info!("Registered user: {}", identity.id);
    Ok(web::Json(TokenResponse {
        token,
        user_id: identity.id,
    }))
}

#[post("/login")]
pub async fn login(
    app_state: web::Data<Arc<AppState>>,
    web::Json(request): web::Json<LoginRequest>,
) -> Result<web::Json<TokenResponse>, AppError> {
    let identity = Identity::get_by_email(&app_state.pool, &request.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&request.password, &identity.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = sign_jwt(&identity.id, &app_state.config.jwt_secret).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        AppError::Internal("Failed to sign token".to_string())
    })?;

    Ok(web::Json(TokenResponse {
        token,
        user_id: identity.id,
    }))
}

#[get("/session")]
pub async fn session(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
) -> Result<web::Json<SessionResponse>, AppError> {
    let user_id = authenticated_user.user_id;

    let identity = Identity::get(&app_state.pool, &user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    let onboarding_completed = Profile::get(&app_state.pool, &user_id)
        .await?
        .map(|profile| profile.onboarding_completed)
        .unwrap_or(false);

    Ok(web::Json(SessionResponse {
        user_id: identity.id,
        email: identity.email,
        onboarding_completed,
    }))
}

#[put("/password")]
pub async fn change_password(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(request): web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    if request.new_password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".to_string()));
    }

    let password_hash = hash_password(&request.new_password)?;
    let affected = Identity::set_password_hash(
        &app_state.pool,
        &authenticated_user.user_id,
        &password_hash,
    )
    .await?;
    if affected == 0 {
        return Err(AppError::NotFound("Account not found".to_string()));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Deletes the profile row (child rows cascade), then marks the identity as
/// deleted. The identity row itself is retained.
#[delete("/account")]
pub async fn delete_account(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(request): web::Json<DeleteAccountRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = authenticated_user.user_id;

    let identity = Identity::get(&app_state.pool, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    if request.confirm_email != identity.email {
        return Err(AppError::Validation(
            "Email confirmation does not match".to_string(),
        ));
    }

    Profile::delete(&app_state.pool, &user_id).await?;
    Identity::mark_deleted(&app_state.pool, &user_id).await?;
    app_state.events_cache.invalidate(&user_id).await;

    info!("Account deleted: {}", user_id);
    Ok(HttpResponse::NoContent().finish())
}
