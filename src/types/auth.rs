use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: String,
}

/// Drives the client's routing: unauthenticated visitors go to login,
/// authenticated users without a completed onboarding go to onboarding.
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub onboarding_completed: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    /// Must match the account email exactly.
    pub confirm_email: String,
}
