//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use dtg_core::error::CoreError;
use dtg_db::models::user::{LoginRequest, UserView};
use dtg_db::repositories::UserRepo;
use serde::Serialize;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

/// POST /api/v1/auth/login
///
/// Verify credentials and issue an access token. The same Unauthorized
/// error is returned for unknown emails and wrong passwords.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if !verify_password(&input.password, &user.password_hash) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let token = generate_access_token(
        user.id,
        &user.role,
        user.organization_id,
        user.vendor_id,
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            token,
            user: user.into(),
        },
    }))
}
