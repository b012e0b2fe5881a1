//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the minimum requirement. Use these in route handlers to
//! enforce authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dtg_core::error::CoreError;
use dtg_core::roles::{ROLE_ADMIN, ROLE_OPERATOR, ROLE_VENDOR};
use dtg_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `operator` role (or admin). Rejects with 403 otherwise.
///
/// Operator handlers need an organization scope; for a non-admin caller
/// [`RequireOperator::organization_id`] is guaranteed to resolve.
pub struct RequireOperator(pub AuthUser);

impl RequireOperator {
    /// The caller's organization scope.
    ///
    /// Errors with Forbidden for an operator user without an organization
    /// (a data problem, not a programming one).
    pub fn organization_id(&self) -> Result<DbId, AppError> {
        self.0.organization_id.ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Operator account is not attached to an organization".into(),
            ))
        })
    }
}

impl FromRequestParts<AppState> for RequireOperator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_OPERATOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Operator or Admin role required".into(),
            )));
        }
        Ok(RequireOperator(user))
    }
}

/// Requires the `vendor` role (or admin). Rejects with 403 otherwise.
pub struct RequireVendor(pub AuthUser);

impl FromRequestParts<AppState> for RequireVendor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_VENDOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Vendor or Admin role required".into(),
            )));
        }
        Ok(RequireVendor(user))
    }
}
