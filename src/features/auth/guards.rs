//! Role-based authorization guards.
//!
//! These guards extract the authenticated user and verify the role carried in the token.
//! Roles are flat: an admin is not implicitly a worker and vice versa.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated_user(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only operations (shop management, status changes, task assignment).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated_user(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for mechanic-only operations (joining a shop through the profile).
pub struct RequireWorker(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireWorker
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated_user(parts)?;

        if !user.is_worker() {
            return Err(AppError::Forbidden("Worker access required".to_string()));
        }

        Ok(RequireWorker(user.clone()))
    }
}
