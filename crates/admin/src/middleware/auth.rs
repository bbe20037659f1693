//! Authentication middleware and extractors for the console.
//!
//! Every console page except the login form requires a signed-in staff
//! member; mutating pages additionally require an editing role.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentStaff, session_keys};

/// Extractor that requires a logged-in staff member.
///
/// Unauthenticated requests get a redirect to the login page carrying the
/// original path in `next`.
pub struct RequireStaff(pub CurrentStaff);

/// Extractor that additionally requires a role allowed to change data.
pub struct RequireEditor(pub CurrentStaff);

/// Error returned when a staff login is required but missing.
pub enum AuthRejection {
    /// Redirect to the login page, preserving the requested path.
    RedirectToLogin(String),
    /// No session layer available.
    Unauthorized,
    /// Logged in, but the role does not allow this page.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => {
                let target = format!("/auth/login?next={}", urlencoding::encode(&next));
                Redirect::to(&target).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "You do not have access to this page").into_response()
            }
        }
    }
}

/// Pull the current staff member out of the session, or reject.
async fn current_staff(parts: &Parts) -> Result<CurrentStaff, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get(session_keys::CURRENT_STAFF)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| AuthRejection::RedirectToLogin(parts.uri.path().to_owned()))
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_staff(parts).await?))
    }
}

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff = current_staff(parts).await?;
        if !staff.role.can_edit() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(staff))
    }
}

/// Helper to set the current staff member in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_staff(
    session: &Session,
    staff: &CurrentStaff,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_STAFF, staff).await
}

/// Helper to clear the current staff member from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_staff(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentStaff>(session_keys::CURRENT_STAFF)
        .await?;
    Ok(())
}
