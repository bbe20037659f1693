//! Authentication route handlers.
//!
//! Staff login and logout. The login form carries an optional `next`
//! parameter so a redirect from a protected page lands back where the
//! visitor was headed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error;
use crate::filters;
use crate::middleware::{OptionalStaff, clear_current_staff, set_current_staff};
use crate::models::CurrentStaff;
use crate::services::auth::{AuthError, StaffAuthService};
use crate::state::AppState;

/// Page staff land on after login when no `next` was given.
const DEFAULT_AFTER_LOGIN: &str = "/orders";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub next: String,
    pub staff: Option<CurrentStaff>,
}

/// Display the login page.
pub async fn login_page(
    OptionalStaff(staff): OptionalStaff,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    let error = query.error.as_deref().map(|code| {
        match code {
            "credentials" => "Invalid email or password.",
            _ => "Something went wrong. Please try again.",
        }
        .to_owned()
    });

    LoginTemplate {
        error,
        next: safe_next(query.next.as_deref()).to_owned(),
        staff,
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref());
    let auth = StaffAuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            let staff = CurrentStaff {
                id: user.id,
                email: user.email,
                name: user.name,
                role: user.role,
            };

            if let Err(e) = set_current_staff(&session, &staff).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to(&login_retry_url("internal", next)).into_response();
            }

            error::set_sentry_user(&staff.id, Some(staff.email.as_ref()));
            Redirect::to(next).into_response()
        }
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("Login failed: bad credentials");
            Redirect::to(&login_retry_url("credentials", next)).into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            Redirect::to(&login_retry_url("internal", next)).into_response()
        }
    }
}

/// Handle logout.
///
/// Destroys the whole session, so the per-order view flags reset too.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_staff(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    error::clear_sentry_user();
    Redirect::to("/").into_response()
}

/// Build the login URL for a failed attempt, keeping `next` intact.
fn login_retry_url(code: &str, next: &str) -> String {
    if next == DEFAULT_AFTER_LOGIN {
        format!("/auth/login?error={code}")
    } else {
        format!("/auth/login?error={code}&next={}", urlencoding::encode(next))
    }
}

/// Clamp a `next` value to a local path.
///
/// Anything that is not a same-site absolute path falls back to the
/// orders list, so the login form cannot be used as an open redirect.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") => n,
        _ => DEFAULT_AFTER_LOGIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_accepts_local_paths() {
        assert_eq!(safe_next(Some("/orders/7")), "/orders/7");
        assert_eq!(safe_next(Some("/services")), "/services");
    }

    #[test]
    fn test_safe_next_rejects_external_targets() {
        assert_eq!(safe_next(Some("https://evil.example")), DEFAULT_AFTER_LOGIN);
        assert_eq!(safe_next(Some("//evil.example")), DEFAULT_AFTER_LOGIN);
        assert_eq!(safe_next(Some("orders")), DEFAULT_AFTER_LOGIN);
        assert_eq!(safe_next(None), DEFAULT_AFTER_LOGIN);
    }

    #[test]
    fn test_login_retry_url_keeps_next() {
        assert_eq!(
            login_retry_url("credentials", "/orders/7"),
            "/auth/login?error=credentials&next=%2Forders%2F7"
        );
        assert_eq!(
            login_retry_url("credentials", DEFAULT_AFTER_LOGIN),
            "/auth/login?error=credentials"
        );
    }
}
