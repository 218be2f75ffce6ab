//! Account routes: register, login, logout and the current user's profile.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, FieldError, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Profile, PublicUser, UserUpdate, session_keys};
use crate::services::AuthError;
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user).put(update_user))
}

/// Registration body: credentials plus optional profile fields.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Create an account and log it in.
///
/// # Errors
///
/// 403 when registration is disabled, 400 for blank fields or a taken username.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    if !state.config().allow_registration {
        return Err(AppError::Forbidden("Registration is disabled".to_string()));
    }
    let Json(body) = body?;

    let user = state
        .auth()
        .register(&body.username, &body.password, body.profile)
        .await?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(user.id.as_i32(), &user.username);
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in with username and password.
///
/// # Errors
///
/// 400 when either field is missing, 401 for bad credentials.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<PublicUser>, AppError> {
    let Json(body) = body?;

    let mut missing = Vec::new();
    if body.username.is_empty() {
        missing.push(FieldError::new("username", "username is required"));
    }
    if body.password.is_empty() {
        missing.push(FieldError::new("password", "password is required"));
    }
    if !missing.is_empty() {
        return Err(AppError::validation(
            "Username and password are required",
            missing,
        ));
    }

    let user = match state.auth().login(&body.username, &body.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(username = %body.username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(user.id.as_i32(), &user.username);
    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(Json(user.into()))
}

/// Destroy the session. Succeeds whether or not anyone was logged in.
///
/// # Errors
///
/// 500 if the session store fails.
pub async fn logout(
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<StatusCode, AppError> {
    if let Some(user) = user {
        tracing::info!(user_id = %user.id, username = %user.username, "User logged out");
    }

    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(StatusCode::OK)
}

/// The logged-in user's profile.
///
/// # Errors
///
/// 401 when anonymous or when the session's user no longer exists.
pub async fn current_user(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<PublicUser>, AppError> {
    match state.auth().current_user(current.id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(AuthError::NotAuthenticated) => {
            // The user was removed out from under the session.
            clear_current_user(&session).await?;
            Err(AuthError::NotAuthenticated.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Update the logged-in user's profile. A `password` field is ignored.
///
/// # Errors
///
/// 401 when anonymous, 400 for invalid fields or a taken username.
pub async fn update_user(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<PublicUser>, AppError> {
    let Json(changes) = body?;

    let user = state.auth().update_profile(current.id, changes).await?;

    if user.username != current.username {
        session
            .insert(session_keys::CURRENT_USER, CurrentUser::from(&user))
            .await?;
    }

    Ok(Json(user.into()))
}
