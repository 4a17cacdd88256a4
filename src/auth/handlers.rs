use axum::{
    extract::{FromRef, Path, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        dto::{
            ForgotPasswordRequest, LoginRequest, MessageResponse, NewPasswordRequest, PublicUser,
            RegisterRequest,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo_types::User,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/reset/:token", get(check_temp_password))
        .route("/users/new-password", put(new_password))
        .route("/users/forgot-password", put(forgot_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Username is the local part of the email.
pub(crate) fn username_from_email(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// The insert races the pre-check against the unique indexes; a losing insert
/// surfaces as a unique violation and gets the same 409 as the pre-check.
fn map_create_error(e: anyhow::Error) -> (StatusCode, String) {
    if let Some(sqlx::Error::Database(db_err)) = e.downcast_ref::<sqlx::Error>() {
        if db_err.is_unique_violation() {
            return (StatusCode::CONFLICT, "User already exists".into());
        }
    }
    (StatusCode::INTERNAL_SERVER_ERROR, "Invalid user data".into())
}

fn session_headers(
    state: &AppState,
    keys: &JwtKeys,
    user_id: Uuid,
) -> Result<HeaderMap, (StatusCode, String)> {
    let token = keys.sign(user_id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let cookie = session_cookie(&state.config.jwt, &token).map_err(|e| {
        error!(error = %e, "session cookie build failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<PublicUser>), (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    // Ensure email is not taken
    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err((StatusCode::CONFLICT, "User already exists".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let username = username_from_email(&payload.email).to_string();
    let user = match User::create(
        &state.db,
        payload.first_name.trim(),
        payload.last_name.trim(),
        &username,
        &payload.email,
        &hash,
    )
    .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(map_create_error(e));
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let headers = session_headers(&state, &keys, user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, headers, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<PublicUser>), (StatusCode, String)> {
    let user = match User::find_by_username(&state.db, &payload.user_name).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_name = %payload.user_name, "login unknown username");
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".into(),
            ));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !ok {
        warn!(user_name = %payload.user_name, user_id = %user.id, "login invalid password");
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid username or password".into(),
        ));
    }

    let keys = JwtKeys::from_ref(&state);
    let headers = session_headers(&state, &keys, user.id)?;

    info!(user_id = %user.id, user_name = %user.username, "user logged in");
    Ok((headers, Json(user.into())))
}

/// Clears the session cookie; succeeds whether or not a valid session exists.
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<MessageResponse>), (StatusCode, String)> {
    let cookie = clear_session_cookie(&state.config.jwt).map_err(|e| {
        error!(error = %e, "clear cookie build failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, Json(MessageResponse::new("Logged out successfully"))))
}

/// Read-only probe: reports whether a temp-password token is active without
/// consuming it.
#[instrument(skip(state))]
pub async fn check_temp_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    match User::find_by_temp_password(&state.db, &token).await {
        Ok(Some(user)) => {
            info!(user_id = %user.id, "temp password token valid");
            Ok(Json(MessageResponse::new(
                "The generated password is valid, you can set your new password.",
            )))
        }
        Ok(None) => {
            warn!("temp password token not found");
            Err((
                StatusCode::NOT_FOUND,
                "The entered temporary password is incorrect, try again".into(),
            ))
        }
        Err(e) => {
            error!(error = %e, "find_by_temp_password failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn new_password(
    State(state): State<AppState>,
    Json(payload): Json<NewPasswordRequest>,
) -> Result<(HeaderMap, Json<PublicUser>), (StatusCode, String)> {
    if payload.password.len() < 8 {
        warn!("new password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    // Clearing the token and storing the hash is one UPDATE, so a token can
    // never be replayed after the password changed.
    let user = match User::consume_temp_password(&state.db, &payload.temp_token, &hash).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("temp password token not found");
            return Err((
                StatusCode::NOT_FOUND,
                "Please go to forgot password page, try again".into(),
            ));
        }
        Err(e) => {
            error!(error = %e, "consume_temp_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let headers = session_headers(&state, &keys, user.id)?;

    info!(user_id = %user.id, "password reset completed");
    Ok((headers, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "forgot password for unknown email");
            return Err((StatusCode::NOT_FOUND, "User not found".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let temp_token = Uuid::new_v4().to_string();
    if let Err(e) = User::set_temp_password(&state.db, user.id, &temp_token).await {
        error!(error = %e, user_id = %user.id, "set_temp_password failed");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
    }

    let name = format!("{} {}", user.first_name, user.last_name);
    // Delivery failure is not surfaced to the caller; the token is stored and
    // a retry of this endpoint issues a fresh one.
    if let Err(e) = state
        .mailer
        .send_password_reset(&name, &user.email, &temp_token)
        .await
    {
        error!(error = %e, user_id = %user.id, "reset mail send failed");
    }

    info!(user_id = %user.id, "reset token issued");
    Ok(Json(MessageResponse::new(
        "Reset password link has been sent to your mail",
    )))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    match User::find_by_id(&state.db, user_id).await {
        Ok(Some(user)) => Ok(Json(user.into())),
        Ok(None) => {
            warn!(user_id = %user_id, "session user no longer exists");
            Err((StatusCode::UNAUTHORIZED, "User not found".into()))
        }
        Err(e) => {
            error!(error = %e, user_id = %user_id, "find_by_id failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
