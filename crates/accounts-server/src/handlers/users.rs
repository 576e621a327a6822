use accounts_shared::{
    api::{UpdateBiographyRequest, UserCredentials},
    SafeUser,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::error::{AppError, UserError};
use crate::routes::AppState;
use crate::service::{CreateUser, UpdateUser};

const INVALID_USER_BODY: &str = "Invalid request body: username and password are required.";
const INVALID_BIOGRAPHY_BODY: &str = "Invalid request body: username and biography are required.";
const INVALID_USERNAME_PARAM: &str = "Invalid or missing username parameter.";

/// True when `username` and `password` are both strings with non-blank content.
pub fn is_user_body_valid(body: &Value) -> bool {
    let non_blank = |field: &str| {
        body.get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };

    non_blank("username") && non_blank("password")
}

fn parse_credentials(body: Result<Json<Value>, JsonRejection>) -> Result<UserCredentials, AppError> {
    let Ok(Json(body)) = body else {
        return Err(AppError::Validation(INVALID_USER_BODY.to_string()));
    };
    if !is_user_body_valid(&body) {
        return Err(AppError::Validation(INVALID_USER_BODY.to_string()));
    }

    serde_json::from_value(body).map_err(|_| AppError::Validation(INVALID_USER_BODY.to_string()))
}

fn parse_username(username: &str) -> Result<&str, AppError> {
    if username.trim().is_empty() {
        return Err(AppError::Validation(INVALID_USERNAME_PARAM.to_string()));
    }
    Ok(username)
}

/// POST /user/signup
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SafeUser>), AppError> {
    let UserCredentials { username, password } = parse_credentials(body)?;

    let user = state
        .users
        .create(CreateUser {
            username,
            password,
            date_joined: Some(Utc::now()),
        })
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /user/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SafeUser>, AppError> {
    let credentials = parse_credentials(body)?;

    let user = state
        .users
        .authenticate(credentials)
        .await
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    Ok(Json(user))
}

/// GET /user/getUser/:username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SafeUser>, AppError> {
    let username = parse_username(&username)?;

    let user = state
        .users
        .fetch_by_username(username)
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(user))
}

/// DELETE /user/deleteUser/:username
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SafeUser>, AppError> {
    let username = parse_username(&username)?;

    let user = state
        .users
        .delete_by_username(username)
        .await
        .map_err(|e| match e {
            UserError::NotFound => AppError::NotFound(e.to_string()),
            e => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(user))
}

/// PATCH /user/resetPassword
pub async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SafeUser>, AppError> {
    let UserCredentials { username, password } = parse_credentials(body)?;

    let min_len = state.config.min_password_length;
    if password.trim().chars().count() < min_len {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            min_len
        )));
    }

    let user = state
        .users
        .update(
            &username,
            UpdateUser {
                password: Some(password),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(user))
}

/// PATCH /user/updateBiography
pub async fn update_biography(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SafeUser>, AppError> {
    let req = body
        .ok()
        .and_then(|Json(body)| serde_json::from_value::<UpdateBiographyRequest>(body).ok())
        .filter(|req| !req.username.trim().is_empty())
        .ok_or_else(|| AppError::Validation(INVALID_BIOGRAPHY_BODY.to_string()))?;

    let user = state
        .users
        .update(
            &req.username,
            UpdateUser {
                biography: Some(req.biography),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| match e {
            UserError::NotFound => AppError::NotFound(e.to_string()),
            e => AppError::BadRequest(e.to_string()),
        })?;

    Ok(Json(user))
}
