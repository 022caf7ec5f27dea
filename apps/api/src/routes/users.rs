use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{User, UserRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
}

/// POST /api/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".to_string()));
    }
    // Usernames are unique case-insensitively; the store still guards the race.
    if state.store.get_user_by_username(username).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{username}' is already taken"
        )));
    }

    let user = state.store.create_user(User::new(username, req.role)).await?;
    info!(user_id = %user.id, role = %user.role, "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users
pub async fn handle_list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.store.list_users().await?))
}

/// GET /api/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    state
        .store
        .get_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}
