use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth,
    error::{AppError, AppResult},
    models::{RegisterRequest, Tool, User},
    services::catalog,
};

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> AppResult<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
}

/// Registers a new account; emails are unique
pub async fn create_user(pool: &PgPool, request: RegisterRequest) -> AppResult<User> {
    if request.email.trim().is_empty()
        || request.username.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(AppError::InvalidInput(
            "Email, username and password are required".to_string(),
        ));
    }

    if find_user_by_email(pool, &request.email).await?.is_some() {
        return Err(AppError::InvalidInput(
            "Email already registered".to_string(),
        ));
    }

    let user = User {
        id: Uuid::new_v4(),
        email: request.email,
        username: request.username,
        password_hash: auth::hash_password(&request.password)?,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (id, email, username, password_hash, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(user)
}

/// Bookmarks a tool; repeated adds are no-ops
pub async fn add_favorite(pool: &PgPool, user_id: Uuid, tool_id: Uuid) -> AppResult<()> {
    catalog::get_tool(pool, tool_id).await?;

    sqlx::query(
        "INSERT INTO favorites (user_id, tool_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(tool_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Removes a bookmark; absent rows are ignored
pub async fn remove_favorite(pool: &PgPool, user_id: Uuid, tool_id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND tool_id = $2")
        .bind(user_id)
        .bind(tool_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// The user's bookmarked tools, most recently added first
pub async fn favorite_tools(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<Tool>> {
    let tools = sqlx::query_as::<_, Tool>(
        "SELECT t.* FROM tools t \
         JOIN favorites f ON f.tool_id = t.id \
         WHERE f.user_id = $1 \
         ORDER BY f.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(tools)
}
