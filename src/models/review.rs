use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single user's review of a tool; one per (user, tool)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_id: Uuid,
    /// Whole stars, 1 through 5
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub tool_id: Uuid,
    pub rating: i32,
    pub comment: String,
}
