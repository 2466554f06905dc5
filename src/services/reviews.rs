use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewReview, Review},
    services::catalog,
};

/// Most reviews returned for one tool
const REVIEW_LIST_LIMIT: i64 = 100;

/// Records a review and refreshes the tool's running average.
///
/// One review per user per tool; the stored rating becomes the arithmetic
/// mean of all recorded ratings rounded to one decimal place, and
/// review_count the total number of reviews.
pub async fn create_review(
    pool: &PgPool,
    user_id: Uuid,
    payload: NewReview,
) -> AppResult<Review> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::InvalidInput(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    catalog::get_tool(pool, payload.tool_id).await?;

    let already_reviewed = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reviews WHERE user_id = $1 AND tool_id = $2",
    )
    .bind(user_id)
    .bind(payload.tool_id)
    .fetch_one(pool)
    .await?;

    if already_reviewed > 0 {
        return Err(AppError::InvalidInput(
            "You have already reviewed this tool".to_string(),
        ));
    }

    let review = Review {
        id: Uuid::new_v4(),
        user_id,
        tool_id: payload.tool_id,
        rating: payload.rating,
        comment: payload.comment,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO reviews (id, user_id, tool_id, rating, comment, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(review.id)
    .bind(review.user_id)
    .bind(review.tool_id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.created_at)
    .execute(pool)
    .await?;

    let ratings =
        sqlx::query_scalar::<_, i32>("SELECT rating FROM reviews WHERE tool_id = $1")
            .bind(review.tool_id)
            .fetch_all(pool)
            .await?;

    sqlx::query("UPDATE tools SET rating = $1, review_count = $2 WHERE id = $3")
        .bind(rounded_average(&ratings))
        .bind(ratings.len() as i32)
        .bind(review.tool_id)
        .execute(pool)
        .await?;

    tracing::info!(
        tool_id = %review.tool_id,
        review_count = ratings.len(),
        "Review recorded, rating aggregate refreshed"
    );

    Ok(review)
}

pub async fn reviews_for_tool(pool: &PgPool, tool_id: Uuid) -> AppResult<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE tool_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(tool_id)
    .bind(REVIEW_LIST_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

/// Arithmetic mean rounded to one decimal place
fn rounded_average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i32 = ratings.iter().sum();
    let average = sum as f64 / ratings.len() as f64;
    (average * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_average_single_rating() {
        assert_eq!(rounded_average(&[3]), 3.0);
    }

    #[test]
    fn test_rounded_average_exact_half() {
        assert_eq!(rounded_average(&[4, 5]), 4.5);
    }

    #[test]
    fn test_rounded_average_rounds_to_one_decimal() {
        // 13 / 3 = 4.333...
        assert_eq!(rounded_average(&[4, 4, 5]), 4.3);
        // 7 / 3 = 2.333...
        assert_eq!(rounded_average(&[2, 2, 3]), 2.3);
        // 14 / 3 = 4.666...
        assert_eq!(rounded_average(&[5, 5, 4]), 4.7);
    }

    #[test]
    fn test_rounded_average_empty_is_zero() {
        assert_eq!(rounded_average(&[]), 0.0);
    }
}
