use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewTool, Tool},
};

/// Default page size for catalog listings
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Most candidates fetched for a single recommendation call
pub const CANDIDATE_LIMIT: i64 = 100;

/// Optional filters for catalog listings
#[derive(Debug, Default, Deserialize)]
pub struct ToolFilter {
    pub category: Option<String>,
    pub platform: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// Lists catalog entries matching the filter, oldest first
pub async fn list_tools(pool: &PgPool, filter: &ToolFilter) -> AppResult<Vec<Tool>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM tools WHERE TRUE");

    if let Some(category) = &filter.category {
        query.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(platform) = &filter.platform {
        query.push(" AND ").push_bind(platform.clone()).push(" = ANY(platforms)");
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query.push(" AND (name ILIKE ").push_bind(pattern.clone());
        query.push(" OR description ILIKE ").push_bind(pattern);
        query.push(" OR ").push_bind(search.to_lowercase()).push(" = ANY(tags))");
    }

    query
        .push(" ORDER BY created_at LIMIT ")
        .push_bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    let tools = query.build_query_as::<Tool>().fetch_all(pool).await?;
    Ok(tools)
}

/// Fetches the candidate set for a recommendation call.
///
/// An empty platform list means no pre-filter; otherwise any overlap with
/// the tool's platforms qualifies it. Ordered oldest first so repeated calls
/// see a stable candidate order.
pub async fn candidates_for_platforms(
    pool: &PgPool,
    platforms: &[String],
) -> AppResult<Vec<Tool>> {
    let tools = if platforms.is_empty() {
        sqlx::query_as::<_, Tool>("SELECT * FROM tools ORDER BY created_at LIMIT $1")
            .bind(CANDIDATE_LIMIT)
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as::<_, Tool>(
            "SELECT * FROM tools WHERE platforms && $1 ORDER BY created_at LIMIT $2",
        )
        .bind(platforms.to_vec())
        .bind(CANDIDATE_LIMIT)
        .fetch_all(pool)
        .await?
    };

    Ok(tools)
}

pub async fn get_tool(pool: &PgPool, id: Uuid) -> AppResult<Tool> {
    sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tool {} not found", id)))
}

pub async fn get_tool_by_name(pool: &PgPool, name: &str) -> AppResult<Option<Tool>> {
    let tool = sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(tool)
}

/// Adds a tool to the catalog; names must be unique
pub async fn insert_tool(pool: &PgPool, payload: NewTool) -> AppResult<Tool> {
    if get_tool_by_name(pool, &payload.name).await?.is_some() {
        return Err(AppError::InvalidInput(format!(
            "Tool '{}' is already cataloged",
            payload.name
        )));
    }

    let tool = Tool::new(payload);
    insert_row(pool, &tool).await?;

    tracing::info!(tool_id = %tool.id, name = %tool.name, "Tool cataloged");

    Ok(tool)
}

pub async fn delete_tool(pool: &PgPool, id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM tools WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Tool {} not found", id)));
    }

    Ok(())
}

/// Distinct category names, sorted
pub async fn distinct_categories(pool: &PgPool) -> AppResult<Vec<String>> {
    let categories =
        sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM tools ORDER BY category")
            .fetch_all(pool)
            .await?;
    Ok(categories)
}

/// Seeds the catalog with a starter set when the table is empty
pub async fn seed_catalog(pool: &PgPool) -> AppResult<()> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tools")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        return Ok(());
    }

    let tools = sample_tools();
    for tool in &tools {
        insert_row(pool, tool).await?;
    }

    tracing::info!(seeded = tools.len(), "Sample catalog data initialized");

    Ok(())
}

async fn insert_row(pool: &PgPool, tool: &Tool) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO tools \
         (id, name, description, category, platforms, features, pricing, url, rating, review_count, tags, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(tool.id)
    .bind(&tool.name)
    .bind(&tool.description)
    .bind(&tool.category)
    .bind(&tool.platforms)
    .bind(&tool.features)
    .bind(&tool.pricing)
    .bind(&tool.url)
    .bind(tool.rating)
    .bind(tool.review_count)
    .bind(&tool.tags)
    .bind(tool.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

fn seeded(payload: NewTool, rating: f64, review_count: i32) -> Tool {
    let mut tool = Tool::new(payload);
    tool.rating = rating;
    tool.review_count = review_count;
    tool
}

fn sample_tools() -> Vec<Tool> {
    vec![
        seeded(
            NewTool {
                name: "Cursor AI".to_string(),
                description: "AI-powered coding assistant for faster development with intelligent code completion and real-time collaboration".to_string(),
                category: "Development".to_string(),
                platforms: vec!["Web".to_string(), "Desktop".to_string()],
                features: vec![
                    "Code completion".to_string(),
                    "Real-time collaboration".to_string(),
                    "Debugging support".to_string(),
                    "Multi-language support".to_string(),
                ],
                pricing: "Freemium - $20/month for premium".to_string(),
                url: "https://cursor.ai".to_string(),
                tags: vec!["coding".to_string(), "ai".to_string(), "productivity".to_string(), "development".to_string()],
            },
            4.8,
            150,
        ),
        seeded(
            NewTool {
                name: "ChatGPT".to_string(),
                description: "Advanced conversational AI for content creation, coding help, and general assistance".to_string(),
                category: "General AI".to_string(),
                platforms: vec!["Web".to_string(), "Mobile".to_string(), "API".to_string()],
                features: vec![
                    "Natural language processing".to_string(),
                    "Code generation".to_string(),
                    "Content creation".to_string(),
                    "Problem solving".to_string(),
                ],
                pricing: "Free tier available - $20/month for premium".to_string(),
                url: "https://chat.openai.com".to_string(),
                tags: vec!["chatbot".to_string(), "ai".to_string(), "content".to_string(), "assistance".to_string()],
            },
            4.7,
            5000,
        ),
        seeded(
            NewTool {
                name: "DALL-E 3".to_string(),
                description: "AI image generation tool for creating high-quality artwork and images from text descriptions".to_string(),
                category: "Image Generation".to_string(),
                platforms: vec!["Web".to_string(), "API".to_string()],
                features: vec![
                    "Text-to-image generation".to_string(),
                    "High resolution output".to_string(),
                    "Style customization".to_string(),
                    "Commercial usage".to_string(),
                ],
                pricing: "Credits-based - $15-50/month depending on usage".to_string(),
                url: "https://openai.com/dall-e-3".to_string(),
                tags: vec!["image".to_string(), "ai".to_string(), "art".to_string(), "generation".to_string()],
            },
            4.6,
            800,
        ),
        seeded(
            NewTool {
                name: "GitHub Copilot".to_string(),
                description: "AI pair programmer that helps you write code faster with intelligent suggestions".to_string(),
                category: "Development".to_string(),
                platforms: vec!["IDE Extensions".to_string(), "Web".to_string()],
                features: vec![
                    "Code suggestions".to_string(),
                    "Auto-completion".to_string(),
                    "Documentation generation".to_string(),
                    "Test writing".to_string(),
                ],
                pricing: "$10/month for individuals - $19/month for business".to_string(),
                url: "https://github.com/features/copilot".to_string(),
                tags: vec!["coding".to_string(), "github".to_string(), "ai".to_string(), "programming".to_string()],
            },
            4.5,
            2000,
        ),
        seeded(
            NewTool {
                name: "Midjourney".to_string(),
                description: "AI art generator known for creating stunning, artistic images from text prompts".to_string(),
                category: "Image Generation".to_string(),
                platforms: vec!["Discord Bot".to_string(), "Web".to_string()],
                features: vec![
                    "Artistic image generation".to_string(),
                    "Style variations".to_string(),
                    "Upscaling".to_string(),
                    "Community gallery".to_string(),
                ],
                pricing: "Subscription-based - $10-60/month".to_string(),
                url: "https://midjourney.com".to_string(),
                tags: vec!["art".to_string(), "ai".to_string(), "creativity".to_string(), "discord".to_string()],
            },
            4.9,
            1200,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_tools_have_unique_names() {
        let tools = sample_tools();
        let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(tools.len(), 5);
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn test_sample_tools_ratings_in_range() {
        for tool in sample_tools() {
            assert!((0.0..=5.0).contains(&tool.rating), "{}", tool.name);
            assert!(tool.review_count >= 0);
        }
    }

    #[test]
    fn test_tool_filter_deserializes_from_query() {
        let filter: ToolFilter =
            serde_json::from_str(r#"{"category": "Development", "limit": 10}"#).unwrap();

        assert_eq!(filter.category.as_deref(), Some("Development"));
        assert_eq!(filter.limit, Some(10));
        assert!(filter.platform.is_none());
        assert!(filter.search.is_none());
    }
}
