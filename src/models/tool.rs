use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry for an AI software tool
///
/// `rating` and `review_count` are maintained by review aggregation and hold
/// the running average (one decimal place) and total review count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tool {
    /// Stable identity; names are unique but can be renamed
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub platforms: Vec<String>,
    pub features: Vec<String>,
    pub pricing: String,
    pub url: String,
    /// Running review average in [0, 5]
    pub rating: f64,
    pub review_count: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for catalog insertion
#[derive(Debug, Clone, Deserialize)]
pub struct NewTool {
    pub name: String,
    pub description: String,
    pub category: String,
    pub platforms: Vec<String>,
    pub features: Vec<String>,
    pub pricing: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Tool {
    /// Creates a fresh catalog entry with no reviews yet
    pub fn new(payload: NewTool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: payload.name,
            description: payload.description,
            category: payload.category,
            platforms: payload.platforms,
            features: payload.features,
            pricing: payload.pricing,
            url: payload.url,
            rating: 0.0,
            review_count: 0,
            tags: payload.tags,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tool_starts_unreviewed() {
        let tool = Tool::new(NewTool {
            name: "Cursor AI".to_string(),
            description: "AI-powered coding assistant".to_string(),
            category: "Development".to_string(),
            platforms: vec!["Web".to_string(), "Desktop".to_string()],
            features: vec!["Code completion".to_string()],
            pricing: "Freemium".to_string(),
            url: "https://cursor.ai".to_string(),
            tags: vec!["coding".to_string()],
        });

        assert_eq!(tool.name, "Cursor AI");
        assert_eq!(tool.rating, 0.0);
        assert_eq!(tool.review_count, 0);
    }

    #[test]
    fn test_new_tool_tags_default_empty() {
        let json = r#"{
            "name": "ChatGPT",
            "description": "Conversational AI",
            "category": "General AI",
            "platforms": ["Web"],
            "features": ["Content creation"],
            "pricing": "Free tier available",
            "url": "https://chat.openai.com"
        }"#;

        let payload: NewTool = serde_json::from_str(json).unwrap();
        assert!(payload.tags.is_empty());
    }
}
