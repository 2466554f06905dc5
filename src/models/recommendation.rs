use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Tool;

/// Inbound recommendation request
///
/// `preferred_platforms` narrows the candidate set before ranking. Budget and
/// use-case hints are accepted but do not currently influence the ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub requirements: String,
    #[serde(default)]
    pub preferred_platforms: Vec<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub use_case: Option<String>,
}

/// Ranked recommendation outcome
///
/// `tools` is ordered best-first and drawn exclusively from the candidate set;
/// every listed tool has an entry in `match_scores` (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub tools: Vec<Tool>,
    pub reasoning: String,
    pub match_scores: HashMap<String, f64>,
}

/// Slimmed-down tool view sent to the ranking oracle
///
/// Identity, tags and review counts are omitted; they carry no ranking signal
/// and inflate the prompt.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub name: String,
    pub description: String,
    pub category: String,
    pub platforms: Vec<String>,
    pub features: Vec<String>,
    pub pricing: String,
    pub rating: f64,
}

impl From<&Tool> for CandidateSummary {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            category: tool.category.clone(),
            platforms: tool.platforms.clone(),
            features: tool.features.clone(),
            pricing: tool.pricing.clone(),
            rating: tool.rating,
        }
    }
}

/// The structured shape the oracle must return
///
/// All three fields are required; anything else is a parse failure and the
/// caller degrades to the fallback ranking.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OracleRanking {
    pub recommended_tools: Vec<String>,
    pub reasoning: String,
    pub match_scores: HashMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_candidate_summary_drops_identity_fields() {
        let tool = Tool {
            id: Uuid::new_v4(),
            name: "Midjourney".to_string(),
            description: "AI art generator".to_string(),
            category: "Image Generation".to_string(),
            platforms: vec!["Discord Bot".to_string()],
            features: vec!["Upscaling".to_string()],
            pricing: "Subscription-based".to_string(),
            url: "https://midjourney.com".to_string(),
            rating: 4.9,
            review_count: 1200,
            tags: vec!["art".to_string()],
            created_at: Utc::now(),
        };

        let summary = CandidateSummary::from(&tool);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["name"], "Midjourney");
        assert_eq!(json["rating"], 4.9);
        assert!(json.get("id").is_none());
        assert!(json.get("tags").is_none());
        assert!(json.get("review_count").is_none());
    }

    #[test]
    fn test_oracle_ranking_requires_all_fields() {
        let missing_scores = r#"{
            "recommended_tools": ["Cursor AI"],
            "reasoning": "best fit"
        }"#;
        assert!(serde_json::from_str::<OracleRanking>(missing_scores).is_err());

        let complete = r#"{
            "recommended_tools": ["Cursor AI"],
            "reasoning": "best fit",
            "match_scores": {"Cursor AI": 92.0}
        }"#;
        let ranking: OracleRanking = serde_json::from_str(complete).unwrap();
        assert_eq!(ranking.recommended_tools, vec!["Cursor AI"]);
        assert_eq!(ranking.match_scores["Cursor AI"], 92.0);
    }

    #[test]
    fn test_recommendation_request_defaults() {
        let json = r#"{"requirements": "help me write code"}"#;
        let request: RecommendationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.requirements, "help me write code");
        assert!(request.preferred_platforms.is_empty());
        assert!(request.budget.is_none());
        assert!(request.use_case.is_none());
    }
}
