/// OpenAI-compatible ranking oracle
///
/// Talks to a `/chat/completions` endpoint with a prompt embedding the
/// requirements text and the summarized candidate list, and expects a JSON
/// object back. One attempt per ranking, bounded output size, low fixed
/// temperature to keep the response shape stable.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    config::Config,
    models::{CandidateSummary, OracleRanking},
    services::oracle::{OracleError, RankingOracle},
};

const MAX_OUTPUT_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are an AI tools expert who provides intelligent \
    recommendations based on user requirements. Always respond with valid JSON.";

#[derive(Clone)]
pub struct OpenAiOracle {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiOracle {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: config.oracle_api_key.clone(),
            api_url: config.oracle_api_url.clone(),
            model: config.oracle_model.clone(),
            timeout_secs: config.oracle_timeout_secs,
        }
    }

    fn build_prompt(
        requirements: &str,
        candidates: &[CandidateSummary],
    ) -> Result<String, OracleError> {
        let candidates_json = serde_json::to_string_pretty(candidates)
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        Ok(format!(
            r#"Based on the user requirements: "{requirements}"

Here are the available AI tools:
{candidates_json}

Analyze the requirements and recommend the most suitable tools.
Respond with a JSON object containing:
{{
    "recommended_tools": [list of tool names ranked by relevance],
    "reasoning": "explanation of why these tools match the requirements",
    "match_scores": {{"tool_name": score_out_of_100, ...}}
}}

Consider factors like use case alignment, platform compatibility, features matching, and value for money."#
        ))
    }
}

/// Extracts the ranking object from the model's message content.
///
/// Models frequently wrap JSON in markdown fences; those are tolerated.
/// Anything that does not deserialize into the full expected shape is a
/// malformed response.
fn parse_ranking(content: &str) -> Result<OracleRanking, OracleError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(unfenced).map_err(|e| OracleError::Malformed(e.to_string()))
}

#[async_trait::async_trait]
impl RankingOracle for OpenAiOracle {
    async fn rank(
        &self,
        requirements: &str,
        candidates: &[CandidateSummary],
    ) -> Result<OracleRanking, OracleError> {
        let prompt = Self::build_prompt(requirements, candidates)?;

        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let url = format!("{}/chat/completions", self.api_url);

        tracing::debug!(
            url = %url,
            model = %self.model,
            candidates = candidates.len(),
            "Invoking ranking oracle"
        );

        let response = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.http_client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request_body)
                .send(),
        )
        .await
        .map_err(|_| OracleError::Timeout(self.timeout_secs))??;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::BadStatus { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or(OracleError::Empty)?;

        parse_ranking(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> CandidateSummary {
        CandidateSummary {
            name: name.to_string(),
            description: "desc".to_string(),
            category: "Development".to_string(),
            platforms: vec!["Web".to_string()],
            features: vec!["Code completion".to_string()],
            pricing: "Free".to_string(),
            rating: 4.2,
        }
    }

    #[test]
    fn test_build_prompt_embeds_requirements_and_candidates() {
        let prompt =
            OpenAiOracle::build_prompt("help me ship faster", &[summary("Cursor AI")]).unwrap();

        assert!(prompt.contains("help me ship faster"));
        assert!(prompt.contains("Cursor AI"));
        assert!(prompt.contains("recommended_tools"));
    }

    #[test]
    fn test_parse_ranking_plain_json() {
        let content = r#"{
            "recommended_tools": ["Cursor AI", "GitHub Copilot"],
            "reasoning": "both are coding assistants",
            "match_scores": {"Cursor AI": 95.0, "GitHub Copilot": 88.5}
        }"#;

        let ranking = parse_ranking(content).unwrap();
        assert_eq!(ranking.recommended_tools.len(), 2);
        assert_eq!(ranking.match_scores["GitHub Copilot"], 88.5);
    }

    #[test]
    fn test_parse_ranking_strips_markdown_fences() {
        let content = "```json\n{\"recommended_tools\": [], \"reasoning\": \"none fit\", \"match_scores\": {}}\n```";

        let ranking = parse_ranking(content).unwrap();
        assert!(ranking.recommended_tools.is_empty());
        assert_eq!(ranking.reasoning, "none fit");
    }

    #[test]
    fn test_parse_ranking_rejects_prose() {
        let result = parse_ranking("I would recommend Cursor AI for this.");
        assert!(matches!(result, Err(OracleError::Malformed(_))));
    }

    #[test]
    fn test_parse_ranking_rejects_missing_fields() {
        let result = parse_ranking(r#"{"recommended_tools": ["Cursor AI"]}"#);
        assert!(matches!(result, Err(OracleError::Malformed(_))));
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "{}"}}
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "{}");
    }
}
