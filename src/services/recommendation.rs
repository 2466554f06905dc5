use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CandidateSummary, OracleRanking, RecommendationResult, Tool},
    services::oracle::RankingOracle,
};

/// Most candidates forwarded to the oracle in a single call
const ORACLE_CANDIDATE_LIMIT: usize = 20;

/// Target result size; results are shorter only when candidates run out
const TARGET_RESULT_LEN: usize = 5;

/// Score attached to every tool in a degraded-mode response
const FALLBACK_SCORE: f64 = 80.0;

/// Neutral score for top-up entries the oracle never scored
const DEFAULT_MATCH_SCORE: f64 = 50.0;

/// Reasoning string returned whenever the oracle cannot be trusted
pub const FALLBACK_REASONING: &str =
    "Showing top-rated tools due to AI service unavailability";

/// Ranks a candidate set of tools against free-text requirements.
///
/// The engine is stateless and reentrant; its only suspension point is the
/// injected oracle call. Oracle faults of any kind degrade to a fixed
/// deterministic response and are never surfaced to the caller — the sole
/// propagated failure is an empty candidate set.
pub struct RecommendationEngine {
    oracle: Arc<dyn RankingOracle>,
}

impl RecommendationEngine {
    pub fn new(oracle: Arc<dyn RankingOracle>) -> Self {
        Self { oracle }
    }

    /// Produces a ranked, scored, explained subset of `candidates`.
    ///
    /// Candidate order matters twice: it bounds what the oracle sees (the
    /// first [`ORACLE_CANDIDATE_LIMIT`] entries) and it is the order served
    /// in degraded mode.
    pub async fn recommend(
        &self,
        requirements: &str,
        candidates: Vec<Tool>,
    ) -> AppResult<RecommendationResult> {
        if candidates.is_empty() {
            return Err(AppError::InvalidInput(
                "No candidate tools supplied".to_string(),
            ));
        }

        let summaries: Vec<CandidateSummary> = candidates
            .iter()
            .take(ORACLE_CANDIDATE_LIMIT)
            .map(CandidateSummary::from)
            .collect();

        match self.oracle.rank(requirements, &summaries).await {
            Ok(ranking) => {
                let result = assemble_result(&candidates, ranking);
                tracing::info!(
                    candidates = candidates.len(),
                    recommended = result.tools.len(),
                    "Recommendation ranked by oracle"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ranking oracle failed, serving degraded response");
                Ok(fallback_result(&candidates))
            }
        }
    }
}

/// The availability guarantee: a fixed response independent of the oracle.
///
/// First `min(5, N)` candidates in arrival order, each scored
/// [`FALLBACK_SCORE`], with the fixed degraded-mode reasoning.
fn fallback_result(candidates: &[Tool]) -> RecommendationResult {
    let tools: Vec<Tool> = candidates.iter().take(TARGET_RESULT_LEN).cloned().collect();
    let match_scores = tools
        .iter()
        .map(|tool| (tool.name.clone(), FALLBACK_SCORE))
        .collect();

    RecommendationResult {
        tools,
        reasoning: FALLBACK_REASONING.to_string(),
        match_scores,
    }
}

/// Reconciles the oracle's ranked names against the candidate set and tops
/// the list up to [`TARGET_RESULT_LEN`] entries.
///
/// Names outside the candidate set are dropped without comment (the oracle
/// hallucinates occasionally) and repeats are kept once, in their first
/// ranked position. Top-up entries come from the remaining candidates by
/// descending rating, ties resolved by arrival order.
fn assemble_result(candidates: &[Tool], ranking: OracleRanking) -> RecommendationResult {
    let by_name: HashMap<&str, &Tool> = candidates
        .iter()
        .map(|tool| (tool.name.as_str(), tool))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected: Vec<Tool> = Vec::new();

    for name in &ranking.recommended_tools {
        match by_name.get(name.as_str()) {
            Some(tool) => {
                if seen.insert(tool.name.as_str()) {
                    selected.push((*tool).clone());
                }
            }
            None => {
                tracing::debug!(name = %name, "Oracle named a tool outside the candidate set");
            }
        }
    }

    if selected.len() < TARGET_RESULT_LEN {
        let mut remaining: Vec<&Tool> = candidates
            .iter()
            .filter(|tool| !seen.contains(tool.name.as_str()))
            .collect();
        // stable sort keeps arrival order within equal ratings
        remaining.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));

        for tool in remaining
            .into_iter()
            .take(TARGET_RESULT_LEN - selected.len())
        {
            selected.push(tool.clone());
        }
    }

    // Keep only scores for served tools; hallucinated names must not leak out
    let mut match_scores: HashMap<String, f64> = ranking
        .match_scores
        .into_iter()
        .filter(|(name, _)| selected.iter().any(|tool| &tool.name == name))
        .collect();
    for tool in &selected {
        match_scores
            .entry(tool.name.clone())
            .or_insert(DEFAULT_MATCH_SCORE);
    }

    RecommendationResult {
        tools: selected,
        reasoning: ranking.reasoning,
        match_scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::oracle::{MockRankingOracle, OracleError};
    use chrono::Utc;
    use tokio_test::assert_err;
    use uuid::Uuid;

    fn tool(name: &str, rating: f64) -> Tool {
        Tool {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{} description", name),
            category: "Development".to_string(),
            platforms: vec!["Web".to_string()],
            features: vec!["Code completion".to_string()],
            pricing: "Freemium".to_string(),
            url: format!("https://{}.example.com", name.to_lowercase()),
            rating,
            review_count: 10,
            tags: vec![],
            created_at: Utc::now(),
        }
    }

    fn ranking(names: &[&str], scores: &[(&str, f64)]) -> OracleRanking {
        OracleRanking {
            recommended_tools: names.iter().map(|n| n.to_string()).collect(),
            reasoning: "matched on features".to_string(),
            match_scores: scores
                .iter()
                .map(|(n, s)| (n.to_string(), *s))
                .collect(),
        }
    }

    fn engine_with(mock: MockRankingOracle) -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_result_is_deduplicated_subset_of_candidates() {
        let candidates = vec![tool("A", 4.0), tool("B", 3.5), tool("C", 4.8)];

        let mut oracle = MockRankingOracle::new();
        oracle.expect_rank().returning(|_, _| {
            Ok(ranking(
                &["B", "B", "Imaginary Tool", "A"],
                &[("B", 90.0), ("Imaginary Tool", 85.0), ("A", 70.0)],
            ))
        });

        let result = engine_with(oracle)
            .recommend("coding help", candidates.clone())
            .await
            .unwrap();

        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert!(!result.match_scores.contains_key("Imaginary Tool"));
    }

    #[tokio::test]
    async fn test_oracle_failure_yields_exact_fallback() {
        let candidates: Vec<Tool> = (1..=8).map(|i| tool(&format!("T{}", i), 3.0)).collect();

        let mut oracle = MockRankingOracle::new();
        oracle
            .expect_rank()
            .returning(|_, _| Err(OracleError::Timeout(30)));

        let result = engine_with(oracle)
            .recommend("anything", candidates.clone())
            .await
            .unwrap();

        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "T2", "T3", "T4", "T5"]);
        assert_eq!(result.reasoning, FALLBACK_REASONING);
        for tool in &result.tools {
            assert_eq!(result.match_scores[&tool.name], FALLBACK_SCORE);
        }
        assert_eq!(result.match_scores.len(), 5);
    }

    #[tokio::test]
    async fn test_fallback_with_fewer_than_five_candidates() {
        let candidates = vec![tool("A", 4.0), tool("B", 2.0)];

        let mut oracle = MockRankingOracle::new();
        oracle.expect_rank().returning(|_, _| {
            Err(OracleError::Malformed("unexpected prose".to_string()))
        });

        let result = engine_with(oracle)
            .recommend("anything", candidates)
            .await
            .unwrap();

        assert_eq!(result.tools.len(), 2);
        assert_eq!(result.match_scores.len(), 2);
        assert_eq!(result.reasoning, FALLBACK_REASONING);
    }

    #[tokio::test]
    async fn test_top_up_orders_by_rating_then_arrival() {
        // ratings: A 4.5, B 3.0, C 4.9; oracle only names B
        let candidates = vec![tool("A", 4.5), tool("B", 3.0), tool("C", 4.9)];

        let mut oracle = MockRankingOracle::new();
        oracle
            .expect_rank()
            .returning(|_, _| Ok(ranking(&["B"], &[("B", 77.0)])));

        let result = engine_with(oracle)
            .recommend("niche request", candidates)
            .await
            .unwrap();

        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(result.match_scores["B"], 77.0);
        assert_eq!(result.match_scores["C"], DEFAULT_MATCH_SCORE);
        assert_eq!(result.match_scores["A"], DEFAULT_MATCH_SCORE);
    }

    #[tokio::test]
    async fn test_top_up_fills_to_five_when_oracle_under_recommends() {
        let candidates = vec![
            tool("A", 1.0),
            tool("B", 5.0),
            tool("C", 3.0),
            tool("D", 3.0),
            tool("E", 4.0),
            tool("F", 2.0),
        ];

        let mut oracle = MockRankingOracle::new();
        oracle
            .expect_rank()
            .returning(|_, _| Ok(ranking(&["A"], &[("A", 60.0)])));

        let result = engine_with(oracle)
            .recommend("broad request", candidates)
            .await
            .unwrap();

        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
        // A ranked, then B (5.0), E (4.0), C before D (tied at 3.0, arrival order)
        assert_eq!(names, vec!["A", "B", "E", "C", "D"]);
    }

    #[tokio::test]
    async fn test_oracle_may_recommend_more_than_five() {
        let candidates: Vec<Tool> = (1..=7).map(|i| tool(&format!("T{}", i), 3.0)).collect();

        let mut oracle = MockRankingOracle::new();
        oracle.expect_rank().returning(|_, _| {
            Ok(ranking(&["T1", "T2", "T3", "T4", "T5", "T6"], &[]))
        });

        let result = engine_with(oracle)
            .recommend("everything", candidates)
            .await
            .unwrap();

        assert_eq!(result.tools.len(), 6);
    }

    #[tokio::test]
    async fn test_oracle_sees_at_most_twenty_candidates() {
        let candidates: Vec<Tool> = (1..=25).map(|i| tool(&format!("T{}", i), 3.0)).collect();

        let mut oracle = MockRankingOracle::new();
        oracle
            .expect_rank()
            .withf(|_, summaries| summaries.len() == 20)
            .returning(|_, _| Ok(ranking(&["T1"], &[("T1", 99.0)])));

        let result = engine_with(oracle)
            .recommend("anything", candidates)
            .await
            .unwrap();

        assert_eq!(result.tools.len(), 5);
    }

    #[tokio::test]
    async fn test_identical_inputs_yield_identical_output() {
        let candidates = vec![tool("A", 4.0), tool("B", 3.0), tool("C", 2.0)];

        let mut oracle = MockRankingOracle::new();
        oracle
            .expect_rank()
            .times(2)
            .returning(|_, _| Ok(ranking(&["C", "A"], &[("C", 88.0), ("A", 75.0)])));

        let engine = engine_with(oracle);
        let first = engine
            .recommend("same request", candidates.clone())
            .await
            .unwrap();
        let second = engine
            .recommend("same request", candidates)
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_candidates_fail_without_oracle_call() {
        // No expectation set: any oracle call would panic the test
        let oracle = MockRankingOracle::new();
        let engine = engine_with(oracle);

        let result = engine.recommend("anything", vec![]).await;
        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_fallback_result_shape() {
        let candidates = vec![tool("A", 1.0), tool("B", 2.0), tool("C", 3.0)];
        let result = fallback_result(&candidates);

        assert_eq!(result.tools.len(), 3);
        assert_eq!(result.reasoning, FALLBACK_REASONING);
        assert!(result.match_scores.values().all(|s| *s == FALLBACK_SCORE));
    }
}
