/// Ranking oracle abstraction
///
/// The oracle is the external text-reasoning service that orders candidate
/// tools against free-text requirements. It is injected into the
/// recommendation engine as a trait object so the engine can be exercised
/// with a test double, and so a failing oracle stays an `Err` value that the
/// engine converts into its degraded response.
use crate::models::{CandidateSummary, OracleRanking};

pub mod openai;

pub use openai::OpenAiOracle;

/// Faults a ranking attempt can end in; all of them are absorbed by the
/// engine's fallback path and never reach an API caller.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle call exceeded {0}s")]
    Timeout(u64),

    #[error("oracle returned status {status}: {body}")]
    BadStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("oracle response held no content")]
    Empty,

    #[error("malformed oracle output: {0}")]
    Malformed(String),
}

/// Trait for ranking oracles
///
/// A single call ranks the summarized candidates against the requirements
/// text. Implementations make exactly one attempt; retry policy, if any,
/// belongs to the caller (the engine deliberately has none).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RankingOracle: Send + Sync {
    async fn rank(
        &self,
        requirements: &str,
        candidates: &[CandidateSummary],
    ) -> Result<OracleRanking, OracleError>;
}
