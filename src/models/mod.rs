mod recommendation;
mod review;
mod tool;
mod user;

pub use recommendation::{
    CandidateSummary, OracleRanking, RecommendationRequest, RecommendationResult,
};
pub use review::{NewReview, Review};
pub use tool::{NewTool, Tool};
pub use user::{LoginRequest, RegisterRequest, TokenResponse, User};
