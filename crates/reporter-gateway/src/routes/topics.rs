//! `GET /api/voting-topics` - voting topics from the topics sheet.

use crate::error::{ApiError, ApiResult};
use crate::routes::AppState;
use axum::{extract::State, Json};
use chainhook_reporter::{TopicFetchError, VotingTopic};
use serde::Serialize;
use tracing::error;

pub const NO_TOPICS_MESSAGE: &str = "No active voting topics found.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch topics from Google Sheets.";

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<VotingTopic>,
}

pub async fn list_voting_topics(State(state): State<AppState>) -> ApiResult<Json<TopicsResponse>> {
    let result = state.topics.list_topics().await;
    state.metrics.record_topic_request(result.is_ok());

    match result {
        Ok(topics) => Ok(Json(TopicsResponse { topics })),
        Err(TopicFetchError::Empty) => Err(ApiError::NotFound(NO_TOPICS_MESSAGE.to_string())),
        Err(e) => {
            error!(error = %e, "Error reading voting topics");
            Err(ApiError::Internal(FETCH_FAILED_MESSAGE.to_string()))
        }
    }
}
