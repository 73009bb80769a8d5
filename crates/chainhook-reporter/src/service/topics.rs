//! # Topics Service
//!
//! Lists the voting topics kept in the topics sheet. The first row is a
//! header and is skipped.

use crate::domain::{TopicFetchError, VotingTopic};
use crate::ports::inbound::TopicsApi;
use crate::ports::outbound::TopicSource;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct TopicsService {
    source: Arc<dyn TopicSource>,
}

impl TopicsService {
    pub fn new(source: Arc<dyn TopicSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl TopicsApi for TopicsService {
    async fn list_topics(&self) -> Result<Vec<VotingTopic>, TopicFetchError> {
        let rows = self.source.fetch_rows().await?;

        let topics: Vec<VotingTopic> = rows
            .iter()
            .skip(1)
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| VotingTopic::from_row(row))
            .collect();

        if topics.is_empty() {
            return Err(TopicFetchError::Empty);
        }

        debug!(count = topics.len(), "loaded voting topics");
        Ok(topics)
    }
}
